/// Operand length assumed for tags the table uses but [`AddrMode`] does not list.
pub const FALLBACK_OPERAND_LEN: u8 = 1;

/// Addressing modes as they are spelled in the encoding table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddrMode {
    Accumulator,
    Implied,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Relative,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    IndexedIndirect, // (zp,X)
    IndirectIndexed, // (zp),Y
}

impl AddrMode {
    pub const ALL: [AddrMode; 13] = [
        AddrMode::Accumulator,
        AddrMode::Implied,
        AddrMode::Immediate,
        AddrMode::ZeroPage,
        AddrMode::ZeroPageX,
        AddrMode::ZeroPageY,
        AddrMode::Relative,
        AddrMode::Absolute,
        AddrMode::AbsoluteX,
        AddrMode::AbsoluteY,
        AddrMode::Indirect,
        AddrMode::IndexedIndirect,
        AddrMode::IndirectIndexed,
    ];

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.tag() == tag)
    }

    pub fn tag(self) -> &'static str {
        match self {
            AddrMode::Accumulator => "A",
            AddrMode::Implied => "impl",
            AddrMode::Immediate => "#",
            AddrMode::ZeroPage => "zpg",
            AddrMode::ZeroPageX => "zpg,X",
            AddrMode::ZeroPageY => "zpg,Y",
            AddrMode::Relative => "rel",
            AddrMode::Absolute => "abs",
            AddrMode::AbsoluteX => "abs,X",
            AddrMode::AbsoluteY => "abs,Y",
            AddrMode::Indirect => "ind",
            AddrMode::IndexedIndirect => "X,ind",
            AddrMode::IndirectIndexed => "ind,Y",
        }
    }

    /// Number of bytes following the opcode byte.
    pub fn operand_len(self) -> u8 {
        match self {
            AddrMode::Accumulator | AddrMode::Implied => 0,
            AddrMode::Immediate
            | AddrMode::ZeroPage
            | AddrMode::ZeroPageX
            | AddrMode::ZeroPageY
            | AddrMode::Relative
            | AddrMode::IndexedIndirect
            | AddrMode::IndirectIndexed => 1,
            AddrMode::Absolute | AddrMode::AbsoluteX | AddrMode::AbsoluteY | AddrMode::Indirect => 2,
        }
    }
}

/// Operand length for a raw mode tag. Tags outside [`AddrMode`] get
/// [`FALLBACK_OPERAND_LEN`]; callers decide whether that deserves a warning.
pub fn operand_len(tag: &str) -> u8 {
    AddrMode::from_tag(tag).map_or(FALLBACK_OPERAND_LEN, AddrMode::operand_len)
}
