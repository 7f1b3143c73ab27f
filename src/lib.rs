pub mod fixture;
pub mod modes;
pub mod table;

pub use fixture::{encode_fixture, verify_fixture, walk_fixture, write_fixture_file, FillMode};
pub use modes::{operand_len, AddrMode};
pub use table::{load_table, parse_table, OpcodeEntry, TableError, TableFormat};
