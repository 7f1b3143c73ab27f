use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use mos6502_vectors::fixture::{verify_fixture_file, write_fixture_file, FillMode};
use mos6502_vectors::{load_table, OpcodeEntry, TableFormat};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Generate 6502 opcode fixtures from an addressing-mode table"
)]
struct Opts {
    /// `giga` writes one pass per operand value; anything else writes the 0xFF pass
    #[arg(value_name = "MODE")]
    mode: Option<String>,
    /// Encoding table (16 rows x 16 columns of "<mnemonic> <mode>")
    #[arg(long, default_value = "opcode-table.csv")]
    table: PathBuf,
    /// Directory receiving mega.bin / giga.bin
    #[arg(long, default_value = "test-bin")]
    out_dir: PathBuf,
    #[arg(long, default_value_t = ';')]
    delimiter: char,
    #[arg(long, default_value_t = '|')]
    quote: char,
    /// Treat quote characters as ordinary text
    #[arg(long)]
    no_quote: bool,
    /// Fail on addressing modes without a known operand length
    #[arg(long)]
    strict: bool,
    /// Read the fixture back and check it against the table
    #[arg(long)]
    verify: bool,
    /// Print the derived opcode entries instead of writing a fixture
    #[arg(long, value_enum)]
    list: Option<ListFormat>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ListFormat {
    Text,
    Json,
}

fn ascii_byte(c: char, what: &str) -> Result<u8> {
    anyhow::ensure!(c.is_ascii(), "{what} must be a single ASCII character, got {c:?}");
    Ok(c as u8)
}

fn print_entries(entries: &[OpcodeEntry], format: ListFormat) -> Result<()> {
    match format {
        ListFormat::Text => {
            println!("{:<6} {:<5} {:<7} {}", "op", "mnem", "mode", "len");
            for e in entries {
                println!("{:<6} {:<5} {:<7} {}", format!("${:02X}", e.opcode), e.mnemonic, e.tag, e.operand_len);
            }
        }
        ListFormat::Json => println!("{}", serde_json::to_string_pretty(entries)?),
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let opts = Opts::parse();
    let fmt = TableFormat {
        delimiter: ascii_byte(opts.delimiter, "--delimiter")?,
        quote: if opts.no_quote { None } else { Some(ascii_byte(opts.quote, "--quote")?) },
        strict_modes: opts.strict,
    };
    let entries = load_table(&opts.table, &fmt)?;

    if let Some(format) = opts.list {
        return print_entries(&entries, format);
    }

    let mode = FillMode::from_arg(opts.mode.as_deref());
    let path = opts.out_dir.join(mode.file_name());
    let written = write_fixture_file(&path, &entries, mode)
        .with_context(|| format!("writing {}", path.display()))?;
    println!("{}: {} opcodes, {} bytes", path.display(), entries.len(), written);

    if opts.verify {
        verify_fixture_file(&path, &entries, mode)?;
        println!("{}: verified", path.display());
    }
    Ok(())
}
