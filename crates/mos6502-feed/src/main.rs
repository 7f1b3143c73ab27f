use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use mos6502_feed::{session, HttpTransport, DEFAULT_ENDPOINT};

#[derive(Parser, Debug)]
#[command(author, version, about = "Send a 6502 binary to the disassembly service and print the listing", long_about = None)]
struct Cli {
    /// Input binary path
    #[arg(value_name = "BINFILE")]
    input: PathBuf,
    /// Print the hex dump, HTTP status and raw response body
    #[arg(short, long)]
    verbose: bool,
    /// Disassembly service URL
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let bytes = std::fs::read(&cli.input).with_context(|| format!("cannot read {}", cli.input.display()))?;
    let transport = HttpTransport::new(cli.endpoint)?;
    session::run(&mut io::stdout().lock(), &transport, &bytes, cli.verbose)
}
