//! Render waveform tables for firmware using the `sound-dac` generator.
//!
//! ```text
//! sound-wavetable --config tables.hjson --output src/tables.rs
//! sound-wavetable --wave sine --length 64 --amplitude 4095 --name TONE
//! sound-wavetable --config tables.hjson --format binary --output tables.bin
//! ```

mod table;

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};

use table::{parse_tables, write_binary, write_rust, TableSpec, Wave};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Rust source with one `static` array per table.
    Rust,
    /// Raw little-endian u16 samples, tables back to back.
    Binary,
}

#[derive(Parser, Debug)]
#[command(version, about = "Render waveform tables for sound-dac firmware")]
struct Cli {
    /// hjson file listing the tables to render.
    #[arg(short, long, conflicts_with = "wave")]
    config: Option<PathBuf>,

    /// Render a single table of this waveform.
    #[arg(long, value_enum)]
    wave: Option<Wave>,

    /// Samples in one period (single table).
    #[arg(long, default_value_t = 64)]
    length: usize,

    /// Peak sample value (single table).
    #[arg(long, default_value_t = 4095)]
    amplitude: u16,

    /// Name of the generated static (single table).
    #[arg(long, default_value = "WAVE")]
    name: String,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Rust)]
    format: OutputFormat,

    /// Output file. Writes to stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let specs = match (&cli.config, cli.wave) {
        (Some(path), _) => {
            let src = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            parse_tables(&src).with_context(|| format!("in {}", path.display()))?
        }
        (None, Some(wave)) => vec![TableSpec {
            name: cli.name.clone(),
            wave,
            length: cli.length,
            amplitude: cli.amplitude,
        }],
        (None, None) => bail!("either --config or --wave is required"),
    };

    let tables = specs
        .iter()
        .map(TableSpec::render)
        .collect::<Result<Vec<_>>>()?;

    let mut out: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    };

    match cli.format {
        OutputFormat::Rust => write_rust(&mut out, &tables),
        OutputFormat::Binary => write_binary(&mut out, &tables),
    }
    .context("failed to write tables")?;
    out.flush().context("failed to write tables")?;

    if let Some(path) = &cli.output {
        println!("Wrote {} table(s) to {}", tables.len(), path.display());
    }

    Ok(())
}
