//! Table descriptions, rendering and output encodings.

use std::collections::HashSet;
use std::io::{self, Write};

use anyhow::{anyhow, bail, Context, Result};
use clap::ValueEnum;
use serde::de::{self, Deserializer};
use serde::Deserialize;
use sound_dac::WaveType;

/// Samples per line in generated Rust source.
const SAMPLES_PER_LINE: usize = 12;

/// Waveform name as written in table files and on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Wave {
    Sine,
    Triangle,
    Saw,
    Square,
}

impl From<Wave> for WaveType {
    fn from(wave: Wave) -> Self {
        match wave {
            Wave::Sine => WaveType::Sine,
            Wave::Triangle => WaveType::Triangle,
            Wave::Saw => WaveType::Sawtooth,
            Wave::Square => WaveType::Square,
        }
    }
}

/// Table files spell waves as plain strings, matched like the `--wave` flag.
fn deserialize_wave<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Wave, D::Error> {
    let name = String::deserialize(deserializer)?;
    <Wave as ValueEnum>::from_str(&name, true).map_err(|_| {
        de::Error::custom(format!(
            "unknown wave `{}`, expected one of sine, triangle, saw, square",
            name
        ))
    })
}

/// One table to render.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableSpec {
    /// Name of the generated `static`.
    pub name: String,
    #[serde(deserialize_with = "deserialize_wave")]
    pub wave: Wave,
    /// Samples in one period.
    pub length: usize,
    /// Peak sample value.
    pub amplitude: u16,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TableFile {
    tables: Vec<TableSpec>,
}

/// A rendered table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub spec: TableSpec,
    pub samples: Vec<u16>,
}

/// Parse an hjson table file.
pub fn parse_tables(src: &str) -> Result<Vec<TableSpec>> {
    let file: TableFile = serde_hjson::from_str(src).context("failed to parse table file")?;
    if file.tables.is_empty() {
        bail!("table file lists no tables");
    }

    let mut names = HashSet::new();
    for spec in &file.tables {
        if !names.insert(spec.name.as_str()) {
            bail!("duplicate table name `{}`", spec.name);
        }
    }

    Ok(file.tables)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    name != "_" && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl TableSpec {
    /// Render one period of the described waveform.
    pub fn render(&self) -> Result<Table> {
        if !is_identifier(&self.name) {
            bail!("table name `{}` is not a valid identifier", self.name);
        }

        let mut samples = vec![0; self.length];
        sound_dac::generate(&mut samples, self.wave.into(), self.amplitude)
            .map_err(|e| anyhow!("table `{}`: {}", self.name, e))?;

        Ok(Table {
            spec: self.clone(),
            samples,
        })
    }
}

/// Emit tables as Rust `static` arrays.
pub fn write_rust<W: Write>(out: &mut W, tables: &[Table]) -> io::Result<()> {
    writeln!(out, "// Generated by sound-wavetable. Do not edit.")?;

    for table in tables {
        let spec = &table.spec;
        writeln!(out)?;
        writeln!(
            out,
            "/// One period of {:?}, {} samples, amplitude {}.",
            spec.wave, spec.length, spec.amplitude
        )?;
        writeln!(
            out,
            "pub static {}: [u16; {}] = [",
            spec.name,
            table.samples.len()
        )?;
        for line in table.samples.chunks(SAMPLES_PER_LINE) {
            let line: Vec<String> = line.iter().map(u16::to_string).collect();
            writeln!(out, "    {},", line.join(", "))?;
        }
        writeln!(out, "];")?;
    }

    Ok(())
}

/// Emit tables back to back as little-endian `u16` words.
pub fn write_binary<W: Write>(out: &mut W, tables: &[Table]) -> io::Result<()> {
    for table in tables {
        for sample in &table.samples {
            out.write_all(&sample.to_le_bytes())?;
        }
    }
    Ok(())
}
