//! Buffer input: hex, base64 or raw file bytes.

use anyhow::{anyhow, Context, Result};
use base64::Engine;
use clap::ValueEnum;
use std::path::PathBuf;

/// Text encoding of a buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum InputEncoding {
    /// Hexadecimal, optional `0x` prefix
    #[value(name = "hex")]
    Hex,
    /// Standard base64 alphabet with padding
    #[value(name = "base64")]
    Base64,
}

/// Where a single buffer comes from. Exactly one source is required.
#[derive(clap::Args, Clone, Debug)]
#[group(required = true, multiple = false)]
pub struct InputOpts {
    /// Buffer as hex text
    #[arg(long)]
    pub hex: Option<String>,

    /// Buffer as base64 text
    #[arg(long)]
    pub base64: Option<String>,

    /// File holding the raw buffer bytes
    #[arg(long)]
    pub file: Option<PathBuf>,
}

impl InputOpts {
    pub fn read(&self) -> Result<Vec<u8>> {
        if let Some(text) = &self.hex {
            return decode_text(InputEncoding::Hex, text);
        }
        if let Some(text) = &self.base64 {
            return decode_text(InputEncoding::Base64, text);
        }
        if let Some(path) = &self.file {
            return std::fs::read(path)
                .with_context(|| format!("Failed to read buffer from {}", path.display()));
        }
        Err(anyhow!("No input given: use --hex, --base64 or --file"))
    }
}

/// Decode buffer text. Whitespace anywhere in the text is ignored.
pub fn decode_text(encoding: InputEncoding, text: &str) -> Result<Vec<u8>> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    match encoding {
        InputEncoding::Hex => {
            let digits = compact
                .strip_prefix("0x")
                .or_else(|| compact.strip_prefix("0X"))
                .unwrap_or(&compact);
            hex::decode(digits).context("Invalid hex input")
        }
        InputEncoding::Base64 => base64::engine::general_purpose::STANDARD
            .decode(compact.as_bytes())
            .context("Invalid base64 input"),
    }
}

/// Encode bytes as buffer text.
pub fn encode_text(encoding: InputEncoding, bytes: &[u8]) -> String {
    match encoding {
        InputEncoding::Hex => hex::encode(bytes),
        InputEncoding::Base64 => base64::engine::general_purpose::STANDARD.encode(bytes),
    }
}

/// One buffer of a batch file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEntry {
    /// 1-based line number in the batch file
    pub line: usize,
    pub bytes: Vec<u8>,
}

/// Parse a batch file: one encoded buffer per line, blank lines and lines
/// starting with `#` skipped.
pub fn parse_batch(contents: &str, encoding: InputEncoding) -> Result<Vec<BatchEntry>> {
    let mut entries = Vec::new();
    for (index, raw) in contents.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let bytes = decode_text(encoding, line)
            .with_context(|| format!("Failed to decode batch line {}", index + 1))?;
        entries.push(BatchEntry {
            line: index + 1,
            bytes,
        });
    }
    Ok(entries)
}
