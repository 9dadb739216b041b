use anyhow::{Context, Result};
use std::convert::Infallible;
use std::fs;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::str::FromStr;

/// Where `--content` / `--composepath` data comes from: `-` for stdin,
/// anything else is a file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    Stdin,
    File(PathBuf),
}

impl FromStr for ContentSource {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(if s == "-" {
            ContentSource::Stdin
        } else {
            ContentSource::File(PathBuf::from(s))
        })
    }
}

impl ContentSource {
    pub fn read(&self) -> Result<Vec<u8>> {
        match self {
            ContentSource::Stdin => {
                read_crlf_lines(io::stdin().lock()).context("failed to read standard input")
            }
            ContentSource::File(path) => {
                fs::read(path).with_context(|| format!("failed to read {}", path.display()))
            }
        }
    }

    pub fn read_to_string(&self) -> Result<String> {
        let bytes = self.read()?;
        String::from_utf8(bytes).with_context(|| format!("{self} is not valid UTF-8"))
    }
}

impl std::fmt::Display for ContentSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentSource::Stdin => write!(f, "standard input"),
            ContentSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Reads line by line and re-joins with CRLF after every line, including the
/// last one. Bytes are passed through untouched, so input need not be UTF-8.
pub fn read_crlf_lines<R: BufRead>(reader: R) -> io::Result<Vec<u8>> {
    let mut content = Vec::new();
    for line in reader.split(b'\n') {
        let line = line?;
        content.extend_from_slice(line.strip_suffix(b"\r").unwrap_or(&line));
        content.extend_from_slice(b"\r\n");
    }
    Ok(content)
}
