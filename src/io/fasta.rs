use anyhow::{bail, Context, Result};
use std::io::BufRead;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct FastaRecord {
    /// Full header line after '>', trimmed. Used as the reference id.
    pub id: String,
    /// Uppercased sequence with all whitespace removed.
    pub seq: String,
}

pub struct FastaReader<R: BufRead> {
    reader: R,
    buf: String,
    done: bool,
    peek_header: Option<String>,
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::new(),
            done: false,
            peek_header: None,
        }
    }

    pub fn next_record(&mut self) -> Result<Option<FastaRecord>> {
        if self.done {
            return Ok(None);
        }

        // Find header line
        let header = if let Some(h) = self.peek_header.take() {
            h
        } else {
            loop {
                self.buf.clear();
                let n = self.reader.read_line(&mut self.buf)?;
                if n == 0 {
                    self.done = true;
                    return Ok(None);
                }
                if self.buf.trim().is_empty() {
                    continue;
                }
                if !self.buf.starts_with('>') {
                    bail!(
                        "FASTA record header must start with '>', got: {}",
                        self.buf.trim_end()
                    );
                }
                break self.buf[1..].trim().to_string();
            }
        };

        // Read sequence lines
        let mut seq = String::new();
        loop {
            self.buf.clear();
            let n = self.reader.read_line(&mut self.buf)?;
            if n == 0 {
                self.done = true;
                break;
            }
            if self.buf.starts_with('>') {
                self.peek_header = Some(self.buf[1..].trim().to_string());
                break;
            }
            for c in self.buf.chars() {
                if !c.is_whitespace() {
                    seq.push(c.to_ascii_uppercase());
                }
            }
        }

        Ok(Some(FastaRecord { id: header, seq }))
    }
}

/// Write a single two-line FASTA record, the input format the external tool expects.
pub fn write_record(path: &Path, id: &str, seq: &str) -> Result<()> {
    std::fs::write(path, format!(">{}\n{}\n", id, seq))
        .with_context(|| format!("cannot write FASTA '{}'", path.display()))
}
