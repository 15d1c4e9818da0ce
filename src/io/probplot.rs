use anyhow::{anyhow, bail, Context, Result};
use std::io::BufRead;

/// Parsed text probability plot (`ProbabilityPlot -t` output).
///
/// The file starts with the sequence length, then a column header, then one
/// `i  j  -log10(probability)` row per pair with non-negligible probability:
///
/// ```text
/// 170
/// i	j	-log10(Probability)
/// 1	20	2.31
/// ...
/// ```
#[derive(Debug, Clone)]
pub struct ProbPlot {
    len: usize,
    /// (i, j, probability) with i < j, 1-based.
    entries: Vec<(usize, usize, f64)>,
}

impl ProbPlot {
    pub fn parse<R: BufRead>(reader: R) -> Result<Self> {
        let mut lines = reader.lines();
        let first = lines
            .next()
            .ok_or_else(|| anyhow!("empty probability plot file"))?
            .context("cannot read probability plot header")?;
        let len: usize = first
            .trim()
            .parse()
            .with_context(|| format!("probability plot must begin with the sequence length, got '{}'", first.trim()))?;

        let columns = lines
            .next()
            .ok_or_else(|| anyhow!("probability plot missing column header"))?
            .context("cannot read probability plot column header")?;
        if !columns.contains("log10") {
            bail!("unexpected probability plot column header: {}", columns.trim_end());
        }

        let mut entries = Vec::new();
        let mut seen = std::collections::HashSet::new();
        for (lineno, line) in lines.enumerate() {
            let line = line.context("cannot read probability plot row")?;
            if line.trim().is_empty() {
                continue;
            }
            let cols: Vec<&str> = line.split_whitespace().collect();
            if cols.len() != 3 {
                bail!("probability plot row {}: expected 3 columns, got {}", lineno + 3, cols.len());
            }
            let i: usize = cols[0].parse().with_context(|| format!("bad index '{}'", cols[0]))?;
            let j: usize = cols[1].parse().with_context(|| format!("bad index '{}'", cols[1]))?;
            let neg_log: f64 = cols[2].parse().with_context(|| format!("bad value '{}'", cols[2]))?;
            if i == 0 || j == 0 || i > len || j > len || i == j {
                bail!("probability plot row {}: pair ({}, {}) out of range for length {}", lineno + 3, i, j, len);
            }
            if !neg_log.is_finite() || neg_log < 0.0 {
                bail!("probability plot row {}: bad -log10 value {}", lineno + 3, neg_log);
            }
            let (i, j) = if i < j { (i, j) } else { (j, i) };
            if !seen.insert((i, j)) {
                bail!("probability plot row {}: duplicate pair ({}, {})", lineno + 3, i, j);
            }
            entries.push((i, j, 10f64.powf(-neg_log)));
        }

        Ok(Self { len, entries })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Per-base pairing probability: entry k sums the probabilities of every
    /// pair involving base k+1.
    pub fn per_base(&self) -> Vec<f64> {
        let mut out = vec![0.0; self.len];
        for &(i, j, p) in &self.entries {
            out[i - 1] += p;
            out[j - 1] += p;
        }
        out
    }

    /// Symmetric L x L pair-probability matrix with a zero diagonal.
    pub fn matrix(&self) -> Vec<Vec<f64>> {
        let mut out = vec![vec![0.0; self.len]; self.len];
        for &(i, j, p) in &self.entries {
            out[i - 1][j - 1] = p;
            out[j - 1][i - 1] = p;
        }
        out
    }
}
