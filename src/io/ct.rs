use anyhow::{anyhow, bail, Context, Result};
use std::io::BufRead;

const OPEN: [char; 4] = ['(', '[', '{', '<'];
const CLOSE: [char; 4] = [')', ']', '}', '>'];

/// One structure from a connectivity table (CT) file.
///
/// The CT format is fixed-column text: a header line whose first token is the
/// sequence length L (optionally followed by `ENERGY = <kcal/mol>` and a title),
/// then L rows of six whitespace-separated columns:
///
/// ```text
/// index  base  index-1  index+1  pair  natural-index
/// ```
///
/// Column 4 is the 1-based partner of the base in column 0, with 0 meaning
/// unpaired. A multi-structure file repeats this block; only the first
/// (minimum free energy) structure is read.
#[derive(Debug, Clone)]
pub struct CtStructure {
    pub seq: String,
    pub energy: Option<f64>,
    pub title: String,
    /// 1-based partner per base, 0 = unpaired.
    pairing: Vec<usize>,
}

impl CtStructure {
    pub fn parse<R: BufRead>(reader: R) -> Result<Self> {
        let mut lines = reader.lines();
        let header = lines
            .next()
            .ok_or_else(|| anyhow!("empty CT file"))?
            .context("cannot read CT header")?;

        let first = header
            .split_whitespace()
            .next()
            .ok_or_else(|| anyhow!("blank CT header"))?;
        let len: usize = first
            .parse()
            .with_context(|| format!("CT header must begin with the sequence length, got '{}'", first))?;
        let rest = header.trim_start()[first.len()..].trim();

        let (energy, title) = parse_header_rest(rest)?;

        let mut seq = String::with_capacity(len);
        let mut pairing = vec![0usize; len];
        for i in 1..=len {
            let line = lines
                .next()
                .ok_or_else(|| anyhow!("CT file truncated: expected {} rows, got {}", len, i - 1))?
                .context("cannot read CT row")?;
            let cols: Vec<&str> = line.split_whitespace().collect();
            if cols.len() < 6 {
                bail!("CT row {}: expected 6 columns, got {}", i, cols.len());
            }
            let idx: usize = cols[0]
                .parse()
                .with_context(|| format!("CT row {}: bad base index '{}'", i, cols[0]))?;
            if idx != i {
                bail!("CT row {}: base index is {}, expected {}", i, idx, i);
            }
            let base = cols[1];
            if base.chars().count() != 1 {
                bail!("CT row {}: bad base '{}'", i, base);
            }
            seq.push(base.chars().next().unwrap_or('N').to_ascii_uppercase());
            let pair: usize = cols[4]
                .parse()
                .with_context(|| format!("CT row {}: bad partner index '{}'", i, cols[4]))?;
            if pair > len {
                bail!("CT row {}: partner {} out of range for length {}", i, pair, len);
            }
            if pair == i {
                bail!("CT row {}: base paired with itself", i);
            }
            pairing[i - 1] = pair;
        }

        // pairing must be reciprocal
        for i in 1..=len {
            let j = pairing[i - 1];
            if j != 0 && pairing[j - 1] != i {
                bail!("CT pairing is not reciprocal: {} -> {} but {} -> {}", i, j, j, pairing[j - 1]);
            }
        }

        Ok(Self { seq, energy, title, pairing })
    }

    pub fn len(&self) -> usize {
        self.pairing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairing.is_empty()
    }

    /// Base pairs (i, j) with i < j, 1-based.
    pub fn pairs(&self) -> Vec<(usize, usize)> {
        self.pairing
            .iter()
            .enumerate()
            .filter_map(|(k, &j)| {
                let i = k + 1;
                (j > i).then_some((i, j))
            })
            .collect()
    }

    /// Render the structure in dot-bracket notation.
    ///
    /// Crossing (pseudoknotted) pairs get successive bracket classes
    /// `[]`, `{}`, `<>`; more than four classes is an error.
    pub fn dot_bracket(&self) -> Result<String> {
        let mut out: Vec<char> = vec!['.'; self.len()];
        // pairs per bracket class, used for crossing checks
        let mut levels: Vec<Vec<(usize, usize)>> = vec![Vec::new(); OPEN.len()];

        for (i, j) in self.pairs() {
            let level = levels
                .iter()
                .position(|placed| !placed.iter().any(|&(k, l)| crosses((i, j), (k, l))))
                .ok_or_else(|| {
                    anyhow!("structure needs more than {} pseudoknot bracket classes", OPEN.len())
                })?;
            levels[level].push((i, j));
            out[i - 1] = OPEN[level];
            out[j - 1] = CLOSE[level];
        }

        Ok(out.into_iter().collect())
    }
}

fn crosses((i, j): (usize, usize), (k, l): (usize, usize)) -> bool {
    (i < k && k < j && j < l) || (k < i && i < l && l < j)
}

fn parse_header_rest(rest: &str) -> Result<(Option<f64>, String)> {
    if let Some(pos) = rest.find("ENERGY") {
        let after = rest[pos + "ENERGY".len()..]
            .trim_start()
            .trim_start_matches('=')
            .trim_start();
        let mut tokens = after.split_whitespace();
        let value = tokens
            .next()
            .ok_or_else(|| anyhow!("CT header has ENERGY but no value"))?;
        let energy: f64 = value
            .parse()
            .with_context(|| format!("bad ENERGY value '{}' in CT header", value))?;
        Ok((Some(energy), tokens.collect::<Vec<_>>().join(" ")))
    } else {
        Ok((None, rest.to_string()))
    }
}
