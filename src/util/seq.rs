use anyhow::{bail, Context, Result};

/// Uppercase a raw sequence and drop any whitespace.
pub fn normalize(seq: &str) -> String {
    seq.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Lowercase the bases at the given 1-based positions.
///
/// RNAstructure treats lowercase nucleotides as forced single-stranded, so
/// this is how unpaired constraints reach the external tool.
pub fn mark_unpaired(seq: &str, constraints: &[usize]) -> Result<String> {
    if constraints.is_empty() {
        return Ok(seq.to_string());
    }
    let mut bytes = seq.as_bytes().to_vec();
    for &pos in constraints {
        if pos == 0 || pos > bytes.len() {
            bail!("constraint position {} out of range for sequence of length {}", pos, bytes.len());
        }
        bytes[pos - 1] = bytes[pos - 1].to_ascii_lowercase();
    }
    String::from_utf8(bytes).context("sequence is not ASCII")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_uppercases_and_strips_whitespace() {
        assert_eq!(normalize("ac gu\nT"), "ACGUT");
    }

    #[test]
    fn mark_unpaired_lowercases_positions() {
        assert_eq!(mark_unpaired("GGGAAACCC", &[1, 9]).unwrap(), "gGGAAACCc");
    }

    #[test]
    fn mark_unpaired_without_constraints_is_identity() {
        assert_eq!(mark_unpaired("ACGU", &[]).unwrap(), "ACGU");
    }

    #[test]
    fn mark_unpaired_rejects_out_of_range() {
        assert!(mark_unpaired("ACGU", &[0]).is_err());
        assert!(mark_unpaired("ACGU", &[5]).is_err());
    }
}
