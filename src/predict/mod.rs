pub mod engine;
pub mod noise;

use anyhow::{bail, Context, Result};
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::io::fasta::FastaReader;
use crate::util::seq;
use self::engine::RnaStructure;

/// Pairing probabilities, either one value per base (sum of the pair
/// probabilities involving that base) or the full symmetric matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Pairing {
    PerBase(Vec<f64>),
    Matrix(Vec<Vec<f64>>),
}

/// Prediction result for one sequence.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub sequence: String,
    /// Dot-bracket structure, absent when structure prediction is disabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structure: Option<String>,
    /// Pairing probabilities, absent when pairing prediction is disabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pairing: Option<Pairing>,
}

#[derive(Debug, Clone)]
pub struct PredictOpt {
    /// Directory holding the RNAstructure executables; PATH when `None`.
    pub exe_dir: Option<PathBuf>,
    /// Working directory for tool input/output files.
    pub temp_dir: PathBuf,
    pub predict_structure: bool,
    pub predict_pairing: bool,
    /// 1-based positions forced to stay unpaired (single-sequence path only).
    pub constraints: Vec<usize>,
    /// Per-base DMS reactivities handed to the tool (single-sequence path only).
    pub dms: Option<Vec<f64>>,
    /// Sequencer noise level p for binomial noise B(3000, p); 0 disables it.
    pub sequencer_noise: f64,
    /// Return the full pairing matrix instead of the per-base vector.
    pub matrix: bool,
}

impl Default for PredictOpt {
    fn default() -> Self {
        Self {
            exe_dir: None,
            temp_dir: PathBuf::from("temp"),
            predict_structure: true,
            predict_pairing: true,
            constraints: Vec::new(),
            dms: None,
            sequencer_noise: 0.0,
            matrix: false,
        }
    }
}

/// Predict structure and pairing probability for a single sequence.
pub fn predict_from_sequence(sequence: &str, opt: &PredictOpt) -> Result<Prediction> {
    let normalized = seq::normalize(sequence);
    if normalized.is_empty() {
        bail!("sequence must not be empty");
    }

    let rna = RnaStructure::new(opt.exe_dir.clone(), &opt.temp_dir)?;
    let tool_input = seq::mark_unpaired(&normalized, &opt.constraints)?;
    let dms = opt.dms.as_deref();
    if let Some(signal) = dms {
        if signal.len() != normalized.len() {
            bail!(
                "DMS signal has {} values for a sequence of length {}",
                signal.len(),
                normalized.len()
            );
        }
    }

    let structure = if opt.predict_structure {
        Some(rna.predict_structure(&tool_input, dms)?)
    } else {
        None
    };
    let pairing = if opt.predict_pairing {
        let raw = rna.predict_pairing(&tool_input, dms, opt.matrix)?;
        Some(apply_noise(raw, opt.sequencer_noise, &mut rand::thread_rng())?)
    } else {
        None
    };

    Ok(Prediction { sequence: normalized, structure, pairing })
}

/// Predict every record of a FASTA file, keyed by reference id.
pub fn predict_from_fasta(
    fasta_file: impl AsRef<Path>,
    opt: &PredictOpt,
) -> Result<BTreeMap<String, Prediction>> {
    let path = fasta_file.as_ref();
    let fh = std::fs::File::open(path)
        .with_context(|| format!("cannot open FASTA '{}'", path.display()))?;
    let mut reader = FastaReader::new(std::io::BufReader::new(fh));

    let rna = RnaStructure::new(opt.exe_dir.clone(), &opt.temp_dir)?;
    let mut out: BTreeMap<String, Prediction> = BTreeMap::new();
    while let Some(rec) = reader.next_record()? {
        if rec.seq.is_empty() {
            bail!("FASTA record '{}' has an empty sequence", rec.id);
        }
        log::info!("predicting structure for '{}' ({} nt)", rec.id, rec.seq.len());
        let structure = if opt.predict_structure {
            Some(rna.predict_structure(&rec.seq, None).with_context(|| format!("prediction failed for '{}'", rec.id))?)
        } else {
            None
        };
        let pairing = if opt.predict_pairing {
            let raw = rna
                .predict_pairing(&rec.seq, None, opt.matrix)
                .with_context(|| format!("prediction failed for '{}'", rec.id))?;
            Some(apply_noise(raw, opt.sequencer_noise, &mut rand::thread_rng())?)
        } else {
            None
        };
        out.insert(rec.id, Prediction { sequence: rec.seq, structure, pairing });
    }

    if out.is_empty() {
        bail!("FASTA file '{}' contains no sequences", path.display());
    }
    Ok(out)
}

fn apply_noise<R: Rng>(pairing: Pairing, p: f64, rng: &mut R) -> Result<Pairing> {
    if p <= 0.0 {
        return Ok(pairing);
    }
    match pairing {
        Pairing::PerBase(v) => Ok(Pairing::PerBase(noise::add_binomial_noise(
            &v,
            noise::NOISE_TRIALS,
            p,
            rng,
        )?)),
        Pairing::Matrix(rows) => {
            let noisy = rows
                .iter()
                .map(|row| noise::add_binomial_noise(row, noise::NOISE_TRIALS, p, rng))
                .collect::<Result<Vec<_>>>()?;
            Ok(Pairing::Matrix(noisy))
        }
    }
}
