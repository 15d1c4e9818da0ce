use anyhow::{bail, Context, Result};
use std::fmt::Write as _;
use std::path::PathBuf;
use std::process::Command;

use crate::io::ct::CtStructure;
use crate::io::fasta;
use crate::io::probplot::ProbPlot;
use crate::predict::Pairing;

/// Driver for the external RNAstructure executables.
///
/// All tool input and output files live in `temp_dir`; one subprocess runs at
/// a time. With no executable directory the tools are resolved from PATH.
pub struct RnaStructure {
    exe_dir: Option<PathBuf>,
    temp_dir: PathBuf,
}

impl RnaStructure {
    pub fn new(exe_dir: Option<PathBuf>, temp_dir: impl Into<PathBuf>) -> Result<Self> {
        let temp_dir = temp_dir.into();
        std::fs::create_dir_all(&temp_dir)
            .with_context(|| format!("cannot create temp directory '{}'", temp_dir.display()))?;
        Ok(Self { exe_dir, temp_dir })
    }

    /// Run `Fold` and return the predicted structure in dot-bracket notation.
    pub fn predict_structure(&self, seq: &str, dms: Option<&[f64]>) -> Result<String> {
        let fa = self.write_input(seq)?;
        let ct_path = self.temp_dir.join("output.ct");

        let mut cmd = Command::new(self.exe("Fold"));
        cmd.arg(&fa).arg(&ct_path);
        if let Some(signal) = dms {
            cmd.arg("--DMS").arg(self.write_dms(seq.len(), signal)?);
        }
        self.run("Fold", cmd)?;

        let fh = std::fs::File::open(&ct_path)
            .with_context(|| format!("Fold produced no CT file at '{}'", ct_path.display()))?;
        let ct = CtStructure::parse(std::io::BufReader::new(fh))
            .with_context(|| format!("cannot parse CT file '{}'", ct_path.display()))?;
        ct.dot_bracket()
    }

    /// Run `partition` then `ProbabilityPlot -t` and return the pairing
    /// probabilities, per base or as a full matrix.
    pub fn predict_pairing(&self, seq: &str, dms: Option<&[f64]>, matrix: bool) -> Result<Pairing> {
        let fa = self.write_input(seq)?;
        let pfs_path = self.temp_dir.join("output.pfs");
        let txt_path = self.temp_dir.join("output_prob.txt");

        let mut cmd = Command::new(self.exe("partition"));
        cmd.arg(&fa).arg(&pfs_path);
        if let Some(signal) = dms {
            cmd.arg("--DMS").arg(self.write_dms(seq.len(), signal)?);
        }
        self.run("partition", cmd)?;

        let mut cmd = Command::new(self.exe("ProbabilityPlot"));
        cmd.arg(&pfs_path).arg(&txt_path).arg("-t");
        self.run("ProbabilityPlot", cmd)?;

        let fh = std::fs::File::open(&txt_path).with_context(|| {
            format!("ProbabilityPlot produced no text file at '{}'", txt_path.display())
        })?;
        let plot = ProbPlot::parse(std::io::BufReader::new(fh))
            .with_context(|| format!("cannot parse probability plot '{}'", txt_path.display()))?;

        Ok(if matrix {
            Pairing::Matrix(plot.matrix())
        } else {
            Pairing::PerBase(plot.per_base())
        })
    }

    fn exe(&self, name: &str) -> PathBuf {
        match &self.exe_dir {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        }
    }

    fn run(&self, name: &str, mut cmd: Command) -> Result<()> {
        log::debug!("running {:?}", cmd);
        let out = cmd.output().with_context(|| {
            format!("cannot launch '{}' (is RNAstructure installed and on PATH?)", cmd.get_program().to_string_lossy())
        })?;
        if !out.status.success() {
            bail!(
                "{} exited with {}: {}",
                name,
                out.status,
                String::from_utf8_lossy(&out.stderr).trim()
            );
        }
        Ok(())
    }

    fn write_input(&self, seq: &str) -> Result<PathBuf> {
        let fa = self.temp_dir.join("input.fasta");
        fasta::write_record(&fa, "input", seq)?;
        Ok(fa)
    }

    /// DMS reactivity file: one `position  value` pair per line, 1-based.
    fn write_dms(&self, seq_len: usize, signal: &[f64]) -> Result<PathBuf> {
        if signal.len() != seq_len {
            bail!("DMS signal has {} values for a sequence of length {}", signal.len(), seq_len);
        }
        let mut body = String::new();
        for (i, v) in signal.iter().enumerate() {
            let _ = writeln!(body, "{}\t{}", i + 1, v);
        }
        let path = self.temp_dir.join("input.dms");
        std::fs::write(&path, body)
            .with_context(|| format!("cannot write DMS file '{}'", path.display()))?;
        Ok(path)
    }

    #[cfg(test)]
    pub(crate) fn temp_dir(&self) -> &std::path::Path {
        &self.temp_dir
    }
}
