use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use rnastructure_rs::predict::{predict_from_fasta, predict_from_sequence, PredictOpt};

#[derive(Parser, Debug)]
#[command(
    name = "rnastructure-rs",
    author,
    version,
    about = "Thin wrapper around the RNAstructure executables",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Predict every record of a FASTA file
    Predict {
        /// Input FASTA file
        fasta: String,
        /// Directory holding the RNAstructure executables (PATH if omitted)
        #[arg(short, long)]
        path: Option<PathBuf>,
        /// Working directory for tool input/output files
        #[arg(long, default_value = "temp")]
        temp_dir: PathBuf,
        /// Sequencer noise level p for binomial noise B(3000, p)
        #[arg(long, default_value_t = 0.0)]
        noise: f64,
        /// Skip the dot-bracket structure prediction
        #[arg(long)]
        no_structure: bool,
        /// Skip the pairing-probability prediction
        #[arg(long)]
        no_pairing: bool,
        /// Output JSON path (stdout if omitted)
        #[arg(short, long)]
        out: Option<String>,
    },
    /// Predict a single sequence given on the command line
    Fold {
        /// RNA sequence
        sequence: String,
        /// Directory holding the RNAstructure executables (PATH if omitted)
        #[arg(short, long)]
        path: Option<PathBuf>,
        /// Working directory for tool input/output files
        #[arg(long, default_value = "temp")]
        temp_dir: PathBuf,
        /// 1-based position forced to stay unpaired (repeatable)
        #[arg(short = 'c', long = "constraint")]
        constraints: Vec<usize>,
        /// File of per-base DMS reactivities, whitespace separated
        #[arg(long)]
        dms: Option<PathBuf>,
        /// Emit the full pairing matrix instead of the per-base vector
        #[arg(long)]
        matrix: bool,
        /// Sequencer noise level p for binomial noise B(3000, p)
        #[arg(long, default_value_t = 0.0)]
        noise: f64,
        /// Skip the dot-bracket structure prediction
        #[arg(long)]
        no_structure: bool,
        /// Skip the pairing-probability prediction
        #[arg(long)]
        no_pairing: bool,
        /// Output JSON path (stdout if omitted)
        #[arg(short, long)]
        out: Option<String>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Predict {
            fasta,
            path,
            temp_dir,
            noise,
            no_structure,
            no_pairing,
            out,
        } => {
            let opt = PredictOpt {
                exe_dir: path,
                temp_dir,
                predict_structure: !no_structure,
                predict_pairing: !no_pairing,
                sequencer_noise: noise,
                ..PredictOpt::default()
            };
            let data = predict_from_fasta(&fasta, &opt)?;
            write_json(&data, out.as_deref())
        }
        Commands::Fold {
            sequence,
            path,
            temp_dir,
            constraints,
            dms,
            matrix,
            noise,
            no_structure,
            no_pairing,
            out,
        } => {
            let dms = dms.as_deref().map(read_dms).transpose()?;
            let opt = PredictOpt {
                exe_dir: path,
                temp_dir,
                predict_structure: !no_structure,
                predict_pairing: !no_pairing,
                constraints,
                dms,
                sequencer_noise: noise,
                matrix,
            };
            let pred = predict_from_sequence(&sequence, &opt)?;
            write_json(&pred, out.as_deref())
        }
    }
}

fn read_dms(path: &Path) -> Result<Vec<f64>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read DMS file '{}'", path.display()))?;
    text.split_whitespace()
        .map(|t| {
            t.parse::<f64>()
                .map_err(|e| anyhow!("invalid DMS value '{}': {}", t, e))
        })
        .collect()
}

fn write_json<T: serde::Serialize>(value: &T, out: Option<&str>) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    match out {
        Some(p) => std::fs::write(p, text + "\n")
            .map_err(|e| anyhow!("cannot write output to '{}': {}", p, e))?,
        None => println!("{}", text),
    }
    Ok(())
}
