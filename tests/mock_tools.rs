//! End-to-end tests against mock RNAstructure executables.
//!
//! Shell scripts standing in for `Fold` / `partition` / `ProbabilityPlot`
//! write canned CT and probability-plot output, so the whole pipeline
//! (input file -> subprocess -> parse -> post-process) runs without the
//! real tool suite installed.
#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use rnastructure_rs::predict::{predict_from_fasta, predict_from_sequence, Pairing, PredictOpt};

const HAIRPIN_CT: &str = "\
    9  ENERGY = -1.2  input
    1 G       0    2    9    1
    2 G       1    3    8    2
    3 G       2    4    7    3
    4 A       3    5    0    4
    5 A       4    6    0    5
    6 A       5    7    0    6
    7 C       6    8    3    7
    8 C       7    9    2    8
    9 C       8    0    1    9
";

const PLOT: &str = "9\ni\tj\t-log10(Probability)\n1\t9\t0.0\n2\t8\t0.301029995663981\n3\t7\t1.0\n";

fn install(dir: &Path, name: &str, body: &str) {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    let mut perm = std::fs::metadata(&path).unwrap().permissions();
    perm.set_mode(0o755);
    std::fs::set_permissions(&path, perm).unwrap();
}

/// Install the three mock tools; every invocation is appended to calls.log.
fn install_mock_suite(dir: &Path) -> PathBuf {
    let log = dir.join("calls.log");
    let log_str = log.display();
    install(
        dir,
        "Fold",
        &format!("#!/bin/sh\necho \"Fold $@\" >> \"{log_str}\"\ncat > \"$2\" <<'EOF'\n{HAIRPIN_CT}EOF\n"),
    );
    install(
        dir,
        "partition",
        &format!("#!/bin/sh\necho \"partition $@\" >> \"{log_str}\"\n: > \"$2\"\n"),
    );
    install(
        dir,
        "ProbabilityPlot",
        &format!("#!/bin/sh\necho \"ProbabilityPlot $@\" >> \"{log_str}\"\ncat > \"$2\" <<'EOF'\n{PLOT}EOF\n"),
    );
    log
}

fn mock_opt(tools: &Path, temp: &Path) -> PredictOpt {
    PredictOpt {
        exe_dir: Some(tools.to_path_buf()),
        temp_dir: temp.to_path_buf(),
        ..PredictOpt::default()
    }
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn predicts_structure_and_per_base_pairing() {
    let tools = tempfile::tempdir().unwrap();
    let temp = tempfile::tempdir().unwrap();
    install_mock_suite(tools.path());

    let pred = predict_from_sequence("gggaaaccc", &mock_opt(tools.path(), temp.path())).unwrap();
    assert_eq!(pred.sequence, "GGGAAACCC");
    assert_eq!(pred.structure.as_deref(), Some("(((...)))"));
    match pred.pairing.unwrap() {
        Pairing::PerBase(v) => {
            assert_eq!(v.len(), 9);
            assert!(close(v[0], 1.0));
            assert!(close(v[1], 0.5));
            assert!(close(v[2], 0.1));
            assert!(close(v[4], 0.0));
        }
        Pairing::Matrix(_) => panic!("expected per-base vector"),
    }

    // the tool saw a two-line FASTA record
    let input = std::fs::read_to_string(temp.path().join("input.fasta")).unwrap();
    assert_eq!(input, ">input\nGGGAAACCC\n");
}

#[test]
fn matrix_option_returns_full_matrix() {
    let tools = tempfile::tempdir().unwrap();
    let temp = tempfile::tempdir().unwrap();
    install_mock_suite(tools.path());

    let opt = PredictOpt { matrix: true, ..mock_opt(tools.path(), temp.path()) };
    let pred = predict_from_sequence("GGGAAACCC", &opt).unwrap();
    match pred.pairing.unwrap() {
        Pairing::Matrix(m) => {
            assert_eq!(m.len(), 9);
            assert!(close(m[0][8], 1.0));
            assert!(close(m[8][0], 1.0));
            assert!(close(m[0][0], 0.0));
        }
        Pairing::PerBase(_) => panic!("expected matrix"),
    }
}

#[test]
fn constraints_reach_the_tool_as_lowercase_bases() {
    let tools = tempfile::tempdir().unwrap();
    let temp = tempfile::tempdir().unwrap();
    install_mock_suite(tools.path());

    let opt = PredictOpt { constraints: vec![1, 9], ..mock_opt(tools.path(), temp.path()) };
    predict_from_sequence("GGGAAACCC", &opt).unwrap();

    let input = std::fs::read_to_string(temp.path().join("input.fasta")).unwrap();
    assert_eq!(input, ">input\ngGGAAACCc\n");
}

#[test]
fn dms_signal_is_written_and_passed_to_both_tools() {
    let tools = tempfile::tempdir().unwrap();
    let temp = tempfile::tempdir().unwrap();
    let log = install_mock_suite(tools.path());

    let opt = PredictOpt { dms: Some(vec![0.5; 9]), ..mock_opt(tools.path(), temp.path()) };
    predict_from_sequence("GGGAAACCC", &opt).unwrap();

    let dms_file = std::fs::read_to_string(temp.path().join("input.dms")).unwrap();
    assert_eq!(dms_file.lines().count(), 9);
    assert!(dms_file.starts_with("1\t0.5\n"));

    let calls = std::fs::read_to_string(log).unwrap();
    let fold_call = calls.lines().find(|l| l.starts_with("Fold")).unwrap();
    let partition_call = calls.lines().find(|l| l.starts_with("partition")).unwrap();
    assert!(fold_call.contains("--DMS"));
    assert!(partition_call.contains("--DMS"));
}

#[test]
fn fasta_batch_predicts_every_record() {
    let tools = tempfile::tempdir().unwrap();
    let temp = tempfile::tempdir().unwrap();
    install_mock_suite(tools.path());

    let fasta = temp.path().join("refs.fasta");
    std::fs::write(&fasta, ">ref-b\nGGGAAACCC\n>ref-a\nGGGAAACCC\n").unwrap();

    let data = predict_from_fasta(&fasta, &mock_opt(tools.path(), temp.path())).unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(
        data.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["ref-a", "ref-b"]
    );
    for pred in data.values() {
        assert_eq!(pred.structure.as_deref(), Some("(((...)))"));
        assert!(pred.pairing.is_some());
    }
}

#[test]
fn noise_shifts_the_pairing_signal() {
    let tools = tempfile::tempdir().unwrap();
    let temp = tempfile::tempdir().unwrap();
    install_mock_suite(tools.path());

    let opt = PredictOpt {
        sequencer_noise: 0.5,
        predict_structure: false,
        ..mock_opt(tools.path(), temp.path())
    };
    let pred = predict_from_sequence("GGGAAACCC", &opt).unwrap();
    match pred.pairing.unwrap() {
        // with p = 0.5 an unpaired base at 0.0 is overwhelmingly likely to move
        Pairing::PerBase(v) => assert!(v[4] > 0.0),
        Pairing::Matrix(_) => panic!("expected per-base vector"),
    }
}

#[test]
fn structure_only_run_never_invokes_partition() {
    let tools = tempfile::tempdir().unwrap();
    let temp = tempfile::tempdir().unwrap();
    let log = install_mock_suite(tools.path());

    let opt = PredictOpt { predict_pairing: false, ..mock_opt(tools.path(), temp.path()) };
    let pred = predict_from_sequence("GGGAAACCC", &opt).unwrap();
    assert!(pred.pairing.is_none());
    assert!(pred.structure.is_some());

    let calls = std::fs::read_to_string(log).unwrap();
    assert!(!calls.contains("partition"));
    assert!(!calls.contains("ProbabilityPlot"));
}

#[test]
fn tool_failure_surfaces_name_and_stderr() {
    let tools = tempfile::tempdir().unwrap();
    let temp = tempfile::tempdir().unwrap();
    install(tools.path(), "Fold", "#!/bin/sh\necho 'thermodynamic tables not found' >&2\nexit 2\n");

    let err = predict_from_sequence("GGGAAACCC", &mock_opt(tools.path(), temp.path())).unwrap_err();
    let msg = format!("{:#}", err);
    assert!(msg.contains("Fold"), "message was: {}", msg);
    assert!(msg.contains("thermodynamic tables not found"), "message was: {}", msg);
}
