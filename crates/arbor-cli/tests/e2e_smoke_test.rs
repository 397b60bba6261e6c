use std::{fs, path::PathBuf};

use tempfile::tempdir;

use arbor_cli::{Args, run};

/// Demo descriptions live at the workspace root.
fn demos_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("demos")
}

/// Collects all .toml files from a directory, sorted.
fn collect_toml_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = fs::read_dir(&dir)
        .map(|entries| {
            entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| {
                    path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("toml")
                })
                .collect()
        })
        .unwrap_or_default();

    files.sort();
    files
}

fn args_for(input: &PathBuf, output: PathBuf) -> Args {
    Args {
        input: input.to_string_lossy().to_string(),
        output: Some(output.to_string_lossy().to_string()),
        config: None,
        log_level: "off".to_string(),
    }
}

#[test]
fn e2e_smoke_test_valid_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let demos = collect_toml_files(demos_dir());
    assert!(!demos.is_empty(), "No demos found in demos/");

    let mut failed = Vec::new();
    for demo in &demos {
        let output = temp_dir
            .path()
            .join(format!("{}.svg", demo.file_stem().unwrap().to_string_lossy()));

        match run(&args_for(demo, output.clone())) {
            Ok(()) => {
                let svg = fs::read_to_string(&output).expect("artifact written");
                assert!(svg.contains("<svg"), "{} is not an SVG", output.display());
                assert!(svg.contains("</svg>"), "{} is truncated", output.display());
            }
            Err(err) => failed.push((demo.clone(), err)),
        }
    }

    if !failed.is_empty() {
        for (path, err) in &failed {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} valid demo(s) failed unexpectedly", failed.len());
    }
}

#[test]
fn e2e_smoke_test_error_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let demos = collect_toml_files(demos_dir().join("errors"));
    assert!(!demos.is_empty(), "No error demos found in demos/errors/");

    let mut unexpectedly_succeeded = Vec::new();
    for demo in &demos {
        let output = temp_dir.path().join(format!(
            "error_{}.svg",
            demo.file_stem().unwrap().to_string_lossy()
        ));

        if run(&args_for(demo, output.clone())).is_ok() {
            unexpectedly_succeeded.push(demo.clone());
        }
        assert!(!output.exists(), "{} left an artifact", demo.display());
    }

    if !unexpectedly_succeeded.is_empty() {
        for path in &unexpectedly_succeeded {
            eprintln!("  - {}", path.display());
        }
        panic!(
            "{} error demo(s) succeeded unexpectedly",
            unexpectedly_succeeded.len()
        );
    }
}

#[test]
fn e2e_error_demos_report_their_tag() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let errors = demos_dir().join("errors");

    for (file, code) in [
        ("duplicate_id.toml", "arbor::duplicate_id"),
        ("unknown_reference.toml", "arbor::reference"),
        ("bad_direction.toml", "arbor::configuration"),
        ("short_chain.toml", "arbor::configuration"),
    ] {
        let err = run(&args_for(&errors.join(file), temp_dir.path().join("out.svg")))
            .expect_err(file);
        assert_eq!(err.code(), code, "{file}");
    }
}
