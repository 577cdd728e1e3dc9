use std::io::Write;

use glyph_operator::cli::commands::init::{self, InitArgs};
use glyph_operator::domain::models::Config;
use glyph_operator::infrastructure::config::{ConfigLoader, CONFIG_DIR, CONFIG_FILE};
use tempfile::NamedTempFile;

#[test]
fn test_env_overrides_defaults() {
    temp_env::with_vars(
        [
            ("GLYPH_SAMPLING__LEVELS", Some("6")),
            ("GLYPH_PEAKS__PROMINENCE_MIN", Some("0.2")),
            ("GLYPH_LOGGING__FORMAT", Some("json")),
        ],
        || {
            let config = ConfigLoader::load().unwrap();
            assert_eq!(config.sampling.levels, 6);
            assert!((config.peaks.prominence_min - 0.2).abs() < f64::EPSILON);
            assert_eq!(config.logging.format, "json");
            assert_eq!(config.sampling.grid, 8);
        },
    );
}

#[test]
fn test_invalid_env_value_is_rejected() {
    temp_env::with_var("GLYPH_SAMPLING__GRID", Some("0"), || {
        assert!(ConfigLoader::load().is_err());
    });
}

#[test]
fn test_load_from_file_merges_over_defaults() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "sampling:\n  top_motifs: 5\n  adaptive_cadence:\n    enabled: true\nworker:\n  concurrency: 8"
    )
    .unwrap();
    file.flush().unwrap();

    let config = ConfigLoader::load_from_file(file.path()).unwrap();
    assert_eq!(config.sampling.top_motifs, 5);
    assert!(config.sampling.adaptive_cadence.enabled);
    assert_eq!(config.worker.concurrency, 8);
    assert_eq!(config.worker.queue_depth, 32);
    assert_eq!(config.evidence.min_persistence, 2);
}

#[test]
fn test_load_from_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = ConfigLoader::load_from_file(dir.path().join("absent.yaml")).unwrap();
    assert_eq!(config, Config::default());
}

#[tokio::test]
async fn test_init_writes_loadable_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let args = || InitArgs {
        force: false,
        path: dir.path().to_path_buf(),
    };

    init::execute(args(), true).await.unwrap();
    let path = dir.path().join(CONFIG_DIR).join(CONFIG_FILE);
    assert_eq!(ConfigLoader::load_from_file(&path).unwrap(), Config::default());

    // a second run without --force leaves the edited file alone
    std::fs::write(&path, "sampling:\n  levels: 2\n").unwrap();
    init::execute(args(), true).await.unwrap();
    assert_eq!(ConfigLoader::load_from_file(&path).unwrap().sampling.levels, 2);

    init::execute(InitArgs { force: true, ..args() }, true).await.unwrap();
    assert_eq!(ConfigLoader::load_from_file(&path).unwrap().sampling.levels, 4);
}
