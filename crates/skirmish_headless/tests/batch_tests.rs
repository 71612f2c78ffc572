//! Batch runner tests.

use skirmish_core::config::GameConfig;
use skirmish_core::map::ObstacleLayout;
use skirmish_headless::batch::{run_batch, BatchConfig, BatchResults};

fn quick_batch() -> BatchConfig {
    let mut base = GameConfig::default();
    base.max_rounds = 3;
    BatchConfig {
        base,
        layouts: vec![ObstacleLayout::Sparse, ObstacleLayout::Open],
        player_counts: vec![2, 3],
        repeats: 1,
        parallel_games: 0,
    }
}

#[test]
fn test_results_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let results = run_batch(quick_batch());
    assert_eq!(results.games.len() + results.failures.len(), 4);

    let path = BatchResults::default_path(&dir.path().join("nested"));
    results.save(&path).unwrap();
    let loaded = BatchResults::load(&path).unwrap();
    assert_eq!(loaded.games, results.games);
    assert_eq!(loaded.summary, results.summary);
}

#[test]
fn test_games_come_back_in_job_order() {
    let results = run_batch(quick_batch());
    let indices: Vec<usize> = results.games.iter().map(|g| g.job.index).collect();
    let mut sorted = indices.clone();
    sorted.sort_unstable();
    assert_eq!(indices, sorted);
}

#[test]
fn test_load_rejects_garbage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("batch.json");
    std::fs::write(&path, "{").unwrap();
    assert!(BatchResults::load(&path).is_err());
}
