use std::{fs, path::PathBuf};

use reflex_arcade_core::{BestScores, Difficulty};
use reflex_arcade_persistence::{BestScoreStore, JsonFileStore, StoreError};

fn scratch_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "reflex-arcade-persistence-{}-{name}",
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    dir.join("scores").join("best.json")
}

#[test]
fn missing_file_loads_as_empty_table() {
    let store = JsonFileStore::new(scratch_path("missing"));
    assert_eq!(store.load().expect("missing is fine"), BestScores::default());
}

#[test]
fn save_creates_parent_directories_and_round_trips() {
    let path = scratch_path("round-trip");
    let mut store = JsonFileStore::new(&path);
    let mut scores = BestScores::default();
    let _ = scores.reconcile(Difficulty::Hard, 50);

    store.save(&scores).expect("save");
    assert!(path.exists());

    let reopened = JsonFileStore::new(&path);
    assert_eq!(reopened.load().expect("load").get(Difficulty::Hard), 50);
}

#[test]
fn corrupt_file_is_reported() {
    let path = scratch_path("corrupt");
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(&path, "definitely not json").expect("write");

    let store = JsonFileStore::new(&path);
    assert!(matches!(
        store.load(),
        Err(StoreError::CorruptPersistedState(_))
    ));
}
