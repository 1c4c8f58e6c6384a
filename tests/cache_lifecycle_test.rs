use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tempfile::TempDir;

use lexidx::{CacheOutcome, Dictionary, DictionaryState, EngineConfig, Normalizer, PlainTextFormat, StageConfig};

const SOURCE: &str = "apple\ta red fruit\napple\tthe company\npear\ta green fruit\n";

fn dictionary(stages: StageConfig) -> Dictionary {
    Dictionary::new("en", Arc::new(PlainTextFormat), Arc::new(Normalizer::new(stages)))
}

fn set_mtime(path: &Path, time: SystemTime) {
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(time)
        .unwrap();
}

fn setup() -> (TempDir, std::path::PathBuf, std::path::PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("en.tsv");
    fs::write(&source, SOURCE).unwrap();
    let index = temp_dir.path().join("en.tsv.index");
    (temp_dir, source, index)
}

#[test]
fn test_first_enable_builds_then_reloads() -> lexidx::Result<()> {
    let (_dir, source, index) = setup();

    let first = dictionary(StageConfig::none());
    assert_eq!(first.try_enable(&source)?, CacheOutcome::Rebuilt);
    assert!(index.exists());

    let second = dictionary(StageConfig::none());
    assert_eq!(second.try_enable(&source)?, CacheOutcome::Loaded);
    assert_eq!(second.query("apple").len(), 2);
    Ok(())
}

#[test]
fn test_index_older_than_source_is_rebuilt() -> lexidx::Result<()> {
    let (_dir, source, index) = setup();
    dictionary(StageConfig::none()).try_enable(&source)?;

    // 1. The source is edited after the index was written
    let now = SystemTime::now();
    set_mtime(&index, now - Duration::from_secs(60));
    fs::write(&source, "kiwi\ta brown fruit\n")?;
    set_mtime(&source, now);

    // 2. Enabling takes the rebuild path and sees the new content
    let dict = dictionary(StageConfig::none());
    assert_eq!(dict.try_enable(&source)?, CacheOutcome::Rebuilt);
    assert!(dict.query("apple").is_empty());
    assert_eq!(dict.query("kiwi")[0].result_text, "a brown fruit");
    Ok(())
}

#[test]
fn test_index_with_equal_mtime_is_loaded() -> lexidx::Result<()> {
    let (_dir, source, index) = setup();
    dictionary(StageConfig::none()).try_enable(&source)?;

    let time = SystemTime::now() - Duration::from_secs(3600);
    set_mtime(&source, time);
    set_mtime(&index, time);

    assert_eq!(dictionary(StageConfig::none()).try_enable(&source)?, CacheOutcome::Loaded);
    Ok(())
}

#[test]
fn test_corrupt_index_is_rebuilt() -> lexidx::Result<()> {
    let (_dir, source, index) = setup();
    fs::write(&index, b"LXIX but not really an index")?;
    set_mtime(&index, SystemTime::now() + Duration::from_secs(60));

    let dict = dictionary(StageConfig::none());
    assert_eq!(dict.try_enable(&source)?, CacheOutcome::RecoveredByRebuild);
    assert_eq!(dict.query("pear")[0].result_text, "a green fruit");

    // The rewritten file is valid again.
    let again = dictionary(StageConfig::none());
    assert_eq!(again.try_enable(&source)?, CacheOutcome::Loaded);
    Ok(())
}

#[test]
fn test_changed_stages_force_rebuild() -> lexidx::Result<()> {
    let (_dir, source, _index) = setup();
    dictionary(StageConfig::none()).try_enable(&source)?;

    let folding = dictionary(StageConfig { case_folding: true, ..StageConfig::none() });
    assert_eq!(folding.try_enable(&source)?, CacheOutcome::RecoveredByRebuild);
    assert_eq!(folding.query("APPLE").len(), 2);
    Ok(())
}

#[test]
fn test_swapped_conversion_table_forces_rebuild() -> lexidx::Result<()> {
    // 1. A source and two conversion tables
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("zh.tsv");
    let full = temp_dir.path().join("full.txt");
    let partial = temp_dir.path().join("partial.txt");
    fs::write(&source, "漢語\tChinese\n")?;
    fs::write(&full, "漢\t汉\n語\t语\n")?;
    fs::write(&partial, "漢\t汉\n")?;

    let with_table = |table: &Path| -> lexidx::Result<Dictionary> {
        let config = EngineConfig::builder()
            .stages(StageConfig { script_conversion: true, ..StageConfig::none() })
            .conversion_table(table)
            .build()?;
        Ok(Dictionary::new(
            "zh",
            Arc::new(PlainTextFormat),
            Arc::new(Normalizer::from_config(&config)),
        ))
    };

    // 2. Build with the full table, reload with the same one
    assert_eq!(with_table(&full)?.try_enable(&source)?, CacheOutcome::Rebuilt);
    assert_eq!(with_table(&full)?.try_enable(&source)?, CacheOutcome::Loaded);

    // 3. Another table must not reuse keys converted by the first
    let dict = with_table(&partial)?;
    assert_eq!(dict.try_enable(&source)?, CacheOutcome::RecoveredByRebuild);
    let mut keys = Vec::new();
    dict.for_each_key(|key, _| keys.push(key.to_string()));
    assert_eq!(keys, vec!["汉語"]);
    assert_eq!(dict.query("漢語").len(), 1);
    Ok(())
}

#[test]
fn test_missing_source_stays_unloaded() {
    let (dir, _source, index) = setup();
    let dict = dictionary(StageConfig::none());

    assert!(!dict.enable(dir.path().join("missing.tsv")));
    assert_eq!(dict.state(), DictionaryState::Unloaded);
    assert!(!index.exists());
}

#[test]
fn test_unwritable_index_keeps_memory_copy() {
    let (_dir, source, index) = setup();
    // A directory in the index's place makes the final rename fail.
    fs::create_dir(&index).unwrap();

    let dict = dictionary(StageConfig::none());
    assert!(dict.enable(&source));
    assert_eq!(dict.query("apple").len(), 2);
    assert!(index.is_dir());
}

#[test]
fn test_disable_releases_index() -> lexidx::Result<()> {
    let (_dir, source, _index) = setup();
    let dict = dictionary(StageConfig::none());
    dict.try_enable(&source)?;
    assert!(dict.stats().index.is_some());

    dict.disable();
    assert_eq!(dict.state(), DictionaryState::Unloaded);
    assert!(dict.stats().index.is_none());
    assert!(dict.query("apple").is_empty());

    // Disabling twice is harmless and the dictionary can come back.
    dict.disable();
    assert_eq!(dict.try_enable(&source)?, CacheOutcome::Loaded);
    Ok(())
}
