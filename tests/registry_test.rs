use std::fs;
use std::thread;
use std::time::{Duration, Instant};

use tempfile::TempDir;

use lexidx::{DictRegistry, DictionaryConfig, EngineConfig, StageConfig};

#[test]
fn test_registry_from_json_config() -> lexidx::Result<()> {
    // 1. Two sources on disk
    let temp_dir = TempDir::new().unwrap();
    let en = temp_dir.path().join("en.tsv");
    let de = temp_dir.path().join("de.tsv");
    fs::write(&en, "apple\ta fruit\n")?;
    fs::write(&de, "Apfel\tapple\näpfel\tapples\n")?;

    // 2. Configure the engine
    let config = EngineConfig::builder()
        .stages(StageConfig {
            accent_stripping: true,
            case_folding: true,
            ..StageConfig::none()
        })
        .add_dictionary(DictionaryConfig::new("en", &en))
        .add_dictionary(DictionaryConfig::new("de", &de))
        .build()?;
    let json = serde_json::to_string(&config)?;
    let config = EngineConfig::from_json_str(&json)?;

    // 3. Enable and query
    let registry = DictRegistry::from_config(&config)?;
    let events = registry.enable_configured(&config);
    assert!(events.iter().all(|e| e.enabled));

    let results = registry.query("APFEL");
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.origin_engine == "de"));

    let results = registry.query("apple");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].origin_engine, "en");
    Ok(())
}

#[test]
fn test_queries_during_background_enable() -> lexidx::Result<()> {
    // 1. A small dictionary and a large one
    let temp_dir = TempDir::new().unwrap();
    let small = temp_dir.path().join("small.tsv");
    let large = temp_dir.path().join("large.tsv");
    fs::write(&small, "zeta\tlast letter\n")?;
    let mut contents = String::new();
    for i in 0..300_000 {
        contents.push_str(&format!("word{}\tdefinition {}\n", i, i));
    }
    fs::write(&large, contents)?;

    let config = EngineConfig::builder()
        .add_dictionary(DictionaryConfig::new("small", &small))
        .add_dictionary(DictionaryConfig::new("large", &large))
        .build()?;
    let registry = DictRegistry::from_config(&config)?;
    assert!(registry.get("small").unwrap().enable(&small));

    // 2. Start building the large one and wait until it holds its lock
    let large_dict = registry.get("large").unwrap();
    let events = registry.enable_in_background("large", &large)?;
    let deadline = Instant::now() + Duration::from_secs(60);
    while large_dict.try_query("word0").is_some() {
        assert!(events.is_empty(), "enable finished before it could be observed");
        assert!(Instant::now() < deadline);
        thread::yield_now();
    }

    // 3. The small dictionary answers while the build is still running
    let results = registry.query("zeta");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].origin_engine, "small");
    assert!(events.is_empty(), "registry query waited for the background enable");

    // 4. Once enabled, the large dictionary answers too
    let event = events.recv_timeout(Duration::from_secs(60)).unwrap();
    assert!(event.enabled);
    let results = registry.query("word299999");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].result_text, "definition 299999");
    Ok(())
}
