use std::fs;

use tempfile::TempDir;

use lexidx::lexical::codec::{self, HEADER_LEN};
use lexidx::{EntryRef, IndexBuilder, LexicalIndex, LexidxError, Normalizer, SourceRecord, StageConfig};

fn serialize(index: &LexicalIndex, profile: u64) -> Vec<u8> {
    let mut bytes = Vec::new();
    index.serialize(&mut bytes, profile).unwrap();
    bytes
}

#[test]
fn test_apple_collision_survives_roundtrip() -> lexidx::Result<()> {
    let mut index = LexicalIndex::new();
    index.insert("apple", EntryRef::new(0, 5))?;
    index.insert("apple", EntryRef::new(100, 3))?;

    let bytes = serialize(&index, 0);
    let mut restored = LexicalIndex::new();
    restored.deserialize(&mut bytes.as_slice())?;

    assert_eq!(
        restored.lookup("apple"),
        Some(&[EntryRef::new(0, 5), EntryRef::new(100, 3)][..])
    );
    assert_eq!(restored.lookup("appl"), None);
    Ok(())
}

#[test]
fn test_empty_source_roundtrip_finds_nothing() -> lexidx::Result<()> {
    let normalizer = Normalizer::new(StageConfig::none());
    let (index, stats) = IndexBuilder::new(&normalizer).build(Vec::<lexidx::Result<SourceRecord>>::new())?;
    assert_eq!(stats.records, 0);

    let bytes = serialize(&index, 0);
    let mut restored = LexicalIndex::new();
    restored.deserialize(&mut bytes.as_slice())?;

    for key in ["", "a", "apple", "中文"] {
        assert_eq!(restored.lookup(key), None);
    }
    Ok(())
}

#[test]
fn test_roundtrip_many_keys() -> lexidx::Result<()> {
    let mut index = LexicalIndex::new();
    let words = ["a", "ab", "abc", "b", "über", "ｆｕｌｌ", "日本語", "日本", "😀", "z"];
    for (i, word) in words.iter().enumerate() {
        for j in 0..(i % 3 + 1) {
            index.insert(word, EntryRef::new((i * 10 + j) as u64, j as u32))?;
        }
    }

    let bytes = serialize(&index, 0);
    let mut restored = LexicalIndex::new();
    let header = restored.deserialize(&mut bytes.as_slice())?;

    assert_eq!(header.key_count as usize, words.len());
    assert_eq!(restored.stats(), index.stats());
    for word in words {
        assert_eq!(restored.lookup(word), index.lookup(word), "key {}", word);
    }
    Ok(())
}

#[test]
fn test_unsorted_builds_are_deterministic() -> lexidx::Result<()> {
    let normalizer = Normalizer::new(StageConfig { accent_stripping: true, ..StageConfig::none() });
    let records = [("résumé", 0), ("resume", 10), ("apple", 20), ("Äpfel", 30), ("resumé", 40)];

    let forward: Vec<_> = records
        .iter()
        .map(|&(h, o)| Ok(SourceRecord::new(h, o, 1)))
        .collect();
    let reversed: Vec<_> = records
        .iter()
        .rev()
        .map(|&(h, o)| Ok(SourceRecord::new(h, o, 1)))
        .collect();

    let (a, _) = IndexBuilder::new(&normalizer).build(forward)?;
    let (b, _) = IndexBuilder::new(&normalizer).build(reversed)?;

    assert_eq!(a.iter().map(|(k, _)| k).collect::<Vec<_>>(), b.iter().map(|(k, _)| k).collect::<Vec<_>>());
    assert_eq!(a.lookup("resume").map(<[EntryRef]>::len), Some(3));
    assert_eq!(b.lookup("resume").map(<[EntryRef]>::len), Some(3));
    // Collisions keep the order in which the source listed them.
    assert_eq!(a.lookup("resume").unwrap()[0], EntryRef::new(0, 1));
    assert_eq!(b.lookup("resume").unwrap()[0], EntryRef::new(40, 1));
    Ok(())
}

#[test]
fn test_file_roundtrip_and_corruption() -> lexidx::Result<()> {
    // 1. Persist an index
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("dict.tsv.index");
    let mut index = LexicalIndex::new();
    index.insert("pear", EntryRef::new(4, 4))?;
    codec::write_index_file(&index, &path, 2)?;

    // 2. Reload it
    let (restored, header) = codec::read_index_file(&path)?;
    assert_eq!(header.profile, 2);
    assert_eq!(restored.lookup("pear"), Some(&[EntryRef::new(4, 4)][..]));

    // 3. Damage a node record
    let mut bytes = fs::read(&path)?;
    bytes[HEADER_LEN + 1] ^= 0xFF;
    fs::write(&path, &bytes)?;
    let err = codec::read_index_file(&path).unwrap_err();
    assert!(matches!(err, LexidxError::IndexFormat(_)));

    // 4. Truncate it
    fs::write(&path, &bytes[..bytes.len() / 2])?;
    assert!(codec::read_index_file(&path).is_err());
    Ok(())
}
