//! Integration tests for the Shroud record store.

use std::fs;

use shroud::vault::{Category, ListScope, Listing, SecretName, SecretRecord, VaultStore};
use shroud::ShroudError;
use tempfile::TempDir;

/// Helper: a fresh vault root inside a temp dir.
fn store() -> (TempDir, VaultStore) {
    let dir = TempDir::new().expect("create temp dir");
    let store = VaultStore::new(dir.path());
    (dir, store)
}

fn name(raw: &str) -> SecretName {
    SecretName::parse(Some(raw)).expect("valid name")
}

fn category(raw: &str) -> Option<Category> {
    Category::parse(Some(raw)).expect("valid category")
}

/// A record with recognisable, not necessarily valid, contents.
fn record(tag: u8) -> SecretRecord {
    SecretRecord {
        sealed_secret: vec![tag; 20],
        pubkey: vec![tag; 32],
        salt: vec![tag; 24],
    }
}

fn listing(entries: &[(&str, &[&str])]) -> Listing {
    entries
        .iter()
        .map(|(c, names)| (c.to_string(), names.iter().map(|n| n.to_string()).collect()))
        .collect()
}

// ---------------------------------------------------------------------------
// Add / get
// ---------------------------------------------------------------------------

#[test]
fn add_then_get_roundtrip() {
    let (_dir, store) = store();
    let work = category("work");

    store.add(&name("github"), &record(1), work.as_ref()).unwrap();
    store.add(&name("github"), &record(2), None).unwrap();

    assert_eq!(store.get(&name("github"), work.as_ref()).unwrap(), record(1));
    assert_eq!(store.get(&name("github"), None).unwrap(), record(2));
}

#[test]
fn add_writes_json_record_at_expected_path() {
    let (dir, store) = store();
    let work = category("work");

    store.add(&name("github"), &record(3), work.as_ref()).unwrap();

    let raw = fs::read_to_string(dir.path().join("work").join("github")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert!(value["sealedSecret"].is_string());
    assert!(value["pubkey"].is_string());
    assert!(value["salt"].is_string());
}

#[test]
fn add_duplicate_fails_and_keeps_original() {
    let (_dir, store) = store();

    store.add(&name("token"), &record(1), None).unwrap();
    let err = store.add(&name("token"), &record(2), None).unwrap_err();

    assert!(matches!(err, ShroudError::DuplicateSecret(_)));
    assert_eq!(store.get(&name("token"), None).unwrap(), record(1));
}

#[test]
fn add_leaves_no_temp_files_behind() {
    let (dir, store) = store();
    store.add(&name("a"), &record(1), None).unwrap();
    let _ = store.add(&name("a"), &record(2), None);

    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "found temp files: {leftovers:?}");
}

#[test]
fn category_cannot_shadow_an_uncategorized_secret() {
    let (_dir, store) = store();
    store.add(&name("b"), &record(1), None).unwrap();

    let err = store
        .add(&name("x"), &record(2), category("b").as_ref())
        .unwrap_err();
    assert!(matches!(err, ShroudError::InvalidName(_)));
}

#[test]
fn get_missing_secret_fails() {
    let (_dir, store) = store();
    let err = store.get(&name("nope"), None).unwrap_err();
    assert!(matches!(err, ShroudError::SecretNotFound(_)));
}

#[test]
fn get_unparseable_record_is_corrupt() {
    let (dir, store) = store();
    fs::write(dir.path().join("broken"), b"not json").unwrap();

    let err = store.get(&name("broken"), None).unwrap_err();
    assert!(matches!(err, ShroudError::CorruptRecord(_)));
}

// ---------------------------------------------------------------------------
// Update / remove
// ---------------------------------------------------------------------------

#[test]
fn update_replaces_existing_record() {
    let (_dir, store) = store();
    let work = category("work");

    store.add(&name("db"), &record(1), work.as_ref()).unwrap();
    store.update(&name("db"), &record(9), work.as_ref()).unwrap();

    assert_eq!(store.get(&name("db"), work.as_ref()).unwrap(), record(9));
}

#[test]
fn update_never_creates_a_record() {
    let (dir, store) = store();

    let err = store
        .update(&name("ghost"), &record(1), category("work").as_ref())
        .unwrap_err();

    assert!(matches!(err, ShroudError::SecretNotFound(_)));
    assert!(!dir.path().join("work").exists());
    assert!(!store.contains(&name("ghost"), category("work").as_ref()));
}

#[test]
fn remove_deletes_record() {
    let (_dir, store) = store();
    store.add(&name("gone"), &record(1), None).unwrap();

    store.remove(&name("gone"), None).unwrap();

    assert!(!store.contains(&name("gone"), None));
    let err = store.remove(&name("gone"), None).unwrap_err();
    assert!(matches!(err, ShroudError::SecretNotFound(_)));
}

#[test]
fn removing_last_secret_prunes_category() {
    let (dir, store) = store();
    let work = category("work");
    store.add(&name("one"), &record(1), work.as_ref()).unwrap();
    store.add(&name("two"), &record(2), work.as_ref()).unwrap();

    store.remove(&name("one"), work.as_ref()).unwrap();
    assert!(dir.path().join("work").is_dir(), "category still has a secret");

    store.remove(&name("two"), work.as_ref()).unwrap();
    assert!(!dir.path().join("work").exists());

    let err = store.list(&ListScope::Category(work.unwrap()), None).unwrap_err();
    assert!(matches!(err, ShroudError::CategoryNotFound(_)));
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[test]
fn list_everything_groups_by_category_sorted() {
    let (_dir, store) = store();
    store.add(&name("zeta"), &record(1), None).unwrap();
    store.add(&name("alpha"), &record(1), None).unwrap();
    store.add(&name("github"), &record(1), category("work").as_ref()).unwrap();
    store.add(&name("aws"), &record(1), category("work").as_ref()).unwrap();

    let result = store.list(&ListScope::Everything, None).unwrap();
    assert_eq!(
        result,
        listing(&[
            ("uncategorized", &["alpha", "zeta"]),
            ("work", &["aws", "github"]),
        ])
    );
}

#[test]
fn list_filter_is_case_insensitive_and_drops_empty_buckets() {
    let (_dir, store) = store();
    store.add(&name("butts.com"), &record(1), None).unwrap();
    store.add(&name("butts.com"), &record(1), category("b").as_ref()).unwrap();
    store.add(&name("x.com"), &record(1), category("c").as_ref()).unwrap();

    let result = store.list(&ListScope::Everything, Some("BUTT")).unwrap();
    assert_eq!(
        result,
        listing(&[("b", &["butts.com"]), ("uncategorized", &["butts.com"])])
    );
}

#[test]
fn list_single_category_and_uncategorized_scope() {
    let (_dir, store) = store();
    store.add(&name("top"), &record(1), None).unwrap();
    store.add(&name("inner"), &record(1), category("work").as_ref()).unwrap();

    let work = store
        .list(&ListScope::Category(category("work").unwrap()), None)
        .unwrap();
    assert_eq!(work, listing(&[("work", &["inner"])]));

    let top = store.list(&ListScope::Uncategorized, None).unwrap();
    assert_eq!(top, listing(&[("uncategorized", &["top"])]));
}

#[test]
fn list_empty_vault_is_empty() {
    let (_dir, store) = store();
    assert!(store.list(&ListScope::Everything, None).unwrap().is_empty());
    assert!(store.list(&ListScope::Uncategorized, None).unwrap().is_empty());
}

#[test]
fn list_ignores_dotfiles() {
    let (dir, store) = store();
    store.add(&name("visible"), &record(1), None).unwrap();
    fs::write(dir.path().join(".metadata.json"), b"{}").unwrap();
    fs::write(dir.path().join(".visible.1.tmp"), b"partial").unwrap();

    let result = store.list(&ListScope::Everything, None).unwrap();
    assert_eq!(result, listing(&[("uncategorized", &["visible"])]));
}

#[test]
fn list_with_invalid_pattern_fails() {
    let (_dir, store) = store();
    let err = store.list(&ListScope::Everything, Some("(unclosed")).unwrap_err();
    assert!(matches!(err, ShroudError::InvalidPattern(_)));
}
