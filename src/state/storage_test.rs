use super::*;

fn store() -> (Rc<MemoryStorage>, SessionStore) {
    let storage = Rc::new(MemoryStorage::new());
    let store = SessionStore::new(storage.clone(), StorageKeys::default());
    (storage, store)
}

fn sample_user() -> User {
    User {
        id_user: "u-1".to_owned(),
        nama_lengkap: "Budi Santoso".to_owned(),
        email: "budi@hr.id".to_owned(),
        profile: "PEGAWAI".to_owned(),
        ..User::default()
    }
}

// =============================================================
// MemoryStorage
// =============================================================

#[test]
fn memory_storage_set_get_remove() {
    let storage = MemoryStorage::new();
    storage.set("k", "v").unwrap();
    assert_eq!(storage.get("k").as_deref(), Some("v"));
    storage.remove("k");
    assert!(storage.get("k").is_none());
    assert!(storage.is_empty());
}

#[test]
fn memory_storage_failing_key_rejects_writes() {
    let storage = MemoryStorage::new();
    storage.fail_writes_to("k");
    assert_eq!(
        storage.set("k", "v"),
        Err(StorageError::WriteFailed { key: "k".to_owned() })
    );
    assert!(storage.set("other", "v").is_ok());
    assert_eq!(storage.len(), 1);
}

// =============================================================
// SessionStore
// =============================================================

#[test]
fn token_round_trips_under_fixed_key() {
    let (storage, store) = store();
    store.set_token("abc").unwrap();
    assert_eq!(store.token().as_deref(), Some("abc"));
    assert_eq!(storage.get("hr_system_token").as_deref(), Some("abc"));
}

#[test]
fn empty_token_reads_as_absent() {
    let (storage, store) = store();
    storage.set("hr_system_token", "").unwrap();
    assert!(store.token().is_none());
}

#[test]
fn user_is_stored_as_json() {
    let (storage, store) = store();
    store.set_user(&sample_user()).unwrap();
    let raw = storage.get("hr_system_user").unwrap();
    assert!(raw.contains("\"namaLengkap\":\"Budi Santoso\""));
    assert_eq!(store.user(), Some(sample_user()));
}

#[test]
fn corrupt_user_reads_as_absent() {
    let (storage, store) = store();
    storage.set("hr_system_user", "{not json").unwrap();
    assert!(store.user().is_none());
}

#[test]
fn settings_default_to_null() {
    let (_, store) = store();
    assert_eq!(store.settings(), serde_json::Value::Null);
    store.set_settings(&serde_json::json!({"theme": "dark"})).unwrap();
    assert_eq!(store.settings()["theme"], "dark");
}

#[test]
fn clear_removes_all_three_records() {
    let (storage, store) = store();
    store.set_token("abc").unwrap();
    store.set_user(&sample_user()).unwrap();
    store.set_settings(&serde_json::json!({})).unwrap();
    storage.set("unrelated", "x").unwrap();

    store.clear();

    assert!(store.token().is_none());
    assert!(store.user().is_none());
    assert_eq!(storage.len(), 1);
}
