use super::*;
use std::collections::BTreeMap;

fn storage() -> (BucketStorage, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    (BucketStorage::new(dir.path()), dir)
}

#[test]
fn put_and_get_round_trip() {
    let (storage, _dir) = storage();
    let body = b"hello world";
    let meta = storage.put_object("mybucket", "greeting.txt", body, None, BTreeMap::new(), 1000).unwrap();
    assert_eq!(meta.etag, md5_hex(body));

    let obj = storage.get_object("mybucket", "greeting.txt").unwrap().unwrap();
    assert_eq!(obj.bytes, body);
    assert_eq!(obj.metadata.content_type, "application/octet-stream");
    assert_eq!(obj.metadata.size, body.len() as u64);
}

#[test]
fn put_with_content_type_and_metadata() {
    let (storage, _dir) = storage();
    let mut user_metadata = BTreeMap::new();
    user_metadata.insert("author".to_string(), "test".to_string());
    storage.put_object("mybucket", "data.json", b"{}", Some("application/json".to_string()), user_metadata.clone(), 1000).unwrap();

    let obj = storage.get_object("mybucket", "data.json").unwrap().unwrap();
    assert_eq!(obj.metadata.content_type, "application/json");
    assert_eq!(obj.metadata.user_metadata, user_metadata);
}

#[test]
fn get_nonexistent_returns_none() {
    let (storage, _dir) = storage();
    assert!(storage.get_object("nobucket", "nokey").unwrap().is_none());
}

#[test]
fn put_overwrites_existing() {
    let (storage, _dir) = storage();
    storage.put_object("mybucket", "key", b"version1", None, BTreeMap::new(), 1000).unwrap();
    storage.put_object("mybucket", "key", b"version2", None, BTreeMap::new(), 2000).unwrap();
    let obj = storage.get_object("mybucket", "key").unwrap().unwrap();
    assert_eq!(obj.bytes, b"version2");
}

#[test]
fn nested_key_round_trips() {
    let (storage, _dir) = storage();
    storage.put_object("mybucket", "a/b/c/deep.txt", b"deep", None, BTreeMap::new(), 1000).unwrap();
    let obj = storage.get_object("mybucket", "a/b/c/deep.txt").unwrap().unwrap();
    assert_eq!(obj.bytes, b"deep");
}

#[test]
fn delete_existing_returns_true_and_removes_metadata() {
    let (storage, dir) = storage();
    storage.put_object("mybucket", "key", b"data", None, BTreeMap::new(), 1000).unwrap();
    let meta_path = dir.path().join("s3").join(".metadata").join("mybucket").join("key.json");
    assert!(meta_path.exists());

    assert!(storage.delete_object("mybucket", "key").unwrap());
    assert!(!meta_path.exists());
    assert!(storage.get_object("mybucket", "key").unwrap().is_none());
}

#[test]
fn delete_nonexistent_returns_false() {
    let (storage, _dir) = storage();
    assert!(!storage.delete_object("mybucket", "nokey").unwrap());
}

#[test]
fn head_object_has_no_body() {
    let (storage, _dir) = storage();
    storage.put_object("mybucket", "key", b"content", None, BTreeMap::new(), 1000).unwrap();
    let meta = storage.head_object("mybucket", "key").unwrap().unwrap();
    assert_eq!(meta.size, 7);
    assert!(storage.head_object("mybucket", "nokey").unwrap().is_none());
}

#[test]
fn list_objects_sorted_and_prefixed() {
    let (storage, _dir) = storage();
    storage.put_object("mybucket", "logs/2024/jan.log", b"1", None, BTreeMap::new(), 1000).unwrap();
    storage.put_object("mybucket", "logs/2024/feb.log", b"2", None, BTreeMap::new(), 1000).unwrap();
    storage.put_object("mybucket", "docs/readme.txt", b"3", None, BTreeMap::new(), 1000).unwrap();

    let all = storage.list_objects("mybucket", None, 100, None);
    assert_eq!(all.items.iter().map(|i| i.key.clone()).collect::<Vec<_>>(), vec!["docs/readme.txt", "logs/2024/feb.log", "logs/2024/jan.log"]);

    let prefixed = storage.list_objects("mybucket", Some("logs/"), 100, None);
    assert_eq!(prefixed.items.len(), 2);
}

#[test]
fn list_objects_paginates_with_max_keys_one() {
    let (storage, _dir) = storage();
    for key in ["a", "b", "c"] {
        storage.put_object("mybucket", key, key.as_bytes(), None, BTreeMap::new(), 1000).unwrap();
    }

    let mut seen = Vec::new();
    let mut token: Option<String> = None;
    loop {
        let page = storage.list_objects("mybucket", None, 1, token.as_deref());
        assert_eq!(page.items.len(), 1);
        seen.push(page.items[0].key.clone());
        if !page.truncated {
            break;
        }
        token = page.next_token;
    }
    assert_eq!(seen, vec!["a", "b", "c"]);
}

#[test]
fn list_empty_bucket_is_not_truncated() {
    let (storage, _dir) = storage();
    let result = storage.list_objects("emptybucket", None, 100, None);
    assert!(result.items.is_empty());
    assert!(!result.truncated);
}

#[test]
fn bucket_emptiness() {
    let (storage, _dir) = storage();
    assert!(storage.is_empty("mybucket"));
    storage.put_object("mybucket", "key", b"data", None, BTreeMap::new(), 1000).unwrap();
    assert!(!storage.is_empty("mybucket"));
}
