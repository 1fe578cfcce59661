use super::*;

const KEY: &str = "correct-horse-battery-staple";

#[test]
fn validate_succeeds_with_same_signing_key() {
    let fields = presign(KEY, "GET", "mybucket", "key.txt", 1_000, 60).unwrap();
    assert!(validate(KEY, &fields, 1_010).is_ok());
}

#[test]
fn validate_fails_with_different_signing_key() {
    let fields = presign(KEY, "GET", "mybucket", "key.txt", 1_000, 60).unwrap();
    let err = validate("a-different-key", &fields, 1_010).unwrap_err();
    assert!(matches!(err, ProviderError::InvalidPresignedUrl));
}

#[test]
fn validate_fails_once_expired() {
    let fields = presign(KEY, "GET", "mybucket", "key.txt", 1_000, 60).unwrap();
    let err = validate(KEY, &fields, 1_061).unwrap_err();
    assert!(matches!(err, ProviderError::InvalidPresignedUrl));
}

#[test]
fn validate_at_exact_expiry_still_succeeds() {
    let fields = presign(KEY, "GET", "mybucket", "key.txt", 1_000, 60).unwrap();
    assert!(validate(KEY, &fields, 1_060).is_ok());
}

#[test]
fn validate_fails_on_tampered_field() {
    let mut fields = presign(KEY, "PUT", "mybucket", "key.txt", 1_000, 60).unwrap();
    fields.key = "other-key.txt".to_string();
    let err = validate(KEY, &fields, 1_010).unwrap_err();
    assert!(matches!(err, ProviderError::InvalidPresignedUrl));
}

#[test]
fn different_methods_produce_different_signatures() {
    let get = presign(KEY, "GET", "mybucket", "key.txt", 1_000, 60).unwrap();
    let put = presign(KEY, "PUT", "mybucket", "key.txt", 1_000, 60).unwrap();
    assert_ne!(get.signature, put.signature);
}
