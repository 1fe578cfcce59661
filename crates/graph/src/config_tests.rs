use super::*;

#[test]
fn defaults_are_stable() {
    let cfg = EmulatorConfig::default();
    assert_eq!(cfg.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
    assert_eq!(cfg.log_level, "info");
}

#[test]
fn service_dir_nests_under_data_dir() {
    let cfg = EmulatorConfig::default().with_data_dir("/tmp/lc");
    assert_eq!(cfg.service_dir("s3"), PathBuf::from("/tmp/lc/s3"));
}
