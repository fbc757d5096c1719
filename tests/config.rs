use std::fs;

use assert_matches::assert_matches;
use camino::Utf8PathBuf;

use ena_filter::config::{ConfigLoader, PortalConfig, default_read_run_fields};
use ena_filter::error::FilterError;

fn write_config(dir: &tempfile::TempDir, content: &str) -> Utf8PathBuf {
    let path = Utf8PathBuf::from_path_buf(dir.path().join("ena-filter.json")).unwrap();
    fs::write(path.as_std_path(), content).unwrap();
    path
}

#[test]
fn load_reads_overrides_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"{
            "base_url": "http://localhost:8080/ena/portal/api/",
            "item_limit": 250,
            "read_run_fields": ["accession", "fastq_ftp"]
        }"#,
    );

    let config = ConfigLoader::load(&path).unwrap();
    assert_eq!(config.base_url(), "http://localhost:8080/ena/portal/api");
    assert_eq!(config.item_limit, 250);
    assert_eq!(config.read_run_fields, vec!["accession", "fastq_ftp"]);
    assert_eq!(config.max_retries, 3);
    assert_eq!(config.retry_delay_ms, 1000);
}

#[test]
fn explicit_missing_path_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.json");
    let err = ConfigLoader::resolve(missing.to_str()).unwrap_err();
    assert_matches!(err, FilterError::MissingConfig(_));
}

#[test]
fn invalid_json_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "{ item_limit: }");
    let err = ConfigLoader::load(&path).unwrap_err();
    assert_matches!(err, FilterError::ConfigParse(_));
}

#[test]
fn defaults_match_ena_portal() {
    let config = PortalConfig::default();
    assert_eq!(config.base_url(), "https://www.ebi.ac.uk/ena/portal/api");
    assert_eq!(config.item_limit, 1000);
    assert_eq!(config.timeout().as_secs(), 60);
    assert_eq!(config.read_run_fields, default_read_run_fields());
    assert_eq!(config.read_run_fields.len(), 10);
}
