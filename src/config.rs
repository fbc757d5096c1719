use std::fs;
use std::time::Duration;

use camino::Utf8PathBuf;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::FilterError;

pub const DEFAULT_CONFIG_FILE: &str = "ena-filter.json";
pub const BASE_URL_ENV: &str = "ENA_PORTAL_BASE";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PortalConfig {
    pub base_url: String,
    pub service_name: String,
    pub item_limit: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub timeout_secs: u64,
    pub read_run_fields: Vec<String>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.ebi.ac.uk/ena/portal/api".to_string(),
            service_name: "ENA".to_string(),
            item_limit: 1000,
            max_retries: 3,
            retry_delay_ms: 1000,
            timeout_secs: 60,
            read_run_fields: default_read_run_fields(),
        }
    }
}

impl PortalConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

pub fn default_read_run_fields() -> Vec<String> {
    [
        "accession",
        "sra_md5",
        "base_count",
        "study_accession",
        "sample_accession",
        "instrument_platform",
        "instrument_model",
        "library_layout",
        "fastq_ftp",
        "fastq_md5",
    ]
    .iter()
    .map(|field| field.to_string())
    .collect()
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Explicit path must exist. Otherwise the working directory file, then the user
    /// config dir, then built-in defaults. `ENA_PORTAL_BASE` wins over all of them.
    pub fn resolve(path: Option<&str>) -> Result<PortalConfig, FilterError> {
        let mut config = match path {
            Some(path) => {
                let path = Utf8PathBuf::from(path);
                if !path.as_std_path().exists() {
                    return Err(FilterError::MissingConfig(path));
                }
                Self::load(&path)?
            }
            None => match Self::discover() {
                Some(path) => Self::load(&path)?,
                None => PortalConfig::default(),
            },
        };

        if let Ok(base) = std::env::var(BASE_URL_ENV) {
            Self::apply_base_override(&mut config, &base);
        }
        Ok(config)
    }

    pub fn load(path: &Utf8PathBuf) -> Result<PortalConfig, FilterError> {
        let content = fs::read_to_string(path.as_std_path())
            .map_err(|_| FilterError::ConfigRead(path.clone()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<PortalConfig, FilterError> {
        serde_json::from_str(content).map_err(|err| FilterError::ConfigParse(err.to_string()))
    }

    pub fn apply_base_override(config: &mut PortalConfig, base: &str) {
        if !base.trim().is_empty() {
            config.base_url = base.trim().to_string();
        }
    }

    fn discover() -> Option<Utf8PathBuf> {
        let local = Utf8PathBuf::from(DEFAULT_CONFIG_FILE);
        if local.as_std_path().exists() {
            return Some(local);
        }
        let dirs = ProjectDirs::from("org", "brc-analytics", "ena-filter")?;
        let user = Utf8PathBuf::from_path_buf(dirs.config_dir().join("config.json")).ok()?;
        user.as_std_path().exists().then_some(user)
    }
}
