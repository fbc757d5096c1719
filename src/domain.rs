use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FilterError;

/// Filter clause substituted for an assembly accession that resolved to no samples.
pub const NO_SAMPLE_CLAUSE: &str = r#"sample_accession="NO_SAMPLE""#;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssemblyAccession(String);

impl AssemblyAccession {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssemblyAccession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AssemblyAccession {
    type Err = FilterError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_uppercase();
        let rest = normalized
            .strip_prefix("GCF_")
            .or_else(|| normalized.strip_prefix("GCA_"));
        let is_valid = rest
            .and_then(|rest| rest.split_once('.'))
            .map(|(digits, version)| {
                digits.len() == 9
                    && digits.chars().all(|ch| ch.is_ascii_digit())
                    && !version.is_empty()
                    && version.chars().all(|ch| ch.is_ascii_digit())
            })
            .unwrap_or(false);
        if !is_valid {
            return Err(FilterError::InvalidAssemblyAccession(value.to_string()));
        }
        Ok(Self(normalized))
    }
}

/// Outcome of one call against the ENA portal API.
///
/// `data` stays loosely typed here; callers decode it into [`AssemblySampleRow`] or
/// [`ReadRun`] once the status is known to be 200.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemoteApiResult {
    pub data: Vec<Value>,
    pub count: u64,
    pub error: String,
    pub status: u16,
}

impl RemoteApiResult {
    pub fn success(data: Vec<Value>, count: u64) -> Self {
        Self {
            data,
            count,
            error: String::new(),
            status: 200,
        }
    }

    pub fn failure(status: u16, error: impl Into<String>) -> Self {
        Self {
            data: Vec::new(),
            count: 0,
            error: error.into(),
            status,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> Result<Vec<T>, FilterError> {
        self.data
            .iter()
            .cloned()
            .map(|value| {
                serde_json::from_value(value)
                    .map_err(|err| FilterError::EnaPayload(err.to_string()))
            })
            .collect()
    }
}

/// One row of the assembly search used to resolve samples.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AssemblySampleRow {
    pub assembly_set_accession: String,
    #[serde(default)]
    pub sample_accession: String,
}

/// Read-run record with the fixed detail projection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReadRun {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accession: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sra_md5: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub base_count: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_accession: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_accession: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instrument_platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instrument_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library_layout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fastq_ftp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fastq_md5: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    })
}

/// Body of the inbound endpoint's answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub count: u64,
    pub data: Vec<ReadRun>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortalResponse {
    pub status: u16,
    pub body: QueryResponse,
}

impl PortalResponse {
    pub fn ok(count: u64, data: Vec<ReadRun>) -> Self {
        Self {
            status: 200,
            body: QueryResponse {
                count,
                data,
                error: None,
            },
        }
    }

    pub fn empty() -> Self {
        Self::ok(0, Vec::new())
    }

    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: QueryResponse {
                count: 0,
                data: Vec::new(),
                error: Some(message.into()),
            },
        }
    }
}

impl From<&FilterError> for PortalResponse {
    fn from(err: &FilterError) -> Self {
        PortalResponse::error(err.status_code(), err.to_string())
    }
}
