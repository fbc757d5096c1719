use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::redirect::Policy;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::PortalConfig;
use crate::domain::RemoteApiResult;
use crate::error::FilterError;

pub const STATUS_OK: u16 = 200;
pub const STATUS_MOVED: u16 = 301;
/// ENA answers 427 instead of 429 when a client is rate limited.
pub const STATUS_RATE_LIMITED: u16 = 427;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

pub trait EnaTransport: Send + Sync {
    fn get(&self, url: &str) -> Result<TransportResponse, FilterError>;
}

/// Blocking HTTP transport. Redirects are not followed so a moved endpoint surfaces as 301.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &PortalConfig) -> Result<Self, FilterError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("ena-filter/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| FilterError::EnaHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .redirect(Policy::none())
            .build()
            .map_err(|err| FilterError::EnaHttp(err.to_string()))?;
        Ok(Self { client })
    }
}

impl EnaTransport for ReqwestTransport {
    fn get(&self, url: &str) -> Result<TransportResponse, FilterError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| FilterError::EnaHttp(err.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|err| FilterError::EnaHttp(err.to_string()))?;
        Ok(TransportResponse { status, body })
    }
}

/// Calls the ENA portal API and folds every HTTP outcome into a [`RemoteApiResult`].
///
/// Only 427 is retried, after a fixed delay, at most `max_retries` times. A 301 means the
/// upstream API changed under us and is reported without retrying. `Err` is reserved for
/// transport failures and 200 bodies that are not JSON.
#[derive(Clone)]
pub struct EnaClient<T: EnaTransport> {
    transport: T,
    service_name: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl<T: EnaTransport> EnaClient<T> {
    pub fn new(transport: T, config: &PortalConfig) -> Self {
        Self {
            transport,
            service_name: config.service_name.clone(),
            max_retries: config.max_retries,
            retry_delay: config.retry_delay(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn fetch(&self, url: &str) -> Result<RemoteApiResult, FilterError> {
        debug!(url, "ena.request");
        let mut response = self.transport.get(url)?;
        for attempt in 1..=self.max_retries {
            if response.status != STATUS_RATE_LIMITED {
                break;
            }
            warn!(
                attempt,
                max_retries = self.max_retries,
                delay_ms = self.retry_delay.as_millis() as u64,
                "{} rate limit hit, retrying",
                self.service_name
            );
            thread::sleep(self.retry_delay);
            response = self.transport.get(url)?;
        }
        self.interpret(url, response)
    }

    fn interpret(
        &self,
        url: &str,
        response: TransportResponse,
    ) -> Result<RemoteApiResult, FilterError> {
        match response.status {
            STATUS_OK => parse_payload(&response.body),
            STATUS_MOVED => {
                warn!(
                    url,
                    "{} REST API has been updated, internal call needs update",
                    self.service_name
                );
                Ok(RemoteApiResult::failure(
                    STATUS_MOVED,
                    format!("{} API has been updated!!!", self.service_name),
                ))
            }
            status => {
                let message = error_message(&response.body);
                debug!(url, status, %message, "ena.error");
                Ok(RemoteApiResult::failure(
                    status,
                    format!("from {}, {}", self.service_name, message),
                ))
            }
        }
    }
}

fn parse_payload(body: &str) -> Result<RemoteApiResult, FilterError> {
    let payload: Value =
        serde_json::from_str(body).map_err(|err| FilterError::EnaPayload(err.to_string()))?;
    match payload {
        Value::Array(records) => {
            let count = records.len() as u64;
            Ok(RemoteApiResult::success(records, count))
        }
        Value::Object(map) => match map.get("count") {
            Some(count) => Ok(RemoteApiResult::success(Vec::new(), parse_count(count)?)),
            None => Ok(RemoteApiResult::success(vec![Value::Object(map)], 1)),
        },
        other => Err(FilterError::EnaPayload(format!(
            "expected a JSON array or object, got {other}"
        ))),
    }
}

fn parse_count(value: &Value) -> Result<u64, FilterError> {
    match value {
        Value::Number(number) => number
            .as_u64()
            .ok_or_else(|| FilterError::EnaPayload(format!("invalid count: {number}"))),
        Value::String(text) => text
            .trim()
            .parse()
            .map_err(|_| FilterError::EnaPayload(format!("invalid count: {text}"))),
        other => Err(FilterError::EnaPayload(format!("invalid count: {other}"))),
    }
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => value
            .get("message")
            .and_then(|message| message.as_str())
            .map(|message| message.to_string())
            .unwrap_or_else(|| body.trim().to_string()),
        Err(err) => format!("unparseable error body: {err}"),
    }
}

/// Percent-encodes a query parameter value.
pub fn encode_query_value(value: &str) -> String {
    let mut out = String::new();
    for byte in value.as_bytes() {
        let ch = *byte as char;
        if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == '.' || ch == '~' {
            out.push(ch);
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}

/// Encodes a read-run filter; a doubled `==` collapses to a single `=`.
pub fn encode_filter_query(filter: &str) -> String {
    encode_query_value(filter).replace("%3D%3D", "%3D")
}

pub fn assembly_search_url(config: &PortalConfig, query: &str) -> String {
    format!(
        "{}/search?result=assembly&fields=assembly_set_accession,sample_accession&query={}&format=json",
        config.base_url(),
        encode_query_value(query)
    )
}

pub fn read_run_count_url(config: &PortalConfig, filter: &str) -> String {
    format!(
        "{}/count?result=read_run&query={}&format=json",
        config.base_url(),
        encode_filter_query(filter)
    )
}

pub fn read_run_search_url(config: &PortalConfig, filter: &str) -> String {
    format!(
        "{}/search?result=read_run&query={}&fields={}&limit={}&format=json",
        config.base_url(),
        encode_filter_query(filter),
        config.read_run_fields.join(","),
        config.item_limit
    )
}
