use serde::Serialize;
use tracing::{info_span, warn};

use crate::accession::extract_accessions;
use crate::config::PortalConfig;
use crate::domain::PortalResponse;
use crate::ena::{EnaClient, EnaTransport, ReqwestTransport};
use crate::error::FilterError;
use crate::executor::QueryExecutor;
use crate::resolver::SampleResolver;
use crate::rewriter::rewrite_filter;
use crate::validator::ensure_valid;

/// A filter after assembly accessions were swapped for sample accessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Translation {
    pub filter: String,
    pub rewritten: String,
    pub accessions: Vec<String>,
    pub unresolved: Vec<String>,
}

impl Translation {
    fn passthrough(filter: &str) -> Self {
        Self {
            filter: filter.to_string(),
            rewritten: filter.to_string(),
            accessions: Vec::new(),
            unresolved: Vec::new(),
        }
    }
}

#[derive(Clone)]
pub struct FilterPipeline<T: EnaTransport> {
    client: EnaClient<T>,
    config: PortalConfig,
    validate: bool,
}

impl FilterPipeline<ReqwestTransport> {
    pub fn from_config(config: PortalConfig) -> Result<Self, FilterError> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::new(transport, config))
    }
}

impl<T: EnaTransport> FilterPipeline<T> {
    pub fn new(transport: T, config: PortalConfig) -> Self {
        let client = EnaClient::new(transport, &config);
        Self {
            client,
            config,
            validate: false,
        }
    }

    /// Reject filters the expression grammar does not accept before any network call.
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    pub fn client(&self) -> &EnaClient<T> {
        &self.client
    }

    pub fn translate(&self, filter: &str) -> Result<Translation, FilterError> {
        if self.validate {
            ensure_valid(filter)?;
        }
        let occurrences = extract_accessions(filter)?;
        if occurrences.is_empty() {
            return Ok(Translation::passthrough(filter));
        }

        let resolved = SampleResolver::new(&self.client, &self.config).resolve(&occurrences)?;
        let unresolved = occurrences
            .accessions()
            .filter(|accession| resolved.samples_for(accession).is_none())
            .map(|accession| accession.to_string())
            .collect();
        Ok(Translation {
            filter: filter.to_string(),
            rewritten: rewrite_filter(filter, &occurrences, &resolved),
            accessions: occurrences.accessions().map(|a| a.to_string()).collect(),
            unresolved,
        })
    }

    pub fn run(&self, filter: &str) -> Result<PortalResponse, FilterError> {
        let translation = self.translate(filter)?;
        QueryExecutor::new(&self.client, &self.config).execute(&translation.rewritten)
    }

    /// Runs one inbound request; every failure becomes an error envelope.
    pub fn handle(&self, filter: &str) -> PortalResponse {
        let span = info_span!("pipeline", filter = %filter);
        let _guard = span.enter();
        match self.run(filter) {
            Ok(response) => response,
            Err(err) => {
                warn!(status = err.status_code(), "{err}");
                PortalResponse::from(&err)
            }
        }
    }
}
