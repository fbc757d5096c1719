use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::accession::AccessionOccurrences;
use crate::config::PortalConfig;
use crate::domain::{AssemblyAccession, AssemblySampleRow};
use crate::ena::{EnaClient, EnaTransport, assembly_search_url};
use crate::error::FilterError;

/// Sample accessions per assembly accession, in the order ENA returned them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedSampleSet {
    samples: BTreeMap<String, Vec<String>>,
}

impl ResolvedSampleSet {
    pub fn from_rows(rows: &[AssemblySampleRow]) -> Self {
        let mut samples: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for row in rows {
            if row.sample_accession.trim().is_empty() {
                continue;
            }
            samples
                .entry(row.assembly_set_accession.trim().to_uppercase())
                .or_default()
                .push(row.sample_accession.trim().to_string());
        }
        Self { samples }
    }

    /// `None` when ENA returned nothing for this assembly.
    pub fn samples_for(&self, accession: &AssemblyAccession) -> Option<&[String]> {
        self.samples
            .get(accession.as_str())
            .map(Vec::as_slice)
            .filter(|samples| !samples.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

pub struct SampleResolver<'a, T: EnaTransport> {
    client: &'a EnaClient<T>,
    config: &'a PortalConfig,
}

impl<'a, T: EnaTransport> SampleResolver<'a, T> {
    pub fn new(client: &'a EnaClient<T>, config: &'a PortalConfig) -> Self {
        Self { client, config }
    }

    /// One assembly search for every distinct accession in `occurrences`.
    pub fn resolve(
        &self,
        occurrences: &AccessionOccurrences,
    ) -> Result<ResolvedSampleSet, FilterError> {
        if occurrences.is_empty() {
            return Ok(ResolvedSampleSet::default());
        }
        let url = assembly_search_url(self.config, &occurrences.resolver_query());
        let response = self.client.fetch(&url)?;
        if !response.is_success() {
            return Err(FilterError::ResolverFailed {
                status: response.status,
                message: response.error,
            });
        }
        let rows: Vec<AssemblySampleRow> = response.decode()?;
        let resolved = ResolvedSampleSet::from_rows(&rows);
        for accession in occurrences.accessions() {
            match resolved.samples_for(accession) {
                Some(samples) => debug!(%accession, samples = samples.len(), "resolver.match"),
                None => info!(%accession, "assembly has no samples, using sentinel clause"),
            }
        }
        Ok(resolved)
    }
}
