use tracing::{debug, info};

use crate::config::PortalConfig;
use crate::domain::{PortalResponse, ReadRun};
use crate::ena::{EnaClient, EnaTransport, read_run_count_url, read_run_search_url};
use crate::error::FilterError;

/// Runs a read-run filter against ENA: count first, details only when the count fits
/// under the configured item limit.
pub struct QueryExecutor<'a, T: EnaTransport> {
    client: &'a EnaClient<T>,
    config: &'a PortalConfig,
}

impl<'a, T: EnaTransport> QueryExecutor<'a, T> {
    pub fn new(client: &'a EnaClient<T>, config: &'a PortalConfig) -> Self {
        Self { client, config }
    }

    pub fn execute(&self, filter: &str) -> Result<PortalResponse, FilterError> {
        let counted = self.client.fetch(&read_run_count_url(self.config, filter))?;
        if !counted.is_success() {
            return Ok(PortalResponse::error(counted.status, counted.error));
        }

        let count = counted.count;
        debug!(count, limit = self.config.item_limit, "executor.count");
        if count == 0 {
            return Ok(PortalResponse::empty());
        }
        if count > self.config.item_limit {
            info!(count, limit = self.config.item_limit, "result set over limit");
            return Ok(PortalResponse::error(200, too_many_entries(count)));
        }

        let searched = self.client.fetch(&read_run_search_url(self.config, filter))?;
        if !searched.is_success() {
            return Ok(PortalResponse::error(searched.status, searched.error));
        }
        let runs: Vec<ReadRun> = searched.decode()?;
        Ok(PortalResponse::ok(count, runs))
    }
}

pub fn too_many_entries(count: u64) -> String {
    format!(
        "Too many entries returned: {count}, please add filters to reduce the number of entries."
    )
}
