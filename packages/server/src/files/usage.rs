use std::collections::BTreeMap;

use chrono::Datelike;
use tracing::instrument;

use super::{FileError, FileScope, FileStores};

/// Number of files created in one calendar month (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlyCount {
    pub year: i32,
    pub month: u32,
    pub count: u64,
}

/// Read-only per-month upload counts for a scope.
#[derive(Clone)]
pub struct UsageAggregator {
    stores: FileStores,
}

impl UsageAggregator {
    pub fn new(stores: FileStores) -> Self {
        Self { stores }
    }

    /// Counts grouped by the month of `created_at`, ascending.
    #[instrument(skip(self), fields(tenant_id = %scope.tenant_id, owner_id = %scope.owner_id))]
    pub async fn monthly_counts(&self, scope: &FileScope) -> Result<Vec<MonthlyCount>, FileError> {
        let records = self
            .stores
            .metadata
            .find_by_scope(scope.tenant_id, scope.owner_id)
            .await
            .map_err(FileError::MetadataStoreUnavailable)?;

        let mut buckets: BTreeMap<(i32, u32), u64> = BTreeMap::new();
        for record in &records {
            let month = (record.created_at.year(), record.created_at.month());
            *buckets.entry(month).or_default() += 1;
        }

        Ok(buckets
            .into_iter()
            .map(|((year, month), count)| MonthlyCount { year, month, count })
            .collect())
    }
}
