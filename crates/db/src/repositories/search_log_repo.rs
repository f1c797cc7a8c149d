//! Search analytics bookkeeping.

use crate::client::Warehouse;
use crate::error::WarehouseResult;
use crate::models::search_log::SearchLogEntry;
use crate::params::ParamValue;

const INSERT_SEARCH_LOG: &str = "\
    INSERT INTO ${raw_dataset}.search_log \
        (cache_key, filters, result_count, duration_ms) \
    VALUES ($1, $2, $3, $4)";

/// Records executed searches for usage analytics. The one write this layer
/// performs; never cached.
pub struct SearchLogRepo;

impl SearchLogRepo {
    pub async fn record(warehouse: &Warehouse, entry: &SearchLogEntry) -> WarehouseResult<()> {
        let params = [
            ParamValue::Text(entry.cache_key.clone()),
            ParamValue::Text(entry.filters.to_string()),
            ParamValue::Int(entry.result_count),
            ParamValue::Int(entry.duration_ms),
        ];
        warehouse
            .execute(INSERT_SEARCH_LOG, &params, "search_log")
            .await?;
        Ok(())
    }
}
