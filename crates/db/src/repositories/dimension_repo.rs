//! Dimension-value listings for filter widgets.

use meeple_core::filter::GameFilter;
use meeple_core::types::Dimension;

use crate::client::Warehouse;
use crate::compose::QueryMode;
use crate::error::WarehouseResult;
use crate::models::dimension::DimensionValue;

/// Lists the selectable values of each filter dimension.
pub struct DimensionRepo;

impl DimensionRepo {
    /// All values of `dimension` with their active-game counts, ordered by
    /// label. Counts are relative to the whole active set, not the current
    /// filter selection.
    pub async fn list(
        warehouse: &Warehouse,
        dimension: Dimension,
    ) -> WarehouseResult<Vec<DimensionValue>> {
        let filter = GameFilter::default();
        let mode = QueryMode::DimensionList(dimension);
        let composed = warehouse.composer().compose(&filter, mode);
        let values = warehouse
            .caches()
            .dimension_values
            .get_or_compute(&composed.cache_key, || {
                warehouse.fetch_all(&composed, mode.name())
            })
            .await?;
        tracing::debug!(
            dimension = dimension.as_str(),
            values = values.len(),
            "dimension values listed"
        );
        Ok(values)
    }
}
