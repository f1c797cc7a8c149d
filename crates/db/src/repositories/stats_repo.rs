//! Catalog-wide aggregates for the dashboard.

use meeple_core::filter::GameFilter;

use crate::client::Warehouse;
use crate::compose::QueryMode;
use crate::error::WarehouseResult;
use crate::models::stats::{DistributionBucket, SummaryStats};

/// Provides summary scalars and histogram distributions.
pub struct StatsRepo;

impl StatsRepo {
    /// Scalar aggregates over the active catalog.
    pub async fn summary(warehouse: &Warehouse) -> WarehouseResult<SummaryStats> {
        let filter = GameFilter::default();
        let mode = QueryMode::SummaryStats;
        let composed = warehouse.composer().compose(&filter, mode);
        let rows = warehouse
            .caches()
            .stats
            .get_or_compute(&composed.cache_key, || {
                warehouse.fetch_all(&composed, mode.name())
            })
            .await?;
        Ok(rows.into_iter().next().unwrap_or_default())
    }

    /// Game counts per quarter-point rating bucket.
    pub async fn rating_distribution(
        warehouse: &Warehouse,
    ) -> WarehouseResult<Vec<DistributionBucket>> {
        Self::distribution(warehouse, QueryMode::RatingDistribution).await
    }

    /// Game counts per publication year.
    pub async fn year_distribution(
        warehouse: &Warehouse,
    ) -> WarehouseResult<Vec<DistributionBucket>> {
        Self::distribution(warehouse, QueryMode::YearDistribution).await
    }

    async fn distribution(
        warehouse: &Warehouse,
        mode: QueryMode,
    ) -> WarehouseResult<Vec<DistributionBucket>> {
        let filter = GameFilter::default();
        let composed = warehouse.composer().compose(&filter, mode);
        warehouse
            .caches()
            .buckets
            .get_or_compute(&composed.cache_key, || {
                warehouse.fetch_all(&composed, mode.name())
            })
            .await
    }
}
