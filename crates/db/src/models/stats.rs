//! Catalog-wide aggregate shapes for the dashboard.

use serde::Serialize;
use sqlx::FromRow;

/// Scalar aggregates over the active catalog.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct SummaryStats {
    pub total_games: i64,
    pub rated_games: i64,
    pub average_rating: Option<f64>,
    pub average_complexity: Option<f64>,
    pub category_count: i64,
    pub mechanic_count: i64,
    pub designer_count: i64,
    pub publisher_count: i64,
}

/// One histogram bucket. Rating buckets are quarter points; year buckets
/// carry the publication year (cast to float so both distributions share a
/// shape).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DistributionBucket {
    pub bucket: f64,
    pub game_count: i64,
}
