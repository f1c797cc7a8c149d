use serde::Serialize;
use sqlx::FromRow;

use meeple_core::types::DimensionId;

/// One selectable value of a dimension, with the number of active games
/// associated with it. Populates filter widgets.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DimensionValue {
    pub id: DimensionId,
    pub label: String,
    pub game_count: i64,
}
