//! Game result rows and the assembled detail shape.

use serde::Serialize;
use sqlx::FromRow;

use meeple_core::types::{DimensionId, GameId};

/// One denormalized game row as the search and detail queries return it.
///
/// `best_player_counts`/`recommended_player_counts` are derived at query
/// time: comma-joined player counts aggregated from the recommendation
/// source, ordered ascending.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GameRecord {
    pub game_id: GameId,
    pub name: String,
    pub year_published: Option<i32>,
    pub average_rating: Option<f64>,
    pub bayes_average: Option<f64>,
    pub average_weight: Option<f64>,
    pub users_rated: Option<i64>,
    pub min_players: Option<i32>,
    pub max_players: Option<i32>,
    pub playing_time: Option<i32>,
    pub thumbnail: Option<String>,
    pub is_active: bool,
    pub best_player_counts: Option<String>,
    pub recommended_player_counts: Option<String>,
    pub category_count: i64,
    pub mechanic_count: i64,
}

/// One page of search results plus the total match count for pagination UI.
#[derive(Debug, Clone, Serialize)]
pub struct SearchPage {
    pub games: Vec<GameRecord>,
    pub total: i64,
}

/// A dimension value linked to a game (e.g. one of its categories).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DimensionRef {
    pub id: DimensionId,
    pub name: String,
}

/// Community votes for one player count of one game.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PlayerCountVotes {
    pub player_count: i32,
    pub best_votes: i64,
    pub recommended_votes: i64,
    pub not_recommended_votes: i64,
    pub is_best: bool,
    pub is_recommended: bool,
}

/// Everything a detail page shows for one game.
#[derive(Debug, Clone, Serialize)]
pub struct GameDetail {
    pub game: GameRecord,
    pub publishers: Vec<DimensionRef>,
    pub designers: Vec<DimensionRef>,
    pub categories: Vec<DimensionRef>,
    pub mechanics: Vec<DimensionRef>,
    /// Vote rows ordered by player count.
    pub player_counts: Vec<PlayerCountVotes>,
}
