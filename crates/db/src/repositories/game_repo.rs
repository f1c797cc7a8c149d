//! Search and detail accessors for games.

use meeple_core::filter::GameFilter;
use meeple_core::types::{Dimension, GameId};

use crate::client::Warehouse;
use crate::compose::QueryMode;
use crate::error::WarehouseResult;
use crate::models::game::{DimensionRef, GameDetail, PlayerCountVotes, SearchPage};

/// Provides the paginated search and the single-game detail fetch.
pub struct GameRepo;

impl GameRepo {
    /// Run one filtered, sorted, paginated search and return the page plus
    /// the total match count.
    pub async fn search(warehouse: &Warehouse, filter: &GameFilter) -> WarehouseResult<SearchPage> {
        let rows_mode = QueryMode::Search;
        let rows_query = warehouse.composer().compose(filter, rows_mode);
        let games = warehouse
            .caches()
            .games
            .get_or_compute(&rows_query.cache_key, || {
                warehouse.fetch_all(&rows_query, rows_mode.name())
            })
            .await?;

        let count_mode = QueryMode::SearchCount;
        let count_query = warehouse.composer().compose(filter, count_mode);
        let counts = warehouse
            .caches()
            .counts
            .get_or_compute(&count_query.cache_key, || {
                warehouse.fetch_all(&count_query, count_mode.name())
            })
            .await?;
        let total = counts.first().map(|row| row.0).unwrap_or(0);

        tracing::debug!(
            page = filter.page_number(),
            rows = games.len(),
            total,
            "search page assembled"
        );
        Ok(SearchPage { games, total })
    }

    /// Fetch one game with its linked dimensions and player-count votes.
    ///
    /// An unknown identifier returns `Ok(None)`: a valid empty result, not
    /// a fault.
    pub async fn find_by_id(
        warehouse: &Warehouse,
        id: GameId,
    ) -> WarehouseResult<Option<GameDetail>> {
        let filter = GameFilter::default();
        let mode = QueryMode::DetailById(id);
        let composed = warehouse.composer().compose(&filter, mode);
        let rows = warehouse
            .caches()
            .games
            .get_or_compute(&composed.cache_key, || {
                warehouse.fetch_all(&composed, mode.name())
            })
            .await?;

        let Some(game) = rows.into_iter().next() else {
            tracing::debug!(game_id = id, "game not found");
            return Ok(None);
        };

        let publishers = Self::links(warehouse, id, Dimension::Publisher).await?;
        let designers = Self::links(warehouse, id, Dimension::Designer).await?;
        let categories = Self::links(warehouse, id, Dimension::Category).await?;
        let mechanics = Self::links(warehouse, id, Dimension::Mechanic).await?;
        let player_counts = Self::player_counts(warehouse, id).await?;

        Ok(Some(GameDetail {
            game,
            publishers,
            designers,
            categories,
            mechanics,
            player_counts,
        }))
    }

    async fn links(
        warehouse: &Warehouse,
        id: GameId,
        dimension: Dimension,
    ) -> WarehouseResult<Vec<DimensionRef>> {
        let filter = GameFilter::default();
        let mode = QueryMode::DetailLinks(id, dimension);
        let composed = warehouse.composer().compose(&filter, mode);
        warehouse
            .caches()
            .dimension_refs
            .get_or_compute(&composed.cache_key, || {
                warehouse.fetch_all(&composed, mode.name())
            })
            .await
    }

    async fn player_counts(
        warehouse: &Warehouse,
        id: GameId,
    ) -> WarehouseResult<Vec<PlayerCountVotes>> {
        let filter = GameFilter::default();
        let mode = QueryMode::DetailPlayerCounts(id);
        let composed = warehouse.composer().compose(&filter, mode);
        warehouse
            .caches()
            .player_counts
            .get_or_compute(&composed.cache_key, || {
                warehouse.fetch_all(&composed, mode.name())
            })
            .await
    }
}
