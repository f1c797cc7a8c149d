//! The filter model: a typed, immutable description of one search request.
//!
//! UI collaborators build a [`GameFilter`] from widget state (usually via the
//! raw [`GameFilterParams`] DTO) and hand it to the repositories in
//! `meeple-db`. All cross-field invariants are enforced here, at
//! construction time, so the query composer never sees an invalid filter.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DimensionId;

// ---------------------------------------------------------------------------
// Pagination defaults
// ---------------------------------------------------------------------------

/// Default number of games per page.
pub const DEFAULT_PAGE_SIZE: i64 = 25;

/// Maximum number of games per page. Larger requests are clamped.
pub const MAX_PAGE_SIZE: i64 = 100;

// ---------------------------------------------------------------------------
// Domain bounds used when a range arrives with one side open
// ---------------------------------------------------------------------------

/// Earliest publication year the catalog tracks.
pub const YEAR_FLOOR: i32 = 0;

/// Latest publication year the catalog tracks.
pub const YEAR_CEIL: i32 = 9999;

/// Rating scale bounds (Geek rating, 0-10).
pub const RATING_FLOOR: f64 = 0.0;
pub const RATING_CEIL: f64 = 10.0;

/// Complexity weight scale bounds (0-5).
pub const COMPLEXITY_FLOOR: f64 = 0.0;
pub const COMPLEXITY_CEIL: f64 = 5.0;

/// Player count bounds.
pub const PLAYERS_FLOOR: i32 = 1;
pub const PLAYERS_CEIL: i32 = 99;

// ---------------------------------------------------------------------------
// Sort vocabulary
// ---------------------------------------------------------------------------

/// Columns a search can be sorted by.
///
/// A closed enum: the composer turns these into column names, so user input
/// can never reach the ORDER BY clause as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Name,
    YearPublished,
    AverageRating,
    BayesAverage,
    Complexity,
    UsersRated,
}

impl SortField {
    /// The warehouse column this field sorts on.
    pub fn column(self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::YearPublished => "year_published",
            SortField::AverageRating => "average_rating",
            SortField::BayesAverage => "bayes_average",
            SortField::Complexity => "average_weight",
            SortField::UsersRated => "users_rated",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

// ---------------------------------------------------------------------------
// GameFilter
// ---------------------------------------------------------------------------

/// One validated search request.
///
/// Immutable once built; every range satisfies `min <= max`, `page_size` is
/// in `1..=MAX_PAGE_SIZE`, and `page_number` is non-negative. Id sets are
/// held sorted and deduplicated, so two filters with the same members compare
/// equal regardless of insertion order. An empty id set means "no filter on
/// this axis", never "match nothing".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameFilter {
    year_range: Option<(i32, i32)>,
    rating_range: Option<(f64, f64)>,
    complexity_range: Option<(f64, f64)>,
    player_count_range: Option<(i32, i32)>,
    publisher_ids: BTreeSet<DimensionId>,
    designer_ids: BTreeSet<DimensionId>,
    category_ids: BTreeSet<DimensionId>,
    mechanic_ids: BTreeSet<DimensionId>,
    active_only: bool,
    best_player_count_only: bool,
    name_query: Option<String>,
    sort_field: SortField,
    sort_direction: SortDirection,
    page_size: i64,
    page_number: i64,
}

impl Default for GameFilter {
    fn default() -> Self {
        GameFilter {
            year_range: None,
            rating_range: None,
            complexity_range: None,
            player_count_range: None,
            publisher_ids: BTreeSet::new(),
            designer_ids: BTreeSet::new(),
            category_ids: BTreeSet::new(),
            mechanic_ids: BTreeSet::new(),
            active_only: false,
            best_player_count_only: false,
            name_query: None,
            sort_field: SortField::BayesAverage,
            sort_direction: SortDirection::Descending,
            page_size: DEFAULT_PAGE_SIZE,
            page_number: 0,
        }
    }
}

impl GameFilter {
    pub fn builder() -> GameFilterBuilder {
        GameFilterBuilder::default()
    }

    pub fn year_range(&self) -> Option<(i32, i32)> {
        self.year_range
    }

    pub fn rating_range(&self) -> Option<(f64, f64)> {
        self.rating_range
    }

    pub fn complexity_range(&self) -> Option<(f64, f64)> {
        self.complexity_range
    }

    pub fn player_count_range(&self) -> Option<(i32, i32)> {
        self.player_count_range
    }

    pub fn publisher_ids(&self) -> &BTreeSet<DimensionId> {
        &self.publisher_ids
    }

    pub fn designer_ids(&self) -> &BTreeSet<DimensionId> {
        &self.designer_ids
    }

    pub fn category_ids(&self) -> &BTreeSet<DimensionId> {
        &self.category_ids
    }

    pub fn mechanic_ids(&self) -> &BTreeSet<DimensionId> {
        &self.mechanic_ids
    }

    pub fn active_only(&self) -> bool {
        self.active_only
    }

    pub fn best_player_count_only(&self) -> bool {
        self.best_player_count_only
    }

    pub fn name_query(&self) -> Option<&str> {
        self.name_query.as_deref()
    }

    pub fn sort_field(&self) -> SortField {
        self.sort_field
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    /// Zero-based page number.
    pub fn page_number(&self) -> i64 {
        self.page_number
    }

    /// Row offset for this page (`page_size * page_number`).
    pub fn offset(&self) -> i64 {
        self.page_size * self.page_number
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for [`GameFilter`]. `build` runs all validation.
#[derive(Debug, Clone, Default)]
pub struct GameFilterBuilder {
    year_range: Option<(i32, i32)>,
    rating_range: Option<(f64, f64)>,
    complexity_range: Option<(f64, f64)>,
    player_count_range: Option<(i32, i32)>,
    publisher_ids: BTreeSet<DimensionId>,
    designer_ids: BTreeSet<DimensionId>,
    category_ids: BTreeSet<DimensionId>,
    mechanic_ids: BTreeSet<DimensionId>,
    active_only: bool,
    best_player_count_only: bool,
    name_query: Option<String>,
    sort_field: Option<SortField>,
    sort_direction: Option<SortDirection>,
    page_size: Option<i64>,
    page_number: Option<i64>,
}

impl GameFilterBuilder {
    pub fn year_range(mut self, min: i32, max: i32) -> Self {
        self.year_range = Some((min, max));
        self
    }

    pub fn rating_range(mut self, min: f64, max: f64) -> Self {
        self.rating_range = Some((min, max));
        self
    }

    pub fn complexity_range(mut self, min: f64, max: f64) -> Self {
        self.complexity_range = Some((min, max));
        self
    }

    pub fn player_count_range(mut self, min: i32, max: i32) -> Self {
        self.player_count_range = Some((min, max));
        self
    }

    pub fn publisher_ids(mut self, ids: impl IntoIterator<Item = DimensionId>) -> Self {
        self.publisher_ids = ids.into_iter().collect();
        self
    }

    pub fn designer_ids(mut self, ids: impl IntoIterator<Item = DimensionId>) -> Self {
        self.designer_ids = ids.into_iter().collect();
        self
    }

    pub fn category_ids(mut self, ids: impl IntoIterator<Item = DimensionId>) -> Self {
        self.category_ids = ids.into_iter().collect();
        self
    }

    pub fn mechanic_ids(mut self, ids: impl IntoIterator<Item = DimensionId>) -> Self {
        self.mechanic_ids = ids.into_iter().collect();
        self
    }

    pub fn active_only(mut self, value: bool) -> Self {
        self.active_only = value;
        self
    }

    pub fn best_player_count_only(mut self, value: bool) -> Self {
        self.best_player_count_only = value;
        self
    }

    /// Case-insensitive substring match on the game name. Whitespace-only
    /// input is treated as no filter.
    pub fn name_query(mut self, query: impl Into<String>) -> Self {
        self.name_query = Some(query.into());
        self
    }

    pub fn sort(mut self, field: SortField, direction: SortDirection) -> Self {
        self.sort_field = Some(field);
        self.sort_direction = Some(direction);
        self
    }

    pub fn page_size(mut self, size: i64) -> Self {
        self.page_size = Some(size);
        self
    }

    pub fn page_number(mut self, page: i64) -> Self {
        self.page_number = Some(page);
        self
    }

    /// Validate and freeze the filter.
    pub fn build(self) -> Result<GameFilter, CoreError> {
        if let Some((min, max)) = self.year_range {
            check_int_range("year_range", min, max)?;
        }
        if let Some((min, max)) = self.rating_range {
            check_float_range("rating_range", min, max)?;
        }
        if let Some((min, max)) = self.complexity_range {
            check_float_range("complexity_range", min, max)?;
        }
        if let Some((min, max)) = self.player_count_range {
            check_int_range("player_count_range", min, max)?;
        }

        let page_size = self.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size < 1 {
            return Err(CoreError::validation(
                "page_size",
                format!("must be at least 1, got {page_size}"),
            ));
        }
        let page_size = page_size.min(MAX_PAGE_SIZE);

        let page_number = self.page_number.unwrap_or(0);
        if page_number < 0 {
            return Err(CoreError::validation(
                "page_number",
                format!("must be non-negative, got {page_number}"),
            ));
        }

        let name_query = self
            .name_query
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty());

        Ok(GameFilter {
            year_range: self.year_range,
            rating_range: self.rating_range,
            complexity_range: self.complexity_range,
            player_count_range: self.player_count_range,
            publisher_ids: self.publisher_ids,
            designer_ids: self.designer_ids,
            category_ids: self.category_ids,
            mechanic_ids: self.mechanic_ids,
            active_only: self.active_only,
            best_player_count_only: self.best_player_count_only,
            name_query,
            sort_field: self.sort_field.unwrap_or(SortField::BayesAverage),
            sort_direction: self.sort_direction.unwrap_or(SortDirection::Descending),
            page_size,
            page_number,
        })
    }
}

fn check_int_range(field: &'static str, min: i32, max: i32) -> Result<(), CoreError> {
    if min > max {
        return Err(CoreError::validation(
            field,
            format!("min {min} exceeds max {max}"),
        ));
    }
    Ok(())
}

fn check_float_range(field: &'static str, min: f64, max: f64) -> Result<(), CoreError> {
    if !min.is_finite() || !max.is_finite() {
        return Err(CoreError::validation(field, "bounds must be finite"));
    }
    if min > max {
        return Err(CoreError::validation(
            field,
            format!("min {min} exceeds max {max}"),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Raw request DTO
// ---------------------------------------------------------------------------

/// Unvalidated filter parameters as a UI collaborator sends them.
///
/// Every field is optional; half-open ranges are widened to the domain
/// bounds (`YEAR_FLOOR`/`YEAR_CEIL` and friends) before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GameFilterParams {
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
    pub min_rating: Option<f64>,
    pub max_rating: Option<f64>,
    pub min_complexity: Option<f64>,
    pub max_complexity: Option<f64>,
    pub min_players: Option<i32>,
    pub max_players: Option<i32>,
    pub publisher_ids: Option<Vec<DimensionId>>,
    pub designer_ids: Option<Vec<DimensionId>>,
    pub category_ids: Option<Vec<DimensionId>>,
    pub mechanic_ids: Option<Vec<DimensionId>>,
    #[serde(default)]
    pub active_only: bool,
    #[serde(default)]
    pub best_player_count_only: bool,
    /// Free-text name query.
    pub q: Option<String>,
    pub sort_by: Option<SortField>,
    pub sort_order: Option<SortDirection>,
    pub page_size: Option<i64>,
    pub page: Option<i64>,
}

impl GameFilterParams {
    /// Validate into a [`GameFilter`].
    pub fn into_filter(self) -> Result<GameFilter, CoreError> {
        let mut builder = GameFilter::builder()
            .active_only(self.active_only)
            .best_player_count_only(self.best_player_count_only)
            .sort(
                self.sort_by.unwrap_or(SortField::BayesAverage),
                self.sort_order.unwrap_or(SortDirection::Descending),
            );

        if self.min_year.is_some() || self.max_year.is_some() {
            builder = builder.year_range(
                self.min_year.unwrap_or(YEAR_FLOOR),
                self.max_year.unwrap_or(YEAR_CEIL),
            );
        }
        if self.min_rating.is_some() || self.max_rating.is_some() {
            builder = builder.rating_range(
                self.min_rating.unwrap_or(RATING_FLOOR),
                self.max_rating.unwrap_or(RATING_CEIL),
            );
        }
        if self.min_complexity.is_some() || self.max_complexity.is_some() {
            builder = builder.complexity_range(
                self.min_complexity.unwrap_or(COMPLEXITY_FLOOR),
                self.max_complexity.unwrap_or(COMPLEXITY_CEIL),
            );
        }
        if self.min_players.is_some() || self.max_players.is_some() {
            builder = builder.player_count_range(
                self.min_players.unwrap_or(PLAYERS_FLOOR),
                self.max_players.unwrap_or(PLAYERS_CEIL),
            );
        }
        if let Some(ids) = self.publisher_ids {
            builder = builder.publisher_ids(ids);
        }
        if let Some(ids) = self.designer_ids {
            builder = builder.designer_ids(ids);
        }
        if let Some(ids) = self.category_ids {
            builder = builder.category_ids(ids);
        }
        if let Some(ids) = self.mechanic_ids {
            builder = builder.mechanic_ids(ids);
        }
        if let Some(q) = self.q {
            builder = builder.name_query(q);
        }
        if let Some(size) = self.page_size {
            builder = builder.page_size(size);
        }
        if let Some(page) = self.page {
            builder = builder.page_number(page);
        }

        builder.build()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    // -- defaults ------------------------------------------------------------

    #[test]
    fn empty_builder_yields_default_filter() {
        let filter = GameFilter::builder().build().unwrap();
        assert_eq!(filter, GameFilter::default());
        assert_eq!(filter.page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(filter.page_number(), 0);
        assert_eq!(filter.sort_field(), SortField::BayesAverage);
        assert_eq!(filter.sort_direction(), SortDirection::Descending);
    }

    // -- range validation ----------------------------------------------------

    #[test]
    fn inverted_year_range_is_rejected_naming_the_field() {
        let err = GameFilter::builder()
            .year_range(2020, 2015)
            .build()
            .unwrap_err();
        assert_matches!(err, CoreError::Validation { field: "year_range", .. });
    }

    #[test]
    fn inverted_rating_range_is_rejected() {
        let err = GameFilter::builder()
            .rating_range(9.0, 7.0)
            .build()
            .unwrap_err();
        assert_eq!(err.field(), "rating_range");
    }

    #[test]
    fn inverted_complexity_range_is_rejected() {
        let err = GameFilter::builder()
            .complexity_range(4.0, 1.5)
            .build()
            .unwrap_err();
        assert_eq!(err.field(), "complexity_range");
    }

    #[test]
    fn inverted_player_count_range_is_rejected() {
        let err = GameFilter::builder()
            .player_count_range(6, 2)
            .build()
            .unwrap_err();
        assert_eq!(err.field(), "player_count_range");
    }

    #[test]
    fn nan_rating_bound_is_rejected() {
        let err = GameFilter::builder()
            .rating_range(f64::NAN, 8.0)
            .build()
            .unwrap_err();
        assert_eq!(err.field(), "rating_range");
    }

    #[test]
    fn degenerate_range_is_valid() {
        let filter = GameFilter::builder().year_range(2019, 2019).build().unwrap();
        assert_eq!(filter.year_range(), Some((2019, 2019)));
    }

    // -- pagination ----------------------------------------------------------

    #[test]
    fn zero_page_size_is_rejected() {
        let err = GameFilter::builder().page_size(0).build().unwrap_err();
        assert_eq!(err.field(), "page_size");
    }

    #[test]
    fn oversized_page_size_is_clamped() {
        let filter = GameFilter::builder().page_size(10_000).build().unwrap();
        assert_eq!(filter.page_size(), MAX_PAGE_SIZE);
    }

    #[test]
    fn negative_page_number_is_rejected() {
        let err = GameFilter::builder().page_number(-1).build().unwrap_err();
        assert_eq!(err.field(), "page_number");
    }

    #[test]
    fn offset_is_page_size_times_page_number() {
        let filter = GameFilter::builder()
            .page_size(20)
            .page_number(3)
            .build()
            .unwrap();
        assert_eq!(filter.offset(), 60);
    }

    // -- id sets -------------------------------------------------------------

    #[test]
    fn id_sets_are_order_insensitive() {
        let a = GameFilter::builder()
            .category_ids([3, 1, 2])
            .build()
            .unwrap();
        let b = GameFilter::builder()
            .category_ids([2, 3, 1, 1])
            .build()
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_id_set_equals_omitted_axis() {
        let a = GameFilter::builder().publisher_ids([]).build().unwrap();
        let b = GameFilter::builder().build().unwrap();
        assert_eq!(a, b);
    }

    // -- name query ----------------------------------------------------------

    #[test]
    fn name_query_is_trimmed() {
        let filter = GameFilter::builder()
            .name_query("  catan  ")
            .build()
            .unwrap();
        assert_eq!(filter.name_query(), Some("catan"));
    }

    #[test]
    fn whitespace_only_name_query_is_dropped() {
        let filter = GameFilter::builder().name_query("   ").build().unwrap();
        assert_eq!(filter.name_query(), None);
    }

    // -- params DTO ----------------------------------------------------------

    #[test]
    fn params_widen_half_open_ranges() {
        let params = GameFilterParams {
            min_year: Some(2010),
            max_rating: Some(8.5),
            ..GameFilterParams::default()
        };
        let filter = params.into_filter().unwrap();
        assert_eq!(filter.year_range(), Some((2010, YEAR_CEIL)));
        assert_eq!(filter.rating_range(), Some((RATING_FLOOR, 8.5)));
    }

    #[test]
    fn params_propagate_validation_errors() {
        let params = GameFilterParams {
            min_players: Some(5),
            max_players: Some(2),
            ..GameFilterParams::default()
        };
        let err = params.into_filter().unwrap_err();
        assert_eq!(err.field(), "player_count_range");
    }

    #[test]
    fn params_carry_sets_flags_and_paging() {
        let params = GameFilterParams {
            category_ids: Some(vec![7, 7, 3]),
            active_only: true,
            q: Some("gloom".into()),
            page_size: Some(50),
            page: Some(2),
            ..GameFilterParams::default()
        };
        let filter = params.into_filter().unwrap();
        assert_eq!(
            filter.category_ids().iter().copied().collect::<Vec<_>>(),
            vec![3, 7]
        );
        assert!(filter.active_only());
        assert_eq!(filter.name_query(), Some("gloom"));
        assert_eq!(filter.page_size(), 50);
        assert_eq!(filter.offset(), 100);
    }
}
