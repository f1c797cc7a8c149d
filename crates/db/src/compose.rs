//! The query composer: turns a validated [`GameFilter`] plus a [`QueryMode`]
//! into one parameterized SQL statement, its bind list, and a cache key.
//!
//! The composer is pure (it never touches the network), so every query
//! shape is testable without a warehouse. Two invariants hold throughout:
//!
//! - User-supplied scalars (range bounds, ids, text) travel only through the
//!   bind list, never through the SQL text.
//! - Identical filters (including id-set contents regardless of insertion
//!   order) compose to identical text, binds, and cache key.

use sha2::{Digest, Sha256};

use meeple_core::filter::GameFilter;
use meeple_core::types::{Dimension, GameId};

use crate::params::{render_params, ParamValue};
use crate::template::TemplateBindings;

/// Year window for the publication-year distribution, matching the catalog's
/// useful range.
const YEAR_DIST_FLOOR: i32 = 1970;
const YEAR_DIST_CEIL: i32 = 2025;

/// Scalar columns selected for every game row.
const GAME_COLUMNS: &str = "\
    g.game_id, g.name, g.year_published, g.average_rating, g.bayes_average, \
    g.average_weight, g.users_rated, g.min_players, g.max_players, \
    g.playing_time, g.thumbnail, g.is_active";

/// Derived columns: best/recommended player counts aggregated into ordered
/// comma-joined lists, plus association counts. Ordered by player count so
/// repeated executions are stable.
const DERIVED_COLUMNS: &str = "\
    (SELECT string_agg(pcr.player_count::text, ',' ORDER BY pcr.player_count) \
       FROM ${dataset}.player_count_recommendations pcr \
      WHERE pcr.game_id = g.game_id AND pcr.is_best) AS best_player_counts, \
    (SELECT string_agg(pcr.player_count::text, ',' ORDER BY pcr.player_count) \
       FROM ${dataset}.player_count_recommendations pcr \
      WHERE pcr.game_id = g.game_id AND pcr.is_recommended) AS recommended_player_counts, \
    (SELECT COUNT(*) FROM ${dataset}.game_categories gc \
      WHERE gc.game_id = g.game_id) AS category_count, \
    (SELECT COUNT(*) FROM ${dataset}.game_mechanics gm \
      WHERE gm.game_id = g.game_id) AS mechanic_count";

/// What a composed query is for.
///
/// A closed enum: payloads carry the detail identifier or dimension, so an
/// unsupported mode is unrepresentable rather than a runtime error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    /// One page of filtered, sorted game rows.
    Search,
    /// Total row count for the same filter (pagination UI).
    SearchCount,
    /// One game's full row.
    DetailById(GameId),
    /// The dimension values linked to one game.
    DetailLinks(GameId, Dimension),
    /// Per-player-count vote rows for one game.
    DetailPlayerCounts(GameId),
    /// All values of one dimension with active-game counts.
    DimensionList(Dimension),
    /// Catalog-wide scalar aggregates.
    SummaryStats,
    /// Game counts per rating bucket.
    RatingDistribution,
    /// Game counts per publication year.
    YearDistribution,
}

impl QueryMode {
    /// Stable name used in error annotations and logs.
    pub fn name(&self) -> &'static str {
        match self {
            QueryMode::Search => "search",
            QueryMode::SearchCount => "search_count",
            QueryMode::DetailById(_) => "detail",
            QueryMode::DetailLinks(..) => "detail_links",
            QueryMode::DetailPlayerCounts(_) => "detail_player_counts",
            QueryMode::DimensionList(_) => "dimension_list",
            QueryMode::SummaryStats => "summary_stats",
            QueryMode::RatingDistribution => "rating_distribution",
            QueryMode::YearDistribution => "year_distribution",
        }
    }
}

/// A finalized statement: resolved SQL text, ordered bind list, cache key.
#[derive(Debug, Clone)]
pub struct ComposedQuery {
    pub sql: String,
    pub params: Vec<ParamValue>,
    pub cache_key: String,
}

/// Builds parameterized statements against the warehouse schema.
#[derive(Debug, Clone)]
pub struct QueryComposer {
    bindings: TemplateBindings,
}

impl QueryComposer {
    pub fn new(bindings: TemplateBindings) -> Self {
        QueryComposer { bindings }
    }

    pub fn bindings(&self) -> &TemplateBindings {
        &self.bindings
    }

    /// Compose the statement for `mode`. Only the search modes read the
    /// filter; detail and aggregate modes carry their inputs in the mode
    /// payload.
    pub fn compose(&self, filter: &GameFilter, mode: QueryMode) -> ComposedQuery {
        let (sql, params) = match mode {
            QueryMode::Search => self.search_sql(filter),
            QueryMode::SearchCount => self.search_count_sql(filter),
            QueryMode::DetailById(id) => self.detail_sql(id),
            QueryMode::DetailLinks(id, dimension) => self.detail_links_sql(id, dimension),
            QueryMode::DetailPlayerCounts(id) => self.detail_player_counts_sql(id),
            QueryMode::DimensionList(dimension) => self.dimension_list_sql(dimension),
            QueryMode::SummaryStats => self.summary_sql(),
            QueryMode::RatingDistribution => self.rating_distribution_sql(),
            QueryMode::YearDistribution => self.year_distribution_sql(),
        };

        let sql = self.bindings.resolve(&sql);
        let cache_key = cache_key(&sql, &params);
        ComposedQuery {
            sql,
            params,
            cache_key,
        }
    }

    // -- search --------------------------------------------------------------

    fn search_sql(&self, filter: &GameFilter) -> (String, Vec<ParamValue>) {
        let (clauses, mut params) = search_conjuncts(filter);

        let column = filter.sort_field().column();
        let direction = filter.sort_direction().as_sql();

        params.push(ParamValue::Int(filter.page_size()));
        let limit_placeholder = params.len();
        params.push(ParamValue::Int(filter.offset()));
        let offset_placeholder = params.len();

        // game_id tie-break keeps paging deterministic when the primary sort
        // key has duplicates.
        let sql = format!(
            "SELECT {GAME_COLUMNS}, {DERIVED_COLUMNS} \
             FROM ${{dataset}}.games_active g \
             WHERE {} \
             ORDER BY g.{column} {direction}, g.game_id {direction} \
             LIMIT ${limit_placeholder} OFFSET ${offset_placeholder}",
            clauses.join(" AND "),
        );
        (sql, params)
    }

    fn search_count_sql(&self, filter: &GameFilter) -> (String, Vec<ParamValue>) {
        let (clauses, params) = search_conjuncts(filter);
        let sql = format!(
            "SELECT COUNT(*) FROM ${{dataset}}.games_active g WHERE {}",
            clauses.join(" AND "),
        );
        (sql, params)
    }

    // -- detail --------------------------------------------------------------

    fn detail_sql(&self, id: GameId) -> (String, Vec<ParamValue>) {
        let sql = format!(
            "SELECT {GAME_COLUMNS}, {DERIVED_COLUMNS} \
             FROM ${{dataset}}.games_active g \
             WHERE g.game_id = $1"
        );
        (sql, vec![ParamValue::Int(id)])
    }

    fn detail_links_sql(&self, id: GameId, dimension: Dimension) -> (String, Vec<ParamValue>) {
        let tables = DimensionTables::for_dimension(dimension);
        let sql = format!(
            "SELECT d.{id_column} AS id, d.name \
             FROM ${{dataset}}.{entity} d \
             JOIN ${{dataset}}.{bridge} b ON b.{id_column} = d.{id_column} \
             WHERE b.game_id = $1 \
             ORDER BY d.name, d.{id_column}",
            entity = tables.entity,
            bridge = tables.bridge,
            id_column = tables.id_column,
        );
        (sql, vec![ParamValue::Int(id)])
    }

    fn detail_player_counts_sql(&self, id: GameId) -> (String, Vec<ParamValue>) {
        let sql = "\
            SELECT pcr.player_count, pcr.best_votes, pcr.recommended_votes, \
                   pcr.not_recommended_votes, pcr.is_best, pcr.is_recommended \
            FROM ${dataset}.player_count_recommendations pcr \
            WHERE pcr.game_id = $1 \
            ORDER BY pcr.player_count"
            .to_string();
        (sql, vec![ParamValue::Int(id)])
    }

    // -- dimension listing ----------------------------------------------------

    fn dimension_list_sql(&self, dimension: Dimension) -> (String, Vec<ParamValue>) {
        let tables = DimensionTables::for_dimension(dimension);
        // Counts are context-free: each value is counted against the whole
        // active set, independent of any currently selected filters.
        let sql = format!(
            "SELECT d.{id_column} AS id, d.name AS label, \
                    COUNT(DISTINCT b.game_id) AS game_count \
             FROM ${{dataset}}.{entity} d \
             JOIN ${{dataset}}.{bridge} b ON b.{id_column} = d.{id_column} \
             JOIN ${{dataset}}.games_active g ON g.game_id = b.game_id AND g.is_active \
             GROUP BY d.{id_column}, d.name \
             ORDER BY d.name, d.{id_column}",
            entity = tables.entity,
            bridge = tables.bridge,
            id_column = tables.id_column,
        );
        (sql, Vec::new())
    }

    // -- aggregates ----------------------------------------------------------

    fn summary_sql(&self) -> (String, Vec<ParamValue>) {
        let sql = "\
            SELECT \
              (SELECT COUNT(*) FROM ${dataset}.games_active \
                WHERE is_active) AS total_games, \
              (SELECT COUNT(*) FROM ${dataset}.games_active \
                WHERE is_active AND bayes_average > 0) AS rated_games, \
              (SELECT AVG(bayes_average) FROM ${dataset}.games_active \
                WHERE is_active AND bayes_average > 0) AS average_rating, \
              (SELECT AVG(average_weight) FROM ${dataset}.games_active \
                WHERE is_active AND average_weight > 0) AS average_complexity, \
              (SELECT COUNT(*) FROM ${dataset}.categories) AS category_count, \
              (SELECT COUNT(*) FROM ${dataset}.mechanics) AS mechanic_count, \
              (SELECT COUNT(*) FROM ${dataset}.designers) AS designer_count, \
              (SELECT COUNT(*) FROM ${dataset}.publishers) AS publisher_count"
            .to_string();
        (sql, Vec::new())
    }

    fn rating_distribution_sql(&self) -> (String, Vec<ParamValue>) {
        // Quarter-point buckets over the 0-10 rating scale.
        let sql = "\
            SELECT FLOOR(g.bayes_average * 4) / 4 AS bucket, \
                   COUNT(*) AS game_count \
            FROM ${dataset}.games_active g \
            WHERE g.is_active AND g.bayes_average > 0 \
            GROUP BY bucket \
            ORDER BY bucket"
            .to_string();
        (sql, Vec::new())
    }

    fn year_distribution_sql(&self) -> (String, Vec<ParamValue>) {
        let sql = format!(
            "SELECT g.year_published::float8 AS bucket, \
                    COUNT(*) AS game_count \
             FROM ${{dataset}}.games_active g \
             WHERE g.is_active \
               AND g.year_published BETWEEN {YEAR_DIST_FLOOR} AND {YEAR_DIST_CEIL} \
             GROUP BY bucket \
             ORDER BY bucket"
        );
        (sql, Vec::new())
    }
}

// ---------------------------------------------------------------------------
// WHERE-clause assembly
// ---------------------------------------------------------------------------

/// Build the conjunct list and bind list shared by `Search` and
/// `SearchCount`. Clause order is fixed, so equal filters always produce the
/// same placeholder numbering.
fn search_conjuncts(filter: &GameFilter) -> (Vec<String>, Vec<ParamValue>) {
    let mut clauses = vec![
        "g.bayes_average IS NOT NULL".to_string(),
        "g.bayes_average > 0".to_string(),
    ];
    let mut params = Vec::new();

    if let Some((min, max)) = filter.year_range() {
        push_int_range(&mut clauses, &mut params, "g.year_published", min, max);
    }
    if let Some((min, max)) = filter.rating_range() {
        push_float_range(&mut clauses, &mut params, "g.bayes_average", min, max);
    }
    if let Some((min, max)) = filter.complexity_range() {
        push_float_range(&mut clauses, &mut params, "g.average_weight", min, max);
    }
    if let Some((min, max)) = filter.player_count_range() {
        // The filtered field lives on recommendation rows; EXISTS avoids the
        // row duplication a plain join would cause.
        params.push(ParamValue::Int(min as i64));
        let min_placeholder = params.len();
        params.push(ParamValue::Int(max as i64));
        let max_placeholder = params.len();
        clauses.push(format!(
            "EXISTS (SELECT 1 FROM ${{dataset}}.player_count_recommendations pcr \
             WHERE pcr.game_id = g.game_id \
               AND pcr.player_count >= ${min_placeholder} \
               AND pcr.player_count <= ${max_placeholder})"
        ));
    }

    for dimension in [Dimension::Publisher, Dimension::Designer, Dimension::Category, Dimension::Mechanic] {
        let ids = match dimension {
            Dimension::Publisher => filter.publisher_ids(),
            Dimension::Designer => filter.designer_ids(),
            Dimension::Category => filter.category_ids(),
            Dimension::Mechanic => filter.mechanic_ids(),
        };
        push_membership(&mut clauses, &mut params, dimension, ids);
    }

    if filter.active_only() {
        clauses.push("g.is_active".to_string());
    }
    if filter.best_player_count_only() {
        clauses.push(
            "EXISTS (SELECT 1 FROM ${dataset}.player_count_recommendations pcr \
             WHERE pcr.game_id = g.game_id AND pcr.is_best)"
                .to_string(),
        );
    }

    if let Some(query) = filter.name_query() {
        params.push(ParamValue::Text(format!("%{}%", escape_like(query))));
        clauses.push(format!("g.name ILIKE ${} ESCAPE '\\'", params.len()));
    }

    (clauses, params)
}

fn push_int_range(
    clauses: &mut Vec<String>,
    params: &mut Vec<ParamValue>,
    column: &str,
    min: i32,
    max: i32,
) {
    params.push(ParamValue::Int(min as i64));
    clauses.push(format!("{column} >= ${}", params.len()));
    params.push(ParamValue::Int(max as i64));
    clauses.push(format!("{column} <= ${}", params.len()));
}

fn push_float_range(
    clauses: &mut Vec<String>,
    params: &mut Vec<ParamValue>,
    column: &str,
    min: f64,
    max: f64,
) {
    params.push(ParamValue::Float(min));
    clauses.push(format!("{column} >= ${}", params.len()));
    params.push(ParamValue::Float(max));
    clauses.push(format!("{column} <= ${}", params.len()));
}

/// Membership filter: the game matches if associated with ANY selected id
/// (OR within the axis); axes combine conjunctively. An empty set adds
/// nothing, so it composes identically to an omitted axis.
fn push_membership(
    clauses: &mut Vec<String>,
    params: &mut Vec<ParamValue>,
    dimension: Dimension,
    ids: &std::collections::BTreeSet<i64>,
) {
    if ids.is_empty() {
        return;
    }
    let tables = DimensionTables::for_dimension(dimension);
    params.push(ParamValue::IntArray(ids.iter().copied().collect()));
    clauses.push(format!(
        "EXISTS (SELECT 1 FROM ${{dataset}}.{bridge} b \
         WHERE b.game_id = g.game_id AND b.{id_column} = ANY(${placeholder}))",
        bridge = tables.bridge,
        id_column = tables.id_column,
        placeholder = params.len(),
    ));
}

/// Escape LIKE wildcards in user text so the match stays a literal substring
/// test.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Warehouse tables backing one dimension.
struct DimensionTables {
    entity: &'static str,
    bridge: &'static str,
    id_column: &'static str,
}

impl DimensionTables {
    fn for_dimension(dimension: Dimension) -> Self {
        let (entity, bridge, id_column) = match dimension {
            Dimension::Publisher => ("publishers", "game_publishers", "publisher_id"),
            Dimension::Designer => ("designers", "game_designers", "designer_id"),
            Dimension::Category => ("categories", "game_categories", "category_id"),
            Dimension::Mechanic => ("mechanics", "game_mechanics", "mechanic_id"),
        };
        DimensionTables {
            entity,
            bridge,
            id_column,
        }
    }
}

/// Deterministic fingerprint of a finalized statement: SHA-256 over the
/// resolved SQL text and the ordered bind list.
fn cache_key(sql: &str, params: &[ParamValue]) -> String {
    let digest = Sha256::digest(format!("{sql}\n{}", render_params(params)).as_bytes());
    format!("{digest:x}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
