//! Composition behaviour through the public API, no warehouse required.

use meeple_core::filter::{GameFilter, SortDirection, SortField};
use meeple_core::types::Dimension;
use meeple_db::compose::{QueryComposer, QueryMode};
use meeple_db::params::ParamValue;
use meeple_db::template::TemplateBindings;
use meeple_db::{Environment, Warehouse, WarehouseConfig};

fn composer() -> QueryComposer {
    QueryComposer::new(
        TemplateBindings::new()
            .bind("dataset", "bgg_test")
            .bind("raw_dataset", "bgg_test_raw"),
    )
}

/// A typical browse request: years 2015-2020, rating 7.0-10.0, one category,
/// pages of 20. Page 0 and page 1 must be the same statement with only the
/// offset bind differing.
#[test]
fn paged_searches_differ_only_in_offset() {
    let page = |n: i64| {
        GameFilter::builder()
            .year_range(2015, 2020)
            .rating_range(7.0, 10.0)
            .category_ids([1009])
            .page_size(20)
            .page_number(n)
            .build()
            .unwrap()
    };

    let first = composer().compose(&page(0), QueryMode::Search);
    let second = composer().compose(&page(1), QueryMode::Search);

    assert_eq!(first.sql, second.sql);
    assert_ne!(first.cache_key, second.cache_key);

    let last = |q: &meeple_db::compose::ComposedQuery| q.params.last().cloned();
    assert_eq!(last(&first), Some(ParamValue::Int(0)));
    assert_eq!(last(&second), Some(ParamValue::Int(20)));
}

/// The count query ignores pagination, so every page of one search shares a
/// single cached total.
#[test]
fn all_pages_share_one_count_query() {
    let page = |n: i64| {
        GameFilter::builder()
            .category_ids([1009])
            .page_size(20)
            .page_number(n)
            .build()
            .unwrap()
    };
    let count0 = composer().compose(&page(0), QueryMode::SearchCount);
    let count1 = composer().compose(&page(1), QueryMode::SearchCount);
    assert_eq!(count0.cache_key, count1.cache_key);
}

#[test]
fn every_axis_contributes_conjunctively() {
    let filter = GameFilter::builder()
        .year_range(2010, 2020)
        .rating_range(6.5, 9.0)
        .complexity_range(2.0, 4.0)
        .player_count_range(2, 4)
        .publisher_ids([10])
        .designer_ids([20])
        .category_ids([30])
        .mechanic_ids([40])
        .active_only(true)
        .best_player_count_only(true)
        .name_query("war")
        .build()
        .unwrap();

    let composed = composer().compose(&filter, QueryMode::SearchCount);
    for fragment in [
        "g.year_published >=",
        "g.bayes_average >=",
        "g.average_weight >=",
        "pcr.player_count >=",
        "game_publishers",
        "game_designers",
        "game_categories",
        "game_mechanics",
        "g.is_active",
        "pcr.is_best",
        "g.name ILIKE",
    ] {
        assert!(
            composed.sql.contains(fragment),
            "missing {fragment}: {}",
            composed.sql
        );
    }
    // 2 + 2 + 2 + 2 range binds, 4 arrays, 1 needle
    assert_eq!(composed.params.len(), 13);
}

#[test]
fn sort_changes_text_but_not_binds() {
    let by_rating = GameFilter::builder()
        .sort(SortField::BayesAverage, SortDirection::Descending)
        .build()
        .unwrap();
    let by_name = GameFilter::builder()
        .sort(SortField::Name, SortDirection::Ascending)
        .build()
        .unwrap();

    let a = composer().compose(&by_rating, QueryMode::Search);
    let b = composer().compose(&by_name, QueryMode::Search);
    assert_ne!(a.sql, b.sql);
    assert_eq!(a.params, b.params);
    assert!(a.sql.contains("ORDER BY g.bayes_average DESC, g.game_id DESC"));
    assert!(b.sql.contains("ORDER BY g.name ASC, g.game_id ASC"));
}

#[test]
fn warehouse_exposes_a_configured_composer_without_connecting() {
    let config = WarehouseConfig::new(Environment::Test, "postgres://localhost/warehouse");
    let warehouse = Warehouse::new(config);

    let filter = GameFilter::builder().build().unwrap();
    let composed = warehouse.composer().compose(&filter, QueryMode::Search);
    assert!(composed.sql.contains("bgg_test.games_active"));
    assert!(!composed.sql.contains("${"));
}

#[test]
fn detail_modes_compose_for_all_dimensions() {
    let filter = GameFilter::default();
    for dimension in Dimension::ALL {
        let composed = composer().compose(&filter, QueryMode::DetailLinks(42, dimension));
        assert_eq!(composed.params, vec![ParamValue::Int(42)]);
        assert!(composed.sql.contains("WHERE b.game_id = $1"));
    }
}
