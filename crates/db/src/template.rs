//! Query-text template resolution.
//!
//! SQL templates reference schemas through `${name}` tokens so one query text
//! serves every deployment environment. Only registered tokens are
//! substituted; an unrecognized token is left in place; it signals that a
//! new binding needs registering, and the warehouse will reject the text
//! loudly rather than silently querying the wrong place.

use crate::config::WarehouseConfig;

/// Token name for the curated-data schema.
pub const DATASET: &str = "dataset";

/// Token name for the raw/bookkeeping schema.
pub const RAW_DATASET: &str = "raw_dataset";

/// Named values substituted into query templates.
#[derive(Debug, Clone, Default)]
pub struct TemplateBindings {
    bindings: Vec<(String, String)>,
}

impl TemplateBindings {
    pub fn new() -> Self {
        TemplateBindings::default()
    }

    /// Bindings for a configured warehouse: `${dataset}` and `${raw_dataset}`.
    pub fn from_config(config: &WarehouseConfig) -> Self {
        TemplateBindings::new()
            .bind(DATASET, &config.dataset)
            .bind(RAW_DATASET, &config.raw_dataset)
    }

    /// Register a token. Re-binding an existing name replaces its value.
    pub fn bind(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        if let Some(entry) = self.bindings.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = value;
        } else {
            self.bindings.push((name, value));
        }
        self
    }

    /// Replace every occurrence of each bound `${name}` token.
    pub fn resolve(&self, text: &str) -> String {
        self.bindings
            .iter()
            .fold(text.to_string(), |acc, (name, value)| {
                acc.replace(&format!("${{{name}}}"), value)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Environment, WarehouseConfig};

    #[test]
    fn resolves_every_occurrence() {
        let bindings = TemplateBindings::new().bind("dataset", "bgg_dev");
        let sql = "SELECT * FROM ${dataset}.games g JOIN ${dataset}.categories c ON true";
        let resolved = bindings.resolve(sql);
        assert!(!resolved.contains("${dataset}"));
        assert_eq!(resolved.matches("bgg_dev").count(), 2);
    }

    #[test]
    fn unrecognized_tokens_are_left_unchanged() {
        let bindings = TemplateBindings::new().bind("dataset", "bgg_dev");
        let resolved = bindings.resolve("SELECT * FROM ${mystery}.games");
        assert_eq!(resolved, "SELECT * FROM ${mystery}.games");
    }

    #[test]
    fn rebinding_replaces_the_value() {
        let bindings = TemplateBindings::new()
            .bind("dataset", "one")
            .bind("dataset", "two");
        assert_eq!(bindings.resolve("${dataset}"), "two");
    }

    #[test]
    fn config_bindings_cover_both_schemas() {
        let config = WarehouseConfig::new(Environment::Test, "postgres://localhost/warehouse");
        let bindings = TemplateBindings::from_config(&config);
        assert_eq!(
            bindings.resolve("${dataset} ${raw_dataset}"),
            "bgg_test bgg_test_raw"
        );
    }
}
