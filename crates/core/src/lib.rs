//! Domain types for the board-game warehouse browser.
//!
//! This crate has no database dependency: it holds the filter model that UI
//! collaborators build from widget state, the sort/dimension vocabulary, and
//! the validation errors raised before any query is composed. Everything that
//! touches the warehouse lives in `meeple-db`.

pub mod error;
pub mod filter;
pub mod types;
