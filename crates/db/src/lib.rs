//! Data access layer for the board-game warehouse.
//!
//! Translates a validated [`meeple_core::filter::GameFilter`] into safe,
//! parameterized SQL against a remote analytical warehouse, executes it over
//! a shared lazily-initialized pool, and memoizes results for a bounded
//! time. UI collaborators talk to the typed repositories only:
//!
//! ```no_run
//! use meeple_core::filter::GameFilter;
//! use meeple_db::repositories::GameRepo;
//! use meeple_db::{Warehouse, WarehouseConfig};
//!
//! # async fn run() -> Result<(), meeple_db::WarehouseError> {
//! let warehouse = Warehouse::new(WarehouseConfig::from_env());
//! let filter = GameFilter::builder()
//!     .year_range(2015, 2020)
//!     .rating_range(7.0, 10.0)
//!     .page_size(20)
//!     .build()?;
//! let page = GameRepo::search(&warehouse, &filter).await?;
//! println!("{} of {} games", page.games.len(), page.total);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod client;
pub mod compose;
pub mod config;
pub mod error;
pub mod models;
pub mod params;
pub mod repositories;
pub mod template;

pub use client::Warehouse;
pub use config::{Environment, WarehouseConfig};
pub use error::{QueryFailureKind, WarehouseError, WarehouseResult};
