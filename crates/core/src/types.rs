//! Shared identifier and timestamp aliases.

use serde::{Deserialize, Serialize};

/// Warehouse-assigned game identifier.
pub type GameId = i64;

/// Warehouse-assigned identifier for a dimension value (publisher, designer,
/// category, or mechanic).
pub type DimensionId = i64;

/// One many-to-many dimension a game can be associated with.
///
/// Each dimension has its own entity table and bridge table in the warehouse;
/// the mapping lives in the query composer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Publisher,
    Designer,
    Category,
    Mechanic,
}

impl Dimension {
    /// All dimensions, in the order detail pages present them.
    pub const ALL: [Dimension; 4] = [
        Dimension::Publisher,
        Dimension::Designer,
        Dimension::Category,
        Dimension::Mechanic,
    ];

    /// Stable lowercase name, used in diagnostics and cache keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Dimension::Publisher => "publisher",
            Dimension::Designer => "designer",
            Dimension::Category => "category",
            Dimension::Mechanic => "mechanic",
        }
    }
}
