//! Row structs and result shapes.
//!
//! Each submodule contains `FromRow + Serialize` structs matching the
//! warehouse rows an accessor decodes, plus the assembled shapes handed to
//! UI collaborators.

pub mod dimension;
pub mod game;
pub mod search_log;
pub mod stats;
