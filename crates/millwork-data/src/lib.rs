//! Data directory loading for Millwork games.
//!
//! Node types, recipes and resources live in separate files, each in RON,
//! TOML or JSON. [`load_game_data`] reads them, resolves recipe references
//! and hands the result to the core catalog builder.

pub mod loader;

pub use loader::{DataLoadError, GameData, load_config, load_game_data};
