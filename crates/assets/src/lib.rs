#![warn(missing_docs)]
//! Smelting pack schema + validation helpers.

mod loader;

pub use loader::{load_pack_from_str, recipe_book_from_file, recipe_book_from_str};

use everburn_core::CoreError;
use everburn_world::DEFAULT_COOK_TICKS;
use serde::Deserialize;
use thiserror::Error;

/// Smelting pack as written on disk.
#[derive(Debug, Default, Deserialize)]
pub struct SmeltingPack {
    /// Keep the built-in recipes and fuels; pack entries override them by key.
    #[serde(default)]
    pub extend_defaults: bool,
    /// Recipe definitions.
    #[serde(default)]
    pub recipes: Vec<RecipeDefinition>,
    /// Fuel definitions.
    #[serde(default)]
    pub fuels: Vec<FuelDefinition>,
}

/// One smelting recipe (e.g., `{"input": "iron_ore", "output": "iron_ingot"}`).
#[derive(Debug, Deserialize)]
pub struct RecipeDefinition {
    /// Input item identifier.
    pub input: String,
    /// Output item identifier.
    pub output: String,
    /// Base ticks per craft in a standard furnace.
    #[serde(default = "default_cook_time")]
    pub cook_time: u32,
}

/// One fuel (e.g., `{"item": "lava_bucket", "burn_duration": 20000, "remainder": "bucket"}`).
#[derive(Debug, Deserialize)]
pub struct FuelDefinition {
    /// Fuel item identifier.
    pub item: String,
    /// Ticks one unit burns.
    pub burn_duration: u32,
    /// Item left in the slot once the last unit burns out.
    #[serde(default)]
    pub remainder: Option<String>,
}

fn default_cook_time() -> u32 {
    DEFAULT_COOK_TICKS
}

/// Errors emitted during pack loading.
#[derive(Debug, Error)]
pub enum AssetError {
    /// Wrap IO errors when reading packs.
    #[error("failed to read smelting pack: {0}")]
    Io(#[from] std::io::Error),
    /// Wrap serde parsing issues.
    #[error("failed to parse smelting pack: {0}")]
    Parse(#[from] serde_json::Error),
    /// Pack parsed but describes an invalid recipe book.
    #[error("invalid smelting pack: {0}")]
    Invalid(#[from] CoreError),
}
