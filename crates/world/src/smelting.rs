//! Smelting recipes, fuel values and furnace variants.

use everburn_core::{CoreError, ItemCategory, ItemType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Base cook time of a standard furnace recipe (10 seconds at 20 TPS).
pub const DEFAULT_COOK_TICKS: u32 = 200;

/// Furnace variant. Selects which recipes apply and how fast they cook.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FurnaceKind {
    /// Smelts everything at base speed.
    #[default]
    Furnace,
    /// Ores only, twice as fast.
    BlastFurnace,
    /// Food only, twice as fast.
    Smoker,
}

impl FurnaceKind {
    /// Cook speed multiplier relative to a standard furnace.
    pub fn speed(self) -> u32 {
        match self {
            FurnaceKind::Furnace => 1,
            FurnaceKind::BlastFurnace | FurnaceKind::Smoker => 2,
        }
    }

    /// Whether this variant accepts inputs of the given category.
    pub fn accepts(self, category: ItemCategory) -> bool {
        match self {
            FurnaceKind::Furnace => true,
            FurnaceKind::BlastFurnace => category == ItemCategory::Ore,
            FurnaceKind::Smoker => category == ItemCategory::Food,
        }
    }

    /// Ticks one craft of `recipe` takes in this variant.
    pub fn cook_time(self, recipe: &SmeltRecipe) -> u32 {
        (recipe.cook_time / self.speed()).max(1)
    }
}

/// A smelting recipe: one input item -> one output item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmeltRecipe {
    /// Item consumed per craft.
    pub input: ItemType,
    /// Item produced per craft.
    pub output: ItemType,
    /// Base ticks per craft in a standard furnace.
    pub cook_time: u32,
}

/// All built-in smelting recipes.
pub const SMELT_RECIPES: &[SmeltRecipe] = &[
    SmeltRecipe {
        input: ItemType::IronOre,
        output: ItemType::IronIngot,
        cook_time: DEFAULT_COOK_TICKS,
    },
    SmeltRecipe {
        input: ItemType::GoldOre,
        output: ItemType::GoldIngot,
        cook_time: DEFAULT_COOK_TICKS,
    },
    SmeltRecipe {
        input: ItemType::RawPork,
        output: ItemType::CookedPork,
        cook_time: DEFAULT_COOK_TICKS,
    },
    SmeltRecipe {
        input: ItemType::RawBeef,
        output: ItemType::CookedBeef,
        cook_time: DEFAULT_COOK_TICKS,
    },
    SmeltRecipe {
        input: ItemType::Sand,
        output: ItemType::Glass,
        cook_time: DEFAULT_COOK_TICKS,
    },
    SmeltRecipe {
        input: ItemType::Cobblestone,
        output: ItemType::Stone,
        cook_time: DEFAULT_COOK_TICKS,
    },
];

/// Fuel definition: how long one unit burns and what it leaves behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuelValue {
    /// Fuel item.
    pub item: ItemType,
    /// Ticks a single unit sustains burning.
    pub burn_duration: u32,
    /// Item left in the fuel slot once the last unit is consumed.
    #[serde(default)]
    pub remainder: Option<ItemType>,
}

/// All built-in fuels.
pub const FUEL_VALUES: &[FuelValue] = &[
    FuelValue {
        item: ItemType::Coal,
        burn_duration: 1600,
        remainder: None,
    },
    FuelValue {
        item: ItemType::OakLog,
        burn_duration: 300,
        remainder: None,
    },
    FuelValue {
        item: ItemType::OakPlanks,
        burn_duration: 300,
        remainder: None,
    },
    FuelValue {
        item: ItemType::Stick,
        burn_duration: 100,
        remainder: None,
    },
    FuelValue {
        item: ItemType::LavaBucket,
        burn_duration: 20_000,
        remainder: Some(ItemType::Bucket),
    },
];

/// Lookup tables for smelting recipes and fuels.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeBook {
    recipes: BTreeMap<ItemType, SmeltRecipe>,
    fuels: BTreeMap<ItemType, FuelValue>,
}

impl Default for RecipeBook {
    fn default() -> Self {
        Self {
            recipes: SMELT_RECIPES.iter().map(|r| (r.input, *r)).collect(),
            fuels: FUEL_VALUES.iter().map(|f| (f.item, *f)).collect(),
        }
    }
}

impl RecipeBook {
    /// Build a book from explicit definitions.
    ///
    /// Rejects zero cook times, zero burn durations and duplicate keys.
    pub fn new(recipes: Vec<SmeltRecipe>, fuels: Vec<FuelValue>) -> Result<Self, CoreError> {
        let mut book = Self {
            recipes: BTreeMap::new(),
            fuels: BTreeMap::new(),
        };

        for recipe in recipes {
            if recipe.cook_time == 0 {
                return Err(CoreError::ZeroDuration {
                    what: "cook time",
                    item: recipe.input.to_string(),
                });
            }
            if book.recipes.insert(recipe.input, recipe).is_some() {
                return Err(CoreError::Duplicate {
                    what: "recipe",
                    item: recipe.input.to_string(),
                });
            }
        }

        for fuel in fuels {
            if fuel.burn_duration == 0 {
                return Err(CoreError::ZeroDuration {
                    what: "burn duration",
                    item: fuel.item.to_string(),
                });
            }
            if book.fuels.insert(fuel.item, fuel).is_some() {
                return Err(CoreError::Duplicate {
                    what: "fuel",
                    item: fuel.item.to_string(),
                });
            }
        }

        Ok(book)
    }

    /// Resolve the recipe a furnace of `kind` would use for `input`.
    pub fn recipe_for(&self, kind: FurnaceKind, input: ItemType) -> Option<&SmeltRecipe> {
        if !kind.accepts(input.category()) {
            return None;
        }
        self.recipes.get(&input)
    }

    /// Fuel definition for `item`, if it burns.
    pub fn fuel(&self, item: ItemType) -> Option<&FuelValue> {
        self.fuels.get(&item)
    }

    /// Burn duration for `item` (0 if not valid fuel).
    pub fn burn_duration(&self, item: ItemType) -> u32 {
        self.fuel(item).map(|f| f.burn_duration).unwrap_or(0)
    }

    /// Check if an item is valid fuel.
    pub fn is_fuel(&self, item: ItemType) -> bool {
        self.burn_duration(item) > 0
    }

    /// Check if any furnace variant can smelt `item`.
    pub fn is_smeltable(&self, item: ItemType) -> bool {
        self.recipes.contains_key(&item)
    }

    /// Iterate recipes in deterministic input order.
    pub fn recipes(&self) -> impl Iterator<Item = &SmeltRecipe> {
        self.recipes.values()
    }

    /// Iterate fuels in deterministic item order.
    pub fn fuels(&self) -> impl Iterator<Item = &FuelValue> {
        self.fuels.values()
    }
}
