use std::fs;
use std::path::Path;

use everburn_core::ItemType;
use everburn_world::{FuelValue, RecipeBook, SmeltRecipe};

use crate::{AssetError, FuelDefinition, RecipeDefinition, SmeltingPack};

/// Load a recipe book from the provided JSON file path.
pub fn recipe_book_from_file(path: &Path) -> Result<RecipeBook, AssetError> {
    let data = fs::read_to_string(path)?;
    recipe_book_from_str(&data)
}

/// Load a recipe book from an in-memory JSON string.
pub fn recipe_book_from_str(input: &str) -> Result<RecipeBook, AssetError> {
    let pack = load_pack_from_str(input)?;

    let mut recipes = pack
        .recipes
        .iter()
        .map(resolve_recipe)
        .collect::<Result<Vec<_>, _>>()?;
    let mut fuels = pack
        .fuels
        .iter()
        .map(resolve_fuel)
        .collect::<Result<Vec<_>, _>>()?;

    if pack.extend_defaults {
        let defaults = RecipeBook::default();
        let inherited: Vec<SmeltRecipe> = defaults
            .recipes()
            .filter(|base| !recipes.iter().any(|r| r.input == base.input))
            .copied()
            .collect();
        recipes.extend(inherited);
        let inherited: Vec<FuelValue> = defaults
            .fuels()
            .filter(|base| !fuels.iter().any(|f| f.item == base.item))
            .copied()
            .collect();
        fuels.extend(inherited);
    }

    Ok(RecipeBook::new(recipes, fuels)?)
}

/// Parse a JSON string into a pack without resolving item identifiers.
pub fn load_pack_from_str(input: &str) -> Result<SmeltingPack, AssetError> {
    Ok(serde_json::from_str(input)?)
}

fn resolve_recipe(def: &RecipeDefinition) -> Result<SmeltRecipe, AssetError> {
    Ok(SmeltRecipe {
        input: def.input.parse::<ItemType>()?,
        output: def.output.parse::<ItemType>()?,
        cook_time: def.cook_time,
    })
}

fn resolve_fuel(def: &FuelDefinition) -> Result<FuelValue, AssetError> {
    let remainder = def
        .remainder
        .as_deref()
        .map(str::parse::<ItemType>)
        .transpose()?;
    Ok(FuelValue {
        item: def.item.parse::<ItemType>()?,
        burn_duration: def.burn_duration,
        remainder,
    })
}
