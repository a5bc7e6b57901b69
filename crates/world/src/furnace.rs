//! Furnace block state and the ordinary per-tick smelting update.
//!
//! The burning fuel unit stays in the fuel slot until its `lit_time` runs out,
//! so a lit furnace always holds at least one fuel item. Fuel only burns while
//! a craft is in progress; an idle lit furnace keeps its flame.

use crate::smelting::{FurnaceKind, RecipeBook, SmeltRecipe};
use everburn_core::{ItemStack, ItemType};
use serde::{Deserialize, Serialize};

/// State of a furnace in the world.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FurnaceState {
    /// Item in the input slot.
    pub input: Option<ItemStack>,
    /// Item in the fuel slot, including the unit currently burning.
    pub fuel: Option<ItemStack>,
    /// Item in the output slot.
    pub output: Option<ItemStack>,
    /// Remaining ticks of the burning fuel unit (0 when unlit).
    pub lit_time: u32,
    /// Full burn duration of the burning fuel unit.
    pub lit_duration: u32,
    /// Ticks accumulated toward the current craft.
    pub cooking_progress: u32,
    /// Ticks one craft of the locked recipe takes (0 when nothing is locked in).
    pub cooking_total_time: u32,
    /// Recipe most recently recorded as used.
    pub last_recipe: Option<SmeltRecipe>,
}

/// What a single tick changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// The lit flag flipped this tick.
    pub lit_changed: bool,
    /// A craft completed this tick.
    pub crafted: bool,
}

/// Shrink a slot, clearing it once empty. Returns how many items were removed.
pub(crate) fn shrink_slot(slot: &mut Option<ItemStack>, amount: u32) -> u32 {
    let Some(stack) = slot else {
        return 0;
    };
    let removed = stack.shrink(amount);
    if stack.is_empty() {
        *slot = None;
    }
    removed
}

fn slot_count(slot: &Option<ItemStack>) -> u32 {
    slot.map(|s| s.count).unwrap_or(0)
}

impl FurnaceState {
    /// Create a new empty furnace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether fuel is currently burning.
    pub fn is_lit(&self) -> bool {
        self.lit_time > 0
    }

    /// Items in the input slot.
    pub fn input_count(&self) -> u32 {
        slot_count(&self.input)
    }

    /// Items in the fuel slot.
    pub fn fuel_count(&self) -> u32 {
        slot_count(&self.fuel)
    }

    /// Items in the output slot.
    pub fn output_count(&self) -> u32 {
        slot_count(&self.output)
    }

    /// Whether the output slot cannot take another item of its type.
    pub fn output_is_full(&self) -> bool {
        self.output.map(|s| s.is_full()).unwrap_or(false)
    }

    /// Recipe a furnace of `kind` would apply to the current input.
    pub fn active_recipe(&self, kind: FurnaceKind, book: &RecipeBook) -> Option<SmeltRecipe> {
        let input = self.input?;
        book.recipe_for(kind, input.item_type).copied()
    }

    /// Whether one craft of `recipe` can run right now (input matches and the
    /// output slot has room for the product).
    pub fn can_burn(&self, recipe: &SmeltRecipe) -> bool {
        let Some(input) = self.input else {
            return false;
        };
        if input.item_type != recipe.input {
            return false;
        }
        match self.output {
            None => true,
            Some(out) => out.item_type == recipe.output && !out.is_full(),
        }
    }

    /// Convert one input item into one output item. Returns false (and changes
    /// nothing) when the craft is not currently possible.
    pub fn complete_craft(&mut self, recipe: &SmeltRecipe) -> bool {
        if !self.can_burn(recipe) {
            return false;
        }
        shrink_slot(&mut self.input, 1);
        match &mut self.output {
            None => self.output = Some(ItemStack::new(recipe.output, 1)),
            Some(out) => {
                out.grow(1);
            }
        }
        true
    }

    /// Record `recipe` as the last one used.
    pub fn set_recipe_used(&mut self, recipe: &SmeltRecipe) {
        self.last_recipe = Some(*recipe);
    }

    /// Consume the unit that just burned out. Starts the next unit, or leaves the
    /// furnace unlit with the fuel's remainder item once the slot runs dry.
    pub(crate) fn consume_fuel_unit(&mut self, book: &RecipeBook) {
        let Some(fuel) = self.fuel else {
            self.lit_time = 0;
            return;
        };
        let value = book.fuel(fuel.item_type).copied();
        shrink_slot(&mut self.fuel, 1);
        if self.fuel.is_none() {
            self.lit_time = 0;
            self.fuel = value
                .and_then(|v| v.remainder)
                .map(|item| ItemStack::new(item, 1));
        } else {
            let duration = value.map(|v| v.burn_duration).unwrap_or(0);
            self.lit_time = duration;
            self.lit_duration = duration;
        }
    }

    /// Reset cook counters after a craft: carry `overshoot` into the next item,
    /// or clear everything if the input slot ran dry.
    pub(crate) fn finish_item(&mut self, overshoot: u32) {
        if self.input.is_none() {
            self.cooking_progress = 0;
            self.cooking_total_time = 0;
        } else {
            self.cooking_progress = overshoot;
        }
    }

    fn ignite(&mut self, book: &RecipeBook) {
        let Some(fuel) = self.fuel else {
            return;
        };
        let duration = book.burn_duration(fuel.item_type);
        if duration > 0 {
            self.lit_time = duration;
            self.lit_duration = duration;
        }
    }

    /// Ordinary single-tick update.
    pub fn tick(&mut self, kind: FurnaceKind, book: &RecipeBook) -> TickOutcome {
        let was_lit = self.is_lit();
        let mut crafted = false;

        let recipe = self
            .active_recipe(kind, book)
            .filter(|recipe| self.can_burn(recipe));

        match recipe {
            None => {
                if self.is_lit() {
                    self.cooking_progress = 0;
                }
            }
            Some(recipe) => {
                if !self.is_lit() {
                    self.ignite(book);
                }
                if self.is_lit() {
                    if self.cooking_total_time == 0 {
                        self.cooking_total_time = kind.cook_time(&recipe);
                    }

                    self.lit_time -= 1;
                    if self.lit_time == 0 {
                        self.consume_fuel_unit(book);
                    }

                    self.cooking_progress += 1;
                    if self.cooking_progress >= self.cooking_total_time {
                        crafted = self.complete_craft(&recipe);
                        if crafted {
                            self.set_recipe_used(&recipe);
                        }
                        self.finish_item(0);
                    }
                }
            }
        }

        TickOutcome {
            lit_changed: was_lit != self.is_lit(),
            crafted,
        }
    }

    /// Add items to the input slot. Changing the input item resets cook progress.
    ///
    /// # Returns
    /// Number of items that couldn't be added (0 if all added).
    pub fn add_input(&mut self, book: &RecipeBook, item_type: ItemType, count: u32) -> u32 {
        if !book.is_smeltable(item_type) {
            return count;
        }

        match &mut self.input {
            None => {
                let add = count.min(item_type.max_stack_size());
                if add > 0 {
                    self.input = Some(ItemStack::new(item_type, add));
                    self.cooking_progress = 0;
                    self.cooking_total_time = 0;
                }
                count - add
            }
            Some(existing) if existing.item_type == item_type => count - existing.grow(count),
            Some(_) => count,
        }
    }

    /// Add items to the fuel slot.
    ///
    /// # Returns
    /// Number of items that couldn't be added (0 if all added).
    pub fn add_fuel(&mut self, book: &RecipeBook, item_type: ItemType, count: u32) -> u32 {
        if !book.is_fuel(item_type) {
            return count;
        }

        match &mut self.fuel {
            None => {
                let add = count.min(item_type.max_stack_size());
                if add > 0 {
                    self.fuel = Some(ItemStack::new(item_type, add));
                }
                count - add
            }
            Some(existing) if existing.item_type == item_type => count - existing.grow(count),
            Some(_) => count,
        }
    }

    /// Take all items from the output slot.
    pub fn take_output(&mut self) -> Option<ItemStack> {
        self.output.take()
    }

    /// Take all items from the input slot.
    pub fn take_input(&mut self) -> Option<ItemStack> {
        self.cooking_progress = 0;
        self.cooking_total_time = 0;
        self.input.take()
    }

    /// Take all items from the fuel slot. The burning unit is lost with the stack.
    pub fn take_fuel(&mut self) -> Option<ItemStack> {
        self.lit_time = 0;
        self.fuel.take()
    }
}
