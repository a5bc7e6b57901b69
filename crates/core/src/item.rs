//! Item system - smeltables, smelted products, fuels and containers

use crate::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Item type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    /// Iron ore block item
    IronOre,
    /// Gold ore block item
    GoldOre,
    /// Raw porkchop
    RawPork,
    /// Raw beef
    RawBeef,
    /// Sand block item
    Sand,
    /// Cobblestone block item
    Cobblestone,
    /// Iron ingot
    IronIngot,
    /// Gold ingot
    GoldIngot,
    /// Cooked porkchop
    CookedPork,
    /// Cooked beef (steak)
    CookedBeef,
    /// Glass block item
    Glass,
    /// Smooth stone block item
    Stone,
    /// Coal
    Coal,
    /// Oak log
    OakLog,
    /// Oak planks
    OakPlanks,
    /// Stick
    Stick,
    /// Bucket filled with lava
    LavaBucket,
    /// Empty bucket
    Bucket,
}

/// Coarse item grouping used to decide which furnace variants accept an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    /// Ores and other blast-furnace material
    Ore,
    /// Edible items handled by smokers
    Food,
    /// Everything else
    Misc,
}

impl ItemType {
    /// Every item type in declaration order.
    pub const ALL: [ItemType; 18] = [
        ItemType::IronOre,
        ItemType::GoldOre,
        ItemType::RawPork,
        ItemType::RawBeef,
        ItemType::Sand,
        ItemType::Cobblestone,
        ItemType::IronIngot,
        ItemType::GoldIngot,
        ItemType::CookedPork,
        ItemType::CookedBeef,
        ItemType::Glass,
        ItemType::Stone,
        ItemType::Coal,
        ItemType::OakLog,
        ItemType::OakPlanks,
        ItemType::Stick,
        ItemType::LavaBucket,
        ItemType::Bucket,
    ];

    /// Get the maximum stack size for this item type.
    pub fn max_stack_size(self) -> u32 {
        match self {
            // Buckets never stack
            ItemType::LavaBucket => 1,
            ItemType::Bucket => 16,
            _ => 64,
        }
    }

    /// Category used for furnace-variant filtering.
    pub fn category(self) -> ItemCategory {
        match self {
            ItemType::IronOre | ItemType::GoldOre => ItemCategory::Ore,
            ItemType::RawPork | ItemType::RawBeef => ItemCategory::Food,
            _ => ItemCategory::Misc,
        }
    }

    /// Stable snake_case identifier (matches the serde representation).
    pub fn id(self) -> &'static str {
        match self {
            ItemType::IronOre => "iron_ore",
            ItemType::GoldOre => "gold_ore",
            ItemType::RawPork => "raw_pork",
            ItemType::RawBeef => "raw_beef",
            ItemType::Sand => "sand",
            ItemType::Cobblestone => "cobblestone",
            ItemType::IronIngot => "iron_ingot",
            ItemType::GoldIngot => "gold_ingot",
            ItemType::CookedPork => "cooked_pork",
            ItemType::CookedBeef => "cooked_beef",
            ItemType::Glass => "glass",
            ItemType::Stone => "stone",
            ItemType::Coal => "coal",
            ItemType::OakLog => "oak_log",
            ItemType::OakPlanks => "oak_planks",
            ItemType::Stick => "stick",
            ItemType::LavaBucket => "lava_bucket",
            ItemType::Bucket => "bucket",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ItemType {
    type Err = CoreError;

    /// Accepts the bare identifier or a namespaced `minecraft:`/`everburn:` form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s
            .strip_prefix("minecraft:")
            .or_else(|| s.strip_prefix("everburn:"))
            .unwrap_or(s);
        ItemType::ALL
            .iter()
            .copied()
            .find(|item| item.id() == name)
            .ok_or_else(|| CoreError::UnknownItem(s.to_string()))
    }
}

/// An item stack occupying one container slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    /// Type of item
    pub item_type: ItemType,
    /// Quantity in stack
    pub count: u32,
}

impl ItemStack {
    /// Create a new item stack
    pub fn new(item_type: ItemType, count: u32) -> Self {
        Self { item_type, count }
    }

    /// Returns true when the stack holds nothing.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Maximum count for this stack's item.
    pub fn max_stack_size(&self) -> u32 {
        self.item_type.max_stack_size()
    }

    /// Returns true when no more items fit.
    pub fn is_full(&self) -> bool {
        self.count >= self.max_stack_size()
    }

    /// Remove up to `amount` items, clamping at zero. Returns how many were removed.
    pub fn shrink(&mut self, amount: u32) -> u32 {
        let removed = amount.min(self.count);
        self.count -= removed;
        removed
    }

    /// Add up to `amount` items without exceeding the max stack size. Returns how
    /// many were added.
    pub fn grow(&mut self, amount: u32) -> u32 {
        let space = self.max_stack_size().saturating_sub(self.count);
        let added = amount.min(space);
        self.count += added;
        added
    }
}
