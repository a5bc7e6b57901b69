//! Host loop: owns the clock and steps every furnace once per tick.

use crate::catch_up::CatchUpConfig;
use crate::device::{BlockPos, BlockStateSink, EverFurnace, StepContext, StepReport, SteppableDevice};
use crate::persist::FurnaceStore;
use crate::smelting::{FurnaceKind, RecipeBook};
use crate::time::SimTime;
use anyhow::Result;
use everburn_core::SimTick;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Visible block state for every furnace plus pending saves.
#[derive(Debug, Clone, Default)]
pub struct BlockStates {
    lit: BTreeMap<BlockPos, bool>,
    dirty: BTreeSet<BlockPos>,
}

impl BlockStates {
    /// Lit flag shown for the block at `pos`.
    pub fn is_lit(&self, pos: BlockPos) -> bool {
        self.lit.get(&pos).copied().unwrap_or(false)
    }

    /// Drain the set of blocks that changed since the last call.
    pub fn take_dirty(&mut self) -> Vec<BlockPos> {
        std::mem::take(&mut self.dirty).into_iter().collect()
    }

    fn forget(&mut self, pos: BlockPos) {
        self.lit.remove(&pos);
        self.dirty.remove(&pos);
    }
}

impl BlockStateSink for BlockStates {
    fn set_lit_visual(&mut self, pos: BlockPos, lit: bool) {
        self.lit.insert(pos, lit);
    }

    fn mark_dirty(&mut self, pos: BlockPos) {
        self.dirty.insert(pos);
    }
}

/// A world region holding furnaces.
pub struct FurnaceWorld {
    time: SimTime,
    furnaces: BTreeMap<BlockPos, EverFurnace>,
    blocks: BlockStates,
    recipes: RecipeBook,
    config: CatchUpConfig,
}

impl FurnaceWorld {
    /// Create an empty world at tick 0.
    pub fn new(recipes: RecipeBook, config: CatchUpConfig) -> Self {
        Self::with_time(SimTime::default(), recipes, config)
    }

    /// Create an empty world starting from `time`.
    pub fn with_time(time: SimTime, recipes: RecipeBook, config: CatchUpConfig) -> Self {
        Self {
            time,
            furnaces: BTreeMap::new(),
            blocks: BlockStates::default(),
            recipes,
            config,
        }
    }

    /// Restore a world from its furnace store.
    pub fn load_from(store: &FurnaceStore, recipes: RecipeBook, config: CatchUpConfig) -> Result<Self> {
        let saved = store.load()?;
        let mut world = Self::with_time(saved.time, recipes, config);
        for (pos, furnace) in saved.furnaces {
            world.blocks.set_lit_visual(pos, furnace.state.is_lit());
            world.furnaces.insert(pos, furnace);
        }
        info!(
            furnaces = world.furnaces.len(),
            tick = world.time.tick.0,
            "loaded furnace world"
        );
        Ok(world)
    }

    /// Persist the clock and every furnace, clearing the dirty set.
    pub fn save_to(&mut self, store: &FurnaceStore) -> Result<()> {
        store.save(&self.time, &self.furnaces)?;
        self.blocks.take_dirty();
        Ok(())
    }

    /// Current clock.
    pub fn time(&self) -> SimTime {
        self.time
    }

    /// Current absolute tick.
    pub fn now(&self) -> SimTick {
        self.time.tick
    }

    /// Recipe and fuel tables.
    pub fn recipes(&self) -> &RecipeBook {
        &self.recipes
    }

    /// Catch-up tuning.
    pub fn config(&self) -> &CatchUpConfig {
        &self.config
    }

    /// Place an empty furnace, replacing whatever was at `pos`.
    pub fn place_furnace(&mut self, pos: BlockPos, kind: FurnaceKind) -> &mut EverFurnace {
        self.blocks.set_lit_visual(pos, false);
        self.blocks.mark_dirty(pos);
        let furnace = self.furnaces.entry(pos).or_default();
        *furnace = EverFurnace::new(kind);
        furnace
    }

    /// Remove the furnace at `pos`.
    pub fn remove_furnace(&mut self, pos: BlockPos) -> Option<EverFurnace> {
        self.blocks.forget(pos);
        self.furnaces.remove(&pos)
    }

    /// Furnace at `pos`.
    pub fn furnace(&self, pos: BlockPos) -> Option<&EverFurnace> {
        self.furnaces.get(&pos)
    }

    /// Mutable furnace at `pos`.
    pub fn furnace_mut(&mut self, pos: BlockPos) -> Option<&mut EverFurnace> {
        self.furnaces.get_mut(&pos)
    }

    /// Iterate furnaces in position order.
    pub fn furnaces(&self) -> impl Iterator<Item = (&BlockPos, &EverFurnace)> {
        self.furnaces.iter()
    }

    /// Lit flag currently shown for the block at `pos`.
    pub fn is_lit_visual(&self, pos: BlockPos) -> bool {
        self.blocks.is_lit(pos)
    }

    /// Drain blocks that need saving.
    pub fn take_dirty(&mut self) -> Vec<BlockPos> {
        self.blocks.take_dirty()
    }

    /// Advance the clock one tick and step every furnace.
    pub fn tick(&mut self) -> Vec<(BlockPos, StepReport)> {
        self.time.advance();
        self.step_all()
    }

    /// Step every furnace at the current tick without advancing the clock.
    pub fn step_all(&mut self) -> Vec<(BlockPos, StepReport)> {
        let Self {
            time,
            furnaces,
            blocks,
            recipes,
            config,
        } = self;

        let mut reports = Vec::with_capacity(furnaces.len());
        for (pos, furnace) in furnaces.iter_mut() {
            let mut ctx = StepContext {
                pos: *pos,
                now: time.tick,
                recipes: &*recipes,
                config: &*config,
                blocks: &mut *blocks,
            };
            reports.push((*pos, furnace.on_step(&mut ctx)));
        }
        reports
    }

    /// Let `ticks` pass while unloaded: the clock moves, nothing is stepped.
    pub fn skip_offline(&mut self, ticks: u64) {
        self.time.skip(ticks);
        debug!(ticks, now = self.time.tick.0, "world skipped offline");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use everburn_core::ItemType;

    fn world_with_furnace() -> (FurnaceWorld, BlockPos) {
        let mut world = FurnaceWorld::new(RecipeBook::default(), CatchUpConfig::default());
        let pos = BlockPos::new(1, 2, 3);
        let book = world.recipes().clone();
        let furnace = world.place_furnace(pos, FurnaceKind::Furnace);
        furnace.state.add_input(&book, ItemType::Sand, 16);
        furnace.state.add_fuel(&book, ItemType::Coal, 1);
        (world, pos)
    }

    #[test]
    fn tick_lights_and_marks_dirty() {
        let (mut world, pos) = world_with_furnace();
        assert!(!world.is_lit_visual(pos));
        assert_eq!(world.take_dirty(), vec![pos]);

        let reports = world.tick();
        assert_eq!(reports.len(), 1);
        assert!(world.is_lit_visual(pos));
        assert_eq!(world.take_dirty(), vec![pos]);
        assert!(world.take_dirty().is_empty());
    }

    #[test]
    fn offline_gap_matches_online_run() {
        let (mut online, pos) = world_with_furnace();
        let (mut offline, _) = world_with_furnace();

        for _ in 0..50 {
            online.tick();
            offline.tick();
        }
        for _ in 0..1_000 {
            online.tick();
        }
        offline.skip_offline(999);
        offline.tick();

        assert_eq!(online.now(), offline.now());
        assert_eq!(
            online.furnace(pos).map(|f| &f.state),
            offline.furnace(pos).map(|f| &f.state)
        );
        assert_eq!(
            offline.furnace(pos).map(|f| f.state.output_count()),
            Some(5)
        );
    }

    #[test]
    fn remove_forgets_block_state() {
        let (mut world, pos) = world_with_furnace();
        world.tick();
        assert!(world.remove_furnace(pos).is_some());
        assert!(!world.is_lit_visual(pos));
        assert!(world.take_dirty().is_empty());
        assert!(world.tick().is_empty());
    }
}
