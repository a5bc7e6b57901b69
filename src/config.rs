use everburn_core::ItemType;
use everburn_world::{BlockPos, CatchUpConfig, FurnaceKind};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "config/everburn.toml";

/// Top-level runner configuration (`config/everburn.toml`).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub catch_up: CatchUpConfig,
    pub scenario: ScenarioConfig,
    /// Optional JSON smelting pack replacing the built-in tables.
    pub recipes: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Ticks stepped before the world is saved and unloaded.
    pub online_ticks: u64,
    /// Ticks the clock moves while the world is unloaded.
    pub offline_ticks: u64,
    pub furnaces: Vec<FurnaceSetup>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FurnaceSetup {
    pub pos: [i32; 3],
    #[serde(default)]
    pub kind: FurnaceKind,
    #[serde(default)]
    pub input: Option<SlotSetup>,
    #[serde(default)]
    pub fuel: Option<SlotSetup>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct SlotSetup {
    pub item: ItemType,
    pub count: u32,
}

impl FurnaceSetup {
    pub fn block_pos(&self) -> BlockPos {
        BlockPos::new(self.pos[0], self.pos[1], self.pos[2])
    }
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            online_ticks: 200,
            offline_ticks: 24_000,
            furnaces: vec![
                FurnaceSetup {
                    pos: [0, 64, 0],
                    kind: FurnaceKind::Furnace,
                    input: Some(SlotSetup {
                        item: ItemType::Sand,
                        count: 64,
                    }),
                    fuel: Some(SlotSetup {
                        item: ItemType::Coal,
                        count: 4,
                    }),
                },
                FurnaceSetup {
                    pos: [2, 64, 0],
                    kind: FurnaceKind::BlastFurnace,
                    input: Some(SlotSetup {
                        item: ItemType::IronOre,
                        count: 32,
                    }),
                    fuel: Some(SlotSetup {
                        item: ItemType::OakLog,
                        count: 16,
                    }),
                },
                FurnaceSetup {
                    pos: [4, 64, 0],
                    kind: FurnaceKind::Smoker,
                    input: Some(SlotSetup {
                        item: ItemType::RawBeef,
                        count: 16,
                    }),
                    fuel: Some(SlotSetup {
                        item: ItemType::LavaBucket,
                        count: 1,
                    }),
                },
            ],
        }
    }
}

impl RunnerConfig {
    /// Load runner configuration from the default path.
    pub fn load() -> Self {
        Self::load_from_path(Path::new(DEFAULT_CONFIG_PATH))
    }

    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_toml(&contents).unwrap_or_else(|err| {
                warn!("Failed to parse {}: {err}. Using defaults", path.display());
                RunnerConfig::default()
            }),
            Err(err) => {
                if path != Path::new(DEFAULT_CONFIG_PATH)
                    || err.kind() != std::io::ErrorKind::NotFound
                {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                } else {
                    warn!(
                        "Runner config not found at {}. Using defaults",
                        path.display()
                    );
                }
                RunnerConfig::default()
            }
        }
    }

    fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}
