//! Furnace persistence.
//!
//! Each furnace is saved as a self-describing JSON tag so that fields added
//! later (like the catch-up timestamp) can be absent in older saves. The tags
//! for a whole world are stored in one `.efs` file: a small header followed by
//! a zstd-compressed bincode payload validated with CRC32.

use crate::device::{BlockPos, EverFurnace};
use crate::elapsed::ElapsedTimeTracker;
use crate::furnace::FurnaceState;
use crate::smelting::FurnaceKind;
use crate::time::SimTime;
use anyhow::{Context, Result};
use crc32fast::Hasher;
use everburn_core::SimTick;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Tag key holding the last observed world tick.
pub const LAST_GAME_TIME_TAG: &str = "everfurnace_lastGameTime";

/// Magic number for store file identification ("EVFS").
const STORE_MAGIC: u32 = 0x4556_4653;

/// Current store file format version.
const STORE_VERSION: u16 = 1;

/// File name of the furnace store inside a world directory.
const STORE_FILE: &str = "furnaces.efs";

/// Persisted form of one furnace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FurnaceTag {
    /// Furnace variant.
    #[serde(default)]
    pub kind: FurnaceKind,
    /// Slots and counters.
    #[serde(flatten)]
    pub state: FurnaceState,
    /// Last observed world tick (absent in saves written before catch-up existed).
    /// Serialized under [`LAST_GAME_TIME_TAG`].
    #[serde(
        rename = "everfurnace_lastGameTime",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_game_time: Option<u64>,
}

impl From<&EverFurnace> for FurnaceTag {
    fn from(furnace: &EverFurnace) -> Self {
        Self {
            kind: furnace.kind,
            state: furnace.state.clone(),
            last_game_time: furnace.tracker().last_observed().map(|tick| tick.0),
        }
    }
}

impl From<FurnaceTag> for EverFurnace {
    fn from(tag: FurnaceTag) -> Self {
        EverFurnace::from_parts(
            tag.kind,
            tag.state,
            ElapsedTimeTracker::restored(tag.last_game_time.map(SimTick)),
        )
    }
}

/// Serialize a furnace to its tag bytes.
pub fn encode_furnace(furnace: &EverFurnace) -> Result<Vec<u8>> {
    serde_json::to_vec(&FurnaceTag::from(furnace)).context("Failed to encode furnace tag")
}

/// Deserialize a furnace from its tag bytes.
pub fn decode_furnace(bytes: &[u8]) -> Result<EverFurnace> {
    let tag: FurnaceTag =
        serde_json::from_slice(bytes).context("Failed to decode furnace tag")?;
    Ok(tag.into())
}

/// Store file header structure.
#[derive(Debug, Clone)]
struct StoreHeader {
    magic: u32,
    version: u16,
    crc32: u32,
    payload_len: u32,
}

impl StoreHeader {
    const LEN: usize = 14;

    fn new(crc32: u32, payload_len: u32) -> Self {
        Self {
            magic: STORE_MAGIC,
            version: STORE_VERSION,
            crc32,
            payload_len,
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::LEN);
        bytes.extend_from_slice(&self.magic.to_le_bytes());
        bytes.extend_from_slice(&self.version.to_le_bytes());
        bytes.extend_from_slice(&self.crc32.to_le_bytes());
        bytes.extend_from_slice(&self.payload_len.to_le_bytes());
        bytes
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::LEN {
            anyhow::bail!("Store header too short");
        }

        let magic = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        if magic != STORE_MAGIC {
            anyhow::bail!(
                "Invalid store magic: expected 0x{:08X}, got 0x{:08X}",
                STORE_MAGIC,
                magic
            );
        }

        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != STORE_VERSION {
            anyhow::bail!("Unsupported store version {version}");
        }
        let crc32 = u32::from_le_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]);
        let payload_len = u32::from_le_bytes([bytes[10], bytes[11], bytes[12], bytes[13]]);

        Ok(Self {
            magic,
            version,
            crc32,
            payload_len,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StorePayload {
    world_tick: u64,
    furnaces: BTreeMap<BlockPos, Vec<u8>>,
}

/// Everything a furnace store holds for one world.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedWorld {
    /// World clock at save time.
    pub time: SimTime,
    /// Furnaces by position.
    pub furnaces: BTreeMap<BlockPos, EverFurnace>,
}

/// Furnace store rooted at a world directory.
pub struct FurnaceStore {
    world_dir: PathBuf,
}

impl FurnaceStore {
    /// Create a new store rooted at the given world directory.
    pub fn new<P: AsRef<Path>>(world_dir: P) -> Result<Self> {
        let world_dir = world_dir.as_ref().to_path_buf();
        fs::create_dir_all(&world_dir).context("Failed to create world directory")?;
        Ok(Self { world_dir })
    }

    /// Path of the store file.
    pub fn path(&self) -> PathBuf {
        self.world_dir.join(STORE_FILE)
    }

    /// Whether a store file exists yet.
    pub fn exists(&self) -> bool {
        self.path().exists()
    }

    /// Write the clock and every furnace.
    pub fn save(&self, time: &SimTime, furnaces: &BTreeMap<BlockPos, EverFurnace>) -> Result<()> {
        let mut tags = BTreeMap::new();
        for (pos, furnace) in furnaces {
            tags.insert(*pos, encode_furnace(furnace)?);
        }
        let payload = StorePayload {
            world_tick: time.tick.0,
            furnaces: tags,
        };

        let serialized = bincode::serialize(&payload).context("Failed to serialize store")?;
        let compressed =
            zstd::encode_all(&serialized[..], 3).context("Failed to compress store")?;

        let mut hasher = Hasher::new();
        hasher.update(&compressed);
        let crc32 = hasher.finalize();

        let payload_len =
            u32::try_from(compressed.len()).context("Store payload exceeds 4 GiB")?;
        let header = StoreHeader::new(crc32, payload_len);

        let mut file = File::create(self.path()).context("Failed to create store file")?;
        file.write_all(&header.to_bytes())
            .context("Failed to write header")?;
        file.write_all(&compressed)
            .context("Failed to write payload")?;

        tracing::debug!(
            furnaces = furnaces.len(),
            bytes = compressed.len(),
            tick = time.tick.0,
            "saved furnace store"
        );
        Ok(())
    }

    /// Read the clock and every furnace.
    pub fn load(&self) -> Result<SavedWorld> {
        let path = self.path();
        let mut file = File::open(&path)
            .with_context(|| format!("Failed to open store file {}", path.display()))?;

        let mut header_bytes = [0u8; StoreHeader::LEN];
        file.read_exact(&mut header_bytes)
            .context("Failed to read store header")?;
        let header = StoreHeader::from_bytes(&header_bytes)?;

        let mut compressed = vec![0u8; header.payload_len as usize];
        file.read_exact(&mut compressed)
            .context("Failed to read store payload")?;

        let mut hasher = Hasher::new();
        hasher.update(&compressed);
        let computed_crc = hasher.finalize();
        if computed_crc != header.crc32 {
            anyhow::bail!(
                "CRC32 mismatch: expected {:08X}, got {:08X}",
                header.crc32,
                computed_crc
            );
        }

        let decompressed =
            zstd::decode_all(&compressed[..]).context("Failed to decompress store")?;
        let payload: StorePayload =
            bincode::deserialize(&decompressed).context("Failed to deserialize store")?;

        let mut furnaces = BTreeMap::new();
        for (pos, tag) in payload.furnaces {
            let furnace = decode_furnace(&tag)
                .with_context(|| format!("Corrupt furnace at {pos:?}"))?;
            furnaces.insert(pos, furnace);
        }

        Ok(SavedWorld {
            time: SimTime::starting_at(SimTick(payload.world_tick)),
            furnaces,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use everburn_core::{ItemStack, ItemType};
    use everburn_testkit::unique_temp_path;

    fn temp_world(label: &str) -> PathBuf {
        unique_temp_path(label)
    }

    #[test]
    fn store_header_roundtrip() {
        let header = StoreHeader::new(0xDEADBEEF, 1234);
        let bytes = header.to_bytes();
        let decoded = StoreHeader::from_bytes(&bytes).unwrap();

        assert_eq!(decoded.magic, STORE_MAGIC);
        assert_eq!(decoded.version, STORE_VERSION);
        assert_eq!(decoded.crc32, 0xDEADBEEF);
        assert_eq!(decoded.payload_len, 1234);
    }

    #[test]
    fn tag_writes_timestamp_under_fixed_key() {
        let state = FurnaceState {
            input: Some(ItemStack::new(ItemType::RawBeef, 3)),
            ..FurnaceState::default()
        };
        let furnace = EverFurnace::from_parts(
            FurnaceKind::Smoker,
            state,
            ElapsedTimeTracker::restored(Some(SimTick(777))),
        );

        let bytes = encode_furnace(&furnace).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json[LAST_GAME_TIME_TAG], 777);
        assert_eq!(json["kind"], "smoker");

        let decoded = decode_furnace(&bytes).unwrap();
        assert_eq!(decoded, furnace);
        assert_eq!(decoded.tracker().last_observed(), Some(SimTick(777)));
    }

    #[test]
    fn unprimed_furnace_omits_timestamp() {
        let furnace = EverFurnace::new(FurnaceKind::Furnace);
        let json: serde_json::Value =
            serde_json::from_slice(&encode_furnace(&furnace).unwrap()).unwrap();
        assert!(json.get(LAST_GAME_TIME_TAG).is_none());
    }

    #[test]
    fn missing_timestamp_loads_unprimed() {
        let legacy = r#"{
            "kind": "furnace",
            "input": {"item_type": "iron_ore", "count": 5},
            "fuel": {"item_type": "coal", "count": 2},
            "output": null,
            "lit_time": 1200,
            "lit_duration": 1600,
            "cooking_progress": 40,
            "cooking_total_time": 200,
            "last_recipe": null
        }"#;
        let furnace = decode_furnace(legacy.as_bytes()).unwrap();
        assert_eq!(furnace.tracker().last_observed(), None);
        assert_eq!(furnace.state.lit_time, 1200);
        assert_eq!(furnace.state.input_count(), 5);
    }

    #[test]
    fn timestamp_key_matches_tag_field() {
        let tag = FurnaceTag::from(&EverFurnace::from_parts(
            FurnaceKind::Furnace,
            FurnaceState::default(),
            ElapsedTimeTracker::restored(Some(SimTick(42))),
        ));
        let json = serde_json::to_value(&tag).unwrap();
        assert_eq!(json[LAST_GAME_TIME_TAG], 42);

        let parsed: FurnaceTag =
            serde_json::from_value(serde_json::json!({ LAST_GAME_TIME_TAG: 9 })).unwrap();
        assert_eq!(parsed.last_game_time, Some(9));
    }

    #[test]
    fn sparse_tag_uses_defaults() {
        let furnace = decode_furnace(br#"{"everfurnace_lastGameTime": 5}"#).unwrap();
        assert_eq!(furnace.kind, FurnaceKind::Furnace);
        assert_eq!(furnace.state, FurnaceState::default());
        assert_eq!(furnace.tracker().last_observed(), Some(SimTick(5)));
    }

    #[test]
    fn save_and_load_store() {
        let dir = temp_world("store");
        let store = FurnaceStore::new(&dir).unwrap();
        assert!(!store.exists());

        let mut furnaces = BTreeMap::new();
        let mut furnace = EverFurnace::new(FurnaceKind::BlastFurnace);
        furnace.state.fuel = Some(ItemStack::new(ItemType::Coal, 7));
        furnace.state.lit_time = 321;
        furnaces.insert(BlockPos::new(4, 70, -9), furnace);
        furnaces.insert(
            BlockPos::new(0, 0, 0),
            EverFurnace::from_parts(
                FurnaceKind::Furnace,
                FurnaceState::default(),
                ElapsedTimeTracker::restored(Some(SimTick(99))),
            ),
        );

        let time = SimTime::starting_at(SimTick(12_345));
        store.save(&time, &furnaces).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded.time, time);
        assert_eq!(loaded.furnaces, furnaces);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn corrupted_payload_is_rejected() {
        let dir = temp_world("corrupt");
        let store = FurnaceStore::new(&dir).unwrap();
        store.save(&SimTime::default(), &BTreeMap::new()).unwrap();

        let mut bytes = fs::read(store.path()).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        fs::write(store.path(), bytes).unwrap();

        let err = store.load().unwrap_err();
        assert!(err.to_string().contains("CRC32 mismatch"));

        fs::remove_dir_all(&dir).ok();
    }
}
