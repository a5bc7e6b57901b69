//! Furnace simulation with offline catch-up.

mod catch_up;
mod device;
mod elapsed;
mod furnace;
mod host;
mod persist;
mod smelting;
mod time;

pub use catch_up::*;
pub use device::*;
pub use elapsed::*;
pub use furnace::*;
pub use host::*;
pub use persist::*;
pub use smelting::*;
pub use time::*;
