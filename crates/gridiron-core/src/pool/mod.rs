// Player pool: the player model, CSV loading and projection/ownership
// estimation for rows that arrive incomplete.

pub mod estimate;
pub mod loader;
pub mod player;

pub use loader::{load_pool, PoolError};
pub use player::{OwnershipTier, Player, PlayerPool, Position, TierCounts};
