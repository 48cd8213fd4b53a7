//! Game kernel: world state store, phase state machine, turn orchestrator,
//! combat engine, and bank registry. No I/O, no async; all randomness flows
//! through one seeded stream owned by the world.

pub mod combat;
mod error;
pub mod util;
pub mod world;

pub use error::ActionError;
pub use world::{BankConfig, GameWorld, ReadyOutcome};
