//! Hyperion Bridge Contract
//!
//! A bridge between this chain and the Helios chain. The contract keeps only
//! a checkpoint of the current validator set and accepts any action signed
//! by enough of that set's power.
//!
//! ## Modules
//!
//! - `contract` - Entry points and message dispatch
//! - `execute` - Execute handlers (admin, valset, batch, outgoing, factory)
//! - `query` - Query handlers and the state snapshot
//! - `hash` - Checkpoint and batch digests (hand-written ABI layouts)
//! - `validator` - Weighted secp256k1 signature verification
//! - `vault` - cw20 transfers, mints and burns of bridged tokens
//! - `events` - Typed events observed by the Helios orchestrators
//! - `state` - Storage layout
//! - `msg` - Message types

pub mod contract;
pub mod error;
pub mod events;
pub mod execute;
pub mod hash;
pub mod msg;
pub mod query;
pub mod state;
pub mod validator;
pub mod vault;

pub use crate::error::ContractError;
pub use crate::msg::{ExecuteMsg, InstantiateMsg, QueryMsg, StateResponse, ValsetArgs};
