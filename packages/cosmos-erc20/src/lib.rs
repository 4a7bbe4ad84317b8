//! CosmosERC20 - bridged cw20 token
//!
//! A `cw20-base` token whose minter is the Hyperion bridge. The bridge mints
//! when value arrives from Helios and burns through [`msg::ExecuteMsg::BridgeBurn`]
//! when it leaves. Every other message behaves exactly like `cw20-base`.

pub mod contract;
pub mod error;
pub mod msg;

pub use crate::error::ContractError;
