//! State definitions for the Hyperion bridge contract

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, HexBinary, Timestamp, Uint128, Uint256};
use cw_storage_plus::{Item, Map};

/// Contract name for migration
pub const CONTRACT_NAME: &str = "crates.io:hyperion-bridge";
/// Contract version for migration
pub const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Largest allowed jump of a valset or batch nonce in a single step
pub const MAX_NONCE_JUMP: Uint256 = Uint256::from_u128(1_000_000_000_000_000);

/// How long the owner may deploy bridged tokens after initialization (28 days)
pub const OWNERSHIP_EXPIRY_DURATION: u64 = 28 * 24 * 60 * 60;

// ============================================================================
// Reply IDs
// ============================================================================

/// Last outbound message of a guarded call; clears the re-entrancy guard
pub const RELEASE_GUARD_REPLY_ID: u64 = 1;
/// Token pull of a non-native deposit; measures what actually arrived
pub const DEPOSIT_REPLY_ID: u64 = 2;
/// Instantiation of a bridged token
pub const DEPLOY_REPLY_ID: u64 = 3;

// ============================================================================
// Configuration
// ============================================================================

/// Fixed at initialization. Absent until then.
#[cw_serde]
pub struct Config {
    /// Domain separator bound into every signed digest
    pub hyperion_id: [u8; 32],
    /// Power needed to approve a valset update or a batch
    pub power_threshold: Uint256,
}

#[cw_serde]
pub struct Ownership {
    /// `None` once renounced
    pub owner: Option<Addr>,
    /// Block time after which the owner can no longer deploy tokens and
    /// anyone may renounce
    pub expiry: Timestamp,
}

pub const CONFIG: Item<Config> = Item::new("config");
/// Code id of the bridged cw20 instantiated by the factory
pub const TOKEN_CODE_ID: Item<u64> = Item::new("token_code_id");
pub const OWNERSHIP: Item<Ownership> = Item::new("ownership");
pub const PAUSED: Item<bool> = Item::new("paused");
pub const REENTRANCY_GUARD: Item<bool> = Item::new("reentrancy_guard");

// ============================================================================
// Bridge State
// ============================================================================

pub const LAST_VALSET_CHECKPOINT: Item<[u8; 32]> = Item::new("last_valset_checkpoint");
pub const LAST_VALSET_NONCE: Item<Uint256> = Item::new("last_valset_nonce");
pub const LAST_EVENT_NONCE: Item<Uint256> = Item::new("last_event_nonce");

/// token => last executed batch nonce
pub const LAST_BATCH_NONCES: Map<&Addr, Uint256> = Map::new("last_batch_nonces");

/// keccak256(token word) => last executed batch nonce
pub const INVALIDATION_MAPPING: Map<&[u8], Uint256> = Map::new("invalidation_mapping");

/// Tokens deployed by the bridge factory; inbound mints, outbound burns
pub const HELIOS_NATIVE_TOKENS: Map<&Addr, bool> = Map::new("helios_native_tokens");

/// Non-native tokens whose metadata has already been announced to Helios
pub const ANNOUNCED_TOKENS: Map<&Addr, bool> = Map::new("announced_tokens");

// ============================================================================
// In-flight Submessages
// ============================================================================

/// Which event a deposit emits
#[cw_serde]
pub enum Deposit {
    /// `send_to_helios` carrying an opaque data string
    Helios { data: String },
    /// Legacy `send_to_cosmos`
    Cosmos,
}

/// A non-native deposit waiting for its token pull to complete
#[cw_serde]
pub struct PendingDeposit {
    pub token: Addr,
    pub sender: Addr,
    pub destination: HexBinary,
    pub requested: Uint128,
    pub balance_before: Uint128,
    pub kind: Deposit,
}

pub const PENDING_DEPOSIT: Item<PendingDeposit> = Item::new("pending_deposit");

/// A bridged token waiting for its instantiation to complete
#[cw_serde]
pub struct PendingDeployment {
    pub cosmos_denom: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub supply: Option<Uint128>,
}

pub const PENDING_DEPLOYMENT: Item<PendingDeployment> = Item::new("pending_deployment");
