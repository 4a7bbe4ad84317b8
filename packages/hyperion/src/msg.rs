//! Message types for the Hyperion bridge contract

use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, HexBinary, Uint128, Uint256};

// ============================================================================
// Instantiate / Migrate
// ============================================================================

#[cw_serde]
pub struct MigrateMsg {}

#[cw_serde]
pub struct InstantiateMsg {
    /// Stored code id of `cosmos-erc20`, used by the token factory
    pub cosmos_erc20_code_id: u64,
    /// Initialize in the same transaction, making the instantiator owner
    pub initialize: Option<InitializeMsg>,
}

/// One-shot commitment of the genesis validator set
#[cw_serde]
pub struct InitializeMsg {
    /// 32-byte domain separator
    pub hyperion_id: HexBinary,
    pub power_threshold: Uint256,
    /// 20-byte Ethereum addresses, `0x`-prefixed hex
    pub validators: Vec<String>,
    pub powers: Vec<Uint256>,
}

// ============================================================================
// Execute
// ============================================================================

/// A validator set as presented by relayers. Only its checkpoint is stored.
#[cw_serde]
pub struct ValsetArgs {
    /// 20-byte Ethereum addresses, `0x`-prefixed hex
    pub validators: Vec<String>,
    pub powers: Vec<Uint256>,
    pub valset_nonce: Uint256,
    pub reward_amount: Uint128,
    pub reward_token: Option<String>,
}

/// Signatures indexed by validator position. `v == 0` abstains.
#[cw_serde]
pub struct Signatures {
    pub v: Vec<u8>,
    pub r: Vec<HexBinary>,
    pub s: Vec<HexBinary>,
}

#[cw_serde]
pub struct SubmitBatchMsg {
    pub current_valset: ValsetArgs,
    pub signatures: Signatures,
    pub amounts: Vec<Uint128>,
    pub destinations: Vec<String>,
    pub fees: Vec<Uint128>,
    pub batch_nonce: Uint256,
    pub token_contract: String,
    /// Block height after which the batch can no longer execute
    pub batch_timeout: u64,
}

#[cw_serde]
pub enum ExecuteMsg {
    // ========================================================================
    // Lifecycle
    // ========================================================================
    /// Commit the genesis validator set; the caller becomes owner
    Initialize(InitializeMsg),

    /// Stop deposits, batches and valset updates (owner only)
    EmergencyPause {},

    /// Resume after an emergency pause (owner only)
    EmergencyUnpause {},

    /// Hand ownership to `new_owner` without extending the expiry (owner only)
    TransferOwnership { new_owner: String },

    /// Drop the owner (owner only)
    RenounceOwnership {},

    /// Drop the owner once the ownership window has passed (anyone)
    RenounceOwnershipAfterExpiry {},

    // ========================================================================
    // Bridge
    // ========================================================================
    /// Rotate the validator set, authorized by the current set
    UpdateValset {
        new_valset: ValsetArgs,
        current_valset: ValsetArgs,
        signatures: Signatures,
    },

    /// Execute a signed batch of payouts in one token
    SubmitBatch(SubmitBatchMsg),

    /// Deposit towards a 32-byte Helios account with an opaque data string.
    /// Non-native tokens need an allowance for the bridge.
    SendToHelios {
        token_contract: String,
        destination: HexBinary,
        amount: Uint128,
        data: String,
    },

    /// Legacy deposit without a data string
    SendToCosmos {
        token_contract: String,
        destination: HexBinary,
        amount: Uint128,
    },

    // ========================================================================
    // Token Factory
    // ========================================================================
    /// Deploy a bridged token for a Helios denom (owner only, before expiry)
    DeployErc20 {
        cosmos_denom: String,
        name: String,
        symbol: String,
        decimals: u8,
    },

    /// As `DeployErc20`, crediting `supply` to the caller
    DeployErc20WithSupply {
        cosmos_denom: String,
        name: String,
        symbol: String,
        decimals: u8,
        supply: Uint128,
    },
}

// ============================================================================
// Query
// ============================================================================

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    /// Snapshot of all scalar state
    #[returns(StateResponse)]
    State {},

    #[returns(HexBinary)]
    StateHyperionId {},

    #[returns(Uint256)]
    StatePowerThreshold {},

    #[returns(HexBinary)]
    StateLastValsetCheckpoint {},

    #[returns(Uint256)]
    StateLastValsetNonce {},

    #[returns(Uint256)]
    StateLastEventNonce {},

    #[returns(Uint256)]
    StateLastBatchNonces { token: String },

    /// Keyed by `keccak256(tokenWord)`
    #[returns(Uint256)]
    StateInvalidationMapping { key: HexBinary },

    /// Invalidation entry of `token`, computing the key
    #[returns(Uint256)]
    InvalidatedBatchNonce { token: String },

    #[returns(bool)]
    IsHeliosNativeToken { token: String },

    #[returns(OwnerResponse)]
    Owner {},

    #[returns(bool)]
    Paused {},

    /// Unix seconds
    #[returns(u64)]
    GetOwnershipExpiryTimestamp {},

    #[returns(bool)]
    IsOwnershipExpired {},

    #[returns(Uint256)]
    LastBatchNonce { erc20_address: String },
}

// ============================================================================
// Query Responses
// ============================================================================

#[cw_serde]
pub struct StateResponse {
    pub initialized: bool,
    pub hyperion_id: HexBinary,
    pub power_threshold: Uint256,
    pub last_valset_checkpoint: HexBinary,
    pub last_valset_nonce: Uint256,
    pub last_event_nonce: Uint256,
    pub owner: Option<Addr>,
    pub ownership_expiry: u64,
    pub ownership_expired: bool,
    pub paused: bool,
    pub cosmos_erc20_code_id: u64,
}

#[cw_serde]
pub struct OwnerResponse {
    pub owner: Option<Addr>,
}
