//! Query handlers for the Hyperion bridge contract.
//!
//! Queries read straight from storage and never require initialization;
//! unset state answers with zero values.

use cosmwasm_std::{Addr, Deps, Env, HexBinary, StdResult, Timestamp, Uint256};

use crate::hash::batch_invalidation_key;
use crate::msg::{OwnerResponse, StateResponse};
use crate::state::{
    CONFIG, INVALIDATION_MAPPING, LAST_BATCH_NONCES, LAST_EVENT_NONCE, LAST_VALSET_CHECKPOINT,
    LAST_VALSET_NONCE, OWNERSHIP, PAUSED, TOKEN_CODE_ID,
};
use crate::vault;

// ============================================================================
// State Snapshot
// ============================================================================

pub fn query_state(deps: Deps, env: Env) -> StdResult<StateResponse> {
    let ownership_expiry = ownership_expiry(deps)?;
    Ok(StateResponse {
        initialized: CONFIG.may_load(deps.storage)?.is_some(),
        hyperion_id: query_hyperion_id(deps)?,
        power_threshold: query_power_threshold(deps)?,
        last_valset_checkpoint: query_last_valset_checkpoint(deps)?,
        last_valset_nonce: query_last_valset_nonce(deps)?,
        last_event_nonce: query_last_event_nonce(deps)?,
        owner: query_owner(deps)?.owner,
        ownership_expiry: ownership_expiry.seconds(),
        ownership_expired: env.block.time > ownership_expiry,
        paused: query_paused(deps)?,
        cosmos_erc20_code_id: TOKEN_CODE_ID.may_load(deps.storage)?.unwrap_or_default(),
    })
}

// ============================================================================
// Scalar State
// ============================================================================

pub fn query_hyperion_id(deps: Deps) -> StdResult<HexBinary> {
    let id = CONFIG
        .may_load(deps.storage)?
        .map(|config| config.hyperion_id)
        .unwrap_or_default();
    Ok(HexBinary::from(id.as_slice()))
}

pub fn query_power_threshold(deps: Deps) -> StdResult<Uint256> {
    Ok(CONFIG
        .may_load(deps.storage)?
        .map(|config| config.power_threshold)
        .unwrap_or_default())
}

pub fn query_last_valset_checkpoint(deps: Deps) -> StdResult<HexBinary> {
    let checkpoint = LAST_VALSET_CHECKPOINT
        .may_load(deps.storage)?
        .unwrap_or_default();
    Ok(HexBinary::from(checkpoint.as_slice()))
}

pub fn query_last_valset_nonce(deps: Deps) -> StdResult<Uint256> {
    Ok(LAST_VALSET_NONCE.may_load(deps.storage)?.unwrap_or_default())
}

pub fn query_last_event_nonce(deps: Deps) -> StdResult<Uint256> {
    Ok(LAST_EVENT_NONCE.may_load(deps.storage)?.unwrap_or_default())
}

pub fn query_paused(deps: Deps) -> StdResult<bool> {
    Ok(PAUSED.may_load(deps.storage)?.unwrap_or_default())
}

// ============================================================================
// Ownership
// ============================================================================

pub fn query_owner(deps: Deps) -> StdResult<OwnerResponse> {
    let owner = OWNERSHIP
        .may_load(deps.storage)?
        .and_then(|ownership| ownership.owner);
    Ok(OwnerResponse { owner })
}

/// Unix seconds; zero before initialization
pub fn query_ownership_expiry(deps: Deps) -> StdResult<u64> {
    Ok(ownership_expiry(deps)?.seconds())
}

pub fn query_is_ownership_expired(deps: Deps, env: Env) -> StdResult<bool> {
    Ok(env.block.time > ownership_expiry(deps)?)
}

fn ownership_expiry(deps: Deps) -> StdResult<Timestamp> {
    Ok(OWNERSHIP
        .may_load(deps.storage)?
        .map(|ownership| ownership.expiry)
        .unwrap_or(Timestamp::from_seconds(0)))
}

// ============================================================================
// Per-token State
// ============================================================================

pub fn query_last_batch_nonce(deps: Deps, token: String) -> StdResult<Uint256> {
    let token = deps.api.addr_validate(&token)?;
    Ok(LAST_BATCH_NONCES
        .may_load(deps.storage, &token)?
        .unwrap_or_default())
}

pub fn query_invalidation_mapping(deps: Deps, key: HexBinary) -> StdResult<Uint256> {
    Ok(INVALIDATION_MAPPING
        .may_load(deps.storage, key.as_slice())?
        .unwrap_or_default())
}

/// Batch nonce recorded under the invalidation key of `token`
pub fn query_invalidated_batch_nonce(deps: Deps, token: String) -> StdResult<Uint256> {
    let token = deps.api.addr_validate(&token)?;
    let key = batch_invalidation_key(token.as_str());
    Ok(INVALIDATION_MAPPING
        .may_load(deps.storage, key.as_slice())?
        .unwrap_or_default())
}

pub fn query_is_helios_native_token(deps: Deps, token: String) -> StdResult<bool> {
    let token: Addr = deps.api.addr_validate(&token)?;
    Ok(vault::is_native(deps.storage, &token))
}
