//! Hyperion Bridge Contract - Entry Points
//!
//! The implementation is modularized into:
//! - `execute/` - State-changing handlers and the replies that finish them
//! - `query` - Query handlers

use cosmwasm_std::{
    entry_point, to_json_binary, Binary, Deps, DepsMut, Env, MessageInfo, Reply, Response,
    StdResult,
};
use cw2::set_contract_version;

use crate::error::ContractError;
use crate::execute::{
    ensure_initialized, execute_deploy_erc20, execute_emergency_pause, execute_emergency_unpause,
    execute_initialize, execute_renounce_ownership, execute_renounce_ownership_after_expiry,
    execute_send_to_cosmos, execute_send_to_helios, execute_submit_batch,
    execute_transfer_ownership, execute_update_valset, release_guard, reply_deploy, reply_deposit,
};
use crate::msg::{ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg};
use crate::query::{
    query_hyperion_id, query_invalidated_batch_nonce, query_invalidation_mapping,
    query_is_helios_native_token, query_is_ownership_expired, query_last_batch_nonce,
    query_last_event_nonce, query_last_valset_checkpoint, query_last_valset_nonce, query_owner,
    query_ownership_expiry, query_paused, query_power_threshold, query_state,
};
use crate::state::{
    PendingDeployment, CONTRACT_NAME, CONTRACT_VERSION, DEPLOY_REPLY_ID, DEPOSIT_REPLY_ID,
    RELEASE_GUARD_REPLY_ID, TOKEN_CODE_ID,
};

// ============================================================================
// Instantiate
// ============================================================================

/// Store the token code id. With `initialize` set, the genesis validator set
/// is committed in the same transaction and the instantiator becomes owner.
#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;
    TOKEN_CODE_ID.save(deps.storage, &msg.cosmos_erc20_code_id)?;

    let response = Response::new()
        .add_attribute("method", "instantiate")
        .add_attribute("cosmos_erc20_code_id", msg.cosmos_erc20_code_id.to_string());

    match msg.initialize {
        Some(init) => {
            let initialized = execute_initialize(deps, env, info, init)?;
            Ok(response
                .add_events(initialized.events)
                .add_attributes(initialized.attributes))
        }
        None => Ok(response),
    }
}

// ============================================================================
// Execute
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    if !matches!(msg, ExecuteMsg::Initialize(_)) {
        ensure_initialized(deps.storage)?;
    }

    match msg {
        // Lifecycle
        ExecuteMsg::Initialize(init) => execute_initialize(deps, env, info, init),
        ExecuteMsg::EmergencyPause {} => execute_emergency_pause(deps, info),
        ExecuteMsg::EmergencyUnpause {} => execute_emergency_unpause(deps, info),
        ExecuteMsg::TransferOwnership { new_owner } => {
            execute_transfer_ownership(deps, info, new_owner)
        }
        ExecuteMsg::RenounceOwnership {} => execute_renounce_ownership(deps, info),
        ExecuteMsg::RenounceOwnershipAfterExpiry {} => {
            execute_renounce_ownership_after_expiry(deps, env, info)
        }

        // Validator set and batches
        ExecuteMsg::UpdateValset {
            new_valset,
            current_valset,
            signatures,
        } => execute_update_valset(deps, info, new_valset, current_valset, signatures),
        ExecuteMsg::SubmitBatch(batch) => execute_submit_batch(deps, env, info, batch),

        // Outgoing
        ExecuteMsg::SendToHelios {
            token_contract,
            destination,
            amount,
            data,
        } => execute_send_to_helios(deps, env, info, token_contract, destination, amount, data),
        ExecuteMsg::SendToCosmos {
            token_contract,
            destination,
            amount,
        } => execute_send_to_cosmos(deps, env, info, token_contract, destination, amount),

        // Token factory
        ExecuteMsg::DeployErc20 {
            cosmos_denom,
            name,
            symbol,
            decimals,
        } => execute_deploy_erc20(
            deps,
            env,
            info,
            PendingDeployment {
                cosmos_denom,
                name,
                symbol,
                decimals,
                supply: None,
            },
        ),
        ExecuteMsg::DeployErc20WithSupply {
            cosmos_denom,
            name,
            symbol,
            decimals,
            supply,
        } => execute_deploy_erc20(
            deps,
            env,
            info,
            PendingDeployment {
                cosmos_denom,
                name,
                symbol,
                decimals,
                supply: Some(supply),
            },
        ),
    }
}

// ============================================================================
// Reply
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn reply(deps: DepsMut, env: Env, msg: Reply) -> Result<Response, ContractError> {
    match msg.id {
        RELEASE_GUARD_REPLY_ID => {
            release_guard(deps.storage)?;
            Ok(Response::new())
        }
        DEPOSIT_REPLY_ID => reply_deposit(deps, env),
        DEPLOY_REPLY_ID => reply_deploy(deps, msg),
        id => Err(ContractError::UnknownReply { id }),
    }
}

// ============================================================================
// Query
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::State {} => to_json_binary(&query_state(deps, env)?),
        QueryMsg::StateHyperionId {} => to_json_binary(&query_hyperion_id(deps)?),
        QueryMsg::StatePowerThreshold {} => to_json_binary(&query_power_threshold(deps)?),
        QueryMsg::StateLastValsetCheckpoint {} => {
            to_json_binary(&query_last_valset_checkpoint(deps)?)
        }
        QueryMsg::StateLastValsetNonce {} => to_json_binary(&query_last_valset_nonce(deps)?),
        QueryMsg::StateLastEventNonce {} => to_json_binary(&query_last_event_nonce(deps)?),
        QueryMsg::StateLastBatchNonces { token } => {
            to_json_binary(&query_last_batch_nonce(deps, token)?)
        }
        QueryMsg::StateInvalidationMapping { key } => {
            to_json_binary(&query_invalidation_mapping(deps, key)?)
        }
        QueryMsg::InvalidatedBatchNonce { token } => {
            to_json_binary(&query_invalidated_batch_nonce(deps, token)?)
        }
        QueryMsg::IsHeliosNativeToken { token } => {
            to_json_binary(&query_is_helios_native_token(deps, token)?)
        }
        QueryMsg::Owner {} => to_json_binary(&query_owner(deps)?),
        QueryMsg::Paused {} => to_json_binary(&query_paused(deps)?),
        QueryMsg::GetOwnershipExpiryTimestamp {} => {
            to_json_binary(&query_ownership_expiry(deps)?)
        }
        QueryMsg::IsOwnershipExpired {} => {
            to_json_binary(&query_is_ownership_expired(deps, env)?)
        }
        QueryMsg::LastBatchNonce { erc20_address } => {
            to_json_binary(&query_last_batch_nonce(deps, erc20_address)?)
        }
    }
}

// ============================================================================
// Migrate
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    Ok(Response::new()
        .add_attribute("action", "migrate")
        .add_attribute("version", CONTRACT_VERSION))
}
