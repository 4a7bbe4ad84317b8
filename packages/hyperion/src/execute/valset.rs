//! Validator set rotation.

use cosmwasm_std::{DepsMut, MessageInfo, Response};

use super::{ensure_initialized, ensure_not_paused, next_event_nonce};
use crate::error::ContractError;
use crate::events;
use crate::hash::{bytes32_to_hex, make_checkpoint};
use crate::msg::{Signatures, ValsetArgs};
use crate::state::{LAST_VALSET_CHECKPOINT, LAST_VALSET_NONCE, MAX_NONCE_JUMP};
use crate::validator::{check_validator_signatures, total_power, validate_valset, Valset};
use crate::vault;

/// Replace the committed validator set with `new_valset`, authorized by
/// signatures of the current set over the new checkpoint.
///
/// Pays the new set's reward to the relayer when one is attached.
pub fn execute_update_valset(
    deps: DepsMut,
    info: MessageInfo,
    new_valset: ValsetArgs,
    current_valset: ValsetArgs,
    signatures: Signatures,
) -> Result<Response, ContractError> {
    ensure_not_paused(deps.storage)?;

    if new_valset.valset_nonce <= current_valset.valset_nonce {
        return Err(ContractError::ValsetNonceNotGreater);
    }
    if new_valset.valset_nonce - current_valset.valset_nonce >= MAX_NONCE_JUMP {
        return Err(ContractError::ValsetNonceJumpTooLarge);
    }
    if new_valset.validators.len() != new_valset.powers.len() {
        return Err(ContractError::MalformedNewValset);
    }
    let new = Valset::parse(&new_valset)?;
    let current = Valset::parse(&current_valset)?;
    let sigs = validate_valset(&current, &signatures)?;

    let config = ensure_initialized(deps.storage)?;
    if make_checkpoint(&config.hyperion_id, &current) != LAST_VALSET_CHECKPOINT.load(deps.storage)?
    {
        return Err(ContractError::CheckpointMismatch);
    }

    if total_power(&new.powers)? < config.power_threshold {
        return Err(ContractError::InsufficientValsetPower);
    }

    let new_checkpoint = make_checkpoint(&config.hyperion_id, &new);
    check_validator_signatures(
        deps.api,
        &current,
        &sigs,
        &new_checkpoint,
        config.power_threshold,
    )?;

    LAST_VALSET_CHECKPOINT.save(deps.storage, &new_checkpoint)?;
    LAST_VALSET_NONCE.save(deps.storage, &new.valset_nonce)?;

    let mut messages = vec![];
    if let Some(reward_token) = &new.reward_token {
        let reward_token = deps.api.addr_validate(reward_token)?;
        if let Some(msg) =
            vault::disburse(deps.storage, &reward_token, &info.sender, new.reward_amount)?
        {
            messages.push(msg);
        }
    }

    let event_nonce = next_event_nonce(deps.storage)?;

    Ok(Response::new()
        .add_messages(messages)
        .add_event(events::valset_updated(
            new.valset_nonce,
            event_nonce,
            new.reward_amount,
            new.reward_token.as_deref(),
            &new_valset.validators,
            &new.powers,
        ))
        .add_attribute("method", "update_valset")
        .add_attribute("valset_nonce", new.valset_nonce.to_string())
        .add_attribute("event_nonce", event_nonce.to_string())
        .add_attribute("validators", new.validators.len().to_string())
        .add_attribute("checkpoint", bytes32_to_hex(&new_checkpoint)))
}
