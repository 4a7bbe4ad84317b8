//! Inbound batch settlement (Helios → Cosmos).

use cosmwasm_std::{Addr, DepsMut, Env, MessageInfo, Response, StdResult, Uint128};

use super::{acquire_guard, ensure_initialized, ensure_not_paused, guarded, next_event_nonce};
use crate::error::ContractError;
use crate::events;
use crate::hash::{address_word, batch_invalidation_key, make_batch_digest, make_checkpoint};
use crate::msg::SubmitBatchMsg;
use crate::state::{INVALIDATION_MAPPING, LAST_BATCH_NONCES, LAST_VALSET_CHECKPOINT, MAX_NONCE_JUMP};
use crate::validator::{check_validator_signatures, validate_valset, Valset};
use crate::vault;

/// Execute a signed batch of payouts in `token_contract`.
///
/// Every destination is paid its amount and the caller collects the sum of
/// the fees once at the end. A failing payout reverts the whole batch.
pub fn execute_submit_batch(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    batch: SubmitBatchMsg,
) -> Result<Response, ContractError> {
    ensure_not_paused(deps.storage)?;
    acquire_guard(deps.storage)?;

    let token = deps.api.addr_validate(&batch.token_contract)?;

    let last_batch_nonce = LAST_BATCH_NONCES
        .may_load(deps.storage, &token)?
        .unwrap_or_default();
    if batch.batch_nonce <= last_batch_nonce {
        return Err(ContractError::BatchNonceNotGreater);
    }
    if batch.batch_nonce - last_batch_nonce >= MAX_NONCE_JUMP {
        return Err(ContractError::BatchNonceJumpTooLarge);
    }
    if batch.batch_timeout <= env.block.height {
        return Err(ContractError::BatchTimedOut);
    }

    let current = Valset::parse(&batch.current_valset)?;
    let sigs = validate_valset(&current, &batch.signatures)?;
    let config = ensure_initialized(deps.storage)?;
    if make_checkpoint(&config.hyperion_id, &current) != LAST_VALSET_CHECKPOINT.load(deps.storage)?
    {
        return Err(ContractError::CheckpointMismatch);
    }

    if batch.amounts.len() != batch.destinations.len() || batch.amounts.len() != batch.fees.len() {
        return Err(ContractError::MalformedBatch);
    }
    let destinations = batch
        .destinations
        .iter()
        .map(|destination| deps.api.addr_validate(destination))
        .collect::<StdResult<Vec<Addr>>>()?;
    let destination_words: Vec<[u8; 32]> = destinations
        .iter()
        .map(|destination| address_word(destination.as_str()))
        .collect();

    let digest = make_batch_digest(
        &config.hyperion_id,
        &batch.amounts,
        &destination_words,
        &batch.fees,
        batch.batch_nonce,
        &address_word(token.as_str()),
        batch.batch_timeout,
    );
    check_validator_signatures(deps.api, &current, &sigs, &digest, config.power_threshold)?;

    LAST_BATCH_NONCES.save(deps.storage, &token, &batch.batch_nonce)?;
    INVALIDATION_MAPPING.save(
        deps.storage,
        batch_invalidation_key(token.as_str()).as_slice(),
        &batch.batch_nonce,
    )?;

    let mut messages = vec![];
    let mut total_fee = Uint128::zero();
    for ((amount, destination), fee) in batch.amounts.iter().zip(&destinations).zip(&batch.fees) {
        if let Some(msg) = vault::disburse(deps.storage, &token, destination, *amount)? {
            messages.push(msg);
        }
        total_fee = total_fee
            .checked_add(*fee)
            .map_err(|_| ContractError::Overflow)?;
    }

    if let Some(msg) = vault::disburse(deps.storage, &token, &info.sender, total_fee)? {
        messages.push(msg);
    }

    let event_nonce = next_event_nonce(deps.storage)?;
    let transfers = batch.amounts.len();

    Ok(Response::new()
        .add_submessages(guarded(deps.storage, messages)?)
        .add_event(events::transaction_batch_executed(
            batch.batch_nonce,
            &token,
            event_nonce,
        ))
        .add_attribute("method", "submit_batch")
        .add_attribute("token", token)
        .add_attribute("batch_nonce", batch.batch_nonce.to_string())
        .add_attribute("event_nonce", event_nonce.to_string())
        .add_attribute("transfers", transfers.to_string())
        .add_attribute("total_fee", total_fee.to_string())
        .add_attribute("relayer", info.sender))
}
