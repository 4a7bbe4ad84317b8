//! Outgoing transfer handlers (Cosmos → Helios).
//!
//! `send_to_helios` and the legacy `send_to_cosmos` share one pipeline and
//! differ only in the event they emit.
//!
//! Helios-native tokens are burned from the sender and the deposit completes
//! in the same call. Other tokens are pulled with `TransferFrom`; the amount
//! credited is the bridge balance delta measured in the reply to that pull,
//! so fee-on-transfer tokens are credited what actually arrived.
//!
//! # Event nonces
//!
//! Every deposit advances `last_event_nonce` exactly once, so deposit nonces
//! stay contiguous. The first deposit of a non-native token also announces
//! the token with an `erc20_deployed` event. The announcement carries the
//! deposit's nonce and is emitted before the deposit event; observers take
//! the pair as one claim and order it by position within the transaction.
//! Announcements from the token factory stand alone and take a nonce of their
//! own.

use cosmwasm_std::{
    Addr, DepsMut, Env, Event, HexBinary, MessageInfo, Response, SubMsg, Uint128, Uint256,
};

use super::{acquire_guard, ensure_not_paused, guarded, next_event_nonce, release_guard};
use crate::error::ContractError;
use crate::events;
use crate::state::{Deposit, PendingDeposit, ANNOUNCED_TOKENS, DEPOSIT_REPLY_ID, PENDING_DEPOSIT};
use crate::vault;

/// Denom under which Helios registers a token first seen on this side
pub fn cosmos_denom(token: &Addr) -> String {
    format!("hyperion/{token}")
}

pub fn execute_send_to_helios(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    token_contract: String,
    destination: HexBinary,
    amount: Uint128,
    data: String,
) -> Result<Response, ContractError> {
    send(
        deps,
        env,
        info,
        token_contract,
        destination,
        amount,
        Deposit::Helios { data },
    )
}

pub fn execute_send_to_cosmos(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    token_contract: String,
    destination: HexBinary,
    amount: Uint128,
) -> Result<Response, ContractError> {
    send(
        deps,
        env,
        info,
        token_contract,
        destination,
        amount,
        Deposit::Cosmos,
    )
}

fn method(kind: &Deposit) -> &'static str {
    match kind {
        Deposit::Helios { .. } => "send_to_helios",
        Deposit::Cosmos => "send_to_cosmos",
    }
}

fn send(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    token_contract: String,
    destination: HexBinary,
    amount: Uint128,
    kind: Deposit,
) -> Result<Response, ContractError> {
    ensure_not_paused(deps.storage)?;
    acquire_guard(deps.storage)?;

    if destination.len() != 32 {
        return Err(ContractError::InvalidDestination);
    }
    if amount.is_zero() {
        return Err(ContractError::ZeroAmount);
    }
    let token = deps.api.addr_validate(&token_contract)?;
    let sender = info.sender;

    if vault::is_native(deps.storage, &token) {
        let burn = vault::bridge_burn_msg(&token, &sender, amount)?;
        let event_nonce = next_event_nonce(deps.storage)?;
        let deposit = PendingDeposit {
            token,
            sender,
            destination,
            requested: amount,
            balance_before: Uint128::zero(),
            kind,
        };

        return Ok(Response::new()
            .add_submessages(guarded(deps.storage, vec![burn])?)
            .add_event(deposit_event(&deposit, amount, event_nonce))
            .add_attribute("method", method(&deposit.kind))
            .add_attribute("token", deposit.token.as_str())
            .add_attribute("sender", deposit.sender.as_str())
            .add_attribute("amount", amount.to_string())
            .add_attribute("event_nonce", event_nonce.to_string()));
    }

    let balance_before = vault::balance_of(&deps.querier, &token, &env.contract.address)?;
    let pull = vault::transfer_from_msg(&token, &sender, &env.contract.address, amount)?;
    let label = method(&kind);

    PENDING_DEPOSIT.save(
        deps.storage,
        &PendingDeposit {
            token: token.clone(),
            sender: sender.clone(),
            destination,
            requested: amount,
            balance_before,
            kind,
        },
    )?;

    Ok(Response::new()
        .add_submessage(SubMsg::reply_on_success(pull, DEPOSIT_REPLY_ID))
        .add_attribute("method", label)
        .add_attribute("token", token)
        .add_attribute("sender", sender)
        .add_attribute("amount", amount.to_string()))
}

/// Complete a non-native deposit once its `TransferFrom` has succeeded.
pub fn reply_deposit(deps: DepsMut, env: Env) -> Result<Response, ContractError> {
    let deposit = PENDING_DEPOSIT.load(deps.storage)?;
    PENDING_DEPOSIT.remove(deps.storage);

    let balance_after = vault::balance_of(&deps.querier, &deposit.token, &env.contract.address)?;
    let received = balance_after
        .checked_sub(deposit.balance_before)
        .map_err(|_| ContractError::InvalidTokenResponse)?;

    let event_nonce = next_event_nonce(deps.storage)?;
    let mut response = Response::new();

    if !ANNOUNCED_TOKENS.has(deps.storage, &deposit.token) {
        let metadata = vault::token_metadata(deps.as_ref(), &deposit.token);
        ANNOUNCED_TOKENS.save(deps.storage, &deposit.token, &true)?;
        response = response.add_event(events::erc20_deployed(
            &cosmos_denom(&deposit.token),
            &deposit.token,
            &metadata.name,
            &metadata.symbol,
            metadata.decimals,
            event_nonce,
        ));
    }

    release_guard(deps.storage)?;

    Ok(response
        .add_event(deposit_event(&deposit, received, event_nonce))
        .add_attribute("method", method(&deposit.kind))
        .add_attribute("requested", deposit.requested.to_string())
        .add_attribute("received", received.to_string())
        .add_attribute("event_nonce", event_nonce.to_string()))
}

fn deposit_event(deposit: &PendingDeposit, amount: Uint128, event_nonce: Uint256) -> Event {
    match &deposit.kind {
        Deposit::Helios { data } => events::send_to_helios(
            &deposit.token,
            &deposit.sender,
            &deposit.destination,
            amount,
            event_nonce,
            data,
        ),
        Deposit::Cosmos => events::send_to_cosmos(
            &deposit.token,
            &deposit.sender,
            &deposit.destination,
            amount,
            event_nonce,
        ),
    }
}
