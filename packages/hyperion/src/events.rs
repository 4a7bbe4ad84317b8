//! Events observed by Helios orchestrators and indexers.
//!
//! Each bridge action produces one typed event (surfaced by the chain as
//! `wasm-<type>`). Attributes with an empty value are left out because the
//! chain rejects them.

use cosmwasm_std::{Addr, Event, HexBinary, Uint128, Uint256};

fn with_optional(event: Event, key: &str, value: impl Into<String>) -> Event {
    let value = value.into();
    if value.is_empty() {
        event
    } else {
        event.add_attribute(key, value)
    }
}

fn join<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

pub fn valset_updated(
    new_valset_nonce: Uint256,
    event_nonce: Uint256,
    reward_amount: Uint128,
    reward_token: Option<&str>,
    validators: &[String],
    powers: &[Uint256],
) -> Event {
    let event = Event::new("valset_updated")
        .add_attribute("new_valset_nonce", new_valset_nonce.to_string())
        .add_attribute("event_nonce", event_nonce.to_string())
        .add_attribute("reward_amount", reward_amount.to_string());
    let event = with_optional(event, "reward_token", reward_token.unwrap_or_default());
    let event = with_optional(event, "validators", join(validators));
    with_optional(event, "powers", join(powers))
}

pub fn send_to_helios(
    token_contract: &Addr,
    sender: &Addr,
    destination: &HexBinary,
    amount: Uint128,
    event_nonce: Uint256,
    data: &str,
) -> Event {
    let event = Event::new("send_to_helios")
        .add_attribute("token_contract", token_contract.as_str())
        .add_attribute("sender", sender.as_str())
        .add_attribute("destination", destination.to_hex())
        .add_attribute("amount", amount.to_string())
        .add_attribute("event_nonce", event_nonce.to_string());
    with_optional(event, "data", data)
}

pub fn send_to_cosmos(
    token_contract: &Addr,
    sender: &Addr,
    destination: &HexBinary,
    amount: Uint128,
    event_nonce: Uint256,
) -> Event {
    Event::new("send_to_cosmos")
        .add_attribute("token_contract", token_contract.as_str())
        .add_attribute("sender", sender.as_str())
        .add_attribute("destination", destination.to_hex())
        .add_attribute("amount", amount.to_string())
        .add_attribute("event_nonce", event_nonce.to_string())
}

pub fn transaction_batch_executed(
    batch_nonce: Uint256,
    token: &Addr,
    event_nonce: Uint256,
) -> Event {
    Event::new("transaction_batch_executed")
        .add_attribute("batch_nonce", batch_nonce.to_string())
        .add_attribute("token", token.as_str())
        .add_attribute("event_nonce", event_nonce.to_string())
}

pub fn erc20_deployed(
    cosmos_denom: &str,
    token_contract: &Addr,
    name: &str,
    symbol: &str,
    decimals: u8,
    event_nonce: Uint256,
) -> Event {
    let event = with_optional(Event::new("erc20_deployed"), "cosmos_denom", cosmos_denom)
        .add_attribute("token_contract", token_contract.as_str());
    let event = with_optional(event, "name", name);
    let event = with_optional(event, "symbol", symbol);
    event
        .add_attribute("decimals", decimals.to_string())
        .add_attribute("event_nonce", event_nonce.to_string())
}

pub fn paused(account: &Addr) -> Event {
    Event::new("paused").add_attribute("account", account.as_str())
}

pub fn unpaused(account: &Addr) -> Event {
    Event::new("unpaused").add_attribute("account", account.as_str())
}

/// `None` stands for the zero owner and leaves its attribute out
pub fn ownership_transferred(previous_owner: Option<&Addr>, new_owner: Option<&Addr>) -> Event {
    let event = Event::new("ownership_transferred");
    let event = with_optional(
        event,
        "previous_owner",
        previous_owner.map(Addr::as_str).unwrap_or_default(),
    );
    with_optional(
        event,
        "new_owner",
        new_owner.map(Addr::as_str).unwrap_or_default(),
    )
}
