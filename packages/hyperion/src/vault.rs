//! Token custody.
//!
//! Non-native tokens are held by the bridge contract itself and moved with
//! cw20 `Transfer`/`TransferFrom`. Helios-native tokens are minted and burned
//! through the bridge's minter role on the token contract.

use cosmwasm_std::{
    to_json_binary, Addr, CosmosMsg, Deps, QuerierWrapper, StdResult, Storage, Uint128, WasmMsg,
};
use cw20::{BalanceResponse, Cw20ExecuteMsg, Cw20QueryMsg, TokenInfoResponse};

use crate::state::HELIOS_NATIVE_TOKENS;

/// Metadata of a token as announced to Helios
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

pub fn is_native(storage: &dyn Storage, token: &Addr) -> bool {
    HELIOS_NATIVE_TOKENS
        .may_load(storage, token)
        .ok()
        .flatten()
        .unwrap_or(false)
}

fn execute_msg<T: serde::Serialize>(token: &Addr, msg: &T) -> StdResult<CosmosMsg> {
    Ok(CosmosMsg::Wasm(WasmMsg::Execute {
        contract_addr: token.to_string(),
        msg: to_json_binary(msg)?,
        funds: vec![],
    }))
}

/// Move `amount` of `token` out of the vault.
pub fn transfer_msg(token: &Addr, recipient: &Addr, amount: Uint128) -> StdResult<CosmosMsg> {
    execute_msg(
        token,
        &Cw20ExecuteMsg::Transfer {
            recipient: recipient.to_string(),
            amount,
        },
    )
}

/// Pull `amount` of `token` from `owner` into `recipient` using the bridge's allowance.
pub fn transfer_from_msg(
    token: &Addr,
    owner: &Addr,
    recipient: &Addr,
    amount: Uint128,
) -> StdResult<CosmosMsg> {
    execute_msg(
        token,
        &Cw20ExecuteMsg::TransferFrom {
            owner: owner.to_string(),
            recipient: recipient.to_string(),
            amount,
        },
    )
}

/// Mint a bridged token. The bridge must be its minter.
pub fn mint_msg(token: &Addr, recipient: &Addr, amount: Uint128) -> StdResult<CosmosMsg> {
    execute_msg(
        token,
        &Cw20ExecuteMsg::Mint {
            recipient: recipient.to_string(),
            amount,
        },
    )
}

/// Burn a bridged token out of `owner`. The bridge must be its minter.
pub fn bridge_burn_msg(token: &Addr, owner: &Addr, amount: Uint128) -> StdResult<CosmosMsg> {
    execute_msg(
        token,
        &cosmos_erc20::msg::ExecuteMsg::BridgeBurn {
            owner: owner.to_string(),
            amount,
        },
    )
}

/// Pay `amount` of `token` to `recipient`: mint for native tokens, vault
/// transfer otherwise. Nothing is sent for a zero amount.
pub fn disburse(
    storage: &dyn Storage,
    token: &Addr,
    recipient: &Addr,
    amount: Uint128,
) -> StdResult<Option<CosmosMsg>> {
    if amount.is_zero() {
        return Ok(None);
    }
    let msg = if is_native(storage, token) {
        mint_msg(token, recipient, amount)?
    } else {
        transfer_msg(token, recipient, amount)?
    };
    Ok(Some(msg))
}

pub fn balance_of(querier: &QuerierWrapper, token: &Addr, account: &Addr) -> StdResult<Uint128> {
    let res: BalanceResponse = querier.query_wasm_smart(
        token,
        &Cw20QueryMsg::Balance {
            address: account.to_string(),
        },
    )?;
    Ok(res.balance)
}

/// Read the cw20 token info. A token that does not answer is announced with
/// an empty name and symbol and zero decimals.
pub fn token_metadata(deps: Deps, token: &Addr) -> TokenMetadata {
    match deps
        .querier
        .query_wasm_smart::<TokenInfoResponse>(token, &Cw20QueryMsg::TokenInfo {})
    {
        Ok(info) => TokenMetadata {
            name: info.name,
            symbol: info.symbol,
            decimals: info.decimals,
        },
        Err(err) => {
            deps.api
                .debug(&format!("token metadata of {token} unavailable: {err}"));
            TokenMetadata::default()
        }
    }
}
