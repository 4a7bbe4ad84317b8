//! CosmosERC20 entry points.
//!
//! Standard cw20 messages are delegated to `cw20-base`; only the bridge burn
//! is implemented here.

#[cfg(not(feature = "library"))]
use cosmwasm_std::entry_point;
use cosmwasm_std::{Binary, Deps, DepsMut, Env, MessageInfo, Response, StdResult, Uint128};
use cw2::set_contract_version;
use cw20_base::allowances::{
    execute_burn_from, execute_decrease_allowance, execute_increase_allowance,
    execute_send_from, execute_transfer_from,
};
use cw20_base::contract::{
    execute_burn, execute_mint, execute_send, execute_transfer, execute_update_minter,
};
use cw20_base::state::{BALANCES, TOKEN_INFO};

use crate::error::ContractError;
use crate::msg::{ExecuteMsg, InstantiateMsg, QueryMsg};

const CONTRACT_NAME: &str = "crates.io:hyperion-cosmos-erc20";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Instantiate
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    mut deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    if msg.mint.is_none() {
        return Err(ContractError::MissingMinter);
    }

    let response = cw20_base::contract::instantiate(deps.branch(), env, info, msg)?;
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;
    Ok(response)
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
    let response = match msg {
        ExecuteMsg::Transfer { recipient, amount } => {
            execute_transfer(deps, env, info, recipient, amount)?
        }
        ExecuteMsg::Burn { amount } => execute_burn(deps, env, info, amount)?,
        ExecuteMsg::Send {
            contract,
            amount,
            msg,
        } => execute_send(deps, env, info, contract, amount, msg)?,
        ExecuteMsg::IncreaseAllowance {
            spender,
            amount,
            expires,
        } => execute_increase_allowance(deps, env, info, spender, amount, expires)?,
        ExecuteMsg::DecreaseAllowance {
            spender,
            amount,
            expires,
        } => execute_decrease_allowance(deps, env, info, spender, amount, expires)?,
        ExecuteMsg::TransferFrom {
            owner,
            recipient,
            amount,
        } => execute_transfer_from(deps, env, info, owner, recipient, amount)?,
        ExecuteMsg::SendFrom {
            owner,
            contract,
            amount,
            msg,
        } => execute_send_from(deps, env, info, owner, contract, amount, msg)?,
        ExecuteMsg::BurnFrom { owner, amount } => {
            execute_burn_from(deps, env, info, owner, amount)?
        }
        ExecuteMsg::Mint { recipient, amount } => {
            execute_mint(deps, env, info, recipient, amount)?
        }
        ExecuteMsg::UpdateMinter { new_minter } => {
            execute_update_minter(deps, env, info, new_minter)?
        }
        ExecuteMsg::BridgeBurn { owner, amount } => {
            return execute_bridge_burn(deps, info, owner, amount)
        }
    };
    Ok(response)
}

/// Burn straight out of `owner`'s balance. The minter is trusted to have
/// been authorized by `owner` through its own entry point.
pub fn execute_bridge_burn(
    deps: DepsMut,
    info: MessageInfo,
    owner: String,
    amount: Uint128,
) -> Result<Response, ContractError> {
    let token_info = TOKEN_INFO.load(deps.storage)?;
    let is_minter = token_info
        .mint
        .as_ref()
        .map(|mint| mint.minter == info.sender)
        .unwrap_or(false);
    if !is_minter {
        return Err(ContractError::Unauthorized);
    }
    if amount.is_zero() {
        return Err(cw20_base::ContractError::InvalidZeroAmount {}.into());
    }

    let owner = deps.api.addr_validate(&owner)?;
    BALANCES.update(deps.storage, &owner, |balance| -> StdResult<_> {
        Ok(balance.unwrap_or_default().checked_sub(amount)?)
    })?;
    TOKEN_INFO.update(deps.storage, |mut token_info| -> StdResult<_> {
        token_info.total_supply = token_info.total_supply.checked_sub(amount)?;
        Ok(token_info)
    })?;

    Ok(Response::new()
        .add_attribute("action", "bridge_burn")
        .add_attribute("from", owner)
        .add_attribute("by", info.sender)
        .add_attribute("amount", amount.to_string()))
}

// ============================================================================
// Query
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> StdResult<Binary> {
    cw20_base::contract::query(deps, env, msg)
}
