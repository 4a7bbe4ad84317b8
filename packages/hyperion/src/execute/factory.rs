//! Deployment of bridged cw20 tokens representing Helios-native denoms.
//!
//! The token is instantiated from the stored `cosmos-erc20` code with the
//! bridge as its minter. Its address is only known once the instantiation
//! replies, so registration and the `erc20_deployed` event happen there.

use cosmwasm_std::{
    to_json_binary, DepsMut, Env, MessageInfo, Reply, Response, StdError, SubMsg, WasmMsg,
};
use cw20::{Cw20Coin, MinterResponse};

use super::{acquire_guard, ensure_owner_before_expiry, next_event_nonce, release_guard};
use crate::error::ContractError;
use crate::events;
use crate::state::{
    PendingDeployment, DEPLOY_REPLY_ID, HELIOS_NATIVE_TOKENS, PENDING_DEPLOYMENT, TOKEN_CODE_ID,
};

/// Deploy a `cosmos-erc20` minted by the bridge for `cosmos_denom`.
///
/// With a non-zero `supply`, that amount is credited to the caller at
/// instantiation.
pub fn execute_deploy_erc20(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    deployment: PendingDeployment,
) -> Result<Response, ContractError> {
    ensure_owner_before_expiry(deps.storage, &env, &info.sender)?;
    acquire_guard(deps.storage)?;

    let initial_balances = deployment
        .supply
        .filter(|supply| !supply.is_zero())
        .map(|amount| {
            vec![Cw20Coin {
                address: info.sender.to_string(),
                amount,
            }]
        })
        .unwrap_or_default();

    let instantiate = WasmMsg::Instantiate {
        admin: None,
        code_id: TOKEN_CODE_ID.load(deps.storage)?,
        msg: to_json_binary(&cosmos_erc20::msg::InstantiateMsg {
            name: deployment.name.clone(),
            symbol: deployment.symbol.clone(),
            decimals: deployment.decimals,
            initial_balances,
            mint: Some(MinterResponse {
                minter: env.contract.address.to_string(),
                cap: None,
            }),
            marketing: None,
        })?,
        funds: vec![],
        label: format!("hyperion {}", deployment.cosmos_denom),
    };

    let supply = deployment.supply.unwrap_or_default();
    PENDING_DEPLOYMENT.save(deps.storage, &deployment)?;

    Ok(Response::new()
        .add_submessage(SubMsg::reply_on_success(instantiate, DEPLOY_REPLY_ID))
        .add_attribute("method", "deploy_erc20")
        .add_attribute("cosmos_denom", deployment.cosmos_denom)
        .add_attribute("supply", supply.to_string()))
}

/// Register the instantiated token and announce it to Helios.
pub fn reply_deploy(deps: DepsMut, msg: Reply) -> Result<Response, ContractError> {
    let result = msg.result.into_result().map_err(StdError::generic_err)?;
    let address = result
        .events
        .iter()
        .filter(|event| event.ty == "instantiate")
        .flat_map(|event| &event.attributes)
        .find(|attr| attr.key == "_contract_address")
        .map(|attr| attr.value.clone())
        .ok_or(ContractError::MissingTokenAddress)?;
    let token = deps.api.addr_validate(&address)?;

    let deployment = PENDING_DEPLOYMENT.load(deps.storage)?;
    PENDING_DEPLOYMENT.remove(deps.storage);

    HELIOS_NATIVE_TOKENS.save(deps.storage, &token, &true)?;
    let event_nonce = next_event_nonce(deps.storage)?;
    release_guard(deps.storage)?;

    Ok(Response::new()
        .add_event(events::erc20_deployed(
            &deployment.cosmos_denom,
            &token,
            &deployment.name,
            &deployment.symbol,
            deployment.decimals,
            event_nonce,
        ))
        .add_attribute("method", "deploy_erc20_reply")
        .add_attribute("token", token)
        .add_attribute("event_nonce", event_nonce.to_string()))
}
