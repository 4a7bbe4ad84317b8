//! In-process devnet.
//!
//! Boots a `cw-multi-test` chain, deploys and initializes the bridge from the
//! devnet configuration and replays the main bridge flows against it:
//! bootstrap -> token deployment -> deposits -> signed batch -> valset rotation.

use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use cosmwasm_std::{
    to_json_binary, Addr, CosmosMsg, Empty, Event, HexBinary, Uint128, Uint256, WasmMsg,
};
use cw20::{Cw20Coin, MinterResponse};
use cw_multi_test::{App, AppResponse, Contract, ContractWrapper, Executor};
use eyre::{eyre, Result, WrapErr};
use serde::Serialize;
use tracing::info;

use hyperion::hash::{address_word, bytes32_to_hex, make_batch_digest, make_checkpoint};
use hyperion::msg::{
    ExecuteMsg, InitializeMsg, InstantiateMsg, QueryMsg, Signatures, SubmitBatchMsg,
};
use hyperion::validator::Valset;
use hyperion::{StateResponse, ValsetArgs};

use crate::config::DevnetConfig;

const NATIVE_DENOM: &str = "ahelios";
const NATIVE_SUPPLY: u128 = 1_000_000;
const EXTERNAL_SUPPLY: u128 = 1_000_000;
const DEPOSIT_AMOUNT: u128 = 250_000;
const NATIVE_DEPOSIT_AMOUNT: u128 = 1_000;
const PAYOUT_AMOUNT: u128 = 100_000;
const PAYOUT_FEE: u128 = 500;
const ROTATION_REWARD: u128 = 10;
const BATCH_TIMEOUT_BLOCKS: u64 = 100;

/// Outcome of a devnet run
#[derive(Debug, Serialize)]
pub struct DevnetReport {
    pub bridge: Addr,
    pub state: StateResponse,
    /// One line per bridge event, in emission order
    pub events: Vec<String>,
}

/// Validator keys and powers of the committed set
struct Committee {
    keys: Vec<PrivateKeySigner>,
    powers: Vec<Uint256>,
    nonce: Uint256,
    threshold: Uint256,
}

impl Committee {
    fn addresses(&self) -> Vec<String> {
        self.keys
            .iter()
            .map(|key| format!("0x{}", hex::encode(key.address())))
            .collect()
    }

    fn valset(&self, reward_amount: Uint128, reward_token: Option<&Addr>) -> ValsetArgs {
        ValsetArgs {
            validators: self.addresses(),
            powers: self.powers.clone(),
            valset_nonce: self.nonce,
            reward_amount,
            reward_token: reward_token.map(|token| token.to_string()),
        }
    }

    /// Sign `digest` in validator order until the threshold is met; the
    /// remaining validators abstain with `v = 0`.
    fn sign(&self, digest: &[u8; 32]) -> Result<Signatures> {
        let n = self.keys.len();
        let zero = HexBinary::from([0u8; 32].as_slice());
        let mut signatures = Signatures {
            v: vec![0u8; n],
            r: vec![zero.clone(); n],
            s: vec![zero; n],
        };

        let mut power = Uint256::zero();
        for (i, key) in self.keys.iter().enumerate() {
            if power >= self.threshold {
                break;
            }
            if self.powers[i].is_zero() {
                continue;
            }
            let signature = key
                .sign_message_sync(digest)
                .wrap_err("Failed to sign digest")?;
            let bytes = signature.as_bytes();
            signatures.v[i] = bytes[64];
            signatures.r[i] = HexBinary::from(&bytes[..32]);
            signatures.s[i] = HexBinary::from(&bytes[32..64]);
            power += self.powers[i];
        }
        Ok(signatures)
    }
}

fn checkpoint(hyperion_id: &[u8; 32], valset: &ValsetArgs) -> Result<[u8; 32]> {
    let valset = Valset::parse(valset).map_err(|e| eyre!("Invalid validator set: {}", e))?;
    Ok(make_checkpoint(hyperion_id, &valset))
}

fn bridge_contract() -> Box<dyn Contract<Empty>> {
    Box::new(
        ContractWrapper::new(
            hyperion::contract::execute,
            hyperion::contract::instantiate,
            hyperion::contract::query,
        )
        .with_reply(hyperion::contract::reply),
    )
}

fn token_contract() -> Box<dyn Contract<Empty>> {
    Box::new(ContractWrapper::new(
        cosmos_erc20::contract::execute,
        cosmos_erc20::contract::instantiate,
        cosmos_erc20::contract::query,
    ))
}

/// Executes messages and keeps the bridge's events in emission order.
struct Chain {
    app: App,
    bridge: Addr,
    block_time: u64,
    events: Vec<String>,
}

impl Chain {
    fn execute_bridge(&mut self, sender: &Addr, msg: &ExecuteMsg) -> Result<AppResponse> {
        let res = self
            .app
            .execute_contract(sender.clone(), self.bridge.clone(), msg, &[])
            .map_err(|e| eyre!("Bridge call failed: {}", e.root_cause()))?;
        self.record(&res);
        Ok(res)
    }

    fn execute_token(
        &mut self,
        sender: &Addr,
        token: &Addr,
        msg: &cosmos_erc20::msg::ExecuteMsg,
    ) -> Result<AppResponse> {
        self.app
            .execute_contract(sender.clone(), token.clone(), msg, &[])
            .map_err(|e| eyre!("Token call failed: {}", e.root_cause()))
    }

    fn record(&mut self, res: &AppResponse) {
        let bridge = self.bridge.as_str();
        self.events.extend(
            res.events
                .iter()
                .filter(|event| emitted_by(event, bridge))
                .filter_map(describe_event),
        );
    }

    fn advance_block(&mut self) {
        let block_time = self.block_time;
        self.app.update_block(|block| {
            block.height += 1;
            block.time = block.time.plus_seconds(block_time);
        });
    }
}

pub fn run(config: &DevnetConfig) -> Result<DevnetReport> {
    let hyperion_id = config.hyperion_id()?;
    let deployer = Addr::unchecked(&config.deployer);
    let relayer = Addr::unchecked(&config.relayer);

    let mut committee = Committee {
        keys: config.validator_keys()?,
        powers: config
            .validators
            .iter()
            .map(|v| Uint256::from(v.power))
            .collect(),
        nonce: Uint256::zero(),
        threshold: Uint256::from(config.power_threshold),
    };

    // ------------------------------------------------------------------------
    // Bootstrap
    // ------------------------------------------------------------------------
    let mut app = App::default();
    let bridge_code_id = app.store_code(bridge_contract());
    let token_code_id = app.store_code(token_contract());

    let genesis = committee.valset(Uint128::zero(), None);
    let instantiate = InstantiateMsg {
        cosmos_erc20_code_id: token_code_id,
        initialize: Some(InitializeMsg {
            hyperion_id: HexBinary::from(hyperion_id.as_slice()),
            power_threshold: committee.threshold,
            validators: genesis.validators.clone(),
            powers: genesis.powers.clone(),
        }),
    };
    let res = app
        .execute(
            deployer.clone(),
            CosmosMsg::Wasm(WasmMsg::Instantiate {
                admin: None,
                code_id: bridge_code_id,
                msg: to_json_binary(&instantiate)?,
                funds: vec![],
                label: "hyperion".to_string(),
            }),
        )
        .map_err(|e| eyre!("Bridge deployment failed: {}", e.root_cause()))?;
    let bridge = res
        .events
        .iter()
        .filter(|event| event.ty == "instantiate")
        .find_map(|event| attribute(event, "_contract_address"))
        .map(Addr::unchecked)
        .ok_or_else(|| eyre!("Bridge address missing from instantiation"))?;

    let mut chain = Chain {
        app,
        bridge,
        block_time: config.block_time_secs,
        events: Vec::new(),
    };
    chain.record(&res);
    info!(
        bridge = %chain.bridge,
        checkpoint = %bytes32_to_hex(&checkpoint(&hyperion_id, &genesis)?),
        "Bridge deployed"
    );
    chain.advance_block();

    // ------------------------------------------------------------------------
    // Tokens
    // ------------------------------------------------------------------------
    let res = chain.execute_bridge(
        &deployer,
        &ExecuteMsg::DeployErc20WithSupply {
            cosmos_denom: NATIVE_DENOM.to_string(),
            name: "Helios".to_string(),
            symbol: "HLS".to_string(),
            decimals: 18,
            supply: Uint128::new(NATIVE_SUPPLY),
        },
    )?;
    let native = res
        .events
        .iter()
        .filter(|event| event.ty == "wasm-erc20_deployed")
        .find_map(|event| attribute(event, "token_contract"))
        .map(Addr::unchecked)
        .ok_or_else(|| eyre!("Factory did not announce the deployed token"))?;
    info!(token = %native, denom = NATIVE_DENOM, "Native token deployed");

    let external = chain
        .app
        .instantiate_contract(
            token_code_id,
            deployer.clone(),
            &cosmos_erc20::msg::InstantiateMsg {
                name: "Wrapped Ether".to_string(),
                symbol: "WETH".to_string(),
                decimals: 18,
                initial_balances: vec![Cw20Coin {
                    address: deployer.to_string(),
                    amount: Uint128::new(EXTERNAL_SUPPLY),
                }],
                mint: Some(MinterResponse {
                    minter: deployer.to_string(),
                    cap: None,
                }),
                marketing: None,
            },
            &[],
            "weth",
            None,
        )
        .map_err(|e| eyre!("External token deployment failed: {}", e.root_cause()))?;
    let spender = chain.bridge.to_string();
    chain.execute_token(
        &deployer,
        &external,
        &cosmos_erc20::msg::ExecuteMsg::IncreaseAllowance {
            spender,
            amount: Uint128::new(EXTERNAL_SUPPLY),
            expires: None,
        },
    )?;
    info!(token = %external, "External token deployed");
    chain.advance_block();

    // ------------------------------------------------------------------------
    // Deposits
    // ------------------------------------------------------------------------
    let destination = HexBinary::from(address_word(deployer.as_str()).as_slice());
    chain.execute_bridge(
        &deployer,
        &ExecuteMsg::SendToHelios {
            token_contract: external.to_string(),
            destination: destination.clone(),
            amount: Uint128::new(DEPOSIT_AMOUNT),
            data: "devnet".to_string(),
        },
    )?;
    chain.execute_bridge(
        &deployer,
        &ExecuteMsg::SendToHelios {
            token_contract: native.to_string(),
            destination,
            amount: Uint128::new(NATIVE_DEPOSIT_AMOUNT),
            data: String::new(),
        },
    )?;
    info!(
        external = DEPOSIT_AMOUNT,
        native = NATIVE_DEPOSIT_AMOUNT,
        "Deposits sent"
    );
    chain.advance_block();

    // ------------------------------------------------------------------------
    // Signed batch
    // ------------------------------------------------------------------------
    let current = committee.valset(Uint128::zero(), None);
    let amounts = vec![Uint128::new(PAYOUT_AMOUNT)];
    let destinations = vec![deployer.to_string()];
    let fees = vec![Uint128::new(PAYOUT_FEE)];
    let batch_nonce = Uint256::from(1u128);
    let batch_timeout = chain.app.block_info().height + BATCH_TIMEOUT_BLOCKS;
    let destination_words: Vec<[u8; 32]> =
        destinations.iter().map(|d| address_word(d)).collect();
    let digest = make_batch_digest(
        &hyperion_id,
        &amounts,
        &destination_words,
        &fees,
        batch_nonce,
        &address_word(external.as_str()),
        batch_timeout,
    );
    let signatures = committee.sign(&digest)?;
    chain.execute_bridge(
        &relayer,
        &ExecuteMsg::SubmitBatch(SubmitBatchMsg {
            current_valset: current.clone(),
            signatures,
            amounts,
            destinations,
            fees,
            batch_nonce,
            token_contract: external.to_string(),
            batch_timeout,
        }),
    )?;
    info!(batch_nonce = %batch_nonce, digest = %bytes32_to_hex(&digest), "Batch executed");
    chain.advance_block();

    // ------------------------------------------------------------------------
    // Valset rotation
    // ------------------------------------------------------------------------
    let next_nonce = committee.nonce + Uint256::from(1u128);
    let mut next = committee.valset(Uint128::new(ROTATION_REWARD), Some(&native));
    next.valset_nonce = next_nonce;
    let next_checkpoint = checkpoint(&hyperion_id, &next)?;
    let signatures = committee.sign(&next_checkpoint)?;
    chain.execute_bridge(
        &relayer,
        &ExecuteMsg::UpdateValset {
            new_valset: next,
            current_valset: current,
            signatures,
        },
    )?;
    committee.nonce = next_nonce;
    info!(
        valset_nonce = %committee.nonce,
        checkpoint = %bytes32_to_hex(&next_checkpoint),
        "Validator set rotated"
    );

    let state: StateResponse = chain
        .app
        .wrap()
        .query_wasm_smart(chain.bridge.clone(), &QueryMsg::State {})
        .wrap_err("State query failed")?;

    Ok(DevnetReport {
        bridge: chain.bridge,
        state,
        events: chain.events,
    })
}

fn attribute(event: &Event, key: &str) -> Option<String> {
    event
        .attributes
        .iter()
        .find(|attr| attr.key == key)
        .map(|attr| attr.value.clone())
}

fn emitted_by(event: &Event, contract: &str) -> bool {
    event.ty.starts_with("wasm-")
        && attribute(event, "_contract_address").as_deref() == Some(contract)
}

/// One-line summary of a bridge event: `[nonce] type key=value ...`
fn describe_event(event: &Event) -> Option<String> {
    let ty = event.ty.strip_prefix("wasm-")?;
    let details: Vec<String> = event
        .attributes
        .iter()
        .filter(|attr| attr.key != "_contract_address" && attr.key != "event_nonce")
        .map(|attr| format!("{}={}", attr.key, attr.value))
        .collect();
    let line = match attribute(event, "event_nonce") {
        Some(nonce) => format!("[{}] {} {}", nonce, ty, details.join(" ")),
        None => format!("{} {}", ty, details.join(" ")),
    };
    Some(line)
}
