//! Shared harness for the bridge integration tests.
//!
//! `TestEnv` owns a cw-multi-test [`App`] with a deployed bridge and the
//! stored `cosmos-erc20` code. Validators are deterministic local signers;
//! mock cw20 tokens cover the token behaviours the vault has to tolerate.

#![allow(dead_code)]

use alloy::primitives::B256;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use cosmwasm_schema::cw_serde;
use cosmwasm_std::{
    to_json_binary, Addr, Binary, Deps, DepsMut, Empty, Env, Event, HexBinary, MessageInfo,
    Response, StdError, StdResult, Uint128, Uint256, WasmMsg,
};
use cw20::{BalanceResponse, Cw20Coin, TokenInfoResponse};
use cw_multi_test::{App, AppResponse, Contract, ContractWrapper, Executor};
use cw_storage_plus::Item;
use serde::de::DeserializeOwned;

use hyperion::hash::{address_word, make_batch_digest, make_checkpoint};
use hyperion::msg::{
    ExecuteMsg, InitializeMsg, InstantiateMsg, OwnerResponse, QueryMsg, Signatures,
    StateResponse, SubmitBatchMsg, ValsetArgs,
};
use hyperion::validator::Valset;

pub const OWNER: &str = "owner";
pub const USER: &str = "user";
pub const RELAYER: &str = "relayer";
pub const RECIPIENT_X: &str = "recipient_x";
pub const RECIPIENT_Y: &str = "recipient_y";
pub const ANYONE: &str = "anyone";

pub const HYPERION_ID: [u8; 32] = [0x01; 32];
pub const DESTINATION: [u8; 32] = [0xde; 32];

pub fn destination() -> HexBinary {
    HexBinary::from(DESTINATION.as_slice())
}

// ============================================================================
// Contracts
// ============================================================================

pub fn contract_bridge() -> Box<dyn Contract<Empty>> {
    let contract = ContractWrapper::new(
        hyperion::contract::execute,
        hyperion::contract::instantiate,
        hyperion::contract::query,
    )
    .with_reply(hyperion::contract::reply);
    Box::new(contract)
}

pub fn contract_cosmos_erc20() -> Box<dyn Contract<Empty>> {
    let contract = ContractWrapper::new(
        cosmos_erc20::contract::execute,
        cosmos_erc20::contract::instantiate,
        cosmos_erc20::contract::query,
    );
    Box::new(contract)
}

pub fn contract_mock_cw20() -> Box<dyn Contract<Empty>> {
    let contract = ContractWrapper::new(mock_execute, mock_instantiate, mock_query);
    Box::new(contract)
}

// ============================================================================
// Validators
// ============================================================================

pub fn signer(seed: u8) -> PrivateKeySigner {
    PrivateKeySigner::from_bytes(&B256::repeat_byte(seed)).unwrap()
}

pub fn eth_address(key: &PrivateKeySigner) -> String {
    format!("0x{}", hex::encode(key.address()))
}

/// Sign `digest` with the eth-signed-message prefix, returning `(v, r, s)`.
pub fn sign(key: &PrivateKeySigner, digest: &[u8; 32]) -> (u8, HexBinary, HexBinary) {
    let sig = key.sign_message_sync(digest).unwrap();
    let bytes = sig.as_bytes();
    (
        bytes[64],
        HexBinary::from(&bytes[..32]),
        HexBinary::from(&bytes[32..64]),
    )
}

/// A validator set together with its keys.
#[derive(Clone)]
pub struct Committee {
    pub keys: Vec<PrivateKeySigner>,
    pub powers: Vec<Uint256>,
    pub nonce: Uint256,
    pub reward_amount: Uint128,
    pub reward_token: Option<String>,
}

impl Committee {
    pub fn new(seeds: &[u8], powers: &[u128], nonce: u128) -> Self {
        Self {
            keys: seeds.iter().map(|s| signer(*s)).collect(),
            powers: powers.iter().map(|p| Uint256::from(*p)).collect(),
            nonce: Uint256::from(nonce),
            reward_amount: Uint128::zero(),
            reward_token: None,
        }
    }

    pub fn addresses(&self) -> Vec<String> {
        self.keys.iter().map(eth_address).collect()
    }

    pub fn valset(&self) -> ValsetArgs {
        ValsetArgs {
            validators: self.addresses(),
            powers: self.powers.clone(),
            valset_nonce: self.nonce,
            reward_amount: self.reward_amount,
            reward_token: self.reward_token.clone(),
        }
    }

    pub fn checkpoint(&self) -> [u8; 32] {
        make_checkpoint(&HYPERION_ID, &Valset::parse(&self.valset()).unwrap())
    }

    /// Signatures of the validators at `signing` indexes; everyone else abstains.
    pub fn sign(&self, digest: &[u8; 32], signing: &[usize]) -> Signatures {
        let n = self.keys.len();
        let zero = HexBinary::from([0u8; 32].as_slice());
        let mut sigs = Signatures {
            v: vec![0; n],
            r: vec![zero.clone(); n],
            s: vec![zero; n],
        };
        for &i in signing {
            let (v, r, s) = sign(&self.keys[i], digest);
            sigs.v[i] = v;
            sigs.r[i] = r;
            sigs.s[i] = s;
        }
        sigs
    }
}

/// Validators A, B, C with 100 power each.
pub fn genesis_committee() -> Committee {
    Committee::new(&[0x0a, 0x0b, 0x0c], &[100, 100, 100], 0)
}

pub fn initialize_msg(committee: &Committee, threshold: u128) -> InitializeMsg {
    InitializeMsg {
        hyperion_id: HexBinary::from(HYPERION_ID.as_slice()),
        power_threshold: Uint256::from(threshold),
        validators: committee.addresses(),
        powers: committee.powers.clone(),
    }
}

// ============================================================================
// Bridge environment
// ============================================================================

pub struct TestEnv {
    pub app: App,
    pub bridge: Addr,
    pub token_code_id: u64,
    pub mock_code_id: u64,
    pub committee: Committee,
    pub threshold: Uint256,
}

/// Deployed and initialized bridge: committee A,B,C, threshold 200.
pub fn setup() -> TestEnv {
    setup_with(genesis_committee(), 200)
}

pub fn setup_with(committee: Committee, threshold: u128) -> TestEnv {
    let mut env = setup_uninitialized();
    env.execute(
        OWNER,
        &ExecuteMsg::Initialize(initialize_msg(&committee, threshold)),
    )
    .unwrap();
    env.committee = committee;
    env.threshold = Uint256::from(threshold);
    env
}

pub fn setup_uninitialized() -> TestEnv {
    let mut app = App::default();
    let bridge_code_id = app.store_code(contract_bridge());
    let token_code_id = app.store_code(contract_cosmos_erc20());
    let mock_code_id = app.store_code(contract_mock_cw20());

    let bridge = app
        .instantiate_contract(
            bridge_code_id,
            Addr::unchecked(OWNER),
            &InstantiateMsg {
                cosmos_erc20_code_id: token_code_id,
                initialize: None,
            },
            &[],
            "hyperion",
            None,
        )
        .unwrap();

    TestEnv {
        app,
        bridge,
        token_code_id,
        mock_code_id,
        committee: genesis_committee(),
        threshold: Uint256::zero(),
    }
}

impl TestEnv {
    /// Execute on the bridge; failures are reduced to the contract's reason.
    pub fn execute(&mut self, sender: &str, msg: &ExecuteMsg) -> Result<AppResponse, String> {
        self.app
            .execute_contract(Addr::unchecked(sender), self.bridge.clone(), msg, &[])
            .map_err(|err| err.root_cause().to_string())
    }

    pub fn query<T: DeserializeOwned>(&self, msg: &QueryMsg) -> T {
        self.app
            .wrap()
            .query_wasm_smart(self.bridge.clone(), msg)
            .unwrap()
    }

    pub fn state(&self) -> StateResponse {
        self.query(&QueryMsg::State {})
    }

    pub fn last_event_nonce(&self) -> Uint256 {
        self.query(&QueryMsg::StateLastEventNonce {})
    }

    pub fn checkpoint(&self) -> HexBinary {
        self.query(&QueryMsg::StateLastValsetCheckpoint {})
    }

    pub fn last_batch_nonce(&self, token: &Addr) -> Uint256 {
        self.query(&QueryMsg::LastBatchNonce {
            erc20_address: token.to_string(),
        })
    }

    pub fn owner(&self) -> Option<Addr> {
        let res: OwnerResponse = self.query(&QueryMsg::Owner {});
        res.owner
    }

    pub fn paused(&self) -> bool {
        self.query(&QueryMsg::Paused {})
    }

    pub fn is_native(&self, token: &Addr) -> bool {
        self.query(&QueryMsg::IsHeliosNativeToken {
            token: token.to_string(),
        })
    }

    pub fn block_height(&self) -> u64 {
        self.app.block_info().height
    }

    pub fn advance_time(&mut self, seconds: u64) {
        self.app.update_block(|block| {
            block.time = block.time.plus_seconds(seconds);
            block.height += 1;
        });
    }

    pub fn advance_blocks(&mut self, blocks: u64) {
        self.app.update_block(|block| {
            block.height += blocks;
            block.time = block.time.plus_seconds(5 * blocks);
        });
    }

    // ========================================================================
    // Validator set and batches
    // ========================================================================

    /// `update_valset` moving from the current committee to `next`, signed by
    /// the current validators at `signing`.
    pub fn update_valset_msg(&self, next: &Committee, signing: &[usize]) -> ExecuteMsg {
        ExecuteMsg::UpdateValset {
            new_valset: next.valset(),
            current_valset: self.committee.valset(),
            signatures: self.committee.sign(&next.checkpoint(), signing),
        }
    }

    pub fn rotate(&mut self, next: Committee, signing: &[usize]) -> Result<AppResponse, String> {
        let msg = self.update_valset_msg(&next, signing);
        let res = self.execute(RELAYER, &msg)?;
        self.committee = next;
        Ok(res)
    }

    /// Batch of `(destination, amount, fee)` transfers in `token`, signed by
    /// the current validators at `signing`.
    pub fn batch_msg(
        &self,
        token: &Addr,
        transfers: &[(&str, u128, u128)],
        batch_nonce: u128,
        batch_timeout: u64,
        signing: &[usize],
    ) -> ExecuteMsg {
        let amounts: Vec<Uint128> = transfers.iter().map(|t| Uint128::new(t.1)).collect();
        let destinations: Vec<String> = transfers.iter().map(|t| t.0.to_string()).collect();
        let fees: Vec<Uint128> = transfers.iter().map(|t| Uint128::new(t.2)).collect();
        let destination_words: Vec<[u8; 32]> =
            destinations.iter().map(|d| address_word(d)).collect();

        let digest = make_batch_digest(
            &HYPERION_ID,
            &amounts,
            &destination_words,
            &fees,
            Uint256::from(batch_nonce),
            &address_word(token.as_str()),
            batch_timeout,
        );

        ExecuteMsg::SubmitBatch(SubmitBatchMsg {
            current_valset: self.committee.valset(),
            signatures: self.committee.sign(&digest, signing),
            amounts,
            destinations,
            fees,
            batch_nonce: Uint256::from(batch_nonce),
            token_contract: token.to_string(),
            batch_timeout,
        })
    }

    // ========================================================================
    // Tokens
    // ========================================================================

    /// Instantiate a mock cw20 holding `supply` for `holder`.
    pub fn deploy_mock(&mut self, behavior: Behavior, holder: &str, supply: u128) -> Addr {
        self.app
            .instantiate_contract(
                self.mock_code_id,
                Addr::unchecked(ANYONE),
                &MockInstantiateMsg {
                    behavior,
                    bridge: self.bridge.to_string(),
                    holder: holder.to_string(),
                    supply: Uint128::new(supply),
                },
                &[],
                "mock-cw20",
                None,
            )
            .unwrap()
    }

    pub fn approve(&mut self, token: &Addr, owner: &str, amount: u128) {
        self.app
            .execute_contract(
                Addr::unchecked(owner),
                token.clone(),
                &cw20::Cw20ExecuteMsg::IncreaseAllowance {
                    spender: self.bridge.to_string(),
                    amount: Uint128::new(amount),
                    expires: None,
                },
                &[],
            )
            .unwrap();
    }

    /// Move tokens held by `owner` into the bridge vault.
    pub fn fund_vault(&mut self, token: &Addr, owner: &str, amount: u128) {
        self.app
            .execute_contract(
                Addr::unchecked(owner),
                token.clone(),
                &cw20::Cw20ExecuteMsg::Transfer {
                    recipient: self.bridge.to_string(),
                    amount: Uint128::new(amount),
                },
                &[],
            )
            .unwrap();
    }

    pub fn balance_of(&self, token: &Addr, account: &str) -> Uint128 {
        let res: BalanceResponse = self
            .app
            .wrap()
            .query_wasm_smart(
                token.clone(),
                &cw20::Cw20QueryMsg::Balance {
                    address: account.to_string(),
                },
            )
            .unwrap();
        res.balance
    }

    pub fn total_supply(&self, token: &Addr) -> Uint128 {
        let res: TokenInfoResponse = self
            .app
            .wrap()
            .query_wasm_smart(token.clone(), &cw20::Cw20QueryMsg::TokenInfo {})
            .unwrap();
        res.total_supply
    }

    pub fn deploy_erc20_msg(denom: &str, supply: Option<u128>) -> ExecuteMsg {
        match supply {
            Some(supply) => ExecuteMsg::DeployErc20WithSupply {
                cosmos_denom: denom.to_string(),
                name: "Helios".to_string(),
                symbol: "HLS".to_string(),
                decimals: 18,
                supply: Uint128::new(supply),
            },
            None => ExecuteMsg::DeployErc20 {
                cosmos_denom: denom.to_string(),
                name: "Helios".to_string(),
                symbol: "HLS".to_string(),
                decimals: 18,
            },
        }
    }

    /// Deploy a Helios-native token through the factory and return its address.
    pub fn deploy_native(&mut self, denom: &str, supply: Option<u128>) -> Addr {
        let res = self
            .execute(OWNER, &Self::deploy_erc20_msg(denom, supply))
            .unwrap();
        deployed_token(&res)
    }

    pub fn send_to_helios(
        &mut self,
        sender: &str,
        token: &Addr,
        amount: u128,
        data: &str,
    ) -> Result<AppResponse, String> {
        self.execute(
            sender,
            &ExecuteMsg::SendToHelios {
                token_contract: token.to_string(),
                destination: destination(),
                amount: Uint128::new(amount),
                data: data.to_string(),
            },
        )
    }
}

// ============================================================================
// Events
// ============================================================================

/// Events of type `ty` emitted by contracts (surfaced as `wasm-<ty>`).
pub fn events<'a>(res: &'a AppResponse, ty: &str) -> Vec<&'a Event> {
    let ty = format!("wasm-{ty}");
    res.events.iter().filter(|event| event.ty == ty).collect()
}

pub fn attr(event: &Event, key: &str) -> Option<String> {
    event
        .attributes
        .iter()
        .find(|attr| attr.key == key)
        .map(|attr| attr.value.clone())
}

/// Attribute `key` of the first `ty` event in `res`.
pub fn event_attr(res: &AppResponse, ty: &str, key: &str) -> Option<String> {
    events(res, ty).first().and_then(|event| attr(event, key))
}

/// Token address announced by the `erc20_deployed` event in `res`.
pub fn deployed_token(res: &AppResponse) -> Addr {
    Addr::unchecked(event_attr(res, "erc20_deployed", "token_contract").unwrap())
}

// ============================================================================
// Mock cw20
// ============================================================================

/// How a mock token deviates from a well-behaved cw20.
#[cw_serde]
#[derive(Copy, Eq)]
pub enum Behavior {
    Standard,
    /// Burns 1% of every transfer out of the recipient
    FeeOnTransfer,
    /// `Transfer`/`TransferFrom` always fail
    Failing,
    /// `TokenInfo` queries fail
    NoMetadata,
    /// Calls back into the bridge whenever the bridge moves funds
    Reentrant,
}

#[cw_serde]
pub struct MockInstantiateMsg {
    pub behavior: Behavior,
    pub bridge: String,
    pub holder: String,
    pub supply: Uint128,
}

const BEHAVIOR: Item<Behavior> = Item::new("mock_behavior");
const BRIDGE: Item<Addr> = Item::new("mock_bridge");

fn mock_instantiate(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: MockInstantiateMsg,
) -> Result<Response, cw20_base::ContractError> {
    BEHAVIOR.save(deps.storage, &msg.behavior)?;
    BRIDGE.save(deps.storage, &Addr::unchecked(msg.bridge))?;

    cw20_base::contract::instantiate(
        deps,
        env,
        info,
        cw20_base::msg::InstantiateMsg {
            name: "Mock Token".to_string(),
            symbol: "MOCK".to_string(),
            decimals: 6,
            initial_balances: vec![Cw20Coin {
                address: msg.holder,
                amount: msg.supply,
            }],
            mint: None,
            marketing: None,
        },
    )
}

fn mock_execute(
    mut deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: cw20_base::msg::ExecuteMsg,
) -> Result<Response, cw20_base::ContractError> {
    use cw20_base::msg::ExecuteMsg as Cw20Msg;

    let behavior = BEHAVIOR.load(deps.storage)?;
    let bridge = BRIDGE.load(deps.storage)?;

    match (behavior, msg) {
        (Behavior::Failing, Cw20Msg::Transfer { .. } | Cw20Msg::TransferFrom { .. }) => {
            Err(StdError::generic_err("MockCw20: transfer rejected").into())
        }
        (Behavior::Reentrant, msg @ (Cw20Msg::Transfer { .. } | Cw20Msg::TransferFrom { .. }))
            if info.sender == bridge =>
        {
            let reenter = WasmMsg::Execute {
                contract_addr: bridge.to_string(),
                msg: to_json_binary(&ExecuteMsg::SendToCosmos {
                    token_contract: env.contract.address.to_string(),
                    destination: destination(),
                    amount: Uint128::new(1),
                })?,
                funds: vec![],
            };
            Ok(cw20_base::contract::execute(deps, env, info, msg)?.add_message(reenter))
        }
        (Behavior::FeeOnTransfer, Cw20Msg::Transfer { recipient, amount }) => {
            let res = cw20_base::contract::execute_transfer(
                deps.branch(),
                env,
                info,
                recipient.clone(),
                amount,
            )?;
            burn_transfer_fee(deps, &recipient, amount)?;
            Ok(res)
        }
        (
            Behavior::FeeOnTransfer,
            Cw20Msg::TransferFrom {
                owner,
                recipient,
                amount,
            },
        ) => {
            let res = cw20_base::allowances::execute_transfer_from(
                deps.branch(),
                env,
                info,
                owner,
                recipient.clone(),
                amount,
            )?;
            burn_transfer_fee(deps, &recipient, amount)?;
            Ok(res)
        }
        (_, msg) => cw20_base::contract::execute(deps, env, info, msg),
    }
}

fn burn_transfer_fee(deps: DepsMut, recipient: &str, amount: Uint128) -> StdResult<()> {
    use cw20_base::state::{BALANCES, TOKEN_INFO};

    let fee = amount.multiply_ratio(1u128, 100u128);
    let recipient = deps.api.addr_validate(recipient)?;
    BALANCES.update(deps.storage, &recipient, |balance| -> StdResult<_> {
        Ok(balance.unwrap_or_default().checked_sub(fee)?)
    })?;
    TOKEN_INFO.update(deps.storage, |mut info| -> StdResult<_> {
        info.total_supply = info.total_supply.checked_sub(fee)?;
        Ok(info)
    })?;
    Ok(())
}

fn mock_query(deps: Deps, env: Env, msg: cw20_base::msg::QueryMsg) -> StdResult<Binary> {
    if BEHAVIOR.load(deps.storage)? == Behavior::NoMetadata
        && matches!(msg, cw20_base::msg::QueryMsg::TokenInfo {})
    {
        return Err(StdError::generic_err("MockCw20: no token info"));
    }
    cw20_base::contract::query(deps, env, msg)
}
