//! Off-chain digest computation for validators and relayers.
//!
//! Inputs are JSON files with string-encoded numbers, so that values beyond
//! 2^53 survive any JSON tooling. Validators are Ethereum addresses; tokens
//! and batch destinations are Cosmos addresses.

use std::path::Path;
use std::str::FromStr;

use cosmwasm_std::{Uint128, Uint256};
use eyre::{eyre, Result, WrapErr};
use serde::{Deserialize, Serialize};

use hyperion::hash::{
    address_word, bytes32_to_hex, eth_signed_message_hash, make_batch_digest, make_checkpoint,
};
use hyperion::validator::Valset;
use hyperion::ValsetArgs;

/// Validator set as read from a JSON file
#[derive(Debug, Clone, Deserialize)]
pub struct ValsetFile {
    pub validators: Vec<String>,
    pub powers: Vec<String>,
    pub valset_nonce: String,
    #[serde(default)]
    pub reward_amount: Option<String>,
    #[serde(default)]
    pub reward_token: Option<String>,
}

/// Transaction batch as read from a JSON file
#[derive(Debug, Clone, Deserialize)]
pub struct BatchFile {
    pub token_contract: String,
    pub batch_nonce: String,
    /// Block height
    pub batch_timeout: u64,
    pub transactions: Vec<BatchTransaction>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchTransaction {
    pub destination: String,
    pub amount: String,
    #[serde(default)]
    pub fee: Option<String>,
}

/// What validators sign: the digest and its eth-signed-message hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DigestOutput {
    pub digest: String,
    pub eth_signed_message_hash: String,
}

impl DigestOutput {
    fn new(digest: [u8; 32]) -> Self {
        Self {
            digest: bytes32_to_hex(&digest),
            eth_signed_message_hash: bytes32_to_hex(&eth_signed_message_hash(&digest)),
        }
    }
}

/// Parse a Hyperion ID given either as 32-byte hex or as an ASCII name of at
/// most 32 bytes, right-padded with zeros.
pub fn parse_hyperion_id(raw: &str) -> Result<[u8; 32]> {
    if let Some(hex_part) = raw.strip_prefix("0x") {
        let bytes = hex::decode(hex_part).wrap_err("Hyperion ID is not valid hex")?;
        return bytes
            .try_into()
            .map_err(|_| eyre!("Hyperion ID {} is not 32 bytes of hex", raw));
    }
    let bytes = raw.as_bytes();
    if bytes.is_empty() || bytes.len() > 32 {
        return Err(eyre!("Hyperion ID must be 1 to 32 ASCII bytes"));
    }
    let mut id = [0u8; 32];
    id[..bytes.len()].copy_from_slice(bytes);
    Ok(id)
}

fn parse_u256(raw: &str, field: &str) -> Result<Uint256> {
    Uint256::from_str(raw.trim()).map_err(|e| eyre!("{}: invalid number {:?}: {}", field, raw, e))
}

fn parse_u128(raw: &str, field: &str) -> Result<Uint128> {
    Uint128::from_str(raw.trim()).map_err(|e| eyre!("{}: invalid number {:?}: {}", field, raw, e))
}

impl ValsetFile {
    pub fn to_valset_args(&self) -> Result<ValsetArgs> {
        if self.validators.len() != self.powers.len() {
            return Err(eyre!(
                "{} validators but {} powers",
                self.validators.len(),
                self.powers.len()
            ));
        }
        let powers = self
            .powers
            .iter()
            .map(|p| parse_u256(p, "powers"))
            .collect::<Result<Vec<_>>>()?;

        Ok(ValsetArgs {
            validators: self.validators.clone(),
            powers,
            valset_nonce: parse_u256(&self.valset_nonce, "valset_nonce")?,
            reward_amount: match &self.reward_amount {
                Some(raw) => parse_u128(raw, "reward_amount")?,
                None => Uint128::zero(),
            },
            reward_token: self.reward_token.clone(),
        })
    }

    pub fn to_valset(&self) -> Result<Valset> {
        Valset::parse(&self.to_valset_args()?).map_err(|e| eyre!("validators: {}", e))
    }
}

impl BatchFile {
    pub fn digest(&self, hyperion_id: &[u8; 32]) -> Result<[u8; 32]> {
        let mut amounts = Vec::with_capacity(self.transactions.len());
        let mut destinations = Vec::with_capacity(self.transactions.len());
        let mut fees = Vec::with_capacity(self.transactions.len());
        for tx in &self.transactions {
            amounts.push(parse_u128(&tx.amount, "amount")?);
            destinations.push(address_word(&tx.destination));
            fees.push(match &tx.fee {
                Some(raw) => parse_u128(raw, "fee")?,
                None => Uint128::zero(),
            });
        }

        Ok(make_batch_digest(
            hyperion_id,
            &amounts,
            &destinations,
            &fees,
            parse_u256(&self.batch_nonce, "batch_nonce")?,
            &address_word(&self.token_contract),
            self.batch_timeout,
        ))
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).wrap_err_with(|| format!("Failed to parse {}", path.display()))
}

pub fn checkpoint_from_file(path: &Path, hyperion_id: &[u8; 32]) -> Result<DigestOutput> {
    let file: ValsetFile = read_json(path)?;
    let valset = file.to_valset()?;
    let checkpoint = make_checkpoint(hyperion_id, &valset);
    tracing::debug!(
        validators = valset.validators.len(),
        valset_nonce = %valset.valset_nonce,
        checkpoint = %bytes32_to_hex(&checkpoint),
        "Checkpoint computed"
    );
    Ok(DigestOutput::new(checkpoint))
}

pub fn batch_digest_from_file(path: &Path, hyperion_id: &[u8; 32]) -> Result<DigestOutput> {
    let file: BatchFile = read_json(path)?;
    let digest = file.digest(hyperion_id)?;
    tracing::debug!(
        token = %file.token_contract,
        batch_nonce = %file.batch_nonce,
        transactions = file.transactions.len(),
        digest = %bytes32_to_hex(&digest),
        "Batch digest computed"
    );
    Ok(DigestOutput::new(digest))
}
