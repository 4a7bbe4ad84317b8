//! Weighted multisig verification over a presented validator set.

use cosmwasm_std::{Api, Uint128, Uint256};

use crate::error::ContractError;
use crate::hash::{eth_signed_message_hash, keccak256};
use crate::msg::{Signatures, ValsetArgs};

/// secp256k1 group order divided by two; larger `s` values are malleable
const HALF_CURVE_ORDER: [u8; 32] = [
    0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0x5d, 0x57, 0x6e, 0x73, 0x57, 0xa4, 0x50, 0x1d, 0xdf, 0xe9, 0x2f, 0x46, 0x68, 0x1b, 0x20, 0xa0,
];

/// A validator set with its addresses decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Valset {
    pub validators: Vec<[u8; 20]>,
    pub powers: Vec<Uint256>,
    pub valset_nonce: Uint256,
    pub reward_amount: Uint128,
    /// `None` for no reward
    pub reward_token: Option<String>,
}

impl Valset {
    /// Decode `args`. The validator and power lists are not compared here.
    pub fn parse(args: &ValsetArgs) -> Result<Self, ContractError> {
        Ok(Valset {
            validators: parse_eth_addresses(&args.validators)?,
            powers: args.powers.clone(),
            valset_nonce: args.valset_nonce,
            reward_amount: args.reward_amount,
            reward_token: args.reward_token.clone().filter(|token| !token.is_empty()),
        })
    }
}

/// One decoded `(v, r, s)` entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub v: u8,
    pub r: [u8; 32],
    pub s: [u8; 32],
}

/// Decode `0x`-prefixed 20-byte hex addresses.
pub fn parse_eth_addresses(addresses: &[String]) -> Result<Vec<[u8; 20]>, ContractError> {
    addresses.iter().map(|a| parse_eth_address(a)).collect()
}

pub fn parse_eth_address(address: &str) -> Result<[u8; 20], ContractError> {
    let invalid = || ContractError::InvalidValidatorAddress {
        address: address.to_string(),
    };
    let hex_part = address.strip_prefix("0x").unwrap_or(address);
    let bytes = hex::decode(hex_part).map_err(|_| invalid())?;
    bytes.try_into().map_err(|_| invalid())
}

/// The presented set and the signature arrays must all line up by index,
/// with every `r` and `s` exactly 32 bytes.
pub fn validate_valset(
    valset: &Valset,
    signatures: &Signatures,
) -> Result<Vec<Signature>, ContractError> {
    let n = valset.validators.len();
    if valset.powers.len() != n
        || signatures.v.len() != n
        || signatures.r.len() != n
        || signatures.s.len() != n
    {
        return Err(ContractError::MalformedCurrentValset);
    }

    signatures
        .v
        .iter()
        .zip(&signatures.r)
        .zip(&signatures.s)
        .map(|((v, r), s)| -> Result<Signature, ContractError> {
            Ok(Signature {
                v: *v,
                r: r.as_slice()
                    .try_into()
                    .map_err(|_| ContractError::MalformedCurrentValset)?,
                s: s.as_slice()
                    .try_into()
                    .map_err(|_| ContractError::MalformedCurrentValset)?,
            })
        })
        .collect()
}

/// Recover the Ethereum address that signed `prehash` (ecrecover).
///
/// Only `v` of 27 or 28 and low-s signatures are accepted; anything else,
/// including a failed recovery, yields `None`.
pub fn recover_signer(api: &dyn Api, prehash: &[u8; 32], sig: &Signature) -> Option<[u8; 20]> {
    if sig.v != 27 && sig.v != 28 {
        return None;
    }
    if sig.s > HALF_CURVE_ORDER {
        return None;
    }

    let mut signature = [0u8; 64];
    signature[..32].copy_from_slice(&sig.r);
    signature[32..].copy_from_slice(&sig.s);

    let pubkey = api
        .secp256k1_recover_pubkey(prehash, &signature, sig.v - 27)
        .ok()?;
    // uncompressed SEC1: 0x04 ‖ x ‖ y
    if pubkey.len() != 65 {
        return None;
    }
    let hash = keccak256(&pubkey[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    Some(address)
}

/// Whether `signer` produced `sig` over the eth-signed hash of `digest`.
pub fn verify_sig(api: &dyn Api, signer: &[u8; 20], digest: &[u8; 32], sig: &Signature) -> bool {
    recover_signer(api, &eth_signed_message_hash(digest), sig).as_ref() == Some(signer)
}

/// Sum of the powers, failing on overflow.
pub fn total_power(powers: &[Uint256]) -> Result<Uint256, ContractError> {
    powers.iter().try_fold(Uint256::zero(), |acc, power| {
        acc.checked_add(*power).map_err(|_| ContractError::Overflow)
    })
}

/// Check that validators holding at least `power_threshold` signed `digest`.
///
/// Validators with zero power or `v == 0` abstain. A signature that does not
/// recover to its validator is fatal. Verification stops as soon as the
/// threshold is reached, so later signatures are never inspected.
pub fn check_validator_signatures(
    api: &dyn Api,
    valset: &Valset,
    signatures: &[Signature],
    digest: &[u8; 32],
    power_threshold: Uint256,
) -> Result<(), ContractError> {
    let mut cumulative_power = Uint256::zero();

    for ((validator, power), sig) in valset.validators.iter().zip(&valset.powers).zip(signatures) {
        if power.is_zero() || sig.v == 0 {
            continue;
        }

        if !verify_sig(api, validator, digest, sig) {
            return Err(ContractError::InvalidSignature);
        }

        cumulative_power = cumulative_power
            .checked_add(*power)
            .map_err(|_| ContractError::Overflow)?;
        if cumulative_power >= power_threshold {
            return Ok(());
        }
    }

    Err(ContractError::InsufficientPower)
}
