//! Digest computation for validator-set checkpoints and transaction batches
//!
//! These are the messages validators sign off-chain, so the byte layouts must
//! match Solidity's `abi.encode` exactly.
//!
//! # EVM Reference
//! ```solidity
//! bytes32 checkpoint = keccak256(abi.encode(
//!     hyperionId, bytes32("checkpoint"), valsetNonce,
//!     validators, powers, rewardAmount, rewardToken
//! ));
//!
//! bytes32 batchDigest = keccak256(abi.encode(
//!     hyperionId, bytes32("transactionBatch"),
//!     amounts, destinations, fees, batchNonce, tokenContract, batchTimeout
//! ));
//! ```
//!
//! Dynamic arrays are encoded as an offset word in the head and a tail of
//! `length ‖ elements`, each element left-padded to 32 bytes.
//!
//! Validators are 20-byte Ethereum addresses and take the place of Solidity
//! `address` values. Cosmos addresses (tokens, batch destinations, the reward
//! token) occupy the same word as [`address_word`], the keccak256 of the
//! bech32 string.

use cosmwasm_std::{Uint128, Uint256};
use tiny_keccak::{Hasher, Keccak};

use crate::validator::Valset;

/// `bytes32("checkpoint")`
pub const CHECKPOINT_TAG: [u8; 32] = right_pad(b"checkpoint");

/// `bytes32("transactionBatch")`
pub const TRANSACTION_BATCH_TAG: [u8; 32] = right_pad(b"transactionBatch");

const WORD: usize = 32;

const fn right_pad(tag: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    let mut i = 0;
    while i < tag.len() {
        out[i] = tag[i];
        i += 1;
    }
    out
}

/// Compute keccak256 hash of arbitrary data
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    output
}

/// 32-byte word standing for a Cosmos address inside signed payloads
pub fn address_word(address: &str) -> [u8; 32] {
    keccak256(address.as_bytes())
}

/// Compute the checkpoint of a validator set under `hyperion_id`.
///
/// # Byte Layout
/// - Bytes 0-31:    hyperionId
/// - Bytes 32-63:   "checkpoint" tag
/// - Bytes 64-95:   valsetNonce
/// - Bytes 96-127:  offset of validators (always 224)
/// - Bytes 128-159: offset of powers (224 + 32 * (1 + n))
/// - Bytes 160-191: rewardAmount
/// - Bytes 192-223: rewardToken (zero word when absent)
/// - Tail:          validators array, then powers array
pub fn make_checkpoint(hyperion_id: &[u8; 32], valset: &Valset) -> [u8; 32] {
    const HEAD_WORDS: usize = 7;

    let validators_offset = HEAD_WORDS * WORD;
    let powers_offset = validators_offset + array_len(valset.validators.len());

    let reward_token = valset
        .reward_token
        .as_deref()
        .map(address_word)
        .unwrap_or_default();

    let mut data = Vec::with_capacity(powers_offset + array_len(valset.powers.len()));
    data.extend_from_slice(hyperion_id);
    data.extend_from_slice(&CHECKPOINT_TAG);
    push_u256(&mut data, valset.valset_nonce);
    push_usize(&mut data, validators_offset);
    push_usize(&mut data, powers_offset);
    push_u128(&mut data, valset.reward_amount);
    data.extend_from_slice(&reward_token);

    push_usize(&mut data, valset.validators.len());
    for validator in &valset.validators {
        push_eth_address(&mut data, validator);
    }
    push_usize(&mut data, valset.powers.len());
    for power in &valset.powers {
        push_u256(&mut data, *power);
    }

    keccak256(&data)
}

/// Compute the digest validators sign to approve a batch.
///
/// # Byte Layout
/// - Bytes 0-31:    hyperionId
/// - Bytes 32-63:   "transactionBatch" tag
/// - Bytes 64-95:   offset of amounts (always 256)
/// - Bytes 96-127:  offset of destinations
/// - Bytes 128-159: offset of fees
/// - Bytes 160-191: batchNonce
/// - Bytes 192-223: tokenContract
/// - Bytes 224-255: batchTimeout
/// - Tail:          amounts, destinations, fees arrays
pub fn make_batch_digest(
    hyperion_id: &[u8; 32],
    amounts: &[Uint128],
    destinations: &[[u8; 32]],
    fees: &[Uint128],
    batch_nonce: Uint256,
    token_contract: &[u8; 32],
    batch_timeout: u64,
) -> [u8; 32] {
    const HEAD_WORDS: usize = 8;

    let amounts_offset = HEAD_WORDS * WORD;
    let destinations_offset = amounts_offset + array_len(amounts.len());
    let fees_offset = destinations_offset + array_len(destinations.len());

    let mut data = Vec::with_capacity(fees_offset + array_len(fees.len()));
    data.extend_from_slice(hyperion_id);
    data.extend_from_slice(&TRANSACTION_BATCH_TAG);
    push_usize(&mut data, amounts_offset);
    push_usize(&mut data, destinations_offset);
    push_usize(&mut data, fees_offset);
    push_u256(&mut data, batch_nonce);
    data.extend_from_slice(token_contract);
    push_u256(&mut data, Uint256::from(batch_timeout));

    push_u128_array(&mut data, amounts);
    push_usize(&mut data, destinations.len());
    for destination in destinations {
        data.extend_from_slice(destination);
    }
    push_u128_array(&mut data, fees);

    keccak256(&data)
}

/// `keccak256("\x19Ethereum Signed Message:\n32" ‖ digest)`, the hash that
/// `personal_sign` signers actually sign.
pub fn eth_signed_message_hash(digest: &[u8; 32]) -> [u8; 32] {
    const PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

    let mut data = [0u8; 28 + 32];
    data[..28].copy_from_slice(PREFIX);
    data[28..].copy_from_slice(digest);
    keccak256(&data)
}

/// Key of the batch invalidation entry for `token`: `keccak256(tokenWord)`
pub fn batch_invalidation_key(token: &str) -> [u8; 32] {
    keccak256(&address_word(token))
}

/// Convert 32-byte hash to hex string (for attributes and queries)
pub fn bytes32_to_hex(bytes: &[u8; 32]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Bytes taken by a dynamic array tail: the length word plus one word per element
fn array_len(len: usize) -> usize {
    WORD * (1 + len)
}

fn push_u256(data: &mut Vec<u8>, value: Uint256) {
    data.extend_from_slice(&value.to_be_bytes());
}

fn push_u128(data: &mut Vec<u8>, value: Uint128) {
    data.extend_from_slice(&[0u8; 16]);
    data.extend_from_slice(&value.u128().to_be_bytes());
}

fn push_usize(data: &mut Vec<u8>, value: usize) {
    push_u256(data, Uint256::from(value as u128));
}

fn push_eth_address(data: &mut Vec<u8>, address: &[u8; 20]) {
    data.extend_from_slice(&[0u8; 12]);
    data.extend_from_slice(address);
}

fn push_u128_array(data: &mut Vec<u8>, values: &[Uint128]) {
    push_usize(data, values.len());
    for value in values {
        push_u128(data, *value);
    }
}
