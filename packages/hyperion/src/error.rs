//! Error types for the Hyperion bridge contract
//!
//! `Display` strings are the reasons surfaced to callers.

use cosmwasm_std::StdError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    // ========================================================================
    // Authorization Errors
    // ========================================================================
    #[error("Ownable: caller is not the owner")]
    Unauthorized,

    #[error("Ownership has expired")]
    OwnershipExpired,

    #[error("Ownable: new owner is the zero address")]
    ZeroOwner,

    #[error("Ownership has not expired yet")]
    OwnershipNotExpired,

    // ========================================================================
    // Lifecycle Errors
    // ========================================================================
    #[error("Initializable: contract is already initialized")]
    AlreadyInitialized,

    #[error("Hyperion: not initialized")]
    NotInitialized,

    #[error("Pausable: paused")]
    Paused,

    #[error("Pausable: not paused")]
    NotPaused,

    #[error("ReentrancyGuard: reentrant call")]
    ReentrantCall,

    // ========================================================================
    // Nonce Errors
    // ========================================================================
    #[error("New valset nonce must be greater than the current nonce")]
    ValsetNonceNotGreater,

    #[error("New valset nonce must be less than 10^15 greater than the current nonce")]
    ValsetNonceJumpTooLarge,

    #[error("New batch nonce must be greater than the current nonce")]
    BatchNonceNotGreater,

    #[error("New batch nonce must be less than 10^15 greater than the current nonce")]
    BatchNonceJumpTooLarge,

    #[error("Batch timeout must be greater than the current block height")]
    BatchTimedOut,

    // ========================================================================
    // Consistency Errors
    // ========================================================================
    #[error("Malformed new validator set")]
    MalformedNewValset,

    #[error("Malformed current validator set")]
    MalformedCurrentValset,

    #[error("Supplied current validators and powers do not match checkpoint.")]
    CheckpointMismatch,

    #[error("Malformed batch of transactions")]
    MalformedBatch,

    #[error("Hyperion: invalid validator address {address}")]
    InvalidValidatorAddress { address: String },

    #[error("Hyperion: hyperion id must be 32 bytes")]
    InvalidHyperionId,

    #[error("Hyperion: destination must be 32 bytes")]
    InvalidDestination,

    #[error("Hyperion: amount must be greater than zero")]
    ZeroAmount,

    // ========================================================================
    // Quorum Errors
    // ========================================================================
    #[error("Submitted validator set signatures do not have enough power.")]
    InsufficientPower,

    #[error("New validator set does not have enough power.")]
    InsufficientValsetPower,

    #[error("Validator signature does not match.")]
    InvalidSignature,

    // ========================================================================
    // Value Errors
    // ========================================================================
    #[error("Hyperion: invalid token response")]
    InvalidTokenResponse,

    #[error("Hyperion: arithmetic overflow")]
    Overflow,

    // ========================================================================
    // Submessage Errors
    // ========================================================================
    #[error("Hyperion: unknown reply id {id}")]
    UnknownReply { id: u64 },

    #[error("Hyperion: instantiated token address missing from reply")]
    MissingTokenAddress,
}
