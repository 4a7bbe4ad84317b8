use cosmwasm_std::StdError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    /// Errors of the underlying cw20-base implementation, passed through unchanged
    #[error("{0}")]
    Base(#[from] cw20_base::ContractError),

    #[error("Unauthorized: only the minter may bridge-burn")]
    Unauthorized,

    #[error("Bridged tokens must be instantiated with a minter")]
    MissingMinter,
}
