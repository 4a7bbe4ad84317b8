use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Binary, Uint128};
use cw20::Expiration;

/// Instantiation is the plain cw20-base message; `mint` is mandatory.
pub use cw20_base::msg::{InstantiateMsg, QueryMsg};

#[cw_serde]
pub enum ExecuteMsg {
    // ========================================================================
    // cw20
    // ========================================================================
    Transfer {
        recipient: String,
        amount: Uint128,
    },
    Burn {
        amount: Uint128,
    },
    Send {
        contract: String,
        amount: Uint128,
        msg: Binary,
    },
    IncreaseAllowance {
        spender: String,
        amount: Uint128,
        expires: Option<Expiration>,
    },
    DecreaseAllowance {
        spender: String,
        amount: Uint128,
        expires: Option<Expiration>,
    },
    TransferFrom {
        owner: String,
        recipient: String,
        amount: Uint128,
    },
    SendFrom {
        owner: String,
        contract: String,
        amount: Uint128,
        msg: Binary,
    },
    BurnFrom {
        owner: String,
        amount: Uint128,
    },
    /// Minter only
    Mint {
        recipient: String,
        amount: Uint128,
    },
    /// Minter only. `None` makes the supply fixed.
    UpdateMinter {
        new_minter: Option<String>,
    },

    // ========================================================================
    // Bridge
    // ========================================================================
    /// Burn `amount` out of `owner`'s balance without an allowance.
    /// Minter only.
    BridgeBurn {
        owner: String,
        amount: Uint128,
    },
}
