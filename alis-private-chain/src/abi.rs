//! Validation of the ABI encoded call data of ERC20 and bridge transactions.
//!
//! The three supported calls share the same layout: a 4 bytes selector,
//! an address word and an amount word.
use alloy_primitives::{Address, U256};
use alloy_sol_types::{sol, SolCall};

use crate::format::decode_hex;
use crate::ChainError;

sol! {
    function transfer(address to, uint256 value) external returns (bool);
    function approve(address spender, uint256 value) external returns (bool);
    function relay(address recipient, uint256 amount) external;
}

const CALL_DATA_LEN: usize = 4 + 32 + 32;

/// 10^18, one whole token.
pub fn one_token() -> U256 {
    U256::from(10u64).pow(U256::from(18u64))
}

/// 10^24, the upper bound of every transferable amount.
pub fn max_token_amount() -> U256 {
    U256::from(10u64).pow(U256::from(24u64))
}

#[derive(Debug, PartialEq, Eq)]
struct AddressAmountCall {
    address: Address,
    amount: U256,
}

fn decode_address_amount_call(
    data_hex: &str,
    selector: [u8; 4],
) -> Result<AddressAmountCall, ChainError> {
    let data = decode_hex(data_hex, "data")?;

    if data.len() != CALL_DATA_LEN {
        return Err(ChainError::Validation("data is invalid".to_string()));
    }

    if data[..4] != selector {
        return Err(ChainError::Validation("method is invalid".to_string()));
    }

    // Addresses are left padded with 12 zero bytes.
    if data[4..16].iter().any(|b| *b != 0) {
        return Err(ChainError::Validation("address is invalid".to_string()));
    }

    Ok(AddressAmountCall {
        address: Address::from_slice(&data[16..36]),
        amount: U256::from_be_slice(&data[36..68]),
    })
}

fn check_amount(amount: U256, min: U256, max: U256) -> Result<U256, ChainError> {
    if amount < min || amount > max {
        return Err(ChainError::Validation("value is invalid".to_string()));
    }
    Ok(amount)
}

pub(crate) fn parse_address(address: &str, field: &str) -> Result<Address, ChainError> {
    address
        .parse::<Address>()
        .map_err(|_e| ChainError::Validation(format!("{} is invalid", field)))
}

/// Checks a `transfer(address,uint256)` call to `expected_to`, returns the amount.
pub fn validate_erc20_transfer_data(data_hex: &str, expected_to: &str) -> Result<U256, ChainError> {
    let call = decode_address_amount_call(data_hex, transferCall::SELECTOR)?;

    if call.address != parse_address(expected_to, "to address")? {
        return Err(ChainError::Validation("to address is invalid".to_string()));
    }

    check_amount(call.amount, U256::from(1u64), max_token_amount())
}

/// Checks an `approve(address,uint256)` call for `spender`, returns the amount.
/// A zero amount is allowed, it resets a previous approval.
pub fn validate_erc20_approve_data(data_hex: &str, spender: &Address) -> Result<U256, ChainError> {
    let call = decode_address_amount_call(data_hex, approveCall::SELECTOR)?;

    if call.address != *spender {
        return Err(ChainError::Validation("spender is invalid".to_string()));
    }

    check_amount(call.amount, U256::ZERO, max_token_amount())
}

/// Checks a bridge `relay(address,uint256)` call, returns the amount.
pub fn validate_erc20_relay_data(data_hex: &str) -> Result<U256, ChainError> {
    let call = decode_address_amount_call(data_hex, relayCall::SELECTOR)?;

    if call.address == Address::ZERO {
        return Err(ChainError::Validation("recipient is invalid".to_string()));
    }

    check_amount(call.amount, one_token(), max_token_amount())
}
