//! Decoding and validation of raw transactions signed by users.
//!
//! Transactions relayed on behalf of users are legacy transactions with a
//! zero gas price, a zero gas limit and no native value. The only thing the
//! user decides is the call data sent to either the token contract or the
//! bridge contract.
use alloy_consensus::transaction::SignerRecoverable;
use alloy_consensus::TxEnvelope;
use alloy_eips::eip2718::Decodable2718;
use alloy_primitives::{Address, Bytes, Signature, U256};
use tracing::debug;

use crate::abi::{
    parse_address, validate_erc20_approve_data, validate_erc20_relay_data,
    validate_erc20_transfer_data,
};
use crate::format::{decode_hex, parse_hex_u64};
use crate::{ChainConfig, ChainError};

/// Contract a user transaction is expected to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetContract {
    Token,
    Bridge,
}

/// Fields of a decoded legacy transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedTransaction {
    pub nonce: u64,
    pub gas_price: u128,
    pub gas_limit: u64,
    pub to: Option<Address>,
    pub value: U256,
    pub chain_id: Option<u64>,
    pub input: Bytes,
    pub signer: Address,
}

/// Decodes a `0x` prefixed raw transaction and recovers its signer.
/// Only legacy transactions are accepted.
pub fn decode_raw_transaction(raw_transaction: &str) -> Result<DecodedTransaction, ChainError> {
    let bytes = decode_hex(raw_transaction, "raw_transaction")?;

    let envelope = TxEnvelope::decode_2718_exact(&bytes)
        .map_err(|_e| ChainError::Validation("raw_transaction is invalid".to_string()))?;

    let signer = envelope
        .recover_signer()
        .map_err(|_e| ChainError::Validation("signature is invalid".to_string()))?;

    match envelope {
        TxEnvelope::Legacy(signed) => {
            let tx = signed.tx();
            Ok(DecodedTransaction {
                nonce: tx.nonce,
                gas_price: tx.gas_price,
                gas_limit: tx.gas_limit,
                to: tx.to.to().copied(),
                value: tx.value,
                chain_id: tx.chain_id,
                input: tx.input.clone(),
                signer,
            })
        }
        _ => Err(ChainError::Validation(
            "transaction type is invalid".to_string(),
        )),
    }
}

/// Checks user signed transactions against the private chain settings.
#[derive(Debug, Clone)]
pub struct TransactionValidator {
    token_address: Address,
    bridge_address: Address,
    chain_id: Option<u64>,
}

impl TransactionValidator {
    pub fn new(token_address: Address, bridge_address: Address, chain_id: Option<u64>) -> Self {
        Self {
            token_address,
            bridge_address,
            chain_id,
        }
    }

    pub fn from_config(config: &ChainConfig) -> Result<Self, ChainError> {
        Ok(Self::new(
            parse_address(&config.token_contract_address, "token_contract_address")?,
            parse_address(&config.bridge_contract_address, "bridge_contract_address")?,
            config.private_chain_id,
        ))
    }

    pub fn bridge_address(&self) -> &Address {
        &self.bridge_address
    }

    fn target_address(&self, target: TargetContract) -> &Address {
        match target {
            TargetContract::Token => &self.token_address,
            TargetContract::Bridge => &self.bridge_address,
        }
    }

    /// Checks the envelope of `raw_transaction` and returns its `0x`
    /// prefixed call data.
    pub fn get_data_from_raw_transaction(
        &self,
        raw_transaction: &str,
        expected_nonce: &str,
        target: TargetContract,
    ) -> Result<String, ChainError> {
        let tx = decode_raw_transaction(raw_transaction)?;

        if tx.nonce != parse_hex_u64(expected_nonce, "nonce")? {
            return Err(ChainError::Validation("nonce is invalid".to_string()));
        }
        if tx.gas_price != 0 {
            return Err(ChainError::Validation("gasPrice is invalid".to_string()));
        }
        if tx.gas_limit != 0 {
            return Err(ChainError::Validation("gasLimit is invalid".to_string()));
        }
        if tx.to.as_ref() != Some(self.target_address(target)) {
            return Err(ChainError::Validation("to is invalid".to_string()));
        }
        if !tx.value.is_zero() {
            return Err(ChainError::Validation("value is invalid".to_string()));
        }
        if tx.chain_id != self.chain_id {
            return Err(ChainError::Validation("chainId is invalid".to_string()));
        }

        debug!("Raw transaction with nonce {} accepted", tx.nonce);

        Ok(format!("0x{}", hex::encode(&tx.input)))
    }

    /// Checks `raw_transaction` is signed by `expected_address`.
    pub fn validate_raw_transaction_signature(
        &self,
        raw_transaction: &str,
        expected_address: &str,
    ) -> Result<(), ChainError> {
        let tx = decode_raw_transaction(raw_transaction)?;
        let expected = parse_address(expected_address, "private_eth_address")?;

        if tx.signer != expected {
            return Err(ChainError::Validation("signature is invalid".to_string()));
        }
        Ok(())
    }

    pub fn validate_erc20_transfer_data(
        &self,
        data: &str,
        expected_to: &str,
    ) -> Result<U256, ChainError> {
        validate_erc20_transfer_data(data, expected_to)
    }

    /// The spender of an approval must be the bridge contract.
    pub fn validate_erc20_approve_data(&self, data: &str) -> Result<U256, ChainError> {
        validate_erc20_approve_data(data, &self.bridge_address)
    }

    pub fn validate_erc20_relay_data(&self, data: &str) -> Result<U256, ChainError> {
        validate_erc20_relay_data(data)
    }
}

/// Checks a personal message signature (`0x` prefixed, 65 bytes) was made by `expected_address`.
pub fn validate_message_signature(
    message: &str,
    signature: &str,
    expected_address: &str,
) -> Result<(), ChainError> {
    let bytes = decode_hex(signature, "signature")
        .map_err(|e| ChainError::InvalidSignature(e.to_string()))?;
    let signature = Signature::from_raw(&bytes)
        .map_err(|e| ChainError::InvalidSignature(e.to_string()))?;
    let expected = parse_address(expected_address, "address")
        .map_err(|e| ChainError::InvalidSignature(e.to_string()))?;

    let recovered = signature
        .recover_address_from_msg(message.as_bytes())
        .map_err(|e| ChainError::InvalidSignature(e.to_string()))?;

    if recovered != expected {
        return Err(ChainError::InvalidSignature(format!(
            "recovered {} instead of {}",
            recovered, expected
        )));
    }
    Ok(())
}
