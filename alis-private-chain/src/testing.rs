//! Signing helpers to build user transactions in tests.
use alloy_consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy_eips::eip2718::Encodable2718;
use alloy_primitives::{Address, Bytes, TxKind, U256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::SolCall;

use crate::abi::{approveCall, relayCall, transferCall};

const DEFAULT_KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

/// A user wallet signing legacy transactions with zero gas.
pub struct TestWallet {
    signer: PrivateKeySigner,
}

impl Default for TestWallet {
    fn default() -> Self {
        Self::new(DEFAULT_KEY)
    }
}

impl TestWallet {
    pub fn new(private_key: &str) -> Self {
        Self {
            signer: private_key.parse().expect("invalid private key"),
        }
    }

    /// Lowercase `0x` prefixed address.
    pub fn address(&self) -> String {
        self.signer.address().to_string().to_lowercase()
    }

    pub fn sign_transaction(&self, tx: TxLegacy) -> String {
        let signature = self
            .signer
            .sign_hash_sync(&tx.signature_hash())
            .expect("signing failed");
        let envelope = TxEnvelope::from(tx.into_signed(signature));
        format!("0x{}", hex::encode(envelope.encoded_2718()))
    }

    pub fn sign_call(&self, nonce: u64, to: &str, input: Vec<u8>) -> String {
        let to: Address = to.parse().expect("invalid address");
        self.sign_transaction(TxLegacy {
            nonce,
            to: TxKind::Call(to),
            input: Bytes::from(input),
            ..Default::default()
        })
    }

    pub fn transfer(&self, nonce: u64, token: &str, to: &str, value: U256) -> String {
        let call = transferCall {
            to: to.parse().expect("invalid address"),
            value,
        };
        self.sign_call(nonce, token, call.abi_encode())
    }

    pub fn approve(&self, nonce: u64, token: &str, spender: &str, value: U256) -> String {
        let call = approveCall {
            spender: spender.parse().expect("invalid address"),
            value,
        };
        self.sign_call(nonce, token, call.abi_encode())
    }

    pub fn relay(&self, nonce: u64, bridge: &str, recipient: &str, amount: U256) -> String {
        let call = relayCall {
            recipient: recipient.parse().expect("invalid address"),
            amount,
        };
        self.sign_call(nonce, bridge, call.abi_encode())
    }

    /// Personal message signature, `0x` prefixed.
    pub fn sign_message(&self, message: &str) -> String {
        let signature = self
            .signer
            .sign_message_sync(message.as_bytes())
            .expect("signing failed");
        format!("0x{}", hex::encode(signature.as_bytes()))
    }
}
