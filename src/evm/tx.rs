// alloy-consensus 0.4 still signs with the deprecated Signature type
#![allow(deprecated)]

use alloy_consensus::{SignableTransaction, Signed, TxEip1559};
use alloy_eips::eip2930::AccessList;
use alloy_primitives::{Address, Bytes, ChainId, Signature, TxKind, B256, U256};

/// Gas used by a plain transfer; replaced by the estimate before signing
const BASE_GAS: u64 = 21_000;

/// EIP-1559 fee caps in wei
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeeData {
    pub max_fee_per_gas: u128,
    pub max_priority_fee_per_gas: u128,
}

/// Unsigned zero-value contract call
#[derive(Clone, Debug)]
pub struct ContractCall {
    pub chain_id: ChainId,
    pub nonce: u64,
    pub contract: Address,
    pub calldata: Bytes,
    pub gas_limit: u64,
    pub fees: FeeData,
}

impl ContractCall {
    pub fn new(chain_id: ChainId, nonce: u64, contract: Address, calldata: Bytes) -> Self {
        Self {
            chain_id,
            nonce,
            contract,
            calldata,
            gas_limit: BASE_GAS,
            fees: FeeData::default(),
        }
    }

    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    pub fn with_fees(mut self, fees: FeeData) -> Self {
        self.fees = fees;
        self
    }

    fn as_eip1559(&self) -> TxEip1559 {
        TxEip1559 {
            chain_id: self.chain_id,
            nonce: self.nonce,
            gas_limit: self.gas_limit,
            max_fee_per_gas: self.fees.max_fee_per_gas,
            max_priority_fee_per_gas: self.fees.max_priority_fee_per_gas,
            to: TxKind::Call(self.contract),
            value: U256::ZERO,
            access_list: AccessList::default(),
            input: self.calldata.clone(),
        }
    }

    /// Typed payload whose keccak256 is signed
    pub fn signing_payload(&self) -> Vec<u8> {
        self.as_eip1559().encoded_for_signing()
    }

    pub fn signature_hash(&self) -> B256 {
        self.as_eip1559().signature_hash()
    }

    /// Attach `signature` and produce the raw `eth_sendRawTransaction` bytes
    pub fn seal(&self, signature: Signature) -> SignedCall {
        let tx = self.as_eip1559();
        let mut raw = Vec::with_capacity(tx.encoded_len_with_signature(&signature, false));
        tx.encode_with_signature(&signature, &mut raw, false);
        SignedCall {
            signed: tx.into_signed(signature),
            raw: Bytes::from(raw),
        }
    }
}

/// A sealed contract call ready for submission
#[derive(Clone, Debug)]
pub struct SignedCall {
    signed: Signed<TxEip1559>,
    raw: Bytes,
}

impl SignedCall {
    pub fn raw(&self) -> &Bytes {
        &self.raw
    }

    pub fn hash(&self) -> B256 {
        *self.signed.hash()
    }

    pub fn signature(&self) -> &Signature {
        self.signed.signature()
    }
}
