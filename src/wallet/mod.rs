// Allow deprecated Signature for compatibility with alloy-consensus ecosystem
#![allow(deprecated)]

use alloy_primitives::{Address, Signature, B256};
use bip32::{DerivationPath, XPrv};
use bip39::Mnemonic;
use k256::ecdsa::SigningKey;
use sha3::{digest::FixedOutput, Digest, Keccak256};
use std::str::FromStr;
use tiny_keccak::{Hasher, Keccak};
use zeroize::Zeroizing;

use crate::error::Error;
use crate::evm::tx::{ContractCall, SignedCall};

// Wallet connector and the connector slot
pub mod connector;
pub use connector::{ConnectorSlot, LocalKeyConnector, WalletConnector};

/// HD Path prefix for Ethereum chains (BIP-44)
const ETHEREUM_HD_PATH: &str = "m/44'/60'/0'/0/";

/// Local key wallet used to sign whitelist transactions
pub struct WhitelistWallet {
    /// secp256k1 signer
    signer: SigningKey,
    /// Account index used for derivation
    account_index: u32,
}

// Note: WhitelistWallet intentionally does not implement Clone
// The signing key should not be easily duplicated

impl std::fmt::Debug for WhitelistWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let address = self
            .address()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "<invalid>".to_string());
        f.debug_struct("WhitelistWallet")
            .field("address", &address)
            .field("account_index", &self.account_index)
            .finish()
    }
}

impl WhitelistWallet {
    /// Create a wallet from a mnemonic using the Ethereum derivation path
    pub fn from_mnemonic(mnemonic: &str, account_index: u32) -> Result<Self, Error> {
        let mnemonic = Mnemonic::from_str(mnemonic)
            .map_err(|e| Error::Wallet(format!("Invalid mnemonic: {}", e)))?;

        let seed = Zeroizing::new(mnemonic.to_seed(""));

        let path = format!("{}{}", ETHEREUM_HD_PATH, account_index);
        let path = DerivationPath::from_str(&path)
            .map_err(|e| Error::Wallet(format!("Invalid derivation path: {}", e)))?;

        let derived_key = XPrv::derive_from_path(&seed[..], &path)
            .map_err(|e| Error::Wallet(format!("Key derivation error: {}", e)))?;

        let key_bytes = Zeroizing::new(derived_key.to_bytes());
        let signer = SigningKey::from_slice(&key_bytes[..])
            .map_err(|e| Error::Wallet(format!("Failed to create signing key: {}", e)))?;

        Ok(Self {
            signer,
            account_index,
        })
    }

    /// Get the Ethereum address of this wallet
    ///
    /// Keccak-256 of the uncompressed public key without its 0x04 prefix;
    /// the address is the last 20 bytes.
    pub fn address(&self) -> Result<Address, Error> {
        let point = self.signer.verifying_key().to_encoded_point(false);
        let pubkey_bytes = point.as_bytes();

        if pubkey_bytes.len() != 65 || pubkey_bytes[0] != 0x04 {
            return Err(Error::Wallet(
                "Invalid public key format for Ethereum address derivation".to_string(),
            ));
        }

        let mut hasher = Keccak::v256();
        hasher.update(&pubkey_bytes[1..]);
        let mut hash = [0u8; 32];
        hasher.finalize(&mut hash);

        Ok(Address::from_slice(&hash[12..]))
    }

    /// Get the account index
    pub fn account_index(&self) -> u32 {
        self.account_index
    }

    fn sign_with_keccak<F>(&self, builder: F) -> Result<(Signature, B256), Error>
    where
        F: FnOnce(&mut Keccak256),
    {
        let mut digest = Keccak256::new();
        builder(&mut digest);

        let hash_bytes: [u8; 32] = digest.clone().finalize_fixed().into();

        let (sig, recid) = self
            .signer
            .sign_digest_recoverable(digest)
            .map_err(|e| Error::Wallet(format!("Failed to sign digest: {}", e)))?;

        let signature = Signature::from((sig, recid));
        Ok((signature, B256::from(hash_bytes)))
    }

    /// Sign a contract call as an EIP-1559 transaction
    pub fn sign_call(&self, call: &ContractCall) -> Result<SignedCall, Error> {
        let payload = call.signing_payload();
        let (signature, _) = self.sign_with_keccak(|d| d.update(&payload))?;
        Ok(call.seal(signature))
    }
}
