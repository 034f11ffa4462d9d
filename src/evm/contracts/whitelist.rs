//! Whitelist contract helpers
//!
//! Binds the deployed whitelist contract's address and ABI to a
//! [`ChainHandle`]. Reads work on any handle; `add_address_to_whitelist`
//! needs a signer.
//!
//! # Example
//!
//! ```rust
//! use whitelist_dapp::evm::contracts::IWhitelist;
//! use alloy_sol_types::SolCall;
//!
//! let calldata = IWhitelist::addAddressToWhitelistCall {}.abi_encode();
//! assert_eq!(calldata.len(), 4);
//! ```

use alloy_primitives::{Address, Bytes};
use alloy_sol_types::{sol, SolCall};

use crate::error::Error;
use crate::evm::types::{EvmError, PendingTransaction};
use crate::evm::ChainHandle;

sol! {
    #[derive(Debug)]
    interface IWhitelist {
        /// Add the caller to the whitelist; reverts when full or already joined
        function addAddressToWhitelist() external;

        /// Whether `account` has joined
        function whitelistedAddresses(address account) external view returns (bool);

        /// Number of addresses that have joined
        function numAddressesWhitelisted() external view returns (uint8);

        /// Capacity fixed at deployment
        function maxWhitelistedAddresses() external view returns (uint8);
    }
}

/// Callable proxy for the whitelist contract
pub struct WhitelistContract<'a> {
    address: Address,
    handle: &'a ChainHandle,
}

impl<'a> WhitelistContract<'a> {
    pub fn new(address: Address, handle: &'a ChainHandle) -> Self {
        Self { address, handle }
    }

    async fn read<T: SolCall>(&self, call: T) -> Result<T::Return, Error> {
        let data = Bytes::from(call.abi_encode());
        let result = self.handle.provider().call(self.address, data).await?;
        let decoded = T::abi_decode_returns(&result, true).map_err(|e| {
            EvmError::AbiError(format!("Failed to decode {} result: {}", T::SIGNATURE, e))
        })?;
        Ok(decoded)
    }

    /// Count of whitelisted addresses
    pub async fn num_addresses_whitelisted(&self) -> Result<u8, Error> {
        let result = self.read(IWhitelist::numAddressesWhitelistedCall {}).await?;
        Ok(result._0)
    }

    /// Maximum number of addresses the whitelist accepts
    pub async fn max_whitelisted_addresses(&self) -> Result<u8, Error> {
        let result = self.read(IWhitelist::maxWhitelistedAddressesCall {}).await?;
        Ok(result._0)
    }

    /// Check membership of `account`
    pub async fn whitelisted_addresses(&self, account: Address) -> Result<bool, Error> {
        let result = self
            .read(IWhitelist::whitelistedAddressesCall { account })
            .await?;
        Ok(result._0)
    }

    /// Submit the join transaction from the handle's signer
    ///
    /// Returns once the node has accepted the transaction; confirmation is
    /// awaited separately through the signer.
    pub async fn add_address_to_whitelist(&self) -> Result<PendingTransaction, Error> {
        let signer = self.handle.signer()?;
        let data = Bytes::from(IWhitelist::addAddressToWhitelistCall {}.abi_encode());
        signer.send_transaction(self.address, data).await
    }
}
