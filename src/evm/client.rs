//! HTTP JSON-RPC implementation of the chain client
//!
//! Reads go through `eth_call`; writes are signed locally as EIP-1559
//! transactions and submitted with `eth_sendRawTransaction`.

use alloy_primitives::{Address, Bytes, TxKind, B256};
use alloy_provider::{Provider, ProviderBuilder, RootProvider};
use alloy_rpc_types_eth::{BlockNumberOrTag, TransactionRequest};
use alloy_transport_http::{Client, Http};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::error::Error;
use crate::evm::tx::{ContractCall, FeeData};
use crate::evm::types::{EvmError, PendingTransaction, TransactionOutcome};
use crate::evm::{ChainProvider, TransactionSigner};
use crate::wallet::WhitelistWallet;

/// Gas estimates are padded by this percentage
const GAS_MARGIN_PERCENT: u64 = 20;

/// Chain provider over an HTTP RPC endpoint
#[derive(Clone)]
pub struct HttpChainProvider {
    /// Alloy provider for RPC communication
    provider: RootProvider<Http<Client>>,
    /// Key used for signing; `None` means read-only
    wallet: Option<Arc<WhitelistWallet>>,
    poll_interval: Duration,
    confirmation_timeout: Duration,
}

impl HttpChainProvider {
    /// Create a read-only provider for the given RPC endpoint
    pub fn new(rpc_url: Url) -> Self {
        let provider = ProviderBuilder::new().on_http(rpc_url);
        Self {
            provider,
            wallet: None,
            poll_interval: Duration::from_secs(4),
            confirmation_timeout: Duration::from_secs(300),
        }
    }

    /// Attach a wallet so [`ChainProvider::signer`] succeeds
    pub fn with_wallet(mut self, wallet: Arc<WhitelistWallet>) -> Self {
        self.wallet = Some(wallet);
        self
    }

    /// Receipt polling settings used while waiting for confirmations
    pub fn with_confirmation_policy(mut self, poll_interval: Duration, timeout: Duration) -> Self {
        self.poll_interval = poll_interval;
        self.confirmation_timeout = timeout;
        self
    }

    /// Next nonce for `address`
    async fn get_nonce(&self, address: Address) -> Result<u64, Error> {
        let nonce = self
            .provider
            .get_transaction_count(address)
            .await
            .map_err(|e| EvmError::RpcError(e.to_string()))?;
        Ok(nonce)
    }

    /// Estimate gas for a call from `from` to `to`, padded by the safety margin
    async fn estimate_gas(&self, from: Address, to: Address, calldata: &Bytes) -> Result<u64, Error> {
        let request = TransactionRequest {
            from: Some(from),
            to: Some(TxKind::Call(to)),
            input: calldata.clone().into(),
            ..Default::default()
        };

        let gas = self
            .provider
            .estimate_gas(&request)
            .await
            .map_err(|e| EvmError::GasEstimationError(e.to_string()))?;

        Ok(gas + gas * GAS_MARGIN_PERCENT / 100)
    }

    /// EIP-1559 fee caps from the latest block's fee history
    async fn get_fee_data(&self) -> Result<FeeData, Error> {
        let fee_history = self
            .provider
            .get_fee_history(1, BlockNumberOrTag::Latest, &[50.0])
            .await
            .map_err(|e| EvmError::RpcError(e.to_string()))?;

        if let (Some(base_fee), Some(tip)) = (
            fee_history.base_fee_per_gas.last(),
            fee_history
                .reward
                .as_ref()
                .and_then(|r| r.last())
                .and_then(|r| r.first()),
        ) {
            // Leave room for the base fee to double before inclusion
            Ok(FeeData {
                max_fee_per_gas: base_fee * 2 + tip,
                max_priority_fee_per_gas: *tip,
            })
        } else {
            let gas_price = self
                .provider
                .get_gas_price()
                .await
                .map_err(|e| EvmError::RpcError(e.to_string()))?;
            Ok(FeeData {
                max_fee_per_gas: gas_price,
                max_priority_fee_per_gas: gas_price / 10,
            })
        }
    }

    async fn get_outcome(&self, hash: B256) -> Result<Option<TransactionOutcome>, Error> {
        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .map_err(|e| EvmError::RpcError(e.to_string()))?;

        Ok(receipt.map(|receipt| TransactionOutcome {
            hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used as u64,
            success: receipt.status(),
        }))
    }
}

#[async_trait]
impl ChainProvider for HttpChainProvider {
    async fn chain_id(&self) -> Result<u64, Error> {
        let chain_id = self
            .provider
            .get_chain_id()
            .await
            .map_err(|e| EvmError::RpcError(e.to_string()))?;
        Ok(chain_id)
    }

    async fn call(&self, to: Address, calldata: Bytes) -> Result<Bytes, Error> {
        let request = TransactionRequest {
            to: Some(TxKind::Call(to)),
            input: calldata.into(),
            ..Default::default()
        };

        let result = self
            .provider
            .call(&request)
            .await
            .map_err(|e| EvmError::RpcError(e.to_string()))?;

        Ok(result)
    }

    fn signer(&self) -> Result<Arc<dyn TransactionSigner>, Error> {
        let wallet = self
            .wallet
            .clone()
            .ok_or_else(|| Error::Wallet("No signing key attached to this provider".to_string()))?;
        Ok(Arc::new(LocalSigner::new(self.clone(), wallet)?))
    }
}

/// Signer backed by a local key and an HTTP provider
pub struct LocalSigner {
    client: HttpChainProvider,
    wallet: Arc<WhitelistWallet>,
    address: Address,
}

impl LocalSigner {
    pub fn new(client: HttpChainProvider, wallet: Arc<WhitelistWallet>) -> Result<Self, Error> {
        let address = wallet.address()?;
        Ok(Self {
            client,
            wallet,
            address,
        })
    }
}

#[async_trait]
impl TransactionSigner for LocalSigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn send_transaction(
        &self,
        to: Address,
        calldata: Bytes,
    ) -> Result<PendingTransaction, Error> {
        let chain_id = self.client.chain_id().await?;
        let nonce = self.client.get_nonce(self.address).await?;
        let gas_limit = self.client.estimate_gas(self.address, to, &calldata).await?;
        let fees = self.client.get_fee_data().await?;

        let call = ContractCall::new(chain_id, nonce, to, calldata)
            .with_gas_limit(gas_limit)
            .with_fees(fees);
        let signed = self.wallet.sign_call(&call)?;

        let pending = self
            .client
            .provider
            .send_raw_transaction(signed.raw())
            .await
            .map_err(|e| EvmError::TransactionError(e.to_string()))?;
        let hash = *pending.tx_hash();

        if hash != signed.hash() {
            tracing::warn!(node = ?hash, local = ?signed.hash(), "node reported a different transaction hash");
        }
        tracing::info!(tx = ?hash, nonce, gas_limit, "transaction submitted");
        Ok(PendingTransaction::new(hash, self.address, to))
    }

    async fn wait_for_confirmation(
        &self,
        pending: &PendingTransaction,
    ) -> Result<TransactionOutcome, Error> {
        let timeout = self.client.confirmation_timeout;
        // Poll errors are transient; only the timeout ends the wait
        let poll = async {
            loop {
                match self.client.get_outcome(pending.hash).await {
                    Ok(Some(outcome)) => return outcome,
                    Ok(None) => tracing::debug!(tx = ?pending.hash, "waiting for receipt"),
                    Err(e) => {
                        tracing::warn!(tx = ?pending.hash, error = %e, "receipt poll failed, retrying")
                    }
                }
                tokio::time::sleep(self.client.poll_interval).await;
            }
        };

        match tokio::time::timeout(timeout, poll).await {
            Ok(outcome) => Ok(outcome),
            Err(_) => Err(Error::ConfirmationTimeout {
                hash: format!("{:?}", pending.hash),
                timeout_secs: timeout.as_secs(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    const TEST_MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[tokio::test]
    async fn test_confirmation_wait_retries_until_timeout() {
        // nothing listens on the discard port, so every receipt poll fails
        let url = Url::parse("http://127.0.0.1:9").unwrap();
        let wallet = Arc::new(WhitelistWallet::from_mnemonic(TEST_MNEMONIC, 0).unwrap());
        let provider = HttpChainProvider::new(url)
            .with_wallet(wallet)
            .with_confirmation_policy(Duration::from_millis(100), Duration::from_secs(1));
        let signer = provider.signer().unwrap();
        let pending = PendingTransaction::new(B256::repeat_byte(7), signer.address(), Address::ZERO);

        let started = Instant::now();
        let result = signer.wait_for_confirmation(&pending).await;

        assert!(started.elapsed() >= Duration::from_secs(1));
        match result {
            Err(Error::ConfirmationTimeout { timeout_secs, .. }) => assert_eq!(timeout_secs, 1),
            other => panic!("expected a confirmation timeout, got {:?}", other),
        }
    }

    #[test]
    fn test_signer_requires_wallet() {
        let provider = HttpChainProvider::new(Url::parse("http://127.0.0.1:8545").unwrap());
        assert!(matches!(provider.signer(), Err(Error::Wallet(_))));
    }
}
