//! Scripted in-memory chain for page tests
#![allow(dead_code)]

use alloy_primitives::{address, Address, Bytes, B256, U256};
use alloy_sol_types::{SolCall, SolValue};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

use whitelist_dapp::evm::{ChainProvider, PendingTransaction, TransactionOutcome, TransactionSigner};
use whitelist_dapp::{
    Alerter, ConnectorSlot, Error, IWhitelist, PageSettings, WalletConnector, WhitelistPage,
};

pub const ROPSTEN: u64 = 3;
pub const CONTRACT: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");
pub const ACCOUNT: Address = address!("9858EfFD232B4033E47d90003D41EC34EcaEda94");

/// Contract state plus call accounting
pub struct MockChain {
    chain_id: AtomicU64,
    members: Mutex<HashSet<Address>>,
    max: u8,
    can_sign: AtomicBool,
    fail_reads: AtomicBool,
    revert_join: AtomicBool,
    reject_connect: AtomicBool,
    /// When set, confirmations wait for a permit
    confirm_gate: Option<Arc<Semaphore>>,
    chain_id_calls: AtomicUsize,
    connects: AtomicUsize,
    sends: AtomicUsize,
    calls: Mutex<Vec<[u8; 4]>>,
}

impl MockChain {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id: AtomicU64::new(chain_id),
            members: Mutex::new(HashSet::new()),
            max: 10,
            can_sign: AtomicBool::new(true),
            fail_reads: AtomicBool::new(false),
            revert_join: AtomicBool::new(false),
            reject_connect: AtomicBool::new(false),
            confirm_gate: None,
            chain_id_calls: AtomicUsize::new(0),
            connects: AtomicUsize::new(0),
            sends: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_members(self, members: impl IntoIterator<Item = Address>) -> Self {
        self.members.lock().unwrap().extend(members);
        self
    }

    pub fn with_confirm_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.confirm_gate = Some(gate);
        self
    }

    pub fn add_member(&self, account: Address) {
        self.members.lock().unwrap().insert(account);
    }

    pub fn set_chain_id(&self, chain_id: u64) {
        self.chain_id.store(chain_id, Ordering::SeqCst);
    }

    pub fn set_can_sign(&self, can_sign: bool) {
        self.can_sign.store(can_sign, Ordering::SeqCst);
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_revert_join(&self, revert: bool) {
        self.revert_join.store(revert, Ordering::SeqCst);
    }

    pub fn set_reject_connect(&self, reject: bool) {
        self.reject_connect.store(reject, Ordering::SeqCst);
    }

    pub fn chain_id_calls(&self) -> usize {
        self.chain_id_calls.load(Ordering::SeqCst)
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn sends(&self) -> usize {
        self.sends.load(Ordering::SeqCst)
    }

    /// Number of contract reads with the given selector
    pub fn calls_to(&self, selector: [u8; 4]) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|s| **s == selector)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn reset_counters(&self) {
        self.chain_id_calls.store(0, Ordering::SeqCst);
        self.sends.store(0, Ordering::SeqCst);
        self.calls.lock().unwrap().clear();
    }

    fn member_count(&self) -> u8 {
        self.members.lock().unwrap().len() as u8
    }
}

pub struct MockProvider {
    chain: Arc<MockChain>,
}

#[async_trait]
impl ChainProvider for MockProvider {
    async fn chain_id(&self) -> Result<u64, Error> {
        self.chain.chain_id_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.chain.chain_id.load(Ordering::SeqCst))
    }

    async fn call(&self, to: Address, calldata: Bytes) -> Result<Bytes, Error> {
        assert_eq!(to, CONTRACT, "read sent to the wrong contract");
        let selector: [u8; 4] = calldata[..4]
            .try_into()
            .map_err(|_| Error::Rpc("short calldata".to_string()))?;
        self.chain.calls.lock().unwrap().push(selector);

        if self.chain.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::Rpc("node unavailable".to_string()));
        }

        let encoded = if selector == IWhitelist::numAddressesWhitelistedCall::SELECTOR {
            U256::from(self.chain.member_count()).abi_encode()
        } else if selector == IWhitelist::maxWhitelistedAddressesCall::SELECTOR {
            U256::from(self.chain.max).abi_encode()
        } else if selector == IWhitelist::whitelistedAddressesCall::SELECTOR {
            let call = IWhitelist::whitelistedAddressesCall::abi_decode(&calldata, true)
                .map_err(|e| Error::Evm(e.to_string()))?;
            self.chain
                .members
                .lock()
                .unwrap()
                .contains(&call.account)
                .abi_encode()
        } else {
            return Err(Error::Evm(format!("unknown selector {:?}", selector)));
        };
        Ok(Bytes::from(encoded))
    }

    fn signer(&self) -> Result<Arc<dyn TransactionSigner>, Error> {
        if self.chain.can_sign.load(Ordering::SeqCst) {
            Ok(Arc::new(MockSigner {
                chain: self.chain.clone(),
            }))
        } else {
            Err(Error::SignerRequired)
        }
    }
}

pub struct MockSigner {
    chain: Arc<MockChain>,
}

#[async_trait]
impl TransactionSigner for MockSigner {
    fn address(&self) -> Address {
        ACCOUNT
    }

    async fn send_transaction(
        &self,
        to: Address,
        calldata: Bytes,
    ) -> Result<PendingTransaction, Error> {
        assert_eq!(&calldata[..], &IWhitelist::addAddressToWhitelistCall {}.abi_encode()[..]);
        let nonce = self.chain.sends.fetch_add(1, Ordering::SeqCst);
        Ok(PendingTransaction::new(
            B256::with_last_byte(nonce as u8 + 1),
            ACCOUNT,
            to,
        ))
    }

    async fn wait_for_confirmation(
        &self,
        pending: &PendingTransaction,
    ) -> Result<TransactionOutcome, Error> {
        if let Some(gate) = &self.chain.confirm_gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|e| Error::Other(e.to_string()))?;
            permit.forget();
        }

        let success = !self.chain.revert_join.load(Ordering::SeqCst);
        if success {
            self.chain.members.lock().unwrap().insert(pending.from);
        }
        Ok(TransactionOutcome {
            hash: pending.hash,
            block_number: Some(42),
            gas_used: 46_000,
            success,
        })
    }
}

pub struct MockConnector {
    chain: Arc<MockChain>,
}

impl MockConnector {
    pub fn new(chain: Arc<MockChain>) -> Self {
        Self { chain }
    }
}

#[async_trait]
impl WalletConnector for MockConnector {
    fn network(&self) -> &str {
        "ropsten"
    }

    async fn connect(&self) -> Result<Arc<dyn ChainProvider>, Error> {
        self.chain.connects.fetch_add(1, Ordering::SeqCst);
        if self.chain.reject_connect.load(Ordering::SeqCst) {
            return Err(Error::Wallet("user rejected the connection".to_string()));
        }
        Ok(Arc::new(MockProvider {
            chain: self.chain.clone(),
        }))
    }
}

/// Alert sink that remembers every message
#[derive(Default)]
pub struct RecordingAlerter {
    alerts: Mutex<Vec<String>>,
}

impl RecordingAlerter {
    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.alerts.lock().unwrap().len()
    }
}

impl Alerter for RecordingAlerter {
    fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }
}

pub fn settings() -> PageSettings {
    PageSettings {
        contract_address: CONTRACT,
        expected_chain_id: ROPSTEN,
        network_label: "Ropsten".to_string(),
    }
}

/// Page wired to `chain`, plus the alert recorder and a count of connectors built
pub fn page_for(chain: Arc<MockChain>) -> (WhitelistPage, Arc<RecordingAlerter>, Arc<AtomicUsize>) {
    let alerter = Arc::new(RecordingAlerter::default());
    let built = Arc::new(AtomicUsize::new(0));
    let counter = built.clone();
    let slot = ConnectorSlot::new(Box::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(MockConnector::new(chain.clone())) as Arc<dyn WalletConnector>)
    }));
    let page = WhitelistPage::new(slot, alerter.clone(), settings());
    (page, alerter, built)
}

pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("whitelist_dapp=debug")
        .try_init();
}
