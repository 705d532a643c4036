use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use pchain_prefetcher::{
    state::encode_account_key,
    types::{PublicAddress, Sha256Hash},
    AccountKey, AccountKeyPicker, ScratchState, StateKey, StateStorage, StateView, WarmCache,
};

pub type SimulateKey = StateKey;

/// Backing store of the canonical world state. Counts every read that reaches it.
#[derive(Default)]
pub struct SimulateWorldStateStorage {
    inner: HashMap<SimulateKey, Vec<u8>>,
    reads: AtomicUsize,
}

impl StateStorage for SimulateWorldStateStorage {
    fn get(&self, key: &SimulateKey) -> Option<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.inner.get(key).cloned()
    }
}

impl SimulateWorldStateStorage {
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    /// copy of the stored data, to compare before and after prefetching.
    pub fn dump(&self) -> HashMap<SimulateKey, Vec<u8>> {
        self.inner.clone()
    }
}

#[derive(Default)]
pub struct SimulateWorldState {
    storage: SimulateWorldStateStorage,
}

impl SimulateWorldState {
    pub fn set_balance(&mut self, address: PublicAddress, balance: u64) {
        self.storage
            .inner
            .insert(StateKey::Balance(address), balance.to_le_bytes().to_vec());
    }

    pub fn set_nonce(&mut self, address: PublicAddress, nonce: u64) {
        self.storage
            .inner
            .insert(StateKey::Nonce(address), nonce.to_le_bytes().to_vec());
    }

    pub fn set_storage_data(&mut self, address: PublicAddress, key: Vec<u8>, value: Vec<u8>) {
        self.storage
            .inner
            .insert(StateKey::Storage(address, key), value);
    }

    pub fn set_account_key(&mut self, address: PublicAddress, account_key: AccountKey) {
        self.storage.inner.insert(
            StateKey::AccountKey(address),
            encode_account_key(&account_key),
        );
    }

    pub fn add_contract(&mut self, to_address: PublicAddress, wasm_bytes: Vec<u8>) {
        self.storage
            .inner
            .insert(StateKey::ContractCode(to_address), wasm_bytes);
    }

    /// freeze the world state behind a fresh cache.
    pub fn into_cache(self) -> WarmCache<SimulateWorldStateStorage> {
        WarmCache::new(self.storage)
    }
}

/// Wraps a state view and records which transactions it was prepared for.
pub struct RecordingState<S> {
    pub inner: S,
    prepared: Arc<Mutex<Vec<(Sha256Hash, Sha256Hash, usize)>>>,
}

impl<S> RecordingState<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            prepared: Default::default(),
        }
    }

    /// indices of the transactions that were attempted, in order.
    pub fn attempted(&self) -> Vec<usize> {
        self.prepared
            .lock()
            .unwrap()
            .iter()
            .map(|(_, _, index)| *index)
            .collect()
    }

    pub fn prepared(&self) -> Vec<(Sha256Hash, Sha256Hash, usize)> {
        self.prepared.lock().unwrap().clone()
    }
}

impl RecordingState<ScratchState<SimulateWorldStateStorage>> {
    pub fn scratch(cache: &WarmCache<SimulateWorldStateStorage>) -> Self {
        Self::new(ScratchState::new(cache.clone()))
    }
}

impl<S: AccountKeyPicker> AccountKeyPicker for RecordingState<S> {
    fn account_key(&self, address: &PublicAddress) -> Option<AccountKey> {
        self.inner.account_key(address)
    }
}

impl<S: StateView> StateView for RecordingState<S> {
    fn prepare(&mut self, tx_hash: Sha256Hash, block_hash: Sha256Hash, index: usize) {
        self.prepared
            .lock()
            .unwrap()
            .push((tx_hash, block_hash, index));
        self.inner.prepare(tx_hash, block_hash, index)
    }

    fn balance(&self, address: &PublicAddress) -> u64 {
        self.inner.balance(address)
    }

    fn set_balance(&mut self, address: PublicAddress, balance: u64) {
        self.inner.set_balance(address, balance)
    }

    fn nonce(&self, address: &PublicAddress) -> u64 {
        self.inner.nonce(address)
    }

    fn set_nonce(&mut self, address: PublicAddress, nonce: u64) {
        self.inner.set_nonce(address, nonce)
    }

    fn code(&self, address: &PublicAddress) -> Option<Vec<u8>> {
        self.inner.code(address)
    }

    fn storage_value(&self, address: &PublicAddress, key: &[u8]) -> Option<Vec<u8>> {
        self.inner.storage_value(address, key)
    }

    fn set_storage_value(&mut self, address: PublicAddress, key: Vec<u8>, value: Vec<u8>) {
        self.inner.set_storage_value(address, key, value)
    }

    fn snapshot(&self) -> usize {
        self.inner.snapshot()
    }

    fn revert_to_snapshot(&mut self, snapshot: usize) {
        self.inner.revert_to_snapshot(snapshot)
    }
}
