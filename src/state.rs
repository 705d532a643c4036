/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Defines the state layers that a prefetch pass reads through.
//!
//! There are three layers:
//! - [StateStorage] (the backing store, e.g. a trie over disk, only ever read)
//! - [WarmCache] (shared across passes and canonical execution; this is what prefetching warms)
//! - [ScratchState] (disposable view owned by one pass)
//!
//! In Read Operation on a [ScratchState], `writes` is accessed first. If data is not found, search `reads`.
//! If it fails in both Sets, the [WarmCache] is accessed, which in turn falls back to the storage on a miss
//! and remembers the result for every later reader.
//!
//! In Write Operation, the value is recorded in `writes` together with a journal entry so that the engine
//! can revert to a snapshot. There is no way to commit `writes`: they are discarded when the view is dropped.

use std::{
    cell::RefCell,
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, RwLock,
    },
};

use borsh::{BorshDeserialize, BorshSerialize};

use crate::{
    signer::{AccountKey, AccountKeyPicker},
    types::{PublicAddress, Sha256Hash},
};

/// Location of a piece of account or storage data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StateKey {
    Balance(PublicAddress),
    Nonce(PublicAddress),
    AccountKey(PublicAddress),
    ContractCode(PublicAddress),
    Storage(PublicAddress, Vec<u8>),
}

/// Read access to the backing store of one state root.
pub trait StateStorage: Send + Sync {
    fn get(&self, key: &StateKey) -> Option<Vec<u8>>;
}

impl<T: StateStorage + ?Sized> StateStorage for Arc<T> {
    fn get(&self, key: &StateKey) -> Option<Vec<u8>> {
        (**self).get(key)
    }
}

/// Read-through cache over a [StateStorage]. Clones share the same entries.
///
/// A cache is bound to the state root of its storage. It must be replaced, not reused, once that root changes.
pub struct WarmCache<S: StateStorage> {
    storage: Arc<S>,
    entries: Arc<RwLock<HashMap<StateKey, Option<Vec<u8>>>>>,
    stats: Arc<CacheStats>,
}

#[derive(Default)]
struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<S: StateStorage> Clone for WarmCache<S> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            entries: self.entries.clone(),
            stats: self.stats.clone(),
        }
    }
}

impl<S: StateStorage> WarmCache<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage: Arc::new(storage),
            entries: Default::default(),
            stats: Default::default(),
        }
    }

    /// Get the value from cache. If not found, get from storage and then cache it.
    pub fn get(&self, key: &StateKey) -> Option<Vec<u8>> {
        if let Ok(entries) = self.entries.read() {
            if let Some(value) = entries.get(key) {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                return value.clone();
            }
        }

        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        let value = self.storage.get(key);
        if let Ok(mut entries) = self.entries.write() {
            entries.entry(key.clone()).or_insert_with(|| value.clone());
        }
        value
    }

    /// check if the key has been loaded into the cache.
    pub fn is_warm(&self, key: &StateKey) -> bool {
        self.entries
            .read()
            .map(|entries| entries.contains_key(key))
            .unwrap_or(false)
    }

    /// number of cached entries, including cached absences.
    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn hits(&self) -> u64 {
        self.stats.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.stats.misses.load(Ordering::Relaxed)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

/// The mutable state view an execution engine runs against.
///
/// `prepare` only tags the view with the transaction being executed for attribution (e.g. of logs).
pub trait StateView: AccountKeyPicker {
    fn prepare(&mut self, tx_hash: Sha256Hash, block_hash: Sha256Hash, index: usize);

    fn balance(&self, address: &PublicAddress) -> u64;

    fn set_balance(&mut self, address: PublicAddress, balance: u64);

    fn nonce(&self, address: &PublicAddress) -> u64;

    fn set_nonce(&mut self, address: PublicAddress, nonce: u64);

    fn code(&self, address: &PublicAddress) -> Option<Vec<u8>>;

    fn storage_value(&self, address: &PublicAddress, key: &[u8]) -> Option<Vec<u8>>;

    fn set_storage_value(&mut self, address: PublicAddress, key: Vec<u8>, value: Vec<u8>);

    /// Identifier of the current point in the write history.
    fn snapshot(&self) -> usize;

    /// Undo every write made after the snapshot was taken.
    fn revert_to_snapshot(&mut self, snapshot: usize);
}

/// Transaction that a view is currently tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxContext {
    pub tx_hash: Sha256Hash,
    pub block_hash: Sha256Hash,
    pub index: usize,
}

/// ScratchState is a disposable [StateView] on top of a [WarmCache].
///
/// Every read warms the shared cache; every write stays local to this instance and is lost on drop.
pub struct ScratchState<S: StateStorage> {
    cache: WarmCache<S>,
    /// reads stores values obtained from the cache. It is de facto the original data of this view.
    reads: RefCell<HashMap<StateKey, Option<Vec<u8>>>>,
    /// writes stores values set during execution. They never leave this view.
    writes: HashMap<StateKey, Vec<u8>>,
    /// previous content of `writes` for every set, in order
    journal: Vec<(StateKey, Option<Vec<u8>>)>,
    tx_context: Option<TxContext>,
}

impl<S: StateStorage> ScratchState<S> {
    pub fn new(cache: WarmCache<S>) -> Self {
        Self {
            cache,
            reads: RefCell::new(HashMap::new()),
            writes: HashMap::new(),
            journal: Vec::new(),
            tx_context: None,
        }
    }

    pub fn cache(&self) -> &WarmCache<S> {
        &self.cache
    }

    pub fn tx_context(&self) -> Option<&TxContext> {
        self.tx_context.as_ref()
    }

    /// number of distinct keys this view has read from the cache.
    pub fn touched(&self) -> usize {
        self.reads.borrow().len()
    }

    /// number of distinct keys holding a local write.
    pub fn dirty(&self) -> usize {
        self.writes.len()
    }

    /// Get latest value from the view. If not found, get from the cache and remember it.
    fn get(&self, key: StateKey) -> Option<Vec<u8>> {
        // 1. Return the value that was written earlier ('read-your-write' semantics)
        if let Some(value) = self.writes.get(&key) {
            return Some(value.clone());
        }

        // 2. Return the value that was read earlier
        if let Some(value) = self.reads.borrow().get(&key) {
            return value.clone();
        }

        // 3. Get the value through the shared cache
        let value = self.cache.get(&key);

        // 4. Cache to reads
        self.reads.borrow_mut().insert(key, value.clone());
        value
    }

    fn set(&mut self, key: StateKey, value: Vec<u8>) {
        let previous = self.writes.insert(key.clone(), value);
        self.journal.push((key, previous));
    }

    fn get_u64(&self, key: StateKey) -> u64 {
        // Absent or malformed values read as zero.
        self.get(key)
            .and_then(|bytes| <[u8; 8]>::try_from(bytes.as_slice()).ok())
            .map_or(0, u64::from_le_bytes)
    }
}

impl<S: StateStorage> AccountKeyPicker for ScratchState<S> {
    fn account_key(&self, address: &PublicAddress) -> Option<AccountKey> {
        match self.get(StateKey::AccountKey(*address)) {
            None => Some(AccountKey::Legacy),
            Some(bytes) => AccountKey::try_from_slice(&bytes).ok(),
        }
    }
}

impl<S: StateStorage> StateView for ScratchState<S> {
    fn prepare(&mut self, tx_hash: Sha256Hash, block_hash: Sha256Hash, index: usize) {
        self.tx_context = Some(TxContext {
            tx_hash,
            block_hash,
            index,
        });
    }

    fn balance(&self, address: &PublicAddress) -> u64 {
        self.get_u64(StateKey::Balance(*address))
    }

    fn set_balance(&mut self, address: PublicAddress, balance: u64) {
        self.set(StateKey::Balance(address), balance.to_le_bytes().to_vec());
    }

    fn nonce(&self, address: &PublicAddress) -> u64 {
        self.get_u64(StateKey::Nonce(*address))
    }

    fn set_nonce(&mut self, address: PublicAddress, nonce: u64) {
        self.set(StateKey::Nonce(address), nonce.to_le_bytes().to_vec());
    }

    fn code(&self, address: &PublicAddress) -> Option<Vec<u8>> {
        self.get(StateKey::ContractCode(*address))
    }

    fn storage_value(&self, address: &PublicAddress, key: &[u8]) -> Option<Vec<u8>> {
        self.get(StateKey::Storage(*address, key.to_vec()))
            .filter(|value| !value.is_empty())
    }

    fn set_storage_value(&mut self, address: PublicAddress, key: Vec<u8>, value: Vec<u8>) {
        self.set(StateKey::Storage(address, key), value);
    }

    fn snapshot(&self) -> usize {
        self.journal.len()
    }

    fn revert_to_snapshot(&mut self, snapshot: usize) {
        while self.journal.len() > snapshot {
            let Some((key, previous)) = self.journal.pop() else {
                break;
            };
            match previous {
                Some(value) => self.writes.insert(key, value),
                None => self.writes.remove(&key),
            };
        }
    }
}

/// Encodes an account key the way [ScratchState] expects to find it in storage.
pub fn encode_account_key(key: &AccountKey) -> Vec<u8> {
    key.try_to_vec().unwrap_or_default()
}
