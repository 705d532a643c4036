/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Turns signed transactions into executable [messages](Message).
//!
//! The signing rule depends on the height of the block (see [Signer::for_height]). The key that must have
//! produced a signature is looked up through an [AccountKeyPicker], since accounts may rotate their key
//! away from the one their address was derived from.
//!
//! Verifying Ed25519 signatures is one of the costs a prefetch pass pays ahead of time. Passes and the block
//! processor can share a [SignatureCache] so that the processor skips signatures a pass has already verified.

use std::{
    collections::HashSet,
    sync::{Arc, RwLock},
};

use borsh::{BorshDeserialize, BorshSerialize};
use ed25519_dalek::{Signature, Signer as _, SigningKey, VerifyingKey};
use sha2::{Digest, Sha256};

use crate::{
    config::ChainConfig,
    error::MessageDerivationError,
    types::{sha256, Message, PublicAddress, Sha256Hash, Transaction},
};

/// Key an account signs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum AccountKey {
    /// The address is the verifying key itself.
    Legacy,
    /// The account rotated to another verifying key.
    Public([u8; 32]),
    /// The account cannot sign transactions.
    Fail,
}

/// Resolves the key of an account. None if the stored key cannot be decoded.
pub trait AccountKeyPicker {
    fn account_key(&self, address: &PublicAddress) -> Option<AccountKey>;
}

/// Signing rule in force at a given height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signer {
    /// Signature covers the transaction payload only.
    Base,
    /// Signature additionally commits to the chain id.
    ReplayProtected { chain_id: u64 },
}

impl Signer {
    /// Select the signing rule for the block at `height`.
    pub fn for_height(config: &ChainConfig, height: u64) -> Self {
        if config.is_replay_protected(height) {
            Signer::ReplayProtected {
                chain_id: config.chain_id,
            }
        } else {
            Signer::Base
        }
    }

    /// bytes that a signature of `tx` is computed over.
    pub fn signing_payload(&self, tx: &Transaction) -> Result<Vec<u8>, MessageDerivationError> {
        let mut buf = Vec::new();
        if let Signer::ReplayProtected { chain_id } = self {
            buf.extend_from_slice(&chain_id.to_le_bytes());
        }
        tx.encode_payload(&mut buf)
            .map_err(|e| MessageDerivationError::Encoding(e.to_string()))?;
        Ok(buf)
    }

    /// Sign the transaction, filling in its signature and hash.
    pub fn sign(
        &self,
        mut tx: Transaction,
        signing_key: &SigningKey,
    ) -> Result<Transaction, MessageDerivationError> {
        let payload = self.signing_payload(&tx)?;
        tx.signature = signing_key.sign(&payload).to_bytes();
        tx.hash = sha256(tx.signature);
        Ok(tx)
    }
}

impl Transaction {
    /// Convert the transaction into a [Message], verifying the signature of the sender.
    ///
    /// The only state this reads is the account key of the signer.
    pub fn as_message<P: AccountKeyPicker + ?Sized>(
        &self,
        signer: &Signer,
        picker: &P,
        cache: Option<&SignatureCache>,
    ) -> Result<Message, MessageDerivationError> {
        if self.hash != sha256(self.signature) {
            return Err(MessageDerivationError::HashMismatch);
        }

        let key_bytes = match picker
            .account_key(&self.signer)
            .ok_or(MessageDerivationError::UnresolvableAccountKey)?
        {
            AccountKey::Legacy => self.signer,
            AccountKey::Public(key) => key,
            AccountKey::Fail => return Err(MessageDerivationError::UnsignableAccount),
        };

        let payload = signer.signing_payload(self)?;
        let digest = SignatureCache::digest(&payload, &key_bytes, &self.signature);
        if cache.map_or(false, |cache| cache.contains(&digest)) {
            tracing::trace!(target: "prefetcher", tx = ?self.hash, "Signature already verified");
        } else {
            let verifying_key = VerifyingKey::from_bytes(&key_bytes)
                .map_err(|_| MessageDerivationError::MalformedPublicKey)?;
            verifying_key
                .verify_strict(&payload, &Signature::from_bytes(&self.signature))
                .map_err(|_| MessageDerivationError::InvalidSignature)?;
            if let Some(cache) = cache {
                cache.insert(digest);
            }
        }

        Ok(Message {
            from: self.signer,
            nonce: self.nonce,
            gas_limit: self.gas_limit,
            max_base_fee_per_gas: self.max_base_fee_per_gas,
            priority_fee_per_gas: self.priority_fee_per_gas,
            commands: self.commands.clone(),
            tx_hash: self.hash,
        })
    }
}

/// Default number of verified signatures remembered by a [SignatureCache].
pub const DEFAULT_SIGNATURE_CACHE_CAPACITY: usize = 16_384;

/// Set of signatures already known to be valid. Clones share the same set.
///
/// Entries commit to the payload, the key and the signature, so a hit is as good as a verification.
/// When full, the set is cleared rather than evicting entries one by one.
#[derive(Debug, Clone)]
pub struct SignatureCache {
    inner: Arc<RwLock<HashSet<Sha256Hash>>>,
    capacity: usize,
}

impl SignatureCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Default::default(),
            capacity,
        }
    }

    fn digest(payload: &[u8], key: &[u8; 32], signature: &[u8; 64]) -> Sha256Hash {
        Sha256::new()
            .chain_update(payload)
            .chain_update(key)
            .chain_update(signature)
            .finalize()
            .into()
    }

    fn contains(&self, digest: &Sha256Hash) -> bool {
        self.inner
            .read()
            .map(|set| set.contains(digest))
            .unwrap_or(false)
    }

    fn insert(&self, digest: Sha256Hash) {
        if let Ok(mut set) = self.inner.write() {
            if set.len() >= self.capacity {
                set.clear();
            }
            set.insert(digest);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|set| set.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SignatureCache {
    fn default() -> Self {
        Self::new(DEFAULT_SIGNATURE_CACHE_CAPACITY)
    }
}
