/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Speculative execution of a block ahead of the block processor.
//!
//! A prefetch pass executes the transactions of a block on top of a disposable [StateView] so that the
//! account and storage data they touch, and the signatures they carry, are already cached by the time the
//! block processor executes them for real. Everything the pass computes is thrown away.
//!
//! A pass ends in one of three ways (see [PrefetchOutcome]):
//! - every transaction was attempted,
//! - the [Interrupt] was observed before the next transaction, or
//! - a transaction could not be turned into a message or was refused by the engine.
//!
//! None of them is an error to the caller.

use tracing::{debug, trace};

use crate::{
    config::{ChainConfig, ExecutionConfig},
    context::{ChainContext, ExecutionContext},
    engine::{EngineFactory, ExecutionEngine},
    error::PrecacheError,
    interrupt::Interrupt,
    signer::{SignatureCache, Signer},
    state::StateView,
    types::{Block, BlockHeader, PublicAddress, Sha256Hash, Transaction},
};

/// How a prefetch pass ended. Informational only: callers are free to ignore it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefetchOutcome {
    /// Every intended transaction was attempted.
    Completed { attempted: usize },
    /// The interrupt was observed before the transaction at index `at`, which was not attempted.
    Interrupted { at: usize },
    /// The transaction at index `at` failed with `error`; no later transaction was attempted.
    Aborted { at: usize, error: PrecacheError },
}

impl PrefetchOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, PrefetchOutcome::Completed { .. })
    }

    /// The error that aborted the pass, if any.
    pub fn error(&self) -> Option<&PrecacheError> {
        match self {
            PrefetchOutcome::Aborted { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// StatePrefetcher blindly executes blocks on top of scratch state to warm caches for the block processor.
pub struct StatePrefetcher<C, F> {
    /// Chain configuration options
    config: ChainConfig,
    /// Canonical chain, for historical headers
    chain: C,
    /// Builds one engine per transaction
    engine_factory: F,
    /// Shared with the block processor, if set
    signature_cache: Option<SignatureCache>,
}

impl<C, F> StatePrefetcher<C, F>
where
    C: ChainContext,
    F: EngineFactory,
{
    pub fn new(config: ChainConfig, chain: C, engine_factory: F) -> Self {
        Self {
            config,
            chain,
            engine_factory,
            signature_cache: None,
        }
    }

    /// specify the cache of verified signatures to populate during prefetching.
    pub fn set_signature_cache(mut self, cache: SignatureCache) -> Self {
        self.signature_cache = Some(cache);
        self
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn signature_cache(&self) -> Option<&SignatureCache> {
        self.signature_cache.as_ref()
    }

    /// Execute the transactions of `block` in order on `state`, discarding all results. The only goal is to
    /// pre-cache transaction signatures and state data.
    ///
    /// The interrupt is checked before each transaction. The first transaction that fails ends the pass.
    pub fn prefetch<S: StateView>(
        &self,
        block: &Block,
        state: &mut S,
        cfg: &ExecutionConfig,
        interrupt: &Interrupt,
    ) -> PrefetchOutcome {
        let block_hash = block.hash();
        for (index, tx) in block.transactions.iter().enumerate() {
            if interrupt.is_requested() {
                return interrupted(block, index);
            }
            if let Err(error) = self.precache_at(block, block_hash, index, tx, state, cfg) {
                return aborted(block, index, error);
            }
        }
        PrefetchOutcome::Completed {
            attempted: block.transactions.len(),
        }
    }

    /// Execute only the transaction at `index` of `block` on `state`, discarding all results. It is used to warm
    /// the next transaction while a block is still being fetched.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds of the transactions of `block`.
    pub fn prefetch_tx<S: StateView>(
        &self,
        block: &Block,
        index: usize,
        state: &mut S,
        cfg: &ExecutionConfig,
        interrupt: &Interrupt,
    ) -> PrefetchOutcome {
        let tx = &block.transactions[index];
        if interrupt.is_requested() {
            return interrupted(block, index);
        }
        match self.precache_at(block, block.hash(), index, tx, state, cfg) {
            Ok(()) => PrefetchOutcome::Completed { attempted: 1 },
            Err(error) => aborted(block, index, error),
        }
    }

    fn precache_at<S: StateView>(
        &self,
        block: &Block,
        block_hash: Sha256Hash,
        index: usize,
        tx: &Transaction,
        state: &mut S,
        cfg: &ExecutionConfig,
    ) -> Result<(), PrecacheError> {
        trace!(target: "prefetcher", block = block.number(), index, "Prefetching transaction");
        state.prepare(tx.hash(), block_hash, index);
        precache_transaction(
            &self.config,
            &self.chain,
            None,
            state,
            &block.header,
            tx,
            cfg,
            &self.engine_factory,
            self.signature_cache.as_ref(),
        )
    }
}

fn interrupted(block: &Block, index: usize) -> PrefetchOutcome {
    debug!(target: "prefetcher", block = block.number(), index, "Prefetch interrupted");
    PrefetchOutcome::Interrupted { at: index }
}

fn aborted(block: &Block, index: usize, error: PrecacheError) -> PrefetchOutcome {
    debug!(target: "prefetcher", block = block.number(), index, %error, "Prefetch aborted");
    PrefetchOutcome::Aborted { at: index, error }
}

/// Attempt to apply a transaction to the given state, using the input parameters for its environment. The goal
/// is not to execute the transaction successfully, but to warm up the data it touches.
///
/// A reverted execution counts as success. Errors are returned only when the transaction cannot become a message
/// or when the engine refuses the message.
#[allow(clippy::too_many_arguments)]
pub fn precache_transaction<C, S, F>(
    config: &ChainConfig,
    chain: &C,
    author: Option<PublicAddress>,
    state: &mut S,
    header: &BlockHeader,
    tx: &Transaction,
    cfg: &ExecutionConfig,
    engine_factory: &F,
    signature_cache: Option<&SignatureCache>,
) -> Result<(), PrecacheError>
where
    C: ChainContext,
    S: StateView,
    F: EngineFactory,
{
    // 1. Convert the transaction into an executable message and pre-cache its signature
    let signer = Signer::for_height(config, header.number);
    let msg = tx.as_message(&signer, &*state, signature_cache)?;

    // 2. Create the engine for this transaction only and execute the message
    let context = ExecutionContext::new(&msg, header, chain, author);
    let engine = engine_factory.new_engine(context, state, config, cfg);
    let result = engine.apply_message(msg)?;

    if result.is_reverted() {
        trace!(target: "prefetcher", tx = ?tx.hash(), "Prefetched transaction reverted");
    }
    Ok(())
}
