/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! ParallelChain Mainnet Prefetcher speculatively executes the transactions of a block on a throwaway copy of
//! the world state, ahead of (or alongside) the block processor, to pull the state data those transactions touch
//! into memory and to verify their signatures in advance.
//!
//! ```text
//! prefetch(B, WS*, I) -> ()
//!
//! B   = Block, whose transactions are executed in order
//! WS* = Scratch state, read through the shared cache and discarded afterwards
//! I   = Interrupt, checked before every transaction
//! ```
//!
//! ### Example
//!
//! ```rust
//! // prepare a prefetcher from chain config, chain context and an execution engine factory,
//! // and warm the cache for block `b` while it is waiting to be processed.
//! let prefetcher = pchain_prefetcher::StatePrefetcher::new(config, chain, engine_factory);
//! let mut scratch = pchain_prefetcher::ScratchState::new(cache.clone());
//! prefetcher.prefetch(&b, &mut scratch, &ExecutionConfig::default(), &interrupt);
//! ```
//!
//! In summary, a [prefetcher] [derives messages](signer) from transactions, builds an [engine] in an
//! execution [context] for each of them and applies it to a disposable [state] view. Whatever goes wrong
//! only shortens the pass (see [error]); it never changes what the block processor computes.

pub mod config;
pub use config::{ChainConfig, ExecutionConfig};

pub mod context;
pub use context::{ChainContext, ExecutionContext};

pub mod engine;
pub use engine::{EngineFactory, ExecutionEngine};

pub mod error;
pub use error::{InvalidTransaction, MessageDerivationError, PrecacheError};

pub mod interrupt;
pub use interrupt::Interrupt;

pub mod prefetcher;
pub use prefetcher::{precache_transaction, PrefetchOutcome, StatePrefetcher};

pub mod signer;
pub use signer::{AccountKey, AccountKeyPicker, SignatureCache, Signer};

pub mod state;
pub use state::{ScratchState, StateKey, StateStorage, StateView, WarmCache};

pub mod types;
