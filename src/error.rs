/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! error defines the failures that end a prefetch pass early.
//!
//! None of them ever reaches the caller of [StatePrefetcher::prefetch](crate::StatePrefetcher::prefetch):
//! a pass that fails simply warmed less than it could have. They are reported back through
//! [PrefetchOutcome](crate::PrefetchOutcome) for inspection only.

use thiserror::Error;

/// The transaction cannot be turned into an executable message. Raised before the engine touches state.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum MessageDerivationError {
    /// Transaction hash is not the hash of its signature.
    #[error("transaction hash does not match its signature")]
    HashMismatch,

    /// The account key stored for the signer cannot be decoded.
    #[error("account key of the signer cannot be resolved")]
    UnresolvableAccountKey,

    /// The account key of the signer forbids signing.
    #[error("account of the signer is not allowed to sign")]
    UnsignableAccount,

    /// The resolved key is not a valid Ed25519 point.
    #[error("malformed public key")]
    MalformedPublicKey,

    /// Signature does not verify against the resolved key.
    #[error("invalid signature")]
    InvalidSignature,

    /// The signing payload could not be encoded.
    #[error("failed to encode signing payload: {0}")]
    Encoding(String),
}

/// The engine refused the message before executing it, independent of what execution would do.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum InvalidTransaction {
    /// Nonce is not current nonce.
    #[error("wrong nonce: expected {expected}, got {actual}")]
    WrongNonce { expected: u64, actual: u64 },

    /// Not enough balance to pay for gas limit.
    #[error("not enough balance for gas limit")]
    NotEnoughBalanceForGasLimit,

    /// Max base fee of the transaction is below the base fee of the block.
    #[error("max base fee per gas is below the block base fee")]
    BaseFeeTooLow,

    /// Gas limit was insufficient to cover pre-execution costs.
    #[error("gas limit does not cover pre-execution costs")]
    PreExecutionGasExhausted,

    /// Transaction commands are empty.
    #[error("transaction has no commands")]
    InvalidCommands,
}

/// Error classes of the execution adapter. Either one aborts the rest of a pass.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum PrecacheError {
    #[error(transparent)]
    MessageDerivation(#[from] MessageDerivationError),

    #[error(transparent)]
    InvalidTransaction(#[from] InvalidTransaction),
}
