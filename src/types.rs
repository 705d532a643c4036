/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Defines common data structures to be used inside this library, or from outside application.

use borsh::{BorshDeserialize, BorshSerialize};
use sha2::{Digest, Sha256};

/// Address of an account. For an account that never rotated its key, it is the Ed25519 public key.
pub type PublicAddress = [u8; 32];

/// 32-byte SHA-256 digest.
pub type Sha256Hash = [u8; 32];

/// 64-byte Ed25519 signature.
pub type SignatureBytes = [u8; 64];

/// Computes the SHA-256 digest of the input bytes.
pub fn sha256(bytes: impl AsRef<[u8]>) -> Sha256Hash {
    Sha256::digest(bytes.as_ref()).into()
}

/// Block metadata needed to build an execution context.
#[derive(Debug, Default, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct BlockHeader {
    /// Height of the Block
    pub number: u64,
    /// Previous Block Hash
    pub prev_block_hash: Sha256Hash,
    /// Unix timestamp
    pub timestamp: u32,
    /// Base fee in the Block
    pub base_fee_per_gas: u64,
    /// Maximum gas consumed by all transactions in the Block
    pub gas_limit: u64,
    /// Address of block proposer
    pub proposer: PublicAddress,
}

impl BlockHeader {
    /// SHA-256 of the Borsh encoding of the header.
    pub fn hash(&self) -> Sha256Hash {
        let mut hasher = Sha256::new();
        // Writing into a hasher cannot fail.
        let _ = self.serialize(&mut hasher);
        hasher.finalize().into()
    }
}

/// A header and its transactions in canonical order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
}

impl Block {
    pub fn new(header: BlockHeader, transactions: Vec<Transaction>) -> Self {
        Self {
            header,
            transactions,
        }
    }

    /// The block hash is the hash of its header.
    pub fn hash(&self) -> Sha256Hash {
        self.header.hash()
    }

    pub fn number(&self) -> u64 {
        self.header.number
    }
}

/// A signed transaction as it appears in a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub signer: PublicAddress,
    pub nonce: u64,
    pub gas_limit: u64,
    pub max_base_fee_per_gas: u64,
    pub priority_fee_per_gas: u64,
    pub commands: Vec<Command>,
    /// SHA-256 of `signature`
    pub hash: Sha256Hash,
    pub signature: SignatureBytes,
}

impl Transaction {
    pub fn hash(&self) -> Sha256Hash {
        self.hash
    }

    /// Borsh encoding of every field covered by the signature.
    pub(crate) fn encode_payload(&self, buf: &mut Vec<u8>) -> std::io::Result<()> {
        self.signer.serialize(buf)?;
        self.nonce.serialize(buf)?;
        self.gas_limit.serialize(buf)?;
        self.max_base_fee_per_gas.serialize(buf)?;
        self.priority_fee_per_gas.serialize(buf)?;
        self.commands.serialize(buf)
    }
}

/// Instructions carried by a transaction.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum Command {
    Transfer(TransferInput),
    Call(CallInput),
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct TransferInput {
    pub recipient: PublicAddress,
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct CallInput {
    pub target: PublicAddress,
    pub method: String,
    pub arguments: Option<Vec<Vec<u8>>>,
    pub amount: Option<u64>,
}

/// Validated, sender-resolved form of a [Transaction], ready to be applied by an engine.
///
/// Deliberately not `Clone`: an engine consumes the message, so a message can never be applied twice.
#[derive(Debug, PartialEq, Eq)]
pub struct Message {
    pub from: PublicAddress,
    pub nonce: u64,
    pub gas_limit: u64,
    pub max_base_fee_per_gas: u64,
    pub priority_fee_per_gas: u64,
    pub commands: Vec<Command>,
    /// Hash of the transaction this message was derived from
    pub tx_hash: Sha256Hash,
}

/// Status of an applied message. A revert still touched state before unwinding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Reverted,
    GasExhausted,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Log {
    pub topic: Vec<u8>,
    pub value: Vec<u8>,
}

/// Structured outcome of applying a message. Prefetching never looks inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub exit_status: ExitStatus,
    pub gas_used: u64,
    pub return_values: Vec<u8>,
    pub logs: Vec<Log>,
}

impl ExecutionResult {
    pub fn is_reverted(&self) -> bool {
        self.exit_status == ExitStatus::Reverted
    }
}
