//! # Core Domain Entities
//!
//! Defines the wallet ledger entities.
//!
//! ## Clusters
//!
//! - **Chain**: `Block`, `Transaction`, `FullTransaction`, `Input`, `Output`
//! - **Ownership**: `KeyPath`, `UnspentOutput`, `TransactionMetadata`
//! - **Scripts**: `ScriptType` with its serialized sizes

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// =============================================================================
// CLUSTER A: PRIMITIVES
// =============================================================================

/// A 32-byte double-SHA-256 hash.
pub type Hash = [u8; 32];

/// Sequence number at or above which an input opts out of replace-by-fee.
pub const SEQUENCE_FINAL_THRESHOLD: u32 = 0xFFFF_FFFE;

/// Sequence used by inputs that signal replace-by-fee.
pub const SEQUENCE_RBF: u32 = 0xFFFF_FFFD;

/// Sequence used by inputs that do not signal replace-by-fee.
pub const SEQUENCE_FINAL: u32 = 0xFFFF_FFFF;

/// Bitcoin double SHA-256.
pub fn double_sha256(data: &[u8]) -> Hash {
    let first = Sha256::digest(data);
    Sha256::digest(first).into()
}

/// First eight hex characters of a hash, for log lines.
pub fn short_hex(hash: &Hash) -> String {
    hex::encode(&hash[..4])
}

/// Reference to a transaction output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Outpoint {
    /// Hash of the transaction holding the output.
    pub hash: Hash,
    /// Output index within that transaction.
    pub index: u32,
}

impl Outpoint {
    /// Create an outpoint.
    pub fn new(hash: Hash, index: u32) -> Self {
        Self { hash, index }
    }

    /// Serialized form used as a bloom filter element: `hash || u32_le(index)`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(36);
        bytes.extend_from_slice(&self.hash);
        bytes.extend_from_slice(&self.index.to_le_bytes());
        bytes
    }
}

/// Locking script template of an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ScriptType {
    /// Pay to public key hash.
    #[default]
    P2pkh,
    /// Pay to public key.
    P2pk,
    /// Native segwit v0 pay to witness public key hash.
    P2wpkh,
    /// P2WPKH nested in P2SH.
    P2wpkhSh,
    /// Pay to script hash.
    P2sh,
    /// Segwit v1 taproot.
    P2tr,
    /// Pay to witness script hash.
    P2wsh,
    /// OP_RETURN data carrier.
    NullData,
    /// Unrecognised script.
    Unknown,
}

impl ScriptType {
    /// Size in bytes of the locking script.
    pub fn script_size(&self) -> usize {
        match self {
            ScriptType::P2pkh => 25,
            ScriptType::P2pk => 35,
            ScriptType::P2wpkh => 22,
            ScriptType::P2wpkhSh | ScriptType::P2sh => 23,
            ScriptType::P2tr | ScriptType::P2wsh => 34,
            ScriptType::NullData | ScriptType::Unknown => 0,
        }
    }

    /// Whether spending this type places data in the witness.
    pub fn is_witness(&self) -> bool {
        matches!(
            self,
            ScriptType::P2wpkh | ScriptType::P2wpkhSh | ScriptType::P2tr | ScriptType::P2wsh
        )
    }
}

/// HD derivation path of a wallet key. Presence on an output marks it wallet-owned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyPath {
    /// Account index.
    pub account: u32,
    /// External (receive) chain when true, internal (change) chain otherwise.
    pub external: bool,
    /// Address index on the chain.
    pub index: u32,
}

impl KeyPath {
    /// Receive-chain key.
    pub fn receive(account: u32, index: u32) -> Self {
        Self { account, external: true, index }
    }

    /// Change-chain key.
    pub fn change(account: u32, index: u32) -> Self {
        Self { account, external: false, index }
    }
}

// =============================================================================
// CLUSTER B: THE CHAIN
// =============================================================================

/// Wallet-relative lifecycle of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TransactionStatus {
    /// Created locally and not yet seen on the network.
    #[default]
    New,
    /// Seen in the mempool or in a block.
    Relayed,
    /// Superseded by a conflicting transaction.
    Invalid,
}

/// Direction of a wallet-owned transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TransactionType {
    /// Net value flowed into the wallet.
    #[default]
    Incoming,
    /// Net value flowed out of the wallet.
    Outgoing,
    /// Wallet paid itself.
    SentToSelf,
}

/// A block the wallet knows about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Header hash.
    pub hash: Hash,
    /// Chain height.
    pub height: u32,
    /// Header timestamp (unix seconds).
    pub timestamp: u64,
    /// Whether the block holds at least one wallet transaction.
    pub has_transactions: bool,
}

impl Block {
    /// Create a block without wallet transactions.
    pub fn new(hash: Hash, height: u32, timestamp: u64) -> Self {
        Self {
            hash,
            height,
            timestamp,
            has_transactions: false,
        }
    }
}

/// Transaction header row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Transaction {
    /// Content hash.
    pub hash: Hash,
    /// Serialization version.
    pub version: u32,
    /// Lock time.
    pub lock_time: u32,
    /// Block timestamp, or first-seen time for pending transactions.
    pub timestamp: u64,
    /// Tie-break key within a batch.
    pub order: u32,
    /// Block that confirmed the transaction.
    pub block_hash: Option<Hash>,
    /// Wallet owns an input or an output.
    pub is_mine: bool,
    /// Wallet owns an input.
    pub is_outgoing: bool,
    /// Serialized with witness data.
    pub segwit: bool,
    /// Lifecycle state.
    pub status: TransactionStatus,
    /// Transaction that superseded this one.
    pub conflicting_tx_hash: Option<Hash>,
}

impl Transaction {
    /// Not yet confirmed in a block.
    pub fn is_pending(&self) -> bool {
        self.block_hash.is_none()
    }
}

/// Transaction input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Input {
    /// Hash of the transaction that created the spent output.
    pub previous_output_hash: Hash,
    /// Index of the spent output.
    pub previous_output_index: u32,
    /// Unlocking script.
    pub signature_script: Vec<u8>,
    /// Witness stack.
    pub witness: Vec<Vec<u8>>,
    /// Sequence number.
    pub sequence: u32,
    /// Owning transaction.
    pub transaction_hash: Hash,
    /// Address of the spent output, once resolved.
    pub address: Option<String>,
    /// Locking script payload of the spent output, once resolved.
    pub locking_script_payload: Option<Vec<u8>>,
    /// Wallet key of the spent output, once resolved.
    pub key_path: Option<KeyPath>,
}

impl Input {
    /// Input spending `outpoint` with the given sequence.
    pub fn new(outpoint: Outpoint, sequence: u32) -> Self {
        Self {
            previous_output_hash: outpoint.hash,
            previous_output_index: outpoint.index,
            signature_script: Vec::new(),
            witness: Vec::new(),
            sequence,
            transaction_hash: [0u8; 32],
            address: None,
            locking_script_payload: None,
            key_path: None,
        }
    }

    /// The output this input spends.
    pub fn outpoint(&self) -> Outpoint {
        Outpoint::new(self.previous_output_hash, self.previous_output_index)
    }

    /// Signals replace-by-fee.
    pub fn rbf_enabled(&self) -> bool {
        self.sequence < SEQUENCE_FINAL_THRESHOLD
    }

    /// Previous output data has been copied onto this input.
    pub fn is_resolved(&self) -> bool {
        self.address.is_some() || self.locking_script_payload.is_some()
    }
}

/// Transaction output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    /// Value in satoshis.
    pub value: u64,
    /// Position within the transaction.
    pub index: u32,
    /// Locking script.
    pub locking_script: Vec<u8>,
    /// Template of the locking script.
    pub script_type: ScriptType,
    /// Redeem script for P2SH outputs the wallet can spend.
    pub redeem_script: Option<Vec<u8>>,
    /// Hash or key pushed by the locking script.
    pub locking_script_payload: Option<Vec<u8>>,
    /// Encoded address.
    pub address: Option<String>,
    /// Wallet key owning the output.
    pub key_path: Option<KeyPath>,
    /// Output pays back to the wallet's change chain.
    pub change_output: bool,
    /// A transaction spending this output was invalidated.
    pub failed_to_spend: bool,
    /// Owning transaction.
    pub transaction_hash: Hash,
}

impl Output {
    /// Foreign output of the given value and type.
    pub fn new(value: u64, index: u32, script_type: ScriptType) -> Self {
        Self {
            value,
            index,
            locking_script: Vec::new(),
            script_type,
            redeem_script: None,
            locking_script_payload: None,
            address: None,
            key_path: None,
            change_output: false,
            failed_to_spend: false,
            transaction_hash: [0u8; 32],
        }
    }

    /// Mark the output as owned by `key_path`.
    pub fn owned_by(mut self, key_path: KeyPath) -> Self {
        self.change_output = !key_path.external;
        self.key_path = Some(key_path);
        self
    }

    /// Wallet-owned.
    pub fn is_mine(&self) -> bool {
        self.key_path.is_some()
    }

    /// This output as an outpoint.
    pub fn outpoint(&self) -> Outpoint {
        Outpoint::new(self.transaction_hash, self.index)
    }
}

/// Derived wallet view of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TransactionMetadata {
    /// Transaction the metadata belongs to.
    pub transaction_hash: Hash,
    /// Direction.
    pub transaction_type: TransactionType,
    /// Wallet-relative amount, never negative.
    pub amount: u64,
    /// Fee, when every input value is known.
    pub fee: Option<u64>,
}

/// Header with its inputs, outputs and derived metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullTransaction {
    /// Header row.
    pub header: Transaction,
    /// Inputs in serialization order.
    pub inputs: Vec<Input>,
    /// Outputs in serialization order.
    pub outputs: Vec<Output>,
    /// Derived wallet view.
    pub metadata: TransactionMetadata,
}

impl FullTransaction {
    /// Assemble a transaction, linking inputs and outputs to the header hash.
    pub fn new(header: Transaction, mut inputs: Vec<Input>, mut outputs: Vec<Output>) -> Self {
        let hash = header.hash;
        for input in &mut inputs {
            input.transaction_hash = hash;
        }
        for (index, output) in outputs.iter_mut().enumerate() {
            output.transaction_hash = hash;
            output.index = index as u32;
        }
        Self {
            header,
            inputs,
            outputs,
            metadata: TransactionMetadata {
                transaction_hash: hash,
                ..TransactionMetadata::default()
            },
        }
    }

    /// Content hash.
    pub fn hash(&self) -> Hash {
        self.header.hash
    }

    /// Outpoints spent by this transaction.
    pub fn spent_outpoints(&self) -> impl Iterator<Item = Outpoint> + '_ {
        self.inputs.iter().map(Input::outpoint)
    }

    /// Shares at least one spent outpoint with `other`.
    pub fn shares_input_with(&self, other: &FullTransaction) -> bool {
        self.inputs
            .iter()
            .any(|mine| other.inputs.iter().any(|theirs| mine.outpoint() == theirs.outpoint()))
    }

    /// Outputs owned by the wallet.
    pub fn my_outputs(&self) -> impl Iterator<Item = &Output> {
        self.outputs.iter().filter(|output| output.is_mine())
    }
}

/// Wallet-owned output available for spending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnspentOutput {
    /// The output.
    pub output: Output,
    /// Owning key.
    pub key_path: KeyPath,
    /// Parent transaction header.
    pub transaction: Transaction,
    /// Height of the block confirming the parent, if any.
    pub block_height: Option<u32>,
}

impl UnspentOutput {
    /// Value in satoshis.
    pub fn value(&self) -> u64 {
        self.output.value
    }

    /// Outpoint of the output.
    pub fn outpoint(&self) -> Outpoint {
        self.output.outpoint()
    }
}
