//! # Transaction Processing Service
//!
//! Owns the ledger handle, the ownership cache and the collaborators shared
//! by the block, pending and created lanes.
//!
//! Each lane holds its own mutex for the whole batch, so at most one batch
//! per lane is in flight. Both lanes finally serialize on `Ledger::write`.

use lru::LruCache;
use parking_lot::{Mutex, RwLock};
use shared_types::{short_hex, Block, FullTransaction, Hash, KeyPath, Transaction};
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::config::ProcessingConfig;
use crate::domain::{
    ConflictResolver, IrregularOutputFinder, MetadataExtractor, OwnershipCache, ProcessOutcome,
    ProcessReport, ProcessingError, TransactionInvalidator,
};
use crate::ports::{
    BloomFilterManager, Ledger, LedgerListener, LedgerReader, LedgerStore, LedgerUpdate,
    PublicKeyManager, TransactionProcessorApi,
};

/// State private to the pending lane.
pub(crate) struct PendingLane {
    /// Hashes already judged foreign.
    pub(crate) not_mine: LruCache<Hash, ()>,
}

/// Changes accumulated while a batch runs.
#[derive(Default)]
pub(crate) struct Batch {
    pub(crate) report: ProcessReport,
    pub(crate) needs_refresh: bool,
    pub(crate) used_keys: Vec<KeyPath>,
    pub(crate) stored_mine: bool,
    pub(crate) update: LedgerUpdate,
    pub(crate) received: Vec<FullTransaction>,
}

impl Batch {
    pub(crate) fn for_block(block: &Block) -> Self {
        let mut batch = Self::default();
        batch.update.block = Some(block.clone());
        batch
    }

    pub(crate) fn inserted(&mut self, transaction: &FullTransaction) {
        self.report.inserted.push(transaction.hash());
        self.update.inserted.push(transaction.header.clone());
        self.stored_mine(transaction);
    }

    pub(crate) fn resurrected(&mut self, transaction: &FullTransaction) {
        self.updated(&transaction.header);
        self.stored_mine(transaction);
    }

    pub(crate) fn updated(&mut self, header: &Transaction) {
        if self.report.updated.contains(&header.hash) {
            self.update.updated.retain(|stored| stored.hash != header.hash);
        }
        self.report.mark_updated(header.hash);
        self.update.updated.push(header.clone());
    }

    pub(crate) fn invalidated(&mut self, headers: Vec<Transaction>) {
        for header in headers {
            self.report.invalidated.push(header.hash);
            self.report.updated.retain(|hash| *hash != header.hash);
            self.update.updated.retain(|stored| stored.hash != header.hash);
            self.update.invalidated.push(header);
        }
    }

    /// Queue `transaction` for `on_receive`, wallet-owned or not.
    pub(crate) fn extracted(&mut self, transaction: &FullTransaction) {
        self.received.push(transaction.clone());
    }

    fn stored_mine(&mut self, transaction: &FullTransaction) {
        if !transaction.header.is_mine {
            return;
        }
        self.stored_mine = true;
        self.used_keys
            .extend(transaction.my_outputs().filter_map(|output| output.key_path));
    }
}

/// Transaction Processing Service - applies block, mempool and locally
/// created transactions to the wallet ledger.
pub struct TransactionProcessingService<L: Ledger> {
    pub(crate) config: ProcessingConfig,
    pub(crate) ledger: Arc<L>,
    pub(crate) extractor: MetadataExtractor,
    pub(crate) resolver: ConflictResolver,
    pub(crate) invalidator: TransactionInvalidator,
    pub(crate) irregular: IrregularOutputFinder,
    keys: Arc<dyn PublicKeyManager>,
    bloom: Arc<dyn BloomFilterManager>,
    listener: Option<Arc<dyn LedgerListener>>,
    pub(crate) block_lane: Mutex<()>,
    pub(crate) pending_lane: Mutex<PendingLane>,
}

impl<L: Ledger> TransactionProcessingService<L> {
    /// Create the service, rebuilding the ownership cache from the ledger.
    pub fn new(
        config: ProcessingConfig,
        ledger: Arc<L>,
        keys: Arc<dyn PublicKeyManager>,
        bloom: Arc<dyn BloomFilterManager>,
    ) -> Self {
        let cache = OwnershipCache::from_outputs(&ledger.read(|store| store.wallet_outputs()));
        info!("[sw-01] ownership cache rebuilt with {} outputs", cache.len());

        let capacity =
            NonZeroUsize::new(config.not_mine_cache_capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            extractor: MetadataExtractor::new(Arc::new(RwLock::new(cache))),
            resolver: ConflictResolver::new(config.sequence_heuristic),
            invalidator: TransactionInvalidator::new(),
            irregular: IrregularOutputFinder::new(
                &config.irregular_script_types,
                config.spent_output_watch_depth,
            ),
            config,
            ledger,
            keys,
            bloom,
            listener: None,
            block_lane: Mutex::new(()),
            pending_lane: Mutex::new(PendingLane {
                not_mine: LruCache::new(capacity),
            }),
        }
    }

    /// Attach a ledger listener.
    pub fn with_listener(mut self, listener: Arc<dyn LedgerListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Ledger this service writes to.
    pub fn ledger(&self) -> &Arc<L> {
        &self.ledger
    }

    /// Active configuration.
    pub fn config(&self) -> &ProcessingConfig {
        &self.config
    }

    /// Fill the key gap and regenerate the bloom filter with the outpoints
    /// of irregular wallet outputs.
    pub fn refresh_filter(&self) -> Result<(), ProcessingError> {
        self.keys.fill_gap()?;
        let elements = self
            .ledger
            .read(|store| self.irregular.filter_elements(store));
        debug!("[sw-01] regenerating filter with {} outpoints", elements.len());
        self.bloom.regenerate(elements);
        Ok(())
    }

    pub(crate) fn check_batch_size(&self, len: usize) -> Result<(), ProcessingError> {
        if len > self.config.max_batch_size {
            return Err(ProcessingError::BatchTooLarge {
                got: len,
                max: self.config.max_batch_size,
            });
        }
        Ok(())
    }

    /// Resolve inputs and extract metadata in place.
    pub(crate) fn extract<S: LedgerReader + ?Sized>(
        &self,
        transaction: &mut FullTransaction,
        store: &S,
    ) {
        crate::domain::resolve_inputs(transaction, store);
        self.extractor.extract(transaction, store);
    }

    /// Invalidate every pending transaction `transaction` conflicts with now
    /// that it is confirmed.
    pub(crate) fn invalidate_block_conflicts(
        &self,
        transaction: &FullTransaction,
        store: &mut L::Store,
        batch: &mut Batch,
    ) -> Result<(), ProcessingError> {
        let hash = transaction.hash();
        for conflict in self
            .resolver
            .conflicts_with_block_transaction(transaction, &*store)
        {
            debug!(
                "[sw-01] {} confirmed, invalidating {}",
                short_hex(&hash),
                short_hex(&conflict.hash())
            );
            let headers = self
                .invalidator
                .invalidate(&conflict.hash(), Some(hash), store)?;
            batch.invalidated(headers);
        }
        Ok(())
    }

    /// Point `conflicting` and its descendants at `winner` without changing
    /// their status.
    pub(crate) fn flag_superseded(
        &self,
        conflicting: &Hash,
        winner: Hash,
        store: &mut L::Store,
        batch: &mut Batch,
    ) -> Result<(), ProcessingError> {
        for hash in self.invalidator.descendants(conflicting, &*store) {
            let Some(mut header) = store.transaction(&hash) else {
                continue;
            };
            if header.conflicting_tx_hash == Some(winner) {
                continue;
            }
            header.conflicting_tx_hash = Some(winner);
            store.update_header(&header)?;
            batch.updated(&header);
        }
        Ok(())
    }

    /// Run `body` as one atomic ledger batch and publish its effects.
    pub(crate) fn run_batch(
        &self,
        lane: &str,
        body: impl FnOnce(&mut L::Store) -> Result<Batch, ProcessingError>,
    ) -> Result<ProcessOutcome, ProcessingError> {
        match self.ledger.write(body) {
            Ok(batch) => Ok(self.finish(lane, batch)),
            Err(err) => {
                error!("[sw-01] {} batch rolled back: {}", lane, err);
                self.rebuild_cache();
                Err(err)
            }
        }
    }

    fn finish(&self, lane: &str, batch: Batch) -> ProcessOutcome {
        let Batch {
            report,
            mut needs_refresh,
            used_keys,
            stored_mine,
            update,
            received,
        } = batch;

        if stored_mine {
            self.keys.mark_used(&used_keys);
            if self.keys.gap_shifts() {
                debug!("[sw-01] key gap shifted");
                needs_refresh = true;
            }
        }

        if let Some(listener) = &self.listener {
            for transaction in &received {
                listener.on_receive(transaction);
            }
            if !report.is_empty() {
                listener.on_update(&update);
            }
        }

        info!(
            "[sw-01] {} batch: {} inserted, {} updated, {} invalidated{}",
            lane,
            report.inserted.len(),
            report.updated.len(),
            report.invalidated.len(),
            if needs_refresh { ", filter refresh needed" } else { "" }
        );
        ProcessOutcome::new(report, needs_refresh)
    }

    /// A rolled-back batch may have taught the cache outputs that were never
    /// stored. Rebuilt under the ledger write lock so no other lane extracts
    /// in between.
    fn rebuild_cache(&self) {
        let rebuilt = self.ledger.write(|store| {
            *self.extractor.cache().write() = OwnershipCache::from_outputs(&store.wallet_outputs());
            Ok(())
        });
        if let Err(err) = rebuilt {
            error!("[sw-01] ownership cache rebuild failed: {}", err);
        }
    }
}

impl<L: Ledger> TransactionProcessorApi for TransactionProcessingService<L> {
    fn process_block(
        &self,
        transactions: Vec<FullTransaction>,
        block: Block,
    ) -> Result<ProcessOutcome, ProcessingError> {
        self.apply_block(transactions, block)
    }

    fn process_pending(
        &self,
        transactions: Vec<FullTransaction>,
    ) -> Result<ProcessOutcome, ProcessingError> {
        self.apply_pending(transactions)
    }

    fn process_created(
        &self,
        transaction: FullTransaction,
    ) -> Result<ProcessOutcome, ProcessingError> {
        self.apply_created(transaction)
    }

    fn invalidate(&self, hash: &Hash) -> Result<ProcessReport, ProcessingError> {
        let _lane = self.block_lane.lock();
        let outcome = self.run_batch("invalidate", |store| {
            let mut batch = Batch::default();
            let headers = self.invalidator.invalidate(hash, None, store)?;
            batch.invalidated(headers);
            Ok(batch)
        })?;
        Ok(outcome.into_report())
    }
}
