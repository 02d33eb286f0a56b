//! The register as one machine sees it.

use std::collections::HashSet;
use std::time::Duration;

use chrono::Utc;

use kvchain_core::config::KvConfig;
use kvchain_core::cursor::ReplicationCursor;
use kvchain_core::entry::LogEntry;
use kvchain_core::errors::{KvError, KvResult};
use kvchain_core::traits::{ILogStorage, IReadOnlyLogStorage};
use kvchain_core::value::{load_value, LogicalValue};
use kvchain_storage::{ScopedLog, StorageEngine};

use crate::merge::{MergeEngine, MergeReport};

/// A machine's writer and reader over its own store.
///
/// Writes extend this machine's lineage for a key; reads return this
/// machine's head as main and other machines' heads as branches.
pub struct Replica {
    machine_id: String,
    storage: StorageEngine,
    merge: MergeEngine,
    reclaim_grace: Duration,
}

impl Replica {
    /// Open the file-backed store described by `config`.
    pub fn open(config: &KvConfig) -> KvResult<Self> {
        config.validate()?;
        let storage = StorageEngine::open_with_config(&config.storage)?;
        Ok(Self::with_engine(config, storage))
    }

    /// In-memory replica for `machine_id`.
    pub fn open_in_memory(machine_id: &str) -> KvResult<Self> {
        let config = KvConfig::for_machine(machine_id);
        config.validate()?;
        Ok(Self::with_engine(&config, StorageEngine::open_in_memory()?))
    }

    /// Wrap an already opened engine.
    pub fn with_engine(config: &KvConfig, storage: StorageEngine) -> Self {
        Self {
            machine_id: config.replica.machine_id.clone(),
            storage,
            merge: MergeEngine::from_config(&config.replica),
            reclaim_grace: Duration::from_secs(config.replica.reclaim_grace_secs),
        }
    }

    pub fn machine_id(&self) -> &str {
        &self.machine_id
    }

    pub fn storage(&self) -> &StorageEngine {
        &self.storage
    }

    /// Write `value` for `key`, extending this machine's lineage or starting it.
    pub fn save(&self, key: &str, value: &str) -> KvResult<LogEntry> {
        self.append(key, |head, chain_number| {
            Ok(match head {
                Some(head) => head.successor(value, self.machine_id.as_str(), chain_number, 0),
                None => LogEntry::root(key, value, self.machine_id.as_str(), chain_number, 0),
            })
        })
    }

    /// Extend this machine's lineage with a tombstone. The key then reads as absent.
    pub fn delete(&self, key: &str) -> KvResult<LogEntry> {
        self.append(key, |head, chain_number| match head {
            Some(head) if head.visible() => {
                Ok(head.tombstone(self.machine_id.as_str(), chain_number, 0))
            }
            _ => Err(self.no_main(key)),
        })
    }

    /// Head read, entry construction, and admission share one transaction,
    /// so the head cannot move underneath the write.
    fn append<F>(&self, key: &str, build: F) -> KvResult<LogEntry>
    where
        F: FnOnce(Option<&LogEntry>, i64) -> KvResult<LogEntry>,
    {
        self.storage.with_write_scope(|tx| {
            let log = ScopedLog::new(tx);
            let cursor = log
                .cursor(&self.machine_id)?
                .unwrap_or_else(|| ReplicationCursor::new(self.machine_id.as_str()));
            let head = log.head_for(key, &self.machine_id)?;

            let mut entry = build(head.as_ref(), cursor.chain_number + 1)?;
            // Offset just past this record in the machine's log stream.
            entry.log_offset = cursor.log_offset + entry.encoded_len()?;

            match &head {
                Some(head) => log.replace(&head.entry_id, &entry)?,
                None => log.add(&entry)?,
            }
            Ok(entry)
        })
    }

    /// This machine has a visible head for `key`.
    pub fn has(&self, key: &str) -> KvResult<bool> {
        Ok(self
            .storage
            .head_for(key, &self.machine_id)?
            .is_some_and(|head| head.visible()))
    }

    pub fn load(&self, key: &str) -> KvResult<LogicalValue> {
        load_value(&self.storage, key, &self.machine_id)
    }

    /// Every key with a visible main version, ordered by when its current
    /// head was admitted.
    pub fn all(&self) -> KvResult<Vec<LogicalValue>> {
        let mut seen = HashSet::new();
        let mut values = Vec::new();
        for entry in self.storage.all_entries()? {
            if entry.origin_machine == self.machine_id
                && entry.visible()
                && seen.insert(entry.key.clone())
            {
                values.push(self.load(&entry.key)?);
            }
        }
        Ok(values)
    }

    /// Import the full history of `remote`.
    pub fn merge_from(&self, remote: &dyn IReadOnlyLogStorage) -> KvResult<MergeReport> {
        self.merge.merge(&self.storage, remote)
    }

    /// Import only what `remote` has past this store's cursors.
    pub fn merge_incremental_from(
        &self,
        remote: &dyn IReadOnlyLogStorage,
    ) -> KvResult<MergeReport> {
        self.merge.merge_incremental(&self.storage, remote)
    }

    /// Purge entries retired longer ago than the configured grace period.
    pub fn reclaim(&self) -> KvResult<usize> {
        let grace = chrono::Duration::from_std(self.reclaim_grace)
            .unwrap_or_else(|_| chrono::Duration::zero());
        self.storage.reclaim(Utc::now() - grace)
    }

    fn no_main(&self, key: &str) -> KvError {
        KvError::NoMainVersion {
            key: key.to_string(),
            machine_id: self.machine_id.clone(),
        }
    }
}
