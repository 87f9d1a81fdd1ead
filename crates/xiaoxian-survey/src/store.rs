//! The response list and its persistence slot.
//!
//! [`ResponseStore`] reads the slot once when opened and rewrites the whole
//! list on every submission.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::response::SurveyResponse;
use crate::storage::Storage;

/// Default slot key for the response list.
pub const DEFAULT_SLOT_KEY: &str = "xiaoxian_survey_data";

/// All collected responses, backed by one storage slot.
#[derive(Debug)]
pub struct ResponseStore {
    storage: Storage,
    key: String,
    responses: Vec<SurveyResponse>,
    /// BLAKE3 digest of the slot as last read or written.
    digest: Option<blake3::Hash>,
}

impl ResponseStore {
    /// Load the response list from `key`.
    ///
    /// A missing slot yields an empty list. Unreadable data also yields an
    /// empty list, and unreadable records inside an otherwise valid array are
    /// skipped; both are logged as warnings.
    ///
    /// # Errors
    ///
    /// Returns an error only if the storage read itself fails.
    pub fn open(storage: Storage, key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        let slot = storage.read_slot(&key)?;
        let digest = slot.as_ref().map(|s| blake3::hash(s.value.as_bytes()));
        let responses = slot
            .map(|s| decode_responses(&key, &s.value))
            .unwrap_or_default();

        info!("Loaded {} responses from slot {}", responses.len(), key);
        Ok(Self {
            storage,
            key,
            responses,
            digest,
        })
    }

    /// The collected responses, oldest first.
    #[must_use]
    pub fn responses(&self) -> &[SurveyResponse] {
        &self.responses
    }

    /// Number of responses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.responses.len()
    }

    /// Whether no responses have been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    /// The slot key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The underlying storage.
    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Append one response and persist the full list.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the storage write fails. The
    /// in-memory list is left unchanged in that case.
    pub fn submit(&mut self, response: SurveyResponse) -> Result<()> {
        debug!("Submitting response {}", response.id());
        self.commit(std::iter::once(response)).map(|_| ())
    }

    /// Append many responses with a single write.
    ///
    /// Returns the number appended.
    ///
    /// # Errors
    ///
    /// See [`ResponseStore::submit`].
    pub fn extend(&mut self, responses: impl IntoIterator<Item = SurveyResponse>) -> Result<usize> {
        self.commit(responses)
    }

    /// Whether the slot was changed by someone else since this store last
    /// read or wrote it.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage read fails.
    pub fn slot_changed(&self) -> Result<bool> {
        let current = self
            .storage
            .read_slot(&self.key)?
            .map(|s| blake3::hash(s.value.as_bytes()));
        Ok(current != self.digest)
    }

    /// Summary of the store and its database.
    ///
    /// # Errors
    ///
    /// Returns an error if a storage query fails.
    pub fn status(&self) -> Result<StoreStatus> {
        let stats = self.storage.stats()?;
        Ok(StoreStatus {
            database_path: self.storage.path().to_path_buf(),
            slot_key: self.key.clone(),
            responses: self.responses.len(),
            slot_keys: self.storage.slot_keys()?,
            value_bytes: stats.value_bytes,
            last_write: stats.last_write,
            db_size_bytes: stats.db_size_bytes,
        })
    }

    /// Write the current list plus `added` and adopt it once the write
    /// succeeds.
    fn commit(&mut self, added: impl IntoIterator<Item = SurveyResponse>) -> Result<usize> {
        let before = self.responses.len();
        let mut next = self.responses.clone();
        next.extend(added);
        let count = next.len() - before;
        if count == 0 {
            return Ok(0);
        }

        if self.slot_changed()? {
            warn!(
                "Slot {} was modified by another writer since it was loaded; overwriting",
                self.key
            );
        }
        let json = serde_json::to_string(&next)?;
        self.storage.write_slot(&self.key, &json)?;

        self.responses = next;
        self.digest = Some(blake3::hash(json.as_bytes()));
        info!("Saved {} responses to slot {}", self.responses.len(), self.key);
        Ok(count)
    }
}

/// What `xsurvey status` reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStatus {
    /// Database file, or `:memory:`.
    pub database_path: PathBuf,
    /// Slot holding the response list.
    pub slot_key: String,
    /// Responses loaded from that slot.
    pub responses: usize,
    /// Every slot in the database, sorted.
    pub slot_keys: Vec<String>,
    /// Total size of all slot values in bytes.
    pub value_bytes: u64,
    /// Most recent write to any slot.
    pub last_write: Option<DateTime<Utc>>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

fn decode_responses(key: &str, json: &str) -> Vec<SurveyResponse> {
    let items = match serde_json::from_str::<Vec<Value>>(json) {
        Ok(items) => items,
        Err(err) => {
            warn!("Slot {} does not hold a JSON array, ignoring it: {}", key, err);
            return Vec::new();
        }
    };

    let total = items.len();
    let responses: Vec<SurveyResponse> = items
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| match serde_json::from_value(item) {
            Ok(response) => Some(response),
            Err(err) => {
                warn!("Skipping unreadable record {} in slot {}: {}", i, key, err);
                None
            }
        })
        .collect();

    if responses.len() < total {
        warn!(
            "Kept {} of {} records from slot {}",
            responses.len(),
            total,
            key
        );
    }
    responses
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::init_test_logging;
    use crate::response::sample_answers;

    fn open_store(storage: Storage) -> ResponseStore {
        ResponseStore::open(storage, DEFAULT_SLOT_KEY).unwrap()
    }

    #[test]
    fn test_empty_store() {
        let store = open_store(Storage::open_in_memory().unwrap());
        assert!(store.is_empty());
        assert_eq!(store.key(), DEFAULT_SLOT_KEY);
        assert!(!store.slot_changed().unwrap());
    }

    #[test]
    fn test_submit_persists_full_list() {
        let mut store = open_store(Storage::open_in_memory().unwrap());
        store.submit(SurveyResponse::new(sample_answers(4))).unwrap();
        store.submit(SurveyResponse::new(sample_answers(2))).unwrap();
        assert_eq!(store.len(), 2);

        let slot = store.storage().read_slot(DEFAULT_SLOT_KEY).unwrap().unwrap();
        let saved: Vec<SurveyResponse> = serde_json::from_str(&slot.value).unwrap();
        assert_eq!(saved, store.responses());
    }

    #[test]
    fn test_malformed_slot_loads_empty() {
        init_test_logging();
        let storage = Storage::open_in_memory().unwrap();
        storage.write_slot(DEFAULT_SLOT_KEY, "{not json").unwrap();
        let store = open_store(storage);
        assert!(store.is_empty());
    }

    #[test]
    fn test_bad_records_are_skipped() {
        init_test_logging();
        let good = serde_json::to_value(SurveyResponse::new(sample_answers(3))).unwrap();
        let mut bad = good.clone();
        bad["c1_easyToPlay"] = serde_json::json!(11);
        let doc = serde_json::json!([good, bad, {"id": "x"}]);

        let storage = Storage::open_in_memory().unwrap();
        storage
            .write_slot(DEFAULT_SLOT_KEY, &doc.to_string())
            .unwrap();
        let store = open_store(storage);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_extend_writes_once() {
        let mut store = open_store(Storage::open_in_memory().unwrap());
        let added = store
            .extend((1..=5).map(|r| SurveyResponse::new(sample_answers(r))))
            .unwrap();
        assert_eq!(added, 5);
        assert_eq!(store.extend(Vec::new()).unwrap(), 0);
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_detects_foreign_write() {
        init_test_logging();
        let mut store = open_store(Storage::open_in_memory().unwrap());
        store.submit(SurveyResponse::new(sample_answers(4))).unwrap();
        assert!(!store.slot_changed().unwrap());

        store.storage().write_slot(DEFAULT_SLOT_KEY, "[]").unwrap();
        assert!(store.slot_changed().unwrap());

        // Overwrite still wins
        store.submit(SurveyResponse::new(sample_answers(5))).unwrap();
        assert!(!store.slot_changed().unwrap());
        let slot = store.storage().read_slot(DEFAULT_SLOT_KEY).unwrap().unwrap();
        let saved: Vec<SurveyResponse> = serde_json::from_str(&slot.value).unwrap();
        assert_eq!(saved.len(), 2);
    }

    #[test]
    fn test_status_reports_slots() {
        let storage = Storage::open_in_memory().unwrap();
        storage.write_slot("other", "{}").unwrap();
        let mut store = open_store(storage);

        let empty = store.status().unwrap();
        assert_eq!(empty.responses, 0);
        assert_eq!(empty.slot_keys, vec!["other".to_string()]);
        assert_eq!(empty.value_bytes, 2);

        store.submit(SurveyResponse::new(sample_answers(4))).unwrap();
        let status = store.status().unwrap();
        let slot = store.storage().read_slot(DEFAULT_SLOT_KEY).unwrap().unwrap();
        assert_eq!(status.slot_key, DEFAULT_SLOT_KEY);
        assert_eq!(status.responses, 1);
        assert_eq!(status.slot_keys, vec!["other", DEFAULT_SLOT_KEY]);
        assert_eq!(status.value_bytes, 2 + slot.value.len() as u64);
        assert_eq!(status.last_write, Some(slot.updated_at));
        assert_eq!(status.database_path, PathBuf::from(":memory:"));
    }

    #[test]
    fn test_failed_write_leaves_list_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("survey.db");

        let mut store = open_store(Storage::open(&path).unwrap());
        store.submit(SurveyResponse::new(sample_answers(4))).unwrap();

        let other = rusqlite::Connection::open(&path).unwrap();
        other.execute("DROP TABLE slots", []).unwrap();
        assert!(store.submit(SurveyResponse::new(sample_answers(1))).is_err());
        assert!(store
            .extend((1..=3).map(|r| SurveyResponse::new(sample_answers(r))))
            .is_err());
        assert_eq!(store.len(), 1);

        other
            .execute_batch(crate::storage::schema::CREATE_SLOTS_TABLE)
            .unwrap();
        store.submit(SurveyResponse::new(sample_answers(5))).unwrap();
        drop(store);

        let reopened = open_store(Storage::open(&path).unwrap());
        let ratings: Vec<u8> = reopened
            .responses()
            .iter()
            .map(|r| r.answers().g1_overall_satisfaction.get())
            .collect();
        assert_eq!(ratings, vec![4, 5]);
    }

    #[test]
    fn test_reopen_is_lossless() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("survey.db");

        let mut store = open_store(Storage::open(&path).unwrap());
        for r in [5, 4, 3] {
            store.submit(SurveyResponse::new(sample_answers(r))).unwrap();
        }
        let written = store.responses().to_vec();
        drop(store);

        let reopened = open_store(Storage::open(&path).unwrap());
        assert_eq!(reopened.responses(), written.as_slice());
    }
}
