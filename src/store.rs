//! The accumulated result set: every raw record ever fetched, plus the
//! derived marker set for records that currently pass the thresholds.
//!
//! The store is the only mutable state in a run. It is loaded from the
//! cache file at startup (tolerant of absence and corruption), fed by every
//! fetched record, and written back wholesale once the traversal completes.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::debug;

use crate::classify::classify;
use crate::config::Thresholds;
use crate::models::{Marker, RawRecord};
use crate::styles::StyleCatalog;

/// Outcome of attempting to load the persisted cache.
///
/// Every variant is non-fatal: the run proceeds with whatever was loaded
/// (possibly nothing). Surfaced as a value so callers and tests can assert
/// on degraded-mode behavior instead of scraping logs.
#[derive(Debug)]
pub enum CacheLoad {
    /// Parsed the snapshot; holds the number of records loaded.
    Loaded(usize),
    /// No cache file at the given path; started empty.
    Missing,
    /// The file existed but could not be read or parsed; started empty.
    Unreadable(String),
}

/// Outcome of inserting one fetched record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The place identifier had not been seen before.
    New,
    /// The identifier was already present; the record was overwritten.
    Duplicate,
}

/// Mapping from place identifier to raw record, with a parallel mapping to
/// markers for records that pass classification.
///
/// Invariants: every marker key exists in the record map, and a record has
/// a marker iff it currently satisfies the thresholds. `BTreeMap` keeps
/// emission order stable across runs.
pub struct ResultStore {
    records: BTreeMap<String, RawRecord>,
    markers: BTreeMap<String, Marker>,
    thresholds: Thresholds,
    catalog: StyleCatalog,
}

impl ResultStore {
    pub fn new(thresholds: Thresholds, catalog: StyleCatalog) -> Self {
        ResultStore {
            records: BTreeMap::new(),
            markers: BTreeMap::new(),
            thresholds,
            catalog,
        }
    }

    /// Loads a prior snapshot and backfills markers by classifying every
    /// cached record. Any failure falls back to an empty store.
    pub fn load(path: &Path, thresholds: Thresholds, catalog: StyleCatalog) -> (Self, CacheLoad) {
        let mut store = ResultStore::new(thresholds, catalog);
        if !path.exists() {
            return (store, CacheLoad::Missing);
        }
        let outcome = match fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str::<BTreeMap<String, RawRecord>>(&text) {
                Ok(records) => {
                    store.records = records;
                    store.reclassify_all();
                    CacheLoad::Loaded(store.records.len())
                }
                Err(e) => CacheLoad::Unreadable(format!("parse error: {e}")),
            },
            Err(e) => CacheLoad::Unreadable(format!("read error: {e}")),
        };
        (store, outcome)
    }

    /// Rebuilds the marker map from scratch.
    ///
    /// Running again with lower thresholds picks up previously rejected
    /// cached records without any re-fetching.
    pub fn reclassify_all(&mut self) {
        self.markers.clear();
        for (place_id, record) in &self.records {
            if let Some(marker) = classify(record, self.thresholds, &self.catalog) {
                self.markers.insert(place_id.clone(), marker);
            }
        }
    }

    /// Inserts or overwrites a record by place identifier (last write wins)
    /// and brings its marker entry in line with the current record.
    pub fn upsert(&mut self, record: RawRecord) -> UpsertOutcome {
        let place_id = record.place_id.clone();
        let marker = classify(&record, self.thresholds, &self.catalog);
        let previous = self.records.insert(place_id.clone(), record);
        if previous.is_none() {
            debug!("new place {place_id}");
        }
        match marker {
            Some(m) => {
                self.markers.insert(place_id, m);
            }
            None => {
                self.markers.remove(&place_id);
            }
        }
        if previous.is_some() {
            UpsertOutcome::Duplicate
        } else {
            UpsertOutcome::New
        }
    }

    /// Writes the full raw-record snapshot (not the markers) as pretty
    /// JSON. Callers treat failure as a warning; the in-memory results
    /// stand regardless.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.records)
            .context("serializing result snapshot")?;
        fs::write(path, json).with_context(|| format!("writing cache to {}", path.display()))?;
        Ok(())
    }

    /// All raw records, keyed by place identifier.
    pub fn snapshot(&self) -> &BTreeMap<String, RawRecord> {
        &self.records
    }

    /// Markers in stable (identifier) order.
    pub fn markers(&self) -> impl Iterator<Item = &Marker> {
        self.markers.values()
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Geometry, LatLng};

    fn record(place_id: &str, rating: f64, user_ratings_total: u32) -> RawRecord {
        RawRecord {
            place_id: place_id.into(),
            name: format!("Place {place_id}"),
            rating: Some(rating),
            user_ratings_total: Some(user_ratings_total),
            types: vec!["restaurant".into()],
            vicinity: Some("somewhere".into()),
            price_level: None,
            geometry: Geometry {
                location: LatLng { lat: -33.9, lng: 151.1 },
                extra: Default::default(),
            },
            extra: Default::default(),
        }
    }

    fn thresholds() -> Thresholds {
        Thresholds {
            min_rating: 4.4,
            min_user_ratings: 100,
        }
    }

    fn store() -> ResultStore {
        ResultStore::new(thresholds(), StyleCatalog::new())
    }

    #[test]
    fn upsert_reports_new_then_duplicate() {
        let mut store = store();
        assert_eq!(store.upsert(record("a", 4.5, 150)), UpsertOutcome::New);
        assert_eq!(store.upsert(record("a", 4.5, 150)), UpsertOutcome::Duplicate);
        assert_eq!(store.record_count(), 1);
        assert_eq!(store.marker_count(), 1);
    }

    #[test]
    fn upsert_overwrites_and_reclassifies() {
        let mut store = store();
        store.upsert(record("a", 4.5, 150));
        assert_eq!(store.marker_count(), 1);

        // Rating dropped below threshold: marker must disappear.
        store.upsert(record("a", 4.0, 150));
        assert_eq!(store.record_count(), 1);
        assert_eq!(store.marker_count(), 0);

        // And come back when it passes again.
        store.upsert(record("a", 4.9, 150));
        assert_eq!(store.marker_count(), 1);
    }

    #[test]
    fn rejected_records_are_stored_without_markers() {
        let mut store = store();
        store.upsert(record("low", 3.0, 4));
        assert_eq!(store.record_count(), 1);
        assert_eq!(store.marker_count(), 0);
    }

    #[test]
    fn reclassify_all_is_retroactive() {
        let mut store = store();
        store.upsert(record("a", 4.5, 150));
        store.upsert(record("b", 4.0, 150));
        assert_eq!(store.marker_count(), 1);

        // Lower the bar without re-fetching anything.
        store.thresholds = Thresholds {
            min_rating: 3.9,
            min_user_ratings: 100,
        };
        store.reclassify_all();
        assert_eq!(store.marker_count(), 2);
    }

    #[test]
    fn missing_cache_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let (store, outcome) =
            ResultStore::load(&dir.path().join("nope.json"), thresholds(), StyleCatalog::new());
        assert!(matches!(outcome, CacheLoad::Missing));
        assert_eq!(store.record_count(), 0);
    }

    #[test]
    fn corrupt_cache_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("places.json");
        fs::write(&path, "{not json").unwrap();
        let (store, outcome) = ResultStore::load(&path, thresholds(), StyleCatalog::new());
        assert!(matches!(outcome, CacheLoad::Unreadable(_)));
        assert_eq!(store.record_count(), 0);
    }

    #[test]
    fn save_then_load_round_trips_records_and_markers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("places.json");

        let mut store = store();
        store.upsert(record("a", 4.5, 150));
        store.upsert(record("b", 2.0, 3));
        store.save(&path).unwrap();

        let (loaded, outcome) = ResultStore::load(&path, thresholds(), StyleCatalog::new());
        assert!(matches!(outcome, CacheLoad::Loaded(2)));
        assert_eq!(loaded.record_count(), 2);
        // Markers were backfilled from the cached records.
        assert_eq!(loaded.marker_count(), 1);
        assert_eq!(
            loaded.snapshot().get("a").unwrap().rating,
            store.snapshot().get("a").unwrap().rating
        );
    }

    #[test]
    fn loading_with_lower_thresholds_admits_cached_rejects() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("places.json");

        let mut store = store();
        store.upsert(record("borderline", 4.0, 150));
        assert_eq!(store.marker_count(), 0);
        store.save(&path).unwrap();

        let relaxed = Thresholds {
            min_rating: 3.9,
            min_user_ratings: 100,
        };
        let (loaded, _) = ResultStore::load(&path, relaxed, StyleCatalog::new());
        assert_eq!(loaded.marker_count(), 1);
    }
}
