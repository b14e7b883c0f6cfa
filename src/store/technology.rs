use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::revision::{classify_year, Category, RevisionKey};

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct Periods {
    pub start: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peak: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decline: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<i32>,
}

impl Periods {
    /// `start <= peak <= decline <= end` over whichever years are present.
    fn is_ordered(&self) -> bool {
        let mut last = self.start;
        for year in [self.peak, self.decline, self.end].into_iter().flatten() {
            if year < last {
                return false;
            }
            last = year;
        }
        true
    }
}

/// Evolution links reference other technologies by id or by display name.
/// Resolution happens in [`TechnologyStore::resolve_link`], never here.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Evolution {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub predecessors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub successors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnologyRecord {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub description: String,
    pub category: Category,
    pub periods: Periods,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evolution: Option<Evolution>,
    pub applicable_modules: Vec<String>,
    pub advantages: Vec<String>,
    pub disadvantages: Vec<String>,
    pub use_cases: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
}

impl TechnologyRecord {
    /// A technology is bucketed by the year it was most prominent, not the
    /// year it first appeared.
    pub fn classification_year(&self) -> i32 {
        self.periods.peak.unwrap_or(self.periods.start)
    }

    pub fn start_revision(&self) -> RevisionKey {
        classify_year(self.classification_year())
    }

    pub fn predecessors(&self) -> &[String] {
        self.evolution
            .as_ref()
            .map(|e| e.predecessors.as_slice())
            .unwrap_or(&[])
    }

    pub fn successors(&self) -> &[String] {
        self.evolution
            .as_ref()
            .map(|e| e.successors.as_slice())
            .unwrap_or(&[])
    }
}

static TECHNOLOGIES_JSON: &str = include_str!("../../data/technologies.json");

/// Read-only catalog of technology descriptors. The single source of truth
/// for which technologies exist.
#[derive(Clone, Debug)]
pub struct TechnologyStore {
    records: Vec<TechnologyRecord>,
}

impl TechnologyStore {
    pub fn seed() -> Result<Self> {
        let records: Vec<TechnologyRecord> =
            serde_json::from_str(TECHNOLOGIES_JSON).context("technology catalog is malformed")?;
        Ok(Self::from_records(records))
    }

    pub fn from_records(records: Vec<TechnologyRecord>) -> Self {
        for record in &records {
            if !record.periods.is_ordered() {
                warn!(
                    "technology {} has out-of-order periods, classification uses peak/start as-is",
                    record.id
                );
            }
        }
        Self { records }
    }

    pub fn all(&self) -> &[TechnologyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn by_id(&self, id: &str) -> Option<&TechnologyRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Resolves an evolution link to a record. The source data references
    /// technologies sometimes by id and sometimes by display name, so
    /// resolution is three-tier with a fixed order: exact id, exact name,
    /// then case-insensitive reciprocal substring. First match wins; no
    /// match leaves the link as a raw label for the caller.
    pub fn resolve_link(&self, link: &str) -> Option<&TechnologyRecord> {
        if let Some(record) = self.records.iter().find(|r| r.id == link) {
            return Some(record);
        }
        if let Some(record) = self.records.iter().find(|r| r.name == link) {
            return Some(record);
        }
        let needle = link.to_lowercase();
        self.records.iter().find(|r| {
            let name = r.name.to_lowercase();
            name.contains(&needle) || needle.contains(&name)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, name: &str) -> TechnologyRecord {
        TechnologyRecord {
            id: id.to_string(),
            name: name.to_string(),
            full_name: None,
            description: String::new(),
            category: Category::Ml,
            periods: Periods {
                start: 2010,
                peak: None,
                decline: None,
                end: None,
            },
            evolution: None,
            applicable_modules: vec![],
            advantages: vec![],
            disadvantages: vec![],
            use_cases: vec![],
            sources: vec![],
        }
    }

    #[test]
    fn seed_catalog_loads() {
        let store = TechnologyStore::seed().unwrap();
        assert!(!store.is_empty());
        assert!(store.by_id("random-forest").is_some());
    }

    #[test]
    fn resolve_link_prefers_id() {
        // A record whose name collides with another record's id.
        let store = TechnologyStore::from_records(vec![
            record("lstm", "LSTM"),
            record("other", "lstm"),
        ]);
        assert_eq!(store.resolve_link("lstm").unwrap().id, "lstm");
    }

    #[test]
    fn resolve_link_falls_back_to_exact_name() {
        let store =
            TechnologyStore::from_records(vec![record("rf", "Random Forest"), record("et", "Extra Trees")]);
        assert_eq!(store.resolve_link("Random Forest").unwrap().id, "rf");
    }

    #[test]
    fn resolve_link_falls_back_to_substring_both_ways() {
        let store = TechnologyStore::from_records(vec![record("rf", "Random Forest")]);
        // Link is a substring of the name.
        assert_eq!(store.resolve_link("random forest").unwrap().id, "rf");
        // Name is a substring of the link.
        assert_eq!(
            store.resolve_link("Random Forest Classifier").unwrap().id,
            "rf"
        );
    }

    #[test]
    fn resolve_link_returns_none_for_strangers() {
        let store = TechnologyStore::from_records(vec![record("rf", "Random Forest")]);
        assert!(store.resolve_link("xgboost").is_none());
    }

    #[test]
    fn classification_prefers_peak_year() {
        let mut tech = record("rf", "Random Forest");
        tech.periods = Periods {
            start: 2001,
            peak: Some(2015),
            decline: None,
            end: None,
        };
        assert_eq!(tech.classification_year(), 2015);
        assert_eq!(tech.start_revision(), RevisionKey::Rev1);
    }
}
