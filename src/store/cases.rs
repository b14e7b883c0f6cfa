use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};

use crate::revision::{module_names, Category};

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StackEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub purpose: String,
    pub category: Category,
}

/// Per-module technology labels of one case. All eight keys are always
/// present; an empty list means the case does not cover that module.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CaseModules {
    pub data_collection: Vec<String>,
    pub data_processing: Vec<String>,
    pub feature_engineering: Vec<String>,
    pub signal_generation: Vec<String>,
    pub risk_management: Vec<String>,
    pub execution: Vec<String>,
    pub market_adaptation: Vec<String>,
    pub visualization: Vec<String>,
}

impl CaseModules {
    /// Labels keyed by the canonical matrix row each case module feeds.
    pub fn by_matrix_module(&self) -> [(&'static str, &[String]); 8] {
        [
            (module_names::DATA_COLLECTION, self.data_collection.as_slice()),
            (module_names::DATA_PROCESSING, self.data_processing.as_slice()),
            (
                module_names::FEATURE_ENGINEERING,
                self.feature_engineering.as_slice(),
            ),
            (
                module_names::SIGNAL_GENERATION,
                self.signal_generation.as_slice(),
            ),
            (module_names::RISK_MANAGEMENT, self.risk_management.as_slice()),
            (module_names::EXECUTION, self.execution.as_slice()),
            (
                module_names::MARKET_ADAPTATION,
                self.market_adaptation.as_slice(),
            ),
            (module_names::VISUALIZATION, self.visualization.as_slice()),
        ]
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Performance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recall: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub f1_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sharpe_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_drawdown: Option<f64>,
}

/// An end-to-end trading-machine case study.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseRecord {
    pub id: String,
    pub name: String,
    pub period: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub description: String,
    pub strategy: String,
    pub timeframe: String,
    pub market_type: String,
    pub technologies: Vec<StackEntry>,
    pub modules: CaseModules,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance: Option<Performance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_example: Option<String>,
    #[serde(default)]
    pub advantages: Vec<String>,
    #[serde(default)]
    pub disadvantages: Vec<String>,
}

#[derive(Debug, Display, Error)]
pub enum CaseFileError {
    #[display(fmt = "imported case file does not match the case schema: {}", _0)]
    Schema(#[error(not(source))] String),
    #[display(fmt = "imported case file is unreadable: {}", _0)]
    Io(#[error(not(source))] String),
}

static CASES_JSON: &str = include_str!("../../data/trading_machines.json");

/// Case catalog: a static seed set plus an append-only file of imported
/// cases. The file is the only mutable state in the process; writers are
/// serialized by the HTTP layer's state lock, cross-process writers are not.
#[derive(Clone, Debug)]
pub struct CaseStore {
    seed: Vec<CaseRecord>,
    imports_path: PathBuf,
}

impl CaseStore {
    pub fn seed(imports_path: impl Into<PathBuf>) -> Result<Self> {
        let seed: Vec<CaseRecord> =
            serde_json::from_str(CASES_JSON).context("case catalog is malformed")?;
        Ok(Self {
            seed,
            imports_path: imports_path.into(),
        })
    }

    pub fn seed_records(&self) -> &[CaseRecord] {
        &self.seed
    }

    pub fn imports_path(&self) -> &Path {
        &self.imports_path
    }

    /// Every case: the static seed followed by the imported list. The file is
    /// re-validated against the schema on every read.
    pub fn all(&self) -> Result<Vec<CaseRecord>, CaseFileError> {
        let mut cases = self.seed.clone();
        cases.extend(self.read_imports()?);
        Ok(cases)
    }

    /// Appends a validated case to the imported-cases file and returns it.
    /// Read-modify-write with no cross-process locking; single-writer use is
    /// assumed.
    pub fn append_import(&self, case: CaseRecord) -> Result<CaseRecord, CaseFileError> {
        let mut imported = self.read_imports()?;
        imported.push(case.clone());
        let body = serde_json::to_string_pretty(&imported)
            .map_err(|e| CaseFileError::Schema(e.to_string()))?;
        fs::write(&self.imports_path, body).map_err(|e| CaseFileError::Io(e.to_string()))?;
        Ok(case)
    }

    fn read_imports(&self) -> Result<Vec<CaseRecord>, CaseFileError> {
        if !self.imports_path.exists() {
            // Auto-initialize so a fresh deployment starts with a valid file.
            fs::write(&self.imports_path, "[]").map_err(|e| CaseFileError::Io(e.to_string()))?;
            return Ok(vec![]);
        }
        let body =
            fs::read_to_string(&self.imports_path).map_err(|e| CaseFileError::Io(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| CaseFileError::Schema(e.to_string()))
    }

    /// Unique technology labels across every case's stack and modules, sorted.
    pub fn all_stack_labels(&self) -> Result<Vec<String>, CaseFileError> {
        let mut labels = HashSet::new();
        for case in self.all()? {
            for entry in &case.technologies {
                labels.insert(entry.name.clone());
            }
            for (_, module_labels) in case.modules.by_matrix_module() {
                for label in module_labels {
                    labels.insert(label.clone());
                }
            }
        }
        let mut sorted: Vec<String> = labels.into_iter().collect();
        sorted.sort();
        Ok(sorted)
    }

    /// Cases that mention a technology anywhere, matched case-insensitively.
    pub fn find_by_technology(&self, query: &str) -> Result<Vec<CaseRecord>, CaseFileError> {
        let needle = query.to_lowercase();
        Ok(self
            .all()?
            .into_iter()
            .filter(|case| {
                case.technologies
                    .iter()
                    .any(|t| t.name.to_lowercase().contains(&needle))
                    || case
                        .modules
                        .by_matrix_module()
                        .iter()
                        .any(|(_, labels)| labels.iter().any(|l| l.to_lowercase().contains(&needle)))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(tag: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("tessera-cases-{}-{}.json", tag, std::process::id()));
        let _ = fs::remove_file(&path);
        path
    }

    #[test]
    fn seed_catalog_loads() {
        let store = CaseStore::seed(scratch_path("seed")).unwrap();
        assert_eq!(store.seed_records().len(), 2);
        assert_eq!(store.seed_records()[0].id, "random-forest-scalper-2015");
    }

    #[test]
    fn missing_imports_file_is_initialized_empty() {
        let path = scratch_path("init");
        let store = CaseStore::seed(&path).unwrap();
        let all = store.all().unwrap();
        assert_eq!(all.len(), store.seed_records().len());
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn append_import_round_trips() {
        let path = scratch_path("append");
        let store = CaseStore::seed(&path).unwrap();
        let mut case = store.seed_records()[0].clone();
        case.id = "imported-1".to_string();
        store.append_import(case).unwrap();
        let all = store.all().unwrap();
        assert!(all.iter().any(|c| c.id == "imported-1"));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn corrupt_imports_file_is_a_schema_error() {
        let path = scratch_path("corrupt");
        fs::write(&path, "{\"not\": \"a list\"}").unwrap();
        let store = CaseStore::seed(&path).unwrap();
        assert!(matches!(store.all(), Err(CaseFileError::Schema(_))));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn stack_labels_are_unique_and_sorted() {
        let store = CaseStore::seed(scratch_path("labels")).unwrap();
        let labels = store.all_stack_labels().unwrap();
        assert!(labels.contains(&"CCXT".to_string()));
        let mut sorted = labels.clone();
        sorted.sort();
        assert_eq!(labels, sorted);
    }

    #[test]
    fn find_by_technology_is_case_insensitive() {
        let store = CaseStore::seed(scratch_path("find")).unwrap();
        let hits = store.find_by_technology("randomforest").unwrap();
        assert!(hits.iter().any(|c| c.id == "random-forest-scalper-2015"));
        assert!(store.find_by_technology("no-such-tech").unwrap().is_empty());
    }
}
