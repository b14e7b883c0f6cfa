//! Flattened technology-per-row view of the catalog, one string cell per
//! revision, with evolution links resolved one level deep.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::revision::{module_for_category, Category, RevisionKey, REVISION_ORDER};
use crate::store::technology::{TechnologyRecord, TechnologyStore};

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct RowRevisions {
    pub rev1: String,
    pub rev2: String,
    pub rev3: String,
    pub rev4: String,
    pub rev5: String,
}

impl RowRevisions {
    fn set(&mut self, key: RevisionKey, value: String) {
        match key {
            RevisionKey::Rev1 => self.rev1 = value,
            RevisionKey::Rev2 => self.rev2 = value,
            RevisionKey::Rev3 => self.rev3 = value,
            RevisionKey::Rev4 => self.rev4 = value,
            RevisionKey::Rev5 => self.rev5 = value,
        }
    }

    pub fn get(&self, key: RevisionKey) -> &str {
        match key {
            RevisionKey::Rev1 => &self.rev1,
            RevisionKey::Rev2 => &self.rev2,
            RevisionKey::Rev3 => &self.rev3,
            RevisionKey::Rev4 => &self.rev4,
            RevisionKey::Rev5 => &self.rev5,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnologyRow {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub module: String,
    pub applicable_modules: Vec<String>,
    pub revisions: RowRevisions,
    pub predecessors: Vec<String>,
    pub successors: Vec<String>,
}

fn base_row(tech: &TechnologyRecord, module: &str) -> TechnologyRow {
    let applicable_modules = if tech.applicable_modules.is_empty() {
        vec![module.to_string()]
    } else {
        tech.applicable_modules.clone()
    };
    TechnologyRow {
        id: tech.id.clone(),
        name: tech.name.clone(),
        category: tech.category,
        module: module.to_string(),
        applicable_modules,
        revisions: RowRevisions::default(),
        predecessors: tech.predecessors().to_vec(),
        successors: tech.successors().to_vec(),
    }
}

/// Builds the per-technology rows. With a module filter this is the
/// revision-blind list the UI shows when a matrix row is clicked; without
/// one it is the full evolution view.
pub fn build_rows(store: &TechnologyStore, module_filter: Option<&str>) -> Vec<TechnologyRow> {
    build_rows_at(store, module_filter, current_year())
}

pub fn current_year() -> i32 {
    time::OffsetDateTime::now_utc().year()
}

pub fn build_rows_at(
    store: &TechnologyStore,
    module_filter: Option<&str>,
    current_year: i32,
) -> Vec<TechnologyRow> {
    if let Some(filter) = module_filter {
        return store
            .all()
            .iter()
            .filter(|tech| {
                module_for_category(tech.category) == filter
                    || tech.applicable_modules.iter().any(|m| m == filter)
            })
            .map(|tech| base_row(tech, module_for_category(tech.category)))
            .collect();
    }

    // Group by canonical module, preserving first-seen module order.
    let mut groups: Vec<(&'static str, Vec<&TechnologyRecord>)> = Vec::new();
    for tech in store.all() {
        let module = module_for_category(tech.category);
        match groups.iter_mut().find(|(name, _)| *name == module) {
            Some((_, members)) => members.push(tech),
            None => groups.push((module, vec![tech])),
        }
    }

    let mut rows = Vec::new();
    let mut processed: HashSet<String> = HashSet::new();

    for (module, mut members) in groups {
        members.sort_by_key(|tech| tech.periods.start);

        for tech in members {
            if processed.contains(&tech.id) {
                continue;
            }
            let mut row = base_row(tech, module);
            let start_revision = tech.start_revision();
            let end_year = tech.periods.end.unwrap_or(current_year);

            for key in REVISION_ORDER {
                let (lo, hi) = key.years();
                if tech.periods.start > hi || end_year < lo {
                    continue;
                }
                if key == start_revision {
                    row.revisions.set(key, tech.name.clone());
                } else if key.index() > start_revision.index() {
                    // Continuation, or the hand-off to the successors.
                    let label = if tech.successors().is_empty() {
                        tech.name.clone()
                    } else {
                        format!("{} → {}", tech.name, tech.successors().join(", "))
                    };
                    row.revisions.set(key, label);
                }
            }

            rows.push(row);
            processed.insert(tech.id.clone());

            // One level of traversal: resolved successors get their own row
            // directly below the parent.
            for link in tech.successors() {
                let Some(successor) = store.resolve_link(link) else {
                    continue;
                };
                if processed.contains(&successor.id) {
                    continue;
                }
                let mut successor_row = base_row(successor, module);
                if successor_row.predecessors.is_empty() {
                    successor_row.predecessors = vec![tech.id.clone()];
                }
                successor_row
                    .revisions
                    .set(successor.start_revision(), successor.name.clone());
                rows.push(successor_row);
                processed.insert(successor.id.clone());
            }
        }
    }

    rows
}
