//! Derivation of the three matrix views: baseline, integrated and dynamic.
//!
//! Cell contents are held internally as an ordered list of labels and only
//! joined to the display string at the serialization boundary. The external
//! shape (comma-joined `tech` text, substring-containment dedup) matches what
//! the UI has always consumed.

use std::collections::{HashMap, HashSet};

use log::warn;

use crate::revision::{
    classify_period_str, module_for_category, module_order_index, RevisionKey, REVISION_ORDER,
};
use crate::store::baseline::{
    baseline, ModuleData, ModuleRevisions, PeriodTag, RevisionData,
};
use crate::store::cases::CaseRecord;
use crate::store::technology::TechnologyStore;

/// One working slot of the matrix under assembly.
#[derive(Clone, Debug)]
struct Cell {
    parts: Vec<String>,
    period: PeriodTag,
    desc: String,
}

impl Cell {
    fn from_revision(data: &RevisionData) -> Self {
        let parts = if data.tech.is_empty() {
            vec![]
        } else {
            vec![data.tech.clone()]
        };
        Self {
            parts,
            period: data.period,
            desc: data.desc.clone(),
        }
    }

    fn blank() -> Self {
        Self {
            parts: vec![],
            period: PeriodTag::Empty,
            desc: String::new(),
        }
    }

    fn joined(&self) -> String {
        self.parts.join(", ")
    }

    fn contains_label(&self, label: &str) -> bool {
        self.joined().to_lowercase().contains(&label.to_lowercase())
    }

    /// Appends a label unless it is already substring-present. Idempotent.
    fn push_label(&mut self, label: &str) {
        if !self.contains_label(label) {
            self.parts.push(label.to_string());
        }
    }

    /// Marks the cell description with the contributing case, once.
    fn note_case(&mut self, case_name: &str) {
        let suffix = format!("(из кейса \"{case_name}\")");
        if self.desc.contains(&suffix) {
            return;
        }
        if self.desc.is_empty() {
            self.desc = suffix;
        } else {
            self.desc = format!("{} {}", self.desc, suffix);
        }
    }

    fn render(&self, key: RevisionKey) -> RevisionData {
        let tech = self.joined();
        let period = if tech.is_empty() {
            PeriodTag::Empty
        } else if self.period == PeriodTag::Empty {
            // A baseline-empty slot that gained content takes its column's tag.
            PeriodTag::for_revision(key)
        } else {
            self.period
        };
        RevisionData {
            tech,
            period,
            desc: self.desc.clone(),
        }
    }
}

#[derive(Clone, Debug)]
struct WorkingRow {
    name: String,
    cells: [Cell; 5],
}

impl WorkingRow {
    fn from_module(module: &ModuleData) -> Self {
        Self {
            name: module.name.clone(),
            cells: REVISION_ORDER.map(|key| Cell::from_revision(module.revisions.get(key))),
        }
    }

    fn blank(name: &str) -> Self {
        Self {
            name: name.to_string(),
            cells: REVISION_ORDER.map(|_| Cell::blank()),
        }
    }

    fn cell_mut(&mut self, key: RevisionKey) -> &mut Cell {
        &mut self.cells[key.index()]
    }

    fn render(&self) -> ModuleData {
        ModuleData {
            name: self.name.clone(),
            revisions: ModuleRevisions {
                rev1: self.cells[0].render(RevisionKey::Rev1),
                rev2: self.cells[1].render(RevisionKey::Rev2),
                rev3: self.cells[2].render(RevisionKey::Rev3),
                rev4: self.cells[3].render(RevisionKey::Rev4),
                rev5: self.cells[4].render(RevisionKey::Rev5),
            },
        }
    }
}

struct WorkingMatrix {
    rows: Vec<WorkingRow>,
}

impl WorkingMatrix {
    fn from_baseline() -> Self {
        Self {
            rows: baseline().iter().map(WorkingRow::from_module).collect(),
        }
    }

    /// Row for a module, created blank on demand. This is how the ninth
    /// Инфраструктура row appears when infrastructure technologies fold in.
    fn row_mut(&mut self, module: &str) -> &mut WorkingRow {
        if let Some(pos) = self.rows.iter().position(|r| r.name == module) {
            return &mut self.rows[pos];
        }
        self.rows.push(WorkingRow::blank(module));
        self.rows.last_mut().unwrap()
    }

    fn render(&self) -> Vec<ModuleData> {
        self.rows.iter().map(WorkingRow::render).collect()
    }
}

/// The hand-authored matrix, unchanged.
pub fn baseline_matrix() -> Vec<ModuleData> {
    baseline()
}

/// Baseline enriched with every catalogued technology and every case. Starts
/// from a fresh copy of the baseline on each call, so repeated assembly never
/// accumulates.
pub fn integrated_matrix(store: &TechnologyStore, cases: &[CaseRecord]) -> Vec<ModuleData> {
    let mut matrix = WorkingMatrix::from_baseline();

    for tech in store.all() {
        let revision = tech.start_revision();
        let module = module_for_category(tech.category);
        matrix.row_mut(module).cell_mut(revision).push_label(&tech.name);
    }

    for case in cases {
        let revision = match classify_period_str(&case.period) {
            Ok(revision) => revision,
            Err(e) => {
                // Partial-failure isolation: one bad record must not blank
                // the whole matrix.
                warn!("skipping case {} in integrated matrix: {}", case.id, e);
                continue;
            }
        };
        for (module, labels) in case.modules.by_matrix_module() {
            if labels.is_empty() {
                continue;
            }
            let cell = matrix.row_mut(module).cell_mut(revision);
            for label in labels {
                cell.push_label(label);
            }
            cell.note_case(&case.name);
        }
    }

    matrix.render()
}

struct DynamicEntry {
    name: String,
    module: &'static str,
    start: RevisionKey,
    successors: Vec<String>,
    predecessors: Vec<String>,
    desc: String,
}

/// One matrix row per distinct technology name, drawn from the catalog and
/// from case tech labels. The catalog writes first; a case label that matches
/// an already-known name exactly does not overwrite it.
pub fn dynamic_matrix(store: &TechnologyStore, cases: &[CaseRecord]) -> Vec<ModuleData> {
    let mut entries: Vec<DynamicEntry> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for tech in store.all() {
        if !seen.insert(tech.name.clone()) {
            continue;
        }
        entries.push(DynamicEntry {
            name: tech.name.clone(),
            module: module_for_category(tech.category),
            start: tech.start_revision(),
            successors: tech.successors().to_vec(),
            predecessors: tech.predecessors().to_vec(),
            desc: tech.description.clone(),
        });
    }

    for case in cases {
        let revision = match classify_period_str(&case.period) {
            Ok(revision) => revision,
            Err(e) => {
                warn!("skipping case {} in dynamic matrix: {}", case.id, e);
                continue;
            }
        };
        for (module, labels) in case.modules.by_matrix_module() {
            for label in labels {
                if !seen.insert(label.clone()) {
                    continue;
                }
                entries.push(DynamicEntry {
                    name: label.clone(),
                    module,
                    start: revision,
                    successors: vec![],
                    predecessors: vec![],
                    desc: format!("Из кейса \"{}\"", case.name),
                });
            }
        }
    }

    // Parent rows sort ahead of their children within a module; everything
    // else is alphabetical.
    let index_of: HashMap<&str, usize> = entries
        .iter()
        .enumerate()
        .map(|(idx, e)| (e.name.as_str(), idx))
        .collect();
    let parent_of: Vec<Option<usize>> = entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            entry
                .predecessors
                .iter()
                .find_map(|link| {
                    store
                        .resolve_link(link)
                        .and_then(|p| index_of.get(p.name.as_str()).copied())
                })
                .filter(|&parent| parent != idx)
        })
        .collect();

    let mut keyed: Vec<(usize, String, u8, usize)> = entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let (family, depth) = family_of(idx, &parent_of, &entries);
            (module_order_index(entry.module), family, depth, idx)
        })
        .collect();
    keyed.sort_by(|a, b| {
        (a.0, &a.1, a.2, &entries[a.3].name).cmp(&(b.0, &b.1, b.2, &entries[b.3].name))
    });

    keyed
        .into_iter()
        .map(|(_, _, _, idx)| render_dynamic_row(&entries[idx]))
        .collect()
}

/// Ordering key for a dynamic row: the root of its predecessor chain among
/// the collected rows, plus its depth below that root. Sorting by
/// (family, depth) puts every ancestor ahead of its descendants.
fn family_of(idx: usize, parent_of: &[Option<usize>], entries: &[DynamicEntry]) -> (String, u8) {
    let mut current = idx;
    let mut depth: u8 = 0;
    let mut visited: HashSet<usize> = HashSet::new();
    visited.insert(current);

    while let Some(parent) = parent_of[current] {
        // Cycle guard for mutually-referencing lineage data.
        if !visited.insert(parent) {
            break;
        }
        current = parent;
        depth += 1;
    }
    (entries[current].name.clone(), depth)
}

fn render_dynamic_row(entry: &DynamicEntry) -> ModuleData {
    let marker = if entry.predecessors.is_empty() {
        ""
    } else {
        "↳ "
    };
    let mut row = WorkingRow::blank(&format!("{}{}: {}", marker, entry.module, entry.name));

    let start = entry.start;
    let start_cell = row.cell_mut(start);
    start_cell.parts.push(entry.name.clone());
    start_cell.period = PeriodTag::for_revision(start);
    start_cell.desc = entry.desc.clone();

    if let Some(next) = start.next() {
        let tech = if entry.successors.is_empty() {
            // Continued use.
            entry.name.clone()
        } else {
            format!("{} → {}", entry.name, entry.successors.join(", "))
        };
        let cell = row.cell_mut(next);
        cell.parts.push(tech);
        cell.period = PeriodTag::for_revision(next);
    }

    row.render()
}
