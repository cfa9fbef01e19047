//! Derived view model for list pages.
//!
//! A [`ListView`] owns the raw collection, the filter criteria and the sort
//! configuration of one page, and derives the rows to render plus the
//! summary counts. The derived snapshot is memoised: it is only rebuilt when
//! one of the three inputs changes.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::filter::{self, FilterCriteria, Filterable};
use crate::models::Staged;
use crate::sort::{self, SortConfig, Sortable};

/// Stage counts for a list page.
///
/// `total` and `by_stage` describe the unfiltered collection; the
/// `filtered*` fields back the "N of M" wording.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub filtered: usize,
    pub by_stage: BTreeMap<&'static str, usize>,
    pub filtered_by_stage: BTreeMap<&'static str, usize>,
}

impl Summary {
    /// Unfiltered count for one stage label.
    pub fn stage_count(&self, label: &str) -> usize {
        self.by_stage.get(label).copied().unwrap_or(0)
    }

    /// Filtered count for one stage label.
    pub fn filtered_stage_count(&self, label: &str) -> usize {
        self.filtered_by_stage.get(label).copied().unwrap_or(0)
    }

    /// "Showing N of M" line.
    pub fn showing(&self, noun: &str) -> String {
        format!("Showing {} of {} {}", self.filtered, self.total, noun)
    }
}

/// Output of one derivation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewSnapshot<T> {
    pub rows: Vec<T>,
    pub summary: Summary,
}


/// Sequence number handed out by [`ListView::begin_load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadTicket(u64);

impl LoadTicket {
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

struct Memo<T: Sortable> {
    source: Arc<Vec<T>>,
    criteria: FilterCriteria,
    sort: SortConfig<T::Field>,
    snapshot: Arc<ViewSnapshot<T>>,
}

/// Filtered, sorted and summarised view over one entity collection.
pub struct ListView<T: Sortable> {
    source: Arc<Vec<T>>,
    criteria: FilterCriteria,
    sort: SortConfig<T::Field>,
    memo: Option<Memo<T>>,
    latest_ticket: u64,
    recomputations: u64,
}

impl<T> ListView<T>
where
    T: Filterable + Sortable + Staged + Clone,
{
    /// Empty view sorted by `sort`.
    pub fn new(sort: SortConfig<T::Field>) -> Self {
        Self {
            source: Arc::new(Vec::new()),
            criteria: FilterCriteria::new(),
            sort,
            memo: None,
            latest_ticket: 0,
            recomputations: 0,
        }
    }

    /// View over an already-loaded collection.
    pub fn with_records(records: Vec<T>, sort: SortConfig<T::Field>) -> Self {
        let mut view = Self::new(sort);
        view.source = Arc::new(records);
        view
    }

    pub fn records(&self) -> &Arc<Vec<T>> {
        &self.source
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn sort_config(&self) -> &SortConfig<T::Field> {
        &self.sort
    }

    /// Replace the collection outright.
    pub fn set_records(&mut self, records: Vec<T>) {
        self.source = Arc::new(records);
    }

    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
    }

    /// Mutable access for field-by-field edits and "clear filters".
    pub fn criteria_mut(&mut self) -> &mut FilterCriteria {
        &mut self.criteria
    }

    pub fn set_sort(&mut self, sort: SortConfig<T::Field>) {
        self.sort = sort;
    }

    /// Column-header click.
    pub fn toggle_sort(&mut self, field: T::Field) {
        self.sort.toggle(field);
    }

    /// Start a reload; only the most recent ticket may install its result.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.latest_ticket += 1;
        LoadTicket(self.latest_ticket)
    }

    /// Install the records of a finished load.
    ///
    /// Returns `false` and drops `records` when a newer load was started
    /// after `ticket` was issued.
    pub fn finish_load(&mut self, ticket: LoadTicket, records: Vec<T>) -> bool {
        if ticket.0 != self.latest_ticket {
            tracing::debug!(
                ticket = ticket.0,
                latest = self.latest_ticket,
                "Discarding stale list load"
            );
            return false;
        }
        self.set_records(records);
        true
    }

    /// Number of times the snapshot has been rebuilt.
    pub fn recompute_count(&self) -> u64 {
        self.recomputations
    }

    /// Current rows and summary, rebuilt only if an input changed.
    pub fn snapshot(&mut self) -> Arc<ViewSnapshot<T>> {
        if let Some(memo) = &self.memo {
            if Arc::ptr_eq(&memo.source, &self.source)
                && memo.criteria == self.criteria
                && memo.sort == self.sort
            {
                return Arc::clone(&memo.snapshot);
            }
        }

        let snapshot = Arc::new(derive(&self.source, &self.criteria, &self.sort));
        self.recomputations += 1;
        tracing::debug!(
            total = snapshot.summary.total,
            filtered = snapshot.summary.filtered,
            "Recomputed list view"
        );

        self.memo = Some(Memo {
            source: Arc::clone(&self.source),
            criteria: self.criteria.clone(),
            sort: self.sort,
            snapshot: Arc::clone(&snapshot),
        });
        snapshot
    }
}

/// One-shot derivation without memoisation.
pub fn derive<T>(records: &[T], criteria: &FilterCriteria, sort: &SortConfig<T::Field>) -> ViewSnapshot<T>
where
    T: Filterable + Sortable + Staged + Clone,
{
    let mut by_stage = BTreeMap::new();
    for record in records {
        *by_stage.entry(record.stage_label()).or_insert(0) += 1;
    }

    let mut rows: Vec<T> = filter::apply(records, criteria).into_iter().cloned().collect();
    sort::sort_entities(&mut rows, sort);

    let mut filtered_by_stage = BTreeMap::new();
    for row in &rows {
        *filtered_by_stage.entry(row.stage_label()).or_insert(0) += 1;
    }

    ViewSnapshot {
        summary: Summary {
            total: records.len(),
            filtered: rows.len(),
            by_stage,
            filtered_by_stage,
        },
        rows,
    }
}
