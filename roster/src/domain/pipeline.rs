//! Filtering, sorting, and grouping of record collections for display.
//!
//! Every stage borrows its input and returns a new ordered sequence of
//! references; the collection itself is never reordered or modified.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use time::Date;

use super::models::{Npm, Priority, ProgrammerProfile, StandbyAssignment, Status, Task};
use super::CalendarWindow;

/// Label for records whose grouping field is missing or blank.
pub const DEFAULT_GROUP: &str = "General";

/// A record with a calendar date.
pub trait Dated {
    fn date(&self) -> Option<Date>;
}

/// A record that can go through the tab/sort/group pipeline.
pub trait Tracked: Dated {
    fn status(&self) -> Status;
    fn priority(&self) -> Priority;
    fn group_key(&self) -> Option<&str>;
}

impl Dated for Task {
    fn date(&self) -> Option<Date> {
        self.due_date
    }
}

impl Tracked for Task {
    fn status(&self) -> Status {
        self.status
    }

    fn priority(&self) -> Priority {
        self.priority
    }

    fn group_key(&self) -> Option<&str> {
        self.section.as_deref()
    }
}

impl Dated for StandbyAssignment {
    fn date(&self) -> Option<Date> {
        Some(self.date)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TabFilter {
    #[default]
    All,
    /// Everything that is not done yet.
    InProgress,
    Done,
}

impl TabFilter {
    pub fn matches(self, status: Status) -> bool {
        match self {
            Self::All => true,
            Self::InProgress => !status.is_done(),
            Self::Done => status.is_done(),
        }
    }
}

impl FromStr for TabFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "all" => Ok(Self::All),
            "inprogress" | "open" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            other => Err(format!("unknown tab '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Keep the order the store returned.
    #[default]
    None,
    Priority,
    Deadline,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "default" => Ok(Self::None),
            "priority" => Ok(Self::Priority),
            "deadline" | "due" => Ok(Self::Deadline),
            other => Err(format!("unknown sort order '{other}'")),
        }
    }
}

/// One display group and its records, in pipeline order.
#[derive(Debug)]
pub struct RecordGroup<'a, R> {
    pub label: String,
    pub records: Vec<&'a R>,
}

impl<R> RecordGroup<'_, R> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

pub fn filter_tab<'a, R: Tracked>(records: &'a [R], tab: TabFilter) -> Vec<&'a R> {
    records.iter().filter(|r| tab.matches(r.status())).collect()
}

/// Sorts references; both keyed sorts are stable.
pub fn sort_records<R: Tracked>(mut records: Vec<&R>, order: SortOrder) -> Vec<&R> {
    match order {
        SortOrder::None => {}
        SortOrder::Priority => records.sort_by_key(|r| r.priority().rank()),
        // `None < Some(_)`: undated records come first.
        SortOrder::Deadline => records.sort_by_key(|r| r.date()),
    }
    records
}

/// Partitions records by their grouping label.
///
/// Groups are ordered by label ignoring case; labels equal up to case stay in byte order.
pub fn group_records<'a, R: Tracked>(records: Vec<&'a R>) -> Vec<RecordGroup<'a, R>> {
    let mut groups: BTreeMap<String, Vec<&'a R>> = BTreeMap::new();
    for record in records {
        let label = record
            .group_key()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .unwrap_or(DEFAULT_GROUP);
        groups.entry(label.to_string()).or_default().push(record);
    }

    let mut groups: Vec<RecordGroup<'a, R>> = groups
        .into_iter()
        .map(|(label, records)| RecordGroup { label, records })
        .collect();
    groups.sort_by_cached_key(|group| group.label.to_lowercase());
    groups
}

/// Keeps records dated inside the window (inclusive on both ends).
pub fn within_window<'a, R: Dated>(records: &'a [R], window: &CalendarWindow) -> Vec<&'a R> {
    records
        .iter()
        .filter(|r| r.date().is_some_and(|date| window.contains(date)))
        .collect()
}

/// Tab, sort, and grouping settings for a task list.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordView {
    pub tab: TabFilter,
    pub sort: SortOrder,
}

impl RecordView {
    pub fn new(tab: TabFilter, sort: SortOrder) -> Self {
        Self { tab, sort }
    }

    pub fn apply<'a, R: Tracked>(&self, records: &'a [R]) -> Vec<RecordGroup<'a, R>> {
        let filtered = filter_tab(records, self.tab);
        let sorted = sort_records(filtered, self.sort);
        group_records(sorted)
    }
}

/// Distinct, non-blank specialties in ascending order, for the filter picker.
pub fn specialty_options(programmers: &[ProgrammerProfile]) -> Vec<String> {
    programmers
        .iter()
        .filter_map(|p| p.specialty.as_deref())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Looks up programmer names for schedule rows.
#[derive(Debug, Clone, Default)]
pub struct ProgrammerNames {
    names: BTreeMap<Npm, String>,
}

impl ProgrammerNames {
    pub fn new(programmers: &[ProgrammerProfile]) -> Self {
        Self {
            names: programmers
                .iter()
                .map(|p| (p.npm, p.name.clone()))
                .collect(),
        }
    }

    /// The programmer's name, or `#<npm>` when unknown.
    pub fn name_of(&self, npm: Npm) -> String {
        self.names
            .get(&npm)
            .cloned()
            .unwrap_or_else(|| format!("#{npm}"))
    }
}
