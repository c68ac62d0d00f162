use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};

use crate::domain::models::wire::format_date;
use crate::domain::ports::outbound::{RowKey, SelectQuery, Table, TableStore};
use crate::domain::{today, StoreError};

#[derive(Debug, Default)]
struct Tables {
    rows: HashMap<Table, Vec<Value>>,
    fail_next: Option<String>,
    calls: usize,
}

/// Table store kept in process memory, for `--dev` runs and tests.
///
/// Mimics the hosted store closely enough for the services: serial ids,
/// `created_at` stamps, unique keys, ascending order with nulls last.
#[derive(Debug, Default)]
pub struct MemoryTableStore {
    inner: Mutex<Tables>,
}

impl MemoryTableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store with sample programmers, this week's standby, and a few tasks.
    pub fn seeded() -> Self {
        let store = Self::new();
        let day = |offset: i64| {
            today()
                .checked_add(Duration::days(offset))
                .map(format_date)
                .unwrap_or_default()
        };

        store.seed(
            Table::Programmers,
            vec![
                json!({"npm": 5001, "nama": "Ayu Lestari", "no_hp": "081234500001",
                       "bidang": "Backend", "region": "Jakarta"}),
                json!({"npm": 5002, "nama": "Bima Saputra", "no_hp": "081234500002",
                       "bidang": "Mobile", "region": "Bandung"}),
                json!({"npm": 5003, "nama": "Citra Dewi", "no_hp": null,
                       "bidang": "Frontend", "region": "Surabaya"}),
                json!({"npm": 5004, "nama": "Dimas Pratama", "no_hp": "081234500004",
                       "bidang": "Backend", "region": null}),
            ],
        );
        store.seed(
            Table::Standby,
            vec![
                json!({"id": 1, "npm": 5001, "tanggal": day(0),
                       "waktu_mulai": "08:30:00", "waktu_selesai": "15:30:00"}),
                json!({"id": 2, "npm": 5002, "tanggal": day(1),
                       "waktu_mulai": "15:30:00", "waktu_selesai": "22:00:00"}),
                json!({"id": 3, "npm": 5004, "tanggal": day(-2),
                       "waktu_mulai": "22:00:00", "waktu_selesai": "06:00:00"}),
                json!({"id": 4, "npm": 5003, "tanggal": day(9),
                       "waktu_mulai": "08:30:00", "waktu_selesai": "15:30:00"}),
            ],
        );
        store.seed(
            Table::Tasks,
            vec![
                json!({"id": 1, "judul": "Rotate store API key", "tenggat": day(2),
                       "prioritas": "Tinggi", "bagian": "Ops", "status": "todo"}),
                json!({"id": 2, "judul": "Fix standby export", "tenggat": day(-1),
                       "prioritas": "Sedang", "bagian": "Backend", "status": "inprogress"}),
                json!({"id": 3, "judul": "Update onboarding doc", "tenggat": day(5),
                       "prioritas": "Rendah", "bagian": null, "status": "done"}),
                json!({"id": 4, "judul": "Review mobile release", "tenggat": day(3),
                       "prioritas": "Tinggi", "bagian": "Mobile", "status": "todo"}),
            ],
        );
        store
    }

    /// Appends rows as-is. Not counted as a call.
    pub fn seed(&self, table: Table, rows: Vec<Value>) {
        self.lock().rows.entry(table).or_default().extend(rows);
    }

    pub fn rows(&self, table: Table) -> Vec<Value> {
        self.lock().rows.get(&table).cloned().unwrap_or_default()
    }

    /// Makes the next call fail with `message` as the store's rejection.
    pub fn fail_next(&self, message: &str) {
        self.lock().fail_next = Some(message.to_string());
    }

    /// Number of port calls made so far.
    pub fn calls(&self) -> usize {
        self.lock().calls
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn call<T>(
        &self,
        f: impl FnOnce(&mut Tables) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut tables = self.lock();
        tables.calls += 1;
        if let Some(message) = tables.fail_next.take() {
            return Err(StoreError::Rejected(message));
        }
        f(&mut tables)
    }
}

fn matches_key(row: &Value, key: RowKey) -> bool {
    row.get(key.column).and_then(Value::as_i64) == Some(key.value)
}

fn duplicate_key(table: Table) -> StoreError {
    StoreError::Rejected(format!(
        "duplicate key value violates unique constraint \"{table}_pkey\""
    ))
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.to_lowercase()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn matches_query(row: &Value, query: &SelectQuery) -> bool {
    if let Some((column, expected)) = &query.filter {
        if row.get(*column) != Some(expected) {
            return false;
        }
    }
    if let Some(search) = &query.search {
        let needle = search.text.to_lowercase();
        let hit = search.columns.iter().any(|column| {
            row.get(*column)
                .and_then(text_of)
                .is_some_and(|text| text.contains(&needle))
        });
        if !hit {
            return false;
        }
    }
    true
}

/// Ascending, nulls and missing values last.
fn compare_column(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

fn now_stamp() -> Option<String> {
    OffsetDateTime::now_utc().format(&Rfc3339).ok()
}

fn as_object(table: Table, value: Value) -> Result<Map<String, Value>, StoreError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Malformed(format!(
            "{table}: expected an object, got {other}"
        ))),
    }
}

#[async_trait]
impl TableStore for MemoryTableStore {
    async fn select(&self, table: Table, query: &SelectQuery) -> Result<Vec<Value>, StoreError> {
        self.call(|tables| {
            let mut rows: Vec<Value> = tables
                .rows
                .get(&table)
                .map(|rows| {
                    rows.iter()
                        .filter(|row| matches_query(row, query))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();
            if let Some(column) = query.order_by {
                rows.sort_by(|a, b| compare_column(a.get(column), b.get(column)));
            }
            Ok(rows)
        })
    }

    async fn insert(&self, table: Table, row: Value) -> Result<Vec<Value>, StoreError> {
        self.call(|tables| {
            let mut row = as_object(table, row)?;
            let rows = tables.rows.entry(table).or_default();
            let key_column = table.key_column();

            let key = match row.get(key_column).and_then(Value::as_i64) {
                Some(key) => key,
                None if table == Table::Programmers => {
                    return Err(StoreError::Rejected(format!(
                        "null value in column \"{key_column}\" violates not-null constraint"
                    )))
                }
                None => {
                    let next = rows
                        .iter()
                        .filter_map(|r| r.get(key_column).and_then(Value::as_i64))
                        .max()
                        .unwrap_or(0)
                        + 1;
                    row.insert(key_column.to_string(), json!(next));
                    next
                }
            };
            if rows.iter().any(|r| matches_key(r, RowKey::of(table, key))) {
                return Err(duplicate_key(table));
            }

            if table != Table::Tasks && !row.contains_key("created_at") {
                if let Some(stamp) = now_stamp() {
                    row.insert("created_at".to_string(), Value::String(stamp));
                }
            }

            let row = Value::Object(row);
            rows.push(row.clone());
            Ok(vec![row])
        })
    }

    async fn update(
        &self,
        table: Table,
        key: RowKey,
        patch: Value,
    ) -> Result<Vec<Value>, StoreError> {
        self.call(|tables| {
            let patch = as_object(table, patch)?;
            let rows = tables.rows.entry(table).or_default();

            if let Some(new_key) = patch.get(table.key_column()).and_then(Value::as_i64) {
                let collides = new_key != key.value
                    && rows
                        .iter()
                        .any(|r| matches_key(r, RowKey::of(table, new_key)));
                if collides {
                    return Err(duplicate_key(table));
                }
            }

            let mut updated = Vec::new();
            for row in rows.iter_mut() {
                if !matches_key(row, key) {
                    continue;
                }
                if let Value::Object(fields) = row {
                    fields.extend(patch.clone());
                }
                updated.push(row.clone());
            }
            Ok(updated)
        })
    }

    async fn delete(&self, table: Table, key: RowKey) -> Result<(), StoreError> {
        self.call(|tables| {
            if let Some(rows) = tables.rows.get_mut(&table) {
                rows.retain(|row| !matches_key(row, key));
            }
            Ok(())
        })
    }
}
