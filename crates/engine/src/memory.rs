//! In-process [`RecordStore`].
//!
//! Rows live in memory as JSON objects keyed by id. Queries support the same
//! `where`/`orderBy`/`pagingInfo` subset the engine emits, and creates are
//! checked against [`EntityKind::required_fields`]. Used by the test-suites
//! and by the CLI `--fixtures` mode.

use std::{cmp::Ordering, collections::BTreeMap, sync::Mutex};

use api_types::{
    Update,
    query::{Condition, FetchParams, Operator, SortType, SubOperator},
    response::{FieldError, RecordResult},
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::{EngineError, EntityKind, RecordStore, ResultEngine};

type Row = Map<String, Value>;

#[derive(Debug)]
struct Tables {
    rows: BTreeMap<EntityKind, BTreeMap<i64, Row>>,
    next_id: i64,
    offline: Option<String>,
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
            offline: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a fixtures document shaped as
    /// `{ "crop": [ {...}, ... ], "expense": [...], ... }`.
    ///
    /// Rows without an `Id` get one assigned.
    pub fn from_fixtures(fixtures: Value) -> ResultEngine<Self> {
        let Value::Object(tables) = fixtures else {
            return Err(EngineError::InvalidField(
                "fixtures must be an object keyed by entity kind".to_string(),
            ));
        };

        let store = Self::new();
        for (table, rows) in tables {
            let kind = EntityKind::try_from(table.as_str())?;
            let Value::Array(rows) = rows else {
                return Err(EngineError::InvalidField(format!(
                    "fixtures for '{table}' must be an array"
                )));
            };
            for row in rows {
                store.insert(kind, row)?;
            }
        }
        Ok(store)
    }

    /// Insert a raw row, bypassing required-field checks. Returns its id.
    pub fn insert(&self, kind: EntityKind, row: Value) -> ResultEngine<i64> {
        let Value::Object(mut row) = row else {
            return Err(EngineError::InvalidField(format!("{kind} row must be an object")));
        };
        let mut tables = self.lock()?;
        let id = match row.get("Id").and_then(Value::as_i64) {
            Some(id) => id,
            None => tables.next_id,
        };
        let after = id
            .checked_add(1)
            .ok_or_else(|| EngineError::InvalidField(format!("{kind} id {id} is out of range")))?;
        tables.next_id = tables.next_id.max(after);
        row.insert("Id".to_string(), Value::from(id));
        tables.rows.entry(kind).or_default().insert(id, row);
        Ok(id)
    }

    /// While set, every call fails with [`EngineError::Remote`] carrying
    /// `reason`.
    pub fn set_offline(&self, reason: Option<&str>) -> ResultEngine<()> {
        self.lock()?.offline = reason.map(String::from);
        Ok(())
    }

    /// Number of rows of `kind`.
    pub fn len(&self, kind: EntityKind) -> ResultEngine<usize> {
        Ok(self.lock()?.rows.get(&kind).map_or(0, BTreeMap::len))
    }

    fn lock(&self) -> ResultEngine<std::sync::MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| EngineError::Remote("memory store lock poisoned".to_string()))
    }

    fn online(&self) -> ResultEngine<std::sync::MutexGuard<'_, Tables>> {
        let tables = self.lock()?;
        if let Some(reason) = &tables.offline {
            return Err(EngineError::Remote(reason.clone()));
        }
        Ok(tables)
    }

    fn fetch_rows(&self, kind: EntityKind, params: &FetchParams) -> ResultEngine<Vec<Value>> {
        let tables = self.online()?;
        let mut rows: Vec<&Row> = tables
            .rows
            .get(&kind)
            .map(|table| {
                table
                    .values()
                    .filter(|row| params.conditions.iter().all(|cond| matches(row, cond)))
                    .collect()
            })
            .unwrap_or_default();

        rows.sort_by(|a, b| {
            params
                .order_by
                .iter()
                .map(|order| {
                    let ord = compare(field(a, &order.field_name), field(b, &order.field_name))
                        .unwrap_or(Ordering::Equal);
                    match order.sort {
                        SortType::Asc => ord,
                        SortType::Desc => ord.reverse(),
                    }
                })
                .find(|ord| *ord != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });

        let (offset, limit) = match params.paging {
            Some(paging) => (paging.offset as usize, paging.limit as usize),
            None => (0, usize::MAX),
        };
        Ok(rows
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|row| Value::Object(row.clone()))
            .collect())
    }

    fn get_row(&self, kind: EntityKind, id: i64) -> ResultEngine<Option<Value>> {
        let tables = self.online()?;
        Ok(tables
            .rows
            .get(&kind)
            .and_then(|table| table.get(&id))
            .map(|row| Value::Object(row.clone())))
    }

    fn create_rows(&self, kind: EntityKind, records: Vec<Value>) -> ResultEngine<Vec<RecordResult<Value>>> {
        let mut tables = self.online()?;
        let mut results = Vec::with_capacity(records.len());
        for record in records {
            let Value::Object(mut row) = record else {
                results.push(RecordResult::failed("record must be an object", Vec::new()));
                continue;
            };
            let missing = missing_required(kind, &row);
            if !missing.is_empty() {
                results.push(RecordResult::failed("missing required fields", missing));
                continue;
            }
            let id = tables.next_id;
            let Some(after) = id.checked_add(1) else {
                results.push(RecordResult::failed("no ids left", Vec::new()));
                continue;
            };
            tables.next_id = after;
            row.insert("Id".to_string(), Value::from(id));
            tables.rows.entry(kind).or_default().insert(id, row.clone());
            results.push(RecordResult::ok(Value::Object(row)));
        }
        Ok(results)
    }

    fn update_rows(&self, kind: EntityKind, records: Vec<Value>) -> ResultEngine<Vec<RecordResult<Value>>> {
        let mut tables = self.online()?;
        let table = tables.rows.entry(kind).or_default();
        let mut results = Vec::with_capacity(records.len());
        for record in records {
            let Value::Object(fields) = record else {
                results.push(RecordResult::failed("record must be an object", Vec::new()));
                continue;
            };
            let Some(id) = fields.get("Id").and_then(Value::as_i64) else {
                results.push(RecordResult::failed("record has no Id", Vec::new()));
                continue;
            };
            let Some(existing) = table.get(&id) else {
                results.push(RecordResult::failed(format!("{kind} {id} not found"), Vec::new()));
                continue;
            };

            let mut merged = existing.clone();
            merged.extend(fields);
            let missing = missing_required(kind, &merged);
            if !missing.is_empty() {
                results.push(RecordResult::failed("missing required fields", missing));
                continue;
            }
            table.insert(id, merged.clone());
            results.push(RecordResult::ok(Value::Object(merged)));
        }
        Ok(results)
    }

    fn delete_rows(&self, kind: EntityKind, ids: &[i64]) -> ResultEngine<Vec<RecordResult<Value>>> {
        let mut tables = self.online()?;
        let table = tables.rows.entry(kind).or_default();
        Ok(ids
            .iter()
            .map(|id| match table.remove(id) {
                Some(_) => RecordResult::ok(Value::from(*id)),
                None => RecordResult::failed(format!("{kind} {id} not found"), Vec::new()),
            })
            .collect())
    }
}

fn missing_required(kind: EntityKind, row: &Row) -> Vec<FieldError> {
    kind.required_fields()
        .iter()
        .filter(|name| match row.get(**name) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        })
        .map(|name| FieldError {
            field_label: (*name).to_string(),
            message: "is required".to_string(),
        })
        .collect()
}

/// Field value with lookup objects collapsed to their id.
fn field<'a>(row: &'a Row, name: &str) -> &'a Value {
    match row.get(name) {
        Some(Value::Object(lookup)) => lookup.get("Id").unwrap_or(&Value::Null),
        Some(value) => value,
        None => &Value::Null,
    }
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn day(value: &Value) -> Option<&str> {
    value.as_str().and_then(|s| s.get(..10))
}

fn matches(row: &Row, cond: &Condition) -> bool {
    let actual = field(row, &cond.field_name);
    match (cond.operator, cond.sub_operator) {
        (Operator::ExactMatch, Some(SubOperator::Day)) => cond
            .values
            .iter()
            .any(|v| day(actual).is_some() && day(actual) == day(v)),
        (Operator::EqualTo | Operator::ExactMatch, _) => cond
            .values
            .iter()
            .any(|v| compare(actual, v) == Some(Ordering::Equal)),
        (Operator::GreaterThanOrEqualTo, _) => cond
            .values
            .first()
            .and_then(|v| compare(actual, v))
            .is_some_and(Ordering::is_ge),
        (Operator::LessThanOrEqualTo, _) => cond
            .values
            .first()
            .and_then(|v| compare(actual, v))
            .is_some_and(Ordering::is_le),
    }
}

fn decode<T: DeserializeOwned>(kind: EntityKind, value: Value) -> ResultEngine<T> {
    serde_json::from_value(value)
        .map_err(|err| EngineError::Remote(format!("failed to decode {kind} record: {err}")))
}

fn encode<P: Serialize>(kind: EntityKind, record: &P) -> ResultEngine<Value> {
    serde_json::to_value(record)
        .map_err(|err| EngineError::InvalidField(format!("failed to encode {kind} record: {err}")))
}

fn decode_results<T: DeserializeOwned>(
    kind: EntityKind,
    results: Vec<RecordResult<Value>>,
) -> ResultEngine<Vec<RecordResult<T>>> {
    results
        .into_iter()
        .map(|result| {
            Ok(RecordResult {
                success: result.success,
                data: result.data.map(|data| decode(kind, data)).transpose()?,
                errors: result.errors,
                message: result.message,
            })
        })
        .collect()
}

impl RecordStore for MemoryStore {
    async fn fetch_records<T>(&self, kind: EntityKind, params: &FetchParams) -> ResultEngine<Vec<T>>
    where
        T: DeserializeOwned + Send,
    {
        self.fetch_rows(kind, params)?
            .into_iter()
            .map(|row| decode(kind, row))
            .collect()
    }

    async fn get_record_by_id<T>(
        &self,
        kind: EntityKind,
        id: i64,
        _params: &FetchParams,
    ) -> ResultEngine<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        self.get_row(kind, id)?.map(|row| decode(kind, row)).transpose()
    }

    async fn create_records<P, T>(
        &self,
        kind: EntityKind,
        records: &[P],
    ) -> ResultEngine<Vec<RecordResult<T>>>
    where
        P: Serialize + Sync,
        T: DeserializeOwned + Send,
    {
        let values = records
            .iter()
            .map(|record| encode(kind, record))
            .collect::<ResultEngine<Vec<_>>>()?;
        decode_results(kind, self.create_rows(kind, values)?)
    }

    async fn update_records<P, T>(
        &self,
        kind: EntityKind,
        records: &[Update<P>],
    ) -> ResultEngine<Vec<RecordResult<T>>>
    where
        P: Serialize + Sync,
        T: DeserializeOwned + Send,
    {
        let values = records
            .iter()
            .map(|record| encode(kind, record))
            .collect::<ResultEngine<Vec<_>>>()?;
        decode_results(kind, self.update_rows(kind, values)?)
    }

    async fn delete_records(&self, kind: EntityKind, ids: &[i64]) -> ResultEngine<Vec<RecordResult<Value>>> {
        self.delete_rows(kind, ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> MemoryStore {
        MemoryStore::from_fixtures(json!({
            "expense": [
                { "Id": 10, "farm_id": 1, "amount": 5, "category": "seed", "date": "2024-01-02" },
                { "farm_id": { "Id": 2, "Name": "Valley" }, "amount": 7, "category": "labor", "date": "2024-01-01" },
                { "farm_id": 1, "amount": 3, "category": "fuel", "date": "2024-03-01T08:00:00Z" }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn fixtures_assign_ids_after_explicit_ones() {
        let store = store();
        assert_eq!(store.len(EntityKind::Expense).unwrap(), 3);
        let rows = store.fetch_rows(EntityKind::Expense, &FetchParams::default()).unwrap();
        let ids: Vec<i64> = rows.iter().filter_map(|r| r["Id"].as_i64()).collect();
        assert_eq!(ids, [10, 11, 12]);
    }

    #[test]
    fn largest_id_is_rejected_instead_of_overflowing() {
        let err = MemoryStore::from_fixtures(json!({
            "crop": [ { "Id": i64::MAX, "Name": "Corn", "farm_id": 1 } ]
        }))
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidField(_)));

        let store = MemoryStore::from_fixtures(json!({
            "crop": [ { "Id": i64::MAX - 2, "Name": "Corn", "farm_id": 1 } ]
        }))
        .unwrap();
        let results = store
            .create_rows(
                EntityKind::Crop,
                vec![
                    json!({ "Name": "Wheat", "farm_id": 1 }),
                    json!({ "Name": "Oats", "farm_id": 1 }),
                ],
            )
            .unwrap();
        assert!(results[0].success);
        assert_eq!(results[0].data.as_ref().unwrap()["Id"], i64::MAX - 1);
        assert!(!results[1].success);
    }

    #[test]
    fn equal_to_sees_through_lookups() {
        let params = FetchParams::default().filter(Condition::equal_to("farm_id", 2));
        let rows = store().fetch_rows(EntityKind::Expense, &params).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["category"], "labor");
    }

    #[test]
    fn range_and_order() {
        let params = FetchParams::default()
            .filter(Condition::new("date", Operator::GreaterThanOrEqualTo, json!("2024-01-01")))
            .filter(Condition::new("date", Operator::LessThanOrEqualTo, json!("2024-01-31")))
            .order_by("date", SortType::Desc);
        let rows = store().fetch_rows(EntityKind::Expense, &params).unwrap();
        let dates: Vec<&str> = rows.iter().filter_map(|r| r["date"].as_str()).collect();
        assert_eq!(dates, ["2024-01-02", "2024-01-01"]);
    }

    #[test]
    fn same_day_matches_timestamps() {
        let params = FetchParams::default().filter(Condition::same_day("date", "2024-03-01"));
        let rows = store().fetch_rows(EntityKind::Expense, &params).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn paging_skips_and_limits() {
        let params = FetchParams::default().order_by("Id", SortType::Asc).paging(1, 1);
        let rows = store().fetch_rows(EntityKind::Expense, &params).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["Id"], 11);
    }

    #[test]
    fn create_checks_required_fields() {
        let results = store()
            .create_rows(EntityKind::Expense, vec![json!({ "farm_id": 1, "amount": 2 })])
            .unwrap();
        assert!(!results[0].success);
        let labels: Vec<&str> = results[0].errors.iter().map(|e| e.field_label.as_str()).collect();
        assert_eq!(labels, ["category", "date"]);
    }

    #[test]
    fn offline_store_fails_every_call() {
        let store = store();
        store.set_offline(Some("backend unreachable")).unwrap();
        assert_eq!(
            store.fetch_rows(EntityKind::Expense, &FetchParams::default()).unwrap_err(),
            EngineError::Remote("backend unreachable".to_string())
        );
        store.set_offline(None).unwrap();
        assert!(store.get_row(EntityKind::Expense, 10).unwrap().is_some());
    }

    #[test]
    fn fixtures_reject_unknown_tables() {
        assert!(MemoryStore::from_fixtures(json!({ "farm": [] })).is_err());
        assert!(MemoryStore::from_fixtures(json!([])).is_err());
    }
}
