//! The record store seam.
//!
//! The engine never talks to the network itself. Every read and write goes
//! through a [`RecordStore`], which owns transport, authentication and field
//! mapping. A store must report failures as errors: an empty list always
//! means "no records".

use std::{fmt, future::Future};

use api_types::{Update, query::FetchParams, response::RecordResult};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{EngineError, ResultEngine};

/// Entity kinds kept in the record store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Crop,
    Expense,
    Task,
    Weather,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [Self::Crop, Self::Expense, Self::Task, Self::Weather];

    /// Table name used by the store.
    pub const fn table(self) -> &'static str {
        match self {
            Self::Crop => api_types::crop::TABLE,
            Self::Expense => api_types::expense::TABLE,
            Self::Task => api_types::task::TABLE,
            Self::Weather => api_types::weather::TABLE,
        }
    }

    /// Fields requested on every read.
    pub const fn fields(self) -> &'static [&'static str] {
        match self {
            Self::Crop => api_types::crop::FIELDS,
            Self::Expense => api_types::expense::FIELDS,
            Self::Task => api_types::task::FIELDS,
            Self::Weather => api_types::weather::FIELDS,
        }
    }

    /// Fields a store must refuse to create a record without.
    pub const fn required_fields(self) -> &'static [&'static str] {
        match self {
            Self::Crop => &["Name", "farm_id"],
            Self::Expense => &["farm_id", "amount", "category", "date"],
            Self::Task => &["title", "due_date", "farm_id"],
            Self::Weather => &["date"],
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

impl TryFrom<&str> for EntityKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.table() == value)
            .ok_or_else(|| EngineError::InvalidField(format!("unknown entity kind '{value}'")))
    }
}

/// Query/create/update/delete primitives of the external record store.
///
/// Envelope-level failures (transport errors, `success: false`) are returned
/// as [`EngineError::Remote`]. Per-record outcomes of writes are returned
/// untouched so the caller can decide how to report them.
pub trait RecordStore: Send + Sync {
    /// Fetch every record of `kind` matching `params`.
    fn fetch_records<T>(
        &self,
        kind: EntityKind,
        params: &FetchParams,
    ) -> impl Future<Output = ResultEngine<Vec<T>>> + Send
    where
        T: DeserializeOwned + Send;

    /// Fetch one record by id. `Ok(None)` when no such record exists.
    fn get_record_by_id<T>(
        &self,
        kind: EntityKind,
        id: i64,
        params: &FetchParams,
    ) -> impl Future<Output = ResultEngine<Option<T>>> + Send
    where
        T: DeserializeOwned + Send;

    fn create_records<P, T>(
        &self,
        kind: EntityKind,
        records: &[P],
    ) -> impl Future<Output = ResultEngine<Vec<RecordResult<T>>>> + Send
    where
        P: Serialize + Sync,
        T: DeserializeOwned + Send;

    fn update_records<P, T>(
        &self,
        kind: EntityKind,
        records: &[Update<P>],
    ) -> impl Future<Output = ResultEngine<Vec<RecordResult<T>>>> + Send
    where
        P: Serialize + Sync,
        T: DeserializeOwned + Send;

    fn delete_records(
        &self,
        kind: EntityKind,
        ids: &[i64],
    ) -> impl Future<Output = ResultEngine<Vec<RecordResult<Value>>>> + Send;
}
