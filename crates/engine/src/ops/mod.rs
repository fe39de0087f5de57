use api_types::query::{Condition, FetchParams};
use serde::de::DeserializeOwned;

use crate::{EngineError, EntityKind, RecordStore, ResultEngine};

mod crops;
mod expenses;
mod tasks;
mod weather;

pub use crops::CropInput;
pub use expenses::ExpenseInput;
pub use tasks::TaskInput;

/// Data-access entry point. Every operation goes through the configured
/// [`RecordStore`].
#[derive(Debug)]
pub struct Engine<S> {
    store: S,
}

impl<S: RecordStore> Engine<S> {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder<S> {
        EngineBuilder::default()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn list<T>(&self, kind: EntityKind, params: FetchParams) -> ResultEngine<Vec<T>>
    where
        T: DeserializeOwned + Send,
    {
        tracing::debug!("fetching {kind} records ({} conditions)", params.conditions.len());
        self.store.fetch_records(kind, &params).await
    }

    async fn list_all<T>(&self, kind: EntityKind) -> ResultEngine<Vec<T>>
    where
        T: DeserializeOwned + Send,
    {
        self.list(kind, FetchParams::fields(kind.fields())).await
    }

    async fn list_by_farm<T>(&self, kind: EntityKind, farm_id: i64) -> ResultEngine<Vec<T>>
    where
        T: DeserializeOwned + Send,
    {
        let params = FetchParams::fields(kind.fields()).filter(Condition::equal_to("farm_id", farm_id));
        self.list(kind, params).await
    }

    async fn get<T>(&self, kind: EntityKind, id: i64) -> ResultEngine<T>
    where
        T: DeserializeOwned + Send,
    {
        self.store
            .get_record_by_id(kind, id, &FetchParams::fields(kind.fields()))
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("{kind} {id}")))
    }

    async fn delete(&self, kind: EntityKind, id: i64) -> ResultEngine<bool> {
        let results = self.store.delete_records(kind, &[id]).await?;
        Ok(crate::util::any_deleted(kind, &results))
    }
}

/// The builder for `Engine`
pub struct EngineBuilder<S> {
    store: Option<S>,
}

impl<S> Default for EngineBuilder<S> {
    fn default() -> Self {
        Self { store: None }
    }
}

impl<S: RecordStore> EngineBuilder<S> {
    /// Pass the required record store
    pub fn store(mut self, store: S) -> EngineBuilder<S> {
        self.store = Some(store);
        self
    }

    /// Construct `Engine`
    pub fn build(self) -> ResultEngine<Engine<S>> {
        let store = self
            .store
            .ok_or_else(|| EngineError::Config("missing record store".to_string()))?;
        Ok(Engine { store })
    }
}
