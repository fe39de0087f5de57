//! Farm data access and expense analytics.
//!
//! [`Engine`] wraps a [`RecordStore`] and exposes CRUD operations for crops,
//! expenses, tasks and weather, plus expense summaries built by the
//! [`Aggregator`].

pub use aggregate::{Aggregator, Breakdown, CategoryTotals, FarmTotals, Period, TrendBucket};
pub use error::{EngineError, RecordRejection};
pub use expense::{ExpenseRecord, UNCATEGORIZED, parse_date};
pub use memory::MemoryStore;
pub use money::MoneyCents;
pub use ops::{CropInput, Engine, EngineBuilder, ExpenseInput, TaskInput};
pub use store::{EntityKind, RecordStore};

pub mod aggregate;
mod error;
mod expense;
mod memory;
mod money;
mod ops;
mod store;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;
