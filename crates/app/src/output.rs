//! Rendering of command results: pretty JSON, or CSV for exports.

use std::{io::Write, path::PathBuf};

use csv::Writer;
use engine::ExpenseRecord;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

#[derive(Debug, PartialEq)]
pub enum Output {
    Json(Value),
    Csv { data: Vec<u8>, path: Option<PathBuf> },
}

impl Output {
    pub fn json<T: Serialize>(value: &T) -> Result<Self> {
        Ok(Self::Json(serde_json::to_value(value)?))
    }

    /// Write to `out`, or to the export path when one was given.
    pub fn emit<W: Write>(self, out: &mut W) -> Result<()> {
        match self {
            Self::Json(value) => {
                serde_json::to_writer_pretty(&mut *out, &value)?;
                writeln!(out)?;
            }
            Self::Csv {
                data,
                path: Some(path),
            } => {
                std::fs::write(&path, &data)?;
                tracing::info!("exported {} bytes to {}", data.len(), path.display());
            }
            Self::Csv { data, path: None } => out.write_all(&data)?,
        }
        Ok(())
    }
}

pub fn expenses_csv(records: &[ExpenseRecord]) -> Result<Vec<u8>> {
    #[derive(Serialize)]
    struct ExportRow<'a> {
        id: i64,
        farm_id: i64,
        date: String,
        category: &'a str,
        amount: String,
        description: &'a str,
    }

    let mut writer = Writer::from_writer(vec![]);
    for record in records {
        writer.serialize(ExportRow {
            id: record.id,
            farm_id: record.farm_id,
            date: record.date.format("%Y-%m-%d").to_string(),
            category: &record.category,
            amount: record.amount.to_string(),
            description: &record.description,
        })?;
    }
    writer.into_inner().map_err(|err| err.into_error().into())
}
