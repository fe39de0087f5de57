use api_types::{
    Update,
    crop::{Crop, CropFields},
};
use chrono::NaiveDate;

use crate::{
    EntityKind, RecordStore, ResultEngine,
    util::{first_written, normalize_optional_text, normalize_required_text, store_date},
};

use super::Engine;

/// Crop data accepted by create and update.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CropInput {
    pub name: String,
    pub variety: Option<String>,
    pub field_location: Option<String>,
    pub planting_date: Option<NaiveDate>,
    pub expected_harvest_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub farm_id: i64,
}

impl CropInput {
    fn into_fields(self) -> ResultEngine<CropFields> {
        Ok(CropFields {
            name: normalize_required_text(&self.name, "crop name")?,
            variety: normalize_optional_text(self.variety.as_deref()),
            field_location: normalize_optional_text(self.field_location.as_deref()),
            planting_date: self.planting_date.map(store_date),
            expected_harvest_date: self.expected_harvest_date.map(store_date),
            status: normalize_optional_text(self.status.as_deref()),
            farm_id: self.farm_id,
        })
    }
}

impl<S: RecordStore> Engine<S> {
    pub async fn list_crops(&self) -> ResultEngine<Vec<Crop>> {
        self.list_all(EntityKind::Crop).await
    }

    /// Return the crop with the given id, or `KeyNotFound`.
    pub async fn crop(&self, id: i64) -> ResultEngine<Crop> {
        self.get(EntityKind::Crop, id).await
    }

    pub async fn crops_by_farm(&self, farm_id: i64) -> ResultEngine<Vec<Crop>> {
        self.list_by_farm(EntityKind::Crop, farm_id).await
    }

    pub async fn create_crop(&self, input: CropInput) -> ResultEngine<Crop> {
        let fields = input.into_fields()?;
        let results = self
            .store
            .create_records(EntityKind::Crop, std::slice::from_ref(&fields))
            .await?;
        first_written(EntityKind::Crop, "create", results)
    }

    pub async fn update_crop(&self, id: i64, input: CropInput) -> ResultEngine<Crop> {
        let update = Update {
            id,
            fields: input.into_fields()?,
        };
        let results = self
            .store
            .update_records(EntityKind::Crop, std::slice::from_ref(&update))
            .await?;
        first_written(EntityKind::Crop, "update", results)
    }

    /// Returns `true` when the crop was deleted.
    pub async fn delete_crop(&self, id: i64) -> ResultEngine<bool> {
        self.delete(EntityKind::Crop, id).await
    }
}
