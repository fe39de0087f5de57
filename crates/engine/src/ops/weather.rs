use api_types::{
    query::{Condition, FetchParams, SortType},
    weather::Weather,
};
use chrono::NaiveDate;

use crate::{EntityKind, RecordStore, ResultEngine, util::store_date};

use super::Engine;

impl<S: RecordStore> Engine<S> {
    /// Every weather record, oldest first.
    pub async fn forecast(&self) -> ResultEngine<Vec<Weather>> {
        let kind = EntityKind::Weather;
        let params = FetchParams::fields(kind.fields()).order_by("date", SortType::Asc);
        self.list(kind, params).await
    }

    /// Weather for `day`, falling back to the first forecast entry when the
    /// store has no record for that day. `None` when there is no weather at
    /// all.
    pub async fn weather_for(&self, day: NaiveDate) -> ResultEngine<Option<Weather>> {
        let kind = EntityKind::Weather;
        let params = FetchParams::fields(kind.fields())
            .filter(Condition::equal_to("date", store_date(day)));
        let mut today: Vec<Weather> = self.list(kind, params).await?;
        if !today.is_empty() {
            return Ok(Some(today.swap_remove(0)));
        }

        tracing::debug!("no weather recorded for {day}, using first forecast entry");
        Ok(self.forecast().await?.into_iter().next())
    }
}
