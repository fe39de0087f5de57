use api_types::{
    Update,
    expense::{Expense, ExpenseFields},
    query::{Condition, FetchParams, Operator},
};
use chrono::NaiveDate;

use crate::{
    Aggregator, EngineError, EntityKind, ExpenseRecord, MoneyCents, RecordStore, ResultEngine,
    aggregate::{CategoryTotals, FarmTotals, Period, TrendBucket},
    util::{first_written, normalize_optional_text, normalize_required_text, store_date},
};

use super::Engine;

/// Expense data accepted by create and update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpenseInput {
    /// Display name; defaults to the description.
    pub name: Option<String>,
    pub farm_id: i64,
    pub amount: MoneyCents,
    pub category: String,
    pub description: String,
    pub date: NaiveDate,
}

impl ExpenseInput {
    fn into_fields(self) -> ResultEngine<ExpenseFields> {
        let description = self.description.trim().to_string();
        let name = normalize_optional_text(self.name.as_deref())
            .or_else(|| normalize_optional_text(Some(&description)))
            .ok_or_else(|| {
                EngineError::InvalidField("expense needs a name or a description".to_string())
            })?;

        Ok(ExpenseFields {
            name,
            farm_id: self.farm_id,
            amount: self.amount.as_f64(),
            category: normalize_required_text(&self.category, "expense category")?,
            description,
            date: store_date(self.date),
        })
    }
}

impl<S: RecordStore> Engine<S> {
    pub async fn list_expenses(&self) -> ResultEngine<Vec<Expense>> {
        self.list_all(EntityKind::Expense).await
    }

    pub async fn expense(&self, id: i64) -> ResultEngine<Expense> {
        self.get(EntityKind::Expense, id).await
    }

    pub async fn expenses_by_farm(&self, farm_id: i64) -> ResultEngine<Vec<Expense>> {
        self.list_by_farm(EntityKind::Expense, farm_id).await
    }

    pub async fn create_expense(&self, input: ExpenseInput) -> ResultEngine<Expense> {
        let fields = input.into_fields()?;
        let results = self
            .store
            .create_records(EntityKind::Expense, std::slice::from_ref(&fields))
            .await?;
        first_written(EntityKind::Expense, "create", results)
    }

    pub async fn update_expense(&self, id: i64, input: ExpenseInput) -> ResultEngine<Expense> {
        let update = Update {
            id,
            fields: input.into_fields()?,
        };
        let results = self
            .store
            .update_records(EntityKind::Expense, std::slice::from_ref(&update))
            .await?;
        first_written(EntityKind::Expense, "update", results)
    }

    pub async fn delete_expense(&self, id: i64) -> ResultEngine<bool> {
        self.delete(EntityKind::Expense, id).await
    }

    /// Expenses dated within `start..=end`, optionally for one farm. The
    /// filter runs in the store.
    pub async fn expenses_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        farm_id: Option<i64>,
    ) -> ResultEngine<Vec<Expense>> {
        if start > end {
            return Err(EngineError::InvalidDate(format!(
                "range start {start} is after end {end}"
            )));
        }

        let kind = EntityKind::Expense;
        let mut params = FetchParams::fields(kind.fields())
            .filter(Condition::new(
                "date",
                Operator::GreaterThanOrEqualTo,
                store_date(start).into(),
            ))
            .filter(Condition::new(
                "date",
                Operator::LessThanOrEqualTo,
                store_date(end).into(),
            ));
        if let Some(farm_id) = farm_id {
            params = params.filter(Condition::equal_to("farm_id", farm_id));
        }
        self.list(kind, params).await
    }

    async fn expenses_for(&self, farm_id: Option<i64>) -> ResultEngine<Vec<Expense>> {
        match farm_id {
            Some(farm_id) => self.expenses_by_farm(farm_id).await,
            None => self.list_expenses().await,
        }
    }

    /// Fully validated expense records, optionally for one farm.
    pub async fn expense_records(&self, farm_id: Option<i64>) -> ResultEngine<Vec<ExpenseRecord>> {
        self.expenses_for(farm_id)
            .await?
            .iter()
            .map(ExpenseRecord::try_from)
            .collect()
    }

    /// Totals per category, over all farms or a single one.
    pub async fn expense_summary(&self, farm_id: Option<i64>) -> ResultEngine<CategoryTotals> {
        let rows = self.expenses_for(farm_id).await?;
        Aggregator::summarize_by_category(&rows)
    }

    pub async fn expense_trend(
        &self,
        period: Period,
        farm_id: Option<i64>,
    ) -> ResultEngine<Vec<TrendBucket>> {
        let rows = self.expenses_for(farm_id).await?;
        Aggregator::compute_trend(&rows, period)
    }

    /// Totals for every farm that has expenses.
    pub async fn farm_comparison(&self) -> ResultEngine<FarmTotals> {
        let rows = self.list_expenses().await?;
        Aggregator::compare_farms(&rows)
    }
}
