//! Client-side reductions over expense rows: category totals, period trends
//! and per-farm totals.
//!
//! Every function is pure. Rows are validated field by field, and only the
//! fields a reduction reads are checked: a category summary does not care
//! about a malformed date. Sums are exact integer cents, so the output does
//! not depend on input order.

use std::{collections::BTreeMap, fmt, str::FromStr};

use api_types::expense::Expense;
use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    EngineError, MoneyCents, ResultEngine,
    expense::{amount_of, category_of, date_of, farm_of},
};

/// Category label → summed amount.
pub type CategoryTotals = BTreeMap<String, MoneyCents>;

/// Farm id → totals for that farm.
pub type FarmTotals = BTreeMap<i64, Breakdown>;

/// Total plus per-category split.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Breakdown {
    pub total: MoneyCents,
    pub categories: CategoryTotals,
}

impl Breakdown {
    fn add(&mut self, category: &str, amount: MoneyCents) -> ResultEngine<()> {
        self.total = checked_sum(self.total, amount)?;
        add_to_category(&mut self.categories, category, amount)
    }
}

/// One period of a trend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TrendBucket {
    /// `YYYY-MM` for monthly trends, `YYYY` for yearly ones.
    pub period: String,
    pub total: MoneyCents,
    pub categories: CategoryTotals,
}

/// Granularity of a trend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Period {
    #[default]
    Monthly,
    Yearly,
}

impl Period {
    /// Fixed-width key for `date`, so lexical order matches chronological order.
    pub fn key(self, date: NaiveDate) -> String {
        match self {
            Self::Monthly => date.format("%Y-%m").to_string(),
            Self::Yearly => date.format("%Y").to_string(),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Monthly => f.write_str("monthly"),
            Self::Yearly => f.write_str("yearly"),
        }
    }
}

impl FromStr for Period {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" | "month" => Ok(Self::Monthly),
            "yearly" | "year" => Ok(Self::Yearly),
            other => Err(EngineError::InvalidField(format!(
                "unknown period '{other}', expected monthly or yearly"
            ))),
        }
    }
}

fn checked_sum(acc: MoneyCents, amount: MoneyCents) -> ResultEngine<MoneyCents> {
    acc.checked_add(amount)
        .ok_or_else(|| EngineError::InvalidAmount("total overflows".to_string()))
}

fn add_to_category(
    totals: &mut CategoryTotals,
    category: &str,
    amount: MoneyCents,
) -> ResultEngine<()> {
    let slot = totals.entry(category.to_string()).or_default();
    *slot = checked_sum(*slot, amount)?;
    Ok(())
}

/// Aggregator for expense statistics
pub struct Aggregator;

impl Aggregator {
    /// Sum amounts per category. Categories absent from the input never
    /// appear in the output.
    pub fn summarize_by_category(records: &[Expense]) -> ResultEngine<CategoryTotals> {
        let mut totals = CategoryTotals::new();
        for row in records {
            add_to_category(&mut totals, category_of(row)?, amount_of(row)?)?;
        }
        Ok(totals)
    }

    /// Group by period, sorted ascending by period key.
    ///
    /// Fails with [`EngineError::InvalidDate`] on the first row whose date
    /// cannot be parsed.
    pub fn compute_trend(records: &[Expense], period: Period) -> ResultEngine<Vec<TrendBucket>> {
        let mut buckets: BTreeMap<String, Breakdown> = BTreeMap::new();
        for row in records {
            let key = period.key(date_of(row)?);
            buckets
                .entry(key)
                .or_default()
                .add(category_of(row)?, amount_of(row)?)?;
        }

        Ok(buckets
            .into_iter()
            .map(|(period, breakdown)| TrendBucket {
                period,
                total: breakdown.total,
                categories: breakdown.categories,
            })
            .collect())
    }

    /// Totals per farm with a nested category split.
    pub fn compare_farms(records: &[Expense]) -> ResultEngine<FarmTotals> {
        let mut farms = FarmTotals::new();
        for row in records {
            farms
                .entry(farm_of(row)?)
                .or_default()
                .add(category_of(row)?, amount_of(row)?)?;
        }
        Ok(farms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_types::RecordRef;
    use serde_json::json;

    fn expense(id: i64, farm: i64, category: &str, amount: f64, date: &str) -> Expense {
        Expense {
            id,
            name: None,
            farm_id: Some(RecordRef::Id(farm)),
            amount: Some(json!(amount)),
            category: Some(json!(category)),
            description: None,
            date: Some(json!(date)),
        }
    }

    fn cents(v: i64) -> MoneyCents {
        MoneyCents::new(v)
    }

    #[test]
    fn summary_of_nothing_is_empty() {
        assert!(Aggregator::summarize_by_category(&[]).unwrap().is_empty());
    }

    #[test]
    fn summary_adds_per_category() {
        let rows = vec![
            expense(1, 1, "seed", 10.0, "2024-01-01"),
            expense(2, 1, "seed", 5.0, "2024-01-02"),
            expense(3, 2, "labor", 7.0, "2024-01-03"),
        ];
        let summary = Aggregator::summarize_by_category(&rows).unwrap();
        assert_eq!(summary.len(), 2);
        assert_eq!(summary["seed"], cents(1500));
        assert_eq!(summary["labor"], cents(700));
    }

    #[test]
    fn summary_ignores_dates() {
        let rows = vec![expense(1, 1, "seed", 2.5, "not a date")];
        assert_eq!(Aggregator::summarize_by_category(&rows).unwrap()["seed"], cents(250));
    }

    #[test]
    fn summary_rejects_non_numeric_amount() {
        let mut row = expense(1, 1, "seed", 0.0, "2024-01-01");
        row.amount = Some(json!("a lot"));
        let err = Aggregator::summarize_by_category(&[row]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
    }

    #[test]
    fn monthly_trend_merges_same_month() {
        let rows = vec![
            expense(1, 1, "feed", 1.0, "2024-02-01"),
            expense(2, 1, "feed", 2.0, "2024-01-05"),
            expense(3, 1, "fuel", 4.0, "2024-01-20"),
        ];
        let trend = Aggregator::compute_trend(&rows, Period::Monthly).unwrap();

        let periods: Vec<&str> = trend.iter().map(|b| b.period.as_str()).collect();
        assert_eq!(periods, ["2024-01", "2024-02"]);
        assert_eq!(trend[0].total, cents(600));
        assert_eq!(trend[0].categories["feed"], cents(200));
        assert_eq!(trend[0].categories["fuel"], cents(400));
        assert_eq!(trend[1].total, cents(100));
    }

    #[test]
    fn yearly_trend_sorts_chronologically() {
        let rows = vec![
            expense(1, 1, "feed", 1.0, "2025-06-01"),
            expense(2, 1, "feed", 1.0, "2023-12-31"),
            expense(3, 1, "feed", 1.0, "2024-01-01"),
        ];
        let trend = Aggregator::compute_trend(&rows, Period::Yearly).unwrap();
        let periods: Vec<&str> = trend.iter().map(|b| b.period.as_str()).collect();
        assert_eq!(periods, ["2023", "2024", "2025"]);
    }

    #[test]
    fn trend_fails_on_invalid_date() {
        let rows = vec![
            expense(1, 1, "feed", 1.0, "2024-01-01"),
            expense(2, 1, "feed", 1.0, "Invalid Date"),
        ];
        let err = Aggregator::compute_trend(&rows, Period::Monthly).unwrap_err();
        assert!(err.is_validation());
        assert!(matches!(err, EngineError::InvalidDate(msg) if msg.contains("expense 2")));
    }

    #[test]
    fn trend_fails_on_missing_date() {
        let mut row = expense(1, 1, "feed", 1.0, "2024-01-01");
        row.date = None;
        assert!(matches!(
            Aggregator::compute_trend(&[row], Period::Yearly),
            Err(EngineError::InvalidDate(_))
        ));
    }

    #[test]
    fn categories_differing_in_whitespace_stay_apart() {
        let rows = vec![
            expense(1, 1, "seed", 10.0, "2024-01-01"),
            expense(2, 1, " seed ", 5.0, "2024-01-02"),
        ];
        let summary = Aggregator::summarize_by_category(&rows).unwrap();
        assert_eq!(summary.len(), 2);
        assert_eq!(summary["seed"], cents(1000));
        assert_eq!(summary[" seed "], cents(500));
    }

    #[test]
    fn numeric_date_fails_the_trend_but_not_the_summary() {
        let mut row = expense(1, 1, "feed", 2.0, "2024-01-05");
        row.date = Some(json!(20240105));
        let rows = [row];

        assert_eq!(Aggregator::summarize_by_category(&rows).unwrap()["feed"], cents(200));
        assert!(matches!(
            Aggregator::compute_trend(&rows, Period::Monthly),
            Err(EngineError::InvalidDate(_))
        ));
    }

    #[test]
    fn numeric_category_is_a_validation_error() {
        let mut row = expense(1, 1, "feed", 2.0, "2024-01-05");
        row.category = Some(json!(42));
        let err = Aggregator::compare_farms(&[row]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidField(_)));
    }

    #[test]
    fn farms_are_partitioned() {
        let rows = vec![
            expense(1, 1, "seed", 10.0, "2024-01-01"),
            expense(2, 2, "seed", 3.0, "2024-01-01"),
            expense(3, 1, "labor", 1.25, "2024-01-01"),
        ];
        let farms = Aggregator::compare_farms(&rows).unwrap();
        assert_eq!(farms.len(), 2);
        assert_eq!(farms[&1].total, cents(1125));
        assert_eq!(farms[&1].categories["labor"], cents(125));
        assert_eq!(farms[&2].total, cents(300));
        assert!(!farms[&2].categories.contains_key("labor"));
    }

    #[test]
    fn farm_comparison_requires_farm() {
        let mut row = expense(1, 1, "seed", 1.0, "2024-01-01");
        row.farm_id = None;
        assert!(matches!(
            Aggregator::compare_farms(&[row]),
            Err(EngineError::InvalidField(_))
        ));
    }

    #[test]
    fn overflow_is_reported() {
        let mut a = expense(1, 1, "seed", 0.0, "2024-01-01");
        a.amount = Some(json!("90000000000000000"));
        let b = a.clone();
        assert!(matches!(
            Aggregator::summarize_by_category(&[a, b]),
            Err(EngineError::InvalidAmount(_))
        ));
    }

    #[test]
    fn period_parses_loosely() {
        assert_eq!("Monthly".parse::<Period>().unwrap(), Period::Monthly);
        assert_eq!("year".parse::<Period>().unwrap(), Period::Yearly);
        assert!("weekly".parse::<Period>().is_err());
    }
}
