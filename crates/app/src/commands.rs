use chrono::NaiveDate;
use engine::{Engine, RecordStore};
use serde_json::json;

use crate::{
    cli::{Command, CropCommand, ExpenseCommand, TaskCommand, WeatherCommand},
    error::Result,
    output::{Output, expenses_csv},
};

/// Run `command` against `engine`. `today` anchors `tasks list --today` and
/// `weather today`.
pub async fn execute<S: RecordStore>(
    engine: &Engine<S>,
    command: Command,
    today: NaiveDate,
) -> Result<Output> {
    match command {
        Command::Crops(cmd) => crops(engine, cmd).await,
        Command::Expenses(cmd) => expenses(engine, cmd).await,
        Command::Tasks(cmd) => tasks(engine, cmd, today).await,
        Command::Weather(cmd) => weather(engine, cmd, today).await,
    }
}

fn deleted(id: i64, deleted: bool) -> Output {
    Output::Json(json!({ "id": id, "deleted": deleted }))
}

async fn crops<S: RecordStore>(engine: &Engine<S>, cmd: CropCommand) -> Result<Output> {
    match cmd {
        CropCommand::List { farm: Some(farm) } => Output::json(&engine.crops_by_farm(farm).await?),
        CropCommand::List { farm: None } => Output::json(&engine.list_crops().await?),
        CropCommand::Get { id } => Output::json(&engine.crop(id).await?),
        CropCommand::Add(args) => Output::json(&engine.create_crop(args.into()).await?),
        CropCommand::Update { id, crop } => Output::json(&engine.update_crop(id, crop.into()).await?),
        CropCommand::Delete { id } => Ok(deleted(id, engine.delete_crop(id).await?)),
    }
}

async fn expenses<S: RecordStore>(engine: &Engine<S>, cmd: ExpenseCommand) -> Result<Output> {
    match cmd {
        ExpenseCommand::List {
            farm,
            from: Some(from),
            to: Some(to),
        } => Output::json(&engine.expenses_in_range(from, to, farm).await?),
        ExpenseCommand::List { farm: Some(farm), .. } => {
            Output::json(&engine.expenses_by_farm(farm).await?)
        }
        ExpenseCommand::List { .. } => Output::json(&engine.list_expenses().await?),
        ExpenseCommand::Get { id } => Output::json(&engine.expense(id).await?),
        ExpenseCommand::Add(args) => Output::json(&engine.create_expense(args.into()).await?),
        ExpenseCommand::Update { id, expense } => {
            Output::json(&engine.update_expense(id, expense.into()).await?)
        }
        ExpenseCommand::Delete { id } => Ok(deleted(id, engine.delete_expense(id).await?)),
        ExpenseCommand::Summary { farm } => Output::json(&engine.expense_summary(farm).await?),
        ExpenseCommand::Trend { period, farm } => {
            Output::json(&engine.expense_trend(period, farm).await?)
        }
        ExpenseCommand::Compare => Output::json(&engine.farm_comparison().await?),
        ExpenseCommand::Export { farm, output } => {
            let records = engine.expense_records(farm).await?;
            tracing::debug!("exporting {} expenses", records.len());
            Ok(Output::Csv {
                data: expenses_csv(&records)?,
                path: output,
            })
        }
    }
}

async fn tasks<S: RecordStore>(
    engine: &Engine<S>,
    cmd: TaskCommand,
    today: NaiveDate,
) -> Result<Output> {
    match cmd {
        TaskCommand::List { today: true, .. } => Output::json(&engine.tasks_due_on(today).await?),
        TaskCommand::List { farm: Some(farm), .. } => Output::json(&engine.tasks_by_farm(farm).await?),
        TaskCommand::List { .. } => Output::json(&engine.list_tasks().await?),
        TaskCommand::Get { id } => Output::json(&engine.task(id).await?),
        TaskCommand::Add(args) => Output::json(&engine.create_task(args.into()).await?),
        TaskCommand::Update {
            id,
            task,
            completed,
        } => Output::json(&engine.update_task(id, task.into(), completed).await?),
        TaskCommand::Toggle { id } => Output::json(&engine.toggle_task_complete(id).await?),
        TaskCommand::Delete { id } => Ok(deleted(id, engine.delete_task(id).await?)),
    }
}

async fn weather<S: RecordStore>(
    engine: &Engine<S>,
    cmd: WeatherCommand,
    today: NaiveDate,
) -> Result<Output> {
    match cmd {
        WeatherCommand::Forecast => Output::json(&engine.forecast().await?),
        WeatherCommand::Today => Output::json(&engine.weather_for(today).await?),
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use engine::{EngineError, MemoryStore};
    use serde_json::{Value, json};

    use super::*;
    use crate::{cli::Cli, error::AppError};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn engine() -> Engine<MemoryStore> {
        let store = MemoryStore::from_fixtures(json!({
            "expense": [
                { "Id": 1, "Name": "Seed", "farm_id": 1, "amount": 10, "category": "seed", "description": "corn", "date": "2024-01-05" },
                { "Id": 2, "Name": "Crew", "farm_id": 2, "amount": "7.25", "category": "labor", "description": "harvest, crew", "date": "2024-02-01" }
            ],
            "task": [
                { "Id": 10, "title": "Spray", "due_date": "2024-05-01", "farm_id": 1, "completed": false },
                { "Id": 11, "title": "Mow", "due_date": "2024-05-03", "farm_id": 2, "completed": false }
            ],
            "weather": [
                { "date": "2024-05-01", "high": 21.0, "low": 8.0, "condition": "sunny" }
            ]
        }))
        .unwrap();
        Engine::builder().store(store).build().unwrap()
    }

    async fn run(args: &[&str]) -> Result<Output> {
        let cli = Cli::try_parse_from(std::iter::once("farmdesk").chain(args.iter().copied())).unwrap();
        execute(&engine(), cli.command, today()).await
    }

    async fn run_json(args: &[&str]) -> Value {
        match run(args).await.unwrap() {
            Output::Json(value) => value,
            other => panic!("expected JSON, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn summary_prints_category_totals() {
        assert_eq!(
            run_json(&["expenses", "summary"]).await,
            json!({ "labor": "7.25", "seed": "10.00" })
        );
    }

    #[tokio::test]
    async fn trend_and_compare() {
        let trend = run_json(&["expenses", "trend", "--period", "yearly"]).await;
        assert_eq!(trend[0]["period"], "2024");
        assert_eq!(trend[0]["total"], "17.25");

        let compare = run_json(&["expenses", "compare"]).await;
        assert_eq!(compare["2"]["total"], "7.25");
    }

    #[tokio::test]
    async fn export_writes_csv() {
        let Output::Csv { data, path } = run(&["expenses", "export", "--farm", "2"]).await.unwrap() else {
            panic!("expected CSV");
        };
        assert!(path.is_none());
        assert_eq!(
            String::from_utf8(data).unwrap(),
            "id,farm_id,date,category,amount,description\n2,2,2024-02-01,labor,7.25,\"harvest, crew\"\n"
        );
    }

    #[tokio::test]
    async fn tasks_due_today() {
        let due = run_json(&["tasks", "list", "--today"]).await;
        assert_eq!(due.as_array().unwrap().len(), 1);
        assert_eq!(due[0]["title"], "Spray");
    }

    #[tokio::test]
    async fn weather_today_uses_the_given_day() {
        let today = run_json(&["weather", "today"]).await;
        assert_eq!(today["condition"], "sunny");
    }

    #[tokio::test]
    async fn missing_record_maps_to_not_found() {
        let err = run(&["crops", "get", "9"]).await.unwrap_err();
        assert!(matches!(err, AppError::Engine(EngineError::KeyNotFound(_))));
        assert_eq!(err.exit_code(), 3);
    }

    #[tokio::test]
    async fn inverted_range_is_a_validation_error() {
        let err = run(&["expenses", "list", "--from", "2024-03-01", "--to", "2024-01-01"])
            .await
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn delete_reports_the_outcome() {
        assert_eq!(
            run_json(&["tasks", "delete", "10"]).await,
            json!({ "id": 10, "deleted": true })
        );
    }
}
