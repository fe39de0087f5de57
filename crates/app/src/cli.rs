use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use engine::{CropInput, ExpenseInput, MoneyCents, Period, TaskInput};

#[derive(Debug, Parser)]
#[command(name = "farmdesk", version, about = "Farm records and expense analytics")]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,
    /// Seed an in-memory store from a JSON file instead of contacting the backend.
    #[arg(long, global = true)]
    pub fixtures: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Default, Args)]
pub struct ConnectionArgs {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    pub config: Option<String>,
    /// Override the log level.
    #[arg(long, global = true)]
    pub level: Option<String>,
    /// Override the record store base URL.
    #[arg(long, global = true)]
    pub base_url: Option<String>,
    #[arg(long, global = true)]
    pub project_id: Option<String>,
    #[arg(long, global = true)]
    pub public_key: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(subcommand)]
    Crops(CropCommand),
    #[command(subcommand)]
    Expenses(ExpenseCommand),
    #[command(subcommand)]
    Tasks(TaskCommand),
    #[command(subcommand)]
    Weather(WeatherCommand),
}

#[derive(Debug, Subcommand)]
pub enum CropCommand {
    List {
        #[arg(long)]
        farm: Option<i64>,
    },
    Get {
        id: i64,
    },
    Add(CropArgs),
    Update {
        id: i64,
        #[command(flatten)]
        crop: CropArgs,
    },
    Delete {
        id: i64,
    },
}

#[derive(Debug, Subcommand)]
pub enum ExpenseCommand {
    List {
        #[arg(long)]
        farm: Option<i64>,
        #[arg(long, value_parser = parse_day, requires = "to")]
        from: Option<NaiveDate>,
        #[arg(long, value_parser = parse_day, requires = "from")]
        to: Option<NaiveDate>,
    },
    Get {
        id: i64,
    },
    Add(ExpenseArgs),
    Update {
        id: i64,
        #[command(flatten)]
        expense: ExpenseArgs,
    },
    Delete {
        id: i64,
    },
    /// Totals per category.
    Summary {
        #[arg(long)]
        farm: Option<i64>,
    },
    /// Totals per month or year, oldest first.
    Trend {
        #[arg(long, default_value_t = Period::Monthly)]
        period: Period,
        #[arg(long)]
        farm: Option<i64>,
    },
    /// Totals per farm.
    Compare,
    /// Write expenses as CSV.
    Export {
        #[arg(long)]
        farm: Option<i64>,
        /// Destination file; stdout when omitted.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Subcommand)]
pub enum TaskCommand {
    List {
        #[arg(long)]
        farm: Option<i64>,
        /// Only tasks due today.
        #[arg(long, conflicts_with = "farm")]
        today: bool,
    },
    Get {
        id: i64,
    },
    Add(TaskArgs),
    Update {
        id: i64,
        #[command(flatten)]
        task: TaskArgs,
        #[arg(long)]
        completed: bool,
    },
    Toggle {
        id: i64,
    },
    Delete {
        id: i64,
    },
}

#[derive(Debug, Subcommand)]
pub enum WeatherCommand {
    Forecast,
    Today,
}

#[derive(Debug, Clone, Args)]
pub struct CropArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub farm: i64,
    #[arg(long)]
    pub variety: Option<String>,
    #[arg(long)]
    pub field_location: Option<String>,
    #[arg(long, value_parser = parse_day)]
    pub planting_date: Option<NaiveDate>,
    #[arg(long, value_parser = parse_day)]
    pub expected_harvest_date: Option<NaiveDate>,
    #[arg(long)]
    pub status: Option<String>,
}

impl From<CropArgs> for CropInput {
    fn from(args: CropArgs) -> Self {
        Self {
            name: args.name,
            variety: args.variety,
            field_location: args.field_location,
            planting_date: args.planting_date,
            expected_harvest_date: args.expected_harvest_date,
            status: args.status,
            farm_id: args.farm,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct ExpenseArgs {
    /// Defaults to the description.
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub farm: i64,
    #[arg(long, allow_hyphen_values = true)]
    pub amount: MoneyCents,
    #[arg(long)]
    pub category: String,
    #[arg(long, default_value = "")]
    pub description: String,
    #[arg(long, value_parser = parse_day)]
    pub date: NaiveDate,
}

impl From<ExpenseArgs> for ExpenseInput {
    fn from(args: ExpenseArgs) -> Self {
        Self {
            name: args.name,
            farm_id: args.farm,
            amount: args.amount,
            category: args.category,
            description: args.description,
            date: args.date,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct TaskArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long, value_parser = parse_day)]
    pub due: NaiveDate,
    #[arg(long)]
    pub priority: Option<String>,
    #[arg(long)]
    pub farm: i64,
    #[arg(long)]
    pub crop: Option<i64>,
}

impl From<TaskArgs> for TaskInput {
    fn from(args: TaskArgs) -> Self {
        Self {
            title: args.title,
            description: args.description,
            due_date: args.due,
            priority: args.priority,
            farm_id: args.farm,
            crop_id: args.crop,
        }
    }
}

fn parse_day(raw: &str) -> Result<NaiveDate, String> {
    engine::parse_date(raw).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_an_expense_with_a_negative_amount() {
        let cli = Cli::try_parse_from([
            "farmdesk",
            "--fixtures",
            "farm.json",
            "expenses",
            "add",
            "--farm",
            "2",
            "--amount",
            "-12.50",
            "--category",
            "refund",
            "--date",
            "2024-03-01",
        ])
        .unwrap();

        let Command::Expenses(ExpenseCommand::Add(args)) = cli.command else {
            panic!("unexpected command {:?}", cli.command);
        };
        let input = ExpenseInput::from(args);
        assert_eq!(input.amount, MoneyCents::new(-1250));
        assert_eq!(input.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(cli.fixtures, Some(PathBuf::from("farm.json")));
    }

    #[test]
    fn range_needs_both_ends() {
        assert!(Cli::try_parse_from(["farmdesk", "expenses", "list", "--from", "2024-01-01"]).is_err());
        assert!(
            Cli::try_parse_from([
                "farmdesk", "expenses", "list", "--from", "2024-01-01", "--to", "2024-01-31"
            ])
            .is_ok()
        );
    }

    #[test]
    fn bad_dates_and_periods_are_rejected() {
        assert!(Cli::try_parse_from(["farmdesk", "tasks", "add", "--title", "x", "--farm", "1", "--due", "soon"]).is_err());
        assert!(Cli::try_parse_from(["farmdesk", "expenses", "trend", "--period", "weekly"]).is_err());

        let cli = Cli::try_parse_from(["farmdesk", "expenses", "trend", "--period", "yearly"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Expenses(ExpenseCommand::Trend {
                period: Period::Yearly,
                farm: None
            })
        ));
    }
}
