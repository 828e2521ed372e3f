use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use payroll_app::app::Application;
use payroll_app::{BonusCalculator, SalaryAdjuster};
use payroll_kernel::settings::Settings;
use rust_decimal::Decimal;

/// Salary adjustments and performance bonuses.
#[derive(Debug, Parser)]
#[command(name = "payroll", version, about)]
struct Cli {
    /// SQLite database file; overrides `database.path` from configuration
    #[arg(long, global = true, value_name = "PATH")]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending migrations (and seed sample data when configured)
    Migrate,
    /// Change an employee's salary by a percentage; negative values cut it
    Adjust {
        employee_id: i64,
        #[arg(allow_negative_numbers = true)]
        percentage: Decimal,
    },
    /// Compute one employee's bonus for a performance rating
    Bonus {
        employee_id: i64,
        #[arg(allow_negative_numbers = true)]
        rating: i64,
    },
    /// Compute bonuses for every employee at one performance rating
    Bonuses {
        #[arg(allow_negative_numbers = true)]
        rating: i64,
    },
    /// List employees with their departments
    Employees,
    /// Run the HTTP server
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let mut settings =
        Settings::load().with_context(|| "failed to load payroll settings")?;
    if let Some(path) = cli.database {
        settings.database.path = path;
    }
    payroll_telemetry::init(&settings.telemetry)?;

    tracing::debug!(
        env = ?settings.environment,
        db = %settings.database.path.display(),
        command = ?cli.command,
        "payroll CLI starting"
    );

    let app = Application::bootstrap(settings).await?;

    match cli.command {
        Command::Serve => {
            app.serve().await?;
            Ok(ExitCode::SUCCESS)
        }
        command => {
            let result = run(&app, command);
            app.finish(result).await
        }
    }
}

/// Run a one-shot command against a bootstrapped application.
fn run(app: &Application, command: Command) -> anyhow::Result<ExitCode> {
    let code = match command {
        Command::Migrate => {
            println!("Database ready at {}", app.settings().database.path.display());
            ExitCode::SUCCESS
        }
        Command::Adjust {
            employee_id,
            percentage,
        } => {
            let outcome = SalaryAdjuster::new(app.store().clone()).apply(employee_id, percentage)?;
            println!("{outcome}");
            if outcome.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Command::Bonus {
            employee_id,
            rating,
        } => {
            let bonus = BonusCalculator::new(app.store().clone()).compute(employee_id, rating)?;
            println!("{bonus}");
            ExitCode::SUCCESS
        }
        Command::Bonuses { rating } => {
            let report = BonusCalculator::new(app.store().clone()).report(rating)?;
            for line in report {
                println!(
                    "{}\t{} {}\t{}\t{}",
                    line.employee_id, line.first_name, line.last_name, line.salary, line.bonus
                );
            }
            ExitCode::SUCCESS
        }
        Command::Employees => {
            let employees = payroll_app::modules::compensation::directory::list_employees(app.store())?;
            for employee in employees {
                println!(
                    "{}\t{} {}\t{}\t{}",
                    employee.employee_id,
                    employee.first_name,
                    employee.last_name,
                    employee.salary,
                    employee.department_name.as_deref().unwrap_or("-")
                );
            }
            ExitCode::SUCCESS
        }
        Command::Serve => anyhow::bail!("serve is not a one-shot command"),
    };

    Ok(code)
}
