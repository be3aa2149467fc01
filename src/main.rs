use std::env;

use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use expense_tracker::database::ClientStateStore;
use expense_tracker::{util, App, Client, ClientConfig};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: expense-tracker [report | login <email> | logout | theme <name>]";

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    init_tracing();

    let config = ClientConfig::from_env()?;
    let client = Client::from_config(&config)?;
    let store = ClientStateStore::open(&config.database_url)
        .await
        .with_context(|| format!("opening client state at {}", config.database_url))?;
    let mut app = App::new(client, config).with_persistence(store);

    let args: Vec<String> = env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("login") => {
            let Some(email) = args.get(2) else { bail!(USAGE) };
            app.sign_in(email).await?;
            print_report(&app);
        }
        Some("logout") => {
            app.sign_out().await;
            println!("Signed out.");
        }
        Some("theme") => {
            let Some(theme) = args.get(2) else { bail!(USAGE) };
            app.set_theme(theme).await;
            println!("Theme set to {theme}.");
        }
        Some("report") | None => match app.restore().await? {
            Some(_) => print_report(&app),
            None => println!("Not signed in. Run `expense-tracker login <email>` first."),
        },
        Some(other) => bail!("unknown command '{other}'\n{USAGE}"),
    }
    Ok(())
}

fn print_report(app: &App) {
    let cur = app.config().currency.as_str();
    let summary = app.summary();

    if let Some(identity) = app.identity() {
        println!("Finances for {identity} as of {}", util::iso(&util::today()));
    }
    println!();
    println!("Income     {cur}{}", summary.total_income);
    println!("Expenses   {cur}{}", summary.total_expenses);
    println!("Net        {cur}{}", summary.net_balance);
    println!("Budgeted   {cur}{}", summary.total_budgeted);
    println!("Saved      {cur}{}", summary.total_saved);

    let breakdown = app.expense_breakdown();
    if !breakdown.is_empty() {
        println!();
        println!("Spending by category:");
        for (key, amount) in breakdown.iter() {
            println!("  {key:<16} {cur}{amount} ({}%)", breakdown.share(key));
        }
    }

    let budgets = app.budget_report();
    if !budgets.is_empty() {
        println!();
        println!("Budgets ({} exceeded):", summary.exceeded_budgets);
        for (budget, progress) in budgets {
            println!(
                "  {} {:<14} {cur}{} / {cur}{} ({}%) {}",
                budget.category.icon(),
                budget.category.label(),
                progress.spent,
                progress.limit,
                progress.percent,
                progress.status_line()
            );
        }
    }

    let goals = app.savings_report();
    if !goals.is_empty() {
        println!();
        println!("Savings goals:");
        for (goal, progress) in goals {
            let mark = if progress.achieved { " 🎉" } else { "" };
            println!(
                "  {:<16} {cur}{} / {cur}{} ({}%){mark}",
                goal.goal, progress.saved, progress.target, progress.percent
            );
        }
    }

    if !app.notifications().is_empty() {
        println!();
        for note in app.notifications().iter() {
            println!("{} {}", note.kind.icon(), note.message);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    if env_bool("FINANCE_LOG_JSON", false) {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
