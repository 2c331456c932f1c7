//! Fixed Deposit Planner CLI
//!
//! Command-line interface for projecting, saving and tracking fixed deposits

use std::io::Write;
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;

use fd_planner::advisory::{AdvisoryPanel, RuleBasedAdvisor};
use fd_planner::deposit::load_deposits;
use fd_planner::format::{format_currency, format_long_date, Certificate};
use fd_planner::portfolio::{nearest_active, DepositStatus};
use fd_planner::storage::FileStore;
use fd_planner::timing::SystemClock;
use fd_planner::{
    CompoundingFrequency, Config, CountdownTicker, DepositEngine, DepositInput, DepositRepository,
    EarlyWithdrawal, FdError, PortfolioSummary, SavedDeposit, TenureType, UserProfile,
};

#[derive(Debug, Parser)]
#[command(name = "fd-planner", version, about = "Plan and track fixed deposits")]
struct Cli {
    /// Directory holding saved data (overrides FD_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Minimum principal (overrides FD_MINIMUM_PRINCIPAL)
    #[arg(long, global = true)]
    minimum: Option<f64>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Project a deposit to maturity
    Calculate {
        #[arg(long)]
        principal: f64,
        /// Annual rate in percent
        #[arg(long)]
        rate: f64,
        #[arg(long)]
        tenure: u32,
        /// years, months or days
        #[arg(long, default_value = "years")]
        unit: TenureType,
        /// yearly, half-yearly, quarterly, monthly (or 1, 2, 4, 12)
        #[arg(long, default_value = "quarterly")]
        compounding: CompoundingFrequency,
        /// Start date, YYYY-MM-DD (default today)
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        title: Option<String>,
        /// Save the deposit
        #[arg(long)]
        save: bool,
        /// Add advisory commentary
        #[arg(long)]
        advice: bool,
    },
    /// Preview withdrawing a saved deposit early
    EarlyExit {
        id: String,
        /// Withdrawal date, YYYY-MM-DD (default today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// List saved deposits
    List,
    /// Delete a saved deposit
    Delete { id: String },
    /// Delete all saved deposits
    Reset {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
    /// Portfolio totals and the next maturity
    Summary,
    /// Live countdown to a deposit's maturity (nearest active by default)
    Countdown {
        id: Option<String>,
        /// Stop after this many refreshes
        #[arg(long)]
        ticks: Option<u64>,
    },
    /// Print a certificate for a saved deposit
    Certificate { id: String },
    /// Show or update the holder profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Project deposits listed in a CSV file
    Import {
        path: PathBuf,
        /// Save every deposit that meets the minimum
        #[arg(long)]
        save: bool,
    },
}

#[derive(Debug, Subcommand)]
enum ProfileAction {
    Show,
    Set {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        address: String,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EarlyExitReport<'a> {
    deposit: &'a SavedDeposit,
    withdrawal_date: NaiveDate,
    remaining_days: i64,
    growth_pct: f64,
    #[serde(flatten)]
    withdrawal: EarlyWithdrawal,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryReport {
    #[serde(flatten)]
    summary: PortfolioSummary,
    next_maturity: Option<DepositStatus>,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn print_deposit_table(deposits: &[SavedDeposit]) {
    println!(
        "{:<36} {:<20} {:>14} {:>7} {:>10} {:>18} {:>16}",
        "Id", "Title", "Principal", "Rate", "Tenure", "Maturity Date", "Maturity Value"
    );
    println!("{}", "-".repeat(127));
    for d in deposits {
        println!(
            "{:<36} {:<20} {:>14} {:>6}% {:>10} {:>18} {:>16}",
            d.id,
            truncate(&d.display_title(), 20),
            format_currency(d.input.principal),
            d.input.rate,
            format!("{} {}", d.input.tenure_value, d.input.tenure_type),
            format_long_date(d.maturity_date()),
            format_currency(d.result.maturity_amount),
        );
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let cut: String = text.chars().take(width.saturating_sub(1)).collect();
        format!("{}~", cut)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(dir) = cli.data_dir.clone() {
        config.data_dir = dir;
    }
    if let Some(minimum) = cli.minimum {
        config.set_minimum_principal(minimum);
    }

    let engine = DepositEngine::new(config.engine_config());
    let store = FileStore::open(&config.data_dir)
        .with_context(|| format!("opening data directory {}", config.data_dir.display()))?;
    log::debug!("Using data directory {}", store.dir().display());
    let mut repo = DepositRepository::new(store);

    match cli.command {
        Command::Calculate {
            principal,
            rate,
            tenure,
            unit,
            compounding,
            start,
            title,
            save,
            advice,
        } => {
            let mut input = DepositInput::new(
                principal,
                rate,
                tenure,
                unit,
                compounding,
                start.unwrap_or_else(today),
            );
            input.title = title;
            let result = engine.checked_project(&input)?;

            let advice_text = if advice {
                let panel = AdvisoryPanel::new(RuleBasedAdvisor::default());
                Some(panel.fetch_display(&input, &result).await)
            } else {
                None
            };

            let saved = if save {
                let id = uuid::Uuid::new_v4().to_string();
                Some(repo.save_new(&engine, input.clone(), id, Utc::now().timestamp_millis())?)
            } else {
                None
            };

            if cli.json {
                print_json(&serde_json::json!({
                    "input": input,
                    "result": result,
                    "savedId": saved.as_ref().map(|s| s.id.clone()),
                    "advice": advice_text,
                }))?;
            } else {
                println!("Maturity Value:    {}", format_currency(result.maturity_amount));
                println!("Total Interest:    {}", format_currency(result.total_interest));
                println!("Maturity Date:     {}", format_long_date(result.maturity_date));
                println!("Exit Penalty:      {}", format_currency(result.penalty_amount));
                println!("Early Exit Payout: {}", format_currency(result.early_exit_amount));
                if let Some(saved) = &saved {
                    println!("\nSaved as {}", saved.id);
                }
                if let Some(text) = &advice_text {
                    println!("\nAdvice:\n{}", text);
                }
            }
        }

        Command::EarlyExit { id, date } => {
            let deposit = repo.get(&id)?;
            let withdrawal_date = date.unwrap_or_else(today);
            let withdrawal = engine.early_withdrawal(
                deposit.input.principal,
                deposit.input.rate,
                deposit.start_date(),
                withdrawal_date,
            );
            let report = EarlyExitReport {
                deposit: &deposit,
                withdrawal_date,
                remaining_days: EarlyWithdrawal::remaining_days(deposit.maturity_date(), withdrawal_date),
                growth_pct: withdrawal.growth_pct(deposit.input.principal),
                withdrawal,
            };

            if cli.json {
                print_json(&report)?;
            } else {
                println!("Early Withdrawal Preview: {}", deposit.display_title());
                println!("  Withdrawal date:   {}", format_long_date(withdrawal_date));
                println!("  Remaining term:    {} days", report.remaining_days);
                println!("  Principal:         {}", format_currency(deposit.input.principal));
                println!("  Accrued interest: +{}", format_currency(withdrawal.accrued_interest));
                println!(
                    "  Penalty ({:.0}%):    -{}",
                    withdrawal.penalty_share_pct(),
                    format_currency(withdrawal.penalty)
                );
                println!("  Net payout:        {}", format_currency(withdrawal.payout));
                println!("  Growth:            {:+.2}%", report.growth_pct);
            }
        }

        Command::List => {
            let deposits = repo.list()?;
            if cli.json {
                print_json(&deposits)?;
            } else if deposits.is_empty() {
                println!("No saved deposits");
            } else {
                print_deposit_table(&deposits);
            }
        }

        Command::Delete { id } => {
            let removed = repo.delete(&id)?;
            println!("Deleted {} ({})", removed.id, removed.display_title());
        }

        Command::Reset { yes } => {
            if !yes {
                bail!("this deletes every saved deposit; re-run with --yes to confirm");
            }
            let count = repo.reset()?;
            println!("Deleted {} deposits", count);
        }

        Command::Summary => {
            let deposits = repo.list()?;
            let now = Utc::now();
            let report = SummaryReport {
                summary: PortfolioSummary::from_deposits(&deposits),
                next_maturity: nearest_active(&deposits, now).map(|d| DepositStatus::at(d, now)),
            };

            if cli.json {
                print_json(&report)?;
            } else {
                let s = &report.summary;
                println!("Deposits:        {}", s.deposit_count);
                println!("Total principal: {}", format_currency(s.total_principal));
                println!("Total value:     {}", format_currency(s.total_value));
                println!("Total interest:  {}", format_currency(s.total_interest));
                println!("Yield:           {:.2}%", s.yield_pct);
                match &report.next_maturity {
                    Some(status) => {
                        println!("\nNext maturity: {}", status.title);
                        println!("  Progress:  {:.1}%", status.progress_pct);
                        println!("  Remaining: {}", status.remaining);
                    }
                    None => println!("\nNo active deposits"),
                }
            }
        }

        Command::Countdown { id, ticks } => {
            let deposits = repo.list()?;
            let deposit = match id {
                Some(id) => deposits
                    .iter()
                    .find(|d| d.id == id)
                    .with_context(|| format!("deposit {} not found", id))?,
                None => match nearest_active(&deposits, Utc::now()) {
                    Some(d) => d,
                    None => {
                        println!("No active deposits");
                        return Ok(());
                    }
                },
            };

            println!(
                "{} matures on {}",
                deposit.display_title(),
                format_long_date(deposit.maturity_date())
            );

            let mut seen = 0u64;
            let json = cli.json;
            let ticker = CountdownTicker::start(
                deposit.maturity_date(),
                config.tick_interval,
                Arc::new(SystemClock),
                move |remaining| {
                    seen += 1;
                    if json {
                        if let Ok(line) = serde_json::to_string(remaining) {
                            println!("{}", line);
                        }
                    } else {
                        print!("\r{:<24}", remaining.to_string());
                        let _ = std::io::stdout().flush();
                    }
                    match ticks {
                        Some(limit) if seen >= limit => ControlFlow::Break(()),
                        _ => ControlFlow::Continue(()),
                    }
                },
            );
            ticker.join().await;
            if !json {
                println!();
            }
        }

        Command::Certificate { id } => {
            let deposit = repo.get(&id)?;
            let profile = repo.profile()?;
            println!("{}", Certificate::for_deposit(&deposit, profile.as_ref()));
        }

        Command::Profile { action } => match action {
            ProfileAction::Show => {
                let profile = repo.profile()?.unwrap_or_default();
                if cli.json {
                    print_json(&profile)?;
                } else {
                    println!("Name:    {}", profile.name);
                    println!("Address: {}", profile.address);
                }
            }
            ProfileAction::Set { name, address } => {
                repo.save_profile(&UserProfile::new(name, address))?;
                println!("Profile saved");
            }
        },

        Command::Import { path, save } => {
            let inputs = load_deposits(&path)
                .with_context(|| format!("importing {}", path.display()))?;
            let results = engine.project_batch(&inputs);
            if let Some(row) = results.iter().position(|r| !r.is_finite()) {
                bail!(
                    "row {} of {}: projected amounts are too large to represent",
                    row + 1,
                    path.display()
                );
            }

            let mut saved = Vec::new();
            if save {
                let created_at = Utc::now().timestamp_millis();
                for input in &inputs {
                    let id = uuid::Uuid::new_v4().to_string();
                    match repo.save_new(&engine, input.clone(), id, created_at) {
                        Ok(deposit) => saved.push(deposit),
                        Err(FdError::InvalidInput { field, reason }) => {
                            log::warn!("Skipping deposit ({}): {}", field, reason);
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
            }

            if cli.json {
                let rows: Vec<_> = inputs
                    .iter()
                    .zip(&results)
                    .map(|(input, result)| serde_json::json!({ "input": input, "result": result }))
                    .collect();
                print_json(&rows)?;
            } else {
                println!(
                    "{:<20} {:>14} {:>7} {:>10} {:>18} {:>16}",
                    "Title", "Principal", "Rate", "Tenure", "Maturity Date", "Maturity Value"
                );
                println!("{}", "-".repeat(90));
                for (input, result) in inputs.iter().zip(&results) {
                    println!(
                        "{:<20} {:>14} {:>6}% {:>10} {:>18} {:>16}",
                        truncate(input.title.as_deref().unwrap_or("-"), 20),
                        format_currency(input.principal),
                        input.rate,
                        format!("{} {}", input.tenure_value, input.tenure_type),
                        format_long_date(result.maturity_date),
                        format_currency(result.maturity_amount),
                    );
                }
                if save {
                    println!("\nSaved {} of {} deposits", saved.len(), inputs.len());
                }
            }
        }
    }

    Ok(())
}
