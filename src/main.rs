use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use relishplus::abstractions::{DriverExecutor, EnvCredentialProvider};
use relishplus::app::{handle_fatal_error, init_logging, AppConfig};
use relishplus::config::{Config, ConfigLoader};
use relishplus::error::{AppResult, RelishError};
use relishplus::interaction::ConsoleDisplay;
use relishplus::menu::MenuItem;
use relishplus::ordering::{BrowsingSession, OrderingOrchestrator};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Order catered meals for the days ahead
#[derive(Parser)]
#[command(name = "relishplus", version)]
#[command(about = "Order subsidized lunch and dinner across a rolling schedule", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Order every open meal in the window (default command)
    Run(RunArgs),
    /// Print the slots and date pages a run would visit
    Plan(WindowArgs),
    /// Show what would be ordered from a menu file
    Preview {
        /// JSON array of menu items
        #[arg(long)]
        menu: PathBuf,
    },
    /// Load and validate configuration, then print the effective settings
    CheckConfig,
}

#[derive(Args, Default)]
struct WindowArgs {
    /// Number of days to cover (default from config, else 6)
    #[arg(long)]
    days: Option<u32>,

    /// First date, YYYY-MM-DD (default: today)
    #[arg(long)]
    start: Option<NaiveDate>,
}

#[derive(Args, Default)]
struct RunArgs {
    #[command(flatten)]
    window: WindowArgs,

    /// Abort the whole run after this long, e.g. "10m"
    #[arg(long, value_parser = humantime_serde::re::humantime::parse_duration)]
    timeout: Option<Duration>,

    /// Browser driver command line (overrides `driver` in the config)
    #[arg(long)]
    driver: Option<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let app_config = AppConfig::new(cli.verbose);
    init_logging(&app_config);

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => handle_fatal_error(e, app_config.verbose),
    }
}

/// Returns whether the command fully succeeded
async fn run(cli: Cli) -> AppResult<bool> {
    let loaded = ConfigLoader::new(cli.config).load().await?;
    let config = loaded.config;

    match cli.command.unwrap_or(Commands::Run(RunArgs::default())) {
        Commands::Run(args) => run_orders(&config, args).await,
        Commands::Plan(args) => {
            print_plan(&config, &args)?;
            Ok(true)
        }
        Commands::Preview { menu } => preview_menu(&config, menu).await,
        Commands::CheckConfig => {
            println!("Configuration: {}", loaded.source);
            print_config(&config);
            Ok(true)
        }
    }
}

async fn run_orders(config: &Config, args: RunArgs) -> AppResult<bool> {
    let window = config.window(args.window.days, args.window.start)?;
    let settings = config.ordering_settings(window)?;
    let driver = args
        .driver
        .or_else(|| config.driver.clone())
        .ok_or_else(|| {
            RelishError::config("no browser driver configured; pass --driver or set `driver`")
        })?;

    let executor = DriverExecutor::spawn(&driver)?;
    let session = BrowsingSession::new(executor).with_action_timeout(config.action_timeout);
    let orchestrator = OrderingOrchestrator::new(settings, Arc::new(ConsoleDisplay::new()));

    let report = orchestrator
        .run(session, &EnvCredentialProvider, cancel_signal(args.timeout))
        .await?;

    println!("\n{}", report.summary());
    Ok(report.success())
}

/// Resolves on Ctrl-C or when `timeout` elapses, whichever comes first
async fn cancel_signal(timeout: Option<Duration>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };
    let deadline = async {
        match timeout {
            Some(limit) => tokio::time::sleep(limit).await,
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl-C"),
        _ = deadline => warn!("Run timed out after {:?}", timeout.unwrap_or_default()),
    }
}

fn print_plan(config: &Config, args: &WindowArgs) -> AppResult<()> {
    let window = config.window(args.days, args.start)?;
    let urls = config.site_urls()?;
    println!(
        "{} slot(s) over {} day(s) starting {}",
        window.slots().len(),
        window.day_count(),
        window.start_date()
    );
    for slot in window.slots() {
        println!("{:<22} {}", slot.to_string(), urls.date_url(slot.date));
    }
    Ok(())
}

async fn preview_menu(config: &Config, path: PathBuf) -> AppResult<bool> {
    let content = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("Failed to read menu file {}", path.display()))?;
    let menu: Vec<MenuItem> = serde_json::from_str(&content)
        .with_context(|| format!("Menu file {} is not a JSON array of items", path.display()))?;

    let budget = config.budget;
    let cart = config
        .selection_policy()
        .fill_cart(&menu, &config.dietary_preferences, &budget);

    if cart.is_empty() {
        println!(
            "Nothing on this menu fits ({}) within {}",
            config.dietary_preferences.label(),
            budget.max_pretax_total()
        );
        return Ok(false);
    }

    for item in cart.items() {
        println!("  {:<32} {:>8}", item.name, item.pretax_price.to_string());
    }
    println!(
        "Subtotal {} (target {}, cap {}){}",
        cart.subtotal(),
        budget.min_subsidy_target(),
        budget.max_pretax_total(),
        if budget.target_met(cart.subtotal()) {
            ""
        } else {
            " - below subsidy target"
        }
    );
    Ok(true)
}

fn print_config(config: &Config) {
    println!("{}", config.dietary_preferences.describe());
    if !config.preferred_cuisines.is_empty() {
        println!("Preferred cuisines: {}", config.preferred_cuisines.join(", "));
    }
    println!(
        "Budget: target {}, cap {}",
        config.budget.min_subsidy_target(),
        config.budget.max_pretax_total()
    );
    println!("Days: {}", config.schedule.days);
    println!("Site: {}", config.site.base_url);
    println!(
        "Selection: priority tags [{}], strategy {:?}",
        config.selection.priority_tags.join(", "),
        config.selection.strategy
    );
    if let Some(instructions) = config.delivery_instructions() {
        println!("Delivery instructions: {instructions}");
    }
    if let Some(timeout) = config.action_timeout {
        println!(
            "Action timeout: {}",
            humantime_serde::re::humantime::format_duration(timeout)
        );
    }
    match &config.driver {
        Some(driver) => println!("Driver: {driver}"),
        None => println!("Driver: not set (pass --driver to run)"),
    }
}
