//! Seine main entry point
//!
//! This is the command-line interface for the Seine social post harvester.

use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use seine::config::{load_config, Config, RunState, Secrets};
use seine::harvest::{CancelFlag, Coordinator, DateWindow, ProgressEvent};
use seine::matcher::parse_keywords;
use seine::platform::{
    AuthState, FeedClient, Gateway, HttpStreamTransport, Platform, RetryPolicy, StreamClient,
    StreamSession, WallClient,
};
use seine::resolve::{load_targets, TargetSet};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Seine: a multi-platform social post harvester
///
/// Seine reads a spreadsheet of community links, fetches their recent posts
/// from the corresponding platform APIs, filters them by keyword and date
/// window, and merges the matches into a spreadsheet report.
#[derive(Parser, Debug)]
#[command(name = "seine")]
#[command(version = "1.0.0")]
#[command(about = "A multi-platform social post harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Spreadsheet with target links (column A) and names (column B)
    #[arg(long, value_name = "XLSX")]
    targets: PathBuf,

    /// Keywords separated by ';' (e.g. "sale;discount")
    #[arg(long)]
    keywords: String,

    /// First date of the harvest window (YYYY-MM-DD)
    #[arg(long)]
    from: NaiveDate,

    /// Second date of the harvest window (YYYY-MM-DD)
    #[arg(long)]
    to: NaiveDate,

    /// Validate config, resolve targets and show what would be harvested
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Credentials may come from a local .env file
    let _ = dotenvy::dotenv();

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = load_config(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;

    let keywords = parse_keywords(&cli.keywords);
    anyhow::ensure!(!keywords.is_empty(), "no keywords given");

    tracing::info!("Loading targets from: {}", cli.targets.display());
    let targets = load_targets(&cli.targets)?;
    anyhow::ensure!(!targets.is_empty(), "no resolvable targets found");
    tracing::info!("Resolved {} targets", targets.len());

    let window = DateWindow::from_selection(cli.from, cli.to);

    if cli.dry_run {
        handle_dry_run(&config, &targets, &keywords, &window);
        return Ok(());
    }

    handle_harvest(config, cli.targets, targets, keywords, window).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("seine=info,warn"),
            1 => EnvFilter::new("seine=debug,info"),
            2 => EnvFilter::new("seine=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows what would be harvested without
/// touching the network
fn handle_dry_run(config: &Config, targets: &TargetSet, keywords: &[String], window: &DateWindow) {
    println!("=== Seine Dry Run ===\n");

    println!("Harvest Configuration:");
    println!("  Concurrency: {}", config.harvest.concurrency);
    println!("  Max posts per target: {}", config.harvest.max_posts_per_target);
    println!("  Page size: {}", config.harvest.page_size);
    println!("  Base delay: {}ms", config.harvest.base_delay_ms);
    println!("  Max attempts: {}", config.harvest.max_attempts);

    println!("\nOutput:");
    println!("  Save directory: {}", config.output.save_dir);

    println!("\nWindow: {} .. {} (exclusive)", window.start(), window.end());

    println!("\nKeywords ({}):", keywords.len());
    for keyword in keywords {
        println!("  - {}", keyword);
    }

    println!("\nTargets ({}):", targets.len());
    for target in targets.iter() {
        println!(
            "  - [{}] {} ({})",
            target.platform, target.display_name, target.platform_id
        );
    }

    println!("\nTarget set hash: {}", targets.content_hash());
    println!("\n✓ Configuration is valid");
}

/// Handles the main harvest operation
async fn handle_harvest(
    config: Config,
    targets_file: PathBuf,
    targets: TargetSet,
    keywords: Vec<String>,
    window: DateWindow,
) -> anyhow::Result<()> {
    let save_dir = PathBuf::from(&config.output.save_dir);
    std::fs::create_dir_all(&save_dir)
        .with_context(|| format!("failed to create {}", save_dir.display()))?;

    let run_state = RunState::load(&save_dir)?;
    let current_hash = targets.content_hash();

    let secrets = Secrets::from_env();
    let coordinator = build_coordinator(&config, &targets, &secrets).await?;

    let cancel = CancelFlag::new();
    spawn_interrupt_handler(cancel.clone());

    let (progress_tx, progress_rx) = mpsc::unbounded_channel();
    let progress_task = tokio::spawn(log_progress(progress_rx));

    let summary = coordinator
        .run(&targets, &keywords, window, cancel, Some(progress_tx))
        .await;

    let _ = progress_task.await;

    tracing::info!(
        "Harvest finished: {} targets matched, {} empty",
        summary.matched.len(),
        summary.empties.len()
    );

    let report_path = seine::report::merge(
        &save_dir,
        chrono::Utc::now().date_naive(),
        &summary,
        &current_hash,
        run_state.last_target_hash.as_deref(),
    )?;

    RunState {
        last_targets_file: Some(targets_file.display().to_string()),
        last_target_hash: Some(current_hash),
    }
    .save(&save_dir)?;

    println!("✓ Report written to: {}", report_path.display());
    Ok(())
}

/// Builds the coordinator with a client per platform present in the target
/// set
///
/// Credentials are only required for platforms that actually occur, so a
/// wall-only run works without stream credentials set.
async fn build_coordinator(
    config: &Config,
    targets: &TargetSet,
    secrets: &Secrets,
) -> anyhow::Result<Coordinator> {
    let gateway = Arc::new(Gateway::new(RetryPolicy::from_config(&config.harvest))?);
    let mut coordinator = Coordinator::new(config.harvest.concurrency);

    let has = |platform: Platform| targets.iter().any(|t| t.platform == platform);

    if has(Platform::Vk) {
        let client = WallClient::with_base_url(
            gateway.clone(),
            secrets.wall_token()?.to_string(),
            config.platforms.wall_api_version.clone(),
            config.harvest.page_size,
            config.harvest.max_posts_per_target,
            &config.platforms.wall_base_url,
        )?;
        coordinator.register(Arc::new(client));
    }

    if has(Platform::Ok) {
        let client = FeedClient::with_base_url(
            gateway.clone(),
            secrets.feed_application_key()?.to_string(),
            secrets.feed_access_token()?.to_string(),
            config.harvest.page_size,
            config.harvest.max_posts_per_target,
            &config.platforms.feed_base_url,
        )?;
        coordinator.register(Arc::new(client));
    }

    if has(Platform::Tg) {
        let transport = HttpStreamTransport::new(
            &config.platforms.stream_base_url,
            secrets.stream_api_id()?.to_string(),
            secrets.stream_api_hash()?.to_string(),
        )?;
        let mut session = StreamSession::new(Box::new(transport));
        login_stream(&mut session, secrets.stream_phone()?).await?;

        let client = StreamClient::new(
            Arc::new(Mutex::new(session)),
            config.harvest.page_size,
        );
        coordinator.register(Arc::new(client));
    }

    Ok(coordinator)
}

/// Walks the stream session through its sign-in flow, prompting on stdin for
/// the login code and, when the account has one, the two-factor password
async fn login_stream(session: &mut StreamSession, phone: &str) -> anyhow::Result<()> {
    tracing::info!("Requesting stream login code for {}", phone);
    session.submit_phone(phone).await?;

    let code = prompt("Enter the login code: ")?;
    let state = session.submit_code(code.trim()).await?;

    if state == AuthState::AwaitingTwoFactor {
        let password = prompt("Enter the two-factor password: ")?;
        session.submit_password(password.trim()).await?;
    }

    tracing::info!("Stream session authenticated");
    Ok(())
}

/// Reads one line from stdin after printing a label
fn prompt(label: &str) -> std::io::Result<String> {
    print!("{label}");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line)
}

/// Turns the first Ctrl-C into a cooperative cancellation request
fn spawn_interrupt_handler(cancel: CancelFlag) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight work");
            cancel.cancel();
        }
    });
}

/// Logs progress events until the harvest signals it is finished
async fn log_progress(mut receiver: mpsc::UnboundedReceiver<ProgressEvent>) {
    while let Some(event) = receiver.recv().await {
        match event {
            ProgressEvent::Status { percent, message } => {
                tracing::info!("[{percent:>3}%] {message}");
            }
            ProgressEvent::Finished => break,
        }
    }
}
