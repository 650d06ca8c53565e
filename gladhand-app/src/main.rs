use anyhow::Result;
use clap::Parser;
use gladhand_bot::ledger::{ApplicationLog, DEFAULT_LOG_PATH};
use gladhand_bot::runner::Runner;
use gladhand_bot::session::HandshakeSession;
use gladhand_common::observability::{init_logging, LogConfig};
use gladhand_config::{GladhandConfig, GladhandConfigLoader};
use gladhand_drivers::gladhand_browser::{GladhandDriver, Pacer};
use std::io::{self, Write};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "gladhand")]
#[command(about = "Auto-fills Handshake job applications from a YAML config")]
struct Cli {
    /// Attach to a Chrome already running with a remote-debugging port
    #[arg(long)]
    use_existing: bool,

    /// Remote-debugging port of the existing Chrome
    #[arg(long, default_value_t = 9222)]
    port: u16,

    /// Path to the configuration file
    #[arg(long, default_value = "gladhand.yaml")]
    config: String,

    /// Run the launched browser without a window
    #[arg(long)]
    headless: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config: GladhandConfig = GladhandConfigLoader::new().with_file(&cli.config).load()?;

    let default_filter = if config.settings.verbose_logging {
        "debug"
    } else {
        "info"
    };
    init_logging(LogConfig {
        emit_stderr: true,
        default_filter,
        ..LogConfig::default()
    })?;

    info!("starting Handshake job bot");
    if let Err(error) = run(&cli, config).await {
        error!("run failed: {error:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run(cli: &Cli, config: GladhandConfig) -> Result<()> {
    let pacer = Pacer::new(config.settings.min_wait_time, config.settings.max_wait_time);
    let settings = config.settings.clone();
    let titles = config.job_search.titles.clone();

    if cli.use_existing {
        print_startup_instructions(cli.port);
        wait_for_enter()?;

        let driver = match GladhandDriver::attach(cli.port).await {
            Ok(driver) => driver,
            Err(attach_error) => {
                print_attach_help(cli.port);
                return Err(attach_error);
            }
        };
        let session = HandshakeSession::new(driver.page(pacer), config);
        session.warn_if_off_site().await?;

        let mut runner = Runner::new(settings, ApplicationLog::open(DEFAULT_LOG_PATH));
        runner.process_results(&session).await?;

        info!(
            total = runner.total_jobs_processed(),
            "bot finished, browser left open"
        );
    } else {
        let driver = GladhandDriver::launch(cli.headless).await?;
        let session = HandshakeSession::new(driver.page(pacer), config);

        if !session.login().await? {
            error!("login failed, exiting");
            driver.close().await?;
            return Ok(());
        }
        info!("login successful");

        if !session.open_filtered_search().await? {
            error!("could not open the job search page, exiting");
            driver.close().await?;
            return Ok(());
        }

        let mut runner = Runner::new(settings, ApplicationLog::open(DEFAULT_LOG_PATH));
        runner.run_searches(&session, &titles).await?;

        driver.close().await?;
        info!(
            total = runner.total_jobs_processed(),
            "browser closed, bot finished"
        );
    }

    Ok(())
}

fn print_startup_instructions(port: u16) {
    println!("Start Chrome with: chrome --remote-debugging-port={port} --incognito");
    println!("Log into Handshake and set your filters.");
}

fn print_attach_help(port: u16) {
    eprintln!("\nERROR: could not connect to Chrome on port {port}.");
    eprintln!("Make sure Chrome is running with remote debugging enabled:");
    eprintln!("  1. Close all Chrome windows");
    eprintln!("  2. Run: chrome --remote-debugging-port={port} --incognito");
    eprintln!("  3. Log into Handshake and set your filters");
    eprintln!("  4. Re-run with --use-existing --port={port}\n");
}

fn wait_for_enter() -> Result<()> {
    print!("Press Enter when ready...");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(())
}
