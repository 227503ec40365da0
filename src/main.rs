use clap::Parser;
use sla_report::calendar::parse_timestamp;
use sla_report::config::{load_calendar, Command, ReportArgs};
use sla_report::utils::error::{ErrorSeverity, ReportError};
use sla_report::utils::{logger, validation::Validate};
use sla_report::{BusinessDuration, CliConfig, LocalStorage, ReportEngine, SlaEvaluator, SlaPipeline};

async fn run_report(args: &ReportArgs) -> sla_report::Result<String> {
    let config = args.load_config()?;
    let period = args.period(chrono::Local::now().date_naive())?;
    tracing::info!("Reporting period {} ({} to {})", period.label(), period.start, period.end);

    let evaluator = SlaEvaluator::new(config.calendar()?, config.targets.clone(), config.teams.clone());
    let storage = LocalStorage::new(".");
    let pipeline = SlaPipeline::new(storage, config, evaluator, period);

    ReportEngine::new(pipeline).run().await
}

async fn run(cli: &CliConfig) -> sla_report::Result<()> {
    match &cli.command {
        Command::Report(args) => {
            let output_path = run_report(args).await?;
            println!("✅ SLA report completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Command::Advance {
            timestamp,
            duration,
            config,
        } => {
            let calendar = load_calendar(config.as_deref())?;
            let start = parse_timestamp(timestamp)?;
            let duration: BusinessDuration = duration.parse()?;
            println!("{}", calendar.advance(start, &duration).format("%Y-%m-%d %H:%M:%S"));
        }
        Command::Elapsed { start, end, config } => {
            let calendar = load_calendar(config.as_deref())?;
            let elapsed = calendar.elapsed(parse_timestamp(start)?, parse_timestamp(end)?)?;
            println!("{}", elapsed);
        }
    }
    Ok(())
}

fn exit_code(e: &ReportError) -> i32 {
    match e.severity() {
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = cli.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(exit_code(&e));
    }

    if let Err(e) = run(&cli).await {
        tracing::error!(
            "❌ Failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        std::process::exit(exit_code(&e));
    }

    Ok(())
}
