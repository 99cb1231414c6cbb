use crate::cli::commands::{Cli, Commands};
use aios::config::Config;
use aios::cycle::ControlLoop;
use aios::events::JsonlEventSink;
use aios::executor::{ActionExecutor, LogEffector};
use aios::gate::SafetyGate;
use aios::memory::{ChangeDetector, ChangeDetectorOptions};
use aios::observability::create_observer;
use aios::reasoner::{RetryPolicy, RuleReasoner};
use aios::types::{ActionPlan, ObservationEvent};
use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn open_detector(config: &Config) -> Result<ChangeDetector> {
    let path = config.memory.state_path();
    let options = ChangeDetectorOptions {
        ui_preview_chars: config.memory.ui_preview_chars,
    };
    ChangeDetector::open(&path, options)
        .with_context(|| format!("Failed to open change log {}", path.display()))
}

fn build_loop(config: &Config, force_dry_run: bool) -> Result<ControlLoop> {
    let detector = open_detector(config)?;
    let gate = SafetyGate::from_config(&config.gate);
    let executor = ActionExecutor::from_config(Arc::new(LogEffector::new()), &config.executor);
    let reasoner =
        RuleReasoner::from_config(&config.reasoner).with_dry_run(config.reasoner.dry_run || force_dry_run);
    let sink = JsonlEventSink::open(config.events.log_path())?;
    let observer = create_observer(&config.observability);

    info!(
        gate = %gate.mode(),
        effector = executor.effector_name(),
        events = %sink.path().display(),
        "control loop ready"
    );

    Ok(
        ControlLoop::new(detector, gate, executor, Arc::new(reasoner), Arc::new(sink))
            .with_observer(Arc::from(observer))
            .with_history_limit(config.memory.history_limit)
            .with_retry_policy(RetryPolicy::from(&config.reasoner)),
    )
}

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Observe { file } => {
            let observation: ObservationEvent = read_document(&file)?;
            let mut detector = open_detector(&config)?;
            let change = detector.update(&observation);
            detector.save()?;
            print_json(&change)
        }
        Commands::History { filter, limit } => {
            let detector = open_detector(&config)?;
            let limit = limit.unwrap_or(config.memory.history_limit);
            print_json(&detector.query(&filter, limit))
        }
        Commands::Verify { plan } => {
            let plan: ActionPlan = read_document(&plan)?;
            let verified = SafetyGate::from_config(&config.gate).verify(&plan);
            print_json(&verified)
        }
        Commands::Cycle {
            observation,
            dry_run,
        } => {
            let observation: ObservationEvent = read_document(&observation)?;
            let mut control = build_loop(&config, dry_run)?;
            let report = control.run_cycle(observation).await?;
            print_json(&report)
        }
    }
}
