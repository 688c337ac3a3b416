use std::path::PathBuf;
use std::process::ExitCode;

use quest_tracker::quest::{HotReloadEvent, LoadReport};
use quest_tracker::{EngineBuilder, TrackerConfig};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn log_report(report: &LoadReport) {
    info!("{} quests loaded: {:?}", report.loaded.len(), report.loaded);
    for disabled in &report.disabled_tasks {
        warn!(
            "Task '{}' of quest '{}' is disabled ({} problems)",
            disabled.task_id,
            disabled.quest_id,
            disabled.problems.len()
        );
    }
    for rejected in &report.rejected_files {
        warn!("Rejected {:?}: {}", rejected.path, rejected.reason);
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quest_tracker=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("tracker.toml"));

    let config = match TrackerConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let engine = EngineBuilder::from_config(&config).build();
    info!(
        "Quest tracker starting ({} task types, {} platform)",
        engine.task_types().len(),
        engine.platform_name()
    );

    match engine.load_quests() {
        Ok(report) => log_report(&report),
        Err(e) => {
            error!("Failed to load quests: {}", e);
            return ExitCode::FAILURE;
        }
    }

    if !config.watch {
        return ExitCode::SUCCESS;
    }

    let mut rx = match engine.quests().start_watcher() {
        Ok(rx) => rx,
        Err(e) => {
            error!("Failed to start quest watcher: {}", e);
            return ExitCode::FAILURE;
        }
    };

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(HotReloadEvent::Reloaded(report)) => log_report(&report),
                Some(HotReloadEvent::Error(e)) => error!("Quest hot-reload error: {}", e),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
        }
    }

    ExitCode::SUCCESS
}
