//! pcl-cli: thin operator CLI, grounded on `mqk-cli`'s single-`main.rs`
//! subcommand dispatch (`Db`, `ConfigHash`, `Run`) over the same crates the
//! daemon uses — no separate business logic lives here.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pcl_daemon::bootstrap;

#[derive(Parser)]
#[command(name = "pcl")]
#[command(about = "paracle agent CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the agent's configuration hash and canonical JSON, read from
    /// environment (no config files to point at — `pcl-config` is
    /// env-driven, unlike the teacher's layered YAML).
    ConfigHash,

    /// Audit log integrity commands.
    Audit {
        #[command(subcommand)]
        cmd: AuditCmd,
    },

    /// Agent lifecycle commands.
    Run {
        #[command(subcommand)]
        cmd: RunCmd,
    },
}

#[derive(Subcommand)]
enum AuditCmd {
    /// Verify the hash chain of an audit log file.
    Verify {
        /// Path to the JSONL audit log.
        path: String,
    },
}

#[derive(Subcommand)]
enum RunCmd {
    /// Cold-start reconciliation against the chain, then persist the
    /// resulting registry snapshot and exit.
    Reconcile,

    /// Run a single heartbeat cycle against live configuration, persist
    /// the registry snapshot, and print a summary.
    Once,

    /// Run the heartbeat loop in the foreground, with no HTTP surface
    /// (use `pcl-daemon` for the observability surface). Runs until
    /// interrupted.
    Loop,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    init_tracing();

    let cli = Cli::parse();
    match cli.cmd {
        Commands::ConfigHash => {
            let config = pcl_config::AgentConfig::from_env().context("load AgentConfig")?;
            println!("config_hash={}", config.config_hash());
            println!("{}", serde_json::to_string_pretty(&config)?);
        }

        Commands::Audit { cmd } => match cmd {
            AuditCmd::Verify { path } => match pcl_audit::verify_hash_chain(&path)? {
                pcl_audit::VerifyResult::Valid { lines } => {
                    println!("audit_log_valid=true lines={lines}");
                }
                pcl_audit::VerifyResult::Broken { line, reason } => {
                    println!("audit_log_valid=false line={line} reason={reason}");
                    std::process::exit(1);
                }
            },
        },

        Commands::Run { cmd } => match cmd {
            RunCmd::Reconcile => {
                let bootstrapped = bootstrap::bootstrap().await.context("bootstrap agent")?;
                let now = chrono::Utc::now().timestamp();
                let errors = bootstrapped.controller.reconcile_cold_start(now).await;
                pcl_registry::save(&bootstrapped.paths.registry_snapshot, &*bootstrapped.controller.registry.read().await)
                    .context("save registry snapshot")?;
                println!("reconciled_pools={}", bootstrapped.controller.registry.read().await.len());
                println!("errors={}", errors.len());
                for err in &errors {
                    eprintln!("reconcile error: {err}");
                }
            }

            RunCmd::Once => {
                let bootstrapped = bootstrap::bootstrap().await.context("bootstrap agent")?;
                let now = chrono::Utc::now().timestamp();
                let report = bootstrapped.controller.heartbeat(now).await;
                pcl_registry::save(&bootstrapped.paths.registry_snapshot, &*bootstrapped.controller.registry.read().await)
                    .context("save registry snapshot")?;
                println!(
                    "cycle={} created={} cancelled={} resolved={} emergency_resolved={} social_replies={} errors={}",
                    report.cycle,
                    report.pool_created,
                    report.cancelled,
                    report.resolved,
                    report.emergency_resolved,
                    report.social_replies,
                    report.errors.len()
                );
            }

            RunCmd::Loop => {
                let bootstrapped = bootstrap::bootstrap().await.context("bootstrap agent")?;
                let interval = std::time::Duration::from_secs(bootstrapped.config.role.heartbeat_interval_secs());
                let mut ticker = tokio::time::interval(interval);
                println!("pcl-cli run loop starting, interval_secs={}", interval.as_secs());
                loop {
                    tokio::select! {
                        _ = ticker.tick() => {
                            let now = chrono::Utc::now().timestamp();
                            let report = bootstrapped.controller.heartbeat(now).await;
                            if let Err(err) = pcl_registry::save(
                                &bootstrapped.paths.registry_snapshot,
                                &*bootstrapped.controller.registry.read().await,
                            ) {
                                tracing::error!(error = %err, "failed to persist registry snapshot");
                            }
                            tracing::info!(cycle = report.cycle, resolved = report.resolved, "heartbeat");
                        }
                        _ = tokio::signal::ctrl_c() => {
                            println!("interrupted, exiting");
                            break;
                        }
                    }
                }
            }
        },
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
}
