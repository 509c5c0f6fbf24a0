use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use live_mirror::config::{load_config, validate_config, Config, DEFAULT_CONFIG_PATH};

#[derive(Parser, Debug)]
#[command(name = "live-mirror", version)]
#[command(about = "Mirror a running game client's actor table once per frame")]
struct Args {
    /// Configuration file; defaults are used when it does not exist
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH, env = "LIVE_MIRROR_CONFIG")]
    config: PathBuf,

    /// Process id to attach to, overriding `process.pid`
    pid: Option<u32>,

    /// Print local data as a JSON line after every refresh
    #[arg(long)]
    json: bool,
}

fn init_logging(level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(format!("live_mirror={}", level))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args.config)
        .with_context(|| format!("failed to load {}", args.config.display()))?;
    init_logging(&config.logging.level)?;
    validate_config(&config)?;

    info!("Starting live-mirror v{}", env!("CARGO_PKG_VERSION"));

    let pid = args
        .pid
        .or(config.process.pid)
        .context("no process id: pass one on the command line or set process.pid")?;

    run(pid, &config, args.json).await
}

#[cfg(any(windows, target_os = "linux"))]
async fn run(pid: u32, config: &Config, json: bool) -> Result<()> {
    use live_mirror::engine::{Engine, TickOutcome};
    use live_mirror::mesh::CellMeshBuilder;
    use live_mirror::process::ProcessHandle;
    use std::time::Instant;
    use tokio::time::MissedTickBehavior;
    use tracing::warn;

    let handle = ProcessHandle::open_for_read(pid)?;
    let table = config.address_table()?;
    info!(
        pid,
        build = table.build(),
        entries = table.len(),
        "Attached; press Ctrl+C to stop"
    );

    let mut engine = Engine::new(&handle, &table, config.engine_settings(), CellMeshBuilder);
    let mut interval = tokio::time::interval(config.poll_interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutting down");
                break;
            }
            _ = interval.tick() => match engine.update(Instant::now()) {
                TickOutcome::Refreshed { frame } if json => {
                    let world = engine.current_world();
                    let line = serde_json::json!({
                        "frame": frame,
                        "entities": world.entities.live().count(),
                        "local": world.local.as_ref(),
                        "health": engine.health(),
                    });
                    println!("{}", line);
                }
                TickOutcome::Failed(error) if error.is_handle_invalid() => {
                    warn!(pid, "Target process exited");
                    break;
                }
                _ => {}
            },
        }
    }

    info!(
        last_frame = ?engine.last_seen_frame(),
        mesh_generation = engine.mesh_generation(),
        "Stopped"
    );
    Ok(())
}

#[cfg(not(any(windows, target_os = "linux")))]
async fn run(_pid: u32, _config: &Config, _json: bool) -> Result<()> {
    anyhow::bail!("live-mirror has no process backend for this platform")
}
