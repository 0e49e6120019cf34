//! mbridge entrypoint.
use anyhow::{Context, Result};
use bridge_bin::{parse_selection, replay};
use clap::Parser;
use core_bridge::Coordinator;
use core_config::load_from;
use core_engine::MiniVim;
use core_host::MemorySurface;
use core_selection::SelectionSnapshot;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "mbridge", version, about = "Replay modal keys against a text file")]
struct Args {
    /// File to load (UTF-8 text).
    pub path: PathBuf,
    /// Comma-separated logical keys, e.g. `escape,i,x,escape`.
    #[arg(long, value_delimiter = ',')]
    pub keys: Vec<String>,
    /// Initial selection as `anchor:head` character offsets.
    #[arg(long, value_parser = parse_selection)]
    pub selection: Option<(usize, usize)>,
    /// Configuration file path (overrides discovery of `mbridge.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Write the resulting text back to `path`.
    #[arg(long)]
    pub write: bool,
}

fn configure_logging(default_filter: &str) -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join("mbridge.log");
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    let file_appender = tracing_appender::rolling::never(log_dir, "mbridge.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(nb_writer)
        .try_init()
        .ok()
        .map(|_| guard)
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_from(args.config.clone())?;
    let _log_guard = configure_logging(config.log_filter());
    install_panic_hook();
    info!(target: "runtime", config = ?config.source, "startup");

    let content = std::fs::read_to_string(&args.path)
        .with_context(|| format!("reading {}", args.path.display()))?;
    let text = content.replace("\r\n", "\n");
    let name = args
        .path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("file")
        .to_owned();
    tracing::debug!(target: "io", file = %args.path.display(), size_bytes = content.len(), "file_read_ok");

    let mut surface = MemorySurface::new(&text).named(name);
    if let Some((anchor, head)) = args.selection {
        surface.select(SelectionSnapshot::from([(anchor, head)]));
    }
    let mut coordinator = Coordinator::new(MiniVim::new(), config);
    let outcome = replay(&mut coordinator, &mut surface, &args.keys)?;
    coordinator.on_surface_closed(&mut surface);

    print!("{}", outcome.text);
    eprintln!(
        "selection={:?} caret={} mode={} keys={}/{}",
        outcome.selection.pairs(),
        if outcome.wide_caret { "wide" } else { "thin" },
        outcome.mode.as_str(),
        outcome.handled,
        args.keys.len(),
    );
    if args.write {
        std::fs::write(&args.path, &outcome.text)
            .with_context(|| format!("writing {}", args.path.display()))?;
    }
    info!(target: "runtime", handled = outcome.handled, "shutdown");
    Ok(())
}
