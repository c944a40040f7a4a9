// p2pmon Linux: replays supplicant P2P callbacks (JSON lines on stdin) through the decoder.

mod config;
mod sink;

use anyhow::Context;
use p2pmon_core::{Callback, Decoder, EventSink};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::config::Output;
use crate::sink::{JsonSink, LogSink};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> anyhow::Result<()> {
    let mut interface = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => {
                println!("p2pmon-linux {}", VERSION);
                return Ok(());
            }
            "--interface" | "-i" => {
                interface = Some(args.next().context("--interface needs a value")?);
            }
            other => anyhow::bail!("unknown argument {other:?}"),
        }
    }

    let (mut cfg, config_error) = config::load();
    if let Some(name) = interface {
        cfg.interface = name;
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&cfg.log_filter))
        .with_writer(std::io::stderr)
        .init();
    if let Some(e) = config_error {
        tracing::warn!(error = %format!("{e:#}"), "config file ignored, using defaults");
    }
    tracing::info!(iface = %cfg.interface, output = ?cfg.output, "p2pmon {} starting", VERSION);

    let decoder = Decoder::new(cfg.interface.clone());
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        tokio::select! {
            res = run(&decoder, cfg.output) => res,
            res = shutdown_signal() => res,
        }
    })
}

/// Per-run counters, logged on exit.
#[derive(Debug, Default)]
struct Stats {
    lines: u64,
    unparsable: u64,
    unmapped: u64,
}

async fn run(decoder: &Decoder, output: Output) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut log_sink = LogSink;
    let mut json_sink = JsonSink::default();
    let mut stats = Stats::default();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        stats.lines += 1;
        let callback: Callback = match serde_json::from_str(line) {
            Ok(cb) => cb,
            Err(e) => {
                stats.unparsable += 1;
                tracing::warn!(line = stats.lines, error = %e, "unparsable callback");
                continue;
            }
        };
        let sink: &mut dyn EventSink = match output {
            Output::Log => &mut log_sink,
            Output::Json => &mut json_sink,
        };
        // Unmapped statuses are already logged by the decoder; keep going.
        if decoder.deliver(&callback, sink).is_err() {
            stats.unmapped += 1;
        }
        for out in json_sink.drain() {
            stdout.write_all(out.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
        }
        stdout.flush().await?;
    }
    tracing::info!(
        lines = stats.lines,
        unparsable = stats.unparsable,
        unmapped = stats.unmapped,
        "input closed"
    );
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM (Unix).
async fn shutdown_signal() -> anyhow::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
    }
    tracing::info!("shutdown signal received");
    Ok(())
}
