mod adapter;
mod backup;
mod config;
mod db;
mod error;
mod ipc;
mod ledger;
mod model;
mod rules;
mod seed;
mod store;
mod validate;
mod workspace;

use std::io::{self, BufRead, Write};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_logging(filter: &str) {
    // stdout carries the IPC stream; logs go to stderr.
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    let config = match config::DaemonConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            init_logging("info");
            error!(error = %e, "invalid configuration");
            std::process::exit(2);
        }
    };
    init_logging(&config.log_filter);
    info!(
        version = env!("CARGO_PKG_VERSION"),
        storage = config.storage.as_str(),
        "schooladmind starting"
    );

    let mut state = ipc::AppState::new(config.storage);
    if let Some(path) = config.workspace.as_deref() {
        match workspace::Workspace::open(path, config.storage) {
            Ok(ws) => state.workspace = Some(ws),
            Err(e) => warn!(workspace = %path.display(), error = ?e, "startup workspace not opened"),
        }
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id.
                warn!(error = %e, "unparseable request line");
                let reply = serde_json::json!({
                    "ok": false,
                    "error": { "code": "bad_json", "message": e.to_string() }
                });
                let _ = writeln!(stdout, "{}", reply);
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
    info!("stdin closed, exiting");
}
