// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub const LOG_ENV: &str = "ASSETDESK_LOG";

const TARGETS: [&str; 5] = [
    "assetdesk",
    "assetdesk_app",
    "assetdesk_db",
    "assetdesk_api",
    "assetdesk_tui",
];

/// Directives used when `ASSETDESK_LOG` is unset: our crates at `level`,
/// everything else at `warn`.
pub fn default_directives(level: &str) -> String {
    let mut directives = vec!["warn".to_owned()];
    directives.extend(TARGETS.iter().map(|target| format!("{target}={level}")));
    directives.join(",")
}

fn env_filter(level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_env(LOG_ENV) {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(default_directives(level)).with_context(|| {
            format!("invalid [log].level {level:?}; use one of error, warn, info, debug, trace")
        }),
    }
}

/// Sends diagnostics to `file`. The terminal belongs to the UI, so nothing
/// is written to stdout or stderr.
pub fn init(level: &str, file: &Path) -> Result<()> {
    if let Some(parent) = file.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let writer = OpenOptions::new()
        .create(true)
        .append(true)
        .open(file)
        .with_context(|| {
            format!(
                "open log file {} -- set [log].file to a writable path",
                file.display()
            )
        })?;

    tracing_subscriber::registry()
        .with(env_filter(level)?)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(writer)),
        )
        .try_init()
        .context("install log subscriber")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{default_directives, env_filter};
    use anyhow::Result;

    #[test]
    fn default_directives_scope_level_to_workspace_crates() {
        let directives = default_directives("debug");
        assert!(directives.starts_with("warn,"));
        assert!(directives.contains("assetdesk_app=debug"));
        assert!(directives.contains("assetdesk_api=debug"));
    }

    #[test]
    fn configured_level_builds_a_filter() -> Result<()> {
        env_filter("info")?;
        Ok(())
    }
}
