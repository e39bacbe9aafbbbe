// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result};
use assetdesk_app::{AppState, FilterState, PaginationState};
use assetdesk_db::Store;
use assetdesk_testkit::{AssetFaker, sample_assets};
use config::{BackendKind, Config};
use runtime::{Backend, DeskRuntime};
use std::env;
use std::path::PathBuf;
use tracing::info;

const DEMO_SEED: u64 = 2026;
const DEMO_EXTRA_ASSETS: usize = 40;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `assetdesk --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let backend_kind = if options.demo {
        BackendKind::Sqlite
    } else {
        config.backend()
    };
    let db_path = if options.demo {
        PathBuf::from(":memory:")
    } else {
        config.db_path()?
    };
    if options.print_db_path {
        println!("{}", db_path.display());
        return Ok(());
    }

    if !options.check_only {
        logging::init(config.log_level(), &config.log_file()?)?;
    }

    let backend = match backend_kind {
        BackendKind::Sqlite => {
            let store = Store::open(&db_path).with_context(|| {
                format!(
                    "open database {} -- if this path is wrong, set [storage].db_path or ASSETDESK_DB_PATH",
                    db_path.display()
                )
            })?;
            store.bootstrap()?;
            if options.demo {
                seed_demo(&store)?;
            }
            Backend::Local(store)
        }
        BackendKind::Remote => {
            let client = assetdesk_api::Client::new(
                config.remote_base_url(),
                config.remote_timeout()?,
            )
            .with_context(|| {
                format!(
                    "invalid [remote] config in {}; fix base_url/timeout values",
                    options.config_path.display()
                )
            })?;
            Backend::Remote(client)
        }
    };

    let paging = PaginationState::with_page_size(config.page_size())
        .context("apply [ui].page_size")?;
    let department = options
        .department
        .as_deref()
        .or_else(|| config.department())
        .map(str::to_owned);
    let filters = FilterState::with_department(department);

    if options.check_only {
        return Ok(());
    }

    info!(
        backend = backend.label(),
        page_size = paging.page_size(),
        department = filters.department().unwrap_or(""),
        "starting assetdesk"
    );
    let mut state = AppState::default();
    let mut runtime = DeskRuntime::new(backend, filters, paging);
    assetdesk_tui::run_app(&mut state, &mut runtime)
}

fn seed_demo(store: &Store) -> Result<usize> {
    let mut records = sample_assets();
    records.extend(AssetFaker::new(DEMO_SEED).assets(DEMO_EXTRA_ASSETS));
    store.seed_demo_data(&records).context("seed demo assets")
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_db_path: bool,
    demo: bool,
    department: Option<String>,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_db_path: false,
        demo: false,
        department: None,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--department" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--department requires a name"))?;
                let value = value.as_ref().trim();
                if value.is_empty() {
                    return Err(anyhow::anyhow!("--department requires a non-empty name"));
                }
                options.department = Some(value.to_owned());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-path" => {
                options.print_db_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("assetdesk");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-path             Print resolved database path");
    println!("  --print-example-config   Print a config template");
    println!("  --demo                   Launch with seeded demo assets (in-memory)");
    println!("  --department <name>      Only show assets of one department");
    println!("  --check                  Validate config + store setup and exit");
    println!("  --help                   Show this help");
}
