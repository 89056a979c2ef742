mod cli;

use std::process::ExitCode;

use clap::Parser;
use log::{debug, error};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use modula_core::module_system::DependencyResolver;
use modula_core::{Application, Host, Module, ModuleManager, Result};

use cli::{Cli, Command, GlobalArgs};

/// Route `tracing` and `log` records to stderr, filtered by `MODULA_LOG`
/// (falling back to `RUST_LOG`, then `warn`)
fn init_logging() {
    let filter = EnvFilter::try_from_env("MODULA_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true).compact());

    if tracing::subscriber::set_global_default(subscriber).is_ok() {
        // Core crates log through the `log` facade
        let _ = tracing_log::LogTracer::init();
    }
}

fn build_application(args: &GlobalArgs) -> Result<Application> {
    let provider = modula_core::storage::LocalStorageProvider::default();
    let mut config = Application::load_config(&provider, &args.root, args.config.as_deref())?;
    if let Some(path) = &args.path {
        config.path = args.root.join(path);
    }
    if let Some(manifest) = &args.manifest {
        config.manifest_path = Some(args.root.join(manifest));
    }
    debug!("Resolved module configuration: {:?}", config);
    Ok(Application::new(config, Host::in_memory().0))
}

async fn run(cli: Cli) -> Result<()> {
    let app = build_application(&cli.global)?;
    let manager = app.manager();

    match cli.command {
        Command::List { enabled, disabled } => {
            let modules = if enabled {
                manager.enabled().await?
            } else if disabled {
                manager.disabled().await?
            } else {
                manager.all().await?
            };
            print!("{}", cli::module_table(&modules));
        }
        Command::Show { name } => {
            let module = manager.find_or_fail(&name).await?;
            print!("{}", cli::module_details(&module));
        }
        Command::Enable { name } => {
            manager.enable(&name).await?;
            let module = manager.find_or_fail(&name).await?;
            println!("Module '{}' enabled.", module.name());
        }
        Command::Disable { name } => {
            manager.disable(&name).await?;
            let module = manager.find_or_fail(&name).await?;
            println!("Module '{}' disabled.", module.name());
        }
        Command::Deps { name } => {
            let module = manager.find_or_fail(&name).await?;
            println!("{}", module.name());
            println!("  requires:   {}", cli::list_or_none(module.dependencies()));
            println!("  missing:    {}", cli::list_or_none(&manager.missing_dependencies(&name).await?));
            println!("  dependents: {}", cli::list_or_none(&manager.dependents(&name).await?));
        }
        Command::Graph => {
            let graph = manager.dependency_graph().await?;
            if graph.is_empty() {
                println!("No modules found.");
                return Ok(());
            }
            for (module, dependencies) in &graph {
                println!("{} -> {}", module, cli::list_or_none(dependencies));
            }
            match DependencyResolver::load_order(&graph) {
                Ok(order) => println!("Load order: {}", order.join(", ")),
                Err(e) => {
                    error!("{}", e);
                    println!("Unordered (cycle): {}", DependencyResolver::find_cycles(&graph).join(", "));
                }
            }
        }
        Command::Cache => {
            let count = manager.cache().await?;
            println!("Cached {} module(s).", count);
        }
        Command::CacheClear => {
            manager.clear_cache().await?;
            println!("Module cache cleared.");
        }
        Command::Boot => {
            let reports = app.boot().await?;
            print!("{}", cli::boot_summary(&reports));
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
