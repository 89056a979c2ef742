use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use modula_core::module_system::{LoadReport, LoadStatus, ModuleRecord, ModuleSource};
use modula_core::Module;

/// Modula: discover, order and switch application modules
#[derive(Parser, Debug)]
#[command(name = "modula", author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Application root; relative paths resolve against it
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Module configuration file (JSON, TOML or YAML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory scanned for modules, overrides the configuration
    #[arg(long, global = true)]
    pub path: Option<PathBuf>,

    /// Manifest file holding enabled state, overrides the configuration
    #[arg(long, global = true)]
    pub manifest: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List discovered modules, highest priority first
    List {
        /// Only enabled modules
        #[arg(long, conflicts_with = "disabled")]
        enabled: bool,
        /// Only disabled modules
        #[arg(long)]
        disabled: bool,
    },
    /// Show one module
    Show { name: String },
    /// Enable a module (its dependencies must be enabled)
    Enable { name: String },
    /// Disable a module
    Disable { name: String },
    /// Missing dependencies and dependents of a module
    Deps { name: String },
    /// Dependency graph and load order
    Graph,
    /// Rediscover and store the result in the discovery cache
    Cache,
    /// Drop the discovery cache
    CacheClear,
    /// Load every enabled module against an in-memory host and report
    Boot,
}

pub fn module_table(modules: &[ModuleRecord]) -> String {
    if modules.is_empty() {
        return "No modules found.\n".to_string();
    }
    let width = modules.iter().map(|m| m.name().len()).max().unwrap_or(0).max(4);
    let mut out = format!("{:<width$}  {:<8}  {:>8}  {:<8}  PATH\n", "NAME", "STATUS", "PRIORITY", "VERSION");
    for module in modules {
        out.push_str(&format!(
            "{:<width$}  {:<8}  {:>8}  {:<8}  {}\n",
            module.name(),
            status(module),
            module.priority(),
            module.version(),
            module.path().display(),
        ));
    }
    out
}

pub fn module_details(module: &ModuleRecord) -> String {
    let mut out = format!("{}\n", module.name());
    let mut field = |label: &str, value: String| out.push_str(&format!("  {:<13}{}\n", label, value));
    field("status:", status(module).to_string());
    field("version:", module.version().to_string());
    field("priority:", module.priority().to_string());
    field("namespace:", module.namespace().to_string());
    field("path:", module.path().display().to_string());
    field(
        "source:",
        match module.source() {
            ModuleSource::Filesystem => "filesystem".to_string(),
            ModuleSource::Package => "package".to_string(),
        },
    );
    if let Some(description) = module.description() {
        field("description:", description.to_string());
    }
    field("requires:", list_or_none(module.dependencies()));
    field("aliases:", list_or_none(module.aliases()));
    field("providers:", list_or_none(module.providers()));
    out
}

pub fn boot_summary(reports: &[LoadReport]) -> String {
    if reports.is_empty() {
        return "No enabled modules to load.\n".to_string();
    }
    let mut out = String::new();
    for report in reports {
        match report.status() {
            LoadStatus::Loaded => {
                out.push_str(&format!("{}: loaded\n", report.module()));
                for category in report.steps() {
                    let items = report.items(category);
                    if !items.is_empty() {
                        out.push_str(&format!("  {}: {}\n", category, items.join(", ")));
                    }
                }
                for skipped in report.skipped() {
                    out.push_str(&format!("  skipped {} {}: {}\n", skipped.category, skipped.item, skipped.reason));
                }
            }
            LoadStatus::Disabled => out.push_str(&format!("{}: disabled\n", report.module())),
            LoadStatus::Failed(reason) => out.push_str(&format!("{}: failed ({})\n", report.module(), reason)),
        }
    }
    out
}

pub fn list_or_none(items: &[String]) -> String {
    if items.is_empty() { "-".to_string() } else { items.join(", ") }
}

fn status(module: &ModuleRecord) -> &'static str {
    if module.is_enabled() { "enabled" } else { "disabled" }
}
