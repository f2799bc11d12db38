//! `danfe config` - inspect and create the JSON settings file.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;

use danfe_core::DanfeConfig;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    action: ConfigAction,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the settings in effect (file contents merged over defaults)
    Show,

    /// Write the default settings to a file
    Init {
        /// Destination (default: the per-user settings file)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print where the per-user settings file lives
    Path,
}

pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    match args.action {
        ConfigAction::Show => {
            let path = config_path.map(PathBuf::from).unwrap_or_else(user_config_path);
            show(&path)
        }
        ConfigAction::Init { output, force } => {
            init(&output.unwrap_or_else(user_config_path), force)
        }
        ConfigAction::Path => {
            let path = user_config_path();
            let status = if path.exists() {
                style("present").green()
            } else {
                style("missing, create it with 'danfe config init'").yellow()
            };
            println!("{} ({})", path.display(), status);
            Ok(())
        }
    }
}

/// `<config dir>/danfe/config.json`, falling back to the working directory.
pub fn user_config_path() -> PathBuf {
    let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("danfe").join("config.json")
}

fn show(path: &Path) -> anyhow::Result<()> {
    let config = if path.exists() {
        DanfeConfig::from_file(path)?
    } else {
        eprintln!(
            "{} {} does not exist; these are the built-in defaults.",
            style("ℹ").blue(),
            path.display()
        );
        DanfeConfig::default()
    };

    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn init(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (pass --force to replace it)",
            path.display()
        );
    }
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }

    DanfeConfig::default().save(path)?;
    println!("{} Wrote default settings to {}", style("✓").green(), path.display());
    Ok(())
}
