//! Settings file command.

use std::path::Path;

use clap::Args;
use squash_config::{Settings, settings_path};

use super::common::load_settings;

#[derive(Args)]
pub struct SettingsArgs {
    /// Print the settings file path and exit
    #[arg(long)]
    path: bool,

    /// Write a settings file with the defaults
    #[arg(long)]
    init: bool,

    /// Overwrite an existing file with --init
    #[arg(long, requires = "init")]
    force: bool,
}

pub fn run(args: SettingsArgs, config: Option<&Path>) -> anyhow::Result<()> {
    let path = config.map_or_else(settings_path, Path::to_path_buf);

    if args.path {
        println!("{}", path.display());
        return Ok(());
    }

    if args.init {
        if path.exists() && !args.force {
            anyhow::bail!(
                "{} already exists (use --force to overwrite)",
                path.display()
            );
        }
        Settings::default().save(&path)?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    let settings = load_settings(config)?;
    print!("{}", settings.to_toml()?);
    Ok(())
}
