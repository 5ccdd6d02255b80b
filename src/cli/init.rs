//! Init command implementation.
//!
//! Writes a commented `realpx.yaml` holding the default settings.

use std::fs;
use std::path::PathBuf;

use clap::Args;

use crate::error::{PxError, Result};
use crate::output::{display_path, Printer};
use crate::settings::{default_settings_yaml, SETTINGS_FILENAME};

/// Write a default realpx.yaml
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to write into (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite existing realpx.yaml
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs, printer: &Printer) -> Result<PathBuf> {
    let settings_path = args.path.join(SETTINGS_FILENAME);

    if settings_path.exists() && !args.force {
        return Err(PxError::Config {
            message: format!("{} already exists", SETTINGS_FILENAME),
            help: Some("Use --force to overwrite".to_string()),
        });
    }

    if !args.path.exists() {
        fs::create_dir_all(&args.path).map_err(|e| PxError::Io {
            path: args.path.clone(),
            message: format!("Failed to create directory: {}", e),
        })?;
    }

    fs::write(&settings_path, default_settings_yaml()).map_err(|e| PxError::Io {
        path: settings_path.clone(),
        message: format!("Failed to write settings: {}", e),
    })?;

    printer.success("Created", &display_path(&settings_path));
    Ok(settings_path)
}
