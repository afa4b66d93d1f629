//! `cellar check-config`: loads and prints the resolved repository config.

use std::path::{Path, PathBuf};

use cellar_core::config::{dirs_path, RepositoryConfig};
use miette::{IntoDiagnostic, Result};

fn default_config_path() -> PathBuf {
    dirs_path().join("config.toml")
}

pub fn exec(config_path: Option<&Path>, verbose: bool) -> Result<()> {
    let config_path = config_path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    let config = RepositoryConfig::load(&config_path).into_diagnostic()?;
    let toml = toml::to_string_pretty(&config).into_diagnostic()?;
    println!("# resolved from {}", config_path.display());
    if verbose {
        println!("# storage_root: {}", config.storage_root.display());
        println!("# listen_addr: {}", config.listen_addr);
    }
    println!("{toml}");
    Ok(())
}
