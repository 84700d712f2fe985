use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::path::Path;

use crate::cli::Output;
use crate::config::PoolConfig;

#[derive(Args)]
pub struct ConfigArgs {
    /// Output format: toml, json
    #[arg(short, long, default_value = "toml")]
    pub format: String,
}

/// Merged configuration plus the worker count it resolves to here
#[derive(Serialize)]
struct ResolvedConfig<'a> {
    #[serde(flatten)]
    config: &'a PoolConfig,
    resolved_workers: usize,
}

pub fn execute(args: ConfigArgs, custom_config: Option<&Path>, output: &Output) -> Result<()> {
    let config = PoolConfig::load(custom_config)?;
    let resolved = ResolvedConfig {
        config: &config,
        resolved_workers: config.resolved_workers(),
    };

    let rendered = match args.format.to_lowercase().as_str() {
        "toml" => toml::to_string_pretty(&resolved)?,
        "json" => serde_json::to_string_pretty(&resolved)?,
        _ => anyhow::bail!("Unsupported format: {}. Use toml or json", args.format),
    };

    output.verbose(&match custom_config {
        Some(path) => format!("Configuration loaded from {}", path.display()),
        None => "Configuration loaded from defaults, jobpool.toml and JOBPOOL_* variables".into(),
    });
    println!("{}", rendered.trim_end());
    Ok(())
}
