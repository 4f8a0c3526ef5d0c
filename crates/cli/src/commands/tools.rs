use std::path::Path;

use anyhow::{Context, Result};
use ripper_core::config::ToolConfig;

/// Show where each external tool will be looked up.
pub fn tools_command(tools_config: Option<&Path>, json: bool) -> Result<()> {
    let resolved = ToolConfig::load_or_default(tools_config)?.resolve();

    if json {
        let serialized = serde_json::to_string_pretty(&resolved)
            .context("Failed to serialize tool paths to JSON")?;
        println!("{}", serialized);
        return Ok(());
    }

    println!("ripper-core v{}", ripper_core::version());
    println!("Tools:");
    println!("  fls: {}", resolved.fls.display());
    println!("  icat: {}", resolved.icat.display());
    println!("  fsstat: {}", resolved.fsstat.display());
    println!("  file: {}", resolved.file.display());
    println!("  timeout: {}s", resolved.timeout.as_secs());
    Ok(())
}
