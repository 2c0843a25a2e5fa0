//! Config command implementation
//!
//! Handles `gitrun config` and `gitrun config --json`.

use anyhow::{Context, Result};

use gitrun_config::Config;

/// Execute the config command
pub fn execute_config_command(config: &Config, json: bool) -> Result<()> {
    if json {
        let effective = config.effective_config();
        println!(
            "{}",
            serde_json::to_string_pretty(&effective).context("Failed to emit config JSON")?
        );
        return Ok(());
    }

    print!("{}", render_config(config));
    Ok(())
}

fn render_config(config: &Config) -> String {
    let mut output = String::from("Effective configuration:\n");
    match &config.config_path {
        Some(path) => output.push_str(&format!("  file: {}\n", path.display())),
        None => output.push_str("  file: (none)\n"),
    }

    for (key, entry) in config.effective_config() {
        let value = match &entry.value {
            serde_json::Value::Null => "(unset)".to_string(),
            serde_json::Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        output.push_str(&format!("  {key} = {value} [{}]\n", entry.source));
    }
    output
}
