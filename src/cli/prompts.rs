//! Interactive prompts using dialoguer

use anyhow::Result;
use dialoguer::Confirm;
use std::path::Path;

/// Prompt user to confirm proceeding with an action
pub fn confirm_step(message: &str) -> Result<bool> {
    let confirmed = Confirm::new()
        .with_prompt(message)
        .default(true)
        .interact()?;
    Ok(confirmed)
}

/// Prompt user to confirm overwriting guest lists in an existing directory
pub fn confirm_overwrite(dir: &Path, day_count: usize) -> Result<bool> {
    let message = format!(
        "Write {} guest list(s) into existing directory {}?",
        day_count,
        dir.display()
    );
    confirm_step(&message)
}
