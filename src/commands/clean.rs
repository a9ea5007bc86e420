//! Clean the public directory

use anyhow::Result;
use std::fs;

use crate::Astra;

/// Remove the public directory and the generation cache
pub fn run(astra: &Astra) -> Result<()> {
    if astra.public_dir.exists() {
        fs::remove_dir_all(&astra.public_dir)?;
        tracing::info!("Deleted: {:?}", astra.public_dir);
    }

    let cache_dir = astra.base_dir.join(".astra-cache");
    if cache_dir.exists() {
        fs::remove_dir_all(&cache_dir)?;
        tracing::info!("Deleted: {:?}", cache_dir);
    }

    Ok(())
}
