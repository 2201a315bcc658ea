//! Configuration validation
//!
//! Rejects unusable settings and warns about risky production deployments.

use super::config::AppConfig;
use super::loader::environment;
use anyhow::{bail, Result};
use tracing::warn;

/// Validate configuration before the server starts
pub fn validate_config(config: &AppConfig) -> Result<()> {
    let canvas = &config.canvas;
    if canvas.min_dimension == 0 {
        bail!("canvas.min_dimension must be at least 1");
    }
    if canvas.min_dimension > canvas.max_dimension {
        bail!(
            "canvas.min_dimension ({}) exceeds canvas.max_dimension ({})",
            canvas.min_dimension,
            canvas.max_dimension
        );
    }
    for (name, value) in [
        ("default_width", canvas.default_width),
        ("default_height", canvas.default_height),
    ] {
        if !(canvas.min_dimension..=canvas.max_dimension).contains(&value) {
            bail!(
                "canvas.{name} ({value}) is outside {}..={}",
                canvas.min_dimension,
                canvas.max_dimension
            );
        }
    }
    if config.images.fetch_timeout_secs == 0 {
        bail!("images.fetch_timeout_secs must be greater than zero");
    }

    if environment().eq_ignore_ascii_case("production") && config.server.host == "0.0.0.0" {
        warn!(
            "SECURITY WARNING: Server is binding to all interfaces (0.0.0.0) in production. \
             Consider binding to 127.0.0.1 and using a reverse proxy."
        );
    }

    Ok(())
}
