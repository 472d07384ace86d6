use std::path::Path;
use anyhow::{anyhow, bail, Result};

use crate::config::proc_initiator::initiate_default_values;
use crate::config::proc_loader::file_to_config;
use crate::config::proc_validator::validate_service_config;
use crate::config::settings::ServiceConfig;

/// Load, complete and validate the service config.
pub async fn run(config_path: &str) -> Result<ServiceConfig> {
    let path = Path::new(config_path);
    let service_config = file_to_config(path)
        .await
        .map_err(|e| anyhow!(format!("Invalid config format: {}", e)))?;
    let service_config = initiate_default_values(service_config).await?;

    if let Err(errors) = validate_service_config(&service_config).await {
        bail!("config is not valid:\n - {}", errors.join("\n - "));
    }
    Ok(service_config)
}
