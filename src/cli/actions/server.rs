use crate::cli::actions::Action;
use crate::hydra::HydraConfig;
use crate::portale;
use anyhow::{Context, Result};

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server {
            port,
            dsn,
            hydra_admin_url,
        } => {
            // Misconfiguration is fatal here, before any request is served
            let hydra = HydraConfig::new(&hydra_admin_url)
                .context("invalid HYDRA_ADMIN_URL, cannot start")?;

            portale::new(port, dsn, hydra).await?;
        }
    }

    Ok(())
}
