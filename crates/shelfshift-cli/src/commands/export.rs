use crate::output::Output;
use catalog_sync_config::{Config, CredentialStore, PathManager};
use catalog_sync_core::Exporter;
use catalog_sync_sources::{DiscogsHtmlClient, DiscogsRestClient, RetryPolicy};
use color_eyre::Result;
use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;

pub async fn run_export(
    cookie: Option<String>,
    token: Option<String>,
    include_masters: bool,
    export_dir: Option<PathBuf>,
    output: &Output,
) -> Result<()> {
    tracing::debug!("Export command started");

    let path_manager = PathManager::default();
    let config = Config::load(&path_manager.config_file())
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load config: {}", e))?;
    let retry = RetryPolicy::from_options(&config.retry);
    let export_dir = export_dir.unwrap_or_else(|| path_manager.default_export_dir());

    let credentials_file = path_manager.credentials_file();
    let mut cred_store = CredentialStore::new(credentials_file.clone());
    cred_store.load().map_err(|e| {
        color_eyre::eyre::eyre!(
            "Failed to load credentials from {}: {}",
            credentials_file.display(),
            e
        )
    })?;

    let cookie = cookie
        .or_else(|| cred_store.get_discogs_cookie().cloned())
        .ok_or_else(|| {
            color_eyre::eyre::eyre!("No session cookie given and none stored in credentials")
        })?;
    let token = token
        .or_else(|| cred_store.get_discogs_token().cloned())
        .ok_or_else(|| {
            color_eyre::eyre::eyre!("No API token given and none stored in credentials")
        })?;

    let html = DiscogsHtmlClient::new(&cookie, config.export.per_page, retry.clone())
        .map_err(|e| color_eyre::eyre::eyre!("Failed to build session client: {}", e))?;
    let rest = DiscogsRestClient::connect(&token, config.export.per_page, retry)
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to reach the source API: {}", e))?;

    output.info(format!("Exporting as {}", rest.username()));

    // Both credentials worked; keep them for the next run.
    cred_store.set_discogs_cookie(cookie);
    cred_store.set_discogs_token(token);
    if let Err(error) = cred_store.save() {
        tracing::warn!(%error, "Could not persist credentials");
    }

    let exporter = Exporter::new(
        html,
        rest,
        export_dir.clone(),
        Duration::from_millis(config.export.master_lookup_throttle_ms),
    );
    exporter
        .export_all(include_masters)
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Export failed: {}", e))?;

    match output.format() {
        crate::output::OutputFormat::Human => {
            output.success(format!("Export written to {}", export_dir.display()));
        }
        _ => {
            output.json(&json!({
                "success": true,
                "export_dir": export_dir.display().to_string(),
                "include_masters": include_masters,
            }));
        }
    }

    Ok(())
}
