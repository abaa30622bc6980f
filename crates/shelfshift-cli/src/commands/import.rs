use super::prompts;
use crate::output::Output;
use catalog_sync_config::{Config, CredentialStore, PathManager};
use catalog_sync_core::{ImportReport, Importer};
use catalog_sync_models::SearchCandidate;
use catalog_sync_sources::MusicBrainzClient;
use color_eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use std::path::Path;
use std::time::Duration;

#[allow(clippy::too_many_arguments)]
pub async fn run_import(
    import_dir: &Path,
    username: &str,
    password: Option<String>,
    email: Option<&str>,
    owned_name: Option<String>,
    wishlist_name: Option<String>,
    ratings: bool,
    owned: bool,
    wishlist: bool,
    output: &Output,
) -> Result<()> {
    tracing::debug!("Import command started");

    let path_manager = PathManager::default();
    let config = Config::load(&path_manager.config_file())
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load config: {}", e))?;

    let mut cred_store = CredentialStore::new(path_manager.credentials_file());
    cred_store
        .load()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials: {}", e))?;

    // flag, then stored credential, then prompt
    let password = match password.or_else(|| cred_store.get_musicbrainz_password().cloned()) {
        Some(password) => password,
        None => prompts::prompt_password("Target service password: ")?,
    };

    let client = MusicBrainzClient::new(username, &password, email)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to build target client: {}", e))?;
    let importer = Importer::new(&client);

    let owned_name = owned_name.unwrap_or(config.import.owned_name);
    let wishlist_name = wishlist_name.unwrap_or(config.import.wishlist_name);

    if ratings {
        let spinner = progress_spinner("Importing ratings...");
        let report = importer
            .import_ratings(import_dir)
            .await
            .map_err(|e| color_eyre::eyre::eyre!("Ratings import failed: {}", e))?;
        spinner.finish_and_clear();
        summarize(output, "Ratings", &report);
    }

    if owned {
        let spinner = progress_spinner("Importing owned releases...");
        let report = importer
            .import_owned(import_dir, &owned_name)
            .await
            .map_err(|e| color_eyre::eyre::eyre!("Owned-releases import failed: {}", e))?;
        spinner.finish_and_clear();
        summarize(output, "Owned releases", &report);
    }

    if wishlist {
        let spinner = progress_spinner("Importing wishlist...");
        let report = importer
            .import_wishlist(import_dir, &wishlist_name)
            .await
            .map_err(|e| color_eyre::eyre::eyre!("Wishlist import failed: {}", e))?;
        spinner.finish_and_clear();
        summarize(output, "Wishlist", &report);
    }

    Ok(())
}

fn progress_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

fn summarize(output: &Output, label: &str, report: &ImportReport) {
    match output.format() {
        crate::output::OutputFormat::Human => {
            output.success(format!(
                "{}: {} resolved, {} unmatched, {} ambiguous",
                label,
                report.resolved,
                report.unmatched,
                report.ambiguous.len()
            ));
            for (release, candidates) in &report.ambiguous {
                output.warn(format!("Multiple candidates for {:?}:", release));
                print_candidates(output, candidates);
            }
        }
        _ => {
            output.json(&json!({
                "step": label,
                "resolved": report.resolved,
                "unmatched": report.unmatched,
                "ambiguous": report.ambiguous.iter().map(|(release, candidates)| {
                    json!({"release": release, "candidates": candidates})
                }).collect::<Vec<_>>(),
            }));
        }
    }
}

fn print_candidates(output: &Output, candidates: &[SearchCandidate]) {
    for candidate in candidates {
        output.info(format!(
            "  {} by {} (score {}): {}",
            candidate.title, candidate.artist_credit, candidate.score, candidate.id
        ));
    }
}
