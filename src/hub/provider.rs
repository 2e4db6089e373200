use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use hf_hub::api::sync::ApiBuilder;
use indicatif::{ProgressBar, ProgressStyle};
use once_cell::sync::OnceCell;
use tracing::info;

use super::{HubError, ModelFiles};
use crate::config::Settings;
use crate::summarizer::ModelBundle;

/// Process-wide memoization of a loaded value.
///
/// The first successful load wins and every later call returns the same
/// handle; a failed load is not cached, so the next call retries.
pub struct Memoized<T> {
    cell: OnceCell<Arc<T>>,
}

impl<T> Memoized<T> {
    pub fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    pub fn get_or_load<E>(&self, init: impl FnOnce() -> Result<T, E>) -> Result<Arc<T>, E> {
        self.cell
            .get_or_try_init(|| init().map(Arc::new))
            .cloned()
    }
}

impl<T> Default for Memoized<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves the configured pretrained model/tokenizer pair from the Hub
/// and keeps the loaded bundle for the lifetime of the process.
///
/// The fetch and load run at most once effectively; the bundle is shared
/// read-only afterwards (the `Mutex` exists only because the model's
/// forward pass needs `&mut` for its internal buffers).
pub struct ModelProvider {
    registry_id: String,
    token: Option<String>,
    cache_dir: PathBuf,
    max_input_tokens: usize,
    bundle: Memoized<Mutex<ModelBundle>>,
}

impl ModelProvider {
    /// Creates a provider from application settings. The Hub credential
    /// comes from the HF_TOKEN environment variable when present.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            registry_id: settings.model.registry_id.clone(),
            token: std::env::var("HF_TOKEN").ok(),
            cache_dir: settings.model.cache_directory.clone(),
            max_input_tokens: settings.generation.max_input_tokens,
            bundle: Memoized::new(),
        }
    }

    /// Returns the loaded bundle, fetching and loading it on first use.
    ///
    /// # Errors
    ///
    /// `HubError::ResourceUnavailable` if the registry is unreachable,
    /// the identifier is unknown, or the fetched files fail to load.
    pub fn load(&self) -> Result<Arc<Mutex<ModelBundle>>, HubError> {
        self.bundle.get_or_load(|| {
            let files = fetch_model_files(
                &self.registry_id,
                self.token.as_deref(),
                &self.cache_dir,
            )?;
            info!("Loading model bundle for {}", self.registry_id);
            let bundle =
                ModelBundle::load(&files, &self.registry_id, self.max_input_tokens).map_err(
                    |e| {
                        HubError::ResourceUnavailable(format!(
                            "Failed to load fetched model files for {}: {}",
                            self.registry_id, e
                        ))
                    },
                )?;
            info!("Model bundle loaded");
            Ok(Mutex::new(bundle))
        })
    }
}

/// Files every checkpoint on the registry entry is expected to carry
const CHECKPOINT_FILES: [&str; 3] = ["config.json", "tokenizer.json", "model.safetensors"];

/// Fetches the checkpoint files from the Hub into the local cache,
/// returning their local paths. Files already cached are not re-downloaded.
fn fetch_model_files(
    registry_id: &str,
    token: Option<&str>,
    cache_dir: &PathBuf,
) -> Result<ModelFiles, HubError> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{prefix:.bold.dim} {spinner} {wide_msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message(format!("Resolving {} from the Hub...", registry_id));

    let api = ApiBuilder::new()
        .with_cache_dir(cache_dir.clone())
        .with_token(token.map(|t| t.to_string()))
        .build()
        .map_err(|e| HubError::ResourceUnavailable(format!("Hub client setup failed: {}", e)))?;
    let repo = api.model(registry_id.to_string());

    let mut paths = Vec::with_capacity(CHECKPOINT_FILES.len());
    for (i, filename) in CHECKPOINT_FILES.iter().enumerate() {
        pb.set_message(format!(
            "Fetching {}... ({}/{})",
            filename,
            i + 1,
            CHECKPOINT_FILES.len()
        ));
        let path = repo.get(filename).map_err(|e| {
            HubError::ResourceUnavailable(format!(
                "Failed to fetch {} from {}: {}",
                filename, registry_id, e
            ))
        })?;
        info!("Fetched {} -> {}", filename, path.display());
        paths.push(path);
    }

    pb.disable_steady_tick();
    pb.finish_with_message(format!("Checkpoint files ready for {}", registry_id));

    let mut paths = paths.into_iter();
    Ok(ModelFiles {
        config: paths.next().unwrap_or_default(),
        tokenizer: paths.next().unwrap_or_default(),
        weights: paths.next().unwrap_or_default(),
    })
}
