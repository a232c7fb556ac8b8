//! Recipe sources for the CLI: a local JSON catalogue or the recipe API.

use std::path::PathBuf;

use prep_core::{Recipe, RecipeError, RecipeSource};

use crate::config::Config;

/// Reads a JSON array of recipes from disk.
#[derive(Debug, Clone)]
pub struct FileRecipeSource {
    path: PathBuf,
}

impl FileRecipeSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecipeSource for FileRecipeSource {
    fn recipes(&self) -> Result<Vec<Recipe>, RecipeError> {
        let location = self.path.display().to_string();
        let contents =
            std::fs::read_to_string(&self.path).map_err(|e| RecipeError::Unavailable {
                location: location.clone(),
                message: e.to_string(),
            })?;
        serde_json::from_str(&contents).map_err(|e| RecipeError::InvalidData {
            location,
            message: e.to_string(),
        })
    }
}

/// Fetches recipes from `<base_url>/recipes`.
#[derive(Debug, Clone)]
pub struct HttpRecipeSource {
    base_url: String,
}

impl HttpRecipeSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn url(&self) -> String {
        format!("{}/recipes", self.base_url.trim_end_matches('/'))
    }

    async fn fetch(&self) -> Result<Vec<Recipe>, RecipeError> {
        let url = self.url();
        let unavailable = |message: String| RecipeError::Unavailable {
            location: url.clone(),
            message,
        };

        tracing::debug!(%url, "fetching recipes");
        let response = reqwest::Client::new()
            .get(&url)
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(unavailable(format!("HTTP {}", response.status())));
        }

        response
            .json::<Vec<Recipe>>()
            .await
            .map_err(|e| RecipeError::InvalidData {
                location: url.clone(),
                message: e.to_string(),
            })
    }
}

impl RecipeSource for HttpRecipeSource {
    fn recipes(&self) -> Result<Vec<Recipe>, RecipeError> {
        let rt = tokio::runtime::Runtime::new().map_err(|e| RecipeError::Unavailable {
            location: self.url(),
            message: e.to_string(),
        })?;
        rt.block_on(self.fetch())
    }
}

/// Picks the source named in config: URLs go to the API, anything else is
/// a file path.
pub fn source_from_config(config: &Config) -> Result<Box<dyn RecipeSource>, RecipeError> {
    match config.recipe_source.value.as_deref() {
        None => Err(RecipeError::NotConfigured),
        Some(location) if is_url(location) => Ok(Box::new(HttpRecipeSource::new(location))),
        Some(location) => Ok(Box::new(FileRecipeSource::new(location))),
    }
}

fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}
