//! Site configuration merged with `ortho_config`.
//!
//! Layers, lowest precedence first: built-in defaults, the discovered
//! configuration file, `FOLIO_*` environment variables, then CLI flags.
//! Discovery honours `--config` (which must exist), then
//! `FOLIO_CONFIG_PATH`, the platform configuration directories and finally
//! `folio.toml` in the working directory.

use miette::Diagnostic;
use ortho_config::declarative::LayerComposition;
use ortho_config::figment::{Figment, providers::Env};
use ortho_config::uncased::Uncased;
use ortho_config::{
    ConfigDiscovery, MergeComposer, OrthoConfig, OrthoError, OrthoMergeExt, OrthoResult,
    sanitize_value,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Configuration file looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = "folio.toml";
/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV_VAR: &str = "FOLIO_CONFIG_PATH";
/// Environment variable overriding the preference state file.
pub const STATE_FILE_ENV: &str = "FOLIO_STATE_FILE";
/// Environment variable overriding the content root.
pub const CONTENT_ROOT_ENV: &str = "FOLIO_CONTENT_ROOT";
/// Environment variable overriding the site origin.
pub const SITE_ENV: &str = "FOLIO_SITE";

const APP_NAME: &str = "folio";
const ENV_PREFIX: &str = "FOLIO_";
const DEFAULT_STATE_FILE: &str = ".folio/preferences.json";
const DEFAULT_CONTENT_ROOT: &str = "src/content";

/// Errors raised while loading configuration.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A layer could not be read, parsed or merged.
    #[error("failed to merge configuration layers")]
    #[diagnostic(
        code(folio::config::merge),
        help("check folio.toml, the FOLIO_* variables and the path given to --config")
    )]
    Merge(#[from] Arc<OrthoError>),
    /// The site origin is not an absolute URL.
    #[error("site origin '{value}' is not a valid absolute URL")]
    #[diagnostic(
        code(folio::config::invalid_site),
        help("use a full origin such as https://example.com")
    )]
    InvalidSite {
        /// Rejected value.
        value: String,
        /// Parse failure.
        #[source]
        source: url::ParseError,
    },
}

fn default_state_file() -> PathBuf {
    PathBuf::from(DEFAULT_STATE_FILE)
}

fn default_content_root() -> PathBuf {
    PathBuf::from(DEFAULT_CONTENT_ROOT)
}

/// Merged site configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "FOLIO")]
pub struct SiteConfig {
    /// Origin of the deployed site, used to recognize absolute internal links.
    pub site: Option<String>,

    /// JSON file standing in for the visitor's persistent storage.
    #[ortho_config(default = default_state_file())]
    pub state_file: PathBuf,

    /// Root of the localized content tree.
    #[ortho_config(default = default_content_root())]
    pub content_root: PathBuf,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site: None,
            state_file: default_state_file(),
            content_root: default_content_root(),
        }
    }
}

/// Values the command line contributes as the top layer.
#[derive(Debug, Serialize)]
struct CliLayer<'a> {
    state_file: Option<&'a Path>,
}

/// Build configuration discovery, requiring `explicit` when given.
fn config_discovery(explicit: Option<&Path>) -> ConfigDiscovery {
    let mut builder = ConfigDiscovery::builder(APP_NAME)
        .env_var(CONFIG_ENV_VAR)
        .project_file_name(PROJECT_CONFIG_FILE);
    if let Some(path) = explicit {
        builder = builder.add_required_path(path);
    }
    builder.build()
}

fn environment_layer() -> OrthoResult<serde_json::Value> {
    let provider = Env::prefixed(ENV_PREFIX)
        .map(|key| Uncased::new(key.as_str().to_ascii_uppercase()))
        .split("__");
    Figment::from(provider)
        .extract::<serde_json::Value>()
        .into_ortho_merge()
}

/// Return `true` when a layer carries no values.
fn is_empty_value(value: &serde_json::Value) -> bool {
    matches!(value, serde_json::Value::Object(map) if map.is_empty())
}

impl SiteConfig {
    /// Merge defaults, the discovered file, the environment and the CLI
    /// `state_file` override.
    ///
    /// `explicit` names a configuration file that must exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Merge`] when a required file is missing or any
    /// layer fails to parse or merge, and [`ConfigError::InvalidSite`] when
    /// the merged site origin is not an absolute URL.
    pub fn load(explicit: Option<&Path>, state_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut errors = Vec::new();
        let mut composer = MergeComposer::with_capacity(4);

        match sanitize_value(&Self::default()) {
            Ok(value) => composer.push_defaults(value),
            Err(err) => errors.push(err),
        }

        let mut file_layers = config_discovery(explicit).compose_layers();
        errors.append(&mut file_layers.required_errors);
        if file_layers.value.is_empty() {
            debug!("no configuration file found");
            errors.append(&mut file_layers.optional_errors);
        }
        for layer in file_layers.value {
            composer.push_layer(layer);
        }

        match environment_layer() {
            Ok(value) => composer.push_environment(value),
            Err(err) => errors.push(err),
        }

        match sanitize_value(&CliLayer { state_file }) {
            Ok(value) if !is_empty_value(&value) => composer.push_cli(value),
            Ok(_) => {}
            Err(err) => errors.push(err),
        }

        let composition = LayerComposition::new(composer.layers(), errors);
        let config = composition.into_merge_result(Self::merge_from_layers)?;
        config.origin()?;
        debug!(?config, "loaded configuration");
        Ok(config)
    }

    /// Parse the configured site origin.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSite`] when the origin is not an
    /// absolute URL.
    pub fn origin(&self) -> Result<Option<Url>, ConfigError> {
        self.site
            .as_deref()
            .map(|value| {
                Url::parse(value).map_err(|source| ConfigError::InvalidSite {
                    value: value.to_owned(),
                    source,
                })
            })
            .transpose()
    }
}
