use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File, Source};
use serde::Deserialize;

use crate::parser::Anchors;

const CONFIG_FILE: &str = "builtins_catalog";
const ENV_PREFIX: &str = "CATALOG";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub toc_file: String,
    pub catalog_file: String,
    pub typed_array_anchor: String,
    pub native_error_anchor: String,
}

/// Defaults, then `builtins_catalog.toml` if present, then `CATALOG_*` env vars.
pub fn load() -> Result<Settings, ConfigError> {
    load_from(File::with_name(CONFIG_FILE).required(false))
}

fn load_from<S>(file: S) -> Result<Settings, ConfigError>
where
    S: Source + Send + Sync + 'static,
{
    Config::builder()
        .set_default("input", "generated/spec.html")?
        .set_default("output_dir", "generated")?
        .set_default("toc_file", "toc.json")?
        .set_default("catalog_file", "catalog.json")?
        .set_default("typed_array_anchor", "table-the-typedarray-constructors")?
        .set_default("native_error_anchor", "sec-native-error-types-used-in-this-standard")?
        .add_source(file)
        .add_source(Environment::with_prefix(ENV_PREFIX))
        .build()?
        .try_deserialize()
}

impl Settings {
    /// Command-line flags win over every configured layer.
    pub fn override_paths(&mut self, input: Option<PathBuf>, output_dir: Option<PathBuf>) {
        if let Some(input) = input {
            self.input = input;
        }
        if let Some(output_dir) = output_dir {
            self.output_dir = output_dir;
        }
    }

    pub fn toc_path(&self) -> PathBuf {
        self.output_dir.join(&self.toc_file)
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.output_dir.join(&self.catalog_file)
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn anchors(&self) -> Anchors {
        Anchors {
            typed_arrays: self.typed_array_anchor.clone(),
            native_errors: self.native_error_anchor.clone(),
        }
    }
}
