//! Resolution pipeline: reads data files, resolves cross-references, builds
//! the catalog.
//!
//! Provides format detection (RON/JSON/TOML), file discovery, and
//! deserialization helpers, plus [`load_game_data`] which ties them together
//! for a data directory laid out as:
//!
//! ```text
//! data/
//!   nodes.{ron,toml,json}      required
//!   recipes.{ron,toml,json}    required
//!   resources.{ron,toml,json}  optional
//!   config.{ron,toml,json}     optional, engine configuration
//! ```

use indexmap::IndexMap;
use millwork_core::catalog::Catalog;
use millwork_core::config::EngineConfig;
use millwork_core::data_loader::{self, CatalogData, NodeTypeData, RecipeData, ResourceData};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required data file was not found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A key reference could not be resolved.
    #[error("unresolved {expected_kind} reference '{name}' in {file}")]
    UnresolvedRef {
        file: PathBuf,
        name: String,
        expected_kind: &'static str,
    },

    /// The definitions parsed but do not form a valid catalog.
    #[error(transparent)]
    Catalog(#[from] data_loader::DataLoadError),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Scan a directory for a data file with the given base name (without extension).
///
/// Looks for `{base_name}.ron`, `{base_name}.toml`, and `{base_name}.json`.
/// Returns `Ok(None)` if no file is found, or `Err(ConflictingFormats)` if
/// multiple formats exist for the same base name.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let extensions = ["ron", "toml", "json"];
    let mut found: Option<PathBuf> = None;

    for ext in &extensions {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(ref existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing.clone(),
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    Ok(found)
}

/// Like [`find_data_file`], but returns an error if no file is found.
pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

/// Read a file and deserialize it according to its format (detected from extension).
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    deserialize_str(&content, format).map_err(|detail| DataLoadError::Parse {
        file: path.to_path_buf(),
        detail,
    })
}

/// Deserialize in-memory text of a known format.
pub fn deserialize_str<T: DeserializeOwned>(content: &str, format: Format) -> Result<T, String> {
    match format {
        Format::Ron => ron::from_str(content).map_err(|e| e.to_string()),
        Format::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        Format::Toml => toml::from_str(content).map_err(|e| e.to_string()),
    }
}

// ===========================================================================
// Name resolution helpers
// ===========================================================================

/// Look up a key in a map, returning an `UnresolvedRef` error if not found.
pub fn resolve_name<'a, V>(
    map: &'a IndexMap<String, V>,
    name: &str,
    file: &Path,
    expected_kind: &'static str,
) -> Result<&'a V, DataLoadError> {
    map.get(name).ok_or_else(|| DataLoadError::UnresolvedRef {
        file: file.to_path_buf(),
        name: name.to_string(),
        expected_kind,
    })
}

// ===========================================================================
// Pipeline
// ===========================================================================

/// Everything a game needs from its data directory.
#[derive(Debug)]
pub struct GameData {
    pub catalog: Catalog,
    pub config: EngineConfig,
}

/// Read the per-kind definition files from `dir` into one document.
pub fn load_catalog_data(dir: &Path) -> Result<CatalogData, DataLoadError> {
    let nodes_path = require_data_file(dir, "nodes")?;
    let recipes_path = require_data_file(dir, "recipes")?;

    let nodes: IndexMap<String, NodeTypeData> = deserialize_file(&nodes_path)?;
    let recipes: IndexMap<String, RecipeData> = deserialize_file(&recipes_path)?;
    let resources: IndexMap<String, ResourceData> = match find_data_file(dir, "resources")? {
        Some(path) => deserialize_file(&path)?,
        None => IndexMap::new(),
    };
    debug!(
        nodes = nodes.len(),
        recipes = recipes.len(),
        resources = resources.len(),
        dir = %dir.display(),
        "definition files read"
    );

    // Report bad recipe keys against the file they appear in.
    for node in nodes.values() {
        for recipe in &node.recipes {
            resolve_name(&recipes, recipe, &nodes_path, "recipe")?;
        }
    }

    Ok(CatalogData {
        resources,
        recipes,
        nodes,
    })
}

/// Load the engine configuration file from `dir`, or defaults if absent.
pub fn load_config(dir: &Path) -> Result<EngineConfig, DataLoadError> {
    match find_data_file(dir, "config")? {
        Some(path) => deserialize_file(&path),
        None => Ok(EngineConfig::default()),
    }
}

/// Load, resolve and validate a whole data directory.
pub fn load_game_data(dir: &Path) -> Result<GameData, DataLoadError> {
    let data = load_catalog_data(dir)?;
    let catalog = data_loader::build_catalog(data)?;
    let config = load_config(dir)?;
    info!(
        node_types = catalog.node_type_count(),
        recipes = catalog.recipe_count(),
        resources = catalog.resource_count(),
        "game data loaded"
    );
    Ok(GameData { catalog, config })
}

// ===========================================================================
// Tests
// ===========================================================================
