//! Compile-time bundled preset catalogs.
//!
//! The preset people and garments are YAML files compiled into the binary via
//! `include_str!`. Each entry carries an id, a remote image URL and a label.
//!
//! # Usage
//!
//! ```rust,ignore
//! use wearai::core::assets::AssetLoader;
//!
//! let store = AssetLoader::preset_store();
//! ```

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use super::catalog::{AssetStore, Collection, ImageAsset};

// ============================================================================
// Compile-time bundled YAML
// ============================================================================

const PRESET_PEOPLE: &str = include_str!("../../assets/presets/people.yaml");
const PRESET_CLOTHING: &str = include_str!("../../assets/presets/clothing.yaml");

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Failed to parse {file}: {source}")]
    Parse {
        file: &'static str,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Duplicate preset id '{id}' in {file}")]
    DuplicateId { file: &'static str, id: String },
}

pub type Result<T> = std::result::Result<T, AssetError>;

#[derive(Debug, Deserialize)]
struct PresetEntry {
    id: String,
    url: Url,
    label: String,
}

// ============================================================================
// AssetLoader
// ============================================================================

/// Loads the bundled preset catalogs.
///
/// A catalog that fails to parse is logged and left empty rather than
/// aborting startup.
pub struct AssetLoader;

impl AssetLoader {
    /// Asset store seeded with both preset catalogs, in file order.
    pub fn preset_store() -> AssetStore {
        AssetStore::with_presets(
            Self::load_presets(Collection::Person),
            Self::load_presets(Collection::Clothing),
        )
    }

    pub fn load_presets(collection: Collection) -> Vec<ImageAsset> {
        let (file, yaml) = Self::source(collection);
        match Self::parse_presets(file, yaml) {
            Ok(assets) => {
                debug!(file, count = assets.len(), "presets loaded");
                assets
            }
            Err(e) => {
                warn!(file, error = %e, "failed to load presets");
                Vec::new()
            }
        }
    }

    /// Parse one preset catalog. Ids must be unique within the file.
    pub fn parse_presets(file: &'static str, yaml: &str) -> Result<Vec<ImageAsset>> {
        let entries: Vec<PresetEntry> =
            serde_yaml::from_str(yaml).map_err(|source| AssetError::Parse { file, source })?;

        let mut assets: Vec<ImageAsset> = Vec::with_capacity(entries.len());
        for entry in entries {
            if assets.iter().any(|a| a.id == entry.id) {
                return Err(AssetError::DuplicateId { file, id: entry.id });
            }
            assets.push(ImageAsset::preset(entry.id, entry.url, entry.label));
        }
        Ok(assets)
    }

    fn source(collection: Collection) -> (&'static str, &'static str) {
        match collection {
            Collection::Person => ("presets/people.yaml", PRESET_PEOPLE),
            Collection::Clothing => ("presets/clothing.yaml", PRESET_CLOTHING),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
