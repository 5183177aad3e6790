//! Asset Store
//!
//! Holds the selectable person and clothing images for the session. The two
//! collections are independent id namespaces. New assets go to the front, so
//! the bundled presets end up at the tail once the user starts uploading or
//! generating garments.
//!
//! Selection is not stored here; the wizard keeps its own cursor.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use url::Url;

use super::media::{ImageData, InlineImage};

/// Label given to user-uploaded people.
pub const UPLOADED_PERSON_LABEL: &str = "Custom model";
/// Label given to user-uploaded garments.
pub const UPLOADED_CLOTHING_LABEL: &str = "Custom garment";

/// Which collection an asset belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Person,
    Clothing,
}

impl Collection {
    pub fn label(self) -> &'static str {
        match self {
            Collection::Person => "person",
            Collection::Clothing => "clothing",
        }
    }

    pub fn upload_label(self) -> &'static str {
        match self {
            Collection::Person => UPLOADED_PERSON_LABEL,
            Collection::Clothing => UPLOADED_CLOTHING_LABEL,
        }
    }
}

/// How an asset came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetSource {
    Preset,
    UserUploaded,
    AiGenerated,
}

/// A selectable image. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAsset {
    pub id: String,
    pub source: AssetSource,
    pub image: ImageData,
    pub label: String,
}

impl ImageAsset {
    pub fn preset(id: impl Into<String>, url: Url, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: AssetSource::Preset,
            image: ImageData::Remote(url),
            label: label.into(),
        }
    }

    pub fn uploaded(image: InlineImage, label: impl Into<String>) -> Self {
        Self {
            id: new_asset_id(),
            source: AssetSource::UserUploaded,
            image: ImageData::Inline(image),
            label: label.into(),
        }
    }

    pub fn generated(image: InlineImage, label: impl Into<String>) -> Self {
        Self {
            id: new_asset_id(),
            source: AssetSource::AiGenerated,
            image: ImageData::Inline(image),
            label: label.into(),
        }
    }
}

fn new_asset_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// In-memory catalog of person and clothing assets.
#[derive(Debug, Clone, Default)]
pub struct AssetStore {
    people: Vec<Arc<ImageAsset>>,
    clothing: Vec<Arc<ImageAsset>>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store seeded with presets, keeping their given order.
    pub fn with_presets(people: Vec<ImageAsset>, clothing: Vec<ImageAsset>) -> Self {
        let mut store = Self::new();
        for asset in people.into_iter().rev() {
            store.add_asset(Collection::Person, asset);
        }
        for asset in clothing.into_iter().rev() {
            store.add_asset(Collection::Clothing, asset);
        }
        store
    }

    /// Insert at the front of `collection`.
    ///
    /// Returns the stored asset, or `None` if an asset with the same id is
    /// already present (the store is left untouched).
    pub fn add_asset(&mut self, collection: Collection, asset: ImageAsset) -> Option<Arc<ImageAsset>> {
        let items = self.items_mut(collection);
        if items.iter().any(|a| a.id == asset.id) {
            tracing::debug!(id = %asset.id, collection = collection.label(), "duplicate asset id ignored");
            return None;
        }
        let asset = Arc::new(asset);
        items.insert(0, Arc::clone(&asset));
        Some(asset)
    }

    /// Assets in presentation order (newest first).
    pub fn list_assets(&self, collection: Collection) -> &[Arc<ImageAsset>] {
        match collection {
            Collection::Person => &self.people,
            Collection::Clothing => &self.clothing,
        }
    }

    pub fn get(&self, collection: Collection, id: &str) -> Option<&Arc<ImageAsset>> {
        self.list_assets(collection).iter().find(|a| a.id == id)
    }

    pub fn len(&self, collection: Collection) -> usize {
        self.list_assets(collection).len()
    }

    pub fn is_empty(&self, collection: Collection) -> bool {
        self.list_assets(collection).is_empty()
    }

    fn items_mut(&mut self, collection: Collection) -> &mut Vec<Arc<ImageAsset>> {
        match collection {
            Collection::Person => &mut self.people,
            Collection::Clothing => &mut self.clothing,
        }
    }
}
