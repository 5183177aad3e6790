//! Property-based tests for the asset store
//!
//! Tests invariants:
//! - Ids are unique within each collection after any sequence of additions
//! - A rejected duplicate leaves the store unchanged
//! - Accepted assets land at the front

use std::collections::HashSet;

use proptest::prelude::*;

use crate::core::catalog::{AssetStore, Collection, ImageAsset};
use crate::core::media::InlineImage;

// ============================================================================
// Strategies
// ============================================================================

fn arb_collection() -> impl Strategy<Value = Collection> {
    prop_oneof![Just(Collection::Person), Just(Collection::Clothing)]
}

/// Ids drawn from a small pool so collisions are frequent.
fn arb_id() -> impl Strategy<Value = String> {
    "[a-e][0-3]"
}

fn asset_with_id(id: &str) -> ImageAsset {
    let mut asset = ImageAsset::uploaded(InlineImage::new("image/png", "AAAA"), "Test");
    asset.id = id.to_string();
    asset
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn ids_stay_unique(ops in prop::collection::vec((arb_collection(), arb_id()), 0..64)) {
        let mut store = AssetStore::new();
        for (collection, id) in &ops {
            store.add_asset(*collection, asset_with_id(id));
        }

        for collection in [Collection::Person, Collection::Clothing] {
            let ids: Vec<&str> = store.list_assets(collection).iter().map(|a| a.id.as_str()).collect();
            let unique: HashSet<&str> = ids.iter().copied().collect();
            prop_assert_eq!(ids.len(), unique.len());
        }
    }

    #[test]
    fn add_result_matches_store_change(ops in prop::collection::vec((arb_collection(), arb_id()), 1..64)) {
        let mut store = AssetStore::new();
        for (collection, id) in &ops {
            let before = store.len(*collection);
            let already_present = store.get(*collection, id).is_some();

            let added = store.add_asset(*collection, asset_with_id(id));

            if already_present {
                prop_assert!(added.is_none());
                prop_assert_eq!(store.len(*collection), before);
            } else {
                prop_assert!(added.is_some());
                prop_assert_eq!(store.len(*collection), before + 1);
                prop_assert_eq!(&store.list_assets(*collection)[0].id, id);
            }
        }
    }

    #[test]
    fn generated_ids_never_collide(count in 1usize..50) {
        let mut store = AssetStore::new();
        for _ in 0..count {
            let asset = ImageAsset::generated(InlineImage::new("image/png", "AAAA"), "prompt");
            prop_assert!(store.add_asset(Collection::Clothing, asset).is_some());
        }
        prop_assert_eq!(store.len(Collection::Clothing), count);
    }
}
