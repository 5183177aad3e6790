//! Test Fixtures
//!
//! Small assets, sessions and images for exercising the wizard.

use url::Url;

use crate::core::catalog::{AssetStore, ImageAsset};
use crate::core::media::InlineImage;
use crate::core::wizard::{Session, WizardConfig};

/// 1x1 transparent PNG.
pub const PNG_1X1: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

pub fn png() -> InlineImage {
    InlineImage::from_bytes(PNG_1X1, "image/png")
}

/// A distinguishable fake result payload.
pub fn result_image(tag: &str) -> InlineImage {
    InlineImage::from_bytes(tag.as_bytes(), "image/png")
}

// =============================================================================
// Store and Session Fixtures
// =============================================================================

fn remote(name: &str) -> Url {
    Url::parse(&format!("https://img.test/{name}.jpg")).unwrap()
}

/// Two people (P1, P2) and two garments (C1, C2), all remote presets.
pub fn create_test_store() -> AssetStore {
    AssetStore::with_presets(
        vec![
            ImageAsset::preset("p1", remote("p1"), "Model 1"),
            ImageAsset::preset("p2", remote("p2"), "Model 2"),
        ],
        vec![
            ImageAsset::preset("c1", remote("c1"), "Jacket"),
            ImageAsset::preset("c2", remote("c2"), "Shirt"),
        ],
    )
}

/// Fresh session with a valid credential.
pub fn create_test_session() -> Session {
    create_session_with(WizardConfig::default())
}

pub fn create_session_with(config: WizardConfig) -> Session {
    let mut session = Session::new(create_test_store(), config);
    session.set_credential_valid(true);
    session
}

/// Session on the garment step with P1 chosen.
pub fn session_on_clothing_step() -> Session {
    let mut session = create_test_session();
    assert!(session.select_person("p1"));
    assert!(session.advance());
    session
}

/// Session with P1 and C1 selected, ready for a try-on.
pub fn session_ready_for_try_on() -> Session {
    let mut session = session_on_clothing_step();
    assert!(session.select_clothing("c1"));
    session
}
