//! Wizard session behaviour that needs no generation backend.

use std::sync::Arc;

use crate::core::catalog::{AssetSource, Collection};
use crate::core::generation::{
    Completion, GenerationError, GenerationFailure, TryOnOutput, ENTITLEMENT_MESSAGE,
    GARMENT_FAILED_MESSAGE,
};
use crate::core::media::InlineImage;
use crate::core::wizard::{PendingOperation, Session, WizardConfig, WizardStep};
use crate::tests::common::*;

/// Complete a try-on for the current selections with a fixed result.
fn complete_try_on(session: &mut Session, tag: &str) -> String {
    let job = session.request_try_on().expect("try-on should begin");
    session.apply(Completion::TryOn {
        ticket: job.ticket,
        person: job.person,
        clothing: job.clothing,
        outcome: Ok(TryOnOutput {
            image: result_image(tag),
            critique: format!("critique {tag}"),
        }),
    });
    session.history().latest().unwrap().id.clone()
}

// =============================================================================
// request_try_on preconditions
// =============================================================================

#[test]
fn test_try_on_requires_both_selections() {
    let mut session = create_test_session();
    assert!(session.request_try_on().is_none());

    session.select_person("p1");
    assert!(session.request_try_on().is_none());
    session.advance();
    assert!(session.request_try_on().is_none());
    assert_eq!(session.state().step, WizardStep::SelectClothing);
    assert!(!session.is_pending());

    session.select_clothing("c1");
    assert!(session.request_try_on().is_some());
}

#[test]
fn test_try_on_refused_while_pending() {
    let mut session = session_ready_for_try_on();
    let first = session.request_try_on().unwrap();
    assert!(session.request_try_on().is_none());
    assert_eq!(session.active_ticket(), Some(first.ticket));
}

#[test]
fn test_try_on_transition_is_optimistic() {
    let mut session = session_ready_for_try_on();
    complete_try_on(&mut session, "old");
    session.back();

    let job = session.request_try_on().unwrap();
    let state = session.state();
    assert_eq!(job.person.id, "p1");
    assert_eq!(job.clothing.id, "c1");
    assert_eq!(state.step, WizardStep::Result);
    assert_eq!(state.pending, PendingOperation::GeneratingTryOn);
    assert!(state.result_image.is_none());
    assert!(state.critique.is_none());
    assert!(state.error_message.is_none());
    assert!(state.result_history_id.is_none());
}

// =============================================================================
// History
// =============================================================================

#[test]
fn test_success_prepends_one_history_item() {
    let mut session = session_ready_for_try_on();
    let first = complete_try_on(&mut session, "one");
    session.back();
    session.select_clothing("c2");
    let second = complete_try_on(&mut session, "two");

    let items = session.history().items();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id, second);
    assert_eq!(items[1].id, first);
    assert_eq!(items[0].result_image, result_image("two"));
    assert_eq!(session.state().result_history_id.as_deref(), Some(second.as_str()));
}

#[test]
fn test_load_history_item_is_read_only() {
    let mut session = session_ready_for_try_on();
    let id = complete_try_on(&mut session, "saved");
    session.reset();
    assert_eq!(session.state().step, WizardStep::SelectPerson);

    assert!(session.load_history_item(&id));
    let state = session.state();
    assert_eq!(state.step, WizardStep::Result);
    assert_eq!(state.result_image, Some(result_image("saved")));
    assert_eq!(state.critique.as_deref(), Some("critique saved"));
    assert_eq!(session.history().len(), 1);
    assert_eq!(session.current_history_item().map(|i| i.id.as_str()), Some(id.as_str()));

    assert!(!session.load_history_item("missing"));
    assert_eq!(session.history().len(), 1);
}

#[test]
fn test_load_history_item_clears_stale_error() {
    let mut session = session_ready_for_try_on();
    let id = complete_try_on(&mut session, "saved");
    session.back();

    let job = session.begin_garment("red scarf").unwrap();
    session.apply(Completion::Garment {
        ticket: job.ticket,
        prompt: job.prompt,
        outcome: Err(GenerationFailure::generic("boom")),
    });
    assert_eq!(session.state().error_message.as_deref(), Some(GARMENT_FAILED_MESSAGE));

    assert!(session.load_history_item(&id));
    assert!(session.state().error_message.is_none());
    assert_eq!(session.state().step, WizardStep::Result);
}

#[test]
fn test_download_writes_current_result() {
    let mut session = session_ready_for_try_on();
    complete_try_on(&mut session, "download me");
    let dir = tempfile::tempdir().unwrap();

    let item = session.current_history_item().unwrap();
    let path = item.save_result(dir.path()).unwrap();

    assert!(path.starts_with(dir.path()));
    assert!(path.file_name().unwrap().to_string_lossy().starts_with("wearai-result-"));
    assert_eq!(std::fs::read(&path).unwrap(), b"download me");
}

// =============================================================================
// Reset and navigation
// =============================================================================

#[test]
fn test_reset_keeps_person_clears_outfit() {
    let mut session = session_ready_for_try_on();
    complete_try_on(&mut session, "r");

    session.reset();
    let state = session.state();
    assert_eq!(state.step, WizardStep::SelectPerson);
    assert_eq!(state.selected_person_id(), Some("p1"));
    assert!(state.selected_clothing.is_none());
    assert!(state.result_image.is_none());
    assert!(state.critique.is_none());
    assert!(state.enhanced_prompt.is_none());
    assert_eq!(session.history().len(), 1);
}

#[test]
fn test_back_from_result_keeps_result() {
    let mut session = session_ready_for_try_on();
    complete_try_on(&mut session, "kept");

    assert!(session.back());
    assert_eq!(session.state().step, WizardStep::SelectClothing);
    assert_eq!(session.state().result_image, Some(result_image("kept")));
}

#[test]
fn test_navigation_blocked_while_pending() {
    let mut session = session_ready_for_try_on();
    session.request_try_on().unwrap();

    assert!(!session.back());
    assert!(!session.jump_to(WizardStep::SelectPerson));
    assert!(!session.load_history_item("anything"));
    assert_eq!(session.state().step, WizardStep::Result);
}

#[test]
fn test_selection_rules_per_step() {
    let mut session = session_on_clothing_step();
    // Person choices are locked outside the first step.
    assert!(!session.select_person("p2"));
    assert!(session.jump_to(WizardStep::SelectPerson));
    assert!(session.select_person("p2"));
    assert!(!session.select_clothing("c1"));
    assert_eq!(session.state().selected_person_id(), Some("p2"));
}

#[test]
fn test_back_navigation_retains_clothing_by_default() {
    let mut session = session_ready_for_try_on();
    session.back();
    assert_eq!(session.state().selected_clothing_id(), Some("c1"));

    let mut session = create_session_with(WizardConfig {
        clear_clothing_on_back: true,
    });
    session.select_person("p1");
    session.advance();
    session.select_clothing("c1");
    session.jump_to(WizardStep::SelectPerson);
    assert!(session.state().selected_clothing.is_none());
}

// =============================================================================
// Uploads and errors
// =============================================================================

#[test]
fn test_upload_adds_and_selects() {
    let mut session = create_test_session();
    let stored = session.upload(Collection::Person, png()).unwrap();

    assert_eq!(stored.source, AssetSource::UserUploaded);
    assert_eq!(stored.label, "Custom model");
    assert!(Arc::ptr_eq(&session.assets().list_assets(Collection::Person)[0], &stored));
    assert_eq!(session.state().selected_person_id(), Some(stored.id.as_str()));
}

#[test]
fn test_upload_clothing_before_person_is_stored_but_not_selected() {
    let mut session = create_test_session();
    let stored = session.upload(Collection::Clothing, png()).unwrap();
    assert_eq!(session.assets().len(Collection::Clothing), 3);
    assert!(session.state().selected_clothing.is_none());
    assert_eq!(stored.label, "Custom garment");
}

#[test]
fn test_dismiss_error_at_any_time() {
    let mut session = session_on_clothing_step();
    let job = session.begin_garment("red scarf").unwrap();
    session.apply(Completion::Garment {
        ticket: job.ticket,
        prompt: job.prompt,
        outcome: Err(GenerationFailure::generic("boom")),
    });
    assert_eq!(session.state().error_message.as_deref(), Some(GARMENT_FAILED_MESSAGE));
    session.dismiss_error();
    assert!(session.state().error_message.is_none());

    session.select_clothing("c1");
    session.request_try_on().unwrap();
    session.dismiss_error();
    assert!(session.is_pending());
    assert_eq!(session.state().step, WizardStep::Result);
}

#[test]
fn test_garment_entitlement_failure_revokes_credential() {
    let mut session = session_on_clothing_step();
    let job = session.begin_garment("red scarf").unwrap();
    session.apply(Completion::Garment {
        ticket: job.ticket,
        prompt: job.prompt,
        outcome: Err(GenerationFailure::from(GenerationError::api(403, "denied"))),
    });
    assert!(!session.credential_valid());
    assert_eq!(session.state().error_message.as_deref(), Some(ENTITLEMENT_MESSAGE));
    assert_eq!(session.state().step, WizardStep::SelectClothing);
}

#[test]
fn test_enhanced_prompt_advances_pending_stage() {
    let mut session = session_on_clothing_step();
    let job = session.begin_garment("red scarf").unwrap();
    assert_eq!(session.state().pending, PendingOperation::EnhancingPrompt);

    session.apply(Completion::PromptEnhanced {
        ticket: job.ticket,
        enhanced_prompt: "A flowing crimson silk scarf".to_string(),
    });
    assert_eq!(session.state().pending, PendingOperation::GeneratingGarment);
    assert_eq!(
        session.state().enhanced_prompt.as_deref(),
        Some("A flowing crimson silk scarf")
    );

    session.apply(Completion::Garment {
        ticket: job.ticket,
        prompt: job.prompt,
        outcome: Ok(InlineImage::from_bytes(b"scarf", "image/png")),
    });
    assert!(!session.is_pending());
    let selected = session.state().selected_clothing.clone().unwrap();
    assert_eq!(selected.label, "red scarf");
    assert_eq!(selected.source, AssetSource::AiGenerated);
}

#[test]
fn test_blank_prompt_is_a_no_op() {
    let mut session = session_on_clothing_step();
    assert!(session.begin_garment("").is_none());
    assert!(session.begin_garment("   \t").is_none());
    assert!(!session.is_pending());
    assert!(session.active_ticket().is_none());
}
