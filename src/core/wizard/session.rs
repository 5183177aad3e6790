//! The single owner of wizard state, assets, history and the credential flag.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::types::{PendingOperation, WizardConfig, WizardState, WizardStep};
use crate::core::catalog::{AssetStore, Collection, ImageAsset};
use crate::core::generation::{
    Completion, GarmentJob, GenerationFailure, OperationTicket, TryOnJob, GARMENT_FAILED_MESSAGE,
    TRY_ON_FAILED_MESSAGE,
};
use crate::core::history::{HistoryItem, HistoryLog};
use crate::core::media::InlineImage;

#[derive(Debug)]
pub struct Session {
    config: WizardConfig,
    state: WizardState,
    assets: AssetStore,
    history: HistoryLog,
    credential_valid: bool,
    active: Option<OperationTicket>,
    issued: u64,
}

impl Session {
    /// The credential flag starts unset; callers confirm it once a key is known.
    pub fn new(assets: AssetStore, config: WizardConfig) -> Self {
        Self {
            config,
            state: WizardState::default(),
            assets,
            history: HistoryLog::new(),
            credential_valid: false,
            active: None,
            issued: 0,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn assets(&self) -> &AssetStore {
        &self.assets
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn config(&self) -> &WizardConfig {
        &self.config
    }

    pub fn credential_valid(&self) -> bool {
        self.credential_valid
    }

    pub fn set_credential_valid(&mut self, valid: bool) {
        if self.credential_valid != valid {
            info!(valid, "credential flag changed");
        }
        self.credential_valid = valid;
    }

    pub fn is_pending(&self) -> bool {
        self.state.is_pending()
    }

    pub fn active_ticket(&self) -> Option<OperationTicket> {
        self.active
    }

    // ========================================================================
    // Selection and navigation
    // ========================================================================

    pub fn select_person(&mut self, id: &str) -> bool {
        if self.state.step != WizardStep::SelectPerson {
            return false;
        }
        let Some(asset) = self.assets.get(Collection::Person, id).cloned() else {
            debug!(id, "unknown person asset");
            return false;
        };
        self.state.selected_person = Some(asset);
        true
    }

    /// Rejected unless a person is already selected.
    pub fn select_clothing(&mut self, id: &str) -> bool {
        if self.state.step != WizardStep::SelectClothing || self.state.selected_person.is_none() {
            return false;
        }
        let Some(asset) = self.assets.get(Collection::Clothing, id).cloned() else {
            debug!(id, "unknown clothing asset");
            return false;
        };
        self.state.selected_clothing = Some(asset);
        true
    }

    /// SelectPerson to SelectClothing, once a person is chosen.
    pub fn advance(&mut self) -> bool {
        if self.state.step == WizardStep::SelectPerson && self.state.selected_person.is_some() {
            self.state.step = WizardStep::SelectClothing;
            true
        } else {
            false
        }
    }

    pub fn back(&mut self) -> bool {
        if self.is_pending() {
            return false;
        }
        match self.state.step.previous() {
            None => false,
            Some(WizardStep::SelectPerson) => {
                self.enter_person_step();
                true
            }
            Some(step) => {
                self.state.step = step;
                true
            }
        }
    }

    /// Step-card navigation. Result is only reachable through a try-on.
    pub fn jump_to(&mut self, step: WizardStep) -> bool {
        if self.is_pending() || step == self.state.step {
            return false;
        }
        match step {
            WizardStep::SelectPerson => {
                self.enter_person_step();
                true
            }
            WizardStep::SelectClothing if self.state.selected_person.is_some() => {
                self.state.step = WizardStep::SelectClothing;
                true
            }
            _ => false,
        }
    }

    /// Start a new outfit on the same model. Abandons any in-flight operation.
    pub fn reset(&mut self) {
        if let Some(ticket) = self.active.take() {
            info!(%ticket, pending = ?self.state.pending, "abandoning in-flight operation");
        }
        self.state.pending = PendingOperation::None;
        self.state.step = WizardStep::SelectPerson;
        self.state.selected_clothing = None;
        self.state.result_image = None;
        self.state.critique = None;
        self.state.result_history_id = None;
        self.state.enhanced_prompt = None;
    }

    /// Show a past result without regenerating it.
    pub fn load_history_item(&mut self, id: &str) -> bool {
        if self.is_pending() {
            return false;
        }
        let Some(item) = self.history.get(id) else {
            return false;
        };
        self.state.result_image = Some(item.result_image.clone());
        self.state.critique = item.critique.clone();
        self.state.result_history_id = Some(item.id.clone());
        self.state.step = WizardStep::Result;
        self.state.error_message = None;
        true
    }

    /// History entry behind the result currently shown, if any.
    pub fn current_history_item(&self) -> Option<&HistoryItem> {
        self.state
            .result_history_id
            .as_deref()
            .and_then(|id| self.history.get(id))
    }

    pub fn dismiss_error(&mut self) {
        self.state.error_message = None;
    }

    /// Add a user-uploaded image and try to select it.
    pub fn upload(&mut self, collection: Collection, image: InlineImage) -> Option<Arc<ImageAsset>> {
        let asset = ImageAsset::uploaded(image, collection.upload_label());
        let stored = self.assets.add_asset(collection, asset)?;
        let selected = match collection {
            Collection::Person => self.select_person(&stored.id),
            Collection::Clothing => self.select_clothing(&stored.id),
        };
        info!(collection = collection.label(), id = %stored.id, selected, "image uploaded");
        Some(stored)
    }

    fn enter_person_step(&mut self) {
        self.state.step = WizardStep::SelectPerson;
        if self.config.clear_clothing_on_back {
            self.state.selected_clothing = None;
        }
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Begin a try-on for the current selections, moving straight to Result.
    pub fn request_try_on(&mut self) -> Option<TryOnJob> {
        if !self.state.can_try_on() {
            return None;
        }
        let person = self.state.selected_person.clone()?;
        let clothing = self.state.selected_clothing.clone()?;

        let ticket = self.issue_ticket();
        self.state.step = WizardStep::Result;
        self.state.pending = PendingOperation::GeneratingTryOn;
        self.state.result_image = None;
        self.state.critique = None;
        self.state.result_history_id = None;
        self.state.error_message = None;

        info!(%ticket, person = %person.id, clothing = %clothing.id, "try-on requested");
        Some(TryOnJob {
            ticket,
            person,
            clothing,
        })
    }

    /// Begin a garment generation. Blank prompts are ignored.
    pub fn begin_garment(&mut self, prompt: &str) -> Option<GarmentJob> {
        if prompt.trim().is_empty()
            || self.is_pending()
            || self.state.step != WizardStep::SelectClothing
        {
            return None;
        }

        let ticket = self.issue_ticket();
        self.state.pending = PendingOperation::EnhancingPrompt;
        self.state.enhanced_prompt = None;
        self.state.error_message = None;

        info!(%ticket, prompt, "garment generation requested");
        Some(GarmentJob {
            ticket,
            prompt: prompt.to_string(),
        })
    }

    /// Apply a completion. Completions for abandoned operations only keep
    /// their side effects on assets, history and the credential flag.
    pub fn apply(&mut self, completion: Completion) {
        let ticket = completion.ticket();
        let current = self.active == Some(ticket);
        if !current {
            debug!(%ticket, "stale completion");
        }

        match completion {
            Completion::PromptEnhanced {
                enhanced_prompt, ..
            } => {
                if current && self.state.pending == PendingOperation::EnhancingPrompt {
                    self.state.pending = PendingOperation::GeneratingGarment;
                    self.state.enhanced_prompt = Some(enhanced_prompt);
                }
            }
            Completion::Garment {
                prompt, outcome, ..
            } => match outcome {
                Ok(image) => {
                    let stored = self
                        .assets
                        .add_asset(Collection::Clothing, ImageAsset::generated(image, prompt));
                    if current {
                        self.finish();
                        if let Some(asset) = stored {
                            if self.state.selected_person.is_some() {
                                self.state.selected_clothing = Some(asset);
                            }
                        }
                    }
                }
                Err(failure) => {
                    self.note_failure(&failure);
                    if current {
                        self.finish();
                        self.state.error_message = Some(failure.user_message(GARMENT_FAILED_MESSAGE));
                    }
                }
            },
            Completion::TryOn {
                person,
                clothing,
                outcome,
                ..
            } => match outcome {
                Ok(output) => {
                    let item = HistoryItem::new(
                        person.image.clone(),
                        clothing.image.clone(),
                        output.image.clone(),
                        Some(output.critique.clone()),
                    );
                    let item_id = item.id.clone();
                    self.history.record(item);
                    if current {
                        self.finish();
                        self.state.result_image = Some(output.image);
                        self.state.critique = Some(output.critique);
                        self.state.result_history_id = Some(item_id);
                    }
                }
                Err(failure) => {
                    self.note_failure(&failure);
                    if current {
                        self.finish();
                        self.state.error_message = Some(failure.user_message(TRY_ON_FAILED_MESSAGE));
                        self.state.step = WizardStep::SelectClothing;
                    }
                }
            },
        }
    }

    fn issue_ticket(&mut self) -> OperationTicket {
        self.issued += 1;
        let ticket = OperationTicket::new(self.issued);
        self.active = Some(ticket);
        ticket
    }

    fn finish(&mut self) {
        self.active = None;
        self.state.pending = PendingOperation::None;
    }

    fn note_failure(&mut self, failure: &GenerationFailure) {
        if failure.is_entitlement() {
            warn!(detail = %failure.detail, "revoking credential after entitlement failure");
            self.set_credential_valid(false);
        }
    }
}
