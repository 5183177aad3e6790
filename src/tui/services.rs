use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::core::credentials::{CredentialManager, CredentialProvider, KeyringCredentialProvider};
use crate::core::generation::{
    Completion, GarmentJob, GenerationError, GenerationFailure, Orchestrator, TryOnJob,
};
use crate::core::llm::GoogleProvider;
use crate::core::media::{HttpImageEncoder, ImageEncoder, MediaError};

use super::events::AppEvent;

/// Centralized handle to the backend: credentials and the generation
/// orchestrator. Generation jobs run on the tokio runtime and report back
/// through the event channel.
pub struct Services {
    pub config: AppConfig,
    pub credentials: KeyringCredentialProvider,
    encoder: Arc<dyn ImageEncoder>,
    orchestrator: Option<Arc<Orchestrator>>,
    pub event_tx: mpsc::UnboundedSender<AppEvent>,
}

impl Services {
    /// Build services and connect with a stored key when one is available.
    pub async fn init(
        config: AppConfig,
        event_tx: mpsc::UnboundedSender<AppEvent>,
    ) -> Result<Self, MediaError> {
        let credentials = KeyringCredentialProvider::from_env(CredentialManager::new());
        let mut services = Self::new(config, credentials, event_tx)?;

        if services.credentials.has_valid_credential() {
            match services.credentials.request_credential().await {
                Ok(key) => {
                    if let Err(e) = services.connect(&key) {
                        log::warn!("Failed to create Gemini client: {e}");
                    }
                }
                Err(e) => log::warn!("Stored API key unavailable: {e}"),
            }
        } else {
            log::info!("No API key configured, starting in key setup");
        }

        Ok(services)
    }

    pub fn new(
        config: AppConfig,
        credentials: KeyringCredentialProvider,
        event_tx: mpsc::UnboundedSender<AppEvent>,
    ) -> Result<Self, MediaError> {
        let encoder = HttpImageEncoder::new(Duration::from_secs(config.gemini.timeout_secs))?;
        Ok(Self {
            config,
            credentials,
            encoder: Arc::new(encoder),
            orchestrator: None,
            event_tx,
        })
    }

    pub fn is_connected(&self) -> bool {
        self.orchestrator.is_some()
    }

    /// (Re)create the orchestrator for `api_key`.
    pub fn connect(&mut self, api_key: &str) -> Result<(), GenerationError> {
        let provider = GoogleProvider::new(api_key, &self.config.gemini)?;
        self.orchestrator = Some(Arc::new(Orchestrator::with_provider(
            Arc::new(provider),
            self.encoder.clone(),
        )));
        log::info!("Gemini client ready (base url {})", self.config.gemini.base_url);
        Ok(())
    }

    pub fn disconnect(&mut self) {
        self.orchestrator = None;
    }

    pub fn spawn_try_on(&self, job: TryOnJob) {
        let Some(orchestrator) = self.orchestrator.clone() else {
            self.send(Completion::TryOn {
                ticket: job.ticket,
                person: job.person,
                clothing: job.clothing,
                outcome: Err(GenerationFailure::from(GenerationError::MissingCredential)),
            });
            return;
        };
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let completion = orchestrator.run_try_on(job).await;
            let _ = tx.send(AppEvent::Generation(completion));
        });
    }

    pub fn spawn_garment(&self, job: GarmentJob) {
        let Some(orchestrator) = self.orchestrator.clone() else {
            self.send(Completion::Garment {
                ticket: job.ticket,
                prompt: job.prompt,
                outcome: Err(GenerationFailure::from(GenerationError::MissingCredential)),
            });
            return;
        };
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            orchestrator
                .run_garment(job, |completion| {
                    let _ = tx.send(AppEvent::Generation(completion));
                })
                .await;
        });
    }

    fn send(&self, completion: Completion) {
        if self.event_tx.send(AppEvent::Generation(completion)).is_err() {
            log::warn!("Event channel closed, dropping completion");
        }
    }
}
