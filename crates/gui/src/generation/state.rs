//! UI-facing generation state.
//!
//! Requests run on the tokio runtime; outcomes come back over a channel and
//! are applied by `poll`, called once per frame on the UI thread.

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;

use shared::{ActiveParams, GenerationMode, GenerationResult, ModeParams};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use super::client::{GenerationClient, ImageUpload};
use super::tracker::{RequestTracker, Ticket};
use super::{GenerationError, GenerationQuality};

type Outcome = (Ticket, Result<GenerationResult, GenerationError>);

pub struct GenerationState {
    runtime: Handle,
    client: Result<GenerationClient, String>,
    quality: GenerationQuality,
    tracker: RequestTracker,
    tx: mpsc::UnboundedSender<Outcome>,
    rx: mpsc::UnboundedReceiver<Outcome>,
    /// Accepted model reference per backend mode
    models: HashMap<GenerationMode, String>,
    /// Informational backend message per mode (image mode has no model yet)
    messages: HashMap<GenerationMode, String>,
    notices: VecDeque<String>,
}

impl GenerationState {
    pub fn new(runtime: Handle, backend_url: &str, quality: GenerationQuality) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = Self {
            runtime,
            client: Err(String::new()),
            quality,
            tracker: RequestTracker::new(),
            tx,
            rx,
            models: HashMap::new(),
            messages: HashMap::new(),
            notices: VecDeque::new(),
        };
        state.set_backend(backend_url);
        state
    }

    /// Point at another backend. An invalid address is reported on the next
    /// generate attempt.
    pub fn set_backend(&mut self, backend_url: &str) {
        self.client = GenerationClient::new(backend_url).map_err(|e| {
            tracing::warn!("backend url {backend_url:?} rejected: {e}");
            e.to_string()
        });
    }

    pub fn set_quality(&mut self, quality: GenerationQuality) {
        self.quality = quality;
    }

    /// Dispatch a request for the active mode.
    ///
    /// Validation happens first and performs no I/O. Returns `Ok(None)` for
    /// local modes and while a request for the mode is still outstanding.
    pub fn generate(&mut self, params: &ModeParams) -> Result<Option<Ticket>, GenerationError> {
        enum Job {
            Text(String),
            Image(PathBuf, Option<PathBuf>),
        }

        let job = match params.active_params() {
            ActiveParams::Ai(ai) => {
                if ai.prompt.trim().is_empty() {
                    return Err(GenerationError::EmptyPrompt);
                }
                Job::Text(ai.prompt.clone())
            }
            ActiveParams::Image(image) => {
                let front = image
                    .front_image
                    .as_ref()
                    .ok_or(GenerationError::MissingFrontImage)?;
                Job::Image(PathBuf::from(front), image.back_image.as_ref().map(PathBuf::from))
            }
            ActiveParams::Text(_) | ActiveParams::Shapes(_) => return Ok(None),
        };

        let client = match &self.client {
            Ok(client) => client.clone(),
            Err(reason) => {
                self.notices.push_back(format!("Invalid backend address: {reason}"));
                return Ok(None);
            }
        };

        let Some(ticket) = self.tracker.begin(params.active) else {
            tracing::debug!("{:?} request already in flight", params.active);
            return Ok(None);
        };
        tracing::info!("dispatching {:?} request #{}", ticket.mode, ticket.seq);

        let quality = self.quality;
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = match job {
                Job::Text(prompt) => client.generate_text(&prompt, quality).await,
                Job::Image(front, back) => {
                    async {
                        let front = ImageUpload::read(&front).await?;
                        let back = match back {
                            Some(path) => Some(ImageUpload::read(&path).await?),
                            None => None,
                        };
                        client.generate_image(Some(front), back).await
                    }
                    .await
                }
            };
            let _ = tx.send((ticket, result));
        });

        Ok(Some(ticket))
    }

    /// Apply finished requests. Returns the number of results accepted.
    pub fn poll(&mut self, active_mode: GenerationMode) -> usize {
        let mut accepted = 0;
        while let Ok((ticket, result)) = self.rx.try_recv() {
            if !self.tracker.complete(ticket, active_mode) {
                tracing::warn!("discarding stale {:?} response #{}", ticket.mode, ticket.seq);
                continue;
            }
            accepted += 1;
            self.apply(ticket.mode, result);
        }
        accepted
    }

    fn apply(&mut self, mode: GenerationMode, result: Result<GenerationResult, GenerationError>) {
        let result = result.unwrap_or_else(|e| GenerationResult::failure(e.to_string()));

        if result.is_success() {
            match &result.model_reference {
                Some(reference) => {
                    tracing::info!("{mode:?} model accepted: {reference}");
                    self.models.insert(mode, reference.clone());
                }
                None => {
                    tracing::info!("{mode:?} request succeeded without a model");
                    self.models.remove(&mode);
                }
            }
            match result.message {
                Some(message) => self.messages.insert(mode, message),
                None => self.messages.remove(&mode),
            };
        } else {
            let message = result.message.unwrap_or_else(|| "generation failed".to_string());
            tracing::warn!("{mode:?} generation failed: {message}");
            self.models.remove(&mode);
            self.messages.remove(&mode);
            self.notices.push_back(format!("Generation failed: {message}"));
        }
    }

    /// Discard whatever `mode` has outstanding (called when leaving a mode)
    pub fn on_mode_switch(&mut self, previous: GenerationMode) {
        self.tracker.invalidate(previous);
    }

    pub fn is_loading(&self, mode: GenerationMode) -> bool {
        self.tracker.is_loading(mode)
    }

    pub fn model_reference(&self, mode: GenerationMode) -> Option<&str> {
        self.models.get(&mode).map(String::as_str)
    }

    pub fn backend_message(&self, mode: GenerationMode) -> Option<&str> {
        self.messages.get(&mode).map(String::as_str)
    }

    /// Next user-visible notice, oldest first
    pub fn take_notice(&mut self) -> Option<String> {
        self.notices.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::AiParams;

    fn ai(prompt: &str) -> ModeParams {
        ModeParams {
            active: GenerationMode::Ai,
            ai: AiParams { prompt: prompt.into() },
            ..Default::default()
        }
    }

    #[test]
    fn empty_prompt_never_dispatches() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut state = GenerationState::new(rt.handle().clone(), "http://127.0.0.1:9", Default::default());
        assert!(matches!(state.generate(&ai("")), Err(GenerationError::EmptyPrompt)));
        assert!(!state.is_loading(GenerationMode::Ai));
    }

    #[test]
    fn local_modes_do_not_dispatch() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut state = GenerationState::new(rt.handle().clone(), "http://127.0.0.1:9", Default::default());
        let params = ModeParams {
            active: GenerationMode::Shapes,
            ..Default::default()
        };
        assert!(state.generate(&params).unwrap().is_none());
    }

    #[test]
    fn invalid_backend_becomes_notice() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut state = GenerationState::new(rt.handle().clone(), "::nope::", Default::default());
        assert!(state.generate(&ai("vase")).unwrap().is_none());
        assert!(state.take_notice().is_some());
        assert!(!state.is_loading(GenerationMode::Ai));
    }

    #[test]
    fn failure_clears_model_and_notifies() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut state = GenerationState::new(rt.handle().clone(), "http://127.0.0.1:9", Default::default());
        state.apply(GenerationMode::Ai, Ok(GenerationResult::success(Some("http://h/a.ply".into()))));
        assert_eq!(state.model_reference(GenerationMode::Ai), Some("http://h/a.ply"));

        state.apply(GenerationMode::Ai, Err(GenerationError::EmptyPrompt));
        assert_eq!(state.model_reference(GenerationMode::Ai), None);
        assert!(state.take_notice().unwrap().starts_with("Generation failed"));
        assert!(state.take_notice().is_none());
    }
}
