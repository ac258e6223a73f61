//! Single-slot narration
//!
//! At most one message plays at a time. A message submitted while another
//! is playing is dropped, never queued.

use crate::engines::SpeechEngine;
use crate::error::SpeechError;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct Narrator {
    engine: Arc<dyn SpeechEngine>,
    slot: Arc<Semaphore>,
}

impl Narrator {
    pub fn new(engine: Arc<dyn SpeechEngine>) -> Self {
        Self {
            engine,
            slot: Arc::new(Semaphore::new(1)),
        }
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    pub fn is_busy(&self) -> bool {
        self.slot.available_permits() == 0
    }

    /// Start speaking `message` in the background if the slot is free.
    ///
    /// Returns whether the message was accepted. Must be called from within
    /// a tokio runtime.
    pub fn submit(&self, message: impl Into<String>) -> bool {
        let message = message.into();
        let permit = match self.slot.clone().try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                debug!("Narration in progress, dropping: {}", message);
                return false;
            }
        };

        let engine = self.engine.clone();
        tokio::spawn(async move {
            if let Err(e) = engine.speak(&message).await {
                warn!("Voice error: {}", e);
            }
            drop(permit);
        });
        true
    }

    /// Wait for the slot, then speak `message` to completion
    pub async fn speak(&self, message: &str) -> Result<(), SpeechError> {
        let _permit = self
            .slot
            .acquire()
            .await
            .map_err(|e| SpeechError::Synthesizer(e.to_string()))?;
        self.engine.speak(message).await
    }
}
