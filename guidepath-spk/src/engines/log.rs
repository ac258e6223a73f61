//! Fallback engine that writes messages to the log

use crate::engines::{sanitize, SpeechEngine};
use crate::error::SpeechError;
use async_trait::async_trait;
use tracing::info;

#[derive(Debug, Default, Clone)]
pub struct LogEngine;

impl LogEngine {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SpeechEngine for LogEngine {
    async fn speak(&self, text: &str) -> Result<(), SpeechError> {
        info!("[AUDIO] {}", sanitize(text));
        Ok(())
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "log"
    }
}
