//! Speech engine implementations

pub mod log;
pub mod native;

pub use log::LogEngine;
pub use native::NativeEngine;

use crate::error::SpeechError;
use async_trait::async_trait;
use guidepath_core::config::{SpeechConfig, SpeechEngineKind};
use std::sync::Arc;
use tracing::{info, warn};

/// Something that can say a message out loud
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    /// Speak `text`, returning once playback has finished
    async fn speak(&self, text: &str) -> Result<(), SpeechError>;

    fn is_available(&self) -> bool;

    fn name(&self) -> &str;
}

/// Pick the engine for this configuration.
///
/// Falls back to the log engine when speech is disabled or no native
/// backend is installed, so callers never branch on availability.
pub fn select_engine(config: &SpeechConfig) -> Arc<dyn SpeechEngine> {
    if !config.enabled {
        info!("Speech disabled, messages will be logged");
        return Arc::new(LogEngine::new());
    }

    match config.engine {
        SpeechEngineKind::Log => Arc::new(LogEngine::new()),
        SpeechEngineKind::Native => {
            let native = NativeEngine::new(config.rate, config.voice.clone());
            if native.is_available() {
                info!("Using native speech engine ({})", native.name());
                Arc::new(native)
            } else {
                warn!("No native speech engine found, audio output disabled");
                Arc::new(LogEngine::new())
            }
        }
    }
}

/// Strip characters that have no business in a spoken message
pub(crate) fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control())
        .take(1_000)
        .collect::<String>()
        .trim()
        .trim_start_matches('-')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_speech_logs() {
        let config = SpeechConfig {
            enabled: false,
            ..SpeechConfig::default()
        };
        assert_eq!(select_engine(&config).name(), "log");
    }

    #[test]
    fn test_log_engine_selected_explicitly() {
        let config = SpeechConfig {
            engine: SpeechEngineKind::Log,
            ..SpeechConfig::default()
        };
        let engine = select_engine(&config);
        assert_eq!(engine.name(), "log");
        assert!(engine.is_available());
    }

    #[test]
    fn test_native_selection_always_yields_an_engine() {
        let engine = select_engine(&SpeechConfig::default());
        assert!(engine.is_available());
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("  Go straight.\n"), "Go straight.");
        assert_eq!(sanitize("Path\u{7} lost."), "Path lost.");
        // would otherwise read as a command-line flag
        assert_eq!(sanitize("--help"), "help");
    }
}
