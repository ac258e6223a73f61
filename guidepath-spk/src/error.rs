//! Error types for guidepath-spk

use thiserror::Error;

/// Speech output errors
#[derive(Error, Debug)]
pub enum SpeechError {
    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Speech engine unavailable: {0}")]
    Unavailable(String),

    #[error("Synthesizer error: {0}")]
    Synthesizer(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speech_error_display() {
        let err = SpeechError::Unavailable("espeak-ng".to_string());
        assert_eq!(err.to_string(), "Speech engine unavailable: espeak-ng");
    }

    #[test]
    fn test_from_io() {
        let err: SpeechError = std::io::Error::new(std::io::ErrorKind::NotFound, "say").into();
        assert!(matches!(err, SpeechError::Io(_)));
    }
}
