//! Native platform speech through the system command-line synthesizer
//!
//! Linux uses espeak-ng, macOS uses `say`. Both take the rate in words per
//! minute and an optional voice name.

use crate::engines::{sanitize, SpeechEngine};
use crate::error::SpeechError;
use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

#[cfg(target_os = "macos")]
const DEFAULT_PROGRAM: Option<&str> = Some("say");

#[cfg(target_os = "linux")]
const DEFAULT_PROGRAM: Option<&str> = Some("espeak-ng");

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
const DEFAULT_PROGRAM: Option<&str> = None;

pub struct NativeEngine {
    program: Option<String>,
    available: bool,
    rate: u32,
    voice: Option<String>,
}

impl NativeEngine {
    /// Engine for the platform synthesizer
    pub fn new(rate: u32, voice: Option<String>) -> Self {
        match DEFAULT_PROGRAM {
            Some(program) => Self::with_program(program, rate, voice),
            None => {
                warn!("Native speech not supported on this platform");
                Self {
                    program: None,
                    available: false,
                    rate,
                    voice,
                }
            }
        }
    }

    /// Engine driving a specific synthesizer binary with espeak/say style
    /// arguments
    pub fn with_program(program: &str, rate: u32, voice: Option<String>) -> Self {
        let available = probe(program);
        if available {
            info!("Native speech engine {} initialized", program);
        } else {
            debug!("Speech program {} not found", program);
        }
        Self {
            program: Some(program.to_string()),
            available,
            rate,
            voice,
        }
    }

    fn args(&self, text: &str) -> Vec<String> {
        let rate_flag = if self.program.as_deref() == Some("say") { "-r" } else { "-s" };
        let mut args = vec![rate_flag.to_string(), self.rate.to_string()];
        if let Some(voice) = &self.voice {
            args.push("-v".to_string());
            args.push(voice.clone());
        }
        args.push(text.to_string());
        args
    }
}

fn probe(program: &str) -> bool {
    let flag = if program == "say" { "-v?" } else { "--version" };
    std::process::Command::new(program)
        .arg(flag)
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

#[async_trait]
impl SpeechEngine for NativeEngine {
    async fn speak(&self, text: &str) -> Result<(), SpeechError> {
        let program = match (&self.program, self.available) {
            (Some(program), true) => program,
            (Some(program), false) => return Err(SpeechError::Unavailable(program.clone())),
            (None, _) => return Err(SpeechError::Unavailable("no native engine".to_string())),
        };

        let text = sanitize(text);
        if text.is_empty() {
            return Err(SpeechError::Synthesizer("Text cannot be empty".to_string()));
        }

        let status = Command::new(program).args(self.args(&text)).status().await?;
        if !status.success() {
            return Err(SpeechError::Engine(format!("{} exited with {}", program, status)));
        }
        Ok(())
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn name(&self) -> &str {
        self.program.as_deref().unwrap_or("native")
    }
}
