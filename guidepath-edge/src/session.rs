//! Fixed-cadence acquisition loop of the edge device

use crate::client::GuideClient;
use crate::error::ClientError;
use guidepath_core::config::GuideConfig;
use guidepath_core::protocol::AnalyzeResponse;
use guidepath_core::{NavigationCommand, RepeatDebounce};
use guidepath_eye::frame::encode_jpeg;
use guidepath_eye::{Frame, FrameSource};
use guidepath_spk::SpeechEngine;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

pub const READY_MESSAGE: &str = "System ready. You can start walking.";

/// What one capture-analyze-speak cycle did
#[derive(Debug)]
pub enum CycleOutcome {
    /// The source produced no frame
    NoFrame,
    /// The frame could not be delivered or the answer was unusable
    Skipped(ClientError),
    /// Instruction received, suppressed by the debouncer
    Quiet(NavigationCommand),
    /// Instruction received and spoken
    Spoken(NavigationCommand),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub cycles: u64,
    pub announcements: u64,
    pub skipped: u64,
}

pub struct EdgeSession {
    source: Box<dyn FrameSource>,
    client: GuideClient,
    speaker: Arc<dyn SpeechEngine>,
    debounce: RepeatDebounce,
    repeat_threshold: u32,
    jpeg_quality: u8,
    interval: Duration,
}

impl EdgeSession {
    pub fn new(
        source: Box<dyn FrameSource>,
        client: GuideClient,
        speaker: Arc<dyn SpeechEngine>,
        config: &GuideConfig,
    ) -> Self {
        Self {
            source,
            client,
            speaker,
            debounce: RepeatDebounce::new(),
            repeat_threshold: config.debounce.repeat_threshold,
            jpeg_quality: config.edge.jpeg_quality,
            interval: capture_interval(config.edge.interval_secs),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn debounce(&self) -> &RepeatDebounce {
        &self.debounce
    }

    /// Speak a message and wait until it has been said
    pub async fn announce(&self, message: &str) {
        info!("{}", message);
        if let Err(e) = self.speaker.speak(message).await {
            warn!("Voice error: {}", e);
        }
    }

    pub async fn run_cycle(&mut self) -> CycleOutcome {
        let Some(frame) = self.source.capture_frame() else {
            warn!("Failed to capture image from {}", self.source.name());
            return CycleOutcome::NoFrame;
        };

        let response = match self.send(&frame).await {
            Ok(response) => response,
            Err(e) => {
                warn!("{}", e);
                return CycleOutcome::Skipped(e);
            }
        };

        let navigation = response.navigation;
        if self.debounce.observe(&navigation, self.repeat_threshold) {
            self.announce(&navigation.message).await;
            CycleOutcome::Spoken(navigation)
        } else {
            CycleOutcome::Quiet(navigation)
        }
    }

    async fn send(&self, frame: &Frame) -> Result<AnalyzeResponse, ClientError> {
        let jpeg = encode_jpeg(frame, self.jpeg_quality)?;
        self.client.analyze(jpeg).await
    }

    /// Announce readiness, then run cycles every interval until `shutdown`
    /// resolves. The frame source is released before returning.
    pub async fn run<F>(mut self, shutdown: F) -> SessionSummary
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut summary = SessionSummary::default();

        info!(
            "System started. An image will be analyzed every {:.1} seconds.",
            self.interval.as_secs_f64()
        );
        self.announce(READY_MESSAGE).await;

        loop {
            let started = Instant::now();

            let outcome = tokio::select! {
                _ = &mut shutdown => break,
                outcome = self.run_cycle() => outcome,
            };
            summary.cycles += 1;

            let pause = match outcome {
                CycleOutcome::NoFrame => self.interval,
                CycleOutcome::Skipped(_) => {
                    summary.skipped += 1;
                    self.interval.saturating_sub(started.elapsed())
                }
                CycleOutcome::Spoken(_) => {
                    summary.announcements += 1;
                    self.interval.saturating_sub(started.elapsed())
                }
                CycleOutcome::Quiet(_) => self.interval.saturating_sub(started.elapsed()),
            };

            tokio::select! {
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(pause) => {}
            }
        }

        info!("Stopped.");
        drop(self.source);
        info!("Resources cleaned up.");
        summary
    }
}

/// Capture cadence; unusable values fall back to one second
fn capture_interval(secs: f64) -> Duration {
    match Duration::try_from_secs_f64(secs) {
        Ok(interval) if !interval.is_zero() => interval,
        _ => {
            warn!("Invalid capture interval {}s, using 1s", secs);
            Duration::from_secs(1)
        }
    }
}
