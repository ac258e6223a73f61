// Configuration for the guidance system
//
// Every tuned constant of the pipeline lives here so a deployment can be
// recalibrated for a different camera or lighting without a rebuild.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Color segmentation and gating
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Processing resolution; frames are resized to this before analysis
    pub frame_width: u32,
    pub frame_height: u32,
    /// Inclusive HSV lower bound, hue on the 0-179 scale
    pub hsv_lower: [u8; 3],
    /// Inclusive HSV upper bound
    pub hsv_upper: [u8; 3],
    /// Side of the square structuring element used for mask cleanup
    pub kernel_size: u32,
    /// Minimum path coverage in percent; below it the path counts as lost
    pub min_confidence: f64,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            frame_width: 320,
            frame_height: 240,
            hsv_lower: [20, 100, 100],
            hsv_upper: [35, 255, 255],
            kernel_size: 5,
            min_confidence: 1.0,
        }
    }
}

/// Line versus dotted-marker classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    pub clahe_clip_limit: f32,
    /// Tiles per axis for local equalization
    pub clahe_tiles: u32,
    pub blur_kernel: u32,
    pub canny_low: f32,
    pub canny_high: f32,
    /// Bounding box side must be strictly between min and max to count as a dot
    pub dot_min_size: u32,
    pub dot_max_size: u32,
    /// Width/height ratio must be strictly inside this window
    pub dot_min_aspect: f32,
    pub dot_max_aspect: f32,
    /// More dots than this means an intersection marker
    pub dot_count_threshold: usize,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            clahe_clip_limit: 3.0,
            clahe_tiles: 8,
            blur_kernel: 5,
            canny_low: 40.0,
            canny_high: 100.0,
            dot_min_size: 2,
            dot_max_size: 30,
            dot_min_aspect: 0.5,
            dot_max_aspect: 2.0,
            dot_count_threshold: 15,
        }
    }
}

/// Steering dead zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionConfig {
    /// Offsets below this are `left`
    pub left_boundary: f64,
    /// Offsets above this are `right`
    pub right_boundary: f64,
}

impl Default for PositionConfig {
    fn default() -> Self {
        Self {
            left_boundary: -0.25,
            right_boundary: 0.25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebounceConfig {
    /// Identical consecutive readings before an unchanged instruction is repeated
    pub repeat_threshold: u32,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self { repeat_threshold: 3 }
    }
}

/// Processing node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    /// Persist the annotated frame and edge map after each analysis
    pub debug_artifacts: bool,
    pub debug_dir: PathBuf,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 5000,
            debug_artifacts: true,
            debug_dir: PathBuf::from("."),
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Where the edge device gets its frames from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureSource {
    /// Device camera by index
    Camera(u32),
    /// Still image file, or a directory cycled in name order
    Images(PathBuf),
}

/// Edge device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeConfig {
    pub server_url: String,
    /// Capture cadence in seconds
    pub interval_secs: f64,
    pub request_timeout_secs: f64,
    pub health_timeout_secs: f64,
    pub jpeg_quality: u8,
    pub capture_width: u32,
    pub capture_height: u32,
    pub source: CaptureSource,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:5000".to_string(),
            interval_secs: 1.0,
            request_timeout_secs: 2.0,
            health_timeout_secs: 3.0,
            jpeg_quality: 80,
            capture_width: 640,
            capture_height: 480,
            source: CaptureSource::Camera(0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeechEngineKind {
    /// Platform speech command (espeak-ng, say)
    Native,
    /// Text log only
    Log,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub enabled: bool,
    pub engine: SpeechEngineKind,
    /// Words per minute
    pub rate: u32,
    /// Voice name or language hint passed to the engine
    pub voice: Option<String>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            engine: SpeechEngineKind::Native,
            rate: 150,
            voice: None,
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuideConfig {
    pub vision: VisionConfig,
    pub pattern: PatternConfig,
    pub position: PositionConfig,
    pub debounce: DebounceConfig,
    pub server: ServerConfig,
    pub edge: EdgeConfig,
    pub speech: SpeechConfig,
    pub log_level: String,
}

impl Default for GuideConfig {
    fn default() -> Self {
        Self {
            vision: VisionConfig::default(),
            pattern: PatternConfig::default(),
            position: PositionConfig::default(),
            debounce: DebounceConfig::default(),
            server: ServerConfig::default(),
            edge: EdgeConfig::default(),
            speech: SpeechConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl GuideConfig {
    /// Load configuration from a JSON, TOML or YAML file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;
        Self::from_str(&content)
    }

    /// Load configuration from string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        if let Ok(config) = serde_json::from_str::<GuideConfig>(content) {
            return Ok(config);
        }

        if let Ok(config) = toml::from_str::<GuideConfig>(content) {
            return Ok(config);
        }

        if let Ok(config) = serde_yaml::from_str::<GuideConfig>(content) {
            return Ok(config);
        }

        Err(ConfigError::ParseError("Unknown format".to_string()))
    }

    /// Defaults overridden by `GUIDEPATH_*` environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Override fields from `GUIDEPATH_*` environment variables
    pub fn apply_env(&mut self) {
        if let Ok(port) = std::env::var("GUIDEPATH_PORT") {
            if let Ok(p) = port.parse::<u16>() {
                self.server.port = p;
            }
        }

        if let Ok(host) = std::env::var("GUIDEPATH_HOST") {
            self.server.bind_address = host;
        }

        if let Ok(dir) = std::env::var("GUIDEPATH_DEBUG_DIR") {
            self.server.debug_dir = PathBuf::from(dir);
        }

        if let Ok(url) = std::env::var("GUIDEPATH_SERVER_URL") {
            self.edge.server_url = url;
        }

        if let Ok(interval) = std::env::var("GUIDEPATH_INTERVAL") {
            if let Ok(secs) = interval.parse::<f64>() {
                self.edge.interval_secs = secs;
            }
        }

        if let Ok(level) = std::env::var("GUIDEPATH_LOG_LEVEL") {
            self.log_level = level;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let vision = &self.vision;
        if vision.frame_width < 2 || vision.frame_height < 2 {
            return Err(ConfigError::ValidationError(
                "vision frame must be at least 2x2".to_string(),
            ));
        }

        if vision.hsv_lower.iter().zip(vision.hsv_upper.iter()).any(|(lo, hi)| lo > hi) {
            return Err(ConfigError::ValidationError(
                "vision.hsv_lower must not exceed vision.hsv_upper".to_string(),
            ));
        }

        if vision.hsv_upper[0] > 179 {
            return Err(ConfigError::ValidationError(
                "hue bound must be on the 0-179 scale".to_string(),
            ));
        }

        if vision.kernel_size == 0 || vision.kernel_size % 2 == 0 {
            return Err(ConfigError::ValidationError(
                "vision.kernel_size must be odd".to_string(),
            ));
        }

        if !(0.0..=100.0).contains(&vision.min_confidence) {
            return Err(ConfigError::ValidationError(
                "vision.min_confidence is a percentage".to_string(),
            ));
        }

        let pattern = &self.pattern;
        if pattern.clahe_tiles == 0 || pattern.clahe_tiles > vision.frame_width.min(vision.frame_height) {
            return Err(ConfigError::ValidationError(
                "pattern.clahe_tiles out of range".to_string(),
            ));
        }

        if pattern.clahe_clip_limit <= 0.0 {
            return Err(ConfigError::ValidationError(
                "pattern.clahe_clip_limit must be positive".to_string(),
            ));
        }

        if pattern.blur_kernel == 0 || pattern.blur_kernel % 2 == 0 {
            return Err(ConfigError::ValidationError(
                "pattern.blur_kernel must be odd".to_string(),
            ));
        }

        if pattern.canny_low < 0.0 || pattern.canny_low > pattern.canny_high {
            return Err(ConfigError::ValidationError(
                "pattern.canny_low must be between 0 and canny_high".to_string(),
            ));
        }

        if pattern.dot_min_size >= pattern.dot_max_size {
            return Err(ConfigError::ValidationError(
                "pattern.dot_min_size must be below dot_max_size".to_string(),
            ));
        }

        if pattern.dot_min_aspect <= 0.0 || pattern.dot_min_aspect >= pattern.dot_max_aspect {
            return Err(ConfigError::ValidationError(
                "pattern aspect window is empty".to_string(),
            ));
        }

        let position = &self.position;
        if position.left_boundary < -1.0
            || position.right_boundary > 1.0
            || position.left_boundary > position.right_boundary
        {
            return Err(ConfigError::ValidationError(
                "position boundaries must be ordered inside [-1, 1]".to_string(),
            ));
        }

        if self.debounce.repeat_threshold == 0 {
            return Err(ConfigError::ValidationError(
                "debounce.repeat_threshold must be > 0".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port cannot be 0".to_string(),
            ));
        }

        let edge = &self.edge;
        if !(edge.interval_secs > 0.0 && edge.interval_secs.is_finite()) {
            return Err(ConfigError::ValidationError(
                "edge.interval_secs must be positive and finite".to_string(),
            ));
        }

        let timeouts = [edge.request_timeout_secs, edge.health_timeout_secs];
        if timeouts.iter().any(|t| !(*t > 0.0 && t.is_finite())) {
            return Err(ConfigError::ValidationError(
                "edge timeouts must be positive and finite".to_string(),
            ));
        }

        if edge.jpeg_quality == 0 || edge.jpeg_quality > 100 {
            return Err(ConfigError::ValidationError(
                "edge.jpeg_quality must be in 1..=100".to_string(),
            ));
        }

        if edge.capture_width == 0 || edge.capture_height == 0 {
            return Err(ConfigError::ValidationError(
                "edge capture resolution must be non-zero".to_string(),
            ));
        }

        if self.speech.rate == 0 || self.speech.rate > 500 {
            return Err(ConfigError::ValidationError(
                "speech.rate must be in 1..=500".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::ParseError(e) => write!(f, "Parse error: {}", e),
            ConfigError::ValidationError(e) => write!(f, "Validation error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}
