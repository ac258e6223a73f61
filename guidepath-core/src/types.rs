//! Per-frame data model shared by the processing node and the edge device

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lateral position of the path relative to the walker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Left,
    Center,
    Right,
    /// No path in view
    Unknown,
}

impl Position {
    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Left => "left",
            Position::Center => "center",
            Position::Right => "right",
            Position::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Surface pattern of the tactile strip under the camera
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceType {
    /// Continuous guiding line
    Line,
    /// Dotted warning marker placed at intersections
    Dots,
    None,
}

impl SurfaceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SurfaceType::Line => "line",
            SurfaceType::Dots => "dots",
            SurfaceType::None => "none",
        }
    }
}

impl fmt::Display for SurfaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of analysing one frame.
///
/// `offset` and `confidence` carry meaning only when `found` is true; a
/// lost path always reports `Unknown`, `None` and zeros.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub found: bool,
    pub position: Position,
    #[serde(rename = "type")]
    pub surface_type: SurfaceType,
    /// Normalized centroid offset, negative to the left
    pub offset: f64,
    /// Share of path-colored pixels in percent
    pub confidence: f64,
}

impl Detection {
    /// Detection for a frame without enough path pixels
    pub fn lost() -> Self {
        Self {
            found: false,
            position: Position::Unknown,
            surface_type: SurfaceType::None,
            offset: 0.0,
            confidence: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    Straight,
    Left,
    Right,
    Intersection,
    Stop,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Straight => "straight",
            Command::Left => "left",
            Command::Right => "right",
            Command::Intersection => "intersection",
            Command::Stop => "stop",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Alert,
    Warning,
}

/// Instruction derived from a detection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationCommand {
    pub command: Command,
    pub message: String,
    pub severity: Severity,
}

impl NavigationCommand {
    pub fn new(command: Command, message: &str, severity: Severity) -> Self {
        Self {
            command,
            message: message.to_string(),
            severity,
        }
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lost_detection_invariants() {
        let lost = Detection::lost();
        assert!(!lost.found);
        assert_eq!(lost.position, Position::Unknown);
        assert_eq!(lost.surface_type, SurfaceType::None);
        assert_eq!(lost.offset, 0.0);
        assert_eq!(lost.confidence, 0.0);
    }

    #[test]
    fn test_detection_wire_names() {
        let detection = Detection {
            found: true,
            position: Position::Center,
            surface_type: SurfaceType::Line,
            offset: 0.0,
            confidence: 37.5,
        };
        let json = serde_json::to_value(detection).unwrap();
        assert_eq!(json["type"], "line");
        assert_eq!(json["position"], "center");
        assert_eq!(json["found"], true);
        assert!(json.get("surface_type").is_none());
    }

    #[test]
    fn test_command_wire_names() {
        let cmd = NavigationCommand::new(Command::Intersection, "Intersection detected.", Severity::Alert);
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["command"], "intersection");
        assert_eq!(json["severity"], "alert");
        assert_eq!(json["message"], "Intersection detected.");
    }

    #[test]
    fn test_display_matches_wire() {
        assert_eq!(Position::Right.to_string(), "right");
        assert_eq!(SurfaceType::Dots.to_string(), "dots");
        assert_eq!(Command::Stop.to_string(), "stop");
    }
}
