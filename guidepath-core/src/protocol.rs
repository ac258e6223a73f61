//! Wire protocol between the edge device and the processing node

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{Detection, NavigationCommand};

pub const ANALYZE_PATH: &str = "/analyze";
pub const HEALTH_PATH: &str = "/health";
/// Multipart field and JSON key carrying the encoded frame
pub const IMAGE_FIELD: &str = "image";
pub const HEALTH_RUNNING: &str = "running";

/// JSON alternative to the multipart upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    /// Base64 encoded JPEG
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub detection: Detection,
    pub navigation: NavigationCommand,
}

impl AnalyzeResponse {
    pub fn new(detection: Detection, navigation: NavigationCommand) -> Self {
        Self {
            success: true,
            detection,
            navigation,
        }
    }

    /// Parse a 200 body, rejecting payloads that report failure
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        let response: AnalyzeResponse = serde_json::from_slice(body)?;
        if !response.success {
            return Err(Error::Protocol("server reported failure".to_string()));
        }
        Ok(response)
    }
}

/// Body of 400 and 500 responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FailureResponse {
    pub fn bare() -> Self {
        Self {
            success: false,
            error: None,
        }
    }

    pub fn with_error(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn running() -> Self {
        Self {
            status: HEALTH_RUNNING.to_string(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == HEALTH_RUNNING
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::navigate;
    use crate::types::{Command, Position, SurfaceType};

    #[test]
    fn test_analyze_response_shape() {
        let detection = Detection {
            found: true,
            position: Position::Left,
            surface_type: SurfaceType::Line,
            offset: -0.4,
            confidence: 12.5,
        };
        let response = AnalyzeResponse::new(detection, navigate(&detection));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["detection"]["type"], "line");
        assert_eq!(json["detection"]["offset"], -0.4);
        assert_eq!(json["navigation"]["command"], "left");
        assert_eq!(json["navigation"]["message"], "Stay on left.");
    }

    #[test]
    fn test_from_slice_parses_server_body() {
        let body = br#"{
            "success": true,
            "detection": {"found": false, "position": "unknown", "type": "none", "offset": 0.0, "confidence": 0.0},
            "navigation": {"command": "stop", "message": "Path lost.", "severity": "warning"}
        }"#;
        let response = AnalyzeResponse::from_slice(body).unwrap();
        assert_eq!(response.navigation.command, Command::Stop);
        assert!(!response.detection.found);
    }

    #[test]
    fn test_from_slice_rejects_garbage() {
        assert!(AnalyzeResponse::from_slice(b"{\"success\": false}").is_err());
        assert!(AnalyzeResponse::from_slice(b"not json").is_err());
    }

    #[test]
    fn test_failure_bodies() {
        let bare = serde_json::to_value(FailureResponse::bare()).unwrap();
        assert_eq!(bare, serde_json::json!({"success": false}));
        let with_error = serde_json::to_value(FailureResponse::with_error("No image received")).unwrap();
        assert_eq!(with_error["error"], "No image received");
    }

    #[test]
    fn test_health_running() {
        let json = serde_json::to_string(&HealthResponse::running()).unwrap();
        assert_eq!(json, r#"{"status":"running"}"#);
        let parsed: HealthResponse = serde_json::from_str(&json).unwrap();
        assert!(parsed.is_running());
    }
}
