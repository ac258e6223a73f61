//! Frame capture for the edge device

use crate::error::VisionError;
use crate::frame::{decode_frame, Frame};
use guidepath_core::config::{CaptureSource, EdgeConfig};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Something the edge loop can pull frames from
pub trait FrameSource: Send {
    /// Grab the next frame; `None` means this cycle has no frame
    fn capture_frame(&mut self) -> Option<Frame>;

    fn name(&self) -> &str;
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Still images from disk, one file or a directory cycled in name order
pub struct StillImageSource {
    name: String,
    files: Vec<PathBuf>,
    next: usize,
}

impl StillImageSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, VisionError> {
        let path = path.as_ref();
        let files = if path.is_dir() {
            let mut files = Vec::new();
            for entry in std::fs::read_dir(path)? {
                let file = entry?.path();
                let is_image = file
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
                    .unwrap_or(false);
                if is_image {
                    files.push(file);
                }
            }
            files.sort();
            files
        } else if path.is_file() {
            vec![path.to_path_buf()]
        } else {
            return Err(VisionError::Camera(format!(
                "Image source {} does not exist",
                path.display()
            )));
        };

        if files.is_empty() {
            return Err(VisionError::Camera(format!(
                "No images found in {}",
                path.display()
            )));
        }

        info!("Still image source with {} file(s) at {}", files.len(), path.display());
        Ok(Self {
            name: format!("images:{}", path.display()),
            files,
            next: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FrameSource for StillImageSource {
    fn capture_frame(&mut self) -> Option<Frame> {
        let file = &self.files[self.next % self.files.len()];
        self.next = (self.next + 1) % self.files.len();

        let bytes = match std::fs::read(file) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Failed to read {}: {}", file.display(), e);
                return None;
            }
        };
        match decode_frame(&bytes) {
            Ok(frame) => Some(frame),
            Err(e) => {
                warn!("Failed to decode {}: {}", file.display(), e);
                None
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(feature = "camera")]
pub use device::DeviceCamera;

#[cfg(feature = "camera")]
mod device {
    use super::FrameSource;
    use crate::error::VisionError;
    use crate::frame::Frame;
    use opencv::{
        core::Mat,
        imgproc,
        prelude::*,
        videoio::{VideoCapture, CAP_ANY, CAP_PROP_FRAME_HEIGHT, CAP_PROP_FRAME_WIDTH},
    };
    use tracing::{info, warn};

    /// USB or built-in camera read through OpenCV
    pub struct DeviceCamera {
        name: String,
        capture: Option<VideoCapture>,
    }

    impl DeviceCamera {
        pub fn open(camera_id: u32, width: u32, height: u32) -> Result<Self, VisionError> {
            let mut capture = VideoCapture::new(camera_id as i32, CAP_ANY)
                .map_err(|e| VisionError::Camera(format!("Failed to open camera {}: {}", camera_id, e)))?;

            if !capture.is_opened()? {
                return Err(VisionError::Camera(format!("Camera {} failed to open", camera_id)));
            }

            capture.set(CAP_PROP_FRAME_WIDTH, width as f64)?;
            capture.set(CAP_PROP_FRAME_HEIGHT, height as f64)?;

            info!("Camera {} initialized at {}x{}", camera_id, width, height);
            Ok(Self {
                name: format!("camera:{}", camera_id),
                capture: Some(capture),
            })
        }

        fn read(&mut self) -> Result<Option<Frame>, VisionError> {
            let Some(capture) = self.capture.as_mut() else {
                return Ok(None);
            };

            let mut bgr = Mat::default();
            if !capture.read(&mut bgr)? || bgr.empty() {
                return Ok(None);
            }

            let mut rgb = Mat::default();
            imgproc::cvt_color(&bgr, &mut rgb, imgproc::COLOR_BGR2RGB, 0)?;

            let size = rgb.size()?;
            let bytes = if rgb.is_continuous() {
                rgb.data_bytes()?.to_vec()
            } else {
                rgb.try_clone()?.data_bytes()?.to_vec()
            };
            Ok(Frame::from_raw(size.width as u32, size.height as u32, bytes))
        }

        pub fn stop(&mut self) {
            if let Some(mut capture) = self.capture.take() {
                if let Err(e) = capture.release() {
                    warn!("Failed to release camera: {}", e);
                }
                info!("Camera released");
            }
        }
    }

    impl FrameSource for DeviceCamera {
        fn capture_frame(&mut self) -> Option<Frame> {
            match self.read() {
                Ok(frame) => frame,
                Err(e) => {
                    warn!("Camera read error: {}", e);
                    None
                }
            }
        }

        fn name(&self) -> &str {
            &self.name
        }
    }

    impl Drop for DeviceCamera {
        fn drop(&mut self) {
            self.stop();
        }
    }
}

/// Open the frame source named by the edge configuration
pub fn open_source(config: &EdgeConfig) -> Result<Box<dyn FrameSource>, VisionError> {
    match &config.source {
        CaptureSource::Images(path) => Ok(Box::new(StillImageSource::open(path)?)),
        #[cfg(feature = "camera")]
        CaptureSource::Camera(id) => Ok(Box::new(DeviceCamera::open(
            *id,
            config.capture_width,
            config.capture_height,
        )?)),
        #[cfg(not(feature = "camera"))]
        CaptureSource::Camera(id) => Err(VisionError::Camera(format!(
            "Camera {} requested but camera support is not compiled in; \
             pass --image <file or directory> or rebuild with --features camera",
            id
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::encode_jpeg;
    use image::{Rgb, RgbImage};

    fn write_jpeg(path: &Path, color: [u8; 3]) {
        let frame = RgbImage::from_pixel(32, 24, Rgb(color));
        std::fs::write(path, encode_jpeg(&frame, 95).unwrap()).unwrap();
    }

    #[test]
    fn test_directory_cycles_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        write_jpeg(&dir.path().join("b.jpg"), [255, 255, 255]);
        write_jpeg(&dir.path().join("a.jpg"), [0, 0, 0]);
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut source = StillImageSource::open(dir.path()).unwrap();
        assert_eq!(source.len(), 2);

        let brightness = |f: Frame| f.get_pixel(16, 12).0[0];
        assert!(brightness(source.capture_frame().unwrap()) < 20);
        assert!(brightness(source.capture_frame().unwrap()) > 235);
        assert!(brightness(source.capture_frame().unwrap()) < 20);
    }

    #[test]
    fn test_single_file_repeats() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("frame.jpg");
        write_jpeg(&file, [255, 220, 0]);

        let mut source = StillImageSource::open(&file).unwrap();
        assert!(source.capture_frame().is_some());
        assert!(source.capture_frame().is_some());
        assert!(source.name().contains("frame.jpg"));
    }

    #[test]
    fn test_empty_or_missing_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(StillImageSource::open(dir.path()).is_err());
        assert!(StillImageSource::open(dir.path().join("nope.jpg")).is_err());
    }

    #[test]
    fn test_unreadable_image_yields_no_frame() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.jpg"), b"not a jpeg").unwrap();
        let mut source = StillImageSource::open(dir.path()).unwrap();
        assert!(source.capture_frame().is_none());
    }

    #[test]
    fn test_open_source_from_config() {
        let dir = tempfile::tempdir().unwrap();
        write_jpeg(&dir.path().join("a.jpg"), [1, 2, 3]);
        let config = EdgeConfig {
            source: CaptureSource::Images(dir.path().to_path_buf()),
            ..EdgeConfig::default()
        };
        let mut source = open_source(&config).unwrap();
        assert!(source.capture_frame().is_some());
    }

    #[cfg(not(feature = "camera"))]
    #[test]
    fn test_default_camera_source_without_support_hints_at_images() {
        let err = match open_source(&EdgeConfig::default()) {
            Ok(_) => panic!("camera source opened without camera support"),
            Err(e) => e,
        };
        assert!(matches!(err, VisionError::Camera(_)));
        assert!(err.to_string().contains("--image"));
    }
}
