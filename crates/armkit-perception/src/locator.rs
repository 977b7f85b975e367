//! Object localisation: detection-service query + frame transform.
//!
//! [`ObjectLocator`] asks an external vision service where the objects of a
//! given type are (centroids in the sensor frame) and maps every hit into
//! the manipulator frame via a freshly resolved transform.
//!
//! The vision service is a black box behind the [`ObjectDetector`] trait; it
//! reports centroid positions only.  Object size or extent is never
//! estimated here, and callers must present results accordingly.

use std::sync::Arc;

use armkit_types::{ArmError, DetectedObject, Pose, Quaternion};
use async_trait::async_trait;
use tracing::debug;

use crate::transform::TransformSource;

// ─────────────────────────────────────────────────────────────────────────────
// Detection seam
// ─────────────────────────────────────────────────────────────────────────────

/// One query to the external detection service: the object class to look for
/// and the sensor topics to read.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionQuery {
    pub object_name: String,
    pub camera_topic: String,
    pub depth_topic: String,
    pub camera_info_topic: String,
}

/// Seam for the external object-detection service.
///
/// Implementations run open-set detection on an RGB image, look up depth at
/// the detected pixels, and return one sensor-frame centroid per instance.
/// Zero results is a normal answer, not an error.
#[async_trait]
pub trait ObjectDetector: Send + Sync {
    /// Detect all instances of `query.object_name` on the given sensor
    /// topics.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::Detection`] if the service cannot be reached or
    /// rejects the query.
    async fn detect(&self, query: &DetectionQuery) -> Result<Vec<DetectedObject>, ArmError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// ObjectLocator
// ─────────────────────────────────────────────────────────────────────────────

/// Static wiring for one camera rig: which frames to map between and which
/// sensor topics the detector should read.
#[derive(Debug, Clone, PartialEq)]
pub struct LocatorConfig {
    /// Frame the detection service reports in.
    pub source_frame: String,
    /// Frame the motion layer consumes, usually the manipulator base.
    pub target_frame: String,
    pub camera_topic: String,
    pub depth_topic: String,
    pub camera_info_topic: String,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            source_frame: "RGBDCamera5".to_string(),
            target_frame: "panda_link0".to_string(),
            camera_topic: "/color_image5".to_string(),
            depth_topic: "/depth_image5".to_string(),
            camera_info_topic: "/color_camera_info5".to_string(),
        }
    }
}

/// Maps detected object centroids into the manipulator frame.
///
/// Each [`locate`][Self::locate] call is self-contained: it resolves the
/// sensor→manipulator transform fresh, queries the detector once, and holds
/// no state between invocations.  Calling twice performs two independent
/// lookups.
pub struct ObjectLocator {
    transforms: Arc<dyn TransformSource>,
    detector: Arc<dyn ObjectDetector>,
    config: LocatorConfig,
}

impl ObjectLocator {
    pub fn new(
        transforms: Arc<dyn TransformSource>,
        detector: Arc<dyn ObjectDetector>,
        config: LocatorConfig,
    ) -> Self {
        Self {
            transforms,
            detector,
            config,
        }
    }

    /// Locate all instances of `object_name` and return their poses in the
    /// target frame, in detection order.
    ///
    /// An empty vector means "nothing detected" and is a success; callers
    /// must render it as a distinct none-found outcome.  Detections carry no
    /// orientation, so the returned poses hold an identity quaternion that
    /// asserts nothing about how the object is oriented.
    ///
    /// # Errors
    ///
    /// * [`ArmError::TransformUnavailable`] if the frame pair cannot be
    ///   resolved.  Surfaced before the detector is queried; no retry.
    /// * [`ArmError::Detection`] if the detection service fails.
    pub async fn locate(&self, object_name: &str) -> Result<Vec<Pose>, ArmError> {
        let tf = self
            .transforms
            .resolve(&self.config.source_frame, &self.config.target_frame)?;

        let query = DetectionQuery {
            object_name: object_name.to_string(),
            camera_topic: self.config.camera_topic.clone(),
            depth_topic: self.config.depth_topic.clone(),
            camera_info_topic: self.config.camera_info_topic.clone(),
        };
        let detections = self.detector.detect(&query).await?;
        debug!(
            object_name,
            count = detections.len(),
            source_frame = %self.config.source_frame,
            target_frame = %self.config.target_frame,
            "mapping detections into target frame"
        );

        Ok(detections
            .iter()
            .map(|d: &DetectedObject| {
                let sensor_pose = Pose::new(
                    self.config.source_frame.clone(),
                    d.position,
                    Quaternion::identity(),
                );
                tf.apply_pose(&sensor_pose)
            })
            .collect())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
