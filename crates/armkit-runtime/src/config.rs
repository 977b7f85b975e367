//! Deployment configuration – reads/writes `~/.armkit/config.toml`.
//!
//! One file per deployment describes the rig: frame names, the camera topics
//! the detection service reads, the calibration offsets measured for this
//! installation, and the motion deadline.  Everything has a default matching
//! the reference panda-arm rig, so an empty file is a valid deployment.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use armkit_motion::command::BuilderConfig;
use armkit_motion::dispatch::DEFAULT_MOTION_DEADLINE;
use armkit_perception::locator::LocatorConfig;
use armkit_types::ArmError;
use serde::{Deserialize, Serialize};

/// Persisted deployment configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmConfig {
    /// Frame motion commands are expressed in (manipulator base).
    #[serde(default = "default_manipulator_frame")]
    pub manipulator_frame: String,

    /// Frame the detection service reports in.
    #[serde(default = "default_camera_frame")]
    pub camera_frame: String,

    /// RGB camera topic for the detection service.
    #[serde(default = "default_camera_topic")]
    pub camera_topic: String,

    /// Depth camera topic for the detection service.
    #[serde(default = "default_depth_topic")]
    pub depth_topic: String,

    /// RGB camera-info topic for the detection service.
    #[serde(default = "default_camera_info_topic")]
    pub camera_info_topic: String,

    /// Minimum safe end-effector height [m].
    #[serde(default = "default_min_z")]
    pub min_z: f64,

    /// Calibration x offset [m].
    #[serde(default)]
    pub calibration_x: f64,

    /// Calibration y offset [m].
    #[serde(default)]
    pub calibration_y: f64,

    /// Calibration z offset [m].
    #[serde(default)]
    pub calibration_z: f64,

    /// Additional height above the target for drop tasks [m].
    #[serde(default = "default_additional_height")]
    pub additional_height: f64,

    /// How long to wait for the motion service before giving up [s].
    #[serde(default = "default_motion_deadline_secs")]
    pub motion_deadline_secs: f64,
}

fn default_manipulator_frame() -> String {
    "panda_link0".to_string()
}
fn default_camera_frame() -> String {
    "RGBDCamera5".to_string()
}
fn default_camera_topic() -> String {
    "/color_image5".to_string()
}
fn default_depth_topic() -> String {
    "/depth_image5".to_string()
}
fn default_camera_info_topic() -> String {
    "/color_camera_info5".to_string()
}
fn default_min_z() -> f64 {
    0.135
}
fn default_additional_height() -> f64 {
    0.05
}
fn default_motion_deadline_secs() -> f64 {
    5.0
}

impl Default for ArmConfig {
    fn default() -> Self {
        Self {
            manipulator_frame: default_manipulator_frame(),
            camera_frame: default_camera_frame(),
            camera_topic: default_camera_topic(),
            depth_topic: default_depth_topic(),
            camera_info_topic: default_camera_info_topic(),
            min_z: default_min_z(),
            calibration_x: 0.0,
            calibration_y: 0.0,
            calibration_z: 0.0,
            additional_height: default_additional_height(),
            motion_deadline_secs: default_motion_deadline_secs(),
        }
    }
}

impl ArmConfig {
    /// The builder parameters this deployment implies.
    pub fn builder_config(&self) -> BuilderConfig {
        BuilderConfig {
            manipulator_frame: self.manipulator_frame.clone(),
            min_z: self.min_z,
            calibration_x: self.calibration_x,
            calibration_y: self.calibration_y,
            calibration_z: self.calibration_z,
            additional_height: self.additional_height,
            ..BuilderConfig::default()
        }
    }

    /// The locator wiring this deployment implies.
    pub fn locator_config(&self) -> LocatorConfig {
        LocatorConfig {
            source_frame: self.camera_frame.clone(),
            target_frame: self.manipulator_frame.clone(),
            camera_topic: self.camera_topic.clone(),
            depth_topic: self.depth_topic.clone(),
            camera_info_topic: self.camera_info_topic.clone(),
        }
    }

    /// The motion-service deadline as a [`Duration`].
    ///
    /// A non-finite or non-positive `motion_deadline_secs` (rejected by
    /// [`load_from`] but reachable through direct construction) falls back
    /// to the default deadline instead of panicking in
    /// `Duration::from_secs_f64`.
    pub fn motion_deadline(&self) -> Duration {
        if self.motion_deadline_secs.is_finite() && self.motion_deadline_secs > 0.0 {
            Duration::from_secs_f64(self.motion_deadline_secs)
        } else {
            DEFAULT_MOTION_DEADLINE
        }
    }
}

/// Return the path to `~/.armkit/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
/// Extracted for testability without mutating environment variables.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".armkit").join("config.toml")
}

/// Load the config from disk.  Returns `None` if the file does not exist.
pub fn load() -> Result<Option<ArmConfig>, ArmError> {
    load_from(&config_path())
}

/// Load the config from a specific path.
pub(crate) fn load_from(path: &PathBuf) -> Result<Option<ArmConfig>, ArmError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|e| {
        ArmError::Config(format!("failed to read config at {}: {}", path.display(), e))
    })?;
    let mut cfg: ArmConfig = toml::from_str(&raw)
        .map_err(|e| ArmError::Config(format!("failed to parse config: {}", e)))?;
    apply_env_overrides(&mut cfg);
    if !(cfg.motion_deadline_secs.is_finite() && cfg.motion_deadline_secs > 0.0) {
        return Err(ArmError::Config(format!(
            "motion_deadline_secs must be a positive number, got {}",
            cfg.motion_deadline_secs
        )));
    }
    Ok(Some(cfg))
}

/// Apply `ARMKIT_*` environment variable overrides to `cfg`.
///
/// Supported variables:
///
/// | Variable | Config field |
/// |---|---|
/// | `ARMKIT_MANIPULATOR_FRAME` | `manipulator_frame` |
/// | `ARMKIT_CAMERA_FRAME` | `camera_frame` |
/// | `ARMKIT_MIN_Z` | `min_z` |
/// | `ARMKIT_CALIBRATION_X` | `calibration_x` |
/// | `ARMKIT_CALIBRATION_Y` | `calibration_y` |
/// | `ARMKIT_CALIBRATION_Z` | `calibration_z` |
/// | `ARMKIT_MOTION_DEADLINE_SECS` | `motion_deadline_secs` |
///
/// Values that fail to parse are ignored; a deadline override must also be
/// finite and positive, since the deadline is handed to the dispatcher as a
/// `Duration`.
pub fn apply_env_overrides(cfg: &mut ArmConfig) {
    if let Ok(v) = std::env::var("ARMKIT_MANIPULATOR_FRAME") {
        cfg.manipulator_frame = v;
    }
    if let Ok(v) = std::env::var("ARMKIT_CAMERA_FRAME") {
        cfg.camera_frame = v;
    }
    if let Ok(v) = std::env::var("ARMKIT_MIN_Z")
        && let Ok(z) = v.parse::<f64>() {
            cfg.min_z = z;
        }
    if let Ok(v) = std::env::var("ARMKIT_CALIBRATION_X")
        && let Ok(x) = v.parse::<f64>() {
            cfg.calibration_x = x;
        }
    if let Ok(v) = std::env::var("ARMKIT_CALIBRATION_Y")
        && let Ok(y) = v.parse::<f64>() {
            cfg.calibration_y = y;
        }
    if let Ok(v) = std::env::var("ARMKIT_CALIBRATION_Z")
        && let Ok(z) = v.parse::<f64>() {
            cfg.calibration_z = z;
        }
    if let Ok(v) = std::env::var("ARMKIT_MOTION_DEADLINE_SECS")
        && let Ok(secs) = v.parse::<f64>()
        && secs.is_finite()
        && secs > 0.0 {
            cfg.motion_deadline_secs = secs;
        }
}

/// Save the config to disk, creating `~/.armkit/` if necessary.
pub fn save(cfg: &ArmConfig) -> Result<(), ArmError> {
    save_to(cfg, &config_path())
}

/// Save the config to a specific path.
pub(crate) fn save_to(cfg: &ArmConfig, path: &PathBuf) -> Result<(), ArmError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| ArmError::Config(format!("failed to create config directory: {}", e)))?;
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| ArmError::Config(format!("failed to serialize config: {}", e)))?;
    fs::write(path, raw).map_err(|e| {
        ArmError::Config(format!("failed to write config at {}: {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        let cfg = ArmConfig::default();
        save_to(&cfg, &path).expect("save");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded, cfg);
        assert_eq!(loaded.manipulator_frame, "panda_link0");
        assert!((loaded.min_z - 0.135).abs() < 1e-12);
        assert!((loaded.motion_deadline_secs - 5.0).abs() < 1e-12);
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        assert!(load_from(&path).expect("no error").is_none());
    }

    #[test]
    fn empty_file_is_a_valid_deployment() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "").unwrap();

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded, ArmConfig::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "calibration_z = 0.01\nmin_z = 0.2\n").unwrap();

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert!((loaded.calibration_z - 0.01).abs() < 1e-12);
        assert!((loaded.min_z - 0.2).abs() < 1e-12);
        assert_eq!(loaded.camera_frame, "RGBDCamera5");
    }

    #[test]
    fn config_path_points_to_armkit_dir() {
        let p = config_path_for_home("/home/testuser");
        assert!(p.to_string_lossy().contains(".armkit"));
        assert!(p.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn builder_config_carries_deployment_values() {
        let cfg = ArmConfig {
            manipulator_frame: "ur5_base".to_string(),
            min_z: 0.2,
            calibration_x: 0.01,
            ..ArmConfig::default()
        };
        let bc = cfg.builder_config();
        assert_eq!(bc.manipulator_frame, "ur5_base");
        assert!((bc.min_z - 0.2).abs() < 1e-12);
        assert!((bc.calibration_x - 0.01).abs() < 1e-12);
    }

    #[test]
    fn locator_config_maps_camera_to_manipulator() {
        let cfg = ArmConfig::default();
        let lc = cfg.locator_config();
        assert_eq!(lc.source_frame, "RGBDCamera5");
        assert_eq!(lc.target_frame, "panda_link0");
        assert_eq!(lc.depth_topic, "/depth_image5");
    }

    #[test]
    fn motion_deadline_converts_seconds() {
        let cfg = ArmConfig {
            motion_deadline_secs: 2.5,
            ..ArmConfig::default()
        };
        assert_eq!(cfg.motion_deadline(), Duration::from_millis(2500));
    }

    #[test]
    fn apply_env_overrides_changes_manipulator_frame() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("ARMKIT_MANIPULATOR_FRAME", "ur5_base") };
        let mut cfg = ArmConfig::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.manipulator_frame, "ur5_base");
        unsafe { std::env::remove_var("ARMKIT_MANIPULATOR_FRAME") };
    }

    #[test]
    fn apply_env_overrides_changes_min_z() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("ARMKIT_MIN_Z", "0.25") };
        let mut cfg = ArmConfig::default();
        apply_env_overrides(&mut cfg);
        assert!((cfg.min_z - 0.25).abs() < 1e-12);
        unsafe { std::env::remove_var("ARMKIT_MIN_Z") };
    }

    #[test]
    fn motion_deadline_falls_back_on_negative_value() {
        let cfg = ArmConfig {
            motion_deadline_secs: -1.0,
            ..ArmConfig::default()
        };
        // Must not panic in Duration::from_secs_f64.
        assert_eq!(cfg.motion_deadline(), Duration::from_secs(5));
    }

    #[test]
    fn motion_deadline_falls_back_on_nan() {
        let cfg = ArmConfig {
            motion_deadline_secs: f64::NAN,
            ..ArmConfig::default()
        };
        assert_eq!(cfg.motion_deadline(), Duration::from_secs(5));
    }

    #[test]
    fn load_from_rejects_negative_deadline() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "motion_deadline_secs = -1.0\n").unwrap();

        let err = load_from(&path).unwrap_err();
        assert!(
            matches!(&err, ArmError::Config(msg) if msg.contains("motion_deadline_secs")),
            "expected Config error naming the field, got: {err:?}"
        );
    }

    #[test]
    fn apply_env_overrides_changes_calibration_offsets() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe {
            std::env::set_var("ARMKIT_CALIBRATION_X", "0.01");
            std::env::set_var("ARMKIT_CALIBRATION_Y", "-0.02");
            std::env::set_var("ARMKIT_CALIBRATION_Z", "0.03");
        }
        let mut cfg = ArmConfig::default();
        apply_env_overrides(&mut cfg);
        assert!((cfg.calibration_x - 0.01).abs() < 1e-12);
        assert!((cfg.calibration_y - (-0.02)).abs() < 1e-12);
        assert!((cfg.calibration_z - 0.03).abs() < 1e-12);
        unsafe {
            std::env::remove_var("ARMKIT_CALIBRATION_X");
            std::env::remove_var("ARMKIT_CALIBRATION_Y");
            std::env::remove_var("ARMKIT_CALIBRATION_Z");
        }
    }

    #[test]
    fn apply_env_overrides_ignores_negative_deadline() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("ARMKIT_MOTION_DEADLINE_SECS", "-1") };
        let mut cfg = ArmConfig::default();
        apply_env_overrides(&mut cfg);
        assert!((cfg.motion_deadline_secs - 5.0).abs() < 1e-12);
        unsafe { std::env::remove_var("ARMKIT_MOTION_DEADLINE_SECS") };
    }

    #[test]
    fn apply_env_overrides_ignores_invalid_min_z() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("ARMKIT_MIN_Z", "not-a-number") };
        let mut cfg = ArmConfig::default();
        apply_env_overrides(&mut cfg);
        assert!((cfg.min_z - 0.135).abs() < 1e-12);
        unsafe { std::env::remove_var("ARMKIT_MIN_Z") };
    }
}
