//! Move-command construction.
//!
//! [`MoveCommandBuilder`] turns a raw target point and a task intent into an
//! immutable [`MoveRequest`].  No I/O happens here: the output is a pure,
//! deterministic function of the inputs and the builder's static
//! [`BuilderConfig`], which makes the whole numeric contract unit-testable.
//!
//! The numeric steps run in a fixed order, and the order is the contract:
//!
//! 1. drop tasks get `additional_height` added to z (release above the
//!    measured point, never exactly at it);
//! 2. per-axis calibration offsets are added;
//! 3. z is clamped to `min_z` last, overriding any prior offset.

use armkit_types::{ManipulationTask, MoveRequest, Point3, Pose, Quaternion};

/// Canonical end-effector approach attitude: gripper pointing straight down,
/// wrist rolled 45° so the fingers clear the camera mast.  Every manipulation
/// pose reuses this constant; orientation is never computed.
pub const APPROACH_ORIENTATION: Quaternion =
    Quaternion::new(0.9238795325112867, -0.3826834323650898, 0.0, 0.0);

/// Static per-deployment parameters of the command builder.
///
/// Passed in at construction rather than read from ambient state, so
/// [`MoveCommandBuilder::build`] stays pure.
#[derive(Debug, Clone, PartialEq)]
pub struct BuilderConfig {
    /// Frame every built request is expressed in.
    pub manipulator_frame: String,
    /// Hard safety floor for the end-effector height [m].
    pub min_z: f64,
    /// Static correction for systematic measurement bias along x [m].
    pub calibration_x: f64,
    /// Static correction for systematic measurement bias along y [m].
    pub calibration_y: f64,
    /// Static correction for systematic measurement bias along z [m].
    pub calibration_z: f64,
    /// Height added above the nominal target for drop tasks [m].
    pub additional_height: f64,
    /// Fixed end-effector orientation applied to every pose.
    pub orientation: Quaternion,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            manipulator_frame: "panda_link0".to_string(),
            min_z: 0.135,
            calibration_x: 0.0,
            calibration_y: 0.0,
            calibration_z: 0.0,
            additional_height: 0.05,
            orientation: APPROACH_ORIENTATION,
        }
    }
}

/// Builds fully-specified motion requests from target points.
#[derive(Debug, Clone)]
pub struct MoveCommandBuilder {
    config: BuilderConfig,
}

impl MoveCommandBuilder {
    pub fn new(config: BuilderConfig) -> Self {
        Self { config }
    }

    /// The builder's static configuration.
    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Build an immutable [`MoveRequest`] for moving the end effector to
    /// `(x, y, z)` with the gripper behaviour implied by `task`.
    ///
    /// The request's target pose is expressed in the configured manipulator
    /// frame; the caller's raw coordinates are preserved in
    /// [`MoveRequest::requested`] for reporting.
    pub fn build(&self, x: f64, y: f64, z: f64, task: ManipulationTask) -> MoveRequest {
        let mut position = Point3::new(x, y, z);

        if task == ManipulationTask::Drop {
            position.z += self.config.additional_height;
        }

        position.x += self.config.calibration_x;
        position.y += self.config.calibration_y;
        position.z += self.config.calibration_z;

        // Safety floor last: nothing may command the effector below min_z.
        position.z = position.z.max(self.config.min_z);

        MoveRequest {
            target: Pose::new(
                self.config.manipulator_frame.clone(),
                position,
                self.config.orientation,
            ),
            gripper: task.gripper_transition(),
            requested: Point3::new(x, y, z),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use armkit_types::GripperState;

    fn builder() -> MoveCommandBuilder {
        MoveCommandBuilder::new(BuilderConfig::default())
    }

    #[test]
    fn grab_is_open_to_closed_with_calibration_only() {
        let b = MoveCommandBuilder::new(BuilderConfig {
            calibration_z: 0.01,
            min_z: 0.0,
            ..BuilderConfig::default()
        });
        let req = b.build(0.4, 0.1, 0.3, ManipulationTask::Grab);
        assert_eq!(req.gripper.initial_state, GripperState::Open);
        assert_eq!(req.gripper.final_state, GripperState::Closed);
        // Grab never gets the drop lift: z offset is calibration_z alone.
        assert!((req.target.position.z - 0.31).abs() < 1e-12);
    }

    #[test]
    fn drop_adds_height_then_calibration_then_clamps() {
        let b = MoveCommandBuilder::new(BuilderConfig {
            additional_height: 0.05,
            calibration_z: 0.0,
            ..BuilderConfig::default()
        });
        let req = b.build(0.4, 0.1, 0.2, ManipulationTask::Drop);
        // max(0.2 + 0.05 + 0.0, 0.135) = 0.25, above the floor, no clamp.
        assert!((req.target.position.z - 0.25).abs() < 1e-12);
        assert_eq!(req.gripper.initial_state, GripperState::Closed);
        assert_eq!(req.gripper.final_state, GripperState::Open);
    }

    #[test]
    fn grab_near_table_clamps_to_min_z() {
        // (1.0, 0.5, 0.02) with calibration_z = 0 must clamp to 0.135.
        let req = builder().build(1.0, 0.5, 0.02, ManipulationTask::Grab);
        assert!((req.target.position.z - 0.135).abs() < 1e-12);
        assert_eq!(req.gripper.initial_state, GripperState::Open);
        assert_eq!(req.gripper.final_state, GripperState::Closed);
    }

    #[test]
    fn clamp_overrides_negative_calibration() {
        let b = MoveCommandBuilder::new(BuilderConfig {
            calibration_z: -0.5,
            ..BuilderConfig::default()
        });
        let req = b.build(0.4, 0.0, 0.3, ManipulationTask::Grab);
        // 0.3 - 0.5 = -0.2, floored to min_z.
        assert!((req.target.position.z - 0.135).abs() < 1e-12);
    }

    #[test]
    fn clamp_is_idempotent() {
        let b = builder();
        let once = b.build(0.4, 0.1, 0.02, ManipulationTask::Grab);
        let z = once.target.position.z;
        // Feeding the clamped height back through yields the same height.
        let twice = b.build(0.4, 0.1, z, ManipulationTask::Grab);
        assert_eq!(twice.target.position.z, z);
    }

    #[test]
    fn calibration_applies_to_all_axes() {
        let b = MoveCommandBuilder::new(BuilderConfig {
            calibration_x: 0.01,
            calibration_y: -0.02,
            calibration_z: 0.03,
            min_z: 0.0,
            ..BuilderConfig::default()
        });
        let req = b.build(1.0, 1.0, 1.0, ManipulationTask::Grab);
        assert!((req.target.position.x - 1.01).abs() < 1e-12);
        assert!((req.target.position.y - 0.98).abs() < 1e-12);
        assert!((req.target.position.z - 1.03).abs() < 1e-12);
    }

    #[test]
    fn build_is_deterministic() {
        let b = builder();
        let a = b.build(0.7, -0.2, 0.4, ManipulationTask::Drop);
        let c = b.build(0.7, -0.2, 0.4, ManipulationTask::Drop);
        assert_eq!(a, c);
    }

    #[test]
    fn request_preserves_raw_coordinates_and_frame() {
        let b = MoveCommandBuilder::new(BuilderConfig {
            calibration_x: 0.05,
            ..BuilderConfig::default()
        });
        let req = b.build(1.0, 0.5, 0.02, ManipulationTask::Grab);
        // requested keeps the caller's numbers, untouched by calibration.
        assert_eq!(req.requested, Point3::new(1.0, 0.5, 0.02));
        assert_eq!(req.target.frame, "panda_link0");
        assert_eq!(req.target.orientation, APPROACH_ORIENTATION);
    }
}
