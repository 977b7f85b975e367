//! `armkit-types` – shared data model for the manipulation tool layer.
//!
//! Every crate in the workspace speaks these types: 3-D geometry primitives,
//! frame-tagged poses, detection results, motion requests, and the global
//! [`ArmError`] taxonomy.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ─────────────────────────────────────────────────────────────────────────────
// Geometry primitives
// ─────────────────────────────────────────────────────────────────────────────

/// A 3-D point in meters, expressed relative to some reference frame.
///
/// The frame is not carried here; a bare `Point3` only makes sense inside a
/// [`Pose`] or next to an explicit frame name.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The origin.
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

/// A unit quaternion representing a 3-D rotation, (x, y, z, w) convention as
/// used by common robotics message formats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quaternion {
    /// Create a quaternion.  The caller is responsible for providing a unit
    /// quaternion (|q| = 1).
    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    /// The identity rotation.
    pub const fn identity() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    /// Hamilton product: compose two rotations.
    pub fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
        )
    }

    /// Conjugate (== inverse for a unit quaternion).
    pub fn conjugate(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    /// Rotate a point by this quaternion: p' = q * p * q*.
    pub fn rotate(self, p: Point3) -> Point3 {
        let v = Self::new(p.x, p.y, p.z, 0.0);
        let rotated = self.mul(v).mul(self.conjugate());
        Point3::new(rotated.x, rotated.y, rotated.z)
    }
}

/// A position + orientation, tagged with the frame it is expressed in.
///
/// Consumers must check the tag: a manipulator-frame consumer handed a
/// sensor-frame pose is a frame-mixing bug, not something that can be fixed
/// downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Name of the reference frame, e.g. `"panda_link0"` or `"RGBDCamera5"`.
    pub frame: String,
    pub position: Point3,
    pub orientation: Quaternion,
}

impl Pose {
    pub fn new(frame: impl Into<String>, position: Point3, orientation: Quaternion) -> Self {
        Self {
            frame: frame.into(),
            position,
            orientation,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Detection results
// ─────────────────────────────────────────────────────────────────────────────

/// A single detection reported by the external vision service: an object
/// label and the centroid of its point cloud in the sensor frame.
///
/// No orientation or extent is known; the service reports a representative
/// point only, and nothing downstream may pretend otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedObject {
    pub label: String,
    pub position: Point3,
}

// ─────────────────────────────────────────────────────────────────────────────
// Motion requests
// ─────────────────────────────────────────────────────────────────────────────

/// Physical state of the end-effector gripper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GripperState {
    Open,
    Closed,
}

/// The open/closed change the gripper undergoes across one motion: the state
/// it holds while approaching and the state it ends in at the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GripperTransition {
    pub initial_state: GripperState,
    pub final_state: GripperState,
}

/// What the caller intends to do at the target point.
///
/// This is the whole gripper lifecycle in this layer: grab starts open and
/// ends closed around the object, drop starts closed (holding) and ends open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ManipulationTask {
    Grab,
    Drop,
}

impl ManipulationTask {
    /// The gripper transition that realises this task.
    pub fn gripper_transition(self) -> GripperTransition {
        match self {
            ManipulationTask::Grab => GripperTransition {
                initial_state: GripperState::Open,
                final_state: GripperState::Closed,
            },
            ManipulationTask::Drop => GripperTransition {
                initial_state: GripperState::Closed,
                final_state: GripperState::Open,
            },
        }
    }
}

/// A fully-specified motion request, built once and immutable afterwards.
///
/// `target` is the calibrated, clamped pose in the manipulator frame.
/// `requested` preserves the caller's raw coordinates so outcomes can be
/// reported in the numbers the caller actually asked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub target: Pose,
    pub gripper: GripperTransition,
    pub requested: Point3,
}

/// Wire response of the motion-execution service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionResponse {
    pub success: bool,
}

/// Caller-facing outcome of one dispatched motion request.
///
/// Every variant carries the originally requested coordinates for reporting.
/// A `TimedOut` says nothing about the physical arm: the service may still be
/// moving after the client-side deadline, and callers must treat the motion
/// state as unknown rather than stopped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveOutcome {
    Succeeded(Point3),
    Rejected(Point3),
    TimedOut(Point3),
}

impl MoveOutcome {
    /// The originally requested coordinates, regardless of outcome.
    pub fn requested(&self) -> Point3 {
        match self {
            MoveOutcome::Succeeded(p) | MoveOutcome::Rejected(p) | MoveOutcome::TimedOut(p) => *p,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Global error type spanning transform lookups, detection queries, motion
/// service transport, and configuration loading.
///
/// A timeout and an explicit motion rejection are *not* errors: they are
/// [`MoveOutcome`] variants, because the request itself was well-formed and
/// the caller needs to distinguish "robot refused" from "no answer".
#[derive(Error, Debug)]
pub enum ArmError {
    /// No spatial relationship is known between the requested frames at call
    /// time.  Fatal for the current lookup; there is no fallback transform.
    #[error("no transform available from '{source_frame}' to '{target_frame}'")]
    TransformUnavailable {
        source_frame: String,
        target_frame: String,
    },

    /// The external detection service failed to answer the query.
    #[error("detection service error: {0}")]
    Detection(String),

    /// Transport-level failure talking to the motion-execution service.
    #[error("motion service error: {0}")]
    MotionService(String),

    /// Deployment configuration could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),
}
