//! Agent-facing manipulation tools.
//!
//! The external tool-calling agent knows nothing about poses or outcomes; it
//! sees two named tools with JSON-schema'd arguments and gets back plain
//! strings it forwards verbatim to the user.  Every failure is translated
//! into a string here, never raised across the boundary.
//!
//! The result phrasings are a contract: the agent layer parses and relays
//! them as-is, so changing a single word changes the observable behaviour of
//! the whole system.

use armkit_motion::command::MoveCommandBuilder;
use armkit_motion::dispatch::MotionDispatcher;
use armkit_perception::locator::ObjectLocator;
use armkit_types::{ManipulationTask, MoveOutcome, Point3, Pose};
use schemars::{schema::RootSchema, schema_for, JsonSchema};
use serde::Deserialize;
use tracing::warn;

// ─────────────────────────────────────────────────────────────────────────────
// get_object_positions
// ─────────────────────────────────────────────────────────────────────────────

/// Arguments of the `get_object_positions` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ObjectPositionsArgs {
    /// The name of the object to get the positions of.
    pub object_name: String,
}

/// Reports where all objects of a given type are, in the manipulator frame.
pub struct ObjectPositionsTool {
    locator: ObjectLocator,
}

impl ObjectPositionsTool {
    pub fn new(locator: ObjectLocator) -> Self {
        Self { locator }
    }

    pub const fn name() -> &'static str {
        "get_object_positions"
    }

    pub const fn description() -> &'static str {
        "Retrieve the positions of all objects of a specified type in the target frame. \
         This tool provides accurate positional data but does not distinguish between \
         different colors of the same object type. While position detection is reliable, \
         please note that object classification may occasionally be inaccurate."
    }

    /// JSON schema of [`ObjectPositionsArgs`] for the agent layer.
    pub fn args_schema() -> RootSchema {
        schema_for!(ObjectPositionsArgs)
    }

    /// Run the tool and render the result string.
    ///
    /// Zero detections is a distinct "none found" answer, not an error; the
    /// success string explicitly flags that only centroid positions are
    /// known, since the detection service never reports object extent.
    pub async fn run(&self, args: &ObjectPositionsArgs) -> String {
        match self.locator.locate(&args.object_name).await {
            Ok(poses) if poses.is_empty() => format!("No {}s detected.", args.object_name),
            Ok(poses) => format!(
                "Centroids of detected {}s in manipulator frame: [{}]. Sizes of the detected objects are unknown.",
                args.object_name,
                poses.iter().map(format_pose).collect::<Vec<_>>().join(", "),
            ),
            Err(e) => {
                warn!(object_name = %args.object_name, error = %e, "object localisation failed");
                format!("Failed to get positions of {}s: {}", args.object_name, e)
            }
        }
    }
}

fn format_pose(pose: &Pose) -> String {
    format!(
        "Centroid(x={:.2}, y={:.2}, z={:.2})",
        pose.position.x, pose.position.y, pose.position.z
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// move_to_point
// ─────────────────────────────────────────────────────────────────────────────

/// Arguments of the `move_to_point` tool.
#[derive(Debug, Clone, Copy, Deserialize, JsonSchema)]
pub struct MoveToPointArgs {
    /// The x coordinate of the point to move to.
    pub x: f64,
    /// The y coordinate of the point to move to.
    pub y: f64,
    /// The z coordinate of the point to move to.
    pub z: f64,
    /// Use 'grab' to pick up an object, or 'drop' to release it.  This
    /// determines the gripper's behavior during the movement.
    pub task: ManipulationTask,
}

/// Guides the end effector to a point, with grab/drop gripper sequencing.
///
/// Callers must issue at most one motion at a time; the dispatcher below
/// does not queue requests.
pub struct MoveToPointTool {
    builder: MoveCommandBuilder,
    dispatcher: MotionDispatcher,
}

impl MoveToPointTool {
    pub fn new(builder: MoveCommandBuilder, dispatcher: MotionDispatcher) -> Self {
        Self { builder, dispatcher }
    }

    pub const fn name() -> &'static str {
        "move_to_point"
    }

    pub const fn description() -> &'static str {
        "Guide the robot's end effector to a specific point within the manipulator's \
         operational space. This tool ensures precise movement to the desired location. \
         While it confirms successful positioning, please note that it doesn't provide \
         feedback on the success of grabbing or releasing objects. Use additional sensors \
         or tools for that information."
    }

    /// JSON schema of [`MoveToPointArgs`] for the agent layer.
    pub fn args_schema() -> RootSchema {
        schema_for!(MoveToPointArgs)
    }

    /// Build the motion request, dispatch it, and render the result string.
    ///
    /// All three result strings report the caller's raw coordinates, not the
    /// calibrated ones.  A transport failure renders the same string as a
    /// timeout: from the caller's side both mean "no usable answer from the
    /// service".
    pub async fn run(&self, args: &MoveToPointArgs) -> String {
        let request = self.builder.build(args.x, args.y, args.z, args.task);
        match self.dispatcher.dispatch(&request).await {
            Ok(MoveOutcome::Succeeded(p)) => format!(
                "End effector successfully positioned at coordinates ({:.2}, {:.2}, {:.2}). \
                 Note: The status of object interaction (grab/drop) is not confirmed by this movement.",
                p.x, p.y, p.z,
            ),
            Ok(MoveOutcome::Rejected(p)) => format!(
                "Failed to position end effector at coordinates ({:.2}, {:.2}, {:.2}).",
                p.x, p.y, p.z,
            ),
            Ok(MoveOutcome::TimedOut(p)) => service_call_failed(p),
            Err(e) => {
                warn!(error = %e, "motion service transport failure");
                service_call_failed(request.requested)
            }
        }
    }
}

fn service_call_failed(p: Point3) -> String {
    format!(
        "Service call failed for point ({:.2}, {:.2}, {:.2}).",
        p.x, p.y, p.z
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
