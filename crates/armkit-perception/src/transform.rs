//! Reference-frame graph and rigid-transform resolution.
//!
//! Maintains a directed graph of named reference frames and the 3-D rigid
//! transforms (translation + quaternion rotation) that relate them.  Given
//! two frame names the graph composes a chain of transforms via BFS and
//! returns the combined [`StampedTransform`].
//!
//! Registering an edge also registers its exact inverse, so a rig described
//! parent→child (e.g. `"panda_link0"` → `"RGBDCamera5"`) resolves in either
//! direction.
//!
//! Every lookup is a fresh point-in-time query: nothing is cached across
//! calls and a failed lookup has no fallback.
//!
//! # Example
//!
//! ```rust
//! use armkit_perception::transform::{FrameGraph, TransformSource};
//! use armkit_types::{Point3, Quaternion};
//!
//! let mut graph = FrameGraph::new();
//!
//! // Camera mounted 1 m above the manipulator base, same orientation.
//! graph.set_transform(
//!     "panda_link0",
//!     "RGBDCamera5",
//!     Point3::new(0.0, 0.0, 1.0),
//!     Quaternion::identity(),
//! );
//!
//! let tf = graph.resolve("RGBDCamera5", "panda_link0").unwrap();
//! let p = tf.apply(Point3::new(0.2, 0.0, 0.0));
//! assert!((p.z - 1.0).abs() < 1e-9);
//! ```

use std::collections::{HashMap, HashSet, VecDeque};

use armkit_types::{ArmError, Point3, Pose, Quaternion};
use chrono::{DateTime, Utc};
use tracing::debug;

// ─────────────────────────────────────────────────────────────────────────────
// StampedTransform
// ─────────────────────────────────────────────────────────────────────────────

/// A rigid transform that maps coordinates expressed in `source_frame` into
/// `target_frame`: `p_target = R · p_source + t`.
///
/// Carries the frame pair it is valid for and the timestamp of the oldest
/// link in the chain it was composed from.  Consumed immediately after
/// resolution; never held across calls.
#[derive(Debug, Clone, PartialEq)]
pub struct StampedTransform {
    pub source_frame: String,
    pub target_frame: String,
    pub translation: Point3,
    pub rotation: Quaternion,
    pub stamp: DateTime<Utc>,
}

impl StampedTransform {
    /// The identity transform on a single frame.
    pub fn identity(frame: impl Into<String>) -> Self {
        let frame = frame.into();
        Self {
            source_frame: frame.clone(),
            target_frame: frame,
            translation: Point3::zero(),
            rotation: Quaternion::identity(),
            stamp: Utc::now(),
        }
    }

    /// Map a source-frame point into the target frame: `R · p + t`.
    pub fn apply(&self, p: Point3) -> Point3 {
        self.rotation.rotate(p).add(self.translation)
    }

    /// Map a source-frame pose into the target frame.
    ///
    /// The position is transformed; the orientation is carried through
    /// unchanged.  Detections come with no asserted orientation, so rotating
    /// a placeholder identity quaternion would manufacture information the
    /// sensor never provided.
    pub fn apply_pose(&self, pose: &Pose) -> Pose {
        Pose::new(
            self.target_frame.clone(),
            self.apply(pose.position),
            pose.orientation,
        )
    }

    /// The inverse transform, mapping target-frame points back into the
    /// source frame.
    pub fn inverse(&self) -> Self {
        let rotation = self.rotation.conjugate();
        let t = rotation.rotate(self.translation);
        Self {
            source_frame: self.target_frame.clone(),
            target_frame: self.source_frame.clone(),
            translation: Point3::new(-t.x, -t.y, -t.z),
            rotation,
            stamp: self.stamp,
        }
    }

    /// Chain two transforms: `self` maps B→A, `other` maps C→B, the result
    /// maps C→A.
    ///
    /// The composed stamp is the older of the two, since staleness is
    /// dominated by the oldest link in the chain.
    ///
    /// # Precondition
    ///
    /// The chain must be continuous: `self.source_frame` and
    /// `other.target_frame` must name the same frame.  Composing mismatched
    /// transforms is a caller error — the frame algebra has no meaning
    /// across a gap — and is caught by a debug assertion only; release
    /// builds return a result tagged with frames it does not actually map
    /// between.
    pub fn compose(&self, other: &Self) -> Self {
        debug_assert_eq!(self.source_frame, other.target_frame);
        Self {
            source_frame: other.source_frame.clone(),
            target_frame: self.target_frame.clone(),
            translation: self.translation.add(self.rotation.rotate(other.translation)),
            rotation: self.rotation.mul(other.rotation),
            stamp: self.stamp.min(other.stamp),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// TransformSource
// ─────────────────────────────────────────────────────────────────────────────

/// Resolves the rigid transform between two named frames.
///
/// This is the seam between the locator and whatever owns the frame tree:
/// the in-process [`FrameGraph`] in tests and simple rigs, or a bridge to an
/// external TF service in a full deployment.
///
/// # Contract
///
/// A pure query.  Each call performs a fresh lookup; implementations must not
/// cache results across calls, retry internally, or substitute a fallback
/// transform on failure.
pub trait TransformSource: Send + Sync {
    /// Compute the transform mapping `source_frame` points into
    /// `target_frame`.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::TransformUnavailable`] if no path between the
    /// frames is known at call time.
    fn resolve(
        &self,
        source_frame: &str,
        target_frame: &str,
    ) -> Result<StampedTransform, ArmError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// FrameGraph
// ─────────────────────────────────────────────────────────────────────────────

/// A directed graph of named reference frames and the rigid transforms that
/// relate them.
///
/// Frames are identified by arbitrary string names (e.g. `"panda_link0"`,
/// `"RGBDCamera5"`).  [`set_transform`][Self::set_transform] registers an
/// edge and its inverse, so lookups work in both directions.  The graph is
/// populated at startup from the deployment's rig description and shared
/// read-only afterwards.
#[derive(Debug, Default)]
pub struct FrameGraph {
    /// `edges[from][to]` maps `to`-frame points into `from`-frame coordinates.
    edges: HashMap<String, HashMap<String, StampedTransform>>,
}

impl FrameGraph {
    /// Create an empty frame graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or update the pose of `child_frame` relative to
    /// `parent_frame`: `translation` and `rotation` map child-frame points
    /// into parent-frame coordinates.
    ///
    /// The inverse edge is registered automatically.
    pub fn set_transform(
        &mut self,
        parent_frame: &str,
        child_frame: &str,
        translation: Point3,
        rotation: Quaternion,
    ) {
        let forward = StampedTransform {
            source_frame: child_frame.to_string(),
            target_frame: parent_frame.to_string(),
            translation,
            rotation,
            stamp: Utc::now(),
        };
        let backward = forward.inverse();
        self.edges
            .entry(parent_frame.to_string())
            .or_default()
            .insert(child_frame.to_string(), forward);
        self.edges
            .entry(child_frame.to_string())
            .or_default()
            .insert(parent_frame.to_string(), backward);
    }
}

impl TransformSource for FrameGraph {
    fn resolve(
        &self,
        source_frame: &str,
        target_frame: &str,
    ) -> Result<StampedTransform, ArmError> {
        if source_frame == target_frame {
            return Ok(StampedTransform::identity(source_frame));
        }

        // BFS outward from the target frame; each queue item carries the
        // transform composed so far, mapping the current frame into the
        // target frame.  Reaching the source frame yields the full chain.
        let mut queue: VecDeque<(String, Option<StampedTransform>)> = VecDeque::new();
        let mut visited: HashSet<String> = HashSet::new();

        queue.push_back((target_frame.to_string(), None));
        visited.insert(target_frame.to_string());

        while let Some((current, accumulated)) = queue.pop_front() {
            if let Some(neighbours) = self.edges.get(&current) {
                for (next, edge) in neighbours {
                    if visited.contains(next) {
                        continue;
                    }
                    let composed = match &accumulated {
                        Some(acc) => acc.compose(edge),
                        None => edge.clone(),
                    };
                    if next == source_frame {
                        debug!(
                            source_frame,
                            target_frame,
                            "resolved transform chain"
                        );
                        return Ok(composed);
                    }
                    visited.insert(next.clone());
                    queue.push_back((next.clone(), Some(composed)));
                }
            }
        }

        Err(ArmError::TransformUnavailable {
            source_frame: source_frame.to_string(),
            target_frame: target_frame.to_string(),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
