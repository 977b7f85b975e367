//! Motion-request dispatch with a bounded wait.
//!
//! [`MotionDispatcher`] submits one [`MoveRequest`] to the external
//! motion-execution service (planning and IK live there, not here) and waits
//! for its answer up to a fixed deadline.  The raw response is translated
//! into a [`MoveOutcome`] so callers can tell "robot refused" apart from "no
//! answer".
//!
//! # Caller contract
//!
//! The manipulator has a single end effector, so at most one request may be
//! in flight at a time.  The dispatcher does not own a request queue and
//! does not enforce this; whatever layer sequences tool calls must.
//!
//! A client-side timeout does not stop the robot: the service may still be
//! executing the motion after [`MoveOutcome::TimedOut`] is returned, and the
//! physical state must be treated as unknown, not as stopped.

use std::sync::Arc;
use std::time::Duration;

use armkit_types::{ArmError, MotionResponse, MoveOutcome, MoveRequest};
use async_trait::async_trait;
use tracing::{debug, warn};

/// How long one dispatched request may wait for a service response.
pub const DEFAULT_MOTION_DEADLINE: Duration = Duration::from_secs(5);

/// Seam for the external motion-execution service.
///
/// Implementations carry the request over whatever transport the deployment
/// uses and return the service's success flag.  Planning, inverse
/// kinematics, and gripper actuation all happen on the far side.
#[async_trait]
pub trait MotionService: Send + Sync {
    /// Execute one motion request to completion.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::MotionService`] on transport failure.  A reached
    /// service that declines the motion answers `success = false` instead.
    async fn execute(&self, request: &MoveRequest) -> Result<MotionResponse, ArmError>;
}

/// Dispatches built requests to a [`MotionService`] under a deadline.
pub struct MotionDispatcher {
    service: Arc<dyn MotionService>,
    deadline: Duration,
}

impl MotionDispatcher {
    /// Dispatcher with the default 5-second deadline.
    pub fn new(service: Arc<dyn MotionService>) -> Self {
        Self::with_deadline(service, DEFAULT_MOTION_DEADLINE)
    }

    /// Dispatcher with an explicit deadline.
    pub fn with_deadline(service: Arc<dyn MotionService>, deadline: Duration) -> Self {
        Self { service, deadline }
    }

    /// Submit `request` and wait for the outcome.
    ///
    /// Exactly one request, one wait: there is no automatic retry, and a
    /// timeout is not retried either — retrying is the caller's decision.
    ///
    /// * no response within the deadline → [`MoveOutcome::TimedOut`]
    /// * response with `success = false` → [`MoveOutcome::Rejected`]
    /// * response with `success = true` → [`MoveOutcome::Succeeded`]
    ///
    /// Every outcome carries the originally requested coordinates.
    ///
    /// # Errors
    ///
    /// Transport-level failures ([`ArmError::MotionService`]) propagate so
    /// the tool boundary can render them; they mean the request may never
    /// have reached the service at all.
    pub async fn dispatch(&self, request: &MoveRequest) -> Result<MoveOutcome, ArmError> {
        debug!(
            x = request.target.position.x,
            y = request.target.position.y,
            z = request.target.position.z,
            frame = %request.target.frame,
            "calling motion service"
        );

        match tokio::time::timeout(self.deadline, self.service.execute(request)).await {
            Err(_elapsed) => {
                warn!(
                    deadline_ms = self.deadline.as_millis() as u64,
                    "motion service did not respond within the deadline; physical state unknown"
                );
                Ok(MoveOutcome::TimedOut(request.requested))
            }
            Ok(Err(e)) => Err(e),
            Ok(Ok(MotionResponse { success: true })) => {
                Ok(MoveOutcome::Succeeded(request.requested))
            }
            Ok(Ok(MotionResponse { success: false })) => {
                Ok(MoveOutcome::Rejected(request.requested))
            }
        }
    }
}
