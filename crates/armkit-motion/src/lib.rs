//! `armkit-motion` – from target point to executed arm motion.
//!
//! # Modules
//!
//! - [`command`] – [`MoveCommandBuilder`][command::MoveCommandBuilder]: pure
//!   conversion of a target point + task intent into a fully-specified
//!   [`MoveRequest`][armkit_types::MoveRequest] (calibration offsets, safety
//!   clamp, gripper transition).
//! - [`dispatch`] – [`MotionDispatcher`][dispatch::MotionDispatcher]: sends
//!   one request to the motion-execution service and waits under a bounded
//!   deadline, translating the answer into a
//!   [`MoveOutcome`][armkit_types::MoveOutcome].

pub mod command;
pub mod dispatch;

pub use command::{BuilderConfig, MoveCommandBuilder, APPROACH_ORIENTATION};
pub use dispatch::{MotionDispatcher, MotionService, DEFAULT_MOTION_DEADLINE};
