//! `armkit-runtime` – the agent-facing surface of the manipulation stack.
//!
//! Wires perception and motion together behind two tools an external
//! tool-calling agent can invoke, and owns the deployment-level ambient
//! concerns: configuration and log initialisation.
//!
//! # Modules
//!
//! - [`tools`] – [`ObjectPositionsTool`][tools::ObjectPositionsTool] and
//!   [`MoveToPointTool`][tools::MoveToPointTool]: translate every outcome,
//!   success or failure, into the fixed result strings the agent layer
//!   forwards verbatim to the user.
//! - [`config`] – [`ArmConfig`][config::ArmConfig]: TOML deployment file
//!   (`~/.armkit/config.toml`) with `ARMKIT_*` env-var overrides.
//! - [`telemetry`] – `tracing` subscriber initialisation.

pub mod config;
pub mod telemetry;
pub mod tools;

pub use config::ArmConfig;
pub use tools::{MoveToPointArgs, MoveToPointTool, ObjectPositionsArgs, ObjectPositionsTool};
