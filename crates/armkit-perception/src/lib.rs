//! `armkit-perception` – from pixels to manipulator-frame coordinates.
//!
//! Turns the output of an external object-detection service into poses the
//! motion layer can act on, by resolving the rigid transform between the
//! sensing frame and the manipulator frame and applying it to every detected
//! centroid.
//!
//! # Modules
//!
//! - [`transform`] – [`FrameGraph`][transform::FrameGraph]: directed graph of
//!   named reference frames that composes rigid transforms via BFS, behind
//!   the [`TransformSource`][transform::TransformSource] seam.
//! - [`locator`] – [`ObjectLocator`][locator::ObjectLocator]: queries an
//!   [`ObjectDetector`][locator::ObjectDetector] and maps every detection
//!   into the manipulator frame.

pub mod locator;
pub mod transform;

pub use locator::{DetectionQuery, LocatorConfig, ObjectDetector, ObjectLocator};
pub use transform::{FrameGraph, StampedTransform, TransformSource};
