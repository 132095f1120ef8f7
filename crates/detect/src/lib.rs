//! Object detection over staged images.
//!
//! A [`Detector`] reads one staged file, writes its annotated artifact into
//! a caller-provided working directory and reports both the findings and
//! the artifact's location. [`CommandDetector`] runs an external model
//! program; [`artifact`] handles locating and normalising its output.

pub mod artifact;
pub mod command;
pub mod detector;
mod subprocess;

pub use command::CommandDetector;
pub use detector::{DetectError, Detection, DetectRequest, Detector};
