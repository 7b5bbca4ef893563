//! Progressive image-quality loading core for DICOM web viewers.
//!
//! The library is the contract between a viewer UI and the backend that
//! serves image binaries at several compression qualities: a quality
//! model with selection policies, a task/listener notification
//! abstraction, a worker pool that executes fetch tasks, and a binary
//! cache feeding the policies.

pub mod cache;
pub mod events;
pub mod fetch;
pub mod pool;
pub mod quality;
pub mod task;
pub mod types;
