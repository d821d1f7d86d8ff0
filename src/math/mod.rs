//! Mathematical utilities

pub mod frustum;

pub use frustum::{Plane, Frustum};
