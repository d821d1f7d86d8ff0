//! Panotile - visibility-driven tile streaming for cubemap panoramas

pub mod core;
pub mod math;
pub mod tiles;
pub mod streaming;
