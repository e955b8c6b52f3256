//! Core processing building blocks: parameter validation and the five pure
//! pipeline stages (threshold, segmentation, padding, composition, blending).
//! These are internal primitives consumed by the high-level `api` module.
pub mod params;
pub mod processing;
