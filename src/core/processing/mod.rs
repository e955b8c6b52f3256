pub mod blend;
pub mod compose;
pub mod padding;
pub mod pipeline;
pub mod resize;
pub mod segment;
pub mod threshold;
