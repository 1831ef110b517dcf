pub mod orientation;
pub mod processor;
pub mod resize;
pub mod variants;
