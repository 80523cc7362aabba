// Domain layer - Sources, datasets and panel descriptors
pub mod dataset;
pub mod errors;
pub mod panel;
pub mod source;
