pub mod image_diff;
pub mod remap;
