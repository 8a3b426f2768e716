mod grid;
mod hulls;
mod mask;

pub use grid::{PixelGrid, Point, valid_dimensions};
pub use hulls::Hulls;
pub use mask::{mask_from_dynamic, open_mask, save_label_map};
