pub mod connected;
pub mod points;
pub mod registry;

pub use connected::{connected_components, extract_components, label_components};
pub use points::{graham_scan, linearize};
pub use registry::LabelRegistry;
