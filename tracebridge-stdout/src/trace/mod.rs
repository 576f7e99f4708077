mod exporter;
mod transform;

pub use exporter::*;
pub use transform::*;
