pub mod record;
pub mod dataset;

pub use record::*;
pub use dataset::*;
