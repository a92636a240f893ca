pub mod align;
pub mod config;
pub mod dataset;
pub mod error;
pub mod io;
pub mod label;
pub mod pipeline;
pub mod signal;
pub mod split;
pub mod summary;
pub mod timeline;

pub use dataset::*;
pub use error::*;
pub use pipeline::*;
pub use signal::*;
