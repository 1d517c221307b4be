pub mod collector;
pub mod gpu;
pub mod host;
pub mod platform;
pub mod probe;
pub mod snapshot;
pub mod source;
