pub mod identity;
pub mod platform;
pub mod snapshot;
pub mod source;
