//! Core traits for the injection container.

mod injectable;
mod lifecycle;

pub use injectable::Injectable;
pub use lifecycle::{Close, Initialize};
