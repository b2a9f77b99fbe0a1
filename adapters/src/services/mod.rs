//! Adapter services implementations

pub mod http_transport;

#[cfg(test)]
pub mod tests;

pub use http_transport::*;
