pub mod client;
#[cfg(test)]
pub mod fake;
pub mod public;

pub use client::{ApiClient, Backend, SharedBackend};
pub use public::*;
