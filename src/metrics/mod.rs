pub mod aggregate;
pub mod poller;

pub use aggregate::*;
pub use poller::*;
