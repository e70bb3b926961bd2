//! Core traits defined in `khozo-core` and implemented by other crates.

pub mod cache;
pub mod clock;
pub mod push;

pub use cache::CacheProvider;
pub use clock::{Clock, FixedClock, SystemClock};
pub use push::{PushDelivery, PushGateway, PushMessage};
