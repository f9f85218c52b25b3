//! # Secret Lifecycle
//!
//! Creation and consumption of limited-view secrets. The engine enforces three
//! rules on top of the store contract:
//!
//! - a secret is read at most `remaining_views` times, even under concurrent
//!   readers (every successful read is a compare-and-swap from `k` to `k - 1`)
//! - a secret is never readable at or after its absolute `expires_at`
//! - a rewrite never extends the backend TTL past `expires_at`

pub mod engine;
pub mod error;
pub mod observer;

pub use engine::SecretLifecycle;
pub use error::{LifecycleError, LifecycleResult};
pub use observer::{LifecycleObserver, NoopObserver};
