//! Behavioural traits shared across skims crates.

pub mod cancellation;

pub use cancellation::{Cancellable, CancellationToken, Deadline};
