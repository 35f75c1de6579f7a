//! Client-side polling controller.
//!
//! Turns an asynchronous seeding job into a synchronous-feeling result:
//! start the job, poll its status on a fixed interval, and settle in a
//! terminal state on success, job failure, attempt exhaustion, or too
//! many consecutive transport errors. The state machine itself is pure
//! ([`state::step`]); the driver owns the only side-effecting resource
//! (the timer) and releases it on every terminal transition.

pub mod controller;
pub mod state;

pub use controller::{HttpJobClient, JobClient, PollController, SourceError};
pub use state::{PollEvent, PollFailure, PollerConfig, PollerState};
