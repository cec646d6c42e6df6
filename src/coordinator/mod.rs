//! Clockwork coordinator boundary.
//!
//! Two endpoints are consumed, nothing more:
//! - `GET {base}/worker/jobs?worker_id=…&region=…&limit=…` — pull offers
//! - `POST {base}/worker/jobs/{id}/result` — deliver outcomes
//!
//! The [`Poller`] drives the first on an aligned, jittered cadence; the
//! [`Reporter`] drives the second once per executed job. Wire shapes live
//! in [`protocol`].

pub mod poller;
pub mod protocol;
pub mod reporter;

pub use poller::Poller;
pub use reporter::Reporter;
