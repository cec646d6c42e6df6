pub mod config;
pub mod coordinator;
pub mod error;
pub mod executor;
pub mod http;
pub mod job;
pub mod limiter;
pub mod queue;
pub mod shutdown;
pub mod worker;
