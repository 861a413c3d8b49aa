//! RC slice control
//!
//! The control task runner and the REST endpoint that triggers it.

pub mod rest;
pub mod runner;

pub use rest::{
    handle_http_request, parse_run_request, RequestError, RestServer, RestTask, RUN_PATH,
    TASK_EXECUTED, UNKNOWN_ENDPOINT,
};
pub use runner::{ControlOutcome, RcControlRunner};
