//! Integration test framework for nextgric
#![allow(missing_docs)]
//!
//! Shared fixtures and utilities for the cross-crate tests of the xApp.
//!
//! # Components
//!
//! - [`test_fixtures`] - Simulated nodes, indications and a recording sink
//! - [`test_utils`] - Logging setup, polling helpers and a raw HTTP client
//!
//! # Test Categories
//!
//! 1. **RAN parameter trees** - PRB quota and handover trees
//! 2. **KPM pipeline** - Subscription, dispatch, aggregation and persistence
//! 3. **Slice control** - `POST /run` over TCP against the simulated runtime
//! 4. **Lifecycle** - Fatal errors and orderly shutdown

pub mod test_fixtures;
pub mod test_utils;

pub use test_fixtures::{
    gnb_ue, kpm_indication, sim_runtime, RecordingSink, TEST_KPM_FUNCTION_ID, TEST_PLMN,
    TEST_RC_FUNCTION_ID,
};
pub use test_utils::{
    http_post, init_test_logging, wait_for_condition, TestResult, DEFAULT_POLL_INTERVAL,
    DEFAULT_TEST_TIMEOUT,
};
