//! Common test utilities for scentmap integration tests
//!
//! Dataset builders (hand-written and seeded random) and an in-process
//! backend that stands in for the HTTP API.

#![allow(dead_code)]

pub mod dataset_builder;
pub mod mock_backend;

pub use dataset_builder::{random_dataset, worked_example, DatasetBuilder, ACCORD_NAMES};
pub use mock_backend::MockBackend;
