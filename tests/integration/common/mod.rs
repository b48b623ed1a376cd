//! Common utilities for integration tests.
//!
//! Shared LocalStack setup and helpers for seeding buckets.

pub mod localstack;

pub use localstack::LocalStackTestContext;
