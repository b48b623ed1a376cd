//! Integration tests for globstream.
//!
//! `stream_test` drives full streams against the scripted listing client and
//! always runs. `s3_test` needs LocalStack and is marked `#[ignore]` so it
//! stays out of CI runs without that setup.
//!
//! ## Running the LocalStack tests
//!
//! 1. Start LocalStack:
//!    ```bash
//!    docker run -d -p 4566:4566 localstack/localstack
//!    ```
//!
//! 2. Run the ignored tests:
//!    ```bash
//!    LOCALSTACK_ENDPOINT=http://localhost:4566 cargo test -p integration-tests -- --ignored
//!    ```

mod common;
mod s3_test;
mod stream_test;
