//! Integration tests for Clementine.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and run migrations
//! task db:start
//! cargo run -p clementine-cli -- migrate
//!
//! # Start the storefront
//! cargo run -p clementine-storefront
//!
//! # Run integration tests
//! cargo test -p clementine-integration-tests -- --ignored
//! ```
//!
//! Tests in `tests/` drive a *running* storefront over HTTP and are marked
//! `#[ignore]` so `cargo test` stays hermetic. In-process API coverage
//! (router + in-memory store) lives in the storefront crate itself.
//!
//! # Environment
//!
//! - `STOREFRONT_BASE_URL` - storefront origin (default `http://localhost:8000`)
//! - `STOREFRONT_TEST_TOKEN` - identity provider session token for
//!   authenticated routes (cart, orders)
