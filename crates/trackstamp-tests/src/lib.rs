//! trackstamp End-to-End Test Infrastructure
//!
//! Fixtures for driving the scaffolder and the artifact engine against real
//! directory trees in temporary locations:
//!
//! - [`fixtures::ProjectFixture`]: a base directory holding one project
//! - [`fixtures::FakeEncoder`]: an encoder that records its calls instead of
//!   running lame
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p trackstamp-tests
//! ```

pub mod fixtures;
