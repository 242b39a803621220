//! Helpers shared by the engine's tests and by the front-ends' tests (behind the `test_utils` feature).
pub mod fixtures;
pub mod prepare_env;
