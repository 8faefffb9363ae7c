//! Common test infrastructure for Pixelsmith integration tests.
//!
//! Each test file compiles its own copy of this module, so items may appear
//! unused from the perspective of a single test file even though they're
//! used elsewhere.

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod fixtures;
pub mod mock_server;

pub use fixtures::*;
pub use mock_server::MockHttpServer;
