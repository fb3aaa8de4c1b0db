#![allow(dead_code)]

/// Common test utilities for fault barrier integration tests
///
/// This module provides shared functionality including:
/// - An event journal shared by every recording component
/// - A recording lock and a recording observer
/// - Scripted operations and recording strategies
/// - Assertion helpers over recorded events
pub mod assertions;
pub mod recording;
