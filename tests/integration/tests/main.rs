//! End-to-End Integration Tests
//!
//! These tests exercise the full artifact issue/resolve round trip and the
//! inbound security policy pipeline against shared in-process backends.

mod common;
mod artifact_flows;
mod policy_flows;
