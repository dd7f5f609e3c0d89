//! Unit tests for infractl
//!
//! These tests use mocked dependencies and run fast without external I/O.

mod mocks;
mod owner_tag_properties;
mod terraform_tests;
