//! Integration tests for infractl
//!
//! These tests spawn the actual binary and test end-to-end behavior.
//! Only commands that never shell out to `az` or `terraform` are exercised.

mod cli_tests;
