//! Integration tests for itest-stack
//!
//! These tests spawn the actual binary and test end-to-end behavior
//! against temporary directories.

mod config_command;
mod synth_command;
