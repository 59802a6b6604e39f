//! Expose interlinker's internal API for use in integration testing. It is
//! primarily intended for testing purposes.
pub mod cli;
pub mod utils;
