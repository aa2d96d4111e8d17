//! CLI subcommand implementations for the TruCite binary.

pub mod doctor;
pub mod last_cmd;
pub mod output;
pub mod repl;
pub mod report;
pub mod start;
pub mod status;
pub mod stop;
pub mod verify_cmd;
