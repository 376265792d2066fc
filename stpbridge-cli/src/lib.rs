//! Command-line front end for the STP bridge

pub mod args;

pub use args::Cli;
