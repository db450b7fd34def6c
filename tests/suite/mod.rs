//! Integration test suite modules

mod commands;
mod rounds;
