//! A library and CLI for working with [OCFL](https://ocfl.io/) repositories.

pub mod cmd;
pub mod config;
pub mod ocfl;
