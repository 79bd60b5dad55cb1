//! `rocfl` is a command line utility for working with [OCFL](https://ocfl.io/) repositories.
//!
//! It is intended to be run from within an OCFL repository's storage root. It can be run
//! outside of a storage root by specifying the repository root using the `--root` option, or
//! against a bucket in S3.
//!
//! For a detailed description of the options available, consult the builtin help by executing
//! `rocfl help` or `rocfl help <COMMAND>`.

use clap::Parser;
use log::LevelFilter;
use rocfl::cmd::opts::RocflArgs;
use rocfl::cmd::{exec_command, print_err};
use rocfl::config::load_config;
use rocfl::ocfl::CancellationToken;

fn main() {
    let args = RocflArgs::parse();

    init_logger(args.verbose);

    let terminate = CancellationToken::new();
    let handler_token = terminate.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_token.cancel()) {
        log::warn!("Failed to install Ctrl-C handler: {}", e);
    }

    let config = match load_config(&args.name) {
        Ok(config) => config,
        Err(e) => {
            print_err(&e.into(), args.quiet);
            std::process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        print_err(&e.into(), args.quiet);
        std::process::exit(1);
    }

    if let Err(e) = exec_command(&args, &config, &terminate) {
        print_err(&e, args.quiet);
        std::process::exit(1);
    }
}

/// Configures the default log level. `-v` raises it to `debug`; otherwise only warnings and
/// errors from rocfl's own dependencies are shown, while rocfl itself logs at `info`.
fn init_logger(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(LevelFilter::Warn)
        .filter_module("rocfl", level)
        .parse_default_env()
        .init();
}
