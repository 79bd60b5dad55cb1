use std::fmt::Display;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use ansi_term::{ANSIGenericString, Style};
use anyhow::{anyhow, Result};
use enum_dispatch::enum_dispatch;
#[cfg(feature = "s3")]
use rusoto_core::Region;

use crate::cmd::opts::{Command, RocflArgs, Storage};
use crate::config::Config;
use crate::ocfl::{CancellationToken, OcflRepo};

pub mod cmds;
pub mod diff;
pub mod list;
pub mod opts;
pub mod style;
pub mod table;
pub mod validate;

/// Format used to render timestamps throughout the CLI's output
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Options that apply across (almost) every subcommand
#[derive(Debug, Copy, Clone)]
pub struct GlobalArgs {
    pub quiet: bool,
    pub no_styles: bool,
}

impl GlobalArgs {
    fn new(args: &RocflArgs) -> Self {
        Self {
            quiet: args.quiet,
            no_styles: args.no_styles,
        }
    }
}

#[enum_dispatch]
pub trait Cmd {
    fn exec(
        &self,
        repo: &OcflRepo,
        args: GlobalArgs,
        config: &Config,
        terminate: &CancellationToken,
    ) -> Result<()>;
}

/// Parses the command line arguments, resolves configuration, and dispatches to the
/// appropriate subcommand.
pub fn exec_command(
    args: &RocflArgs,
    config: &Config,
    terminate: &CancellationToken,
) -> Result<()> {
    if let Command::Init(init) = &args.command {
        return cmds::init_repo(init, args, config);
    }
    if let Command::Config(_) = &args.command {
        return cmds::edit_config();
    }

    let repo = create_repo(args, config)?;
    let global = GlobalArgs::new(args);

    // Bridges the CLI-wide cancellation token into the repo/store level `close()` signal that
    // the storage engines and their iterators actually check, without requiring every command
    // to thread `terminate` through every repo call itself.
    let finished = AtomicBool::new(false);
    std::thread::scope(|scope| {
        scope.spawn(|| {
            while !finished.load(Ordering::Acquire) {
                if terminate.is_cancelled() {
                    repo.close();
                    return;
                }
                std::thread::sleep(Duration::from_millis(50));
            }
        });

        let result = args.command.exec(&repo, global, config, terminate);
        finished.store(true, Ordering::Release);
        result
    })
}

/// Opens the repository targeted by the combination of CLI args and resolved configuration.
fn create_repo(args: &RocflArgs, config: &Config) -> Result<OcflRepo> {
    let root = args
        .root
        .clone()
        .or_else(|| config.root.clone())
        .unwrap_or_else(|| ".".to_string());

    match args.target_storage() {
        Storage::FileSystem => Ok(OcflRepo::fs_repo(root)?),
        Storage::S3 => {
            #[cfg(feature = "s3")]
            {
                let bucket = args
                    .bucket
                    .clone()
                    .or_else(|| config.bucket.clone())
                    .ok_or_else(|| anyhow!("A bucket must be specified when using S3"))?;

                let prefix = match root.as_str() {
                    "." => None,
                    prefix => Some(prefix.to_string()),
                };

                let endpoint = args.endpoint.clone().or_else(|| config.endpoint.clone());
                let region_name = args.region.clone().or_else(|| config.region.clone());

                let region = match endpoint {
                    Some(endpoint) => Region::Custom {
                        name: region_name
                            .ok_or_else(|| anyhow!("A region must be specified when using a custom S3 endpoint"))?,
                        endpoint,
                    },
                    None => region_name
                        .ok_or_else(|| anyhow!("A region must be specified when using S3"))?
                        .parse()?,
                };

                let staging_root = args
                    .staging_root
                    .clone()
                    .or_else(|| config.staging_root.clone())
                    .map(Ok)
                    .unwrap_or_else(|| crate::config::s3_staging_path(config))?;

                let profile = args.profile.clone().or_else(|| config.profile.clone());

                Ok(OcflRepo::s3_repo(
                    region,
                    &bucket,
                    prefix.as_deref(),
                    staging_root,
                    profile.as_deref(),
                )?)
            }
            #[cfg(not(feature = "s3"))]
            {
                Err(anyhow!(
                    "This build of rocfl was not compiled with S3 support"
                ))
            }
        }
    }
}

/// Prints an error to stderr, respecting `quiet`
pub fn print_err(error: &anyhow::Error, quiet: bool) {
    if !quiet {
        eprintln!("Error: {:#}", error);
    }
}

/// Writes `value` to stdout without a trailing newline, flushing immediately so that
/// subsequent prompts (eg purge confirmation) appear before blocking on stdin.
pub fn print(value: impl Display) -> Result<()> {
    let mut stdout = io::stdout();
    write!(stdout, "{}", value)?;
    stdout.flush()?;
    Ok(())
}

/// Writes `value` to stdout followed by a newline
pub fn println(value: impl Display) -> Result<()> {
    writeln!(io::stdout(), "{}", value)?;
    Ok(())
}

/// Applies `style` to `text` unless styling has been disabled for the invocation
pub fn paint<'a, S: 'a + ToOwned + ?Sized>(
    no_styles: bool,
    style: Style,
    text: &'a S,
) -> ANSIGenericString<'a, S>
where
    &'a S: Into<std::borrow::Cow<'a, S>>,
    <S as ToOwned>::Owned: std::fmt::Debug,
{
    if no_styles {
        style::DEFAULT.paint(text)
    } else {
        style.paint(text)
    }
}
