use std::convert::TryInto;
use std::io;

use anyhow::Result;
use log::info;

use crate::cmd::opts::{
    CatCmd, CommitCmd, ConfigCmd, CopyCmd, DigestAlgorithm as OptAlgorithm, Field, InfoCmd,
    InitCmd, Layout, ListCmd, MoveCmd, NewCmd, PurgeCmd, RemoveCmd, ResetCmd, RocflArgs, ShowCmd,
    StatusCmd, Storage, UpgradeCmd,
};
use crate::cmd::{print, println, Cmd, GlobalArgs};
use crate::config::Config;
use crate::ocfl::{
    CancellationToken, DigestAlgorithm, LayoutExtensionName, OcflRepo, StorageLayout,
};

impl Cmd for CatCmd {
    fn exec(
        &self,
        repo: &OcflRepo,
        _args: GlobalArgs,
        _config: &Config,
        _terminate: &CancellationToken,
    ) -> Result<()> {
        if self.staged {
            repo.get_staged_object_file(
                &self.object_id,
                &self.path.as_str().try_into()?,
                &mut io::stdout(),
            )?;
        } else {
            repo.get_object_file(
                &self.object_id,
                &self.path.as_str().try_into()?,
                self.version,
                &mut io::stdout(),
            )?;
        }
        Ok(())
    }
}

/// Opens the rocfl config file in the user's `$EDITOR`, creating it with an empty `[global]`
/// section first if it does not already exist.
pub fn edit_config() -> Result<()> {
    let config_file = crate::config::config_path()
        .ok_or_else(|| anyhow::Error::msg("Failed to locate a config directory"))?;

    if let Some(parent) = config_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if !config_file.exists() {
        std::fs::write(&config_file, "[global]\n")?;
    }

    edit::edit_file(&config_file)?;

    Ok(())
}

pub fn init_repo(cmd: &InitCmd, args: &RocflArgs, config: &Config) -> Result<()> {
    let root = args.root.clone().unwrap_or_else(|| ".".to_string());

    match args.target_storage() {
        Storage::FileSystem => {
            let _ = OcflRepo::init_fs_repo(root, create_layout(cmd.layout)?)?;
        }
        Storage::S3 => {
            #[cfg(feature = "s3")]
            {
                init_s3_repo(cmd, args, config, root)?;
            }
            #[cfg(not(feature = "s3"))]
            {
                let _ = config;
                return Err(anyhow::anyhow!(
                    "This build of rocfl was not compiled with S3 support"
                ));
            }
        }
    }

    if !args.quiet {
        println("Initialized OCFL repository")?;
    }

    Ok(())
}

#[cfg(feature = "s3")]
fn init_s3_repo(cmd: &InitCmd, args: &RocflArgs, config: &Config, root: String) -> Result<()> {
    use rusoto_core::Region;

    let bucket = args
        .bucket
        .clone()
        .or_else(|| config.bucket.clone())
        .ok_or_else(|| anyhow::anyhow!("A bucket must be specified when using S3"))?;

    let prefix = match root.as_str() {
        "." => None,
        prefix => Some(prefix.to_string()),
    };

    let endpoint = args.endpoint.clone().or_else(|| config.endpoint.clone());
    let region_name = args.region.clone().or_else(|| config.region.clone());

    let region = match endpoint {
        Some(endpoint) => Region::Custom {
            name: region_name.ok_or_else(|| {
                anyhow::anyhow!("A region must be specified when using a custom S3 endpoint")
            })?,
            endpoint,
        },
        None => region_name
            .ok_or_else(|| anyhow::anyhow!("A region must be specified when using S3"))?
            .parse()?,
    };

    let staging_root = args
        .staging_root
        .clone()
        .or_else(|| config.staging_root.clone())
        .map(Ok)
        .unwrap_or_else(|| crate::config::s3_staging_path(config))?;

    let profile = args.profile.clone().or_else(|| config.profile.clone());

    let _ = OcflRepo::init_s3_repo(
        region,
        &bucket,
        prefix.as_deref(),
        staging_root,
        create_layout(cmd.layout)?,
        profile.as_deref(),
    )?;

    Ok(())
}

fn create_layout(layout: Layout) -> Result<StorageLayout> {
    match layout {
        Layout::FlatDirect => StorageLayout::new(LayoutExtensionName::FlatDirectLayout, None),
        Layout::HashedNTuple => StorageLayout::new(LayoutExtensionName::HashedNTupleLayout, None),
        Layout::HashedNTupleObjectId => {
            StorageLayout::new(LayoutExtensionName::HashedNTupleObjectIdLayout, None)
        }
    }
}

/// This is needed to keep enum_dispatch happy; `init` is handled before a repository is
/// opened, in `exec_command`, so this variant is never actually dispatched here.
impl Cmd for InitCmd {
    fn exec(
        &self,
        _repo: &OcflRepo,
        _args: GlobalArgs,
        _config: &Config,
        _terminate: &CancellationToken,
    ) -> Result<()> {
        unreachable!("init is dispatched before a repository is opened")
    }
}

impl Cmd for NewCmd {
    fn exec(
        &self,
        repo: &OcflRepo,
        _args: GlobalArgs,
        _config: &Config,
        _terminate: &CancellationToken,
    ) -> Result<()> {
        repo.create_object(
            &self.object_id,
            algorithm(self.digest_algorithm),
            &self.content_directory,
            self.zero_padding,
        )?;

        info!("Staged new OCFL object {}", self.object_id);

        Ok(())
    }
}

impl Cmd for CopyCmd {
    fn exec(
        &self,
        repo: &OcflRepo,
        _args: GlobalArgs,
        _config: &Config,
        _terminate: &CancellationToken,
    ) -> Result<()> {
        if self.internal {
            repo.copy_files_internal(
                &self.object_id,
                self.version,
                &self.source,
                &self.destination,
                self.recursive,
            )?;
        } else {
            repo.copy_files_external(
                &self.object_id,
                &self.source,
                &self.destination,
                self.recursive,
            )?;
        }
        Ok(())
    }
}

impl Cmd for MoveCmd {
    fn exec(
        &self,
        repo: &OcflRepo,
        _args: GlobalArgs,
        _config: &Config,
        _terminate: &CancellationToken,
    ) -> Result<()> {
        if self.internal {
            repo.move_files_internal(&self.object_id, &self.source, &self.destination)?;
        } else {
            repo.move_files_external(&self.object_id, &self.source, &self.destination)?;
        }
        Ok(())
    }
}

impl Cmd for RemoveCmd {
    fn exec(
        &self,
        repo: &OcflRepo,
        _args: GlobalArgs,
        _config: &Config,
        _terminate: &CancellationToken,
    ) -> Result<()> {
        repo.remove_files(&self.object_id, &self.paths, self.recursive)?;
        Ok(())
    }
}

impl Cmd for ResetCmd {
    fn exec(
        &self,
        repo: &OcflRepo,
        _args: GlobalArgs,
        _config: &Config,
        _terminate: &CancellationToken,
    ) -> Result<()> {
        if self.paths.is_empty() {
            repo.reset_all(&self.object_id)?;
        } else {
            repo.reset(&self.object_id, &self.paths, self.recursive)?;
        }
        Ok(())
    }
}

impl Cmd for CommitCmd {
    fn exec(
        &self,
        repo: &OcflRepo,
        _args: GlobalArgs,
        _config: &Config,
        _terminate: &CancellationToken,
    ) -> Result<()> {
        repo.commit(
            &self.object_id,
            self.user_name.as_deref(),
            self.user_address.as_deref(),
            self.message.as_deref(),
            self.created,
        )?;

        Ok(())
    }
}

impl Cmd for StatusCmd {
    fn exec(
        &self,
        repo: &OcflRepo,
        args: GlobalArgs,
        config: &Config,
        terminate: &CancellationToken,
    ) -> Result<()> {
        if let Some(object_id) = self.object_id.as_ref() {
            let cmd = ShowCmd {
                object_id: object_id.to_string(),
                version: None,
                staged: true,
                minimal: false,
            };
            cmd.exec(repo, args, config, terminate)
        } else {
            let cmd = ListCmd {
                object_id: None,
                version: None,
                path: None,
                staged: true,
                all: false,
                digest: false,
                objects: false,
                header: true,
                long: true,
                reverse: false,
                physical: false,
                tsv: false,
                sort: Field::Name,
            };

            cmd.exec(repo, args, config, terminate)
        }
    }
}

impl Cmd for PurgeCmd {
    fn exec(
        &self,
        repo: &OcflRepo,
        _args: GlobalArgs,
        _config: &Config,
        _terminate: &CancellationToken,
    ) -> Result<()> {
        if !self.force {
            print(format!("Permanently delete '{}'? [y/N]: ", self.object_id))?;
            let mut response = String::new();
            io::stdin().read_line(&mut response)?;
            if !response.trim().eq_ignore_ascii_case("y") {
                println("Aborted")?;
                return Ok(());
            }
        }

        repo.purge_object(&self.object_id)?;
        Ok(())
    }
}

fn algorithm(algorithm: OptAlgorithm) -> DigestAlgorithm {
    match algorithm {
        OptAlgorithm::Sha256 => DigestAlgorithm::Sha256,
        OptAlgorithm::Sha512 => DigestAlgorithm::Sha512,
    }
}

impl Cmd for InfoCmd {
    fn exec(
        &self,
        repo: &OcflRepo,
        _args: GlobalArgs,
        _config: &Config,
        _terminate: &CancellationToken,
    ) -> Result<()> {
        match &self.object_id {
            Some(object_id) => {
                let details = if self.staged {
                    repo.get_staged_object_details(object_id)?
                } else {
                    repo.get_object_details(object_id, None)?
                };

                println(format!(
                    "Object {}, HEAD version {}, digest algorithm {}",
                    object_id, details.version_details.version_num, details.digest_algorithm,
                ))
            }
            None => println("Repository conforms to the OCFL 1.0 object specification."),
        }
    }
}

/// This is needed to keep enum_dispatch happy; `config` is handled before a repository is
/// opened, in `exec_command`, so this variant is never actually dispatched here.
impl Cmd for ConfigCmd {
    fn exec(
        &self,
        _repo: &OcflRepo,
        _args: GlobalArgs,
        _config: &Config,
        _terminate: &CancellationToken,
    ) -> Result<()> {
        unreachable!("config is dispatched before a repository is opened")
    }
}

impl Cmd for UpgradeCmd {
    fn exec(
        &self,
        _repo: &OcflRepo,
        _args: GlobalArgs,
        _config: &Config,
        _terminate: &CancellationToken,
    ) -> Result<()> {
        // Upgrading the storage root or an object to a later spec version is not yet
        // implemented; there is no version to upgrade to beyond what new objects already use.
        Err(anyhow::Error::msg(format!(
            "Upgrading to {:?} is not currently supported",
            self.spec_version
        )))
    }
}
