use std::cmp::Ordering;
use std::rc::Rc;

use anyhow::{Context, Result};
use globset::GlobBuilder;

use crate::cmd::opts::{Field, ListCmd};
use crate::cmd::style;
use crate::cmd::table::{Alignment, AsRow, Column, ColumnId, Row, Separator, TableView, TextCell};
use crate::cmd::{Cmd, GlobalArgs, DATE_FORMAT};
use crate::config::Config;
use crate::ocfl::{CancellationToken, FileDetails, LogicalPath, ObjectVersionDetails, OcflRepo};

impl Cmd for ListCmd {
    fn exec(
        &self,
        repo: &OcflRepo,
        args: GlobalArgs,
        _config: &Config,
        _terminate: &CancellationToken,
    ) -> Result<()> {
        if self.staged {
            self.list_staged(repo, args)
        } else if self.objects || self.object_id.is_none() {
            self.list_objects(repo, args)
        } else {
            self.list_object_contents(repo, args)
        }
    }
}

impl ListCmd {
    fn list_staged(&self, repo: &OcflRepo, args: GlobalArgs) -> Result<()> {
        if self.object_id.is_some() && !self.objects {
            self.list_staged_object_contents(repo, args)
        } else {
            self.list_staged_objects(repo, args)
        }
    }

    fn list_objects(&self, repo: &OcflRepo, args: GlobalArgs) -> Result<()> {
        let iter = repo
            .list_objects(self.object_id.as_deref())
            .with_context(|| "Failed to list objects")?;

        let mut objects: Vec<ObjectVersionDetails> = iter.collect();

        self.sort_objects(&mut objects);

        let mut table = self.object_table(args);
        objects.iter().for_each(|object| table.add_row(object));
        Ok(table.write_stdio()?)
    }

    fn list_staged_objects(&self, repo: &OcflRepo, args: GlobalArgs) -> Result<()> {
        let iter = repo
            .list_staged_objects(self.object_id.as_deref())
            .with_context(|| "Failed to list staged objects")?;

        let mut objects: Vec<ObjectVersionDetails> = iter.collect();

        self.sort_objects(&mut objects);

        let mut table = self.object_table(args);
        objects.iter().for_each(|object| table.add_row(object));
        Ok(table.write_stdio()?)
    }

    fn sort_objects(&self, objects: &mut [ObjectVersionDetails]) {
        objects.sort_unstable_by(|a, b| {
            if self.reverse {
                cmp_objects(&self.sort, b, a)
            } else {
                cmp_objects(&self.sort, a, b)
            }
        });
    }

    fn list_object_contents(&self, repo: &OcflRepo, args: GlobalArgs) -> Result<()> {
        let object_id = self.object_id.as_ref().unwrap();
        let object = repo
            .get_object(object_id, self.version)
            .with_context(|| "Failed to list object")?;

        self.print_listing(object.state.into_iter(), args)
    }

    fn list_staged_object_contents(&self, repo: &OcflRepo, args: GlobalArgs) -> Result<()> {
        let object_id = self.object_id.as_ref().unwrap();
        let object = repo
            .get_staged_object(object_id)
            .with_context(|| "Failed to list staged object")?;

        self.print_listing(object.state.into_iter(), args)
    }

    fn print_listing(
        &self,
        state: impl Iterator<Item = (Rc<LogicalPath>, FileDetails)>,
        args: GlobalArgs,
    ) -> Result<()> {
        let glob = match self.path.as_ref() {
            Some(path) => Some(
                GlobBuilder::new(path)
                    .literal_separator(self.logical_dirs)
                    .backslash_escape(true)
                    .build()?
                    .compile_matcher(),
            ),
            None => None,
        };

        let mut listings: Vec<ContentListing> = state
            .map(|(path, details)| ContentListing {
                logical_path: path,
                details,
            })
            .filter(|listing| match &glob {
                Some(glob) => glob.is_match(listing.logical_path.as_ref().as_ref()),
                None => true,
            })
            .collect();

        listings.sort_unstable_by(|a, b| {
            if self.reverse {
                cmp_object_contents(&self.sort, b, a)
            } else {
                cmp_object_contents(&self.sort, a, b)
            }
        });

        let mut table = self.object_content_table(args);
        listings.iter().for_each(|listing| table.add_row(listing));
        Ok(table.write_stdio()?)
    }

    fn object_table(&self, args: GlobalArgs) -> TableView {
        let mut columns = Vec::new();

        if self.long {
            columns.push(Column::new(ColumnId::Version, "Version", Alignment::Right));
            columns.push(Column::new(ColumnId::Created, "Updated", Alignment::Left));
        }

        columns.push(Column::new(ColumnId::ObjectId, "Object ID", Alignment::Left));

        if self.physical {
            columns.push(Column::new(
                ColumnId::PhysicalPath,
                "Physical Path",
                Alignment::Left,
            ));
        }

        TableView::new(columns, self.separator(), self.header, !args.no_styles)
    }

    fn object_content_table(&self, args: GlobalArgs) -> TableView {
        let mut columns = Vec::new();

        if self.long {
            columns.push(Column::new(ColumnId::Version, "Version", Alignment::Right));
            columns.push(Column::new(ColumnId::Created, "Updated", Alignment::Left));
        }

        columns.push(Column::new(
            ColumnId::LogicalPath,
            "Logical Path",
            Alignment::Left,
        ));

        if self.physical {
            columns.push(Column::new(
                ColumnId::PhysicalPath,
                "Physical Path",
                Alignment::Left,
            ));
        }

        if self.digest {
            columns.push(Column::new(ColumnId::Digest, "Digest", Alignment::Left));
        }

        TableView::new(columns, self.separator(), self.header, !args.no_styles)
    }

    fn separator(&self) -> Separator {
        if self.tsv {
            Separator::Tab
        } else {
            Separator::Space
        }
    }
}

fn cmp_objects(field: &Field, a: &ObjectVersionDetails, b: &ObjectVersionDetails) -> Ordering {
    match field {
        Field::Name => natord::compare(&a.id, &b.id),
        Field::Version => a
            .version_details
            .version_num
            .cmp(&b.version_details.version_num),
        Field::Updated => a.version_details.created.cmp(&b.version_details.created),
        Field::Physical => a.object_root.cmp(&b.object_root),
        Field::Digest => Ordering::Equal,
        Field::Default | Field::None => Ordering::Equal,
    }
}

fn cmp_object_contents(field: &Field, a: &ContentListing, b: &ContentListing) -> Ordering {
    match field {
        Field::Name => natord::compare(a.logical_path.as_ref().as_ref(), b.logical_path.as_ref().as_ref()),
        Field::Version => a
            .details
            .last_update
            .version_num
            .cmp(&b.details.last_update.version_num),
        Field::Updated => a
            .details
            .last_update
            .created
            .cmp(&b.details.last_update.created),
        Field::Physical => natord::compare(&a.details.storage_path, &b.details.storage_path),
        Field::Digest => a.details.digest.cmp(&b.details.digest),
        Field::Default => natord::compare(a.logical_path.as_ref().as_ref(), b.logical_path.as_ref().as_ref()),
        Field::None => Ordering::Equal,
    }
}

struct ContentListing {
    logical_path: Rc<LogicalPath>,
    details: FileDetails,
}

impl<'a> AsRow<'a> for ContentListing {
    fn as_row(&'a self, columns: &[Column]) -> Row<'a> {
        let mut cells = Vec::new();

        for column in columns {
            let cell = match column.id {
                ColumnId::Version => {
                    TextCell::new(self.details.last_update.version_num.to_string())
                        .with_style(&*style::GREEN)
                }
                ColumnId::Created => TextCell::new(
                    self.details
                        .last_update
                        .created
                        .format(DATE_FORMAT)
                        .to_string(),
                )
                .with_style(&*style::YELLOW),
                ColumnId::LogicalPath => TextCell::new(self.logical_path.to_string())
                    .with_style(&*style::BOLD),
                ColumnId::PhysicalPath => TextCell::new(self.details.storage_path.as_str()),
                ColumnId::Digest => TextCell::new(format!(
                    "{}:{}",
                    self.details.digest_algorithm, self.details.digest
                )),
                _ => TextCell::blank(),
            };

            cells.push(cell);
        }

        Row::new(cells)
    }
}

impl<'a> AsRow<'a> for ObjectVersionDetails {
    fn as_row(&'a self, columns: &[Column]) -> Row<'a> {
        let mut cells = Vec::new();

        for column in columns {
            let cell = match column.id {
                ColumnId::Version => {
                    TextCell::new(self.version_details.version_num.to_string())
                        .with_style(&*style::GREEN)
                }
                ColumnId::Created => TextCell::new(
                    self.version_details.created.format(DATE_FORMAT).to_string(),
                )
                .with_style(&*style::YELLOW),
                ColumnId::ObjectId => TextCell::new(self.id.as_str()).with_style(&*style::BOLD),
                ColumnId::PhysicalPath => TextCell::new(self.object_root.as_str()),
                _ => TextCell::blank(),
            };

            cells.push(cell);
        }

        Row::new(cells)
    }
}
