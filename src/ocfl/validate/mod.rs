use std::borrow::Cow;
use std::cell::RefCell;
use std::str::FromStr;

use log::info;

use strum_macros::Display as EnumDisplay;

use crate::ocfl::consts::{
    INVENTORY_FILE, INVENTORY_SIDECAR_PREFIX, INVENTORY_TYPE, OBJECT_NAMASTE_CONTENTS_1_0,
    OBJECT_NAMASTE_FILE,
};
use crate::ocfl::digest::{HexDigest, MultiDigestWriter};
use crate::ocfl::error::{Result, OcflError};
use crate::ocfl::inventory::Inventory;
use crate::ocfl::validate::store::{Listing, Storage};
use crate::ocfl::{paths, DigestAlgorithm, VersionNum};
use regex::Regex;
use once_cell::sync::Lazy;

mod serde;
pub mod store;

static SIDECAR_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[\t ]+"#).unwrap());

// TODO
pub struct Validator<S: Storage> {
    storage: S,
}

// TODO move
#[derive(Debug)]
enum ParseResult {
    Ok(ParseValidationResult, Inventory),
    Error(ParseValidationResult),
}

#[derive(Debug)]
struct ParseValidationResult {
    errors: RefCell<Vec<ValidationError>>,
    warnings: RefCell<Vec<ValidationWarning>>,
}

/// Where in an object or storage root a problem was found.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ProblemLocation {
    /// The object root, outside of any particular version directory.
    ObjectRoot,
    /// A specific version directory within an object.
    ObjectVersion(VersionNum),
    /// The storage root itself, eg its NAMASTE file or `ocfl_layout.json`.
    StorageRoot,
    /// The directory hierarchy beneath the storage root, outside of any object.
    StorageHierarchy,
}

fn location_from_str(version: &str) -> ProblemLocation {
    if version == "root" {
        ProblemLocation::ObjectRoot
    } else {
        match VersionNum::from_str(version) {
            Ok(version_num) => ProblemLocation::ObjectVersion(version_num),
            Err(_) => ProblemLocation::ObjectRoot,
        }
    }
}

/// Common behavior shared by [`ObjectValidationResult`] and [`StorageValidationResult`].
pub trait ValidationResult {
    fn errors(&self) -> &[ValidationError];

    fn errors_mut(&mut self) -> &mut Vec<ValidationError>;

    fn warnings(&self) -> &[ValidationWarning];

    fn warnings_mut(&mut self) -> &mut Vec<ValidationWarning>;

    fn has_errors(&self) -> bool {
        !self.errors().is_empty()
    }

    fn has_warnings(&self) -> bool {
        !self.warnings().is_empty()
    }

    fn has_errors_or_warnings(&self) -> bool {
        self.has_errors() || self.has_warnings()
    }
}

/// The problems, if any, found while validating a single OCFL object.
#[derive(Debug)]
pub struct ObjectValidationResult {
    pub object_id: Option<String>,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl Default for ObjectValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectValidationResult {
    pub fn new() -> Self {
        Self {
            object_id: None,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn with_id(object_id: &str) -> Self {
        Self {
            object_id: Some(object_id.to_string()),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn add_parse_result(&mut self, version: &str, result: ParseValidationResult) {
        let location = location_from_str(version);
        self.errors
            .extend(result.errors.take().into_iter().map(|mut e| {
                e.location = location;
                e
            }));
        self.warnings
            .extend(result.warnings.take().into_iter().map(|mut w| {
                w.location = location;
                w
            }));
    }

    pub fn error(&mut self, code: ErrorCode, message: String) {
        self.errors.push(ValidationError::new(code, message));
    }

    pub fn warn(&mut self, code: WarnCode, message: String) {
        self.warnings.push(ValidationWarning::new(code, message));
    }

    pub fn error_version(&mut self, version_num: String, code: ErrorCode, message: String) {
        self.errors.push(ValidationError::with_location(
            location_from_str(&version_num),
            code,
            message,
        ));
    }

    pub fn warn_version(&mut self, version_num: String, code: WarnCode, message: String) {
        self.warnings.push(ValidationWarning::with_location(
            location_from_str(&version_num),
            code,
            message,
        ));
    }
}

impl ValidationResult for ObjectValidationResult {
    fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    fn errors_mut(&mut self) -> &mut Vec<ValidationError> {
        &mut self.errors
    }

    fn warnings(&self) -> &[ValidationWarning] {
        &self.warnings
    }

    fn warnings_mut(&mut self) -> &mut Vec<ValidationWarning> {
        &mut self.warnings
    }
}

/// The problems, if any, found while validating the storage root or the directory hierarchy
/// beneath it, outside of any individual object.
#[derive(Debug, Default)]
pub struct StorageValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl StorageValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, location: ProblemLocation, code: ErrorCode, message: String) {
        self.errors
            .push(ValidationError::with_location(location, code, message));
    }

    pub fn warn(&mut self, location: ProblemLocation, code: WarnCode, message: String) {
        self.warnings
            .push(ValidationWarning::with_location(location, code, message));
    }
}

impl ValidationResult for StorageValidationResult {
    fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    fn errors_mut(&mut self) -> &mut Vec<ValidationError> {
        &mut self.errors
    }

    fn warnings(&self) -> &[ValidationWarning] {
        &self.warnings
    }

    fn warnings_mut(&mut self) -> &mut Vec<ValidationWarning> {
        &mut self.warnings
    }
}

/// Lazily validates the objects in a repository after its storage root has already been
/// validated. Yields one result per object encountered.
pub trait IncrementalValidator: Iterator<Item = Result<ObjectValidationResult>> {
    /// The result of validating the storage root, eg its NAMASTE file and `ocfl_layout.json`.
    fn storage_root_result(&self) -> &StorageValidationResult;

    /// The result of validating the directory hierarchy beneath the storage root. This
    /// accumulates as objects are iterated and is only complete once iteration is exhausted.
    fn storage_hierarchy_result(&self) -> &StorageValidationResult;

    fn storage_hierarchy_result_mut(&mut self) -> &mut StorageValidationResult;
}

/// Walks every object beneath a storage root, yielding its validation result one at a time.
pub struct IncrementalValidatorImpl<'a, S: Storage> {
    validator: &'a Validator<S>,
    fixity_check: bool,
    storage_root_result: StorageValidationResult,
    storage_hierarchy_result: StorageValidationResult,
    object_roots: std::vec::IntoIter<String>,
}

impl<'a, S: Storage> IncrementalValidatorImpl<'a, S> {
    fn new(
        validator: &'a Validator<S>,
        fixity_check: bool,
        storage_root_result: StorageValidationResult,
        storage_hierarchy_result: StorageValidationResult,
        object_roots: Vec<String>,
    ) -> Self {
        Self {
            validator,
            fixity_check,
            storage_root_result,
            storage_hierarchy_result,
            object_roots: object_roots.into_iter(),
        }
    }
}

impl<'a, S: Storage> Iterator for IncrementalValidatorImpl<'a, S> {
    type Item = Result<ObjectValidationResult>;

    fn next(&mut self) -> Option<Self::Item> {
        let object_root = self.object_roots.next()?;
        Some(
            self.validator
                .validate_object(None, &object_root, None, self.fixity_check),
        )
    }
}

impl<'a, S: Storage> IncrementalValidator for IncrementalValidatorImpl<'a, S> {
    fn storage_root_result(&self) -> &StorageValidationResult {
        &self.storage_root_result
    }

    fn storage_hierarchy_result(&self) -> &StorageValidationResult {
        &self.storage_hierarchy_result
    }

    fn storage_hierarchy_result_mut(&mut self) -> &mut StorageValidationResult {
        &mut self.storage_hierarchy_result
    }
}

#[derive(Debug)]
pub struct ValidationError {
    pub location: ProblemLocation,
    pub code: ErrorCode,
    pub text: String,
}

// TODO move
impl ValidationError {
    pub fn new(code: ErrorCode, text: String) -> Self {
        Self {
            location: ProblemLocation::ObjectRoot,
            code,
            text,
        }
    }

    pub fn with_location(location: ProblemLocation, code: ErrorCode, text: String) -> Self {
        Self {
            location,
            code,
            text,
        }
    }
}

#[derive(Debug)]
pub struct ValidationWarning {
    pub location: ProblemLocation,
    pub code: WarnCode,
    pub text: String,
}

// TODO move
impl ValidationWarning {
    pub fn new(code: WarnCode, text: String) -> Self {
        Self {
            location: ProblemLocation::ObjectRoot,
            code,
            text,
        }
    }

    pub fn with_location(location: ProblemLocation, code: WarnCode, text: String) -> Self {
        Self {
            location,
            code,
            text,
        }
    }
}

#[allow(dead_code)]
#[derive(Debug, EnumDisplay, Copy, Clone, PartialEq)]
pub enum ErrorCode {
    E001,
    E002,
    E003,
    E004,
    E005,
    E006,
    E007,
    E008,
    E009,
    E010,
    E011,
    E012,
    E013,
    E014,
    E015,
    E016,
    E017,
    E018,
    E019,
    E020,
    E021,
    E022,
    E023,
    E024,
    E025,
    E026,
    E027,
    E028,
    E029,
    E030,
    E031,
    E032,
    E033,
    E034,
    E035,
    E036,
    E037,
    E038,
    E039,
    E040,
    E041,
    E042,
    E043,
    E044,
    E045,
    E046,
    E047,
    E048,
    E049,
    E050,
    E051,
    E052,
    E053,
    E054,
    E055,
    E056,
    E057,
    E058,
    E059,
    E060,
    E061,
    E062,
    E063,
    E064,
    E066,
    E067,
    E068,
    E069,
    E070,
    E071,
    E072,
    E073,
    E074,
    E075,
    E076,
    E077,
    E078,
    E079,
    E080,
    E081,
    E082,
    E083,
    E084,
    E085,
    E086,
    E087,
    E088,
    E089,
    E090,
    E091,
    E092,
    E093,
    E094,
    E095,
    E096,
    E097,
    E098,
    E099,
    E100,
    E101,
    E102,
}

#[allow(dead_code)]
#[derive(Debug, EnumDisplay, Copy, Clone, PartialEq)]
pub enum WarnCode {
    W001,
    W002,
    W003,
    W004,
    W005,
    W006,
    W007,
    W008,
    W009,
    W010,
    W011,
    W012,
    W013,
    W014,
    W015,
}

// TODO
impl<S: Storage> Validator<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn validate_object(
        &self,
        object_id: Option<&str>,
        object_root: &str,
        _version: Option<VersionNum>,
        fixity_check: bool,
    ) -> Result<ObjectValidationResult> {
        let mut result = match object_id {
            Some(object_id) => ObjectValidationResult::with_id(object_id),
            None => ObjectValidationResult::new(),
        };

        let version = "root";
        // TODO error handling
        let root_listing = self.storage.list(object_root, false)?;

        info!("{:?}", root_listing);
        // TODO for some reason this is not matching...
        if root_listing.contains(&Listing::File(Cow::Borrowed(OBJECT_NAMASTE_FILE))) {
            // TODO this should also determine what the version is
            self.validate_object_namaste(object_root, &mut result);
        } else {
            result.error(
                ErrorCode::E003,
                "Object version declaration does not exist".to_string(),
            );
        }

        if root_listing.contains(&Listing::File(Cow::Borrowed(INVENTORY_FILE))) {
            let mut algorithms = Vec::new();

            for entry in &root_listing {
                if let Listing::File(filename) = entry {
                    if let Some(algorithm) = filename.strip_prefix(INVENTORY_SIDECAR_PREFIX) {
                        if let Ok(algorithm) = DigestAlgorithm::from_str(algorithm) {
                            algorithms.push(algorithm);
                        }
                    }
                }
            }

            let (inventory, digest) = self.validate_inventory(
                &paths::join(object_root, INVENTORY_FILE),
                None,
                &algorithms,
                &mut result,
            )?;

            if let (Some(object_id), Some(inventory)) = (object_id, &inventory) {
                if object_id != inventory.id {
                    result.error_version(
                        version.to_string(),
                        ErrorCode::E083,
                        format!(
                            "Inventory field 'id' should be '{}'. Found: {}",
                            object_id, inventory.id
                        ),
                    );
                }
            }

            if result.object_id.is_none() {
                if let Some(inventory) = &inventory {
                    result.object_id = Some(inventory.id.clone());
                }
            }

            let algorithm = match &inventory {
                Some(inventory) => Some(inventory.digest_algorithm),
                None => {
                    if algorithms.len() == 1 {
                        Some(algorithms[0])
                    } else {
                        None
                    }
                }
            };

            if let Some(algorithm) = algorithm {
                let sidecar_file = format!("{}.{}", INVENTORY_FILE, algorithm);
                if root_listing.contains(&Listing::File(Cow::Borrowed(&sidecar_file))) {
                    if let Some(digest) = digest {
                        self.validate_sidecar(
                            &paths::join(object_root, &sidecar_file),
                            version,
                            &digest,
                            &mut result,
                        )?;
                    }
                } else {
                    result.error_version(
                        version.to_string(),
                        ErrorCode::E058,
                        format!("Inventory sidecar {} does not exist", sidecar_file),
                    );
                }
            }
        } else {
            result.error_version(
                version.to_string(),
                ErrorCode::E063,
                "Inventory does not exist".to_string(),
            );
        }

        if fixity_check {
            // TODO walk the manifest and recompute digests of every content file
        }

        // TODO validate root contents

        // TODO E037 id when comparing to root https://github.com/OCFL/spec/issues/542
        // TODO don't forget to compare contentDirectory

        Ok(result)
    }

    /// Validates the OCFL storage root's conformance declaration and `ocfl_layout.json`,
    /// then walks the directory hierarchy beneath it looking for object roots. The walk stops
    /// descending as soon as a directory is identified as an object root.
    pub fn validate_repo(&self, fixity_check: bool) -> Result<IncrementalValidatorImpl<'_, S>> {
        let mut storage_root_result = StorageValidationResult::new();
        self.validate_storage_root_namaste(&mut storage_root_result);
        self.validate_storage_layout(&mut storage_root_result);

        let mut hierarchy_result = StorageValidationResult::new();
        let object_roots = self.discover_object_roots(&mut hierarchy_result)?;

        Ok(IncrementalValidatorImpl::new(
            self,
            fixity_check,
            storage_root_result,
            hierarchy_result,
            object_roots,
        ))
    }

    /// Instructs the validator to gracefully stop any in-flight work.
    pub fn close(&self) {}

    fn validate_storage_root_namaste(&self, result: &mut StorageValidationResult) {
        let mut bytes = Vec::new();
        match self.storage.read(REPO_NAMASTE_FILE, &mut bytes) {
            Ok(_) => match String::from_utf8(bytes) {
                Ok(contents) => {
                    if contents.trim_end() != OCFL_VERSION {
                        result.error(
                            ProblemLocation::StorageRoot,
                            ErrorCode::E080,
                            format!(
                                "OCFL root conformance declaration is invalid. Expected: {}",
                                OCFL_VERSION
                            ),
                        );
                    }
                }
                Err(_) => result.error(
                    ProblemLocation::StorageRoot,
                    ErrorCode::E080,
                    "OCFL root conformance declaration contains invalid UTF-8 content"
                        .to_string(),
                ),
            },
            Err(_) => result.error(
                ProblemLocation::StorageRoot,
                ErrorCode::E003,
                "OCFL storage root is missing its conformance declaration".to_string(),
            ),
        }
    }

    fn validate_storage_layout(&self, result: &mut StorageValidationResult) {
        let mut bytes = Vec::new();
        if self.storage.read(OCFL_LAYOUT_FILE, &mut bytes).is_err() {
            result.warn(
                ProblemLocation::StorageRoot,
                WarnCode::W005,
                "OCFL storage root does not contain an ocfl_layout.json file".to_string(),
            );
            return;
        }

        if serde_json::from_slice::<crate::ocfl::store::OcflLayout>(&bytes).is_err() {
            result.error(
                ProblemLocation::StorageRoot,
                ErrorCode::E070,
                "ocfl_layout.json is invalid".to_string(),
            );
        }
    }

    /// Walks the storage hierarchy breadth-first, descending into directories until it finds
    /// one containing an object NAMASTE file, at which point it stops and records it as an
    /// object root.
    fn discover_object_roots(&self, result: &mut StorageValidationResult) -> Result<Vec<String>> {
        let mut object_roots = Vec::new();
        let mut queue = std::collections::VecDeque::new();
        queue.push_back(String::new());

        while let Some(dir) = queue.pop_front() {
            let listing = self.storage.list(&dir, false)?;

            if listing.contains(&Listing::File(Cow::Borrowed(OBJECT_NAMASTE_FILE))) {
                object_roots.push(dir);
                continue;
            }

            let mut has_subdir = false;

            for entry in &listing {
                match entry {
                    Listing::Directory(name) => {
                        has_subdir = true;
                        queue.push_back(paths::join(&dir, name));
                    }
                    Listing::File(name) => {
                        if dir.is_empty() {
                            if name.as_ref() != REPO_NAMASTE_FILE
                                && name.as_ref() != OCFL_LAYOUT_FILE
                                && name.as_ref() != OCFL_SPEC_FILE
                            {
                                result.warn(
                                    ProblemLocation::StorageRoot,
                                    WarnCode::W002,
                                    format!("Unexpected file '{}' in OCFL storage root", name),
                                );
                            }
                        } else {
                            result.warn(
                                ProblemLocation::StorageHierarchy,
                                WarnCode::W002,
                                format!(
                                    "Unexpected file '{}' in OCFL storage hierarchy",
                                    paths::join(&dir, name)
                                ),
                            );
                        }
                    }
                    Listing::Other(name) => {
                        result.warn(
                            ProblemLocation::StorageHierarchy,
                            WarnCode::W002,
                            format!(
                                "Unexpected entry '{}' in OCFL storage hierarchy",
                                paths::join(&dir, name)
                            ),
                        );
                    }
                }
            }

            if !has_subdir && !dir.is_empty() {
                result.error(
                    ProblemLocation::StorageHierarchy,
                    ErrorCode::E073,
                    format!("Empty directory '{}' found in OCFL storage hierarchy", dir),
                );
            }
        }

        Ok(object_roots)
    }

    // TODO this should resolve the OCFL object version
    fn validate_object_namaste(&self, object_root: &str, result: &mut ObjectValidationResult) {
        // TODO only valid for 1.0
        let path = paths::join(object_root, OBJECT_NAMASTE_FILE);
        let mut bytes: Vec<u8> = Vec::new();
        if self.storage.read(&path, &mut bytes).is_err() {
            match String::from_utf8(bytes) {
                Ok(contents) => {
                    // TODO only valid for 1.0
                    if contents != OBJECT_NAMASTE_CONTENTS_1_0 {
                        result.error(
                            ErrorCode::E007,
                            format!(
                                "Object version declaration is invalid. Expected: {}; Found: {}",
                                OBJECT_NAMASTE_CONTENTS_1_0, contents
                            ),
                        );
                    }
                }
                Err(_) => {
                    result.error(
                        ErrorCode::E007,
                        "Object version declaration contains invalid UTF-8 content".to_string(),
                    );
                }
            }
        } else {
            result.error(
                ErrorCode::E003,
                "Object version declaration does not exist".to_string(),
            );
        }
    }

    fn validate_inventory(
        &self,
        inventory_path: &str,
        version: Option<VersionNum>,
        algorithms: &[DigestAlgorithm],
        result: &mut ObjectValidationResult,
    ) -> Result<(Option<Inventory>, Option<HexDigest>)> {
        let mut inventory = None;
        let mut digest = None;

        let mut writer = MultiDigestWriter::new(algorithms, Vec::new());

        fn version_str(version: Option<VersionNum>) -> String {
            match version {
                Some(version) => version.to_string(),
                None => "root".to_string(),
            }
        }

        self.storage.read(inventory_path, &mut writer)?;

        match serde_json::from_slice::<ParseResult>(writer.inner()) {
            Ok(parse_result) => match parse_result {
                ParseResult::Ok(parse_result, inv) => {
                    // TODO this is only valid for 1.0
                    if inv.type_declaration != INVENTORY_TYPE {
                        parse_result.error(
                            ErrorCode::E038,
                            format!(
                                "Inventory field 'type' must equal '{}'. Found: {}",
                                INVENTORY_TYPE, inv.type_declaration
                            ),
                        );
                    }

                    if let Some(version) = version {
                        if inv.head != version {
                            // TODO suspect code
                            parse_result.error(
                                ErrorCode::E040,
                                format!(
                                    "Inventory field 'head' must equal '{}'. Found: {}",
                                    version, inv.head
                                ),
                            );
                        }
                    }

                    let has_errors = parse_result.has_errors();

                    result.add_parse_result(&version_str(version), parse_result);

                    digest = writer.finalize_hex().remove(&inv.digest_algorithm);
                    if !has_errors {
                        inventory = Some(inv);
                    }
                }
                ParseResult::Error(parse_result) => {
                    result.add_parse_result(&version_str(version), parse_result)
                }
            },
            Err(_) => {
                result.error_version(
                    version_str(version),
                    ErrorCode::E033,
                    "Inventory could not be parsed".to_string(),
                );
            }
        }

        Ok((inventory, digest))
    }

    fn validate_sidecar(
        &self,
        sidecar_path: &str,
        version: &str,
        digest: &HexDigest,
        result: &mut ObjectValidationResult,
    ) -> Result<()> {
        let mut bytes = Vec::new();
        self.storage.read(sidecar_path, &mut bytes)?;
        match String::from_utf8(bytes) {
            Ok(contents) => {
                let parts: Vec<&str> = SIDECAR_SPLIT.split(&contents).collect();
                if parts.len() != 2 || parts[1].trim_end() != INVENTORY_FILE {
                    result.error_version(
                        version.to_string(),
                        ErrorCode::E061,
                        "Inventory sidecar is invalid".to_string(),
                    )
                } else {
                    let expected_digest = HexDigest::from(parts[0]);
                    if expected_digest != *digest {
                        result.error_version(
                            version.to_string(),
                            ErrorCode::E060,
                            format!(
                                "Inventory does not match expected digest. Expected: {}; Found: {}",
                                expected_digest, digest
                            ),
                        );
                    }
                }
            }
            Err(_) => result.error_version(
                version.to_string(),
                ErrorCode::E061,
                "Inventory sidecar is invalid".to_string(),
            ),
        }

        Ok(())
    }
}

// TODO move
impl ParseValidationResult {
    pub fn new() -> Self {
        Self {
            errors: RefCell::new(Vec::new()),
            warnings: RefCell::new(Vec::new()),
        }
    }

    pub fn error(&self, code: ErrorCode, message: String) {
        self.errors
            .borrow_mut()
            .push(ValidationError::new(code, message));
    }

    pub fn warn(&self, code: WarnCode, message: String) {
        self.warnings
            .borrow_mut()
            .push(ValidationWarning::new(code, message));
    }

    pub fn has_errors(&self) -> bool {
        self.errors.borrow().len() > 0
    }
}

pub fn validate_object_id(object_id: &str) -> Result<()> {
    if object_id.is_empty() {
        return Err(OcflError::OcflInput(
            "Object IDs may not be blank".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_digest_algorithm(digest_algorithm: DigestAlgorithm) -> Result<()> {
    if digest_algorithm != DigestAlgorithm::Sha512 && digest_algorithm != DigestAlgorithm::Sha256 {
        return Err(OcflError::OcflInput(format!(
            "The inventory digest algorithm must be sha512 or sha256. Found: {}",
            digest_algorithm
        )));
    }
    Ok(())
}

pub fn validate_content_dir(content_dir: &str) -> Result<()> {
    if content_dir.eq(".") || content_dir.eq("..") || content_dir.contains('/') {
        return Err(OcflError::OcflInput(format!(
            "The content directory cannot equal '.' or '..' and cannot contain a '/'. Found: {}",
            content_dir
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::ocfl::OcflError;
}
