//! Short, human-authored descriptions of the OCFL spec version and storage-layout
//! extensions this crate understands. These are not mirrors of the published spec
//! text -- just enough prose for `ocfl_layout.json` and validator messages.

pub const OCFL_VERSION: &str = "1.0";

pub const EXT_0002_DESC: &str =
    "Flat Direct Storage Layout: the object root directory name is the object ID, \
     percent-encoded where necessary to be filesystem-safe.";

pub const EXT_0003_DESC: &str =
    "Hashed Truncated N-tuple Trees with Object ID Encapsulating Directories: object \
     roots are nested under tuples of leading digest characters, with a final \
     directory named after the encoded object ID.";

pub const EXT_0004_DESC: &str =
    "Hashed Truncated N-tuple Trees: object roots are nested under tuples of leading \
     digest characters, with the final directory named for the remainder of the digest.";

pub const EXT_0006_DESC: &str =
    "Flat Omit Prefix Storage Layout: the object root directory name is the object ID \
     with a configured prefix delimiter and everything before it removed.";

pub const EXT_0007_DESC: &str =
    "N-tuple Omit Prefix Storage Layout: object roots are nested under tuples of \
     leading digest characters, with the final directory named for the object ID \
     after a configured prefix delimiter is stripped.";
