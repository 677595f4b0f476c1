//! Records extracted from archive entries

mod parser;

pub use parser::{RecordParser, XmlRecordParser};

/// One parsed archive entry
///
/// `id` and `level` are opaque tokens carried through to the output tables
/// unchanged. `objects` keeps document order and may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Record {
    pub id: String,
    pub level: String,
    pub objects: Vec<String>,
}

impl Record {
    pub fn new(id: impl Into<String>, level: impl Into<String>, objects: Vec<String>) -> Self {
        Self {
            id: id.into(),
            level: level.into(),
            objects,
        }
    }
}
