use super::Record;
use crate::error::RecordParseError;

/// Turns one entry's raw bytes into a [`Record`]
///
/// Implementations must be shareable across worker threads. Any
/// `Fn(&[u8]) -> Result<Record, RecordParseError>` closure qualifies.
pub trait RecordParser: Send + Sync {
    fn parse(&self, bytes: &[u8]) -> Result<Record, RecordParseError>;
}

impl<F> RecordParser for F
where
    F: Fn(&[u8]) -> Result<Record, RecordParseError> + Send + Sync,
{
    fn parse(&self, bytes: &[u8]) -> Result<Record, RecordParseError> {
        self(bytes)
    }
}

/// Parser for the `<root><var/>..<objects><object/>..</objects></root>` layout
///
/// `var` elements are read from the direct children of the root element,
/// `object` elements from anywhere below it.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlRecordParser;

impl XmlRecordParser {
    pub fn new() -> Self {
        Self
    }
}

impl RecordParser for XmlRecordParser {
    fn parse(&self, bytes: &[u8]) -> Result<Record, RecordParseError> {
        let text = std::str::from_utf8(bytes)?;
        let doc = roxmltree::Document::parse(text)?;
        let root = doc.root_element();

        let mut id = None;
        let mut level = None;
        for var in root.children().filter(|n| n.has_tag_name("var")) {
            let value = var.attribute("value").unwrap_or_default();
            match var.attribute("name").unwrap_or_default() {
                "id" => id = Some(value.to_string()),
                "level" => level = Some(value.to_string()),
                _ => {}
            }
        }

        let objects = root
            .descendants()
            .filter(|n| n.has_tag_name("object"))
            .map(|n| n.attribute("name").unwrap_or_default().to_string())
            .collect();

        Ok(Record {
            id: id.ok_or(RecordParseError::MissingField("id"))?,
            level: level.ok_or(RecordParseError::MissingField("level"))?,
            objects,
        })
    }
}
