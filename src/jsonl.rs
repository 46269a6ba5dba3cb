use serde_json::Value;

use crate::document::image_stem;
use crate::error::Result;

/// One document of a JSON-lines export, keyed by its image stem.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonRecord {
    pub image_stem: String,
    pub document: Value,
}

impl JsonRecord {
    /// `<image_stem>.json`
    pub fn file_name(&self) -> String {
        format!("{}.json", self.image_stem)
    }
}

/// Split a JSON-lines export into per-image documents.
///
/// Blank lines are ignored. Lines without a non-empty string `image_id` are
/// skipped with a warning; a line that is not valid JSON fails the split.
pub fn split_json_lines(text: &str) -> Result<Vec<JsonRecord>> {
    let mut records = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let document: Value = serde_json::from_str(line)?;
        let image_id = match document.get("image_id").and_then(Value::as_str) {
            Some(id) if !id.is_empty() => id,
            _ => {
                log::warn!("Missing 'image_id' on line {}", line_no + 1);
                continue;
            }
        };

        records.push(JsonRecord {
            image_stem: image_stem(image_id).to_string(),
            document,
        });
    }

    Ok(records)
}
