use crate::model::tree::Tree;
use crate::ops::list::list_items;

/// Default file name for an export
pub const EXPORT_FILE_NAME: &str = "100stars_list.csv";

pub const CSV_HEADER: [&str; 7] = [
    "title",
    "category",
    "priority",
    "completed",
    "notes",
    "createdAt",
    "updatedAt",
];

/// Error type for CSV export
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("could not encode CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("could not finish CSV output: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV output was not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Render every goal as CSV, unfiltered and in storage order.
///
/// Fields containing a comma, quote or line break are quoted with inner
/// quotes doubled. Rows end with `\n`.
pub fn export_csv(tree: &Tree) -> Result<String, ExportError> {
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(Vec::new());
    wtr.write_record(CSV_HEADER)?;

    for node in list_items(tree) {
        let category = tree.root_category_of(node);
        let priority = node.priority_clamped().to_string();
        let completed = if node.completed { "TRUE" } else { "FALSE" };
        wtr.write_record([
            node.title.as_str(),
            category.as_str(),
            priority.as_str(),
            completed,
            node.notes.as_str(),
            node.created_at.as_str(),
            node.updated_at.as_str(),
        ])?;
    }

    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}
