use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};

use super::model::{Aggregate, Dataset};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.json` – `{ "products": [...], "questions": [...], "categories": [...],
///   "businessStats": {...}, "aggregates": [...] }`
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "json" => load_json(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    log::debug!(
        "loaded {}: {} products, {} questions, {} aggregates",
        path.display(),
        dataset.products.len(),
        dataset.questions.len(),
        dataset.aggregates.len()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json(&text)
}

/// Parse a dataset from its JSON text.  Missing collections default to empty.
pub fn parse_json(text: &str) -> Result<Dataset> {
    serde_json::from_str(text).context("parsing dataset JSON")
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row naming the aggregate fields
/// `product_id,question_id,average,max,review_count,value,company_segment`.
/// Empty cells in the optional columns (`max`, `value`, `company_segment`)
/// become absent values.
pub fn load_aggregates_csv(path: &Path) -> Result<Vec<Aggregate>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening CSV {}", path.display()))?;
    read_aggregates_csv(file)
}

/// Read aggregate rows from any CSV source.
pub fn read_aggregates_csv<R: Read>(source: R) -> Result<Vec<Aggregate>> {
    let mut reader = csv::Reader::from_reader(source);
    let mut aggregates = Vec::new();

    for (row_no, result) in reader.deserialize::<Aggregate>().enumerate() {
        let aggregate = result.with_context(|| format!("CSV row {row_no}"))?;
        aggregates.push(aggregate);
    }

    Ok(aggregates)
}
