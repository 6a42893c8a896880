//! Readers for differential-expression tables and marker-gene lists

use crate::error::AnnotatorError;
use celltyper_domain::{DifferentialRow, GeneList};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;
use std::io::Read;
use std::path::Path;

/// Columns a differential-expression table must carry
pub const REQUIRED_COLUMNS: [&str; 4] = ["gene", "cluster", "avg_log2FC", "p_val_adj"];

#[derive(Debug, Deserialize)]
struct TableRecord {
    gene: String,
    cluster: String,
    #[serde(rename = "avg_log2FC")]
    avg_log2fc: String,
    p_val_adj: String,
}

/// Pick a delimiter from the file extension: tab for `.tsv`/`.txt`,
/// comma otherwise
pub fn delimiter_for_path(path: &Path) -> u8 {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") || ext.eq_ignore_ascii_case("txt") => b'\t',
        _ => b',',
    }
}

/// Read a differential-expression table with a header row
///
/// Extra columns are ignored. `NA` or empty numeric cells become NaN and
/// are therefore filtered out as non-markers.
///
/// # Errors
///
/// - `MissingColumns` if any of [`REQUIRED_COLUMNS`] is absent
/// - `InvalidInput` if a numeric cell cannot be parsed
/// - `Csv` for malformed CSV
pub fn read_differential_table<R: Read>(
    reader: R,
    delimiter: u8,
) -> Result<Vec<DifferentialRow>, AnnotatorError> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(AnnotatorError::MissingColumns(missing));
    }

    rdr.deserialize()
        .enumerate()
        .map(|(i, record)| -> Result<DifferentialRow, AnnotatorError> {
            let record: TableRecord = record?;
            // Header is line 1
            let line = i + 2;
            Ok(DifferentialRow {
                avg_log2fc: parse_number(&record.avg_log2fc, "avg_log2FC", line)?,
                p_val_adj: parse_number(&record.p_val_adj, "p_val_adj", line)?,
                gene: record.gene,
                cluster: record.cluster,
            })
        })
        .collect()
}

fn parse_number(cell: &str, column: &str, line: usize) -> Result<f64, AnnotatorError> {
    if cell.is_empty() || cell.eq_ignore_ascii_case("NA") || cell.eq_ignore_ascii_case("NaN") {
        return Ok(f64::NAN);
    }
    cell.parse().map_err(|_| {
        AnnotatorError::InvalidInput(format!(
            "line {}: {} value '{}' is not a number",
            line, column, cell
        ))
    })
}

/// Object entries in document order, repeated keys included
struct NamedEntries(Vec<(String, Value)>);

impl<'de> Deserialize<'de> for NamedEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = NamedEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping group names to gene lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, Value>()? {
                    entries.push(entry);
                }
                Ok(NamedEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// Read marker-gene lists from JSON
///
/// Accepted shapes, group order preserved:
///
/// - object: `{"T": ["CD3E", "CD4"], "B": "CD19,MS4A1"}`
/// - array of arrays: `[["CD3E", "CD4"], ["CD19"]]` (ids are positions)
/// - array of objects: `[{"name": "T", "genes": ["CD3E"]}]`
///
/// A name repeated in the object shape yields two lists, so the duplicate
/// is rejected when signatures are extracted.
pub fn read_gene_lists(json: &str) -> Result<Vec<GeneList>, AnnotatorError> {
    if json.trim_start().starts_with('{') {
        let NamedEntries(entries) = serde_json::from_str(json)?;
        return entries
            .into_iter()
            .map(|(name, genes)| -> Result<GeneList, AnnotatorError> {
                Ok(GeneList::new(name, parse_genes(&genes)?))
            })
            .collect();
    }

    let value: Value = serde_json::from_str(json)?;

    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| -> Result<GeneList, AnnotatorError> {
                match item {
                    Value::Object(obj) => {
                        let name = obj.get("name").and_then(Value::as_str).unwrap_or_default();
                        let genes = obj.get("genes").ok_or_else(|| {
                            AnnotatorError::InvalidInput(
                                "gene list object lacks 'genes'".to_string(),
                            )
                        })?;
                        Ok(GeneList::new(name, parse_genes(genes)?))
                    }
                    other => Ok(GeneList::unnamed(parse_genes(other)?)),
                }
            })
            .collect(),
        _ => Err(AnnotatorError::InvalidInput(
            "Expected a JSON object or array of gene lists".to_string(),
        )),
    }
}

fn parse_genes(value: &Value) -> Result<Vec<String>, AnnotatorError> {
    match value {
        Value::Array(genes) => genes
            .iter()
            .map(|g| {
                g.as_str().map(str::to_string).ok_or_else(|| {
                    AnnotatorError::InvalidInput(format!("gene name must be a string, got {}", g))
                })
            })
            .collect(),
        Value::String(joined) => Ok(joined.split(',').map(|g| g.trim().to_string()).collect()),
        other => Err(AnnotatorError::InvalidInput(format!(
            "gene list must be an array or comma-separated string, got {}",
            other
        ))),
    }
}
