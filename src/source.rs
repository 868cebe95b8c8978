use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use regex::Regex;
use tracing::{debug, instrument};

use crate::arena::TreeArena;
use crate::errors::HeatResult;
use crate::gradient::Rgb;
use crate::heat::{HeatRecord, HeatStore};

/// Accept/reject tally for one ingestion pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestReport {
    pub accepted: u32,
    pub rejected: u32,
}

/// One raw row from a tabular heat source, fields still unparsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeatRow {
    pub taxon: String,
    pub value: String,
    pub colour: Option<String>,
}

impl HeatRow {
    pub fn new(taxon: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            taxon: taxon.into(),
            value: value.into(),
            colour: None,
        }
    }

    pub fn with_colour(mut self, colour: impl Into<String>) -> Self {
        self.colour = Some(colour.into());
        self
    }
}

/// Ingests heat values from tabular rows of `(taxon, value, optional colour)`.
///
/// A bad row is rejected and counted, never fatal: ingestion always runs to
/// the end of its input. Leaves that never receive a row simply stay out of
/// the aggregation, they are not defaulted to heat 0.
pub struct TableSource {
    colour_regex: Regex,
}

impl Default for TableSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TableSource {
    pub fn new() -> Self {
        Self {
            colour_regex: Regex::new(r"^#?([0-9A-Fa-f]{6})$").unwrap(),
        }
    }

    #[instrument(level = "debug", skip(self, tree, rows, store))]
    pub fn ingest<I>(&self, tree: &TreeArena, rows: I, store: &mut HeatStore) -> IngestReport
    where
        I: IntoIterator<Item = HeatRow>,
    {
        let mut report = IngestReport::default();
        for row in rows {
            if self.try_accept(tree, &row, store) {
                report.accepted += 1;
            } else {
                debug!(taxon = %row.taxon, value = %row.value, "heat row rejected");
                report.rejected += 1;
            }
        }
        debug!(accepted = report.accepted, rejected = report.rejected, "table ingestion done");
        report
    }

    /// Reads a tab-separated heat table (`taxon<TAB>value[<TAB>colour]`).
    ///
    /// Blank lines and `#` comment lines are skipped without being counted.
    #[instrument(level = "debug", skip(self, tree, store))]
    pub fn ingest_file(
        &self,
        tree: &TreeArena,
        path: &Path,
        store: &mut HeatStore,
    ) -> HeatResult<IngestReport> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let mut rows = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if let Some(row) = Self::parse_line(&line) {
                rows.push(row);
            }
        }
        Ok(self.ingest(tree, rows, store))
    }

    /// Splits one table line into a raw row, or None for blank/comment lines.
    pub fn parse_line(line: &str) -> Option<HeatRow> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return None;
        }
        let mut fields = trimmed.splitn(3, '\t');
        let taxon = fields.next().unwrap_or("").trim().to_string();
        let value = fields.next().unwrap_or("").trim().to_string();
        let colour = fields
            .next()
            .map(|field| field.trim().to_string())
            .filter(|field| !field.is_empty());
        Some(HeatRow {
            taxon,
            value,
            colour,
        })
    }

    pub fn parse_colour(&self, token: &str) -> Option<Rgb> {
        let caps = self.colour_regex.captures(token.trim())?;
        Rgb::from_hex(caps.get(1)?.as_str())
    }

    fn try_accept(&self, tree: &TreeArena, row: &HeatRow, store: &mut HeatStore) -> bool {
        let Some(leaf) = tree.find_leaf(&row.taxon) else {
            return false;
        };
        let Ok(value) = row.value.trim().parse::<f64>() else {
            return false;
        };
        if !value.is_finite() {
            return false;
        }
        let colour = match &row.colour {
            Some(token) => match self.parse_colour(token) {
                Some(colour) => Some(colour),
                None => return false,
            },
            None => None,
        };
        store.insert_leaf(HeatRecord {
            node: leaf,
            value,
            colour,
        })
    }
}

/// Ingests the branch confidence already present on the tree as leaf heat.
///
/// Same accept/reject contract as the tabular source: a leaf without a
/// confidence value is rejected and counted.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfidenceSource;

impl ConfidenceSource {
    pub fn new() -> Self {
        Self
    }

    #[instrument(level = "debug", skip(self, tree, store))]
    pub fn ingest(&self, tree: &TreeArena, store: &mut HeatStore) -> IngestReport {
        let mut report = IngestReport::default();
        for leaf in tree.leaves() {
            let confidence = tree.get_node(leaf).and_then(|node| node.data.confidence);
            match confidence {
                Some(value) if value.is_finite() => {
                    if store.insert_leaf(HeatRecord {
                        node: leaf,
                        value,
                        colour: None,
                    }) {
                        report.accepted += 1;
                    } else {
                        report.rejected += 1;
                    }
                }
                _ => report.rejected += 1,
            }
        }
        debug!(accepted = report.accepted, rejected = report.rejected, "confidence ingestion done");
        report
    }
}
