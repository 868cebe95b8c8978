//! Heat-map decoration for phylogenetic trees.
//!
//! Given a tree and per-taxon numeric scores ("heat"), this crate assigns
//! every leaf a score, aggregates scores up through internal nodes with a
//! pluggable selection/moderation rule, and maps the resulting values onto a
//! colour ramp and a derived branch width:
//!
//! - [`source`] ingests leaf heat from tabular rows or from branch
//!   confidence already on the tree,
//! - [`engine`] propagates heat leaf-to-root with memoized aggregates and
//!   writes colour annotations,
//! - [`width`] derives branch widths from hot-leaf counts,
//! - [`gradient`] holds the colour ramp and the running value range,
//! - [`arena`] is the index-addressed tree the passes operate on.
//!
//! Each run is one-shot over one tree: the heat store and engine are built
//! fresh per tree and discarded afterwards. [`HeatMap`] wires the passes
//! together for the common case.

pub mod arena;
pub mod engine;
pub mod errors;
pub mod gradient;
pub mod heat;
pub mod policy;
pub mod render;
pub mod source;
pub mod width;

pub use arena::{NodeData, TreeArena, TreeNode};
pub use engine::AggregationEngine;
pub use errors::{HeatError, HeatResult};
pub use gradient::{Gradient, Range, Rgb, GRADIENT_STEPS};
pub use heat::{HeatRecord, HeatStore, HotSet};
pub use policy::{Moderation, SelectionPolicy};
pub use render::ToTreeString;
pub use source::{ConfidenceSource, HeatRow, IngestReport, TableSource};
pub use width::WidthAnnotator;

use tracing::instrument;

/// Combined tally for a full ingest/colourize/width run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub accepted: u32,
    pub rejected: u32,
    pub coloured: usize,
    pub widened: usize,
}

/// One-shot façade over the three passes.
///
/// Owns the per-run heat store, so a `HeatMap` is consumed by its run and a
/// new one must be built for the next tree.
pub struct HeatMap {
    engine: AggregationEngine,
    annotator: WidthAnnotator,
    store: HeatStore,
}

impl HeatMap {
    pub fn new(
        gradient: Gradient,
        policy: SelectionPolicy,
        moderation: Moderation,
        rescale_widths: bool,
    ) -> Self {
        Self {
            engine: AggregationEngine::new(gradient, policy, moderation),
            annotator: if rescale_widths {
                WidthAnnotator::rescaled()
            } else {
                WidthAnnotator::new()
            },
            store: HeatStore::new(),
        }
    }

    /// Ingests tabular rows, colourizes, and annotates widths.
    #[instrument(level = "debug", skip(self, tree, rows))]
    pub fn run<I>(mut self, tree: &mut TreeArena, rows: I) -> RunReport
    where
        I: IntoIterator<Item = HeatRow>,
    {
        let ingest = TableSource::new().ingest(tree, rows, &mut self.store);
        self.finish(tree, ingest)
    }

    /// Like [`HeatMap::run`], but heat comes from branch confidence values
    /// already present on the tree.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn run_confidence(mut self, tree: &mut TreeArena) -> RunReport {
        let ingest = ConfidenceSource::new().ingest(tree, &mut self.store);
        self.finish(tree, ingest)
    }

    fn finish(mut self, tree: &mut TreeArena, ingest: IngestReport) -> RunReport {
        let coloured = self.engine.colourize(tree, &mut self.store);
        let hot = self.store.hot_set();
        let widened = self.annotator.annotate(tree, &hot);
        RunReport {
            accepted: ingest.accepted,
            rejected: ingest.rejected,
            coloured,
            widened,
        }
    }
}
