use std::path::PathBuf;
use std::time::Instant;

use tracing::{debug, info};

use crate::budget::{select_within_budget, BYTES_PER_TOKEN};
use crate::config::ExtractConfig;
use crate::corpus;
use crate::errors::Result;
use crate::graph::{FocusTracer, SymbolGraph};
use crate::types::ProjectContext;
use crate::workers;

/// Orchestrates the extraction pipeline: corpus scan, parallel unit
/// extraction, graph build, focus tracing, and budget selection.
///
/// The phases after extraction run strictly in sequence on a complete view
/// of their predecessor's output; the tracer never observes a partial graph.
pub struct ContextExtractor {
    cfg: ExtractConfig,
}

impl ContextExtractor {
    pub fn new(mut cfg: ExtractConfig) -> Self {
        cfg.normalize();
        Self { cfg }
    }

    pub fn config(&self) -> &ExtractConfig {
        &self.cfg
    }

    /// Runs the full pipeline and returns the assembled context.
    pub async fn extract(&self) -> Result<ProjectContext> {
        let start = Instant::now();
        let root = self.project_root();

        let scan = corpus::scan(&root, &self.cfg)?;
        debug!(files = scan.files.len(), "corpus scan complete");

        let mut units = workers::extract_units(&root, scan.files, &self.cfg).await;

        // The graph feeds only the tracer, so skip the build entirely when
        // tracing is disabled. Both run single-threaded after the worker
        // barrier.
        if !self.cfg.focus.is_empty() {
            let graph = SymbolGraph::build(&units);
            debug!(declarations = graph.declaration_count(), "symbol graph built");
            FocusTracer::new(&graph).trace(&self.cfg.focus, self.cfg.depth, &mut units);
        }

        let total_size: u64 = units.iter().map(|u| u.size).sum();
        let mut ctx = ProjectContext {
            project_path: root.to_string_lossy().to_string(),
            tree_structure: scan.tree_structure,
            total_files: units.len(),
            total_size,
            estimated_tokens: 0,
            truncated: false,
            files: units,
        };
        ctx.estimated_tokens = estimate_tokens(&ctx);

        if self.cfg.max_tokens > 0 && ctx.estimated_tokens > self.cfg.max_tokens {
            let selection = select_within_budget(std::mem::take(&mut ctx.files), self.cfg.max_tokens);
            ctx.total_files = selection.units.len();
            ctx.total_size = selection.total_size;
            ctx.truncated = selection.truncated;
            ctx.files = selection.units;
            ctx.estimated_tokens = estimate_tokens(&ctx);
        }

        info!(
            files = ctx.total_files,
            tokens = ctx.estimated_tokens,
            truncated = ctx.truncated,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "extraction complete"
        );
        Ok(ctx)
    }

    fn project_root(&self) -> PathBuf {
        std::fs::canonicalize(&self.cfg.path).unwrap_or_else(|_| self.cfg.path.clone())
    }
}

/// Rough token estimate over the whole context: the tree listing plus each
/// unit's path, content, and summary name lists, at four characters per
/// token.
pub fn estimate_tokens(ctx: &ProjectContext) -> usize {
    let mut chars = ctx.tree_structure.len();
    for unit in &ctx.files {
        chars += unit.path.len() + unit.content.len();
        if let Some(summary) = &unit.summary {
            chars += summary.functions.join(",").len() + summary.structs.join(",").len();
        }
    }
    chars / BYTES_PER_TOKEN
}
