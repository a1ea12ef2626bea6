//! Main Sift struct and public API.

use std::path::Path;

use crate::dataset::Dataset;
use crate::edit::{EditLedger, Ledger};
use crate::error::{Result, SiftError};
use crate::filter::{FilterEngine, View};
use crate::input::{DataTable, Parser, ParserConfig, SourceMetadata};
use crate::predicate::{Predicate, PredicateBuilder, PredicateParams, PredicateShape};
use crate::profile::{ProfileConfig, TypeProfiler};
use crate::reconcile::{ConflictReport, ReconciliationEngine};

/// Configuration for a Sift session.
#[derive(Debug, Clone, Default)]
pub struct SiftConfig {
    /// Parser configuration.
    pub parser: ParserConfig,
    /// Column profiling configuration.
    pub profile: ProfileConfig,
    /// Accept range bounds outside a column's observed range.
    pub allow_out_of_range: bool,
}

impl SiftConfig {
    /// Set the parser configuration.
    pub fn with_parser(mut self, parser: ParserConfig) -> Self {
        self.parser = parser;
        self
    }

    /// Set the profiling configuration.
    pub fn with_profile(mut self, profile: ProfileConfig) -> Self {
        self.profile = profile;
        self
    }

    /// Allow range predicates outside the observed range.
    pub fn with_out_of_range(mut self, allow: bool) -> Self {
        self.allow_out_of_range = allow;
        self
    }
}

/// The main entry point: load, filter, edit, reconcile.
///
/// `Sift` holds no dataset state of its own. Callers keep the [`Dataset`]
/// between cycles and pass it back in, or wrap it in a
/// [`SharedDataset`](crate::SharedDataset) when it is read from several threads.
pub struct Sift {
    config: SiftConfig,
    parser: Parser,
    profiler: TypeProfiler,
    predicates: PredicateBuilder,
    filter: FilterEngine,
    reconciler: ReconciliationEngine,
}

impl Sift {
    /// Create a new Sift instance with default configuration.
    pub fn new() -> Self {
        Self::with_config(SiftConfig::default())
    }

    /// Create a Sift instance with custom configuration.
    pub fn with_config(config: SiftConfig) -> Self {
        let parser = Parser::with_config(config.parser.clone());
        let profiler = TypeProfiler::with_config(config.profile.clone());
        let predicates = PredicateBuilder::new().allow_out_of_range(config.allow_out_of_range);

        Self {
            config,
            parser,
            profiler,
            predicates,
            filter: FilterEngine::new(),
            reconciler: ReconciliationEngine::new(),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &SiftConfig {
        &self.config
    }

    /// Load a delimited file and profile its columns.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<(Dataset, SourceMetadata)> {
        let (table, source) = self.parser.parse_file(path)?;
        let dataset = self.profile_table(&table)?;

        tracing::info!(
            file = %source.file,
            rows = dataset.len(),
            columns = dataset.schema().len(),
            "loaded dataset"
        );

        Ok((dataset, source))
    }

    /// Profile an already parsed table.
    pub fn profile_table(&self, table: &DataTable) -> Result<Dataset> {
        Dataset::from_table(table, &self.profiler)
    }

    /// Predicate shapes legal for a column.
    pub fn legal_shapes(&self, dataset: &Dataset, column: &str) -> Result<Vec<PredicateShape>> {
        let profile = dataset
            .schema()
            .profile(column)
            .ok_or_else(|| SiftError::UnknownColumn(column.to_string()))?;
        Ok(PredicateBuilder::legal_shapes(profile))
    }

    /// Build a validated predicate against a column of `dataset`.
    pub fn build_predicate(
        &self,
        dataset: &Dataset,
        column: &str,
        shape: PredicateShape,
        params: PredicateParams,
    ) -> Result<Predicate> {
        let profile = dataset
            .schema()
            .profile(column)
            .ok_or_else(|| SiftError::UnknownColumn(column.to_string()))?;
        self.predicates.build(column, profile, shape, params)
    }

    /// Derive a view.
    pub fn filter(&self, dataset: &Dataset, predicates: &[Predicate]) -> Result<View> {
        self.filter.apply(dataset, predicates)
    }

    /// Open an edit ledger over a view.
    pub fn ledger(&self, view: &View) -> EditLedger {
        EditLedger::new(view)
    }

    /// Reconcile a finalized ledger, returning the updated dataset.
    pub fn reconcile(&self, dataset: &Dataset, ledger: Ledger) -> Result<(Dataset, ConflictReport)> {
        self.reconciler.reconcile(dataset, ledger)
    }
}

impl Default for Sift {
    fn default() -> Self {
        Self::new()
    }
}
