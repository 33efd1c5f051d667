//! Assigner entry points

use crate::cancel::{CancelToken, SearchLimits};
use crate::config::{AssignMode, AssignerConfig, ConfigError};
use crate::context::MappingContext;
use crate::failure::AssignmentFailure;
use crate::genetic::GeneticCircuit;
use crate::target::TargetPolicy;
use crate::{normal, strict};
use genmap_catalog::GateCatalog;
use genmap_logic::LogicCircuit;
use rayon::prelude::*;
use std::time::Instant;
use tracing::{info, warn};

/// Bind every node of `circuit` to a catalog part with the default settings
/// of `mode`
pub fn assign(
    circuit: &LogicCircuit,
    catalog: &GateCatalog,
    mode: AssignMode,
) -> Result<GeneticCircuit, AssignmentFailure> {
    Assigner::with_config(catalog, AssignerConfig::for_mode(mode)).assign(circuit)
}

/// Technology mapper over one shared catalog
pub struct Assigner<'c> {
    catalog: &'c GateCatalog,
    config: AssignerConfig,
    policy: Option<Box<dyn TargetPolicy>>,
    cancel: CancelToken,
}

impl<'c> Assigner<'c> {
    pub fn new(catalog: &'c GateCatalog, config: AssignerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_config(catalog, config))
    }

    fn with_config(catalog: &'c GateCatalog, config: AssignerConfig) -> Self {
        Self {
            catalog,
            config,
            policy: None,
            cancel: CancelToken::new(),
        }
    }

    /// Replace the ideal-gate target policy
    pub fn with_policy(mut self, policy: impl TargetPolicy + 'static) -> Self {
        self.policy = Some(Box::new(policy));
        self
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn config(&self) -> &AssignerConfig {
        &self.config
    }

    pub fn catalog(&self) -> &GateCatalog {
        self.catalog
    }

    /// Token that cancels assignments started by this assigner
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn assign(&self, circuit: &LogicCircuit) -> Result<GeneticCircuit, AssignmentFailure> {
        let start = Instant::now();
        let policy: &dyn TargetPolicy = match &self.policy {
            Some(policy) => &**policy,
            None => &self.config.ideal,
        };
        let limits = SearchLimits::new(
            self.config.max_search_nodes,
            self.config.deadline_ms,
            self.cancel.clone(),
        );

        info!(
            "Assigning '{}' ({} gates) onto '{}' in {} mode",
            circuit.name(),
            circuit.gate_count(),
            self.catalog.name(),
            self.config.mode
        );

        let result = MappingContext::prepare(circuit, self.catalog, &self.config, policy, limits)
            .and_then(|ctx| {
                let partial = match ctx.mode {
                    AssignMode::Normal => normal::run(&ctx)?,
                    AssignMode::Strict => strict::run(&ctx)?,
                };
                Ok(ctx.finalize(&partial))
            });

        match &result {
            Ok(genetic) => info!(
                "Assigned '{}' with bottleneck {:.4} in {:?}",
                circuit.name(),
                genetic.bottleneck(),
                start.elapsed()
            ),
            Err(failure) => warn!("{}", failure),
        }
        result
    }

    /// Assign independent circuits in parallel. Results keep input order.
    pub fn assign_all(
        &self,
        circuits: &[LogicCircuit],
    ) -> Vec<Result<GeneticCircuit, AssignmentFailure>> {
        circuits.par_iter().map(|c| self.assign(c)).collect()
    }
}
