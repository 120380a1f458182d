//! Scenario runner for batch simulations
//!
//! Holds a base configuration loaded once, then runs variants of it without
//! re-reading any file. Independent simulations run in parallel.

use std::path::Path;

use rayon::prelude::*;

use crate::error::EngineError;
use crate::simulation::{Simulation, SimulationConfig};
use crate::smoothing::SmoothingMode;

/// Pre-loaded scenario runner
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::from_loans_csv("loans.csv")?;
///
/// // Same loans under every smoothing choice
/// let results = runner.run_scenarios(&[None, Some(SmoothingMode::ConstantDuration)]);
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    base: SimulationConfig,
}

impl ScenarioRunner {
    pub fn new(base: SimulationConfig) -> Self {
        Self { base }
    }

    /// Create runner from a JSON configuration file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, EngineError> {
        Ok(Self::new(SimulationConfig::from_json_file(path)?))
    }

    /// Create runner from a loans CSV file
    pub fn from_loans_csv<P: AsRef<Path>>(path: P) -> Result<Self, EngineError> {
        Ok(Self::new(SimulationConfig::from_loans_csv(path)?))
    }

    /// Run the base configuration
    pub fn run(&self) -> Simulation {
        Simulation::run(&self.base)
    }

    /// Run unrelated configurations in parallel, results in input order
    pub fn run_batch(&self, configs: &[SimulationConfig]) -> Vec<Simulation> {
        configs.par_iter().map(Simulation::run).collect()
    }

    /// Run the base loans under several smoothing choices
    pub fn run_scenarios(&self, modes: &[Option<SmoothingMode>]) -> Vec<Simulation> {
        let configs: Vec<SimulationConfig> = modes
            .iter()
            .map(|&mode| SimulationConfig {
                smoothing: mode,
                ..self.base.clone()
            })
            .collect();
        self.run_batch(&configs)
    }

    /// Run the base configuration once per primary annual rate (in %)
    pub fn run_rate_sweep(&self, rates_pct: &[f64]) -> Vec<Simulation> {
        let configs: Vec<SimulationConfig> = rates_pct
            .iter()
            .map(|&rate| {
                let mut config = self.base.clone();
                config.primary.annual_rate_pct = rate;
                config
            })
            .collect();
        self.run_batch(&configs)
    }

    /// Get reference to the base configuration
    pub fn base(&self) -> &SimulationConfig {
        &self.base
    }

    /// Get mutable reference to the base configuration for customization
    pub fn base_mut(&mut self) -> &mut SimulationConfig {
        &mut self.base
    }
}
