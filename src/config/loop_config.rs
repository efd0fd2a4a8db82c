//! JSON configuration for a closed-loop run.

use crate::config::error::{ConfigError, SetupError};
use crate::core::{HyperRect, Precision, Quantizer, QuantizerError};
use crate::dynamics::RungeKutta4;
use crate::model::RegionMembership;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Grid of one space: the first and last grid points and the spacing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    pub first_symbol: Vec<f64>,
    pub last_symbol: Vec<f64>,
    pub quantizers: Vec<f64>,
}

impl GridConfig {
    fn validate(&self, section: &'static str) -> Validation<(), NonEmptyVec<ConfigError>> {
        let (first, last, quantizers) = (
            self.first_symbol.len(),
            self.last_symbol.len(),
            self.quantizers.len(),
        );
        if first != last || first != quantizers {
            return Validation::fail(ConfigError::DimensionMismatch {
                section,
                first,
                last,
                quantizers,
            });
        }
        if first == 0 {
            return Validation::fail(ConfigError::EmptyGrid { section });
        }

        let mut checks: Vec<Validation<(), NonEmptyVec<ConfigError>>> = Vec::new();
        for dim in 0..first {
            let (lb, ub, eta) = (self.first_symbol[dim], self.last_symbol[dim], self.quantizers[dim]);
            checks.push(if lb <= ub {
                Validation::success(())
            } else {
                Validation::fail(ConfigError::InvertedBounds {
                    section,
                    dim,
                    first: lb,
                    last: ub,
                })
            });
            checks.push(if eta > 0.0 && eta.is_finite() {
                Validation::success(())
            } else {
                Validation::fail(ConfigError::NonPositiveQuantizer {
                    section,
                    dim,
                    value: eta,
                })
            });
        }
        Validation::all_vec(checks).map(|_| ())
    }

    fn quantizer(&self, precision: Precision) -> Result<Quantizer, QuantizerError> {
        Quantizer::with_precision(
            self.first_symbol.clone(),
            self.quantizers.clone(),
            self.last_symbol.clone(),
            precision,
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DynamicsConfig {
    /// Control period in seconds
    pub step_time: f64,
    #[serde(default = "default_use_ode")]
    pub use_ode: bool,
    #[serde(default = "default_ode_substeps")]
    pub ode_substeps: usize,
}

/// Where a run starts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InitialState {
    Named(NamedInitialState),
    Explicit(Vec<f64>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamedInitialState {
    /// Center of the initial set
    Center,
    /// Uniform sample from the initial set
    Random,
}

impl Default for InitialState {
    fn default() -> Self {
        Self::Named(NamedInitialState::Center)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Hyperrectangle text such as `[0,1]x[0,1]`
    pub initial_set: String,
    #[serde(default)]
    pub initial_state: InitialState,
    /// Seed for a `"random"` initial state; fresh entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub path_tail_length: usize,
    #[serde(default)]
    pub warmup_ticks: u32,
    #[serde(default)]
    pub region_membership: RegionMembership,
}

/// Everything needed to set up a closed loop, apart from the plant model.
///
/// # Example
///
/// ```rust
/// use symloop::config::LoopConfig;
///
/// let config = LoopConfig::from_json_str(r#"{
///     "states":   { "first_symbol": [0, 0], "last_symbol": [3, 3], "quantizers": [1, 1] },
///     "controls": { "first_symbol": [-1], "last_symbol": [1], "quantizers": [1] },
///     "dynamics": { "step_time": 0.5 },
///     "simulation": { "initial_set": "[0,1]x[0,1]" },
///     "controller_file": "robot.mdf"
/// }"#).unwrap();
///
/// assert!(config.validate().is_success());
/// assert_eq!(config.initial_state().unwrap(), vec![0.5, 0.5]);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoopConfig {
    pub states: GridConfig,
    pub controls: GridConfig,
    pub dynamics: DynamicsConfig,
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub precision: Precision,
    pub controller_file: PathBuf,
    #[serde(default)]
    pub model_dump_file: Option<PathBuf>,
}

impl LoopConfig {
    pub fn from_json_str(text: &str) -> Result<Self, SetupError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read a JSON config. Relative controller and model paths are kept as
    /// written; they resolve against the working directory.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SetupError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check the whole config, accumulating ALL problems.
    pub fn validate(&self) -> Validation<(), NonEmptyVec<ConfigError>> {
        let mut checks: Vec<Validation<(), NonEmptyVec<ConfigError>>> = vec![
            self.states.validate("states"),
            self.controls.validate("controls"),
        ];

        let step_time = self.dynamics.step_time;
        checks.push(if step_time > 0.0 && step_time.is_finite() {
            Validation::success(())
        } else {
            Validation::fail(ConfigError::NonPositiveStepTime(step_time))
        });

        checks.push(if self.dynamics.ode_substeps >= 1 {
            Validation::success(())
        } else {
            Validation::fail(ConfigError::ZeroSubsteps)
        });

        checks.push(match self.initial_state() {
            Ok(_) => Validation::success(()),
            Err(e) => Validation::fail(e),
        });

        Validation::all_vec(checks).map(|_| ())
    }

    /// Like [`validate`](Self::validate) but as a `Result` for `?` callers.
    pub fn validated(&self) -> Result<(), SetupError> {
        match self.validate() {
            Validation::Success(()) => Ok(()),
            Validation::Failure(errors) => {
                Err(SetupError::Invalid(errors.iter().cloned().collect()))
            }
        }
    }

    pub fn state_quantizer(&self) -> Result<Quantizer, QuantizerError> {
        self.states.quantizer(self.precision)
    }

    pub fn control_quantizer(&self) -> Result<Quantizer, QuantizerError> {
        self.controls.quantizer(self.precision)
    }

    /// Resolve the starting state from `initial_state` and `initial_set`.
    pub fn initial_state(&self) -> Result<Vec<f64>, ConfigError> {
        let dim = self.states.first_symbol.len();
        let set = HyperRect::parse_with_dim(&self.simulation.initial_set, Some(dim))
            .map_err(ConfigError::InvalidInitialSet)?;
        match &self.simulation.initial_state {
            InitialState::Named(NamedInitialState::Center) => Ok(set.center()),
            InitialState::Named(NamedInitialState::Random) => {
                let mut rng = match self.simulation.seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_entropy(),
                };
                Ok(set.sample(&mut rng))
            }
            InitialState::Explicit(x) if x.len() != dim => {
                Err(ConfigError::InitialStateDimension {
                    expected: dim,
                    found: x.len(),
                })
            }
            InitialState::Explicit(x) => Ok(x.clone()),
        }
    }
}

fn default_use_ode() -> bool {
    true
}

fn default_ode_substeps() -> usize {
    RungeKutta4::DEFAULT_SUBSTEPS
}
