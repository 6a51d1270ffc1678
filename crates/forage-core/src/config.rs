use crate::genome::FitnessWeights;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a position is renormalized after a random step leaves the grid.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// Toroidal wraparound (`position mod dimension`).
    #[default]
    Wrap,
    /// Saturate at the first/last cell of each axis.
    Clamp,
}

/// How an agent's living/reproduction thresholds depend on its fitness.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdScaling {
    /// Base thresholds apply to every agent.
    #[default]
    Fixed,
    /// Base thresholds times `1 / fitness`.
    Reciprocal,
    /// Base thresholds times `100 / (fitness + 1)`.
    Shifted,
}

/// Survival and reproduction policy applied during cull and breed.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// Energy threshold plus a fitness-weighted stochastic draw.
    #[default]
    FitnessWeighted,
    /// Energy threshold only; no random draws.
    EnergyOnly,
}

/// Where an offspring's genome comes from.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OffspringGenome {
    /// Point-mutated copy of the parent's sequence.
    #[default]
    Mutated,
    /// Uniformly random sequence of the parent's length.
    Fresh,
}

/// Where agents stand when a day phase begins.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DayStart {
    /// Keep the position reached at the end of the previous day.
    #[default]
    InPlace,
    /// Move every agent to a uniformly chosen cell on a random grid edge.
    Edge,
}

/// How day and night substeps drain energy.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EnergyLoss {
    /// `energy_loss_per_day` / `energy_loss_per_night` split evenly over substeps.
    #[default]
    Spread,
    /// Each substep costs the agent its own living threshold.
    LivingThreshold,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    /// Deterministic seed for reproducible simulation runs.
    pub seed: u64,
    /// Grid width in cells.
    pub width: usize,
    /// Grid height in cells.
    pub height: usize,
    /// Number of agents created at simulation start.
    pub starting_population: usize,
    /// How many of the starting agents are hawks; the rest are doves.
    pub starting_hawks: usize,
    /// Upper bound on completed rounds.
    pub max_rounds: usize,
    /// Movement/foraging substeps per day phase.
    pub day_length: usize,
    /// Energy-loss substeps per night phase.
    pub night_length: usize,
    /// Food items scattered at the start of every round.
    pub food_spawn_rate: usize,
    /// Drop uneaten food at the end of each day phase.
    pub clear_food_each_day: bool,
    /// Out-of-bounds movement handling.
    pub boundary: BoundaryPolicy,
    pub day_start: DayStart,
    /// Energy of every new agent, including offspring.
    pub starting_energy: f64,
    /// Energy gained per food item eaten.
    pub energy_gain_from_food: f64,
    /// Base energy an agent must hold to survive the cull.
    pub energy_required_for_living: f64,
    /// Base energy an agent must hold to reproduce.
    pub energy_required_for_reproduction: f64,
    /// Fitness dependence of the two thresholds above.
    pub threshold_scaling: ThresholdScaling,
    /// Energy lost over a whole day phase, spread evenly across substeps.
    pub energy_loss_per_day: f64,
    /// Energy lost over a whole night phase, spread evenly across substeps.
    pub energy_loss_per_night: f64,
    pub energy_loss: EnergyLoss,
    /// Symbols per genome for randomly generated agents.
    pub genome_length: usize,
    /// Per-position probability of redrawing a symbol at birth.
    pub mutation_probability: f64,
    /// Per-symbol fitness contribution.
    pub fitness_weights: FitnessWeights,
    /// Scale `K` in `min(1, fitness * K / total_fitness)`.
    pub fitness_scale: f64,
    pub selection: SelectionMode,
    pub offspring_genome: OffspringGenome,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            width: 100,
            height: 100,
            starting_population: 50,
            starting_hawks: 0,
            max_rounds: 50,
            day_length: 15,
            night_length: 5,
            food_spawn_rate: 500,
            clear_food_each_day: true,
            boundary: BoundaryPolicy::Wrap,
            day_start: DayStart::InPlace,
            starting_energy: 150.0,
            energy_gain_from_food: 35.0,
            energy_required_for_living: 100.0,
            energy_required_for_reproduction: 200.0,
            threshold_scaling: ThresholdScaling::Fixed,
            energy_loss_per_day: 25.0,
            energy_loss_per_night: 10.0,
            energy_loss: EnergyLoss::Spread,
            genome_length: 4,
            mutation_probability: 0.1,
            fitness_weights: FitnessWeights::default(),
            fitness_scale: 20.0,
            selection: SelectionMode::FitnessWeighted,
            offspring_genome: OffspringGenome::Mutated,
        }
    }
}

#[derive(Debug, Error)]
pub enum SimConfigError {
    #[error("grid dimensions must be positive (got {width}x{height})")]
    InvalidGrid { width: usize, height: usize },
    #[error("genome_length must be positive")]
    EmptyGenome,
    #[error("{field} must be finite and non-negative (got {value})")]
    InvalidQuantity { field: &'static str, value: f64 },
    #[error("mutation_probability must be in [0, 1] (got {0})")]
    InvalidMutationProbability(f64),
    #[error("starting_hawks ({hawks}) exceeds starting_population ({population})")]
    TooManyHawks { hawks: usize, population: usize },
    #[error("starting_population ({actual}) exceeds supported maximum ({max})")]
    TooManyAgents { max: usize, actual: usize },
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

impl SimConfig {
    pub const MAX_POPULATION: usize = 1_000_000;

    /// Parse a (possibly partial) JSON config and validate it.
    pub fn from_json(json: &str) -> Result<Self, SimConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SimConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(SimConfigError::InvalidGrid {
                width: self.width,
                height: self.height,
            });
        }
        if self.genome_length == 0 {
            return Err(SimConfigError::EmptyGenome);
        }
        let quantities = [
            ("starting_energy", self.starting_energy),
            ("energy_gain_from_food", self.energy_gain_from_food),
            ("energy_required_for_living", self.energy_required_for_living),
            (
                "energy_required_for_reproduction",
                self.energy_required_for_reproduction,
            ),
            ("energy_loss_per_day", self.energy_loss_per_day),
            ("energy_loss_per_night", self.energy_loss_per_night),
            ("fitness_scale", self.fitness_scale),
        ];
        for (field, value) in quantities {
            if !value.is_finite() || value < 0.0 {
                return Err(SimConfigError::InvalidQuantity { field, value });
            }
        }
        if !(0.0..=1.0).contains(&self.mutation_probability) {
            return Err(SimConfigError::InvalidMutationProbability(
                self.mutation_probability,
            ));
        }
        if self.starting_hawks > self.starting_population {
            return Err(SimConfigError::TooManyHawks {
                hawks: self.starting_hawks,
                population: self.starting_population,
            });
        }
        if self.starting_population > Self::MAX_POPULATION {
            return Err(SimConfigError::TooManyAgents {
                max: Self::MAX_POPULATION,
                actual: self.starting_population,
            });
        }
        Ok(())
    }

    /// Energy removed from each agent per day substep.
    pub fn day_loss_per_substep(&self) -> f64 {
        if self.day_length == 0 {
            0.0
        } else {
            self.energy_loss_per_day / self.day_length as f64
        }
    }

    /// Energy removed from each agent per night substep.
    pub fn night_loss_per_substep(&self) -> f64 {
        if self.night_length == 0 {
            0.0
        } else {
            self.energy_loss_per_night / self.night_length as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        SimConfig::default().validate().expect("default config");
    }

    #[test]
    fn partial_config_json_fills_defaults() {
        let json = r#"{
            "seed": 7,
            "width": 10,
            "height": 12,
            "boundary": "clamp",
            "selection": "energy_only",
            "day_start": "edge",
            "energy_loss": "living_threshold"
        }"#;
        let cfg = SimConfig::from_json(json).expect("partial config should parse");
        assert_eq!(cfg.seed, 7);
        assert_eq!((cfg.width, cfg.height), (10, 12));
        assert_eq!(cfg.boundary, BoundaryPolicy::Clamp);
        assert_eq!(cfg.selection, SelectionMode::EnergyOnly);
        assert_eq!(cfg.day_start, DayStart::Edge);
        assert_eq!(cfg.energy_loss, EnergyLoss::LivingThreshold);
        assert_eq!(cfg.genome_length, 4);
        assert_eq!(cfg.fitness_scale, 20.0);
    }

    #[test]
    fn rejects_zero_grid_dimension() {
        let cfg = SimConfig {
            height: 0,
            ..SimConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(SimConfigError::InvalidGrid {
                width: 100,
                height: 0
            })
        ));
    }

    #[test]
    fn rejects_empty_genome_and_negative_quantities() {
        let cfg = SimConfig {
            genome_length: 0,
            ..SimConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(SimConfigError::EmptyGenome)));

        let cfg = SimConfig {
            energy_loss_per_night: -1.0,
            ..SimConfig::default()
        };
        match cfg.validate() {
            Err(SimConfigError::InvalidQuantity { field, .. }) => {
                assert_eq!(field, "energy_loss_per_night")
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let cfg = SimConfig {
            fitness_scale: f64::NAN,
            ..SimConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_mutation_probability() {
        let cfg = SimConfig {
            mutation_probability: 1.5,
            ..SimConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(SimConfigError::InvalidMutationProbability(_))
        ));
    }

    #[test]
    fn rejects_more_hawks_than_agents() {
        let cfg = SimConfig {
            starting_population: 3,
            starting_hawks: 4,
            ..SimConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(SimConfigError::TooManyHawks { .. })
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            SimConfig::from_json("{ \"width\": -3 }"),
            Err(SimConfigError::Parse(_))
        ));
    }

    #[test]
    fn zero_length_phases_lose_nothing() {
        let cfg = SimConfig {
            day_length: 0,
            night_length: 4,
            energy_loss_per_night: 10.0,
            ..SimConfig::default()
        };
        assert_eq!(cfg.day_loss_per_substep(), 0.0);
        assert_eq!(cfg.night_loss_per_substep(), 2.5);
    }
}
