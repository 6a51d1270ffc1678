use crate::config::{BoundaryPolicy, SimConfig, ThresholdScaling};
use crate::environment::{Cell, Environment};
use crate::genome::Genome;
use rand::Rng;

const SHIFTED_FITNESS_NUMERATOR: f64 = 100.0;

/// Subgroup tag. Kinds forage identically; they are tracked separately in
/// round records and fight differently in the pairwise contest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AgentKind {
    Hawk,
    Dove,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AgentStatus {
    #[default]
    Active,
    /// Reserved; no phase currently puts an agent to rest.
    Resting,
}

/// Energy levels an agent must hold to survive the cull and to breed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Thresholds {
    pub living: f64,
    pub reproduction: f64,
}

impl Thresholds {
    pub fn for_fitness(fitness: u32, config: &SimConfig) -> Self {
        let factor = match config.threshold_scaling {
            ThresholdScaling::Fixed => 1.0,
            ThresholdScaling::Reciprocal if fitness == 0 => 1.0,
            ThresholdScaling::Reciprocal => 1.0 / fitness as f64,
            ThresholdScaling::Shifted => SHIFTED_FITNESS_NUMERATOR / (fitness as f64 + 1.0),
        };
        Self {
            living: config.energy_required_for_living * factor,
            reproduction: config.energy_required_for_reproduction * factor,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Agent {
    pub id: u64,
    pub kind: AgentKind,
    pub position: Cell,
    /// May go negative between the night phase and the cull.
    pub energy: f64,
    pub status: AgentStatus,
    pub generation: u32,
    genome: Genome,
    thresholds: Thresholds,
}

impl Agent {
    pub fn new(
        id: u64,
        kind: AgentKind,
        position: Cell,
        genome: Genome,
        config: &SimConfig,
    ) -> Self {
        let thresholds = Thresholds::for_fitness(genome.fitness(), config);
        Self {
            id,
            kind,
            position,
            energy: config.starting_energy,
            status: AgentStatus::Active,
            generation: 0,
            genome,
            thresholds,
        }
    }

    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    pub fn fitness(&self) -> u32 {
        self.genome.fitness()
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Random step of -1/0/+1 on each axis, renormalized onto the grid.
    pub fn wander<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        environment: &Environment,
        policy: BoundaryPolicy,
    ) {
        let dx = rng.random_range(-1i32..=1) as isize;
        let dy = rng.random_range(-1i32..=1) as isize;
        self.position = environment.step_cell(self.position, [dx, dy], policy);
    }

    /// Eat one food item at the current cell, if there is one.
    pub fn eat(&mut self, environment: &mut Environment, gain: f64) -> bool {
        let ate = environment.consume(self.position);
        if ate {
            self.energy += gain;
        }
        ate
    }

    pub fn lose_energy(&mut self, amount: f64) {
        self.energy -= amount;
    }

    pub fn has_living_energy(&self) -> bool {
        self.energy >= self.thresholds.living
    }

    pub fn has_breeding_energy(&self) -> bool {
        self.energy >= self.thresholds.reproduction
    }
}
