pub mod lifecycle;
pub mod metrics;

pub use lifecycle::selection_probability;
pub use metrics::*;

use crate::agent::{Agent, AgentKind};
use crate::config::{SimConfig, SimConfigError};
use crate::environment::Environment;
use crate::genome::{Genome, GenomeError};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, trace};

/// Round state machine. Every round visits the phases in declaration order;
/// `Finished` is entered instead of `Spawn` once the run is over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Spawn,
    Day,
    Night,
    Cull,
    Breed,
    Record,
    Finished,
}

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] SimConfigError),
    #[error(transparent)]
    Genome(#[from] GenomeError),
    #[error("initial population ({actual}) exceeds supported maximum ({max})")]
    TooManyAgents { max: usize, actual: usize },
}

pub struct Simulation {
    pub(crate) config: SimConfig,
    pub(crate) environment: Environment,
    pub(crate) agents: Vec<Agent>,
    pub(crate) rng: ChaCha12Rng,
    pub(crate) phase: Phase,
    /// 1-based index of the round in progress (or about to start).
    pub(crate) round: usize,
    pub(crate) next_agent_id: u64,
    pub(crate) tally: RoundTally,
    pub(crate) total_deaths: usize,
    pub(crate) total_births: usize,
    pub(crate) records: Vec<RoundRecord>,
}

impl Simulation {
    /// The run stops before a round would start with this many agents or fewer.
    pub const POPULATION_FLOOR: usize = 2;

    pub fn new(config: SimConfig) -> Self {
        Self::try_new(config).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Random initial population: `starting_hawks` hawks followed by doves,
    /// each with a random genome and position.
    pub fn try_new(config: SimConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        let mut sim = Self::empty(config);
        for i in 0..sim.config.starting_population {
            let kind = if i < sim.config.starting_hawks {
                AgentKind::Hawk
            } else {
                AgentKind::Dove
            };
            let genome = Genome::random(
                &mut sim.rng,
                sim.config.genome_length,
                &sim.config.fitness_weights,
            )?;
            sim.spawn_agent(kind, genome);
        }
        Ok(sim)
    }

    /// Initial population from explicit genomes; positions are still random.
    /// `starting_population` and `starting_hawks` are ignored. Each genome is
    /// rescored with `config.fitness_weights`.
    pub fn try_with_genomes(
        config: SimConfig,
        genomes: Vec<(AgentKind, Genome)>,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        if genomes.len() > SimConfig::MAX_POPULATION {
            return Err(SimulationError::TooManyAgents {
                max: SimConfig::MAX_POPULATION,
                actual: genomes.len(),
            });
        }
        let mut sim = Self::empty(config);
        for (kind, genome) in genomes {
            let genome = Genome::new(genome.sequence().to_vec(), &sim.config.fitness_weights)?;
            sim.spawn_agent(kind, genome);
        }
        Ok(sim)
    }

    fn empty(config: SimConfig) -> Self {
        let environment = Environment::new(config.width, config.height);
        let rng = ChaCha12Rng::seed_from_u64(config.seed);
        let capacity = config.starting_population;
        Self {
            config,
            environment,
            agents: Vec::with_capacity(capacity),
            rng,
            phase: Phase::Spawn,
            round: 1,
            next_agent_id: 0,
            tally: RoundTally::default(),
            total_deaths: 0,
            total_births: 0,
            records: Vec::new(),
        }
    }

    fn spawn_agent(&mut self, kind: AgentKind, genome: Genome) {
        let position = self.environment.random_cell(&mut self.rng);
        let agent = Agent::new(self.next_agent_id, kind, position, genome, &self.config);
        self.next_agent_id += 1;
        self.agents.push(agent);
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn environment_mut(&mut self) -> &mut Environment {
        &mut self.environment
    }

    /// Live agents in iteration order. Earlier agents eat first.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Mutable view for scenario setup (energies, positions); the population
    /// itself only changes through the cull and breed phases.
    pub fn agents_mut(&mut self) -> &mut [Agent] {
        &mut self.agents
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn round(&self) -> usize {
        self.round
    }

    pub fn rounds_completed(&self) -> usize {
        self.records.len()
    }

    pub fn records(&self) -> &[RoundRecord] {
        &self.records
    }

    pub fn population_series(&self) -> Vec<usize> {
        self.records.iter().map(|r| r.population).collect()
    }

    fn should_stop(&self) -> bool {
        self.round > self.config.max_rounds || self.agents.len() <= Self::POPULATION_FLOOR
    }

    pub fn is_finished(&self) -> bool {
        match self.phase {
            Phase::Finished => true,
            Phase::Spawn => self.should_stop(),
            _ => false,
        }
    }

    /// Execute the current phase and move to the next one. Returns the phase
    /// that ran, or `None` once the run has finished.
    pub fn advance(&mut self) -> Option<Phase> {
        let phase = self.phase;
        self.phase = match phase {
            Phase::Finished => return None,
            Phase::Spawn => {
                if self.should_stop() {
                    self.phase = Phase::Finished;
                    trace!(round = self.round, "run finished");
                    return None;
                }
                self.tally = RoundTally::default();
                self.spawn_phase();
                Phase::Day
            }
            Phase::Day => {
                self.day_phase();
                Phase::Night
            }
            Phase::Night => {
                self.night_phase();
                Phase::Cull
            }
            Phase::Cull => {
                self.cull();
                Phase::Breed
            }
            Phase::Breed => {
                self.breed();
                Phase::Record
            }
            Phase::Record => {
                self.record_round();
                self.round += 1;
                Phase::Spawn
            }
        };
        trace!(round = self.round, ?phase, "phase complete");
        Some(phase)
    }

    /// Finish the current round. Returns its record, or `None` if the run was
    /// already over.
    pub fn step_round(&mut self) -> Option<RoundRecord> {
        while let Some(phase) = self.advance() {
            if phase == Phase::Record {
                return self.records.last().cloned();
            }
        }
        None
    }

    /// Run until `max_rounds` rounds have completed or the population falls to
    /// the floor.
    pub fn run(&mut self) -> RunSummary {
        info!(
            seed = self.config.seed,
            max_rounds = self.config.max_rounds,
            population = self.agents.len(),
            "starting simulation"
        );
        while self.step_round().is_some() {}
        let summary = self.summary();
        info!(
            rounds_completed = summary.rounds_completed,
            total_deaths = summary.total_deaths,
            total_births = summary.total_births,
            final_population = summary.final_population,
            "simulation finished"
        );
        summary
    }
}
