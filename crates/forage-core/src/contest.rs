//! Pairwise Hawk-Dove contest: a population of kinds is shuffled and paired
//! each round, food is split by the payoff table, and the next generation is
//! the players who ate enough plus any offspring spawned by mixed encounters.

use crate::agent::AgentKind;
use crate::simulation::KindCounts;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ContestPayoffs {
    /// Food the hawk takes from a hawk-dove encounter.
    pub hawk_vs_dove_hawk: f64,
    /// Food the dove keeps from a hawk-dove encounter.
    pub hawk_vs_dove_dove: f64,
    /// Food each dove gets when two doves share.
    pub dove_vs_dove: f64,
    /// Food each hawk gets when two hawks fight.
    pub hawk_vs_hawk: f64,
    /// Food a player needs to survive into the next round.
    pub survival_food: f64,
    /// Food a hawk needs before it may spawn an offspring.
    pub hawk_breed_food: f64,
    /// Chance of each offspring spawn in a hawk-dove encounter.
    pub offspring_probability: f64,
}

impl Default for ContestPayoffs {
    fn default() -> Self {
        Self {
            hawk_vs_dove_hawk: 1.5,
            hawk_vs_dove_dove: 0.5,
            dove_vs_dove: 1.0,
            hawk_vs_hawk: 0.0,
            survival_food: 1.0,
            hawk_breed_food: 1.5,
            offspring_probability: 0.5,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ContestConfig {
    pub seed: u64,
    pub hawks: usize,
    pub doves: usize,
    pub payoffs: ContestPayoffs,
}

impl Default for ContestConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            hawks: 10,
            doves: 1000,
            payoffs: ContestPayoffs::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContestError {
    #[error("offspring_probability must be in [0, 1] (got {0})")]
    InvalidProbability(f64),
    #[error("payoff {field} must be finite and non-negative (got {value})")]
    InvalidPayoff { field: &'static str, value: f64 },
}

impl ContestConfig {
    pub fn validate(&self) -> Result<(), ContestError> {
        let p = &self.payoffs;
        if !(0.0..=1.0).contains(&p.offspring_probability) {
            return Err(ContestError::InvalidProbability(p.offspring_probability));
        }
        let payoffs = [
            ("hawk_vs_dove_hawk", p.hawk_vs_dove_hawk),
            ("hawk_vs_dove_dove", p.hawk_vs_dove_dove),
            ("dove_vs_dove", p.dove_vs_dove),
            ("hawk_vs_hawk", p.hawk_vs_hawk),
            ("survival_food", p.survival_food),
            ("hawk_breed_food", p.hawk_breed_food),
        ];
        for (field, value) in payoffs {
            if !value.is_finite() || value < 0.0 {
                return Err(ContestError::InvalidPayoff { field, value });
            }
        }
        Ok(())
    }
}

pub struct Contest {
    population: Vec<AgentKind>,
    payoffs: ContestPayoffs,
    rng: ChaCha12Rng,
}

impl Contest {
    pub fn try_new(config: &ContestConfig) -> Result<Self, ContestError> {
        config.validate()?;
        let mut population = vec![AgentKind::Hawk; config.hawks];
        population.extend(std::iter::repeat_n(AgentKind::Dove, config.doves));
        Ok(Self {
            population,
            payoffs: config.payoffs,
            rng: ChaCha12Rng::seed_from_u64(config.seed),
        })
    }

    pub fn population(&self) -> &[AgentKind] {
        &self.population
    }

    pub fn counts(&self) -> KindCounts {
        let mut counts = KindCounts::default();
        for &kind in &self.population {
            counts.add(kind);
        }
        counts
    }

    fn coin<R: Rng + ?Sized>(rng: &mut R, p: f64) -> bool {
        rng.random::<f64>() < p
    }

    /// Shuffle, pair neighbours, settle each encounter, then keep every player
    /// that ate at least `survival_food`. An unpaired last player eats nothing.
    pub fn play_round(&mut self) -> KindCounts {
        self.population.shuffle(&mut self.rng);
        let p = self.payoffs;
        let n = self.population.len();
        let mut food = vec![0.0f64; n];
        let mut next = Vec::with_capacity(n);

        for i in (0..n.saturating_sub(1)).step_by(2) {
            let j = i + 1;
            match (self.population[i], self.population[j]) {
                (AgentKind::Hawk, AgentKind::Dove) | (AgentKind::Dove, AgentKind::Hawk) => {
                    let (hawk, dove) = if self.population[i] == AgentKind::Hawk {
                        (i, j)
                    } else {
                        (j, i)
                    };
                    food[hawk] += p.hawk_vs_dove_hawk;
                    food[dove] += p.hawk_vs_dove_dove;
                    if Self::coin(&mut self.rng, p.offspring_probability) {
                        next.push(AgentKind::Dove);
                    }
                    if food[hawk] >= p.hawk_breed_food
                        && Self::coin(&mut self.rng, p.offspring_probability)
                    {
                        next.push(AgentKind::Hawk);
                    }
                }
                (AgentKind::Dove, AgentKind::Dove) => {
                    food[i] += p.dove_vs_dove;
                    food[j] += p.dove_vs_dove;
                }
                (AgentKind::Hawk, AgentKind::Hawk) => {
                    food[i] += p.hawk_vs_hawk;
                    food[j] += p.hawk_vs_hawk;
                }
            }
        }

        for (&kind, &eaten) in self.population.iter().zip(&food) {
            if eaten >= p.survival_food {
                next.push(kind);
            }
        }
        self.population = next;
        self.counts()
    }

    /// Counts after each of `rounds` rounds.
    pub fn run(&mut self, rounds: usize) -> Vec<KindCounts> {
        (0..rounds).map(|_| self.play_round()).collect()
    }
}
