use super::Simulation;
use crate::agent::{Agent, AgentKind};
use serde::{Deserialize, Serialize};

/// Count per agent kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindCounts {
    pub hawks: usize,
    pub doves: usize,
}

impl KindCounts {
    pub fn from_agents(agents: &[Agent]) -> Self {
        let mut counts = Self::default();
        for agent in agents {
            counts.add(agent.kind);
        }
        counts
    }

    pub fn add(&mut self, kind: AgentKind) {
        match kind {
            AgentKind::Hawk => self.hawks += 1,
            AgentKind::Dove => self.doves += 1,
        }
    }

    pub fn get(&self, kind: AgentKind) -> usize {
        match kind {
            AgentKind::Hawk => self.hawks,
            AgentKind::Dove => self.doves,
        }
    }

    pub fn total(&self) -> usize {
        self.hawks + self.doves
    }
}

/// Per-round bookkeeping filled in by the phases and drained by `Record`.
#[derive(Clone, Debug, Default)]
pub(crate) struct RoundTally {
    pub deaths: KindCounts,
    pub births: KindCounts,
    pub meals: usize,
    pub food_uneaten: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct RoundRecord {
    pub round: usize,
    pub population: usize,
    pub deaths: usize,
    pub births: usize,
    pub population_by_kind: KindCounts,
    pub deaths_by_kind: KindCounts,
    pub births_by_kind: KindCounts,
    pub meals: usize,
    /// Food left on the grid when the day phase ended, before any clearing.
    pub food_uneaten: usize,
    pub mean_fitness: f64,
    pub mean_energy: f64,
    pub max_generation: u32,
}

fn default_schema_version() -> u32 {
    1
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub seed: u64,
    pub max_rounds: usize,
    pub rounds_completed: usize,
    pub total_deaths: usize,
    pub total_births: usize,
    pub final_population: usize,
    #[serde(default)]
    pub final_population_by_kind: KindCounts,
    #[serde(default)]
    pub rounds: Vec<RoundRecord>,
}

impl RunSummary {
    /// Population after each completed round, for charting.
    pub fn population_series(&self) -> Vec<usize> {
        self.rounds.iter().map(|r| r.population).collect()
    }

    pub fn kind_series(&self, kind: AgentKind) -> Vec<usize> {
        self.rounds
            .iter()
            .map(|r| r.population_by_kind.get(kind))
            .collect()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct PopulationStats {
    pub population: usize,
    pub population_by_kind: KindCounts,
    pub total_births: usize,
    pub total_deaths: usize,
    pub mean_fitness: f64,
    pub mean_generation: f64,
}

impl Simulation {
    pub fn population_stats(&self) -> PopulationStats {
        let n = self.agents.len();
        let denom = n.max(1) as f64;
        PopulationStats {
            population: n,
            population_by_kind: KindCounts::from_agents(&self.agents),
            total_births: self.total_births,
            total_deaths: self.total_deaths,
            mean_fitness: self.agents.iter().map(|a| a.fitness() as f64).sum::<f64>() / denom,
            mean_generation: self
                .agents
                .iter()
                .map(|a| a.generation as f64)
                .sum::<f64>()
                / denom,
        }
    }

    pub(crate) fn collect_round_record(&self) -> RoundRecord {
        let n = self.agents.len();
        let denom = n.max(1) as f64;
        let fitness_sum: f64 = self.agents.iter().map(|a| a.fitness() as f64).sum();
        let energy_sum: f64 = self.agents.iter().map(|a| a.energy).sum();
        RoundRecord {
            round: self.round,
            population: n,
            deaths: self.tally.deaths.total(),
            births: self.tally.births.total(),
            population_by_kind: KindCounts::from_agents(&self.agents),
            deaths_by_kind: self.tally.deaths,
            births_by_kind: self.tally.births,
            meals: self.tally.meals,
            food_uneaten: self.tally.food_uneaten,
            mean_fitness: fitness_sum / denom,
            mean_energy: energy_sum / denom,
            max_generation: self.agents.iter().map(|a| a.generation).max().unwrap_or(0),
        }
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            schema_version: 1,
            seed: self.config.seed,
            max_rounds: self.config.max_rounds,
            rounds_completed: self.records.len(),
            total_deaths: self.total_deaths,
            total_births: self.total_births,
            final_population: self.agents.len(),
            final_population_by_kind: KindCounts::from_agents(&self.agents),
            rounds: self.records.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_summary_json_deserializes_with_defaults() {
        let legacy_json = r#"{
            "seed": 1,
            "max_rounds": 3,
            "rounds_completed": 2,
            "total_deaths": 5,
            "total_births": 4,
            "final_population": 9
        }"#;
        let summary: RunSummary =
            serde_json::from_str(legacy_json).expect("legacy summary should parse");
        assert_eq!(summary.schema_version, 1);
        assert!(summary.rounds.is_empty());
        assert_eq!(summary.final_population_by_kind, KindCounts::default());
    }

    #[test]
    fn series_follow_round_order() {
        let rounds = (1..=3)
            .map(|round| RoundRecord {
                round,
                population: round * 10,
                population_by_kind: KindCounts {
                    hawks: round,
                    doves: round * 9,
                },
                ..RoundRecord::default()
            })
            .collect();
        let summary = RunSummary {
            schema_version: 1,
            seed: 0,
            max_rounds: 3,
            rounds_completed: 3,
            total_deaths: 0,
            total_births: 0,
            final_population: 30,
            final_population_by_kind: KindCounts::default(),
            rounds,
        };
        assert_eq!(summary.population_series(), vec![10, 20, 30]);
        assert_eq!(summary.kind_series(AgentKind::Hawk), vec![1, 2, 3]);
        assert_eq!(summary.kind_series(AgentKind::Dove), vec![9, 18, 27]);
    }
}
