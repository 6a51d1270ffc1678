use super::Simulation;
use crate::agent::Agent;
use crate::config::{DayStart, EnergyLoss, OffspringGenome, SelectionMode, SimConfig};
use rand::Rng;
use tracing::{debug, warn};

/// `min(1, fitness * scale / total_fitness)`, or `None` when the population's
/// total fitness is zero and no agent can pass a fitness-weighted draw.
pub fn selection_probability(fitness: u32, total_fitness: u64, scale: f64) -> Option<f64> {
    if total_fitness == 0 {
        return None;
    }
    Some((fitness as f64 * scale / total_fitness as f64).min(1.0))
}

fn total_fitness(agents: &[Agent]) -> u64 {
    agents.iter().map(|a| a.fitness() as u64).sum()
}

/// Energy one substep costs `agent`: the phase's even share, or the agent's
/// living threshold.
fn substep_loss(agent: &Agent, mode: EnergyLoss, spread: f64) -> f64 {
    match mode {
        EnergyLoss::Spread => spread,
        EnergyLoss::LivingThreshold => agent.thresholds().living,
    }
}

fn passes_fitness_draw<R: Rng + ?Sized>(
    rng: &mut R,
    fitness: u32,
    total_fitness: u64,
    scale: f64,
) -> bool {
    match selection_probability(fitness, total_fitness, scale) {
        Some(p) => rng.random::<f64>() <= p,
        None => false,
    }
}

impl Simulation {
    pub(crate) fn spawn_phase(&mut self) {
        self.environment
            .spawn_food(&mut self.rng, self.config.food_spawn_rate);
    }

    pub(crate) fn day_phase(&mut self) {
        if self.config.day_start == DayStart::Edge {
            for agent in &mut self.agents {
                agent.position = self.environment.random_edge_cell(&mut self.rng);
            }
        }
        let loss = self.config.day_loss_per_substep();
        for _ in 0..self.config.day_length {
            self.day_substep(loss);
        }
        self.tally.food_uneaten = self.environment.food_count();
        if self.config.clear_food_each_day {
            self.environment.clear_food();
        }
    }

    /// Every agent, in population order, moves, eats, then pays its substep loss.
    pub(crate) fn day_substep(&mut self, loss: f64) {
        let gain = self.config.energy_gain_from_food;
        let policy = self.config.boundary;
        let mode = self.config.energy_loss;
        for agent in &mut self.agents {
            agent.wander(&mut self.rng, &self.environment, policy);
            if agent.eat(&mut self.environment, gain) {
                self.tally.meals += 1;
            }
            let cost = substep_loss(agent, mode, loss);
            agent.lose_energy(cost);
        }
    }

    pub(crate) fn night_phase(&mut self) {
        let loss = self.config.night_loss_per_substep();
        let mode = self.config.energy_loss;
        for _ in 0..self.config.night_length {
            for agent in &mut self.agents {
                let cost = substep_loss(agent, mode, loss);
                agent.lose_energy(cost);
            }
        }
    }

    fn warn_if_degenerate(&self, total_fitness: u64, stage: &'static str) {
        if total_fitness == 0
            && !self.agents.is_empty()
            && self.config.selection == SelectionMode::FitnessWeighted
        {
            warn!(
                round = self.round,
                population = self.agents.len(),
                stage,
                "total fitness is zero; skipping fitness-weighted draws"
            );
        }
    }

    /// Remove agents below their living threshold or failing the survival draw.
    /// Returns the number removed.
    pub(crate) fn cull(&mut self) -> usize {
        let total_fitness = total_fitness(&self.agents);
        self.warn_if_degenerate(total_fitness, "cull");
        let stochastic = self.config.selection == SelectionMode::FitnessWeighted;
        let scale = self.config.fitness_scale;

        let agents = std::mem::take(&mut self.agents);
        let before = agents.len();
        let mut survivors = Vec::with_capacity(before);
        for agent in agents {
            let survives = agent.has_living_energy()
                && (!stochastic
                    || passes_fitness_draw(&mut self.rng, agent.fitness(), total_fitness, scale));
            if survives {
                survivors.push(agent);
            } else {
                self.tally.deaths.add(agent.kind);
            }
        }
        self.agents = survivors;
        before - self.agents.len()
    }

    /// Each surviving agent with enough energy may produce one offspring.
    /// Offspring join the population after the pass and are not parents in it.
    /// Returns the number born.
    pub(crate) fn breed(&mut self) -> usize {
        let total_fitness = total_fitness(&self.agents);
        self.warn_if_degenerate(total_fitness, "breed");
        let stochastic = self.config.selection == SelectionMode::FitnessWeighted;
        let scale = self.config.fitness_scale;
        let mutation_probability = match self.config.offspring_genome {
            OffspringGenome::Mutated => self.config.mutation_probability,
            // Redrawing every position yields a uniformly random genome.
            OffspringGenome::Fresh => 1.0,
        };

        let parent_count = self.agents.len();
        let mut offspring = Vec::new();
        for idx in 0..parent_count {
            if parent_count + offspring.len() >= SimConfig::MAX_POPULATION {
                warn!(
                    round = self.round,
                    max = SimConfig::MAX_POPULATION,
                    "population cap reached; remaining parents skip breeding"
                );
                break;
            }
            let (fitness, ready) = {
                let agent = &self.agents[idx];
                (agent.fitness(), agent.has_breeding_energy())
            };
            if !ready {
                continue;
            }
            if stochastic && !passes_fitness_draw(&mut self.rng, fitness, total_fitness, scale) {
                continue;
            }

            let parent = &mut self.agents[idx];
            parent.energy = (parent.energy / 2.0).floor();
            let kind = parent.kind;
            let generation = parent.generation + 1;
            let genome = parent.genome().mutate(
                &mut self.rng,
                mutation_probability,
                &self.config.fitness_weights,
            );
            let position = self.environment.random_cell(&mut self.rng);
            let mut child = Agent::new(self.next_agent_id, kind, position, genome, &self.config);
            child.generation = generation;
            self.next_agent_id += 1;
            self.tally.births.add(kind);
            offspring.push(child);
        }
        let born = offspring.len();
        self.agents.extend(offspring);
        born
    }

    pub(crate) fn record_round(&mut self) {
        let record = self.collect_round_record();
        self.total_deaths += record.deaths;
        self.total_births += record.births;
        debug!(
            round = record.round,
            population = record.population,
            deaths = record.deaths,
            births = record.births,
            hawks = record.population_by_kind.hawks,
            doves = record.population_by_kind.doves,
            "round complete"
        );
        self.records.push(record);
    }
}
