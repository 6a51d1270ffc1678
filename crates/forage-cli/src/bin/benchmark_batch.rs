use forage_core::batch;
use forage_core::{SimConfig, Simulation};
use std::time::Instant;

fn main() {
    let replicates: u64 = 16;
    let config = SimConfig {
        width: 200,
        height: 200,
        starting_population: 2_000,
        food_spawn_rate: 20_000,
        max_rounds: 30,
        ..SimConfig::default()
    };
    println!(
        "Benchmarking {} replicates of {} agents on a {}x{} grid, {} rounds",
        replicates, config.starting_population, config.width, config.height, config.max_rounds
    );
    let seeds: Vec<u64> = (0..replicates).collect();

    let start = Instant::now();
    let mut sequential = Vec::with_capacity(seeds.len());
    for &seed in &seeds {
        let mut sim = Simulation::new(SimConfig {
            seed,
            ..config.clone()
        });
        sequential.push(sim.run());
    }
    let duration_sequential = start.elapsed();
    println!("Sequential: {:?}", duration_sequential);

    let start = Instant::now();
    let parallel: Vec<_> = batch::run_seeds(&config, &seeds)
        .into_iter()
        .filter_map(Result::ok)
        .collect();
    let duration_parallel = start.elapsed();
    println!("Parallel:   {:?}", duration_parallel);

    let identical = sequential == parallel;
    println!("Results identical: {}", identical);
    let rounds: usize = sequential.iter().map(|s| s.rounds_completed).sum();
    if rounds > 0 {
        println!(
            "Avg time per round (sequential): {:?}",
            duration_sequential / rounds as u32
        );
    }
    let mean = batch::mean_population_series(&parallel);
    if let Some(last) = mean.last() {
        println!("Mean final population: {:.1}", last);
    }
}
