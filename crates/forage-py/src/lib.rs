use forage_core::batch;
use forage_core::contest::{Contest, ContestConfig};
use forage_core::{SimConfig, Simulation};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

fn value_error(err: impl std::fmt::Display) -> PyErr {
    PyValueError::new_err(err.to_string())
}

fn parse_config(config_json: Option<&str>) -> PyResult<SimConfig> {
    match config_json {
        Some(json) => SimConfig::from_json(json).map_err(value_error),
        None => Ok(SimConfig::default()),
    }
}

#[pyfunction]
fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Default simulation config as JSON, for editing on the Python side.
#[pyfunction]
fn default_config_json() -> PyResult<String> {
    serde_json::to_string(&SimConfig::default()).map_err(value_error)
}

/// Run one simulation and return its `RunSummary` as JSON.
#[pyfunction]
#[pyo3(signature = (config_json=None))]
fn run_simulation(config_json: Option<&str>) -> PyResult<String> {
    let config = parse_config(config_json)?;
    let mut sim = Simulation::try_new(config).map_err(value_error)?;
    let summary = sim.run();
    serde_json::to_string(&summary).map_err(value_error)
}

/// Run seed replicates in parallel; returns a JSON array of summaries.
#[pyfunction]
#[pyo3(signature = (seeds, config_json=None))]
fn run_replicates(seeds: Vec<u64>, config_json: Option<&str>) -> PyResult<String> {
    let base = parse_config(config_json)?;
    let summaries = batch::run_seeds(&base, &seeds)
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .map_err(value_error)?;
    serde_json::to_string(&summaries).map_err(value_error)
}

/// Run the pairwise Hawk-Dove contest; returns per-round `(hawks, doves)`.
#[pyfunction]
#[pyo3(signature = (rounds, config_json=None))]
fn run_contest(rounds: usize, config_json: Option<&str>) -> PyResult<Vec<(usize, usize)>> {
    let config: ContestConfig = match config_json {
        Some(json) => serde_json::from_str(json).map_err(value_error)?,
        None => ContestConfig::default(),
    };
    let mut contest = Contest::try_new(&config).map_err(value_error)?;
    Ok(contest
        .run(rounds)
        .into_iter()
        .map(|c| (c.hawks, c.doves))
        .collect())
}

#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(version, m)?)?;
    m.add_function(wrap_pyfunction!(default_config_json, m)?)?;
    m.add_function(wrap_pyfunction!(run_simulation, m)?)?;
    m.add_function(wrap_pyfunction!(run_replicates, m)?)?;
    m.add_function(wrap_pyfunction!(run_contest, m)?)?;
    Ok(())
}
