use trisim::{
    bench_convergence, bench_integrators, sweep, RunReport, RunStatus, Scenario, ScenarioConfig,
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
struct Args {
    /// Scenario file; bare names are looked up in `scenarios/`
    #[arg(short, default_value = "triple_hermite.yaml")]
    file_name: String,

    /// Write the diagnostic series as a YAML report
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Time both integrators and print a convergence table instead
    #[arg(long)]
    bench: bool,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let direct = PathBuf::from(file_name);
    let config_path = if direct.exists() {
        direct
    } else {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name)
    };

    let file = File::open(&config_path)
        .with_context(|| format!("failed to open {}", config_path.display()))?;
    let reader = BufReader::new(file);
    let scenario_cfg: ScenarioConfig = serde_yaml::from_reader(reader)
        .with_context(|| format!("failed to parse {}", config_path.display()))?;

    Ok(scenario_cfg)
}

fn main() -> Result<()> {
    // RUST_LOG overrides the default info level
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    if args.bench {
        bench_integrators()?;
        bench_convergence()?;
        return Ok(());
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    let scenario = Scenario::build_scenario(scenario_cfg)?;

    // largest step first
    let mut steps = scenario.steps.clone();
    steps.sort_by(|a, b| b.total_cmp(a));

    info!(
        integrator = %scenario.engine.integrator,
        bodies = scenario.system.len(),
        duration = scenario.duration,
        runs = steps.len(),
        "integration start"
    );
    let t0 = Instant::now();
    let runs = sweep(
        &scenario.engine,
        &scenario.system,
        &scenario.reference,
        scenario.duration,
        &steps,
    );
    info!(elapsed_s = t0.elapsed().as_secs_f64(), "integration end");

    let report = RunReport::new(&scenario, &runs);
    for rec in &report.runs {
        match rec.status {
            RunStatus::Completed => info!(
                h = rec.h,
                steps = rec.steps_taken,
                max_rel_energy_err = rec.max_relative_energy_error,
                "run completed"
            ),
            RunStatus::Failed => warn!(h = rec.h, error = rec.error.as_deref(), "run failed"),
        }
    }

    if let Some(path) = &args.output {
        report.write_yaml(path)?;
        info!(path = %path.display(), "report written");
    }

    let failed = report.runs.len() - report.completed();
    if failed > 0 {
        bail!("{failed} of {} runs failed", report.runs.len());
    }

    Ok(())
}
