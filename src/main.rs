//! Grid Automata CLI - Run simulations from JSON configuration.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::path::PathBuf;
use std::time::Instant;

use grid_automata::{
    runtime::{AnySimulation, Clock, SystemClock},
    schema::{Pattern, RuleConfig, SimulationConfig},
};

/// Grids larger than this are not printed.
const MAX_RENDER_WIDTH: usize = 100;
const MAX_RENDER_HEIGHT: usize = 60;

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <config.json> [steps] [--realtime]", args[0]);
        eprintln!();
        eprintln!("Run a grid automaton simulation from JSON configuration.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  config.json  Path to simulation configuration file");
        eprintln!("  steps        Number of generations (default: 100)");
        eprintln!("  --realtime   Pace generations at the configured interval");
        eprintln!();
        eprintln!("Example configuration is generated with --example flag.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_config();
        return;
    }

    let realtime = args.iter().skip(2).any(|a| a == "--realtime");
    let config_path = PathBuf::from(&args[1]);
    let steps: u64 = args
        .iter()
        .skip(2)
        .find(|a| !a.starts_with("--"))
        .map(|s| {
            s.parse().unwrap_or_else(|e| {
                eprintln!("Invalid step count `{}`: {}", s, e);
                std::process::exit(1);
            })
        })
        .unwrap_or(100);

    let config = SimulationConfig::load(&config_path).unwrap_or_else(|e| {
        eprintln!("Error loading config: {}", e);
        std::process::exit(1);
    });

    println!("Grid Automata Simulation");
    println!("========================");
    println!("Rule: {}", describe_rule(&config.rule));
    println!(
        "Grid: {}x{} ({:?} boundary)",
        config.width, config.height, config.boundary
    );
    println!("Seed: {}", config.seed);
    println!("Steps: {}", steps);
    if realtime {
        println!("Interval: {}ms", config.interval_ms);
    }
    println!();

    let mut sim = AnySimulation::from_config(&config, SystemClock::new()).unwrap_or_else(|e| {
        eprintln!("Error building simulation: {}", e);
        std::process::exit(1);
    });

    println!("Initial state:");
    print_stats(&sim);
    print_grid(&sim);
    println!();

    println!("Running simulation...");
    let start = Instant::now();

    if realtime {
        if let Err(e) = sim.run_ticks(steps) {
            eprintln!("Simulation failed: {}", e);
            std::process::exit(1);
        }
    } else {
        for i in 0..steps {
            if let Err(e) = sim.step_once() {
                eprintln!("Step {} failed: {}", i + 1, e);
                std::process::exit(1);
            }

            // Print progress every 10%
            if (i + 1) % (steps / 10).max(1) == 0 {
                let elapsed = start.elapsed().as_secs_f32();
                let steps_per_sec = (i + 1) as f32 / elapsed.max(f32::EPSILON);
                print!("  Step {}/{}: ", i + 1, steps);
                print_stats_inline(&sim);
                println!(", {:.1} steps/s", steps_per_sec);
            }
        }
    }

    let elapsed = start.elapsed();

    println!();
    println!("Final state (generation {}):", sim.generation());
    print_stats(&sim);
    print_grid(&sim);
    if sim.dropped_ticks() > 0 {
        println!("Dropped ticks: {}", sim.dropped_ticks());
    }
    println!();
    println!(
        "Time: {:.2}s ({:.1} steps/s)",
        elapsed.as_secs_f32(),
        sim.generation() as f32 / elapsed.as_secs_f32().max(f32::EPSILON)
    );

    sim.teardown();
}

fn describe_rule(rule: &RuleConfig) -> String {
    match rule {
        RuleConfig::Life { rulestring } => format!("life {}", rulestring),
        RuleConfig::ForestFire {
            p_growth,
            p_lightning,
            p_spread,
        } => format!(
            "forest fire (growth={}, lightning={}, spread={})",
            p_growth, p_lightning, p_spread
        ),
        RuleConfig::Epidemic {
            p_infect,
            p_recover,
            p_lose_immunity,
        } => format!(
            "epidemic (infect={}, recover={}, lose immunity={})",
            p_infect, p_recover, p_lose_immunity
        ),
        RuleConfig::Elementary { rule } => format!("elementary rule {}", rule),
        RuleConfig::Diffusion { alpha, decay } => {
            format!("diffusion (alpha={}, decay={})", alpha, decay)
        }
    }
}

fn print_stats<C: Clock>(sim: &AnySimulation<C>) {
    print!("  ");
    print_stats_inline(sim);
    println!();
}

fn print_stats_inline<C: Clock>(sim: &AnySimulation<C>) {
    match sim.statistics_json() {
        Ok(stats) => print!("{}", stats["stats"]),
        Err(e) => print!("<stats unavailable: {}>", e),
    }
}

fn print_grid<C: Clock>(sim: &AnySimulation<C>) {
    if sim.width() <= MAX_RENDER_WIDTH && sim.height() <= MAX_RENDER_HEIGHT {
        print!("{}", sim.render());
    }
}

fn print_example_config() {
    let config = SimulationConfig {
        width: 40,
        height: 20,
        pattern: Pattern::Random { density: 0.3 },
        ..Default::default()
    };

    println!("Example configuration (config.json):");
    match serde_json::to_string_pretty(&config) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing example: {}", e),
    }
}
