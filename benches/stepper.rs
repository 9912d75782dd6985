//! Benchmarks for the grid stepper.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use grid_automata::{
    compute::{DiffusionRule, EpidemicRule, Grid, LifeRule, Rule, sim_rng, step_grid},
    schema::{Boundary, Pattern},
};

fn seeded<R: Rule>(size: usize, pattern: &Pattern) -> Grid<R::State> {
    let mut rng = sim_rng(7);
    let blank = Grid::new(size, size, Boundary::Toroidal).unwrap();
    pattern.generate(blank, &mut rng).unwrap()
}

fn bench_life_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("life_step");
    let rule = LifeRule::conway();

    for size in [64, 128, 256, 512, 1024] {
        let grid = seeded::<LifeRule>(size, &Pattern::Random { density: 0.3 });
        let mut rng = sim_rng(1);

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", size, size)),
            &size,
            |b, _| {
                b.iter(|| step_grid(black_box(&grid), &rule, &mut rng).unwrap());
            },
        );
    }

    group.finish();
}

fn bench_rule_families(c: &mut Criterion) {
    let mut group = c.benchmark_group("rule_family_256");
    let size = 256;

    let life = seeded::<LifeRule>(size, &Pattern::Random { density: 0.3 });
    let epidemic = seeded::<EpidemicRule>(size, &Pattern::Random { density: 0.05 });
    let field = seeded::<DiffusionRule>(
        size,
        &Pattern::GaussianBlob {
            center: (0.5, 0.5),
            radius: 0.2,
            amplitude: 1.0,
        },
    );

    let life_rule = LifeRule::conway();
    let epidemic_rule = EpidemicRule::default();
    let diffusion_rule = DiffusionRule::default();
    let mut rng = sim_rng(1);

    group.bench_function("life", |b| {
        b.iter(|| step_grid(black_box(&life), &life_rule, &mut rng).unwrap())
    });
    group.bench_function("epidemic", |b| {
        b.iter(|| step_grid(black_box(&epidemic), &epidemic_rule, &mut rng).unwrap())
    });
    group.bench_function("diffusion", |b| {
        b.iter(|| step_grid(black_box(&field), &diffusion_rule, &mut rng).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_life_step, bench_rule_families);
criterion_main!(benches);
