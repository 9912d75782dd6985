//! Stepper - synchronous whole-grid rule application.

#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;

use rand::RngCore;

use super::rng::row_rng;
use super::{CellState, Grid, Rule, SimRng, sim_rng};
use crate::schema::ConfigError;

/// Apply `rule` to every cell of `grid`, producing a new grid.
///
/// Every next state is computed from the unmodified input grid. The random
/// source advances by exactly one draw per successful call; on error nothing
/// is consumed.
pub fn step_grid<R: Rule>(
    grid: &Grid<R::State>,
    rule: &R,
    rng: &mut SimRng,
) -> Result<Grid<R::State>, ConfigError> {
    rule.validate()?;
    let kind = rule.neighborhood();
    kind.dimensionality().accepts(grid.width(), grid.height())?;

    let step_seed = rng.next_u64();
    let width = grid.width();
    let mut cells = vec![<R::State as CellState>::quiescent(); grid.len()];

    let update_row = |(y, row): (usize, &mut [R::State])| {
        let mut rng = row_rng(step_seed, y);
        let mut neighbors = Vec::with_capacity(kind.full_size());
        for (x, next) in row.iter_mut().enumerate() {
            grid.gather(x, y, kind, &mut neighbors);
            let center = grid.cells()[grid.idx(x, y)];
            *next = rule.next_state(center, &neighbors, &mut rng);
        }
    };

    #[cfg(not(target_arch = "wasm32"))]
    cells.par_chunks_mut(width).enumerate().for_each(update_row);

    #[cfg(target_arch = "wasm32")]
    cells.chunks_mut(width).enumerate().for_each(update_row);

    Ok(grid.with_cells(cells))
}

/// Rule, random source and generation counter for one simulation.
#[derive(Debug, Clone)]
pub struct Stepper<R: Rule> {
    rule: R,
    rng: SimRng,
    generation: u64,
}

impl<R: Rule> Stepper<R> {
    /// Create a stepper. The rule is validated up front.
    pub fn new(rule: R, seed: u64) -> Result<Self, ConfigError> {
        rule.validate()?;
        Ok(Self {
            rule,
            rng: sim_rng(seed),
            generation: 0,
        })
    }

    /// Advance one generation.
    pub fn step(&mut self, grid: &Grid<R::State>) -> Result<Grid<R::State>, ConfigError> {
        let next = step_grid(grid, &self.rule, &mut self.rng)?;
        self.generation += 1;
        Ok(next)
    }

    /// Advance `steps` generations.
    pub fn run(
        &mut self,
        grid: &Grid<R::State>,
        steps: u64,
    ) -> Result<Grid<R::State>, ConfigError> {
        let mut current = grid.clone();
        for _ in 0..steps {
            current = self.step(&current)?;
        }
        Ok(current)
    }

    /// Check that `grid` has the shape the rule needs.
    pub fn check(&self, grid: &Grid<R::State>) -> Result<(), ConfigError> {
        self.rule
            .neighborhood()
            .dimensionality()
            .accepts(grid.width(), grid.height())
    }

    /// Change one rule parameter. Validated on a copy; on error the rule is
    /// unchanged.
    pub fn set_parameter(&mut self, name: &str, value: f64) -> Result<(), ConfigError> {
        let mut next = self.rule.clone();
        next.set_parameter(name, value)?;
        next.validate()?;
        self.rule = next;
        Ok(())
    }

    pub fn rule(&self) -> &R {
        &self.rule
    }

    /// Random source, shared with randomized initializers.
    pub fn rng_mut(&mut self) -> &mut SimRng {
        &mut self.rng
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn reset_generation(&mut self) {
        self.generation = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::{
        DiffusionRule, ElementaryRule, EpidemicRule, ForestFireRule, Forest, Health, Life,
        LifeRule,
    };
    use crate::schema::Boundary;
    use proptest::prelude::*;

    fn life_grid(w: usize, h: usize, boundary: Boundary, alive: &[(usize, usize)]) -> Grid<Life> {
        let mut grid = Grid::new(w, h, boundary).unwrap();
        for &(x, y) in alive {
            grid.set(x, y, Life::Alive).unwrap();
        }
        grid
    }

    fn alive_cells(grid: &Grid<Life>) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                if grid.cell(x, y) == Some(Life::Alive) {
                    out.push((x, y));
                }
            }
        }
        out
    }

    #[test]
    fn test_dead_grid_fixed_point() {
        let mut stepper = Stepper::new(LifeRule::conway(), 0).unwrap();
        let grid = life_grid(5, 5, Boundary::Toroidal, &[]);
        let after = stepper.run(&grid, 10).unwrap();
        assert_eq!(after, grid);
        assert_eq!(stepper.generation(), 10);
    }

    #[test]
    fn test_blinker_oscillates() {
        let mut stepper = Stepper::new(LifeRule::conway(), 0).unwrap();
        let grid = life_grid(5, 5, Boundary::Finite, &[(1, 2), (2, 2), (3, 2)]);
        let next = stepper.step(&grid).unwrap();
        assert_eq!(alive_cells(&next), vec![(2, 1), (2, 2), (2, 3)]);
        let back = stepper.step(&next).unwrap();
        assert_eq!(back, grid);
    }

    #[test]
    fn test_glider_translates_after_four_generations() {
        let glider = [(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)];
        let grid = life_grid(20, 20, Boundary::Toroidal, &glider);
        let mut stepper = Stepper::new(LifeRule::conway(), 0).unwrap();

        let after = stepper.run(&grid, 4).unwrap();

        let mut expected: Vec<(usize, usize)> =
            glider.iter().map(|&(x, y)| (x + 1, y + 1)).collect();
        expected.sort_by_key(|&(x, y)| (y, x));
        assert_eq!(alive_cells(&after), expected);
    }

    #[test]
    fn test_glider_wraps_around_torus() {
        let glider = [(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)];
        let grid = life_grid(8, 8, Boundary::Toroidal, &glider);
        let mut stepper = Stepper::new(LifeRule::conway(), 0).unwrap();
        // 8 translations of (1, 1) bring it home on an 8x8 torus
        let after = stepper.run(&grid, 32).unwrap();
        assert_eq!(after, grid);
    }

    #[test]
    fn test_lone_corner_cell_dies_under_both_boundaries() {
        // On a 3x3 torus every cell neighbors all 8 others, so a lone cell
        // gives each dead cell exactly one live neighbor: nothing is born.
        let mut stepper = Stepper::new(LifeRule::conway(), 0).unwrap();
        let finite = life_grid(3, 3, Boundary::Finite, &[(0, 0)]);
        let toroidal = finite.with_boundary(Boundary::Toroidal);

        let expected_dead = life_grid(3, 3, Boundary::Finite, &[]);
        assert_eq!(stepper.step(&finite).unwrap(), expected_dead);
        assert_eq!(
            stepper.step(&toroidal).unwrap(),
            expected_dead.with_boundary(Boundary::Toroidal)
        );
    }

    #[test]
    fn test_corner_tromino_differs_by_boundary() {
        let alive = [(0, 0), (1, 0), (0, 1)];
        let finite = life_grid(3, 3, Boundary::Finite, &alive);
        let toroidal = finite.with_boundary(Boundary::Toroidal);
        let mut stepper = Stepper::new(LifeRule::conway(), 0).unwrap();

        // Finite: (1, 1) is born, the tromino becomes a block
        let next_finite = stepper.step(&finite).unwrap();
        assert_eq!(alive_cells(&next_finite), vec![(0, 0), (1, 0), (0, 1), (1, 1)]);

        // Toroidal: every dead cell sees all three live cells and is born,
        // every live cell sees two and survives
        let next_toroidal = stepper.step(&toroidal).unwrap();
        assert_eq!(alive_cells(&next_toroidal).len(), 9);

        assert_ne!(alive_cells(&next_finite), alive_cells(&next_toroidal));
    }

    #[test]
    fn test_rule_90_sierpinski() {
        let width = 63;
        let row = Grid::new(width, 1, Boundary::Finite)
            .unwrap()
            .with_cell(width / 2, 0, true)
            .unwrap();
        let mut stepper = Stepper::new(ElementaryRule::new(90), 0).unwrap();

        let mut current = row;
        for n in 0u32..=31 {
            let active = current.cells().iter().filter(|c| **c).count();
            assert_eq!(active, 1usize << n.count_ones(), "generation {n}");
            current = stepper.step(&current).unwrap();
        }
    }

    #[test]
    fn test_dimensionality_mismatch() {
        let plane: Grid<bool> = Grid::new(8, 8, Boundary::Toroidal).unwrap();
        let mut stepper = Stepper::new(ElementaryRule::new(30), 0).unwrap();
        assert!(matches!(
            stepper.step(&plane),
            Err(ConfigError::DimensionMismatch { .. })
        ));
        assert_eq!(stepper.generation(), 0);

        let row: Grid<Life> = Grid::new(8, 1, Boundary::Toroidal).unwrap();
        let mut life = Stepper::new(LifeRule::conway(), 0).unwrap();
        assert!(life.check(&row).is_err());
        assert!(life.step(&row).is_err());
    }

    #[test]
    fn test_forest_fire_is_synchronous() {
        // A row of trees with fire at the left end: one cell ignites per step
        let mut cells = vec![Forest::Tree; 5 * 3];
        cells[5] = Forest::Burning;
        let grid = Grid::from_cells(5, 3, Boundary::Finite, cells).unwrap();
        let mut stepper = Stepper::new(ForestFireRule::new(0.0, 0.0, 1.0).unwrap(), 1).unwrap();

        let next = stepper.step(&grid).unwrap();
        assert_eq!(next.cell(0, 1), Some(Forest::Empty));
        // Column 1 neighbors the fire and ignites
        for y in 0..3 {
            assert_eq!(next.cell(1, y), Some(Forest::Burning));
        }
        // Column 2 only neighbors trees that were not yet burning
        for y in 0..3 {
            assert_eq!(next.cell(2, y), Some(Forest::Tree));
        }
    }

    #[test]
    fn test_stochastic_replay() {
        let grid = Grid::<Health>::new(24, 24, Boundary::Toroidal)
            .unwrap()
            .with_cell(12, 12, Health::Infected)
            .unwrap();
        let rule = EpidemicRule::new(0.4, 0.1, 0.05).unwrap();

        let mut a = Stepper::new(rule, 99).unwrap();
        let mut b = Stepper::new(rule, 99).unwrap();
        assert_eq!(a.run(&grid, 25).unwrap(), b.run(&grid, 25).unwrap());

        let mut c = Stepper::new(rule, 100).unwrap();
        let mut d = Stepper::new(rule, 99).unwrap();
        assert_ne!(c.run(&grid, 25).unwrap(), d.run(&grid, 25).unwrap());
    }

    #[test]
    fn test_set_parameter_is_atomic() {
        let mut stepper = Stepper::new(ForestFireRule::default(), 0).unwrap();
        assert!(stepper.set_parameter("p_growth", 3.0).is_err());
        assert_eq!(stepper.rule().p_growth(), 0.01);
        stepper.set_parameter("p_growth", 0.2).unwrap();
        assert_eq!(stepper.rule().p_growth(), 0.2);
    }

    #[test]
    fn test_diffusion_finite_no_flux() {
        let mut cells = vec![0.0f32; 6 * 4];
        cells[0] = 1.0;
        cells[23] = 0.5;
        let grid = Grid::from_cells(6, 4, Boundary::Finite, cells).unwrap();
        let mut stepper = Stepper::new(DiffusionRule::new(0.6, 0.0).unwrap(), 0).unwrap();

        let after = stepper.run(&grid, 50).unwrap();
        let before: f32 = grid.cells().iter().sum();
        let total: f32 = after.cells().iter().sum();
        assert!((total - before).abs() < 1e-4, "{before} -> {total}");
    }

    proptest! {
        #[test]
        fn prop_dead_grid_stays_dead(
            w in 3usize..12,
            h in 3usize..12,
            toroidal in any::<bool>(),
            steps in 1u64..10,
        ) {
            let boundary = if toroidal { Boundary::Toroidal } else { Boundary::Finite };
            let grid = life_grid(w, h, boundary, &[]);
            let mut stepper = Stepper::new(LifeRule::conway(), 0).unwrap();
            prop_assert_eq!(stepper.run(&grid, steps).unwrap(), grid);
        }

        #[test]
        fn prop_deterministic_rules_replay(
            cells in proptest::collection::vec(any::<bool>(), 100),
            seed_a in any::<u64>(),
            seed_b in any::<u64>(),
        ) {
            let life_cells: Vec<Life> = cells
                .iter()
                .map(|&c| if c { Life::Alive } else { Life::Dead })
                .collect();
            let grid = Grid::from_cells(10, 10, Boundary::Toroidal, life_cells).unwrap();
            let mut a = Stepper::new(LifeRule::conway(), seed_a).unwrap();
            let mut b = Stepper::new(LifeRule::conway(), seed_b).unwrap();
            prop_assert_eq!(a.run(&grid, 12).unwrap(), b.run(&grid, 12).unwrap());

            let row = Grid::from_cells(100, 1, Boundary::Toroidal, cells).unwrap();
            let mut e = Stepper::new(ElementaryRule::new(110), seed_a).unwrap();
            let mut f = Stepper::new(ElementaryRule::new(110), seed_b).unwrap();
            prop_assert_eq!(e.run(&row, 12).unwrap(), f.run(&row, 12).unwrap());
        }

        #[test]
        fn prop_diffusion_conserves_on_torus(
            cells in proptest::collection::vec(0.0f32..=1.0, 64),
            alpha in 0.0f32..=1.0,
            steps in 1u64..30,
        ) {
            let grid = Grid::from_cells(8, 8, Boundary::Toroidal, cells).unwrap();
            let mut stepper = Stepper::new(DiffusionRule::new(alpha, 0.0).unwrap(), 0).unwrap();
            let before: f64 = grid.cells().iter().map(|&v| f64::from(v)).sum();
            let after = stepper.run(&grid, steps).unwrap();
            let total: f64 = after.cells().iter().map(|&v| f64::from(v)).sum();
            prop_assert!((total - before).abs() < 1e-3, "{} -> {}", before, total);
        }
    }
}
