use crate::config::BoundaryPolicy;
use rand::Rng;
use std::collections::BTreeMap;

/// Grid cell coordinate `[x, y]`.
pub type Cell = [usize; 2];

/// Bounded 2D grid holding a multiset of food items.
/// Several items may share a cell; each is eaten separately.
#[derive(Clone, Debug)]
pub struct Environment {
    width: usize,
    height: usize,
    food: BTreeMap<Cell, u32>,
    food_total: usize,
}

impl Environment {
    /// Panics if either dimension is zero; `SimConfig::validate` rejects that first.
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0 && height > 0, "grid dimensions must be positive");
        Self {
            width,
            height,
            food: BTreeMap::new(),
            food_total: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell[0] < self.width && cell[1] < self.height
    }

    pub fn random_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Cell {
        [
            rng.random_range(0..self.width),
            rng.random_range(0..self.height),
        ]
    }

    /// Uniform cell on one of the four grid edges, the edge chosen uniformly.
    pub fn random_edge_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Cell {
        let x = rng.random_range(0..self.width);
        let y = rng.random_range(0..self.height);
        match rng.random_range(0..4u8) {
            0 => [x, 0],
            1 => [x, self.height - 1],
            2 => [0, y],
            _ => [self.width - 1, y],
        }
    }

    /// Scatter `count` independently uniform food items. Existing food is kept.
    pub fn spawn_food<R: Rng + ?Sized>(&mut self, rng: &mut R, count: usize) {
        for _ in 0..count {
            let cell = self.random_cell(rng);
            self.add_food(cell);
        }
    }

    pub fn add_food(&mut self, cell: Cell) {
        debug_assert!(self.contains(cell), "food cell out of bounds");
        *self.food.entry(cell).or_insert(0) += 1;
        self.food_total += 1;
    }

    /// Remove one food item at `cell`. Returns whether anything was eaten.
    pub fn consume(&mut self, cell: Cell) -> bool {
        let Some(count) = self.food.get_mut(&cell) else {
            return false;
        };
        *count -= 1;
        if *count == 0 {
            self.food.remove(&cell);
        }
        self.food_total -= 1;
        true
    }

    pub fn clear_food(&mut self) {
        self.food.clear();
        self.food_total = 0;
    }

    pub fn food_at(&self, cell: Cell) -> u32 {
        self.food.get(&cell).copied().unwrap_or(0)
    }

    pub fn food_count(&self) -> usize {
        self.food_total
    }

    /// Every food item's cell, duplicates repeated, in row-major cell order.
    pub fn food_positions(&self) -> Vec<Cell> {
        self.food
            .iter()
            .flat_map(|(&cell, &n)| std::iter::repeat_n(cell, n as usize))
            .collect()
    }

    /// Apply a signed step to `cell` and bring the result back onto the grid.
    pub fn step_cell(&self, cell: Cell, delta: [isize; 2], policy: BoundaryPolicy) -> Cell {
        [
            Self::step_axis(cell[0], delta[0], self.width, policy),
            Self::step_axis(cell[1], delta[1], self.height, policy),
        ]
    }

    fn step_axis(coord: usize, delta: isize, len: usize, policy: BoundaryPolicy) -> usize {
        let moved = coord as isize + delta;
        match policy {
            BoundaryPolicy::Wrap => moved.rem_euclid(len as isize) as usize,
            BoundaryPolicy::Clamp => moved.clamp(0, len as isize - 1) as usize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    #[test]
    fn spawned_food_lies_on_the_grid() {
        let mut env = Environment::new(7, 3);
        let mut rng = ChaCha12Rng::seed_from_u64(11);
        env.spawn_food(&mut rng, 200);
        assert_eq!(env.food_count(), 200);
        assert_eq!(env.food_positions().len(), 200);
        assert!(env.food_positions().iter().all(|&c| env.contains(c)));
    }

    #[test]
    fn edge_cells_touch_a_border() {
        let env = Environment::new(6, 4);
        let mut rng = ChaCha12Rng::seed_from_u64(5);
        for _ in 0..500 {
            let [x, y] = env.random_edge_cell(&mut rng);
            assert!(env.contains([x, y]));
            assert!(x == 0 || x == 5 || y == 0 || y == 3, "interior cell {x},{y}");
        }
    }

    #[test]
    fn spawn_accumulates_until_cleared() {
        let mut env = Environment::new(10, 10);
        let mut rng = ChaCha12Rng::seed_from_u64(3);
        env.spawn_food(&mut rng, 5);
        env.spawn_food(&mut rng, 5);
        assert_eq!(env.food_count(), 10);
        env.clear_food();
        assert_eq!(env.food_count(), 0);
        assert!(env.food_positions().is_empty());
    }

    #[test]
    fn consume_removes_one_duplicate_at_a_time() {
        let mut env = Environment::new(4, 4);
        env.add_food([2, 1]);
        env.add_food([2, 1]);
        env.add_food([0, 3]);
        assert_eq!(env.food_at([2, 1]), 2);

        assert!(env.consume([2, 1]));
        assert_eq!(env.food_at([2, 1]), 1);
        assert_eq!(env.food_count(), 2);

        assert!(env.consume([2, 1]));
        assert!(!env.consume([2, 1]));
        assert_eq!(env.food_count(), 1);
        assert!(!env.consume([1, 1]));
        assert_eq!(env.food_positions(), vec![[0, 3]]);
    }

    #[test]
    fn wrap_and_clamp_disagree_only_at_edges() {
        let env = Environment::new(10, 5);
        assert_eq!(env.step_cell([0, 0], [-1, -1], BoundaryPolicy::Wrap), [9, 4]);
        assert_eq!(env.step_cell([0, 0], [-1, -1], BoundaryPolicy::Clamp), [0, 0]);
        assert_eq!(env.step_cell([9, 4], [1, 1], BoundaryPolicy::Wrap), [0, 0]);
        assert_eq!(env.step_cell([9, 4], [1, 1], BoundaryPolicy::Clamp), [9, 4]);
        for policy in [BoundaryPolicy::Wrap, BoundaryPolicy::Clamp] {
            assert_eq!(env.step_cell([4, 2], [1, -1], policy), [5, 1]);
        }
    }
}
