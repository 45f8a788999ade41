use rand::Rng;
use rand::seq::SliceRandom;

use super::*;

/// Uniform placement with no first-reveal protection: every cell is equally likely to hold a mine.
///
/// Borrows the random source so callers decide how it is seeded.
#[derive(Debug)]
pub struct RandomMineLayoutGenerator<'a, R: ?Sized> {
    rng: &'a mut R,
}

impl<'a, R: Rng + ?Sized> RandomMineLayoutGenerator<'a, R> {
    pub fn new(rng: &'a mut R) -> Self {
        Self { rng }
    }
}

impl<R: Rng + ?Sized> MineLayoutGenerator for RandomMineLayoutGenerator<'_, R> {
    fn generate(self, config: BoardConfig) -> MineLayout {
        let total_cells = usize::from(config.total_cells());
        let mines = usize::from(config.mines());

        // Fisher-Yates over the flat indices, the shuffled prefix holds the mines
        let mut indices: Vec<usize> = (0..total_cells).collect();
        let (chosen, _) = indices.partial_shuffle(self.rng, mines);

        let mut mine_mask: Array2<bool> = Array2::default(config.to_nd_shape());
        {
            let cells = mine_mask
                .as_slice_mut()
                .expect("freshly allocated arrays are in standard layout");
            for &index in chosen.iter() {
                cells[index] = true;
            }
        }

        let layout = MineLayout::from_mine_mask(mine_mask);
        if layout.mine_count() != config.mines() {
            log::warn!(
                "Generated layout count mismatch, actual: {}, requested: {}",
                layout.mine_count(),
                config.mines()
            );
        }
        log::debug!(
            "Generated {}x{} layout with {} mines",
            config.rows(),
            config.columns(),
            layout.mine_count()
        );
        layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn generate(config: BoardConfig, seed: u64) -> MineLayout {
        let mut rng = SmallRng::seed_from_u64(seed);
        RandomMineLayoutGenerator::new(&mut rng).generate(config)
    }

    #[test]
    fn places_exact_mine_count_for_every_preset() {
        for (rows, columns, mines) in [(9, 9, 10), (16, 16, 40), (32, 8, 40), (16, 30, 99), (48, 10, 99)] {
            let config = BoardConfig::new(rows, columns, mines).unwrap();
            for seed in 0..20 {
                let layout = generate(config, seed);
                assert_eq!(layout.mine_count(), mines);
                assert_eq!(layout.mine_positions().len(), usize::from(mines));
                assert!(layout
                    .mine_positions()
                    .iter()
                    .all(|pos| pos.is_within(rows, columns)));
            }
        }
    }

    #[test]
    fn same_seed_gives_same_layout() {
        let config = BoardConfig::new(16, 30, 99).unwrap();
        assert_eq!(generate(config, 7), generate(config, 7));
        assert_ne!(generate(config, 7), generate(config, 8));
    }

    #[test]
    fn nearly_full_board_leaves_one_safe_cell() {
        let config = BoardConfig::new(3, 3, 8).unwrap();
        let layout = generate(config, 42);
        assert_eq!(layout.safe_cell_count(), 1);
    }

    #[test]
    fn every_cell_can_receive_a_mine() {
        let config = BoardConfig::new(3, 3, 1).unwrap();
        let mut seen = [false; 9];
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..500 {
            let layout = RandomMineLayoutGenerator::new(&mut rng).generate(config);
            let pos = layout.mine_positions()[0];
            seen[usize::from(pos.row - 1) * 3 + usize::from(pos.column - 1)] = true;
        }
        assert!(seen.iter().all(|&hit| hit));
    }
}
