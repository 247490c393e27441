use rand::{SeedableRng as _, seq::SliceRandom as _};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

/// How rows are divided into a train and a held-out partition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Fraction of rows held out, in `[0, 1]`. The held-out count is rounded up.
    pub test_fraction: f64,
    /// Seed of the shuffle; the same seed always yields the same partition.
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.1,
            seed: 42,
        }
    }
}

/// Row ids of the two partitions, each sorted ascending.
///
/// Ids refer to rows of the original matrix, so a rule's matched ids can be
/// looked up in any other per-row table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

impl Partition {
    /// Shuffles `0..num_rows` with a seeded generator and cuts it in two.
    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    #[must_use]
    pub fn split(num_rows: usize, config: &SplitConfig) -> Self {
        let fraction = config.test_fraction.clamp(0.0, 1.0);
        let test_count = ((num_rows as f64 * fraction).ceil() as usize).min(num_rows);

        let mut ids = (0..num_rows).collect::<Vec<_>>();
        let mut rng = Pcg64::seed_from_u64(config.seed);
        ids.shuffle(&mut rng);

        let mut test = ids[..test_count].to_vec();
        let mut train = ids[test_count..].to_vec();
        test.sort_unstable();
        train.sort_unstable();
        tracing::debug!(
            train = train.len(),
            test = test.len(),
            seed = config.seed,
            "partitioned rows"
        );
        Self { train, test }
    }

    /// Puts every row in the train partition.
    #[must_use]
    pub fn all_train(num_rows: usize) -> Self {
        Self {
            train: (0..num_rows).collect(),
            test: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_holds_out_a_tenth() {
        let partition = Partition::split(100, &SplitConfig::default());
        assert_eq!(partition.test.len(), 10);
        assert_eq!(partition.train.len(), 90);
    }

    #[test]
    fn test_rounds_held_out_count_up() {
        let partition = Partition::split(11, &SplitConfig::default());
        assert_eq!(partition.test.len(), 2);
    }

    #[test]
    fn test_partitions_are_disjoint_and_complete() {
        let partition = Partition::split(257, &SplitConfig::default());
        let mut all = partition.train.clone();
        all.extend(&partition.test);
        all.sort_unstable();
        assert_eq!(all, (0..257).collect::<Vec<_>>());
        assert!(partition.train.is_sorted());
        assert!(partition.test.is_sorted());
    }

    #[test]
    fn test_same_seed_same_partition() {
        let config = SplitConfig {
            test_fraction: 0.25,
            seed: 9,
        };
        assert_eq!(Partition::split(80, &config), Partition::split(80, &config));
        let other = SplitConfig { seed: 10, ..config };
        assert_ne!(Partition::split(80, &config), Partition::split(80, &other));
    }

    #[test]
    fn test_zero_fraction_keeps_everything_in_train() {
        let config = SplitConfig {
            test_fraction: 0.0,
            ..SplitConfig::default()
        };
        assert_eq!(Partition::split(20, &config), Partition::all_train(20));
    }
}
