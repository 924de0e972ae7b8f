//! Observation and action space descriptors.

/// Describes the set of valid observations or actions of an environment.
///
/// Samples are carried as flat `Vec<f32>` regardless of the variant, which is
/// the representation the vectorized layer stacks into batches. A discrete
/// space samples to a single-element vector holding the chosen index.
#[derive(Clone, Debug, PartialEq)]
pub enum Space {
    /// Continuous values with per-element bounds.
    Box {
        /// Lower bound for each element.
        low: Vec<f32>,
        /// Upper bound for each element.
        high: Vec<f32>,
        /// Shape of the space.
        shape: Vec<usize>,
    },

    /// `n` possible values: `{0, 1, .., n - 1}`.
    Discrete {
        /// Number of possible values.
        n: usize,
    },
}

impl Space {
    /// Creates a box space with the same bounds for all elements.
    pub fn uniform(shape: &[usize], low: f32, high: f32) -> Self {
        let n = shape.iter().product();
        Space::Box {
            low: vec![low; n],
            high: vec![high; n],
            shape: shape.to_vec(),
        }
    }

    /// Creates a discrete space with `n` values.
    pub fn discrete(n: usize) -> Self {
        assert!(n > 0, "Discrete space must have at least 1 element");
        Space::Discrete { n }
    }

    /// Returns the shape of samples from this space.
    pub fn shape(&self) -> &[usize] {
        match self {
            Space::Box { shape, .. } => shape,
            Space::Discrete { .. } => &[1],
        }
    }

    /// Returns the number of elements in a flattened sample.
    pub fn dim(&self) -> usize {
        self.shape().iter().product()
    }

    /// Samples a random element from this space.
    pub fn sample(&self, rng: &mut fastrand::Rng) -> Vec<f32> {
        match self {
            Space::Box { low, high, .. } => low
                .iter()
                .zip(high.iter())
                .map(|(&l, &h)| l + rng.f32() * (h - l))
                .collect(),
            Space::Discrete { n } => vec![rng.usize(0..*n) as f32],
        }
    }

    /// Checks if a flattened value is contained in this space.
    pub fn contains(&self, value: &[f32]) -> bool {
        match self {
            Space::Box { low, high, .. } => {
                value.len() == low.len()
                    && value
                        .iter()
                        .zip(low.iter())
                        .zip(high.iter())
                        .all(|((&v, &l), &h)| v >= l && v <= h)
            }
            Space::Discrete { n } => {
                value.len() == 1 && value[0] >= 0.0 && (value[0] as usize) < *n
            }
        }
    }
}
