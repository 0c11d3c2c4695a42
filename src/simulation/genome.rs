//! Genome representation, mutation and the speciation divergence metric.
//!
//! A genome holds the parameters of the fixed 4→3→3→2 controller: three
//! weight matrices stored `(outputs × inputs)` and one bias vector covering
//! all eight neurons.

use ndarray::{Array1, Array2};
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::Uniform;
use serde::{Deserialize, Serialize};

/// Weight matrix shapes, `(outputs, inputs)`, from input to output layer.
pub const LAYER_SHAPES: [(usize, usize); 3] = [(3, 4), (3, 3), (2, 3)];

/// Number of biases: one per hidden and output neuron.
pub const BIAS_COUNT: usize = 8;

/// Multiplicative range applied to each weight on mutation.
pub const WEIGHT_FACTOR_RANGE: (f32, f32) = (0.8, 1.2);

/// Additive range applied to each bias on mutation.
pub const BIAS_DELTA_RANGE: (f32, f32) = (-1.0, 1.0);

/// Neural controller parameters of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    /// Weight matrices from input to output layer.
    pub weights: [Array2<f32>; 3],
    /// Biases: hidden layer 1 uses `0..3`, hidden layer 2 `3..6`, output `6..8`.
    pub biases: Array1<f32>,
}

impl Genome {
    /// Creates a genome with every weight and bias uniform in `[-1, 1]`.
    ///
    /// Only used for nodes that have no parent.
    pub fn random() -> Self {
        let dist = Uniform::new_inclusive(-1.0, 1.0);
        Self {
            weights: LAYER_SHAPES.map(|shape| Array2::random(shape, dist)),
            biases: Array1::random(BIAS_COUNT, dist),
        }
    }

    /// Returns a mutated copy: weights scaled and biases shifted element-wise.
    pub fn mutated(&self) -> Self {
        Self {
            weights: mutate_weights(&self.weights),
            biases: mutate_biases(&self.biases),
        }
    }

    /// Number of weights plus biases.
    pub fn parameter_count(&self) -> usize {
        self.weights.iter().map(Array2::len).sum::<usize>() + self.biases.len()
    }

    /// All weights, layer by layer in row-major order, followed by the biases.
    pub fn values(&self) -> impl Iterator<Item = f32> + '_ {
        self.weights
            .iter()
            .flat_map(|w| w.iter().copied())
            .chain(self.biases.iter().copied())
    }
}

/// Multiplies every weight by an independent factor drawn from `[0.8, 1.2]`.
pub fn mutate_weights(weights: &[Array2<f32>; 3]) -> [Array2<f32>; 3] {
    let dist = Uniform::new_inclusive(WEIGHT_FACTOR_RANGE.0, WEIGHT_FACTOR_RANGE.1);
    weights
        .clone()
        .map(|w| &w * &Array2::random(w.dim(), dist))
}

/// Adds an independent delta drawn from `[-1, 1]` to every bias.
pub fn mutate_biases(biases: &Array1<f32>) -> Array1<f32> {
    let dist = Uniform::new_inclusive(BIAS_DELTA_RANGE.0, BIAS_DELTA_RANGE.1);
    biases + &Array1::random(biases.len(), dist)
}

/// The heritable traits compared when deciding on speciation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phenotype {
    /// Controller parameters.
    pub genome: Genome,
    /// Body radius.
    pub radius: f32,
    /// Seconds between reproduction attempts.
    pub reproduction_rate: f32,
}

impl Phenotype {
    /// Mean relative difference of `self` against a `reference`.
    ///
    /// Averages `|child / reference - 1|` over every weight, every bias, the
    /// radius and the reproduction rate. A reference element of exactly zero
    /// contributes `+∞`, so any zero in the reference forces divergence.
    pub fn divergence(&self, reference: &Phenotype) -> f32 {
        let pairs = self
            .genome
            .values()
            .zip(reference.genome.values())
            .chain([
                (self.radius, reference.radius),
                (self.reproduction_rate, reference.reproduction_rate),
            ]);

        let mut total = 0.0;
        let mut count = 0usize;
        for (child, parent) in pairs {
            total += relative_difference(child, parent);
            count += 1;
        }

        if count == 0 { 0.0 } else { total / count as f32 }
    }

    /// True when divergence from `reference` is strictly above `threshold`.
    pub fn should_speciate(&self, reference: &Phenotype, threshold: f32) -> bool {
        self.divergence(reference) > threshold
    }
}

fn relative_difference(child: f32, parent: f32) -> f32 {
    if parent == 0.0 {
        return f32::INFINITY;
    }
    (child / parent - 1.0).abs()
}
