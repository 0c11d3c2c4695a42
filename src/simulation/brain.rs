//! Fixed-topology feed-forward controller.
//!
//! The network is 4→3→3→2 and purely linear: each layer is a dot product
//! plus bias and the raw sums are passed on without an activation function.

use ndarray::{Array1, ArrayView1, s};

use super::genome::Genome;

/// Number of controller inputs.
pub const INPUT_SIZE: usize = 4;

/// Number of controller outputs: heading and signed thrust.
pub const OUTPUT_SIZE: usize = 2;

/// Bias ranges per layer within [`Genome::biases`].
const BIAS_SLICES: [(usize, usize); 3] = [(0, 3), (3, 6), (6, 8)];

/// Runs a forward pass through the controller described by `genome`.
///
/// # Arguments
///
/// * `input` - The four controller inputs
/// * `genome` - Weights and biases of the network
///
/// # Returns
///
/// `[heading_unit, thrust_signed]`.
#[inline]
pub fn feed_forward(input: &Array1<f32>, genome: &Genome) -> Array1<f32> {
    debug_assert_eq!(input.len(), INPUT_SIZE);

    let mut output = input.clone();
    for (weights, (start, end)) in genome.weights.iter().zip(BIAS_SLICES) {
        output = layer_forward(&output, weights, genome.biases.slice(s![start..end]));
    }
    output
}

#[inline]
fn layer_forward(
    inputs: &Array1<f32>,
    weights: &ndarray::Array2<f32>,
    biases: ArrayView1<'_, f32>,
) -> Array1<f32> {
    let mut output = weights.dot(inputs);
    output += &biases;
    output
}
