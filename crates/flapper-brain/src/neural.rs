//! Feed-forward neural controller
//!
//! Every neuron uses tanh, so outputs lie in (-1, 1). With the default jump
//! threshold of 0.5 a network has to be fairly confident before it jumps.

use flapper_core::{Controller, Observation};
use ndarray::{Array1, Array2, ArrayView1};

use crate::error::BrainResult;
use crate::genome::NetworkGenome;

#[derive(Debug, Clone)]
struct DenseLayer {
    /// Shape (outputs, inputs)
    weights: Array2<f32>,
    bias: Array1<f32>,
}

impl DenseLayer {
    fn forward(&self, input: ArrayView1<'_, f32>) -> Array1<f32> {
        let mut out = self.weights.dot(&input) + &self.bias;
        out.mapv_inplace(f32::tanh);
        out
    }
}

/// Network phenotype built from a [`NetworkGenome`]
#[derive(Debug, Clone)]
pub struct FeedForwardNetwork {
    layers: Vec<DenseLayer>,
    input_dim: usize,
    output_dim: usize,
}

impl FeedForwardNetwork {
    pub fn from_genome(genome: &NetworkGenome) -> BrainResult<Self> {
        genome.check()?;
        let sizes = genome.layers();
        let weights = genome.weights();
        let mut offset = 0;
        let mut layers = Vec::with_capacity(sizes.len() - 1);

        for pair in sizes.windows(2) {
            let (inputs, outputs) = (pair[0], pair[1]);
            let weight_end = offset + inputs * outputs;
            let bias_end = weight_end + outputs;

            layers.push(DenseLayer {
                weights: Array2::from_shape_vec(
                    (outputs, inputs),
                    weights[offset..weight_end].to_vec(),
                )?,
                bias: Array1::from(weights[weight_end..bias_end].to_vec()),
            });
            offset = bias_end;
        }

        Ok(Self {
            layers,
            input_dim: sizes[0],
            output_dim: sizes[sizes.len() - 1],
        })
    }

    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    pub fn output_dim(&self) -> usize {
        self.output_dim
    }

    /// Run the network
    ///
    /// Missing inputs are read as zero and extra inputs are ignored.
    pub fn forward(&self, inputs: &[f32]) -> Vec<f32> {
        let mut activation = Array1::from_shape_fn(self.input_dim, |i| {
            inputs.get(i).copied().unwrap_or(0.0)
        });
        for layer in &self.layers {
            activation = layer.forward(activation.view());
        }
        activation.to_vec()
    }
}

impl Controller for FeedForwardNetwork {
    fn evaluate(&self, inputs: &Observation) -> Vec<f32> {
        self.forward(inputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    #[test]
    fn test_single_layer_matches_hand_computation() {
        // out = tanh(0.5*y - 1.0*d1 + 0.25*d2 + 0.1)
        let genome = NetworkGenome::from_weights(vec![3, 1], vec![0.5, -1.0, 0.25, 0.1]).unwrap();
        let net = FeedForwardNetwork::from_genome(&genome).unwrap();

        let out = net.forward(&[2.0, 1.0, 4.0]);
        let expected = (1.0_f32 - 1.0 + 1.0 + 0.1).tanh();
        assert_eq!(out.len(), 1);
        assert!((out[0] - expected).abs() < 1e-6);
    }

    #[test]
    fn test_hidden_layer_shapes() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
        let genome = NetworkGenome::random(&[3, 6, 4, 2], &mut rng).unwrap();
        let net = FeedForwardNetwork::from_genome(&genome).unwrap();

        assert_eq!(net.input_dim(), 3);
        assert_eq!(net.output_dim(), 2);
        let out = net.forward(&[350.0, 20.0, 180.0]);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|v| v.abs() <= 1.0));
    }

    #[test]
    fn test_zero_weights_output_zero() {
        let genome = NetworkGenome::from_weights(vec![3, 2, 1], vec![0.0; 11]).unwrap();
        let net = FeedForwardNetwork::from_genome(&genome).unwrap();
        assert_eq!(net.forward(&[1.0, 2.0, 3.0]), vec![0.0]);
    }

    #[test]
    fn test_controller_jumps_on_positive_drive() {
        use flapper_core::ControllerBinding;

        // tanh(y / 100) > 0.5 once y > ~55
        let genome = NetworkGenome::from_weights(vec![3, 1], vec![0.01, 0.0, 0.0, 0.0]).unwrap();
        let net = FeedForwardNetwork::from_genome(&genome).unwrap();
        let mut fitness = 0.0;
        let binding = ControllerBinding::new(&net, &mut fitness);

        assert!(!binding.decide(&[10.0, 0.0, 0.0], 0.5));
        assert!(binding.decide(&[300.0, 0.0, 0.0], 0.5));
    }
}
