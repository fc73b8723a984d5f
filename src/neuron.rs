use std::iter;

use ndarray::{Array, Array1, ArrayView1};
use ndarray_rand::{rand::Rng, rand_distr::Uniform, RandomExt};
use serde::Serialize;
use tracing::warn;

use crate::{
    activation::Activation,
    connection::ConnectionId,
    error::{NetworkError, Result},
};

/// Part a neuron plays in the network, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Fed the external input vector directly.
    Input,
    Hidden,
    /// Reports its output to the caller and learns from a target value.
    Output,
}

/// Draw `len` weights uniformly from `[-1, 1)`.
pub(crate) fn random_weights<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Array1<f64> {
    Array::random_using(len, Uniform::new(-1.0, 1.0), rng)
}

/// Generate a 14 character lowercase identifier.
pub(crate) fn random_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..14).map(|_| rng.gen_range(b'a'..=b'z') as char).collect()
}

/// Weighted sum plus activation over a bias-augmented input.
///
/// `weights`, `weight_adj` and `inputs` always have the same length, one more than the
/// neuron's arity: slot 0 pairs the bias weight with a constant `1.0` input.
#[derive(Debug)]
pub struct Neuron {
    name: String,
    role: Role,
    pub(crate) depth: Option<usize>,
    pub(crate) parents: Vec<ConnectionId>,
    pub(crate) children: Vec<ConnectionId>,
    weights: Array1<f64>,
    weight_adj: Array1<f64>,
    inputs: Array1<f64>,
    output: f64,
    delta: f64,
    error: f64,
    learning_rate: f64,
    activation: Box<dyn Activation>,
    position: Option<(f64, f64)>,
}

impl Neuron {
    pub fn new<R: Rng + ?Sized>(
        name: impl Into<String>,
        role: Role,
        arity: usize,
        learning_rate: f64,
        activation: Box<dyn Activation>,
        rng: &mut R,
    ) -> Self {
        let weights = random_weights(arity + 1, rng);
        Neuron::with_weights(name, role, weights, learning_rate, activation)
    }

    pub fn with_weights(
        name: impl Into<String>,
        role: Role,
        weights: Array1<f64>,
        learning_rate: f64,
        activation: Box<dyn Activation>,
    ) -> Self {
        // There is always at least the bias weight.
        let weights = if weights.is_empty() {
            Array1::zeros(1)
        } else {
            weights
        };
        let len = weights.len();
        Self {
            name: name.into(),
            role,
            depth: None,
            parents: Vec::new(),
            children: Vec::new(),
            weights,
            weight_adj: Array1::zeros(len),
            inputs: Array1::zeros(len),
            output: 0.0,
            delta: 0.0,
            error: 0.0,
            learning_rate,
            activation,
            position: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_input(&self) -> bool {
        self.role == Role::Input
    }

    /// Topological depth, `None` until the order is built or while unreachable from any input.
    pub fn depth(&self) -> Option<usize> {
        self.depth
    }

    /// Number of values this neuron consumes, excluding the bias.
    pub fn arity(&self) -> usize {
        self.weights.len() - 1
    }

    pub fn parent_count(&self) -> usize {
        self.parents.len()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn weights(&self) -> ArrayView1<'_, f64> {
        self.weights.view()
    }

    /// Adjustments computed by the latest backward pass and not yet applied.
    pub fn weight_adjustments(&self) -> ArrayView1<'_, f64> {
        self.weight_adj.view()
    }

    /// Bias-augmented input of the latest forward pass.
    pub fn inputs(&self) -> ArrayView1<'_, f64> {
        self.inputs.view()
    }

    pub fn output(&self) -> f64 {
        self.output
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    pub fn error(&self) -> f64 {
        self.error
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn set_learning_rate(&mut self, learning_rate: f64) {
        self.learning_rate = learning_rate;
    }

    pub fn position(&self) -> Option<(f64, f64)> {
        self.position
    }

    pub fn set_position(&mut self, x: f64, y: f64) {
        self.position = Some((x, y));
    }

    pub fn set_weights(&mut self, weights: Array1<f64>) -> Result<()> {
        if weights.len() != self.weights.len() {
            return Err(NetworkError::DimensionMismatch {
                expected: self.weights.len(),
                actual: weights.len(),
            });
        }
        self.weights = weights;
        Ok(())
    }

    /// Resize the weight vector to `len`, appending fresh random weights with zeroed
    /// adjustments. Shrinking would silently misalign the remaining weights with their
    /// parents, so it is refused.
    pub(crate) fn resize_weights<R: Rng + ?Sized>(&mut self, len: usize, rng: &mut R) -> Result<()> {
        let current = self.weights.len();
        if len < current {
            return Err(NetworkError::UnsupportedTopologyEdit(format!(
                "`{}` cannot drop weights ({} -> {})",
                self.name, current, len
            )));
        }
        if len == current {
            return Ok(());
        }

        let extra = len - current;
        let fresh = random_weights(extra, rng);
        self.weights = self.weights.iter().chain(fresh.iter()).copied().collect();
        self.weight_adj = pad_zeros(&self.weight_adj, extra);
        self.inputs = pad_zeros(&self.inputs, extra);
        Ok(())
    }

    pub(crate) fn reset_weights<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.weights = random_weights(self.weights.len(), rng);
        self.weight_adj.fill(0.0);
    }

    /// Compute the output for `values`, one per parent (or the external input for an input
    /// neuron). Overwrites `inputs` and `output`.
    pub fn forward(&mut self, values: ArrayView1<'_, f64>) -> Result<f64> {
        if values.len() != self.arity() {
            return Err(NetworkError::DimensionMismatch {
                expected: self.arity(),
                actual: values.len(),
            });
        }

        let inputs: Array1<f64> = iter::once(1.0).chain(values.iter().copied()).collect();
        let dot_product = self.weights.dot(&inputs);
        self.inputs = inputs;
        self.output = self.activation.compute(dot_product);
        Ok(self.output)
    }

    /// Delta of an output neuron against its target value.
    pub fn backward_output(&mut self, expected: f64) {
        self.error = expected - self.output;
        self.delta = self.error * self.activation.derivative(self.output);

        if self.delta == 0.0 || !self.delta.is_finite() {
            warn!(
                neuron = %self.name,
                error = self.error,
                delta = self.delta,
                "degenerate output delta, neuron cannot learn from this sample"
            );
        }

        self.weight_adj = &self.inputs * self.delta;
    }

    /// Delta of a hidden neuron. `downstream` is the sum of `child.delta * child_weight`
    /// over every child, taking the weight each child applies to this neuron.
    pub fn backward_hidden(&mut self, downstream: f64) {
        self.delta = downstream * self.activation.derivative(self.output);
        self.weight_adj = &self.inputs * self.delta;
    }

    pub fn apply_adjustments(&mut self) {
        self.weights.scaled_add(self.learning_rate, &self.weight_adj);
    }
}

fn pad_zeros(values: &Array1<f64>, extra: usize) -> Array1<f64> {
    values
        .iter()
        .copied()
        .chain(iter::repeat(0.0).take(extra))
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::{activation::LeakyRelu, assert_rel_eq_arr1};

    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{arr1, aview1};
    use ndarray_rand::rand::{rngs::StdRng, SeedableRng};

    fn fixed(weights: &[f64]) -> Neuron {
        Neuron::with_weights(
            "n",
            Role::Hidden,
            arr1(weights),
            0.1,
            Box::new(LeakyRelu::default()),
        )
    }

    #[test]
    fn forward_prepends_bias() {
        let mut neuron = fixed(&[0.5, 1.0, -1.0]);
        let output = neuron.forward(aview1(&[2.0, 1.0])).unwrap();
        assert_relative_eq!(output, 1.5);
        assert_rel_eq_arr1!(neuron.inputs(), arr1(&[1.0, 2.0, 1.0]));

        let output = neuron.forward(aview1(&[0.0, 2.0])).unwrap();
        assert_relative_eq!(output, -0.15, epsilon = 1e-12);
    }

    #[test]
    fn forward_rejects_wrong_arity() {
        let mut neuron = fixed(&[0.5, 1.0, -1.0]);
        let err = neuron.forward(aview1(&[1.0])).unwrap_err();
        assert!(matches!(
            err,
            NetworkError::DimensionMismatch {
                expected: 2,
                actual: 1
            }
        ));
        assert_relative_eq!(neuron.output(), 0.0);
    }

    #[test]
    fn output_delta_and_commit() {
        let mut neuron = fixed(&[0.5, 1.0, -1.0]);
        neuron.forward(aview1(&[2.0, 1.0])).unwrap();
        neuron.backward_output(2.0);

        assert_relative_eq!(neuron.error(), 0.5);
        assert_relative_eq!(neuron.delta(), 0.5);
        assert_rel_eq_arr1!(neuron.weight_adjustments(), arr1(&[0.5, 1.0, 0.5]));

        // Weights stay put until the adjustments are committed.
        assert_rel_eq_arr1!(neuron.weights(), arr1(&[0.5, 1.0, -1.0]));
        neuron.apply_adjustments();
        assert_rel_eq_arr1!(neuron.weights(), arr1(&[0.55, 1.1, -0.95]));
    }

    #[test]
    fn hidden_delta_uses_own_derivative() {
        let mut neuron = fixed(&[0.5, 1.0, -1.0]);
        neuron.forward(aview1(&[0.0, 2.0])).unwrap();
        neuron.backward_hidden(0.4);

        assert_relative_eq!(neuron.delta(), 0.04, epsilon = 1e-12);
        assert_rel_eq_arr1!(neuron.weight_adjustments(), arr1(&[0.04, 0.0, 0.08]));
    }

    #[test]
    fn degenerate_delta_is_not_fatal() {
        let mut neuron = fixed(&[1.0, 0.0]);
        neuron.forward(aview1(&[3.0])).unwrap();
        neuron.backward_output(1.0);
        assert_relative_eq!(neuron.delta(), 0.0);
        neuron.apply_adjustments();
        assert_rel_eq_arr1!(neuron.weights(), arr1(&[1.0, 0.0]));
    }

    #[test]
    fn resize_grows_but_never_shrinks() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut neuron = Neuron::new(
            "n",
            Role::Hidden,
            0,
            0.1,
            Box::new(LeakyRelu::default()),
            &mut rng,
        );
        assert_eq!(neuron.arity(), 0);

        neuron.resize_weights(3, &mut rng).unwrap();
        assert_eq!(neuron.weights().len(), 3);
        assert_eq!(neuron.inputs().len(), 3);
        assert_rel_eq_arr1!(neuron.weight_adjustments(), arr1(&[0.0, 0.0, 0.0]));
        assert!(neuron.weights().iter().all(|w| (-1.0..1.0).contains(w)));

        let before = neuron.weights().to_owned();
        assert!(matches!(
            neuron.resize_weights(2, &mut rng),
            Err(NetworkError::UnsupportedTopologyEdit(_))
        ));
        assert_rel_eq_arr1!(neuron.weights(), before);
    }

    #[test]
    fn set_weights_checks_length() {
        let mut neuron = fixed(&[0.5, 1.0]);
        assert!(neuron.set_weights(arr1(&[1.0, 2.0, 3.0])).is_err());
        neuron.set_weights(arr1(&[1.0, 2.0])).unwrap();
        assert_rel_eq_arr1!(neuron.weights(), arr1(&[1.0, 2.0]));
    }

    #[test]
    fn generated_names_are_lowercase() {
        let mut rng = StdRng::seed_from_u64(1);
        let name = random_name(&mut rng);
        assert_eq!(name.len(), 14);
        assert!(name.chars().all(|c| c.is_ascii_lowercase()));
    }
}
