use crate::activation::ActivationKind;

/// Defaults stamped onto every neuron a network creates.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Multiplier applied when committing weight adjustments.
    pub learning_rate: f64,
    /// Transfer function of newly created neurons.
    pub activation: ActivationKind,
    /// Seed for weight initialisation and generated names. `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.033,
            activation: ActivationKind::LeakyRelu,
            seed: None,
        }
    }
}

impl NetworkConfig {
    pub fn learning_rate(self, learning_rate: f64) -> Self {
        Self {
            learning_rate,
            ..self
        }
    }

    pub fn activation(self, activation: ActivationKind) -> Self {
        Self { activation, ..self }
    }

    pub fn seed(self, seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..self
        }
    }
}
