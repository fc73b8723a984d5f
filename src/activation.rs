use std::{fmt, str::FromStr};

use crate::error::NetworkError;

/// Scalar transfer function of a neuron.
///
/// `derivative` is expressed in terms of the activation's own output, which is the value a
/// neuron keeps around after its forward pass.
pub trait Activation: fmt::Debug {
    fn compute(&self, x: f64) -> f64;

    fn derivative(&self, output: f64) -> f64;
}

#[derive(Debug, Clone, Copy)]
pub struct Identity;

impl Activation for Identity {
    fn compute(&self, x: f64) -> f64 {
        x
    }

    fn derivative(&self, _output: f64) -> f64 {
        1.0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Sigmoid;

impl Activation for Sigmoid {
    fn compute(&self, x: f64) -> f64 {
        1.0 / (1.0 + (-x).exp())
    }

    fn derivative(&self, output: f64) -> f64 {
        output * (1.0 - output)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Relu;

impl Activation for Relu {
    fn compute(&self, x: f64) -> f64 {
        if x > 0.0 {
            x
        } else {
            0.0
        }
    }

    fn derivative(&self, output: f64) -> f64 {
        if output > 0.0 {
            1.0
        } else {
            0.0
        }
    }
}

/// Rectifier that keeps a small slope for negative inputs.
#[derive(Debug, Clone, Copy)]
pub struct LeakyRelu {
    slope: f64,
}

impl LeakyRelu {
    pub fn new(slope: f64) -> Self {
        Self { slope }
    }
}

impl Default for LeakyRelu {
    fn default() -> Self {
        Self::new(0.1)
    }
}

impl Activation for LeakyRelu {
    fn compute(&self, x: f64) -> f64 {
        if x > 0.0 {
            x
        } else {
            self.slope * x
        }
    }

    // The output keeps the sign of the input, so the branch is the same.
    fn derivative(&self, output: f64) -> f64 {
        if output > 0.0 {
            1.0
        } else {
            self.slope
        }
    }
}

/// Selects an activation by name, for configuration and the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivationKind {
    Identity,
    Sigmoid,
    Relu,
    #[default]
    LeakyRelu,
}

impl ActivationKind {
    pub fn build(&self) -> Box<dyn Activation> {
        match self {
            Self::Identity => Box::new(Identity),
            Self::Sigmoid => Box::new(Sigmoid),
            Self::Relu => Box::new(Relu),
            Self::LeakyRelu => Box::new(LeakyRelu::default()),
        }
    }
}

impl FromStr for ActivationKind {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "identity" => Ok(Self::Identity),
            "sigmoid" => Ok(Self::Sigmoid),
            "relu" => Ok(Self::Relu),
            "leaky-relu" | "leaky_relu" | "leakyrelu" => Ok(Self::LeakyRelu),
            _ => Err(NetworkError::UnknownActivation(s.to_string())),
        }
    }
}

impl fmt::Display for ActivationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Identity => "identity",
            Self::Sigmoid => "sigmoid",
            Self::Relu => "relu",
            Self::LeakyRelu => "leaky-relu",
        };
        f.write_str(name)
    }
}
