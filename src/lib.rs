//! Trainable feed-forward networks over an arbitrary DAG of neurons.
//!
//! Neurons are wired one edge at a time, the network infers a depth for every neuron
//! reachable from an input, and forward and backward passes walk the resulting layers.

pub mod activation;
pub mod config;
pub mod connection;
pub mod data;
pub mod error;
pub mod loss;
pub mod network;
pub mod neuron;
mod order;
pub mod snapshot;
pub mod trainer;

pub use activation::{Activation, ActivationKind};
pub use config::NetworkConfig;
pub use connection::{Connection, NeuronId};
pub use data::DataLoader;
pub use error::{NetworkError, Result};
pub use network::Network;
pub use neuron::{Neuron, Role};
pub use trainer::Trainer;

#[macro_export]
macro_rules! assert_rel_eq_arr1 {
    ($actual:expr, $expected:expr) => {
        assert_eq!($actual.shape(), $expected.shape());
        ndarray::Zip::from(&$actual)
            .and(&$expected)
            .for_each(|v, w| {
                assert_relative_eq!(v, w, epsilon = 1e-12);
            });
    };
}
