//! Structured, display-only view of a network.
//!
//! The snapshot is written out as JSON for editors and logs. Nothing reads it back.

use std::fmt;

use serde::Serialize;

use crate::{network::Network, neuron::Role};

#[derive(Debug, Clone, Serialize)]
pub struct NeuronSnapshot {
    pub id: String,
    pub role: Role,
    pub depth: Option<usize>,
    pub weights: Vec<f64>,
    pub parents: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<(f64, f64)>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NetworkSnapshot {
    pub neurons: Vec<NeuronSnapshot>,
    /// Neuron ids per layer. Empty while the order is not built.
    #[serde(rename = "neuronOrder")]
    pub neuron_order: Vec<Vec<String>>,
}

impl NetworkSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Network {
    pub fn snapshot(&self) -> NetworkSnapshot {
        let name_of = |id| {
            self.neuron(id)
                .map(|n| n.name().to_string())
                .unwrap_or_default()
        };

        let neurons = self
            .neurons()
            .map(|(id, neuron)| NeuronSnapshot {
                id: neuron.name().to_string(),
                role: neuron.role(),
                depth: neuron.depth(),
                weights: neuron.weights().to_vec(),
                parents: self
                    .parents_of(id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(name_of)
                    .collect(),
                position: neuron.position(),
            })
            .collect();

        let neuron_order = self
            .layers()
            .unwrap_or_default()
            .iter()
            .map(|layer| layer.iter().map(|&id| name_of(id)).collect())
            .collect();

        NetworkSnapshot {
            neurons,
            neuron_order,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = self.snapshot().to_json().map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::NetworkConfig;

    use super::*;
    use ndarray::arr1;
    use serde_json::{json, Value};

    fn small() -> Network {
        let mut net = Network::new(NetworkConfig::default().seed(5));
        let i = net.add_input(Some("N1"), 2).unwrap();
        let o = net.add_output(Some("N2")).unwrap();
        net.connect_child(i, o).unwrap();
        net.set_weights(i, arr1(&[0.0, 0.5, -0.5])).unwrap();
        net.set_weights(o, arr1(&[0.25, 1.0])).unwrap();
        net.set_position(o, 10.0, 20.0).unwrap();
        net
    }

    #[test]
    fn snapshot_before_order_is_built() {
        let snapshot = small().snapshot();
        assert!(snapshot.neuron_order.is_empty());
        assert_eq!(snapshot.neurons[1].depth, None);
        assert_eq!(snapshot.neurons[1].parents, vec!["N1".to_string()]);
    }

    #[test]
    fn snapshot_as_json() {
        let mut net = small();
        net.build_order().unwrap();
        let value: Value = serde_json::from_str(&net.to_string()).unwrap();

        assert_eq!(
            value,
            json!({
                "neurons": [
                    {
                        "id": "N1",
                        "role": "input",
                        "depth": 0,
                        "weights": [0.0, 0.5, -0.5],
                        "parents": [],
                    },
                    {
                        "id": "N2",
                        "role": "output",
                        "depth": 1,
                        "weights": [0.25, 1.0],
                        "parents": ["N1"],
                        "position": [10.0, 20.0],
                    },
                ],
                "neuronOrder": [["N1"], ["N2"]],
            })
        );
    }
}
