use std::collections::VecDeque;

use tracing::{debug, info};

use crate::{
    connection::{Connection, NeuronId},
    error::{NetworkError, Result},
    neuron::{Neuron, Role},
};

/// Neurons grouped by depth, plus the outputs reported by a forward pass.
#[derive(Debug, Clone, Default)]
pub(crate) struct Order {
    /// `layers[d]` holds every reachable neuron of depth `d`, in insertion order.
    pub layers: Vec<Vec<NeuronId>>,
    /// Reachable output neurons, in insertion order.
    pub outputs: Vec<NeuronId>,
}

/// Validate roles, assign depths and group the neurons into layers.
pub(crate) fn build(neurons: &mut [Neuron], connections: &[Connection]) -> Result<Order> {
    if let Some(neuron) = neurons
        .iter()
        .find(|n| n.role() == Role::Output && n.child_count() > 0)
    {
        return Err(NetworkError::InvalidRole(format!(
            "output neuron `{}` has {} children",
            neuron.name(),
            neuron.child_count()
        )));
    }

    assign_depths(neurons, connections);

    let max_depth = neurons.iter().filter_map(Neuron::depth).max();
    let mut layers = vec![Vec::new(); max_depth.map_or(1, |depth| depth + 1)];
    let mut outputs = Vec::new();
    let mut dormant = 0;
    for (index, neuron) in neurons.iter().enumerate() {
        match neuron.depth() {
            Some(depth) => {
                layers[depth].push(NeuronId(index));
                if neuron.role() == Role::Output {
                    outputs.push(NeuronId(index));
                }
            }
            None => {
                debug!(neuron = neuron.name(), "unreachable from any input, left dormant");
                dormant += 1;
            }
        }
    }

    info!(
        layers = layers.len(),
        outputs = outputs.len(),
        dormant,
        "built neuron order"
    );
    Ok(Order { layers, outputs })
}

/// Set every neuron's depth to the length of the longest path reaching it from an input.
///
/// Relaxes depths breadth-first from all inputs at once, re-queueing a neuron whenever a
/// longer path to it is found. Terminates because the graph is acyclic. Neurons with no
/// path from an input keep `None`.
pub(crate) fn assign_depths(neurons: &mut [Neuron], connections: &[Connection]) {
    let mut queue = VecDeque::new();
    for (index, neuron) in neurons.iter_mut().enumerate() {
        if neuron.is_input() {
            neuron.depth = Some(0);
            queue.push_back(index);
        } else {
            neuron.depth = None;
        }
    }

    while let Some(index) = queue.pop_front() {
        let Some(depth) = neurons[index].depth else {
            continue;
        };
        let children: Vec<usize> = neurons[index]
            .children
            .iter()
            .map(|edge| connections[edge.0].child.0)
            .collect();

        for child in children {
            if neurons[child].depth.map_or(true, |current| current < depth + 1) {
                neurons[child].depth = Some(depth + 1);
                queue.push_back(child);
            }
        }
    }
}
