use serde::Serialize;

/// Handle of a neuron inside a [`Network`](crate::network::Network).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NeuronId(pub(crate) usize);

impl NeuronId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Handle of an edge in the network's connection table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(pub(crate) usize);

/// A directed edge `parent -> child`.
///
/// `slot` is the position of `parent` among the child's parents, so the weight the child
/// applies to this edge lives at `weights[slot + 1]` (slot 0 of the weights is the bias).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    pub parent: NeuronId,
    pub child: NeuronId,
    pub slot: usize,
}

impl Connection {
    pub fn weight_index(&self) -> usize {
        self.slot + 1
    }
}
