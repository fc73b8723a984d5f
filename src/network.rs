use ndarray::{Array1, ArrayView1};
use ndarray_rand::rand::{rngs::StdRng, SeedableRng};
use tracing::{debug, info, trace, warn};

use crate::{
    config::NetworkConfig,
    connection::{Connection, ConnectionId, NeuronId},
    error::{NetworkError, Result},
    loss::mean_squared_error,
    neuron::{random_name, Neuron, Role},
    order::{self, Order},
};

/// A feed-forward network whose topology is an arbitrary DAG of neurons.
///
/// Wiring edits invalidate the neuron order; call [`Network::build_order`] after the graph
/// is wired and before propagating.
#[derive(Debug)]
pub struct Network {
    neurons: Vec<Neuron>,
    connections: Vec<Connection>,
    order: Option<Order>,
    config: NetworkConfig,
    rng: StdRng,
}

impl Default for Network {
    fn default() -> Self {
        Self::new(NetworkConfig::default())
    }
}

impl Network {
    pub fn new(config: NetworkConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            neurons: Vec::new(),
            connections: Vec::new(),
            order: None,
            config,
            rng,
        }
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.neurons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neurons.is_empty()
    }

    /// Number of layers in the built order, 0 if it is not built.
    pub fn depth(&self) -> usize {
        self.order.as_ref().map_or(0, |order| order.layers.len())
    }

    pub fn is_order_built(&self) -> bool {
        self.order.is_some()
    }

    /// Add an input neuron fed with external vectors of length `arity`.
    /// A random name is generated when `name` is `None`.
    pub fn add_input(&mut self, name: Option<&str>, arity: usize) -> Result<NeuronId> {
        self.create(name, Role::Input, arity)
    }

    pub fn add_hidden(&mut self, name: Option<&str>) -> Result<NeuronId> {
        self.create(name, Role::Hidden, 0)
    }

    pub fn add_output(&mut self, name: Option<&str>) -> Result<NeuronId> {
        self.create(name, Role::Output, 0)
    }

    fn create(&mut self, name: Option<&str>, role: Role, arity: usize) -> Result<NeuronId> {
        let name = match name {
            Some(name) => name.to_string(),
            None => loop {
                let candidate = random_name(&mut self.rng);
                if self.find(&candidate).is_none() {
                    break candidate;
                }
            },
        };
        let neuron = Neuron::new(
            name,
            role,
            arity,
            self.config.learning_rate,
            self.config.activation.build(),
            &mut self.rng,
        );
        self.attach_neuron(neuron)
    }

    /// Attach a standalone neuron built by the caller, e.g. one with a custom activation.
    pub fn attach_neuron(&mut self, neuron: Neuron) -> Result<NeuronId> {
        if self.find(neuron.name()).is_some() {
            return Err(NetworkError::DuplicateName(neuron.name().to_string()));
        }
        // Non-input neurons take one weight per parent, and a fresh neuron has none.
        if !neuron.is_input() && neuron.arity() != 0 {
            return Err(NetworkError::DimensionMismatch {
                expected: 1,
                actual: neuron.weights().len(),
            });
        }

        let id = NeuronId(self.neurons.len());
        debug!(neuron = neuron.name(), role = ?neuron.role(), "attached neuron");
        self.neurons.push(neuron);
        self.invalidate_order();
        Ok(id)
    }

    pub fn find(&self, name: &str) -> Option<NeuronId> {
        self.neurons
            .iter()
            .position(|n| n.name() == name)
            .map(NeuronId)
    }

    pub fn neuron(&self, id: NeuronId) -> Option<&Neuron> {
        self.neurons.get(id.0)
    }

    pub fn neurons(&self) -> impl Iterator<Item = (NeuronId, &Neuron)> + '_ {
        self.neurons
            .iter()
            .enumerate()
            .map(|(index, neuron)| (NeuronId(index), neuron))
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Parents of `id`, in the order their weights appear after the bias.
    pub fn parents_of(&self, id: NeuronId) -> Result<Vec<NeuronId>> {
        let neuron = self.get(id)?;
        Ok(neuron
            .parents
            .iter()
            .map(|edge| self.connections[edge.0].parent)
            .collect())
    }

    pub fn children_of(&self, id: NeuronId) -> Result<Vec<NeuronId>> {
        let neuron = self.get(id)?;
        Ok(neuron
            .children
            .iter()
            .map(|edge| self.connections[edge.0].child)
            .collect())
    }

    pub fn layers(&self) -> Option<&[Vec<NeuronId>]> {
        self.order.as_ref().map(|order| order.layers.as_slice())
    }

    /// Output neurons reported by [`Network::forward`], in reporting order.
    pub fn outputs(&self) -> Option<&[NeuronId]> {
        self.order.as_ref().map(|order| order.outputs.as_slice())
    }

    pub fn set_position(&mut self, id: NeuronId, x: f64, y: f64) -> Result<()> {
        self.get_mut(id)?.set_position(x, y);
        Ok(())
    }

    pub fn set_learning_rate(&mut self, id: NeuronId, learning_rate: f64) -> Result<()> {
        self.get_mut(id)?.set_learning_rate(learning_rate);
        Ok(())
    }

    pub fn set_weights(&mut self, id: NeuronId, weights: Array1<f64>) -> Result<()> {
        self.get_mut(id)?.set_weights(weights)
    }

    /// Connect `child` as a child of `parent`. Returns `false` if the edge already exists.
    pub fn connect_child(&mut self, parent: NeuronId, child: NeuronId) -> Result<bool> {
        self.get(parent)?;
        self.get(child)?;

        if parent == child || self.reaches(child, parent) {
            return Err(NetworkError::CycleDetected {
                parent: self.neurons[parent.0].name().to_string(),
                child: self.neurons[child.0].name().to_string(),
            });
        }
        if self.neurons[child.0].is_input() {
            return Err(NetworkError::UnsupportedTopologyEdit(format!(
                "input neuron `{}` cannot take parents",
                self.neurons[child.0].name()
            )));
        }
        if self.neurons[child.0]
            .parents
            .iter()
            .any(|edge| self.connections[edge.0].parent == parent)
        {
            debug!(
                parent = self.neurons[parent.0].name(),
                child = self.neurons[child.0].name(),
                "already connected"
            );
            return Ok(false);
        }

        let slot = self.neurons[child.0].parent_count();
        self.neurons[child.0].resize_weights(slot + 2, &mut self.rng)?;

        let edge = ConnectionId(self.connections.len());
        self.connections.push(Connection {
            parent,
            child,
            slot,
        });
        self.neurons[child.0].parents.push(edge);
        self.neurons[parent.0].children.push(edge);

        debug!(
            parent = self.neurons[parent.0].name(),
            child = self.neurons[child.0].name(),
            slot,
            "connected"
        );
        self.invalidate_order();
        Ok(true)
    }

    /// Same edge as [`Network::connect_child`], seen from the child.
    pub fn connect_parent(&mut self, child: NeuronId, parent: NeuronId) -> Result<bool> {
        self.connect_child(parent, child)
    }

    /// Removing a connection would misalign the child's remaining weights with its
    /// parents, so it is always refused.
    pub fn disconnect(&mut self, parent: NeuronId, child: NeuronId) -> Result<()> {
        self.get(parent)?;
        self.get(child)?;
        Err(NetworkError::UnsupportedTopologyEdit(format!(
            "cannot remove `{}` -> `{}`",
            self.neurons[parent.0].name(),
            self.neurons[child.0].name()
        )))
    }

    /// Assign depths from the input neurons and group neurons into layers.
    pub fn build_order(&mut self) -> Result<()> {
        info!(neurons = self.neurons.len(), "building network order");
        self.order = Some(order::build(&mut self.neurons, &self.connections)?);
        Ok(())
    }

    /// Run one forward pass. Every input neuron receives the whole `input`.
    /// Returns the outputs of the output neurons, in [`Network::outputs`] order.
    pub fn forward(&mut self, input: ArrayView1<'_, f64>) -> Result<Array1<f64>> {
        let Self {
            neurons,
            connections,
            order,
            ..
        } = self;
        let order = order.as_ref().ok_or_else(|| {
            warn!("forward pass skipped, neuron order not built");
            NetworkError::OrderNotBuilt
        })?;

        let Some((input_layer, rest)) = order.layers.split_first() else {
            return Ok(Array1::zeros(0));
        };
        if let Some(neuron) = input_layer
            .iter()
            .map(|id| &neurons[id.0])
            .find(|n| n.arity() != input.len())
        {
            return Err(NetworkError::DimensionMismatch {
                expected: neuron.arity(),
                actual: input.len(),
            });
        }

        for id in input_layer {
            neurons[id.0].forward(input.view())?;
        }
        for layer in rest {
            for id in layer {
                let values: Array1<f64> = neurons[id.0]
                    .parents
                    .iter()
                    .map(|edge| neurons[connections[edge.0].parent.0].output())
                    .collect();
                neurons[id.0].forward(values.view())?;
            }
        }

        let outputs: Array1<f64> = order
            .outputs
            .iter()
            .map(|id| neurons[id.0].output())
            .collect();
        trace!(?outputs, "forward pass");
        Ok(outputs)
    }

    /// Run one backward pass against `expected`, one target per output neuron, then
    /// commit every neuron's adjustments.
    pub fn backward(&mut self, expected: ArrayView1<'_, f64>) -> Result<()> {
        self.compute_deltas(expected)?;
        self.apply_adjustments();
        Ok(())
    }

    fn compute_deltas(&mut self, expected: ArrayView1<'_, f64>) -> Result<()> {
        let Self {
            neurons,
            connections,
            order,
            ..
        } = self;
        let order = order.as_ref().ok_or_else(|| {
            warn!("backward pass skipped, neuron order not built");
            NetworkError::OrderNotBuilt
        })?;

        if expected.len() != order.outputs.len() {
            return Err(NetworkError::DimensionMismatch {
                expected: order.outputs.len(),
                actual: expected.len(),
            });
        }

        for (id, &target) in order.outputs.iter().zip(expected.iter()) {
            neurons[id.0].backward_output(target);
        }

        // Children sit in deeper layers, so their deltas are final by the time a parent
        // reads them.
        for layer in order.layers.iter().rev() {
            for id in layer {
                if neurons[id.0].role() == Role::Output {
                    continue;
                }
                let downstream: f64 = neurons[id.0]
                    .children
                    .iter()
                    .map(|edge| {
                        let connection = &connections[edge.0];
                        let child = &neurons[connection.child.0];
                        child.delta() * child.weights()[connection.weight_index()]
                    })
                    .sum();
                neurons[id.0].backward_hidden(downstream);
            }
        }
        Ok(())
    }

    /// Add every neuron's pending adjustment, scaled by its learning rate, to its weights.
    pub fn apply_adjustments(&mut self) {
        for neuron in self.neurons.iter_mut() {
            neuron.apply_adjustments();
        }
    }

    /// Forward `input`, learn from `expected`, and return the squared error of the sample.
    pub fn train_sample(
        &mut self,
        input: ArrayView1<'_, f64>,
        expected: ArrayView1<'_, f64>,
    ) -> Result<f64> {
        let outputs = self.forward(input)?;
        self.backward(expected)?;
        Ok(mean_squared_error(outputs.view(), expected))
    }

    /// Draw every weight again from `[-1, 1)` and drop pending adjustments.
    pub fn reset_weights(&mut self) {
        for neuron in self.neurons.iter_mut() {
            neuron.reset_weights(&mut self.rng);
        }
    }

    /// Drop every neuron and connection.
    pub fn clear(&mut self) {
        info!(neurons = self.neurons.len(), "clearing network");
        self.neurons.clear();
        self.connections.clear();
        self.order = None;
    }

    fn invalidate_order(&mut self) {
        if self.order.take().is_some() {
            debug!("neuron order invalidated");
        }
    }

    fn get(&self, id: NeuronId) -> Result<&Neuron> {
        self.neurons
            .get(id.0)
            .ok_or(NetworkError::UnknownNeuron(id.0))
    }

    fn get_mut(&mut self, id: NeuronId) -> Result<&mut Neuron> {
        self.neurons
            .get_mut(id.0)
            .ok_or(NetworkError::UnknownNeuron(id.0))
    }

    /// Whether `to` is reachable from `from` along child edges.
    fn reaches(&self, from: NeuronId, to: NeuronId) -> bool {
        let mut visited = vec![false; self.neurons.len()];
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            if id == to {
                return true;
            }
            if std::mem::replace(&mut visited[id.0], true) {
                continue;
            }
            stack.extend(
                self.neurons[id.0]
                    .children
                    .iter()
                    .map(|edge| self.connections[edge.0].child),
            );
        }
        false
    }
}
