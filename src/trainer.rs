use tracing::{debug, info};

use crate::{
    data::DataLoader,
    error::{NetworkError, Result},
    loss::mean_squared_error,
    network::Network,
};

/// Online training loop: one forward and backward pass per sample.
#[derive(Debug, Clone)]
pub struct Trainer {
    epochs: usize,
    log_every: usize,
}

impl Trainer {
    pub fn new(epochs: usize) -> Self {
        Self {
            epochs,
            log_every: 0,
        }
    }

    /// Log the epoch loss at `info` level every `log_every` epochs. 0 logs only at `debug`.
    pub fn log_every(self, log_every: usize) -> Self {
        Self { log_every, ..self }
    }

    /// Train `network` on every sample of `loader` for each epoch and return the mean
    /// loss of each epoch.
    pub fn fit(&self, network: &mut Network, loader: &mut DataLoader) -> Result<Vec<f64>> {
        let mut history = Vec::with_capacity(self.epochs);
        for epoch in 0..self.epochs {
            let mut total_loss = 0.0;
            let mut count = 0;
            for (input, target) in loader.epoch() {
                total_loss += network.train_sample(input, target)?;
                count += 1;
            }
            let loss = if count == 0 {
                0.0
            } else {
                total_loss / count as f64
            };

            if self.log_every > 0 && epoch % self.log_every == 0 {
                info!(epoch, loss, "training");
            } else {
                debug!(epoch, loss, "training");
            }
            history.push(loss);
        }

        if let Some(loss) = history.last() {
            info!(epochs = self.epochs, loss, "training finished");
        }
        Ok(history)
    }

    /// Mean loss over `loader` without touching any weight.
    pub fn evaluate(network: &mut Network, loader: &mut DataLoader) -> Result<f64> {
        let mut total_loss = 0.0;
        let mut count = 0;
        for (input, target) in loader.epoch() {
            let output = network.forward(input)?;
            if output.len() != target.len() {
                return Err(NetworkError::DimensionMismatch {
                    expected: output.len(),
                    actual: target.len(),
                });
            }
            total_loss += mean_squared_error(output.view(), target);
            count += 1;
        }
        Ok(if count == 0 {
            0.0
        } else {
            total_loss / count as f64
        })
    }
}
