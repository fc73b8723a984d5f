use std::{path::Path, vec};

use csv::ReaderBuilder;
use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use ndarray_rand::rand::{rngs::StdRng, seq::index::sample, SeedableRng};

use crate::error::{NetworkError, Result};

/// Sampler produces the order in which samples are visited in one epoch.
#[derive(Debug)]
pub enum Sampler {
    Sequential(usize),
    Random(usize, StdRng),
}

impl Sampler {
    pub fn sample(&mut self) -> Vec<usize> {
        match self {
            Self::Sequential(size) => (0..*size).collect(),
            Self::Random(size, rng) => sample(rng, *size, *size).into_vec(),
        }
    }
}

/// Yields one `(input, target)` pair at a time. Created for each epoch.
pub struct Samples<'a> {
    indices: vec::IntoIter<usize>,
    input: ArrayView2<'a, f64>,
    target: ArrayView2<'a, f64>,
}

impl<'a> Iterator for Samples<'a> {
    type Item = (ArrayView1<'a, f64>, ArrayView1<'a, f64>);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.indices.next()?;
        Some((
            self.input.index_axis_move(Axis(0), index),
            self.target.index_axis_move(Axis(0), index),
        ))
    }
}

/// DataLoader wraps a training set of row-aligned inputs and targets.
#[derive(Debug)]
pub struct DataLoader {
    sampler: Sampler,
    input: Array2<f64>,
    target: Array2<f64>,
}

impl DataLoader {
    pub fn new(input: Array2<f64>, target: Array2<f64>) -> Result<Self> {
        if input.nrows() != target.nrows() {
            return Err(NetworkError::DimensionMismatch {
                expected: input.nrows(),
                actual: target.nrows(),
            });
        }
        Ok(Self {
            sampler: Sampler::Sequential(input.nrows()),
            input,
            target,
        })
    }

    /// Read a headerless CSV whose rows hold the input values followed by
    /// `target_width` target values. Lines starting with `#` are skipped.
    pub fn from_csv(path: impl AsRef<Path>, target_width: usize) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .from_path(path)?;

        let mut values = Vec::new();
        let mut width = None;
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            if record.len() <= target_width {
                return Err(NetworkError::DimensionMismatch {
                    expected: target_width + 1,
                    actual: record.len(),
                });
            }
            width.get_or_insert(record.len());
            for field in record.iter() {
                let value = field.parse::<f64>().map_err(|_| NetworkError::InvalidNumber {
                    row,
                    value: field.to_string(),
                })?;
                values.push(value);
            }
        }

        // The csv reader rejects rows of differing lengths, so every row has `width` fields.
        let width = width.unwrap_or(target_width);
        let rows = if width == 0 { 0 } else { values.len() / width };
        let split = width - target_width;
        let input = Array2::from_shape_fn((rows, split), |(r, c)| values[r * width + c]);
        let target = Array2::from_shape_fn((rows, target_width), |(r, c)| {
            values[r * width + split + c]
        });
        Self::new(input, target)
    }

    pub fn size(&self) -> usize {
        self.input.nrows()
    }

    pub fn input_width(&self) -> usize {
        self.input.ncols()
    }

    pub fn target_width(&self) -> usize {
        self.target.ncols()
    }

    /// If enabled, visit samples in a new random order every epoch.
    pub fn shuffle(mut self, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.sampler = Sampler::Random(self.size(), rng);
        self
    }

    /// Create the sample iterator of one epoch.
    pub fn epoch(&mut self) -> Samples<'_> {
        Samples {
            indices: self.sampler.sample().into_iter(),
            input: self.input.view(),
            target: self.target.view(),
        }
    }
}

/// Read a headerless CSV of `parent,child` neuron names.
pub fn read_edge_list(path: impl AsRef<Path>) -> Result<Vec<(String, String)>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut edges = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.len() != 2 {
            return Err(NetworkError::DimensionMismatch {
                expected: 2,
                actual: record.len(),
            });
        }
        edges.push((record[0].to_string(), record[1].to_string()));
    }
    Ok(edges)
}
