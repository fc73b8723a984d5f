use ndarray::{ArrayView1, Zip};

/// Mean of the squared differences between `output` and `target`.
/// Returns 0 for empty vectors.
pub fn mean_squared_error(output: ArrayView1<'_, f64>, target: ArrayView1<'_, f64>) -> f64 {
    assert_eq!(output.len(), target.len());

    if output.is_empty() {
        return 0.0;
    }
    Zip::from(&output)
        .and(&target)
        .fold(0.0, |loss, &output, &target| loss + (output - target).powi(2))
        / output.len() as f64
}
