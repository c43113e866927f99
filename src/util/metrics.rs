use anyhow::{bail, Result};
use ndarray::Array1;
use num_traits::Float;

/// Mean Squared Error
pub fn mse<F: Float>(y_true: &Array1<F>, y_pred: &Array1<F>) -> Result<F> {
    check_lengths(y_true, y_pred)?;
    let n = F::from(y_true.len()).unwrap();
    let sum = y_true
        .iter()
        .zip(y_pred.iter())
        .fold(F::zero(), |acc, (&t, &p)| acc + (t - p) * (t - p));
    Ok(sum / n)
}

/// Root Mean Squared Error
pub fn rmse<F: Float>(y_true: &Array1<F>, y_pred: &Array1<F>) -> Result<F> {
    Ok(mse(y_true, y_pred)?.sqrt())
}

/// Mean Absolute Error
pub fn mae<F: Float>(y_true: &Array1<F>, y_pred: &Array1<F>) -> Result<F> {
    check_lengths(y_true, y_pred)?;
    let n = F::from(y_true.len()).unwrap();
    let sum = y_true
        .iter()
        .zip(y_pred.iter())
        .fold(F::zero(), |acc, (&t, &p)| acc + (t - p).abs());
    Ok(sum / n)
}

/// R² score (coefficient of determination)
///
/// Returns zero for a constant target series, where the score is undefined.
pub fn r2_score<F: Float>(y_true: &Array1<F>, y_pred: &Array1<F>) -> Result<F> {
    check_lengths(y_true, y_pred)?;
    let n = F::from(y_true.len()).unwrap();
    let mean = y_true.iter().fold(F::zero(), |acc, &t| acc + t) / n;

    let ss_res = y_true
        .iter()
        .zip(y_pred.iter())
        .fold(F::zero(), |acc, (&t, &p)| acc + (t - p) * (t - p));
    let ss_tot = y_true
        .iter()
        .fold(F::zero(), |acc, &t| acc + (t - mean) * (t - mean));

    if ss_tot == F::zero() {
        Ok(F::zero())
    } else {
        Ok(F::one() - ss_res / ss_tot)
    }
}

fn check_lengths<F: Float>(y_true: &Array1<F>, y_pred: &Array1<F>) -> Result<()> {
    if y_true.is_empty() {
        bail!("metric input is empty");
    }
    if y_true.len() != y_pred.len() {
        bail!(
            "metric input length mismatch: {} true values vs {} predictions",
            y_true.len(),
            y_pred.len()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_mse() {
        let y_true = array![1.0, 2.0, 3.0];
        let y_pred = array![1.1, 2.0, 2.9];

        let error = mse(&y_true, &y_pred).unwrap();
        assert!((error - 0.006666666666666667_f64).abs() < 1e-10);
    }

    #[test]
    fn test_rmse_is_sqrt_of_mse() {
        let y_true = array![0.0, 0.0, 0.0, 0.0];
        let y_pred = array![2.0, 2.0, 2.0, 2.0];

        assert!((rmse(&y_true, &y_pred).unwrap() - 2.0_f64).abs() < 1e-12);
    }

    #[test]
    fn test_mae() {
        let y_true = array![1.0, -1.0];
        let y_pred = array![0.0, 0.0];

        assert!((mae(&y_true, &y_pred).unwrap() - 1.0_f64).abs() < 1e-12);
    }

    #[test]
    fn test_r2_score() {
        let y_true = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let y_pred = array![1.1, 2.1, 2.9, 4.0, 5.1];

        let r2: f64 = r2_score(&y_true, &y_pred).unwrap();
        assert!(r2 > 0.95);
    }

    #[test]
    fn test_r2_constant_series() {
        let y_true = array![2.0, 2.0, 2.0];
        let y_pred = array![1.0, 2.0, 3.0];

        assert_eq!(r2_score(&y_true, &y_pred).unwrap(), 0.0);
    }

    #[test]
    fn test_length_mismatch_is_rejected() {
        let y_true = array![1.0, 2.0];
        let y_pred = array![1.0];

        assert!(mse(&y_true, &y_pred).is_err());
        assert!(mse::<f64>(&array![], &array![]).is_err());
    }
}
