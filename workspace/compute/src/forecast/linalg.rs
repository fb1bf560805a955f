use ndarray::{Array1, Array2};

use crate::error::{ComputeError, Result};

/// Solves the penalized least squares problem
/// `min |y - X b|^2 + sum(penalty_i * b_i^2)`.
pub fn ridge_solve(x: &Array2<f64>, y: &Array1<f64>, penalty: &Array1<f64>) -> Result<Array1<f64>> {
    let p = x.ncols();
    if penalty.len() != p || y.len() != x.nrows() {
        return Err(ComputeError::Numerical(format!(
            "dimension mismatch: X is {}x{}, y has {}, penalty has {}",
            x.nrows(),
            p,
            y.len(),
            penalty.len()
        )));
    }

    let mut gram = x.t().dot(x);
    let max_diag = (0..p).map(|i| gram[[i, i]]).fold(0.0, f64::max);
    let jitter = 1e-10 * max_diag.max(1.0);
    for i in 0..p {
        gram[[i, i]] += penalty[i] + jitter;
    }
    let rhs = x.t().dot(y);

    cholesky_solve(&gram, &rhs)
}

/// Solves `A b = rhs` for symmetric positive definite `A`.
pub fn cholesky_solve(a: &Array2<f64>, rhs: &Array1<f64>) -> Result<Array1<f64>> {
    let n = a.nrows();
    let mut l = Array2::<f64>::zeros((n, n));

    for j in 0..n {
        let mut diag = a[[j, j]];
        for k in 0..j {
            diag -= l[[j, k]] * l[[j, k]];
        }
        if diag <= 0.0 || !diag.is_finite() {
            return Err(ComputeError::Numerical(format!(
                "matrix is not positive definite at column {}",
                j
            )));
        }
        let diag = diag.sqrt();
        l[[j, j]] = diag;

        for i in (j + 1)..n {
            let mut value = a[[i, j]];
            for k in 0..j {
                value -= l[[i, k]] * l[[j, k]];
            }
            l[[i, j]] = value / diag;
        }
    }

    // L z = rhs
    let mut z = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut value = rhs[i];
        for k in 0..i {
            value -= l[[i, k]] * z[k];
        }
        z[i] = value / l[[i, i]];
    }

    // L^T b = z
    let mut b = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut value = z[i];
        for k in (i + 1)..n {
            value -= l[[k, i]] * b[k];
        }
        b[i] = value / l[[i, i]];
    }

    Ok(b)
}

/// Inverse of the standard normal CDF (Acklam's rational approximation,
/// relative error below 1.2e-9).
pub fn normal_quantile(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969683028665376e+01,
        2.209460984245205e+02,
        -2.759285104469687e+02,
        1.383577518672690e+02,
        -3.066479806614716e+01,
        2.506628277459239e+00,
    ];
    const B: [f64; 5] = [
        -5.447609879822406e+01,
        1.615858368580409e+02,
        -1.556989798598866e+02,
        6.680131188771972e+01,
        -1.328068155288572e+01,
    ];
    const C: [f64; 6] = [
        -7.784894002430293e-03,
        -3.223964580411365e-01,
        -2.400758277161838e+00,
        -2.549732539343734e+00,
        4.374664141464968e+00,
        2.938163982698783e+00,
    ];
    const D: [f64; 4] = [
        7.784695709041462e-03,
        3.224671290700398e-01,
        2.445134137142996e+00,
        3.754408661907416e+00,
    ];
    const P_LOW: f64 = 0.02425;

    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }

    let tail = |q: f64| {
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    };

    if p < P_LOW {
        tail((-2.0 * p.ln()).sqrt())
    } else if p > 1.0 - P_LOW {
        -tail((-2.0 * (1.0 - p).ln()).sqrt())
    } else {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    }
}
