//! Integration tests for the coupled inverse-Newton iteration

mod common;

use common::{round_trip_relative_error, tridiagonal_1, tridiagonal_2};
use rootr::dtype::DType;
use rootr::root::newton::matrix_inverse_root_newton;
use rootr::root::{CoupledNewtonConfig, NewtonConvergenceFlag};
use rootr::tensor::Tensor;

fn config() -> CoupledNewtonConfig {
    CoupledNewtonConfig {
        max_iterations: 1000,
        tolerance: 1e-6,
    }
}

fn assert_newton(a: &Tensor, root: i64, a_tol: f64, m_tol: f64, msg: &str) {
    let result = matrix_inverse_root_newton(a, root, 0.0, &config()).unwrap();
    assert_eq!(
        result.flag,
        NewtonConvergenceFlag::Converged,
        "{msg}: did not converge in {} iterations (error {})",
        result.iterations,
        result.error
    );
    assert!(
        result.error <= m_tol,
        "{msg}: residual error {} above {m_tol}",
        result.error
    );
    let rel = round_trip_relative_error(a, &result.root_inverse, root);
    assert!(rel <= a_tol, "{msg}: round-trip error {rel} above {a_tol}");
}

#[test]
fn test_newton_identity() {
    for n in [10, 100] {
        for root in [2, 4, 8] {
            let a = Tensor::eye(n, DType::F64);
            assert_newton(&a, root, 1e-6, 1e-6, &format!("identity n={n} root={root}"));
        }
    }
}

#[test]
fn test_newton_tridiagonal_families() {
    for n in [10, 50] {
        for &(alpha, beta) in &[(1.0, 0.5), (10.0, 1.0), (0.1, 0.01), (100.0, 10.0)] {
            for root in [2, 4, 8] {
                assert_newton(
                    &tridiagonal_1(n, alpha, beta),
                    root,
                    1e-4,
                    1e-6,
                    &format!("tridiagonal_1 n={n} alpha={alpha} beta={beta} root={root}"),
                );
                assert_newton(
                    &tridiagonal_2(n, alpha, beta),
                    root,
                    1e-4,
                    1e-6,
                    &format!("tridiagonal_2 n={n} alpha={alpha} beta={beta} root={root}"),
                );
            }
        }
    }
}

#[test]
fn test_newton_residual_matrix_near_identity() {
    let a = tridiagonal_1(10, 1.0, 0.25);
    let result = matrix_inverse_root_newton(&a, 2, 0.0, &config()).unwrap();
    let m = result.residual.to_f64_vec();
    for i in 0..10 {
        for j in 0..10 {
            let expected = if i == j { 1.0 } else { 0.0 };
            assert!((m[i * 10 + j] - expected).abs() <= 1e-6);
        }
    }
}

#[test]
fn test_newton_zero_budget_reports_max_iters() {
    let a = tridiagonal_1(4, 1.0, 0.25);
    let result = matrix_inverse_root_newton(
        &a,
        2,
        0.0,
        &CoupledNewtonConfig {
            max_iterations: 0,
            tolerance: 1e-6,
        },
    )
    .unwrap();
    assert_eq!(result.flag, NewtonConvergenceFlag::ReachedMaxIters);
    assert_eq!(result.iterations, 0);
    assert!(result.error > 1e-6);
}

#[test]
fn test_newton_epsilon_regularization() {
    // Singular matrix: without epsilon the iteration cannot converge to a
    // finite inverse root, with epsilon it computes (A + eps I)^(-1/2).
    let a = Tensor::from_slice(&[1.0f64, 0.0, 0.0, 0.0], &[2, 2]);
    let result = matrix_inverse_root_newton(&a, 2, 1.0, &config()).unwrap();
    assert_eq!(result.flag, NewtonConvergenceFlag::Converged);
    let x = result.root_inverse.to_f64_vec();
    // (A + I)^(-1/2) = diag(2^(-1/2), 1)
    assert!((x[0] - 2.0f64.powf(-0.5)).abs() < 1e-5);
    assert!((x[3] - 1.0).abs() < 1e-5);
}
