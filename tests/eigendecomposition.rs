//! Integration tests for the eigendecomposition engine

mod common;

use common::{
    align_column_signs, assert_allclose_f64, fixture_3x3, fixture_3x3_eigenvalues,
    fixture_3x3_eigenvectors,
};
use rootr::dtype::DType;
use rootr::eigen::{
    matrix_eigendecomposition, EigendecompositionConfig, EighConfig, PowerIterationConfig,
    QrConfig,
};
use rootr::tensor::Tensor;

#[test]
fn test_scalar_input() {
    let a = Tensor::scalar(2.0f64);
    let decomp = matrix_eigendecomposition(&a, &Default::default(), false).unwrap();
    assert_eq!(decomp.eigenvalues.ndim(), 0);
    assert_eq!(decomp.eigenvalues.to_f64_vec(), vec![2.0]);
    assert_eq!(decomp.eigenvectors.to_f64_vec(), vec![1.0]);

    let a = Tensor::from_slice(&[2.0f64], &[1, 1]);
    let decomp = matrix_eigendecomposition(&a, &Default::default(), false).unwrap();
    assert_eq!(decomp.eigenvalues.shape(), &[1, 1]);
    assert_eq!(decomp.eigenvalues.to_f64_vec(), vec![2.0]);
    assert_eq!(decomp.eigenvectors.to_f64_vec(), vec![1.0]);
}

#[test]
fn test_not_two_dimensional() {
    let a = Tensor::zeros(&[1, 2, 3], DType::F32);
    let err = matrix_eigendecomposition(&a, &Default::default(), false).unwrap_err();
    assert!(err.to_string().contains("Matrix is not 2-dimensional!"));
}

#[test]
fn test_not_square() {
    let a = Tensor::zeros(&[2, 3], DType::F32);
    let err = matrix_eigendecomposition(&a, &Default::default(), false).unwrap_err();
    assert!(err.to_string().contains("Matrix is not square!"));
}

#[test]
fn test_diagonal_shortcut() {
    let a = Tensor::from_slice(&[1.0f64, 0.0, 0.0, 4.0], &[2, 2]);
    let decomp = matrix_eigendecomposition(&a, &Default::default(), true).unwrap();
    assert_eq!(decomp.eigenvalues.to_f64_vec(), vec![1.0, 4.0]);
    assert_eq!(decomp.eigenvectors.to_f64_vec(), vec![1.0, 0.0, 0.0, 1.0]);
}

#[test]
fn test_eigh_diagonal_matrix() {
    let a = Tensor::from_slice(&[4.0f64, 0.0, 0.0, 1.0], &[2, 2]);
    let decomp = matrix_eigendecomposition(&a, &Default::default(), false).unwrap();
    // Ascending order even though the diagonal was not
    assert_eq!(decomp.eigenvalues.to_f64_vec(), vec![1.0, 4.0]);
}

#[test]
fn test_eigh_3x3_fixture() {
    let a = fixture_3x3();
    let decomp = matrix_eigendecomposition(&a, &Default::default(), false).unwrap();

    // The fixture constants come from a single-precision reference solve,
    // so the comparison tolerance reflects their accuracy, not ours.
    assert_allclose_f64(
        &decomp.eigenvalues.to_f64_vec(),
        &fixture_3x3_eigenvalues(),
        1e-4,
        1e-3,
        "eigh eigenvalues",
    );

    let expected = fixture_3x3_eigenvectors();
    let mut estimated = decomp.eigenvectors.to_f64_vec();
    align_column_signs(&mut estimated, &expected, 3);
    assert_allclose_f64(&estimated, &expected, 1e-4, 1e-3, "eigh eigenvectors");
}

#[test]
fn test_eigh_reconstruction_and_orthonormality() {
    let a = fixture_3x3();
    let decomp = matrix_eigendecomposition(&a, &Default::default(), false).unwrap();
    let l = decomp.eigenvalues.to_f64_vec();
    let q = decomp.eigenvectors.to_f64_vec();
    let n = 3;

    // Q^T Q = I
    for i in 0..n {
        for j in 0..n {
            let dot: f64 = (0..n).map(|k| q[k * n + i] * q[k * n + j]).sum();
            let expected = if i == j { 1.0 } else { 0.0 };
            assert!((dot - expected).abs() < 1e-10, "orthonormality ({i},{j})");
        }
    }

    // Q diag(L) Q^T = A
    let a_data = a.to_f64_vec();
    for i in 0..n {
        for j in 0..n {
            let rebuilt: f64 = (0..n).map(|k| q[i * n + k] * l[k] * q[j * n + k]).sum();
            assert!(
                (rebuilt - a_data[i * n + j]).abs() < 1e-8,
                "reconstruction ({i},{j}): {rebuilt} vs {}",
                a_data[i * n + j]
            );
        }
    }
}

#[test]
fn test_qr_with_warm_starts() {
    let a = fixture_3x3();
    let expected_values = fixture_3x3_eigenvalues();
    let expected_vectors = fixture_3x3_eigenvectors();

    let prior = matrix_eigendecomposition(&a, &Default::default(), false)
        .unwrap()
        .eigenvectors;

    let seeds: Vec<Option<Tensor>> = vec![
        None,
        Some(Tensor::zeros(&[3, 3], DType::F64)),
        Some(Tensor::eye(3, DType::F64)),
        Some(prior),
    ];

    for seed in seeds {
        let config = EigendecompositionConfig::Qr(QrConfig {
            max_iterations: 10_000,
            tolerance: 1e-9,
            eigenvectors_estimate: seed.clone(),
        });
        let decomp = matrix_eigendecomposition(&a, &config, false).unwrap();

        assert_allclose_f64(
            &decomp.eigenvalues.to_f64_vec(),
            &expected_values,
            1e-4,
            2e-3,
            &format!("qr eigenvalues, seed={}", seed.is_some()),
        );

        let mut estimated = decomp.eigenvectors.to_f64_vec();
        align_column_signs(&mut estimated, &expected_vectors, 3);
        assert_allclose_f64(
            &estimated,
            &expected_vectors,
            1e-4,
            2e-3,
            &format!("qr eigenvectors, seed={}", seed.is_some()),
        );
    }
}

#[test]
fn test_qr_warm_start_shape_mismatch() {
    let a = fixture_3x3();
    let config = EigendecompositionConfig::Qr(QrConfig {
        eigenvectors_estimate: Some(Tensor::eye(2, DType::F64)),
        ..Default::default()
    });
    let err = matrix_eigendecomposition(&a, &config, false).unwrap_err();
    assert!(err.to_string().contains("shapes do not match"));
}

#[test]
fn test_qr_default_budget_returns_best_estimate() {
    // One iteration on a cold start cannot converge; the contract is a
    // best-effort estimate, not an error.
    let a = fixture_3x3();
    let config = EigendecompositionConfig::Qr(QrConfig::default());
    let decomp = matrix_eigendecomposition(&a, &config, false).unwrap();
    assert_eq!(decomp.eigenvalues.shape(), &[3]);
    assert_eq!(decomp.eigenvectors.shape(), &[3, 3]);
}

#[test]
fn test_power_iteration_well_separated() {
    let a = Tensor::from_slice(
        &[
            7.0f64, 2.0, 0.0, //
            2.0, 4.0, 1.0, //
            0.0, 1.0, 1.0,
        ],
        &[3, 3],
    );
    let reference = matrix_eigendecomposition(&a, &Default::default(), false).unwrap();

    let config = EigendecompositionConfig::PowerIteration(PowerIterationConfig::default());
    let decomp = matrix_eigendecomposition(&a, &config, false).unwrap();

    assert_allclose_f64(
        &decomp.eigenvalues.to_f64_vec(),
        &reference.eigenvalues.to_f64_vec(),
        1e-4,
        1e-4,
        "power iteration eigenvalues",
    );

    let expected = reference.eigenvectors.to_f64_vec();
    let mut estimated = decomp.eigenvectors.to_f64_vec();
    align_column_signs(&mut estimated, &expected, 3);
    assert_allclose_f64(&estimated, &expected, 1e-3, 1e-3, "power iteration eigenvectors");
}

#[test]
fn test_power_iteration_identity() {
    // Fully degenerate spectrum: any orthonormal basis is valid, so check
    // the invariants rather than specific vectors.
    let a = Tensor::eye(4, DType::F64);
    let config = EigendecompositionConfig::PowerIteration(PowerIterationConfig::default());
    let decomp = matrix_eigendecomposition(&a, &config, false).unwrap();

    for l in decomp.eigenvalues.to_f64_vec() {
        assert!((l - 1.0).abs() < 1e-8);
    }

    let q = decomp.eigenvectors.to_f64_vec();
    for i in 0..4 {
        for j in 0..4 {
            let dot: f64 = (0..4).map(|k| q[k * 4 + i] * q[k * 4 + j]).sum();
            let expected = if i == j { 1.0 } else { 0.0 };
            assert!((dot - expected).abs() < 1e-8);
        }
    }
}

#[test]
fn test_enhance_stability_sign_convention() {
    let a = fixture_3x3();
    let config = EigendecompositionConfig::Eigh(EighConfig {
        enhance_stability: true,
        ..Default::default()
    });
    let decomp = matrix_eigendecomposition(&a, &config, false).unwrap();
    let q = decomp.eigenvectors.to_f64_vec();

    for j in 0..3 {
        let col: Vec<f64> = (0..3).map(|i| q[i * 3 + j]).collect();
        let mut pivot = col[0];
        for &v in &col {
            if v.abs() > pivot.abs() {
                pivot = v;
            }
        }
        assert!(pivot > 0.0, "column {j} pivot should be positive");
    }
}

#[test]
fn test_f32_input_keeps_dtype() {
    let a = Tensor::from_slice(&[2.0f32, 1.0, 1.0, 2.0], &[2, 2]);
    let decomp = matrix_eigendecomposition(&a, &Default::default(), false).unwrap();
    assert_eq!(decomp.eigenvalues.dtype(), DType::F32);
    assert_eq!(decomp.eigenvectors.dtype(), DType::F32);
    assert_allclose_f64(
        &decomp.eigenvalues.to_f64_vec(),
        &[1.0, 3.0],
        1e-5,
        1e-5,
        "f32 eigenvalues",
    );
}
