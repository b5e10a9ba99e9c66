//! Gauss-Seidel / SOR / SSOR tests for sparse-precond
//!
//! The sweeps are checked against hand-written dense substitutions on
//! tridiagonal matrices, and against each other (SOR with ω = 1 is
//! Gauss-Seidel, SSOR with ω = 1 is symmetric Gauss-Seidel).

use approx::assert_relative_eq;
use sparse_precond::matrix::{CsrMatrix, SparseMatrix};
use sparse_precond::preconditioner::{sweep, GaussSeidel, MatSorType, Preconditioner, Sor, Ssor};

/// Tridiagonal matrix with subdiagonal `a`, diagonal `b` and superdiagonal `c`.
fn make_tridiag(n: usize, a: f64, b: f64, c: f64) -> CsrMatrix<f64> {
    let rows: Vec<Vec<(usize, f64)>> = (0..n)
        .map(|i| {
            let mut row = Vec::new();
            if i > 0 {
                row.push((i - 1, a));
            }
            row.push((i, b));
            if i + 1 < n {
                row.push((i + 1, c));
            }
            row
        })
        .collect();
    CsrMatrix::from_rows(n, n, &rows).unwrap()
}

/// Applying SOR with ω = 1 to the identity returns the input unchanged.
#[test]
fn test_sor_identity() {
    let n = 5;
    let a = CsrMatrix::<f64>::identity(n);
    let sor = Sor::new(&a, 1.0).unwrap();
    let x = vec![1.0; n];
    let mut y = vec![0.0; n];
    sor.apply(&x, &mut y).unwrap();
    assert_relative_eq!(x.as_slice(), y.as_slice(), epsilon = 1e-12);
}

/// SOR forward sweep on a tridiagonal matrix against a manual sweep.
#[test]
fn test_sor_tridiag_forward() {
    let n = 4;
    let omega = 0.8;
    let a = make_tridiag(n, -1.0, 2.0, -1.0);
    let sor = Sor::new(&a, omega).unwrap();
    let x = vec![1.0, 2.0, 3.0, 4.0];
    let mut y = vec![0.0; n];
    sor.apply(&x, &mut y).unwrap();

    let mut expected = vec![0.0; n];
    for i in 0..n {
        let lower = if i > 0 { -expected[i - 1] } else { 0.0 };
        expected[i] = omega * (x[i] - lower) / 2.0;
    }
    assert_relative_eq!(y.as_slice(), expected.as_slice(), epsilon = 1e-14);
}

/// SOR with ω = 1 reproduces Gauss-Seidel bit for bit.
#[test]
fn test_sor_unit_omega_is_gauss_seidel() {
    let a = make_tridiag(6, -1.0, 3.0, -0.5);
    let x = [0.5, -1.0, 2.0, 0.0, 1.5, -2.5];
    let (mut y_sor, mut y_gs) = (vec![0.0; 6], vec![0.0; 6]);
    Sor::new(&a, 1.0).unwrap().apply(&x, &mut y_sor).unwrap();
    GaussSeidel::new(&a, 1.0).unwrap().apply(&x, &mut y_gs).unwrap();
    assert_eq!(y_sor, y_gs);
}

/// SSOR with ω = 1 equals the symmetric Gauss-Seidel sweep.
#[test]
fn test_ssor_unit_omega_is_symmetric_gauss_seidel() {
    let a = make_tridiag(5, -1.0, 2.0, -1.0);
    let x = [1.0, 0.0, -1.0, 2.0, 0.5];
    let mut y = vec![0.0; 5];
    Ssor::new(&a, 1.0).unwrap().apply(&x, &mut y).unwrap();

    let mut expected = vec![0.0; 5];
    sweep(&a, Some(&x), &mut expected, MatSorType::SYMMETRIC_SWEEP, 1.0);
    assert_eq!(y, expected);

    // (D + U)⁻¹ D (D + L)⁻¹ x
    let mut fwd = vec![0.0; 5];
    sweep(&a, Some(&x), &mut fwd, MatSorType::APPLY_LOWER, 1.0);
    let d: Vec<f64> = (0..5).map(|i| a.get(i, i) * fwd[i]).collect();
    let mut bwd = vec![0.0; 5];
    sweep(&a, Some(&d), &mut bwd, MatSorType::APPLY_UPPER, 1.0);
    assert_relative_eq!(y.as_slice(), bwd.as_slice(), epsilon = 1e-14);
}

/// SSOR output is finite and its Display-free name is stable.
#[test]
fn test_ssor_tridiag_and_names() {
    let n = 4;
    let a = make_tridiag(n, -1.0, 2.0, -1.0);
    let ssor = Ssor::new(&a, 1.3).unwrap();
    let x = vec![1.0, 2.0, 3.0, 4.0];
    let mut y = vec![0.0; n];
    ssor.apply(&x, &mut y).unwrap();
    for &yi in &y {
        assert!(yi.is_finite());
    }
    assert_eq!(ssor.name(), "SSOR_Preconditioner");
    let sor = Sor::new(&a, 1.2).unwrap();
    assert!(format!("{}", sor).contains("omega=1.2"));
}

/// Every sweep preconditioner accepts in-place application with the same result.
#[test]
fn test_in_place_agrees() {
    let a = make_tridiag(5, -1.0, 4.0, -2.0);
    let x = vec![1.0, -1.0, 2.0, -2.0, 3.0];
    let sor = Sor::new(&a, 0.7).unwrap();
    let ssor = Ssor::new(&a, 1.3).unwrap();
    let gs = GaussSeidel::new(&a, 0.9).unwrap();
    let pcs: [&dyn Preconditioner<f64>; 3] = [&sor, &ssor, &gs];
    for pc in pcs {
        assert!(pc.supports_in_place());
        let mut y = vec![0.0; 5];
        pc.apply(&x, &mut y).unwrap();
        let mut z = x.clone();
        pc.apply_in_place(&mut z).unwrap();
        assert_eq!(y, z, "{}", pc.name());
    }
}
