//! Solve a 1-D Poisson problem with PCG under every preconditioner, chosen by
//! PETSc-style options: `cargo run --example tridiag_precond -- -pc_type ilu`.
//! Without arguments all types are compared.

use sparse_precond::matrix::{CsrMatrix, SparseMatrix};
use sparse_precond::solver::{LinearSolver, PcgSolver};
use sparse_precond::{KError, PcOptions, PC};

fn tridiag(n: usize) -> CsrMatrix<f64> {
    let rows: Vec<Vec<(usize, f64)>> = (0..n)
        .map(|i| {
            let mut row = Vec::new();
            if i > 0 {
                row.push((i - 1, -1.0));
            }
            row.push((i, 2.0));
            if i + 1 < n {
                row.push((i + 1, -1.0));
            }
            row
        })
        .collect();
    CsrMatrix::from_rows(n, n, &rows).expect("valid tridiagonal rows")
}

fn run(a: &CsrMatrix<f64>, b: &[f64], opts: &PcOptions) -> Result<(), KError> {
    let desc = PC::<f64>::from_options(opts)?;
    let pc = desc.build(a)?;
    let mut x = vec![0.0; b.len()];
    let mut solver = PcgSolver::new(1e-10, 1000);
    let stats = solver.solve(a, Some(&pc), b, &mut x)?;
    println!(
        "{:<12} iterations = {:4}, residual = {:.3e}, converged = {}",
        opts.pc_type.to_string(),
        stats.iterations,
        stats.final_residual,
        stats.converged
    );
    Ok(())
}

fn main() -> Result<(), KError> {
    let n = 200;
    let a = tridiag(n);
    let mut b = vec![0.0; n];
    a.spmv(&vec![1.0; n], &mut b);

    let args: Vec<String> = std::env::args().skip(1).collect();
    if !args.is_empty() {
        return run(&a, &b, &PcOptions::from_args(&args)?);
    }
    for pc_type in ["none", "jacobi", "ssor", "ilu", "spai", "polynomial"] {
        let opts = PcOptions::from_args(["-pc_type", pc_type, "-pc_spai_bandwidth", "1"])?;
        run(&a, &b, &opts)?;
    }
    Ok(())
}
