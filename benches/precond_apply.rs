use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sparse_precond::matrix::ell::DEFAULT_CHUNK;
use sparse_precond::matrix::{CooMatrix, CsrMatrix, EllMatrix, SparseMatrix};
use sparse_precond::preconditioner::{Ilu, Preconditioner, Spai, SpaiParams, Ssor};

fn laplacian_2d(k: usize) -> CsrMatrix<f64> {
    let n = k * k;
    let rows: Vec<Vec<(usize, f64)>> = (0..n)
        .map(|i| {
            let (r, c) = (i / k, i % k);
            let mut row = Vec::new();
            if r > 0 {
                row.push((i - k, -1.0));
            }
            if c > 0 {
                row.push((i - 1, -1.0));
            }
            row.push((i, 4.0));
            if c + 1 < k {
                row.push((i + 1, -1.0));
            }
            if r + 1 < k {
                row.push((i + k, -1.0));
            }
            row
        })
        .collect();
    CsrMatrix::from_rows(n, n, &rows).unwrap()
}

fn bench_apply<M: SparseMatrix<f64>>(c: &mut Criterion, label: &str, a: &M) {
    let n = a.nrows();
    let x: Vec<f64> = (0..n).map(|i| (i as f64).sin()).collect();
    let mut y = vec![0.0; n];

    let ssor = Ssor::new(a, 1.3).unwrap();
    c.bench_function(&format!("{label} SSOR apply"), |ben| {
        ben.iter(|| ssor.apply(black_box(&x), black_box(&mut y)).unwrap())
    });

    let ilu = Ilu::new(a, 1).unwrap();
    c.bench_function(&format!("{label} ILU(1) apply"), |ben| {
        ben.iter(|| ilu.apply(black_box(&x), black_box(&mut y)).unwrap())
    });
}

fn bench_formats(c: &mut Criterion) {
    let csr = laplacian_2d(64);
    bench_apply(c, "CSR", &csr);
    bench_apply(c, "ELL", &EllMatrix::from_sparse(&csr, DEFAULT_CHUNK).unwrap());
    bench_apply(c, "COO", &CooMatrix::from_sparse(&csr));
}

fn bench_setup(c: &mut Criterion) {
    let a = laplacian_2d(24);
    c.bench_function("ILU(2) setup", |ben| ben.iter(|| Ilu::new(black_box(&a), 2).unwrap()));
    c.bench_function("SPAI setup", |ben| {
        ben.iter(|| Spai::new(black_box(&a), 1, SpaiParams::default()).unwrap())
    });
}

criterion_group!(benches, bench_formats, bench_setup);
criterion_main!(benches);
