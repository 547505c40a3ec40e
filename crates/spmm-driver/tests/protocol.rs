//! End-to-end protocol tests against the software device

use rand::rngs::StdRng;
use rand::SeedableRng;
use spmm_driver::prelude::*;
use spmm_driver::{ReadyLine, StalledDevice};

fn driver(n: usize) -> Driver<SoftwareSpmm> {
    let mut d = Driver::new(SoftwareSpmm::new(n).unwrap());
    d.reset().unwrap();
    d.set_timeout(u64::try_from(200 * n).unwrap());
    d
}

fn shapes(n: usize) -> Vec<SparseShape> {
    vec![
        SparseShape::Full,
        SparseShape::Half,
        SparseShape::Identity,
        SparseShape::LineSeparated,
        SparseShape::Degenerate,
        SparseShape::Random { row_nnz: 0..n + 1 },
    ]
}

#[test]
fn every_shape_round_trips() {
    let mut rng = StdRng::seed_from_u64(11);
    for n in [4, 8, 12] {
        for shape in shapes(n) {
            let mut d = driver(n);
            let s = SparseMatrix::generate(&shape, n, StreamMode::Ns, &mut rng);
            let m = DenseMatrix::random(n, 0..256, &mut rng);
            d.send_dense(&m).unwrap();
            d.send_sparse(&s).unwrap();
            let out = d.receive_output().unwrap();
            let v = verify(&[(&s, &m)], &out);
            assert!(v.is_match(), "{shape:?} at n = {n}\n{v}");
        }
    }
}

#[test]
fn identity_returns_the_dense_operand() {
    let mut rng = StdRng::seed_from_u64(0);
    let mut d = driver(4);
    let eye = SparseMatrix::generate(&SparseShape::Identity, 4, StreamMode::Ns, &mut rng);
    let m = DenseMatrix::from_vec(4, (1..=16).collect()).unwrap();
    d.send_dense(&m).unwrap();
    d.send_sparse(&eye).unwrap();
    assert_eq!(d.receive_output().unwrap(), m);
}

#[test]
fn weight_stationary_serves_every_later_dense() {
    let mut rng = StdRng::seed_from_u64(12);
    let mut d = driver(8);
    let s = SparseMatrix::generate(&SparseShape::Full, 8, StreamMode::Ws, &mut rng);
    let dense: Vec<_> = (0..4).map(|_| DenseMatrix::random(8, 0..256, &mut rng)).collect();

    d.send_dense(&dense[0]).unwrap();
    d.send_sparse(&s).unwrap();
    for (i, m) in dense.iter().enumerate() {
        if i > 0 {
            d.send_dense(m).unwrap();
        }
        let out = d.receive_output().unwrap();
        let v = verify(&[(&s, m)], &out);
        assert!(v.is_match(), "dense {i}\n{v}");
    }
    assert_eq!(d.device().passes(), 4);
    assert_eq!(d.device().resident_mode(), Some(StreamMode::Ws));
}

#[test]
fn output_stationary_sums_into_one_result() {
    let mut rng = StdRng::seed_from_u64(13);
    let mut d = driver(4);
    let s1 = SparseMatrix::generate(&SparseShape::Full, 4, StreamMode::Ns, &mut rng);
    let s2 = SparseMatrix::generate(&SparseShape::Half, 4, StreamMode::Os, &mut rng);
    let d1 = DenseMatrix::random(4, 0..256, &mut rng);
    let d2 = DenseMatrix::random(4, 0..256, &mut rng);

    d.send_dense(&d1).unwrap();
    d.send_sparse(&s1).unwrap();
    d.send_dense(&d2).unwrap();
    d.send_sparse(&s2).unwrap();
    let out = d.receive_output().unwrap();

    assert!(verify(&[(&s1, &d1), (&s2, &d2)], &out).is_match());
    assert!(verify(&[(&s2, &d2), (&s1, &d1)], &out).is_match());
    assert_eq!(d.device().pending_results(), 0);
}

#[test]
fn two_dense_operands_queue_ahead_of_compute() {
    let mut rng = StdRng::seed_from_u64(14);
    let mut d = driver(8);
    let d1 = DenseMatrix::random(8, 0..256, &mut rng);
    let d2 = DenseMatrix::random(8, 0..256, &mut rng);
    let s1 = SparseMatrix::generate(&SparseShape::Random { row_nnz: 1..9 }, 8, StreamMode::Ns, &mut rng);
    let s2 = SparseMatrix::generate(&SparseShape::Identity, 8, StreamMode::Ns, &mut rng);

    d.send_dense(&d1).unwrap();
    d.send_dense(&d2).unwrap();
    d.step_n(4).unwrap();
    assert!(!d.device().outputs().rhs_ready);

    d.send_sparse(&s1).unwrap();
    let a = d.receive_output().unwrap();
    d.send_sparse(&s2).unwrap();
    let b = d.receive_output().unwrap();
    assert!(verify(&[(&s1, &d1)], &a).is_match());
    assert_eq!(b, d2);
}

#[test]
fn two_results_wait_for_the_host() {
    let mut rng = StdRng::seed_from_u64(15);
    let mut d = driver(4);
    let pairs: Vec<_> = (0..2)
        .map(|_| {
            (
                SparseMatrix::generate(&SparseShape::Full, 4, StreamMode::Ns, &mut rng),
                DenseMatrix::random(4, 0..256, &mut rng),
            )
        })
        .collect();

    for (s, m) in &pairs {
        d.send_dense(m).unwrap();
        d.send_sparse(s).unwrap();
    }
    d.step_n(8).unwrap();
    assert_eq!(d.device().pending_results(), 2);
    assert!(!d.device().outputs().lhs_ready_ns);
    assert!(d.device().outputs().lhs_ready_os);

    for (s, m) in &pairs {
        let out = d.receive_output().unwrap();
        assert!(verify(&[(s, m)], &out).is_match());
    }
}

#[test]
fn timeout_fires_exactly_at_the_budget() {
    let dev = StalledDevice::new(SoftwareSpmm::new(4).unwrap(), ReadyLine::Dense);
    let mut d = Driver::new(dev);
    d.reset().unwrap();
    d.set_timeout(25);

    let m = DenseMatrix::zeros(4);
    let err = d.send_dense(&m).unwrap_err();
    match err {
        DriverError::Timeout { cycles, waiting_for } => {
            assert_eq!(cycles, 25);
            assert_eq!(waiting_for, "rhs_ready");
        }
        other => panic!("expected a timeout, got {other}"),
    }
    assert_eq!(d.cycles(), 25);
}

#[test]
fn stalled_sparse_line_names_its_mode() {
    let mut rng = StdRng::seed_from_u64(16);
    let dev = StalledDevice::new(SoftwareSpmm::new(4).unwrap(), ReadyLine::Sparse(StreamMode::Wos));
    let mut d = Driver::new(dev);
    d.reset().unwrap();
    d.set_timeout(10);

    let ns = SparseMatrix::generate(&SparseShape::Identity, 4, StreamMode::Ns, &mut rng);
    d.send_sparse(&ns).unwrap();
    let wos = SparseMatrix::generate(&SparseShape::Identity, 4, StreamMode::Wos, &mut rng);
    let err = d.send_sparse(&wos).unwrap_err();
    assert!(err.to_string().contains("lhs_ready_wos"));
}

#[test]
fn reset_recovers_a_device_left_mid_protocol() {
    let mut rng = StdRng::seed_from_u64(17);
    let mut d = driver(4);
    let s = SparseMatrix::generate(&SparseShape::Full, 4, StreamMode::Ns, &mut rng);
    d.send_sparse(&s).unwrap();
    d.set_timeout(8);
    assert!(d.receive_output().unwrap_err().is_timeout());

    d.reset().unwrap();
    d.set_timeout(64);
    let m = DenseMatrix::random(4, 0..256, &mut rng);
    d.send_dense(&m).unwrap();
    d.send_sparse(&s).unwrap();
    let out = d.receive_output().unwrap();
    assert!(verify(&[(&s, &m)], &out).is_match());
}
