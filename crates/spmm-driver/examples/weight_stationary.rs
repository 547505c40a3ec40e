//! Weight-stationary walkthrough on the software device
//!
//! Sends one sparse weight in ws mode, then streams three dense operands
//! through it and checks every output against the golden evaluator.

use rand::rngs::StdRng;
use rand::SeedableRng;
use spmm_driver::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("spmm_driver=debug")
        .init();

    let mut rng = StdRng::seed_from_u64(2024);
    let mut driver = Driver::new(SoftwareSpmm::new(8)?);
    let n = driver.reset()?;
    driver.set_timeout(256);
    println!("Device ready: n = {n}\n");

    let weight = SparseMatrix::generate(&SparseShape::Random { row_nnz: 1..5 }, n, StreamMode::Ws, &mut rng);
    println!("Weight: {} nonzeros, sent once", weight.nnz());
    driver.send_sparse(&weight)?;

    for i in 0..3 {
        let dense = DenseMatrix::random(n, 0..16, &mut rng);
        driver.send_dense(&dense)?;
        let out = driver.receive_output()?;
        let v = verify(&[(&weight, &dense)], &out);
        println!("Pass {i} at cycle {}: {}", driver.cycles(), if v.is_match() { "match" } else { "MISMATCH" });
        if !v.is_match() {
            println!("{v}");
        }
    }

    println!("\nPasses executed: {}", driver.device().passes());
    Ok(())
}
