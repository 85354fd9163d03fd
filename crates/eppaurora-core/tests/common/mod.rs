#![allow(dead_code)]

use ndarray::{ArrayD, IxDyn};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::PathBuf;

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn load_fixtures<T: DeserializeOwned>(name: &str) -> T {
    let path = fixture_path(name);
    let source = fs::read_to_string(&path).unwrap_or_else(|error| {
        panic!(
            "fixture file {} should be readable: {}",
            path.display(),
            error
        )
    });
    serde_json::from_str(&source).unwrap_or_else(|error| {
        panic!(
            "fixture file {} should parse as JSON: {}",
            path.display(),
            error
        )
    })
}

/// Installs a test subscriber honouring `RUST_LOG`; repeated calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn assert_scalar_close(label: &str, expected: f64, actual: f64, abs_tol: f64, rel_tol: f64) {
    let diff = (expected - actual).abs();
    let scale = expected.abs().max(actual.abs()).max(1.0e-300);
    assert!(
        diff <= abs_tol || diff / scale <= rel_tol,
        "{label}: expected {expected}, got {actual} (|diff|={diff}, abs_tol={abs_tol}, rel_tol={rel_tol})"
    );
}

pub fn scalar(value: f64) -> ArrayD<f64> {
    ArrayD::from_elem(IxDyn(&[]), value)
}

pub fn array(shape: &[usize], values: &[f64]) -> ArrayD<f64> {
    ArrayD::from_shape_vec(IxDyn(shape), values.to_vec())
        .unwrap_or_else(|error| panic!("{values:?} should fit shape {shape:?}: {error}"))
}
