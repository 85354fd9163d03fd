mod common;

use common::{assert_scalar_close, init_tracing, scalar};
use eppaurora_core::common::settings::SsusiModelSettings;
use eppaurora_core::conductivity::{sigma_h, sigma_p};
use eppaurora_core::models::zhangpaxton2008::{DEFAULT_HARMONICS, KP_BIN_CENTRES};
use eppaurora_core::models::{
    CoefficientTableError, EpsteinTableError, ProxyValues, SsusiModel, SsusiQuery, TableDim,
    ZhangPaxtonModel, hemispheric_power, ssusiq2023, zp2008,
};
use eppaurora_core::{AuroraError, AuroraErrorCategory};
use ndarray::{ArrayD, IxDyn};
use std::fmt::Write;
use std::fs;

const SSUSI_TABLE: &str = r#"{
    "version": "2023.1-test",
    "altitude": [100.0, 120.0],
    "latitude": [65.0, 75.0],
    "mlt": [0.0, 12.0],
    "proxy": ["Kp", "log_f107_81ctr_obs", "offset"],
    "beta": [
        [[[0.5, 1.0, 2.0], [0.5, 1.0, 3.0]],
         [[0.5, 1.0, 4.0], [0.5, 1.0, 5.0]]],
        [[[0.1, 0.2, 1.0], [0.1, 0.2, 1.0]],
         [[0.1, 0.2, 1.0], [0.1, 0.2, 1.0]]]
    ],
    "beta_std": [
        [[[0.1, 0.0, 0.5], [0.1, 0.0, 0.5]],
         [[0.1, 0.0, 0.5], [0.1, 0.0, 0.5]]],
        [[[0.1, 0.0, 0.5], [0.1, 0.0, 0.5]],
         [[0.1, 0.0, 0.5], [0.1, 0.0, 0.5]]]
    ],
    "sigma2": [
        [[0.25, 0.25], [0.25, 0.25]],
        [[0.25, 0.25], [0.25, 0.25]]
    ]
}"#;

/// Energy-flux blocks `[2·(bin + 1), 25, 1, 1]` and mean-energy blocks
/// `[4·(bin + 1), 25, 1, 1]` with all harmonics zero.
fn zhang_paxton_text() -> String {
    let mut text = String::from("# bin-scaled Epstein coefficients\n\n");
    for scale in [2.0, 4.0] {
        for bin in 0..KP_BIN_CENTRES.len() {
            writeln!(text, "A0 {} 25.0 1.0 1.0", scale * (bin as f64 + 1.0)).expect("write");
            for order in 0..2 * DEFAULT_HARMONICS {
                writeln!(text, "c{order} 0 0 0 0").expect("write");
            }
        }
    }
    text
}

#[test]
fn ssusi_table_loads_from_disk_and_evaluates_on_a_query_grid() {
    init_tracing();
    let directory = tempfile::tempdir().expect("tempdir");
    let path = directory.path().join("ssusi_coeffs.json");
    fs::write(&path, SSUSI_TABLE).expect("write table");

    let model = SsusiModel::load(&path).expect("load table");
    assert_eq!(model.version(), Some("2023.1-test"));
    assert_eq!(model.altitudes(), &[100.0, 120.0]);
    assert!(model.has_offset());
    assert!(model.has_posterior_variance());

    let latitudes = ArrayD::from_shape_vec(IxDyn(&[2]), vec![65.0, 75.0]).expect("latitudes");
    let (mlt, altitude) = (scalar(12.0), scalar(100.0));
    let proxies = ArrayD::from_shape_vec(IxDyn(&[2]), vec![3.0, 2.0]).expect("proxies");
    let settings = SsusiModelSettings {
        return_variance: true,
        ..SsusiModelSettings::default()
    };
    let prediction = ssusiq2023(
        &model,
        &SsusiQuery::new(latitudes.view(), mlt.view(), altitude.view()),
        &ProxyValues::Raw(proxies.view()),
        &settings,
    )
    .expect("prediction");

    assert_eq!(prediction.log_q.dims()[0], "latitude");
    assert_eq!(prediction.log_q.shape(), &[2, 1]);
    let log_q = prediction.log_q.data();
    assert_scalar_close("log q at 65", 1.5 + 2.0 + 3.0, log_q[[0, 0]], 0.0, 1.0e-12);
    assert_scalar_close("log q at 75", 1.5 + 2.0 + 5.0, log_q[[1, 0]], 0.0, 1.0e-12);

    let variance = prediction.variance.expect("variance");
    assert_scalar_close("var", 0.09 + 0.25 + 0.25, variance.data()[[0, 0]], 0.0, 1.0e-12);
}

/// Coefficients nested mlt × latitude × altitude with
/// `beta_Kp = 100·mlt_bin + 10·lat_bin + alt_bin` and a zero offset.
fn mlt_major_table() -> String {
    let mlts = [3.0, 5.0, 7.0];
    let latitudes = [66.6, 70.2];
    let altitudes = [100.0, 105.0, 110.0, 115.0];
    let nested = |kp: fn(usize, usize, usize) -> f64| -> Vec<Vec<Vec<[f64; 2]>>> {
        (0..mlts.len())
            .map(|m| {
                (0..latitudes.len())
                    .map(|l| (0..altitudes.len()).map(|a| [kp(m, l, a), 0.0]).collect())
                    .collect()
            })
            .collect()
    };
    serde_json::json!({
        "dims": ["mlt", "latitude", "altitude"],
        "altitude": altitudes,
        "latitude": latitudes,
        "mlt": mlts,
        "proxy": ["Kp", "offset"],
        "beta": nested(|m, l, a| (100 * m + 10 * l + a) as f64),
        "beta_std": nested(|_, _, _| 0.5),
    })
    .to_string()
}

#[test]
fn vector_output_follows_the_table_dimension_order() {
    let model = SsusiModel::from_json_str(&mlt_major_table()).expect("table");
    assert_eq!(model.dims(), [TableDim::Mlt, TableDim::Latitude, TableDim::Altitude]);

    let latitudes = ArrayD::from_shape_vec(IxDyn(&[2]), vec![66.6, 70.2]).expect("latitudes");
    let mlts = ArrayD::from_shape_vec(IxDyn(&[3]), vec![3.0, 5.0, 7.0]).expect("mlts");
    let altitudes =
        ArrayD::from_shape_vec(IxDyn(&[4]), vec![100.0, 105.0, 110.0, 115.0]).expect("altitudes");
    let kp = ArrayD::from_shape_vec(IxDyn(&[1, 1]), vec![2.0]).expect("kp");
    let prediction = ssusiq2023(
        &model,
        &SsusiQuery::new(latitudes.view(), mlts.view(), altitudes.view()),
        &ProxyValues::Raw(kp.view()),
        &SsusiModelSettings::default(),
    )
    .expect("prediction");

    assert_eq!(prediction.log_q.shape(), &[3, 2, 4, 1]);
    assert_eq!(
        prediction.log_q.dims(),
        &["mlt", "latitude", "altitude", "dim_0"].map(String::from)
    );
    assert_eq!(prediction.log_q.data()[[2, 1, 3, 0]], 2.0 * 213.0);
    assert_eq!(prediction.log_q.data()[[0, 1, 2, 0]], 2.0 * 12.0);
    assert_eq!(prediction.log_q.data()[[1, 0, 0, 0]], 2.0 * 100.0);
}

#[test]
fn missing_coefficient_tables_are_io_errors() {
    let directory = tempfile::tempdir().expect("tempdir");
    let missing = directory.path().join("absent.json");

    let error = SsusiModel::load(&missing).expect_err("missing ssusi table");
    assert!(matches!(error, CoefficientTableError::Read { .. }));
    let error: AuroraError = error.into();
    assert_eq!(error.category(), AuroraErrorCategory::IoSystemError);
    assert_eq!(error.placeholder(), "IO.COEFFS");

    let error = ZhangPaxtonModel::load(directory.path().join("Zhang2008.txt"))
        .expect_err("missing epstein table");
    assert!(matches!(error, EpsteinTableError::Read { .. }));
    let error: AuroraError = error.into();
    assert_eq!(error.category(), AuroraErrorCategory::IoSystemError);
    assert_eq!(error.placeholder(), "IO.EPSTEIN");
}

#[test]
fn malformed_tables_are_input_errors() {
    let directory = tempfile::tempdir().expect("tempdir");
    let path = directory.path().join("broken.json");
    fs::write(&path, "{ \"altitude\": [100.0] ").expect("write table");
    let error: AuroraError = SsusiModel::load(&path).expect_err("truncated json").into();
    assert_eq!(error.category(), AuroraErrorCategory::InputValidationError);

    let path = directory.path().join("short.txt");
    fs::write(&path, "A0 1 2 3 4\n").expect("write table");
    let error = ZhangPaxtonModel::load(&path).expect_err("one row");
    assert!(matches!(error, EpsteinTableError::RowCount { actual: 1, .. }));
}

#[test]
fn zhang_paxton_table_drives_robinson_conductances() {
    init_tracing();
    let directory = tempfile::tempdir().expect("tempdir");
    let path = directory.path().join("Zhang2008.txt");
    fs::write(&path, zhang_paxton_text()).expect("write table");
    let model = ZhangPaxtonModel::load(&path).expect("load table");

    // Kp at a bin centre picks that bin alone; at mlat 65 the Epstein
    // function is A / 4.
    let prediction = zp2008(&model, 65.0, 6.0, KP_BIN_CENTRES[2]).expect("prediction");
    assert_scalar_close("Q0", 2.0 * 3.0 / 4.0, prediction.energy_flux, 0.0, 1.0e-12);
    assert_scalar_close("Em", 4.0 * 3.0 / 4.0, prediction.mean_energy, 0.0, 1.0e-12);

    let pedersen = sigma_p(prediction.mean_energy, prediction.energy_flux);
    let hall = sigma_h(prediction.mean_energy, prediction.energy_flux);
    assert_scalar_close(
        "SigmaP",
        40.0 * 3.0 / (16.0 + 9.0) * 1.5_f64.sqrt(),
        pedersen,
        0.0,
        1.0e-12,
    );
    assert!(hall > pedersen);

    let weight = (hemispheric_power(4.5) - hemispheric_power(3.75))
        / (hemispheric_power(5.25) - hemispheric_power(3.75));
    let between = zp2008(&model, 65.0, 6.0, 4.5).expect("between bins");
    assert_scalar_close(
        "Q0 between bins",
        1.5 + weight * 0.5,
        between.energy_flux,
        0.0,
        1.0e-12,
    );
}
