use prism_profile::app::pipeline::run_batch;
use prism_profile::data::synthesize_modes;
use prism_profile::domain::{AUTO_ALPHA, AUTO_GAMMA, FitCoefficients, FitInput, Polarization, SyntheticProfile};
use prism_profile::fit::{PROFILE_GRID_POINTS, fit_profile};
use prism_profile::io::parse_measurement_file;

fn input(modes: Vec<f64>, polarization: Polarization) -> FitInput {
    FitInput {
        prism_index: 2.5,
        mode_indices: modes,
        substrate_index: 1.65,
        alpha_hint: AUTO_ALPHA,
        gamma_hint: AUTO_GAMMA,
        polarization,
    }
}

fn synthetic(alpha: f64, a: f64, b: f64, polarization: Polarization) -> Vec<f64> {
    let profile = SyntheticProfile {
        surface_index: 1.75,
        substrate_index: 1.65,
        alpha,
        coefficients: FitCoefficients { a, b },
        polarization,
    };
    synthesize_modes(&profile, 6).unwrap()
}

#[test]
fn three_mode_measurement_gives_a_physical_profile() {
    let r = fit_profile(&input(vec![1.72, 1.70, 1.68], Polarization::Te)).unwrap();

    assert!(r.calculated_alpha.is_finite());
    assert!((0.2..=20.0).contains(&r.calculated_alpha));
    assert!(r.n0 > 1.65);
    assert!(r.residual.is_finite() && r.residual < 3.0);
    assert!(!r.is_degenerate());

    assert_eq!(r.z.len(), PROFILE_GRID_POINTS);
    assert_eq!(r.n.len(), PROFILE_GRID_POINTS);
    for w in r.n.windows(2) {
        assert!(w[1] < w[0]);
    }
    assert!(r.z.iter().all(|z| z.is_finite() && *z >= 0.0));

    assert_eq!(r.zm.len(), 3);
    assert_eq!(r.mi.len(), 3);
}

#[test]
fn three_mode_tm_measurement_stops_at_the_step_cap() {
    let r = fit_profile(&input(vec![1.72, 1.70, 1.68], Polarization::Tm)).unwrap();

    assert!(!r.converged);
    assert!(r.iterations > 0);
    assert!(!r.is_degenerate());
    assert!((0.2..=20.0).contains(&r.calculated_alpha));
    assert!(r.n0 > 1.65);
    assert!(r.residual.is_finite() && r.residual < 3.0);
    assert!(r.z.iter().all(|z| z.is_finite() && *z >= 0.0));
}

#[test]
fn recovers_synthetic_te_profile() {
    let modes = synthetic(1.5, 6.0, 1.5, Polarization::Te);
    let r = fit_profile(&input(modes, Polarization::Te)).unwrap();

    assert!((r.calculated_alpha - 1.5).abs() < 1e-3, "alpha {}", r.calculated_alpha);
    assert!((r.ab[0] - 6.0).abs() < 1e-2, "A {}", r.ab[0]);
    assert!((r.ab[1] - 1.5).abs() < 1e-2, "B {}", r.ab[1]);
    assert!((r.calculated_gamma - 0.25).abs() < 1e-2);
    assert!((r.n0 - 1.75).abs() < 1e-4, "n0 {}", r.n0);
    assert!(r.residual < 1e-9, "residual {}", r.residual);
    assert!(r.converged);
}

#[test]
fn recovers_synthetic_tm_profile() {
    let modes = synthetic(2.0, 6.0, 1.0, Polarization::Tm);
    let r = fit_profile(&input(modes, Polarization::Tm)).unwrap();

    assert!((r.calculated_alpha - 2.0).abs() < 1e-3, "alpha {}", r.calculated_alpha);
    assert!((r.ab[0] - 6.0).abs() < 1e-2);
    assert!((r.ab[1] - 1.0).abs() < 1e-2);
    assert!((r.n0 - 1.75).abs() < 1e-4);
    assert!(r.residual < 1e-9);
}

#[test]
fn fixed_ratio_is_reported_and_enforced() {
    let modes = synthetic(1.5, 6.0, 1.5, Polarization::Te);
    let r = fit_profile(&FitInput {
        gamma_hint: 0.25,
        ..input(modes, Polarization::Te)
    })
    .unwrap();

    assert_eq!(r.calculated_gamma, 0.25);
    assert_eq!(r.ab[1], r.ab[0] * 0.25);
    assert!((r.calculated_alpha - 1.5).abs() < 1e-3);
    assert!((r.n0 - 1.75).abs() < 1e-4);
}

#[test]
fn fixed_exponent_is_reported_unchanged() {
    let modes = synthetic(1.5, 6.0, 1.5, Polarization::Te);
    let r = fit_profile(&FitInput {
        alpha_hint: 1.5,
        ..input(modes, Polarization::Te)
    })
    .unwrap();

    assert_eq!(r.calculated_alpha, 1.5);
    assert!((r.ab[0] - 6.0).abs() < 1e-2);
    assert!((r.n0 - 1.75).abs() < 1e-4);
}

#[test]
fn depth_grows_into_the_substrate() {
    let modes = synthetic(1.5, 6.0, 1.5, Polarization::Te);
    let r = fit_profile(&input(modes, Polarization::Te)).unwrap();
    assert!(r.calculated_alpha > 0.5 && r.ab[1] >= 0.0);

    assert_eq!(r.z[0], 0.0);
    for w in r.z.windows(2) {
        assert!(w[1] >= w[0]);
    }
    for (z, n) in r.depth_profile().take(100) {
        assert!(z.is_finite() && n > 1.65);
    }

    // Deeper modes turn at larger depth and lower index.
    let modes: Vec<(f64, f64)> = r.mode_depths().collect();
    assert_eq!(modes.len(), 6);
    for ((zm, nm), measured) in modes.iter().zip(synthetic(1.5, 6.0, 1.5, Polarization::Te)) {
        assert!(zm.is_finite() && *zm > 0.0);
        assert!((nm - measured).abs() < 1e-9, "{nm} vs {measured}");
    }
    for w in modes.windows(2) {
        assert!(w[1].0 > w[0].0);
        assert!(w[1].1 < w[0].1);
    }
}

#[test]
fn degenerate_input_fails_with_code_4() {
    for (alpha_hint, gamma_hint) in [(AUTO_ALPHA, AUTO_GAMMA), (1.5, 0.25)] {
        let err = fit_profile(&FitInput {
            alpha_hint,
            gamma_hint,
            ..input(vec![1.65, 1.64], Polarization::Te)
        })
        .unwrap_err();
        assert_eq!(err.exit_code(), 4);
        assert!(err.message().contains("indistinguishable"));
    }
}

#[test]
fn too_few_modes_is_invalid_input() {
    let err = fit_profile(&input(vec![1.72], Polarization::Te)).unwrap_err();
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn batch_results_match_single_fits() {
    let json = r#"{
        "samples": [
            { "name": "first", "mode_indices": [1.72, 1.70, 1.68], "substrate_index": 1.65 },
            { "name": "second", "mode_indices": [1.72, 1.70, 1.68], "substrate_index": 1.65, "alpha_hint": 1.2 },
            { "name": "third", "mode_indices": [1.72, 1.70, 1.68], "substrate_index": 1.65 }
        ]
    }"#;
    let file = parse_measurement_file(json).unwrap();
    let entries = run_batch(&file, 2.5).unwrap();
    assert_eq!(entries.len(), 3);

    let single = fit_profile(&input(vec![1.72, 1.70, 1.68], Polarization::Te)).unwrap();
    for idx in [0, 2] {
        let r = entries[idx].outcome.as_ref().unwrap();
        assert_eq!(r.n0, single.n0);
        assert_eq!(r.calculated_alpha, single.calculated_alpha);
        assert_eq!(r.ab, single.ab);
        assert_eq!(r.z, single.z);
    }
    assert_eq!(entries[1].outcome.as_ref().unwrap().calculated_alpha, 1.2);
}
