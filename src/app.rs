//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - installs logging
//! - runs the requested workflow
//! - prints the text report or JSON

use clap::Parser;
use tracing::warn;

use crate::cli::{AnglesArgs, BatchArgs, Command, FitArgs, FitOptions, SimulateArgs};
use crate::domain::{AngleReadings, FitCoefficients, FitConfig, FitInput, SyntheticProfile};
use crate::error::AppError;

pub mod pipeline;

const SUBCOMMANDS: [&str; 4] = ["fit", "angles", "batch", "simulate"];

/// Entry point for the `prism` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is the normal case.
    dotenvy::dotenv().ok();

    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    crate::logging::setup_logging(cli.verbose)?;

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Angles(args) => handle_angles(args),
        Command::Batch(args) => handle_batch(args),
        Command::Simulate(args) => handle_simulate(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_options(&args.options, args.modes, args.substrate);
    let run = pipeline::run_fit(&config)?;
    print_single("fit", &config, &run)
}

fn handle_angles(args: AnglesArgs) -> Result<(), AppError> {
    let readings = AngleReadings {
        prism_angle: args.prism_angle,
        substrate_angle: args.substrate_angle,
        volume_angle: args.volume_angle,
        mode_angles: args.mode_angles,
    };
    let config = fit_config_from_options(&args.options, Vec::new(), f64::NAN);
    let run = pipeline::run_angles(&readings, &config)?;
    print_single("angles", &config, &run)
}

fn handle_batch(args: BatchArgs) -> Result<(), AppError> {
    let file = crate::io::read_measurement_file(&args.input)?;
    let entries = pipeline::run_batch(&file, args.prism_index)?;

    if args.json {
        let records: Vec<_> = entries.iter().map(|e| e.record()).collect();
        println!("{}", to_json(&records)?);
        return Ok(());
    }

    if args.rows > 0 {
        for entry in &entries {
            if let Ok(result) = &entry.outcome {
                println!(
                    "{}",
                    crate::report::format_fit_summary(&entry.name, &entry.input, result, args.rows)
                );
            }
        }
    }

    let overview: Vec<_> = entries.into_iter().map(|e| (e.name, e.outcome)).collect();
    println!("{}", crate::report::format_batch_overview(&overview));
    Ok(())
}

fn handle_simulate(args: SimulateArgs) -> Result<(), AppError> {
    let profile = SyntheticProfile {
        surface_index: args.surface_index,
        substrate_index: args.substrate,
        alpha: args.alpha,
        coefficients: FitCoefficients { a: args.a, b: args.b },
        polarization: args.polarization,
    };
    let modes = pipeline::run_simulate(&profile, args.count, args.noise, args.seed)?;

    for (i, n) in modes.iter().enumerate() {
        println!("{i:>3} {n:.10}");
    }
    let joined: Vec<String> = modes.iter().map(|n| format!("{n:.10}")).collect();
    println!("--modes {} --substrate {}", joined.join(","), args.substrate);
    Ok(())
}

fn print_single(title: &str, config: &FitConfig, run: &pipeline::RunOutput) -> Result<(), AppError> {
    println!("{}", render_single(title, config, run)?);

    if run.result.is_degenerate() {
        warn!("fit produced non-finite parameters");
        return Err(AppError::new(4, "The fit is degenerate (non-finite parameters)."));
    }
    Ok(())
}

/// Report text (or JSON) of one fit, headed by the subcommand name.
fn render_single(title: &str, config: &FitConfig, run: &pipeline::RunOutput) -> Result<String, AppError> {
    if config.json {
        to_json(&run.result)
    } else {
        Ok(crate::report::format_fit_summary(title, &run.input, &run.result, config.profile_rows))
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value).map_err(|e| AppError::new(2, format!("Failed to serialize JSON: {e}")))
}

pub fn fit_config_from_options(options: &FitOptions, modes: Vec<f64>, substrate: f64) -> FitConfig {
    FitConfig {
        input: FitInput {
            prism_index: options.prism_index,
            mode_indices: modes,
            substrate_index: substrate,
            alpha_hint: options.alpha,
            gamma_hint: options.gamma,
            polarization: options.polarization,
        },
        profile_rows: options.rows,
        json: options.json,
    }
}

/// Rewrite argv so `prism --modes … --substrate …` means `prism fit …`.
///
/// Rules:
/// - `prism`                       -> unchanged (clap prints usage)
/// - `prism --help/--version/-h`   -> unchanged
/// - any explicit subcommand       -> unchanged
/// - first token is a flag         -> `fit` inserted
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    // `prism -v fit …` names the subcommand after a global flag.
    let has_subcommand = argv[1..].iter().any(|a| SUBCOMMANDS.contains(&a.as_str()));
    if has_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "fit".to_string());
    }
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn flags_default_to_fit() {
        assert_eq!(
            rewrite_args(args(&["prism", "--modes", "1.72,1.70", "--substrate", "1.65"])),
            args(&["prism", "fit", "--modes", "1.72,1.70", "--substrate", "1.65"])
        );
    }

    #[test]
    fn explicit_subcommands_are_kept() {
        let argv = args(&["prism", "-v", "batch", "--input", "m.json"]);
        assert_eq!(rewrite_args(argv.clone()), argv);
        let argv = args(&["prism", "simulate", "--surface-index", "1.75", "--substrate", "1.65"]);
        assert_eq!(rewrite_args(argv.clone()), argv);
    }

    #[test]
    fn help_and_bare_invocation_are_kept() {
        assert_eq!(rewrite_args(args(&["prism"])), args(&["prism"]));
        assert_eq!(rewrite_args(args(&["prism", "--help"])), args(&["prism", "--help"]));
    }

    #[test]
    fn rewritten_args_parse() {
        let argv = rewrite_args(args(&["prism", "--modes", "1.72,1.70", "--substrate", "1.65", "--gamma", "0.25"]));
        let cli = crate::cli::Cli::try_parse_from(argv).unwrap();
        let Command::Fit(fit) = cli.command else { panic!("expected fit") };
        let config = fit_config_from_options(&fit.options, fit.modes, fit.substrate);
        assert_eq!(config.input.mode_indices, vec![1.72, 1.70]);
        assert_eq!(config.input.gamma_hint, 0.25);
        assert!(config.input.alpha_is_auto());
        assert!(!config.json);
    }

    #[test]
    fn single_report_is_titled_by_subcommand() {
        let argv = args(&["prism", "fit", "--modes", "1.72,1.70,1.68", "--substrate", "1.65", "--alpha", "1.5", "--gamma", "0.25"]);
        let cli = crate::cli::Cli::try_parse_from(argv).unwrap();
        let Command::Fit(fit) = cli.command else { panic!("expected fit") };
        let config = fit_config_from_options(&fit.options, fit.modes, fit.substrate);
        let run = pipeline::run_fit(&config).unwrap();

        let text = render_single("angles", &config, &run).unwrap();
        let header = text.lines().next().unwrap();
        assert!(header.starts_with("=== prism - index profile fit: angles ("));
        assert!(!header.contains("TE"));

        let json = render_single("fit", &FitConfig { json: true, ..config.clone() }, &run).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["calculated_alpha"], 1.5);
    }
}
