//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized

use chrono::Local;

use crate::domain::{FitInput, FitResult};
use crate::error::AppError;

/// Format the full report of one fit: input echo, fitted parameters, per-mode
/// table and a decimated profile table with `profile_rows` rows.
pub fn format_fit_summary(title: &str, input: &FitInput, result: &FitResult, profile_rows: usize) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "=== prism - index profile fit: {} ({}) ===\n",
        title,
        Local::now().format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str(&format!(
        "Input: {} | prism={:.5} | substrate={:.5} | modes={}\n",
        input.polarization.display_name(),
        input.prism_index,
        input.substrate_index,
        fmt_vec(&input.mode_indices),
    ));
    out.push_str(&format!(
        "Hints: alpha={} | B/A={}\n",
        fmt_hint(input.alpha_is_auto(), input.alpha_hint),
        fmt_hint(input.gamma_is_auto(), input.gamma_hint),
    ));

    if result.is_degenerate() {
        out.push_str("\n!! Degenerate fit: non-finite parameters, treat this result as failed.\n");
    }

    out.push_str("\nFitted profile:\n");
    out.push_str(&format!("- n0       : {:.6}\n", result.n0));
    out.push_str(&format!("- alpha    : {:.6}\n", result.calculated_alpha));
    out.push_str(&format!("- B/A      : {:.6}\n", result.calculated_gamma));
    out.push_str(&format!("- A, B     : {}\n", fmt_vec(&result.ab)));
    out.push_str(&format!("- residual : {:.3e}\n", result.residual));
    out.push_str(&format!(
        "- search   : {} step(s){}\n",
        result.iterations,
        if result.converged { "" } else { " (not converged)" }
    ));

    out.push_str("\nModes:\n");
    out.push_str(&format_mode_table(input, result));

    if profile_rows > 0 {
        out.push_str("\nProfile:\n");
        out.push_str(&format_profile_table(input.substrate_index, result, profile_rows));
    }

    out
}

/// One line per batch sample: name, headline parameters or the error.
pub fn format_batch_overview(entries: &[(String, Result<FitResult, AppError>)]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<20} {:>10} {:>10} {:>10} {:>12} {:<10}\n",
        "sample", "n0", "alpha", "B/A", "residual", "status"
    ));
    out.push_str(&format!(
        "{:-<20} {:-<10} {:-<10} {:-<10} {:-<12} {:-<10}\n",
        "", "", "", "", "", ""
    ));

    for (name, entry) in entries {
        let line = match entry {
            Ok(r) => format!(
                "{:<20} {:>10.6} {:>10.4} {:>10.4} {:>12.3e} {:<10}",
                truncate(name, 20),
                r.n0,
                r.calculated_alpha,
                r.calculated_gamma,
                r.residual,
                fit_status(r),
            ),
            Err(e) => format!("{:<20} failed: {}", truncate(name, 20), e),
        };
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

fn format_mode_table(input: &FitInput, result: &FitResult) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:>4} {:>10} {:>10} {:>8} {:>8} {:>10} {:>10}\n",
        "#", "Neff", "N(fit)", "mi", "b", "z(um)", "dn"
    ));
    out.push_str(&format!(
        "{:-<4} {:-<10} {:-<10} {:-<8} {:-<8} {:-<10} {:-<10}\n",
        "", "", "", "", "", "", ""
    ));

    for (i, &neff) in input.mode_indices.iter().enumerate() {
        let at = |v: &[f64]| v.get(i).copied().unwrap_or(f64::NAN);
        out.push_str(&format!(
            "{:>4} {:>10.6} {:>10.6} {:>8.4} {:>8.4} {:>10.4} {:>10.6}\n",
            i,
            neff,
            at(&result.nm),
            at(&result.mi),
            at(&result.bm),
            at(&result.zm),
            neff - input.substrate_index,
        ));
    }

    out
}

fn format_profile_table(substrate_index: f64, result: &FitResult, rows: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:>10} {:>10} {:>10}\n", "z(um)", "N", "dn"));
    out.push_str(&format!("{:-<10} {:-<10} {:-<10}\n", "", "", ""));

    for i in decimate(result.z.len(), rows) {
        out.push_str(&format!(
            "{:>10.4} {:>10.6} {:>10.6}\n",
            result.z[i],
            result.n[i],
            result.n[i] - substrate_index
        ));
    }

    out
}

/// Evenly spaced indices into a grid of `len` points, first and last included.
fn decimate(len: usize, rows: usize) -> Vec<usize> {
    if len == 0 || rows == 0 {
        return Vec::new();
    }
    if rows == 1 || len == 1 {
        return vec![0];
    }
    let rows = rows.min(len);
    let mut idx: Vec<usize> = (0..rows).map(|k| k * (len - 1) / (rows - 1)).collect();
    idx.dedup();
    idx
}

fn fit_status(r: &FitResult) -> &'static str {
    if r.is_degenerate() {
        "degenerate"
    } else if !r.converged {
        "capped"
    } else {
        "ok"
    }
}

fn fmt_hint(auto: bool, v: f64) -> String {
    if auto { "auto".to_string() } else { format!("{v}") }
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.6}")).collect();
    format!("[{}]", parts.join(", "))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
