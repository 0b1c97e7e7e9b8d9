use std::io::Write;
use std::time::Duration;

use owo_colors::OwoColorize;

use pdfcompare_core::{ExtractionError, ExtractionResult};

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// One row of `pdfcompare compare`.
pub struct BackendOutcome {
    pub backend: String,
    pub elapsed: Duration,
    pub result: Result<ExtractionResult, ExtractionError>,
}

/// Print the comparison table header for `file_name`.
pub fn print_compare_header(
    w: &mut dyn Write,
    file_name: &str,
    size: usize,
    color: ColorMode,
) -> std::io::Result<()> {
    let title = format!("Comparing extraction backends on {file_name} ({size} bytes)");
    if color.enabled() {
        writeln!(w, "{}", title.bold())?;
    } else {
        writeln!(w, "{title}")?;
    }
    writeln!(w)?;
    Ok(())
}

/// Print a single backend's outcome.
pub fn print_outcome(
    w: &mut dyn Write,
    outcome: &BackendOutcome,
    color: ColorMode,
) -> std::io::Result<()> {
    // Prefer the backend's own round-trip timing when it reports one.
    let elapsed = match &outcome.result {
        Ok(result) => result.elapsed.unwrap_or(outcome.elapsed),
        Err(_) => outcome.elapsed,
    };
    let ms = format!("{:>8.1} ms", elapsed.as_secs_f64() * 1000.0);

    match &outcome.result {
        Ok(result) => {
            let chars = result.text.chars().count();
            let lines = result.text.lines().count();
            if color.enabled() {
                writeln!(
                    w,
                    "  {:<12} {}  {}  {} chars, {} lines",
                    outcome.backend,
                    "OK    ".green(),
                    ms.dimmed(),
                    chars,
                    lines
                )?;
            } else {
                writeln!(
                    w,
                    "  {:<12} OK      {}  {} chars, {} lines",
                    outcome.backend, ms, chars, lines
                )?;
            }
        }
        Err(err) => {
            if color.enabled() {
                writeln!(
                    w,
                    "  {:<12} {}  {}  {}",
                    outcome.backend,
                    "FAILED".red(),
                    ms.dimmed(),
                    err
                )?;
            } else {
                writeln!(w, "  {:<12} FAILED  {}  {}", outcome.backend, ms, err)?;
            }
        }
    }
    Ok(())
}

/// Print a short preview of each successful backend's text.
pub fn print_previews(
    w: &mut dyn Write,
    outcomes: &[BackendOutcome],
    max_chars: usize,
    color: ColorMode,
) -> std::io::Result<()> {
    for outcome in outcomes {
        let Ok(result) = &outcome.result else {
            continue;
        };
        writeln!(w)?;
        if color.enabled() {
            writeln!(w, "── {} ──", outcome.backend.cyan())?;
        } else {
            writeln!(w, "── {} ──", outcome.backend)?;
        }
        writeln!(w, "{}", preview(&result.text, max_chars))?;
    }
    Ok(())
}

fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}
