//! Output helpers shared by all commands.

use colored::Colorize;
use serde::Serialize;

use crate::OutputFormat;

/// Print a serializable result as pretty JSON. Only JSON mode prints; text
/// mode commands render their own report.
pub fn print<T: Serialize>(value: &T, format: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match render(value, format) {
        Some(Ok(json)) => println!("{}", json),
        Some(Err(e)) => eprintln!("{}: failed to serialize output: {}", "Error".red().bold(), e),
        None => {}
    }
}

fn render<T: Serialize>(value: &T, format: OutputFormat) -> Option<serde_json::Result<String>> {
    match format {
        OutputFormat::Json => Some(serde_json::to_string_pretty(value)),
        OutputFormat::Text => None,
    }
}

/// Print a success line. Silent in JSON mode, where the result itself is the output.
pub fn success(message: &str, format: OutputFormat, quiet: bool) {
    if quiet || matches!(format, OutputFormat::Json) {
        return;
    }
    println!("{} {}", "✓".green().bold(), message);
}

/// Print a warning line to stderr.
pub fn warning(message: &str, quiet: bool) {
    if quiet {
        return;
    }
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Counts {
        faces: usize,
    }

    #[test]
    fn test_json_mode_renders_pretty_json() {
        let json = render(&Counts { faces: 9 }, OutputFormat::Json)
            .unwrap()
            .unwrap();
        assert_eq!(json, "{\n  \"faces\": 9\n}");
    }

    #[test]
    fn test_text_mode_renders_nothing() {
        assert!(render(&Counts { faces: 9 }, OutputFormat::Text).is_none());
    }
}
