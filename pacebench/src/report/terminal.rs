use std::io::{self, Write};

use colored::Colorize;

use pacebench_core::compare::{classify, Comparison, ResultStats, Verdict};
use pacebench_core::report::{ReportError, Reporter, RunOutcome, RunReport};
use pacebench_core::stats::ConfidenceInterval;

/// A reporter that renders run results as a terminal table.
#[derive(Debug, Clone, Default)]
pub struct TerminalReporter {
    /// Whether to use colors in output (defaults to true).
    use_colors: bool,
}

const TABLE_WIDTH: usize = 110;

impl TerminalReporter {
    /// Create a new terminal reporter with default settings.
    pub fn new() -> Self {
        Self { use_colors: true }
    }

    /// Create a terminal reporter with color output disabled.
    pub fn without_colors() -> Self {
        Self { use_colors: false }
    }

    /// Format a duration in milliseconds to a human-readable string.
    fn format_ms(ms: f64) -> String {
        if ms.abs() >= 1000.0 {
            format!("{:.2} s", ms / 1000.0)
        } else {
            format!("{:.2}ms", ms)
        }
    }

    /// Format a mean with its confidence interval.
    fn format_mean_ci(mean: f64, ci: ConfidenceInterval) -> String {
        format!(
            "{} ({} .. {})",
            Self::format_ms(mean),
            Self::format_ms(ci.low),
            Self::format_ms(ci.high)
        )
    }

    /// Format an absolute slowdown interval with explicit signs.
    fn format_absolute(ci: ConfidenceInterval) -> String {
        format!("{:+.2}ms .. {:+.2}ms", ci.low, ci.high)
    }

    /// Format a relative slowdown interval as percentages.
    fn format_relative(ci: ConfidenceInterval) -> String {
        format!("{:+.1}% .. {:+.1}%", ci.low * 100.0, ci.high * 100.0)
    }

    /// Format a byte count.
    fn format_bytes(bytes: Option<u64>) -> String {
        match bytes {
            None => "n/a".to_string(),
            Some(b) if b >= 1024 * 1024 => format!("{:.2} MiB", b as f64 / (1024.0 * 1024.0)),
            Some(b) if b >= 1024 => format!("{:.2} KiB", b as f64 / 1024.0),
            Some(b) => format!("{} B", b),
        }
    }

    /// Format the verdict with appropriate coloring.
    fn format_verdict(&self, verdict: Verdict) -> String {
        let text = verdict.as_str();
        if !self.use_colors {
            return text.to_string();
        }
        match verdict {
            Verdict::Faster => text.green().bold().to_string(),
            Verdict::Slower => text.red().bold().to_string(),
            Verdict::Unsure => text.yellow().to_string(),
            Verdict::Baseline => text.to_string(),
        }
    }

    /// Print the per-variant statistics table.
    fn print_stats(&self, writer: &mut impl Write, results: &[ResultStats]) -> io::Result<()> {
        writeln!(writer)?;
        let header = format!(
            "{:<40} {:>8} {:>12} {:>32} {:>12}",
            "Variant", "Samples", "Bytes", "Mean (95% CI)", "StdDev"
        );
        if self.use_colors {
            writeln!(writer, "{}", header.bold())?;
        } else {
            writeln!(writer, "{}", header)?;
        }
        writeln!(writer, "{}", "-".repeat(TABLE_WIDTH))?;

        for row in results {
            let label = truncate(&row.variant.label(), 38);
            let marker = if row.is_baseline { "*" } else { "" };
            writeln!(
                writer,
                "{:<40} {:>8} {:>12} {:>32} {:>12}",
                format!("{}{}", label, marker),
                row.stats.size,
                Self::format_bytes(row.bytes_sent),
                Self::format_mean_ci(row.stats.mean, row.stats.mean_ci),
                Self::format_ms(row.stats.std_dev),
            )?;
        }

        Ok(())
    }

    /// Print the pairwise comparison section.
    fn print_comparisons(
        &self,
        writer: &mut impl Write,
        results: &[ResultStats],
    ) -> io::Result<()> {
        // Nothing to compare with a single variant.
        if results.len() < 2 {
            return Ok(());
        }

        writeln!(writer)?;
        let header = format!(
            "{:<44} {:>24} {:>20} {:>10}",
            "Comparison", "Absolute", "Relative", "Verdict"
        );
        if self.use_colors {
            writeln!(writer, "{}", header.bold())?;
        } else {
            writeln!(writer, "{}", header)?;
        }
        writeln!(writer, "{}", "-".repeat(TABLE_WIDTH))?;

        for row in results {
            if row.is_baseline {
                writeln!(
                    writer,
                    "{:<44} {:>24} {:>20} {:>10}",
                    truncate(&row.variant.label(), 42),
                    "N/A",
                    "N/A",
                    self.format_verdict(Verdict::Baseline),
                )?;
                continue;
            }

            for comparison in &row.comparisons {
                self.print_comparison_row(writer, results, row, comparison)?;
            }
        }

        Ok(())
    }

    fn print_comparison_row(
        &self,
        writer: &mut impl Write,
        results: &[ResultStats],
        row: &ResultStats,
        comparison: &Comparison,
    ) -> io::Result<()> {
        let label = format!(
            "{} vs {}",
            row.variant.name,
            results[comparison.against].variant.name
        );
        let verdict = comparison.verdict();
        let colored_verdict = self.format_verdict(verdict);

        // Pad manually: ANSI escape codes would skew the format width.
        let verdict_padding = 10_usize.saturating_sub(verdict.as_str().len());

        writeln!(
            writer,
            "{:<44} {:>24} {:>20} {:>width$}{}",
            truncate(&label, 42),
            Self::format_absolute(comparison.absolute_slowdown),
            Self::format_relative(comparison.relative_slowdown),
            "",
            colored_verdict,
            width = verdict_padding,
        )
    }

    /// Print the summary footer.
    fn print_summary(&self, writer: &mut impl Write, report: &RunReport) -> io::Result<()> {
        let mut faster = 0;
        let mut slower = 0;
        let mut unsure = 0;

        for comparison in report.results.iter().flat_map(|r| &r.comparisons) {
            match classify(false, comparison.absolute_slowdown) {
                Verdict::Faster => faster += 1,
                Verdict::Slower => slower += 1,
                _ => unsure += 1,
            }
        }

        writeln!(writer)?;
        writeln!(writer, "{}", "-".repeat(TABLE_WIDTH))?;

        let summary_label = "Summary:";
        if self.use_colors {
            write!(writer, "{} ", summary_label.bold())?;
        } else {
            write!(writer, "{} ", summary_label)?;
        }

        let faster_text = format!("{} faster", faster);
        let slower_text = format!("{} slower", slower);
        let unsure_text = format!("{} unsure", unsure);

        if self.use_colors {
            writeln!(
                writer,
                "{}, {}, {}",
                faster_text.green(),
                slower_text.red(),
                unsure_text.yellow()
            )?;
        } else {
            writeln!(writer, "{}, {}, {}", faster_text, slower_text, unsure_text)?;
        }

        match report.outcome {
            RunOutcome::Resolved => writeln!(
                writer,
                "All comparisons resolved against [{}] in {} round(s) ({:.1}s).",
                report.horizons,
                report.rounds,
                report.elapsed.as_secs_f64()
            )?,
            RunOutcome::TimedOut => writeln!(
                writer,
                "Time budget exhausted after {} round(s) ({:.1}s); results are partial.",
                report.rounds,
                report.elapsed.as_secs_f64()
            )?,
        }

        writeln!(writer)?;
        Ok(())
    }
}

/// Truncate long labels with an ellipsis.
fn truncate(label: &str, max: usize) -> String {
    if label.len() > max {
        format!("{}...", &label[..max.saturating_sub(3)])
    } else {
        label.to_string()
    }
}

impl Reporter for TerminalReporter {
    fn report(&self, report: &RunReport) -> Result<(), ReportError> {
        let stdout = io::stdout();
        let mut writer = stdout.lock();

        self.print_stats(&mut writer, &report.results)?;
        self.print_comparisons(&mut writer, &report.results)?;
        self.print_summary(&mut writer, report)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use pacebench_core::horizons::HorizonSet;
    use pacebench_core::stats::DescriptiveStats;
    use pacebench_core::variant::Variant;

    fn make_row(
        name: &str,
        mean: f64,
        is_baseline: bool,
        comparisons: Vec<Comparison>,
    ) -> ResultStats {
        ResultStats {
            variant: Variant::named(name),
            stats: DescriptiveStats {
                size: 50,
                mean,
                std_dev: mean * 0.05,
                mean_ci: ConfidenceInterval {
                    low: mean * 0.98,
                    high: mean * 1.02,
                },
            },
            bytes_sent: Some(150_000),
            is_baseline,
            comparisons,
        }
    }

    fn make_report(results: Vec<ResultStats>, outcome: RunOutcome) -> RunReport {
        RunReport {
            results,
            outcome,
            horizons: HorizonSet::default(),
            elapsed: Duration::from_secs_f64(12.3),
            rounds: 30,
        }
    }

    #[test]
    fn test_format_ms() {
        assert_eq!(TerminalReporter::format_ms(12.345), "12.35ms");
        assert_eq!(TerminalReporter::format_ms(0.5), "0.50ms");
        assert_eq!(TerminalReporter::format_ms(1500.0), "1.50 s");
        assert_eq!(TerminalReporter::format_ms(-3.0), "-3.00ms");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(TerminalReporter::format_bytes(None), "n/a");
        assert_eq!(TerminalReporter::format_bytes(Some(512)), "512 B");
        assert_eq!(TerminalReporter::format_bytes(Some(2048)), "2.00 KiB");
        assert_eq!(
            TerminalReporter::format_bytes(Some(3 * 1024 * 1024)),
            "3.00 MiB"
        );
    }

    #[test]
    fn test_format_absolute_signs() {
        let ci = ConfidenceInterval { low: -1.1, high: 0.9 };
        assert_eq!(
            TerminalReporter::format_absolute(ci),
            "-1.10ms .. +0.90ms"
        );
    }

    #[test]
    fn test_format_relative_percent() {
        let ci = ConfidenceInterval { low: 0.45, high: 0.55 };
        assert_eq!(
            TerminalReporter::format_relative(ci),
            "+45.0% .. +55.0%"
        );
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("averylonglabelindeed", 10), "averylo...");
    }

    #[test]
    fn test_report_to_buffer() {
        let reporter = TerminalReporter::without_colors();

        let faster = Comparison {
            against: 1,
            absolute_slowdown: ConfidenceInterval { low: -1.1, high: -0.9 },
            relative_slowdown: ConfidenceInterval { low: -0.55, high: -0.45 },
        };
        let slower = Comparison {
            against: 0,
            absolute_slowdown: ConfidenceInterval { low: 0.9, high: 1.1 },
            relative_slowdown: ConfidenceInterval { low: 0.9, high: 1.1 },
        };
        let report = make_report(
            vec![
                make_row("pagea", 1.0, false, vec![faster]),
                make_row("pageb", 2.0, false, vec![slower]),
            ],
            RunOutcome::Resolved,
        );

        let mut buffer = Vec::new();
        reporter.print_stats(&mut buffer, &report.results).unwrap();
        reporter
            .print_comparisons(&mut buffer, &report.results)
            .unwrap();
        reporter.print_summary(&mut buffer, &report).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        assert!(output.contains("Variant"));
        assert!(output.contains("pagea"));
        assert!(output.contains("pageb"));
        assert!(output.contains("pagea vs pageb"));
        assert!(output.contains("faster"));
        assert!(output.contains("slower"));
        assert!(output.contains("1 faster"));
        assert!(output.contains("1 slower"));
        assert!(output.contains("0 unsure"));
        assert!(output.contains("resolved against [0%] in 30 round(s)"));
    }

    #[test]
    fn test_report_baseline_row() {
        let reporter = TerminalReporter::without_colors();

        let vs_baseline = Comparison {
            against: 0,
            absolute_slowdown: ConfidenceInterval { low: -0.2, high: 0.3 },
            relative_slowdown: ConfidenceInterval { low: -0.1, high: 0.15 },
        };
        let report = make_report(
            vec![
                make_row("base", 1.0, true, Vec::new()),
                make_row("cand", 1.05, false, vec![vs_baseline]),
            ],
            RunOutcome::TimedOut,
        );

        let mut buffer = Vec::new();
        reporter.print_stats(&mut buffer, &report.results).unwrap();
        reporter
            .print_comparisons(&mut buffer, &report.results)
            .unwrap();
        reporter.print_summary(&mut buffer, &report).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        assert!(output.contains("base [chrome]*"));
        assert!(output.contains("N/A"));
        assert!(output.contains("baseline"));
        assert!(output.contains("unsure"));
        assert!(output.contains("Time budget exhausted"));
    }

    #[test]
    fn test_report_single_variant_skips_comparisons() {
        let reporter = TerminalReporter::without_colors();
        let report = make_report(
            vec![make_row("only", 1.0, false, Vec::new())],
            RunOutcome::Resolved,
        );

        let mut buffer = Vec::new();
        reporter
            .print_comparisons(&mut buffer, &report.results)
            .unwrap();
        let output = String::from_utf8(buffer).unwrap();
        assert!(output.is_empty());
    }
}
