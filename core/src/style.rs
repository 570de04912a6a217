use colored::{Color, ColoredString, Colorize};
use crossterm::terminal;
use runprobe_webclient::{LangVersion, Outcome, StagingAnomaly};

use crate::testing::{verify::join_fields, Tally, TestReport, TestResult, Verdict};

/// Longest text shown per outcome field before it is cut.
pub const DISPLAY_MAX_CHARS: usize = 10000;
const ETC: &str = "... [etc]";

pub fn is_truecolor_supported() -> bool {
    let Ok(v) = std::env::var("COLORTERM") else {
        return false
    };
    matches!(v.as_str(), "truecolor" | "24bit")
}

pub trait ColorTheme {
    fn color(&self) -> Color;
}

impl ColorTheme for log::Level {
    fn color(&self) -> Color {
        use log::Level::*;
        match self {
            Error => Color::BrightRed,
            Warn => Color::BrightYellow,
            Info => Color::Cyan,
            Debug => Color::Magenta,
            Trace => Color::Blue,
        }
    }
}

impl ColorTheme for Verdict {
    fn color(&self) -> Color {
        use Verdict::*;
        if !self::is_truecolor_supported() {
            return match self {
                Good => Color::Green,
                Fail => Color::Red,
                Exception => Color::Magenta,
            };
        }

        match self {
            Good => Color::TrueColor {
                r: 30,
                g: 180,
                b: 40,
            },
            Fail => Color::TrueColor {
                r: 220,
                g: 42,
                b: 42,
            },
            Exception => Color::TrueColor {
                r: 171,
                g: 40,
                b: 200,
            },
        }
    }
}

pub fn verdict_icon(verdict: Verdict) -> ColoredString {
    let fg = if is_truecolor_supported() {
        Color::TrueColor {
            r: 255,
            g: 255,
            b: 255,
        }
    } else {
        Color::BrightBlack
    };
    format!(" {} ", verdict)
        .on_color(verdict.color())
        .bold()
        .color(fg)
}

/// Cut `s` to [`DISPLAY_MAX_CHARS`] characters, marking the cut with `"... [etc]"`.
pub fn trim_for_display(s: &str) -> String {
    match s.char_indices().nth(DISPLAY_MAX_CHARS) {
        None => s.to_owned(),
        Some((at, _)) => format!("{}{}", &s[..at], ETC),
    }
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|s| !s.is_empty())
}

/// Human-readable outcome: the label, then compiler output if there is any,
/// otherwise program output and error output.
pub fn display_outcome(outcome: &Outcome) -> String {
    let Some(code) = outcome.outcome else {
        return format!("Bad result object: {:?}", outcome);
    };

    let mut s = format!("{}\n", code.label());
    if let Some(cmpinfo) = non_empty(&outcome.cmpinfo) {
        s += &format!("\nCompiler output:\n{}\n", cmpinfo);
        return s;
    }
    match non_empty(&outcome.stdout) {
        Some(stdout) => s += &format!("\nOutput:\n{}\n", self::trim_for_display(stdout)),
        None => s += "\nNo output\n",
    }
    if let Some(stderr) = non_empty(&outcome.stderr) {
        s += &format!("\nError output:\n{}\n", self::trim_for_display(stderr));
    }
    s
}

pub fn print_languages(langs: &[LangVersion]) {
    println!("Supported languages:");
    for lang in langs {
        println!("    {}: {}", lang.id, lang.version);
    }
}

pub fn print_anomalies(anomalies: &[StagingAnomaly]) {
    for a in anomalies {
        println!("{} {}", "!".bright_yellow().bold(), a);
    }
}

/// `"<comment> OK"` for a pass, a framed block with the details otherwise.
///
/// With `verbose`, passing tests show their outcome too.
pub fn print_report(report: &TestReport, verbose: bool) {
    self::print_anomalies(&report.anomalies);

    if let TestResult::Good(outcome) = &report.result {
        if verbose {
            println!("{}\n{}", report.comment.bold(), self::display_outcome(outcome));
        } else {
            println!("{} {}", report.comment, "OK".green());
        }
        return;
    }

    let (cols, _) = terminal::size().unwrap_or((40, 40));
    let bold_bar = "━".repeat(cols as usize).blue().bold();

    println!(
        "\n{}: {} [{}]\n{}",
        report.comment.bright_yellow().bold(),
        self::verdict_icon(report.verdict()),
        report.language_id,
        bold_bar,
    );
    match &report.result {
        TestResult::Good(_) => (),
        TestResult::Fail {
            outcome,
            verification,
        } => {
            if !verification.missing.is_empty() {
                println!(
                    "{} {}",
                    "Missing fields:".cyan().bold(),
                    join_fields(&verification.missing)
                );
            }
            if !verification.mismatched.is_empty() {
                println!(
                    "{} {}",
                    "Not matching:".cyan().bold(),
                    join_fields(&verification.mismatched)
                );
            }
            print!("{}", self::display_outcome(outcome));
        }
        TestResult::Exception(e) => {
            println!("{} {:#}", "Exception:".cyan().bold(), e);
        }
    }
    println!("{}", bold_bar);
}

pub fn print_summary(tally: &Tally) {
    let bar = "-".repeat(5);
    let msg = format!(
        "{} tests, {} passed, {} failed, {} exceptions",
        tally.total(),
        tally.good,
        tally.fail,
        tally.exception
    );
    if tally.all_good() {
        println!("{} {} {}", bar, msg.green(), bar);
    } else {
        println!("{} {} {}", bar, msg.bright_red(), bar);
    }
}

#[cfg(test)]
mod test {
    use runprobe_webclient::OutcomeCode;

    use super::*;

    #[test]
    fn short_text_is_kept() {
        assert_eq!(trim_for_display("Hello 1\n"), "Hello 1\n");
        let exact = "x".repeat(DISPLAY_MAX_CHARS);
        assert_eq!(trim_for_display(&exact), exact);
    }

    #[test]
    fn long_text_is_cut() {
        let long = "y".repeat(DISPLAY_MAX_CHARS + 1);
        let shown = trim_for_display(&long);
        assert!(shown.ends_with("... [etc]"));
        assert_eq!(shown.chars().count(), DISPLAY_MAX_CHARS + ETC.len());
    }

    #[test]
    fn cut_respects_char_boundaries() {
        let long = "é".repeat(DISPLAY_MAX_CHARS + 5);
        let shown = trim_for_display(&long);
        assert_eq!(shown.chars().filter(|&c| c == 'é').count(), DISPLAY_MAX_CHARS);
    }

    #[test]
    fn compiler_output_hides_program_output() {
        let outcome = Outcome {
            outcome: Some(OutcomeCode::CompileError),
            cmpinfo: Some("error: expected ';'".to_owned()),
            stdout: Some("ignored".to_owned()),
            stderr: None,
            ..Default::default()
        };
        assert_eq!(
            display_outcome(&outcome),
            "Compile error\n\nCompiler output:\nerror: expected ';'\n"
        );
    }

    #[test]
    fn program_output_and_errors_are_shown() {
        let outcome = Outcome {
            outcome: Some(OutcomeCode::RuntimeError),
            cmpinfo: Some(String::new()),
            stdout: Some(String::new()),
            stderr: Some("Segmentation fault".to_owned()),
            ..Default::default()
        };
        assert_eq!(
            display_outcome(&outcome),
            "Runtime error\n\nNo output\n\nError output:\nSegmentation fault\n"
        );
        assert!(display_outcome(&Outcome::default()).starts_with("Bad result object"));
    }
}
