use colored::{Color, ColoredString, Colorize};
use crossterm::terminal;

use crate::testing::{CaseResult, JudgeCode, Verdict};

#[macro_export]
macro_rules! print_success {
    ($fmt:literal, $($e:tt)*) => {
        use ::colored::Colorize as _;
        println!("{}", format!($fmt, $($e)*).green())
    }
}

pub fn is_truecolor_supported() -> bool {
    let Ok(v) = std::env::var("COLORTERM") else {
        return false;
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

impl ColorTheme for JudgeCode {
    fn color(&self) -> Color {
        use JudgeCode::*;
        if !self::is_truecolor_supported() {
            return match self {
                AC => Color::Green,
                WA => Color::Yellow,
                CE => Color::Blue,
                IE => Color::Magenta,
            };
        }

        match self {
            AC => Color::TrueColor {
                r: 30,
                g: 180,
                b: 40,
            },
            WA => Color::TrueColor {
                r: 210,
                g: 138,
                b: 4,
            },
            CE => Color::TrueColor {
                r: 50,
                g: 110,
                b: 220,
            },
            IE => Color::TrueColor {
                r: 171,
                g: 40,
                b: 200,
            },
        }
    }
}

pub fn judge_icon(judge: JudgeCode) -> ColoredString {
    let fg = if is_truecolor_supported() {
        Color::TrueColor {
            r: 255,
            g: 255,
            b: 255,
        }
    } else {
        Color::BrightBlack
    };
    format!(" {} ", judge)
        .on_color(judge.color())
        .bold()
        .color(fg)
}

/// One-line progress label of a testcase.
pub fn case_label(res: &CaseResult) -> String {
    let judge = res.judge();
    format!(
        "Testcase {} ... {}{}",
        res.case_index,
        self::judge_icon(judge),
        " ".repeat(3 - judge.to_string().len().min(3)),
    )
}

pub fn print_verdict_summary(verdict: &Verdict) {
    let bar = "-".repeat(5);
    print!("{} ", bar);

    let count = verdict.count_by_judge();
    let num_total = verdict.total_count();
    let num_passed = verdict.correct_count();
    let num_failed = num_total - num_passed;

    if verdict.is_passed() {
        let msg = format!("All {} tests passed ✨", num_total);
        print!("{}", msg.green());
    } else if num_total == 0 {
        print!("{}", "No testcases".bright_red());
    } else {
        let summary_msg = if num_passed > 0 {
            format!("{}/{} tests failed 💣", num_failed, num_total)
        } else {
            format!("All {} tests failed 💀", num_total)
        };

        let mut failed: Vec<_> = count
            .iter()
            .filter(|(&judge, _)| judge != JudgeCode::AC)
            .collect();
        failed.sort_by_key(|(&judge, _)| judge as u8);

        let detail_msg = failed
            .into_iter()
            .map(|(&judge, &cnt)| {
                format!(
                    "{}{}{}",
                    self::judge_icon(judge),
                    "x".dimmed(),
                    cnt.to_string().bold().bright_white(),
                )
            })
            .collect::<Vec<String>>()
            .join(", ");

        print!("{} ({})", summary_msg.bright_red(), detail_msg);
    }

    println!(
        " [{}/{} correct] {}",
        num_passed.to_string().bold(),
        num_total,
        bar
    );
}

const BUILD_FAILED_LABEL: &str = "build failed or non-zero exit";
const BOLD_LINE: &str = "━";
const THIN_LINE: &str = "─";

fn print_sub_title(s: &str, cols: usize) {
    println!(
        "{}{}",
        s.cyan().bold(),
        THIN_LINE
            .repeat(cols.saturating_sub(s.len() + 1))
            .bright_black(),
    )
}

/// Prints `s` line by line, marking trailing whitespace and a missing final newline.
fn print_lines(s: &str) {
    if s.is_empty() {
        println!("{}", "<EMPTY>".magenta().dimmed());
        return;
    }
    let lines: Vec<_> = s.lines().collect();
    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim_end();
        print!("{}", trimmed);

        let num_trailing_whitespace = line.len() - trimmed.len();
        if num_trailing_whitespace > 0 {
            print!(
                "{}{}",
                " ".repeat(num_trailing_whitespace).on_red(),
                "(Trailing whitespace)".bright_red().bold()
            );
        }

        let is_last_line = i + 1 == lines.len();
        if is_last_line && !s.ends_with('\n') {
            print!("{}", " Missing new line ".on_yellow().black().bold());
        }

        println!();
    }
}

pub fn print_case_detail(res: &CaseResult) {
    let (cols, _) = terminal::size().unwrap_or((40, 40));
    let cols = cols as usize;

    let bold_bar = BOLD_LINE.repeat(cols).blue().bold();

    let build = match &res.outcome {
        Some(o) if o.build_succeeded => "build ok".green(),
        Some(_) => BUILD_FAILED_LABEL.bright_red(),
        None => "no response".magenta(),
    };
    println!(
        "\n{}: {} [{}]\n{}",
        format!("Testcase {}", res.case_index)
            .color(Color::BrightYellow)
            .bold(),
        self::judge_icon(res.judge()),
        build,
        bold_bar,
    );

    print_sub_title("[stdin]", cols);
    print_lines(&res.input);

    print_sub_title("[expected]", cols);
    print_lines(&res.expected);

    if let Some(err) = &res.transport_error {
        print_sub_title("[error]", cols);
        println!("{}", err.bright_red());
    }

    if let Some(o) = &res.outcome {
        print_sub_title("[stdout]", cols);
        print_lines(&o.stdout);

        if !o.stderr.is_empty() {
            print_sub_title("[stderr]", cols);
            print!("{}", o.stderr);
        }
        if !o.build_error_message.is_empty() {
            print_sub_title("[build error]", cols);
            print!("{}", o.build_error_message);
        }
    }

    println!("{}", bold_bar);
}
