//! Plain terminal output for one-shot turns

use colored::Colorize;
use persona_core::{LineStyle, RenderedLine};

pub fn print_lines(lines: &[RenderedLine]) {
    for line in lines {
        println!("{}", paint(line));
    }
}

fn paint(line: &RenderedLine) -> String {
    let text = line.text.as_str();
    match line.style {
        LineStyle::Role => text.cyan().bold().to_string(),
        LineStyle::Heading => text.yellow().bold().to_string(),
        LineStyle::Caption => text.dimmed().to_string(),
        LineStyle::Quote => text.italic().to_string(),
        LineStyle::Metric => text.green().to_string(),
        LineStyle::Error => text.red().to_string(),
        LineStyle::Separator => "─".repeat(40).dimmed().to_string(),
        LineStyle::Body | LineStyle::Blank => text.to_string(),
    }
}
