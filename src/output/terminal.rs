// Colored terminal output for the recent notes list.
//
// main.rs delegates here once the aggregation has finished.

use colored::{ColoredString, Colorize};

use crate::notes::filters;
use crate::notes::AggregationOutcome;
use crate::relay::{SourceReport, Termination};

/// Render the selected notes, oldest first, separated by a rule.
pub fn display_notes(outcome: &AggregationOutcome, now: i64) {
    print!("{}", render_notes(outcome, now, false));
}

/// Build the notes listing. With `plain` set no color codes are emitted.
pub fn render_notes(outcome: &AggregationOutcome, now: i64, plain: bool) -> String {
    if outcome.notes.is_empty() {
        if all_unreachable(&outcome.sources) {
            return "Could not load notes. Try again later.\n".to_string();
        }
        return "No notes yet.\n".to_string();
    }

    let mut out = String::new();
    for (index, note) in outcome.notes.iter().enumerate() {
        let date = super::format_date(note.created_at);
        let author = super::author_display(&note.author, &outcome.identity_by_author);
        let age = super::format_relative_time(note.created_at, now);
        let location = filters::plus_code(note)
            .map(str::to_string)
            .unwrap_or_else(|| super::short_note_id(&note.id));

        out.push_str(&format!(
            "{} {} {} {}\n",
            styled(date, plain, |s| s.dimmed()),
            styled(author, plain, |s| s.bold()),
            styled(format!("⏱ {age}"), plain, |s| s.dimmed()),
            styled(location, plain, |s| s.cyan()),
        ));
        out.push_str(&note.content);
        out.push('\n');

        if index + 1 < outcome.notes.len() {
            out.push_str(&styled("~".repeat(40), plain, |s| s.dimmed()));
            out.push('\n');
        }
    }
    out
}

/// One line per relay: how its session ended and how much it delivered.
pub fn display_source_summary(reports: &[SourceReport]) {
    println!();
    for report in reports {
        println!(
            "  {} {} ({} records)",
            colorize_termination(report.termination),
            report.address.dimmed(),
            report.records_received,
        );
    }
}

fn styled(text: String, plain: bool, apply: fn(&str) -> ColoredString) -> String {
    if plain {
        text
    } else {
        apply(&text).to_string()
    }
}

fn all_unreachable(reports: &[SourceReport]) -> bool {
    !reports.is_empty()
        && reports
            .iter()
            .all(|r| r.termination == Termination::ConnectFailed)
}

fn colorize_termination(termination: Termination) -> ColoredString {
    match termination {
        Termination::EndOfStream => "done".green(),
        Termination::ClosedByRelay => "closed".yellow(),
        Termination::TimedOut => "timeout".yellow(),
        Termination::Disconnected => "dropped".bright_red(),
        Termination::ConnectFailed => "unreachable".red(),
        Termination::SubscribeFailed => "rejected".red(),
        Termination::Aborted => "aborted".red().bold(),
    }
}
