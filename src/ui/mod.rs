//! Terminal output helpers for the CLI.
//!
//! Colored status lines, a loading spinner and width-aware text
//! truncation for table cells.

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use std::time::Duration;

use crate::views::DetailView;

/// Get the current terminal width.
pub fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(100)
}

/// Check if stdout is a terminal.
pub fn is_terminal() -> bool {
    std::io::stdout().is_terminal()
}

/// Status types for colored output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Error,
    Warning,
    Info,
    Marked,
    Search,
}

/// Status icons for different operations.
pub fn status_icon(status: Status) -> &'static str {
    match status {
        Status::Success => "✓",
        Status::Error => "✗",
        Status::Warning => "⚠",
        Status::Info => "ℹ",
        Status::Marked => "★",
        Status::Search => "🔍",
    }
}

/// Print a styled status line to stderr, keeping stdout for results.
pub fn print_status(status: Status, msg: &str) {
    let icon = status_icon(status);
    match status {
        Status::Success => eprintln!("{} {}", icon.green().bold(), msg),
        Status::Error => eprintln!("{} {}", icon.red().bold(), msg),
        Status::Warning => eprintln!("{} {}", icon.yellow().bold(), msg),
        Status::Info => eprintln!("{} {}", icon.cyan().bold(), msg),
        Status::Marked => eprintln!("{} {}", icon.yellow(), msg),
        Status::Search => eprintln!("{} {}", icon.yellow(), msg),
    }
}

/// Print a section header.
pub fn print_section(title: &str) {
    println!();
    println!("{}", format!("━━━ {} ━━━", title).bold().cyan());
}

/// Print search results header.
pub fn print_search_header(query: &str, count: usize, duration: Duration) {
    println!();
    println!(
        "{} Search results for: \"{}\"",
        status_icon(Status::Search).yellow().bold(),
        query.cyan().bold()
    );
    println!(
        "{} Found {} books in {:.2}s",
        "─".repeat(30).dimmed(),
        count.to_string().green().bold(),
        duration.as_secs_f64()
    );
    println!();
}

/// Print the detail screen of a book.
pub fn print_detail(view: &DetailView, mark_label: &str) {
    let details = view.details();
    let width = terminal_width().clamp(40, 100);

    print_section(&truncate_with_ellipsis(&details.title, width - 10));
    if !details.subtitle.is_empty() {
        println!("{}", details.subtitle.italic());
    }
    if !details.authors.is_empty() {
        println!("{}", view.authors_line().green());
    }
    if !details.publisher.is_empty() {
        println!("{}", details.publisher);
    }
    println!("{}", view.published_line().yellow());
    println!("{}", view.pages_line());

    if !details.description.is_empty() {
        println!();
        println!("{}", details.description);
    }

    println!();
    match view.preview() {
        Ok(link) => println!("Preview: {}", link.blue().underline()),
        Err(notice) => println!("{}", notice.dimmed()),
    }
    match view.buy() {
        Ok(link) => println!("Buy:     {}", link.blue().underline()),
        Err(notice) => println!("{}", notice.dimmed()),
    }
    println!("[{}]", mark_label.bold());
}

/// Truncate text to fit within the specified width using unicode-aware truncation.
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if max_width <= 3 {
        return "...".to_string();
    }

    let total_width = unicode_width::UnicodeWidthStr::width(text);
    if total_width <= max_width {
        return text.to_string();
    }

    let budget = max_width - 3;
    let mut current_width = 0;
    let mut truncated = String::new();
    for c in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(1);
        if current_width + w > budget {
            break;
        }
        current_width += w;
        truncated.push(c);
    }

    format!("{}...", truncated)
}

fn style(template: &str, ticks: &str) -> ProgressStyle {
    ProgressStyle::with_template(template)
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars(ticks)
}

/// Loading spinner shown while a search is in flight.
pub struct Spinner {
    pb: ProgressBar,
}

impl Spinner {
    /// Create a new spinner with the given message.
    pub fn new(msg: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(style("{spinner:.cyan} {msg}", "⠁⠂⠄⡀⢀⠠⠐⠈ "));
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self { pb }
    }

    /// A spinner that draws nothing, for quiet or non-interactive output.
    pub fn hidden() -> Self {
        Self {
            pb: ProgressBar::hidden(),
        }
    }

    /// Finish with success message.
    pub fn finish_with_success(&self, msg: &str) {
        self.pb.set_style(style("{spinner:.green} {msg}", "✓✓"));
        self.pb.finish_with_message(msg.to_string());
    }

    /// Finish with error message.
    pub fn finish_with_error(&self, msg: &str) {
        self.pb.set_style(style("{spinner:.red} {msg}", "✗✗"));
        self.pb.finish_with_message(msg.to_string());
    }
}
