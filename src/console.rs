use std::io::Write;

use shelf_core::{BookView, PresentationSink};

/// Writes the display to stdout, one block per update.
#[derive(Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    fn emit(&self, text: &str) {
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{text}");
        let _ = out.flush();
    }
}

impl PresentationSink for ConsoleSink {
    fn show_loading(&self, title: &str, description: &str) {
        self.emit(&format!("\n== {title} ==\n   [cover loading]\n{description}"));
    }

    fn show_book(&self, view: &BookView) {
        self.emit(&format!("\n{}", format_book(view)));
    }

    fn show_description(&self, text: &str) {
        self.emit(text);
    }

    fn show_error(&self, message: &str) {
        self.emit(&format!("\n!! {message}"));
    }
}

fn format_book(view: &BookView) -> String {
    let cover = if view.cover_url.is_empty() {
        "(no cover)"
    } else {
        view.cover_url.as_str()
    };
    format!(
        "#{} | p.{}\n== {} ==\n   cover: {}",
        view.issue_number, view.page_number, view.title, cover
    )
}

/// A line of user input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Forward,
    Backward,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_lowercase().as_str() {
            "f" | "n" | "j" | "down" | "next" | "" => Some(Self::Forward),
            "b" | "p" | "k" | "up" | "back" | "prev" => Some(Self::Backward),
            "h" | "?" | "help" => Some(Self::Help),
            "q" | "quit" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }
}

pub const HELP: &str = "keys: [enter]/f/j/down = next random book, b/k/up = back, q = quit";
