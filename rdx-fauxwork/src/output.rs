//! Output sinks: where module text ends up.
//!
//! The engine treats a sink as an opaque capability. [`sink_for_stdout`]
//! probes whether stdout is interactive and picks the styled or the plain
//! variant once, so nothing downstream ever has to ask.

use colored::Colorize;
use std::io::{IsTerminal, Write};
use std::sync::{Arc, Mutex};
use tracing::debug;

pub use colored::Color;

/// Width reported when the real terminal size cannot be determined.
pub const DEFAULT_WIDTH: u16 = 80;

/// A destination for module output.
///
/// Implementations must tolerate being called many times per second and
/// must never fail on a missing color capability; the color hint passed to
/// [`write_styled`](OutputSink::write_styled) is advisory.
pub trait OutputSink: Send + Sync {
    /// Writes `text` verbatim, without a trailing newline.
    fn write(&self, text: &str);

    /// Writes `text` followed by a newline.
    fn write_line(&self, text: &str);

    /// Writes `text`, styled with `color` if the sink supports it.
    fn write_styled(&self, text: &str, color: Option<Color>);

    /// Column count modules may use for layout.
    fn terminal_width(&self) -> u16;
}

/// Returns a [`TerminalSink`] when stdout is a terminal, otherwise a [`PlainSink`].
pub fn sink_for_stdout() -> Arc<dyn OutputSink> {
    if std::io::stdout().is_terminal() {
        Arc::new(TerminalSink)
    } else {
        Arc::new(PlainSink::default())
    }
}

fn emit(text: &str) {
    let mut out = std::io::stdout().lock();
    if let Err(e) = out.write_all(text.as_bytes()).and_then(|_| out.flush()) {
        debug!("Dropped output: {}", e);
    }
}

/// Interactive stdout sink with ANSI colors.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalSink;

impl OutputSink for TerminalSink {
    fn write(&self, text: &str) {
        emit(text);
    }

    fn write_line(&self, text: &str) {
        emit(&format!("{text}\n"));
    }

    fn write_styled(&self, text: &str, color: Option<Color>) {
        match color {
            Some(color) => emit(&text.color(color).to_string()),
            None => emit(text),
        }
    }

    fn terminal_width(&self) -> u16 {
        crossterm::terminal::size()
            .map(|(cols, _)| cols)
            .unwrap_or(DEFAULT_WIDTH)
    }
}

/// Stdout sink for redirected output: color hints are ignored.
#[derive(Debug, Clone, Copy)]
pub struct PlainSink {
    width: u16,
}

impl PlainSink {
    pub fn with_width(width: u16) -> Self {
        Self { width }
    }
}

impl Default for PlainSink {
    fn default() -> Self {
        Self::with_width(DEFAULT_WIDTH)
    }
}

impl OutputSink for PlainSink {
    fn write(&self, text: &str) {
        emit(text);
    }

    fn write_line(&self, text: &str) {
        emit(&format!("{text}\n"));
    }

    fn write_styled(&self, text: &str, _color: Option<Color>) {
        emit(text);
    }

    fn terminal_width(&self) -> u16 {
        self.width
    }
}

/// In-memory sink that records everything written to it.
///
/// Clones share the same buffer, so a test can keep one handle and give the
/// other to a scheduler.
#[derive(Debug, Clone)]
pub struct MemorySink {
    buffer: Arc<Mutex<String>>,
    width: u16,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::with_width(DEFAULT_WIDTH)
    }

    pub fn with_width(width: u16) -> Self {
        Self {
            buffer: Arc::new(Mutex::new(String::new())),
            width,
        }
    }

    /// Everything written so far.
    pub fn contents(&self) -> String {
        self.buffer.lock().map(|b| b.clone()).unwrap_or_default()
    }

    /// Completed lines written so far.
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.lock().map(|b| b.is_empty()).unwrap_or(true)
    }

    fn push(&self, text: &str) {
        if let Ok(mut buffer) = self.buffer.lock() {
            buffer.push_str(text);
        }
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputSink for MemorySink {
    fn write(&self, text: &str) {
        self.push(text);
    }

    fn write_line(&self, text: &str) {
        self.push(text);
        self.push("\n");
    }

    fn write_styled(&self, text: &str, _color: Option<Color>) {
        self.push(text);
    }

    fn terminal_width(&self) -> u16 {
        self.width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_records_in_order() {
        let sink = MemorySink::new();
        sink.write("[ok] ");
        sink.write_line("first");
        sink.write_styled("second", Some(Color::Green));
        sink.write_line("");
        assert_eq!(sink.contents(), "[ok] first\nsecond\n");
        assert_eq!(sink.lines(), vec!["[ok] first", "second"]);
    }

    #[test]
    fn test_memory_sink_clones_share_buffer() {
        let sink = MemorySink::with_width(120);
        let handle: Arc<dyn OutputSink> = Arc::new(sink.clone());
        handle.write_line("shared");
        assert_eq!(sink.lines(), vec!["shared"]);
        assert_eq!(handle.terminal_width(), 120);
    }

    #[test]
    fn test_plain_sink_width() {
        assert_eq!(PlainSink::default().terminal_width(), DEFAULT_WIDTH);
        assert_eq!(PlainSink::with_width(42).terminal_width(), 42);
    }
}
