//! Вывод демо. DAO и advice пишут строки в `ConsoleSink`, а не напрямую в stdout,
//! чтобы тесты могли проверить порядок.

use std::io::{self, Write};

use parking_lot::Mutex;

pub trait ConsoleSink: Send + Sync {
    fn print_line(&self, line: &str) -> io::Result<()>;
}

/// Стандартный вывод процесса
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl ConsoleSink for StdoutSink {
    fn print_line(&self, line: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{line}")?;
        out.flush()
    }
}

/// Запоминает строки в памяти
#[derive(Debug, Default)]
pub struct RecordingSink {
    lines: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Строки без ведущих/хвостовых переводов строк
    pub fn trimmed_lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .iter()
            .map(|line| line.trim_matches('\n').to_string())
            .collect()
    }

    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

impl ConsoleSink for RecordingSink {
    fn print_line(&self, line: &str) -> io::Result<()> {
        self.lines.lock().push(line.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink_keeps_order() {
        let sink = RecordingSink::new();
        sink.print_line("\nfirst").unwrap();
        sink.print_line("second").unwrap();

        assert_eq!(sink.lines(), vec!["\nfirst", "second"]);
        assert_eq!(sink.trimmed_lines(), vec!["first", "second"]);

        sink.clear();
        assert!(sink.lines().is_empty());
    }
}
