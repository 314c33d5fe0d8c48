//! Colored report output.

use std::io::{self, Write};

use colored::Colorize;
use pkglog_core::OutputLine;

/// Writes report lines, colored by action when enabled.
#[derive(Debug)]
pub struct Printer<W> {
    out: W,
    color: bool,
}

impl<W: Write> Printer<W> {
    pub const fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    pub fn print(&mut self, lines: &[OutputLine]) -> io::Result<()> {
        for line in lines {
            match line.action() {
                Some(action) if self.color => {
                    writeln!(self.out, "{}", line.to_string().color(action.color()))?;
                }
                _ => writeln!(self.out, "{line}")?,
            }
        }
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// Whether an error is stdout closing under us, e.g. when piped into `head`.
pub fn is_broken_pipe(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<io::Error>()
            .is_some_and(|e| e.kind() == io::ErrorKind::BrokenPipe)
    })
}
