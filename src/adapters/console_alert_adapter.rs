//! Text alert sink writing one line per alert.

use crate::domain::alert::Alert;
use crate::domain::error::ConfluenceError;
use crate::ports::alert_port::AlertPort;
use std::io::Write;

pub struct ConsoleAlertAdapter<W: Write> {
    out: W,
}

impl<W: Write> ConsoleAlertAdapter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl ConsoleAlertAdapter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> AlertPort for ConsoleAlertAdapter<W> {
    fn send(&mut self, alert: &Alert) -> Result<(), ConfluenceError> {
        writeln!(self.out, "{}", alert)?;
        Ok(())
    }
}
