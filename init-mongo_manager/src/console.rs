use std::fmt::Display;
use std::io::{self, Stdout, Write};
use tracing::warn;

/// Line oriented report output
#[derive(Debug)]
pub struct Console<W: Write> {
    out: W,
}

impl Console<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Console<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn line(&mut self, line: impl Display) {
        if let Err(e) = writeln!(self.out, "{line}") {
            warn!(%e, "Failed to write report line");
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
