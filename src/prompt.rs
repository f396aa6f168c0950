//! Yes/no confirmation prompts.

use crate::error::{CfgError, Result};
use std::io::{self, BufRead, Write};

/// Something that can ask the operator to confirm an action.
pub trait Confirm {
    /// Ask `message`; `true` means go ahead.
    fn confirm(&mut self, message: &str) -> Result<bool>;
}

/// Prompt on a reader/writer pair, defaulting to "no".
///
/// Accepts `y`/`yes` and `n`/`no` in any case. An empty line or end of input
/// counts as "no"; anything else asks again.
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl LinePrompt<io::StdinLock<'static>, io::Stderr> {
    /// Prompt on the terminal. The question goes to stderr so stdout stays
    /// clean for command output.
    pub fn terminal() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn io_error(e: io::Error) -> CfgError {
        CfgError::UserError(format!("failed to read confirmation: {}", e))
    }
}

impl<R: BufRead, W: Write> Confirm for LinePrompt<R, W> {
    fn confirm(&mut self, message: &str) -> Result<bool> {
        loop {
            write!(self.output, "{} [y/N]: ", message).map_err(Self::io_error)?;
            self.output.flush().map_err(Self::io_error)?;

            let mut line = String::new();
            if self.input.read_line(&mut line).map_err(Self::io_error)? == 0 {
                writeln!(self.output).map_err(Self::io_error)?;
                return Ok(false);
            }

            match line.trim().to_ascii_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "" | "n" | "no" => return Ok(false),
                _ => writeln!(self.output, "Error: invalid input").map_err(Self::io_error)?,
            }
        }
    }
}
