//! Output handling for the `puts` builtin.
//!
//! Library code never writes to stdout directly; `puts` and the REPL go
//! through a [`PrintWriter`], so embedders and tests can capture or discard
//! interpreter output.

/// Sink for lines produced by `puts`.
pub trait PrintWriter {
    /// Writes one argument's rendering, followed by a newline.
    fn write_line(&mut self, line: &str);
}

/// Default writer: lines go to stdout.
#[derive(Debug, Default)]
pub struct StdPrint;

impl PrintWriter for StdPrint {
    fn write_line(&mut self, line: &str) {
        println!("{line}");
    }
}

/// Writer that discards all output.
#[derive(Debug, Default)]
pub struct NoPrint;

impl PrintWriter for NoPrint {
    fn write_line(&mut self, _line: &str) {}
}

/// Writer that collects output into a string, for tests and embedders.
#[derive(Debug, Default)]
pub struct CollectStringPrint {
    buffer: String,
}

impl CollectStringPrint {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, newlines included.
    #[must_use]
    pub fn output(&self) -> &str {
        &self.buffer
    }
}

impl PrintWriter for CollectStringPrint {
    fn write_line(&mut self, line: &str) {
        self.buffer.push_str(line);
        self.buffer.push('\n');
    }
}
