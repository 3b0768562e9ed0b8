//! Console write target

use super::write_target::WriteTarget;
use crate::core::Result;
use parking_lot::Mutex;
use std::io::{self, Stdout, Write};

/// Standard output (or any writer) behind a mutex
///
/// Each `write` holds the lock for the whole record, so lines from
/// concurrent threads never interleave.
///
/// # Example
///
/// ```
/// use pzlog::sinks::{ConsoleSink, WriteTarget};
///
/// let sink = ConsoleSink::with_writer(Vec::new());
/// sink.write(b"hello\n").unwrap();
/// assert_eq!(sink.into_inner(), b"hello\n");
/// ```
pub struct ConsoleSink<W: Write + Send = Stdout> {
    writer: Mutex<W>,
}

impl ConsoleSink<Stdout> {
    pub fn stdout() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl Default for ConsoleSink<Stdout> {
    fn default() -> Self {
        Self::stdout()
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> WriteTarget for ConsoleSink<W> {
    fn write(&self, buf: &[u8]) -> Result<()> {
        let mut writer = self.writer.lock();
        writer.write_all(buf)?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.writer.lock().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_writes_are_passed_through() {
        let sink = ConsoleSink::with_writer(Vec::new());
        sink.write(b"one\n").unwrap();
        sink.write(b"two\n").unwrap();
        sink.flush().unwrap();
        assert_eq!(sink.into_inner(), b"one\ntwo\n");
    }

    #[test]
    fn test_concurrent_writes_do_not_interleave() {
        let sink = Arc::new(ConsoleSink::with_writer(Vec::new()));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let sink = Arc::clone(&sink);
                thread::spawn(move || {
                    let line = format!("{}\n", t.to_string().repeat(64));
                    for _ in 0..50 {
                        sink.write(line.as_bytes()).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let sink = Arc::try_unwrap(sink).ok().expect("all clones joined");
        let output = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 400);
        for line in lines {
            assert_eq!(line.len(), 64);
            let first = line.chars().next().unwrap();
            assert!(line.chars().all(|c| c == first), "interleaved line: {}", line);
        }
    }

    #[test]
    fn test_stdout_sink_name() {
        assert_eq!(ConsoleSink::stdout().name(), "console");
    }
}
