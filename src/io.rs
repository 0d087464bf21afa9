// Host process I/O interface: a thin seam over stdin/stdout so the
// evaluator can be driven by tests without a real terminal attached.

use std::io::{self, BufRead, Write};

pub struct Io {
    stdin: Box<dyn BufRead>,
    stdout: Box<dyn Write>,
}

impl Io {
    pub fn real() -> Self {
        Io {
            stdin: Box::new(io::BufReader::new(io::stdin())),
            stdout: Box::new(io::stdout()),
        }
    }

    pub fn new(stdin: Box<dyn BufRead>, stdout: Box<dyn Write>) -> Self {
        Io { stdin, stdout }
    }

    /// Reads one line from stdin, stripped of its trailing line terminator.
    /// `None` signals EOF.
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut buf = String::new();
        let n = self.stdin.read_line(&mut buf)?;
        if n == 0 {
            return Ok(None);
        }
        if buf.ends_with('\n') {
            buf.pop();
            if buf.ends_with('\r') {
                buf.pop();
            }
        }
        Ok(Some(buf))
    }

    pub fn print_line(&mut self, s: &str) -> io::Result<()> {
        writeln!(self.stdout, "{s}")
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn io_with(input: &str) -> Io {
        let stdin: Box<dyn BufRead> = Box::new(Cursor::new(input.as_bytes().to_vec()));
        let stdout: Box<dyn Write> = Box::new(Vec::new());
        Io::new(stdin, stdout)
    }

    #[test]
    fn read_line_strips_newline() {
        let mut io = io_with("hello\nworld\n");
        assert_eq!(io.read_line().unwrap(), Some("hello".to_string()));
        assert_eq!(io.read_line().unwrap(), Some("world".to_string()));
        assert_eq!(io.read_line().unwrap(), None);
    }

    #[test]
    fn read_line_strips_crlf() {
        let mut io = io_with("hello\r\n");
        assert_eq!(io.read_line().unwrap(), Some("hello".to_string()));
    }
}
