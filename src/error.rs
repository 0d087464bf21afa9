// Fail-fast error sink shared by the lexer, parser, and evaluator.
//
// Every error in Prim is fatal: there is no recovery and no continue-on-
// error mode. `PrimError` carries just enough to render the
// `\nLine <lineno>: <message>\n` format; `main` is the only place that
// turns one into a process exit.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct PrimError {
    pub lineno: Option<u32>,
    pub message: String,
}

impl PrimError {
    pub fn with_line(lineno: u32, message: String) -> Self {
        PrimError {
            lineno: Some(lineno),
            message,
        }
    }

    pub fn no_line(message: impl Into<String>) -> Self {
        PrimError {
            lineno: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for PrimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.lineno {
            Some(n) => write!(f, "\nLine {n}: {}\n", self.message),
            None => write!(f, "\nLine : {}\n", self.message),
        }
    }
}

impl std::error::Error for PrimError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_with_line() {
        let e = PrimError::with_line(3, "boom".to_string());
        assert_eq!(e.to_string(), "\nLine 3: boom\n");
    }

    #[test]
    fn display_without_line() {
        let e = PrimError::no_line("boom");
        assert_eq!(e.to_string(), "\nLine : boom\n");
    }
}
