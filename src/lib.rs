pub mod ast;
pub mod env;
pub mod error;
pub mod eval;
pub mod io;
pub mod parser;
pub mod token;

use env::Environment;
use error::PrimError;
use io::Io;

/// Lexes, parses, and runs a complete program against the given I/O seam.
/// This is the single entry point both `main` and integration tests drive.
pub fn run_program(src: &str, io: &mut Io) -> Result<(), PrimError> {
    let program = parser::parse_program(src)?;
    let mut env = Environment::new();
    eval::run(&program, &mut env, io)
}
