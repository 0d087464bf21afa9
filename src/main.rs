use clap::Parser;
use prim::io::Io;
use std::{fs, io, process};

#[derive(Parser, Debug)]
#[command(name = "prim")]
#[command(author = "Dennis Walter <dennis.walter@gmail.com>")]
#[command(version = "1.0")]
#[command(about = "Prim teaching language interpreter", long_about = None)]
struct Args {
    input_file: String,
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    let src = fs::read_to_string(&args.input_file)?;
    let mut io = Io::real();
    if let Err(e) = prim::run_program(&src, &mut io) {
        eprint!("{e}");
        process::exit(1);
    }
    Ok(())
}
