use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::debug;

use gridfill::{render, Grid, Solver, Wordlist};

/// Fill a crossword structure with words from a word list.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Structure file: `_` marks an open cell, anything else is blocked.
    structure: PathBuf,
    /// Word list file, one word per line.
    words: PathBuf,
    /// Also write the rendered grid to this file.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let grid = Grid::from_file(&args.structure)?;
    let words = Wordlist::from_file(&args.words)?;

    let mut solver = Solver::new(&grid, &words);
    match solver.solve() {
        None => println!("No solution."),
        Some(solution) => {
            let rendered = render(&grid, &solution);
            print!("{rendered}");
            if let Some(path) = &args.output {
                fs::write(path, &rendered)?;
            }
        }
    }
    debug!("{:?}", solver.stats());

    Ok(())
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(err) = run(&args) {
        eprintln!("error: {err}");
        process::exit(1);
    }
}
