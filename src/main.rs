use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};
use memmap2::Mmap;

use rox::scanner::Scanner;
use rox::session::{self, Session, SessionError};
use rox::token::Token;

#[derive(ClapParser, Debug)]
#[command(version, about = "Rox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Option<Commands>,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: Option<PathBuf>,

        /// Print tokens as JSON objects, one per line
        #[arg(long)]
        json: bool,
    },

    /// Parses input from a file as a program and prints its statements
    Parse { filename: Option<PathBuf> },

    /// Evaluates input from a file as bare expressions and prints the results
    Evaluate { filename: Option<PathBuf> },

    /// Runs input from a file as a Rox program
    Run { filename: Option<PathBuf> },

    /// Starts an interactive session (the default)
    Repl,
}

/// Reads a source file through a memory map and checks it is UTF‑8.
fn read_file(filename: &Path) -> Result<String> {
    info!("Reading file: {:?}", filename);
    let file = File::open(filename).context(format!("Failed to open file {:?}", filename))?;

    let len = file
        .metadata()
        .context(format!("Failed to stat file {:?}", filename))?
        .len();

    // Mapping an empty file fails on some platforms.
    if len == 0 {
        return Ok(String::new());
    }

    // SAFETY: the mapping is copied into an owned String before it is dropped
    // and is never written through.
    let map = unsafe { Mmap::map(&file) }.context(format!("Failed to map file {:?}", filename))?;

    let text = std::str::from_utf8(&map)
        .context(format!("File {:?} is not valid UTF-8", filename))?
        .to_owned();

    info!("Read {} bytes from {:?}", len, filename);

    Ok(text)
}

fn init_logger() -> Result<()> {
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    Builder::new()
        .format(|buf, record| {
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("rox::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // Default to Debug, override with RUST_LOG
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

/// Print every error in `error` and exit with its status.
fn fail(error: SessionError) -> ! {
    debug!("Exiting after error: {}", error);

    for e in error.errors() {
        eprintln!("{}", e);
    }

    std::process::exit(error.exit_code());
}

fn no_input() {
    info!("No filepath provided");
    println!("No input filepath was provided. Exiting...");
}

fn tokenize(filename: &Path, json: bool) -> Result<()> {
    let source = read_file(filename)?;
    let mut tokenized = true;

    for token in Scanner::new(source.as_bytes()) {
        match token {
            Ok(token) => {
                debug!("Scanned token: {}", token);

                if json {
                    let line = serde_json::to_string::<Token>(&token)
                        .context("Failed to serialize token")?;
                    println!("{}", line);
                } else {
                    println!("{}", token);
                }
            }

            Err(e) => {
                tokenized = false;
                eprintln!("{}", e);
            }
        }
    }

    if !tokenized {
        debug!("Tokenization failed, exiting with code 65");
        std::process::exit(65);
    }

    info!("Tokenization completed successfully");
    Ok(())
}

fn repl() -> Result<()> {
    info!("Starting interactive session");

    let mut session = Session::new();
    let stdin = io::stdin();

    loop {
        print!("> ");
        io::stdout().flush().context("Failed to flush stdout")?;

        let mut line = String::new();
        let read = stdin
            .read_line(&mut line)
            .context("Failed to read from stdin")?;

        if read == 0 {
            println!();
            break;
        }

        if line.trim().is_empty() {
            continue;
        }

        if session::is_bare_expression(&line) {
            match session.evaluate(&line) {
                Ok(values) => {
                    for value in values {
                        println!("{}", value.repr());
                    }
                }
                Err(e) => eprintln!("{}", e),
            }
        } else {
            match session.run(&line) {
                Ok(warnings) => {
                    for warning in warnings {
                        eprintln!("{}", warning);
                    }
                }
                Err(e) => eprintln!("{}", e),
            }
        }
    }

    info!("Interactive session ended");
    Ok(())
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    // Initialize logger only if --log flag is provided
    if args.log {
        init_logger()?;
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands.unwrap_or(Commands::Repl) {
        Commands::Tokenize { filename, json } => match filename {
            Some(filename) => tokenize(&filename, json)?,
            None => no_input(),
        },

        Commands::Parse { filename } => match filename {
            Some(filename) => {
                info!("Running Parse subcommand");
                let source = read_file(&filename)?;

                match Session::new().parse(&source) {
                    Ok(statements) => {
                        for stmt in statements {
                            println!("{:?}", stmt);
                        }
                    }
                    Err(e) => fail(e),
                }
            }
            None => no_input(),
        },

        Commands::Evaluate { filename } => match filename {
            Some(filename) => {
                info!("Running Evaluate subcommand");
                let source = read_file(&filename)?;

                match Session::new().evaluate(&source) {
                    Ok(values) => {
                        for value in values {
                            println!("{}", value);
                        }
                    }
                    Err(e) => fail(e),
                }
            }
            None => no_input(),
        },

        Commands::Run { filename } => match filename {
            Some(filename) => {
                info!("Running Run subcommand");
                let source = read_file(&filename)?;

                match Session::new().run(&source) {
                    Ok(warnings) => {
                        for warning in warnings {
                            eprintln!("{}", warning);
                        }
                        info!("Program executed successfully");
                    }
                    Err(e) => fail(e),
                }
            }
            None => no_input(),
        },

        Commands::Repl => repl()?,
    }

    Ok(())
}
