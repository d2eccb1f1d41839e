use clap::Parser;
use lc3_sim::debugger::Debugger;
use lc3_sim::emulator;
use lc3_sim::hardware::keyboard::{KeyboardInput, ReaderKeyboard, TerminalKeyboard};
use std::error::Error;
use std::io;
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// LC-3 simulator and debugger.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Object file to load, big-endian words starting with the origin address
    image: PathBuf,
    /// Run the program without the interactive debugger
    #[arg(short, long)]
    run: bool,
    /// Maximum number of instructions to execute with `--run`, unlimited if absent
    #[arg(long, requires = "run")]
    max_steps: Option<u64>,
    /// Log filter directive, `RUST_LOG` takes precedence
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&args.log_level))?;
    let stderr_format = tracing_subscriber::fmt::layer().with_writer(io::stderr);
    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_format)
        .init();

    tracing::info!("loading {}", args.image.display());
    let mut emu = emulator::from_program(&args.image)?;

    if args.run {
        let stdout = io::stdout();
        if io::stdin().is_terminal() {
            execute(&mut emu, args.max_steps, TerminalKeyboard::new(), stdout.lock())
        } else {
            let keyboard = ReaderKeyboard::new(io::stdin().lock());
            execute(&mut emu, args.max_steps, keyboard, stdout.lock())
        }
    } else {
        println!("LC-3 simulator and debugger");
        // commands come from stdin, so programs read their input from the terminal directly
        Debugger::new(&mut emu, TerminalKeyboard::new(), io::stdout().lock())
            .run(io::stdin().lock())?;
        Ok(())
    }
}

fn execute(
    emu: &mut emulator::Emulator,
    max_steps: Option<u64>,
    mut keyboard: impl KeyboardInput,
    mut display: impl Write,
) -> Result<(), Box<dyn Error>> {
    emu.run(max_steps, &mut keyboard, &mut display)?;
    display.flush()?;
    if !emu.is_halted() {
        tracing::warn!("step limit reached before the program halted");
    }
    Ok(())
}
