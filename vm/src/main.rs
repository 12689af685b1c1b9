use clap::{Parser as ClapParser, Subcommand};
use std::{
    fmt::Display,
    fs::File,
    io::{self, BufWriter},
    path::{Path, PathBuf},
    process,
};

use image::{DEFAULT_WIDTH, MemoryImage, read_image, write_image};
use vm::{
    Cell, Debugger, Devices, Machine, MachineConfig, MemoryPolicy, NoDebugger,
    OutputMode, PromptDebugger, RuntimeError, StdinSource,
};

#[derive(ClapParser, Debug)]
#[command(author, version, about = "SUBLEQ assembler and emulator", long_about = None)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assemble a program into a memory image
    Assemble {
        #[arg(help = "Assembly source file")]
        program: PathBuf,

        #[arg(short, long, default_value = "a.out", help = "Image file to write")]
        output: PathBuf,

        #[arg(short, long, default_value_t = DEFAULT_WIDTH, help = "Bytes per cell")]
        size: usize,

        /// Print the generated cells next to their statements
        #[arg(long)]
        listing: bool,
    },
    /// Execute a memory image
    Run {
        #[arg(help = "Image file to execute")]
        image: PathBuf,

        #[arg(short, long, help = "Append a 0 after every line of input")]
        null_terminate_input: bool,

        #[arg(short, long, help = "Print output as characters")]
        ascii: bool,

        #[arg(short, long, help = "Step through the program interactively")]
        debugger: bool,

        #[arg(short, long, default_value_t = DEFAULT_WIDTH, help = "Bytes per cell")]
        size: usize,

        /// Fail on access past the end of memory instead of growing it
        #[arg(long)]
        strict_memory: bool,

        /// Stop after this many steps
        #[arg(long)]
        max_steps: Option<u64>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Assemble {
            program,
            output,
            size,
            listing,
        } => assemble(&program, &output, size, listing),
        Command::Run {
            image,
            null_terminate_input,
            ascii,
            debugger,
            size,
            strict_memory,
            max_steps,
        } => {
            let config = MachineConfig {
                null_terminate_input,
                output: if ascii {
                    OutputMode::Ascii
                } else {
                    OutputMode::Integer
                },
                memory: if strict_memory {
                    MemoryPolicy::Fault
                } else {
                    MemoryPolicy::Grow
                },
                input_prompt: Some("\n> ".to_string()),
                max_steps,
                ..MachineConfig::default()
            };
            let image = load(&image, size);
            let status = if debugger {
                execute(image, config, PromptDebugger::new(StdinSource, io::stdout()))
            } else {
                execute(image, config, NoDebugger)
            };
            process::exit(exit_code(status));
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn fail(context: impl Display, err: impl Display) -> ! {
    eprintln!("{context}: {err}");
    process::exit(1);
}

fn assemble(program: &Path, output: &Path, size: usize, listing: bool) {
    let assembly = match assembler::assemble_file(program) {
        Ok(assembly) => assembly,
        Err(err) => fail("Error assembling", err),
    };

    if listing {
        print!("{}", assembly.listing);
        for (text, constant) in assembly.constants.iter() {
            println!("  {:04x}  {text} = {}", constant.address, constant.value);
        }
    }

    let file = match File::create(output) {
        Ok(file) => file,
        Err(err) => fail(format_args!("Error creating '{}'", output.display()), err),
    };
    if let Err(err) = write_image(&mut BufWriter::new(file), &assembly.image, size) {
        fail(format_args!("Error writing '{}'", output.display()), err);
    }
    log::info!(
        "{} -> {} ({} cells)",
        program.display(),
        output.display(),
        assembly.image.len()
    );
}

fn load(path: &Path, size: usize) -> MemoryImage {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(err) => fail(format_args!("Error opening '{}'", path.display()), err),
    };
    match read_image(&mut file, size) {
        Ok(image) => image,
        Err(err) => fail(format_args!("Error reading '{}'", path.display()), err),
    }
}

fn execute<D: Debugger>(image: MemoryImage, config: MachineConfig, debugger: D) -> Cell {
    let devices = Devices::new(StdinSource, io::stdout()).with_debugger(debugger);
    let mut machine = Machine::new(image, config, devices);
    match machine.run() {
        Ok(status) => status,
        Err(err @ RuntimeError::StepLimit { .. }) => fail("Stopped", err),
        Err(err) => fail("Runtime error", err),
    }
}

fn exit_code(status: Cell) -> i32 {
    i32::try_from(status).unwrap_or_else(|_| {
        log::warn!("halt status {status} does not fit an exit code");
        i32::MAX
    })
}
