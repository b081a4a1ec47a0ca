use clap::Parser;
use serde_json::{json, Value};
use std::io;
use std::path::Path;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use turing::{
    encode_table, Config, Definition, ProgramLoader, ProgramManager, Reporter, Simulator,
    TuringMachineError,
};

#[derive(Parser)]
#[clap(author, version, about, long_about = None, arg_required_else_help = true)]
struct Cli {
    /// The machine description to run (a `.tm` file, or a bundled program with --builtin)
    #[clap(required_unless_present = "list")]
    program: Option<String>,

    /// The input written on tape 0
    #[clap(default_value = "")]
    input: String,

    /// Print every step of the execution
    #[clap(short, long)]
    verbose: bool,

    /// Give up after this many transitions
    #[clap(long, value_name = "N")]
    max_steps: Option<usize>,

    /// Print the verdict as JSON
    #[clap(long, conflicts_with = "verbose")]
    json: bool,

    /// Print the expanded transition table and exit
    #[clap(long)]
    table: bool,

    /// Treat the program argument as the name of a bundled program
    #[clap(long)]
    builtin: bool,

    /// List the bundled programs and exit
    #[clap(long)]
    list: bool,
}

type Outcome = Result<String, TuringMachineError>;

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    if cli.list {
        list_programs();
        return ExitCode::SUCCESS;
    }

    let Some(program) = cli.program.as_deref() else {
        return ExitCode::FAILURE;
    };

    let definition = match load(program, cli.builtin) {
        Ok(definition) => definition,
        Err(e) => return report(&cli, Err(e)),
    };

    if cli.table {
        print!("{}", encode_table(&definition));
        return ExitCode::SUCCESS;
    }

    let config = Config {
        step_limit: cli.max_steps,
    };

    let outcome = if cli.verbose {
        match run_verbose(definition, &cli.input, config) {
            Ok(outcome) => outcome,
            Err(e) => {
                eprintln!("Error: failed to write trace: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        Simulator::of(definition, &cli.input)
            .and_then(|simulator| simulator.with_config(config).run())
    };

    report(&cli, outcome)
}

/// Installs a stderr subscriber filtered by `RUST_LOG`, defaulting to `warn`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr).compact())
        .init();
}

fn load(program: &str, builtin: bool) -> Result<Definition, TuringMachineError> {
    debug!(program, builtin, "loading machine");

    if builtin {
        ProgramManager::get_program_by_name(program)
    } else {
        ProgramLoader::load_program(Path::new(program))
    }
}

/// Runs with the step-by-step trace on stdout.
fn run_verbose(definition: Definition, input: &str, config: Config) -> io::Result<Outcome> {
    let mut reporter = Reporter::new(io::stdout().lock());

    let outcome = match Simulator::of(definition, input) {
        Ok(simulator) => {
            reporter.start(input);
            simulator.with_config(config).run_with(&mut reporter)
        }
        Err(e) => {
            if let TuringMachineError::IllegalInput { symbol, position } = &e {
                reporter.illegal_input(input, *symbol, *position);
            }
            Err(e)
        }
    };

    drop(reporter.finish()?);
    Ok(outcome)
}

/// Prints the outcome and maps it to the exit code: 0 on acceptance, 1 otherwise.
fn report(cli: &Cli, outcome: Outcome) -> ExitCode {
    let code = if outcome.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    };

    if cli.json {
        println!("{}", verdict(&outcome));
        return code;
    }

    match outcome {
        Ok(result) => {
            // The verbose trace already ends with the result.
            if !cli.verbose {
                println!("{result}");
            }
        }
        Err(e) => {
            match &e {
                TuringMachineError::NotAccepted { result, .. } if !cli.verbose => {
                    println!("{result}")
                }
                // Already rendered with a caret by the reporter.
                TuringMachineError::IllegalInput { .. } if cli.verbose => return code,
                _ => {}
            }
            eprintln!("Error: {e}");
        }
    }

    code
}

fn verdict(outcome: &Outcome) -> Value {
    match outcome {
        Ok(result) => json!({
            "accepted": true,
            "result": result,
        }),
        Err(TuringMachineError::NotAccepted { state, result, .. }) => json!({
            "accepted": false,
            "state": state,
            "result": result,
        }),
        Err(e) => json!({
            "accepted": false,
            "kind": format!("{:?}", e.kind()),
            "error": e.to_string(),
        }),
    }
}

fn list_programs() {
    for index in 0..ProgramManager::get_program_count() {
        if let Ok(info) = ProgramManager::get_program_info(index) {
            println!(
                "{:<18} tapes: {}  states: {:<3} transitions: {} ({} expanded)",
                info.name,
                info.tape_count,
                info.state_count,
                info.transition_count,
                info.expanded_count
            );
        }
    }
}
