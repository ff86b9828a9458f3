///
/// rtbridge CLI - Call bridge functions the way a script would
///
/// Commands:
/// - rtbridge call <function> [args...]: Call a function of the bridge module
/// - rtbridge list: Show the module's functions and which callbacks are bound
///
/// `--demo-host` registers the demo callbacks from `host` first; without it
/// every host-backed function degrades to `None`.
///

mod host;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use rtbridge_runtime::{BridgeConfig, CallArgs, Runtime, Value, init_logging};

#[derive(Parser)]
#[command(name = "rtbridge")]
#[command(author, version, about = "Host callback bridge demo", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct HostOptions {
    /// Path to an rtbridge.toml config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Register the demo host callbacks before calling
    #[arg(long)]
    demo_host: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Call a function of the bridge module
    Call {
        /// Function name, e.g. obfuscate_sql
        function: String,

        /// Positional arguments; integers are passed as int, the rest as str
        args: Vec<String>,

        /// Keyword argument as name=value (repeatable)
        #[arg(long = "kwarg", value_name = "NAME=VALUE")]
        kwargs: Vec<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        host: HostOptions,
    },

    /// List the module's functions and callback bindings
    List {
        #[command(flatten)]
        host: HostOptions,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Call {
            function,
            args,
            kwargs,
            json,
            host,
        } => {
            let runtime = setup(&host);
            call_function(&runtime, &function, &args, &kwargs, json);
        }
        Commands::List { host } => {
            let runtime = setup(&host);
            list_functions(&runtime);
        }
    }
}

fn setup(options: &HostOptions) -> Runtime {
    let config = match &options.config {
        Some(path) => match BridgeConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        None => BridgeConfig::default(),
    };

    if let Err(e) = init_logging(&config.logging, &config.effective_log_filter()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    if options.demo_host {
        host::install();
    }

    match Runtime::new(&config) {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn parse_value(raw: &str) -> Value {
    match raw.parse::<i64>() {
        Ok(n) => Value::Int(n),
        Err(_) => Value::str(raw),
    }
}

fn build_args(args: &[String], kwargs: &[String]) -> Result<CallArgs, String> {
    let mut call_args = CallArgs::from_values(args.iter().map(|arg| parse_value(arg)));
    for kwarg in kwargs {
        let (name, value) = kwarg
            .split_once('=')
            .ok_or_else(|| format!("keyword argument '{}' is not NAME=VALUE", kwarg))?;
        call_args = call_args.kwarg(name, parse_value(value));
    }
    Ok(call_args)
}

fn call_function(runtime: &Runtime, function: &str, args: &[String], kwargs: &[String], json: bool) {
    let call_args = match build_args(args, kwargs) {
        Ok(call_args) => call_args,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };

    let value = match runtime.call(function, &call_args) {
        Ok(value) => value,
        Err(exception) => {
            eprintln!("{}", exception);
            std::process::exit(1);
        }
    };

    if json {
        match serde_json::to_string_pretty(&value) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        println!("{}", value);
    }
}

fn list_functions(runtime: &Runtime) {
    println!("module {}", runtime.module().name());
    for func in runtime.module().functions() {
        println!("  {:<16} {}", func.name(), func.doc());
    }

    println!("callbacks");
    for (name, bound) in runtime.registry().bindings() {
        let state = if bound { "bound" } else { "unbound" };
        println!("  {:<16} {}", name, state);
    }
}
