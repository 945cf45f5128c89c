use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser as ClapParser;
use safulate::span::Source;
use safulate::{parser, InterpreterConfig, Interpreter, ModuleLoader, Version};
use tracing_subscriber::EnvFilter;

/// Run a Safulate script.
#[derive(ClapParser)]
#[command(name = "safulate", version)]
struct Cli {
	/// Script to execute.
	file: PathBuf,

	/// Host version advertised to `req` version constraints.
	#[arg(long, default_value = "v0.1.0")]
	host_version: String,

	/// Maximum call-stack depth before a stack-overflow error is raised.
	#[arg(long, default_value_t = 2048)]
	max_depth: usize,
}

fn main() -> ExitCode {
	tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

	let cli = Cli::parse();

	let text = match std::fs::read_to_string(&cli.file) {
		Ok(text) => text,
		Err(err) => {
			eprintln!("error: reading {}: {err}", cli.file.display());
			return ExitCode::FAILURE;
		}
	};

	let host_version = Version::parse(&cli.host_version).unwrap_or_default();
	let config = InterpreterConfig {
		max_depth: cli.max_depth,
		host_version,
		tracing_enabled: true,
	};

	let source = Source::new(cli.file.display().to_string(), text);
	let program = match parser::parse(&source) {
		Ok(program) => program,
		Err(err) => {
			eprintln!("{err}");
			return ExitCode::FAILURE;
		}
	};

	let loader: Box<dyn ModuleLoader> = Box::new(FsModuleLoader);
	let mut interp = Interpreter::new(loader, host_version, config);
	match interp.run(&program) {
		Ok(_) => ExitCode::SUCCESS,
		Err(err) => {
			eprintln!("{err}");
			ExitCode::FAILURE
		}
	}
}

/// Resolves `req name;` against `name.saf` next to the invoked script.
struct FsModuleLoader;

impl ModuleLoader for FsModuleLoader {
	fn load(&mut self, name_or_url: &str) -> Result<safulate::ast::Program, safulate::ModuleLoadError> {
		let path = PathBuf::from(format!("{name_or_url}.saf"));
		let text =
			std::fs::read_to_string(&path).map_err(|_| safulate::ModuleLoadError::NotFound(name_or_url.to_string()))?;
		let source = Source::new(path.display().to_string(), text);
		parser::parse(&source).map_err(|_| safulate::ModuleLoadError::InvalidModule(name_or_url.to_string()))
	}
}
