//! # Protree CLI Entry Point
//!
//! The main executable for the Protree tool. This file drives the application lifecycle:
//!
//! 1. **Initialization**: Parses command-line arguments using [`cli::Cli`] and installs the log subscriber.
//! 2. **Bootstrap**: Loads the schema registry from the descriptor directory via `protree_core`.
//! 3. **Execution**: Delegates the conversion to the [`Converter`].
//! 4. **Presentation**: Prints the resulting data, or a formatted error on standard error.

mod cli;
mod formatter;

use clap::Parser;
use cli::{Cli, Commands, Format};
use formatter::{FormattedString, GenericError, TypeList};
use protree_core::converter::Converter;
use protree_core::registry::{RegistryConfig, SchemaRegistry};
use protree_core::tree::{self, TreeValue};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();
    let converter = load_converter_or_exit(args.descriptor_dir, args.registrations);

    match args.command {
        Commands::List => list_types(&converter),
        Commands::Encode {
            type_name,
            body,
            input,
            strict,
            format,
            output,
        } => {
            let body = match (body, input) {
                (Some(body), _) => body,
                (None, Some(input)) => read_json_or_exit(&input),
                (None, None) => exit_with(GenericError("Missing input", "pass --body or --input")),
            };
            run_encode(&converter, &type_name, &body, strict, format, output.as_deref());
        }
        Commands::Decode {
            type_name,
            file,
            format,
            enum_labels,
            output,
        } => run_decode(&converter, &type_name, &file, format, enum_labels, output.as_deref()),
    }
}

fn exit_with(err: impl Into<FormattedString>) -> ! {
    eprintln!("{}", err.into());
    process::exit(1);
}

fn load_converter_or_exit(descriptor_dir: Option<PathBuf>, registrations: Vec<String>) -> Converter {
    let config = match descriptor_dir {
        Some(dir) => RegistryConfig::new(dir).with_registrations(registrations),
        None => match RegistryConfig::from_env() {
            Some(config) if registrations.is_empty() => config,
            Some(config) => config.with_registrations(registrations),
            None => exit_with(GenericError(
                "No descriptor directory",
                "pass --descriptor-dir or set PB_FILES_ROOT",
            )),
        },
    };

    match SchemaRegistry::from_config(&config) {
        Ok(registry) => {
            tracing::debug!(dir = %config.descriptor_dir.display(), "Schema registry loaded");
            Converter::new(registry)
        }
        Err(err) => exit_with(err),
    }
}

fn read_json_or_exit(path: &Path) -> TreeValue {
    Converter::read_json_file(path)
        .unwrap_or_else(|| exit_with(GenericError("Failed to read JSON file", path.display())))
}

fn list_types(converter: &Converter) {
    let names = converter.registry().type_names();
    println!("{}", FormattedString::from(TypeList(names)));
}

fn run_encode(
    converter: &Converter,
    type_name: &str,
    body: &TreeValue,
    strict: bool,
    format: Format,
    output: Option<&Path>,
) {
    let message = match converter.encode(type_name, body, strict) {
        Ok(message) => message,
        Err(err) => exit_with(err),
    };

    let written = match format {
        Format::Binary => converter.write_binary_file(&message, output),
        Format::Text => converter.write_text_file(&message, output),
    };

    match written {
        Some(path) => println!("{}", FormattedString::from(path)),
        None => exit_with(GenericError(
            "Failed to write message file",
            "see the log output above",
        )),
    }
}

fn run_decode(
    converter: &Converter,
    type_name: &str,
    file: &Path,
    format: Format,
    enum_labels: bool,
    output: Option<&Path>,
) {
    let decoded = match format {
        Format::Binary => converter.binary_file_to_tree(type_name, file, enum_labels),
        Format::Text => converter.text_file_to_tree(type_name, file, enum_labels),
    };

    let value = match decoded {
        Ok(Some(value)) => value,
        Ok(None) => exit_with(GenericError("Failed to read message file", file.display())),
        Err(err) => exit_with(err),
    };

    match output {
        Some(path) => {
            if !Converter::write_json_file(path, &value, false) {
                exit_with(GenericError("Failed to write JSON file", path.display()));
            }
            println!("{}", FormattedString::from(path.to_path_buf()));
        }
        None => match tree::to_json_string(&value) {
            Ok(json) => println!("{json}"),
            Err(err) => exit_with(GenericError("Failed to render JSON", err)),
        },
    }
}
