//! # CLI
//!
//! This module defines the command-line interface of `protree` using `clap`.
//!
//! It is responsible for parsing user input and validating it early (e.g., ensuring `--body` is valid JSON).
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use protree_core::tree::{self, TreeValue};

#[derive(Parser)]
#[command(name = "protree", version, about = "Convert JSON to Protobuf messages and back")]
pub struct Cli {
    /// Directory holding compiled descriptor sets (defaults to $PB_FILES_ROOT)
    #[arg(long, global = true)]
    pub descriptor_dir: Option<PathBuf>,

    /// Message or package to register, can be repeated (defaults to $PB_IMPORTING)
    #[arg(short, long = "register", global = true)]
    pub registrations: Vec<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List every registered message type
    List,

    /// Encode a JSON document into a message file
    ///
    /// Prints the path of the written file. Without `--output` a temporary file is created.
    ///
    /// ## Examples:
    ///
    /// ```bash
    /// protree --descriptor-dir ./descriptors encode shop.v1.Order --body '{"id": "A-1"}'
    /// ```
    Encode {
        /// Message type, by full or short name (e.g. shop.v1.Order)
        type_name: String,

        /// JSON body of the message
        #[arg(long, value_parser = parse_body, required_unless_present = "input", conflicts_with = "input")]
        body: Option<TreeValue>,

        /// Path to a JSON file holding the message
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Reject keys that are not fields of the message
        #[arg(long)]
        strict: bool,

        #[arg(short, long, value_enum, default_value_t = Format::Binary)]
        format: Format,

        /// Where to write the message
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Decode a message file into JSON
    Decode {
        /// Message type, by full or short name (e.g. shop.v1.Order)
        type_name: String,

        /// Path to the message file
        file: PathBuf,

        #[arg(short, long, value_enum, default_value_t = Format::Binary)]
        format: Format,

        /// Render enum values by name instead of by number
        #[arg(long)]
        enum_labels: bool,

        /// Write the JSON to this file instead of standard output
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// On-disk representation of a message.
#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Raw wire bytes
    Binary,
    /// Protobuf text format
    Text,
}

fn parse_body(value: &str) -> Result<TreeValue, String> {
    tree::from_json_str(value).map_err(|e| format!("Invalid JSON: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_encode_with_body() {
        let cli = Cli::try_parse_from([
            "protree",
            "encode",
            "shop.v1.Order",
            "--body",
            r#"{"id": "A-1"}"#,
            "--format",
            "text",
            "-r",
            "shop.v1",
        ])
        .unwrap();

        assert_eq!(cli.registrations, vec!["shop.v1"]);
        match cli.command {
            Commands::Encode {
                type_name,
                body,
                format,
                strict,
                ..
            } => {
                assert_eq!(type_name, "shop.v1.Order");
                assert_eq!(body.unwrap().get("id").and_then(TreeValue::as_str), Some("A-1"));
                assert!(format == Format::Text);
                assert!(!strict);
            }
            _ => panic!("expected the encode command"),
        }
    }

    #[test]
    fn test_encode_requires_a_single_input() {
        assert!(Cli::try_parse_from(["protree", "encode", "Order"]).is_err());
        assert!(
            Cli::try_parse_from([
                "protree", "encode", "Order", "--body", "{}", "--input", "order.json"
            ])
            .is_err()
        );
    }

    #[test]
    fn test_invalid_body() {
        assert!(Cli::try_parse_from(["protree", "encode", "Order", "--body", "{nope"]).is_err());
    }
}
