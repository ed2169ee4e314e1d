use colored::*;
use protree_core::{
    convert::ConvertError,
    converter,
    registry::RegistryError,
};
use std::fmt::Display;
use std::path::PathBuf;

/// A wrapper struct for a formatted, colored string.
///
/// Implements `Display` so it can be printed directly.
pub struct FormattedString(pub String);

pub struct TypeList<'a>(pub Vec<&'a str>);

pub struct GenericError<T: Display>(pub &'static str, pub T);

impl std::fmt::Display for FormattedString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f)?;
        writeln!(f, "{}", self.0)?;
        Ok(())
    }
}

impl From<PathBuf> for FormattedString {
    fn from(path: PathBuf) -> Self {
        FormattedString(format!("{} {}", "Written:".green().bold(), path.display()))
    }
}

impl From<RegistryError> for FormattedString {
    fn from(err: RegistryError) -> Self {
        FormattedString(format!(
            "{}\n\n'{}'",
            "Failed to load schemas:".red().bold(),
            err
        ))
    }
}

impl From<converter::Error> for FormattedString {
    fn from(err: converter::Error) -> Self {
        FormattedString(format!("{}\n\n'{}'", "Conversion Failed:".red().bold(), err))
    }
}

impl From<ConvertError> for FormattedString {
    fn from(err: ConvertError) -> Self {
        FormattedString::from(converter::Error::from(err))
    }
}

impl<T: Display> From<GenericError<T>> for FormattedString {
    fn from(GenericError(msg, err): GenericError<T>) -> Self {
        FormattedString(format!("{}:\n\n'{}'", msg.red().bold(), err))
    }
}

impl From<TypeList<'_>> for FormattedString {
    fn from(TypeList(names): TypeList<'_>) -> Self {
        if names.is_empty() {
            return FormattedString("No message types registered.".yellow().to_string());
        }

        let mut out = String::new();
        out.push_str("Registered Types:\n");
        for name in names {
            out.push_str(&format!("  - {}\n", name.green()));
        }
        FormattedString(out.trim_end().to_string())
    }
}
