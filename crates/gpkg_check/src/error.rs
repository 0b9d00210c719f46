//! Helpful error types for CLI commands
//!
//! Every error includes what went wrong, what was being attempted, and
//! suggestions for how to fix it.

use std::fmt;
use std::path::Path;

/// An error with helpful context and suggestions
#[derive(Debug)]
pub struct HelpfulError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
}

impl HelpfulError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestions(mut self, suggestions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.suggestions.extend(suggestions.into_iter().map(|s| s.into()));
        self
    }

    /// File does not exist
    pub fn file_not_found(path: &Path) -> Self {
        Self::new(format!("File not found: {}", path.display()))
            .with_context("The GeoPackage to check does not exist")
            .with_suggestions([
                format!("TRY: Check if the file exists: ls -la {}", path.display()),
                "TRY: Check for typos in the path".to_string(),
            ])
    }

    /// Path exists but is a directory
    pub fn not_a_file(path: &Path) -> Self {
        Self::new(format!("Not a file: {}", path.display()))
            .with_context("The check command expects a single GeoPackage file")
            .with_suggestions([format!(
                "TRY: List GeoPackages in the directory: ls {}/*.gpkg",
                path.display()
            )])
    }

    /// SQLite could not open the file at all
    pub fn cannot_open(path: &Path, reason: &str) -> Self {
        Self::new(format!("Cannot open database: {}", path.display()))
            .with_context(reason.to_string())
            .with_suggestions([
                format!("TRY: Check file permissions: ls -la {}", path.display()),
                "TRY: Ensure no other process holds an exclusive lock on the file".to_string(),
            ])
    }

    /// File exists but SQLite does not recognise it as a database
    pub fn not_a_database(path: &Path, reason: &str) -> Self {
        Self::new(format!("Not an SQLite database: {}", path.display()))
            .with_context(reason.to_string())
            .with_suggestions([
                format!(
                    "TRY: Check the file header (starts with 'SQLite format 3'): head -c 16 {}",
                    path.display()
                ),
                "TRY: Make sure the file was fully downloaded or copied".to_string(),
            ])
    }
}

impl fmt::Display for HelpfulError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ERROR: {}", self.message)?;

        if let Some(ctx) = &self.context {
            writeln!(f, "CONTEXT: {}", ctx)?;
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            for suggestion in &self.suggestions {
                writeln!(f, "  {}", suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for HelpfulError {}
