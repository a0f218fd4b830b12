//! Tool configuration loaded from TOML.
//!
//! ```toml
//! default-revision = "std22"
//!
//! [evaluator]
//! division-by-zero = "zero"
//!
//! [writer]
//! indent = 4
//! ```
//!
//! Every key is optional; missing keys take their defaults.

use ipxact_core::Revision;
use ipxact_expr::{EvaluatorConfig, ExpressionEvaluator, ParameterFinder};
use ipxact_xml::{DocumentReader, DocumentWriter, ReaderOptions, WriterOptions};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Settings shared by the reader, the writer, and the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ToolConfig {
    /// Revision used when a document declares none, and when writing a
    /// document whose revision is unknown.
    pub default_revision: Revision,
    pub evaluator: EvaluatorConfig,
    pub writer: WriterSection,
}

impl Default for ToolConfig {
    fn default() -> Self {
        ToolConfig {
            default_revision: Revision::Std22,
            evaluator: EvaluatorConfig::default(),
            writer: WriterSection::default(),
        }
    }
}

/// `[writer]` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct WriterSection {
    /// Spaces per nesting level; zero writes a compact document.
    pub indent: usize,
}

impl Default for WriterSection {
    fn default() -> Self {
        WriterSection { indent: 4 }
    }
}

impl ToolConfig {
    /// Evaluator resolving symbols through `finder` with the configured policies.
    pub fn evaluator<'f>(&self, finder: &'f dyn ParameterFinder) -> ExpressionEvaluator<'f> {
        ExpressionEvaluator::with_config(finder, self.evaluator)
    }

    pub fn reader(&self) -> DocumentReader {
        DocumentReader::new(ReaderOptions {
            target_revision: self.default_revision,
        })
    }

    pub fn writer(&self) -> DocumentWriter {
        DocumentWriter::new(WriterOptions {
            indent: self.writer.indent,
            fallback_revision: self.default_revision,
        })
    }
}

/// Parse a tool configuration from a TOML string.
pub fn parse_config_toml(input: &str) -> Result<ToolConfig> {
    let config: ToolConfig = toml::from_str(input)?;
    Ok(config)
}

/// Serialize a tool configuration to a TOML string.
pub fn config_to_toml(config: &ToolConfig) -> Result<String> {
    let output = toml::to_string_pretty(config)?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipxact_expr::{DivisionByZero, NullFinder};

    #[test]
    fn empty_input_gives_defaults() {
        let config = parse_config_toml("").unwrap();
        assert_eq!(config, ToolConfig::default());
        assert_eq!(config.default_revision, Revision::Std22);
        assert_eq!(config.writer.indent, 4);
        assert_eq!(config.evaluator.division_by_zero, DivisionByZero::Zero);
    }

    #[test]
    fn parse_all_sections() {
        let config = parse_config_toml(
            r#"
default-revision = "std14"

[evaluator]
division-by-zero = "error"

[writer]
indent = 0
"#,
        )
        .unwrap();
        assert_eq!(config.default_revision, Revision::Std14);
        assert_eq!(config.evaluator.division_by_zero, DivisionByZero::Error);
        assert_eq!(config.writer.indent, 0);

        assert_eq!(config.reader().options().target_revision, Revision::Std14);
        assert_eq!(config.writer().options().indent, 0);
        assert_eq!(config.writer().options().fallback_revision, Revision::Std14);
    }

    #[test]
    fn save_and_reload() {
        let mut config = ToolConfig::default();
        config.writer.indent = 2;
        let text = config_to_toml(&config).unwrap();
        assert!(text.contains("default-revision = \"std22\""));
        assert_eq!(parse_config_toml(&text).unwrap(), config);
    }

    #[test]
    fn unknown_revision_keyword_is_rejected() {
        let err = parse_config_toml("default-revision = \"std09\"").unwrap_err();
        assert!(err.to_string().starts_with("TOML parse error"));
    }

    #[test]
    fn evaluator_follows_division_policy() {
        let strict = parse_config_toml("[evaluator]\ndivision-by-zero = \"error\"").unwrap();
        assert!(strict.evaluator(&NullFinder).evaluate_int("4/0").is_err());
        let lenient = ToolConfig::default();
        assert_eq!(lenient.evaluator(&NullFinder).evaluate_int("4/0").unwrap(), 0);
    }
}
