//! Formatting styles.
//!
//! Styles deserialize from the `[format]` table of the configuration file
//! and from recipe options; every field has a default so partial tables
//! are accepted.

use serde::{Deserialize, Serialize};

/// Indentation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct TabsAndIndentsStyle {
    pub use_tab_character: bool,
    /// Columns a tab advances to.
    pub tab_size: usize,
    /// Columns one indentation level adds.
    pub indent_size: usize,
}

impl Default for TabsAndIndentsStyle {
    fn default() -> Self {
        TabsAndIndentsStyle {
            use_tab_character: false,
            tab_size: 4,
            indent_size: 4,
        }
    }
}

impl TabsAndIndentsStyle {
    /// Text of one indentation level.
    pub fn unit(&self) -> String {
        if self.use_tab_character {
            "\t".to_string()
        } else {
            " ".repeat(self.indent_size)
        }
    }
}

/// Blank line limits. `keep_maximum_*` caps existing blank lines,
/// everything else is a minimum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct BlankLinesStyle {
    /// Cap at module level.
    pub keep_maximum_in_declarations: usize,
    /// Cap inside blocks.
    pub keep_maximum_in_code: usize,
    pub after_top_level_imports: usize,
    pub around_top_level_classes_functions: usize,
    pub around_method: usize,
    pub before_first_method: usize,
}

impl Default for BlankLinesStyle {
    fn default() -> Self {
        BlankLinesStyle {
            keep_maximum_in_declarations: 2,
            keep_maximum_in_code: 1,
            after_top_level_imports: 1,
            around_top_level_classes_functions: 2,
            around_method: 1,
            before_first_method: 0,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum LineBreak {
    #[default]
    Lf,
    CrLf,
    Cr,
}

impl LineBreak {
    pub fn as_str(self) -> &'static str {
        match self {
            LineBreak::Lf => "\n",
            LineBreak::CrLf => "\r\n",
            LineBreak::Cr => "\r",
        }
    }

    /// Parses `LF`, `CRLF` or `CR`, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "LF" => Some(LineBreak::Lf),
            "CRLF" => Some(LineBreak::CrLf),
            "CR" => Some(LineBreak::Cr),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct GeneralFormatStyle {
    pub line_break: LineBreak,
}

/// Everything the auto-format pipeline reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct FormatStyle {
    pub tabs_and_indents: TabsAndIndentsStyle,
    pub blank_lines: BlankLinesStyle,
    pub general: GeneralFormatStyle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_tables_fill_in_defaults() {
        let style: FormatStyle = serde_json::from_value(serde_json::json!({
            "tabs_and_indents": {"use_tab_character": true},
            "general": {"line_break": "CRLF"}
        }))
        .unwrap();
        assert!(style.tabs_and_indents.use_tab_character);
        assert_eq!(style.tabs_and_indents.tab_size, 4);
        assert_eq!(style.general.line_break, LineBreak::CrLf);
        assert_eq!(style.blank_lines, BlankLinesStyle::default());
    }

    #[test]
    fn line_break_names() {
        assert_eq!(LineBreak::from_name("crlf"), Some(LineBreak::CrLf));
        assert_eq!(LineBreak::from_name("cr").map(LineBreak::as_str), Some("\r"));
        assert_eq!(LineBreak::from_name("nel"), None);
    }

    #[test]
    fn indent_unit() {
        let mut style = TabsAndIndentsStyle::default();
        assert_eq!(style.unit(), "    ");
        style.use_tab_character = true;
        assert_eq!(style.unit(), "\t");
    }
}
