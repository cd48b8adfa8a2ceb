//! Preprocessor records: macro definitions and include events.

use crate::node::Location;
use serde::{Deserialize, Serialize};

/// Flags attached to a macro replacement token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenFlag {
    PreviousWhitespace,
    Digraph,
    Stringify,
    PasteLeft,
    NamedOperator,
    NoExpansion,
    BeginningOfLine,
    PureZero,
    /// Digraph spelling inside a stringified argument
    SpDigraph,
    /// Preceded by whitespace inside a stringified argument
    SpPreviousWhitespace,
}

impl TokenFlag {
    /// Get the label written to the document.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenFlag::PreviousWhitespace => "previous whitespace",
            TokenFlag::Digraph => "digraph",
            TokenFlag::Stringify => "stringify",
            TokenFlag::PasteLeft => "paste left",
            TokenFlag::NamedOperator => "named operator",
            TokenFlag::NoExpansion => "no expansion",
            TokenFlag::BeginningOfLine => "beginning of line",
            TokenFlag::PureZero => "pure zero",
            TokenFlag::SpDigraph => "sp digraph",
            TokenFlag::SpPreviousWhitespace => "sp previous whitespace",
        }
    }
}

/// One token of a macro's replacement list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroToken {
    /// Lexical token type name (e.g. `NAME`, `NUMBER`, `MACRO_ARG`)
    #[serde(rename = "type")]
    pub token_type: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<TokenFlag>,

    /// Spelling; for macro arguments, the parameter name
    pub text: String,
}

/// A preprocessor macro definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroDefinition {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,

    /// Predefined by the compiler rather than by source
    #[serde(default)]
    pub builtin: bool,

    /// Parameter names; `None` for object-like macros
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<String>>,

    #[serde(default)]
    pub variadic: bool,

    #[serde(default)]
    pub tokens: Vec<MacroToken>,
}

impl MacroDefinition {
    /// Create an object-like macro with no tokens.
    pub fn object_like(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: None,
            builtin: false,
            parameters: None,
            variadic: false,
            tokens: Vec::new(),
        }
    }

    pub fn is_function_like(&self) -> bool {
        self.parameters.is_some()
    }
}

/// A change of the current source file, in the order the host saw them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum IncludeEvent {
    /// Entering a file; `from` is where it was included, `None` for the main file
    Enter {
        file: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<Location>,
    },

    /// A `#line` style rename of the current file
    Rename {
        file: String,
        line: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<Location>,
    },

    /// Returning to the including file
    Leave,
}
