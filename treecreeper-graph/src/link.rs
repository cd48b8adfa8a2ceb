//! Labelled links between host graph nodes.
//!
//! A node refers to its children through outgoing links. Each link carries
//! the role the child plays for its parent (`type`, `context`, `fields`, ...)
//! and its position among the parent's links of the same role, so that
//! list-valued roles keep the host's ordering.

use serde::{Deserialize, Serialize};

/// Edge weight stored in the host graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    /// Role of the target for the source node
    pub role: String,

    /// Position among the source's links with the same role
    pub position: u32,
}

impl Link {
    pub fn new(role: impl Into<String>, position: u32) -> Self {
        Self {
            role: role.into(),
            position,
        }
    }
}

/// Link record as stored in a snapshot.
///
/// Positions are implied by the order records appear in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub source: usize,
    pub target: usize,
    pub role: String,
}

/// Well-known link roles.
pub mod roles {
    // Shared by most families
    pub const TYPE: &str = "type";
    pub const CONTEXT: &str = "context";
    pub const NAME: &str = "name";

    // Declarations
    pub const ABSTRACT_ORIGIN: &str = "abstract origin";
    pub const ARGUMENTS: &str = "arguments";
    pub const ASSEMBLER_NAME: &str = "assembler name";
    pub const BIT_FIELD_TYPE: &str = "bit-field type";
    pub const BLOCKS: &str = "blocks";
    pub const CLONED_FUNCTION: &str = "cloned function";
    pub const CONVERSION_TYPE: &str = "conversion target type";
    pub const DECLARATIONS: &str = "declarations";
    pub const FIELD_CONTEXT: &str = "declaring class";
    pub const INITIAL: &str = "initial";
    pub const NAMESPACE_ALIAS: &str = "alias for";
    pub const NAMESPACES: &str = "namespaces";
    pub const PASSING_TYPE: &str = "passing type";
    pub const RESULT: &str = "result";
    pub const TEMPLATE_PARAMETERS: &str = "parameters";
    pub const TEMPLATE_RESULT: &str = "template result";
    pub const UNIT_OFFSET: &str = "unit offset";
    pub const VTABLE_INDEX: &str = "vtable index";

    // Types
    pub const ARGUMENT_TYPES: &str = "argument types";
    pub const BASES: &str = "base types";
    pub const CLASS_TYPE: &str = "class type";
    pub const DECLARATION: &str = "declaration";
    pub const DOMAIN: &str = "index type";
    pub const FIELDS: &str = "fields";
    pub const MAIN_VARIANT: &str = "main variant";
    pub const MAX_VALUE: &str = "maximum value";
    pub const MEMBER_FUNCTION_TYPE: &str = "member function type";
    pub const MEMBER_TYPE: &str = "member type";
    pub const METHODS: &str = "methods";
    pub const MIN_VALUE: &str = "minimum value";
    pub const NEXT_VARIANT: &str = "next variant";
    pub const VALUES: &str = "values";

    // Constants
    pub const ELEMENTS: &str = "elements";
    pub const IMAGINARY_PART: &str = "imaginary part";
    pub const REAL_PART: &str = "real part";

    // Blocks
    pub const SUBBLOCKS: &str = "subblocks";
    pub const SUPERCONTEXT: &str = "supercontext";

    // List cells
    pub const PURPOSE: &str = "purpose";
    pub const VALUE: &str = "value";
}
