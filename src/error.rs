//! Rich diagnostic error types for the chainer.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text. Rule and table errors are configuration
//! errors: they abort setup. A step that finds nothing to fire is not an error
//! at all, see [`crate::chainer::StepOutcome::Inapplicable`].

use miette::Diagnostic;
use thiserror::Error;

use crate::formula::FormulaError;

/// Top-level error type for the chainer.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum PlnError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Rule(#[from] RuleError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Formula(#[from] FormulaError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

impl PlnError {
    /// Whether this error aborts setup (malformed rule or composition table).
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Rule(_) | Self::Table(_) | Self::Config(_))
    }
}

// ---------------------------------------------------------------------------
// Graph errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum GraphError {
    #[error("atom not found: {atom_id}")]
    #[diagnostic(
        code(pln::graph::unknown_atom),
        help(
            "The atom id does not exist in this atom space. \
             Create the node or link first, or check that the id came from the same store."
        )
    )]
    UnknownAtom { atom_id: u64 },

    #[error("cannot create {link_type} with an empty outgoing set")]
    #[diagnostic(
        code(pln::graph::empty_link),
        help("A link needs at least one member atom. Use `add_node` for leaf atoms.")
    )]
    EmptyLink { link_type: String },

    #[error("{atom_type} is a node type and cannot be used as a link")]
    #[diagnostic(
        code(pln::graph::not_a_link),
        help("Pick a link type such as BeforeLink or InheritanceLink.")
    )]
    NotALinkType { atom_type: String },
}

// ---------------------------------------------------------------------------
// Rule errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum RuleError {
    #[error("rule '{rule}' has no input patterns")]
    #[diagnostic(
        code(pln::rule::no_inputs),
        help("A rule must match at least one input pattern against the graph.")
    )]
    NoInputs { rule: String },

    #[error("rule '{rule}' has no output patterns")]
    #[diagnostic(
        code(pln::rule::no_outputs),
        help("A rule must produce at least one output link.")
    )]
    NoOutputs { rule: String },

    #[error("rule '{rule}': output variable {variable} is not bound by any input pattern")]
    #[diagnostic(
        code(pln::rule::unbound_output),
        help(
            "Every variable in an output pattern must also appear in an input pattern, \
             otherwise the output cannot be instantiated from a match. \
             Derive the output from the matched entities instead."
        )
    )]
    UnboundOutputVariable { rule: String, variable: String },

    #[error("rule '{rule}': distinct constraint names {variable}, which no input binds")]
    #[diagnostic(
        code(pln::rule::unbound_distinct),
        help("Distinct-variable constraints may only reference input variables.")
    )]
    UnboundDistinctVariable { rule: String, variable: String },

    #[error("cannot instantiate pattern: variable {variable} has no binding")]
    #[diagnostic(
        code(pln::rule::unbound_variable),
        help("The binding set passed to `instantiate` must cover every variable in the pattern.")
    )]
    UnboundVariable { variable: String },
}

// ---------------------------------------------------------------------------
// Composition table errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum TableError {
    #[error("composition table is empty: missing header row")]
    #[diagnostic(
        code(pln::table::missing_header),
        help("The first line of the table is a header and is discarded; data rows follow it.")
    )]
    MissingHeader,

    #[error("composition table line {line}: expected {expected} columns, found {found}")]
    #[diagnostic(
        code(pln::table::column_count),
        help(
            "Each data row holds the row relation code followed by 13 tab-separated cells \
             in the order p m o F D s e S d f O M P."
        )
    )]
    ColumnCount {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("composition table line {line}: unknown Allen relation code '{code}'")]
    #[diagnostic(
        code(pln::table::unknown_code),
        help("Valid relation codes are p m o F D s e S d f O M P.")
    )]
    UnknownCode { code: String, line: usize },

    #[error("composition table line {line}: duplicate row for relation '{code}'")]
    #[diagnostic(
        code(pln::table::duplicate_row),
        help("Each of the 13 relations has exactly one row.")
    )]
    DuplicateRow { code: char, line: usize },

    #[error("composition table is missing rows for: {missing}")]
    #[diagnostic(
        code(pln::table::missing_rows),
        help("The table needs one row per relation: p m o F D s e S d f O M P.")
    )]
    MissingRows { missing: String },

    #[error("failed to read composition table: {path}")]
    #[diagnostic(
        code(pln::table::read),
        help("Check that the file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(pln::config::read),
        help("Ensure the config file exists and is valid TOML.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {path}: {message}")]
    #[diagnostic(
        code(pln::config::parse),
        help("Check the TOML syntax and field names in the config file.")
    )]
    Parse { path: String, message: String },

    #[error("failed to read facts: {path}")]
    #[diagnostic(code(pln::config::facts_read), help("Check that the facts file exists."))]
    FactsRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse facts: {message}")]
    #[diagnostic(
        code(pln::config::facts_parse),
        help("Facts are JSON: {{\"links\": [{{\"type\": \"AtTimeLink\", \"outgoing\": [\"5\", \"X\"]}}]}}.")
    )]
    FactsParse { message: String },

    #[error("unknown atom type: {name}")]
    #[diagnostic(
        code(pln::config::unknown_type),
        help("Use a full type name such as ConceptNode, AtTimeLink or BeforeLink.")
    )]
    UnknownAtomType { name: String },
}

/// Convenience result type for the whole crate.
pub type PlnResult<T> = std::result::Result<T, PlnError>;

/// Result type for rule construction.
pub type RuleResult<T> = std::result::Result<T, RuleError>;

/// Result type for composition table loading.
pub type TableResult<T> = std::result::Result<T, TableError>;

/// Result type for configuration loading.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
