//! Structured diagnostics.
//!
//! The checker never formats messages: every problem it finds becomes a
//! `Diagnostic` record — an [`ErrorKind`] from a closed enumeration plus a
//! list of typed arguments. Rendering to human-readable text happens
//! downstream (the `lumenc` crate carries the template table).

use std::fmt;

use lumen_syntax::{Expr, Pattern, Span};

use crate::ty::Ty;

/// The closed enumeration of everything the checker can report.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    // Structural.
    MissingMain,
    IncorrectArityOfMain,
    UndefinedVariable,
    UndefinedTypeVariable,
    // Expectation mismatch.
    UnexpectedTypeForExpression,
    UnexpectedSubtype,
    UnexpectedTypeForParameter,
    // Shape violations.
    NotAFunction,
    NotATuple,
    NotARecord,
    NotAList,
    NotAReference,
    NotAGenericFunction,
    // Unexpected construct for the expected type.
    UnexpectedLambda,
    UnexpectedTuple,
    UnexpectedRecord,
    UnexpectedVariant,
    UnexpectedList,
    UnexpectedReference,
    UnexpectedInjection,
    UnexpectedMemoryAddress,
    // Fields and labels.
    MissingRecordFields,
    UnexpectedRecordFields,
    UnexpectedFieldAccess,
    UnexpectedVariantLabel,
    DuplicateRecordFields,
    DuplicateRecordTypeFields,
    DuplicateVariantTypeFields,
    DuplicateRecordPatternFields,
    TupleIndexOutOfBounds,
    UnexpectedTupleLength,
    // Pattern matching.
    IllegalEmptyMatching,
    NonexhaustiveMatchPatterns,
    UnexpectedPatternForType,
    AmbiguousPatternType,
    // Ambiguity.
    AmbiguousSumType,
    AmbiguousVariantType,
    AmbiguousList,
    AmbiguousThrowType,
    AmbiguousReferenceType,
    AmbiguousPanicType,
    // Exceptions and reconstruction.
    ExceptionTypeNotDeclared,
    OccursCheckInfiniteType,
    IncorrectNumberOfTypeArguments,
}

impl ErrorKind {
    /// The stable textual code for this kind, as hosts and test suites
    /// match on it.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::MissingMain => "ERROR_MISSING_MAIN",
            ErrorKind::IncorrectArityOfMain => "ERROR_INCORRECT_ARITY_OF_MAIN",
            ErrorKind::UndefinedVariable => "ERROR_UNDEFINED_VARIABLE",
            ErrorKind::UndefinedTypeVariable => "ERROR_UNDEFINED_TYPE_VARIABLE",
            ErrorKind::UnexpectedTypeForExpression => "ERROR_UNEXPECTED_TYPE_FOR_EXPRESSION",
            ErrorKind::UnexpectedSubtype => "ERROR_UNEXPECTED_SUBTYPE",
            ErrorKind::UnexpectedTypeForParameter => "ERROR_UNEXPECTED_TYPE_FOR_PARAMETER",
            ErrorKind::NotAFunction => "ERROR_NOT_A_FUNCTION",
            ErrorKind::NotATuple => "ERROR_NOT_A_TUPLE",
            ErrorKind::NotARecord => "ERROR_NOT_A_RECORD",
            ErrorKind::NotAList => "ERROR_NOT_A_LIST",
            ErrorKind::NotAReference => "ERROR_NOT_A_REFERENCE",
            ErrorKind::NotAGenericFunction => "ERROR_NOT_A_GENERIC_FUNCTION",
            ErrorKind::UnexpectedLambda => "ERROR_UNEXPECTED_LAMBDA",
            ErrorKind::UnexpectedTuple => "ERROR_UNEXPECTED_TUPLE",
            ErrorKind::UnexpectedRecord => "ERROR_UNEXPECTED_RECORD",
            ErrorKind::UnexpectedVariant => "ERROR_UNEXPECTED_VARIANT",
            ErrorKind::UnexpectedList => "ERROR_UNEXPECTED_LIST",
            ErrorKind::UnexpectedReference => "ERROR_UNEXPECTED_REFERENCE",
            ErrorKind::UnexpectedInjection => "ERROR_UNEXPECTED_INJECTION",
            ErrorKind::UnexpectedMemoryAddress => "ERROR_UNEXPECTED_MEMORY_ADDRESS",
            ErrorKind::MissingRecordFields => "ERROR_MISSING_RECORD_FIELDS",
            ErrorKind::UnexpectedRecordFields => "ERROR_UNEXPECTED_RECORD_FIELDS",
            ErrorKind::UnexpectedFieldAccess => "ERROR_UNEXPECTED_FIELD_ACCESS",
            ErrorKind::UnexpectedVariantLabel => "ERROR_UNEXPECTED_VARIANT_LABEL",
            ErrorKind::DuplicateRecordFields => "ERROR_DUPLICATE_RECORD_FIELDS",
            ErrorKind::DuplicateRecordTypeFields => "ERROR_DUPLICATE_RECORD_TYPE_FIELDS",
            ErrorKind::DuplicateVariantTypeFields => "ERROR_DUPLICATE_VARIANT_TYPE_FIELDS",
            ErrorKind::DuplicateRecordPatternFields => "ERROR_DUPLICATE_RECORD_PATTERN_FIELDS",
            ErrorKind::TupleIndexOutOfBounds => "ERROR_TUPLE_INDEX_OUT_OF_BOUNDS",
            ErrorKind::UnexpectedTupleLength => "ERROR_UNEXPECTED_TUPLE_LENGTH",
            ErrorKind::IllegalEmptyMatching => "ERROR_ILLEGAL_EMPTY_MATCHING",
            ErrorKind::NonexhaustiveMatchPatterns => "ERROR_NONEXHAUSTIVE_MATCH_PATTERNS",
            ErrorKind::UnexpectedPatternForType => "ERROR_UNEXPECTED_PATTERN_FOR_TYPE",
            ErrorKind::AmbiguousPatternType => "ERROR_AMBIGUOUS_PATTERN_TYPE",
            ErrorKind::AmbiguousSumType => "ERROR_AMBIGUOUS_SUM_TYPE",
            ErrorKind::AmbiguousVariantType => "ERROR_AMBIGUOUS_VARIANT_TYPE",
            ErrorKind::AmbiguousList => "ERROR_AMBIGUOUS_LIST",
            ErrorKind::AmbiguousThrowType => "ERROR_AMBIGUOUS_THROW_TYPE",
            ErrorKind::AmbiguousReferenceType => "ERROR_AMBIGUOUS_REFERENCE_TYPE",
            ErrorKind::AmbiguousPanicType => "ERROR_AMBIGUOUS_PANIC_TYPE",
            ErrorKind::ExceptionTypeNotDeclared => "ERROR_EXCEPTION_TYPE_NOT_DECLARED",
            ErrorKind::OccursCheckInfiniteType => "ERROR_OCCURS_CHECK_INFINITE_TYPE",
            ErrorKind::IncorrectNumberOfTypeArguments => {
                "ERROR_INCORRECT_NUMBER_OF_TYPE_ARGUMENTS"
            }
        }
    }

    /// How many arguments a diagnostic of this kind carries. The sink
    /// asserts this on every report.
    pub fn arity(&self) -> usize {
        match self {
            ErrorKind::MissingMain | ErrorKind::ExceptionTypeNotDeclared => 0,

            ErrorKind::IncorrectArityOfMain
            | ErrorKind::UndefinedVariable
            | ErrorKind::UndefinedTypeVariable
            | ErrorKind::UnexpectedInjection
            | ErrorKind::DuplicateRecordFields
            | ErrorKind::DuplicateRecordTypeFields
            | ErrorKind::DuplicateRecordPatternFields
            | ErrorKind::IllegalEmptyMatching
            | ErrorKind::NonexhaustiveMatchPatterns
            | ErrorKind::AmbiguousPatternType
            | ErrorKind::AmbiguousSumType
            | ErrorKind::AmbiguousVariantType
            | ErrorKind::AmbiguousList
            | ErrorKind::AmbiguousThrowType
            | ErrorKind::AmbiguousReferenceType
            | ErrorKind::AmbiguousPanicType
            | ErrorKind::OccursCheckInfiniteType => 1,

            ErrorKind::NotAFunction
            | ErrorKind::NotATuple
            | ErrorKind::NotARecord
            | ErrorKind::NotAList
            | ErrorKind::NotAReference
            | ErrorKind::NotAGenericFunction
            | ErrorKind::UnexpectedMemoryAddress
            | ErrorKind::MissingRecordFields
            | ErrorKind::UnexpectedRecordFields
            | ErrorKind::UnexpectedFieldAccess
            | ErrorKind::DuplicateVariantTypeFields
            | ErrorKind::TupleIndexOutOfBounds
            | ErrorKind::UnexpectedPatternForType
            | ErrorKind::IncorrectNumberOfTypeArguments => 2,

            ErrorKind::UnexpectedTypeForExpression
            | ErrorKind::UnexpectedSubtype
            | ErrorKind::UnexpectedTypeForParameter
            | ErrorKind::UnexpectedLambda
            | ErrorKind::UnexpectedTuple
            | ErrorKind::UnexpectedRecord
            | ErrorKind::UnexpectedVariant
            | ErrorKind::UnexpectedList
            | ErrorKind::UnexpectedReference
            | ErrorKind::UnexpectedVariantLabel
            | ErrorKind::UnexpectedTupleLength => 3,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A reference to a tree node: the span it came from plus its quoted
/// source form (produced by the node's pretty-printer at report time).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeRef {
    pub span: Span,
    pub quote: String,
}

impl NodeRef {
    pub fn expr(expr: &Expr) -> Self {
        NodeRef { span: expr.span, quote: expr.to_string() }
    }

    pub fn pattern(pattern: &Pattern) -> Self {
        NodeRef { span: Span::default(), quote: pattern.to_string() }
    }

    pub fn text(text: impl Into<String>) -> Self {
        NodeRef { span: Span::default(), quote: text.into() }
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.quote)
    }
}

/// One argument of a diagnostic.
#[derive(Clone, Debug, PartialEq)]
pub enum DiagArg {
    /// A type, rendered in canonical form.
    Type(Ty),
    /// A tree node, quoted.
    Node(NodeRef),
    /// A bare string (identifier, label, field list).
    Text(String),
    /// A number (arity, index, length).
    Num(u64),
}

impl fmt::Display for DiagArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagArg::Type(ty) => write!(f, "{}", ty),
            DiagArg::Node(node) => write!(f, "{}", node),
            DiagArg::Text(text) => write!(f, "{}", text),
            DiagArg::Num(n) => write!(f, "{}", n),
        }
    }
}

impl From<Ty> for DiagArg {
    fn from(ty: Ty) -> Self {
        DiagArg::Type(ty)
    }
}

impl From<NodeRef> for DiagArg {
    fn from(node: NodeRef) -> Self {
        DiagArg::Node(node)
    }
}

impl From<&str> for DiagArg {
    fn from(text: &str) -> Self {
        DiagArg::Text(text.to_string())
    }
}

impl From<String> for DiagArg {
    fn from(text: String) -> Self {
        DiagArg::Text(text)
    }
}

impl From<u64> for DiagArg {
    fn from(n: u64) -> Self {
        DiagArg::Num(n)
    }
}

impl From<usize> for DiagArg {
    fn from(n: usize) -> Self {
        DiagArg::Num(n as u64)
    }
}

/// A single structured diagnostic.
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub args: Vec<DiagArg>,
}

impl Diagnostic {
    /// The primary source span of this diagnostic: the span of its first
    /// node argument, when it has one with real extent.
    pub fn primary_span(&self) -> Option<Span> {
        self.args.iter().find_map(|arg| match arg {
            DiagArg::Node(node) if !node.span.is_empty() => Some(node.span),
            _ => None,
        })
    }
}

/// Append-only collector of diagnostics, owned by the driver.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic. The argument count must match the kind's
    /// declared arity; a mismatch is a checker bug.
    pub fn report(&mut self, kind: ErrorKind, args: Vec<DiagArg>) {
        assert_eq!(
            args.len(),
            kind.arity(),
            "diagnostic {} expects {} args, got {}",
            kind.code(),
            kind.arity(),
            args.len()
        );
        self.diagnostics.push(Diagnostic { kind, args });
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}
