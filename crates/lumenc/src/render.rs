//! Diagnostic rendering.
//!
//! The checker emits structured `(kind, args)` records; this module owns
//! the fixed template table keyed by error kind and turns records into
//! text. Two forms: a plain `ERROR: CODE` + message pair, and an
//! ariadne-labeled report when the original source text is available.

use std::ops::Range;

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use lumen_typeck::error::{Diagnostic, ErrorKind};

/// The message template for each error kind. Placeholders are filled with
/// the diagnostic's args in order; arg counts match by construction.
fn template(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::MissingMain => "main function is missing",
        ErrorKind::IncorrectArityOfMain => {
            "the main function must have one parameter but got {}"
        }
        ErrorKind::UndefinedVariable => "variable {} is undefined",
        ErrorKind::UndefinedTypeVariable => "type variable {} is undefined",
        ErrorKind::UnexpectedTypeForExpression => {
            "expected type {} but got {} for expression {}"
        }
        ErrorKind::UnexpectedSubtype => {
            "expected a subtype of {} but got type of {} for expression {}"
        }
        ErrorKind::UnexpectedTypeForParameter => {
            "expected an expression of {} type but got expression of type {} for parameter {}"
        }
        ErrorKind::NotAFunction => {
            "expected an expression of a function type but got non-function type {} for expression {}"
        }
        ErrorKind::NotATuple => {
            "expected an expression of a tuple type but got non-tuple type {} for expression {}"
        }
        ErrorKind::NotARecord => {
            "expected an expression of a record type but got non-record type {} for expression {}"
        }
        ErrorKind::NotAList => {
            "expected an expression of a list type but got non-list type {} for expression {}"
        }
        ErrorKind::NotAReference => {
            "expected an expression of a reference type but got non-reference type {} for expression {}"
        }
        ErrorKind::NotAGenericFunction => {
            "expected an expression of a generic function type but got non-generic function type {} for expression {}"
        }
        ErrorKind::UnexpectedLambda => {
            "expected an expression of a non-function type {} but got function type {} for expression {}"
        }
        ErrorKind::UnexpectedTuple => {
            "expected an expression of a non-tuple type {} but got tuple type {} for expression {}"
        }
        ErrorKind::UnexpectedRecord => {
            "expected an expression of a non-record type {} but got record type {} for expression {}"
        }
        ErrorKind::UnexpectedVariant => {
            "expected an expression of a non-variant type {} but got variant type {} for expression {}"
        }
        ErrorKind::UnexpectedList => {
            "expected an expression of a non-list type {} but got list type {} for expression {}"
        }
        ErrorKind::UnexpectedReference => {
            "expected an expression of a non-reference type {} but got reference type {} for expression {}"
        }
        ErrorKind::UnexpectedInjection => "expected sum-type but got {}",
        ErrorKind::UnexpectedMemoryAddress => {
            "unexpected memory address {} while {} is expected"
        }
        ErrorKind::MissingRecordFields => "missing fields {} in record {}",
        ErrorKind::UnexpectedRecordFields => "unexpected fields {} in record {}",
        ErrorKind::UnexpectedFieldAccess => "unexpected field access {} in record {}",
        ErrorKind::UnexpectedVariantLabel => {
            "unexpected variant label {} in {} of type {}"
        }
        ErrorKind::DuplicateRecordFields => "duplicate fields in record {}",
        ErrorKind::DuplicateRecordTypeFields => "duplicate fields in record of {} type",
        ErrorKind::DuplicateVariantTypeFields => "duplicate type of field {} in variant {}",
        ErrorKind::DuplicateRecordPatternFields => "duplicate fields in record pattern {}",
        ErrorKind::TupleIndexOutOfBounds => "tuple index {} is out of bounds {}",
        ErrorKind::UnexpectedTupleLength => {
            "expected {} components for a tuple but got {} in tuple {}"
        }
        ErrorKind::IllegalEmptyMatching => "empty alternatives list for {}",
        ErrorKind::NonexhaustiveMatchPatterns => "non-exhaustive patterns for type {}",
        ErrorKind::UnexpectedPatternForType => "unexpected pattern {} for type {}",
        ErrorKind::AmbiguousPatternType => "can't infer the pattern {} type",
        ErrorKind::AmbiguousSumType => "can't infer the injection {} type",
        ErrorKind::AmbiguousVariantType => "can't infer the variant {} type",
        ErrorKind::AmbiguousList => "can't infer the list {} type",
        ErrorKind::AmbiguousThrowType => "can't infer the throw {} type",
        ErrorKind::AmbiguousReferenceType => "can't infer the reference {} type",
        ErrorKind::AmbiguousPanicType => "can't infer the panic {} type",
        ErrorKind::ExceptionTypeNotDeclared => "exception type is not declared",
        ErrorKind::OccursCheckInfiniteType => {
            "infinite type found while checking expression {}"
        }
        ErrorKind::IncorrectNumberOfTypeArguments => {
            "got unexpected arguments count, expected {} but got {}"
        }
    }
}

/// Fill the kind's template with the diagnostic's args, in order.
pub fn message(diagnostic: &Diagnostic) -> String {
    let mut out = String::new();
    let mut args = diagnostic.args.iter();
    let mut rest = template(diagnostic.kind);
    while let Some(pos) = rest.find("{}") {
        out.push_str(&rest[..pos]);
        if let Some(arg) = args.next() {
            out.push_str(&arg.to_string());
        }
        rest = &rest[pos + 2..];
    }
    out.push_str(rest);
    out
}

/// The plain two-line form: stable code, then the filled template.
pub fn render_plain(diagnostic: &Diagnostic) -> String {
    format!("ERROR: {}\n{}", diagnostic.kind.code(), message(diagnostic))
}

/// An ariadne report with a labeled span, for when the host has the
/// original source text. Falls back to the start of the file when the
/// diagnostic carries no real span (synthetic trees).
pub fn render_report(diagnostic: &Diagnostic, source: &str, color: bool) -> String {
    let source_len = source.len();
    let clamp = |r: Range<usize>| -> Range<usize> {
        let start = r.start.min(source_len);
        let end = r.end.min(source_len).max(start);
        if start == end {
            start..end.saturating_add(1).min(source_len)
        } else {
            start..end
        }
    };
    let span = clamp(
        diagnostic
            .primary_span()
            .map(|s| s.range())
            .unwrap_or(0..0),
    );

    let config = Config::default().with_color(color);
    let report = Report::build(ReportKind::Error, span.clone())
        .with_code(diagnostic.kind.code())
        .with_message(message(diagnostic))
        .with_config(config)
        .with_label(
            Label::new(span)
                .with_message(message(diagnostic))
                .with_color(Color::Red),
        )
        .finish();

    let mut buf = Vec::new();
    report
        .write(Source::from(source), &mut buf)
        .expect("failed to write diagnostic");
    String::from_utf8(buf).expect("diagnostic output is valid utf-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_typeck::error::{DiagArg, NodeRef};
    use lumen_typeck::ty::Ty;

    fn mismatch() -> Diagnostic {
        Diagnostic {
            kind: ErrorKind::UnexpectedTypeForExpression,
            args: vec![
                DiagArg::Type(Ty::Bool),
                DiagArg::Type(Ty::Nat),
                DiagArg::Node(NodeRef::text("x")),
            ],
        }
    }

    #[test]
    fn message_fills_placeholders_in_order() {
        insta::assert_snapshot!(
            message(&mismatch()),
            @"expected type Bool but got Nat for expression x"
        );
    }

    #[test]
    fn message_renders_structured_types() {
        let diag = Diagnostic {
            kind: ErrorKind::NonexhaustiveMatchPatterns,
            args: vec![DiagArg::Type(Ty::sum(Ty::Nat, Ty::Bool))],
        };
        insta::assert_snapshot!(
            message(&diag),
            @"non-exhaustive patterns for type (Nat + Bool)"
        );
    }

    #[test]
    fn plain_form_leads_with_the_code() {
        assert_eq!(
            render_plain(&mismatch()),
            "ERROR: ERROR_UNEXPECTED_TYPE_FOR_EXPRESSION\nexpected type Bool but got Nat for expression x"
        );
    }

    #[test]
    fn zero_arg_templates_render_verbatim() {
        let diag = Diagnostic { kind: ErrorKind::MissingMain, args: vec![] };
        assert_eq!(message(&diag), "main function is missing");
    }
}
