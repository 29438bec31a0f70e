use std::collections::BTreeSet;

use serde::Serialize;

use crate::span::Span;

/// Diagnostic severity. Any `Error` blocks emission entirely; `Warning`s
/// are reported alongside the emitted artifact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Warning,
    Error,
}

/// Stable diagnostic codes, one per failure class the translator reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum DiagCode {
    /// A host construct HLSL cannot express (recursion, heap allocation,
    /// exceptions, virtual dispatch, closures, unbounded collections).
    UnsupportedConstruct,
    /// No registry entry matches the operation name + argument shapes.
    UnresolvedIntrinsic,
    /// A captured field or local has no `ShapeType` mapping.
    UnrepresentableType,
    /// One logical resource captured under two access modes.
    BindingConflict,
    /// A double-precision intrinsic on a reduced-precision profile.
    PrecisionWarning,
}

impl DiagCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagCode::UnsupportedConstruct => "unsupported-construct",
            DiagCode::UnresolvedIntrinsic => "unresolved-intrinsic",
            DiagCode::UnrepresentableType => "unrepresentable-type",
            DiagCode::BindingConflict => "binding-conflict",
            DiagCode::PrecisionWarning => "precision-warning",
        }
    }

    /// The severity this code always carries.
    pub fn severity(&self) -> Severity {
        match self {
            DiagCode::PrecisionWarning => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

/// A translation diagnostic. Created during analysis, never mutated afterward.
#[derive(Clone, Debug, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagCode,
    pub message: String,
    pub span: Span,
    pub notes: Vec<String>,
    pub help: Option<String>,
}

impl Diagnostic {
    pub fn error(code: DiagCode, message: String, span: Span) -> Self {
        debug_assert_eq!(code.severity(), Severity::Error);
        Self {
            severity: Severity::Error,
            code,
            message,
            span,
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn warning(code: DiagCode, message: String, span: Span) -> Self {
        debug_assert_eq!(code.severity(), Severity::Warning);
        Self {
            severity: Severity::Warning,
            code,
            message,
            span,
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }

    pub fn with_help(mut self, help: String) -> Self {
        self.help = Some(help);
        self
    }

    /// Render the diagnostic to stderr using ariadne.
    pub fn render(&self, filename: &str, source: &str) {
        use ariadne::{Color, Label, Report, ReportKind, Source};

        let kind = match self.severity {
            Severity::Error => ReportKind::Error,
            Severity::Warning => ReportKind::Warning,
        };

        let color = match self.severity {
            Severity::Error => Color::Red,
            Severity::Warning => Color::Yellow,
        };

        let mut report = Report::build(kind, filename, self.span.start as usize)
            .with_code(self.code.as_str())
            .with_message(&self.message)
            .with_label(
                Label::new((filename, self.span.start as usize..self.span.end as usize))
                    .with_message(&self.message)
                    .with_color(color),
            );

        for note in &self.notes {
            report = report.with_note(note);
        }

        if let Some(help) = &self.help {
            report = report.with_help(help);
        }

        let _ = report.finish().eprint((filename, Source::from(source)));
    }
}

/// Render a list of diagnostics.
pub fn render_diagnostics(diagnostics: &[Diagnostic], filename: &str, source: &str) {
    for diag in diagnostics {
        diag.render(filename, source);
    }
}

/// Accumulates diagnostics from all passes over one kernel.
///
/// Duplicates for the same root cause (same code at the same span) are
/// suppressed, so each unresolved subtree reports exactly once.
#[derive(Debug, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
    seen: BTreeSet<(DiagCode, Span)>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diag: Diagnostic) {
        if self.seen.insert((diag.code, diag.span)) {
            self.items.push(diag);
        }
    }

    pub fn error(&mut self, code: DiagCode, message: String, span: Span) {
        self.push(Diagnostic::error(code, message, span));
    }

    pub fn warning(&mut self, code: DiagCode, message: String, span: Span) {
        self.push(Diagnostic::warning(code, message, span));
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// All diagnostics, errors ranked before warnings, stable within a rank.
    pub fn into_sorted(self) -> Vec<Diagnostic> {
        let mut items = self.items;
        items.sort_by(|a, b| b.severity.cmp(&a.severity));
        items
    }

    /// The warnings alone (for attaching to a successful translation).
    pub fn warnings(&self) -> Vec<Diagnostic> {
        self.items
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .cloned()
            .collect()
    }
}
