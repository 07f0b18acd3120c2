use std::fmt::Debug;

use parking_lot::Mutex;
use tracing::warn;

/// A structured, non-fatal warning emitted during `collect`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub code: &'static str,
    pub message: String,
    pub expr_text: String,
}

impl Diagnostic {
    pub fn unsupported_expression(expr_text: String) -> Self {
        Diagnostic {
            code: "UnsupportedExpression",
            message: format!(
                "Expression not supported natively, executing through the fallback evaluator: {expr_text}"
            ),
            expr_text,
        }
    }
}

/// Sink for structured warnings.
pub trait DiagnosticSink: Debug + Send + Sync {
    fn emit(&self, diagnostic: Diagnostic);
}

/// Default sink, logs warnings through `tracing`.
#[derive(Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, diagnostic: Diagnostic) {
        warn!(
            code = diagnostic.code,
            expr = %diagnostic.expr_text,
            "{}",
            diagnostic.message
        );
    }
}

/// Sink that collects diagnostics, for tests and embeddings that want
/// to surface warnings themselves.
#[derive(Debug, Default)]
pub struct VecSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl VecSink {
    pub fn new() -> Self {
        VecSink::default()
    }

    pub fn drain(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.lock())
    }

    pub fn len(&self) -> usize {
        self.diagnostics.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.lock().is_empty()
    }
}

impl DiagnosticSink for VecSink {
    fn emit(&self, diagnostic: Diagnostic) {
        self.diagnostics.lock().push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec_sink_collects() {
        let sink = VecSink::new();
        sink.emit(Diagnostic::unsupported_expression("f(x)".to_string()));

        let diags = sink.drain();
        assert_eq!(1, diags.len());
        assert_eq!("UnsupportedExpression", diags[0].code);
        assert_eq!("f(x)", diags[0].expr_text);
        assert!(sink.is_empty());
    }
}
