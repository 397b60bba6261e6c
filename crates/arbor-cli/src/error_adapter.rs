//! Bridge from [`CliError`] to miette diagnostics.
//!
//! Every error is reported with its taxonomy tag as the diagnostic code.
//! Description errors also carry the source text and the offending span.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use arbor::ArborError;

use crate::error::CliError;

/// Adapter implementing [`MietteDiagnostic`] for a borrowed [`CliError`].
pub struct ErrorAdapter<'a>(pub &'a CliError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(self.0)
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.0.code()))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match self.0 {
            CliError::Arbor(ArborError::DuplicateId { .. }) => {
                "nodes and clusters share one id namespace"
            }
            CliError::Arbor(ArborError::Reference { .. }) => {
                "declare the node or cluster before referencing it"
            }
            CliError::Arbor(ArborError::Render { .. }) => {
                "check that the output directory exists and is writable"
            }
            CliError::MissingConfig(_) => "omit --config to use the default configuration",
            _ => return None,
        };
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self.0 {
            CliError::Description { src, .. } => Some(src as &dyn miette::SourceCode),
            _ => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let CliError::Description {
            message,
            span: Some(span),
            ..
        } = self.0
        else {
            return None;
        };

        let label = LabeledSpan::new_primary_with_span(
            Some(message.clone()),
            SourceSpan::from(span.clone()),
        );
        Some(Box::new(std::iter::once(label)))
    }
}

/// Wraps `err` for rendering by a miette report handler.
pub fn to_reportable(err: &CliError) -> ErrorAdapter<'_> {
    ErrorAdapter(err)
}
