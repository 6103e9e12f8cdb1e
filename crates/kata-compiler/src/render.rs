//! Diagnostic presentation for display layers
//!
//! The engine returns diagnostics as plain data; UI collaborators that want
//! source-context formatting can use this renderer. Output is plain text
//! (no ANSI colors) so it can be embedded anywhere.

use crate::diagnostic::Diagnostic;
use codespan_reporting::diagnostic::{Diagnostic as CsDiagnostic, Label};
use codespan_reporting::files::SimpleFile;
use codespan_reporting::term;
use termcolor::NoColor;

/// Render a diagnostic list against the submitted source.
///
/// Each diagnostic is shown with its source line and a caret under it.
pub fn render_diagnostics(source: &str, diagnostics: &[Diagnostic]) -> String {
    let file = SimpleFile::new("<submission>", source);
    let config = term::Config::default();
    let mut writer = NoColor::new(Vec::new());

    for diag in diagnostics {
        let cs = CsDiagnostic::error()
            .with_message(diag.message.clone())
            .with_labels(vec![Label::primary((), line_range(source, diag.line))]);
        // Rendering is best-effort presentation; a failed emit leaves the
        // textual diagnostics intact for the caller.
        let _ = term::emit(&mut writer, &config, &file, &cs);
    }

    String::from_utf8_lossy(&writer.into_inner()).into_owned()
}

/// Byte range of a 1-based source line, clamped to the source
fn line_range(source: &str, line: u32) -> std::ops::Range<usize> {
    let mut current = 1u32;
    let mut start = 0usize;

    for (offset, c) in source.char_indices() {
        if current == line {
            // Scan forward to the end of this line
            let end = source[offset..]
                .find('\n')
                .map(|i| offset + i)
                .unwrap_or(source.len());
            return start..end.max(start);
        }
        if c == '\n' {
            current += 1;
            start = offset + 1;
        }
    }

    if current == line {
        return start..source.len();
    }
    source.len()..source.len()
}
