//! Human-readable error reports with a context traceback and source excerpt.

use colored::Colorize;

use super::ScriptError;

/// Render `error` against the `source` it came from.
pub fn render(error: &ScriptError, source: &str) -> String {
    let mut out = String::new();

    if error.has_trace() {
        out.push_str(&format!("{}\n", "Traceback (most recent call last):".bold()));
        for frame in &error.trace {
            out.push_str(&format!(
                "  File {}, line {}, in {}\n",
                format!("\"{}\"", frame.file).cyan(),
                frame.line,
                frame.context.yellow()
            ));
        }
    }

    out.push_str(&format!("{}: {}\n", error.kind.label().red().bold(), error.kind));

    let span = error.span();
    if let Some(line) = source.lines().nth(span.line.saturating_sub(1)) {
        let gutter = format!("{:>4} | ", span.line);
        out.push_str(&format!("{}{}\n", gutter.dimmed(), line));

        let column = span.column.max(1);
        let width = span
            .end
            .saturating_sub(span.start)
            .clamp(1, line.len().saturating_sub(column - 1).max(1));
        out.push_str(&format!(
            "{}{}{}\n",
            " ".repeat(gutter.len()),
            " ".repeat(column - 1),
            "^".repeat(width).red()
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{RuntimeError, TraceFrame};
    use crate::span::Span;

    #[test]
    fn renders_trace_and_caret() {
        colored::control::set_override(false);
        let error = ScriptError::new(RuntimeError::division_by_zero(Span::new(4, 9, 1, 5)))
            .with_trace(|| {
                vec![TraceFrame {
                    context: "<program>".to_string(),
                    file: "main.lm".to_string(),
                    line: 1,
                }]
            });

        let text = render(&error, "x = 1 / 0");
        assert!(text.contains("File \"main.lm\", line 1, in <program>"));
        assert!(text.contains("RuntimeError: Division by zero at 1:5"));
        assert!(text.contains("x = 1 / 0"));
        assert!(text.contains("    ^^^^^"));
    }
}
