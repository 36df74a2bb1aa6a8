//! Template syntax normalization
//!
//! Definitions files are written with bare `{{ name }}` lookups. Handlebars
//! resolves a bare name against helpers first, so each lookup is rewritten to
//! an explicit context-relative path (`{{ ./name }}`). `{% ... %}` blocks are
//! not touched.

use tracing::debug;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Prefix that turns a bare identifier into a context-relative lookup
pub const FIELD_MARKER: &str = "./";

/// Rewrite every `{{ name }}` expression in `text` to `{{ ./name }}`
///
/// Lines are processed independently; an opening delimiter with no closing
/// delimiter on the same line is left as it is.
pub fn normalize(text: &str) -> String {
    debug!(text_len = text.len(), "normalize: called");
    text.split('\n').map(normalize_line).collect::<Vec<_>>().join("\n")
}

fn normalize_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len() + 8);
    let mut rest = line;

    while let Some(open) = rest.find(OPEN) {
        let after_open = &rest[open + OPEN.len()..];
        let Some(close) = after_open.find(CLOSE) else {
            break;
        };

        let expr = &after_open[..close];
        let trimmed = expr.trim_start();
        let leading = &expr[..expr.len() - trimmed.len()];

        out.push_str(&rest[..open + OPEN.len()]);
        out.push_str(leading);
        if needs_marker(trimmed) {
            out.push_str(FIELD_MARKER);
        }
        out.push_str(trimmed);
        out.push_str(CLOSE);

        rest = &after_open[close + CLOSE.len()..];
    }

    out.push_str(rest);
    out
}

/// Expressions already in handlebars form are left alone
fn needs_marker(expr: &str) -> bool {
    let Some(first) = expr.chars().next() else {
        return false;
    };
    if matches!(first, '#' | '/' | '^' | '!' | '>' | '~' | '@' | '.' | '{' | '}') {
        return false;
    }

    let word = expr
        .split(|c: char| c.is_whitespace() || c == '.' || c == '/')
        .next()
        .unwrap_or(expr);
    !matches!(word, "this" | "else")
}
