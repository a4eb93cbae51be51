//! Syntax check standing in for the browser's `querySelector` parser.

use walko_protocols::HostError;

/// Reject selectors a browser would throw `SyntaxError` on: unbalanced
/// brackets, parentheses or quotes, and dangling combinators.
pub fn check_selector(selector: &str) -> Result<(), HostError> {
    let invalid = || HostError::InvalidSelector(selector.to_string());
    let trimmed = selector.trim();
    if trimmed.is_empty() {
        return Err(invalid());
    }

    const COMBINATORS: [char; 4] = ['>', '+', '~', ','];
    if trimmed.starts_with(COMBINATORS) || trimmed.ends_with(COMBINATORS) {
        return Err(invalid());
    }

    let mut stack = Vec::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for c in trimmed.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        if c == '\\' {
            escaped = true;
            continue;
        }
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '[' | '(' => {
                // Attribute selectors do not nest.
                if c == '[' && stack.last() == Some(&'[') {
                    return Err(invalid());
                }
                stack.push(c);
            }
            ']' => {
                if stack.pop() != Some('[') {
                    return Err(invalid());
                }
            }
            ')' => {
                if stack.pop() != Some('(') {
                    return Err(invalid());
                }
            }
            _ => {}
        }
    }

    if quote.is_some() || escaped || !stack.is_empty() {
        return Err(invalid());
    }
    Ok(())
}
