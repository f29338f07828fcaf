//! Line handling shared by the REPL: block balance and indentation.

/// Net count of open `{`, `[` and `(` in `source`, ignoring string
/// literals and comments.
pub fn count_block_balance(source: &str) -> i32 {
    let mut balance = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut in_block_comment = false;
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        if in_block_comment {
            if c == '*' && chars.peek() == Some(&'/') {
                chars.next();
                in_block_comment = false;
            }
            continue;
        }
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '/' if chars.peek() == Some(&'/') => {
                // Line comment
                for next in chars.by_ref() {
                    if next == '\n' {
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                in_block_comment = true;
            }
            '{' | '[' | '(' => balance += 1,
            '}' | ']' | ')' => balance -= 1,
            _ => {}
        }
    }

    balance
}

/// Whether the input so far leaves a block open.
pub fn needs_more_input(source: &str) -> bool {
    count_block_balance(source) > 0
}

/// Indentation for the next continuation line.
pub fn calculate_indent(source: &str) -> usize {
    count_block_balance(source).max(0) as usize * 4
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_balance_counts_brackets() {
        assert_eq!(count_block_balance("fun f() {"), 1);
        assert_eq!(count_block_balance("var a = [1, [2"), 2);
        assert_eq!(count_block_balance("if x { y } else { z }"), 0);
        assert_eq!(count_block_balance("}"), -1);
    }

    #[test]
    fn test_balance_ignores_strings_and_comments() {
        assert_eq!(count_block_balance(r#"print("{")"#), 0);
        assert_eq!(count_block_balance(r#"print('\'{')"#), 0);
        assert_eq!(count_block_balance("x // {"), 0);
        assert_eq!(count_block_balance("x /* { */ {"), 1);
    }

    #[test]
    fn test_needs_more_input_and_indent() {
        assert!(needs_more_input("class A {\n  fun f() {"));
        assert!(!needs_more_input("var x = 1"));
        assert_eq!(calculate_indent("class A {\n  fun f() {"), 8);
        assert_eq!(calculate_indent("}"), 0);
    }
}
