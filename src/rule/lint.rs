// Copyright (c) 2025-2026 the rulegate contributors
// SPDX-License-Identifier: Apache-2.0

//! Load-time lint for trigger patterns.
//!
//! Rule authors write regular expressions as data, so pathological patterns
//! are a data-validation problem, not a code-review problem. This lint
//! conservatively rejects nested unbounded quantifiers (an unbounded `*`,
//! `+`, or `{n,}` applied to a group that already contains one), the classic
//! catastrophic-backtracking shape. The check is structural and may reject a
//! few harmless patterns; it never accepts a nested-unbounded one.

/// Check one pattern, returning a human-readable rejection reason.
pub fn check_pattern(pattern: &str) -> Result<(), String> {
    let mut chars = pattern.char_indices().peekable();

    // One flag per open group (index 0 is the top level): does this group
    // contain an unbounded quantifier anywhere inside it?
    let mut group_has_unbounded: Vec<bool> = vec![false];
    // Set when the previous atom was a group whose interior is unbounded.
    let mut prev_group_unbounded = false;

    while let Some((idx, ch)) = chars.next() {
        match ch {
            '\\' => {
                // Escaped character is an ordinary atom.
                chars.next();
                prev_group_unbounded = false;
            }
            '[' => {
                skip_char_class(&mut chars);
                prev_group_unbounded = false;
            }
            '(' => {
                group_has_unbounded.push(false);
                prev_group_unbounded = false;
            }
            ')' => {
                let inner = group_has_unbounded.pop().unwrap_or(false);
                if group_has_unbounded.is_empty() {
                    group_has_unbounded.push(false);
                }
                // Propagate so an enclosing group counts as unbounded too,
                // e.g. the outer quantifier in `((a+)b)+` is still nested.
                if inner {
                    mark_unbounded(&mut group_has_unbounded);
                }
                prev_group_unbounded = inner;
            }
            '*' | '+' => {
                if prev_group_unbounded {
                    return Err(format!(
                        "unbounded quantifier at byte {idx} applies to a group that \
                         already contains an unbounded quantifier"
                    ));
                }
                mark_unbounded(&mut group_has_unbounded);
                prev_group_unbounded = false;
            }
            '{' => {
                if consume_brace_quantifier(&mut chars) {
                    if prev_group_unbounded {
                        return Err(format!(
                            "open-ended repetition at byte {idx} applies to a group \
                             that already contains an unbounded quantifier"
                        ));
                    }
                    mark_unbounded(&mut group_has_unbounded);
                }
                prev_group_unbounded = false;
            }
            _ => {
                prev_group_unbounded = false;
            }
        }
    }

    Ok(())
}

/// Record that the innermost open group (or the top level) is unbounded.
fn mark_unbounded(group_has_unbounded: &mut [bool]) {
    if let Some(flag) = group_has_unbounded.last_mut() {
        *flag = true;
    }
}

/// Advance past a `[...]` character class, honoring escapes.
fn skip_char_class(chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>) {
    // A leading `]` is a literal member, e.g. `[]a]`.
    if let Some(&(_, ']')) = chars.peek() {
        chars.next();
    }
    while let Some((_, ch)) = chars.next() {
        match ch {
            '\\' => {
                chars.next();
            }
            ']' => break,
            _ => {}
        }
    }
}

/// Consume a `{...}` repetition, returning true when it is open-ended
/// (`{n,}`). `{n}` and `{n,m}` are bounded; a malformed brace is treated as
/// a literal and left bounded.
fn consume_brace_quantifier(chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>) -> bool {
    let mut body = String::new();
    for (_, ch) in chars.by_ref() {
        if ch == '}' {
            return body.ends_with(',') && body.chars().filter(|c| *c == ',').count() == 1;
        }
        body.push(ch);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_ordinary_patterns() {
        for pattern in [
            r"fn\s+\w+\s*\(",
            r"(?i)select\b.*\+",
            r"(?:if|while)\s*\([^)]{0,200}\)",
            r"(a+b)c*",
            r"(a{2,5})+",
        ] {
            assert!(check_pattern(pattern).is_ok(), "rejected: {pattern}");
        }
    }

    #[test]
    fn test_rejects_nested_star_plus() {
        assert!(check_pattern(r"(a+)+").is_err());
        assert!(check_pattern(r"(a*)*").is_err());
        assert!(check_pattern(r"(\w+)*suffix").is_err());
        // Nesting through an intermediate group is still nesting.
        assert!(check_pattern(r"((a+)b)+").is_err());
    }

    #[test]
    fn test_rejects_open_ended_brace_over_unbounded_group() {
        assert!(check_pattern(r"(a+){2,}").is_err());
    }

    #[test]
    fn test_bounded_brace_over_unbounded_group_is_fine() {
        assert!(check_pattern(r"(a+){2,5}").is_ok());
        assert!(check_pattern(r"(a+){3}").is_ok());
    }

    #[test]
    fn test_quantified_class_inside_quantified_group() {
        assert!(check_pattern(r"([a-z]+)+").is_err());
        assert!(check_pattern(r"([a-z]+)").is_ok());
    }

    #[test]
    fn test_escapes_and_classes_are_not_groups() {
        assert!(check_pattern(r"\(+").is_ok());
        assert!(check_pattern(r"[(+*]+").is_ok());
    }
}
