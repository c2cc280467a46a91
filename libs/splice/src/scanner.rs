//! Depth-counting span scanner
//!
//! The lowest-level primitive: given an offset pointing at an opening
//! token, walk forward counting nesting depth until the matching close.
//! The scanner knows nothing about fragments; callers pick the token
//! vocabulary (e.g. `<div ` / `</div>`).

/// Find the offset immediately after the close token that balances the
/// opening token at `start`.
///
/// `start` must point at the first byte of an occurrence of `open_token`.
/// Depth starts at 1 (the opening token is pre-counted) and scanning
/// begins at `start + open_token.len()` so the same token is not matched
/// twice. Tokens are matched by literal substring equality; at each scan
/// position the leftmost occurrence wins.
///
/// Returns `None` if the document ends before depth returns to zero
/// (unbalanced input). The caller decides how to degrade.
pub fn find_matching_close(
    doc: &str,
    start: usize,
    open_token: &str,
    close_token: &str,
) -> Option<usize> {
    debug_assert!(doc[start..].starts_with(open_token));

    let mut depth = 1usize;
    let mut pos = start + open_token.len();

    while depth > 0 {
        let rest = &doc[pos..];
        let next_open = rest.find(open_token);
        let next_close = rest.find(close_token)?;

        match next_open {
            Some(o) if o < next_close => {
                depth += 1;
                pos += o + open_token.len();
            }
            _ => {
                depth -= 1;
                pos += next_close + close_token.len();
            }
        }
    }

    Some(pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_structure() {
        let doc = "<card>hello</card><card>world</card>";
        let end = find_matching_close(doc, 0, "<card>", "</card>").unwrap();
        assert_eq!(&doc[..end], "<card>hello</card>");
    }

    #[test]
    fn test_nested_structure() {
        let doc = r#"<div class="slot"><div class="inner">x</div></div><div>tail</div>"#;
        let end = find_matching_close(doc, 0, "<div", "</div>").unwrap();
        assert_eq!(
            &doc[..end],
            r#"<div class="slot"><div class="inner">x</div></div>"#
        );
    }

    #[test]
    fn test_ignores_tokens_after_true_end() {
        // Unrelated open/close pairs after the balancing close must not
        // affect the result.
        let doc = "<s><s></s></s><s></s>";
        let end = find_matching_close(doc, 0, "<s>", "</s>").unwrap();
        assert_eq!(end, 14);
    }

    #[test]
    fn test_unbalanced_returns_none() {
        let doc = "<card><card></card>";
        assert_eq!(find_matching_close(doc, 0, "<card>", "</card>"), None);
    }

    #[test]
    fn test_start_mid_document() {
        let doc = "junk<card>a</card>more";
        let end = find_matching_close(doc, 4, "<card>", "</card>").unwrap();
        assert_eq!(&doc[4..end], "<card>a</card>");
    }
}
