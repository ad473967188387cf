//! Repairs for the recurring defects in generated presentation markup.
//!
//! Every pass is idempotent, so sanitizing already-sanitized markup changes
//! nothing. The output is still not guaranteed to be well-formed.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

/// Named entities that survive ampersand replacement.
static ENTITY_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"&[a-zA-Z]+;").unwrap());

/// A single tag, without nested angle brackets.
static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<([^<>]*)>").unwrap());

/// Sanitize raw markup before any parse attempt.
///
/// - Drops leading `<?xml ...?>` declarations
/// - Normalizes double quotes to single quotes
/// - Replaces `&` with the word "and" (lossy for literal ampersands)
/// - Strips remaining `&word;` entities
/// - Removes an unmatched quote right before a tag's closing bracket
///
/// Never fails.
pub fn sanitize(raw: &str) -> String {
    let markup = strip_prolog(raw);
    let markup = markup.replace('"', "'");
    let markup = markup.replace('&', "and");
    let markup = ENTITY_REGEX.replace_all(&markup, "");
    let markup = repair_stray_quotes(&markup);

    log::trace!("sanitized {} bytes into {} bytes", raw.len(), markup.len());

    markup.trim().to_string()
}

/// Drop every leading XML declaration.
fn strip_prolog(raw: &str) -> &str {
    let mut markup = raw.trim_start();

    while markup.starts_with("<?xml") {
        markup = match markup.find("?>") {
            Some(end) => &markup[end + 2..],
            None => match markup.find('\n') {
                Some(end) => &markup[end + 1..],
                None => "",
            },
        };
        markup = markup.trim_start();
    }

    markup
}

/// Remove a quote sitting right before `>` or `/>` when the tag has an odd
/// number of quotes.
fn repair_stray_quotes(markup: &str) -> Cow<'_, str> {
    TAG_REGEX.replace_all(markup, |caps: &Captures| {
        let inner = &caps[1];
        let (body, slash) = match inner.strip_suffix('/') {
            Some(body) => (body, "/"),
            None => (inner, ""),
        };
        let trimmed = body.trim_end();

        if trimmed.ends_with('\'') && trimmed.matches('\'').count() % 2 == 1 {
            format!(
                "<{}{}{}>",
                &trimmed[..trimmed.len() - 1],
                &body[trimmed.len()..],
                slash
            )
        } else {
            caps[0].to_string()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_drops_declaration_line() {
        let raw = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<PRESENTATION></PRESENTATION>";
        assert_eq!(sanitize(raw), "<PRESENTATION></PRESENTATION>");
    }

    #[test]
    fn test_drops_declaration_on_same_line() {
        let raw = "<?xml version='1.0'?><SECTION layout='left'></SECTION>";
        assert_eq!(sanitize(raw), "<SECTION layout='left'></SECTION>");
    }

    #[test]
    fn test_drops_repeated_declarations() {
        let raw = "  <?xml version='1.0'?>\n<?xml version='1.0'?>\n<A/>";
        assert_eq!(sanitize(raw), "<A/>");
    }

    #[test]
    fn test_normalizes_double_quotes() {
        assert_eq!(
            sanitize(r#"<SECTION layout="right"><IMG query="ocean"/></SECTION>"#),
            "<SECTION layout='right'><IMG query='ocean'/></SECTION>"
        );
    }

    #[test]
    fn test_replaces_ampersand() {
        assert_eq!(
            sanitize("<P>Research & Development</P>"),
            "<P>Research and Development</P>"
        );
    }

    #[test]
    fn test_repairs_stray_quote_before_close() {
        assert_eq!(
            sanitize("<IMG query='team meeting''/>"),
            "<IMG query='team meeting'/>"
        );
        assert_eq!(
            sanitize(r#"<SECTION layout="left""><H1>Hi</H1></SECTION>"#),
            "<SECTION layout='left'><H1>Hi</H1></SECTION>"
        );
        assert_eq!(sanitize("<IMG query='x'' />"), "<IMG query='x' />");
    }

    #[test]
    fn test_leaves_balanced_quotes_alone() {
        let markup = "<TD type='label'><VALUE>Q1</VALUE></TD>";
        assert_eq!(sanitize(markup), markup);
    }

    #[test]
    fn test_apostrophes_in_text_untouched() {
        assert_eq!(sanitize("<P>Don't stop</P>"), "<P>Don't stop</P>");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize("   \n"), "");
    }

    #[rstest]
    #[case("")]
    #[case("<?xml version=\"1.0\"?>\n<PRESENTATION><SECTION layout=\"left\"></SECTION></PRESENTATION>")]
    #[case("<P>Fish & Chips &amp; more &nbsp;</P>")]
    #[case("<IMG query=\"a\"\"/><DIV class='x''>text</DIV>")]
    #[case("<?xml a?><?xml b?>  <X y='1''>&&;</X>  ")]
    #[case("no markup at all \" ' & <")]
    fn test_sanitize_is_idempotent(#[case] raw: &str) {
        let once = sanitize(raw);
        assert_eq!(sanitize(&once), once);
    }
}
