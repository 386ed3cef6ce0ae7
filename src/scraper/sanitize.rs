//! Turns a page fragment from the reader endpoint into plain text.
//!
//! The site interleaves the real text with `<span>` wrappers and `<i>` watermark runs whose
//! text must not reach the output. Everything else contributes its text in document order.

use scraper::{ElementRef, Html, Node};

/// Elements dropped together with everything inside them.
const STRIPPED_TAGS: &[&str] = &["span", "i"];

/// Sanitize one page fragment. Malformed markup is handled by the HTML parser's recovery.
pub fn sanitize_page(fragment: &str) -> String {
    let doc = Html::parse_fragment(fragment);
    let mut out = String::with_capacity(fragment.len());
    collect_text(doc.root_element(), &mut out);
    out
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if STRIPPED_TAGS.contains(&el.name()) => {}
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, out);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_protection_and_watermark_elements() {
        let html = "<p>Real<span>FAKE</span> text<i>junk</i> here</p>";
        assert_eq!(sanitize_page(html), "Real text here");
    }

    #[test]
    fn keeps_text_of_other_elements_in_order() {
        let html = "<p>One <b>two</b></p><p>three <a href=\"#\">four</a></p>";
        assert_eq!(sanitize_page(html), "One twothree four");
    }

    #[test]
    fn nested_junk_inside_stripped_element_is_dropped() {
        let html = "<p>a<span>x<b>y</b><i>z</i></span>b</p>";
        assert_eq!(sanitize_page(html), "ab");
    }

    #[test]
    fn sanitizing_twice_changes_nothing() {
        let html = "<p>Он сказал<span>qq</span>: «Да»<i>litnet.com</i>.</p><p>Next line</p>";
        let once = sanitize_page(html);
        assert_eq!(sanitize_page(&once), once);
    }

    #[test]
    fn decodes_entities_and_skips_comments() {
        assert_eq!(sanitize_page("<p>a &amp; b<!-- note --></p>"), "a & b");
    }

    #[test]
    fn unclosed_tags_degrade_to_text() {
        assert_eq!(sanitize_page("<p>open <b>bold"), "open bold");
    }

    #[test]
    fn empty_fragment_is_empty_text() {
        assert_eq!(sanitize_page(""), "");
    }
}
