//! Hearing page text extraction
//!
//! Strips scripts, styles, and markup from a hearing page, keeping anchor
//! targets inline so testimony links survive the flattening.

use scraper::{ElementRef, Html, Node, Selector};

/// Flatten an HTML page to whitespace-normalized text. Anchor targets are
/// appended after the link text as `text (href)`.
pub fn extract_page_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let mut out = String::new();
    let body = Selector::parse("body").ok().and_then(|selector| {
        let mut elements = document.select(&selector);
        elements.next()
    });

    match body {
        Some(body) => collect_text(body, &mut out),
        None => collect_text(document.root_element(), &mut out),
    }

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_text(element: ElementRef, out: &mut String) {
    if matches!(element.value().name(), "script" | "style" | "noscript") {
        return;
    }

    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.push(' ');
                out.push_str(text);
            }
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, out);
                }
            }
            _ => {}
        }
    }

    if element.value().name() == "a" {
        if let Some(href) = element.value().attr("href") {
            out.push_str(&format!(" ({})", href));
        }
    }
}
