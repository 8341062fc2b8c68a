//! Visible-text extraction (an approximation of `innerText`)

use super::StaticSelector;
use scraper::node::Element;
use scraper::{Html, Node};

static BODY: StaticSelector = StaticSelector::new("body");

/// Elements whose content is never rendered as text
const NON_RENDERED: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Elements that break words apart the way a line break would
const BLOCK_LEVEL: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main",
    "nav", "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

enum Step<N> {
    Visit(N),
    Break,
}

pub(super) fn visible_text(html: &Html) -> String {
    let Some(selector) = BODY.get() else {
        return String::new();
    };
    let Some(body) = html.select(selector).next() else {
        return String::new();
    };

    // Iterative walk; deeply nested markup must not blow the stack.
    let mut out = String::new();
    let mut stack = vec![Step::Visit(*body)];
    while let Some(step) = stack.pop() {
        let node = match step {
            Step::Visit(node) => node,
            Step::Break => {
                out.push(' ');
                continue;
            }
        };
        match node.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => {
                if !is_rendered(element) {
                    continue;
                }
                if BLOCK_LEVEL.contains(&element.name()) {
                    out.push(' ');
                    stack.push(Step::Break);
                }
                for child in node.children().rev() {
                    stack.push(Step::Visit(child));
                }
            }
            _ => {}
        }
    }
    out
}

fn is_rendered(element: &Element) -> bool {
    !NON_RENDERED.contains(&element.name())
        && element.attr("hidden").is_none()
        && element.attr("aria-hidden") != Some("true")
}
