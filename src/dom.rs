//! Markup parser – converts preview markup into a simple DOM tree.
//!
//! The preview renderer emits a controlled subset of elements:
//! - Structural: div, p, h1-h3, ul, li, pre
//! - Inline: span, a
//! - Styling via `class` and `style` attributes; `id` marks the content node
//!   the export pipeline isolates.

use std::collections::HashMap;

// ---------------------------------------------------------------------------
// DOM types
// ---------------------------------------------------------------------------

/// The tag name of a supported element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    Div,
    P,
    H1,
    H2,
    H3,
    Ul,
    Li,
    Span,
    A,
    Pre,
    /// Unknown tags are kept in the tree but rendered as display:none.
    Unknown(String),
}

impl Tag {
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "div" => Tag::Div,
            "p" => Tag::P,
            "h1" => Tag::H1,
            "h2" => Tag::H2,
            "h3" => Tag::H3,
            "ul" => Tag::Ul,
            "li" => Tag::Li,
            "span" => Tag::Span,
            "a" => Tag::A,
            "pre" => Tag::Pre,
            _ => Tag::Unknown(s.to_string()),
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, Tag::Span | Tag::A)
    }
}

/// A node in the DOM tree.
#[derive(Debug, Clone)]
pub enum DomNode {
    Element(ElementNode),
    Text(String),
}

/// An element node carrying tag, attributes, and children.
#[derive(Debug, Clone)]
pub struct ElementNode {
    pub tag: Tag,
    pub attributes: HashMap<String, String>,
    pub children: Vec<DomNode>,
}

impl ElementNode {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            attributes: HashMap::new(),
            children: Vec::new(),
        }
    }

    pub fn classes(&self) -> Vec<&str> {
        self.attributes
            .get("class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }

    pub fn id(&self) -> Option<&str> {
        self.attributes.get("id").map(|s| s.as_str())
    }

    pub fn inline_style(&self) -> Option<&str> {
        self.attributes.get("style").map(|s| s.as_str())
    }
}

// ---------------------------------------------------------------------------
// Parser – recursive descent over the controlled markup subset
// ---------------------------------------------------------------------------

/// Parse a markup string into a list of DOM nodes.
///
/// A hand-written parser is sufficient here: the input is always produced by
/// the preview renderer, never arbitrary documents from the wild.
pub fn parse_markup(markup: &str) -> Vec<DomNode> {
    let mut parser = Parser {
        input: markup,
        pos: 0,
    };
    parser.parse_nodes()
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn parse_nodes(&mut self) -> Vec<DomNode> {
        let mut nodes = Vec::new();
        loop {
            self.skip_inter_element_whitespace();
            if self.eof() || self.starts_with("</") {
                break;
            }
            if let Some(node) = self.parse_node() {
                nodes.push(node);
            }
        }
        nodes
    }

    fn parse_node(&mut self) -> Option<DomNode> {
        if self.starts_with("<!--") {
            self.advance(4);
            while !self.eof() && !self.starts_with("-->") {
                self.advance(1);
            }
            if !self.eof() {
                self.advance(3);
            }
            return None;
        }
        if self.starts_with("<!") || self.starts_with("<?") {
            while !self.eof() && !self.starts_with(">") {
                self.advance(1);
            }
            if !self.eof() {
                self.advance(1);
            }
            return None;
        }
        if self.starts_with("<") {
            Some(self.parse_element())
        } else {
            Some(self.parse_text())
        }
    }

    fn parse_text(&mut self) -> DomNode {
        let start = self.pos;
        while !self.eof() && !self.starts_with("<") {
            self.advance(1);
        }
        DomNode::Text(decode_entities(&self.input[start..self.pos]))
    }

    fn parse_element(&mut self) -> DomNode {
        self.advance(1); // '<'
        let name = self.parse_name();
        let mut elem = ElementNode::new(Tag::parse(&name));

        loop {
            self.skip_whitespace();
            if self.eof() || self.starts_with(">") || self.starts_with("/>") {
                break;
            }
            let (key, value) = self.parse_attribute();
            elem.attributes.insert(key, value);
        }

        if self.starts_with("/>") {
            self.advance(2);
            return DomNode::Element(elem);
        }
        if self.starts_with(">") {
            self.advance(1);
        }

        elem.children = self.parse_nodes();

        if self.starts_with("</") {
            self.advance(2);
            self.parse_name();
            self.skip_whitespace();
            if self.starts_with(">") {
                self.advance(1);
            }
        }

        DomNode::Element(elem)
    }

    fn parse_name(&mut self) -> String {
        let start = self.pos;
        while !self.eof() {
            let c = self.current_char();
            if c.is_alphanumeric() || c == '-' || c == '_' {
                self.advance(1);
            } else {
                break;
            }
        }
        self.input[start..self.pos].to_string()
    }

    fn parse_attribute(&mut self) -> (String, String) {
        let key = self.parse_name();
        self.skip_whitespace();
        if !self.starts_with("=") {
            return (key, String::new());
        }
        self.advance(1);
        self.skip_whitespace();
        let value = match self.current_char() {
            quote @ ('"' | '\'') => {
                self.advance(1);
                let start = self.pos;
                while !self.eof() && self.current_char() != quote {
                    self.advance(1);
                }
                let val = self.input[start..self.pos].to_string();
                if !self.eof() {
                    self.advance(1);
                }
                val
            }
            _ => {
                let start = self.pos;
                while !self.eof() {
                    let c = self.current_char();
                    if c.is_whitespace() || c == '>' || c == '/' {
                        break;
                    }
                    self.advance(1);
                }
                self.input[start..self.pos].to_string()
            }
        };
        (key, decode_entities(&value))
    }

    fn skip_whitespace(&mut self) {
        while !self.eof() && self.current_char().is_whitespace() {
            self.advance(1);
        }
    }

    /// Skip whitespace runs between elements, but keep whitespace that is
    /// part of mixed text content.
    fn skip_inter_element_whitespace(&mut self) {
        let saved = self.pos;
        self.skip_whitespace();
        if !self.eof() && !self.starts_with("<") {
            self.pos = saved;
        }
    }

    fn starts_with(&self, s: &str) -> bool {
        self.input[self.pos..].starts_with(s)
    }

    fn eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn current_char(&self) -> char {
        self.input[self.pos..].chars().next().unwrap()
    }

    fn advance(&mut self, n: usize) {
        for _ in 0..n {
            if let Some(c) = self.input[self.pos..].chars().next() {
                self.pos += c.len_utf8();
            }
        }
    }
}

fn decode_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", "\u{00A0}")
        .replace("&amp;", "&")
}

// ---------------------------------------------------------------------------
// Tree queries
// ---------------------------------------------------------------------------

/// Depth-first search for the element carrying `id`.
pub fn find_by_id<'a>(nodes: &'a [DomNode], id: &str) -> Option<&'a ElementNode> {
    for node in nodes {
        if let DomNode::Element(e) = node {
            if e.id() == Some(id) {
                return Some(e);
            }
            if let Some(found) = find_by_id(&e.children, id) {
                return Some(found);
            }
        }
    }
    None
}

/// Collect every distinct class name used in a subtree, in first-seen order.
pub fn collect_classes(nodes: &[DomNode]) -> Vec<String> {
    let mut seen = Vec::new();
    fn walk(nodes: &[DomNode], seen: &mut Vec<String>) {
        for node in nodes {
            if let DomNode::Element(e) = node {
                for class in e.classes() {
                    if !seen.iter().any(|s| s == class) {
                        seen.push(class.to_string());
                    }
                }
                walk(&e.children, seen);
            }
        }
    }
    walk(nodes, &mut seen);
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_nested_structure() {
        let markup = r#"<div class="flex justify-between"><span class="font-bold">Acme</span><span>2021</span></div>"#;
        let nodes = parse_markup(markup);
        assert_eq!(nodes.len(), 1);
        let DomNode::Element(div) = &nodes[0] else {
            panic!("expected element");
        };
        assert_eq!(div.tag, Tag::Div);
        assert_eq!(div.classes(), vec!["flex", "justify-between"]);
        assert_eq!(div.children.len(), 2);
    }

    #[test]
    fn parse_anchor_attributes() {
        let nodes = parse_markup(r#"<a href="https://example.com" class="underline">site</a>"#);
        let DomNode::Element(a) = &nodes[0] else {
            panic!("expected element");
        };
        assert_eq!(a.tag, Tag::A);
        assert_eq!(
            a.attributes.get("href").map(String::as_str),
            Some("https://example.com")
        );
    }

    #[test]
    fn entities_decode_in_text() {
        let nodes = parse_markup("<p>Fish &amp; Chips &lt;Co&gt;</p>");
        let DomNode::Element(p) = &nodes[0] else {
            panic!("expected element");
        };
        let DomNode::Text(t) = &p.children[0] else {
            panic!("expected text");
        };
        assert_eq!(t, "Fish & Chips <Co>");
    }

    #[test]
    fn find_by_id_descends() {
        let markup = r#"<div><div id="inner"><p>x</p></div></div>"#;
        let nodes = parse_markup(markup);
        let found = find_by_id(&nodes, "inner").expect("should find inner node");
        assert_eq!(found.tag, Tag::Div);
        assert!(find_by_id(&nodes, "missing").is_none());
    }

    #[test]
    fn collect_classes_deduplicates() {
        let markup = r#"<div class="mb-2"><p class="text-sm mb-2">x</p></div>"#;
        let nodes = parse_markup(markup);
        assert_eq!(collect_classes(&nodes), vec!["mb-2", "text-sm"]);
    }
}
