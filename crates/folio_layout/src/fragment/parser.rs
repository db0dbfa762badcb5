//! HTML-like markup parser for rich text
//!
//! Parses a subset of HTML into a `RichNode` tree: elements with an optional
//! `class` attribute, text runs, and the common character entities. Unknown
//! closing tags are ignored and unclosed elements are closed at the end.

use super::RichNode;

/// Parse markup into a list of top-level nodes
pub fn parse(markup: &str) -> Vec<RichNode> {
    let mut parser = Parser::new(markup);
    parser.parse();
    parser.finish()
}

/// Tag with optional attributes
#[derive(Debug)]
struct Tag {
    name: String,
    is_closing: bool,
    is_self_closing: bool,
    attrs: Vec<(String, String)>,
}

/// An element still waiting for its closing tag
struct OpenElement {
    tag: String,
    class: Option<String>,
    children: Vec<RichNode>,
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    /// Text accumulated since the last tag
    text: String,
    root: Vec<RichNode>,
    stack: Vec<OpenElement>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            text: String::new(),
            root: Vec::new(),
            stack: Vec::new(),
        }
    }

    fn parse(&mut self) {
        while self.pos < self.input.len() {
            if self.peek() == Some('<') {
                if let Some(tag) = self.try_parse_tag() {
                    self.flush_text();
                    self.handle_tag(tag);
                    continue;
                }
            }

            if self.peek() == Some('&') {
                if let Some(decoded) = self.try_parse_entity() {
                    self.text.push_str(&decoded);
                    continue;
                }
            }

            // Regular character
            if let Some(ch) = self.next_char() {
                self.text.push(ch);
            }
        }
        self.flush_text();
    }

    fn finish(mut self) -> Vec<RichNode> {
        // Close any remaining open elements
        while !self.stack.is_empty() {
            self.close_top();
        }
        self.root
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.input[self.pos..].chars().next()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn children_mut(&mut self) -> &mut Vec<RichNode> {
        match self.stack.last_mut() {
            Some(open) => &mut open.children,
            None => &mut self.root,
        }
    }

    fn flush_text(&mut self) {
        if self.text.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.text);
        self.children_mut().push(RichNode::Text(text));
    }

    fn close_top(&mut self) {
        if let Some(open) = self.stack.pop() {
            let node = RichNode::Element {
                tag: open.tag,
                class: open.class,
                children: open.children,
            };
            self.children_mut().push(node);
        }
    }

    fn try_parse_tag(&mut self) -> Option<Tag> {
        let start = self.pos;

        // Must start with <
        if self.next_char()? != '<' {
            self.pos = start;
            return None;
        }

        // Check for closing tag
        let is_closing = if self.peek() == Some('/') {
            self.next_char();
            true
        } else {
            false
        };

        // Parse tag name
        let name_start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '-' || ch == '_' {
                self.next_char();
            } else {
                break;
            }
        }

        let name = self.input[name_start..self.pos].to_lowercase();
        if name.is_empty() {
            self.pos = start;
            return None;
        }

        self.skip_whitespace();

        // Parse attributes (for opening tags)
        let mut attrs = Vec::new();
        if !is_closing {
            while let Some((key, value)) = self.try_parse_attribute() {
                attrs.push((key, value));
                self.skip_whitespace();
            }
        }

        self.skip_whitespace();

        // Handle self-closing />
        let is_self_closing = if self.peek() == Some('/') {
            self.next_char();
            true
        } else {
            false
        };

        if self.peek() != Some('>') {
            self.pos = start;
            return None;
        }
        self.next_char(); // consume >

        Some(Tag {
            name,
            is_closing,
            is_self_closing,
            attrs,
        })
    }

    fn try_parse_attribute(&mut self) -> Option<(String, String)> {
        let start = self.pos;

        let name_start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '-' || ch == '_' {
                self.next_char();
            } else {
                break;
            }
        }

        let name = self.input[name_start..self.pos].to_lowercase();
        if name.is_empty() {
            self.pos = start;
            return None;
        }

        self.skip_whitespace();

        // Expect =
        if self.peek() != Some('=') {
            self.pos = start;
            return None;
        }
        self.next_char();

        self.skip_whitespace();

        // Parse value (quoted)
        let quote = match self.peek() {
            Some(q @ ('"' | '\'')) => q,
            _ => {
                self.pos = start;
                return None;
            }
        };
        self.next_char();

        let value_start = self.pos;
        while let Some(ch) = self.peek() {
            if ch == quote {
                break;
            }
            self.next_char();
        }

        let value = self.input[value_start..self.pos].to_string();

        // Consume closing quote
        if self.peek() == Some(quote) {
            self.next_char();
        }

        Some((name, value))
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.next_char();
            } else {
                break;
            }
        }
    }

    fn try_parse_entity(&mut self) -> Option<String> {
        let start = self.pos;

        if self.next_char()? != '&' {
            self.pos = start;
            return None;
        }

        // Numeric entity
        if self.peek() == Some('#') {
            self.next_char();
            let is_hex = if self.peek() == Some('x') || self.peek() == Some('X') {
                self.next_char();
                true
            } else {
                false
            };

            let num_start = self.pos;
            while let Some(ch) = self.peek() {
                if (is_hex && ch.is_ascii_hexdigit()) || (!is_hex && ch.is_ascii_digit()) {
                    self.next_char();
                } else {
                    break;
                }
            }

            let num_str = &self.input[num_start..self.pos];
            if num_str.is_empty() {
                self.pos = start;
                return None;
            }

            if self.peek() == Some(';') {
                self.next_char();
            }

            let code = if is_hex {
                u32::from_str_radix(num_str, 16).ok()
            } else {
                num_str.parse::<u32>().ok()
            };

            return match code.and_then(char::from_u32) {
                Some(c) => Some(c.to_string()),
                None => {
                    self.pos = start;
                    None
                }
            };
        }

        // Named entity
        let name_start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() {
                self.next_char();
            } else {
                break;
            }
        }

        let name = &self.input[name_start..self.pos];

        let decoded = match name {
            "lt" => "<",
            "gt" => ">",
            "amp" => "&",
            "quot" => "\"",
            "apos" => "'",
            "nbsp" => "\u{00A0}",
            "copy" => "\u{00A9}",
            "mdash" => "\u{2014}",
            "ndash" => "\u{2013}",
            "hellip" => "\u{2026}",
            "lsquo" => "\u{2018}",
            "rsquo" => "\u{2019}",
            "ldquo" => "\u{201C}",
            "rdquo" => "\u{201D}",
            "bull" => "\u{2022}",
            "middot" => "\u{00B7}",
            _ => {
                self.pos = start;
                return None;
            }
        };

        if self.peek() == Some(';') {
            self.next_char();
        }

        Some(decoded.to_string())
    }

    fn handle_tag(&mut self, tag: Tag) {
        if tag.is_closing {
            self.handle_closing_tag(&tag.name);
            return;
        }

        let class = tag
            .attrs
            .into_iter()
            .find(|(k, _)| k == "class" || k == "classname")
            .map(|(_, v)| v);

        if tag.is_self_closing || is_void(&tag.name) {
            let node = RichNode::Element {
                tag: tag.name,
                class,
                children: Vec::new(),
            };
            self.children_mut().push(node);
            return;
        }

        self.stack.push(OpenElement {
            tag: tag.name,
            class,
            children: Vec::new(),
        });
    }

    fn handle_closing_tag(&mut self, name: &str) {
        // Find matching opening element; stray closers are ignored
        let Some(depth) = self.stack.iter().rposition(|open| open.tag == name) else {
            tracing::trace!(tag = name, "ignoring unmatched closing tag");
            return;
        };
        while self.stack.len() > depth {
            self.close_top();
        }
    }
}

fn is_void(name: &str) -> bool {
    matches!(name, "br" | "img" | "hr" | "wbr")
}
