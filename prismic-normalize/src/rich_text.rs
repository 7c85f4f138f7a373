//! Plain text and HTML rendering of Prismic rich text.
//!
//! Blocks are objects with a `type` (`paragraph`, `heading1`..`heading6`,
//! `preformatted`, `list-item`, `o-list-item`, `image`, `embed`) and, for text
//! blocks, `text` plus `spans`. Span offsets index characters of `text`.

use crate::options::{HtmlElement, HtmlSerializer};
use serde_json::Value;

/// Resolves the URL of a document link found in a span or image.
pub type ResolveLink<'a> = &'a dyn Fn(&Value) -> Option<String>;

/// Plain text of all blocks, joined with a single space.
pub fn as_text(blocks: &[Value]) -> String {
    blocks
        .iter()
        .filter_map(|block| block.get("text").and_then(Value::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Renders blocks to HTML.
///
/// Consecutive list items are grouped into one `<ul>` or `<ol>`. The
/// serializer, when given, is asked first for every block, list group and
/// span; a `None` answer falls back to the default markup.
pub fn as_html(
    blocks: &[Value],
    resolve_link: ResolveLink<'_>,
    serializer: Option<&HtmlSerializer>,
) -> String {
    let renderer = Renderer {
        resolve_link,
        serializer,
    };

    let mut html = String::new();
    let mut index = 0;
    while index < blocks.len() {
        let kind = block_type(&blocks[index]);
        match list_group(kind) {
            Some(group) => {
                let start = index;
                while index < blocks.len() && block_type(&blocks[index]) == kind {
                    index += 1;
                }
                html.push_str(&renderer.list(group, &blocks[start..index], start));
            }
            None => {
                html.push_str(&renderer.block(&blocks[index], index));
                index += 1;
            }
        }
    }
    html
}

fn block_type(block: &Value) -> &str {
    block.get("type").and_then(Value::as_str).unwrap_or("")
}

fn list_group(kind: &str) -> Option<&'static str> {
    match kind {
        "list-item" => Some("group-list-item"),
        "o-list-item" => Some("group-o-list-item"),
        _ => None,
    }
}

struct Renderer<'a> {
    resolve_link: ResolveLink<'a>,
    serializer: Option<&'a HtmlSerializer>,
}

impl Renderer<'_> {
    fn custom(&self, kind: &str, node: &Value, children: &str, key: usize) -> Option<String> {
        self.serializer?.serialize(&HtmlElement {
            kind,
            node,
            children,
            key,
        })
    }

    fn list(&self, group: &str, items: &[Value], key: usize) -> String {
        let children: String = items
            .iter()
            .enumerate()
            .map(|(offset, item)| self.block(item, key + offset))
            .collect();

        let node = Value::Array(items.to_vec());
        if let Some(html) = self.custom(group, &node, &children, key) {
            return html;
        }
        match group {
            "group-o-list-item" => format!("<ol>{children}</ol>"),
            _ => format!("<ul>{children}</ul>"),
        }
    }

    fn block(&self, block: &Value, key: usize) -> String {
        let kind = block_type(block);
        let children = self.text_with_spans(block);

        if let Some(html) = self.custom(kind, block, &children, key) {
            return html;
        }

        match kind {
            "heading1" | "heading2" | "heading3" | "heading4" | "heading5" | "heading6" => {
                let level = &kind["heading".len()..];
                format!("<h{level}>{children}</h{level}>")
            }
            "paragraph" => format!("<p>{children}</p>"),
            "preformatted" => format!("<pre>{children}</pre>"),
            "list-item" | "o-list-item" => format!("<li>{children}</li>"),
            "image" => self.image(block),
            "embed" => embed(block),
            _ => String::new(),
        }
    }

    fn image(&self, block: &Value) -> String {
        let attr = |key: &str| escape(block.get(key).and_then(Value::as_str).unwrap_or(""));
        let img = format!(
            r#"<img src="{}" alt="{}" copyright="{}">"#,
            attr("url"),
            attr("alt"),
            attr("copyright"),
        );

        let linked = block
            .get("linkTo")
            .and_then(|link| self.link_url(link).map(|url| (url, link)));
        match linked {
            Some((url, link)) => format!(
                r#"<p class="block-img"><a href="{}"{}>{img}</a></p>"#,
                escape(&url),
                target(link)
            ),
            None => format!(r#"<p class="block-img">{img}</p>"#),
        }
    }

    fn link_url(&self, link: &Value) -> Option<String> {
        match link.get("link_type").and_then(Value::as_str) {
            Some("Document") => (self.resolve_link)(link),
            _ => link.get("url").and_then(Value::as_str).map(str::to_string),
        }
    }

    fn text_with_spans(&self, block: &Value) -> String {
        let Some(text) = block.get("text").and_then(Value::as_str) else {
            return String::new();
        };
        let chars: Vec<char> = text.chars().collect();

        let mut spans: Vec<Span<'_>> = block
            .get("spans")
            .and_then(Value::as_array)
            .map(|spans| spans.iter().filter_map(|s| Span::parse(s, chars.len())).collect())
            .unwrap_or_default();
        sort_spans(&mut spans);

        let mut key = 0;
        self.render_range(&chars, spans, 0, chars.len(), &mut key)
    }

    /// Renders `chars[from..to]` with `spans`, which are sorted and lie
    /// inside the range. A child that runs past its parent is split: the
    /// part inside is nested, the rest is rendered as a sibling.
    fn render_range(
        &self,
        chars: &[char],
        mut spans: Vec<Span<'_>>,
        from: usize,
        to: usize,
        key: &mut usize,
    ) -> String {
        let mut html = String::new();
        let mut cursor = from;

        while !spans.is_empty() {
            let span = spans.remove(0);
            html.push_str(&text_segment(&chars[cursor..span.start]));

            let end = span.end.min(to);
            let split = spans
                .iter()
                .position(|other| other.start >= end)
                .unwrap_or(spans.len());
            let mut rest = spans.split_off(split);

            let mut children = Vec::with_capacity(spans.len());
            for child in spans {
                if child.end > end {
                    children.push(Span { end, ..child });
                    rest.push(Span { start: end, ..child });
                } else {
                    children.push(child);
                }
            }
            sort_spans(&mut rest);
            spans = rest;

            let span_key = *key;
            *key += 1;
            let inner = self.render_range(chars, children, span.start, end, key);
            html.push_str(&self.span(&span, &inner, span_key));

            cursor = end;
        }

        html.push_str(&text_segment(&chars[cursor..to]));
        html
    }

    fn span(&self, span: &Span<'_>, children: &str, key: usize) -> String {
        if let Some(html) = self.custom(span.kind, span.node, children, key) {
            return html;
        }

        match span.kind {
            "strong" => format!("<strong>{children}</strong>"),
            "em" => format!("<em>{children}</em>"),
            "label" => {
                let class = span
                    .node
                    .pointer("/data/label")
                    .and_then(Value::as_str)
                    .unwrap_or("");
                format!(r#"<span class="{}">{children}</span>"#, escape(class))
            }
            "hyperlink" => {
                let data = span.node.get("data").unwrap_or(&Value::Null);
                match self.link_url(data) {
                    Some(url) => format!(r#"<a href="{}"{}>{children}</a>"#, escape(&url), target(data)),
                    None => children.to_string(),
                }
            }
            _ => children.to_string(),
        }
    }
}

#[derive(Clone, Copy)]
struct Span<'a> {
    start: usize,
    end: usize,
    kind: &'a str,
    node: &'a Value,
}

impl<'a> Span<'a> {
    fn parse(node: &'a Value, len: usize) -> Option<Self> {
        let start = usize::try_from(node.get("start")?.as_u64()?).ok()?.min(len);
        let end = usize::try_from(node.get("end")?.as_u64()?).ok()?.min(len);
        let kind = node.get("type")?.as_str()?;
        (start < end).then_some(Span {
            start,
            end,
            kind,
            node,
        })
    }
}

// Outer spans first: earliest start, then longest.
fn sort_spans(spans: &mut [Span<'_>]) {
    spans.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));
}

fn embed(block: &Value) -> String {
    let oembed = block.get("oembed").unwrap_or(&Value::Null);
    let field = |key: &str| oembed.get(key).and_then(Value::as_str).unwrap_or("");
    format!(
        r#"<div data-oembed="{}" data-oembed-type="{}" data-oembed-provider="{}">{}</div>"#,
        escape(field("embed_url")),
        escape(field("type")),
        escape(field("provider_name")),
        field("html"),
    )
}

fn target(link: &Value) -> String {
    match link.get("target").and_then(Value::as_str) {
        Some(target) => format!(r#" target="{}" rel="noopener""#, escape(target)),
        None => String::new(),
    }
}

fn text_segment(chars: &[char]) -> String {
    let text: String = chars.iter().collect();
    escape(&text).replace('\n', "<br />")
}

/// Escapes text for use in HTML content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
