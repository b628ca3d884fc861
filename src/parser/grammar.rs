//! Parser implementation using chumsky

use std::collections::HashMap;

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::parser::ast::*;
use crate::parser::lexer::{Span, Token};

/// How the scanner treats a registered tag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagSpec {
    /// Only recognise the tag when nothing but whitespace shares its line.
    /// A recognised own-line tag swallows its whole line, newline included.
    pub own_line: bool,
}

impl TagSpec {
    pub fn inline() -> Self {
        Self { own_line: false }
    }

    pub fn own_line() -> Self {
        Self { own_line: true }
    }
}

/// Parse markup source into a document of text runs and registered tags
///
/// Tags whose name is not in `tags` are plain text. Inside the body of a
/// paired tag everything up to the matching closing tag is raw text.
pub fn parse(input: &str, tags: &HashMap<String, TagSpec>) -> Result<Document, Vec<crate::ParseError>> {
    let len = input.len();

    let token_iter = recognise(input, tags)
        .into_iter()
        .map(|(tok, span)| (tok, span.into()));

    // Turn the token iterator into a stream that chumsky can use
    let token_stream = Stream::from_iter(token_iter)
        // Split (Token, SimpleSpan) into token and span parts
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    document_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

/// Demote everything the scanner should not treat as a tag to text
fn recognise(input: &str, tags: &HashMap<String, TagSpec>) -> Vec<(Token, Span)> {
    let mut out: Vec<(Token, Span)> = Vec::new();
    // Name of the paired tag whose raw body is being read
    let mut open: Option<String> = None;
    // End of the last own-line tag, including its newline
    let mut consumed = 0;

    for (tok, mut span) in crate::parser::lexer::lex(input) {
        if span.start < consumed {
            span.start = consumed.min(span.end);
            if span.is_empty() {
                continue;
            }
        }

        if let Some(name) = &open {
            if matches!(&tok, Token::EndTag(n) if n == name) {
                open = None;
                out.push((tok, span));
            } else {
                out.push((Token::Text, span));
            }
            continue;
        }

        match tok {
            Token::StartTag(head) => match tags.get(&head.name) {
                None => out.push((Token::Text, span)),
                Some(spec) if spec.own_line => match own_line_extent(input, &span) {
                    Some(line) => {
                        if let Some(last) = out.last_mut() {
                            if last.1.end > line.start {
                                last.1.end = line.start;
                            }
                            if last.1.is_empty() {
                                out.pop();
                            }
                        }
                        consumed = line.end;
                        if !head.self_closing {
                            open = Some(head.name.clone());
                        }
                        out.push((Token::StartTag(head), line));
                    }
                    None => out.push((Token::Text, span)),
                },
                Some(_) => {
                    if !head.self_closing {
                        open = Some(head.name.clone());
                    }
                    out.push((Token::StartTag(head), span));
                }
            },
            Token::EndTag(name) if !tags.contains_key(&name) => out.push((Token::Text, span)),
            other => out.push((other, span)),
        }
    }

    out
}

/// The full line holding `span`, if nothing but blanks shares that line
fn own_line_extent(input: &str, span: &Span) -> Option<Span> {
    let line_start = input[..span.start].rfind('\n').map(|i| i + 1).unwrap_or(0);
    if !input[line_start..span.start].chars().all(|c| c == ' ' || c == '\t') {
        return None;
    }

    let rest = &input[span.end..];
    let (tail, newline) = match rest.find('\n') {
        Some(i) => (&rest[..i], 1),
        None => (rest, 0),
    };
    if !tail.chars().all(|c| c == ' ' || c == '\t' || c == '\r') {
        return None;
    }

    Some(line_start..span.end + tail.len() + newline)
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

fn document_parser<'a, I>() -> impl Parser<'a, I, Document, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let text = select! {
        Token::Text => Node::Text,
    }
    .map_with(|node, e| Spanned::new(node, span_range(&e.span())));

    // <name attr="..."/>
    let empty_tag = select! {
        Token::StartTag(head) if head.self_closing => head,
    }
    .map_with(|head, e| {
        Spanned::new(
            Node::Tag(TagNode {
                name: head.name,
                attributes: head.attributes,
                body: None,
            }),
            span_range(&e.span()),
        )
    });

    // <name attr="...">raw body</name>
    let open_tag = select! {
        Token::StartTag(head) if !head.self_closing => head,
    }
    .map_with(|head, e| (head, span_range(&e.span())));

    let close_tag = select! {
        Token::EndTag(name) => name,
    }
    .map_with(|name, e| (name, span_range(&e.span())));

    let raw_body = select! { Token::Text => () }.repeated().collect::<Vec<_>>();

    let paired_tag = open_tag
        .then_ignore(raw_body)
        .then(close_tag)
        .try_map(|((head, open), (close, close_span)), span: SimpleSpan| {
            if head.name != close {
                return Err(Rich::custom(
                    span,
                    format!("<{}> is closed by </{}>", head.name, close),
                ));
            }
            Ok(Spanned::new(
                Node::Tag(TagNode {
                    name: head.name,
                    attributes: head.attributes,
                    body: Some(open.end..close_span.start),
                }),
                open.start..close_span.end,
            ))
        });

    choice((text, empty_tag, paired_tag))
        .repeated()
        .collect()
        .then_ignore(end())
        .map(|nodes| Document { nodes })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glossary_tags() -> HashMap<String, TagSpec> {
        let mut tags = HashMap::new();
        tags.insert("define".to_string(), TagSpec::inline());
        tags.insert("definition".to_string(), TagSpec::inline());
        tags.insert("defdepend".to_string(), TagSpec::own_line());
        tags
    }

    fn tag(doc: &Document, index: usize) -> &TagNode {
        match &doc.nodes[index].node {
            Node::Tag(t) => t,
            other => panic!("Expected tag, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_text_only() {
        let doc = parse("Hello world\n", &glossary_tags()).expect("Should parse");
        assert_eq!(doc.nodes.len(), 1);
        assert_eq!(doc.nodes[0], Spanned::new(Node::Text, 0..12));
    }

    #[test]
    fn test_parse_self_closing_define() {
        let src = r#"A <define link="word"/> here"#;
        let doc = parse(src, &glossary_tags()).expect("Should parse");
        assert_eq!(doc.nodes.len(), 3);
        let t = tag(&doc, 1);
        assert_eq!(t.name, "define");
        assert_eq!(t.attribute("link"), Some("word"));
        assert_eq!(t.body, None);
        assert_eq!(&src[doc.nodes[1].span.clone()], r#"<define link="word"/>"#);
    }

    #[test]
    fn test_parse_paired_tag_body_span() {
        let src = r#"<definition name="word">hello there</definition>"#;
        let doc = parse(src, &glossary_tags()).expect("Should parse");
        assert_eq!(doc.nodes.len(), 1);
        let t = tag(&doc, 0);
        let body = t.body.clone().expect("Should have body");
        assert_eq!(&src[body], "hello there");
        assert_eq!(doc.nodes[0].span, 0..src.len());
    }

    #[test]
    fn test_parse_empty_body() {
        let src = r#"<define link="word"></define>"#;
        let doc = parse(src, &glossary_tags()).expect("Should parse");
        let body = tag(&doc, 0).body.clone().expect("Should have body");
        assert!(body.is_empty());
    }

    #[test]
    fn test_nested_tags_in_body_stay_raw() {
        let src = r#"<definition name="a">see <define link="b">x</define> too</definition>"#;
        let doc = parse(src, &glossary_tags()).expect("Should parse");
        assert_eq!(doc.nodes.len(), 1);
        let body = tag(&doc, 0).body.clone().unwrap();
        assert_eq!(&src[body], r#"see <define link="b">x</define> too"#);
    }

    #[test]
    fn test_unregistered_tags_are_text() {
        let src = "<b>bold</b> and <i>more</i>";
        let doc = parse(src, &glossary_tags()).expect("Should parse");
        assert!(doc.nodes.iter().all(|n| n.node == Node::Text));
    }

    #[test]
    fn test_own_line_tag_swallows_line() {
        let src = "first\n  <defdepend file=\"a.txt\"/>  \nlast\n";
        let doc = parse(src, &glossary_tags()).expect("Should parse");
        assert_eq!(doc.nodes.len(), 3);
        assert_eq!(&src[doc.nodes[0].span.clone()], "first\n");
        assert_eq!(tag(&doc, 1).attribute("file"), Some("a.txt"));
        assert_eq!(&src[doc.nodes[2].span.clone()], "last\n");
    }

    #[test]
    fn test_own_line_tag_mid_line_is_text() {
        let src = "see <defdepend file=\"a.txt\"/> here\n";
        let doc = parse(src, &glossary_tags()).expect("Should parse");
        assert!(doc.nodes.iter().all(|n| n.node == Node::Text));
    }

    #[test]
    fn test_own_line_tag_at_end_of_input() {
        let src = "text\n<defdepend file=\"a.txt\"/>";
        let doc = parse(src, &glossary_tags()).expect("Should parse");
        assert_eq!(doc.nodes.len(), 2);
        assert_eq!(doc.nodes[1].span, 5..src.len());
    }

    #[test]
    fn test_unclosed_tag_is_error() {
        let result = parse(r#"<define link="word">never closed"#, &glossary_tags());
        assert!(result.is_err());
    }

    #[test]
    fn test_stray_closing_tag_is_error() {
        let result = parse("text </definition>", &glossary_tags());
        assert!(result.is_err());
    }
}
