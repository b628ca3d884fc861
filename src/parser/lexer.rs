//! Lexer for glossmark markup using logos

use std::collections::BTreeMap;

use logos::Logos;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Attribute name to value mapping of a tag
pub type Attributes = BTreeMap<String, String>;

/// The opening part of a tag: `<name attr="value" ...>` or `<name ... />`
#[derive(Debug, Clone, PartialEq)]
pub struct TagHead {
    pub name: String,
    pub attributes: Attributes,
    pub self_closing: bool,
}

#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Token {
    // Tags (attribute values are double-quoted)
    #[regex(
        r#"<[A-Za-z][A-Za-z0-9_-]*([ \t\r\n]+[A-Za-z_][A-Za-z0-9_-]*="[^"]*")*[ \t\r\n]*/?>"#,
        |lex| parse_tag_head(lex.slice())
    )]
    StartTag(TagHead),

    #[regex(r"</[A-Za-z][A-Za-z0-9_-]*[ \t]*>", |lex| {
        let s = lex.slice();
        s[2..s.len() - 1].trim_end().to_string()
    })]
    EndTag(String),

    // Everything else is text. A lone `<` that does not open a tag is text too.
    #[regex(r"[^<]+")]
    #[token("<")]
    Text,
}

/// Tokens inside a tag head, used to split out its attributes
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
enum HeadToken {
    #[token("<")]
    Open,
    #[token(">")]
    Close,
    #[token("/")]
    Slash,
    #[token("=")]
    Equals,
    #[regex(r"[A-Za-z_][A-Za-z0-9_-]*", |lex| lex.slice().to_string())]
    Name(String),
    #[regex(r#""[^"]*""#, |lex| {
        let s = lex.slice();
        s[1..s.len() - 1].to_string()
    })]
    Value(String),
}

/// Split a matched start tag into its name and attributes
fn parse_tag_head(slice: &str) -> Option<TagHead> {
    let mut tokens = HeadToken::lexer(slice).filter_map(|t| t.ok());

    if tokens.next()? != HeadToken::Open {
        return None;
    }
    let name = match tokens.next()? {
        HeadToken::Name(n) => n,
        _ => return None,
    };

    let mut attributes = Attributes::new();
    let mut self_closing = false;
    while let Some(tok) = tokens.next() {
        match tok {
            HeadToken::Name(key) => {
                if tokens.next()? != HeadToken::Equals {
                    return None;
                }
                match tokens.next()? {
                    HeadToken::Value(v) => {
                        attributes.insert(key, v);
                    }
                    _ => return None,
                }
            }
            HeadToken::Slash => self_closing = true,
            HeadToken::Close => break,
            _ => return None,
        }
    }

    Some(TagHead {
        name,
        attributes,
        self_closing,
    })
}

/// Lex input string into tokens with spans
///
/// Anything that starts like a tag but is not a well-formed one (`a<b`,
/// unquoted or unterminated attribute values) comes out as text, so the
/// spans always cover the whole input.
pub fn lex(input: &str) -> impl Iterator<Item = (Token, Span)> + '_ {
    Token::lexer(input)
        .spanned()
        .map(|(tok, span)| (tok.unwrap_or(Token::Text), span))
}
