//! Single-pass tokenizer
//!
//! Splits raw story text into literal runs and registry tags. Anything that
//! does not match the tag grammar exactly stays literal text.
//!
//! Open tag grammar for a tag declaring attributes `a1..an`:
//! `<name(\s*a1=DIGITS)?(\s*a2=DIGITS)?...>`

use crate::registry::{self, TagSpec};
use crate::{Attribute, Attributes};

/// Markup token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Literal text
    Text(&'a str),
    /// `<tag ...>`
    Open { spec: &'static TagSpec, attributes: Attributes },
    /// `</tag>`
    Close { spec: &'static TagSpec, raw: &'a str },
}

/// Tokenize the whole input
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let bytes = input.as_bytes();
    let mut literal_start = 0;
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos] != b'<' {
            pos += 1;
            continue;
        }
        let Some((token, end)) = tag_at(input, pos) else {
            pos += 1;
            continue;
        };
        if literal_start < pos {
            tokens.push(Token::Text(&input[literal_start..pos]));
        }
        tokens.push(token);
        pos = end;
        literal_start = end;
    }
    if literal_start < bytes.len() {
        tokens.push(Token::Text(&input[literal_start..]));
    }
    tokens
}

/// Try to read a tag starting at `start` (which holds `<`)
fn tag_at(input: &str, start: usize) -> Option<(Token<'_>, usize)> {
    let rest = &input[start + 1..];
    if let Some(after_slash) = rest.strip_prefix('/') {
        let close = after_slash.find('>')?;
        let spec = registry::lookup(&after_slash[..close])?;
        let end = start + 2 + close + 1;
        return Some((Token::Close { spec, raw: &input[start..end] }, end));
    }

    registry::TAG_REGISTRY
        .iter()
        .find_map(|spec| open_tag_at(input, start, spec))
}

/// `<name` followed by the optional attributes and `>`
fn open_tag_at<'a>(input: &'a str, start: usize, spec: &'static TagSpec) -> Option<(Token<'a>, usize)> {
    input[start + 1..].strip_prefix(spec.tag_name)?;
    let mut cursor = start + 1 + spec.tag_name.len();
    let mut attributes = Attributes::new();

    for &name in spec.attributes {
        if let Some((value, end)) = attribute_at(input, cursor, name) {
            attributes.push(Attribute::new(name, value));
            cursor = end;
        }
    }

    if input.as_bytes().get(cursor) != Some(&b'>') {
        return None;
    }
    Some((Token::Open { spec, attributes }, cursor + 1))
}

/// `\s*name=DIGITS` at `pos`; returns the digits and the position after them
fn attribute_at<'a>(input: &'a str, pos: usize, name: &str) -> Option<(&'a str, usize)> {
    let bytes = input.as_bytes();
    let mut cursor = pos;
    while cursor < bytes.len() && bytes[cursor].is_ascii_whitespace() {
        cursor += 1;
    }
    let after_name = input[cursor..].strip_prefix(name)?.strip_prefix('=')?;
    let digits = after_name.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let value_start = input.len() - after_name.len();
    Some((&after_name[..digits], value_start + digits))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EffectClass;

    fn open(effect: EffectClass, attrs: &[(&str, &str)]) -> Token<'static> {
        Token::Open {
            spec: effect.spec(),
            attributes: attrs.iter().map(|&(n, v)| (n, v)).collect(),
        }
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(tokenize("just words"), vec![Token::Text("just words")]);
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_open_with_attribute() {
        let tokens = tokenize("<shake force=3>Boo</shake>");
        assert_eq!(tokens[0], open(EffectClass::Shake, &[("force", "3")]));
        assert_eq!(tokens[1], Token::Text("Boo"));
        assert!(matches!(tokens[2], Token::Close { raw: "</shake>", .. }));
    }

    #[test]
    fn test_attribute_is_optional() {
        assert_eq!(tokenize("<fade>")[0], open(EffectClass::Fade, &[]));
        assert_eq!(tokenize("<slowspeed=5>")[0], open(EffectClass::Slow, &[("speed", "5")]));
        assert_eq!(tokenize("<slow \n speed=5>")[0], open(EffectClass::Slow, &[("speed", "5")]));
    }

    #[test]
    fn test_malformed_tags_stay_literal() {
        for input in [
            "<shake >",
            "<shake force=>",
            "<shake force=abc>",
            "<shake speed=3>",
            "<Shake>",
            "<shaker>",
            "<b>bold</b>",
            "a < b",
            "</glitch",
            "<instant force=2>",
        ] {
            assert_eq!(tokenize(input), vec![Token::Text(input)], "input {input:?}");
        }
    }

    #[test]
    fn test_literal_text_around_tags() {
        let tokens = tokenize("1 < 2 <glitch>x</glitch>!");
        assert_eq!(tokens[0], Token::Text("1 < 2 "));
        assert_eq!(tokens[1], open(EffectClass::Glitch, &[]));
        assert_eq!(tokens[2], Token::Text("x"));
        assert_eq!(tokens[4], Token::Text("!"));
    }

    #[test]
    fn test_multibyte_text() {
        let tokens = tokenize("¡Hola, <glitch>señor</glitch>!");
        assert_eq!(tokens[0], Token::Text("¡Hola, "));
        assert_eq!(tokens[2], Token::Text("señor"));
    }
}
