//! `@{name}` / `${name}` expressions
//!
//! `@{name}` refers to a context variable (`version`, `baseVersion`, ...) or
//! another version command property. `${name}` refers to a user property, a
//! version command property or a project property. References nest: the
//! name itself may be an expression, as in `@{${which}}`.

use std::collections::BTreeSet;

/// Kind of a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    /// `@{...}`
    Context,
    /// `${...}`
    Property,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Reference { kind: RefKind, name: Vec<Segment> },
}

/// Parsed expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    segments: Vec<Segment>,
}

impl Expression {
    pub fn parse(input: &str) -> Result<Self, String> {
        let chars: Vec<char> = input.chars().collect();
        let mut pos = 0;
        let segments = parse_segments(&chars, &mut pos, false)?;
        Ok(Self { segments })
    }

    /// Names referenced literally anywhere in the expression, including
    /// inside nested names. Dynamic names are not included.
    pub fn static_references(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        collect_static(&self.segments, &mut names);
        names
    }

    /// Evaluate with `resolve(kind, name)` supplying reference values.
    pub fn evaluate<E>(
        &self,
        resolve: &mut dyn FnMut(RefKind, &str) -> Result<String, E>,
    ) -> Result<String, E> {
        evaluate_segments(&self.segments, resolve)
    }
}

fn parse_segments(chars: &[char], pos: &mut usize, nested: bool) -> Result<Vec<Segment>, String> {
    let mut segments = Vec::new();
    let mut literal = String::new();

    while *pos < chars.len() {
        let c = chars[*pos];
        let opens = matches!(c, '@' | '$') && chars.get(*pos + 1) == Some(&'{');

        if opens {
            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            let kind = if c == '@' { RefKind::Context } else { RefKind::Property };
            let start = *pos;
            *pos += 2;
            let name = parse_segments(chars, pos, true)?;
            if chars.get(*pos) != Some(&'}') {
                return Err(format!("unterminated reference starting at offset {start}"));
            }
            *pos += 1;
            if name.is_empty() {
                return Err(format!("empty reference at offset {start}"));
            }
            segments.push(Segment::Reference { kind, name });
            continue;
        }

        if c == '}' && nested {
            break;
        }
        literal.push(c);
        *pos += 1;
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

fn collect_static(segments: &[Segment], names: &mut BTreeSet<String>) {
    for segment in segments {
        if let Segment::Reference { name, .. } = segment {
            match name.as_slice() {
                [Segment::Literal(literal)] => {
                    names.insert(literal.clone());
                }
                nested => collect_static(nested, names),
            }
        }
    }
}

fn evaluate_segments<E>(
    segments: &[Segment],
    resolve: &mut dyn FnMut(RefKind, &str) -> Result<String, E>,
) -> Result<String, E> {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Reference { kind, name } => {
                let name = evaluate_segments(name, resolve)?;
                out.push_str(&resolve(*kind, &name)?);
            }
        }
    }
    Ok(out)
}
