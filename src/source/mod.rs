//! Source rendering model: annotated tokens for the source view.
//!
//! [`SourceAnnotator`] walks one file, pairing the scanner's tokens with the
//! type checker's identifier records. It is an iterator and keeps no state
//! beyond its scan position and the radio ids of the current file.

pub mod files;
pub mod scanner;

pub use files::{FileImport, FileTable, Ident, SourceFile};
pub use scanner::Token;

use crate::collector::Resource;
use crate::corpus::{ObjectInput, ObjectKind};
use crate::types::ObjectId;
use logos::{Lexer, Logos};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Plain,
    Keyword,
    StringLiteral,
    NumericLiteral,
    Comment,
    IdentDeclaration,
    IdentReference,
    PackageReference,
}

/// Shared highlight group of a file: a local object and its uses, or one import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "series", content = "id", rename_all = "snake_case")]
pub enum Radio {
    Local(u32),
    Import(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Annotation {
    pub start: u32,
    pub end: u32,
    pub kind: TokenKind,
    pub link: Option<Resource>,
    pub radio: Option<Radio>,
}

/// Runtime primitives that operator and keyword anchors link to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeAnchors {
    /// Behind `ch <- v`
    pub chan_send: Option<Resource>,
    /// Behind `<-ch`
    pub chan_recv: Option<Resource>,
    /// Behind the `range` of a for-range loop
    pub range_loop: Option<Resource>,
    /// Behind `else`
    pub else_branch: Option<Resource>,
}

/// Index data the annotator consults.
#[derive(Debug, Clone, Copy)]
pub struct SourceContext<'a> {
    pub resources: &'a HashMap<ObjectId, Resource>,
    pub objects: &'a [ObjectInput],
    pub anchors: RuntimeAnchors,
}

impl SourceContext<'_> {
    fn is_package_name(&self, object: ObjectId) -> bool {
        self.objects
            .get(object.index())
            .is_some_and(|o| o.kind == ObjectKind::PackageName)
    }
}

pub struct SourceAnnotator<'a> {
    lexer: Lexer<'a, Token>,
    file: &'a SourceFile,
    context: SourceContext<'a>,
    cursor: usize,
    previous: Option<Token>,
    radios: HashMap<ObjectId, Radio>,
}

impl<'a> SourceAnnotator<'a> {
    pub fn new(file: &'a SourceFile, context: SourceContext<'a>) -> Self {
        Self {
            lexer: Token::lexer(&file.content),
            file,
            context,
            cursor: 0,
            previous: None,
            radios: assign_radios(file, &context),
        }
    }

    /// The identifier record starting exactly at `offset`.
    fn ident_at(&mut self, offset: u32) -> Option<Ident> {
        let identifiers = &self.file.identifiers;
        while identifiers
            .get(self.cursor)
            .is_some_and(|ident| ident.offset < offset)
        {
            self.cursor += 1;
        }
        identifiers
            .get(self.cursor)
            .filter(|ident| ident.offset == offset)
            .copied()
    }

    fn identifier(&mut self, start: u32, end: u32) -> Annotation {
        let Some(ident) = self.ident_at(start) else {
            return plain(start, end, TokenKind::Plain);
        };
        let Some(object) = ident.object else {
            return plain(start, end, TokenKind::Plain);
        };

        let kind = if self.context.is_package_name(object) && !ident.declaration {
            TokenKind::PackageReference
        } else if ident.declaration {
            TokenKind::IdentDeclaration
        } else {
            TokenKind::IdentReference
        };

        Annotation {
            start,
            end,
            kind,
            link: self.context.resources.get(&object).copied(),
            radio: self.radios.get(&object).copied(),
        }
    }

    fn arrow(&self, start: u32, end: u32) -> Annotation {
        // `chan<-` and `<-chan` are channel types, not operations
        let next = self.lexer.clone().next().and_then(Result::ok);
        let link = if self.previous == Some(Token::Chan) || next == Some(Token::Chan) {
            None
        } else if self.previous.is_some_and(Token::ends_operand) {
            self.context.anchors.chan_send
        } else {
            self.context.anchors.chan_recv
        };
        Annotation {
            link,
            ..plain(start, end, TokenKind::Plain)
        }
    }
}

impl Iterator for SourceAnnotator<'_> {
    type Item = Annotation;

    fn next(&mut self) -> Option<Annotation> {
        let token = self.lexer.next()?;
        let span = self.lexer.span();
        let (start, end) = (span.start as u32, span.end as u32);

        let annotation = match token {
            Ok(Token::Comment) => plain(start, end, TokenKind::Comment),
            Ok(Token::String | Token::Rune) => plain(start, end, TokenKind::StringLiteral),
            Ok(Token::Number) => plain(start, end, TokenKind::NumericLiteral),
            Ok(Token::Range) => keyword(start, end, self.context.anchors.range_loop),
            Ok(Token::Else) => keyword(start, end, self.context.anchors.else_branch),
            Ok(token) if token.is_keyword() => plain(start, end, TokenKind::Keyword),
            Ok(Token::Ident) => self.identifier(start, end),
            Ok(Token::Arrow) => self.arrow(start, end),
            _ => plain(start, end, TokenKind::Plain),
        };

        if let Ok(token) = token {
            if token != Token::Comment {
                self.previous = Some(token);
            }
        }
        Some(annotation)
    }
}

fn keyword(start: u32, end: u32, link: Option<Resource>) -> Annotation {
    Annotation {
        link,
        ..plain(start, end, TokenKind::Keyword)
    }
}

fn plain(start: u32, end: u32, kind: TokenKind) -> Annotation {
    Annotation {
        start,
        end,
        kind,
        link: None,
        radio: None,
    }
}

/// Number the local objects declared and used in `file`, and its imports.
///
/// Package-level declarations are reachable through links and get no radio.
fn assign_radios(file: &SourceFile, context: &SourceContext<'_>) -> HashMap<ObjectId, Radio> {
    let mut radios = HashMap::new();

    let mut next_import = 0;
    for import in &file.imports {
        if let Some(object) = import.object {
            radios.insert(object, Radio::Import(next_import));
            next_import += 1;
        }
    }

    let used: HashSet<ObjectId> = file
        .identifiers
        .iter()
        .filter(|ident| !ident.declaration)
        .filter_map(|ident| ident.object)
        .collect();

    let mut next_local = 0;
    for ident in file.identifiers.iter().filter(|ident| ident.declaration) {
        let Some(object) = ident.object else {
            continue;
        };
        if context.resources.contains_key(&object)
            || context.is_package_name(object)
            || !used.contains(&object)
            || radios.contains_key(&object)
        {
            continue;
        }
        radios.insert(object, Radio::Local(next_local));
        next_local += 1;
    }
    radios
}
