//! Shared corpus fixtures for the integration tests.
#![allow(dead_code)]

use pkgdex::corpus::{
    FieldInput, FileInput, FunctionInput, IdentInput, ImportInput, MethodSpecInput, ModuleInput,
    ObjectInput, ObjectKind, PackageInput, ReceiverInput, SourcePos, TypeExpr, TypeNameInput,
};
use pkgdex::{Corpus, Index, IndexBuilder, ObjectId};

/// Incrementally assembles a corpus, handing out object ids as it goes.
#[derive(Default)]
pub struct CorpusBuilder {
    corpus: Corpus,
}

impl CorpusBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn module(&mut self, path: &str, repository: &str, commit: &str) -> &mut Self {
        self.corpus.modules.push(ModuleInput {
            path: path.to_string(),
            version: None,
            repository: Some(repository.to_string()),
            commit: Some(commit.to_string()),
            extra_path: None,
        });
        self
    }

    pub fn object(&mut self, kind: ObjectKind, name: &str, package: Option<&str>) -> ObjectId {
        let id = ObjectId::new(self.corpus.objects.len());
        self.corpus.objects.push(ObjectInput {
            kind,
            name: name.to_string(),
            package: package.map(str::to_string),
            position: None,
        });
        id
    }

    pub fn package(&mut self, package: PackageInput) -> &mut Self {
        self.corpus.packages.push(package);
        self
    }

    pub fn build(&self) -> Corpus {
        self.corpus.clone()
    }

    pub fn index(&self) -> Index {
        build(self.build())
    }
}

pub fn build(corpus: Corpus) -> Index {
    IndexBuilder::new()
        .build(corpus)
        .expect("corpus should index")
}

pub fn package(path: &str, imports: &[&str]) -> PackageInput {
    PackageInput {
        path: path.to_string(),
        name: path.rsplit('/').next().unwrap_or(path).to_string(),
        imports: imports.iter().map(|i| i.to_string()).collect(),
        ..Default::default()
    }
}

pub fn type_decl(name: &str, ty: TypeExpr) -> TypeNameInput {
    TypeNameInput {
        name: name.to_string(),
        object: None,
        position: None,
        alias: false,
        ty,
    }
}

pub fn alias_decl(name: &str, target: TypeExpr) -> TypeNameInput {
    TypeNameInput {
        alias: true,
        ..type_decl(name, target)
    }
}

pub fn function(name: &str, signature: TypeExpr) -> FunctionInput {
    FunctionInput {
        name: name.to_string(),
        object: None,
        position: None,
        receiver: None,
        signature,
    }
}

pub fn method(receiver: &str, pointer: bool, name: &str, signature: TypeExpr) -> FunctionInput {
    FunctionInput {
        receiver: Some(ReceiverInput {
            type_name: receiver.to_string(),
            pointer,
        }),
        ..function(name, signature)
    }
}

pub fn field(name: &str, ty: TypeExpr) -> FieldInput {
    FieldInput::new(name, ty)
}

pub fn embed(package: &str, name: &str) -> FieldInput {
    FieldInput::embedded(name, TypeExpr::named(package, name))
}

pub fn embed_pointer(package: &str, name: &str) -> FieldInput {
    FieldInput::embedded(name, TypeExpr::pointer(TypeExpr::named(package, name)))
}

pub fn interface_method(name: &str, signature: TypeExpr) -> MethodSpecInput {
    MethodSpecInput::new(name, signature)
}

pub fn no_args() -> TypeExpr {
    TypeExpr::signature(Vec::new(), Vec::new())
}

/// `func(p []byte) (int, error)`
pub fn read_signature() -> TypeExpr {
    TypeExpr::signature(
        vec![TypeExpr::slice(TypeExpr::basic("byte"))],
        vec![TypeExpr::basic("int"), TypeExpr::error()],
    )
}

/// `func() error`
pub fn close_signature() -> TypeExpr {
    TypeExpr::signature(Vec::new(), vec![TypeExpr::error()])
}

/// A file whose identifiers are located by searching `content`.
pub struct FileFixture {
    pub name: String,
    pub content: String,
    pub imports: Vec<ImportInput>,
    pub identifiers: Vec<IdentInput>,
}

impl FileFixture {
    pub fn new(name: &str, content: &str) -> Self {
        Self {
            name: name.to_string(),
            content: content.to_string(),
            imports: Vec::new(),
            identifiers: Vec::new(),
        }
    }

    pub fn import(mut self, path: &str, object: ObjectId) -> Self {
        self.imports.push(ImportInput {
            path: path.to_string(),
            alias: None,
            object: Some(object),
        });
        self
    }

    /// Record the `nth` occurrence of `needle` as resolving to `object`.
    pub fn ident(mut self, needle: &str, nth: usize, object: ObjectId, declaration: bool) -> Self {
        let offset = self
            .content
            .match_indices(needle)
            .nth(nth)
            .map(|(offset, _)| offset)
            .expect("needle occurs in fixture");
        let (line, column) = line_column(&self.content, offset);
        self.identifiers.push(IdentInput {
            offset: offset as u32,
            line,
            column,
            name: needle.to_string(),
            object: Some(object),
            declaration,
        });
        self
    }

    /// Record `needle` at its first occurrence inside `context`.
    pub fn ident_within(
        mut self,
        context: &str,
        needle: &str,
        object: ObjectId,
        declaration: bool,
    ) -> Self {
        let offset = self.content.find(context).expect("context occurs in fixture")
            + context.find(needle).expect("needle occurs in context");
        let (line, column) = line_column(&self.content, offset);
        self.identifiers.push(IdentInput {
            offset: offset as u32,
            line,
            column,
            name: needle.to_string(),
            object: Some(object),
            declaration,
        });
        self
    }

    pub fn position_of(&self, needle: &str, nth: usize) -> SourcePos {
        let offset = self
            .content
            .match_indices(needle)
            .nth(nth)
            .map(|(offset, _)| offset)
            .expect("needle occurs in fixture");
        let (line, column) = line_column(&self.content, offset);
        SourcePos {
            file: self.name.clone(),
            line,
            column,
            offset: offset as u32,
        }
    }

    pub fn into_input(self) -> FileInput {
        FileInput {
            name: self.name,
            content: self.content,
            imports: self.imports,
            identifiers: self.identifiers,
            ..Default::default()
        }
    }
}

fn line_column(content: &str, offset: usize) -> (u32, u32) {
    let before = &content[..offset];
    let line = before.matches('\n').count() + 1;
    let column = offset - before.rfind('\n').map_or(0, |at| at + 1) + 1;
    (line as u32, column as u32)
}
