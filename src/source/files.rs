//! Source files of the index and their identifier occurrences.

use crate::corpus::{FileInput, SourcePos};
use crate::types::{CompactString, FileId, LineRange, ObjectId, PackageId, Position};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// An identifier occurrence as resolved by the type checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Ident {
    pub offset: u32,
    pub line: u32,
    pub column: u32,
    /// Length in bytes
    pub len: u32,
    pub object: Option<ObjectId>,
    pub declaration: bool,
}

impl Ident {
    pub fn end(&self) -> u32 {
        self.offset + self.len
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FileImport {
    pub path: String,
    pub alias: Option<String>,
    pub package: Option<PackageId>,
    pub object: Option<ObjectId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceFile {
    pub id: FileId,
    pub package: PackageId,
    /// Bare file name
    pub name: CompactString,
    pub path: PathBuf,
    pub generated_from: Option<PathBuf>,
    #[serde(skip)]
    pub content: String,
    pub doc: Option<LineRange>,
    pub imports: Vec<FileImport>,
    /// Sorted by offset
    #[serde(skip)]
    pub identifiers: Vec<Ident>,
}

impl SourceFile {
    pub(crate) fn from_input(
        id: FileId,
        package: PackageId,
        input: &FileInput,
        imports: Vec<FileImport>,
    ) -> Self {
        let mut identifiers: Vec<Ident> = input
            .identifiers
            .iter()
            .map(|ident| Ident {
                offset: ident.offset,
                line: ident.line,
                column: ident.column,
                len: ident.name.len() as u32,
                object: ident.object,
                declaration: ident.declaration,
            })
            .collect();
        identifiers.sort_by_key(|ident| ident.offset);

        Self {
            id,
            package,
            name: input.name.as_str().into(),
            path: input.path.clone(),
            generated_from: input.generated_from.clone(),
            content: input.content.clone(),
            doc: input.doc,
            imports,
            identifiers,
        }
    }

    /// The identifier covering `offset`, if any.
    pub fn ident_at(&self, offset: u32) -> Option<&Ident> {
        let index = self
            .identifiers
            .partition_point(|ident| ident.offset <= offset);
        let ident = self.identifiers.get(index.checked_sub(1)?)?;
        (offset < ident.end()).then_some(ident)
    }

    pub fn line_count(&self) -> usize {
        self.content.lines().count()
    }
}

/// Arena of every file in the index, addressable by package and bare name.
#[derive(Debug, Clone, Default)]
pub struct FileTable {
    files: Vec<SourceFile>,
    by_name: HashMap<(PackageId, CompactString), FileId>,
}

impl FileTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> FileId {
        FileId::new(self.files.len())
    }

    pub fn push(&mut self, file: SourceFile) -> FileId {
        let id = file.id;
        self.by_name.insert((file.package, file.name.clone()), id);
        self.files.push(file);
        id
    }

    pub fn get(&self, id: FileId) -> &SourceFile {
        &self.files[id.index()]
    }

    pub fn find(&self, package: PackageId, name: &str) -> Option<FileId> {
        self.by_name.get(&(package, CompactString::from(name))).copied()
    }

    /// Translate a parser position into an index position.
    pub fn position(&self, package: PackageId, pos: &SourcePos) -> Option<Position> {
        let file = self.find(package, &pos.file)?;
        Some(Position::new(file, pos.line, pos.column, pos.offset))
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.iter()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::IdentInput;

    fn file() -> SourceFile {
        let input = FileInput {
            name: "a.go".to_string(),
            content: "package a\n\nvar Value = 1\n".to_string(),
            identifiers: vec![
                IdentInput {
                    offset: 15,
                    line: 3,
                    column: 5,
                    name: "Value".to_string(),
                    object: Some(ObjectId(0)),
                    declaration: true,
                },
                IdentInput {
                    offset: 8,
                    line: 1,
                    column: 9,
                    name: "a".to_string(),
                    object: None,
                    declaration: false,
                },
            ],
            ..Default::default()
        };
        SourceFile::from_input(FileId(0), PackageId(1), &input, Vec::new())
    }

    #[test]
    fn test_identifiers_sorted_and_located() {
        let file = file();
        assert_eq!(file.identifiers[0].offset, 8);
        assert_eq!(file.ident_at(17).map(|i| i.offset), Some(15));
        assert_eq!(file.ident_at(20), None);
        assert_eq!(file.ident_at(3), None);
        assert_eq!(file.line_count(), 3);
    }

    #[test]
    fn test_table_position_lookup() {
        let mut table = FileTable::new();
        table.push(file());
        let pos = SourcePos {
            file: "a.go".to_string(),
            line: 3,
            column: 5,
            offset: 15,
        };
        let position = table.position(PackageId(1), &pos).unwrap();
        assert_eq!(position.file, FileId(0));
        assert!(table.position(PackageId(2), &pos).is_none());
    }
}
