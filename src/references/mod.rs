//! Reference index: every occurrence of every declared object.
//!
//! Occurrences live in one flat arena sorted by object; the map only holds
//! the range of each object's run.

use crate::corpus::ObjectInput;
use crate::packages::PackageGraph;
use crate::source::FileTable;
use crate::types::{FileId, ObjectId, PackageId};
use serde::Serialize;
use std::collections::HashMap;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Occurrence {
    pub package: PackageId,
    pub file: FileId,
    pub offset: u32,
    pub line: u32,
    pub column: u32,
    pub declaration: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    arena: Vec<Occurrence>,
    ranges: HashMap<ObjectId, Range<u32>>,
}

impl ReferenceIndex {
    /// Single pass over every identifier of every file.
    pub fn build(files: &FileTable, objects: &[ObjectInput], graph: &PackageGraph) -> Self {
        let declaring: Vec<Option<PackageId>> = objects
            .iter()
            .map(|object| object.package.as_deref().and_then(|p| graph.id_of(p)))
            .collect();

        let mut entries: Vec<(ObjectId, Occurrence)> = Vec::new();
        for file in files.iter() {
            for ident in &file.identifiers {
                let Some(object) = ident.object else {
                    continue;
                };
                entries.push((
                    object,
                    Occurrence {
                        package: file.package,
                        file: file.id,
                        offset: ident.offset,
                        line: ident.line,
                        column: ident.column,
                        declaration: ident.declaration,
                    },
                ));
            }
        }

        entries.sort_by_key(|(object, occurrence)| {
            let home = declaring.get(object.index()).copied().flatten();
            (
                *object,
                home != Some(occurrence.package),
                occurrence.package,
                occurrence.file,
                occurrence.offset,
            )
        });

        let mut ranges = HashMap::new();
        let mut arena = Vec::with_capacity(entries.len());
        let mut start = 0u32;
        for (index, (object, occurrence)) in entries.iter().enumerate() {
            arena.push(*occurrence);
            let last_of_run = entries
                .get(index + 1)
                .is_none_or(|(next, _)| next != object);
            if last_of_run {
                let end = index as u32 + 1;
                ranges.insert(*object, start..end);
                start = end;
            }
        }

        Self { arena, ranges }
    }

    /// Occurrences of `object`, declaring package first, then dependency order.
    pub fn references_to(&self, object: ObjectId) -> &[Occurrence] {
        match self.ranges.get(&object) {
            Some(range) => &self.arena[range.start as usize..range.end as usize],
            None => &[],
        }
    }

    /// Occurrences of `object` split into runs of one package each.
    pub fn grouped_by_package(&self, object: ObjectId) -> Vec<(PackageId, &[Occurrence])> {
        self.references_to(object)
            .chunk_by(|a, b| a.package == b.package)
            .map(|run| (run[0].package, run))
            .collect()
    }

    /// The object declared or referenced at `offset` of `file`.
    pub fn declaration_at(files: &FileTable, file: FileId, offset: u32) -> Option<ObjectId> {
        files.get(file).ident_at(offset)?.object
    }

    pub fn occurrence_count(&self) -> usize {
        self.arena.len()
    }

    pub fn object_count(&self) -> usize {
        self.ranges.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{FileInput, IdentInput, ObjectKind, SourcePos};
    use crate::source::SourceFile;
    use std::path::PathBuf;

    fn ident(offset: u32, object: u32, declaration: bool) -> IdentInput {
        IdentInput {
            offset,
            line: 1,
            column: offset + 1,
            name: "F".to_string(),
            object: Some(ObjectId(object)),
            declaration,
        }
    }

    #[test]
    fn test_references_sorted_and_grouped() {
        let mut graph = PackageGraph::new();
        let a = graph
            .add_package("a", "a", PathBuf::new(), None, &[])
            .unwrap();
        let b = graph
            .add_package("b", "b", PathBuf::new(), None, &["a".to_string()])
            .unwrap();

        let mut files = FileTable::new();
        let b_file = FileInput {
            name: "b.go".to_string(),
            identifiers: vec![ident(30, 0, false), ident(10, 0, false)],
            ..Default::default()
        };
        let a_file = FileInput {
            name: "a.go".to_string(),
            identifiers: vec![ident(5, 0, true)],
            ..Default::default()
        };
        // b's file is registered first to check the sort
        let id = files.next_id();
        files.push(SourceFile::from_input(id, b, &b_file, Vec::new()));
        let id = files.next_id();
        files.push(SourceFile::from_input(id, a, &a_file, Vec::new()));

        let objects = vec![ObjectInput {
            kind: ObjectKind::Func,
            name: "F".to_string(),
            package: Some("a".to_string()),
            position: Some(SourcePos {
                file: "a.go".to_string(),
                line: 1,
                column: 6,
                offset: 5,
            }),
        }];
        let index = ReferenceIndex::build(&files, &objects, &graph);

        let refs = index.references_to(ObjectId(0));
        assert_eq!(refs.len(), 3);
        assert_eq!(refs[0].package, a);
        assert!(refs[0].declaration);
        assert_eq!(refs[1].offset, 10);
        assert_eq!(refs[2].offset, 30);

        let groups = index.grouped_by_package(ObjectId(0));
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].0, b);
        assert_eq!(groups[1].1.len(), 2);
        assert!(index.references_to(ObjectId(9)).is_empty());
        assert_eq!(index.occurrence_count(), 3);
    }
}
