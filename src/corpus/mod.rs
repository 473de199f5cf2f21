//! Inbound boundary: the corpus produced by the external parser.

pub mod model;

pub use model::{
    Corpus, FieldInput, FileInput, FunctionInput, IdentInput, ImportInput, MethodSpecInput,
    ModuleInput, ObjectInput, ObjectKind, PackageInput, ParamInput, ReceiverInput, SourcePos,
    TypeExpr, TypeNameInput, ValueInput,
};

use crate::packages::BUILTIN_PACKAGE;
use crate::{IndexError, IndexResult};
use std::collections::{HashMap, HashSet};
use std::path::Path;

impl Corpus {
    /// Load a corpus document from disk.
    pub fn load(path: impl AsRef<Path>) -> IndexResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| IndexError::CorpusRead {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| IndexError::CorpusParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json_str(json: &str) -> IndexResult<Self> {
        serde_json::from_str(json).map_err(|e| IndexError::InvalidCorpus {
            reason: e.to_string(),
        })
    }

    pub fn to_json_string(&self) -> IndexResult<String> {
        serde_json::to_string(self).map_err(|e| IndexError::General(e.to_string()))
    }

    pub fn file_count(&self) -> usize {
        self.packages.iter().map(|p| p.files.len()).sum()
    }

    /// Check the structural guarantees the engine relies on.
    ///
    /// Package paths are unique, every import names a package appearing
    /// earlier in the list, file names are unique per package and every
    /// object reference is inside the object table.
    pub fn validate(&self) -> IndexResult<()> {
        let modules: HashSet<&str> = self.modules.iter().map(|m| m.path.as_str()).collect();
        let mut seen: HashSet<&str> = HashSet::new();

        for package in &self.packages {
            if package.path == BUILTIN_PACKAGE || !seen.insert(package.path.as_str()) {
                return Err(IndexError::DuplicatePackage {
                    path: package.path.clone(),
                });
            }

            for import in &package.imports {
                if import == &package.path {
                    return Err(invalid(format!("package '{}' imports itself", package.path)));
                }
                if !seen.contains(import.as_str()) {
                    return Err(invalid(format!(
                        "package '{}' imports '{}' which does not precede it",
                        package.path, import
                    )));
                }
            }

            if let Some(module) = &package.module {
                if !modules.contains(module.as_str()) {
                    return Err(invalid(format!(
                        "package '{}' belongs to unknown module '{}'",
                        package.path, module
                    )));
                }
            }

            let mut file_names = HashSet::new();
            for file in &package.files {
                if !file_names.insert(file.name.as_str()) {
                    return Err(invalid(format!(
                        "file '{}' appears twice in package '{}'",
                        file.name, package.path
                    )));
                }
                for ident in &file.identifiers {
                    self.check_object(ident.object, &package.path)?;
                }
                for import in &file.imports {
                    self.check_object(import.object, &package.path)?;
                }
            }
        }

        let mut by_path: HashMap<&str, usize> = HashMap::new();
        for module in &self.modules {
            *by_path.entry(module.path.as_str()).or_default() += 1;
        }
        if let Some((path, _)) = by_path.into_iter().find(|(_, count)| *count > 1) {
            return Err(invalid(format!("module '{path}' is declared more than once")));
        }

        Ok(())
    }

    fn check_object(&self, object: Option<crate::ObjectId>, package: &str) -> IndexResult<()> {
        match object {
            Some(id) if id.index() >= self.objects.len() => Err(invalid(format!(
                "package '{package}' references object {id} outside the object table"
            ))),
            _ => Ok(()),
        }
    }
}

fn invalid(reason: String) -> IndexError {
    IndexError::InvalidCorpus { reason }
}
