//! Package graph: packages in dependency order with their transitive closures.

use crate::types::{FileId, ModuleId, PackageId, TypeNameId, ValueId};
use crate::{IndexError, IndexResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::str::FromStr;

/// Import path of the synthetic package holding the predeclared identifiers.
pub const BUILTIN_PACKAGE: &str = "builtin";

#[derive(Debug, Clone, Serialize)]
pub struct Module {
    pub id: ModuleId,
    pub path: String,
    pub version: Option<String>,
    pub repository: Option<String>,
    pub commit: Option<String>,
    pub extra_path: Option<String>,
}

impl Module {
    /// Link to a line of a file in the module's repository, when the module
    /// carries enough information to build one.
    pub fn source_link(&self, package_path: &str, file: &str, line: u32) -> Option<String> {
        let repository = self.repository.as_deref()?.trim_end_matches('/');
        let commit = self.commit.as_deref().or(self.version.as_deref())?;

        let mut link = format!("{repository}/blob/{commit}");
        if let Some(extra) = self.extra_path.as_deref().filter(|e| !e.is_empty()) {
            link.push('/');
            link.push_str(extra.trim_matches('/'));
        }
        let inner = package_path
            .strip_prefix(self.path.as_str())
            .unwrap_or_default()
            .trim_matches('/');
        if !inner.is_empty() {
            link.push('/');
            link.push_str(inner);
        }
        link.push('/');
        link.push_str(file);
        if line > 0 {
            link.push_str(&format!("#L{line}"));
        }
        Some(link)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Package {
    pub id: PackageId,
    pub path: String,
    pub name: String,
    pub dir: PathBuf,
    pub module: Option<ModuleId>,
    /// Direct imports
    pub imports: Vec<PackageId>,
    /// Direct importers
    pub importers: Vec<PackageId>,
    /// Transitive dependencies, sorted by id
    pub deps: Vec<PackageId>,
    /// Transitive dependents, sorted by id
    pub deped_bys: Vec<PackageId>,
    pub depth: u32,
    pub height: u32,
    pub files: Vec<FileId>,
    pub type_names: Vec<TypeNameId>,
    pub constants: Vec<ValueId>,
    pub variables: Vec<ValueId>,
    /// Functions and methods
    pub functions: Vec<ValueId>,
}

impl Package {
    pub fn is_builtin(&self) -> bool {
        self.path == BUILTIN_PACKAGE
    }
}

/// Orders of the package overview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageOrder {
    #[default]
    Alphabet,
    /// Most imported first
    ImportedBys,
    /// Deepest dependency chain first
    Depth,
}

impl FromStr for PackageOrder {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "alphabet" | "" => Ok(Self::Alphabet),
            "importedbys" | "imported_bys" => Ok(Self::ImportedBys),
            "depth" => Ok(Self::Depth),
            other => Err(IndexError::General(format!("Unknown package order '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PackageGraph {
    modules: Vec<Module>,
    module_by_path: HashMap<String, ModuleId>,
    packages: Vec<Package>,
    by_path: HashMap<String, PackageId>,
}

impl PackageGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_module(
        &mut self,
        path: &str,
        version: Option<String>,
        repository: Option<String>,
        commit: Option<String>,
        extra_path: Option<String>,
    ) -> ModuleId {
        if let Some(&id) = self.module_by_path.get(path) {
            return id;
        }
        let id = ModuleId::new(self.modules.len());
        self.modules.push(Module {
            id,
            path: path.to_string(),
            version,
            repository,
            commit,
            extra_path,
        });
        self.module_by_path.insert(path.to_string(), id);
        id
    }

    /// Append a package. Its imports must already be in the graph.
    pub fn add_package(
        &mut self,
        path: &str,
        name: &str,
        dir: PathBuf,
        module: Option<&str>,
        imports: &[String],
    ) -> IndexResult<PackageId> {
        if self.by_path.contains_key(path) {
            return Err(IndexError::DuplicatePackage {
                path: path.to_string(),
            });
        }

        let mut resolved = Vec::with_capacity(imports.len());
        for import in imports {
            let id = self
                .by_path
                .get(import)
                .copied()
                .ok_or_else(|| IndexError::InvalidCorpus {
                    reason: format!("package '{path}' imports unknown package '{import}'"),
                })?;
            resolved.push(id);
        }
        resolved.sort();
        resolved.dedup();

        let id = PackageId::new(self.packages.len());
        self.packages.push(Package {
            id,
            path: path.to_string(),
            name: name.to_string(),
            dir,
            module: module.and_then(|m| self.module_by_path.get(m).copied()),
            imports: resolved,
            importers: Vec::new(),
            deps: Vec::new(),
            deped_bys: Vec::new(),
            depth: 0,
            height: 0,
            files: Vec::new(),
            type_names: Vec::new(),
            constants: Vec::new(),
            variables: Vec::new(),
            functions: Vec::new(),
        });
        self.by_path.insert(path.to_string(), id);
        Ok(id)
    }

    /// Compute dependency closures, inverse closures, depth and height.
    ///
    /// Ids follow dependency order, so one forward sweep sees every import's
    /// closure before the importer and one backward sweep does the same for
    /// importers.
    pub fn compute_closures(&mut self) {
        let count = self.packages.len();
        let mut closures: Vec<BTreeSet<PackageId>> = vec![BTreeSet::new(); count];

        for index in 0..count {
            let mut deps = BTreeSet::new();
            let mut depth = 0;
            for &import in &self.packages[index].imports {
                deps.insert(import);
                deps.extend(closures[import.index()].iter().copied());
                depth = depth.max(self.packages[import.index()].depth + 1);
            }
            self.packages[index].depth = depth;
            closures[index] = deps;
        }

        let mut inverse: Vec<Vec<PackageId>> = vec![Vec::new(); count];
        let mut importers: Vec<Vec<PackageId>> = vec![Vec::new(); count];
        for (index, deps) in closures.iter().enumerate() {
            let id = PackageId::new(index);
            for dep in deps {
                inverse[dep.index()].push(id);
            }
            for import in &self.packages[index].imports {
                importers[import.index()].push(id);
            }
        }

        for index in (0..count).rev() {
            let height = importers[index]
                .iter()
                .map(|importer| self.packages[importer.index()].height + 1)
                .max()
                .unwrap_or(0);
            self.packages[index].height = height;
        }

        for (index, package) in self.packages.iter_mut().enumerate() {
            package.deps = std::mem::take(&mut closures[index]).into_iter().collect();
            package.deped_bys = std::mem::take(&mut inverse[index]);
            package.importers = std::mem::take(&mut importers[index]);
        }
    }

    /// Packages in dependency order.
    pub fn in_dependency_order(&self) -> &[Package] {
        &self.packages
    }

    pub fn by_path(&self, path: &str) -> Option<&Package> {
        self.by_path.get(path).map(|id| &self.packages[id.index()])
    }

    pub fn id_of(&self, path: &str) -> Option<PackageId> {
        self.by_path.get(path).copied()
    }

    pub fn get(&self, id: PackageId) -> &Package {
        &self.packages[id.index()]
    }

    pub(crate) fn get_mut(&mut self, id: PackageId) -> &mut Package {
        &mut self.packages[id.index()]
    }

    pub fn module(&self, id: ModuleId) -> &Module {
        &self.modules[id.index()]
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Package ids in the requested overview order.
    pub fn ordered(&self, order: PackageOrder) -> Vec<PackageId> {
        let mut ids: Vec<PackageId> = self.packages.iter().map(|p| p.id).collect();
        match order {
            PackageOrder::Alphabet => {
                ids.sort_by(|a, b| self.get(*a).path.cmp(&self.get(*b).path));
            }
            PackageOrder::ImportedBys => ids.sort_by(|a, b| {
                let (pa, pb) = (self.get(*a), self.get(*b));
                pb.importers
                    .len()
                    .cmp(&pa.importers.len())
                    .then_with(|| pa.path.cmp(&pb.path))
            }),
            PackageOrder::Depth => ids.sort_by(|a, b| {
                let (pa, pb) = (self.get(*a), self.get(*b));
                pb.depth.cmp(&pa.depth).then_with(|| pa.path.cmp(&pb.path))
            }),
        }
        ids
    }
}
