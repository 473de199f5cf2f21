//! Build phase: turns a validated corpus into a sealed [`Index`].

use super::Index;
use crate::collector::{Collector, Declarations, Resource};
use crate::corpus::{Corpus, ObjectKind, PackageInput};
use crate::implements::ImplementationSolver;
use crate::packages::{BUILTIN_PACKAGE, PackageGraph};
use crate::references::ReferenceIndex;
use crate::registry::builtin::builtin_package;
use crate::selectors;
use crate::source::{FileImport, FileTable, RuntimeAnchors, SourceFile};
use crate::stats::Stats;
use crate::types::PackageId;
use crate::IndexResult;
use std::time::Instant;
use tracing::{debug, info};

const RUNTIME_PACKAGE: &str = "runtime";

/// Runs the build phases strictly in order: package graph, files,
/// declarations, selectors, implementations, references, statistics.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexBuilder;

impl IndexBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, corpus: Corpus) -> IndexResult<Index> {
        let started = Instant::now();
        corpus.validate()?;

        let builtin = builtin_package();

        let phase = Instant::now();
        let graph = self.build_graph(&corpus, &builtin)?;
        info!(
            packages = graph.len(),
            modules = graph.modules().len(),
            elapsed_ms = phase.elapsed().as_millis() as u64,
            "package graph ready"
        );

        let mut graph = graph;
        let phase = Instant::now();
        let files = self.register_files(&corpus, &mut graph);
        info!(
            files = files.len(),
            elapsed_ms = phase.elapsed().as_millis() as u64,
            "source files registered"
        );

        let phase = Instant::now();
        let mut decls = Declarations::new();
        for (index, input) in std::iter::once(&builtin).chain(&corpus.packages).enumerate() {
            Collector::new(&mut decls, &mut graph, &files, PackageId::new(index)).collect(input)?;
        }
        self.link_objects(&corpus, &graph, &files, &mut decls);
        info!(
            type_names = decls.type_names.len(),
            values = decls.values.len(),
            types = decls.registry.len(),
            elapsed_ms = phase.elapsed().as_millis() as u64,
            "declarations collected"
        );

        let phase = Instant::now();
        let selector_count = selectors::resolve_all(&mut decls.registry, &decls.type_names);
        info!(
            selectors = selector_count,
            elapsed_ms = phase.elapsed().as_millis() as u64,
            "selectors resolved"
        );

        let phase = Instant::now();
        let pairs = ImplementationSolver::new(&mut decls.registry, &decls.type_names).solve();
        info!(
            pairs,
            elapsed_ms = phase.elapsed().as_millis() as u64,
            "implementations solved"
        );

        let phase = Instant::now();
        let references = ReferenceIndex::build(&files, &corpus.objects, &graph);
        info!(
            objects = references.object_count(),
            occurrences = references.occurrence_count(),
            elapsed_ms = phase.elapsed().as_millis() as u64,
            "references indexed"
        );

        let stats = Stats::compute(&graph, &files, &decls);
        let anchors = runtime_anchors(&graph, &decls);

        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "index built"
        );

        Ok(Index {
            graph,
            files,
            decls,
            objects: corpus.objects,
            references,
            stats,
            anchors,
        })
    }

    fn build_graph(&self, corpus: &Corpus, builtin: &PackageInput) -> IndexResult<PackageGraph> {
        let mut graph = PackageGraph::new();
        for module in &corpus.modules {
            graph.add_module(
                &module.path,
                module.version.clone(),
                module.repository.clone(),
                module.commit.clone(),
                module.extra_path.clone(),
            );
        }

        for package in std::iter::once(builtin).chain(&corpus.packages) {
            graph.add_package(
                &package.path,
                &package.name,
                package.dir.clone(),
                package.module.as_deref(),
                &package.imports,
            )?;
        }
        graph.compute_closures();
        Ok(graph)
    }

    fn register_files(&self, corpus: &Corpus, graph: &mut PackageGraph) -> FileTable {
        let mut files = FileTable::new();
        for (index, package) in corpus.packages.iter().enumerate() {
            // the builtin package comes first and has no files
            let package_id = PackageId::new(index + 1);
            for input in &package.files {
                let imports = input
                    .imports
                    .iter()
                    .map(|import| FileImport {
                        path: import.path.clone(),
                        alias: import.alias.clone(),
                        package: graph.id_of(&import.path),
                        object: import.object,
                    })
                    .collect();
                let id = files.next_id();
                files.push(SourceFile::from_input(id, package_id, input, imports));
                graph.get_mut(package_id).files.push(id);
            }
        }
        files
    }

    /// Map universe objects to the builtin package and import names to
    /// the packages they denote.
    fn link_objects(
        &self,
        corpus: &Corpus,
        graph: &PackageGraph,
        files: &FileTable,
        decls: &mut Declarations,
    ) {
        let builtin = graph.id_of(BUILTIN_PACKAGE).unwrap_or(PackageId(0));
        let mut universe = 0;

        for (index, object) in corpus.objects.iter().enumerate() {
            if object.package.is_some() {
                continue;
            }
            let id = crate::ObjectId::new(index);
            let resource = match object.kind {
                ObjectKind::TypeName => decls
                    .type_name_in(builtin, &object.name)
                    .map(Resource::TypeName),
                ObjectKind::Const | ObjectKind::Builtin | ObjectKind::Func => {
                    decls.value_in(builtin, &object.name).map(Resource::Value)
                }
                _ => None,
            };
            if let Some(resource) = resource {
                decls.resources.insert(id, resource);
                universe += 1;
            }
        }

        for file in files.iter() {
            for import in &file.imports {
                if let (Some(object), Some(package)) = (import.object, import.package) {
                    decls.resources.insert(object, Resource::Package(package));
                }
            }
        }

        debug!(universe, "linked universe objects");
    }
}

/// The runtime functions source anchors link to, when the corpus has them.
fn runtime_anchors(graph: &PackageGraph, decls: &Declarations) -> RuntimeAnchors {
    let Some(runtime) = graph.id_of(RUNTIME_PACKAGE) else {
        return RuntimeAnchors::default();
    };
    let find = |names: &[&str]| {
        names
            .iter()
            .find_map(|name| decls.value_in(runtime, name))
            .map(Resource::Value)
    };
    RuntimeAnchors {
        chan_send: find(&["chansend1"]),
        chan_recv: find(&["chanrecv1"]),
        // renamed in newer runtimes
        range_loop: find(&["mapiterinit", "mapIterStart"]),
        else_branch: find(&["selectnbrecv"]),
    }
}
