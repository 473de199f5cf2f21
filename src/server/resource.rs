//! Resource identifiers of the page server.
//!
//! A resource is written `<kind>:<path>`. The path is kind specific:
//!
//! - `pkg:<import_path>` and `dep:<import_path>`
//! - `src:<import_path>/<file>`
//! - `imp:<import_path>.<type_name>`
//! - `use:<import_path>..<identifier>` where the identifier is `Name` or `Type.selector`
//!
//! Static generation writes every resource to `<kind>/<hash>.<ext>`;
//! [`StaticPathTable`] maps those names back at dispatch time.

use crate::error::{ResourceError, ResourceResult};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

const HASH_LEN: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Pkg,
    Dep,
    Src,
    Imp,
    Use,
    Css,
    Jvs,
    Svg,
    Png,
    Api,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 10] = [
        ResourceKind::Pkg,
        ResourceKind::Dep,
        ResourceKind::Src,
        ResourceKind::Imp,
        ResourceKind::Use,
        ResourceKind::Css,
        ResourceKind::Jvs,
        ResourceKind::Svg,
        ResourceKind::Png,
        ResourceKind::Api,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Pkg => "pkg",
            ResourceKind::Dep => "dep",
            ResourceKind::Src => "src",
            ResourceKind::Imp => "imp",
            ResourceKind::Use => "use",
            ResourceKind::Css => "css",
            ResourceKind::Jvs => "jvs",
            ResourceKind::Svg => "svg",
            ResourceKind::Png => "png",
            ResourceKind::Api => "api",
        }
    }

    /// File extension used for static generation.
    pub fn extension(&self) -> &'static str {
        match self {
            ResourceKind::Css => "css",
            ResourceKind::Jvs => "js",
            ResourceKind::Svg => "svg",
            ResourceKind::Png => "png",
            ResourceKind::Api => "json",
            _ => "html",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ResourceKind::Css => "text/css; charset=utf-8",
            ResourceKind::Jvs => "application/javascript",
            ResourceKind::Svg => "image/svg+xml",
            ResourceKind::Png => "image/png",
            _ => "application/json",
        }
    }

    /// Pages rendered from the index, as opposed to static assets.
    pub fn is_page(&self) -> bool {
        !matches!(
            self,
            ResourceKind::Css | ResourceKind::Jvs | ResourceKind::Svg | ResourceKind::Png
        )
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = ResourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ResourceError::UnknownKind(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResourceId {
    pub kind: ResourceKind,
    pub path: String,
}

impl ResourceId {
    pub fn new(kind: ResourceKind, path: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }

    pub fn package(import_path: &str) -> Self {
        Self::new(ResourceKind::Pkg, import_path)
    }

    pub fn dependencies(import_path: &str) -> Self {
        Self::new(ResourceKind::Dep, import_path)
    }

    pub fn source(import_path: &str, file: &str) -> Self {
        Self::new(ResourceKind::Src, format!("{import_path}/{file}"))
    }

    pub fn implementations(import_path: &str, type_name: &str) -> Self {
        Self::new(ResourceKind::Imp, format!("{import_path}.{type_name}"))
    }

    pub fn uses(import_path: &str, identifier: &str) -> Self {
        Self::new(ResourceKind::Use, format!("{import_path}..{identifier}"))
    }

    pub fn encode(&self) -> String {
        format!("{}:{}", self.kind, self.path)
    }

    pub fn decode(encoded: &str) -> ResourceResult<Self> {
        let encoded = encoded.trim_start_matches('/');
        let (kind, path) = encoded
            .split_once(':')
            .ok_or_else(|| ResourceError::MissingKind(encoded.to_string()))?;
        Ok(Self::new(kind.parse()?, path))
    }

    pub fn source_path(&self) -> ResourceResult<SourcePath<'_>> {
        self.expect(ResourceKind::Src)?;
        let (package, file) = self
            .path
            .rsplit_once('/')
            .filter(|(p, f)| !p.is_empty() && !f.is_empty())
            .ok_or_else(|| self.malformed())?;
        Ok(SourcePath { package, file })
    }

    pub fn implementation_path(&self) -> ResourceResult<ImplementationPath<'_>> {
        self.expect(ResourceKind::Imp)?;
        let (package, type_name) = self
            .path
            .rsplit_once('.')
            .filter(|(p, t)| !p.is_empty() && !t.is_empty() && !t.contains('/'))
            .ok_or_else(|| self.malformed())?;
        Ok(ImplementationPath { package, type_name })
    }

    pub fn use_path(&self) -> ResourceResult<UsePath<'_>> {
        self.expect(ResourceKind::Use)?;
        let (package, identifier) = self
            .path
            .split_once("..")
            .filter(|(p, i)| !p.is_empty() && !i.is_empty())
            .ok_or_else(|| self.malformed())?;
        Ok(UsePath {
            package,
            identifier,
        })
    }

    /// `<kind>/<hash>.<ext>` name used when pages are written to disk.
    pub fn static_path(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.path.as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        format!(
            "{}/{}.{}",
            self.kind,
            &digest[..HASH_LEN],
            self.kind.extension()
        )
    }

    fn expect(&self, kind: ResourceKind) -> ResourceResult<()> {
        if self.kind == kind {
            Ok(())
        } else {
            Err(self.malformed())
        }
    }

    fn malformed(&self) -> ResourceError {
        ResourceError::MalformedPath {
            kind: self.kind.as_str(),
            path: self.path.clone(),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePath<'a> {
    pub package: &'a str,
    pub file: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImplementationPath<'a> {
    pub package: &'a str,
    pub type_name: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsePath<'a> {
    pub package: &'a str,
    pub identifier: &'a str,
}

/// Inverse of [`ResourceId::static_path`] for the resources written so far.
#[derive(Debug, Default)]
pub struct StaticPathTable {
    paths: HashMap<String, ResourceId>,
}

impl StaticPathTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: ResourceId) -> String {
        let path = id.static_path();
        self.paths.insert(path.clone(), id);
        path
    }

    pub fn resolve(&self, static_path: &str) -> ResourceResult<&ResourceId> {
        self.paths
            .get(static_path.trim_start_matches('/'))
            .ok_or_else(|| ResourceError::UnknownStaticPath(static_path.to_string()))
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
