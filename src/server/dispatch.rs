//! Request dispatch: resource id in, rendered page out.

use super::cache::{CacheKey, PageCache};
use super::pool::{ContentPool, PageContent};
use super::resource::{ResourceId, ResourceKind, StaticPathTable};
use crate::config::PageOptions;
use crate::error::ResourceError;
use crate::index::Index;
use crate::packages::PackageOrder;
use crate::{IndexError, IndexResult, Settings};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;
use tracing::{debug, warn};

const STYLESHEET: &str = "body{font-family:monospace}\
.k{font-weight:bold}.s{color:#a31515}.n{color:#098658}.c{color:#008000}\
.d{text-decoration:underline}a{color:inherit}";

const SCRIPT: &str = "document.addEventListener('DOMContentLoaded',function(){});";

#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Arc<[u8]>,
}

impl Response {
    fn json(status: u16, value: &impl Serialize) -> Self {
        let body = serde_json::to_vec(value).unwrap_or_default();
        Self {
            status,
            content_type: "application/json",
            body: Arc::from(body),
        }
    }

    fn error(error: &IndexError) -> Self {
        Self::json(
            error.http_status(),
            &serde_json::json!({
                "error": error.to_string(),
                "code": error.status_code(),
                "suggestions": error.recovery_suggestions(),
            }),
        )
    }

    fn not_found(error: &ResourceError) -> Self {
        Self::json(
            404,
            &serde_json::json!({
                "error": error.to_string(),
                "code": "RESOURCE_NOT_FOUND",
            }),
        )
    }

    fn loading() -> Self {
        Self::json(
            425,
            &serde_json::json!({
                "status": "loading",
                "message": "The index is being built, this page refreshes when it is ready",
            }),
        )
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// Shared serve-phase state. The index slot stays empty until the build
/// finishes; requests arriving before then get the loading page.
#[derive(Debug)]
pub struct Dispatcher {
    index: Arc<RwLock<Option<Arc<Index>>>>,
    cache: PageCache,
    pool: Arc<ContentPool>,
    options: RwLock<PageOptions>,
    statics: Mutex<StaticPathTable>,
}

impl Dispatcher {
    pub fn new(settings: &Settings) -> Self {
        Self {
            index: Arc::new(RwLock::new(None)),
            cache: PageCache::new(settings.server.cache_max_entries),
            pool: ContentPool::new(settings.server.content_chunk_size),
            options: RwLock::new(settings.page_options()),
            statics: Mutex::new(StaticPathTable::new()),
        }
    }

    /// Seal the built index into the dispatcher.
    pub fn install(&self, index: Index) {
        *self.index.write() = Some(Arc::new(index));
        self.cache.clear();
    }

    pub fn is_ready(&self) -> bool {
        self.index.read().is_some()
    }

    pub fn index(&self) -> IndexResult<Arc<Index>> {
        self.index.read().clone().ok_or(IndexError::TooEarly)
    }

    pub fn options(&self) -> PageOptions {
        self.options.read().clone()
    }

    /// Switch output options, dropping the pages rendered with the old ones.
    pub fn set_options(&self, options: PageOptions) {
        let old = std::mem::replace(&mut *self.options.write(), options);
        self.cache.invalidate_options(&old);
    }

    pub fn cache(&self) -> &PageCache {
        &self.cache
    }

    pub fn pool(&self) -> &Arc<ContentPool> {
        &self.pool
    }

    /// Remember `id` for static generation and return its on-disk name.
    pub fn register_static(&self, id: ResourceId) -> String {
        self.statics.lock().register(id)
    }

    /// Answer a request path: either `<kind>:<path>` or a registered static name.
    pub fn dispatch(&self, request: &str) -> Response {
        let request = request.trim_start_matches('/');
        let resource = if request.is_empty() {
            Ok(ResourceId::new(ResourceKind::Api, "packages"))
        } else if request.contains(':') {
            ResourceId::decode(request)
        } else {
            self.statics.lock().resolve(request).cloned()
        };

        let resource = match resource {
            Ok(resource) => resource,
            Err(error) => {
                debug!(request, %error, "unknown resource");
                return Response::not_found(&error);
            }
        };
        self.serve(&resource)
    }

    pub fn serve(&self, resource: &ResourceId) -> Response {
        if !resource.kind.is_page() {
            return self.asset(resource);
        }

        let Ok(index) = self.index() else {
            return Response::loading();
        };

        let options = self.options();
        let key = CacheKey::new(resource.clone(), options.clone());
        if let Some(body) = self.cache.get(&key) {
            return Response {
                status: 200,
                content_type: resource.kind.content_type(),
                body,
            };
        }

        match self.render(&index, resource, &options) {
            Ok(content) => {
                let body = content.to_bytes();
                self.cache.insert(key, Arc::clone(&body));
                Response {
                    status: 200,
                    content_type: resource.kind.content_type(),
                    body,
                }
            }
            Err(error) => {
                if !error.is_not_found() {
                    warn!(%resource, %error, "failed to render page");
                }
                Response::error(&error)
            }
        }
    }

    fn render(
        &self,
        index: &Index,
        resource: &ResourceId,
        options: &PageOptions,
    ) -> IndexResult<PageContent> {
        let unexported = options.show_unexported;
        let path = resource.path.as_str();
        let mut content = self.pool.content();

        match resource.kind {
            ResourceKind::Pkg => write_json(&mut content, &index.package_detail(path, unexported)?),
            ResourceKind::Dep => write_json(&mut content, &index.dependencies(path)?),
            ResourceKind::Src => {
                let source = resource.source_path().map_err(not_found)?;
                write_json(&mut content, &index.source(source.package, source.file)?)
            }
            ResourceKind::Imp => {
                let imp = resource.implementation_path().map_err(not_found)?;
                write_json(&mut content, &index.implementations(imp.package, imp.type_name)?)
            }
            ResourceKind::Use => {
                let uses = resource.use_path().map_err(not_found)?;
                write_json(&mut content, &index.references(uses.package, uses.identifier)?)
            }
            ResourceKind::Api => match path.split_once('/') {
                None if path == "stats" => write_json(&mut content, index.stats()),
                None if path == "packages" => {
                    write_json(&mut content, &index.packages(PackageOrder::Alphabet))
                }
                Some(("packages", order)) => {
                    let order = order.parse::<PackageOrder>().map_err(|_| {
                        IndexError::PackageNotFound {
                            path: path.to_string(),
                        }
                    })?;
                    write_json(&mut content, &index.packages(order))
                }
                _ => Err(IndexError::PackageNotFound {
                    path: path.to_string(),
                }),
            },
            ResourceKind::Css | ResourceKind::Jvs | ResourceKind::Svg | ResourceKind::Png => {
                Ok(())
            }
        }?;
        Ok(content)
    }

    fn asset(&self, resource: &ResourceId) -> Response {
        let body: &str = match resource.kind {
            ResourceKind::Css => STYLESHEET,
            ResourceKind::Jvs => SCRIPT,
            _ => {
                return Response::not_found(&ResourceError::UnknownStaticPath(resource.encode()));
            }
        };
        Response {
            status: 200,
            content_type: resource.kind.content_type(),
            body: Arc::from(body.as_bytes()),
        }
    }
}

fn write_json(content: &mut PageContent, value: &impl Serialize) -> IndexResult<()> {
    serde_json::to_writer(&mut *content, value)
        .map_err(|e| IndexError::General(format!("Failed to serialize page: {e}")))?;
    content
        .flush()
        .map_err(|e| IndexError::General(format!("Failed to flush page: {e}")))
}

fn not_found(error: ResourceError) -> IndexError {
    IndexError::IdentifierNotFound {
        package: String::new(),
        name: error.to_string(),
    }
}
