//! Loader Dispatch
//!
//! Maps URI schemes to ordered lists of definition loaders. Loaders for a
//! scheme are tried most recently registered first; an optional filter can
//! reject a candidate before it runs. The first loader to succeed wins.

pub mod file;

use std::path::Path;
use std::sync::Arc;

use arbor_core::{DefinitionTree, Error, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use tracing::{debug, warn};
use url::Url;

pub use file::{JsonFileLoader, TomlFileLoader};

/// Produces definition trees from a location.
#[async_trait]
pub trait DefinitionLoader: Send + Sync {
    /// Short name used in diagnostics
    fn name(&self) -> &str;

    /// Load the definition tree at `uri`
    async fn load(&self, uri: &Url) -> Result<DefinitionTree>;
}

/// Decides whether a loader should be tried for a URI.
pub type LoaderFilter = Arc<dyn Fn(&Url) -> bool + Send + Sync>;

#[derive(Clone)]
struct Candidate {
    loader: Arc<dyn DefinitionLoader>,
    filter: Option<LoaderFilter>,
}

/// Scheme-keyed loader chains.
#[derive(Default)]
pub struct LoaderRegistry {
    schemes: DashMap<String, Vec<Candidate>>,
}

impl LoaderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in file loaders selected by `json`
    /// and `toml`
    pub fn with_file_loaders(json: bool, toml: bool) -> Self {
        let registry = Self::new();
        if json {
            registry.register(
                Arc::new(JsonFileLoader),
                Some(file::extension_filter("json")),
                &["file"],
            );
        }
        if toml {
            registry.register(
                Arc::new(TomlFileLoader),
                Some(file::extension_filter("toml")),
                &["file"],
            );
        }
        registry
    }

    /// Append `loader` to the chain of every scheme in `schemes`.
    pub fn register(
        &self,
        loader: Arc<dyn DefinitionLoader>,
        filter: Option<LoaderFilter>,
        schemes: &[&str],
    ) {
        for scheme in schemes {
            debug!("Registering loader {} for scheme {}", loader.name(), scheme);
            self.schemes
                .entry(scheme.to_lowercase())
                .or_default()
                .push(Candidate {
                    loader: Arc::clone(&loader),
                    filter: filter.clone(),
                });
        }
    }

    /// Number of loaders registered for `scheme`
    pub fn loader_count(&self, scheme: &str) -> usize {
        self.schemes
            .get(&scheme.to_lowercase())
            .map(|candidates| candidates.len())
            .unwrap_or(0)
    }

    /// Load `uri` with the first loader that succeeds.
    ///
    /// When every candidate fails, the returned error chains all failures,
    /// latest outermost. When none was tried, the error is `NoLoader`.
    pub async fn load(&self, uri: &Url) -> Result<DefinitionTree> {
        let candidates: Vec<Candidate> = self
            .schemes
            .get(uri.scheme())
            .map(|candidates| candidates.clone())
            .unwrap_or_default();

        let mut previous: Option<Error> = None;
        for candidate in candidates.iter().rev() {
            let name = candidate.loader.name();
            if let Some(filter) = &candidate.filter {
                if !filter(uri) {
                    debug!("Loader {} filtered out {}", name, uri);
                    continue;
                }
            }

            debug!("Trying loader {} for {}", name, uri);
            match candidate.loader.load(uri).await {
                Ok(tree) => return Ok(tree),
                Err(err) => {
                    warn!("Loader {} failed for {}: {}", name, uri, err);
                    previous = Some(Error::LoadFailed {
                        uri: uri.to_string(),
                        loader: name.to_string(),
                        source: Box::new(err),
                        previous: previous.map(Box::new),
                    });
                }
            }
        }

        Err(previous.unwrap_or_else(|| Error::NoLoader {
            uri: uri.to_string(),
        }))
    }
}

/// Interpret `location` as a URI, or else as a filesystem path.
pub fn parse_location(location: &str) -> Result<Url> {
    match Url::parse(location) {
        // Single-letter schemes are Windows drive letters
        Ok(url) if url.scheme().len() > 1 => Ok(url),
        _ => {
            let path = Path::new(location);
            let absolute = if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()?.join(path)
            };
            Url::from_file_path(&absolute).map_err(|()| {
                Error::Runtime(format!("cannot express {} as a file URI", absolute.display()))
            })
        }
    }
}
