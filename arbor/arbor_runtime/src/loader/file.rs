//! File loaders for JSON and TOML definition documents.

use std::path::PathBuf;
use std::sync::Arc;

use arbor_core::{DefinitionDoc, DefinitionTree, Error, Result};
use async_trait::async_trait;
use tokio::fs;
use tracing::debug;
use url::Url;

use super::{DefinitionLoader, LoaderFilter};

/// Loads `file:` URIs holding a JSON definition document.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonFileLoader;

/// Loads `file:` URIs holding a TOML definition document.
#[derive(Debug, Default, Clone, Copy)]
pub struct TomlFileLoader;

#[async_trait]
impl DefinitionLoader for JsonFileLoader {
    fn name(&self) -> &str {
        "json-file"
    }

    async fn load(&self, uri: &Url) -> Result<DefinitionTree> {
        let content = read(uri).await?;
        let doc: DefinitionDoc = serde_json::from_str(&content)
            .map_err(|e| Error::Serialization(format!("{uri}: {e}")))?;
        DefinitionTree::from_doc(&doc)
    }
}

#[async_trait]
impl DefinitionLoader for TomlFileLoader {
    fn name(&self) -> &str {
        "toml-file"
    }

    async fn load(&self, uri: &Url) -> Result<DefinitionTree> {
        let content = read(uri).await?;
        let doc: DefinitionDoc =
            toml::from_str(&content).map_err(|e| Error::Serialization(format!("{uri}: {e}")))?;
        DefinitionTree::from_doc(&doc)
    }
}

/// The local path a `file:` URI names.
pub fn uri_path(uri: &Url) -> Result<PathBuf> {
    if uri.scheme() != "file" {
        return Err(Error::Runtime(format!("{uri} is not a file URI")));
    }
    uri.to_file_path()
        .map_err(|()| Error::Runtime(format!("{uri} does not name a local file")))
}

/// Whether the path of `uri` ends in `.{extension}` (case-insensitive).
pub fn has_extension(uri: &Url, extension: &str) -> bool {
    uri.path_segments()
        .and_then(|segments| segments.last())
        .and_then(|file| file.rsplit_once('.'))
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case(extension))
}

/// A loader filter accepting URIs with the given extension.
pub fn extension_filter(extension: &'static str) -> LoaderFilter {
    Arc::new(move |uri: &Url| has_extension(uri, extension))
}

async fn read(uri: &Url) -> Result<String> {
    let path = uri_path(uri)?;
    debug!("Reading definition file {}", path.display());
    Ok(fs::read_to_string(&path).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn file_url(dir: &TempDir, name: &str) -> Url {
        Url::from_file_path(dir.path().join(name)).unwrap()
    }

    #[tokio::test]
    async fn test_json_loader() {
        let dir = TempDir::new().unwrap();
        let url = file_url(&dir, "app.json");
        fs::write(
            uri_path(&url).unwrap(),
            r#"{"name": "App", "children": [{"name": "Host", "class": "import:nodes#String", "value": "localhost"}]}"#,
        )
        .await
        .unwrap();

        let tree = JsonFileLoader.load(&url).await.unwrap();
        assert_eq!(tree.root().name().as_str(), "App");
        assert_eq!(tree.root().children().next().unwrap().value(), "localhost");
    }

    #[tokio::test]
    async fn test_toml_loader() {
        let dir = TempDir::new().unwrap();
        let url = file_url(&dir, "app.toml");
        let content = r#"
name = "App"

[[children]]
name = "Port"
class = "import:nodes#String"
value = 8080
"#;
        fs::write(uri_path(&url).unwrap(), content).await.unwrap();

        let tree = TomlFileLoader.load(&url).await.unwrap();
        assert_eq!(tree.root().children().next().unwrap().value(), "8080");
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let url = file_url(&dir, "absent.json");
        assert!(matches!(JsonFileLoader.load(&url).await, Err(Error::Io(_))));
    }

    #[tokio::test]
    async fn test_malformed_document() {
        let dir = TempDir::new().unwrap();
        let url = file_url(&dir, "bad.json");
        fs::write(uri_path(&url).unwrap(), "{ not json").await.unwrap();
        assert!(matches!(
            JsonFileLoader.load(&url).await,
            Err(Error::Serialization(_))
        ));
    }

    #[test]
    fn test_has_extension() {
        let url = Url::parse("file:///defs/App.JSON").unwrap();
        assert!(has_extension(&url, "json"));
        assert!(!has_extension(&url, "toml"));
        assert!(!has_extension(&Url::parse("file:///defs/app").unwrap(), "json"));
    }
}
