use crate::store::{FileStore, StoreChain, StoreFile};

/// Resource name substituted for directory requests.
pub const INDEX_PAGE: &str = "index.html";

/// A successfully located pre-compressed artifact for one request.
pub(crate) struct ResolvedVariant {
    /// Path the outgoing request must be rewritten to before delegation.
    pub artifact_path: String,
    /// The uncompressed logical file the artifact stands in for; this is
    /// what content-type lookup runs against.
    pub logical_path: String,
    /// Negotiated encoding token, verbatim for `Content-Encoding`.
    pub encoding: String,
    /// Byte size of the artifact, verbatim for `Content-Length`.
    pub size: u64,
    /// Open handle to the artifact.
    #[allow(dead_code)]
    pub file: Box<dyn StoreFile>,
}

/// Lexically cleans a rooted request path: collapses `.`, `..` and repeated
/// separators without touching the filesystem. The result has a leading `/`
/// and no trailing `/` (except for the root itself).
pub(crate) fn clean_path(path: &str) -> String {
    let mut components: Vec<&str> = Vec::new();
    for component in path.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                components.pop();
            }
            c => components.push(c),
        }
    }

    if components.is_empty() {
        return "/".to_string();
    }
    let mut cleaned = String::with_capacity(path.len());
    for component in components {
        cleaned.push('/');
        cleaned.push_str(component);
    }
    cleaned
}

/// Attempts to locate the pre-compressed artifact for `request_path` under
/// the given encoding suffix.
///
/// A request path with a trailing separator denotes a directory and resolves
/// against [`INDEX_PAGE`], so `/docs/` probes `/docs/index.html<suffix>`.
/// Absence of the artifact (or any open error) is a normal negative result.
pub(crate) fn resolve_variant(
    store: &StoreChain,
    request_path: &str,
    encoding: &str,
    suffix: &str,
) -> Option<ResolvedVariant> {
    let cleaned = clean_path(request_path);
    let logical_path = if request_path.ends_with('/') {
        if cleaned == "/" {
            format!("/{INDEX_PAGE}")
        } else {
            format!("{cleaned}/{INDEX_PAGE}")
        }
    } else {
        cleaned
    };
    let artifact_path = format!("{logical_path}{suffix}");

    let file = store.open(&artifact_path).ok()?;
    let size = file.size().ok()?;
    log::trace!("resolved {artifact_path} ({size} bytes) for encoding {encoding}");

    Some(ResolvedVariant {
        artifact_path,
        logical_path,
        encoding: encoding.to_string(),
        size,
        file,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn chain(store: MemoryStore) -> StoreChain {
        let mut chain = StoreChain::new();
        chain.push(store);
        chain
    }

    #[test]
    fn test_clean_path() {
        assert_eq!(clean_path("/"), "/");
        assert_eq!(clean_path(""), "/");
        assert_eq!(clean_path("/a/b"), "/a/b");
        assert_eq!(clean_path("/a//b/"), "/a/b");
        assert_eq!(clean_path("/a/./b"), "/a/b");
        assert_eq!(clean_path("/a/../b"), "/b");
        assert_eq!(clean_path("/../../a"), "/a");
        assert_eq!(clean_path("a/b"), "/a/b");
    }

    #[test]
    fn test_file_path_gets_suffix_appended() {
        let store = chain(MemoryStore::new().insert("/a.txt.gz", &b"x"[..]));

        let variant = resolve_variant(&store, "/a.txt", "gzip", ".gz").unwrap();
        assert_eq!(variant.artifact_path, "/a.txt.gz");
        assert_eq!(variant.logical_path, "/a.txt");
        assert_eq!(variant.encoding, "gzip");
        assert_eq!(variant.size, 1);
    }

    #[test]
    fn test_directory_resolves_against_index() {
        let store = chain(MemoryStore::new().insert("/docs/index.html.gz", &b"x"[..]));

        let variant = resolve_variant(&store, "/docs/", "gzip", ".gz").unwrap();
        assert_eq!(variant.artifact_path, "/docs/index.html.gz");
        assert_eq!(variant.logical_path, "/docs/index.html");
    }

    #[test]
    fn test_root_resolves_against_index() {
        let store = chain(MemoryStore::new().insert("/index.html.gz", &b"x"[..]));

        let variant = resolve_variant(&store, "/", "gzip", ".gz").unwrap();
        assert_eq!(variant.artifact_path, "/index.html.gz");
        assert_eq!(variant.logical_path, "/index.html");
    }

    #[test]
    fn test_missing_artifact_is_none() {
        let store = chain(MemoryStore::new().insert("/a.txt", &b"x"[..]));
        assert!(resolve_variant(&store, "/a.txt", "gzip", ".gz").is_none());
    }

    #[test]
    fn test_no_index_substitution_for_files() {
        let store = chain(MemoryStore::new().insert("/docs/index.html.gz", &b"x"[..]));
        assert!(resolve_variant(&store, "/docs", "gzip", ".gz").is_none());
    }
}
