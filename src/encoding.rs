/// Maps `Content-Encoding` tokens to the on-disk suffix of their artifacts.
///
/// The default table covers `gzip`/`x-gzip` (`.gz`), `br` (`.br`), `deflate`
/// (`.fl`) and `zstd` (`.zst`). Supporting a new compression scheme only
/// takes one more entry.
#[derive(Debug, Clone)]
pub struct EncodingTable {
    entries: Vec<(String, String)>,
}

const BUILTIN: &[(&str, &str)] = &[
    ("gzip", ".gz"),
    ("x-gzip", ".gz"),
    ("br", ".br"),
    ("deflate", ".fl"),
    ("zstd", ".zst"),
];

impl Default for EncodingTable {
    fn default() -> Self {
        Self {
            entries: BUILTIN
                .iter()
                .map(|(token, suffix)| (token.to_string(), suffix.to_string()))
                .collect(),
        }
    }
}

impl EncodingTable {
    /// Creates a table with no entries.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds or replaces the suffix for an encoding token. The token is
    /// matched case-insensitively against parsed header entries.
    pub fn insert(&mut self, token: &str, suffix: &str) {
        let token = token.to_ascii_lowercase();
        match self.entries.iter_mut().find(|(t, _)| *t == token) {
            Some((_, s)) => *s = suffix.to_string(),
            None => self.entries.push((token, suffix.to_string())),
        }
    }

    /// Looks up the on-disk suffix for a (lowercased) encoding token.
    pub fn suffix_for(&self, token: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, s)| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_entries() {
        let table = EncodingTable::default();
        assert_eq!(table.suffix_for("gzip"), Some(".gz"));
        assert_eq!(table.suffix_for("x-gzip"), Some(".gz"));
        assert_eq!(table.suffix_for("br"), Some(".br"));
        assert_eq!(table.suffix_for("deflate"), Some(".fl"));
        assert_eq!(table.suffix_for("zstd"), Some(".zst"));
    }

    #[test]
    fn test_unknown_token() {
        let table = EncodingTable::default();
        assert_eq!(table.suffix_for("compress"), None);
        assert_eq!(table.suffix_for("identity"), None);
        assert_eq!(table.suffix_for("*"), None);
    }

    #[test]
    fn test_insert_extends_and_replaces() {
        let mut table = EncodingTable::empty();
        assert_eq!(table.suffix_for("gzip"), None);

        table.insert("LZMA", ".xz");
        assert_eq!(table.suffix_for("lzma"), Some(".xz"));

        table.insert("lzma", ".lzma");
        assert_eq!(table.suffix_for("lzma"), Some(".lzma"));
    }
}
