use std::cmp::Ordering;

/// The encoding token meaning "send the bytes untransformed".
pub const IDENTITY: &str = "identity";

/// The wildcard token, matching any encoding not otherwise listed.
pub const WILDCARD: &str = "*";

/// A parsed entry from the client's `Accept-Encoding` header.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptedEncoding {
    /// Lowercased, trimmed encoding token (`gzip`, `br`, `identity`, `*`, ...).
    pub token: String,
    /// Quality value in `[0.0, 1.0]`; `1.0` when the entry carries no `q`.
    pub weight: f32,
}

/// Parses an `Accept-Encoding` header value into entries ranked by weight,
/// highest first, ties kept in first-seen order.
///
/// The header is a comma-separated list of tokens, each optionally followed
/// by semicolon-separated parameters (e.g. `gzip, br;q=0.8`). An entry whose
/// `q` parameter is unparseable or outside `[0, 1]` is dropped; it never
/// aborts the rest of the negotiation.
pub fn parse_accept_encoding(header: &str) -> Vec<AcceptedEncoding> {
    let mut entries = Vec::new();

    for part in header.split(',') {
        let mut params = part.split(';');
        let token = match params.next() {
            Some(token) => token.trim().to_ascii_lowercase(),
            None => continue,
        };
        if token.is_empty() {
            continue;
        }

        let mut weight = 1.0f32;
        let mut valid = true;
        for param in params {
            let param = param.trim();
            if let Some(q) = param.strip_prefix("q=").or_else(|| param.strip_prefix("Q=")) {
                match q.trim().parse::<f32>() {
                    Ok(w) if (0.0..=1.0).contains(&w) => weight = w,
                    _ => {
                        valid = false;
                        break;
                    }
                }
            }
        }

        if valid {
            entries.push(AcceptedEncoding { token, weight });
        }
    }

    // Stable sort: equal weights keep their first-seen order.
    entries.sort_by(|a, b| b.weight.partial_cmp(&a.weight).unwrap_or(Ordering::Equal));
    entries
}

/// Whether the parsed entries explicitly disallow the identity encoding.
///
/// Identity is disallowed by an explicit `identity;q=0`, or by a `*;q=0`
/// when no explicit `identity` entry overrides the wildcard.
pub fn identity_forbidden(entries: &[AcceptedEncoding]) -> bool {
    let mut wildcard_zero = false;
    for entry in entries {
        if entry.token == IDENTITY {
            return entry.weight == 0.0;
        }
        if entry.token == WILDCARD && entry.weight == 0.0 {
            wildcard_zero = true;
        }
    }
    wildcard_zero
}
