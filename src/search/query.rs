//! Query parsing: kind filter prefix and the three query modes.
//!
//! Parsing never fails; degenerate input still produces a structured query,
//! which the engine then matches against nothing rather than everything.

use crate::index::TypeTerm;
use crate::kind::ItemKind;
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// Kind filter prefix, e.g. `fn:` or `const:`. Only these eight names are
/// recognized, matching the original query surface.
static KIND_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(fn|mod|struct|enum|trait|type|const|macro)\s*:\s*")
        .expect("kind prefix pattern is valid")
});

/// A parsed search query. Transient: built per call, never retained.
#[derive(Debug, Clone)]
pub struct Query {
    /// The subquery text exactly as given (alias lookup key).
    pub raw: String,
    /// Lowercased text after the kind prefix is stripped.
    pub text: String,
    /// Kind filter taken from the `kind:` prefix.
    pub filter: Option<ItemKind>,
    pub mode: QueryMode,
}

#[derive(Debug, Clone)]
pub enum QueryMode {
    /// Quoted query: exact name plus optional generics.
    Literal(TypeTerm),
    /// `inputs -> output` query. Inputs are sorted so argument order never
    /// matters.
    Signature {
        inputs: Vec<TypeTerm>,
        output: TypeTerm,
    },
    /// Free text, optionally path-qualified.
    Bare {
        /// Requested ancestor segments, lowercase, underscores kept.
        path: Vec<String>,
        /// Final name token, lowercase, underscores stripped.
        name: String,
        /// Term used for argument/return matching.
        term: TypeTerm,
    },
}

impl Query {
    pub fn parse(raw: &str) -> Self {
        let mut rest = raw;
        let mut filter = None;
        if let Some(captures) = KIND_PREFIX.captures(raw) {
            filter = ItemKind::from_filter_name(&captures[1].to_lowercase());
            rest = &raw[captures[0].len()..];
        }
        let text = rest.to_lowercase();
        let mode = classify(&text);
        Self {
            raw: raw.to_owned(),
            text,
            filter,
            mode,
        }
    }
}

fn classify(text: &str) -> QueryMode {
    let bytes = text.as_bytes();
    if bytes.len() >= 2
        && (bytes[0] == b'"' || bytes[0] == b'\'')
        && bytes[bytes.len() - 1] == bytes[0]
    {
        return QueryMode::Literal(extract_generics(&text[1..text.len() - 1]));
    }

    if let Some((left, right)) = text.split_once("->") {
        let mut raw_inputs: Vec<&str> = split_top_level_commas(left)
            .into_iter()
            .map(str::trim)
            .collect();
        raw_inputs.sort_unstable();
        return QueryMode::Signature {
            inputs: raw_inputs.into_iter().map(extract_generics).collect(),
            output: extract_generics(right.trim()),
        };
    }

    let stripped: String = text.chars().filter(|&c| c != '_').collect();
    let term = extract_generics(&stripped);
    let mut segments: Vec<String> = text
        .split("::")
        .filter(|segment| !segment.is_empty())
        .map(str::to_owned)
        .collect();
    let name = segments
        .pop()
        .map(|segment| strip_underscores(&segment).into_owned())
        .unwrap_or_default();
    QueryMode::Bare {
        path: segments,
        name,
        term,
    }
}

/// Splits `name<g1, g2>` into a type term. Input is already lowercase.
pub(crate) fn extract_generics(text: &str) -> TypeTerm {
    if let Some(open) = text.find('<') {
        let close = text.rfind('>').filter(|&at| at > open);
        let inner = match close {
            Some(at) => &text[open + 1..at],
            None => &text[open + 1..],
        };
        TypeTerm {
            name: text[..open].to_owned(),
            generics: inner
                .split(',')
                .map(|generic| generic.trim().to_owned())
                .filter(|generic| !generic.is_empty())
                .collect(),
        }
    } else {
        TypeTerm {
            name: text.to_owned(),
            generics: Vec::new(),
        }
    }
}

/// Splits on commas that sit outside any `<...>` nesting.
pub(crate) fn split_top_level_commas(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (at, c) in text.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&text[start..at]);
                start = at + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

pub(crate) fn strip_underscores(text: &str) -> Cow<'_, str> {
    if text.contains('_') {
        Cow::Owned(text.chars().filter(|&c| c != '_').collect())
    } else {
        Cow::Borrowed(text)
    }
}
