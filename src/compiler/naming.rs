//! Identifier sanitizing and camelCase → snake_case column naming.

use std::sync::LazyLock;

use dashmap::DashMap;
use regex::Regex;

/// Characters allowed in identifiers taken from caller input.
static UNSAFE_CHARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]+").unwrap());

static UPPERCASE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Z]").unwrap());

/// Strip everything outside `[A-Za-z0-9_]`.
///
/// This is the only defense for identifiers; values go through a
/// `ValueEscaper` instead.
pub fn sanitize(s: &str) -> String {
    UNSAFE_CHARS.replace_all(s, "").into_owned()
}

/// Lower-case the first character (`EntityTeam` → `entityTeam`).
pub fn lcfirst(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `assignedUserId` → `assigned_user_id`, `EntityTeam` → `entity_team`.
pub fn to_snake_case(s: &str) -> String {
    let head = lcfirst(s);
    UPPERCASE
        .replace_all(&head, |caps: &regex::Captures| {
            format!("_{}", caps[0].to_lowercase())
        })
        .into_owned()
}

/// Memoized column-name conversion shared by every query of one compiler.
///
/// The mapping is a fixed string transform, so entries are never invalidated
/// and concurrent recomputation is harmless.
#[derive(Debug, Default)]
pub struct ColumnNames {
    cache: DashMap<String, String>,
}

impl ColumnNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to_db(&self, name: &str) -> String {
        if let Some(hit) = self.cache.get(name) {
            return hit.clone();
        }
        let converted = to_snake_case(name);
        self.cache.insert(name.to_string(), converted.clone());
        converted
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
