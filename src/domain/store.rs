use std::fmt;

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreRecord {
    pub id: String,
    pub name: String,
}

impl StoreRecord {
    /// Builds a record from a `(id, name)` reference row. Missing cells read as empty.
    pub fn from_row(row: &[String]) -> Self {
        let cell = |index: usize| row.get(index).cloned().unwrap_or_default();
        Self {
            id: cell(0),
            name: cell(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreWarning {
    NotFound,
    Ambiguous,
}

impl fmt::Display for StoreWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreWarning::NotFound => write!(f, "store not found by name"),
            StoreWarning::Ambiguous => write!(f, "multiple rows share this store name"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreResolution {
    /// Empty when no reference row matched.
    pub store_id: String,
    pub matches: usize,
    pub warning: Option<StoreWarning>,
}

/// Canonical comparison form of a store name: lower-cased, accents removed,
/// whitespace runs collapsed and trimmed.
pub fn normalize_store_name(name: &str) -> String {
    let stripped: String = name
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Looks `name` up in the reference rows.
///
/// When several rows match, the last one scanned wins and the result carries
/// [`StoreWarning::Ambiguous`].
pub fn resolve_store(records: &[StoreRecord], name: &str) -> StoreResolution {
    let target = normalize_store_name(name);

    let mut store_id = String::new();
    let mut matches = 0;
    for record in records {
        if normalize_store_name(&record.name) == target {
            store_id = record.id.clone();
            matches += 1;
        }
    }

    let warning = match matches {
        0 => Some(StoreWarning::NotFound),
        1 => None,
        _ => Some(StoreWarning::Ambiguous),
    };

    StoreResolution {
        store_id,
        matches,
        warning,
    }
}
