use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Inclusive numeric range bound with a total order, so range clauses can
/// live in ordered sets.
#[derive(Debug, Clone, Copy)]
pub struct Bound(pub f64);

impl PartialEq for Bound {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for Bound {}

impl PartialOrd for Bound {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Bound {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for Bound {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

/// One boolean clause of a search request. Renders to the engine's
/// standard query syntax through `Display`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Clause {
    MatchAll,                                                   // *:*
    Terms { field: String, values: BTreeSet<String> },          // field is one of values
    Range { field: String, min: Option<Bound>, max: Option<Bound> },
    Exists { field: String },
    NotExists { field: String },
    AnyOf(BTreeSet<Clause>),                                    // OR across fields
}

impl Clause {
    pub fn terms<I, S>(field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Clause::Terms {
            field: field.to_string(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// A clause that constrains nothing once blank values are removed.
    pub fn is_blank(&self) -> bool {
        match self {
            Clause::Terms { values, .. } => values.iter().all(|v| v.trim().is_empty()),
            Clause::Range { min, max, .. } => min.is_none() && max.is_none(),
            Clause::AnyOf(clauses) => clauses.iter().all(Clause::is_blank),
            _ => false,
        }
    }

    pub fn has_non_finite_bound(&self) -> bool {
        match self {
            Clause::Range { min, max, .. } => [min, max]
                .into_iter()
                .flatten()
                .any(|Bound(value)| !value.is_finite()),
            Clause::AnyOf(clauses) => clauses.iter().any(Clause::has_non_finite_bound),
            _ => false,
        }
    }

    /// Drops blank values and blank alternatives. Returns `None` when
    /// nothing is left.
    pub fn stripped(self) -> Option<Clause> {
        match self {
            Clause::Terms { field, values } => {
                let values: BTreeSet<String> = values
                    .into_iter()
                    .filter(|v| !v.trim().is_empty())
                    .collect();
                if values.is_empty() {
                    None
                } else {
                    Some(Clause::Terms { field, values })
                }
            }
            Clause::AnyOf(clauses) => {
                let clauses: BTreeSet<Clause> = clauses
                    .into_iter()
                    .filter_map(Clause::stripped)
                    .collect();
                match clauses.len() {
                    0 => None,
                    1 => clauses.into_iter().next(),
                    _ => Some(Clause::AnyOf(clauses)),
                }
            }
            clause if clause.is_blank() => None,
            clause => Some(clause),
        }
    }

    /// Applies `f` to every term value, keeping set semantics.
    pub fn map_values(self, f: &impl Fn(&str) -> String) -> Clause {
        match self {
            Clause::Terms { field, values } => Clause::Terms {
                field,
                values: values.iter().map(|v| f(v)).collect(),
            },
            Clause::AnyOf(clauses) => {
                Clause::AnyOf(clauses.into_iter().map(|c| c.map_values(f)).collect())
            }
            clause => clause,
        }
    }
}

/// Case and whitespace folding applied when a builder normalizes values.
pub fn normalize_value(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

fn bound_to_string(bound: Option<Bound>) -> String {
    match bound {
        Some(Bound(value)) => value.to_string(),
        None => "*".to_string(),
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Clause::MatchAll => f.write_str("*:*"),
            Clause::Terms { field, values } => {
                let joined = values.iter().map(|v| quote(v)).collect::<Vec<_>>().join(" OR ");
                write!(f, "{}:({})", field, joined)
            }
            Clause::Range { field, min, max } => {
                write!(f, "{}:[{} TO {}]", field, bound_to_string(*min), bound_to_string(*max))
            }
            Clause::Exists { field } => write!(f, "{}:*", field),
            Clause::NotExists { field } => write!(f, "-{}:*", field),
            Clause::AnyOf(clauses) => {
                let joined = clauses.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(" OR ");
                write!(f, "({})", joined)
            }
        }
    }
}
