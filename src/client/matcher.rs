use crate::core::types::IndexableDocument;
use crate::query::ast::{Bound, Clause};

/// Evaluates clauses against a stored document the way the engine's
/// keyword fields do: exact value equality, inclusive numeric ranges.
pub struct DocumentMatcher;

impl DocumentMatcher {
    /// True when the document satisfies every clause.
    pub fn matches_all(doc: &IndexableDocument, clauses: &[Clause]) -> bool {
        clauses.iter().all(|clause| Self::matches(doc, clause))
    }

    pub fn matches(doc: &IndexableDocument, clause: &Clause) -> bool {
        match clause {
            Clause::MatchAll => true,

            Clause::Terms { field, values } => doc
                .get_field(field)
                .map(|value| value.as_texts().iter().any(|text| values.contains(text)))
                .unwrap_or(false),

            Clause::Range { field, min, max } => doc
                .get_field(field)
                .and_then(|value| value.as_number())
                .map(|number| Self::within(number, *min, *max))
                .unwrap_or(false),

            Clause::Exists { field } => doc.get_field(field).is_some(),

            Clause::NotExists { field } => doc.get_field(field).is_none(),

            Clause::AnyOf(clauses) => clauses.iter().any(|c| Self::matches(doc, c)),
        }
    }

    fn within(number: f64, min: Option<Bound>, max: Option<Bound>) -> bool {
        let above = min.map(|Bound(min)| number >= min).unwrap_or(true);
        let below = max.map(|Bound(max)| number <= max).unwrap_or(true);
        above && below
    }
}
