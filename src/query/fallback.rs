use crate::query::plan::QueryPlan;
use crate::schema::field::Collection;

/// Ordered sequence of plans for free-text lookups, most specific first.
/// The first plan that finds anything wins; see
/// `CollectionProxy::query_with_fallback`.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackSearch<C: Collection> {
    plans: Vec<QueryPlan<C>>,
}

impl<C: Collection> FallbackSearch<C> {
    pub fn new(first: QueryPlan<C>) -> Self {
        FallbackSearch { plans: vec![first] }
    }

    pub fn or_else(mut self, plan: QueryPlan<C>) -> Self {
        self.plans.push(plan);
        self
    }

    pub fn plans(&self) -> &[QueryPlan<C>] {
        &self.plans
    }
}
