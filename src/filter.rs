//! Compiles a tag selection into tag-membership predicates on a record query.

use std::collections::BTreeSet;

use crate::selection::{AndOrSelection, Combinator, Selection};

/// A record query that can be narrowed by tag membership.
///
/// Each call narrows the running result independently, the way chained
/// `filter`/`exclude` calls compose on a query set.
pub trait TagQuery<Id>: Sized {
    /// Keep records tagged with `id`.
    fn filter_tagged(self, id: &Id) -> Self;

    /// Keep records tagged with at least one of `ids`, as a single predicate.
    fn filter_tagged_any(self, ids: &BTreeSet<Id>) -> Self;

    /// Drop records tagged with `id`.
    fn exclude_tagged(self, id: &Id) -> Self;

    /// Drop repeated records.
    fn distinct(self) -> Self;
}

/// Apply `selection` to `query`.
///
/// Included tags narrow the query first, one predicate per tag under
/// [`Combinator::And`] or a single disjunction under [`Combinator::Or`].
/// Excluded tags are subtracted afterwards, so a tag both included and
/// excluded ends up excluded. An empty selection returns `query` untouched.
pub fn apply_selection<Id, Q>(query: Q, selection: &Selection<Id>, combinator: Combinator) -> Q
where
    Id: Ord,
    Q: TagQuery<Id>,
{
    if selection.is_empty() {
        return query;
    }

    let mut query = match combinator {
        Combinator::And => selection
            .includes
            .iter()
            .fold(query, |query, id| query.filter_tagged(id)),
        Combinator::Or if selection.includes.is_empty() => query,
        Combinator::Or => query.filter_tagged_any(&selection.includes),
    };

    for id in &selection.excludes {
        query = query.exclude_tagged(id);
    }

    query.distinct()
}

/// Apply the composite AND/OR filter value.
pub fn apply_and_or<Id, Q>(query: Q, value: &AndOrSelection<Id>) -> Q
where
    Id: Ord,
    Q: TagQuery<Id>,
{
    apply_selection(query, &value.selection, value.combinator)
}

/// A record that knows its own tags.
pub trait Tagged<Id> {
    fn has_tag(&self, id: &Id) -> bool;
}

/// In-memory record collection, for callers that already hold the records.
impl<Id, R> TagQuery<Id> for Vec<R>
where
    R: Tagged<Id> + PartialEq,
{
    fn filter_tagged(mut self, id: &Id) -> Self {
        self.retain(|record| record.has_tag(id));
        self
    }

    fn filter_tagged_any(mut self, ids: &BTreeSet<Id>) -> Self {
        self.retain(|record| ids.iter().any(|id| record.has_tag(id)));
        self
    }

    fn exclude_tagged(mut self, id: &Id) -> Self {
        self.retain(|record| !record.has_tag(id));
        self
    }

    fn distinct(self) -> Self {
        let mut unique: Vec<R> = Vec::with_capacity(self.len());
        for record in self {
            if !unique.contains(&record) {
                unique.push(record);
            }
        }
        unique
    }
}
