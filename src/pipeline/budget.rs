//! Display budget reduction

use crate::graph::{NodeId, PerfumeNode};
use std::collections::HashSet;

/// Cap the perfume list at `limit`, keeping priority perfumes first
///
/// Priority perfumes are taken before any other perfume. If there are more
/// priority perfumes than the budget allows, the budget still wins and
/// the surplus priority perfumes are dropped. Relative order is kept within
/// both partitions.
pub fn apply_budget<'a>(
    perfumes: Vec<&'a PerfumeNode>,
    priority: &HashSet<NodeId>,
    limit: usize,
) -> Vec<&'a PerfumeNode> {
    let (mut must_include, rest): (Vec<_>, Vec<_>) =
        perfumes.into_iter().partition(|p| priority.contains(&p.id));

    if must_include.len() >= limit {
        must_include.truncate(limit);
        return must_include;
    }

    let room = limit - must_include.len();
    must_include.extend(rest.into_iter().take(room));
    must_include
}
