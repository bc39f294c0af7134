//! Attribute filter over perfume nodes

use super::types::FilterState;
use crate::graph::PerfumeNode;
use std::collections::BTreeSet;

/// Keep the perfumes that match every non-empty selection dimension
///
/// The accord dimension matches on `primary_accord` only; the full accord
/// list is used later, by the accord edge ranker. Brand, season, occasion and
/// gender match when any of the perfume's values is selected. Input order is
/// preserved.
pub fn filter_perfumes<'a, I>(perfumes: I, state: &FilterState) -> Vec<&'a PerfumeNode>
where
    I: IntoIterator<Item = &'a PerfumeNode>,
{
    perfumes
        .into_iter()
        .filter(|p| !state.my_perfumes_only || p.is_registered())
        .filter(|p| matches(p, state))
        .collect()
}

/// Whether a single perfume passes the attribute filter
pub fn matches(perfume: &PerfumeNode, state: &FilterState) -> bool {
    matches_one(perfume.primary_accord.as_deref(), &state.selected_accords)
        && matches_one(perfume.brand.as_deref(), &state.selected_brands)
        && matches_any(&perfume.seasons, &state.selected_seasons)
        && matches_any(&perfume.occasions, &state.selected_occasions)
        && matches_any(&perfume.genders, &state.selected_genders)
}

fn matches_one(value: Option<&str>, selected: &BTreeSet<String>) -> bool {
    if selected.is_empty() {
        return true;
    }
    value.is_some_and(|v| selected.contains(v))
}

fn matches_any(values: &[String], selected: &BTreeSet<String>) -> bool {
    selected.is_empty() || values.iter().any(|v| selected.contains(v))
}
