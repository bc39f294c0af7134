//! Display labels and filter vocabularies

use crate::graph::{Dataset, PerfumeNode};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Localized display names, as served by `GET /labels`
///
/// Every lookup falls back to the raw value when no translation exists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Labels {
    /// Keyed by perfume node id
    #[serde(default)]
    pub perfume_names: HashMap<String, String>,
    #[serde(default)]
    pub brands: HashMap<String, String>,
    #[serde(default)]
    pub accords: HashMap<String, String>,
    #[serde(default)]
    pub seasons: HashMap<String, String>,
    #[serde(default)]
    pub occasions: HashMap<String, String>,
    #[serde(default)]
    pub genders: HashMap<String, String>,
}

fn lookup<'a>(table: &'a HashMap<String, String>, raw: &'a str) -> &'a str {
    table.get(raw).map(String::as_str).unwrap_or(raw)
}

impl Labels {
    pub fn perfume_name<'a>(&'a self, perfume: &'a PerfumeNode) -> &'a str {
        self.perfume_names
            .get(perfume.id.as_str())
            .map(String::as_str)
            .unwrap_or(&perfume.label)
    }

    pub fn brand<'a>(&'a self, raw: &'a str) -> &'a str {
        lookup(&self.brands, raw)
    }

    pub fn accord<'a>(&'a self, raw: &'a str) -> &'a str {
        lookup(&self.accords, raw)
    }

    pub fn season<'a>(&'a self, raw: &'a str) -> &'a str {
        lookup(&self.seasons, raw)
    }

    pub fn occasion<'a>(&'a self, raw: &'a str) -> &'a str {
        lookup(&self.occasions, raw)
    }

    pub fn gender<'a>(&'a self, raw: &'a str) -> &'a str {
        lookup(&self.genders, raw)
    }
}

/// Value vocabularies for each filter dimension
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    #[serde(default)]
    pub accords: Vec<String>,
    #[serde(default)]
    pub brands: Vec<String>,
    #[serde(default)]
    pub seasons: Vec<String>,
    #[serde(default)]
    pub occasions: Vec<String>,
    #[serde(default)]
    pub genders: Vec<String>,
}

#[derive(Default)]
struct Vocab {
    accords: BTreeSet<String>,
    brands: BTreeSet<String>,
    seasons: BTreeSet<String>,
    occasions: BTreeSet<String>,
    genders: BTreeSet<String>,
}

impl Vocab {
    fn add(&mut self, perfume: &PerfumeNode) {
        self.accords.extend(perfume.primary_accord.iter().cloned());
        self.accords.extend(perfume.accords.iter().cloned());
        self.brands.extend(perfume.brand.iter().cloned());
        self.seasons.extend(perfume.seasons.iter().cloned());
        self.occasions.extend(perfume.occasions.iter().cloned());
        self.genders.extend(perfume.genders.iter().cloned());
    }

    fn finish(self) -> FilterOptions {
        FilterOptions {
            accords: self.accords.into_iter().collect(),
            brands: self.brands.into_iter().collect(),
            seasons: self.seasons.into_iter().collect(),
            occasions: self.occasions.into_iter().collect(),
            genders: self.genders.into_iter().collect(),
        }
    }
}

impl FilterOptions {
    /// Vocabularies seen across every perfume in the dataset, sorted
    pub fn from_dataset(dataset: &Dataset) -> Self {
        Self::from_perfumes(dataset.perfumes())
    }

    pub fn from_perfumes<'a>(perfumes: impl IntoIterator<Item = &'a PerfumeNode>) -> Self {
        let mut vocab = Vocab::default();
        for perfume in perfumes {
            vocab.add(perfume);
        }
        vocab.finish()
    }

    pub fn is_empty(&self) -> bool {
        self.accords.is_empty()
            && self.brands.is_empty()
            && self.seasons.is_empty()
            && self.occasions.is_empty()
            && self.genders.is_empty()
    }
}

/// Filters that reproduce the member's own collection
///
/// Collects the primary and full accord sets, brands, seasons, occasions and
/// genders of every registered perfume.
pub fn derive_my_perfume_filters(dataset: &Dataset) -> FilterOptions {
    FilterOptions::from_perfumes(dataset.perfumes().filter(|p| p.is_registered()))
}
