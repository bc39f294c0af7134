//! Builds datasets for tests

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use scentmap::{AccordNode, Dataset, NetworkEdge, NetworkNode, PerfumeNode, RegisterStatus};

pub const ACCORD_NAMES: [&str; 8] = [
    "Woody", "Citrus", "Floral", "Fresh", "Spicy", "Musky", "Amber", "Green",
];

const BRANDS: [&str; 5] = ["Le Labo", "Jo Malone", "Dior", "Byredo", "Diptyque"];
const SEASONS: [&str; 4] = ["Spring", "Summer", "Fall", "Winter"];
const OCCASIONS: [&str; 3] = ["Daily", "Office", "Date"];
const GENDERS: [&str; 3] = ["Feminine", "Masculine", "Unisex"];

/// Incremental dataset builder
///
/// Accord nodes are created on first use. A perfume's accords are sorted by
/// weight, so the strongest one becomes its primary accord.
#[derive(Default)]
pub struct DatasetBuilder {
    accords: Vec<String>,
    perfumes: Vec<PerfumeNode>,
    edges: Vec<NetworkEdge>,
}

impl DatasetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accord(mut self, name: &str) -> Self {
        self.ensure_accord(name);
        self
    }

    fn ensure_accord(&mut self, name: &str) {
        if !self.accords.iter().any(|a| a == name) {
            self.accords.push(name.to_string());
        }
    }

    /// Add a perfume with weighted accords
    pub fn perfume(self, id: &str, accords: &[(&str, f64)]) -> Self {
        let node = PerfumeNode::new(id, format!("Perfume {}", id));
        self.perfume_node(node, accords)
    }

    /// Add a prepared perfume node, attaching weighted accords to it
    pub fn perfume_node(mut self, node: PerfumeNode, accords: &[(&str, f64)]) -> Self {
        let mut ranked = accords.to_vec();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        let mut node = node;
        for (name, weight) in &ranked {
            self.ensure_accord(name);
            node = node.with_accord(*name);
            self.edges
                .push(NetworkEdge::has_accord(node.id.clone(), name, *weight));
        }
        self.perfumes.push(node);
        self
    }

    pub fn similar(mut self, a: &str, b: &str, weight: f64) -> Self {
        self.edges.push(NetworkEdge::similar_to(a, b, weight));
        self
    }

    /// Add an edge as-is, valid or not
    pub fn raw_edge(mut self, edge: NetworkEdge) -> Self {
        self.edges.push(edge);
        self
    }

    pub fn build(self) -> Dataset {
        let nodes: Vec<NetworkNode> = self
            .accords
            .iter()
            .map(|a| AccordNode::named(a).into())
            .chain(self.perfumes.into_iter().map(NetworkNode::from))
            .collect();
        Dataset::new(nodes, self.edges, serde_json::Value::Null)
    }
}

/// P1(Woody .9, Citrus .4), P2(Woody .8), P3(Citrus .7);
/// SimilarTo P1-P2 .75, P1-P3 .2
pub fn worked_example() -> Dataset {
    DatasetBuilder::new()
        .perfume("P1", &[("Woody", 0.9), ("Citrus", 0.4)])
        .perfume("P2", &[("Woody", 0.8)])
        .perfume("P3", &[("Citrus", 0.7)])
        .similar("P1", "P2", 0.75)
        .similar("P1", "P3", 0.2)
        .build()
}

fn weight(rng: &mut StdRng) -> f64 {
    (rng.gen_range(0.0..1.0_f64) * 100.0).round() / 100.0
}

/// A reproducible random dataset with `perfumes` perfumes
///
/// Every perfume has 1 to 4 accords and a handful of attributes; roughly a
/// third of all perfume pairs are linked by a similarity edge.
pub fn random_dataset(seed: u64, perfumes: usize) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut builder = DatasetBuilder::new();
    for name in ACCORD_NAMES {
        builder = builder.accord(name);
    }

    for i in 0..perfumes {
        let id = (1000 + i).to_string();
        let accord_count = rng.gen_range(1..=4);
        let accords: Vec<(&str, f64)> = ACCORD_NAMES
            .choose_multiple(&mut rng, accord_count)
            .map(|name| (*name, weight(&mut rng)))
            .collect();

        let mut node = PerfumeNode::new(id.as_str(), format!("Perfume {}", id));
        if let Some(brand) = BRANDS.choose(&mut rng) {
            node = node.with_brand(*brand);
        }
        let season_count = rng.gen_range(0..=2);
        for season in SEASONS.choose_multiple(&mut rng, season_count) {
            node = node.with_season(*season);
        }
        if let Some(occasion) = OCCASIONS.choose(&mut rng) {
            node = node.with_occasion(*occasion);
        }
        if let Some(gender) = GENDERS.choose(&mut rng) {
            node = node.with_gender(*gender);
        }
        if rng.gen_bool(0.2) {
            node = node.with_status(RegisterStatus::Have);
        }
        builder = builder.perfume_node(node, &accords);
    }

    for a in 0..perfumes {
        for b in (a + 1)..perfumes {
            if rng.gen_bool(0.3) {
                let score = weight(&mut rng);
                builder = builder.similar(&(1000 + a).to_string(), &(1000 + b).to_string(), score);
            }
        }
    }
    builder.build()
}
