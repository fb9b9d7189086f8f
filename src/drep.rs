//! dRep ANI reports and their reconciliation into bin ↔ source genome pairs.
//!
//! `Ndb.csv` lists every pairwise ANIn comparison inside a primary cluster,
//! in both directions and including self comparisons. `Mdb.csv` lists every
//! genome that took part in the Mash step, which is the only place where
//! clusters without any partner are guaranteed to show up.

use crate::names::{normalize_id, BinNaming};
use crate::table::{Table, COMMA};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

pub const NDB_COLUMNS: &[&str] = &[
    "query",
    "reference",
    "ref_coverage",
    "query_coverage",
    "ani",
    "primary_cluster",
];

pub const MDB_MEMBER_COLUMN: &str = "genome2";

/// One normalised row of `Ndb.csv`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Comparison {
    pub query: String,
    pub reference: String,
    pub ref_coverage: f64,
    pub query_coverage: f64,
    pub ani: f64,
    pub primary_cluster: u64,
}

impl Comparison {
    fn is_self(&self) -> bool {
        self.query == self.reference
    }

    /// Orders candidate pairs of one cluster: higher ANI wins, equal ANI
    /// falls back to the lexicographically smaller identifiers.
    fn rank(&self, other: &Self) -> Ordering {
        self.ani
            .total_cmp(&other.ani)
            .then_with(|| other.query.cmp(&self.query))
            .then_with(|| other.reference.cmp(&self.reference))
    }
}

/// A reconciled pair, or a placeholder for a genome or bin without partner.
///
/// `query` holds the source genome, `reference` the bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityRecord {
    pub query: Option<String>,
    pub reference: Option<String>,
    pub ref_coverage: Option<f64>,
    pub query_coverage: Option<f64>,
    pub ani: Option<f64>,
    pub primary_cluster: Option<u64>,
}

impl SimilarityRecord {
    fn pair(c: &Comparison) -> Self {
        Self {
            query: Some(c.query.clone()),
            reference: Some(c.reference.clone()),
            ref_coverage: Some(c.ref_coverage),
            query_coverage: Some(c.query_coverage),
            ani: Some(c.ani),
            primary_cluster: Some(c.primary_cluster),
        }
    }

    fn placeholder(id: &str, is_bin: bool, primary_cluster: Option<u64>) -> Self {
        let (query, reference) = if is_bin {
            (None, Some(id.to_string()))
        } else {
            (Some(id.to_string()), None)
        };
        Self {
            query,
            reference,
            ref_coverage: None,
            query_coverage: None,
            ani: None,
            primary_cluster,
        }
    }

    pub fn is_pair(&self) -> bool {
        self.query.is_some() && self.reference.is_some()
    }
}

/// Reads `Ndb.csv`, repairing dRep's `querry` spelling and normalising ids.
pub fn read_comparisons<P: AsRef<Path>>(mummer_file: P) -> Result<Vec<Comparison>> {
    let mut table = Table::read(mummer_file, COMMA)?;
    table.rename_headers(|h| h.replace("querry", "query"));
    table.require(NDB_COLUMNS)?;
    let comparisons: Vec<Comparison> = table
        .deserialize::<Comparison>()?
        .into_iter()
        .map(|mut c| {
            c.query = normalize_id(&c.query);
            c.reference = normalize_id(&c.reference);
            c
        })
        .collect();
    log::info!(
        "{} pairwise comparisons from {:?}",
        comparisons.len(),
        table.path()
    );
    Ok(comparisons)
}

/// Reads the distinct cluster members listed in `Mdb.csv`, in first-seen order.
pub fn read_cluster_members<P: AsRef<Path>>(mash_file: P) -> Result<Vec<String>> {
    let table = Table::read(mash_file, COMMA)?;
    let mut seen = HashSet::new();
    let members: Vec<String> = table
        .column(MDB_MEMBER_COLUMN)?
        .into_iter()
        .map(normalize_id)
        .filter(|id| seen.insert(id.clone()))
        .collect();
    log::info!("{} cluster members from {:?}", members.len(), table.path());
    Ok(members)
}

/// Splits cluster members into source genomes and bins.
pub fn get_bins_and_genomes(members: &[String], naming: &BinNaming) -> (Vec<String>, Vec<String>) {
    members.iter().cloned().partition(|id| !naming.is_bin(id))
}

/// Pairs each bin with its source genome, one pair per primary cluster, and
/// appends a placeholder for every cluster left without a pair. Every
/// cluster yields exactly one row; a pair-less cluster is represented by its
/// first member in membership order.
///
/// Without a membership listing every identifier seen in `comparisons` is
/// treated as a member.
pub fn reconcile(
    comparisons: &[Comparison],
    members: Option<&[String]>,
    naming: &BinNaming,
) -> Vec<SimilarityRecord> {
    let mut cluster_of: HashMap<&str, u64> = HashMap::new();
    for c in comparisons {
        cluster_of.entry(&c.query).or_insert(c.primary_cluster);
        cluster_of.entry(&c.reference).or_insert(c.primary_cluster);
    }

    let mut best: BTreeMap<u64, &Comparison> = BTreeMap::new();
    for c in comparisons
        .iter()
        .filter(|c| !c.is_self() && naming.is_bin(&c.reference) && !naming.is_bin(&c.query))
    {
        best.entry(c.primary_cluster)
            .and_modify(|kept| {
                if c.rank(kept) == Ordering::Greater {
                    *kept = c;
                }
            })
            .or_insert(c);
    }

    let mut paired: HashSet<&str> = HashSet::new();
    for c in best.values() {
        paired.insert(&c.query);
        paired.insert(&c.reference);
    }

    let fallback: Vec<String>;
    let members = match members {
        Some(members) => members,
        None => {
            let mut seen = HashSet::new();
            fallback = comparisons
                .iter()
                .flat_map(|c| [c.query.as_str(), c.reference.as_str()])
                .filter(|id| seen.insert(*id))
                .map(String::from)
                .collect();
            fallback.as_slice()
        }
    };

    let mut records: Vec<SimilarityRecord> =
        best.values().map(|c| SimilarityRecord::pair(c)).collect();
    let mut covered: HashSet<u64> = best.keys().copied().collect();
    let mut placed: HashSet<&str> = HashSet::new();
    for id in members {
        if paired.contains(id.as_str()) || !placed.insert(id.as_str()) {
            continue;
        }
        let cluster = cluster_of.get(id.as_str()).copied();
        if let Some(cluster) = cluster {
            if !covered.insert(cluster) {
                log::debug!("{} skipped, cluster {} already has a row", id, cluster);
                continue;
            }
        }
        log::debug!("{} has no partner (cluster {:?})", id, cluster);
        records.push(SimilarityRecord::placeholder(id, naming.is_bin(id), cluster));
    }

    log::info!(
        "{} bin/genome pairs, {} unpaired members",
        best.len(),
        records.len() - best.len()
    );
    records
}
