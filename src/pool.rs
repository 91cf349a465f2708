use crate::{AlleleValue, Dataset, LocusName};
use ndarray::Array1;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Observed alleles per locus.
///
/// Each pool is a multiset: an allele seen `n` times appears `n` times,
/// so drawing uniformly from a pool reproduces the empirical allele
/// frequencies of the source dataset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AllelePool {
    locus_names: Vec<LocusName>,
    pools: HashMap<LocusName, Vec<AlleleValue>>,
}

/// Relative frequency of each distinct allele at one locus.
#[derive(Clone, Debug, PartialEq)]
pub struct AlleleFrequencies {
    /// Distinct alleles, ascending.
    pub alleles: Vec<AlleleValue>,
    pub frequencies: Array1<f64>,
}

impl AlleleFrequencies {
    pub fn frequency(&self, allele: AlleleValue) -> Option<f64> {
        self.alleles
            .binary_search(&allele)
            .ok()
            .map(|idx| self.frequencies[idx])
    }
}

/// Collects the non-missing alleles of every locus in `dataset`.
///
/// Loci are listed in order of first appearance in the genotype table.
/// A locus where every allele is missing gets an empty pool.
pub fn build_pool(dataset: &Dataset) -> AllelePool {
    let genotypes = dataset.genotypes();
    let mut locus_names: Vec<LocusName> = vec![];
    let mut pools: HashMap<LocusName, Vec<AlleleValue>> = HashMap::new();

    for (locus, genotype) in genotypes.loci().iter().zip(genotypes.genotypes()) {
        if let Some(pool) = pools.get_mut(locus) {
            pool.extend(genotype.observed());
        } else {
            locus_names.push(locus.to_owned());
            pools.insert(locus.to_owned(), genotype.observed().collect());
        }
    }

    for locus in &locus_names {
        if pools.get(locus).map_or(true, Vec::is_empty) {
            warn!(locus = %locus, "no observed alleles at locus");
        }
    }
    debug!(
        loci = locus_names.len(),
        rows = genotypes.len(),
        "built allele pool"
    );

    AllelePool { locus_names, pools }
}

impl AllelePool {
    pub fn locus_names(&self) -> &[LocusName] {
        &self.locus_names
    }

    /// The pool of `locus`, if the locus was observed.
    pub fn get(&self, locus: &str) -> Option<&[AlleleValue]> {
        self.pools.get(locus).map(Vec::as_slice)
    }

    pub fn pools(&self) -> &HashMap<LocusName, Vec<AlleleValue>> {
        &self.pools
    }

    pub fn len(&self) -> usize {
        self.locus_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locus_names.is_empty()
    }

    /// Pools in locus order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[AlleleValue])> + '_ {
        self.locus_names.iter().map(move |locus| {
            (
                locus.as_str(),
                self.pools.get(locus).map_or(&[][..], Vec::as_slice),
            )
        })
    }

    pub fn into_parts(self) -> (Vec<LocusName>, HashMap<LocusName, Vec<AlleleValue>>) {
        (self.locus_names, self.pools)
    }

    /// Empirical allele frequencies at `locus`.
    ///
    /// An empty pool yields empty frequencies.
    pub fn frequencies(&self, locus: &str) -> Option<AlleleFrequencies> {
        let pool = self.pools.get(locus)?;
        let mut counts: BTreeMap<AlleleValue, usize> = BTreeMap::new();
        for allele in pool {
            *counts.entry(*allele).or_insert(0) += 1;
        }
        let total = pool.len() as f64;
        let (alleles, counts): (Vec<AlleleValue>, Vec<f64>) =
            counts.into_iter().map(|(a, c)| (a, c as f64)).unzip();
        Some(AlleleFrequencies {
            alleles,
            frequencies: Array1::from(counts) / total,
        })
    }
}

impl Dataset {
    /// See [`build_pool`].
    pub fn allele_pool(&self) -> AllelePool {
        build_pool(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::{Genotype, Genotypes, Metadata};

    fn sample_dataset() -> Result<Dataset> {
        let mut metadata = Metadata::new();
        metadata.push("s1", "pop", 2).push("s2", "pop", 2);
        let mut genotypes = Genotypes::new();
        genotypes
            .push("s1", "L1", Genotype::new(vec![Some(100), Some(102)]))
            .push("s1", "L2", Genotype::new(vec![None, None]))
            .push("s2", "L1", Genotype::new(vec![Some(100), None]))
            .push("s2", "L2", Genotype::new(vec![None, None]));
        genotypes.compress_loci();
        Dataset::new(metadata, genotypes)
    }

    #[test]
    fn test_pool_drops_missing_and_keeps_multiplicity() -> Result<()> {
        let pool = build_pool(&sample_dataset()?);
        assert_eq!(pool.locus_names(), &["L1", "L2"]);
        assert_eq!(pool.get("L1"), Some(&[100, 102, 100][..]));
        assert_eq!(pool.get("L2"), Some(&[][..]));
        assert_eq!(pool.get("L3"), None);
        Ok(())
    }

    #[test]
    fn test_pool_does_not_touch_dataset() -> Result<()> {
        let dataset = sample_dataset()?;
        let before = dataset.clone();
        let _ = dataset.allele_pool();
        assert_eq!(dataset, before);
        assert!(dataset.genotypes().loci().is_encoded());
        Ok(())
    }

    #[test]
    fn test_frequencies() -> Result<()> {
        let pool = build_pool(&sample_dataset()?);
        let freqs = pool.frequencies("L1").expect("L1 is observed");
        assert_eq!(freqs.alleles, vec![100, 102]);
        assert!((freqs.frequency(100).unwrap_or_default() - 2.0 / 3.0).abs() < 1e-12);
        assert!((freqs.frequencies.sum() - 1.0).abs() < 1e-12);

        let empty = pool.frequencies("L2").expect("L2 is observed");
        assert!(empty.alleles.is_empty());
        assert!(pool.frequencies("L3").is_none());
        Ok(())
    }
}
