//! Synthetic individuals drawn from an allele pool.
//!
//! Every draw is uniform with replacement over the pool of a locus, so
//! alleles come out with their empirical frequency. Draws at different
//! loci are independent, and no state is kept between calls apart from
//! the random source the caller hands in.
use crate::error::{PopgenError, Result};
use crate::pool::AllelePool;
use crate::{AlleleValue, Dataset, Genotype, Genotypes, LocusName, Metadata, Ploidy};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use tracing::{debug, trace};

/// One synthetic multi-locus genotype, ordered like the requested loci.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SimulatedGenotype {
    entries: Vec<(LocusName, Vec<AlleleValue>)>,
}

impl SimulatedGenotype {
    pub fn get(&self, locus: &str) -> Option<&[AlleleValue]> {
        self.entries
            .iter()
            .find(|(name, _)| name == locus)
            .map(|(_, alleles)| alleles.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn loci(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[AlleleValue])> + '_ {
        self.entries
            .iter()
            .map(|(name, alleles)| (name.as_str(), alleles.as_slice()))
    }
}

impl IntoIterator for SimulatedGenotype {
    type Item = (LocusName, Vec<AlleleValue>);
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Draws `ploidy` alleles with replacement from the pool of every locus in `locus_names`.
///
/// # Errors
///
/// `InvalidPloidy` if `ploidy` is zero, checked before anything is drawn.
/// `UnknownLocus` if a locus has no pool, `EmptyPool` if its pool is empty.
pub fn simulate_sample<R: Rng>(
    pool_by_locus: &HashMap<LocusName, Vec<AlleleValue>>,
    locus_names: &[LocusName],
    ploidy: Ploidy,
    rng: &mut R,
) -> Result<SimulatedGenotype> {
    if ploidy == 0 {
        return Err(PopgenError::InvalidPloidy { ploidy });
    }

    let mut entries = Vec::with_capacity(locus_names.len());
    for locus in locus_names {
        let pool = pool_by_locus
            .get(locus)
            .ok_or_else(|| PopgenError::unknown_locus(locus.as_str()))?;
        if pool.is_empty() {
            return Err(PopgenError::empty_pool(locus.as_str()));
        }
        let alleles = (0..ploidy)
            .map(|_| pool[rng.random_range(0..pool.len())])
            .collect();
        entries.push((locus.clone(), alleles));
    }
    trace!(loci = entries.len(), ploidy, "simulated sample");
    Ok(SimulatedGenotype { entries })
}

/// Settings for [`simulate_dataset`].
#[derive(Clone, Debug)]
pub struct SimulationOptions {
    individuals: usize,
    ploidy: Ploidy,
    population: String,
    prefix: String,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            individuals: 1,
            ploidy: 2,
            population: "simulated".to_owned(),
            prefix: "sim_".to_owned(),
        }
    }
}

impl SimulationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn individuals(&mut self, individuals: usize) -> &mut Self {
        self.individuals = individuals;
        self
    }

    pub fn ploidy(&mut self, ploidy: Ploidy) -> &mut Self {
        self.ploidy = ploidy;
        self
    }

    pub fn population(&mut self, population: &str) -> &mut Self {
        self.population = population.to_owned();
        self
    }

    /// Names are `{prefix}{index}`, counting from zero.
    pub fn prefix(&mut self, prefix: &str) -> &mut Self {
        self.prefix = prefix.to_owned();
        self
    }
}

/// Synthesizes a whole dataset of new individuals from `pool`.
///
/// Every individual is typed at every locus of the pool, in pool order.
/// The result has no parents column.
pub fn simulate_dataset<R: Rng>(
    pool: &AllelePool,
    options: &SimulationOptions,
    rng: &mut R,
) -> Result<Dataset> {
    if options.ploidy == 0 {
        return Err(PopgenError::InvalidPloidy {
            ploidy: options.ploidy,
        });
    }

    let mut metadata = Metadata::new();
    let mut genotypes = Genotypes::new();
    for idx in 0..options.individuals {
        let name = format!("{}{}", options.prefix, idx);
        metadata.push(&name, &options.population, options.ploidy);
        let sample = simulate_sample(pool.pools(), pool.locus_names(), options.ploidy, rng)?;
        for (locus, alleles) in sample {
            genotypes.push(&name, &locus, Genotype::from_values(alleles));
        }
    }
    debug!(
        individuals = options.individuals,
        loci = pool.len(),
        "simulated dataset"
    );
    Dataset::new(metadata, genotypes)
}

/// An allele-pool sampler that owns its random source.
pub struct Sampler<R = StdRng> {
    rng: R,
}

impl Sampler<StdRng> {
    /// A reproducible sampler.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_os_rng() -> Self {
        Self::new(StdRng::from_os_rng())
    }
}

impl<R: Rng> Sampler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Draws one individual typed at every locus of `pool`.
    pub fn sample(&mut self, pool: &AllelePool, ploidy: Ploidy) -> Result<SimulatedGenotype> {
        simulate_sample(pool.pools(), pool.locus_names(), ploidy, &mut self.rng)
    }

    pub fn simulate_dataset(
        &mut self,
        pool: &AllelePool,
        options: &SimulationOptions,
    ) -> Result<Dataset> {
        simulate_dataset(pool, options, &mut self.rng)
    }
}
