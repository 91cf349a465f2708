#![crate_name = "popgen"]
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub mod prelude;

pub mod codec;
pub mod error;
pub mod merge;
pub mod observable;
pub mod pool;
pub mod sampler;

use codec::LocusColumn;
use error::{PopgenError, Result};

pub type AlleleValue = u32;
pub type Ploidy = usize;
pub type SampleName = String;
pub type LocusName = String;

/// Ordered allele values of one sample at one locus.
///
/// `None` marks a missing allele.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq)]
pub struct Genotype(Vec<Option<AlleleValue>>);

impl Genotype {
    pub fn new(alleles: Vec<Option<AlleleValue>>) -> Self {
        Self(alleles)
    }

    /// A genotype with no missing alleles.
    pub fn from_values<I: IntoIterator<Item = AlleleValue>>(values: I) -> Self {
        Self(values.into_iter().map(Some).collect())
    }

    pub fn ploidy(&self) -> Ploidy {
        self.0.len()
    }

    pub fn alleles(&self) -> &[Option<AlleleValue>] {
        &self.0
    }

    /// The non-missing alleles, in order.
    pub fn observed(&self) -> impl Iterator<Item = AlleleValue> + '_ {
        self.0.iter().flatten().copied()
    }

    pub fn is_missing(&self) -> bool {
        self.0.iter().all(Option::is_none)
    }
}

impl From<Vec<Option<AlleleValue>>> for Genotype {
    fn from(alleles: Vec<Option<AlleleValue>>) -> Self {
        Self(alleles)
    }
}

/// The two parents of a derived individual.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct Parents {
    pub first: SampleName,
    pub second: SampleName,
}

impl Parents {
    pub fn new(first: &str, second: &str) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }
}

/// Per-sample table: name, population, ploidy and an optional parents column.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Metadata {
    names: Vec<SampleName>,
    populations: Vec<String>,
    ploidy: Vec<Ploidy>,
    parents: Option<Vec<Option<Parents>>>,
}

impl Metadata {
    /// Constructs an empty table without a parents column.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from whole columns.
    ///
    /// Fails if the columns disagree on row count.
    pub fn from_columns(
        names: Vec<SampleName>,
        populations: Vec<String>,
        ploidy: Vec<Ploidy>,
        parents: Option<Vec<Option<Parents>>>,
    ) -> Result<Self> {
        let expected = names.len();
        let mut lengths = vec![("population", populations.len()), ("ploidy", ploidy.len())];
        if let Some(parents) = &parents {
            lengths.push(("parents", parents.len()));
        }
        for (column, found) in lengths {
            if found != expected {
                return Err(PopgenError::ColumnLength {
                    table: "metadata",
                    column,
                    expected,
                    found,
                });
            }
        }
        Ok(Self {
            names,
            populations,
            ploidy,
            parents,
        })
    }

    /// Appends one sample. Its parents are absent if the table has a parents column.
    pub fn push(&mut self, name: &str, population: &str, ploidy: Ploidy) -> &mut Self {
        self.names.push(name.into());
        self.populations.push(population.into());
        self.ploidy.push(ploidy);
        if let Some(parents) = &mut self.parents {
            parents.push(None);
        }
        self
    }

    /// Appends one sample together with its parents.
    ///
    /// Adds the parents column first if the table lacks one, so earlier
    /// rows read as absent.
    pub fn push_with_parents(
        &mut self,
        name: &str,
        population: &str,
        ploidy: Ploidy,
        parents: Option<Parents>,
    ) -> &mut Self {
        self.add_absent_parents();
        self.push(name, population, ploidy);
        if let Some(column) = &mut self.parents {
            if let Some(last) = column.last_mut() {
                *last = parents;
            }
        }
        self
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[SampleName] {
        &self.names
    }

    pub fn populations(&self) -> &[String] {
        &self.populations
    }

    pub fn ploidy(&self) -> &[Ploidy] {
        &self.ploidy
    }

    /// The parents column, if the table has one.
    pub fn parents(&self) -> Option<&[Option<Parents>]> {
        self.parents.as_deref()
    }

    pub fn has_parents(&self) -> bool {
        self.parents.is_some()
    }

    /// Ploidy of the first sample called `name`.
    pub fn ploidy_of(&self, name: &str) -> Option<Ploidy> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|idx| self.ploidy[idx])
    }

    /// Adds a parents column of absence-markers. No-op if one exists.
    pub(crate) fn add_absent_parents(&mut self) {
        if self.parents.is_none() {
            self.parents = Some(vec![None; self.names.len()]);
        }
    }

    /// Appends the rows of `other`. Both tables must have the same columns.
    pub(crate) fn append(&mut self, other: Metadata) {
        self.names.extend(other.names);
        self.populations.extend(other.populations);
        self.ploidy.extend(other.ploidy);
        if let (Some(parents), Some(more)) = (&mut self.parents, other.parents) {
            parents.extend(more);
        }
    }
}

/// Long-format genotype table: one row per (sample, locus).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Genotypes {
    samples: Vec<SampleName>,
    loci: LocusColumn,
    genotypes: Vec<Genotype>,
}

impl Genotypes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from whole columns.
    pub fn from_columns(
        samples: Vec<SampleName>,
        loci: LocusColumn,
        genotypes: Vec<Genotype>,
    ) -> Result<Self> {
        let expected = samples.len();
        for (column, found) in [("locus", loci.len()), ("genotype", genotypes.len())] {
            if found != expected {
                return Err(PopgenError::ColumnLength {
                    table: "genotype",
                    column,
                    expected,
                    found,
                });
            }
        }
        Ok(Self {
            samples,
            loci,
            genotypes,
        })
    }

    pub fn push(&mut self, sample: &str, locus: &str, genotype: Genotype) -> &mut Self {
        self.samples.push(sample.into());
        self.loci.push(locus);
        self.genotypes.push(genotype);
        self
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[SampleName] {
        &self.samples
    }

    pub fn loci(&self) -> &LocusColumn {
        &self.loci
    }

    pub fn genotypes(&self) -> &[Genotype] {
        &self.genotypes
    }

    /// Rows as (sample, locus, genotype).
    pub fn rows(&self) -> impl Iterator<Item = (&str, &str, &Genotype)> + '_ {
        self.samples
            .iter()
            .map(String::as_str)
            .zip(self.loci.iter())
            .zip(self.genotypes.iter())
            .map(|((sample, locus), genotype)| (sample, locus, genotype))
    }

    /// Dictionary-encodes the locus column.
    pub fn compress_loci(&mut self) {
        if !self.loci.is_encoded() {
            self.loci = LocusColumn::encode(self.loci.iter());
        }
    }

    pub fn decompress_loci(&mut self) {
        self.loci.decompress_in_place();
    }

    pub(crate) fn append(&mut self, other: Genotypes) {
        self.samples.extend(other.samples);
        self.loci.append_plain(other.loci);
        self.genotypes.extend(other.genotypes);
    }
}

/// A metadata table and the genotype table that refers to it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dataset {
    metadata: Metadata,
    genotypes: Genotypes,
}

impl Dataset {
    /// Constructs a `Dataset` from already built tables.
    ///
    /// Sample names must be unique, every ploidy positive, every genotype
    /// row must name a known sample and carry exactly that sample's ploidy
    /// of alleles, and every sample must be typed at the same loci.
    pub fn new(metadata: Metadata, genotypes: Genotypes) -> Result<Self> {
        let mut ploidy: HashMap<&str, Ploidy> = HashMap::with_capacity(metadata.len());
        for (name, &p) in metadata.names.iter().zip(metadata.ploidy.iter()) {
            if p == 0 {
                return Err(PopgenError::InvalidPloidy { ploidy: p });
            }
            if ploidy.insert(name, p).is_some() {
                return Err(PopgenError::DuplicateSample {
                    sample: name.clone(),
                });
            }
        }

        for (row, (sample, locus, genotype)) in genotypes.rows().enumerate() {
            let expected = *ploidy
                .get(sample)
                .ok_or_else(|| PopgenError::UnknownSample {
                    row,
                    sample: sample.into(),
                })?;
            if genotype.ploidy() != expected {
                return Err(PopgenError::PloidyMismatch {
                    sample: sample.into(),
                    locus: locus.into(),
                    expected,
                    found: genotype.ploidy(),
                });
            }
        }

        let dataset = Self {
            metadata,
            genotypes,
        };
        dataset.check_locus_sets()?;
        Ok(dataset)
    }

    /// Wraps tables whose invariants are guaranteed by construction.
    pub(crate) fn from_parts(metadata: Metadata, genotypes: Genotypes) -> Self {
        Self {
            metadata,
            genotypes,
        }
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn genotypes(&self) -> &Genotypes {
        &self.genotypes
    }

    pub(crate) fn tables_mut(&mut self) -> (&mut Metadata, &mut Genotypes) {
        (&mut self.metadata, &mut self.genotypes)
    }

    pub fn into_parts(self) -> (Metadata, Genotypes) {
        (self.metadata, self.genotypes)
    }

    /// Distinct locus names in order of first appearance.
    pub fn loci_names(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.genotypes
            .loci
            .iter()
            .filter(|locus| seen.insert(*locus))
            .collect()
    }

    /// Every locus typed in this dataset.
    pub fn locus_set(&self) -> BTreeSet<&str> {
        self.genotypes.loci.iter().collect()
    }

    /// Checks that every sample is typed at the same set of loci.
    ///
    /// `Dataset::new` enforces this; datasets produced by a non-strict
    /// merge of divergent operands may violate it.
    pub fn check_locus_sets(&self) -> Result<()> {
        let mut by_sample: BTreeMap<&str, BTreeSet<&str>> = self
            .metadata
            .names
            .iter()
            .map(|name| (name.as_str(), BTreeSet::new()))
            .collect();
        for (sample, locus, _) in self.genotypes.rows() {
            by_sample.entry(sample).or_default().insert(locus);
        }

        let mut samples = by_sample.iter();
        if let Some((first_sample, first_loci)) = samples.next() {
            for (sample, loci) in samples {
                if loci != first_loci {
                    return Err(PopgenError::locus_set_mismatch(format!(
                        "sample {} is typed at {} loci, sample {} at {}",
                        first_sample,
                        first_loci.len(),
                        sample,
                        loci.len()
                    )));
                }
            }
        }
        Ok(())
    }
}
