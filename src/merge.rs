//! Merging two datasets into one.
//!
//! Rows of the second operand are appended after the rows of the first,
//! in both the metadata and the genotype table. Nothing is reordered or
//! deduplicated. By default the merge does not check that the operands
//! share a locus set or that sample names stay unique: divergent locus
//! sets give a genotype table whose samples are typed at different loci.
//! `MergeOptions::strict` turns both checks on.
use crate::error::{PopgenError, Result};
use crate::{Dataset, Metadata};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Aligns the optional columns of two metadata tables.
///
/// If exactly one table has a parents column, the other one gains a
/// parents column of absence-markers. Existing columns are left alone.
pub fn reconcile(a: &mut Metadata, b: &mut Metadata) {
    match (a.has_parents(), b.has_parents()) {
        (true, false) => {
            debug!(rows = b.len(), "adding absent parents column to second table");
            b.add_absent_parents();
        }
        (false, true) => {
            debug!(rows = a.len(), "adding absent parents column to first table");
            a.add_absent_parents();
        }
        _ => {}
    }
}

#[derive(Clone, Debug, Default)]
pub struct MergeOptions {
    strict: bool,
}

impl MergeOptions {
    /// Options for the default, unchecked merge.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject operands with a different locus set or overlapping sample names.
    pub fn strict(&mut self, strict: bool) -> &mut Self {
        self.strict = strict;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }
}

/// Appends `b` to `a`, mutating `a`, and returns `a`.
pub fn merge_in_place<'a>(a: &'a mut Dataset, b: &Dataset) -> &'a mut Dataset {
    concat(a, b.clone());
    a
}

/// Returns a new dataset holding the rows of `a` followed by the rows of `b`.
pub fn merge(a: &Dataset, b: &Dataset) -> Dataset {
    let mut merged = a.clone();
    concat(&mut merged, b.clone());
    merged
}

/// Like [`merge_in_place`], validating the operands first when strict.
///
/// On error `a` is left unchanged.
pub fn merge_in_place_with<'a>(
    a: &'a mut Dataset,
    b: &Dataset,
    options: &MergeOptions,
) -> Result<&'a mut Dataset> {
    if options.strict {
        validate(a, b)?;
    }
    Ok(merge_in_place(a, b))
}

/// Like [`merge`], validating the operands first when strict.
pub fn merge_with(a: &Dataset, b: &Dataset, options: &MergeOptions) -> Result<Dataset> {
    if options.strict {
        validate(a, b)?;
    }
    Ok(merge(a, b))
}

fn concat(a: &mut Dataset, b: Dataset) {
    let (mut b_metadata, mut b_genotypes) = b.into_parts();
    let (a_metadata, a_genotypes) = a.tables_mut();

    reconcile(a_metadata, &mut b_metadata);
    a_metadata.append(b_metadata);

    // Encoded columns carry their own dictionaries; only labels are comparable.
    a_genotypes.decompress_loci();
    b_genotypes.decompress_loci();
    a_genotypes.append(b_genotypes);

    debug!(
        metadata_rows = a_metadata.len(),
        genotype_rows = a_genotypes.len(),
        "merged datasets"
    );
}

fn validate(a: &Dataset, b: &Dataset) -> Result<()> {
    let mut names: HashSet<&str> = HashSet::with_capacity(a.metadata().len() + b.metadata().len());
    for name in a.metadata().names().iter().chain(b.metadata().names()) {
        if !names.insert(name) {
            warn!(sample = %name, "strict merge rejected duplicate sample");
            return Err(PopgenError::DuplicateSample {
                sample: name.clone(),
            });
        }
    }

    if a.genotypes().is_empty() || b.genotypes().is_empty() {
        return Ok(());
    }
    let a_loci = a.locus_set();
    let b_loci = b.locus_set();
    if a_loci != b_loci {
        let only_a: Vec<&str> = a_loci.difference(&b_loci).copied().collect();
        let only_b: Vec<&str> = b_loci.difference(&a_loci).copied().collect();
        warn!(?only_a, ?only_b, "strict merge rejected divergent locus sets");
        return Err(PopgenError::locus_set_mismatch(format!(
            "only in first: {:?}; only in second: {:?}",
            only_a, only_b
        )));
    }
    Ok(())
}
