//! Property tests for merge, pool and sampler invariants.

use popgen::merge::{merge, merge_in_place};
use popgen::pool::build_pool;
use popgen::sampler::simulate_sample;
use popgen::{Dataset, Genotype, Genotypes, Metadata, Parents};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// A dataset with `samples` individuals typed at `loci` loci.
///
/// Alleles come from `alleles` cyclically; `0` stands for a missing allele.
fn build_dataset(
    prefix: &str,
    samples: usize,
    loci: usize,
    ploidy: usize,
    alleles: &[u32],
    with_parents: bool,
    encoded: bool,
) -> Dataset {
    let mut metadata = Metadata::new();
    let mut genotypes = Genotypes::new();
    let mut next = alleles.iter().cycle();
    for s in 0..samples {
        let name = format!("{prefix}{s}");
        if with_parents {
            metadata.push_with_parents(&name, "pop", ploidy, Some(Parents::new("x", "y")));
        } else {
            metadata.push(&name, "pop", ploidy);
        }
        for l in 0..loci {
            let genotype = (0..ploidy)
                .map(|_| next.next().copied().filter(|a| *a != 0))
                .collect::<Vec<_>>();
            genotypes.push(&name, &format!("L{l}"), Genotype::new(genotype));
        }
    }
    if encoded {
        genotypes.compress_loci();
    }
    Dataset::new(metadata, genotypes).expect("generated dataset is well formed")
}

fn dataset_strategy(prefix: &'static str) -> impl Strategy<Value = Dataset> {
    (
        0usize..5,
        1usize..4,
        1usize..4,
        prop::collection::vec(0u32..6, 1..12),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(move |(samples, loci, ploidy, alleles, parents, encoded)| {
            build_dataset(prefix, samples, loci, ploidy, &alleles, parents, encoded)
        })
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn merge_adds_row_counts(a in dataset_strategy("a"), b in dataset_strategy("b")) {
        let merged = merge(&a, &b);
        prop_assert_eq!(merged.metadata().len(), a.metadata().len() + b.metadata().len());
        prop_assert_eq!(merged.genotypes().len(), a.genotypes().len() + b.genotypes().len());
    }

    #[test]
    fn merge_in_place_equals_merge(a in dataset_strategy("a"), b in dataset_strategy("b")) {
        let a_before = a.clone();
        let b_before = b.clone();
        let expected = merge(&a, &b);
        prop_assert_eq!(&a, &a_before);
        prop_assert_eq!(&b, &b_before);

        let mut a = a;
        merge_in_place(&mut a, &b);
        prop_assert_eq!(a, expected);
    }

    #[test]
    fn merge_preserves_parents_of_each_operand(
        a in dataset_strategy("a"),
        b in dataset_strategy("b"),
    ) {
        let merged = merge(&a, &b);
        let a_len = a.metadata().len();
        match merged.metadata().parents() {
            None => {
                prop_assert!(!a.metadata().has_parents());
                prop_assert!(!b.metadata().has_parents());
            }
            Some(parents) => {
                prop_assert_eq!(parents.len(), a_len + b.metadata().len());
                match a.metadata().parents() {
                    Some(original) => { prop_assert_eq!(&parents[..a_len], original); }
                    None => { prop_assert!(parents[..a_len].iter().all(Option::is_none)); }
                }
                match b.metadata().parents() {
                    Some(original) => { prop_assert_eq!(&parents[a_len..], original); }
                    None => { prop_assert!(parents[a_len..].iter().all(Option::is_none)); }
                }
            }
        }
    }

    #[test]
    fn pool_counts_every_observed_allele(dataset in dataset_strategy("s")) {
        let pool = build_pool(&dataset);
        for locus in pool.locus_names() {
            let expected: usize = dataset
                .genotypes()
                .rows()
                .filter(|(_, l, _)| l == locus)
                .map(|(_, _, genotype)| genotype.observed().count())
                .sum();
            let alleles = pool.get(locus).unwrap_or_default();
            prop_assert_eq!(alleles.len(), expected);
            prop_assert!(alleles.iter().all(|a| *a != 0));
        }
    }

    #[test]
    fn samples_draw_from_pool(
        dataset in dataset_strategy("s"),
        ploidy in 1usize..6,
        seed in any::<u64>(),
    ) {
        let pool = build_pool(&dataset);
        let loci: Vec<String> = pool
            .iter()
            .filter(|(_, alleles)| !alleles.is_empty())
            .map(|(locus, _)| locus.to_owned())
            .collect();
        let mut rng = StdRng::seed_from_u64(seed);
        let sample = simulate_sample(pool.pools(), &loci, ploidy, &mut rng)
            .expect("every requested locus has a non-empty pool");

        prop_assert_eq!(sample.len(), loci.len());
        for ((locus, alleles), expected) in sample.iter().zip(&loci) {
            prop_assert_eq!(locus, expected.as_str());
            prop_assert_eq!(alleles.len(), ploidy);
            let source = pool.get(locus).unwrap_or_default();
            prop_assert!(alleles.iter().all(|a| source.contains(a)));
        }
    }
}
