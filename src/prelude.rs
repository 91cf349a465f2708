pub use crate::codec::{EncodedColumn, LocusColumn};
pub use crate::error::{PopgenError, Result};
pub use crate::merge::{
    merge, merge_in_place, merge_in_place_with, merge_with, reconcile, MergeOptions,
};
pub use crate::observable::CsvBuilder;
pub use crate::pool::{build_pool, AlleleFrequencies, AllelePool};
pub use crate::sampler::{
    simulate_dataset, simulate_sample, Sampler, SimulatedGenotype, SimulationOptions,
};
pub use crate::{AlleleValue, Dataset, Genotype, Genotypes, Metadata, Parents, Ploidy};
