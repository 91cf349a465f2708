use thiserror::Error;

/// Errors produced while building, merging or sampling from a `Dataset`.
#[derive(Error, Debug)]
pub enum PopgenError {
    /// A locus was requested that has no pool.
    #[error("unknown locus: {locus}")]
    UnknownLocus { locus: String },

    /// Every allele at this locus is missing, so nothing can be drawn.
    #[error("allele pool for locus {locus} is empty")]
    EmptyPool { locus: String },

    #[error("invalid ploidy: {ploidy}")]
    InvalidPloidy { ploidy: usize },

    /// A genotype row refers to a sample the metadata table does not have.
    #[error("genotype row {row} refers to unknown sample {sample}")]
    UnknownSample { row: usize, sample: String },

    #[error("duplicate sample name: {sample}")]
    DuplicateSample { sample: String },

    #[error("sample {sample} at locus {locus} has {found} alleles, expected {expected}")]
    PloidyMismatch {
        sample: String,
        locus: String,
        expected: usize,
        found: usize,
    },

    /// Columns of one table disagree on row count.
    #[error("{table} column {column} has {found} rows, expected {expected}")]
    ColumnLength {
        table: &'static str,
        column: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("locus code {code} is outside a dictionary of {dictionary_len} labels")]
    UnknownLocusCode { code: u32, dictionary_len: usize },

    #[error("locus sets differ: {message}")]
    LocusSetMismatch { message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
}

pub type Result<T> = std::result::Result<T, PopgenError>;

impl PopgenError {
    pub fn unknown_locus(locus: impl Into<String>) -> Self {
        Self::UnknownLocus {
            locus: locus.into(),
        }
    }

    pub fn empty_pool(locus: impl Into<String>) -> Self {
        Self::EmptyPool {
            locus: locus.into(),
        }
    }

    pub fn locus_set_mismatch(message: impl Into<String>) -> Self {
        Self::LocusSetMismatch {
            message: message.into(),
        }
    }

    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}
