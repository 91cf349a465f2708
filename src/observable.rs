use crate::codec::LocusColumn;
use crate::error::{PopgenError, Result};
use crate::{AlleleValue, Dataset, Genotype, Genotypes, Metadata, Parents};
use csv;
use std::collections::HashSet;
use std::io::Read;
use tracing::debug;

#[derive(Clone)]
enum Field {
    Locus(String),
    Name,
    Population,
    Parent(usize),
}

/// Reads a `Dataset` from delimited text.
///
/// One row per individual. Every column that is not the name, population
/// or a parent column is a locus, whose cell holds the individual's alleles
/// joined by `separator`. The ploidy of an individual is the number of
/// alleles in its widest locus cell; a cell holding only the missing token
/// is a wholly missing genotype.
pub struct CsvBuilder {
    headers: bool,
    delimiter: u8,
    separator: String,
    missing: String,
    name_field: Option<String>,
    population_field: Option<String>,
    parents_fields: Option<(String, String)>,
    default_population: String,
}

impl Default for CsvBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvBuilder {
    /// Construct a new Csv builder
    pub fn new() -> Self {
        Self {
            headers: true,
            delimiter: b',',
            separator: "/".to_owned(),
            missing: "NA".to_owned(),
            name_field: None,
            population_field: None,
            parents_fields: None,
            default_population: "unknown".to_owned(),
        }
    }

    pub fn headers(&mut self, headers: bool) -> &mut Self {
        self.headers = headers;
        self
    }

    pub fn delimiter(&mut self, delimiter: u8) -> &mut Self {
        self.delimiter = delimiter;
        self
    }

    /// Separator between the alleles of one cell.
    pub fn separator(&mut self, separator: &str) -> &mut Self {
        self.separator = separator.to_owned();
        self
    }

    /// Token marking a missing allele or an absent parent.
    pub fn missing(&mut self, missing: &str) -> &mut Self {
        self.missing = missing.to_owned();
        self
    }

    pub fn name_field(&mut self, name_field: &str) -> &mut Self {
        self.name_field = Some(name_field.to_owned());
        self
    }

    pub fn population_field(&mut self, population_field: &str) -> &mut Self {
        self.population_field = Some(population_field.to_owned());
        self
    }

    /// Population of every individual when no population field is set.
    pub fn default_population(&mut self, population: &str) -> &mut Self {
        self.default_population = population.to_owned();
        self
    }

    /// Columns holding the two parents. Their presence adds a parents column.
    pub fn parents_fields(&mut self, first: &str, second: &str) -> &mut Self {
        self.parents_fields = Some((first.to_owned(), second.to_owned()));
        self
    }

    fn field(&self, header: &str) -> Field {
        if self.name_field.as_deref() == Some(header) {
            return Field::Name;
        }
        if self.population_field.as_deref() == Some(header) {
            return Field::Population;
        }
        if let Some((first, second)) = &self.parents_fields {
            if first == header {
                return Field::Parent(0);
            }
            if second == header {
                return Field::Parent(1);
            }
        }
        Field::Locus(header.into())
    }

    fn genotype(&self, cell: &str, locus: &str, line: usize) -> Result<Genotype> {
        cell.split(self.separator.as_str())
            .map(|token| {
                let token = token.trim();
                if token == self.missing {
                    return Ok(None);
                }
                token.parse::<AlleleValue>().map(Some).map_err(|e| {
                    let message = format!("allele {:?} at locus {}: {}", token, locus, e);
                    PopgenError::parse(line, message)
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(Genotype::new)
    }

    fn parent(&self, cell: Option<&str>) -> Option<String> {
        cell.map(str::trim)
            .filter(|c| !c.is_empty() && *c != self.missing)
            .map(str::to_owned)
    }

    pub fn from_reader(&self, reader: Box<dyn Read>) -> Result<Dataset> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(self.headers)
            .delimiter(self.delimiter)
            .from_reader(reader);

        let fields: Option<Vec<Field>> = if self.headers {
            Some(rdr.headers()?.iter().map(|s| self.field(s)).collect())
        } else {
            None
        };
        let has_parents = fields
            .as_ref()
            .is_some_and(|f| f.iter().any(|x| matches!(x, Field::Parent(_))));

        let mut metadata = Metadata::new();
        let mut samples = vec![];
        let mut loci = vec![];
        let mut genotypes = vec![];
        let mut seen = HashSet::new();

        for (idx, record) in rdr.into_records().enumerate() {
            let record = record?;
            let line = record
                .position()
                .map_or(idx + 1, |p| p.line() as usize);

            let mut individual = idx.to_string();
            let mut population = self.default_population.clone();
            let mut parents: [Option<String>; 2] = [None, None];
            let mut cells = vec![];
            for (i, cell) in record.iter().enumerate() {
                let field = match &fields {
                    Some(fields) => fields.get(i).cloned().ok_or_else(|| {
                        PopgenError::parse(line, "row has more fields than the header")
                    })?,
                    None => Field::Locus(i.to_string()),
                };
                match field {
                    Field::Name => individual = cell.to_string(),
                    Field::Population => population = cell.to_string(),
                    Field::Parent(p) => parents[p] = self.parent(Some(cell)),
                    Field::Locus(locus) => cells.push((locus, cell)),
                }
            }

            if !seen.insert(individual.clone()) {
                return Err(PopgenError::DuplicateSample { sample: individual });
            }
            let mut row = Vec::with_capacity(cells.len());
            for (locus, cell) in cells {
                let genotype = self.genotype(cell, &locus, line)?;
                row.push((locus, genotype));
            }
            let ploidy = row
                .iter()
                .map(|(_, genotype)| genotype.ploidy())
                .max()
                .ok_or_else(|| PopgenError::parse(line, "row has no locus columns"))?;
            for (locus, genotype) in row.iter_mut() {
                // A lone missing token stands for a wholly missing genotype.
                if genotype.ploidy() == 1 && genotype.is_missing() {
                    *genotype = Genotype::new(vec![None; ploidy]);
                } else if genotype.ploidy() != ploidy {
                    return Err(PopgenError::parse(
                        line,
                        format!(
                            "individual {} has {} alleles at locus {}, {} elsewhere",
                            individual,
                            genotype.ploidy(),
                            locus,
                            ploidy
                        ),
                    ));
                }
            }

            let [first, second] = parents;
            let parents = match (first, second) {
                (Some(first), Some(second)) => Some(Parents { first, second }),
                (None, None) => None,
                _ => {
                    return Err(PopgenError::parse(
                        line,
                        format!("individual {} has only one parent", individual),
                    ))
                }
            };
            if has_parents {
                metadata.push_with_parents(&individual, &population, ploidy, parents);
            } else {
                metadata.push(&individual, &population, ploidy);
            }
            for (locus, genotype) in row {
                samples.push(individual.clone());
                loci.push(locus);
                genotypes.push(genotype);
            }
        }

        debug!(
            samples = metadata.len(),
            genotype_rows = genotypes.len(),
            "read dataset from CSV"
        );
        let genotypes = Genotypes::from_columns(samples, LocusColumn::encode(&loci), genotypes)?;
        Dataset::new(metadata, genotypes)
    }
}
