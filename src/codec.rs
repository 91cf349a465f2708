use crate::error::{PopgenError, Result};
use std::collections::HashMap;

/// Dictionary form of a locus column.
///
/// Every code indexes `dictionary`; the fields stay private so only the
/// checked constructors of `LocusColumn` can build one.
#[derive(Clone, Debug)]
pub struct EncodedColumn {
    dictionary: Vec<String>,
    codes: Vec<u32>,
}

impl EncodedColumn {
    pub fn dictionary(&self) -> &[String] {
        &self.dictionary
    }

    pub fn codes(&self) -> &[u32] {
        &self.codes
    }

    fn label(&self, code: u32) -> &str {
        self.dictionary[code as usize].as_str()
    }
}

/// The locus-name column of a genotype table.
///
/// Large tables repeat a handful of locus names many times, so the
/// column may be stored as a dictionary of labels plus one code per
/// row. Two encoded columns generally have different dictionaries and
/// must be decompressed before they are concatenated.
#[derive(Clone, Debug)]
pub enum LocusColumn {
    Plain(Vec<String>),
    Encoded(EncodedColumn),
}

impl Default for LocusColumn {
    fn default() -> Self {
        Self::Plain(vec![])
    }
}

impl LocusColumn {
    /// Builds an encoded column, rejecting codes with no dictionary entry.
    pub fn from_codes(dictionary: Vec<String>, codes: Vec<u32>) -> Result<Self> {
        if let Some(&code) = codes.iter().find(|&&c| c as usize >= dictionary.len()) {
            return Err(PopgenError::UnknownLocusCode {
                code,
                dictionary_len: dictionary.len(),
            });
        }
        Ok(Self::Encoded(EncodedColumn { dictionary, codes }))
    }

    /// Dictionary-encodes plain labels.
    ///
    /// Dictionary entries appear in order of first occurrence.
    pub fn encode<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dictionary: Vec<String> = vec![];
        let mut index: HashMap<String, u32> = HashMap::new();
        let codes = labels
            .into_iter()
            .map(|label| {
                let label = label.as_ref();
                match index.get(label) {
                    Some(&code) => code,
                    None => {
                        let code = dictionary.len() as u32;
                        dictionary.push(label.to_owned());
                        index.insert(label.to_owned(), code);
                        code
                    }
                }
            })
            .collect();
        Self::Encoded(EncodedColumn { dictionary, codes })
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Plain(labels) => labels.len(),
            Self::Encoded(encoded) => encoded.codes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_encoded(&self) -> bool {
        matches!(self, Self::Encoded(_))
    }

    /// Appends one label, growing the dictionary if needed.
    pub fn push(&mut self, label: &str) {
        match self {
            Self::Plain(labels) => labels.push(label.to_owned()),
            Self::Encoded(EncodedColumn { dictionary, codes }) => {
                let code = match dictionary.iter().position(|entry| entry == label) {
                    Some(idx) => idx,
                    None => {
                        dictionary.push(label.to_owned());
                        dictionary.len() - 1
                    }
                };
                codes.push(code as u32);
            }
        }
    }

    /// Label of row `row`, if it exists.
    pub fn label(&self, row: usize) -> Option<&str> {
        match self {
            Self::Plain(labels) => labels.get(row).map(String::as_str),
            Self::Encoded(encoded) => encoded.codes.get(row).map(|&code| encoded.label(code)),
        }
    }

    /// Iterates over the plain labels without allocating.
    pub fn iter(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        match self {
            Self::Plain(labels) => Box::new(labels.iter().map(String::as_str)),
            Self::Encoded(encoded) => {
                Box::new(encoded.codes.iter().map(move |&code| encoded.label(code)))
            }
        }
    }

    /// Plain labels in row order.
    pub fn decompress(&self) -> Vec<String> {
        self.iter().map(str::to_owned).collect()
    }

    /// Replaces an encoded column by its plain form.
    pub fn decompress_in_place(&mut self) {
        if self.is_encoded() {
            *self = Self::Plain(self.decompress());
        }
    }

    /// Appends the rows of `other`. Both columns must be plain.
    pub(crate) fn append_plain(&mut self, mut other: LocusColumn) {
        self.decompress_in_place();
        other.decompress_in_place();
        if let (Self::Plain(labels), Self::Plain(more)) = (self, other) {
            labels.extend(more);
        }
    }
}

/// Columns compare by label, not by storage.
impl PartialEq for LocusColumn {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl Eq for LocusColumn {}

impl<S: Into<String>> FromIterator<S> for LocusColumn {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::Plain(iter.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decompress_preserves_order_and_multiplicity() -> Result<()> {
        let column = LocusColumn::from_codes(
            vec!["L2".into(), "L1".into()],
            vec![1, 0, 0, 1, 1],
        )?;
        assert_eq!(column.decompress(), vec!["L1", "L2", "L2", "L1", "L1"]);
        Ok(())
    }

    #[test]
    fn test_unmapped_code_is_rejected() {
        let result = LocusColumn::from_codes(vec!["L1".into()], vec![0, 3]);
        assert!(matches!(
            result,
            Err(PopgenError::UnknownLocusCode {
                code: 3,
                dictionary_len: 1
            })
        ));
    }

    #[test]
    fn test_encode_uses_first_appearance_dictionary() {
        let column = LocusColumn::encode(["b", "a", "b", "c"]);
        match &column {
            LocusColumn::Encoded(encoded) => {
                assert_eq!(encoded.dictionary(), &["b", "a", "c"]);
                assert_eq!(encoded.codes(), &[0, 1, 0, 2]);
            }
            LocusColumn::Plain(_) => panic!("expected an encoded column"),
        }
        assert_eq!(column.label(3), Some("c"));
        assert_eq!(column.label(4), None);
    }

    #[test]
    fn test_columns_with_different_dictionaries_append_by_label() {
        let mut a = LocusColumn::encode(["L1", "L2"]);
        let b = LocusColumn::encode(["L2", "L1"]);
        a.append_plain(b);
        assert!(!a.is_encoded());
        assert_eq!(a.decompress(), vec!["L1", "L2", "L2", "L1"]);
    }

    #[test]
    fn test_equality_ignores_storage() {
        let plain: LocusColumn = vec!["x", "y", "x"].into_iter().collect();
        assert_eq!(plain, LocusColumn::encode(["x", "y", "x"]));
        assert_ne!(plain, LocusColumn::encode(["x", "y"]));
    }
}
