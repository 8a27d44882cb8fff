//! Record lookup filters.

use std::fmt::Display;

/// Filter for list endpoints that accept internal ids and/or the
/// human-facing reference numbers.
///
/// Both lists are independent; an empty list places no constraint on its
/// field. When both are given, they are passed through unchanged and the
/// service decides how they combine.
///
/// ```
/// use tharstern_client::RecordFilter;
///
/// let filter = RecordFilter::new().id(1042).reference("EST-0042");
/// assert_eq!(filter.ids(), ["1042"]);
/// assert_eq!(filter.references(), ["EST-0042"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    ids: Vec<String>,
    references: Vec<String>,
}

impl RecordFilter {
    /// Creates an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter on a single internal id.
    pub fn by_id(id: impl Display) -> Self {
        Self::new().id(id)
    }

    /// Filter on a single reference number.
    pub fn by_reference(reference: impl Display) -> Self {
        Self::new().reference(reference)
    }

    /// Adds an internal id.
    #[must_use]
    pub fn id(mut self, id: impl Display) -> Self {
        self.ids.push(id.to_string());
        self
    }

    /// Adds several internal ids.
    #[must_use]
    pub fn ids_from<I, D>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Display,
    {
        self.ids.extend(ids.into_iter().map(|id| id.to_string()));
        self
    }

    /// Adds a reference number.
    #[must_use]
    pub fn reference(mut self, reference: impl Display) -> Self {
        self.references.push(reference.to_string());
        self
    }

    /// Adds several reference numbers.
    #[must_use]
    pub fn references_from<I, D>(mut self, references: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Display,
    {
        self.references
            .extend(references.into_iter().map(|r| r.to_string()));
        self
    }

    /// Internal ids, in insertion order.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Reference numbers, in insertion order.
    pub fn references(&self) -> &[String] {
        &self.references
    }

    /// Returns true when neither list constrains the lookup.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty() && self.references.is_empty()
    }

    /// Encodes the filter as repeated query parameters.
    pub(crate) fn to_query(&self, id_key: &str, reference_key: &str) -> Vec<(String, String)> {
        self.ids
            .iter()
            .map(|id| (id_key.to_string(), id.clone()))
            .chain(
                self.references
                    .iter()
                    .map(|r| (reference_key.to_string(), r.clone())),
            )
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_filter_has_no_query() {
        let filter = RecordFilter::new();
        assert!(filter.is_empty());
        assert!(filter.to_query("id", "jobNo").is_empty());
    }

    #[test]
    fn test_query_repeats_keys_in_order() {
        let filter = RecordFilter::new()
            .ids_from([3, 1])
            .references_from(["J-9"]);

        assert_eq!(
            filter.to_query("id", "jobNo"),
            vec![
                ("id".to_string(), "3".to_string()),
                ("id".to_string(), "1".to_string()),
                ("jobNo".to_string(), "J-9".to_string()),
            ]
        );
    }

    #[test]
    fn test_single_value_constructors() {
        assert_eq!(RecordFilter::by_id(7).ids(), ["7"]);
        assert!(RecordFilter::by_id(7).references().is_empty());
        assert_eq!(RecordFilter::by_reference("SO-1").references(), ["SO-1"]);
    }
}
