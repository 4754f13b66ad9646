use std::collections::BTreeSet;
use std::iter::FromIterator;

/// The long vote cast return codes allow list of one verification card set.
///
/// Computed at setup time. Verification only ever asks whether a combined hash is on it.
pub trait LongVoteCastReturnCodesAllowList {
    fn contains(&self, combined_hash: &str) -> bool;
}

impl<F> LongVoteCastReturnCodesAllowList for F
where
    F: Fn(&str) -> bool,
{
    fn contains(&self, combined_hash: &str) -> bool {
        self(combined_hash)
    }
}

/// An allow list held in memory
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct AllowList(BTreeSet<String>);

impl AllowList {
    pub fn new() -> Self {
        AllowList::default()
    }

    pub fn insert(&mut self, combined_hash: String) -> bool {
        self.0.insert(combined_hash)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl LongVoteCastReturnCodesAllowList for AllowList {
    fn contains(&self, combined_hash: &str) -> bool {
        self.0.contains(combined_hash)
    }
}

impl FromIterator<String> for AllowList {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        AllowList(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_list() {
        let allow_list: AllowList = vec!["a".to_owned(), "b".to_owned()].into_iter().collect();
        assert!(allow_list.contains("a"));
        assert!(!allow_list.contains("c"));
        assert_eq!(allow_list.len(), 2);

        let predicate = |hash: &str| hash.starts_with('x');
        assert!(predicate.contains("xyz"));
        assert!(!LongVoteCastReturnCodesAllowList::contains(&predicate, "abc"));
    }
}
