use crate::models::Category;

/// Built-in description keywords used to auto-categorize PDF rows that carry
/// no category column. Tried in order; the first category whose keyword
/// appears in the description and that resolves to a known category wins.
const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    ("groceries", &["grocery", "supermarket", "food", "walmart", "target"]),
    ("transportation", &["gas", "fuel", "uber", "lyft", "taxi", "parking"]),
    ("entertainment", &["netflix", "spotify", "movie", "cinema", "game"]),
    ("bills & utilities", &["electric", "water", "internet", "phone", "utility"]),
    ("healthcare", &["pharmacy", "doctor", "medical", "hospital", "clinic"]),
    ("shopping", &["amazon", "store", "shop", "mall"]),
];

/// Immutable name → id snapshot taken when an importer is built. Later
/// category changes in the store are not seen by this matcher.
#[derive(Debug, Clone, Default)]
pub struct CategoryMatcher {
    // (lowercased name, id) in the order the store listed them
    entries: Vec<(String, i64)>,
}

impl CategoryMatcher {
    pub fn new(categories: &[Category]) -> Self {
        let mut entries: Vec<(String, i64)> = Vec::with_capacity(categories.len());
        for cat in categories {
            let key = cat.name.trim().to_lowercase();
            // Later duplicates overwrite earlier ones but keep the first position.
            match entries.iter_mut().find(|(name, _)| *name == key) {
                Some(existing) => existing.1 = cat.id,
                None => entries.push((key, cat.id)),
            }
        }
        Self { entries }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.len()
    }

    /// Resolve a free-text category hint: exact (case-insensitive) name first,
    /// then substring containment in either direction. No scoring; the first
    /// entry in snapshot order that matches wins.
    pub fn match_hint(&self, hint: &str) -> Option<i64> {
        let hint = hint.trim().to_lowercase();
        if hint.is_empty() {
            return None;
        }
        if let Some((_, id)) = self.entries.iter().find(|(name, _)| *name == hint) {
            return Some(*id);
        }
        self.entries
            .iter()
            .find(|(name, _)| name.contains(&hint) || hint.contains(name.as_str()))
            .map(|(_, id)| *id)
    }

    /// Keyword-based auto-categorization from a transaction description.
    pub fn match_description(&self, description: &str) -> Option<i64> {
        let desc = description.to_lowercase();
        CATEGORY_KEYWORDS
            .iter()
            .filter(|(_, keywords)| keywords.iter().any(|kw| desc.contains(kw)))
            .find_map(|(category, _)| self.match_hint(category))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat(id: i64, name: &str) -> Category {
        Category {
            id,
            name: name.to_string(),
            description: None,
        }
    }

    fn family_matcher() -> CategoryMatcher {
        CategoryMatcher::new(&[
            cat(1, "Bills & Utilities"),
            cat(2, "Entertainment"),
            cat(3, "Food & Groceries"),
            cat(4, "Healthcare"),
            cat(5, "Income"),
            cat(6, "Shopping"),
            cat(7, "Transportation"),
        ])
    }

    #[test]
    fn test_empty_hint_is_uncategorized() {
        let m = family_matcher();
        assert_eq!(m.match_hint(""), None);
        assert_eq!(m.match_hint("   "), None);
    }

    #[test]
    fn test_exact_match_ignores_case() {
        let m = family_matcher();
        assert_eq!(m.match_hint("SHOPPING"), Some(6));
        assert_eq!(m.match_hint("  income "), Some(5));
    }

    #[test]
    fn test_hint_substring_of_name() {
        let m = family_matcher();
        assert_eq!(m.match_hint("Groceries"), Some(3));
    }

    #[test]
    fn test_name_substring_of_hint() {
        let m = family_matcher();
        assert_eq!(m.match_hint("Monthly Income Deposit"), Some(5));
    }

    #[test]
    fn test_no_overlap_is_uncategorized() {
        let m = family_matcher();
        assert_eq!(m.match_hint("xyz123"), None);
    }

    #[test]
    fn test_exact_match_beats_earlier_substring() {
        let m = CategoryMatcher::new(&[cat(1, "Car Insurance"), cat(2, "Insurance")]);
        assert_eq!(m.match_hint("insurance"), Some(2));
    }

    #[test]
    fn test_first_substring_match_in_snapshot_order_wins() {
        let m = CategoryMatcher::new(&[cat(1, "Home Insurance"), cat(2, "Car Insurance")]);
        assert_eq!(m.match_hint("insurance"), Some(1));
    }

    #[test]
    fn test_duplicate_names_collapse() {
        let m = CategoryMatcher::new(&[cat(1, "Other"), cat(9, "other")]);
        assert_eq!(m.len(), 1);
        assert_eq!(m.match_hint("OTHER"), Some(9));
    }

    #[test]
    fn test_keyword_resolves_through_category_names() {
        let m = family_matcher();
        assert_eq!(m.match_description("WALMART SUPERCENTER #123"), Some(3));
        assert_eq!(m.match_description("Uber trip 8841"), Some(7));
        assert_eq!(m.match_description("NETFLIX.COM"), Some(2));
        assert_eq!(m.match_description("CVS Pharmacy"), Some(4));
    }

    #[test]
    fn test_keyword_no_match() {
        let m = family_matcher();
        assert_eq!(m.match_description("Transfer to savings"), None);
    }

    #[test]
    fn test_keyword_skips_categories_missing_from_snapshot() {
        // "target" maps to groceries, "store" to shopping; groceries is absent
        let m = CategoryMatcher::new(&[cat(6, "Shopping")]);
        assert_eq!(m.match_description("TARGET STORE 0042"), Some(6));
    }

    #[test]
    fn test_keyword_with_empty_snapshot() {
        let m = CategoryMatcher::default();
        assert_eq!(m.match_description("grocery outlet"), None);
    }
}
