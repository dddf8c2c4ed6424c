use std::collections::BTreeSet;

/// Startup allow-list of tool names. Empty means "expose everything".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolSelection {
    names: BTreeSet<String>,
}

impl ToolSelection {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        self.names.is_empty()
    }

    pub fn allows(&self, name: &str) -> bool {
        self.is_unrestricted() || self.names.contains(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_selection_allows_everything() {
        let selection = ToolSelection::all();
        assert!(selection.is_unrestricted());
        assert!(selection.allows("anything"));
    }

    #[test]
    fn selection_matches_exact_names_only() {
        let selection = ToolSelection::from_names(["bank_get", "bank_get"]);
        assert_eq!(selection.names().collect::<Vec<_>>(), vec!["bank_get"]);
        assert!(selection.allows("bank_get"));
        assert!(!selection.allows("bank_getById"));
        assert!(!selection.allows("Bank_get"));
    }

    #[test]
    fn empty_name_restricts_to_nothing() {
        let selection = ToolSelection::from_names([""]);
        assert!(!selection.is_unrestricted());
        assert!(!selection.allows("bank_get"));
    }
}
