use std::collections::HashMap;

/// The selector matching every name that has no exact rule.
pub const WILDCARD_SELECTOR: &str = "*";

/// A single visibility rule.
///
/// `Exact` names a root field or a named type; `Wildcard` applies to every name
/// not covered by an exact rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterRule {
    Exact { name: String, exposed: bool },
    Wildcard { exposed: bool },
}

impl FilterRule {
    pub fn exact(name: impl Into<String>, exposed: bool) -> Self {
        FilterRule::Exact {
            name: name.into(),
            exposed,
        }
    }

    pub fn wildcard(exposed: bool) -> Self {
        FilterRule::Wildcard { exposed }
    }

    /// Builds a rule from its textual selector, `"*"` being the wildcard.
    pub fn from_selector(selector: &str, exposed: bool) -> Self {
        if selector == WILDCARD_SELECTOR {
            FilterRule::wildcard(exposed)
        } else {
            FilterRule::exact(selector, exposed)
        }
    }
}

/// An ordered rule table, resolved with exact-over-wildcard precedence.
///
/// When the same selector is declared more than once, the later declaration wins.
/// With no matching exact rule and no wildcard, a name is hidden.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterRules {
    exact: HashMap<String, bool>,
    wildcard: Option<bool>,
}

impl FilterRules {
    /// A table exposing everything, the identity for filtering.
    pub fn expose_all() -> Self {
        Self {
            exact: HashMap::new(),
            wildcard: Some(true),
        }
    }

    pub fn push(&mut self, rule: FilterRule) {
        match rule {
            FilterRule::Exact { name, exposed } => {
                self.exact.insert(name, exposed);
            }
            FilterRule::Wildcard { exposed } => self.wildcard = Some(exposed),
        }
    }

    pub fn resolve(&self, name: &str) -> bool {
        self.exact
            .get(name)
            .copied()
            .or(self.wildcard)
            .unwrap_or(false)
    }

    pub fn exact_selectors(&self) -> impl Iterator<Item = &str> {
        self.exact.keys().map(String::as_str)
    }

    pub fn wildcard(&self) -> Option<bool> {
        self.wildcard
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.wildcard.is_none()
    }
}

impl FromIterator<FilterRule> for FilterRules {
    fn from_iter<I: IntoIterator<Item = FilterRule>>(iter: I) -> Self {
        let mut rules = FilterRules::default();
        for rule in iter {
            rules.push(rule);
        }
        rules
    }
}

impl<'a> FromIterator<(&'a str, bool)> for FilterRules {
    fn from_iter<I: IntoIterator<Item = (&'a str, bool)>>(iter: I) -> Self {
        iter.into_iter()
            .map(|(selector, exposed)| FilterRule::from_selector(selector, exposed))
            .collect()
    }
}
