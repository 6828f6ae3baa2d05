//! Wire codec for tri-state tag selections.
//!
//! Each tag control submits one token: empty when the tag is ignored,
//! `I<id>` when records must carry the tag, `E<id>` when records carrying it
//! are dropped. A separate boolean picks how the included tags combine.

use std::collections::BTreeSet;
use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

const INCLUDE: char = 'I';
const EXCLUDE: char = 'E';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagState {
    #[default]
    Absent,
    Included,
    Excluded,
}

impl TagState {
    /// The submitted value for a tag control in this state.
    pub fn token<Id: Display>(self, id: &Id) -> String {
        match self {
            TagState::Absent => String::new(),
            TagState::Included => format!("{}{}", INCLUDE, id),
            TagState::Excluded => format!("{}{}", EXCLUDE, id),
        }
    }
}

/// How included tags combine. Exclusions ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    /// Match records carrying any included tag.
    #[default]
    Or,
    /// Match records carrying every included tag.
    And,
}

impl Combinator {
    pub fn from_flag(use_and: bool) -> Self {
        if use_and {
            Combinator::And
        } else {
            Combinator::Or
        }
    }

    /// Checkbox semantics: absent, empty, `false` and `0` read as unchecked.
    pub fn from_form_value(value: Option<&str>) -> Self {
        let checked = match value.map(str::trim) {
            None | Some("") | Some("0") => false,
            Some(v) => !v.eq_ignore_ascii_case("false"),
        };
        Self::from_flag(checked)
    }

    pub fn is_and(self) -> bool {
        self == Combinator::And
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection<Id: Ord> {
    pub includes: BTreeSet<Id>,
    pub excludes: BTreeSet<Id>,
}

impl<Id: Ord> Default for Selection<Id> {
    fn default() -> Self {
        Self {
            includes: BTreeSet::new(),
            excludes: BTreeSet::new(),
        }
    }
}

impl<Id: Ord> Selection<Id> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plain multi-choice selection: every chosen tag is included.
    pub fn from_choices(ids: impl IntoIterator<Item = Id>) -> Self {
        Self {
            includes: ids.into_iter().collect(),
            excludes: BTreeSet::new(),
        }
    }

    pub fn include(mut self, id: Id) -> Self {
        self.includes.insert(id);
        self
    }

    pub fn exclude(mut self, id: Id) -> Self {
        self.excludes.insert(id);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.includes.is_empty() && self.excludes.is_empty()
    }

    /// Exclusion wins when a tag sits in both sets.
    pub fn state_of(&self, id: &Id) -> TagState {
        if self.excludes.contains(id) {
            TagState::Excluded
        } else if self.includes.contains(id) {
            TagState::Included
        } else {
            TagState::Absent
        }
    }
}

/// Split one `I<id>` / `E<id>` token into its state and id.
pub fn parse_token<Id: FromStr>(token: &str) -> Option<(TagState, Id)> {
    let mut chars = token.chars();
    let state = match chars.next()? {
        INCLUDE => TagState::Included,
        EXCLUDE => TagState::Excluded,
        _ => return None,
    };
    let id = chars.as_str().parse().ok()?;
    Some((state, id))
}

impl<Id: Ord + FromStr> Selection<Id> {
    /// Parse submitted tokens. Empty and one-character tokens are skipped, as
    /// are tokens with an unknown leading character or an unparseable id.
    pub fn decode<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selection = Self::new();

        for token in tokens {
            let token = token.as_ref();
            if token.chars().nth(1).is_none() {
                continue;
            }

            match parse_token(token) {
                Some((TagState::Included, id)) => {
                    selection.includes.insert(id);
                }
                Some((TagState::Excluded, id)) => {
                    selection.excludes.insert(id);
                }
                _ => tracing::debug!(token, "ignoring malformed tag token"),
            }
        }

        selection
    }
}

impl<Id: Ord + Display> Selection<Id> {
    /// Tokens that decode back to this selection.
    pub fn encode(&self) -> Vec<String> {
        self.includes
            .iter()
            .map(|id| TagState::Included.token(id))
            .chain(self.excludes.iter().map(|id| TagState::Excluded.token(id)))
            .collect()
    }
}

/// The composite filter value: combinator plus tri-state selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AndOrSelection<Id: Ord> {
    pub combinator: Combinator,
    pub selection: Selection<Id>,
}

impl<Id: Ord> Default for AndOrSelection<Id> {
    fn default() -> Self {
        Self {
            combinator: Combinator::Or,
            selection: Selection::new(),
        }
    }
}
