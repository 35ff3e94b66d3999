//! Catalog and roster types

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Number of labeled option slots a question can carry
pub const OPTION_SLOTS: usize = 4;

/// The implicit catch-all option every question offers
pub const OTHER_OPTION: u8 = 5;

/// A single survey question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// 1-based position in the catalog
    pub ordinal: usize,
    pub text: String,
    /// Slot `i` holds the label for answer `i + 1`
    pub options: [Option<String>; OPTION_SLOTS],
}

impl Question {
    pub fn new(ordinal: usize, text: impl Into<String>, options: [Option<String>; OPTION_SLOTS]) -> Self {
        Self {
            ordinal,
            text: text.into(),
            options,
        }
    }

    /// Label for a 1-based answer number, if that slot is filled
    pub fn option(&self, number: u8) -> Option<&str> {
        let index = usize::from(number).checked_sub(1)?;
        self.options.get(index)?.as_deref()
    }

    /// Filled slots as `(answer number, label)` pairs, in slot order
    pub fn present_options(&self) -> impl Iterator<Item = (u8, &str)> {
        self.options
            .iter()
            .zip(1u8..)
            .filter_map(|(label, number)| label.as_deref().map(|l| (number, l)))
    }

    /// Every answer number this question accepts, always ending with the catch-all
    pub fn valid_numbers(&self) -> Vec<u8> {
        self.present_options()
            .map(|(number, _)| number)
            .chain(std::iter::once(OTHER_OPTION))
            .collect()
    }
}

/// A roster member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Respondent {
    /// Stable channel address
    pub id: String,
    #[serde(rename = "name")]
    pub display_name: String,
}

impl Respondent {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// Ordered, shared question list
pub type Catalog = Arc<[Question]>;

/// Ordered, shared respondent list
pub type Roster = Arc<[Respondent]>;
