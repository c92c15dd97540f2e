//! This file defines the `Category` type.
//! A category acts like a tag for a transaction, however a transaction may only have one category.

use std::{fmt::Display, str::FromStr};

/// The fixed set of spending categories.
///
/// Each category has a label for display and a tag label that the remote
/// database uses for its select property. The two happen to be the same text
/// for every category, but only [Category::tag_label] is part of the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    /// Everyday household items.
    #[default]
    Daily,
    /// Electronics and gadgets.
    Digital,
    /// Books, courses and other learning.
    Study,
    /// Games, films and going out.
    Entertainment,
    /// Public transport, taxis and fuel.
    Transport,
    /// Snacks and drinks.
    Snacks,
    /// Trips and accommodation.
    Travel,
    /// Meals.
    Food,
    /// Merchandise and collectibles.
    Millet,
    /// Doctors and medicine.
    Medical,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 10] = [
        Category::Daily,
        Category::Digital,
        Category::Study,
        Category::Entertainment,
        Category::Transport,
        Category::Snacks,
        Category::Travel,
        Category::Food,
        Category::Millet,
        Category::Medical,
    ];

    /// The category used when a tag from the remote database does not match any category.
    pub const FALLBACK: Category = Category::Daily;

    /// The name shown to users.
    pub fn label(self) -> &'static str {
        match self {
            Category::Daily => "日用",
            Category::Digital => "数码",
            Category::Study => "学习",
            Category::Entertainment => "娱乐",
            Category::Transport => "交通",
            Category::Snacks => "零食",
            Category::Travel => "旅行",
            Category::Food => "吃饭",
            Category::Millet => "谷子",
            Category::Medical => "医疗",
        }
    }

    /// The option name used by the `Tags` select property in the remote database.
    pub fn tag_label(self) -> &'static str {
        self.label()
    }

    /// Find the category whose tag label is `tag`.
    pub fn from_tag_label(tag: &str) -> Option<Category> {
        Category::ALL
            .into_iter()
            .find(|category| category.tag_label() == tag)
    }

    /// Find the category for `tag`, falling back to [Category::FALLBACK].
    pub fn from_tag_label_or_fallback(tag: Option<&str>) -> Category {
        tag.and_then(Category::from_tag_label)
            .unwrap_or(Category::FALLBACK)
    }

    fn code(self) -> &'static str {
        match self {
            Category::Daily => "daily",
            Category::Digital => "digital",
            Category::Study => "study",
            Category::Entertainment => "entertainment",
            Category::Transport => "transport",
            Category::Snacks => "snacks",
            Category::Travel => "travel",
            Category::Food => "food",
            Category::Millet => "millet",
            Category::Medical => "medical",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The error returned when a string does not name a [Category].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("\"{0}\" is not a category")]
pub struct ParseCategoryError(String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    /// Parse either the English name (case insensitive) or the label of a category.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        Category::ALL
            .into_iter()
            .find(|category| category.code().eq_ignore_ascii_case(s) || category.label() == s)
            .ok_or_else(|| ParseCategoryError(s.to_owned()))
    }
}
