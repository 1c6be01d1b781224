//! Catalogue models
//!
//! Locations, skills and interests are all flat lists of unique names.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which catalogue an entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogKind {
    Location,
    Skill,
    Interest,
}

impl CatalogKind {
    pub fn table(&self) -> &'static str {
        match self {
            CatalogKind::Location => "locations",
            CatalogKind::Skill => "skills",
            CatalogKind::Interest => "interests",
        }
    }

    /// Join table and foreign key column linking users to this catalogue.
    ///
    /// Locations are attached to events, not users.
    pub fn user_link(&self) -> Option<(&'static str, &'static str)> {
        match self {
            CatalogKind::Location => None,
            CatalogKind::Skill => Some(("user_skills", "skill_id")),
            CatalogKind::Interest => Some(("user_interests", "interest_id")),
        }
    }

    /// Longest name the catalogue accepts
    pub fn max_name_len(&self) -> usize {
        match self {
            CatalogKind::Location => 100,
            CatalogKind::Skill | CatalogKind::Interest => 255,
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CatalogKind::Location => "location",
            CatalogKind::Skill => "skill",
            CatalogKind::Interest => "interest",
        };
        f.write_str(name)
    }
}

/// One named entry of a catalogue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: i64,
    pub name: String,
}

/// Input for adding a catalogue entry
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCatalogEntryInput {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_skills_and_interests_link_to_users() {
        assert_eq!(CatalogKind::Location.user_link(), None);
        assert_eq!(CatalogKind::Skill.user_link(), Some(("user_skills", "skill_id")));
        assert_eq!(
            CatalogKind::Interest.user_link(),
            Some(("user_interests", "interest_id"))
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(CatalogKind::Location.to_string(), "location");
        assert_eq!(CatalogKind::Interest.table(), "interests");
    }
}
