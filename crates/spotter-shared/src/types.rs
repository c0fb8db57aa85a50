use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A profile eligible for swiping in the current deck.
///
/// Immutable once fetched for a session; the deck is replaced wholesale
/// on filter change or reset, never patched in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Unique identity within a deck.
    pub email: String,
    pub name: String,
    pub age: u8,
    pub gender: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub profile_image_url: Option<String>,
    /// Ordered gallery, possibly empty.
    #[serde(default)]
    pub gallery_image_urls: Vec<String>,
    #[serde(default)]
    pub preference_tags: BTreeSet<String>,
    #[serde(default)]
    pub gym_name: Option<String>,
    /// Server-computed score; the client never recomputes it.
    #[serde(default)]
    pub compatibility_score: f64,
}

/// One entry of the match roster shown in the chat sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchEntry {
    pub email: String,
    pub username: String,
    /// Wire field is `prof_pic`; absent when the user never uploaded one.
    #[serde(rename = "prof_pic", default)]
    pub profile_picture_url: Option<String>,
}

/// Account type as the admin endpoints report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserType {
    User,
    Admin,
}

/// Full user record as returned by the admin user endpoints.
///
/// Looser than [`Candidate`]: the backend omits demographic fields for
/// accounts that never completed their profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub age: Option<u16>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub user_type: Option<UserType>,
    #[serde(rename = "prof_pic", default)]
    pub profile_picture_url: Option<String>,
}

/// Gender predicate of a [`DeckFilter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenderFilter {
    /// Admits every candidate.
    All,
    /// Admits candidates whose gender matches exactly.
    Only(String),
}

impl GenderFilter {
    pub fn admits(&self, gender: &str) -> bool {
        match self {
            GenderFilter::All => true,
            GenderFilter::Only(wanted) => wanted == gender,
        }
    }
}

/// Deck filter: inclusive age range plus a gender predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckFilter {
    pub age_min: u8,
    pub age_max: u8,
    pub gender: GenderFilter,
}

impl DeckFilter {
    /// A filter admits a candidate when `age ∈ [age_min, age_max]` and
    /// the gender predicate passes.
    pub fn admits(&self, candidate: &Candidate) -> bool {
        candidate.age >= self.age_min
            && candidate.age <= self.age_max
            && self.gender.admits(&candidate.gender)
    }

    /// An inverted age range is a user-input error, caught before any
    /// network call.
    pub fn is_valid(&self) -> bool {
        self.age_min <= self.age_max
    }
}

impl Default for DeckFilter {
    fn default() -> Self {
        // The range the filter UI starts from.
        Self {
            age_min: 18,
            age_max: 80,
            gender: GenderFilter::All,
        }
    }
}

/// The logical channel identifying a two-party conversation.
///
/// Keyed by the sorted email pair so both parties derive the same key
/// regardless of who opens the room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomKey(String);

impl RoomKey {
    pub fn new(email_a: &str, email_b: &str) -> Self {
        let (lo, hi) = if email_a <= email_b {
            (email_a, email_b)
        } else {
            (email_b, email_a)
        };
        Self(format!("{lo}_{hi}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this room is the conversation between the unordered pair
    /// `{email_a, email_b}`.
    pub fn joins(&self, email_a: &str, email_b: &str) -> bool {
        *self == RoomKey::new(email_a, email_b)
    }
}

impl std::fmt::Display for RoomKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// UI theme, persisted across sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    /// Parse the persisted form; anything unrecognised is `None`.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(email: &str, age: u8, gender: &str) -> Candidate {
        Candidate {
            email: email.to_string(),
            name: email.to_string(),
            age,
            gender: gender.to_string(),
            bio: String::new(),
            profile_image_url: None,
            gallery_image_urls: Vec::new(),
            preference_tags: BTreeSet::new(),
            gym_name: None,
            compatibility_score: 0.0,
        }
    }

    #[test]
    fn test_room_key_order_insensitive() {
        let a = RoomKey::new("ana@x", "luis@x");
        let b = RoomKey::new("luis@x", "ana@x");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "ana@x_luis@x");
    }

    #[test]
    fn test_room_key_membership() {
        let key = RoomKey::new("ana@x", "luis@x");
        assert!(key.joins("luis@x", "ana@x"));
        assert!(!key.joins("ana@x", "elena@x"));
    }

    #[test]
    fn test_filter_admits_age_bounds_inclusive() {
        let filter = DeckFilter {
            age_min: 20,
            age_max: 30,
            gender: GenderFilter::All,
        };
        assert!(filter.admits(&candidate("a@x", 20, "F")));
        assert!(filter.admits(&candidate("b@x", 30, "M")));
        assert!(!filter.admits(&candidate("c@x", 19, "F")));
        assert!(!filter.admits(&candidate("d@x", 31, "M")));
    }

    #[test]
    fn test_filter_gender_predicate() {
        let filter = DeckFilter {
            gender: GenderFilter::Only("F".to_string()),
            ..DeckFilter::default()
        };
        assert!(filter.admits(&candidate("a@x", 25, "F")));
        assert!(!filter.admits(&candidate("b@x", 25, "M")));
    }

    #[test]
    fn test_filter_inverted_range_invalid() {
        let filter = DeckFilter {
            age_min: 40,
            age_max: 20,
            gender: GenderFilter::All,
        };
        assert!(!filter.is_valid());
        assert!(DeckFilter::default().is_valid());
    }

    #[test]
    fn test_match_entry_wire_field_names() {
        let json = r#"{"email":"ana@x","username":"ana","prof_pic":null}"#;
        let entry: MatchEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.username, "ana");
        assert!(entry.profile_picture_url.is_none());
    }

    #[test]
    fn test_candidate_defaults_for_optional_fields() {
        let json = r#"{"email":"ana@x","name":"Ana","age":29,"gender":"F"}"#;
        let c: Candidate = serde_json::from_str(json).unwrap();
        assert!(c.gallery_image_urls.is_empty());
        assert!(c.gym_name.is_none());
        assert_eq!(c.compatibility_score, 0.0);
    }

    #[test]
    fn test_theme_roundtrip() {
        assert_eq!(Theme::from_str("dark"), Some(Theme::Dark));
        assert_eq!(Theme::from_str("sepia"), None);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Light.as_str(), "light");
    }
}
