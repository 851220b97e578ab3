use std::collections::BTreeSet;

/// The user's filter selection.
///
/// Genres keep their insertion order for display, but two states compare
/// equal when they select the same set of genres and the same ceiling.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    genres: Vec<String>,
    certification: Option<String>,
}

/// Order-independent identity of a `FilterState`, used to key the feed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FilterKey {
    genres: BTreeSet<String>,
    certification: Option<String>,
}

impl FilterState {
    pub fn new(genres: Vec<String>, certification: Option<String>) -> Self {
        let mut state = FilterState::default();
        for genre in genres {
            state.add_genre(genre);
        }
        state.certification = normalize_certification(certification);
        state
    }

    pub fn genres(&self) -> &[String] {
        &self.genres
    }

    pub fn certification(&self) -> Option<&str> {
        self.certification.as_deref()
    }

    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g == genre)
    }

    pub fn is_empty(&self) -> bool {
        self.genres.is_empty() && self.certification.is_none()
    }

    pub fn key(&self) -> FilterKey {
        FilterKey {
            genres: self.genres.iter().cloned().collect(),
            certification: self.certification.clone(),
        }
    }

    /// Returns a copy with `genre` selected if it was not, or removed if it was.
    pub fn toggle_genre(&self, genre: &str) -> Self {
        let mut next = self.clone();
        if next.has_genre(genre) {
            next.genres.retain(|g| g != genre);
        } else {
            next.genres.push(genre.to_string());
        }
        next
    }

    /// Returns a copy with a new ceiling. An empty code clears it.
    pub fn with_certification(&self, certification: Option<&str>) -> Self {
        let mut next = self.clone();
        next.certification = normalize_certification(certification.map(str::to_string));
        next
    }

    fn add_genre(&mut self, genre: String) {
        if !self.has_genre(&genre) {
            self.genres.push(genre);
        }
    }
}

fn normalize_certification(certification: Option<String>) -> Option<String> {
    certification.filter(|c| !c.is_empty())
}

impl PartialEq for FilterState {
    fn eq(&self, other: &Self) -> bool {
        self.certification == other.certification && self.key() == other.key()
    }
}

impl Eq for FilterState {}

#[cfg(test)]
mod tests {
    use super::*;

    fn genres(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_equality_ignores_genre_order() {
        let a = FilterState::new(genres(&["Drama", "Terror"]), None);
        let b = FilterState::new(genres(&["Terror", "Drama"]), None);
        assert_eq!(a, b);
        assert_eq!(a.key(), b.key());
        assert_eq!(b.genres(), &["Terror".to_string(), "Drama".to_string()]);
    }

    #[test]
    fn test_equality_checks_certification() {
        let a = FilterState::new(genres(&["Drama"]), None);
        let b = FilterState::new(genres(&["Drama"]), Some("PG".into()));
        assert_ne!(a, b);
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn test_duplicate_genres_collapse() {
        let a = FilterState::new(genres(&["Drama", "Drama"]), None);
        assert_eq!(a.genres().len(), 1);
    }

    #[test]
    fn test_toggle_genre() {
        let state = FilterState::default().toggle_genre("Western").toggle_genre("Comedia");
        assert_eq!(state.genres(), &["Western".to_string(), "Comedia".to_string()]);

        let state = state.toggle_genre("Western");
        assert_eq!(state.genres(), &["Comedia".to_string()]);
    }

    #[test]
    fn test_empty_certification_clears() {
        let state = FilterState::default().with_certification(Some("R"));
        assert_eq!(state.certification(), Some("R"));

        let state = state.with_certification(Some(""));
        assert_eq!(state.certification(), None);
        assert!(state.is_empty());
    }
}
