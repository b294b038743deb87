use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// One candidate match from a tracker's search API. Two results are equal when
/// every descriptive field matches; `remote_id` is derived from the tracker
/// side and excluded from equality and hashing.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrackerSearchResult {
    pub cover_url: String,
    pub id: i64,
    pub remote_id: i64,
    #[serde(rename = "publishingStatus")]
    pub status: String,
    #[serde(rename = "publishingType")]
    pub media_type: String,
    pub start_date: String,
    pub summary: String,
    pub title: String,
    pub total_chapters: i64,
    pub tracking_url: String,
}

impl PartialEq for TrackerSearchResult {
    fn eq(&self, other: &Self) -> bool {
        self.cover_url == other.cover_url
            && self.id == other.id
            && self.status == other.status
            && self.media_type == other.media_type
            && self.start_date == other.start_date
            && self.summary == other.summary
            && self.title == other.title
            && self.total_chapters == other.total_chapters
            && self.tracking_url == other.tracking_url
    }
}

impl Eq for TrackerSearchResult {}

impl Hash for TrackerSearchResult {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.cover_url.hash(state);
        self.id.hash(state);
        self.status.hash(state);
        self.media_type.hash(state);
        self.start_date.hash(state);
        self.summary.hash(state);
        self.title.hash(state);
        self.total_chapters.hash(state);
        self.tracking_url.hash(state);
    }
}

impl TrackerSearchResult {
    pub fn type_formatted(&self) -> String {
        capitalize(&self.media_type)
    }

    pub fn status_formatted(&self) -> String {
        capitalize(&self.status)
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

#[cfg(test)]
mod test {
    use std::hash::{DefaultHasher, Hash, Hasher};

    use super::*;

    fn result() -> TrackerSearchResult {
        TrackerSearchResult {
            cover_url: "https://example.org/cover.png".to_string(),
            id: 12,
            remote_id: 112981,
            status: "RELEASING".to_string(),
            media_type: "MANGA".to_string(),
            start_date: "2019-09-20".to_string(),
            summary: "A summary".to_string(),
            title: "A Title".to_string(),
            total_chapters: 120,
            tracking_url: "https://anilist.co/manga/112981".to_string(),
        }
    }

    fn hash_of(value: &TrackerSearchResult) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_same_fields_are_equal() {
        assert_eq!(result(), result());
        assert_eq!(hash_of(&result()), hash_of(&result()));
    }

    #[test]
    fn test_remote_id_is_not_compared() {
        let mut other = result();
        other.remote_id = 999;

        assert_eq!(result(), other);
        assert_eq!(hash_of(&result()), hash_of(&other));
    }

    #[test]
    fn test_each_compared_field_breaks_equality() {
        let base = result();

        let perturbations: Vec<TrackerSearchResult> = vec![
            TrackerSearchResult {
                cover_url: "other".to_string(),
                ..base.clone()
            },
            TrackerSearchResult {
                id: 13,
                ..base.clone()
            },
            TrackerSearchResult {
                status: "FINISHED".to_string(),
                ..base.clone()
            },
            TrackerSearchResult {
                media_type: "NOVEL".to_string(),
                ..base.clone()
            },
            TrackerSearchResult {
                start_date: "2020-01-01".to_string(),
                ..base.clone()
            },
            TrackerSearchResult {
                summary: "other".to_string(),
                ..base.clone()
            },
            TrackerSearchResult {
                title: "Other".to_string(),
                ..base.clone()
            },
            TrackerSearchResult {
                total_chapters: 1,
                ..base.clone()
            },
            TrackerSearchResult {
                tracking_url: "other".to_string(),
                ..base.clone()
            },
        ];

        for perturbed in perturbations {
            assert_ne!(base, perturbed);
        }
    }

    #[test]
    fn test_formatted_display_fields() {
        let result = result();

        assert_eq!(result.type_formatted(), "Manga");
        assert_eq!(result.status_formatted(), "Releasing");
    }
}
