use chrono::{DateTime, NaiveDate};
use hondana_tracker::anilist::{MediaListItem, MediaListStatus};
use hondana_tracker::myanimelist::{MalListStatus, MyListStatus};
use serde::{Deserialize, Serialize};

/// Trackers known to the manga server's registry, keyed by their stable
/// numeric identifier there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackerType {
    MyAnimeList,
    AniList,
}

const TRACKER_REGISTRY: [(i64, TrackerType); 2] = [
    (1, TrackerType::MyAnimeList),
    (2, TrackerType::AniList),
];

impl TrackerType {
    /// Unknown identifiers resolve to nothing; they are never coerced to a
    /// default tracker.
    pub fn from_id(id: i64) -> Option<TrackerType> {
        TRACKER_REGISTRY
            .iter()
            .find(|(tracker_id, _)| *tracker_id == id)
            .map(|(_, tracker)| *tracker)
    }

    pub fn id(&self) -> i64 {
        match self {
            Self::MyAnimeList => 1,
            Self::AniList => 2,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::MyAnimeList => "MAL",
            Self::AniList => "ANILIST",
        }
    }
}

/// Reading status shared by every tracker and the manga server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackStatus {
    Reading,
    PlanToRead,
    Completed,
    OnHold,
    Dropped,
    Rereading,
}

impl TrackStatus {
    pub fn parse(value: &str) -> Option<TrackStatus> {
        match value {
            "reading" => Some(Self::Reading),
            "plan_to_read" => Some(Self::PlanToRead),
            "completed" => Some(Self::Completed),
            "on_hold" => Some(Self::OnHold),
            "dropped" => Some(Self::Dropped),
            "rereading" => Some(Self::Rereading),
            _ => None,
        }
    }

    /// The manga server reports status as a numeric code.
    pub fn from_code(code: i64) -> Option<TrackStatus> {
        match code {
            1 => Some(Self::Reading),
            2 => Some(Self::Completed),
            3 => Some(Self::OnHold),
            4 => Some(Self::Dropped),
            5 => Some(Self::PlanToRead),
            6 => Some(Self::Rereading),
            _ => None,
        }
    }

    pub fn from_mal(status: &str) -> Option<TrackStatus> {
        match status {
            "reading" => Some(Self::Reading),
            "completed" => Some(Self::Completed),
            "on_hold" => Some(Self::OnHold),
            "dropped" => Some(Self::Dropped),
            "plan_to_read" => Some(Self::PlanToRead),
            _ => None,
        }
    }

    pub fn to_mal(self) -> MalListStatus {
        match self {
            Self::Reading | Self::Rereading => MalListStatus::Reading,
            Self::Completed => MalListStatus::Completed,
            Self::OnHold => MalListStatus::OnHold,
            Self::Dropped => MalListStatus::Dropped,
            Self::PlanToRead => MalListStatus::PlanToRead,
        }
    }

    pub fn to_anilist(self) -> MediaListStatus {
        match self {
            Self::Reading => MediaListStatus::Current,
            Self::PlanToRead => MediaListStatus::Planning,
            Self::Completed => MediaListStatus::Completed,
            Self::OnHold => MediaListStatus::Paused,
            Self::Dropped => MediaListStatus::Dropped,
            Self::Rereading => MediaListStatus::Repeating,
        }
    }
}

impl From<MediaListStatus> for TrackStatus {
    fn from(status: MediaListStatus) -> Self {
        match status {
            MediaListStatus::Current => Self::Reading,
            MediaListStatus::Planning => Self::PlanToRead,
            MediaListStatus::Completed => Self::Completed,
            MediaListStatus::Paused => Self::OnHold,
            MediaListStatus::Dropped => Self::Dropped,
            MediaListStatus::Repeating => Self::Rereading,
        }
    }
}

/// One tracker binding for a manga as reported by the manga server.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrackRecord {
    pub id: i64,
    pub manga_id: i64,
    pub tracker_id: i64,
    pub remote_id: i64,
    pub title: String,
    pub status: i64,
    pub last_chapter_read: f64,
    pub total_chapters: i64,
    pub score: f64,
    pub start_date: Option<i64>,
    pub finish_date: Option<i64>,
    pub tracking_url: String,
}

/// Common read-only view over each tracker's native statistics. Absent dates
/// stay absent; there is no sentinel date.
pub trait MangaStatistics {
    fn status(&self) -> Option<TrackStatus>;
    fn progress(&self) -> f64;
    fn score(&self) -> f64;
    fn started_at(&self) -> Option<NaiveDate>;
    fn completed_at(&self) -> Option<NaiveDate>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct MalMangaStatistics {
    status: Option<TrackStatus>,
    progress: f64,
    score: f64,
    started_at: Option<NaiveDate>,
    completed_at: Option<NaiveDate>,
}

impl From<&MyListStatus> for MalMangaStatistics {
    fn from(status: &MyListStatus) -> Self {
        Self {
            status: status.status.as_deref().and_then(TrackStatus::from_mal),
            progress: status.num_chapters_read as f64,
            score: status.score as f64,
            started_at: status.start_date,
            completed_at: status.finish_date,
        }
    }
}

impl MangaStatistics for MalMangaStatistics {
    fn status(&self) -> Option<TrackStatus> {
        self.status
    }

    fn progress(&self) -> f64 {
        self.progress
    }

    fn score(&self) -> f64 {
        self.score
    }

    fn started_at(&self) -> Option<NaiveDate> {
        self.started_at
    }

    fn completed_at(&self) -> Option<NaiveDate> {
        self.completed_at
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AniListMangaStatistics {
    status: Option<TrackStatus>,
    progress: f64,
    score: f64,
    started_at: Option<NaiveDate>,
    completed_at: Option<NaiveDate>,
}

impl From<&MediaListItem> for AniListMangaStatistics {
    fn from(entry: &MediaListItem) -> Self {
        Self {
            status: entry.status.map(TrackStatus::from),
            progress: entry.progress.unwrap_or(0) as f64,
            score: entry.score.unwrap_or(0.0),
            started_at: entry.started_at.as_ref().and_then(|date| date.to_date()),
            completed_at: entry.completed_at.as_ref().and_then(|date| date.to_date()),
        }
    }
}

impl MangaStatistics for AniListMangaStatistics {
    fn status(&self) -> Option<TrackStatus> {
        self.status
    }

    fn progress(&self) -> f64 {
        self.progress
    }

    fn score(&self) -> f64 {
        self.score
    }

    fn started_at(&self) -> Option<NaiveDate> {
        self.started_at
    }

    fn completed_at(&self) -> Option<NaiveDate> {
        self.completed_at
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SuwayomiMangaStatistics {
    status: Option<TrackStatus>,
    progress: f64,
    score: f64,
    started_at: Option<NaiveDate>,
    completed_at: Option<NaiveDate>,
}

impl From<&TrackRecord> for SuwayomiMangaStatistics {
    fn from(record: &TrackRecord) -> Self {
        Self {
            status: TrackStatus::from_code(record.status),
            progress: record.last_chapter_read,
            score: record.score,
            started_at: record.start_date.and_then(millis_to_date),
            completed_at: record.finish_date.and_then(millis_to_date),
        }
    }
}

impl MangaStatistics for SuwayomiMangaStatistics {
    fn status(&self) -> Option<TrackStatus> {
        self.status
    }

    fn progress(&self) -> f64 {
        self.progress
    }

    fn score(&self) -> f64 {
        self.score
    }

    fn started_at(&self) -> Option<NaiveDate> {
        self.started_at
    }

    fn completed_at(&self) -> Option<NaiveDate> {
        self.completed_at
    }
}

// The server sends zero for unset dates.
fn millis_to_date(millis: i64) -> Option<NaiveDate> {
    if millis == 0 {
        return None;
    }
    DateTime::from_timestamp_millis(millis).map(|instant| instant.date_naive())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_tracker_from_id() {
        assert_eq!(TrackerType::from_id(1), Some(TrackerType::MyAnimeList));
        assert_eq!(TrackerType::from_id(2), Some(TrackerType::AniList));
        assert_eq!(TrackerType::from_id(99), None);
    }

    #[test]
    fn test_tracker_id_round_trip() {
        for (id, tracker) in TRACKER_REGISTRY {
            assert_eq!(tracker.id(), id);
            assert_eq!(TrackerType::from_id(id), Some(tracker));
        }
    }

    #[test]
    fn test_status_from_code() {
        assert_eq!(TrackStatus::from_code(1), Some(TrackStatus::Reading));
        assert_eq!(TrackStatus::from_code(2), Some(TrackStatus::Completed));
        assert_eq!(TrackStatus::from_code(3), Some(TrackStatus::OnHold));
        assert_eq!(TrackStatus::from_code(4), Some(TrackStatus::Dropped));
        assert_eq!(TrackStatus::from_code(5), Some(TrackStatus::PlanToRead));
        assert_eq!(TrackStatus::from_code(6), Some(TrackStatus::Rereading));
        assert_eq!(TrackStatus::from_code(7), None);
        assert_eq!(TrackStatus::from_code(0), None);
    }

    #[test]
    fn test_status_from_mal() {
        assert_eq!(TrackStatus::from_mal("reading"), Some(TrackStatus::Reading));
        assert_eq!(
            TrackStatus::from_mal("plan_to_read"),
            Some(TrackStatus::PlanToRead)
        );
        assert_eq!(TrackStatus::from_mal("watching"), None);
    }

    #[test]
    fn test_status_from_anilist() {
        assert_eq!(
            TrackStatus::from(MediaListStatus::Current),
            TrackStatus::Reading
        );
        assert_eq!(
            TrackStatus::from(MediaListStatus::Paused),
            TrackStatus::OnHold
        );
        assert_eq!(
            TrackStatus::from(MediaListStatus::Repeating),
            TrackStatus::Rereading
        );
    }

    #[test]
    fn test_suwayomi_statistics_absent_dates() {
        let record = TrackRecord {
            status: 1,
            last_chapter_read: 12.0,
            score: 8.0,
            start_date: None,
            finish_date: Some(0),
            ..Default::default()
        };

        let stats = SuwayomiMangaStatistics::from(&record);

        assert_eq!(stats.status(), Some(TrackStatus::Reading));
        assert_eq!(stats.progress(), 12.0);
        assert_eq!(stats.started_at(), None);
        assert_eq!(stats.completed_at(), None);
    }

    #[test]
    fn test_suwayomi_statistics_dates() {
        let record = TrackRecord {
            status: 2,
            // 2021-04-03T00:00:00Z
            start_date: Some(1_617_408_000_000),
            ..Default::default()
        };

        let stats = SuwayomiMangaStatistics::from(&record);

        assert_eq!(stats.started_at(), NaiveDate::from_ymd_opt(2021, 4, 3));
    }

    #[test]
    fn test_unknown_status_code_is_rejected() {
        let record = TrackRecord {
            status: 42,
            ..Default::default()
        };

        let stats = SuwayomiMangaStatistics::from(&record);

        assert_eq!(stats.status(), None);
    }

    #[test]
    fn test_mal_statistics_from_list_status() {
        let status = MyListStatus {
            status: Some("reading".to_string()),
            score: 7,
            num_chapters_read: 42,
            start_date: NaiveDate::from_ymd_opt(2020, 1, 2),
            finish_date: None,
        };

        let stats = MalMangaStatistics::from(&status);

        assert_eq!(stats.status(), Some(TrackStatus::Reading));
        assert_eq!(stats.progress(), 42.0);
        assert_eq!(stats.score(), 7.0);
        assert_eq!(stats.started_at(), NaiveDate::from_ymd_opt(2020, 1, 2));
        assert_eq!(stats.completed_at(), None);
    }
}
