//! Listening stats sidebar.

use chrono::{DateTime, Utc};
use gazette_spotify::{Artist, Track};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Songs per day assumed for the minutes estimate.
const SONGS_PER_DAY: f64 = 15.0;

/// Average song length in minutes.
const AVG_SONG_MINUTES: f64 = 3.5;

/// Days covered by the estimate.
const DAYS_IN_PERIOD: f64 = 30.0;

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

const FALLBACK_ARTIST: &str = "your favorite artist";
const FALLBACK_TRACK: &str = "your top song";

/// One row of the habits table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListeningHabit {
    pub title: String,
    pub value: String,
}

impl ListeningHabit {
    fn new(title: &str, value: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListeningStats {
    pub total_minutes: u32,
    pub top_month: String,
    pub top_month_reason: String,
    pub fun_fact: String,
    pub listening_habits: Vec<ListeningHabit>,
}

/// Build the stats sidebar.
///
/// `now` picks the month; `rng` picks the phrases, the favorite day and the
/// streak length.
pub fn listening_stats<R>(
    tracks: &[Track],
    artists: &[Artist],
    now: DateTime<Utc>,
    rng: &mut R,
) -> ListeningStats
where
    R: Rng,
{
    let total_minutes = (SONGS_PER_DAY * AVG_SONG_MINUTES * DAYS_IN_PERIOD).floor() as u32;

    let artist = artists.first().map_or(FALLBACK_ARTIST, |a| a.name.as_str());
    let track = tracks.first().map_or(FALLBACK_TRACK, |t| t.name.as_str());

    let reasons = [
        format!("{artist}'s new releases captivated you"),
        "You discovered some amazing new music".to_string(),
        "Perfect soundtrack for your activities".to_string(),
        "REASON still being investigated. Probably heartbreak.".to_string(),
    ];
    let facts = [
        format!("You've listened to {artist} more than 80% of other Spotify users."),
        "Your late night listening sessions have increased 34% compared to last year.".to_string(),
        format!("You've been in the top 2% of {artist} listeners this month."),
        format!("\"{track}\" has been your go-to song when you need a mood boost."),
    ];

    let top_month_reason = reasons[rng.random_range(0..reasons.len())].clone();
    let fun_fact = facts[rng.random_range(0..facts.len())].clone();
    let favorite_day = WEEKDAYS[rng.random_range(0..WEEKDAYS.len())];
    let streak: u32 = rng.random_range(10..60);

    ListeningStats {
        total_minutes,
        top_month: now.format("%B").to_string(),
        top_month_reason,
        fun_fact,
        listening_habits: vec![
            ListeningHabit::new("Peak listening time", "9PM - 11PM"),
            ListeningHabit::new("Favorite day", favorite_day),
            ListeningHabit::new("Listening streak", format!("{streak} days")),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn april() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 15, 20, 0, 0).unwrap()
    }

    fn artist(name: &str) -> Artist {
        Artist {
            id: "a1".to_string(),
            name: name.to_string(),
            image_url: None,
            genres: Vec::new(),
            popularity: Some(70),
        }
    }

    fn track(name: &str) -> Track {
        Track {
            id: "t1".to_string(),
            name: name.to_string(),
            artist: "x".to_string(),
            album: None,
            image_url: None,
            popularity: None,
        }
    }

    #[test]
    fn test_fixed_fields() {
        let stats = listening_stats(&[], &[], april(), &mut StdRng::seed_from_u64(7));
        assert_eq!(stats.total_minutes, 1575);
        assert_eq!(stats.top_month, "April");
        assert_eq!(stats.listening_habits.len(), 3);
        assert_eq!(
            stats.listening_habits[0],
            ListeningHabit::new("Peak listening time", "9PM - 11PM")
        );
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let artists = [artist("The Editors")];
        let tracks = [track("Front Page")];
        let a = listening_stats(&tracks, &artists, april(), &mut StdRng::seed_from_u64(42));
        let b = listening_stats(&tracks, &artists, april(), &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_random_fields_stay_in_range() {
        let artists = [artist("The Editors")];
        let tracks = [track("Front Page")];
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..200 {
            let stats = listening_stats(&tracks, &artists, april(), &mut rng);

            let day = &stats.listening_habits[1];
            assert_eq!(day.title, "Favorite day");
            assert!(WEEKDAYS.contains(&day.value.as_str()));

            let streak = &stats.listening_habits[2];
            let days: u32 = streak.value.trim_end_matches(" days").parse().unwrap();
            assert!((10..=59).contains(&days));

            assert!(!stats.fun_fact.contains("your favorite artist"));
            assert!(!stats.fun_fact.contains("your top song"));
        }
    }

    #[test]
    fn test_fallback_names() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut saw_fallback = false;
        for _ in 0..100 {
            let stats = listening_stats(&[], &[], april(), &mut rng);
            if stats.fun_fact.contains(FALLBACK_ARTIST) || stats.fun_fact.contains(FALLBACK_TRACK) {
                saw_fallback = true;
            }
        }
        assert!(saw_fallback);
    }
}
