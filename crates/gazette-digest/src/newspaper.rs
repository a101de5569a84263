//! The assembled front page payload.

use chrono::{DateTime, Utc};
use gazette_spotify::{Artist, Track, UserProfile};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::genres::{GenreShare, genre_breakdown};
use crate::mood::derive_mood;
use crate::stats::{ListeningStats, listening_stats};

/// Everything the presentation layer needs to render one edition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Newspaper {
    pub user: UserProfile,
    pub top_tracks: Vec<Track>,
    pub top_artists: Vec<Artist>,
    pub genres: Vec<GenreShare>,
    pub stats: ListeningStats,
    pub mood: String,
}

impl Newspaper {
    /// Derive genres, mood and stats from fetched data.
    pub fn assemble<R: Rng>(
        user: UserProfile,
        top_tracks: Vec<Track>,
        top_artists: Vec<Artist>,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Self {
        let genres = genre_breakdown(&top_artists);
        let mood = derive_mood(&genres, &top_artists).to_string();
        let stats = listening_stats(&top_tracks, &top_artists, now, rng);

        Self {
            user,
            top_tracks,
            top_artists,
            genres,
            stats,
            mood,
        }
    }
}
