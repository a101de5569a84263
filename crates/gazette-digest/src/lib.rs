//! Derived front-page content.
//!
//! Everything here is a pure function of fetched data, the current time and
//! an injected random source, so a seeded RNG gives reproducible pages.

pub mod genres;
pub mod mood;
pub mod newspaper;
pub mod stats;

pub use genres::{GenreShare, aggregate_genres, count_genres, genre_breakdown};
pub use mood::{average_popularity, derive_mood};
pub use newspaper::Newspaper;
pub use stats::{ListeningHabit, ListeningStats, listening_stats};
