//! Mood label for the front page.

use gazette_spotify::Artist;

use crate::genres::GenreShare;

/// Keyword to mood, checked in this order against the top genre.
const GENRE_MOODS: [(&str, &str); 16] = [
    ("pop", "Poppy"),
    ("rock", "Rock Enthusiast"),
    ("hip hop", "Hip"),
    ("rap", "Urban"),
    ("r&b", "Soulful"),
    ("indie", "Indie"),
    ("electronic", "Electronic"),
    ("dance", "Energetic"),
    ("classical", "Sophisticated"),
    ("jazz", "Cultured"),
    ("metal", "Intense"),
    ("alternative", "Alternative"),
    ("folk", "Folksy"),
    ("country", "Country"),
    ("blues", "Bluesy"),
    ("soul", "Soulful"),
];

/// Mean popularity of the artists; 0 for an empty list. Missing values count as 0.
pub fn average_popularity(artists: &[Artist]) -> f64 {
    if artists.is_empty() {
        return 0.0;
    }
    let sum: u64 = artists
        .iter()
        .map(|a| u64::from(a.popularity.unwrap_or(0)))
        .sum();
    sum as f64 / artists.len() as f64
}

/// Pick a mood from the top genre, falling back to a popularity ladder.
pub fn derive_mood(genres: &[GenreShare], artists: &[Artist]) -> &'static str {
    if let Some(top) = genres.first() {
        let name = top.name.to_lowercase();
        if let Some((_, mood)) = GENRE_MOODS.iter().find(|(keyword, _)| name.contains(keyword)) {
            return *mood;
        }
    }

    match average_popularity(artists) {
        p if p > 80.0 => "Trendsetter",
        p if p > 60.0 => "Mainstream",
        p if p > 40.0 => "Mixed",
        _ => "Eclectic",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artist(popularity: u32) -> Artist {
        Artist {
            id: "a".to_string(),
            name: "A".to_string(),
            image_url: None,
            genres: Vec::new(),
            popularity: Some(popularity),
        }
    }

    fn top(name: &str) -> Vec<GenreShare> {
        vec![GenreShare::new(name, 50), GenreShare::new("jazz", 50)]
    }

    #[test]
    fn test_keyword_match_in_priority_order() {
        assert_eq!(derive_mood(&top("Indie Pop"), &[]), "Poppy");
        assert_eq!(derive_mood(&top("pop rock"), &[]), "Poppy");
        assert_eq!(derive_mood(&top("hard rock"), &[]), "Rock Enthusiast");
        assert_eq!(derive_mood(&top("southern hip hop"), &[]), "Hip");
        assert_eq!(derive_mood(&top("neo soul"), &[]), "Soulful");
    }

    #[test]
    fn test_only_top_genre_is_considered() {
        // "jazz" is second and must not decide the mood
        let mood = derive_mood(&top("shoegaze"), &[artist(50)]);
        assert_eq!(mood, "Mixed");
    }

    #[test]
    fn test_popularity_ladder() {
        let none: Vec<GenreShare> = Vec::new();
        assert_eq!(derive_mood(&none, &[artist(90), artist(81)]), "Trendsetter");
        assert_eq!(derive_mood(&none, &[artist(80)]), "Mainstream");
        assert_eq!(derive_mood(&none, &[artist(60)]), "Mixed");
        assert_eq!(derive_mood(&none, &[artist(40)]), "Eclectic");
    }

    #[test]
    fn test_empty_inputs_fall_back() {
        assert_eq!(average_popularity(&[]), 0.0);
        assert_eq!(derive_mood(&[], &[]), "Eclectic");
    }
}
