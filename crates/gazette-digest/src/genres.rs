//! Genre breakdown from the top artists' tags.

use gazette_spotify::Artist;
use serde::{Deserialize, Serialize};

/// Name of the synthetic bucket holding the remainder.
pub const OTHER: &str = "Other";

/// Number of genres kept before the remainder bucket.
pub const TOP_GENRES: usize = 5;

/// One slice of the genre breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreShare {
    pub name: String,
    pub percentage: u32,
}

impl GenreShare {
    pub fn new(name: impl Into<String>, percentage: u32) -> Self {
        Self {
            name: name.into(),
            percentage,
        }
    }
}

/// Count tag occurrences, keeping genres in order of first appearance.
pub fn count_genres<'a, I>(tags: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: Vec<(String, usize)> = Vec::new();
    for tag in tags {
        match counts.iter_mut().find(|(name, _)| name == tag) {
            Some((_, count)) => *count += 1,
            None => counts.push((tag.to_string(), 1)),
        }
    }
    counts
}

/// Turn tag counts into at most five rounded percentages plus a remainder.
///
/// Shares round half away from zero. Equal shares keep their input order.
/// `Other` is appended only when the kept shares sum to less than 100; a
/// sum above 100 from rounding is left as is.
pub fn aggregate_genres(counts: &[(String, usize)]) -> Vec<GenreShare> {
    let total: usize = counts.iter().map(|(_, count)| count).sum();
    if total == 0 {
        return Vec::new();
    }

    let mut shares: Vec<GenreShare> = counts
        .iter()
        .map(|(name, count)| GenreShare::new(name.clone(), rounded_percent(*count, total)))
        .collect();
    // stable: ties keep first-appearance order
    shares.sort_by(|a, b| b.percentage.cmp(&a.percentage));
    shares.truncate(TOP_GENRES);

    let kept: u32 = shares.iter().map(|s| s.percentage).sum();
    if kept < 100 && !shares.is_empty() {
        shares.push(GenreShare::new(OTHER, 100 - kept));
    }
    shares
}

/// Genre breakdown across every tag of every artist.
pub fn genre_breakdown(artists: &[Artist]) -> Vec<GenreShare> {
    let counts = count_genres(
        artists
            .iter()
            .flat_map(|artist| artist.genres.iter().map(String::as_str)),
    );
    aggregate_genres(&counts)
}

/// `round(100 * count / total)` in integer arithmetic.
fn rounded_percent(count: usize, total: usize) -> u32 {
    let scaled = (200 * count as u64 + total as u64) / (2 * total as u64);
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(pairs: &[(&str, usize)]) -> Vec<(String, usize)> {
        pairs.iter().map(|(n, c)| (n.to_string(), *c)).collect()
    }

    fn artist(genres: &[&str]) -> Artist {
        Artist {
            id: "a".to_string(),
            name: "A".to_string(),
            image_url: None,
            genres: genres.iter().map(|g| g.to_string()).collect(),
            popularity: None,
        }
    }

    #[test]
    fn test_exact_split_has_no_other() {
        let shares = aggregate_genres(&counts(&[("pop", 6), ("rock", 3), ("jazz", 1)]));
        assert_eq!(
            shares,
            vec![
                GenreShare::new("pop", 60),
                GenreShare::new("rock", 30),
                GenreShare::new("jazz", 10),
            ]
        );
    }

    #[test]
    fn test_remainder_goes_to_other() {
        let shares = aggregate_genres(&counts(&[
            ("a", 40),
            ("b", 20),
            ("c", 15),
            ("d", 10),
            ("e", 8),
            ("f", 4),
            ("g", 3),
        ]));
        assert_eq!(shares.len(), 6);
        let kept: u32 = shares[..5].iter().map(|s| s.percentage).sum();
        assert_eq!(kept, 93);
        assert_eq!(shares[5], GenreShare::new(OTHER, 7));
    }

    #[test]
    fn test_rounding_remainder_from_thirds() {
        let shares = aggregate_genres(&counts(&[("a", 1), ("b", 1), ("c", 1)]));
        assert_eq!(shares[3], GenreShare::new(OTHER, 1));
    }

    #[test]
    fn test_half_rounds_up_and_overshoot_is_kept() {
        // 12.5 -> 13, 87.5 -> 88
        let shares = aggregate_genres(&counts(&[("a", 1), ("b", 7)]));
        assert_eq!(
            shares,
            vec![GenreShare::new("b", 88), GenreShare::new("a", 13)]
        );
    }

    #[test]
    fn test_ties_keep_first_appearance() {
        let shares = aggregate_genres(&counts(&[("z", 1), ("y", 2), ("x", 1)]));
        assert_eq!(shares[0].name, "y");
        assert_eq!(shares[1].name, "z");
        assert_eq!(shares[2].name, "x");
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate_genres(&[]).is_empty());
        assert!(genre_breakdown(&[]).is_empty());
        assert!(genre_breakdown(&[artist(&[])]).is_empty());
    }

    #[test]
    fn test_breakdown_counts_across_artists() {
        let artists = vec![
            artist(&["pop", "dance pop"]),
            artist(&["pop"]),
            artist(&["rock", "pop"]),
        ];
        let counted = count_genres(
            artists
                .iter()
                .flat_map(|a| a.genres.iter().map(String::as_str)),
        );
        assert_eq!(counted, counts(&[("pop", 3), ("dance pop", 1), ("rock", 1)]));

        let shares = genre_breakdown(&artists);
        assert_eq!(shares[0], GenreShare::new("pop", 60));
        assert_eq!(shares[1], GenreShare::new("dance pop", 20));
        assert_eq!(shares[2], GenreShare::new("rock", 20));
        assert_eq!(shares.len(), 3);
    }
}
