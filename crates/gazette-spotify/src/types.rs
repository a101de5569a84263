//! Web API payloads and the flattened shapes served to the presentation layer.

use serde::{Deserialize, Serialize};

use crate::error::{FetchError, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Served shapes
// ─────────────────────────────────────────────────────────────────────────────

/// Cover art or avatar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
}

/// The current user's profile.
///
/// Unknown fields from the API are dropped, so this is also the shape of the
/// stored profile snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<Image>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
}

/// A top track, reduced to its first artist and album cover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    pub name: String,
    pub artist: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popularity: Option<u32>,
}

/// A top artist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popularity: Option<u32>,
}

/// A recently played track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentTrack {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub played_at: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// API payloads
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct Paging<T> {
    pub items: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawProfile {
    pub id: String,
    pub display_name: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<Image>>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub product: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NamedRef {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawAlbum {
    pub name: String,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawTrack {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<NamedRef>,
    #[serde(default)]
    pub album: Option<RawAlbum>,
    #[serde(default)]
    pub popularity: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawArtist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub popularity: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPlay {
    pub track: RawTrack,
    pub played_at: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Conversions
// ─────────────────────────────────────────────────────────────────────────────

impl TryFrom<RawProfile> for UserProfile {
    type Error = FetchError;

    fn try_from(raw: RawProfile) -> Result<Self> {
        let display_name = raw
            .display_name
            .ok_or_else(|| FetchError::Validation(format!("profile {}: no display_name", raw.id)))?;
        Ok(Self {
            id: raw.id,
            display_name,
            images: raw.images,
            country: raw.country,
            email: raw.email,
            product: raw.product,
        })
    }
}

fn first_artist(track: &RawTrack) -> Result<String> {
    track
        .artists
        .first()
        .map(|a| a.name.clone())
        .ok_or_else(|| FetchError::Validation(format!("track {}: no artists", track.id)))
}

impl TryFrom<RawTrack> for Track {
    type Error = FetchError;

    fn try_from(raw: RawTrack) -> Result<Self> {
        let artist = first_artist(&raw)?;
        let (album, image_url) = match raw.album {
            Some(album) => {
                let image = album.images.into_iter().next().map(|i| i.url);
                (Some(album.name), image)
            }
            None => (None, None),
        };
        Ok(Self {
            id: raw.id,
            name: raw.name,
            artist,
            album,
            image_url,
            popularity: raw.popularity,
        })
    }
}

impl From<RawArtist> for Artist {
    fn from(raw: RawArtist) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            image_url: raw.images.into_iter().next().map(|i| i.url),
            genres: raw.genres,
            popularity: raw.popularity,
        }
    }
}

impl TryFrom<RawPlay> for RecentTrack {
    type Error = FetchError;

    fn try_from(raw: RawPlay) -> Result<Self> {
        let artist = first_artist(&raw.track)?;
        Ok(Self {
            id: raw.track.id,
            name: raw.track.name,
            artist,
            played_at: raw.played_at,
        })
    }
}
