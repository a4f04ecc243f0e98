use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tabled::Tabled;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

/// Body of the token endpoint for both the code exchange and a refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    pub expires_in: u64,
}

/// A saved track as stored in the library snapshot.
///
/// `genres` stays `None` until the enrichment stage has run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    #[serde(rename = "artist")]
    pub artist_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<BTreeSet<String>>,
}

impl Track {
    pub fn new(id: impl Into<String>, artist_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            artist_id: artist_id.into(),
            genres: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibrarySnapshot {
    /// Track count the remote reported when the download started.
    pub total: usize,
    pub tracks: Vec<Track>,
}

impl LibrarySnapshot {
    pub fn new(total: usize, tracks: Vec<Track>) -> Self {
        Self { total, tracks }
    }

    /// Builds a snapshot from tracks read back from disk.
    pub fn from_tracks(tracks: Vec<Track>) -> Self {
        Self {
            total: tracks.len(),
            tracks,
        }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.tracks.len() >= self.total
    }

    pub fn is_enriched(&self) -> bool {
        self.tracks.iter().all(|t| t.genres.is_some())
    }
}

/// Artist id to genre set, frozen once the resolver hands it out.
#[derive(Debug, Clone, Default)]
pub struct ArtistGenreMap {
    genres: HashMap<String, BTreeSet<String>>,
}

impl ArtistGenreMap {
    pub fn get(&self, artist_id: &str) -> Option<&BTreeSet<String>> {
        self.genres.get(artist_id)
    }

    pub fn len(&self) -> usize {
        self.genres.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genres.is_empty()
    }
}

impl FromIterator<ArtistGenres> for ArtistGenreMap {
    fn from_iter<I: IntoIterator<Item = ArtistGenres>>(iter: I) -> Self {
        Self {
            genres: iter
                .into_iter()
                .map(|a| (a.id, a.genres.into_iter().collect()))
                .collect(),
        }
    }
}

/// Genre to the ordered ids of the tracks tagged with it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenreGroups {
    groups: BTreeMap<String, Vec<String>>,
}

impl GenreGroups {
    pub fn push(&mut self, genre: &str, track_id: &str) {
        self.groups
            .entry(genre.to_string())
            .or_default()
            .push(track_id.to_string());
    }

    pub fn get(&self, genre: &str) -> Option<&Vec<String>> {
        self.groups.get(genre)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistBand {
    /// 1000 tracks or more, published as "AI {genre}".
    Inclusive,
    /// More than 250 and fewer than 1000 tracks, published as "{genre}".
    Specific,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistSpec {
    pub name: String,
    pub genre: String,
    pub band: PlaylistBand,
    pub track_ids: Vec<String>,
}

#[derive(Tabled)]
pub struct GenreTableRow {
    pub genre: String,
    pub tracks: usize,
    pub playlist: String,
}

// Wire records for the Spotify Web API.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedTracksPage {
    pub total: usize,
    pub items: Vec<SavedTrackItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedTrackItem {
    pub track: SavedTrack,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedTrack {
    pub id: String,
    pub artists: Vec<ArtistRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistRef {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeveralArtistsResponse {
    /// Spotify answers `null` in place of ids it does not know.
    pub artists: Vec<Option<ArtistGenres>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistGenres {
    pub id: String,
    #[serde(default)]
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
    pub public: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistResponse {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTracksRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTracksResponse {
    pub snapshot_id: String,
}
