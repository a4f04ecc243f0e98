//! Joining genres onto the library and cutting it into genre playlists.

use std::collections::BTreeSet;

use crate::types::{ArtistGenreMap, GenreGroups, LibrarySnapshot, PlaylistBand, PlaylistSpec};

/// Smallest group published as an inclusive "AI {genre}" playlist.
pub const INCLUSIVE_MIN_TRACKS: usize = 1000;
/// Groups must be strictly larger than this to get a playlist at all.
pub const SPECIFIC_MIN_EXCLUSIVE: usize = 250;

/// Gives every track the genres of its artist.
///
/// Artists missing from `genres` contribute an empty set, so afterwards every
/// track has `genres` set.
pub fn assign_genres(snapshot: &mut LibrarySnapshot, genres: &ArtistGenreMap) {
    for track in &mut snapshot.tracks {
        track.genres = Some(genres.get(&track.artist_id).cloned().unwrap_or_default());
    }
}

/// Collects track ids per genre, in library order.
pub fn group_by_genre(snapshot: &LibrarySnapshot) -> GenreGroups {
    let mut groups = GenreGroups::default();
    for track in &snapshot.tracks {
        for genre in track.genres.iter().flat_map(BTreeSet::iter) {
            groups.push(genre, &track.id);
        }
    }
    groups
}

pub fn band_for(size: usize) -> Option<PlaylistBand> {
    if size >= INCLUSIVE_MIN_TRACKS {
        Some(PlaylistBand::Inclusive)
    } else if size > SPECIFIC_MIN_EXCLUSIVE {
        Some(PlaylistBand::Specific)
    } else {
        None
    }
}

pub fn playlist_name(genre: &str, band: PlaylistBand) -> String {
    match band {
        PlaylistBand::Inclusive => format!("AI {}", genre),
        PlaylistBand::Specific => genre.to_string(),
    }
}

/// Playlists worth creating, ordered by genre name.
pub fn select_playlists(groups: &GenreGroups) -> Vec<PlaylistSpec> {
    groups
        .iter()
        .filter_map(|(genre, track_ids)| {
            band_for(track_ids.len()).map(|band| PlaylistSpec {
                name: playlist_name(genre, band),
                genre: genre.clone(),
                band,
                track_ids: track_ids.clone(),
            })
        })
        .collect()
}
