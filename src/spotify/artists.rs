use std::num::NonZeroUsize;

use tokio::time::sleep;

use crate::{
    config::SyncSettings,
    error::{Stage, SyncError},
    progress::{ARTISTS_PER_SEC, Progress},
    types::{ArtistGenreMap, ArtistGenres, LibrarySnapshot},
    utils, warning,
};

/// Most ids `GET /artists` accepts in one call.
pub const ARTIST_BATCH_SIZE: NonZeroUsize = match NonZeroUsize::new(50) {
    Some(size) => size,
    None => panic!("artist batch size must be positive"),
};

const CALL: &str = "GET /artists";

/// Artist ids referenced by the library, each once, in first-seen order.
pub fn distinct_artist_ids(snapshot: &LibrarySnapshot) -> Vec<String> {
    utils::distinct(snapshot.tracks.iter().map(|t| t.artist_id.clone()))
}

/// Looks up the genres of every artist in `artist_ids`.
///
/// Ids are deduplicated and sent in batches of [`ARTIST_BATCH_SIZE`], one
/// request per batch with `settings.throttle` between them. Artists the
/// remote does not return (omitted or `null`) are simply missing from the
/// map. A batch that fails outright aborts the resolution.
pub async fn resolve_genres<A>(
    api: &A,
    artist_ids: &[String],
    settings: &SyncSettings,
) -> Result<ArtistGenreMap, SyncError>
where
    A: super::SpotifyApi + ?Sized,
{
    let artist_ids = utils::distinct(artist_ids.iter().cloned());
    let mut progress = Progress::new(
        "Resolving genres",
        artist_ids.len(),
        ARTISTS_PER_SEC,
        settings.quiet,
    );
    let mut resolved: Vec<ArtistGenres> = Vec::with_capacity(artist_ids.len());

    for (index, batch) in utils::chunk(&artist_ids, ARTIST_BATCH_SIZE)
        .into_iter()
        .enumerate()
    {
        if index > 0 {
            sleep(settings.throttle).await;
        }

        let response = api
            .several_artists(batch)
            .await
            .map_err(|e| SyncError::api(Stage::Enrich, CALL, e))?;

        resolved.extend(response.artists.into_iter().flatten());
        progress.advance(batch.len());
    }

    progress.finish();

    let map: ArtistGenreMap = resolved.into_iter().collect();
    if map.len() < artist_ids.len() {
        warning!(
            "{} of {} artists were not returned and get no genres.",
            artist_ids.len() - map.len(),
            artist_ids.len()
        );
    }

    Ok(map)
}
