use tokio::time::sleep;

use crate::{
    config::SyncSettings,
    error::{ApiError, Stage, SyncError},
    progress::{LIBRARY_ITEMS_PER_SEC, Progress},
    types::{LibrarySnapshot, SavedTrackItem, Track},
    warning,
};

/// Saved tracks requested per page; the most `/me/tracks` hands out at once.
pub const PAGE_SIZE: usize = 50;

const CALL: &str = "GET /me/tracks";

/// Downloads the complete saved-track library.
///
/// The first page (offset 0) tells us how many tracks exist; later pages are
/// requested at offsets stepping by [`PAGE_SIZE`] until at least that many
/// items arrived, pausing `settings.throttle` between requests. Any failed
/// request aborts the download and no snapshot is returned.
///
/// Items beyond the announced total are cut off, so the snapshot never holds
/// more than `total` tracks. An empty page before the total is reached ends
/// the download early with a warning.
///
/// A saved item without any artist is fatal: the whole download fails with
/// a decode error instead of skipping the track.
pub async fn fetch_library<A>(api: &A, settings: &SyncSettings) -> Result<LibrarySnapshot, SyncError>
where
    A: super::SpotifyApi + ?Sized,
{
    let mut page = api
        .saved_tracks(PAGE_SIZE, 0)
        .await
        .map_err(|e| SyncError::api(Stage::Download, CALL, e))?;

    let total = page.total;
    let mut progress = Progress::new(
        "Downloading library",
        total,
        LIBRARY_ITEMS_PER_SEC,
        settings.quiet,
    );
    let mut tracks: Vec<Track> = Vec::with_capacity(total);
    let mut collected = 0;
    let mut offset = 0;

    loop {
        if page.items.is_empty() && collected < total {
            warning!(
                "Library returned no items at offset {} although {} of {} are missing.",
                offset,
                total - collected,
                total
            );
            break;
        }

        let received = page.items.len();
        for item in page.items {
            tracks.push(into_track(item).map_err(|e| SyncError::api(Stage::Download, CALL, e))?);
        }
        collected += received;
        progress.advance(received);

        if collected >= total {
            break;
        }

        offset += PAGE_SIZE;
        sleep(settings.throttle).await;
        page = api
            .saved_tracks(PAGE_SIZE, offset)
            .await
            .map_err(|e| SyncError::api(Stage::Download, CALL, e))?;
    }

    progress.finish();
    tracks.truncate(total);

    Ok(LibrarySnapshot::new(total, tracks))
}

fn into_track(item: SavedTrackItem) -> Result<Track, ApiError> {
    let track = item.track;
    let artist = track
        .artists
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::Decode(format!("track {} has no artists", track.id)))?;

    Ok(Track::new(track.id, artist.id))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use mockall::predicate::eq;

    use super::*;
    use crate::{
        spotify::MockSpotifyApi,
        types::{ArtistRef, SavedTrack, SavedTracksPage},
    };

    fn settings() -> SyncSettings {
        SyncSettings {
            throttle: Duration::ZERO,
            quiet: true,
        }
    }

    fn page(total: usize, offset: usize, len: usize) -> SavedTracksPage {
        SavedTracksPage {
            total,
            items: (offset..offset + len)
                .map(|n| SavedTrackItem {
                    track: SavedTrack {
                        id: format!("t{}", n),
                        artists: vec![ArtistRef {
                            id: format!("a{}", n % 15),
                        }],
                    },
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn fetches_every_page_until_total() {
        let mut api = MockSpotifyApi::new();
        for (offset, len) in [(0, 50), (50, 50), (100, 20)] {
            api.expect_saved_tracks()
                .with(eq(PAGE_SIZE), eq(offset))
                .times(1)
                .returning(move |_, _| Ok(page(120, offset, len)));
        }

        let snapshot = fetch_library(&api, &settings()).await.unwrap();

        assert_eq!(snapshot.total, 120);
        assert_eq!(snapshot.len(), 120);
        assert!(snapshot.is_complete());
        assert_eq!(snapshot.tracks[0], Track::new("t0", "a0"));
        assert_eq!(snapshot.tracks[119].id, "t119");
        assert!(snapshot.tracks.iter().all(|t| t.genres.is_none()));
    }

    #[tokio::test]
    async fn empty_library_needs_one_request() {
        let mut api = MockSpotifyApi::new();
        api.expect_saved_tracks()
            .times(1)
            .returning(|_, _| Ok(page(0, 0, 0)));

        let snapshot = fetch_library(&api, &settings()).await.unwrap();

        assert_eq!(snapshot.total, 0);
        assert!(snapshot.is_empty());
    }

    #[tokio::test]
    async fn over_fetched_final_page_is_truncated() {
        let mut api = MockSpotifyApi::new();
        // A remote that always answers with a full page.
        api.expect_saved_tracks()
            .times(3)
            .returning(|_, offset| Ok(page(101, offset, PAGE_SIZE)));

        let snapshot = fetch_library(&api, &settings()).await.unwrap();

        assert_eq!(snapshot.total, 101);
        assert_eq!(snapshot.len(), 101);
        assert_eq!(snapshot.tracks[100].id, "t100");
    }

    #[tokio::test]
    async fn empty_page_ends_download_early() {
        let mut api = MockSpotifyApi::new();
        api.expect_saved_tracks()
            .with(eq(PAGE_SIZE), eq(0))
            .times(1)
            .returning(|_, _| Ok(page(200, 0, 50)));
        api.expect_saved_tracks()
            .with(eq(PAGE_SIZE), eq(50))
            .times(1)
            .returning(|_, _| Ok(page(200, 50, 0)));

        let snapshot = fetch_library(&api, &settings()).await.unwrap();

        assert_eq!(snapshot.total, 200);
        assert_eq!(snapshot.len(), 50);
        assert!(!snapshot.is_complete());
    }

    #[tokio::test]
    async fn missing_total_is_fatal() {
        let mut api = MockSpotifyApi::new();
        api.expect_saved_tracks()
            .times(1)
            .returning(|_, _| Err(ApiError::Decode("missing field `total`".to_string())));

        let err = fetch_library(&api, &settings()).await.unwrap_err();

        match err {
            SyncError::Api { stage, call, .. } => {
                assert_eq!(stage, Stage::Download);
                assert_eq!(call, CALL);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn failure_on_later_page_discards_partial_download() {
        let mut api = MockSpotifyApi::new();
        api.expect_saved_tracks()
            .with(eq(PAGE_SIZE), eq(0))
            .times(1)
            .returning(|_, _| Ok(page(120, 0, 50)));
        api.expect_saved_tracks()
            .with(eq(PAGE_SIZE), eq(50))
            .times(1)
            .returning(|_, _| {
                Err(ApiError::Status {
                    status: 500,
                    message: "server error".to_string(),
                })
            });

        assert!(fetch_library(&api, &settings()).await.is_err());
    }

    #[tokio::test]
    async fn track_without_artist_is_a_decode_error() {
        let mut api = MockSpotifyApi::new();
        api.expect_saved_tracks().times(1).returning(|_, _| {
            Ok(SavedTracksPage {
                total: 1,
                items: vec![SavedTrackItem {
                    track: SavedTrack {
                        id: "t0".to_string(),
                        artists: vec![],
                    },
                }],
            })
        });

        let err = fetch_library(&api, &settings()).await.unwrap_err();
        assert!(err.to_string().contains("has no artists"));
    }

    #[tokio::test(start_paused = true)]
    async fn pauses_between_pages() {
        let mut api = MockSpotifyApi::new();
        api.expect_saved_tracks()
            .times(3)
            .returning(|_, offset| Ok(page(120, offset, (120 - offset).min(PAGE_SIZE))));

        let settings = SyncSettings {
            throttle: Duration::from_millis(500),
            quiet: true,
        };
        let started = tokio::time::Instant::now();
        fetch_library(&api, &settings).await.unwrap();

        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(1));
        assert!(elapsed < Duration::from_millis(1100));
    }
}
