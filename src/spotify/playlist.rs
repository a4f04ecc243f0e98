use std::num::NonZeroUsize;

use tokio::time::sleep;

use crate::{
    config::SyncSettings,
    error::{Stage, SyncError},
    progress::{Progress, TRACKS_APPENDED_PER_SEC},
    success,
    types::{AddTracksRequest, CreatePlaylistRequest, PlaylistSpec},
    utils, warning,
};

/// Most URIs `POST /playlists/{id}/tracks` accepts in one call.
pub const APPEND_BATCH_SIZE: NonZeroUsize = match NonZeroUsize::new(100) {
    Some(size) => size,
    None => panic!("append batch size must be positive"),
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedPlaylist {
    pub name: String,
    pub id: String,
    pub tracks: usize,
}

#[derive(Debug)]
pub struct FailedPlaylist {
    pub name: String,
    pub error: SyncError,
}

#[derive(Debug, Default)]
pub struct PublishReport {
    pub published: Vec<PublishedPlaylist>,
    pub failed: Vec<FailedPlaylist>,
}

/// Creates genre playlists on behalf of the current user.
///
/// Playlists are published one after another. The user id is looked up on
/// first use and reused afterwards.
pub struct Publisher<'a, A: super::SpotifyApi + ?Sized> {
    api: &'a A,
    settings: &'a SyncSettings,
    user_id: Option<String>,
}

impl<'a, A: super::SpotifyApi + ?Sized> Publisher<'a, A> {
    pub fn new(api: &'a A, settings: &'a SyncSettings) -> Self {
        Self {
            api,
            settings,
            user_id: None,
        }
    }

    pub async fn user_id(&mut self) -> Result<String, SyncError> {
        if let Some(id) = &self.user_id {
            return Ok(id.clone());
        }

        let user = self
            .api
            .current_user()
            .await
            .map_err(|e| SyncError::api(Stage::Publish, "GET /me", e))?;
        self.user_id = Some(user.id.clone());
        Ok(user.id)
    }

    /// Creates one playlist and fills it in batches of [`APPEND_BATCH_SIZE`].
    ///
    /// A failure leaves whatever was already created or appended in place.
    pub async fn publish(&mut self, spec: &PlaylistSpec) -> Result<PublishedPlaylist, SyncError> {
        let user_id = self.user_id().await?;

        let request = CreatePlaylistRequest {
            name: spec.name.clone(),
            description: format!("Saved tracks tagged \"{}\".", spec.genre),
            public: false,
        };
        let playlist = self
            .api
            .create_playlist(&user_id, &request)
            .await
            .map_err(|e| SyncError::api(Stage::Publish, "POST /users/{user_id}/playlists", e))?;

        let uris: Vec<String> = spec.track_ids.iter().map(|id| utils::track_uri(id)).collect();
        let mut progress = Progress::new(
            format!("Filling {}", spec.name),
            uris.len(),
            TRACKS_APPENDED_PER_SEC,
            self.settings.quiet,
        );

        for (index, batch) in utils::chunk(&uris, APPEND_BATCH_SIZE).into_iter().enumerate() {
            if index > 0 {
                sleep(self.settings.throttle).await;
            }

            let request = AddTracksRequest {
                uris: batch.to_vec(),
            };
            self.api
                .add_tracks(&playlist.id, &request)
                .await
                .map_err(|e| {
                    SyncError::api(Stage::Publish, "POST /playlists/{playlist_id}/tracks", e)
                })?;
            progress.advance(batch.len());
        }

        progress.finish();

        Ok(PublishedPlaylist {
            name: spec.name.clone(),
            id: playlist.id,
            tracks: progress.done(),
        })
    }

    /// Publishes every playlist in order.
    ///
    /// Failing to resolve the user aborts before anything is created. After
    /// that, a playlist that fails is reported and skipped.
    pub async fn publish_all(&mut self, specs: &[PlaylistSpec]) -> Result<PublishReport, SyncError> {
        let mut report = PublishReport::default();
        if specs.is_empty() {
            return Ok(report);
        }

        self.user_id().await?;

        for spec in specs {
            match self.publish(spec).await {
                Ok(playlist) => {
                    success!(
                        "Playlist {} created with {} tracks.",
                        playlist.name,
                        playlist.tracks
                    );
                    report.published.push(playlist);
                }
                Err(error) => {
                    warning!("Failed to publish playlist {}: {}", spec.name, error);
                    report.failed.push(FailedPlaylist {
                        name: spec.name.clone(),
                        error,
                    });
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        error::ApiError,
        spotify::MockSpotifyApi,
        types::{AddTracksResponse, CreatePlaylistResponse, CurrentUser, PlaylistBand},
    };

    fn settings() -> SyncSettings {
        SyncSettings {
            throttle: Duration::ZERO,
            quiet: true,
        }
    }

    fn spec(name: &str, tracks: usize) -> PlaylistSpec {
        PlaylistSpec {
            name: name.to_string(),
            genre: name.trim_start_matches("AI ").to_string(),
            band: if tracks >= 1000 {
                PlaylistBand::Inclusive
            } else {
                PlaylistBand::Specific
            },
            track_ids: (0..tracks).map(|n| format!("t{}", n)).collect(),
        }
    }

    fn expect_user(api: &mut MockSpotifyApi) {
        api.expect_current_user().times(1).returning(|| {
            Ok(CurrentUser {
                id: "user-1".to_string(),
            })
        });
    }

    fn appended() -> Result<AddTracksResponse, ApiError> {
        Ok(AddTracksResponse {
            snapshot_id: "snap".to_string(),
        })
    }

    #[tokio::test]
    async fn large_genre_is_appended_in_batches_of_hundred() {
        let mut api = MockSpotifyApi::new();
        expect_user(&mut api);
        api.expect_create_playlist()
            .withf(|user_id: &str, request: &CreatePlaylistRequest| {
                user_id == "user-1" && request.name == "AI Pop" && !request.public
            })
            .times(1)
            .returning(|_, _| {
                Ok(CreatePlaylistResponse {
                    id: "pl-pop".to_string(),
                })
            });
        api.expect_add_tracks()
            .withf(|playlist_id: &str, request: &AddTracksRequest| {
                playlist_id == "pl-pop"
                    && request.uris.len() == 100
                    && request.uris.iter().all(|u| u.starts_with("spotify:track:t"))
            })
            .times(12)
            .returning(|_, _| appended());

        let settings = settings();
        let mut publisher = Publisher::new(&api, &settings);
        let report = publisher.publish_all(&[spec("AI Pop", 1200)]).await.unwrap();

        assert_eq!(
            report.published,
            vec![PublishedPlaylist {
                name: "AI Pop".to_string(),
                id: "pl-pop".to_string(),
                tracks: 1200,
            }]
        );
        assert!(report.failed.is_empty());
    }

    #[tokio::test]
    async fn user_is_resolved_once_per_run() {
        let mut api = MockSpotifyApi::new();
        expect_user(&mut api);
        api.expect_create_playlist().times(2).returning(|_, request| {
            Ok(CreatePlaylistResponse {
                id: format!("pl-{}", request.name),
            })
        });
        api.expect_add_tracks().times(6).returning(|_, _| appended());

        let settings = settings();
        let mut publisher = Publisher::new(&api, &settings);
        let report = publisher
            .publish_all(&[spec("Rock", 300), spec("Jazz", 260)])
            .await
            .unwrap();

        assert_eq!(report.published.len(), 2);
        assert_eq!(report.published[0].id, "pl-Rock");
        assert_eq!(report.published[1].tracks, 260);
    }

    #[tokio::test]
    async fn failed_playlist_does_not_stop_the_rest() {
        let mut api = MockSpotifyApi::new();
        expect_user(&mut api);
        api.expect_create_playlist().times(2).returning(|_, request| {
            if request.name == "Rock" {
                Err(ApiError::Status {
                    status: 400,
                    message: "bad request".to_string(),
                })
            } else {
                Ok(CreatePlaylistResponse {
                    id: "pl-jazz".to_string(),
                })
            }
        });
        api.expect_add_tracks()
            .withf(|playlist_id: &str, _: &AddTracksRequest| playlist_id == "pl-jazz")
            .times(3)
            .returning(|_, _| appended());

        let settings = settings();
        let mut publisher = Publisher::new(&api, &settings);
        let report = publisher
            .publish_all(&[spec("Rock", 300), spec("Jazz", 260)])
            .await
            .unwrap();

        assert_eq!(report.published.len(), 1);
        assert_eq!(report.published[0].name, "Jazz");
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].name, "Rock");
        assert!(matches!(
            report.failed[0].error,
            SyncError::Api {
                stage: Stage::Publish,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn append_failure_stops_only_that_playlist() {
        let mut api = MockSpotifyApi::new();
        expect_user(&mut api);
        api.expect_create_playlist().times(2).returning(|_, request| {
            Ok(CreatePlaylistResponse {
                id: format!("pl-{}", request.name),
            })
        });
        let mut rock_calls = 0;
        api.expect_add_tracks()
            .times(5)
            .returning(move |playlist_id, _| {
                if playlist_id == "pl-Rock" {
                    rock_calls += 1;
                    if rock_calls == 2 {
                        return Err(ApiError::Decode("missing field `snapshot_id`".to_string()));
                    }
                }
                appended()
            });

        let settings = settings();
        let mut publisher = Publisher::new(&api, &settings);
        let report = publisher
            .publish_all(&[spec("Rock", 300), spec("Jazz", 260)])
            .await
            .unwrap();

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].name, "Rock");
        assert_eq!(report.published.len(), 1);
        assert_eq!(report.published[0].name, "Jazz");
    }

    #[tokio::test]
    async fn unknown_user_aborts_publishing() {
        let mut api = MockSpotifyApi::new();
        api.expect_current_user()
            .times(1)
            .returning(|| Err(ApiError::Auth("no cached token".to_string())));
        api.expect_create_playlist().never();
        api.expect_add_tracks().never();

        let settings = settings();
        let mut publisher = Publisher::new(&api, &settings);
        let err = publisher
            .publish_all(&[spec("Rock", 300)])
            .await
            .unwrap_err();

        assert!(err.is_auth());
    }

    #[tokio::test]
    async fn nothing_to_publish_skips_user_lookup() {
        let api = MockSpotifyApi::new();
        let settings = settings();
        let mut publisher = Publisher::new(&api, &settings);

        let report = publisher.publish_all(&[]).await.unwrap();

        assert!(report.published.is_empty());
        assert!(report.failed.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn pauses_between_appends() {
        let mut api = MockSpotifyApi::new();
        expect_user(&mut api);
        api.expect_create_playlist().times(1).returning(|_, _| {
            Ok(CreatePlaylistResponse {
                id: "pl-1".to_string(),
            })
        });
        api.expect_add_tracks()
            .times(3)
            .returning(|_, _| appended());

        let settings = SyncSettings {
            throttle: Duration::from_millis(500),
            quiet: true,
        };
        let mut publisher = Publisher::new(&api, &settings);
        let started = tokio::time::Instant::now();
        let published = publisher.publish(&spec("Rock", 300)).await.unwrap();

        let elapsed = started.elapsed();
        assert_eq!(published.tracks, 300);
        assert!(elapsed >= Duration::from_secs(1));
        assert!(elapsed < Duration::from_millis(1100));
    }
}
