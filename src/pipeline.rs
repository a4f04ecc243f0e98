//! # Pipeline
//!
//! Runs the three stages in order over one Spotify session:
//!
//! ```text
//! download ──► snapshot ──► enrich ──► snapshot ──► generate
//!  (pages)      (store)    (artists)    (store)    (playlists)
//! ```
//!
//! Every stage finishes completely before the next one starts. Fatal errors
//! carry the [`Stage`](crate::error::Stage) they happened in, so a caller can
//! tell a failed download from a failed publish.

use crate::{
    config::SyncSettings,
    error::SyncError,
    genres, info,
    management::SnapshotStore,
    spotify::{
        SpotifyApi,
        artists::{distinct_artist_ids, resolve_genres},
        library::fetch_library,
        playlist::{PublishReport, Publisher},
    },
    success,
    types::{LibrarySnapshot, PlaylistSpec},
};

pub struct Pipeline<'a, A: SpotifyApi + ?Sized> {
    api: &'a A,
    settings: &'a SyncSettings,
}

impl<'a, A: SpotifyApi + ?Sized> Pipeline<'a, A> {
    pub fn new(api: &'a A, settings: &'a SyncSettings) -> Self {
        Self { api, settings }
    }

    pub async fn download(&self) -> Result<LibrarySnapshot, SyncError> {
        let snapshot = fetch_library(self.api, self.settings).await?;
        success!("Downloaded {} saved tracks", snapshot.len());
        Ok(snapshot)
    }

    /// Resolves the genres of every artist in `snapshot` and writes them onto
    /// its tracks. Tracks whose artist has no genres end up with an empty set.
    pub async fn enrich(&self, snapshot: &mut LibrarySnapshot) -> Result<(), SyncError> {
        let artist_ids = distinct_artist_ids(snapshot);
        info!(
            "Resolving genres for {} artists across {} tracks",
            artist_ids.len(),
            snapshot.len()
        );

        let artist_genres = resolve_genres(self.api, &artist_ids, self.settings).await?;
        genres::assign_genres(snapshot, &artist_genres);

        success!("Tagged {} tracks with genres", snapshot.len());
        Ok(())
    }

    /// Playlists the current snapshot would produce. Makes no remote calls.
    pub fn plan(&self, snapshot: &LibrarySnapshot) -> Vec<PlaylistSpec> {
        genres::select_playlists(&genres::group_by_genre(snapshot))
    }

    pub async fn generate(&self, snapshot: &LibrarySnapshot) -> Result<PublishReport, SyncError> {
        let specs = self.plan(snapshot);
        if specs.is_empty() {
            info!("No genre is large enough for a playlist");
        }

        Publisher::new(self.api, self.settings)
            .publish_all(&specs)
            .await
    }

    /// Download, enrich and generate, saving the snapshot after each of the
    /// first two stages.
    pub async fn run(&self, store: &dyn SnapshotStore) -> Result<PublishReport, SyncError> {
        let mut snapshot = self.download().await?;
        store.save(&snapshot).await?;

        self.enrich(&mut snapshot).await?;
        store.save(&snapshot).await?;

        self.generate(&snapshot).await
    }
}
