use tabled::{Table, Tabled};

use crate::{
    config::SyncSettings,
    error, genres, info,
    management::LibraryManager,
    pipeline::Pipeline,
    spotify::playlist::PublishReport,
    success,
    types::PlaylistSpec,
    warning,
};

#[derive(Tabled)]
struct PlannedPlaylistRow {
    playlist: String,
    tracks: usize,
}

pub async fn generate(dry_run: bool) {
    let store = LibraryManager::from_env();
    let snapshot = super::load_snapshot(&store).await;

    if !snapshot.is_enriched() {
        warning!("Some tracks have no genres yet. Run sortify enrich first.");
    }

    if dry_run {
        let specs = genres::select_playlists(&genres::group_by_genre(&snapshot));
        print_plan(&specs);
        return;
    }

    let api = super::connect().await;
    let settings = SyncSettings::from_env();

    let report = Pipeline::new(&api, &settings)
        .generate(&snapshot)
        .await
        .unwrap_or_else(|e| super::fail(e));

    summarize(&report);
}

fn print_plan(specs: &[PlaylistSpec]) {
    if specs.is_empty() {
        info!("No genre is large enough for a playlist");
        return;
    }

    let rows: Vec<PlannedPlaylistRow> = specs
        .iter()
        .map(|s| PlannedPlaylistRow {
            playlist: s.name.clone(),
            tracks: s.track_ids.len(),
        })
        .collect();

    println!("{}", Table::new(rows));
    info!("{} playlists would be created", specs.len());
}

pub(super) fn summarize(report: &PublishReport) {
    if report.failed.is_empty() {
        success!("Published {} playlists", report.published.len());
        return;
    }

    let names: Vec<&str> = report.failed.iter().map(|f| f.name.as_str()).collect();
    error!(
        "Published {} playlists, {} failed: {}",
        report.published.len(),
        report.failed.len(),
        names.join(", ")
    );
}
