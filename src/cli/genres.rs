use tabled::Table;

use crate::{
    genres::{band_for, group_by_genre, playlist_name},
    info,
    management::LibraryManager,
    types::GenreTableRow,
};

/// Lists genre sizes of the saved library.
///
/// Only genres that would get a playlist are shown unless `all` is set.
pub async fn genres(search: Option<String>, all: bool) {
    let store = LibraryManager::from_env();
    let snapshot = super::load_snapshot(&store).await;
    let groups = group_by_genre(&snapshot);

    let search_term = search.map(|s| s.to_lowercase());

    let mut rows: Vec<GenreTableRow> = groups
        .iter()
        .filter(|(genre, _)| match &search_term {
            Some(term) => genre.to_lowercase().contains(term),
            None => true,
        })
        .filter_map(|(genre, track_ids)| {
            let band = band_for(track_ids.len());
            if band.is_none() && !all {
                return None;
            }
            Some(GenreTableRow {
                genre: genre.clone(),
                tracks: track_ids.len(),
                playlist: band
                    .map(|b| playlist_name(genre, b))
                    .unwrap_or_else(|| "skipped".to_string()),
            })
        })
        .collect();

    if rows.is_empty() {
        info!("No matching genres. Try --all or run sortify enrich.");
        return;
    }

    // largest first, ties by name
    rows.sort_by(|a, b| b.tracks.cmp(&a.tracks).then_with(|| a.genre.cmp(&b.genre)));

    let table = Table::new(rows);
    println!("{}", table);
}
