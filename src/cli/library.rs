use crate::{
    config::SyncSettings,
    info,
    management::{LibraryManager, SnapshotStore},
    pipeline::Pipeline,
    success, warning,
};

pub async fn download() {
    let api = super::connect().await;
    let settings = SyncSettings::from_env();
    let store = LibraryManager::from_env();

    let snapshot = Pipeline::new(&api, &settings)
        .download()
        .await
        .unwrap_or_else(|e| super::fail(e));

    if !snapshot.is_complete() {
        warning!(
            "Library reported {} tracks but only {} were downloaded",
            snapshot.total,
            snapshot.len()
        );
    }

    if let Err(e) = store.save(&snapshot).await {
        super::fail(e);
    }
    success!("Library saved to {}", store.path().display());
}

pub async fn enrich() {
    let store = LibraryManager::from_env();
    let mut snapshot = super::load_snapshot(&store).await;
    if snapshot.is_empty() {
        info!("Library is empty, nothing to enrich.");
        return;
    }

    let api = super::connect().await;
    let settings = SyncSettings::from_env();

    if let Err(e) = Pipeline::new(&api, &settings).enrich(&mut snapshot).await {
        super::fail(e);
    }

    if let Err(e) = store.save(&snapshot).await {
        super::fail(e);
    }
    success!("Genres saved to {}", store.path().display());
}

pub async fn sync() {
    let api = super::connect().await;
    let settings = SyncSettings::from_env();
    let store = LibraryManager::from_env();

    let report = Pipeline::new(&api, &settings)
        .run(&store)
        .await
        .unwrap_or_else(|e| super::fail(e));

    super::playlist::summarize(&report);
}
