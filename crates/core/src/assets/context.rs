//! Process-wide asset context.
//!
//! [`Assets`] is built once at startup and shared by reference. It owns the
//! lazily acquired store handle and the synchronizer state, and exposes the
//! application-facing operations.

use std::sync::Arc;

use super::{
    AssetPath, AssetReader, AssetRecord, AssetUpdater, BundledSource, CacheSynchronizer, DirBundle, ManifestEntry,
    RemoteSource, SyncOutcome, SyncState, UpdateSummary,
};
use crate::Error;
use crate::cache::{StoreHandle, StoreLocation};
use crate::config::AppConfig;

#[derive(Debug, Clone)]
pub struct AssetsOptions {
    pub package_version: String,
    /// Assets under this prefix are user-authored and survive the upgrade
    /// purge.
    pub user_prefix: AssetPath,
}

pub struct Assets {
    store: Arc<StoreHandle>,
    synchronizer: CacheSynchronizer,
    reader: AssetReader,
    updater: AssetUpdater,
}

impl Assets {
    pub fn new(
        store: Arc<StoreHandle>, bundle: Arc<dyn BundledSource>, remote: Arc<dyn RemoteSource>, options: AssetsOptions,
    ) -> Self {
        let synchronizer = CacheSynchronizer::new(options.package_version, options.user_prefix.clone());
        let reader = AssetReader::new(store.clone(), bundle, remote.clone());
        let updater = AssetUpdater::new(store.clone(), remote, options.user_prefix);
        Self { store, synchronizer, reader, updater }
    }

    /// Build a context from configuration; the store is opened on first use.
    pub fn from_config(config: &AppConfig, remote: Arc<dyn RemoteSource>) -> Result<Self, Error> {
        let store = StoreHandle::new(StoreLocation::File(config.db_path.clone())).with_quota(config.quota_bytes);
        let options = AssetsOptions {
            package_version: config.package_version().to_string(),
            user_prefix: AssetPath::new(config.user_prefix.clone())?,
        };
        Ok(Self::new(Arc::new(store), Arc::new(DirBundle::new(&config.bundle_root)), remote, options))
    }

    /// Purge stale cache entries if the package version changed. Runs the
    /// check once; later calls return the first outcome.
    pub async fn synchronize(&self) -> &SyncOutcome {
        self.synchronizer
            .synchronize(self.store.as_ref(), self.store.as_ref())
            .await
    }

    pub fn sync_state(&self) -> SyncState {
        self.synchronizer.state()
    }

    /// Outcome of the first synchronization, if it has run.
    pub fn sync_outcome(&self) -> Option<&SyncOutcome> {
        self.synchronizer.outcome()
    }

    pub fn package_version(&self) -> &str {
        self.synchronizer.current_version()
    }

    pub fn user_prefix(&self) -> &AssetPath {
        self.updater.user_prefix()
    }

    pub async fn get(&self, path: &AssetPath) -> AssetRecord {
        self.reader.get(path).await
    }

    pub async fn get_remote(&self, path: &AssetPath) -> AssetRecord {
        self.reader.get_remote(path).await
    }

    pub async fn put(&self, path: &AssetPath, content: String) -> AssetRecord {
        self.updater.put(path, content).await
    }

    pub async fn update(&self, entry: &ManifestEntry) -> AssetRecord {
        self.updater.update(entry).await
    }

    pub async fn update_all(&self, entries: &[ManifestEntry]) -> UpdateSummary {
        self.updater.update_all(entries).await
    }

    pub fn store(&self) -> &StoreHandle {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::sync::VERSION_MARKER;
    use crate::cache::hash::content_hash;
    use crate::cache::{PersistentStore, SettingsStore, key};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Remote whose body can be swapped between calls.
    #[derive(Default)]
    struct SwitchRemote(Mutex<Option<String>>);

    impl SwitchRemote {
        fn serve(&self, body: &str) {
            *self.0.lock().unwrap() = Some(body.to_string());
        }
    }

    #[async_trait]
    impl RemoteSource for SwitchRemote {
        async fn fetch_asset(&self, path: &AssetPath) -> Result<String, Error> {
            self.0
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| Error::Network(format!("offline: {path}")))
        }
    }

    fn path(s: &str) -> AssetPath {
        AssetPath::new(s).unwrap()
    }

    fn assets(bundle_root: &std::path::Path, remote: Arc<SwitchRemote>) -> Assets {
        Assets::new(
            Arc::new(StoreHandle::in_memory()),
            Arc::new(DirBundle::new(bundle_root)),
            remote,
            AssetsOptions { package_version: "0.2.0".into(), user_prefix: path("assets/user") },
        )
    }

    fn bundle_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("assets")).unwrap();
        std::fs::write(dir.path().join("assets/x.txt"), "hello").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_bundled_then_verified_update() {
        let dir = bundle_dir();
        let remote = Arc::new(SwitchRemote::default());
        let assets = assets(dir.path(), remote.clone());

        let record = assets.get(&path("assets/x.txt")).await;
        assert_eq!(record, AssetRecord::ok(path("assets/x.txt"), "hello".into()));

        remote.serve("v2");
        let entry = ManifestEntry::new(path("assets/x.txt")).with_hash(content_hash("v2"));
        assert!(assets.update(&entry).await.is_ok());

        std::fs::remove_file(dir.path().join("assets/x.txt")).unwrap();
        let record = assets.get(&path("assets/x.txt")).await;
        assert_eq!(record, AssetRecord::ok(path("assets/x.txt"), "v2".into()));
    }

    #[tokio::test]
    async fn test_wrong_hash_does_not_change_reads() {
        let dir = bundle_dir();
        let remote = Arc::new(SwitchRemote::default());
        let assets = assets(dir.path(), remote.clone());
        let before = assets.get(&path("assets/x.txt")).await;

        remote.serve("v2-corrupted");
        let entry = ManifestEntry::new(path("assets/x.txt")).with_hash(content_hash("v2"));
        assert_eq!(assets.update(&entry).await, AssetRecord::failed(path("assets/x.txt")));

        assert_eq!(assets.get(&path("assets/x.txt")).await, before);
    }

    #[tokio::test]
    async fn test_upgrade_purge_keeps_user_assets() {
        let dir = bundle_dir();
        let assets = assets(dir.path(), Arc::new(SwitchRemote::default()));
        assets.store().set_string(VERSION_MARKER, "0.1.0").await.unwrap();
        assets.put(&path("assets/ublock/filters.txt"), "stale".into()).await;
        assets.put(&path("assets/user/filters.txt"), "mine".into()).await;

        assert_eq!(assets.sync_state(), SyncState::Unchecked);
        assert!(matches!(assets.synchronize().await, SyncOutcome::Swept(_)));
        assert_eq!(assets.sync_state(), SyncState::Checked);

        let keys = assets.store().list_all().await.unwrap();
        assert_eq!(keys, vec![key::encode(&path("assets/user/filters.txt"))]);
        assert_eq!(assets.store().get_string(VERSION_MARKER).await.unwrap().as_deref(), Some("0.2.0"));
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let dir = bundle_dir();
        let assets = assets(dir.path(), Arc::new(SwitchRemote::default()));

        assets.put(&path("assets/user/filters.txt"), "||example.org^".into()).await;
        assert_eq!(assets.get(&path("assets/user/filters.txt")).await.content, "||example.org^");
    }

    #[test]
    fn test_from_config_rejects_bad_user_prefix() {
        let config = AppConfig { user_prefix: "/abs".into(), ..Default::default() };
        let result = Assets::from_config(&config, Arc::new(SwitchRemote::default()));
        assert!(matches!(result, Err(Error::Package(_))));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            #[test]
            fn prop_verified_update_round_trips(text in "\\PC{0,64}") {
                let runtime = tokio::runtime::Runtime::new().unwrap();
                runtime.block_on(async {
                    let dir = bundle_dir();
                    let remote = Arc::new(SwitchRemote::default());
                    let assets = assets(dir.path(), remote.clone());

                    remote.serve(&text);
                    let entry = ManifestEntry::new(path("assets/x.txt")).with_hash(content_hash(&text));
                    assets.update(&entry).await;

                    let record = assets.get(&path("assets/x.txt")).await;
                    prop_assert_eq!(record, AssetRecord::ok(path("assets/x.txt"), text.clone()));
                    Ok(())
                })?;
            }

            #[test]
            fn prop_wrong_hash_never_changes_reads(
                cached in proptest::option::of("\\PC{0,32}"),
                expected in "\\PC{0,32}",
                served in "\\PC{0,32}",
                on_user_path in any::<bool>(),
            ) {
                prop_assume!(served != expected);
                let runtime = tokio::runtime::Runtime::new().unwrap();
                runtime.block_on(async {
                    let dir = bundle_dir();
                    let remote = Arc::new(SwitchRemote::default());
                    let assets = assets(dir.path(), remote.clone());
                    let target = if on_user_path { path("assets/user/x.txt") } else { path("assets/x.txt") };

                    if let Some(cached) = &cached {
                        assets.put(&target, cached.clone()).await;
                    }
                    let before = assets.get(&target).await;

                    remote.serve(&served);
                    let entry = ManifestEntry::new(target.clone()).with_hash(content_hash(&expected));
                    prop_assert!(!assets.update(&entry).await.is_ok());
                    prop_assert_eq!(assets.get(&target).await, before);
                    Ok(())
                })?;
            }
        }
    }
}
