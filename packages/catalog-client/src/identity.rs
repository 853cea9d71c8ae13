//! Client-side identity cache
//!
//! Mirrors the identity provider's session stream and keeps the signed-in
//! user's profile document next to it. Writes go to the durable
//! [`ProfileStore`] first and are then mirrored locally without a re-read.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{watch, RwLock};
use tracing::{debug, error, info};

use crate::error::{ClientError, ClientResult};
use crate::models::{ProfileUpdate, Session, UserProfile};

/// Durable per-user profile documents, keyed by session uid
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Load a profile; `Ok(None)` when no document exists
    async fn get(&self, uid: &str) -> ClientResult<Option<UserProfile>>;

    async fn create(&self, profile: &UserProfile) -> ClientResult<()>;

    /// Merge the set fields of `update` into an existing document
    async fn update(&self, uid: &str, update: &ProfileUpdate) -> ClientResult<()>;

    /// Add `song_id` to the liked set; adding twice is a no-op
    async fn add_liked(&self, uid: &str, song_id: &str) -> ClientResult<()>;

    /// Remove `song_id` from the liked set; removing an absent id is a no-op
    async fn remove_liked(&self, uid: &str, song_id: &str) -> ClientResult<()>;

    /// Every profile document, in no particular order
    async fn list(&self) -> ClientResult<Vec<UserProfile>>;
}

/// In-process profile store
#[derive(Debug, Clone, Default)]
pub struct MemoryProfileStore {
    profiles: Arc<RwLock<HashMap<String, UserProfile>>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document, replacing any existing one
    pub async fn insert(&self, profile: UserProfile) {
        self.profiles
            .write()
            .await
            .insert(profile.uid.clone(), profile);
    }

    async fn modify<F>(&self, uid: &str, f: F) -> ClientResult<()>
    where
        F: FnOnce(&mut UserProfile) + Send,
    {
        let mut profiles = self.profiles.write().await;
        let profile = profiles
            .get_mut(uid)
            .ok_or_else(|| ClientError::Profile(format!("no profile for {}", uid)))?;
        f(profile);
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn get(&self, uid: &str) -> ClientResult<Option<UserProfile>> {
        Ok(self.profiles.read().await.get(uid).cloned())
    }

    async fn create(&self, profile: &UserProfile) -> ClientResult<()> {
        self.insert(profile.clone()).await;
        Ok(())
    }

    async fn update(&self, uid: &str, update: &ProfileUpdate) -> ClientResult<()> {
        self.modify(uid, |profile| profile.apply(update)).await
    }

    async fn add_liked(&self, uid: &str, song_id: &str) -> ClientResult<()> {
        self.modify(uid, |profile| {
            profile.liked_songs.insert(song_id.to_string());
        })
        .await
    }

    async fn remove_liked(&self, uid: &str, song_id: &str) -> ClientResult<()> {
        self.modify(uid, |profile| {
            profile.liked_songs.remove(song_id);
        })
        .await
    }

    async fn list(&self) -> ClientResult<Vec<UserProfile>> {
        Ok(self.profiles.read().await.values().cloned().collect())
    }
}

/// Shown for directory entries whose document has no usable display name
const ANONYMOUS_NAME: &str = "Anonymous";

/// Where the session stream currently stands
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IdentityState {
    /// No session event seen yet
    #[default]
    Unknown,
    Anonymous,
    Authenticated {
        session: Session,
        profile: UserProfile,
    },
}

impl IdentityState {
    pub fn profile(&self) -> Option<&UserProfile> {
        match self {
            IdentityState::Authenticated { profile, .. } => Some(profile),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, IdentityState::Authenticated { .. })
    }
}

/// Session-scoped profile cache
pub struct IdentityCache {
    store: Arc<dyn ProfileStore>,
    state: watch::Sender<IdentityState>,
}

impl IdentityCache {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        let (state, _) = watch::channel(IdentityState::Unknown);
        Self { store, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<IdentityState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> IdentityState {
        self.state.borrow().clone()
    }

    pub fn profile(&self) -> Option<UserProfile> {
        self.state.borrow().profile().cloned()
    }

    /// Admin gate for the catalog console
    pub fn is_admin(&self) -> bool {
        self.state
            .borrow()
            .profile()
            .is_some_and(UserProfile::is_admin)
    }

    /// Apply a session event
    ///
    /// `None` signs out and clears the profile. A session loads its profile
    /// document, creating the default one on first sign-in. If the store
    /// fails the error is returned and the state is left unchanged.
    pub async fn handle_session_change(&self, session: Option<Session>) -> ClientResult<()> {
        let Some(session) = session else {
            debug!("Session ended");
            self.state.send_replace(IdentityState::Anonymous);
            return Ok(());
        };

        let profile = match self.hydrate(&session).await {
            Ok(profile) => profile,
            Err(e) => {
                error!(uid = %session.uid, error = %e, "Failed to load profile");
                return Err(e);
            }
        };

        debug!(uid = %session.uid, admin = profile.is_admin(), "Session started");
        self.state
            .send_replace(IdentityState::Authenticated { session, profile });
        Ok(())
    }

    async fn hydrate(&self, session: &Session) -> ClientResult<UserProfile> {
        if let Some(profile) = self.store.get(&session.uid).await? {
            return Ok(profile);
        }

        let profile = UserProfile::default_for(session);
        self.store.create(&profile).await?;
        info!(uid = %session.uid, "Created profile on first sign-in");
        Ok(profile)
    }

    fn current_uid(&self) -> ClientResult<String> {
        match &*self.state.borrow() {
            IdentityState::Authenticated { session, .. } => Ok(session.uid.clone()),
            _ => Err(ClientError::NotAuthenticated),
        }
    }

    /// Write `update` to the store, then merge it into the cached profile
    ///
    /// # Errors
    /// `ClientError::NotAuthenticated` when nobody is signed in
    pub async fn update_profile(&self, update: &ProfileUpdate) -> ClientResult<()> {
        let uid = self.current_uid()?;
        self.store.update(&uid, update).await?;

        // The session may have changed while the write was in flight
        self.state.send_if_modified(|state| match state {
            IdentityState::Authenticated { session, profile } if session.uid == uid => {
                profile.apply(update);
                true
            }
            _ => false,
        });
        Ok(())
    }

    /// Flip whether `song_id` is liked; returns the new membership
    ///
    /// Anonymous users get `Ok(false)` and nothing is written.
    pub async fn toggle_like(&self, song_id: &str) -> ClientResult<bool> {
        let (uid, liked) = match &*self.state.borrow() {
            IdentityState::Authenticated { session, profile } => {
                (session.uid.clone(), profile.has_liked(song_id))
            }
            _ => return Ok(false),
        };

        if liked {
            self.store.remove_liked(&uid, song_id).await?;
        } else {
            self.store.add_liked(&uid, song_id).await?;
        }

        self.state.send_if_modified(|state| match state {
            IdentityState::Authenticated { session, profile } if session.uid == uid => {
                if liked {
                    profile.liked_songs.remove(song_id);
                } else {
                    profile.liked_songs.insert(song_id.to_string());
                }
                true
            }
            _ => false,
        });

        debug!(uid = %uid, song_id = %song_id, liked = !liked, "Toggled like");
        Ok(!liked)
    }

    /// Admin user directory
    ///
    /// Every profile, sorted by display name, keeping those whose name or
    /// email contains `query` (case-insensitive). A missing or empty display
    /// name reads as "Anonymous". An empty query keeps everyone.
    ///
    /// # Errors
    /// `ClientError::NotAuthenticated` when nobody is signed in,
    /// `ClientError::Forbidden` when the signed-in profile is not an admin
    pub async fn list_users(&self, query: &str) -> ClientResult<Vec<UserProfile>> {
        match self.state.borrow().profile() {
            None => return Err(ClientError::NotAuthenticated),
            Some(profile) if !profile.is_admin() => return Err(ClientError::Forbidden),
            Some(_) => {}
        }

        let mut users = self.store.list().await?;
        for user in &mut users {
            if user.display_name.as_deref().map_or(true, str::is_empty) {
                user.display_name = Some(ANONYMOUS_NAME.to_string());
            }
        }
        users.sort_by(|a, b| a.display_name.cmp(&b.display_name));

        let needle = query.to_lowercase();
        users.retain(|user| {
            let matches = |field: &Option<String>| {
                field
                    .as_deref()
                    .is_some_and(|v| v.to_lowercase().contains(&needle))
            };
            matches(&user.display_name) || matches(&user.email)
        });

        debug!(count = users.len(), "Listed user directory");
        Ok(users)
    }

    /// Follow a session stream until its sender is dropped
    pub async fn run(&self, mut sessions: watch::Receiver<Option<Session>>) {
        loop {
            let session = sessions.borrow_and_update().clone();
            // Failures are logged in handle_session_change; keep following
            let _ = self.handle_session_change(session).await;

            if sessions.changed().await.is_err() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, Role};
    use assert_matches::assert_matches;
    use tokio::sync::Notify;

    fn session(uid: &str) -> Session {
        Session {
            uid: uid.to_string(),
            email: Some(format!("{}@example.com", uid)),
            display_name: None,
        }
    }

    fn cache() -> (IdentityCache, MemoryProfileStore) {
        let store = MemoryProfileStore::new();
        (IdentityCache::new(Arc::new(store.clone())), store)
    }

    struct FailingStore;

    #[async_trait]
    impl ProfileStore for FailingStore {
        async fn get(&self, _uid: &str) -> ClientResult<Option<UserProfile>> {
            Err(ClientError::Profile("offline".into()))
        }
        async fn create(&self, _profile: &UserProfile) -> ClientResult<()> {
            Err(ClientError::Profile("offline".into()))
        }
        async fn update(&self, _uid: &str, _update: &ProfileUpdate) -> ClientResult<()> {
            Err(ClientError::Profile("offline".into()))
        }
        async fn add_liked(&self, _uid: &str, _song_id: &str) -> ClientResult<()> {
            Err(ClientError::Profile("offline".into()))
        }
        async fn remove_liked(&self, _uid: &str, _song_id: &str) -> ClientResult<()> {
            Err(ClientError::Profile("offline".into()))
        }
        async fn list(&self) -> ClientResult<Vec<UserProfile>> {
            Err(ClientError::Profile("offline".into()))
        }
    }

    /// Memory store whose liked-set writes wait for a release signal
    struct GatedStore {
        inner: MemoryProfileStore,
        entered: Arc<Notify>,
        release: Arc<Notify>,
    }

    impl GatedStore {
        async fn hold(&self) {
            self.entered.notify_one();
            self.release.notified().await;
        }
    }

    #[async_trait]
    impl ProfileStore for GatedStore {
        async fn get(&self, uid: &str) -> ClientResult<Option<UserProfile>> {
            self.inner.get(uid).await
        }
        async fn create(&self, profile: &UserProfile) -> ClientResult<()> {
            self.inner.create(profile).await
        }
        async fn update(&self, uid: &str, update: &ProfileUpdate) -> ClientResult<()> {
            self.hold().await;
            self.inner.update(uid, update).await
        }
        async fn add_liked(&self, uid: &str, song_id: &str) -> ClientResult<()> {
            self.hold().await;
            self.inner.add_liked(uid, song_id).await
        }
        async fn remove_liked(&self, uid: &str, song_id: &str) -> ClientResult<()> {
            self.inner.remove_liked(uid, song_id).await
        }
        async fn list(&self) -> ClientResult<Vec<UserProfile>> {
            self.inner.list().await
        }
    }

    fn gated_cache() -> (IdentityCache, MemoryProfileStore, Arc<Notify>, Arc<Notify>) {
        let inner = MemoryProfileStore::new();
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let store = GatedStore {
            inner: inner.clone(),
            entered: entered.clone(),
            release: release.clone(),
        };
        (IdentityCache::new(Arc::new(store)), inner, entered, release)
    }

    fn named(uid: &str, name: Option<&str>, email: Option<&str>) -> UserProfile {
        let mut profile = UserProfile::default_for(&session(uid));
        profile.display_name = name.map(str::to_string);
        profile.email = email.map(str::to_string);
        profile
    }

    async fn signed_in_admin() -> (IdentityCache, MemoryProfileStore) {
        let (cache, store) = cache();
        let mut admin = named("root", Some("Dilshan"), Some("dilshan@example.com"));
        admin.role = Role::Admin;
        store.insert(admin).await;
        cache
            .handle_session_change(Some(session("root")))
            .await
            .unwrap();
        (cache, store)
    }

    #[tokio::test]
    async fn test_first_sign_in_creates_default_profile() {
        let (cache, store) = cache();
        assert_eq!(cache.state(), IdentityState::Unknown);

        cache.handle_session_change(Some(session("u1"))).await.unwrap();

        let profile = cache.profile().unwrap();
        assert_eq!(profile.display_name.as_deref(), Some("New User"));
        assert_eq!(profile.gender, Gender::Other);
        assert_eq!(profile.role, Role::User);
        assert!(profile.liked_songs.is_empty());
        assert_eq!(store.get("u1").await.unwrap(), Some(profile));
    }

    #[tokio::test]
    async fn test_existing_profile_is_loaded() {
        let (cache, store) = cache();
        let mut existing = UserProfile::default_for(&session("admin"));
        existing.role = Role::Admin;
        store.insert(existing.clone()).await;

        cache
            .handle_session_change(Some(session("admin")))
            .await
            .unwrap();

        assert_eq!(cache.profile(), Some(existing));
        assert!(cache.is_admin());
    }

    #[tokio::test]
    async fn test_sign_out_clears_profile() {
        let (cache, _) = cache();
        cache.handle_session_change(Some(session("u1"))).await.unwrap();
        cache.handle_session_change(None).await.unwrap();

        assert_eq!(cache.state(), IdentityState::Anonymous);
        assert!(cache.profile().is_none());
        assert!(!cache.is_admin());
    }

    #[tokio::test]
    async fn test_store_failure_leaves_state_unchanged() {
        let cache = IdentityCache::new(Arc::new(FailingStore));
        let result = cache.handle_session_change(Some(session("u1"))).await;

        assert_matches!(result, Err(ClientError::Profile(_)));
        assert_eq!(cache.state(), IdentityState::Unknown);
    }

    #[tokio::test]
    async fn test_toggle_like_twice_restores_membership() {
        let (cache, store) = cache();
        cache.handle_session_change(Some(session("u1"))).await.unwrap();

        assert!(cache.toggle_like("42").await.unwrap());
        assert!(cache.profile().unwrap().has_liked("42"));
        assert!(store.get("u1").await.unwrap().unwrap().has_liked("42"));

        assert!(!cache.toggle_like("42").await.unwrap());
        assert!(!cache.profile().unwrap().has_liked("42"));
        assert!(!store.get("u1").await.unwrap().unwrap().has_liked("42"));
    }

    #[tokio::test]
    async fn test_toggle_like_anonymous_is_noop() {
        let (cache, _) = cache();
        cache.handle_session_change(None).await.unwrap();
        assert!(!cache.toggle_like("42").await.unwrap());
    }

    #[tokio::test]
    async fn test_update_profile_merges_locally_and_in_store() {
        let (cache, store) = cache();
        cache.handle_session_change(Some(session("u1"))).await.unwrap();

        let update = ProfileUpdate {
            display_name: Some("Dilshan".into()),
            gender: Some(Gender::Male),
            photo_url: None,
        };
        cache.update_profile(&update).await.unwrap();

        let local = cache.profile().unwrap();
        assert_eq!(local.display_name.as_deref(), Some("Dilshan"));
        assert_eq!(local.gender, Gender::Male);
        assert_eq!(store.get("u1").await.unwrap(), Some(local));
    }

    #[tokio::test]
    async fn test_update_profile_requires_session() {
        let (cache, _) = cache();
        let result = cache.update_profile(&ProfileUpdate::default()).await;
        assert_matches!(result, Err(ClientError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_subscribers_see_transitions() {
        let (cache, _) = cache();
        let mut rx = cache.subscribe();

        cache.handle_session_change(Some(session("u1"))).await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_authenticated());
    }

    #[tokio::test]
    async fn test_run_follows_session_stream() {
        let (cache, _) = cache();
        let cache = Arc::new(cache);
        let (tx, rx) = watch::channel(Some(session("u1")));

        let runner = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.run(rx).await })
        };

        let mut states = cache.subscribe();
        states
            .wait_for(IdentityState::is_authenticated)
            .await
            .unwrap();

        tx.send_replace(None);
        states
            .wait_for(|s| *s == IdentityState::Anonymous)
            .await
            .unwrap();

        drop(tx);
        runner.await.unwrap();
    }

    #[tokio::test]
    async fn test_like_landing_after_account_switch_is_not_mirrored() {
        let (cache, store, entered, release) = gated_cache();
        cache.handle_session_change(Some(session("a"))).await.unwrap();

        let switch = async {
            entered.notified().await;
            cache.handle_session_change(Some(session("b"))).await.unwrap();
            release.notify_one();
        };
        let (liked, ()) = tokio::join!(cache.toggle_like("42"), switch);

        assert!(liked.unwrap());
        assert!(store.get("a").await.unwrap().unwrap().has_liked("42"));
        let profile = cache.profile().unwrap();
        assert_eq!(profile.uid, "b");
        assert!(!profile.has_liked("42"));
    }

    #[tokio::test]
    async fn test_update_landing_after_account_switch_is_not_mirrored() {
        let (cache, store, entered, release) = gated_cache();
        cache.handle_session_change(Some(session("a"))).await.unwrap();

        let switch = async {
            entered.notified().await;
            cache.handle_session_change(Some(session("b"))).await.unwrap();
            release.notify_one();
        };
        let update = ProfileUpdate {
            display_name: Some("Renamed".into()),
            ..Default::default()
        };
        let (updated, ()) = tokio::join!(cache.update_profile(&update), switch);

        updated.unwrap();
        let stored = store.get("a").await.unwrap().unwrap();
        assert_eq!(stored.display_name.as_deref(), Some("Renamed"));
        let profile = cache.profile().unwrap();
        assert_eq!(profile.uid, "b");
        assert_eq!(profile.display_name.as_deref(), Some("New User"));
    }

    #[tokio::test]
    async fn test_list_users_requires_admin() {
        let (cache, _) = cache();
        assert_matches!(cache.list_users("").await, Err(ClientError::NotAuthenticated));

        cache.handle_session_change(Some(session("u1"))).await.unwrap();
        assert_matches!(cache.list_users("").await, Err(ClientError::Forbidden));
    }

    #[tokio::test]
    async fn test_list_users_sorts_and_fills_missing_names() {
        let (cache, store) = signed_in_admin().await;
        store.insert(named("u1", Some("Kasun"), None)).await;
        store.insert(named("u2", None, Some("ghost@example.com"))).await;
        store.insert(named("u3", Some(""), None)).await;
        store.insert(named("u4", Some("Amara"), Some("amara@example.com"))).await;

        let names: Vec<String> = cache
            .list_users("")
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.display_name.unwrap())
            .collect();

        assert_eq!(
            names,
            ["Amara", "Anonymous", "Anonymous", "Dilshan", "Kasun"]
        );
    }

    #[tokio::test]
    async fn test_list_users_filters_by_name_or_email() {
        let (cache, store) = signed_in_admin().await;
        store.insert(named("u1", Some("Kasun Perera"), None)).await;
        store.insert(named("u2", None, Some("PERERA.fan@example.com"))).await;
        store.insert(named("u3", Some("Amara"), Some("amara@example.com"))).await;

        let uids: Vec<String> = cache
            .list_users("perera")
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.uid)
            .collect();
        assert_eq!(uids, ["u2", "u1"]);

        let anonymous = cache.list_users("anon").await.unwrap();
        assert_eq!(anonymous.len(), 1);
        assert_eq!(anonymous[0].uid, "u2");
    }

    #[tokio::test]
    async fn test_list_users_surfaces_store_failure() {
        let cache = IdentityCache::new(Arc::new(FailingStore));
        let mut admin = named("root", Some("Dilshan"), None);
        admin.role = Role::Admin;
        cache.state.send_replace(IdentityState::Authenticated {
            session: session("root"),
            profile: admin,
        });

        assert_matches!(cache.list_users("").await, Err(ClientError::Profile(_)));
    }
}
