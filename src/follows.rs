//! The followers/following screen of a profile, with optimistic follow and
//! unfollow buttons.
//!
//! Pressing follow (or unfollow) changes `user_following` right away, then
//! publishes. If publishing fails the change is undone and an error is shown.
//! If it works, the published contact list lands in the account store and
//! comes back to us through the active account.

use crate::accounts::ActiveAccountStore;
use crate::error::{Error, FailureKind};
use crate::globals::Globals;
use crate::metadata::{CdnImage, ProfileData};
use crate::repository::ProfileRepository;
use crate::scope::ScreenScope;
use futures::StreamExt;
use nostr_types::PublicKeyHex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Which list of people the screen shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FollowsType {
    #[default]
    Followers,
    Following,
}

impl FollowsType {
    /// Parse the navigation argument. Absent or unrecognized means
    /// `Followers`.
    pub fn from_nav_arg(arg: Option<&str>) -> FollowsType {
        match arg {
            None => FollowsType::Followers,
            Some("Followers") => FollowsType::Followers,
            Some("Following") => FollowsType::Following,
            Some(other) => {
                tracing::warn!("Unknown follows type {:?}, showing followers", other);
                FollowsType::Followers
            }
        }
    }
}

/// One row of the list
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfileItem {
    pub profile_id: PublicKeyHex,
    pub display_name: String,
    pub internet_identifier: Option<String>,
    pub avatar_cdn_image: Option<CdnImage>,
}

impl From<&ProfileData> for UserProfileItem {
    fn from(profile: &ProfileData) -> UserProfileItem {
        UserProfileItem {
            profile_id: profile.owner_id.clone(),
            display_name: profile.author_name_ui_friendly(),
            internet_identifier: profile.internet_identifier.clone(),
            avatar_cdn_image: profile.avatar_cdn_image.clone(),
        }
    }
}

/// Why the last follow or unfollow was undone
#[derive(Debug, Clone)]
pub enum FollowsError {
    FailedToFollowUser(Arc<Error>),
    FailedToUnfollowUser(Arc<Error>),
    MissingRelaysConfiguration(Arc<Error>),
}

impl FollowsError {
    pub fn cause(&self) -> &Error {
        match self {
            FollowsError::FailedToFollowUser(e) => e.as_ref(),
            FollowsError::FailedToUnfollowUser(e) => e.as_ref(),
            FollowsError::MissingRelaysConfiguration(e) => e.as_ref(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProfileFollowsUiState {
    pub profile_name: Option<String>,
    pub follows_type: FollowsType,
    pub loading: bool,
    pub users: Vec<UserProfileItem>,

    /// Who the active user follows, as far as this screen knows
    pub user_following: HashSet<PublicKeyHex>,

    pub error: Option<FollowsError>,
}

impl ProfileFollowsUiState {
    pub fn new(follows_type: FollowsType) -> ProfileFollowsUiState {
        ProfileFollowsUiState {
            profile_name: None,
            follows_type,
            loading: false,
            users: vec![],
            user_following: HashSet::new(),
            error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    FollowProfile(PublicKeyHex),
    UnfollowProfile(PublicKeyHex),
    DismissError,
    ReloadData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowAction {
    Follow,
    Unfollow,
}

/// A follow or unfollow in two phases: `apply` changes the state before
/// anything is published, `settle` takes the outcome of publishing and undoes
/// the change if it failed.
#[derive(Debug)]
pub struct FollowOperation {
    action: FollowAction,
    target: PublicKeyHex,

    // Whether apply() changed the set, so settle() undoes no more than that
    changed: bool,
}

impl FollowOperation {
    pub fn follow(target: PublicKeyHex) -> FollowOperation {
        FollowOperation {
            action: FollowAction::Follow,
            target,
            changed: false,
        }
    }

    pub fn unfollow(target: PublicKeyHex) -> FollowOperation {
        FollowOperation {
            action: FollowAction::Unfollow,
            target,
            changed: false,
        }
    }

    pub fn action(&self) -> FollowAction {
        self.action
    }

    pub fn target(&self) -> &PublicKeyHex {
        &self.target
    }

    pub fn apply(&mut self, state: &mut ProfileFollowsUiState) {
        self.changed = match self.action {
            FollowAction::Follow => state.user_following.insert(self.target.clone()),
            FollowAction::Unfollow => state.user_following.remove(&self.target),
        };
    }

    /// Confirm on success, compensate on failure
    pub fn settle(self, state: &mut ProfileFollowsUiState, result: Result<(), Error>) {
        let e = match result {
            Ok(()) => return,
            Err(e) => e,
        };
        tracing::warn!("{}", e);

        if self.changed {
            match self.action {
                FollowAction::Follow => state.user_following.remove(&self.target),
                FollowAction::Unfollow => state.user_following.insert(self.target.clone()),
            };
        }

        let failure_kind = e.failure_kind();
        let cause = Arc::new(e);
        state.error = Some(match (failure_kind, self.action) {
            (FailureKind::MissingConfiguration, _) => {
                FollowsError::MissingRelaysConfiguration(cause)
            }
            (_, FollowAction::Follow) => FollowsError::FailedToFollowUser(cause),
            (_, FollowAction::Unfollow) => FollowsError::FailedToUnfollowUser(cause),
        });
    }
}

struct Inner {
    profile_id: PublicKeyHex,
    state: watch::Sender<ProfileFollowsUiState>,
    fetches_in_flight: AtomicUsize,
    profiles: ProfileRepository,
    active: ActiveAccountStore,
}

/// Drives one followers/following screen. Everything it started stops when
/// it is closed or dropped.
pub struct ProfileFollowsController {
    inner: Arc<Inner>,
    events: mpsc::UnboundedSender<UiEvent>,
    scope: ScreenScope,
}

impl ProfileFollowsController {
    /// Open the screen for `profile_id`. `follows_type` is the raw navigation
    /// argument. Must be called within a tokio runtime.
    pub fn start(
        globals: Arc<Globals>,
        profile_id: PublicKeyHex,
        follows_type: Option<&str>,
    ) -> ProfileFollowsController {
        let follows_type = FollowsType::from_nav_arg(follows_type);
        let (state, _) = watch::channel(ProfileFollowsUiState::new(follows_type));
        let inner = Arc::new(Inner {
            profile_id,
            state,
            fetches_in_flight: AtomicUsize::new(0),
            profiles: ProfileRepository::new(globals.clone()),
            active: globals.active_account_store(),
        });
        let (events, inbox) = mpsc::unbounded_channel();
        let scope = ScreenScope::new();

        scope.launch(observe_events(inner.clone(), scope.clone(), inbox));
        scope.launch(observe_profile_data(inner.clone()));
        scope.launch(observe_active_account(inner.clone()));
        scope.launch(fetch_follows(inner.clone()));

        ProfileFollowsController {
            inner,
            events,
            scope,
        }
    }

    /// The screen state now and after every change
    pub fn state(&self) -> watch::Receiver<ProfileFollowsUiState> {
        self.inner.state.subscribe()
    }

    pub fn set_event(&self, event: UiEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("Event for a closed follows screen dropped");
        }
    }

    /// Stop everything in flight. Operations stopped this way are neither
    /// finished nor undone.
    pub fn close(&self) {
        self.scope.close();
    }
}

impl Drop for ProfileFollowsController {
    fn drop(&mut self) {
        self.scope.close();
    }
}

async fn observe_events(
    inner: Arc<Inner>,
    scope: ScreenScope,
    mut inbox: mpsc::UnboundedReceiver<UiEvent>,
) {
    while let Some(event) = inbox.recv().await {
        match event {
            UiEvent::FollowProfile(target) => {
                scope.launch(run_operation(inner.clone(), FollowOperation::follow(target)));
            }
            UiEvent::UnfollowProfile(target) => {
                scope.launch(run_operation(
                    inner.clone(),
                    FollowOperation::unfollow(target),
                ));
            }
            UiEvent::DismissError => inner.state.send_modify(|s| s.error = None),
            UiEvent::ReloadData => {
                scope.launch(fetch_follows(inner.clone()));
            }
        }
    }
}

async fn observe_profile_data(inner: Arc<Inner>) {
    let mut profiles = inner.profiles.observe_profile_data(&inner.profile_id);
    while let Some(profile) = profiles.next().await {
        let name = profile.username_ui_friendly();
        inner.state.send_modify(|s| s.profile_name = Some(name));
    }
}

async fn observe_active_account(inner: Arc<Inner>) {
    let mut active = inner.active.active_user_account();
    loop {
        let following = active
            .borrow_and_update()
            .as_ref()
            .map(|account| account.following.clone());
        if let Some(following) = following {
            inner.state.send_modify(|s| s.user_following = following);
        }
        if active.changed().await.is_err() {
            return;
        }
    }
}

// One fetch in flight. Loading is on while any fetch is, however each of
// them ends. The count only changes inside send_modify.
struct Loading<'a>(&'a Inner);

impl<'a> Loading<'a> {
    fn start(inner: &'a Inner) -> Loading<'a> {
        inner.state.send_modify(|s| {
            inner.fetches_in_flight.fetch_add(1, Ordering::SeqCst);
            s.loading = true;
        });
        Loading(inner)
    }
}

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        let inner = self.0;
        inner.state.send_modify(|s| {
            let before = inner.fetches_in_flight.fetch_sub(1, Ordering::SeqCst);
            s.loading = before > 1;
        });
    }
}

async fn fetch_follows(inner: Arc<Inner>) {
    let _loading = Loading::start(&inner);

    let follows_type = inner.state.borrow().follows_type;
    let result = match follows_type {
        FollowsType::Followers => inner.profiles.fetch_followers(&inner.profile_id).await,
        FollowsType::Following => inner.profiles.fetch_following(&inner.profile_id).await,
    };

    // A failed fetch leaves the list as it was; there is a reload event
    match result {
        Ok(profiles) => {
            let users: Vec<UserProfileItem> = profiles.iter().map(UserProfileItem::from).collect();
            inner.state.send_modify(|s| s.users = users);
        }
        Err(e) => tracing::warn!("{}", e),
    }
}

async fn run_operation(inner: Arc<Inner>, mut operation: FollowOperation) {
    inner.state.send_modify(|s| operation.apply(s));

    let result = match inner.active.active_user_id() {
        Ok(user_id) => match operation.action() {
            FollowAction::Follow => inner.profiles.follow(&user_id, operation.target()).await,
            FollowAction::Unfollow => inner.profiles.unfollow(&user_id, operation.target()).await,
        },
        Err(e) => Err(e),
    };

    inner
        .state
        .send_modify(|s| operation.settle(s, result.map(|_| ())));
}
