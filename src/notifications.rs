use crate::accounts::{ActiveAccountStore, Badges};
use crate::globals::Globals;
use crate::metadata::CdnImage;
use crate::scope::ScreenScope;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationsUiState {
    pub active_account_avatar: Option<CdnImage>,
    pub badges: Badges,
}

/// The notifications screen header: the active account's avatar and unread
/// counters
pub struct NotificationsController {
    state: watch::Sender<NotificationsUiState>,
    scope: ScreenScope,
}

impl NotificationsController {
    /// Must be called within a tokio runtime
    pub fn start(globals: Arc<Globals>) -> NotificationsController {
        let (state, _) = watch::channel(NotificationsUiState::default());
        let scope = ScreenScope::new();
        scope.launch(subscribe_to_active_account(
            globals.active_account_store(),
            state.clone(),
        ));
        NotificationsController { state, scope }
    }

    pub fn state(&self) -> watch::Receiver<NotificationsUiState> {
        self.state.subscribe()
    }

    pub fn close(&self) {
        self.scope.close();
    }
}

impl Drop for NotificationsController {
    fn drop(&mut self) {
        self.scope.close();
    }
}

async fn subscribe_to_active_account(
    active: ActiveAccountStore,
    state: watch::Sender<NotificationsUiState>,
) {
    let mut account = active.active_user_account();
    loop {
        let update = account
            .borrow_and_update()
            .as_ref()
            .map(|a| (a.avatar_cdn_image.clone(), a.badges));

        // Logged out: keep showing what we had
        if let Some((avatar, badges)) = update {
            state.send_if_modified(|s| {
                let changed = s.active_account_avatar != avatar || s.badges != badges;
                s.active_account_avatar = avatar;
                s.badges = badges;
                changed
            });
        }

        if account.changed().await.is_err() {
            return;
        }
    }
}
