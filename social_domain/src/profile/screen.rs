//! Presentation state of the profile screen.
//!
//! The screen stays independent of any UI toolkit: the toolkit feeds it user
//! input (navigation, clicks, typing) and renders from its accessors. Loads are
//! split into [`ProfileScreen::navigate`] (issues a [`LoadTicket`]),
//! [`ProfileScreen::fetch`] (does not borrow the screen) and
//! [`ProfileScreen::complete`], so that several loads can be in flight and only
//! the most recently issued one is applied.

use super::{FetchProfileView, FollowEntry, PostTile, ProfileView};
use crate::error::{RwError, RwResult};
use crate::post::image::ImageTransform;
use crate::user::auth::Token;
use crate::user::description::Description;
use crate::user::{Follow, UpdateDescription, UserId};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum PostTab {
    #[default]
    Own,
    Liked,
}

/// At most one list is shown at a time.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Modal {
    #[default]
    Closed,
    Followers,
    Followings,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LoadState {
    Loading,
    Ready,
    NotFound,
    /// The last load failed. [`ProfileScreen::retry`] starts a new one.
    Failed { message: String },
}

#[derive(Debug)]
#[must_use]
pub struct LoadTicket {
    generation: u64,
    user_id: UserId,
    session: String,
}

#[derive(Debug)]
pub struct LoadOutcome {
    generation: u64,
    result: RwResult<ProfileView>,
}

pub struct ProfileScreen {
    session: String,
    target: Option<UserId>,
    generation: u64,
    state: LoadState,
    view: Option<ProfileView>,
    tab: PostTab,
    modal: Modal,
    draft: Option<String>,
}

impl ProfileScreen {
    /// `session` is the signed-in caller's token.
    pub fn new(session: impl Into<String>) -> Self {
        Self {
            session: session.into(),
            target: None,
            generation: 0,
            state: LoadState::Loading,
            view: None,
            tab: PostTab::default(),
            modal: Modal::default(),
            draft: None,
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn view(&self) -> Option<&ProfileView> {
        self.view.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    /// The profile identifier changed. `None` means the request carried no identifier.
    pub fn navigate(&mut self, user_id: Option<UserId>) -> Option<LoadTicket> {
        self.modal = Modal::Closed;
        self.draft = None;
        if self.target != user_id {
            self.view = None;
        }
        self.target = user_id;
        self.begin_load()
    }

    /// The post detail overlay was closed; likes may have changed.
    pub fn post_details_closed(&mut self) -> Option<LoadTicket> {
        self.begin_load()
    }

    pub fn retry(&mut self) -> Option<LoadTicket> {
        self.begin_load()
    }

    fn begin_load(&mut self) -> Option<LoadTicket> {
        self.generation += 1;
        match self.target {
            Some(user_id) => {
                self.state = LoadState::Loading;
                Some(LoadTicket {
                    generation: self.generation,
                    user_id,
                    session: self.session.clone(),
                })
            }
            None => {
                tracing::warn!("profile screen opened without a user id");
                self.state = LoadState::NotFound;
                None
            }
        }
    }

    pub async fn fetch(deps: &impl FetchProfileView, ticket: LoadTicket) -> LoadOutcome {
        let result = deps
            .fetch_profile_view(Token::from_token(&ticket.session), ticket.user_id)
            .await;
        LoadOutcome {
            generation: ticket.generation,
            result,
        }
    }

    /// Apply a finished load. Returns `false` when a newer load has been issued since.
    pub fn complete(&mut self, outcome: LoadOutcome) -> bool {
        if outcome.generation != self.generation {
            tracing::debug!(
                stale = outcome.generation,
                current = self.generation,
                "discarding superseded profile load"
            );
            return false;
        }

        match outcome.result {
            Ok(view) => {
                self.view = Some(view);
                self.state = LoadState::Ready;
            }
            Err(RwError::ProfileNotFound) => {
                self.view = None;
                self.state = LoadState::NotFound;
            }
            Err(e) => {
                tracing::warn!("failed to load profile: {:?}", e);
                self.state = LoadState::Failed {
                    message: e.to_string(),
                };
            }
        }
        true
    }

    /// Issue, fetch and apply a load for the current target.
    pub async fn reload(&mut self, deps: &impl FetchProfileView) -> bool {
        match self.begin_load() {
            Some(ticket) => {
                let outcome = Self::fetch(deps, ticket).await;
                self.complete(outcome)
            }
            None => false,
        }
    }

    pub fn select_tab(&mut self, tab: PostTab) {
        self.tab = tab;
    }

    pub fn tab(&self) -> PostTab {
        self.tab
    }

    pub fn displayed_posts(&self) -> &[PostTile] {
        match (&self.view, self.tab) {
            (Some(view), PostTab::Own) => &view.posts,
            (Some(view), PostTab::Liked) => &view.liked_posts,
            (None, _) => &[],
        }
    }

    /// Placeholder for an empty grid.
    pub fn empty_grid_message(&self) -> &'static str {
        match self.tab {
            PostTab::Own => "No posts available.",
            PostTab::Liked => "No liked posts available.",
        }
    }

    pub fn modal(&self) -> Modal {
        self.modal
    }

    pub fn toggle_followers(&mut self) {
        self.modal = match self.modal {
            Modal::Followers => Modal::Closed,
            _ => Modal::Followers,
        };
    }

    pub fn toggle_followings(&mut self) {
        self.modal = match self.modal {
            Modal::Followings => Modal::Closed,
            _ => Modal::Followings,
        };
    }

    pub fn close_modal(&mut self) {
        self.modal = Modal::Closed;
    }

    /// A pointer press anywhere on the page. The toolkit reports whether it hit the open modal.
    pub fn pointer_down(&mut self, inside_modal: bool) {
        if !inside_modal {
            self.modal = Modal::Closed;
        }
    }

    /// Entries of the open modal, if any.
    pub fn modal_entries(&self) -> &[FollowEntry] {
        match (&self.view, self.modal) {
            (Some(view), Modal::Followers) => &view.followers,
            (Some(view), Modal::Followings) => &view.followings,
            _ => &[],
        }
    }

    pub fn avatar_url(&self) -> Option<String> {
        self.view
            .as_ref()
            .map(|view| ImageTransform::PROFILE_AVATAR.apply(&view.image))
    }

    pub fn entry_avatar_url(entry: &FollowEntry) -> String {
        ImageTransform::LIST_AVATAR.apply(&entry.image)
    }

    /// The caller has no follow button on their own entry.
    pub fn can_follow(&self, entry: &FollowEntry) -> bool {
        self.view
            .as_ref()
            .map_or(false, |view| view.viewer.user_id != entry.user_id)
    }

    /// Whether the signed-in caller follows `user_id`, whichever profile is open.
    pub fn viewer_follows(&self, user_id: UserId) -> bool {
        self.view
            .as_ref()
            .map_or(false, |view| view.viewer.followings.contains(&user_id))
    }

    /// The open profile belongs to the signed-in caller.
    pub fn is_own_profile(&self) -> bool {
        self.view
            .as_ref()
            .map_or(false, |view| view.user_id == view.viewer.user_id)
    }

    /// Flip the caller's follow state of `user_id`.
    ///
    /// On success the caller's following ids are updated right away, and on the
    /// caller's own profile so are both lists. The whole profile is then reloaded
    /// so that counts and lists match the store.
    pub async fn toggle_follow(
        &mut self,
        deps: &(impl Follow + FetchProfileView),
        user_id: UserId,
    ) -> RwResult<bool> {
        let desired = !self.viewer_follows(user_id);

        let status = deps
            .follow(Token::from_token(&self.session), user_id, desired)
            .await
            .map_err(|e| {
                tracing::warn!("failed to change follow state: {:?}", e);
                e
            })?;

        let own_profile = self.is_own_profile();
        if let Some(view) = self.view.as_mut() {
            view.viewer.followings.retain(|id| *id != user_id);
            if status.following {
                view.viewer.followings.push(user_id);
            }

            // `isFollowed` is the profile owner's perspective.
            if own_profile {
                for entry in view.followers.iter_mut().chain(view.followings.iter_mut()) {
                    if entry.user_id == user_id {
                        entry.is_followed = status.following;
                    }
                }
            }
        }

        self.reload(deps).await;

        Ok(status.following)
    }

    pub fn is_editing(&self) -> bool {
        self.draft.is_some()
    }

    /// Only the caller's own description can be edited. Returns whether editing started.
    pub fn start_editing(&mut self) -> bool {
        match self.view.as_ref() {
            Some(view) if view.user_id == view.viewer.user_id => {
                self.draft = Some(view.description.clone());
                true
            }
            _ => false,
        }
    }

    pub fn draft(&self) -> Option<&str> {
        self.draft.as_deref()
    }

    pub fn edit_draft(&mut self, text: impl Into<String>) {
        if let Some(draft) = self.draft.as_mut() {
            *draft = text.into();
        }
    }

    /// Persist the draft. An over-long draft is rejected without a store call and
    /// editing continues. A failed store call is not rolled back locally.
    pub async fn save_description(&mut self, deps: &impl UpdateDescription) -> RwResult<()> {
        let Some(draft) = self.draft.take() else {
            return Ok(());
        };
        if !self.is_own_profile() {
            return Err(RwError::Forbidden);
        }

        let description = match Description::try_from(draft.clone()) {
            Ok(description) => description,
            Err(e) => {
                self.draft = Some(draft);
                return Err(e);
            }
        };

        if let Some(view) = self.view.as_mut() {
            view.description = description.as_ref().to_string();
        }

        deps.update_description(
            Token::from_token(&self.session),
            description.into_inner(),
        )
        .await
        .map(|_| ())
        .map_err(|e| {
            tracing::warn!("failed to update description: {:?}", e);
            e
        })
    }
}
