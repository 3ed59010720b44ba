//! Stream-driven session/role context.
//!
//! The identity provider pushes session events (login, logout, token
//! refresh). [`SessionContext`] attaches to that stream, runs the
//! resolution routine per event, and publishes a read-only tri-state
//! through a watch channel. It is the single writer of the published
//! state; everything else observes.
//!
//! Ordering: each event bumps a monotonically increasing epoch, and a
//! finished resolution is applied only if its epoch is still current -
//! an earlier resolution can never overwrite a later one, even when the
//! underlying profile fetches complete out of order.
//!
//! The role-home redirect is emitted at most once per mount: token
//! refreshes re-resolve the session but must not bounce the user again.

use std::future::Future;
use std::pin::Pin;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::warn;

use shoptax_core::{IdentityId, Role};

use crate::backend::BackendError;
use crate::models::{CurrentUser, Identity, Profile};

/// Events pushed by the identity provider's session stream.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Login or token refresh with a live identity.
    SignedIn(Identity),
    /// Logout; identity is null.
    SignedOut,
}

/// Read-only tri-state published to consumers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    /// No resolution has completed yet (loading).
    #[default]
    Unresolved,
    /// A resolution is in flight for this identity (loading).
    Resolving(Identity),
    /// Identity and role resolved; all gates passed.
    Resolved(CurrentUser),
    /// Signed out. Denied and post-fatal-error states collapse here after
    /// the forced sign-out; only a one-shot notice distinguishes them.
    Unauthenticated,
}

impl AuthState {
    /// True until the first resolution completes.
    #[must_use]
    pub const fn loading(&self) -> bool {
        matches!(self, Self::Unresolved | Self::Resolving(_))
    }

    /// The published role, if resolved.
    #[must_use]
    pub const fn role(&self) -> Option<Role> {
        match self {
            Self::Resolved(user) => Some(user.role),
            _ => None,
        }
    }
}

/// One-shot notices emitted alongside state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionNotice {
    /// The identity's email is not verified; signed out before resolution.
    EmailUnverified,
    /// No profile document exists for the identity; signed out.
    AccountNotFound,
    /// The profile's role does not match the required role; signed out.
    AccessDenied,
    /// The profile lookup failed; signed out (fail closed).
    LookupFailed,
    /// First successful resolution: leave neutral/landing routes for the
    /// role's home route. Emitted at most once per mount.
    RedirectTo(&'static str),
}

/// Directory capability: point-read a profile by identity id.
pub trait ProfileDirectory: Clone + Send + Sync + 'static {
    /// Fetch the profile document for `id`; `None` when absent.
    fn fetch_profile(
        &self,
        id: &IdentityId,
    ) -> impl Future<Output = Result<Option<Profile>, BackendError>> + Send;
}

/// Sign-out capability, invoked whenever a gate fails.
pub trait SignOut: Clone + Send + Sync + 'static {
    /// Force the provider-side session to end. Best-effort.
    fn sign_out(&self, id: &IdentityId) -> impl Future<Output = ()> + Send;
}

impl ProfileDirectory for crate::services::auth::AuthService {
    async fn fetch_profile(&self, id: &IdentityId) -> Result<Option<Profile>, BackendError> {
        Self::fetch_profile(self, id).await
    }
}

impl SignOut for crate::services::auth::AuthService {
    async fn sign_out(&self, id: &IdentityId) {
        // Provider-side revocation is token-scoped and stream events carry
        // no tokens; publishing `Unauthenticated` is the effective sign-out.
        tracing::info!(identity = %id, "resolver forced a sign-out");
    }
}

type ResolutionOutcome = (u64, Identity, Result<Option<Profile>, BackendError>);
type ResolutionFuture = Pin<Box<dyn Future<Output = ResolutionOutcome> + Send>>;

/// Handle to a running session context.
///
/// Dropping the handle (or calling [`detach`](Self::detach)) tears the
/// context down exactly once: the event subscription ends and no further
/// state is published.
pub struct SessionContext {
    events: Option<mpsc::Sender<SessionEvent>>,
    state: watch::Receiver<AuthState>,
    notices: mpsc::Receiver<SessionNotice>,
    task: JoinHandle<()>,
}

impl SessionContext {
    /// Attach to a session-event stream.
    ///
    /// `required_role` restricts this consumer to a single role; any other
    /// resolved role is denied and signed out.
    #[must_use]
    pub fn attach<D, S>(directory: D, sign_out: S, required_role: Option<Role>) -> Self
    where
        D: ProfileDirectory,
        S: SignOut,
    {
        let (events_tx, events_rx) = mpsc::channel(16);
        let (state_tx, state_rx) = watch::channel(AuthState::Unresolved);
        let (notice_tx, notice_rx) = mpsc::channel(16);

        let task = tokio::spawn(run(
            directory,
            sign_out,
            required_role,
            events_rx,
            state_tx,
            notice_tx,
        ));

        Self {
            events: Some(events_tx),
            state: state_rx,
            notices: notice_rx,
            task,
        }
    }

    /// Sender half for the identity provider's event stream.
    ///
    /// Returns `None` after detach.
    #[must_use]
    pub fn events(&self) -> Option<mpsc::Sender<SessionEvent>> {
        self.events.clone()
    }

    /// Current published state (cheap clone of the watch value).
    #[must_use]
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Watch receiver for consumers that need change notifications.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<AuthState> {
        self.state.clone()
    }

    /// Receive the next one-shot notice, if any is pending.
    pub fn try_notice(&mut self) -> Option<SessionNotice> {
        self.notices.try_recv().ok()
    }

    /// Wait for the in-flight resolution (if any) to settle.
    ///
    /// Test and shutdown helper: resolves when the state leaves `loading`.
    pub async fn settled(&mut self) -> AuthState {
        let mut rx = self.state.clone();
        loop {
            let current = rx.borrow().clone();
            if !current.loading() {
                return current;
            }
            if rx.changed().await.is_err() {
                return self.state();
            }
        }
    }

    /// Detach from the event stream. Idempotent; also invoked on drop.
    pub fn detach(&mut self) {
        if self.events.take().is_some() {
            // Dropping the sender ends the run loop; abort covers a loop
            // blocked on an in-flight resolution.
            self.task.abort();
        }
    }
}

impl Drop for SessionContext {
    fn drop(&mut self) {
        self.detach();
    }
}

#[allow(clippy::too_many_lines)]
async fn run<D, S>(
    directory: D,
    sign_out: S,
    required_role: Option<Role>,
    mut events: mpsc::Receiver<SessionEvent>,
    state: watch::Sender<AuthState>,
    notices: mpsc::Sender<SessionNotice>,
) where
    D: ProfileDirectory,
    S: SignOut,
{
    // Bumped per event; a resolution is applied only if its tag matches.
    let mut epoch: u64 = 0;
    // Redirect side effects happen at most once per mount.
    let mut initial_load = true;
    let mut inflight: FuturesUnordered<ResolutionFuture> = FuturesUnordered::new();

    loop {
        tokio::select! {
            maybe_event = events.recv() => {
                let Some(event) = maybe_event else { break };
                epoch += 1;
                match event {
                    SessionEvent::SignedOut => {
                        let _ = state.send(AuthState::Unauthenticated);
                    }
                    SessionEvent::SignedIn(identity) => {
                        if !identity.email_verified {
                            // Unverified: sign out before any role resolution.
                            sign_out.sign_out(&identity.id).await;
                            let _ = state.send(AuthState::Unauthenticated);
                            let _ = notices.send(SessionNotice::EmailUnverified).await;
                            continue;
                        }

                        let _ = state.send(AuthState::Resolving(identity.clone()));
                        let directory = directory.clone();
                        let tag = epoch;
                        inflight.push(Box::pin(async move {
                            let result = directory.fetch_profile(&identity.id).await;
                            (tag, identity, result)
                        }));
                    }
                }
            }
            Some((tag, identity, result)) = inflight.next(), if !inflight.is_empty() => {
                if tag != epoch {
                    // Superseded by a later event; never let an earlier
                    // resolution overwrite a later one.
                    continue;
                }

                match result {
                    Ok(Some(profile)) => {
                        if required_role.is_some_and(|required| profile.role != required) {
                            sign_out.sign_out(&identity.id).await;
                            let _ = state.send(AuthState::Unauthenticated);
                            let _ = notices.send(SessionNotice::AccessDenied).await;
                            continue;
                        }

                        let user = CurrentUser {
                            id: identity.id,
                            email: identity.email,
                            role: profile.role,
                        };
                        let home = user.home_route();
                        let _ = state.send(AuthState::Resolved(user));
                        if initial_load {
                            initial_load = false;
                            let _ = notices.send(SessionNotice::RedirectTo(home)).await;
                        }
                    }
                    Ok(None) => {
                        sign_out.sign_out(&identity.id).await;
                        let _ = state.send(AuthState::Unauthenticated);
                        let _ = notices.send(SessionNotice::AccountNotFound).await;
                    }
                    Err(err) => {
                        warn!(error = %err, "profile lookup failed, failing closed");
                        sign_out.sign_out(&identity.id).await;
                        let _ = state.send(AuthState::Unauthenticated);
                        let _ = notices.send(SessionNotice::LookupFailed).await;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use chrono::Utc;
    use shoptax_core::Email;

    fn identity(id: &str, verified: bool) -> Identity {
        Identity {
            id: IdentityId::new(id),
            email: Email::parse(&format!("{id}@example.com")).unwrap(),
            email_verified: verified,
        }
    }

    fn profile(id: &str, role: Role) -> Profile {
        Profile {
            identity_id: IdentityId::new(id),
            full_name: "Test User".to_string(),
            role,
            country: "PK".to_string(),
            country_name: "Pakistan".to_string(),
            city: None,
            location: crate::models::ProfileLocation {
                country: shoptax_core::LatLng::new(30.3753, 69.3451).unwrap(),
                city: None,
            },
            status: shoptax_core::ProfileStatus::Active,
            created_at: Utc::now(),
        }
    }

    /// Directory mock: per-identity (delay, outcome) table plus a fetch
    /// counter so tests can assert how many lookups were dispatched.
    #[derive(Clone)]
    struct MockDirectory {
        entries: Arc<Vec<(String, Duration, Result<Option<Role>, ()>)>>,
        fetches: Arc<AtomicUsize>,
    }

    impl MockDirectory {
        fn new(entries: Vec<(&str, Duration, Result<Option<Role>, ()>)>) -> Self {
            Self {
                entries: Arc::new(
                    entries
                        .into_iter()
                        .map(|(id, d, r)| (id.to_string(), d, r))
                        .collect(),
                ),
                fetches: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    impl ProfileDirectory for MockDirectory {
        async fn fetch_profile(
            &self,
            id: &IdentityId,
        ) -> Result<Option<Profile>, BackendError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            let entry = self
                .entries
                .iter()
                .find(|(eid, _, _)| eid == id.as_str())
                .cloned();
            match entry {
                Some((eid, delay, outcome)) => {
                    tokio::time::sleep(delay).await;
                    match outcome {
                        Ok(Some(role)) => Ok(Some(profile(&eid, role))),
                        Ok(None) => Ok(None),
                        Err(()) => Err(BackendError::Api {
                            status: 500,
                            message: "boom".to_string(),
                        }),
                    }
                }
                None => Ok(None),
            }
        }
    }

    #[derive(Clone, Default)]
    struct MockSignOut {
        calls: Arc<AtomicUsize>,
    }

    impl MockSignOut {
        fn count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl SignOut for MockSignOut {
        async fn sign_out(&self, _id: &IdentityId) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_later_resolution_wins_over_earlier_slow_one() {
        // First identity's fetch is slow, second's is fast; the slow
        // completion arrives after the fast one and must be discarded.
        let directory = MockDirectory::new(vec![
            ("slow", Duration::from_millis(500), Ok(Some(Role::Admin))),
            ("fast", Duration::from_millis(10), Ok(Some(Role::ShopOwner))),
        ]);
        let sign_out = MockSignOut::default();
        let mut ctx = SessionContext::attach(directory, sign_out, None);
        let events = ctx.events().unwrap();

        events
            .send(SessionEvent::SignedIn(identity("slow", true)))
            .await
            .unwrap();
        // Give the loop a moment to dispatch the first fetch before the
        // second event supersedes it.
        tokio::time::sleep(Duration::from_millis(1)).await;
        events
            .send(SessionEvent::SignedIn(identity("fast", true)))
            .await
            .unwrap();

        let state = ctx.settled().await;
        assert_eq!(state.role(), Some(Role::ShopOwner));

        // Let the slow fetch complete; published role must not change.
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(ctx.state().role(), Some(Role::ShopOwner));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unverified_identity_never_reaches_role_resolution() {
        let directory = MockDirectory::new(vec![(
            "u1",
            Duration::from_millis(1),
            Ok(Some(Role::Admin)),
        )]);
        let sign_out = MockSignOut::default();
        let mut ctx = SessionContext::attach(directory.clone(), sign_out.clone(), None);
        let events = ctx.events().unwrap();

        events
            .send(SessionEvent::SignedIn(identity("u1", false)))
            .await
            .unwrap();

        let state = ctx.settled().await;
        assert_eq!(state, AuthState::Unauthenticated);
        assert_eq!(state.role(), None);
        // Sign-out happened before any profile fetch was dispatched.
        assert_eq!(directory.fetch_count(), 0);
        assert_eq!(sign_out.count(), 1);
        assert_eq!(ctx.try_notice(), Some(SessionNotice::EmailUnverified));
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_profile_is_fatal() {
        let directory =
            MockDirectory::new(vec![("ghost", Duration::from_millis(1), Ok(None))]);
        let sign_out = MockSignOut::default();
        let mut ctx = SessionContext::attach(directory, sign_out.clone(), None);
        let events = ctx.events().unwrap();

        events
            .send(SessionEvent::SignedIn(identity("ghost", true)))
            .await
            .unwrap();

        assert_eq!(ctx.settled().await, AuthState::Unauthenticated);
        assert_eq!(sign_out.count(), 1);
        assert_eq!(ctx.try_notice(), Some(SessionNotice::AccountNotFound));
    }

    #[tokio::test(start_paused = true)]
    async fn test_role_restricted_consumer_denies_other_roles() {
        let directory = MockDirectory::new(vec![(
            "owner",
            Duration::from_millis(1),
            Ok(Some(Role::ShopOwner)),
        )]);
        let sign_out = MockSignOut::default();
        let mut ctx =
            SessionContext::attach(directory, sign_out.clone(), Some(Role::Admin));
        let events = ctx.events().unwrap();

        events
            .send(SessionEvent::SignedIn(identity("owner", true)))
            .await
            .unwrap();

        assert_eq!(ctx.settled().await, AuthState::Unauthenticated);
        assert_eq!(sign_out.count(), 1);
        assert_eq!(ctx.try_notice(), Some(SessionNotice::AccessDenied));
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_failure_fails_closed() {
        let directory =
            MockDirectory::new(vec![("u1", Duration::from_millis(1), Err(()))]);
        let sign_out = MockSignOut::default();
        let mut ctx = SessionContext::attach(directory, sign_out.clone(), None);
        let events = ctx.events().unwrap();

        events
            .send(SessionEvent::SignedIn(identity("u1", true)))
            .await
            .unwrap();

        assert_eq!(ctx.settled().await, AuthState::Unauthenticated);
        assert_eq!(sign_out.count(), 1);
        assert_eq!(ctx.try_notice(), Some(SessionNotice::LookupFailed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_redirect_emitted_once_per_mount() {
        let directory = MockDirectory::new(vec![(
            "admin",
            Duration::from_millis(1),
            Ok(Some(Role::Admin)),
        )]);
        let sign_out = MockSignOut::default();
        let mut ctx = SessionContext::attach(directory, sign_out, None);
        let events = ctx.events().unwrap();

        // Initial login, then a token refresh re-resolving the same session.
        events
            .send(SessionEvent::SignedIn(identity("admin", true)))
            .await
            .unwrap();
        ctx.settled().await;
        events
            .send(SessionEvent::SignedIn(identity("admin", true)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(ctx.state().role(), Some(Role::Admin));
        assert_eq!(ctx.try_notice(), Some(SessionNotice::RedirectTo("/admin")));
        assert_eq!(ctx.try_notice(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_signed_out_clears_state() {
        let directory = MockDirectory::new(vec![(
            "u1",
            Duration::from_millis(1),
            Ok(Some(Role::ShopOwner)),
        )]);
        let sign_out = MockSignOut::default();
        let mut ctx = SessionContext::attach(directory, sign_out, None);
        let events = ctx.events().unwrap();

        events
            .send(SessionEvent::SignedIn(identity("u1", true)))
            .await
            .unwrap();
        assert_eq!(ctx.settled().await.role(), Some(Role::ShopOwner));

        events.send(SessionEvent::SignedOut).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(ctx.state(), AuthState::Unauthenticated);
    }

    #[tokio::test(start_paused = true)]
    async fn test_detach_is_idempotent() {
        let directory = MockDirectory::new(vec![]);
        let sign_out = MockSignOut::default();
        let mut ctx = SessionContext::attach(directory, sign_out, None);

        ctx.detach();
        ctx.detach();
        assert!(ctx.events().is_none());
    }
}
