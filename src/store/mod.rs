//! Client Store
//!
//! Uses Leptos reactive_stores for fine-grained reactivity. `AppState` holds
//! every entity collection of the signed-in user; `ClientStore` is the only
//! writer. Mutations apply locally first, then go to the backend:
//!
//! - `add` waits for the server record (ids are server-assigned)
//! - `update` / `remove` change local state before the first await and
//!   report the backend outcome through a `MutationReceipt`
//! - project progress is recomputed whenever tasks change

mod collections;
mod ledger;
mod ops;

use std::sync::Arc;

use leptos::prelude::*;
use reactive_stores::Store;
use tokio::sync::Mutex;

use crate::config::Settings;
use crate::domain::progress::{self, Tally};
use crate::domain::{
    Asset, AutomationRule, CodeSnippet, DomainError, DomainResult, Note, Project, Resource, Stakeholder,
    Task, Transaction, Whiteboard,
};
use crate::gateway::{AuthProvider, RemoteGateway, RestBackend, UserIdentity};
use crate::mapper::decode_all;
use crate::router::View;

pub use collections::{Collection, Placement};
pub use ledger::{MutationId, MutationReceipt, MutationStatus};
use ledger::{Ledger, Undo};

/// Application state with field-level reactivity
#[derive(Clone, Debug, Default, Store)]
pub struct AppState {
    pub projects: Vec<Project>,
    pub tasks: Vec<Task>,
    /// Project notes and loose ideas
    pub notes: Vec<Note>,
    pub assets: Vec<Asset>,
    pub stakeholders: Vec<Stakeholder>,
    pub resources: Vec<Resource>,
    pub automations: Vec<AutomationRule>,
    pub transactions: Vec<Transaction>,
    pub whiteboards: Vec<Whiteboard>,
    pub snippets: Vec<CodeSnippet>,
    /// Signed-in user; `None` gates every data operation
    pub session: Option<UserIdentity>,
    /// Whether backend settings were supplied
    pub configured: bool,
    pub view: View,
}

/// Type alias for the store
pub type AppStore = Store<AppState>;

/// Single source of truth for client-side data, constructed once and
/// passed to whoever needs it
#[derive(Clone)]
pub struct ClientStore {
    state: AppStore,
    gateway: Option<Arc<dyn RemoteGateway>>,
    auth: Option<Arc<dyn AuthProvider>>,
    ledger: Arc<Mutex<Ledger>>,
}

impl ClientStore {
    pub fn new(gateway: Arc<dyn RemoteGateway>, auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            state: Store::new(AppState { configured: true, ..Default::default() }),
            gateway: Some(gateway),
            auth: Some(auth),
            ledger: Arc::new(Mutex::new(Ledger::default())),
        }
    }

    /// One backend serving both data and auth
    pub fn with_backend<B>(backend: Arc<B>) -> Self
    where
        B: RemoteGateway + AuthProvider + 'static,
    {
        Self::new(backend.clone(), backend)
    }

    /// No backend settings: every data operation fails with `NotConfigured`
    pub fn unconfigured() -> Self {
        Self {
            state: Store::new(AppState::default()),
            gateway: None,
            auth: None,
            ledger: Arc::new(Mutex::new(Ledger::default())),
        }
    }

    /// Build from persisted settings
    pub fn connect(settings: &Settings) -> Self {
        match settings.backend() {
            Some(config) => {
                log::info!("[STORE] Using backend at {}", config.url);
                Self::with_backend(Arc::new(RestBackend::new(config)))
            }
            None => {
                log::info!("[STORE] Backend not configured, running offline");
                Self::unconfigured()
            }
        }
    }

    /// Reactive handle for views
    pub fn state(&self) -> AppStore {
        self.state
    }

    pub fn is_configured(&self) -> bool {
        self.state.configured().get_untracked()
    }

    pub fn session(&self) -> Option<UserIdentity> {
        self.state.session().get_untracked()
    }

    // ========================
    // Navigation
    // ========================

    pub fn navigate(&self, view: View) {
        log::debug!("[ROUTER] -> {}", view.path());
        self.state.view().set(view);
    }

    pub fn current_view(&self) -> View {
        self.state.view().get_untracked()
    }

    // ========================
    // Reads
    // ========================

    /// Snapshot of a whole collection
    pub fn all<E: Collection>(&self) -> Vec<E> {
        E::read(&self.state, |items| items.clone())
    }

    pub fn get<E: Collection>(&self, id: &str) -> Option<E> {
        E::find(&self.state, id)
    }

    // ========================
    // Mutations
    // ========================

    /// Data operations need a backend and a signed-in user
    fn gate(&self) -> DomainResult<Arc<dyn RemoteGateway>> {
        let gateway = match &self.gateway {
            Some(gateway) if self.is_configured() => gateway.clone(),
            _ => return Err(DomainError::NotConfigured),
        };
        if self.session().is_none() {
            return Err(DomainError::Unauthenticated("Sign in to continue".into()));
        }
        Ok(gateway)
    }

    /// Insert through the backend, then place the server record locally.
    /// Nothing changes locally when the insert fails.
    pub async fn add<E: Collection>(&self, draft: E::Draft) -> DomainResult<E> {
        let gateway = self.gate()?;
        let row = gateway
            .insert(E::TABLE, E::draft_to_wire(&draft))
            .await
            .inspect_err(|e| log::warn!("[STORE] Insert into {} failed: {}", E::TABLE, e))?;
        let entity = E::from_wire(row)?;

        E::place(&self.state, entity.clone());
        if E::AFFECTS_PROGRESS {
            self.recompute_progress();
        }
        log::debug!("[STORE] Added {} {}", E::TABLE, entity.id());
        Ok(entity)
    }

    /// Merge `patch` locally right away, then send it. On success the server
    /// record replaces the local one; on failure the optimistic state stays
    /// and the receipt says `Failed`.
    pub async fn update<E: Collection>(&self, id: &str, patch: E::Patch) -> DomainResult<MutationReceipt> {
        let gateway = self.gate()?;
        let before = E::find(&self.state, id).ok_or_else(|| DomainError::NotFound(format!("{} {}", E::TABLE, id)))?;

        let mut after = before.clone();
        after.apply_patch(&patch);
        E::replace(&self.state, after);
        if E::AFFECTS_PROGRESS {
            self.recompute_progress();
        }

        let undo: Undo = Box::new(move |state: &AppStore| {
            E::replace(state, before);
        });
        let mutation = self.ledger.lock().await.begin(E::TABLE, id, undo);

        let receipt = match gateway.update(E::TABLE, id, E::patch_to_wire(&patch)).await {
            Ok(row) => {
                match E::from_wire(row) {
                    Ok(server) => {
                        // Removed meanwhile: stays removed
                        if E::replace(&self.state, server) && E::AFFECTS_PROGRESS {
                            self.recompute_progress();
                        }
                    }
                    Err(e) => log::warn!("[STORE] Keeping local {} {}, server row unreadable: {}", E::TABLE, id, e),
                }
                self.ledger.lock().await.confirm(mutation)
            }
            Err(e) => {
                log::warn!("[STORE] Update of {} {} failed: {}", E::TABLE, id, e);
                self.ledger.lock().await.fail(mutation, e.to_string())
            }
        };
        Ok(receipt)
    }

    /// Remove locally right away, then delete on the backend. Removing a
    /// project also drops its tasks from the local cache.
    pub async fn remove<E: Collection>(&self, id: &str) -> DomainResult<MutationReceipt> {
        let gateway = self.gate()?;
        let (index, before) = E::read(&self.state, |items| {
            items.iter().position(|item| item.id() == id).map(|i| (i, items[i].clone()))
        })
        .ok_or_else(|| DomainError::NotFound(format!("{} {}", E::TABLE, id)))?;

        E::write(&self.state, |items| items.retain(|item| item.id() != id));
        let dependents = E::detach_dependents(&self.state, id);
        if E::AFFECTS_PROGRESS || dependents.is_some() {
            self.recompute_progress();
        }

        let undo: Undo = Box::new(move |state: &AppStore| {
            E::write(state, |items| {
                if !items.iter().any(|item| item.id() == before.id()) {
                    let at = index.min(items.len());
                    items.insert(at, before);
                }
            });
            if let Some(restore) = dependents {
                restore(state);
            }
        });
        let mutation = self.ledger.lock().await.begin(E::TABLE, id, undo);

        let receipt = match gateway.delete(E::TABLE, id).await {
            Ok(()) => self.ledger.lock().await.confirm(mutation),
            Err(e) => {
                log::warn!("[STORE] Delete of {} {} failed: {}", E::TABLE, id, e);
                self.ledger.lock().await.fail(mutation, e.to_string())
            }
        };
        Ok(receipt)
    }

    /// Restore the local state from before a failed mutation
    pub async fn rollback(&self, mutation: MutationId) -> DomainResult<()> {
        let undo = self.ledger.lock().await.take_undo(mutation)?;
        undo(&self.state);
        self.recompute_progress();
        Ok(())
    }

    pub async fn mutation_status(&self, mutation: MutationId) -> Option<MutationStatus> {
        self.ledger.lock().await.status(mutation)
    }

    // ========================
    // Derived state
    // ========================

    /// Set every project's progress from the current task collection.
    /// Writes only when something changed.
    pub(crate) fn recompute_progress(&self) {
        // Tally first: the read guard must be gone before projects are written
        let tallies = progress::tally(&self.state.tasks().read_untracked());
        let percent = |project: &Project| tallies.get(&project.id).map_or(0, Tally::percent);

        let stale = self.state.projects().read_untracked().iter().any(|p| p.progress != percent(p));
        if stale {
            for project in self.state.projects().write().iter_mut() {
                project.progress = percent(&*project);
            }
        }
    }

    // ========================
    // Loading and session
    // ========================

    async fn load<E: Collection>(&self, gateway: &dyn RemoteGateway) {
        match gateway.select(E::TABLE, &E::load_query()).await {
            Ok(rows) => {
                let items: Vec<E> = decode_all(rows);
                log::debug!("[STORE] Loaded {} {}", items.len(), E::TABLE);
                E::write(&self.state, |current| *current = items);
            }
            Err(e) => log::warn!("[STORE] Failed to load {}: {}", E::TABLE, e),
        }
    }

    /// Fetch every collection. A table that fails to load keeps its current
    /// contents.
    pub async fn load_all(&self) -> DomainResult<()> {
        let gateway = self.gate()?;
        let gateway = gateway.as_ref();

        self.load::<Project>(gateway).await;
        self.load::<Task>(gateway).await;
        self.load::<Note>(gateway).await;
        self.load::<Asset>(gateway).await;
        self.load::<Stakeholder>(gateway).await;
        self.load::<Resource>(gateway).await;
        self.load::<AutomationRule>(gateway).await;
        self.load::<Transaction>(gateway).await;
        self.load::<Whiteboard>(gateway).await;
        self.load::<CodeSnippet>(gateway).await;

        self.recompute_progress();
        Ok(())
    }

    fn auth(&self) -> DomainResult<Arc<dyn AuthProvider>> {
        self.auth.clone().ok_or(DomainError::NotConfigured)
    }

    async fn start_session(&self, user: UserIdentity) {
        self.state.session().set(Some(user));
        if let Err(e) = self.load_all().await {
            log::warn!("[STORE] Initial load failed: {}", e);
        }
    }

    /// Sign in and load the user's data. The error's `Display` is the
    /// message for the login form.
    pub async fn sign_in(&self, email: &str, password: &str) -> DomainResult<UserIdentity> {
        let user = self.auth()?.sign_in(email, password).await?;
        log::info!("[STORE] Session started for {}", user.email);
        self.start_session(user.clone()).await;
        Ok(user)
    }

    pub async fn sign_up(&self, email: &str, password: &str, display_name: Option<&str>) -> DomainResult<UserIdentity> {
        let user = self.auth()?.sign_up(email, password, display_name).await?;
        log::info!("[STORE] Account created for {}", user.email);
        self.start_session(user.clone()).await;
        Ok(user)
    }

    /// Pick up a session the auth provider still holds
    pub async fn restore_session(&self) -> Option<UserIdentity> {
        let auth = self.auth().ok()?;
        let user = auth.current_user().await?;
        self.start_session(user.clone()).await;
        Some(user)
    }

    /// End the session and drop all cached data, even if the backend call fails
    pub async fn sign_out(&self) -> DomainResult<()> {
        let auth = self.auth()?;
        if let Err(e) = auth.sign_out().await {
            log::warn!("[STORE] Sign-out request failed: {}", e);
        }
        self.clear();
        self.ledger.lock().await.clear();
        Ok(())
    }

    fn clear(&self) {
        self.state.projects().write().clear();
        self.state.tasks().write().clear();
        self.state.notes().write().clear();
        self.state.assets().write().clear();
        self.state.stakeholders().write().clear();
        self.state.resources().write().clear();
        self.state.automations().write().clear();
        self.state.transactions().write().clear();
        self.state.whiteboards().write().clear();
        self.state.snippets().write().clear();
        self.state.session().set(None);
        self.state.view().set(View::Dashboard);
    }
}
