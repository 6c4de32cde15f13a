//! Wires one app's store, dispatcher, renderer and data source into a page
//! that turns interactions into frames.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::adapter::DataSource;
use crate::dispatch::{
    Debouncer, Dispatcher, Effect, Interaction, NoticeLevel, Notification, Outcome, Payload,
    SAVE_FAILED,
};
use crate::error::{AppError, FetchError};
use crate::render::{render_append, render_list, Frame, ItemView};
use crate::state::{Entity, Extra, FetchApplied, FetchTicket, Store, ViewMode};

pub type KeyOf<A> = <<A as App>::Entity as Entity>::FilterKey;
pub type AppOutcome<A> = Outcome<KeyOf<A>>;
pub type AppDispatcher<A> = Dispatcher<A, KeyOf<A>>;

/// One single-page app built on a `Store`.
pub trait App: Send + Sized + 'static {
    type Entity: Entity;
    type Extra: Extra;
    type View: ItemView<Self::Entity, Self::Extra>;

    /// When true, query and filter changes re-run the data source search;
    /// otherwise the store's items are the catalog and filtering is local.
    const REMOTE_QUERY: bool;

    fn store(&self) -> &Store<Self::Entity, Self::Extra>;

    fn store_mut(&mut self) -> &mut Store<Self::Entity, Self::Extra>;

    fn source(&self) -> Arc<dyn DataSource<Self::Entity>>;

    fn view(&self) -> &Self::View;

    /// App-specific actions, merged over the built-in ones.
    fn actions() -> AppDispatcher<Self>;

    /// Extra regions besides the main list (cart panel, summary, ...).
    fn render_panels(&self) -> Vec<Frame> {
        Vec::new()
    }

    /// Called when a `Lookup` effect resolves.
    fn lookup_completed(
        &mut self,
        id: &str,
        result: Result<Option<Self::Entity>, FetchError>,
    ) -> AppOutcome<Self> {
        match result {
            Ok(Some(item)) => match self.store_mut().add_item(item) {
                Ok(_) => Outcome::render().notify(NoticeLevel::Success, format!("Added {id}")),
                Err(err) => Outcome::none().notify(NoticeLevel::Warning, err.to_string()),
            },
            Ok(None) => Outcome::none().notify(NoticeLevel::Warning, format!("{id} was not found")),
            Err(err) => Outcome::none().notify(NoticeLevel::Error, AppError::from(err).to_string()),
        }
    }
}

/// Starts a load from the source. Apps that filter locally always fetch the
/// whole catalog, so a reload never narrows their items to the current query.
fn begin_load<A: App>(app: &mut A) -> FetchTicket<KeyOf<A>> {
    if A::REMOTE_QUERY {
        app.store_mut().begin_fetch()
    } else {
        app.store_mut().begin_catalog_fetch()
    }
}

fn refresh<A: App>(app: &mut A) -> AppOutcome<A> {
    if A::REMOTE_QUERY {
        let ticket = begin_load(app);
        Outcome::none().with(Effect::Fetch(ticket))
    } else {
        Outcome::render()
    }
}

fn on_search<A: App>(app: &mut A, p: &Payload) -> Result<AppOutcome<A>, AppError> {
    let query = p.get("value").unwrap_or_default().to_string();
    let m = app
        .store_mut()
        .set_filter(<A::Entity as Entity>::SEARCH, query);
    Ok(refresh(app).saved(m.persisted))
}

fn on_filter<A: App>(app: &mut A, p: &Payload) -> Result<AppOutcome<A>, AppError> {
    let key: KeyOf<A> = p.parse("key")?;
    let value = p.get("value").unwrap_or_default().to_string();
    let m = app.store_mut().set_filter(key, value);
    Ok(refresh(app).saved(m.persisted))
}

fn on_clear_filters<A: App>(app: &mut A, _: &Payload) -> Result<AppOutcome<A>, AppError> {
    let m = app.store_mut().clear_filters();
    Ok(refresh(app).saved(m.persisted))
}

fn on_load_more<A: App>(app: &mut A, _: &Payload) -> Result<AppOutcome<A>, AppError> {
    let previous_page = app.store().state().pagination.page;
    if app.store_mut().next_page().value {
        Ok(Outcome::none().with(Effect::AppendPage { previous_page }))
    } else {
        Ok(Outcome::none())
    }
}

/// Reloads only after a failed fetch; otherwise the items may carry user
/// changes a refetch would overwrite.
fn on_retry<A: App>(app: &mut A, _: &Payload) -> Result<AppOutcome<A>, AppError> {
    if app.store().state().ui.error.is_none() {
        return Ok(Outcome::none());
    }
    let ticket = begin_load(app);
    Ok(Outcome::none().with(Effect::Fetch(ticket)))
}

fn on_view_mode<A: App>(app: &mut A, p: &Payload) -> Result<AppOutcome<A>, AppError> {
    let mode: ViewMode = p.parse("mode")?;
    if app.store().state().ui.view_mode == mode {
        return Ok(Outcome::none());
    }
    let m = app.store_mut().set_view_mode(mode);
    Ok(Outcome::render().saved(m.persisted))
}

/// Built-in actions every page understands.
pub fn builtin_actions<A: App>() -> AppDispatcher<A> {
    Dispatcher::new()
        .on("search", on_search::<A>)
        .debounced("search")
        .on("filter", on_filter::<A>)
        .on("clear-filters", on_clear_filters::<A>)
        .on("load-more", on_load_more::<A>)
        .on("retry", on_retry::<A>)
        .on("view-mode", on_view_mode::<A>)
}

/// Owns one app instance and drives it from interactions.
pub struct Page<A: App> {
    app: A,
    dispatcher: AppDispatcher<A>,
    debouncer: Debouncer<(String, Payload)>,
    debounced_rx: mpsc::UnboundedReceiver<(String, Payload)>,
}

impl<A: App> Page<A> {
    pub fn new(app: A, quiet_period: Duration) -> Self {
        let dispatcher = builtin_actions::<A>().merge(A::actions());
        let (debouncer, debounced_rx) = Debouncer::new(quiet_period);
        Self {
            app,
            dispatcher,
            debouncer,
            debounced_rx,
        }
    }

    pub fn app(&self) -> &A {
        &self.app
    }

    /// Direct mutable access for shell-driven work such as timers.
    pub fn app_mut(&mut self) -> &mut A {
        &mut self.app
    }

    pub fn dispatcher(&self) -> &AppDispatcher<A> {
        &self.dispatcher
    }

    /// Initial frames: loads from the source when nothing was restored.
    pub async fn start(&mut self) -> Vec<Frame> {
        if self.app.store().state().items.is_empty() {
            let ticket = begin_load(&mut self.app);
            let mut frames = Vec::new();
            self.run_fetch(ticket, &mut frames).await;
            frames
        } else {
            self.render_all()
        }
    }

    /// Handles one interaction. Debounced actions return no frames; their
    /// coalesced payload arrives through `next_debounced`.
    pub async fn handle(&mut self, interaction: &Interaction) -> Vec<Frame> {
        let Some((action, payload)) = interaction.resolve() else {
            tracing::trace!(target: "pagestate.dispatch", "ignoring interaction without action");
            return Vec::new();
        };
        if self.dispatcher.is_debounced(&action) {
            self.debouncer.push((action, payload));
            return Vec::new();
        }
        self.run(&action, &payload).await
    }

    /// Waits for the next coalesced action without running it. Cancel-safe,
    /// so shells can use it inside `tokio::select!`.
    pub async fn recv_debounced(&mut self) -> Option<(String, Payload)> {
        self.debounced_rx.recv().await
    }

    /// Waits for the next debounced action and runs it.
    pub async fn next_debounced(&mut self) -> Option<Vec<Frame>> {
        let (action, payload) = self.recv_debounced().await?;
        Some(self.run(&action, &payload).await)
    }

    /// Runs `action` immediately, bypassing delegation and debouncing.
    pub async fn run(&mut self, action: &str, payload: &Payload) -> Vec<Frame> {
        let outcome = self
            .dispatcher
            .dispatch_action(&mut self.app, action, payload)
            .into_outcome();
        self.apply(outcome).await
    }

    async fn apply(&mut self, outcome: AppOutcome<A>) -> Vec<Frame> {
        let mut frames = Vec::new();
        let mut pending = vec![outcome];
        while let Some(outcome) = pending.pop() {
            for effect in outcome.effects {
                match effect {
                    Effect::Render => frames.extend(self.render_all()),
                    Effect::AppendPage { previous_page } => {
                        frames.push(self.render_append(previous_page));
                    }
                    Effect::Patch(patch) => frames.push(Frame::Patch(patch)),
                    Effect::Fetch(ticket) => self.run_fetch(ticket, &mut frames).await,
                    Effect::Lookup { id } => {
                        pending.push(self.run_lookup(&id).await);
                    }
                }
            }
            frames.extend(outcome.notifications.into_iter().map(Frame::Toast));
        }
        frames
    }

    async fn run_fetch(&mut self, ticket: FetchTicket<KeyOf<A>>, frames: &mut Vec<Frame>) {
        frames.extend(self.render_all());
        let source = self.app.source();
        let result = source.search(&ticket.query, &ticket.filters).await;
        let applied = self.app.store_mut().complete_fetch(&ticket, result);
        tracing::debug!(target: "pagestate.adapter", source = source.name(), ?applied, "fetch settled");
        if applied != FetchApplied::Stale || !self.app.store().state().ui.is_loading {
            frames.extend(self.render_all());
        }
        if let FetchApplied::Applied {
            persisted: false, ..
        } = applied
        {
            frames.push(Self::toast(NoticeLevel::Warning, SAVE_FAILED));
        }
    }

    async fn run_lookup(&mut self, id: &str) -> AppOutcome<A> {
        let parsed = id.parse::<<A::Entity as Entity>::Id>();
        let Ok(parsed) = parsed else {
            return Outcome::none().notify(NoticeLevel::Warning, format!("invalid id {id}"));
        };
        let result = self.app.source().get_by_id(&parsed).await;
        self.app.lookup_completed(id, result)
    }

    /// Full render of the list region plus the app's panels.
    pub fn render_all(&self) -> Vec<Frame> {
        let view = self.app.view();
        let mut frames = vec![Frame::Replace {
            target: view.list_id().to_string(),
            markup: render_list(view, self.app.store().state()),
        }];
        frames.extend(self.app.render_panels());
        frames
    }

    fn render_append(&self, previous_page: u32) -> Frame {
        let view = self.app.view();
        let state = self.app.store().state();
        Frame::Append {
            target: view.items_id(),
            markup: render_append(view, state, previous_page),
            has_more: state.pagination.has_more,
        }
    }

    /// Toast helper for shells reporting their own failures.
    pub fn toast(level: NoticeLevel, message: impl Into<String>) -> Frame {
        Frame::Toast(Notification::new(level, message))
    }
}
