//! Character roster and ascension material planner.

pub mod ascension;
pub mod catalog;
pub mod fixtures;
pub mod model;
pub mod view;

pub use ascension::{ascension_cost, AscensionCost, AscensionGoal};
pub use catalog::GenshinCatalog;
pub use model::{Character, CharacterFilter, PlannerExtra};
pub use view::PlannerView;

use std::sync::Arc;

use pagestate_core::adapter::DataSource;
use pagestate_core::dispatch::{Dispatcher, NoticeLevel, Outcome, Payload};
use pagestate_core::error::AppError;
use pagestate_core::page::{App, AppDispatcher, AppOutcome};
use pagestate_core::render::Frame;
use pagestate_core::state::{Mutation, Store};

pub const STORAGE_KEY: &str = "genshin-planner";

pub struct Planner {
    store: Store<Character, PlannerExtra>,
    source: Arc<dyn DataSource<Character>>,
    view: PlannerView,
}

impl Planner {
    pub fn new(
        store: Store<Character, PlannerExtra>,
        source: Arc<dyn DataSource<Character>>,
    ) -> Self {
        Self {
            store,
            source,
            view: PlannerView,
        }
    }

    /// Records a level goal for a character on the roster.
    pub fn set_goal(
        &mut self,
        id: &str,
        current_level: u32,
        target_level: u32,
    ) -> Result<Mutation<AscensionCost>, AppError> {
        if !self.store.state().is_selected(&id.to_string()) {
            return Err(AppError::validation(format!(
                "add {id} to your roster before planning"
            )));
        }
        let goal = AscensionGoal::new(current_level, target_level)?;
        Ok(self.store.update_extra(|extra| {
            extra.goals.insert(id.to_string(), goal);
            goal.cost()
        }))
    }

    /// Materials still needed across the whole roster.
    pub fn total_cost(&self) -> AscensionCost {
        let state = self.store.state();
        state.extra.total_cost(&state.selected)
    }
}

impl App for Planner {
    type Entity = Character;
    type Extra = PlannerExtra;
    type View = PlannerView;

    const REMOTE_QUERY: bool = true;

    fn store(&self) -> &Store<Character, PlannerExtra> {
        &self.store
    }

    fn store_mut(&mut self) -> &mut Store<Character, PlannerExtra> {
        &mut self.store
    }

    fn source(&self) -> Arc<dyn DataSource<Character>> {
        Arc::clone(&self.source)
    }

    fn view(&self) -> &PlannerView {
        &self.view
    }

    fn actions() -> AppDispatcher<Self> {
        Dispatcher::new()
            .on("toggle-character", on_toggle_character)
            .on("set-goal", on_set_goal)
    }

    fn render_panels(&self) -> Vec<Frame> {
        vec![Frame::Replace {
            target: view::PLAN_ID.to_string(),
            markup: view::render_plan(self.store.state(), &self.total_cost()),
        }]
    }
}

fn on_toggle_character(app: &mut Planner, p: &Payload) -> Result<AppOutcome<Planner>, AppError> {
    let id = p.require("id")?.to_string();
    let m = app.store_mut().toggle_selection(id);
    Ok(Outcome::render().saved(m.persisted))
}

fn on_set_goal(app: &mut Planner, p: &Payload) -> Result<AppOutcome<Planner>, AppError> {
    let id = p.require("id")?.to_string();
    let cost = app.set_goal(&id, p.parse("current")?, p.parse("target")?)?;
    let summary = if cost.value.is_zero() {
        "No ascension needed for this goal".to_string()
    } else {
        format!("Goal saved: {} mora needed", cost.value.mora)
    };
    Ok(Outcome::render()
        .notify(NoticeLevel::Info, summary)
        .saved(cost.persisted))
}
