//! Progressive-overload workout log with a session timer.

pub mod model;
pub mod timer;
pub mod view;

pub use model::{total_volume, ExerciseSet, SetFilter, WorkoutExtra};
pub use timer::{format_elapsed, WorkoutTimer, TIMER_ID};
pub use view::WorkoutView;

use std::sync::Arc;
use uuid::Uuid;

use pagestate_core::adapter::DataSource;
use pagestate_core::clock::Clock;
use pagestate_core::dispatch::{Dispatcher, Effect, NoticeLevel, Outcome, Payload};
use pagestate_core::error::AppError;
use pagestate_core::page::{App, AppDispatcher, AppOutcome};
use pagestate_core::render::{Frame, TextPatch};
use pagestate_core::state::{Mutation, Store};

pub const STORAGE_KEY: &str = "overload_workouts";

pub struct Workout {
    store: Store<ExerciseSet, WorkoutExtra>,
    source: Arc<dyn DataSource<ExerciseSet>>,
    clock: Arc<dyn Clock>,
    view: WorkoutView,
}

impl Workout {
    pub fn new(
        store: Store<ExerciseSet, WorkoutExtra>,
        source: Arc<dyn DataSource<ExerciseSet>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            source,
            clock,
            view: WorkoutView,
        }
    }

    pub fn add_set(
        &mut self,
        exercise: &str,
        reps: u32,
        weight_kg: f64,
    ) -> Result<Mutation<Uuid>, AppError> {
        let set = ExerciseSet::new(exercise, reps, weight_kg)?;
        let id = set.id;
        let m = self.store.add_item(set)?;
        Ok(Mutation {
            value: id,
            persisted: m.persisted,
        })
    }

    pub fn toggle_complete(&mut self, id: &Uuid) -> Result<Mutation<bool>, AppError> {
        self.store.update_item(id, |set| {
            set.completed = !set.completed;
            Ok(set.completed)
        })
    }

    pub fn delete_set(&mut self, id: &Uuid) -> Result<Mutation<ExerciseSet>, AppError> {
        self.store.remove_item(id)
    }

    pub fn total_volume(&self) -> f64 {
        total_volume(&self.store.state().items)
    }

    /// Timer text for the current instant, or `None` while stopped.
    pub fn tick(&self) -> Option<TextPatch> {
        self.store.state().extra.timer.tick(self.clock.now())
    }
}

impl App for Workout {
    type Entity = ExerciseSet;
    type Extra = WorkoutExtra;
    type View = WorkoutView;

    const REMOTE_QUERY: bool = false;

    fn store(&self) -> &Store<ExerciseSet, WorkoutExtra> {
        &self.store
    }

    fn store_mut(&mut self) -> &mut Store<ExerciseSet, WorkoutExtra> {
        &mut self.store
    }

    fn source(&self) -> Arc<dyn DataSource<ExerciseSet>> {
        Arc::clone(&self.source)
    }

    fn view(&self) -> &WorkoutView {
        &self.view
    }

    fn actions() -> AppDispatcher<Self> {
        Dispatcher::new()
            .on("add-set", on_add_set)
            .on("toggle-complete", on_toggle_complete)
            .on("delete-set", on_delete_set)
            .on("timer-start", on_timer_start)
            .on("timer-stop", on_timer_stop)
            .on("timer-reset", on_timer_reset)
            .on("timer-tick", on_timer_tick)
    }

    fn render_panels(&self) -> Vec<Frame> {
        vec![Frame::Replace {
            target: view::SUMMARY_ID.to_string(),
            markup: view::render_summary(self.store.state(), self.clock.now()),
        }]
    }
}

fn on_add_set(app: &mut Workout, p: &Payload) -> Result<AppOutcome<Workout>, AppError> {
    let m = app.add_set(p.require("exercise")?, p.parse("reps")?, p.parse("weight")?)?;
    Ok(Outcome::render().saved(m.persisted))
}

fn on_toggle_complete(app: &mut Workout, p: &Payload) -> Result<AppOutcome<Workout>, AppError> {
    let m = app.toggle_complete(&p.parse("id")?)?;
    Ok(Outcome::render().saved(m.persisted))
}

fn on_delete_set(app: &mut Workout, p: &Payload) -> Result<AppOutcome<Workout>, AppError> {
    let removed = app.delete_set(&p.parse("id")?)?;
    Ok(Outcome::render()
        .notify(NoticeLevel::Info, format!("Deleted {} set", removed.value.exercise))
        .saved(removed.persisted))
}

fn on_timer_start(app: &mut Workout, _: &Payload) -> Result<AppOutcome<Workout>, AppError> {
    let now = app.clock.now();
    let m = app.store_mut().update_extra(|x| x.timer.start(now));
    if !m.value {
        return Ok(Outcome::none());
    }
    Ok(Outcome::render().saved(m.persisted))
}

fn on_timer_stop(app: &mut Workout, _: &Payload) -> Result<AppOutcome<Workout>, AppError> {
    let now = app.clock.now();
    let m = app.store_mut().update_extra(|x| x.timer.stop(now));
    if !m.value {
        return Ok(Outcome::none());
    }
    Ok(Outcome::render().saved(m.persisted))
}

fn on_timer_reset(app: &mut Workout, _: &Payload) -> Result<AppOutcome<Workout>, AppError> {
    let m = app.store_mut().update_extra(|x| x.timer.reset());
    Ok(Outcome::render().saved(m.persisted))
}

/// Fired once a second by the shell; touches only the timer text.
fn on_timer_tick(app: &mut Workout, _: &Payload) -> Result<AppOutcome<Workout>, AppError> {
    Ok(match app.tick() {
        Some(patch) => Outcome::none().with(Effect::Patch(patch)),
        None => Outcome::none(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use pagestate_core::adapter::FixtureSource;
    use pagestate_core::clock::ManualClock;
    use pagestate_core::storage::MemoryKv;
    use pretty_assertions::assert_eq;

    fn workout() -> (Arc<ManualClock>, Workout) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 6, 3, 18, 0, 0).unwrap(),
        ));
        let store = Store::new(Arc::new(MemoryKv::new()), STORAGE_KEY, 12);
        let app = Workout::new(
            store,
            Arc::new(FixtureSource::<ExerciseSet>::new("log", Vec::new())),
            clock.clone(),
        );
        (clock, app)
    }

    #[test]
    fn sets_lifecycle_and_volume() {
        let (_, mut app) = workout();
        let a = app.add_set("Deadlift", 5, 100.0).unwrap().value;
        let b = app.add_set("Deadlift", 5, 110.0).unwrap().value;
        assert_eq!(app.total_volume(), 0.0);

        assert!(app.toggle_complete(&a).unwrap().value);
        assert_eq!(app.total_volume(), 500.0);
        app.toggle_complete(&b).unwrap();
        assert_eq!(app.total_volume(), 1050.0);

        app.delete_set(&a).unwrap();
        assert_eq!(app.total_volume(), 550.0);
        assert!(matches!(app.delete_set(&a), Err(AppError::NotFound(_))));
    }

    #[test]
    fn add_set_action_validates_numbers() {
        let (_, mut app) = workout();
        let outcome = Workout::actions()
            .dispatch_action(
                &mut app,
                "add-set",
                &Payload::new()
                    .with("exercise", "Row")
                    .with("reps", "0")
                    .with("weight", "40"),
            )
            .into_outcome();
        assert_eq!(outcome.notifications[0].level, NoticeLevel::Warning);
        assert!(app.store().state().items.is_empty());
    }

    #[test]
    fn tick_patches_only_the_timer_text() {
        let (clock, mut app) = workout();
        let actions = Workout::actions();
        let idle = actions
            .dispatch_action(&mut app, "timer-tick", &Payload::new())
            .into_outcome();
        assert!(idle.is_empty());

        actions.dispatch_action(&mut app, "timer-start", &Payload::new());
        clock.advance(Duration::seconds(75));
        let tick = actions
            .dispatch_action(&mut app, "timer-tick", &Payload::new())
            .into_outcome();
        assert_eq!(
            tick.effects,
            vec![Effect::Patch(TextPatch::new(TIMER_ID, "01:15"))]
        );
        assert!(tick.notifications.is_empty());
    }
}
