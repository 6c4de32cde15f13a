use chrono::{DateTime, Utc};

use pagestate_core::render::{ItemView, Markup};
use pagestate_core::state::AppState;

use super::model::{total_volume, ExerciseSet, WorkoutExtra};
use super::timer::TIMER_ID;

pub const LIST_ID: &str = "set-list";
pub const SUMMARY_ID: &str = "workout-summary";

#[derive(Debug, Clone, Default)]
pub struct WorkoutView;

impl ItemView<ExerciseSet, WorkoutExtra> for WorkoutView {
    fn list_id(&self) -> &str {
        LIST_ID
    }

    fn render_item(&self, set: &ExerciseSet, _: &AppState<ExerciseSet, WorkoutExtra>) -> Markup {
        let id = set.id.to_string();
        let class = if set.completed { "set done" } else { "set" };
        Markup::new()
            .open("label", &[("class", class)])
            .open(
                "input",
                &[
                    ("type", "checkbox"),
                    ("data-action", "toggle-complete"),
                    ("data-id", id.as_str()),
                ],
            )
            .element("span", &[("class", "exercise")], &set.exercise)
            .element(
                "span",
                &[("class", "load")],
                &format!("{} × {} kg", set.reps, set.weight_kg),
            )
            .close("label")
            .element(
                "button",
                &[("data-action", "delete-set"), ("data-id", id.as_str())],
                "Delete",
            )
    }

    fn empty_message(&self, state: &AppState<ExerciseSet, WorkoutExtra>) -> String {
        if state.items.is_empty() {
            "No sets logged yet".to_string()
        } else {
            "No sets match the current filters".to_string()
        }
    }
}

pub fn render_summary(state: &AppState<ExerciseSet, WorkoutExtra>, now: DateTime<Utc>) -> Markup {
    let done = state.items.iter().filter(|s| s.completed).count();
    let timer = &state.extra.timer;
    let (action, label) = if timer.is_running() {
        ("timer-stop", "Pause")
    } else {
        ("timer-start", "Start")
    };
    Markup::new()
        .element("span", &[("id", TIMER_ID)], &timer.display(now))
        .element("button", &[("data-action", action)], label)
        .element(
            "p",
            &[("class", "progress")],
            &format!("{done} / {} sets done", state.items.len()),
        )
        .element(
            "p",
            &[("class", "volume")],
            &format!("Volume: {:.1} kg", total_volume(&state.items)),
        )
}
