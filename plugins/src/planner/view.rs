use pagestate_core::render::{ItemView, Markup};
use pagestate_core::state::AppState;

use super::ascension::AscensionCost;
use super::model::{Character, PlannerExtra};

pub const LIST_ID: &str = "character-list";
pub const PLAN_ID: &str = "ascension-plan";

#[derive(Debug, Clone, Default)]
pub struct PlannerView;

impl ItemView<Character, PlannerExtra> for PlannerView {
    fn list_id(&self) -> &str {
        LIST_ID
    }

    fn render_item(&self, c: &Character, state: &AppState<Character, PlannerExtra>) -> Markup {
        let owned = state.is_selected(&c.id);
        let m = Markup::new()
            .element("h3", &[("class", "character-name")], &c.name)
            .element(
                "span",
                &[("class", format!("element element-{}", c.element.to_lowercase()).as_str())],
                &c.element,
            )
            .element("span", &[("class", "weapon")], &c.weapon)
            .element("span", &[("class", "rarity")], &"★".repeat(usize::from(c.rarity)))
            .element(
                "button",
                &[("data-action", "toggle-character"), ("data-id", c.id.as_str())],
                if owned { "Remove from roster" } else { "Add to roster" },
            );
        match state.extra.goals.get(&c.id) {
            Some(goal) if owned => m.element(
                "p",
                &[("class", "goal")],
                &format!("Lv. {} → {}", goal.current_level, goal.target_level),
            ),
            _ => m,
        }
    }

    fn empty_message(&self, state: &AppState<Character, PlannerExtra>) -> String {
        if state.query().is_empty() && !state.has_filters() {
            "No characters loaded".to_string()
        } else {
            format!("No characters match \"{}\"", state.query())
        }
    }
}

pub fn render_plan(state: &AppState<Character, PlannerExtra>, total: &AscensionCost) -> Markup {
    if state.selected.is_empty() {
        return Markup::new().element(
            "p",
            &[("class", "empty-state")],
            "Add characters to your roster to plan ascensions",
        );
    }
    let mut m = Markup::new().open("ul", &[("class", "roster")]);
    for id in &state.selected {
        let name = state.item(id).map(|c| c.name.as_str()).unwrap_or(id);
        let goal = match state.extra.goals.get(id) {
            Some(g) => format!("Lv. {} → {}", g.current_level, g.target_level),
            None => "no goal set".to_string(),
        };
        m = m
            .open("li", &[("data-id", id.as_str())])
            .element("strong", &[], name)
            .text(" ")
            .element("span", &[("class", "goal")], &goal)
            .close("li");
    }
    m = m.close("ul");
    if total.is_zero() {
        return m;
    }
    m = m.open("table", &[("class", "materials")]);
    for (label, amount) in total.lines() {
        m = m
            .open("tr", &[])
            .element("th", &[], label)
            .element("td", &[], &amount.to_string())
            .close("tr");
    }
    m.close("table")
}
