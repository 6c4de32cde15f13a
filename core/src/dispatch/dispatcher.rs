use std::collections::{BTreeMap, BTreeSet};

use super::interaction::{Interaction, Payload};
use super::outcome::{Effect, NoticeLevel, Outcome};
use crate::error::AppError;

/// An action handler. Plain function pointers keep the table static: a
/// handler cannot capture state, it only sees the context it is given.
pub type Handler<C, K> = fn(&mut C, &Payload) -> Result<Outcome<K>, AppError>;

#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch<K: Ord> {
    Handled { action: String, outcome: Outcome<K> },
    Unresolved { action: Option<String> },
}

impl<K: Ord> Dispatch<K> {
    pub fn outcome(&self) -> Option<&Outcome<K>> {
        match self {
            Dispatch::Handled { outcome, .. } => Some(outcome),
            Dispatch::Unresolved { .. } => None,
        }
    }

    pub fn into_outcome(self) -> Outcome<K> {
        match self {
            Dispatch::Handled { outcome, .. } => outcome,
            Dispatch::Unresolved { .. } => Outcome::none(),
        }
    }
}

/// Maps action names to handlers for one context type `C`.
pub struct Dispatcher<C, K: Ord> {
    handlers: BTreeMap<&'static str, Handler<C, K>>,
    debounced: BTreeSet<&'static str>,
}

impl<C, K: Ord> Default for Dispatcher<C, K> {
    fn default() -> Self {
        Self {
            handlers: BTreeMap::new(),
            debounced: BTreeSet::new(),
        }
    }
}

impl<C, K: Ord> Dispatcher<C, K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, action: &'static str, handler: Handler<C, K>) -> Self {
        if self.handlers.insert(action, handler).is_some() {
            tracing::debug!(target: "pagestate.dispatch", action, "handler replaced");
        }
        self
    }

    /// Marks a text-input action whose events are coalesced before dispatch.
    pub fn debounced(mut self, action: &'static str) -> Self {
        self.debounced.insert(action);
        self
    }

    /// Adds every handler and debounce mark of `other`, replacing clashes.
    pub fn merge(mut self, other: Dispatcher<C, K>) -> Self {
        for (action, handler) in other.handlers {
            self = self.on(action, handler);
        }
        self.debounced.extend(other.debounced);
        self
    }

    pub fn is_debounced(&self, action: &str) -> bool {
        self.debounced.contains(action)
    }

    pub fn handles(&self, action: &str) -> bool {
        self.handlers.contains_key(action)
    }

    pub fn actions(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.keys().copied()
    }

    /// Resolves an interaction and runs its handler.
    pub fn dispatch(&self, ctx: &mut C, interaction: &Interaction) -> Dispatch<K> {
        match interaction.resolve() {
            Some((action, payload)) => self.dispatch_action(ctx, &action, &payload),
            None => {
                tracing::trace!(target: "pagestate.dispatch", "interaction without action");
                Dispatch::Unresolved { action: None }
            }
        }
    }

    /// Runs the handler for `action`. Handler errors are folded into the
    /// outcome as notifications; nothing propagates past this call.
    pub fn dispatch_action(&self, ctx: &mut C, action: &str, payload: &Payload) -> Dispatch<K> {
        let Some(handler) = self.handlers.get(action) else {
            tracing::warn!(target: "pagestate.dispatch", action, "no handler registered, ignoring");
            return Dispatch::Unresolved {
                action: Some(action.to_string()),
            };
        };
        tracing::debug!(target: "pagestate.dispatch", action, "dispatching");
        let outcome = match handler(ctx, payload) {
            Ok(outcome) => outcome,
            Err(err) => recover(action, err),
        };
        Dispatch::Handled {
            action: action.to_string(),
            outcome,
        }
    }
}

fn recover<K: Ord>(action: &str, err: AppError) -> Outcome<K> {
    let level = if err.is_user_facing() {
        tracing::info!(target: "pagestate.dispatch", action, error = %err, "action rejected");
        NoticeLevel::Warning
    } else {
        tracing::error!(target: "pagestate.dispatch", action, error = %err, "action failed");
        NoticeLevel::Error
    };
    let message = match &err {
        AppError::Validation(msg) | AppError::NotFound(msg) => msg.clone(),
        other => other.to_string(),
    };
    // re-render so controls disabled by the attempt come back
    Outcome::none().with(Effect::Render).notify(level, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::interaction::Element;

    #[derive(Default)]
    struct Counter {
        hits: u32,
        seen: Vec<String>,
    }

    fn bump(c: &mut Counter, p: &Payload) -> Result<Outcome<u8>, AppError> {
        c.hits += 1;
        if let Some(id) = p.get("id") {
            c.seen.push(id.to_string());
        }
        Ok(Outcome::render())
    }

    fn reject(_: &mut Counter, p: &Payload) -> Result<Outcome<u8>, AppError> {
        let qty: u32 = p.parse("qty")?;
        Ok(Outcome::none().notify(NoticeLevel::Info, format!("qty {qty}")))
    }

    fn dispatcher() -> Dispatcher<Counter, u8> {
        Dispatcher::new().on("bump", bump).on("reject", reject)
    }

    #[test]
    fn delegated_click_reaches_handler() {
        let d = dispatcher();
        let mut ctx = Counter::default();
        let click = Interaction::click(vec![
            Element::new("i"),
            Element::action("button", "bump").data("id", "7"),
            Element::new("ul").attr("id", "root"),
        ]);
        let res = d.dispatch(&mut ctx, &click);
        assert!(matches!(res, Dispatch::Handled { ref action, .. } if action == "bump"));
        assert_eq!(ctx.hits, 1);
        assert_eq!(ctx.seen, vec!["7"]);
    }

    #[test]
    fn unknown_action_is_ignored() {
        let d = dispatcher();
        let mut ctx = Counter::default();
        let res = d.dispatch_action(&mut ctx, "launch", &Payload::new());
        assert_eq!(
            res,
            Dispatch::Unresolved {
                action: Some("launch".into())
            }
        );
        assert_eq!(ctx.hits, 0);
    }

    #[test]
    fn handler_error_becomes_notification() {
        let d = dispatcher();
        let mut ctx = Counter::default();
        let outcome = d
            .dispatch_action(&mut ctx, "reject", &Payload::new().with("qty", "x"))
            .into_outcome();
        assert_eq!(outcome.notifications.len(), 1);
        assert_eq!(outcome.notifications[0].level, NoticeLevel::Warning);
        assert!(outcome.effects.contains(&Effect::Render));
    }

    #[test]
    fn merge_overrides_and_keeps_marks() {
        fn other(_: &mut Counter, _: &Payload) -> Result<Outcome<u8>, AppError> {
            Ok(Outcome::none())
        }
        let base = Dispatcher::new().on("bump", bump).debounced("bump");
        let d = base.merge(Dispatcher::new().on("bump", other).on("new", other));
        let mut ctx = Counter::default();
        let outcome = d
            .dispatch_action(&mut ctx, "bump", &Payload::new())
            .into_outcome();
        assert!(outcome.is_empty());
        assert_eq!(ctx.hits, 0);
        assert!(d.is_debounced("bump"));
        assert!(d.handles("new"));
    }

    #[test]
    fn debounced_actions_are_flagged() {
        let d = dispatcher().debounced("bump");
        assert!(d.is_debounced("bump"));
        assert!(!d.is_debounced("reject"));
        assert_eq!(d.actions().collect::<Vec<_>>(), vec!["bump", "reject"]);
    }
}
