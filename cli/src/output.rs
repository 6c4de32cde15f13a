use serde_json::json;

use pagestate_core::render::Frame;

/// Writes frames to stdout, either annotated for people or as JSON lines.
#[derive(Debug, Clone, Copy)]
pub struct Printer {
    pub json: bool,
}

impl Printer {
    pub fn print(&self, frames: &[Frame]) {
        for frame in frames {
            if self.json {
                println!("{}", frame_json(frame));
            } else {
                println!("{}", frame_text(frame));
            }
        }
    }
}

pub fn frame_text(frame: &Frame) -> String {
    match frame {
        Frame::Replace { target, markup } => format!("== replace #{target}\n{markup}"),
        Frame::Append {
            target,
            markup,
            has_more,
        } => {
            let more = if *has_more { " (more)" } else { "" };
            format!("== append #{target}{more}\n{markup}")
        }
        Frame::Patch(patch) => format!("== patch #{}: {}", patch.target_id, patch.text),
        Frame::Toast(n) => {
            let level = serde_json::to_value(n.level)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default();
            format!("== toast [{level}] {}", n.message)
        }
    }
}

pub fn frame_json(frame: &Frame) -> serde_json::Value {
    match frame {
        Frame::Replace { target, markup } => json!({
            "kind": "replace",
            "target": target,
            "markup": markup.as_str(),
        }),
        Frame::Append {
            target,
            markup,
            has_more,
        } => json!({
            "kind": "append",
            "target": target,
            "markup": markup.as_str(),
            "has_more": has_more,
        }),
        Frame::Patch(patch) => json!({
            "kind": "patch",
            "target": patch.target_id,
            "text": patch.text,
        }),
        Frame::Toast(n) => json!({
            "kind": "toast",
            "level": n.level,
            "message": n.message,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagestate_core::dispatch::{NoticeLevel, Notification};
    use pagestate_core::render::{Markup, TextPatch};
    use pretty_assertions::assert_eq;

    #[test]
    fn text_form_labels_each_frame() {
        let append = Frame::Append {
            target: "set-list".to_string(),
            markup: Markup::new().element("li", &[], "Squat"),
            has_more: true,
        };
        assert_eq!(frame_text(&append), "== append #set-list (more)\n<li>Squat</li>");
        let toast = Frame::Toast(Notification::new(NoticeLevel::Warning, "Only 5 in stock"));
        assert_eq!(frame_text(&toast), "== toast [warning] Only 5 in stock");
    }

    #[test]
    fn json_form_is_flat() {
        let patch = Frame::Patch(TextPatch::new("workout-timer", "01:05"));
        assert_eq!(
            frame_json(&patch),
            json!({"kind": "patch", "target": "workout-timer", "text": "01:05"})
        );
        let toast = Frame::Toast(Notification::new(NoticeLevel::Error, "boom"));
        assert_eq!(frame_json(&toast)["level"], "error");
    }
}
