use crate::domain::changes::{HistoryDiff, HistoryRecord};
use maud::{html, Markup};
use serde_json::Value;

fn show(value: &Value) -> String {
    match value {
        Value::Null => "—".to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(show)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

pub fn history_list(entries: &[HistoryRecord]) -> Markup {
    html! {
        @if entries.is_empty() {
            p class="muted" { "No changes recorded yet." }
        } @else {
            ul class="history" {
                @for h in entries {
                    li {
                        div class="history-meta" {
                            time datetime=(h.entry.changed_at.to_rfc3339()) {
                                (h.entry.changed_at.format("%Y-%m-%d %H:%M UTC"))
                            }
                            " by " (h.changed_by_email)
                        }
                        @match &h.entry.diff {
                            HistoryDiff::Created => p { "Lead created" },
                            HistoryDiff::Changes(delta) => {
                                ul {
                                    @for (field, change) in delta.iter() {
                                        li {
                                            strong { (field) } ": "
                                            (show(&change.old)) " → " (show(&change.new))
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
