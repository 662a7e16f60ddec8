//! Deterministic context assembly.
//!
//! Pure function: accepts a raw transcript slice and a request, returns the
//! ordered, role-tagged message sequence to submit to a provider. No I/O,
//! no clock: identical inputs always produce the identical output.

use xt_domain::message::Message;
use xt_domain::turn::{Speaker, Turn};

/// History turns included when the caller does not say.
pub const DEFAULT_TURN_BUDGET: usize = 10;
/// Hard cap on the per-request turn budget.
pub const MAX_TURN_BUDGET: usize = 99;

/// Input to [`assemble`]. Ephemeral: never persisted.
#[derive(Debug, Clone)]
pub struct ContextRequest {
    pub panel_ids: Vec<u32>,
    /// Turns of history to retain across the combined slice, clamped by
    /// [`clamp_budget`].
    pub turn_budget: usize,
    /// Explicit system prompt override; wins over any prompt carried on a
    /// retained turn.
    pub system_prompt: Option<String>,
    /// The new question, appended last as a `user` message.
    pub question: String,
}

/// Clamp a caller-supplied budget into `[1, min(max_turns, 99)]`, falling
/// back to the default when absent.
pub fn clamp_budget(requested: Option<usize>, default_turns: usize, max_turns: usize) -> usize {
    let ceiling = max_turns.clamp(1, MAX_TURN_BUDGET);
    requested
        .unwrap_or(default_turns)
        .clamp(1, ceiling)
}

/// Build the provider message sequence:
///
/// 1. system prompt (explicit override, else the one carried by the most
///    recent retained turn) first;
/// 2. the newest `turn_budget` turns of the combined slice in ascending
///    `created_at` order, role-mapped (Human → user, Assistant → assistant,
///    System → system in place);
/// 3. the new question last, as a `user` message.
pub fn assemble(turns: &[Turn], req: &ContextRequest) -> Vec<Message> {
    // Defensive sort: input should already be ascending.
    let mut slice: Vec<&Turn> = turns.iter().collect();
    slice.sort_by_key(|t| t.created_at);

    // Truncate from the oldest end across the combined multi-panel slice.
    let start = slice.len().saturating_sub(req.turn_budget.max(1));
    let retained = &slice[start..];

    let mut messages = Vec::with_capacity(retained.len() + 2);

    // Explicit override always wins and is not duplicated; otherwise fall
    // back to the prompt denormalized onto the most recent retained turn.
    let system_prompt = req
        .system_prompt
        .as_deref()
        .filter(|p| !p.is_empty())
        .or_else(|| {
            retained
                .iter()
                .rev()
                .find_map(|t| t.system_prompt.as_deref().filter(|p| !p.is_empty()))
        });
    if let Some(prompt) = system_prompt {
        messages.push(Message::system(prompt));
    }

    for turn in retained {
        messages.push(match &turn.speaker {
            Speaker::Human => Message::user(&turn.body),
            Speaker::Assistant { .. } => Message::assistant(&turn.body),
            // Kept in chronological position, not hoisted.
            Speaker::System => Message::system(&turn.body),
        });
    }

    messages.push(Message::user(&req.question));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use xt_domain::message::Role;

    fn turn_at(panel_id: u32, speaker: Speaker, body: &str, offset_s: i64) -> Turn {
        let mut turn = Turn::new(panel_id, speaker, body);
        turn.created_at = Utc::now() + Duration::seconds(offset_s);
        turn
    }

    fn req(budget: usize, system_prompt: Option<&str>) -> ContextRequest {
        ContextRequest {
            panel_ids: vec![1, 2],
            turn_budget: budget,
            system_prompt: system_prompt.map(String::from),
            question: "new question".into(),
        }
    }

    #[test]
    fn empty_slice_yields_just_the_question() {
        let messages = assemble(&[], &req(10, None));
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].content, "new question");
    }

    #[test]
    fn budget_keeps_the_newest_turns_across_panels() {
        // 15 turns across two panels, newest last.
        let turns: Vec<Turn> = (0..15)
            .map(|i| {
                turn_at(
                    if i % 2 == 0 { 1 } else { 2 },
                    Speaker::Human,
                    &format!("m{i}"),
                    i,
                )
            })
            .collect();

        let messages = assemble(&turns, &req(10, None));
        // 10 history messages + the question.
        assert_eq!(messages.len(), 11);
        assert_eq!(messages[0].content, "m5");
        assert_eq!(messages[9].content, "m14");
        assert_eq!(messages[10].content, "new question");
    }

    #[test]
    fn budget_larger_than_slice_is_identity() {
        let turns = vec![
            turn_at(1, Speaker::Human, "a", 0),
            turn_at(1, Speaker::Assistant { model: "m".into() }, "b", 1),
        ];
        let messages = assemble(&turns, &req(99, None));
        assert_eq!(messages.len(), 3);
    }

    #[test]
    fn roles_map_and_system_turns_stay_in_place() {
        let turns = vec![
            turn_at(1, Speaker::Human, "q1", 0),
            turn_at(1, Speaker::System, "mid-stream notice", 1),
            turn_at(1, Speaker::Assistant { model: "gpt".into() }, "a1", 2),
        ];
        let messages = assemble(&turns, &req(10, None));
        let roles: Vec<Role> = messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::System, Role::Assistant, Role::User]);
        assert_eq!(messages[1].content, "mid-stream notice");
    }

    #[test]
    fn explicit_system_prompt_comes_first() {
        let turns = vec![turn_at(1, Speaker::Human, "q", 0)];
        let messages = assemble(&turns, &req(10, Some("be terse")));
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, "be terse");
        assert_eq!(messages.len(), 3);
    }

    #[test]
    fn explicit_override_beats_carried_prompt_without_duplication() {
        let turns = vec![
            turn_at(1, Speaker::Human, "q", 0).with_system_prompt(Some("carried".into()))
        ];
        let messages = assemble(&turns, &req(10, Some("override")));
        let system_msgs: Vec<&Message> =
            messages.iter().filter(|m| m.role == Role::System).collect();
        assert_eq!(system_msgs.len(), 1);
        assert_eq!(system_msgs[0].content, "override");
    }

    #[test]
    fn carried_prompt_used_when_no_override() {
        let turns = vec![
            turn_at(1, Speaker::Human, "old", 0).with_system_prompt(Some("older".into())),
            turn_at(1, Speaker::Human, "new", 1).with_system_prompt(Some("newer".into())),
        ];
        let messages = assemble(&turns, &req(10, None));
        assert_eq!(messages[0].content, "newer");
    }

    #[test]
    fn carried_prompt_outside_the_budget_is_ignored() {
        let turns = vec![
            turn_at(1, Speaker::Human, "dropped", 0).with_system_prompt(Some("stale".into())),
            turn_at(1, Speaker::Human, "kept", 1),
        ];
        let messages = assemble(&turns, &req(1, None));
        assert!(messages.iter().all(|m| m.role != Role::System));
    }

    #[test]
    fn unsorted_input_is_sorted_defensively() {
        let turns = vec![
            turn_at(1, Speaker::Human, "later", 10),
            turn_at(1, Speaker::Human, "earlier", 0),
        ];
        let messages = assemble(&turns, &req(10, None));
        assert_eq!(messages[0].content, "earlier");
        assert_eq!(messages[1].content, "later");
    }

    #[test]
    fn assembly_is_deterministic() {
        let turns: Vec<Turn> = (0..15)
            .map(|i| turn_at(1, Speaker::Human, &format!("m{i}"), i))
            .collect();
        let request = req(10, Some("sys"));
        assert_eq!(assemble(&turns, &request), assemble(&turns, &request));
    }

    #[test]
    fn clamp_budget_bounds() {
        assert_eq!(clamp_budget(None, 10, 99), 10);
        assert_eq!(clamp_budget(Some(0), 10, 99), 1);
        assert_eq!(clamp_budget(Some(500), 10, 99), 99);
        assert_eq!(clamp_budget(Some(50), 10, 20), 20);
        // A misconfigured ceiling above the hard cap is still capped.
        assert_eq!(clamp_budget(Some(150), 10, 400), 99);
    }
}
