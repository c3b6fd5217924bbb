//! Incremental response delivery — the typing effect.
//!
//! The response text carries a small markup grammar (bold, italic,
//! newline, leading-dash bullets).  Delivery renders the markup once,
//! streams the plain character sequence through a channel at a fixed
//! interval, and finishes with one emission of the fully rendered string,
//! so the final state never depends on interval or cancellation timing of
//! earlier sequences.

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());
static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*(.*?)\*").unwrap());
static BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^- (.*)$").unwrap());
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"</?(?:strong|em)>").unwrap());

/// Apply the markup grammar once: `**bold**`, `*italic*`, leading-dash
/// bullet lines, then newlines to `<br>`.
pub fn render_markup(text: &str) -> String {
    let rendered = BOLD.replace_all(text, "<strong>$1</strong>");
    let rendered = ITALIC.replace_all(&rendered, "<em>$1</em>");
    let rendered = BULLET.replace_all(&rendered, "• $1");
    rendered.replace('\n', "<br>")
}

/// The markup-stripped form of `text`: what the typing effect emits.
/// Line structure is preserved.
pub fn plain_text(text: &str) -> String {
    let rendered = render_markup(text);
    TAG.replace_all(&rendered, "").replace("<br>", "\n")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryEvent {
    /// One more character revealed; carries the plain text emitted so far.
    Character { so_far: String },
    /// The sequence finished; carries the fully rendered text.
    Completed { rendered: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Completed,
    /// The token fired (or the receiver went away) mid-sequence; no
    /// `Completed` event was emitted.
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct DeliverySequencer {
    interval: Duration,
}

impl DeliverySequencer {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Stream `text` through `tx` one character at a time, then emit the
    /// rendered whole.  Each call is a fresh sequence; cancelling one
    /// sequence has no effect on the next.
    pub async fn deliver(
        &self,
        text: &str,
        tx: &mpsc::Sender<DeliveryEvent>,
        cancel: &CancellationToken,
    ) -> DeliveryOutcome {
        let rendered = render_markup(text);
        let plain = plain_text(text);
        debug!(chars = plain.chars().count(), "starting delivery sequence");

        let mut so_far = String::with_capacity(plain.len());
        for ch in plain.chars() {
            if cancel.is_cancelled() {
                return DeliveryOutcome::Cancelled;
            }
            so_far.push(ch);
            if tx
                .send(DeliveryEvent::Character {
                    so_far: so_far.clone(),
                })
                .await
                .is_err()
            {
                return DeliveryOutcome::Cancelled;
            }
            tokio::select! {
                _ = cancel.cancelled() => return DeliveryOutcome::Cancelled,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        if cancel.is_cancelled() {
            return DeliveryOutcome::Cancelled;
        }
        if tx
            .send(DeliveryEvent::Completed { rendered })
            .await
            .is_err()
        {
            return DeliveryOutcome::Cancelled;
        }
        DeliveryOutcome::Completed
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sequencer() -> DeliverySequencer {
        DeliverySequencer::new(Duration::from_millis(50))
    }

    async fn collect(
        text: &str,
        cancel_after: Option<usize>,
    ) -> (Vec<DeliveryEvent>, DeliveryOutcome) {
        let (tx, mut rx) = mpsc::channel(8);
        let cancel = CancellationToken::new();
        let seq = sequencer();
        let text = text.to_string();
        let cancel_task = cancel.clone();
        let handle = tokio::spawn(async move { seq.deliver(&text, &tx, &cancel_task).await });

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
            if let Some(n) = cancel_after {
                if events.len() == n {
                    cancel.cancel();
                }
            }
        }
        let outcome = handle.await.unwrap();
        (events, outcome)
    }

    // ── Markup grammar ─────────────────────────────────────────────────────

    #[test]
    fn render_bold_italic_newline_and_bullets() {
        let rendered = render_markup("**굵게** *기울임*\n- 항목 하나\n- 항목 둘");
        assert_eq!(
            rendered,
            "<strong>굵게</strong> <em>기울임</em><br>• 항목 하나<br>• 항목 둘"
        );
    }

    #[test]
    fn bold_consumes_double_stars_before_italic() {
        assert_eq!(render_markup("**a** *b*"), "<strong>a</strong> <em>b</em>");
    }

    #[test]
    fn dash_only_matches_at_line_start() {
        assert_eq!(render_markup("1 - 2"), "1 - 2");
        assert_eq!(render_markup("- 머리\n꼬리 - 아님"), "• 머리<br>꼬리 - 아님");
    }

    #[test]
    fn plain_text_strips_tags_and_keeps_lines() {
        let plain = plain_text("**굵게** 보통\n- 항목");
        assert_eq!(plain, "굵게 보통\n• 항목");
    }

    #[test]
    fn plain_text_of_unmarked_text_is_identity() {
        assert_eq!(plain_text("그대로"), "그대로");
    }

    // ── Delivery contract ──────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn final_event_is_always_the_rendered_form() {
        let text = "**안녕** 하세요\n- 첫째";
        let (events, outcome) = collect(text, None).await;

        assert_eq!(outcome, DeliveryOutcome::Completed);
        let plain = plain_text(text);
        // One Character event per plain character, in growing prefixes.
        assert_eq!(events.len(), plain.chars().count() + 1);
        let mut expected = String::new();
        for (event, ch) in events.iter().zip(plain.chars()) {
            expected.push(ch);
            assert_eq!(
                event,
                &DeliveryEvent::Character {
                    so_far: expected.clone()
                }
            );
        }
        assert_eq!(
            events.last().unwrap(),
            &DeliveryEvent::Completed {
                rendered: render_markup(text)
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn empty_input_completes_immediately_without_characters() {
        let (events, outcome) = collect("", None).await;
        assert_eq!(outcome, DeliveryOutcome::Completed);
        assert_eq!(
            events,
            vec![DeliveryEvent::Completed {
                rendered: String::new()
            }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_emission_without_completion() {
        let (events, outcome) = collect("충분히 긴 문장입니다", Some(3)).await;
        assert_eq!(outcome, DeliveryOutcome::Cancelled);
        assert!(events.len() < plain_text("충분히 긴 문장입니다").chars().count() + 1);
        assert!(
            events
                .iter()
                .all(|e| matches!(e, DeliveryEvent::Character { .. }))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn sequences_are_restartable_after_cancellation() {
        let (_, first) = collect("첫 번째 출력", Some(2)).await;
        assert_eq!(first, DeliveryOutcome::Cancelled);

        let (events, second) = collect("두 번째", None).await;
        assert_eq!(second, DeliveryOutcome::Completed);
        assert_eq!(
            events.last().unwrap(),
            &DeliveryEvent::Completed {
                rendered: "두 번째".to_string()
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_receiver_counts_as_cancellation() {
        let (tx, rx) = mpsc::channel(8);
        drop(rx);
        let cancel = CancellationToken::new();
        let outcome = sequencer().deliver("버려진 수신자", &tx, &cancel).await;
        assert_eq!(outcome, DeliveryOutcome::Cancelled);
    }
}
