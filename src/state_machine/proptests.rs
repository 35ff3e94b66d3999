//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::*;
use crate::prompt::OutboundMessage;
use crate::survey::{Catalog, Question, Respondent, OPTION_SLOTS, OTHER_OPTION};
use crate::validator::{classify, Outcome};
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn context(catalog: Catalog) -> SurveyContext {
    SurveyContext::new(Respondent::new("+1", "Ana"), catalog)
}

/// Feed a raw message through classification and transition, the way the
/// runtime does
fn step(
    state: &RespondentState,
    ctx: &SurveyContext,
    raw: &RawInput,
) -> Result<TransitionResult, TransitionError> {
    let event = match raw {
        RawInput::Connected => Event::Connected,
        RawInput::Media => Event::Inbound(classify(&InboundMessage::media("+1"), Some(state.mode))),
        RawInput::Text(text) => Event::Inbound(classify(
            &InboundMessage::text("+1", text.as_str()),
            Some(state.mode),
        )),
    };
    transition(state, ctx, event)
}

fn recorded(result: &TransitionResult) -> Vec<(usize, String)> {
    result
        .effects
        .iter()
        .filter_map(|e| match e {
            Effect::RecordAnswer {
                question_index,
                value,
                ..
            } => Some((*question_index, value.clone())),
            Effect::Send(_) => None,
        })
        .collect()
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

#[derive(Debug, Clone)]
enum RawInput {
    Text(String),
    Media,
    Connected,
}

fn arb_question(ordinal: usize) -> impl Strategy<Value = Question> {
    proptest::collection::vec(proptest::option::of("[A-Za-z]{1,8}"), OPTION_SLOTS).prop_map(
        move |labels| {
            let mut options: [Option<String>; OPTION_SLOTS] = Default::default();
            for (slot, label) in options.iter_mut().zip(labels) {
                *slot = label;
            }
            Question::new(ordinal, format!("Question {ordinal}"), options)
        },
    )
}

fn arb_questions(count: std::ops::Range<usize>) -> impl Strategy<Value = Vec<Question>> {
    count.prop_flat_map(|n| (1..=n).map(arb_question).collect::<Vec<_>>())
}

fn arb_catalog() -> impl Strategy<Value = Catalog> {
    arb_questions(0..6).prop_map(Catalog::from)
}

/// Non-empty catalog plus a cursor on one of its questions
fn arb_open_position() -> impl Strategy<Value = (Catalog, usize)> {
    arb_questions(1..6).prop_flat_map(|questions| {
        let n = questions.len();
        (Just(Catalog::from(questions)), 0..n)
    })
}

/// Mode and an outcome that mode rejects. Justification accepts any text,
/// so only media is rejected while awaiting one.
fn arb_rejection() -> impl Strategy<Value = (Mode, Outcome)> {
    prop_oneof![
        Just((Mode::Asking, Outcome::MediaRejected)),
        Just((Mode::Asking, Outcome::Invalid)),
        Just((Mode::AwaitingJustification, Outcome::MediaRejected)),
    ]
}

fn arb_raw_input() -> impl Strategy<Value = RawInput> {
    prop_oneof![
        4 => (1u8..=5).prop_map(|n| RawInput::Text(n.to_string())),
        2 => "[ a-z0-9+.-]{0,12}".prop_map(RawInput::Text),
        1 => Just(RawInput::Media),
        1 => Just(RawInput::Connected),
    ]
}

fn arb_outcome() -> impl Strategy<Value = Outcome> {
    prop_oneof![
        Just(Outcome::MediaRejected),
        Just(Outcome::EmptyIgnored),
        Just(Outcome::UnknownRespondent),
        (1u8..=5).prop_map(Outcome::NumericOption),
        "[a-z ]{1,20}".prop_map(Outcome::JustificationText),
        Just(Outcome::Invalid),
    ]
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Invariant 1: cursor never moves backwards, never passes the end, and
    // reaching the end is exactly what completes the survey
    #[test]
    fn prop_cursor_monotone_and_bounded(
        catalog in arb_catalog(),
        inputs in proptest::collection::vec(arb_raw_input(), 0..40)
    ) {
        let ctx = context(catalog);
        let total = ctx.total();
        let mut state = RespondentState::start("+1", total);

        for raw in &inputs {
            let result = step(&state, &ctx, raw);
            prop_assert!(result.is_ok(), "{:?} in {:?} failed: {:?}", raw, state, result);
            let result = result.unwrap();
            let next = &result.new_state;

            prop_assert!(next.cursor >= state.cursor);
            prop_assert!(next.cursor <= total);
            prop_assert_eq!(next.cursor == total, next.is_completed());
            state = result.new_state;
        }
    }

    // Invariant 2: an answer is recorded exactly when the cursor advances,
    // for the question the cursor was on
    #[test]
    fn prop_record_iff_advance(
        catalog in arb_catalog(),
        inputs in proptest::collection::vec(arb_raw_input(), 0..40)
    ) {
        let ctx = context(catalog);
        let mut state = RespondentState::start("+1", ctx.total());

        for raw in &inputs {
            let result = step(&state, &ctx, raw).unwrap();
            let records = recorded(&result);

            if result.new_state.cursor > state.cursor {
                prop_assert_eq!(result.new_state.cursor, state.cursor + 1);
                prop_assert_eq!(records.len(), 1);
                prop_assert_eq!(records[0].0, state.cursor);
                prop_assert!(!records[0].1.is_empty());
            } else {
                prop_assert!(records.is_empty(), "Recorded without advancing: {:?}", records);
            }
            state = result.new_state;
        }
    }

    // Invariant 3: picking the catch-all never records anything by itself
    #[test]
    fn prop_other_option_never_records((catalog, cursor) in arb_open_position()) {
        let ctx = context(catalog);
        let state = RespondentState::at_cursor("+1", cursor, ctx.total());

        let result = transition(&state, &ctx, Event::Inbound(Outcome::NumericOption(OTHER_OPTION))).unwrap();

        prop_assert!(!result.records_answer());
        prop_assert_eq!(result.new_state.mode, Mode::AwaitingJustification);
        prop_assert_eq!(result.new_state.cursor, cursor);
        prop_assert_eq!(result.effects, vec![Effect::send(OutboundMessage::JustificationRequest)]);
    }

    // Invariant 4: completed is absorbing and replies identically every time
    #[test]
    fn prop_completed_is_absorbing(
        catalog in arb_catalog(),
        outcomes in proptest::collection::vec(arb_outcome(), 1..10)
    ) {
        let ctx = context(catalog);
        let state = RespondentState::at_cursor("+1", ctx.total(), ctx.total());

        for outcome in outcomes {
            let first = transition(&state, &ctx, Event::Inbound(outcome.clone())).unwrap();
            let second = transition(&state, &ctx, Event::Inbound(outcome.clone())).unwrap();

            prop_assert_eq!(&first.new_state, &state);
            prop_assert!(!first.records_answer());
            prop_assert_eq!(&first.effects, &second.effects);
            if outcome.is_silent() {
                prop_assert!(first.effects.is_empty());
            } else {
                prop_assert_eq!(first.effects, vec![Effect::send(OutboundMessage::AlreadyCompleted)]);
            }
        }
    }

    // Invariant 5: media and unparseable replies leave state untouched with
    // exactly one corrective reply
    #[test]
    fn prop_rejections_do_not_change_state(
        (catalog, cursor) in arb_open_position(),
        (mode, outcome) in arb_rejection()
    ) {
        let ctx = context(catalog);
        let mut state = RespondentState::at_cursor("+1", cursor, ctx.total());
        state.mode = mode;

        let result = transition(&state, &ctx, Event::Inbound(outcome)).unwrap();

        prop_assert_eq!(&result.new_state, &state);
        prop_assert_eq!(result.effects.len(), 1);
        prop_assert!(!result.records_answer());
    }

    // Invariant 6: silent outcomes produce nothing in any mode
    #[test]
    fn prop_silent_outcomes_are_silent(catalog in arb_catalog(), cursor in 0usize..6, awaiting in any::<bool>()) {
        let ctx = context(catalog);
        let mut state = RespondentState::at_cursor("+1", cursor, ctx.total());
        if awaiting && !state.is_completed() {
            state.mode = Mode::AwaitingJustification;
        }

        for outcome in [Outcome::EmptyIgnored, Outcome::UnknownRespondent] {
            let result = transition(&state, &ctx, Event::Inbound(outcome)).unwrap();
            prop_assert_eq!(&result.new_state, &state);
            prop_assert!(result.effects.is_empty());
        }
    }

    // Invariant 7: only exact decimal integers in 1..=5 are option picks
    #[test]
    fn prop_strict_option_parsing(text in "\\PC{0,8}") {
        let outcome = classify(&InboundMessage::text("+1", text.as_str()), Some(Mode::Asking));
        let trimmed = text.trim();
        let expected = trimmed.chars().all(|c| c.is_ascii_digit())
            && matches!(trimmed.parse::<u8>(), Ok(1..=5));

        match outcome {
            Outcome::NumericOption(n) => {
                prop_assert!(expected, "{:?} accepted as {}", text, n);
                prop_assert_eq!(trimmed.parse::<u8>().ok(), Some(n));
            }
            Outcome::EmptyIgnored => prop_assert!(trimmed.is_empty()),
            Outcome::Invalid => prop_assert!(!expected),
            other => prop_assert!(false, "Unexpected outcome {:?}", other),
        }
    }
}
