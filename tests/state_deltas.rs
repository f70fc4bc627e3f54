use chrono::NaiveDate;
use neis_timetable::state::{apply_delta, AppState, Delta, Selector};

fn pinned_state() -> AppState {
    let today = NaiveDate::from_ymd_opt(2024, 3, 4).expect("valid date");
    AppState::with_today(today)
}

#[test]
fn current_seq_result_replaces_timetable_wholesale() {
    let mut state = pinned_state();
    state.timetable = vec!["old".to_string()];
    state.timetable_scroll = 5;
    state.request_seq = 2;

    apply_delta(
        &mut state,
        Delta::SetTimetable {
            seq: 2,
            entries: vec!["국어".to_string(), "수학".to_string()],
        },
    );

    assert_eq!(state.timetable, vec!["국어".to_string(), "수학".to_string()]);
    assert_eq!(state.timetable_scroll, 0);
}

#[test]
fn stale_seq_result_is_dropped() {
    let mut state = pinned_state();
    state.request_seq = 3;
    state.timetable = vec!["current".to_string()];

    apply_delta(
        &mut state,
        Delta::SetTimetable {
            seq: 2,
            entries: vec!["stale".to_string()],
        },
    );

    assert_eq!(state.timetable, vec!["current".to_string()]);
    assert!(
        state.logs.iter().any(|line| line.contains("stale")),
        "dropped result should leave a diagnostic trace"
    );
}

#[test]
fn selection_edits_leave_result_untouched() {
    let mut state = pinned_state();
    state.request_seq = 1;
    apply_delta(
        &mut state,
        Delta::SetTimetable {
            seq: 1,
            entries: vec!["국어".to_string()],
        },
    );

    state.select_next_option();
    state.cycle_focus_next();
    state.select_next_option();
    state.focus = Selector::Date;
    state.select_next_option();
    state.select_prev_option();

    assert_eq!(state.timetable, vec!["국어".to_string()]);
}

#[test]
fn selector_options_wrap_in_both_directions() {
    let mut state = pinned_state();

    state.focus = Selector::Grade;
    state.select_prev_option();
    assert_eq!(state.selected_grade(), "3");
    state.select_next_option();
    assert_eq!(state.selected_grade(), "1");

    state.focus = Selector::Class;
    for _ in 0..8 {
        state.select_next_option();
    }
    assert_eq!(state.selected_class(), "1");
}

#[test]
fn log_ring_is_bounded() {
    let mut state = pinned_state();
    for i in 0..250 {
        apply_delta(&mut state, Delta::Log(format!("line {i}")));
    }
    assert_eq!(state.logs.len(), 200);
    assert_eq!(state.logs.front().map(String::as_str), Some("line 50"));
}
