use std::collections::VecDeque;

use chrono::{Days, Local, NaiveDate};

pub const GRADE_RANGE: std::ops::RangeInclusive<u32> = 1..=3;
pub const CLASS_RANGE: std::ops::RangeInclusive<u32> = 1..=8;
pub const DATE_WINDOW_DAYS: u64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    Grade,
    Class,
    Date,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub grades: Vec<String>,
    pub classes: Vec<String>,
    pub dates: Vec<NaiveDate>,
    pub grade_idx: usize,
    pub class_idx: usize,
    pub date_idx: usize,
    pub focus: Selector,
    pub timetable: Vec<String>,
    pub timetable_scroll: u16,
    pub request_seq: u64,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::with_today(Local::now().date_naive())
    }

    /// Option lists are fixed for the whole session; the date window is
    /// anchored at `today` so tests can pin it.
    pub fn with_today(today: NaiveDate) -> Self {
        let grades = GRADE_RANGE.map(|g| g.to_string()).collect();
        let classes = CLASS_RANGE.map(|c| c.to_string()).collect();
        let dates = (0..DATE_WINDOW_DAYS)
            .map(|offset| today + Days::new(offset))
            .collect();
        Self {
            grades,
            classes,
            dates,
            grade_idx: 0,
            class_idx: 0,
            date_idx: 0,
            focus: Selector::Grade,
            timetable: Vec::new(),
            timetable_scroll: 0,
            request_seq: 0,
            logs: VecDeque::with_capacity(200),
            help_overlay: false,
        }
    }

    pub fn selected_grade(&self) -> &str {
        &self.grades[self.grade_idx]
    }

    pub fn selected_class(&self) -> &str {
        &self.classes[self.class_idx]
    }

    pub fn selected_date(&self) -> NaiveDate {
        self.dates[self.date_idx]
    }

    pub fn cycle_focus_next(&mut self) {
        self.focus = match self.focus {
            Selector::Grade => Selector::Class,
            Selector::Class => Selector::Date,
            Selector::Date => Selector::Grade,
        };
    }

    pub fn cycle_focus_prev(&mut self) {
        self.focus = match self.focus {
            Selector::Grade => Selector::Date,
            Selector::Class => Selector::Grade,
            Selector::Date => Selector::Class,
        };
    }

    pub fn select_next_option(&mut self) {
        match self.focus {
            Selector::Grade => self.grade_idx = (self.grade_idx + 1) % self.grades.len(),
            Selector::Class => self.class_idx = (self.class_idx + 1) % self.classes.len(),
            Selector::Date => self.date_idx = (self.date_idx + 1) % self.dates.len(),
        }
    }

    pub fn select_prev_option(&mut self) {
        match self.focus {
            Selector::Grade => self.grade_idx = wrap_prev(self.grade_idx, self.grades.len()),
            Selector::Class => self.class_idx = wrap_prev(self.class_idx, self.classes.len()),
            Selector::Date => self.date_idx = wrap_prev(self.date_idx, self.dates.len()),
        }
    }

    pub fn scroll_timetable_down(&mut self) {
        let lines = self.timetable.len();
        if lines == 0 {
            self.timetable_scroll = 0;
            return;
        }
        let max_scroll = (lines - 1).min(u16::MAX as usize) as u16;
        if self.timetable_scroll < max_scroll {
            self.timetable_scroll += 1;
        }
    }

    pub fn scroll_timetable_up(&mut self) {
        self.timetable_scroll = self.timetable_scroll.saturating_sub(1);
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

fn wrap_prev(idx: usize, len: usize) -> usize {
    if idx == 0 { len - 1 } else { idx - 1 }
}

#[derive(Debug, Clone)]
pub enum Delta {
    SetTimetable { seq: u64, entries: Vec<String> },
    Log(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    FetchTimetable {
        seq: u64,
        grade: String,
        class_number: String,
        date: NaiveDate,
    },
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SetTimetable { seq, entries } => {
            // Only the most recently initiated fetch may commit; a completion
            // carrying an older sequence raced a newer request and is dropped.
            if seq != state.request_seq {
                state.push_log(format!(
                    "[INFO] Dropped stale timetable result (seq {seq}, current {})",
                    state.request_seq
                ));
                return;
            }
            state.timetable = entries;
            state.timetable_scroll = 0;
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
