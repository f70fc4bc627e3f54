pub mod feed;
pub mod state;
pub mod timetable_fetch;
