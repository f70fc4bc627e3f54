use chrono::NaiveDate;
use neis_timetable::state::AppState;
use neis_timetable::timetable_fetch::{NeisConfig, TimetableClient};

fn fixture_client() -> TimetableClient {
    TimetableClient::new(NeisConfig {
        base_url: "https://neis.test/hub/hisTimetable".to_string(),
        api_key: "TESTKEY".to_string(),
        district_code: "J10".to_string(),
        school_code: "7531255".to_string(),
    })
    .expect("client should build")
}

#[test]
fn url_matches_example_scenario() {
    let client = fixture_client();
    let date = NaiveDate::from_ymd_opt(2024, 3, 4).expect("valid date");
    let url = client.timetable_url("2", "3", date);
    assert!(url.starts_with("https://neis.test/hub/hisTimetable?KEY=TESTKEY&Type=json"));
    assert!(url.contains("&ATPT_OFCDC_SC_CODE=J10&SD_SCHUL_CODE=7531255"));
    assert!(url.ends_with("&GRADE=2&CLASS_NM=3&ALL_TI_YMD=20240304"));
}

#[test]
fn url_covers_every_selectable_combination() {
    let client = fixture_client();
    let today = NaiveDate::from_ymd_opt(2024, 3, 4).expect("valid date");
    let state = AppState::with_today(today);

    for grade in &state.grades {
        for class_number in &state.classes {
            for date in &state.dates {
                let url = client.timetable_url(grade, class_number, *date);
                let expected = format!(
                    "&GRADE={grade}&CLASS_NM={class_number}&ALL_TI_YMD={}",
                    date.format("%Y%m%d")
                );
                assert!(url.contains(&expected), "missing {expected} in {url}");
            }
        }
    }
}

#[test]
fn date_window_spans_seven_days_from_today() {
    let today = NaiveDate::from_ymd_opt(2024, 12, 30).expect("valid date");
    let state = AppState::with_today(today);
    assert_eq!(state.dates.len(), 7);
    assert_eq!(state.dates[0], today);
    // The compact query format rolls over the year boundary correctly.
    assert_eq!(state.dates[6].format("%Y%m%d").to_string(), "20250105");
}
