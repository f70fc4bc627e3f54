use std::env;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;

const NEIS_TIMETABLE_URL: &str = "https://open.neis.go.kr/hub/hisTimetable";
const DEFAULT_API_KEY: &str = "YOUR_API_KEY";
const DEFAULT_DISTRICT_CODE: &str = "J10";
const DEFAULT_SCHOOL_CODE: &str = "7531255";

/// Shown as the only list entry when a fetch fails, whatever the cause.
pub const FAILURE_MESSAGE: &str = "Could not load timetable";

#[derive(Debug, Clone)]
pub struct NeisConfig {
    pub base_url: String,
    pub api_key: String,
    pub district_code: String,
    pub school_code: String,
}

impl Default for NeisConfig {
    fn default() -> Self {
        Self {
            base_url: NEIS_TIMETABLE_URL.to_string(),
            api_key: DEFAULT_API_KEY.to_string(),
            district_code: DEFAULT_DISTRICT_CODE.to_string(),
            school_code: DEFAULT_SCHOOL_CODE.to_string(),
        }
    }
}

impl NeisConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: env_or("NEIS_BASE_URL", defaults.base_url),
            api_key: env_or("NEIS_API_KEY", defaults.api_key),
            district_code: env_or("NEIS_DISTRICT_CODE", defaults.district_code),
            school_code: env_or("NEIS_SCHOOL_CODE", defaults.school_code),
        }
    }
}

fn env_or(key: &str, default: String) -> String {
    match env::var(key) {
        Ok(val) if !val.trim().is_empty() => val.trim().to_string(),
        _ => default,
    }
}

/// Outcome of one fetch attempt. `entries` is always renderable as-is: the
/// real period list, or the single failure sentinel. The underlying cause
/// only ever travels through `diagnostic`.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub entries: Vec<String>,
    pub diagnostic: Option<String>,
}

pub struct TimetableClient {
    client: Client,
    config: NeisConfig,
}

impl TimetableClient {
    pub fn new(config: NeisConfig) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("failed to build http client")?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: Client, config: NeisConfig) -> Self {
        Self { client, config }
    }

    pub fn timetable_url(&self, grade: &str, class_number: &str, date: NaiveDate) -> String {
        let NeisConfig {
            base_url,
            api_key,
            district_code,
            school_code,
        } = &self.config;
        let ymd = date.format("%Y%m%d");
        format!(
            "{base_url}?KEY={api_key}&Type=json\
             &ATPT_OFCDC_SC_CODE={district_code}&SD_SCHUL_CODE={school_code}\
             &GRADE={grade}&CLASS_NM={class_number}&ALL_TI_YMD={ymd}"
        )
    }

    /// One GET, no retries. Every failure collapses here into the sentinel
    /// list entry; callers never see an error.
    pub fn fetch_timetable(&self, grade: &str, class_number: &str, date: NaiveDate) -> FetchOutcome {
        match self.request_timetable(grade, class_number, date) {
            Ok(entries) => FetchOutcome {
                entries,
                diagnostic: None,
            },
            Err(err) => FetchOutcome {
                entries: vec![FAILURE_MESSAGE.to_string()],
                diagnostic: Some(format!("{err:#}")),
            },
        }
    }

    fn request_timetable(
        &self,
        grade: &str,
        class_number: &str,
        date: NaiveDate,
    ) -> Result<Vec<String>> {
        let url = self.timetable_url(grade, class_number, date);
        let body = self
            .client
            .get(&url)
            .send()
            .context("request failed")?
            .error_for_status()
            .context("server returned error status")?
            .text()
            .context("failed to read response body")?;
        parse_timetable_json(&body)
    }
}

#[derive(Debug, Deserialize)]
struct TimetableRecord {
    #[serde(rename = "ITRT_CNTNT")]
    content: String,
}

/// NEIS wraps the payload in a two-element `hisTimetable` array: element 0
/// carries the result head, element 1 the `row` list of period records.
pub fn parse_timetable_json(raw: &str) -> Result<Vec<String>> {
    let root: Value = serde_json::from_str(raw.trim()).context("invalid timetable json")?;
    let sections = root
        .get("hisTimetable")
        .and_then(|v| v.as_array())
        .context("missing hisTimetable array")?;
    let data = sections
        .get(1)
        .context("hisTimetable has no data section")?;
    let rows = data
        .get("row")
        .and_then(|v| v.as_array())
        .context("missing row list")?;

    rows.iter()
        .map(|row| {
            let record: TimetableRecord = serde_json::from_value(row.clone())
                .context("record missing ITRT_CNTNT")?;
            Ok(record.content)
        })
        .collect()
}
