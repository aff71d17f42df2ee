//! Scrapes the pilot-assignment table into a [`Snapshot`].
//!
//! Rows are read from `tbody#<table id>` for every configured table. Rows
//! with fewer than [`MIN_CELLS`] cells are layout rows and get skipped.
//! A record's id is `<table id>/<first cell>`, or `<table id>/<row number>`
//! when the first cell is blank, so ids stay unique across tables.

use crate::config::ScheduleSource;
use crate::error::FetchError;
use crate::ports;
use crate::types::schedule::{ScheduleRecord, Snapshot};

use scraper::{ElementRef, Html, Selector};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const MIN_CELLS: usize = 12;
const STATUS_CELL: usize = 1;
const TIME_CELL: usize = 3;
const SHIP_NAME_CELL: usize = 4;
const FROM_CELL: usize = 10;
const TO_CELL: usize = 11;
const REMARK_CELL: usize = 19;

const USER_AGENT: &str = concat!("pilotwatch/", env!("CARGO_PKG_VERSION"));

#[derive(Clone)]
pub struct PilotTableFetcher {
    client: reqwest::Client,
    source: ScheduleSource,
    table_ids: Arc<[String]>,
    timeout: Duration,
}

impl PilotTableFetcher {
    pub fn new(
        source: ScheduleSource,
        table_ids: Vec<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| FetchError::Http(format!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            client,
            source,
            table_ids: table_ids.into(),
            timeout,
        })
    }

    async fn load_page(&self) -> Result<String, FetchError> {
        match &self.source {
            ScheduleSource::Url(url) => {
                let response = self
                    .client
                    .get(url)
                    .header("Accept", "text/html,application/xhtml+xml")
                    .send()
                    .await
                    .map_err(request_error)?;
                let status = response.status();
                if !status.is_success() {
                    return Err(FetchError::Status(status.as_u16()));
                }
                response.text().await.map_err(request_error)
            }
            ScheduleSource::File(path) => {
                tokio::time::timeout(self.timeout, tokio::fs::read_to_string(path))
                    .await
                    .map_err(|_| FetchError::Timeout)?
                    .map_err(FetchError::Io)
            }
        }
    }
}

impl ports::ScheduleFetcher for PilotTableFetcher {
    type Fut<'a>
        = Pin<Box<dyn Future<Output = Result<Snapshot, FetchError>> + Send + 'a>>
    where
        Self: 'a;

    fn fetch<'a>(&'a self) -> Self::Fut<'a> {
        Box::pin(async move {
            let html = self.load_page().await?;
            let snapshot = parse_schedule(&html, &self.table_ids)?;
            debug!(ships = snapshot.len(), "pilot schedule fetched");
            Ok(snapshot)
        })
    }
}

fn request_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Http(err.to_string())
    }
}

/// Extracts schedule rows from the page.
///
/// Fails when none of the tables is present, which usually means the page
/// is not the schedule at all; an existing but empty table is an empty
/// snapshot.
pub(crate) fn parse_schedule(html: &str, table_ids: &[String]) -> Result<Snapshot, FetchError> {
    let document = Html::parse_document(html);
    let row_sel = Selector::parse("tr")
        .map_err(|e| FetchError::Parse(format!("invalid row selector: {e:?}")))?;
    let cell_sel = Selector::parse("td")
        .map_err(|e| FetchError::Parse(format!("invalid cell selector: {e:?}")))?;

    let mut snapshot = Vec::new();
    let mut found_table = false;

    for table_id in table_ids {
        let table_sel = Selector::parse(&format!("tbody#{table_id}"))
            .map_err(|e| FetchError::Parse(format!("invalid table id '{table_id}': {e:?}")))?;
        let Some(table) = document.select(&table_sel).next() else {
            debug!(table_id = %table_id, "schedule table not present");
            continue;
        };
        found_table = true;

        for (idx, row) in table.select(&row_sel).enumerate() {
            let cells: Vec<String> = row.select(&cell_sel).map(cell_text).collect();
            if cells.len() < MIN_CELLS {
                continue;
            }
            let key = match cells[0].as_str() {
                "" => (idx + 1).to_string(),
                key => key.to_string(),
            };
            snapshot.push(ScheduleRecord {
                id: format!("{table_id}/{key}"),
                status: cells[STATUS_CELL].clone(),
                time: cells[TIME_CELL].clone(),
                ship_name: cells[SHIP_NAME_CELL].clone(),
                from: cells[FROM_CELL].clone(),
                to: cells[TO_CELL].clone(),
                remark: cells.get(REMARK_CELL).cloned().unwrap_or_default(),
            });
        }
    }

    if !found_table {
        return Err(FetchError::Parse(format!(
            "none of the schedule tables were found: {}",
            table_ids.join(", ")
        )));
    }
    Ok(snapshot)
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}
