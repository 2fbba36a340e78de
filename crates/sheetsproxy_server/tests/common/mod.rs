#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use parking_lot::Mutex;
use serde_json::{Value, json};
use sheetsproxy_server::{ServerState, ServiceConfig, router};
use sheetsproxy_sheets::a1::column_label_to_index;
use sheetsproxy_sheets::worksheet::cell_text;
use sheetsproxy_sheets::{
    CellUpdate, Result, Row, SheetsConfig, SheetsError, SpreadsheetBackend, SpreadsheetRef,
    Worksheet,
};
use tower::ServiceExt;

pub const ACCESS_KEY: &str = "1234567";
pub const SPREADSHEET_KEY: &str = "sheet-key";
pub const WORKSHEET_TITLE: &str = "Tab1";

/// Worksheet operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Find,
    ReadRow,
    ReadRows,
    Append,
    BatchUpdate,
}

/// In memory stand in for a single worksheet.
#[derive(Debug, Default)]
pub struct FakeBackend {
    pub rows: Arc<Mutex<Vec<Row>>>,
    pub updates: Arc<Mutex<Vec<Vec<CellUpdate>>>>,
    pub opens: AtomicUsize,
    /// Fail every open with an API error carrying this message.
    pub fail_with: Option<String>,
    /// Open succeeds, but this operation fails with an API error.
    pub fail_op: Option<(Op, String)>,
}

impl FakeBackend {
    pub fn with_rows(rows: Vec<Row>) -> Self {
        FakeBackend {
            rows: Arc::new(Mutex::new(rows)),
            ..Default::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        FakeBackend {
            fail_with: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn failing_op(rows: Vec<Row>, op: Op, message: &str) -> Self {
        FakeBackend {
            rows: Arc::new(Mutex::new(rows)),
            fail_op: Some((op, message.to_string())),
            ..Default::default()
        }
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpreadsheetBackend for FakeBackend {
    async fn open(&self, reference: &SpreadsheetRef) -> Result<Box<dyn Worksheet>> {
        self.opens.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = &self.fail_with {
            return Err(SheetsError::Api {
                code: 500,
                message: message.clone(),
            });
        }
        if reference.spreadsheet_key != SPREADSHEET_KEY {
            return Err(SheetsError::Api {
                code: 404,
                message: "Requested entity was not found.".to_string(),
            });
        }
        if reference.worksheet_title != WORKSHEET_TITLE {
            return Err(SheetsError::WorksheetNotFound(
                reference.worksheet_title.clone(),
            ));
        }

        Ok(Box::new(FakeWorksheet {
            rows: self.rows.clone(),
            updates: self.updates.clone(),
            fail_op: self.fail_op.clone(),
        }))
    }
}

#[derive(Debug)]
struct FakeWorksheet {
    rows: Arc<Mutex<Vec<Row>>>,
    updates: Arc<Mutex<Vec<Vec<CellUpdate>>>>,
    fail_op: Option<(Op, String)>,
}

impl FakeWorksheet {
    fn check(&self, op: Op) -> Result<()> {
        match &self.fail_op {
            Some((failing, message)) if *failing == op => Err(SheetsError::Api {
                code: 500,
                message: message.clone(),
            }),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl Worksheet for FakeWorksheet {
    fn title(&self) -> &str {
        WORKSHEET_TITLE
    }

    async fn find_all_rows(&self, column_label: &str, value: &str) -> Result<Vec<u32>> {
        self.check(Op::Find)?;
        let col = column_label_to_index(column_label)? as usize - 1;
        let rows = self.rows.lock();
        Ok(rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.get(col).is_some_and(|cell| cell_text(cell) == value))
            .map(|(idx, _)| idx as u32 + 1)
            .collect())
    }

    async fn read_row(&self, row: u32) -> Result<Row> {
        self.check(Op::ReadRow)?;
        let rows = self.rows.lock();
        Ok(rows.get(row as usize - 1).cloned().unwrap_or_default())
    }

    async fn read_rows(&self, rows: &[u32], last_column: u32) -> Result<Vec<Row>> {
        self.check(Op::ReadRows)?;
        let all = self.rows.lock();
        Ok(rows
            .iter()
            .map(|row| {
                let mut contents = all.get(*row as usize - 1).cloned().unwrap_or_default();
                contents.truncate(last_column as usize);
                contents
            })
            .collect())
    }

    async fn append_rows(&self, rows: &[Row]) -> Result<()> {
        self.check(Op::Append)?;
        self.rows.lock().extend_from_slice(rows);
        Ok(())
    }

    async fn batch_update(&self, updates: &[CellUpdate]) -> Result<()> {
        self.check(Op::BatchUpdate)?;
        let mut rows = self.rows.lock();
        for update in updates {
            let col = column_label_to_index(&update.column_label)? as usize - 1;
            let row = &mut rows[update.row as usize - 1];
            if row.len() <= col {
                row.resize(col + 1, json!(""));
            }
            row[col] = update.value.clone();
        }
        self.updates.lock().push(updates.to_vec());
        Ok(())
    }
}

/// A small team roster with a header row.
pub fn roster() -> Vec<Row> {
    vec![
        vec![json!("id"), json!("name"), json!("team")],
        vec![json!("1"), json!("alice"), json!("red")],
        vec![json!("2"), json!("bob"), json!("blue")],
        vec![json!("3"), json!("carol"), json!("red")],
    ]
}

pub fn app(access_key: Option<&str>, backend: Arc<FakeBackend>) -> Router {
    logutil::init_test();
    let config = ServiceConfig::new(
        access_key.map(String::from),
        SheetsConfig::new("credentials.json"),
    );
    router(Arc::new(ServerState { config, backend }))
}

pub fn sheet_params() -> Value {
    json!({
        "spreadsheet_key": SPREADSHEET_KEY,
        "worksheet_title": WORKSHEET_TITLE,
    })
}

/// Merge extra fields into the worksheet reference params.
pub fn with_sheet(extra: Value) -> Value {
    let mut params = sheet_params();
    if let (Some(params), Some(extra)) = (params.as_object_mut(), extra.as_object()) {
        for (k, v) in extra {
            params.insert(k.clone(), v.clone());
        }
    }
    params
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestResponse {
    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }
}

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    access_key: Option<&str>,
    body: Option<Value>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = access_key {
        builder = builder.header("ACCESS_KEY", key);
    }
    let body = match body {
        Some(body) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&body).unwrap())
        }
        None => Body::empty(),
    };

    let resp = app.oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

    TestResponse { status, body }
}
