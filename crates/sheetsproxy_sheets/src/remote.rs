use async_trait::async_trait;
use reqwest::Client;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::a1::{absolute_range, index_to_column_label, quoted_title};
use crate::client::{SheetsClient, build_http_client};
use crate::config::SheetsConfig;
use crate::credentials::ServiceAccount;
use crate::errors::{Result, SheetsError};
use crate::worksheet::{
    CellUpdate, Row, SpreadsheetBackend, SpreadsheetRef, Worksheet, matching_rows,
};

/// Values are written as given, without formula or format parsing.
const VALUE_INPUT_OPTION: &str = "RAW";

const NO_QUERY: &[(&str, &str)] = &[];

#[derive(Debug, Deserialize)]
struct SpreadsheetMetadata {
    #[serde(default)]
    sheets: Vec<Sheet>,
}

#[derive(Debug, Deserialize)]
struct Sheet {
    properties: SheetProperties,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Row>,
}

impl ValueRange {
    fn into_first_row(self) -> Row {
        self.values.into_iter().next().unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchGetResponse {
    #[serde(default)]
    value_ranges: Vec<ValueRange>,
}

#[derive(Debug, Serialize)]
struct ValueRangeBody<'a> {
    range: String,
    values: &'a [Row],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchUpdateBody<'a> {
    value_input_option: &'static str,
    data: Vec<ValueRangeBody<'a>>,
}

/// Backend talking to the Google Sheets v4 API.
#[derive(Debug)]
pub struct GoogleSheetsBackend {
    conf: SheetsConfig,
    http: Client,
}

impl GoogleSheetsBackend {
    pub fn try_new(conf: SheetsConfig) -> Result<Self> {
        let http = build_http_client(conf.request_timeout)?;
        Ok(GoogleSheetsBackend { conf, http })
    }

    /// Read credentials and exchange them for a session client.
    async fn authorize(&self) -> Result<SheetsClient> {
        let account = ServiceAccount::read_from_file(&self.conf.credentials_path).await?;
        let token = account
            .fetch_access_token(&self.http, self.conf.token_uri.as_ref())
            .await?;
        debug!(client_email = %account.client_email(), expires_in = token.expires_in, "authorized");

        Ok(SheetsClient::new(
            self.http.clone(),
            self.conf.api_url.clone(),
            token.access_token,
        ))
    }
}

#[async_trait]
impl SpreadsheetBackend for GoogleSheetsBackend {
    async fn open(&self, reference: &SpreadsheetRef) -> Result<Box<dyn Worksheet>> {
        let client = self.authorize().await?;

        let url = client.spreadsheet_url(&reference.spreadsheet_key, &[])?;
        let meta: SpreadsheetMetadata = client
            .get(url, &[("fields", "sheets.properties")])
            .await?;

        let properties = meta
            .sheets
            .into_iter()
            .map(|sheet| sheet.properties)
            .find(|props| props.title == reference.worksheet_title)
            .ok_or_else(|| SheetsError::WorksheetNotFound(reference.worksheet_title.clone()))?;

        debug!(
            spreadsheet_key = %reference.spreadsheet_key,
            title = %properties.title,
            sheet_id = properties.sheet_id,
            "opened worksheet"
        );

        Ok(Box::new(RemoteWorksheet {
            client,
            spreadsheet_key: reference.spreadsheet_key.clone(),
            properties,
        }))
    }
}

/// A worksheet opened through the Sheets API.
#[derive(Debug)]
pub struct RemoteWorksheet {
    client: SheetsClient,
    spreadsheet_key: String,
    properties: SheetProperties,
}

impl RemoteWorksheet {
    fn range(&self, range: &str) -> String {
        absolute_range(&self.properties.title, range)
    }

    async fn get_values(&self, range: &str) -> Result<ValueRange> {
        let range = self.range(range);
        let url = self
            .client
            .spreadsheet_url(&self.spreadsheet_key, &["values", range.as_str()])?;
        self.client.get(url, NO_QUERY).await
    }
}

#[async_trait]
impl Worksheet for RemoteWorksheet {
    fn title(&self) -> &str {
        &self.properties.title
    }

    async fn find_all_rows(&self, column_label: &str, value: &str) -> Result<Vec<u32>> {
        let column = self
            .get_values(&format!("{column_label}:{column_label}"))
            .await?;
        Ok(matching_rows(&column.values, value))
    }

    async fn read_row(&self, row: u32) -> Result<Row> {
        let values = self.get_values(&format!("{row}:{row}")).await?;
        Ok(values.into_first_row())
    }

    async fn read_rows(&self, rows: &[u32], last_column: u32) -> Result<Vec<Row>> {
        if rows.is_empty() || last_column == 0 {
            return Ok(vec![Vec::new(); rows.len()]);
        }

        let last = index_to_column_label(last_column)?;
        let ranges: Vec<_> = rows
            .iter()
            .map(|row| ("ranges", self.range(&format!("A{row}:{last}{row}"))))
            .collect();

        let url = self
            .client
            .spreadsheet_url(&self.spreadsheet_key, &["values:batchGet"])?;
        let resp: BatchGetResponse = self.client.get(url, &ranges).await?;

        let mut out: Vec<Row> = resp
            .value_ranges
            .into_iter()
            .map(ValueRange::into_first_row)
            .collect();
        out.resize(rows.len(), Vec::new());

        Ok(out)
    }

    async fn append_rows(&self, rows: &[Row]) -> Result<()> {
        let title = quoted_title(&self.properties.title);
        let append = format!("{title}:append");
        let url = self
            .client
            .spreadsheet_url(&self.spreadsheet_key, &["values", append.as_str()])?;
        let body = ValueRangeBody {
            range: title,
            values: rows,
        };

        let _: IgnoredAny = self
            .client
            .post(url, &[("valueInputOption", VALUE_INPUT_OPTION)], &body)
            .await?;

        Ok(())
    }

    async fn batch_update(&self, updates: &[CellUpdate]) -> Result<()> {
        if updates.is_empty() {
            return Ok(());
        }

        let values: Vec<[Row; 1]> = updates
            .iter()
            .map(|update| [vec![update.value.clone()]])
            .collect();
        let data = updates
            .iter()
            .zip(&values)
            .map(|(update, values)| ValueRangeBody {
                range: self.range(&update.range()),
                values: values.as_slice(),
            })
            .collect();
        let body = BatchUpdateBody {
            value_input_option: VALUE_INPUT_OPTION,
            data,
        };

        let url = self
            .client
            .spreadsheet_url(&self.spreadsheet_key, &["values:batchUpdate"])?;
        let _: IgnoredAny = self.client.post(url, NO_QUERY, &body).await?;

        Ok(())
    }
}
