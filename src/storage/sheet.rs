use super::{Fetched, Revision, Table, TableStore};
use crate::errors::StoreError;
use async_trait::async_trait;
use reqwest::header::{ETAG, HeaderMap, IF_MATCH, IF_NONE_MATCH};
use reqwest::{Client, RequestBuilder, StatusCode};
use std::time::Duration;
use tracing::{debug, instrument};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A remote spreadsheet reached over HTTP.
///
/// `GET <url>` yields the table as JSON with an `ETag`; `PUT <url>` replaces
/// it, guarded by `If-Match` when a revision is known. A sheet that read as
/// missing is written with `If-None-Match: *`.
pub struct SheetStore {
    client: Client,
    url: String,
    token: Option<String>,
}

impl SheetStore {
    pub fn new(url: impl Into<String>, token: Option<String>) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            url: url.into(),
            token,
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

fn etag(headers: &HeaderMap) -> Option<Revision> {
    headers
        .get(ETAG)
        .and_then(|value| value.to_str().ok())
        .map(Revision::new)
}

#[async_trait]
impl TableStore for SheetStore {
    fn backend_tag(&self) -> &'static str {
        "sheet"
    }

    #[instrument(skip(self), fields(url = %self.url))]
    async fn read(&self) -> Result<Fetched, StoreError> {
        let response = self
            .authorize(self.client.get(&self.url))
            .send()
            .await
            .map_err(|err| StoreError::Unreachable(err.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(Fetched {
                table: Table::empty(),
                revision: Some(Revision::absent()),
            });
        }
        if !status.is_success() {
            return Err(StoreError::Unreachable(format!("sheet responded {status}")));
        }

        let revision = etag(response.headers());
        let table = response
            .json::<Table>()
            .await
            .map_err(|err| StoreError::Malformed(err.to_string()))?;
        debug!(rows = table.rows.len(), "sheet read");
        Ok(Fetched { table, revision })
    }

    #[instrument(skip(self, table), fields(url = %self.url, rows = table.rows.len()))]
    async fn write(
        &self,
        table: &Table,
        expected: Option<&Revision>,
    ) -> Result<Option<Revision>, StoreError> {
        let mut request = self.authorize(self.client.put(&self.url)).json(table);
        match expected {
            Some(expected) if expected.is_absent() => {
                request = request.header(IF_NONE_MATCH, "*");
            }
            Some(expected) => request = request.header(IF_MATCH, expected.as_str()),
            None => {}
        }

        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::PRECONDITION_FAILED {
            let found = etag(response.headers())
                .map(|revision| revision.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            return Err(StoreError::Conflict {
                expected: expected.map(ToString::to_string).unwrap_or_default(),
                found,
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Rejected(format!("sheet responded {status}: {body}")));
        }
        Ok(etag(response.headers()))
    }
}
