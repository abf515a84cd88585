//! Hosted PostgREST store client
//!
//! Talks to a `/rest/v1/{table}` endpoint authenticated with an API key, as
//! exposed by hosted Postgres providers.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use shared::models::{Lot, LotInput, Sale, SaleInput};

use super::rows::{decode_all, parse_id, LotRow, LotWrite, SaleRow, SaleWrite};
use super::{RecordStore, StoreError, StoreResult};

/// PostgREST client
#[derive(Clone)]
pub struct RestStore {
    client: Client,
    api_key: String,
    base_url: String,
}

impl RestStore {
    /// Create a client for the project at `base_url`
    pub fn new(base_url: String, api_key: String) -> Self {
        Self::with_client(Client::new(), base_url, api_key)
    }

    /// Create a client reusing an existing HTTP client (for testing)
    pub fn with_client(client: Client, base_url: String, api_key: String) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    fn returning(&self, request: RequestBuilder) -> RequestBuilder {
        self.authorized(request)
            .header("Prefer", "return=representation")
    }

    /// Fail on non-2xx, keeping the body for the log
    async fn check(response: Response) -> StoreResult<Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        if status == 409 && body.contains("lot_code") {
            return Err(StoreError::DuplicateLotCode(body));
        }
        Err(StoreError::Remote { status, body })
    }

    async fn rows<R: DeserializeOwned>(request: RequestBuilder) -> StoreResult<Vec<R>> {
        let response = Self::check(request.send().await?).await?;
        Ok(response.json::<Vec<R>>().await?)
    }

    /// Writes answer with the affected rows; none means the id did not match
    async fn single<R: DeserializeOwned>(request: RequestBuilder, id: &str) -> StoreResult<R> {
        Self::rows::<R>(request)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn list<R, T>(&self, table: &str) -> StoreResult<Vec<T>>
    where
        R: DeserializeOwned,
        T: TryFrom<R, Error = StoreError>,
    {
        let request = self
            .authorized(self.client.get(self.table_url(table)))
            .query(&[("select", "*"), ("order", "created_at.desc")]);
        decode_all(Self::rows::<R>(request).await?)
    }

    async fn delete_where(&self, table: &str, column: &str, id: &str) -> StoreResult<usize> {
        let request = self
            .returning(self.client.delete(self.table_url(table)))
            .query(&[(column, format!("eq.{}", id))]);
        Ok(Self::rows::<serde_json::Value>(request).await?.len())
    }
}

#[async_trait]
impl RecordStore for RestStore {
    fn name(&self) -> &'static str {
        "rest"
    }

    async fn list_lots(&self) -> StoreResult<Vec<Lot>> {
        self.list::<LotRow, Lot>("lots").await
    }

    async fn create_lot(&self, input: &LotInput) -> StoreResult<Lot> {
        let request = self
            .returning(self.client.post(self.table_url("lots")))
            .json(&LotWrite::from(input));
        let row: LotRow = Self::single(request, &input.lot_code).await?;
        Lot::try_from(row)
    }

    async fn update_lot(&self, id: &str, input: &LotInput) -> StoreResult<Lot> {
        parse_id(id)?;
        let request = self
            .returning(self.client.patch(self.table_url("lots")))
            .query(&[("id", format!("eq.{}", id))])
            .json(&LotWrite::from(input));
        let row: LotRow = Self::single(request, id).await?;
        Lot::try_from(row)
    }

    async fn delete_lot(&self, id: &str) -> StoreResult<()> {
        parse_id(id)?;
        // the hosted schema may lack the cascading foreign key
        let dropped = self.delete_where("sales", "lot_id", id).await?;
        tracing::debug!("Deleted {} sales of lot {}", dropped, id);
        if self.delete_where("lots", "id", id).await? == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn list_sales(&self) -> StoreResult<Vec<Sale>> {
        self.list::<SaleRow, Sale>("sales").await
    }

    async fn create_sale(&self, input: &SaleInput) -> StoreResult<Sale> {
        let request = self
            .returning(self.client.post(self.table_url("sales")))
            .json(&SaleWrite::from_input(input)?);
        let row: SaleRow = Self::single(request, &input.part_name).await?;
        Sale::try_from(row)
    }

    async fn update_sale(&self, id: &str, input: &SaleInput) -> StoreResult<Sale> {
        parse_id(id)?;
        let request = self
            .returning(self.client.patch(self.table_url("sales")))
            .query(&[("id", format!("eq.{}", id))])
            .json(&SaleWrite::from_input(input)?);
        let row: SaleRow = Self::single(request, id).await?;
        Sale::try_from(row)
    }

    async fn delete_sale(&self, id: &str) -> StoreResult<()> {
        parse_id(id)?;
        if self.delete_where("sales", "id", id).await? == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        let request = self
            .authorized(self.client.get(self.table_url("lots")))
            .query(&[("select", "id"), ("limit", "1")]);
        Self::check(request.send().await?).await?;
        Ok(())
    }
}
