//! Firestore repository implementation over the REST API.
//!
//! Uses `runQuery` for filtered reads and the documents endpoints for
//! writes. Collection layout:
//!
//! - `operations/{year}-{month}/records`: monthly operation partitions
//! - `fuel`, `repair`: flat expense collections queried by field equality
//! - `drivers`: driver registry keyed by driver id
//! - `imports`: transport-log checksums, keyed by checksum

mod documents;

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::DriverId;
use crate::db::repository::error::{ErrorContext, RepositoryError, RepositoryResult};
use crate::db::repository::{DriverRepository, LedgerRepository};
use crate::models::{Driver, FuelRecord, OperationRecord, PartitionMonth, RepairRecord};

const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com/v1";

/// Firestore connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirestoreConfig {
    pub project_id: String,
    /// Firestore database id; "(default)" unless the project uses named databases.
    pub database_id: String,
    /// REST endpoint base. Overridable to point at an emulator.
    pub base_url: String,
    /// Optional API key appended to every request.
    pub api_key: Option<String>,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl FirestoreConfig {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            database_id: "(default)".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }

    /// Builds a config from `FIRESTORE_*` environment variables.
    ///
    /// `FIRESTORE_PROJECT_ID` is required; the rest fall back to defaults.
    pub fn from_env() -> Result<Self, String> {
        let project_id = env::var("FIRESTORE_PROJECT_ID")
            .map_err(|_| "FIRESTORE_PROJECT_ID environment variable not set".to_string())?;

        let mut config = Self::new(project_id);
        if let Ok(database_id) = env::var("FIRESTORE_DATABASE_ID") {
            config.database_id = database_id;
        }
        if let Ok(base_url) = env::var("FIRESTORE_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(api_key) = env::var("FIRESTORE_API_KEY") {
            config.api_key = Some(api_key);
        }
        Ok(config)
    }
}

/// Firestore-backed repository.
#[derive(Debug)]
pub struct FirestoreRepository {
    client: reqwest::Client,
    config: FirestoreConfig,
}

impl FirestoreRepository {
    pub fn new(config: FirestoreConfig) -> RepositoryResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|err| {
                RepositoryError::configuration(format!("failed to build HTTP client: {}", err))
            })?;

        info!(
            "Firestore repository targeting project '{}' database '{}'",
            config.project_id, config.database_id
        );
        Ok(Self { client, config })
    }

    fn documents_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/{}/documents",
            self.config.base_url, self.config.project_id, self.config.database_id
        )
    }

    fn apply_api_key(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_key {
            Some(key) => request.query(&[("key", key.as_str())]),
            None => request,
        }
    }

    /// Runs a structured query, optionally under a parent document path.
    ///
    /// Returns the matched documents; result rows without a `document` key
    /// (progress markers) are dropped.
    async fn run_query(
        &self,
        parent_path: Option<&str>,
        structured_query: Value,
    ) -> RepositoryResult<Vec<Value>> {
        let url = match parent_path {
            Some(path) => format!("{}/{}:runQuery", self.documents_url(), path),
            None => format!("{}:runQuery", self.documents_url()),
        };

        let request = self
            .client
            .post(&url)
            .json(&json!({ "structuredQuery": structured_query }));
        let response = self
            .apply_api_key(request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(RepositoryError::not_found(format!(
                "query parent {} does not exist",
                parent_path.unwrap_or("(root)")
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RepositoryError::query(format!(
                "runQuery returned {}: {}",
                status, body
            )));
        }

        let rows: Vec<Value> = response.json().await.map_err(|err| {
            RepositoryError::serialization(format!("malformed runQuery response: {}", err))
        })?;
        debug!("runQuery under {:?} returned {} rows", parent_path, rows.len());
        Ok(rows
            .into_iter()
            .filter_map(|row| row.get("document").cloned())
            .collect())
    }

    /// Creates a document under a collection path, letting the server pick
    /// the document id.
    async fn create_document(&self, collection_path: &str, fields: Value) -> RepositoryResult<()> {
        let url = format!("{}/{}", self.documents_url(), collection_path);
        let request = self.client.post(&url).json(&json!({ "fields": fields }));
        let response = self
            .apply_api_key(request)
            .send()
            .await
            .map_err(map_transport_error)?;
        self.expect_success(response, collection_path).await?;
        Ok(())
    }

    /// Creates a document with an explicit id. 409 maps to `ValidationError`.
    async fn create_document_with_id(
        &self,
        collection_path: &str,
        document_id: &str,
        fields: Value,
    ) -> RepositoryResult<()> {
        let url = format!("{}/{}", self.documents_url(), collection_path);
        let request = self
            .client
            .post(&url)
            .query(&[("documentId", document_id)])
            .json(&json!({ "fields": fields }));
        let response = self
            .apply_api_key(request)
            .send()
            .await
            .map_err(map_transport_error)?;

        if response.status() == StatusCode::CONFLICT {
            return Err(RepositoryError::validation(format!(
                "document {}/{} already exists",
                collection_path, document_id
            )));
        }
        self.expect_success(response, collection_path).await?;
        Ok(())
    }

    /// Fetches a document by path. `Ok(None)` when it does not exist.
    async fn get_document(&self, document_path: &str) -> RepositoryResult<Option<Value>> {
        let url = format!("{}/{}", self.documents_url(), document_path);
        let response = self
            .apply_api_key(self.client.get(&url))
            .send()
            .await
            .map_err(map_transport_error)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = self.expect_success(response, document_path).await?;
        let document: Value = response.json().await.map_err(|err| {
            RepositoryError::serialization(format!("malformed document response: {}", err))
        })?;
        Ok(Some(document))
    }

    /// Replaces an existing document. 404 maps to `NotFound`.
    async fn replace_document(&self, document_path: &str, fields: Value) -> RepositoryResult<()> {
        let url = format!("{}/{}", self.documents_url(), document_path);
        let request = self
            .client
            .patch(&url)
            .query(&[("currentDocument.exists", "true")])
            .json(&json!({ "fields": fields }));
        let response = self
            .apply_api_key(request)
            .send()
            .await
            .map_err(map_transport_error)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(RepositoryError::not_found(format!(
                "document {} does not exist",
                document_path
            )));
        }
        self.expect_success(response, document_path).await?;
        Ok(())
    }

    /// Deletes an existing document. 404 maps to `NotFound`.
    async fn delete_document(&self, document_path: &str) -> RepositoryResult<()> {
        let url = format!("{}/{}", self.documents_url(), document_path);
        let request = self
            .client
            .delete(&url)
            .query(&[("currentDocument.exists", "true")]);
        let response = self
            .apply_api_key(request)
            .send()
            .await
            .map_err(map_transport_error)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(RepositoryError::not_found(format!(
                "document {} does not exist",
                document_path
            )));
        }
        self.expect_success(response, document_path).await?;
        Ok(())
    }

    async fn expect_success(
        &self,
        response: reqwest::Response,
        path: &str,
    ) -> RepositoryResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(RepositoryError::query_with_context(
            format!("request failed with {}: {}", status, body),
            ErrorContext::default().with_entity_id(path),
        ))
    }
}

fn map_transport_error(err: reqwest::Error) -> RepositoryError {
    if err.is_timeout() {
        RepositoryError::timeout(err.to_string())
    } else if err.is_connect() {
        RepositoryError::connection(err.to_string())
    } else {
        RepositoryError::query(err.to_string())
    }
}

#[async_trait]
impl LedgerRepository for FirestoreRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        // Probing any document path exercises auth and connectivity; 404
        // still proves the database answered.
        let url = format!("{}/drivers", self.documents_url());
        let response = self
            .apply_api_key(self.client.get(&url).query(&[("pageSize", "1")]))
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        Ok(status.is_success() || status == StatusCode::NOT_FOUND)
    }

    async fn query_operation_records(
        &self,
        vehicle_number: &str,
        partition: PartitionMonth,
    ) -> RepositoryResult<Vec<OperationRecord>> {
        let query = json!({
            "from": [{ "collectionId": "records" }],
            "where": documents::field_equals(
                "vehicleNumber",
                documents::string_value(vehicle_number),
            ),
        });
        let parent = format!("operations/{}", partition.key());
        let docs = self
            .run_query(Some(&parent), query)
            .await
            .map_err(|err| err.with_operation("query_operation_records"))?;
        docs.iter().map(documents::operation_from_document).collect()
    }

    async fn query_fuel_records(
        &self,
        vehicle_number: &str,
        partition: PartitionMonth,
    ) -> RepositoryResult<Vec<FuelRecord>> {
        let query = json!({
            "from": [{ "collectionId": "fuel" }],
            "where": documents::all_of(vec![
                documents::field_equals("vehicleNumber", documents::string_value(vehicle_number)),
                documents::field_equals("year", documents::string_value(&partition.year_field())),
                documents::field_equals("month", documents::string_value(&partition.month_field())),
            ]),
        });
        let docs = self
            .run_query(None, query)
            .await
            .map_err(|err| err.with_operation("query_fuel_records"))?;
        docs.iter().map(documents::fuel_from_document).collect()
    }

    async fn query_repair_records(
        &self,
        vehicle_number: &str,
        partition: PartitionMonth,
    ) -> RepositoryResult<Vec<RepairRecord>> {
        let query = json!({
            "from": [{ "collectionId": "repair" }],
            "where": documents::all_of(vec![
                documents::field_equals("vehicleNumber", documents::string_value(vehicle_number)),
                documents::field_equals("year", documents::string_value(&partition.year_field())),
                documents::field_equals("month", documents::string_value(&partition.month_field())),
            ]),
        });
        let docs = self
            .run_query(None, query)
            .await
            .map_err(|err| err.with_operation("query_repair_records"))?;
        docs.iter().map(documents::repair_from_document).collect()
    }

    async fn insert_operation_records(
        &self,
        partition: PartitionMonth,
        records: &[OperationRecord],
    ) -> RepositoryResult<usize> {
        let collection = format!("operations/{}/records", partition.key());
        for record in records {
            self.create_document(&collection, documents::operation_to_fields(record))
                .await
                .map_err(|err| err.with_operation("insert_operation_records"))?;
        }
        info!(
            "stored {} operation records in partition {}",
            records.len(),
            partition
        );
        Ok(records.len())
    }

    async fn insert_fuel_record(&self, record: &FuelRecord) -> RepositoryResult<()> {
        self.create_document("fuel", documents::fuel_to_fields(record))
            .await
            .map_err(|err| err.with_operation("insert_fuel_record"))
    }

    async fn insert_repair_record(&self, record: &RepairRecord) -> RepositoryResult<()> {
        self.create_document("repair", documents::repair_to_fields(record))
            .await
            .map_err(|err| err.with_operation("insert_repair_record"))
    }

    async fn has_import(&self, checksum: &str) -> RepositoryResult<bool> {
        let document = self
            .get_document(&format!("imports/{}", checksum))
            .await
            .map_err(|err| err.with_operation("has_import"))?;
        Ok(document.is_some())
    }

    async fn record_import(&self, checksum: &str, record_count: usize) -> RepositoryResult<()> {
        let fields = json!({
            "recordCount": documents::integer_value(record_count as i64),
            "importedAt": documents::string_value(&chrono::Utc::now().to_rfc3339()),
        });
        self.create_document_with_id("imports", checksum, fields)
            .await
            .map_err(|err| err.with_operation("record_import"))
    }
}

#[async_trait]
impl DriverRepository for FirestoreRepository {
    async fn create_driver(&self, driver: &Driver) -> RepositoryResult<Driver> {
        self.create_document_with_id(
            "drivers",
            driver.id.as_str(),
            documents::driver_to_fields(driver),
        )
        .await
        .map_err(|err| err.with_operation("create_driver"))?;
        Ok(driver.clone())
    }

    async fn get_driver(&self, driver_id: &DriverId) -> RepositoryResult<Driver> {
        let document = self
            .get_document(&format!("drivers/{}", driver_id))
            .await
            .map_err(|err| err.with_operation("get_driver"))?
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    format!("driver {} does not exist", driver_id),
                    ErrorContext::new("get_driver")
                        .with_entity("driver")
                        .with_entity_id(driver_id.as_str()),
                )
            })?;
        documents::driver_from_document(&document)
    }

    async fn find_driver_by_vehicle(
        &self,
        vehicle_number: &str,
    ) -> RepositoryResult<Option<Driver>> {
        let query = json!({
            "from": [{ "collectionId": "drivers" }],
            "where": documents::field_equals(
                "vehicleNumber",
                documents::string_value(vehicle_number),
            ),
            "limit": 1,
        });
        let docs = self
            .run_query(None, query)
            .await
            .map_err(|err| err.with_operation("find_driver_by_vehicle"))?;
        docs.first().map(documents::driver_from_document).transpose()
    }

    async fn list_drivers(&self) -> RepositoryResult<Vec<Driver>> {
        let query = json!({
            "from": [{ "collectionId": "drivers" }],
        });
        let docs = self
            .run_query(None, query)
            .await
            .map_err(|err| err.with_operation("list_drivers"))?;
        let mut drivers = docs
            .iter()
            .map(documents::driver_from_document)
            .collect::<RepositoryResult<Vec<Driver>>>()?;
        drivers.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(drivers)
    }

    async fn update_driver(&self, driver: &Driver) -> RepositoryResult<Driver> {
        self.replace_document(
            &format!("drivers/{}", driver.id),
            documents::driver_to_fields(driver),
        )
        .await
        .map_err(|err| err.with_operation("update_driver"))?;
        Ok(driver.clone())
    }

    async fn delete_driver(&self, driver_id: &DriverId) -> RepositoryResult<()> {
        self.delete_document(&format!("drivers/{}", driver_id))
            .await
            .map_err(|err| err.with_operation("delete_driver"))
    }
}
