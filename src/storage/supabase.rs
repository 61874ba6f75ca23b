/// Supabase Storage client.
///
/// Objects live in a single bucket and are addressed through the storage
/// REST API:
///   GET  {url}/storage/v1/object/{bucket}/{name}   - download
///   POST {url}/storage/v1/object/{bucket}/{name}   - upload (x-upsert: true)
///
/// Both calls authenticate with the project key in the `apikey` and
/// `Authorization: Bearer` headers. Storage transfers are not time-bounded;
/// model artifacts can be large and a retrain is a blocking batch job.

use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::time::Duration;

use super::BlobStore;
use crate::error::StorageError;

pub struct SupabaseStore {
    client: Client,
    base_url: String,
    api_key: String,
    bucket: String,
}

impl SupabaseStore {
    pub fn new(base_url: &str, api_key: &str, bucket: &str) -> Result<Self, StorageError> {
        let client = Client::builder()
            .timeout(None::<Duration>)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            bucket: bucket.to_string(),
        })
    }

    /// Object URL for `name` in the configured bucket.
    pub fn object_url(&self, name: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            urlencoding::encode(&self.bucket),
            urlencoding::encode(name)
        )
    }
}

impl BlobStore for SupabaseStore {
    fn describe(&self) -> String {
        format!("Supabase bucket '{}' at {}", self.bucket, self.base_url)
    }

    fn fetch(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        let response = self
            .client
            .get(self.object_url(name))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()?;

        let status = response.status();
        // Supabase answers a missing object with 400 or 404 depending on version
        if status == StatusCode::NOT_FOUND || status == StatusCode::BAD_REQUEST {
            return Err(StorageError::NotFound(name.to_string()));
        }
        if !status.is_success() {
            return Err(StorageError::Http { status: status.as_u16(), name: name.to_string() });
        }

        Ok(response.bytes()?.to_vec())
    }

    fn put(&self, name: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let response = self
            .client
            .post(self.object_url(name))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("x-upsert", "true")
            .header("Content-Type", "application/octet-stream")
            .body(bytes.to_vec())
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::Http { status: status.as_u16(), name: name.to_string() });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_url_construction() {
        let store = SupabaseStore::new("https://abc.supabase.co/", "key", "data").unwrap();
        assert_eq!(
            store.object_url("best_flood_model.pkl"),
            "https://abc.supabase.co/storage/v1/object/data/best_flood_model.pkl"
        );
    }

    #[test]
    fn test_object_url_encodes_names() {
        let store = SupabaseStore::new("https://abc.supabase.co", "key", "data").unwrap();
        assert_eq!(
            store.object_url("flooded roads.csv"),
            "https://abc.supabase.co/storage/v1/object/data/flooded%20roads.csv"
        );
    }

    #[test]
    fn test_describe_names_bucket() {
        let store = SupabaseStore::new("https://abc.supabase.co", "key", "data").unwrap();
        assert!(store.describe().contains("'data'"));
    }
}
