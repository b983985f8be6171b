//! The form data store: `load()` / `save()` over a key/value collaborator.
//!
//! The whole mapping lives under [`FORM_DATA_KEY`] as one JSON object.

use std::future::Future;
use std::sync::Mutex;

use formfill_shared::{FORM_DATA_KEY, FormData, FormFillError, Result};
use formfill_storage::Storage;
use tracing::debug;

/// Persistence seam for the form data mapping.
pub trait FormDataStore {
    /// Read the persisted mapping. A store that has never been written
    /// yields an empty mapping.
    fn load(&self) -> impl Future<Output = Result<FormData>>;

    /// Replace the persisted mapping.
    fn save(&self, data: &FormData) -> impl Future<Output = Result<()>>;
}

impl<T: FormDataStore> FormDataStore for &T {
    fn load(&self) -> impl Future<Output = Result<FormData>> {
        (**self).load()
    }

    fn save(&self, data: &FormData) -> impl Future<Output = Result<()>> {
        (**self).save(data)
    }
}

impl FormDataStore for Storage {
    async fn load(&self) -> Result<FormData> {
        match self.get(FORM_DATA_KEY).await? {
            Some(json) => decode(&json),
            None => {
                debug!("no stored form data yet");
                Ok(FormData::new())
            }
        }
    }

    async fn save(&self, data: &FormData) -> Result<()> {
        let json = encode(data)?;
        self.set(FORM_DATA_KEY, &json).await?;
        debug!(entries = data.len(), "form data saved");
        Ok(())
    }
}

/// In-process store holding the serialized mapping, for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    value: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `data`.
    pub fn with_data(data: &FormData) -> Result<Self> {
        Ok(Self {
            value: Mutex::new(Some(encode(data)?)),
        })
    }

    fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>> {
        self.value
            .lock()
            .map_err(|_| FormFillError::Storage("memory store lock poisoned".into()))
    }
}

impl FormDataStore for MemoryStore {
    async fn load(&self) -> Result<FormData> {
        match self.slot()?.as_deref() {
            Some(json) => decode(json),
            None => Ok(FormData::new()),
        }
    }

    async fn save(&self, data: &FormData) -> Result<()> {
        let json = encode(data)?;
        *self.slot()? = Some(json);
        Ok(())
    }
}

fn encode(data: &FormData) -> Result<String> {
    serde_json::to_string(data)
        .map_err(|e| FormFillError::Storage(format!("failed to serialize form data: {e}")))
}

fn decode(json: &str) -> Result<FormData> {
    serde_json::from_str(json)
        .map_err(|e| FormFillError::validation(format!("stored form data is malformed: {e}")))
}
