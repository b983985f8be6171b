//! Page filling and the content channel.
//!
//! [`fill_page`] matches question titles to form data keys and runs each
//! matched control through its field handler. The editor never calls it
//! directly: it sends a [`FillRequest`] over a [`ContentChannel`] and only
//! logs what comes back.

use std::future::Future;
use std::path::{Path, PathBuf};

use formfill_shared::{DateOrder, FillConfig, FormData, FormFillError, Result, expand_home};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::handlers::{FieldEvent, FieldKind, fill_element};
use crate::page::FormPage;
use crate::store::FormDataStore;

// ---------------------------------------------------------------------------
// Filling
// ---------------------------------------------------------------------------

/// One control that received a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilledField {
    pub question: String,
    /// The form data key whose value was used.
    pub key: String,
    pub kind: FieldKind,
    /// Value as written, after any handler normalization.
    pub value: String,
    pub events: Vec<FieldEvent>,
}

/// Outcome of filling one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FillReport {
    pub filled: Vec<FilledField>,
    /// Questions with no matching form data key.
    pub unmatched: Vec<String>,
    /// Questions with a matching key but no control any handler accepts.
    pub unsupported: Vec<String>,
    /// Number of questions on the page.
    pub total: usize,
}

impl FillReport {
    pub fn status(&self) -> String {
        format!("Filled {} of {} fields", self.filled.len(), self.total)
    }
}

/// Fill every question on `page` that has an answer in `data`.
///
/// The first control in a question that a handler accepts is filled; the
/// rest of the question's controls are left alone.
pub fn fill_page(page: &mut FormPage, data: &FormData, date_order: DateOrder) -> FillReport {
    let mut report = FillReport {
        total: page.questions.len(),
        ..Default::default()
    };

    for question in &mut page.questions {
        let Some((key, answer)) = lookup_answer(data, &question.title) else {
            report.unmatched.push(question.title.clone());
            continue;
        };

        let filled = question
            .controls
            .iter_mut()
            .find_map(|control| {
                fill_element(&mut *control, answer, date_order).map(|kind| (kind, control))
            });

        match filled {
            Some((kind, control)) => report.filled.push(FilledField {
                question: question.title.clone(),
                key: key.to_string(),
                kind,
                value: control.value.clone(),
                events: control.events.clone(),
            }),
            None => report.unsupported.push(question.title.clone()),
        }
    }

    debug!(
        filled = report.filled.len(),
        unmatched = report.unmatched.len(),
        unsupported = report.unsupported.len(),
        "page filled"
    );
    report
}

/// Find the entry answering `title`: exact key first, then case-insensitive.
pub fn lookup_answer<'a>(data: &'a FormData, title: &str) -> Option<(&'a str, &'a str)> {
    data.iter()
        .find(|(key, _)| *key == title)
        .or_else(|| data.iter().find(|(key, _)| key.eq_ignore_ascii_case(title)))
}

// ---------------------------------------------------------------------------
// Content channel
// ---------------------------------------------------------------------------

/// Actions the editor can ask the page side to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FillAction {
    FillGoogleForms,
}

/// Message sent to the page side: `{"action": "FillGoogleForms"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillRequest {
    pub action: FillAction,
}

impl FillRequest {
    pub fn fill_google_forms() -> Self {
        Self {
            action: FillAction::FillGoogleForms,
        }
    }
}

/// Optional reply from the page side: `{"status": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillResponse {
    pub status: String,
}

/// Transport to whatever hosts the form page.
pub trait ContentChannel {
    fn send(&self, request: &FillRequest) -> impl Future<Output = Result<Option<FillResponse>>>;
}

/// Channel that fills a local HTML snapshot of a form page.
///
/// Form data is read from the store at request time. The fill report is
/// written next to the page as `<page>.fill.json` unless another path is set.
pub struct LocalPageChannel<S> {
    page: PathBuf,
    store: S,
    date_order: DateOrder,
    report_path: PathBuf,
}

impl<S: FormDataStore> LocalPageChannel<S> {
    pub fn new(page: impl Into<PathBuf>, store: S, date_order: DateOrder) -> Self {
        let page = page.into();
        let report_path = report_path_for(&page);
        Self {
            page,
            store,
            date_order,
            report_path,
        }
    }

    pub fn with_report_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_path = path.into();
        self
    }

    /// Where the fill report for this page is written.
    pub fn report_path(&self) -> &Path {
        &self.report_path
    }

    /// Fill the page and return the full report.
    pub async fn fill(&self) -> Result<FillReport> {
        let html = std::fs::read_to_string(&self.page).map_err(|e| {
            FormFillError::Channel(format!("cannot read page {}: {e}", self.page.display()))
        })?;
        let data = self.store.load().await?;

        let mut page = FormPage::parse(&html);
        let report = fill_page(&mut page, &data, self.date_order);

        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| FormFillError::Channel(format!("cannot encode fill report: {e}")))?;
        std::fs::write(&self.report_path, json)
            .map_err(|e| FormFillError::io(&self.report_path, e))?;
        info!(report = %self.report_path.display(), "fill report written");

        Ok(report)
    }
}

impl<S: FormDataStore> ContentChannel for LocalPageChannel<S> {
    async fn send(&self, request: &FillRequest) -> Result<Option<FillResponse>> {
        match request.action {
            FillAction::FillGoogleForms => {
                let report = self.fill().await?;
                Ok(Some(FillResponse {
                    status: report.status(),
                }))
            }
        }
    }
}

/// `<page>.fill.json` next to `page`.
pub fn report_path_for(page: &Path) -> PathBuf {
    let mut name = page.file_name().unwrap_or_default().to_os_string();
    name.push(".fill.json");
    page.with_file_name(name)
}

/// Fire-and-forget fill request. Transport errors are logged, not returned.
#[instrument(skip(channel))]
pub async fn request_fill<C: ContentChannel>(channel: &C) {
    match channel.send(&FillRequest::fill_google_forms()).await {
        Ok(Some(response)) => info!(status = %response.status, "form fill status"),
        Ok(None) => debug!("fill request sent, no response"),
        Err(e) => warn!(error = %e, "communication error"),
    }
}

/// After a save, ask the configured page to refill itself.
///
/// Does nothing when auto-fill is off or no page is configured.
pub async fn fill_after_save<S: FormDataStore>(store: S, config: &FillConfig) {
    if !config.auto_fill_on_save {
        return;
    }
    let Some(page) = config.page.as_deref() else {
        return;
    };
    let page = match expand_home(page) {
        Ok(page) => page,
        Err(e) => {
            warn!(error = %e, "cannot resolve fill page");
            return;
        }
    };
    let channel = LocalPageChannel::new(page, store, config.date_order);
    request_fill(&channel).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    const FIXTURE_PAGE: &str = "../../../fixtures/pages/google_form.html";

    fn contacts() -> FormData {
        [
            ("Full Name", "Jane Doe"),
            ("Email", "jane@example.com"),
            ("Date of Birth", "7/4/1990"),
            ("About me", "Likes tea"),
            ("Favourite colour", "Blue"),
        ]
        .into_iter()
        .collect()
    }

    fn temp_page() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ff_page_{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        let page = dir.join("form.html");
        std::fs::copy(FIXTURE_PAGE, &page).unwrap();
        page
    }

    #[test]
    fn fills_fixture_page() {
        let html = std::fs::read_to_string(FIXTURE_PAGE).unwrap();
        let mut page = FormPage::parse(&html);
        let report = fill_page(&mut page, &contacts(), DateOrder::DayFirst);

        let filled: Vec<_> = report
            .filled
            .iter()
            .map(|f| (f.question.as_str(), f.kind, f.value.as_str()))
            .collect();
        assert_eq!(
            filled,
            vec![
                ("Full Name", FieldKind::Text, "Jane Doe"),
                ("Email", FieldKind::Text, "jane@example.com"),
                ("Date of Birth", FieldKind::Date, "1990-04-07"),
                ("About Me", FieldKind::TextArea, "Likes tea"),
            ]
        );
        assert_eq!(report.filled[3].key, "About me");
        assert_eq!(report.unsupported, vec!["Favourite colour"]);
        assert_eq!(report.unmatched, vec!["Phone number"]);
        assert_eq!(report.status(), "Filled 4 of 6 fields");

        assert_eq!(page.questions[0].controls[0].value, "Jane Doe");
        assert_eq!(
            page.questions[0].controls[0].events,
            vec![FieldEvent::Input, FieldEvent::Change]
        );
    }

    #[test]
    fn month_first_reads_dates_differently() {
        let html = std::fs::read_to_string(FIXTURE_PAGE).unwrap();
        let mut page = FormPage::parse(&html);
        let report = fill_page(&mut page, &contacts(), DateOrder::MonthFirst);
        let date = report.filled.iter().find(|f| f.kind == FieldKind::Date).unwrap();
        assert_eq!(date.value, "1990-07-04");
    }

    #[test]
    fn exact_key_beats_case_insensitive() {
        let data: FormData = [("email", "lower@x.com"), ("Email", "exact@x.com")]
            .into_iter()
            .collect();
        assert_eq!(lookup_answer(&data, "Email"), Some(("Email", "exact@x.com")));
        assert_eq!(lookup_answer(&data, "EMAIL"), Some(("email", "lower@x.com")));
        assert_eq!(lookup_answer(&data, "Phone"), None);
    }

    #[test]
    fn request_and_response_wire_format() {
        let json = serde_json::to_string(&FillRequest::fill_google_forms()).unwrap();
        assert_eq!(json, r#"{"action":"FillGoogleForms"}"#);

        let response: FillResponse = serde_json::from_str(r#"{"status":"done"}"#).unwrap();
        assert_eq!(response.status, "done");
    }

    #[test]
    fn report_path_sits_next_to_page() {
        assert_eq!(
            report_path_for(Path::new("/tmp/forms/signup.html")),
            PathBuf::from("/tmp/forms/signup.html.fill.json")
        );
    }

    #[tokio::test]
    async fn local_channel_fills_and_writes_report() {
        let page = temp_page();
        let store = MemoryStore::with_data(&contacts()).unwrap();
        let channel = LocalPageChannel::new(&page, &store, DateOrder::DayFirst);

        let response = channel
            .send(&FillRequest::fill_google_forms())
            .await
            .unwrap()
            .expect("response");
        assert_eq!(response.status, "Filled 4 of 6 fields");

        let written = std::fs::read_to_string(channel.report_path()).unwrap();
        let report: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(report["total"], 6);
        assert_eq!(report["filled"][2]["value"], "1990-04-07");
        assert_eq!(report["filled"][0]["events"][1], "change");
    }

    #[tokio::test]
    async fn missing_page_is_a_channel_error() {
        let store = MemoryStore::new();
        let channel = LocalPageChannel::new("/nonexistent/form.html", &store, DateOrder::DayFirst);
        let err = channel.send(&FillRequest::fill_google_forms()).await.unwrap_err();
        assert!(matches!(err, FormFillError::Channel(_)));

        // Logged, never surfaced.
        request_fill(&channel).await;
    }

    #[tokio::test]
    async fn fill_after_save_respects_config() {
        let page = temp_page();
        let store = MemoryStore::with_data(&contacts()).unwrap();
        let report = report_path_for(&page);

        let disabled = FillConfig {
            auto_fill_on_save: false,
            page: Some(page.to_string_lossy().into_owned()),
            ..Default::default()
        };
        fill_after_save(&store, &disabled).await;
        assert!(!report.exists());

        let enabled = FillConfig {
            page: Some(page.to_string_lossy().into_owned()),
            ..Default::default()
        };
        fill_after_save(&store, &enabled).await;
        assert!(report.exists());
    }
}
