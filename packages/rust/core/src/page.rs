//! Form page scanning.
//!
//! Turns an HTML snapshot of a form into [`Question`]s, each holding the
//! fillable controls that belong to it. Google Forms pages mark every question
//! as a `[role="listitem"]` block titled by a `[role="heading"]`; other pages
//! fall back to one question per control, titled from its `<label>`,
//! `aria-label`, `name` or `placeholder`.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use tracing::debug;

use crate::handlers::{FieldEvent, FieldKind, FormElement};

static QUESTION_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[role="listitem"]"#).expect("question selector"));

static HEADING_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[role="heading"]"#).expect("heading selector"));

static LABEL_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("label[for]").expect("label selector"));

/// Every control any handler can fill.
static CONTROL_SEL: LazyLock<Selector> = LazyLock::new(|| {
    let all = FieldKind::ALL
        .iter()
        .map(|kind| kind.selector())
        .collect::<Vec<_>>()
        .join(", ");
    Selector::parse(&all).expect("control selector")
});

/// A fillable control lifted out of the page, with the writes made to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormControl {
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub value: String,
    pub events: Vec<FieldEvent>,
}

impl FormControl {
    fn from_element(el: ElementRef<'_>) -> Self {
        let attr = |name: &str| el.value().attr(name).map(str::to_string);
        Self {
            tag: el.value().name().to_ascii_lowercase(),
            input_type: el.value().attr("type").map(str::to_ascii_lowercase),
            name: attr("name"),
            id: attr("id"),
            value: attr("value").unwrap_or_default(),
            events: Vec::new(),
        }
    }
}

impl FormElement for FormControl {
    fn tag_name(&self) -> &str {
        &self.tag
    }

    fn input_type(&self) -> Option<&str> {
        self.input_type.as_deref()
    }

    fn set_value(&mut self, value: &str) {
        self.value = value.to_string();
    }

    fn dispatch_event(&mut self, event: FieldEvent) {
        self.events.push(event);
    }
}

/// One question on the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    /// Normalized title (whitespace collapsed, required-marker `*` removed).
    pub title: String,
    /// Fillable controls inside the question, in document order.
    pub controls: Vec<FormControl>,
}

/// A scanned form page.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FormPage {
    pub questions: Vec<Question>,
}

impl FormPage {
    /// Scan an HTML document for questions and their fillable controls.
    pub fn parse(html: &str) -> Self {
        let doc = Html::parse_document(html);

        let mut questions = questions_from_list_items(&doc);
        if questions.is_empty() {
            questions = questions_from_controls(&doc);
        }

        debug!(questions = questions.len(), "form page scanned");
        Self { questions }
    }
}

fn questions_from_list_items(doc: &Html) -> Vec<Question> {
    let mut questions = Vec::new();
    for item in doc.select(&QUESTION_SEL) {
        let Some(heading) = item.select(&HEADING_SEL).next() else {
            continue;
        };
        let title = normalize_title(&heading.text().collect::<String>());
        if title.is_empty() {
            continue;
        }
        let controls = item
            .select(&CONTROL_SEL)
            .map(FormControl::from_element)
            .collect();
        questions.push(Question { title, controls });
    }
    questions
}

fn questions_from_controls(doc: &Html) -> Vec<Question> {
    let labels: Vec<(String, String)> = doc
        .select(&LABEL_SEL)
        .filter_map(|label| {
            let target = label.value().attr("for")?.to_string();
            Some((target, label.text().collect::<String>()))
        })
        .collect();

    doc.select(&CONTROL_SEL)
        .filter_map(|el| {
            let control = FormControl::from_element(el);
            let from_label = control.id.as_deref().and_then(|id| {
                labels
                    .iter()
                    .find(|(target, _)| target == id)
                    .map(|(_, text)| text.clone())
            });
            let raw = from_label
                .or_else(|| el.value().attr("aria-label").map(str::to_string))
                .or_else(|| control.name.clone())
                .or_else(|| el.value().attr("placeholder").map(str::to_string))?;
            let title = normalize_title(&raw);
            (!title.is_empty()).then(|| Question {
                title,
                controls: vec![control],
            })
        })
        .collect()
}

/// Collapse whitespace and drop a trailing required-field `*`.
pub fn normalize_title(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.trim_end_matches('*').trim_end().to_string()
}
