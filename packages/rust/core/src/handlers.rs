//! Field handler table: which form controls can be filled, and how.
//!
//! Each [`FieldKind`] owns a selector predicate and a fill routine. Handlers
//! are tried in [`FieldKind::ALL`] order and the first match wins; the
//! predicates target distinct controls but nothing enforces that.

use std::fmt;
use std::sync::LazyLock;

use formfill_shared::DateOrder;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, trace};

// ---------------------------------------------------------------------------
// Element abstraction
// ---------------------------------------------------------------------------

/// Notification emitted after a control's value is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldEvent {
    Input,
    Change,
}

impl fmt::Display for FieldEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => write!(f, "input"),
            Self::Change => write!(f, "change"),
        }
    }
}

/// A form control the handlers can inspect and write to.
pub trait FormElement {
    /// Lowercase tag name (`input`, `textarea`, ...).
    fn tag_name(&self) -> &str;

    /// Lowercase `type` attribute, if present.
    fn input_type(&self) -> Option<&str>;

    fn set_value(&mut self, value: &str);

    /// Notify listeners that the value changed.
    fn dispatch_event(&mut self, event: FieldEvent);
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Input types handled as single-line text.
const TEXT_INPUT_TYPES: [&str; 5] = ["text", "email", "number", "tel", "url"];

/// `D/M/YYYY`-style answers; separators may be `/`, `-` or `.`.
static LOOSE_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{1,2})[/.\-]([0-9]{1,2})[/.\-]([0-9]{4})$").expect("date regex")
});

/// The kinds of form control formfill knows how to fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Single-line inputs: text, email, number, tel, url.
    Text,
    /// `<textarea>`.
    TextArea,
    /// `<input type="date">`.
    Date,
}

impl FieldKind {
    /// Handlers in dispatch order.
    pub const ALL: [FieldKind; 3] = [FieldKind::Text, FieldKind::TextArea, FieldKind::Date];

    /// CSS selector for the controls this handler fills.
    pub fn selector(self) -> &'static str {
        match self {
            Self::Text => {
                "input[type='text'], input[type='email'], input[type='number'], \
                 input[type='tel'], input[type='url']"
            }
            Self::TextArea => "textarea",
            Self::Date => "input[type='date']",
        }
    }

    /// Whether this handler accepts `element`.
    pub fn matches(self, element: &dyn FormElement) -> bool {
        let tag = element.tag_name();
        let input_type = element.input_type();
        match self {
            Self::Text => {
                tag == "input" && input_type.is_some_and(|t| TEXT_INPUT_TYPES.contains(&t))
            }
            Self::TextArea => tag == "textarea",
            Self::Date => tag == "input" && input_type == Some("date"),
        }
    }

    /// The first handler that accepts `element`.
    pub fn detect(element: &dyn FormElement) -> Option<FieldKind> {
        Self::ALL.into_iter().find(|kind| kind.matches(element))
    }

    /// Write `answer` into `element` and emit `input` then `change`.
    pub fn fill(self, element: &mut dyn FormElement, answer: &str, date_order: DateOrder) {
        let value = match self {
            Self::Text | Self::TextArea => answer.to_string(),
            Self::Date => normalize_date(answer, date_order),
        };
        trace!(kind = %self, value = %value, "filling control");
        element.set_value(&value);
        element.dispatch_event(FieldEvent::Input);
        element.dispatch_event(FieldEvent::Change);
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::TextArea => write!(f, "textarea"),
            Self::Date => write!(f, "date"),
        }
    }
}

/// Fill `element` with the handler that accepts it.
///
/// Returns the handler used, or `None` when no handler accepts the element
/// (the element is left untouched).
pub fn fill_element(
    element: &mut dyn FormElement,
    answer: &str,
    date_order: DateOrder,
) -> Option<FieldKind> {
    let kind = FieldKind::detect(element)?;
    kind.fill(element, answer, date_order);
    Some(kind)
}

/// Rewrite a `D/M/YYYY`-style answer as `YYYY-MM-DD`.
///
/// Day and month are zero-padded; `date_order` decides which of the first
/// two groups is the day. Anything else, including answers already in
/// `YYYY-MM-DD` form, is returned unchanged.
pub fn normalize_date(answer: &str, date_order: DateOrder) -> String {
    let Some(caps) = LOOSE_DATE_RE.captures(answer) else {
        return answer.to_string();
    };

    let (day, month) = match date_order {
        DateOrder::DayFirst => (&caps[1], &caps[2]),
        DateOrder::MonthFirst => (&caps[2], &caps[1]),
    };
    let normalized = format!("{}-{month:0>2}-{day:0>2}", &caps[3]);
    debug!(%answer, %normalized, %date_order, "normalized date answer");
    normalized
}
