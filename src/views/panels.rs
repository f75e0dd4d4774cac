//! Text panels, the modal surface and the chart-data dropdown.

use std::sync::{Mutex, PoisonError};

/// Text field whose whole content is replaced on every update.
pub trait TextPanel: Send + Sync {
    fn set_text(&self, text: &str);
}

/// Shared modal dialog. `body_html` is rendered as markup.
pub trait ModalSurface: Send + Sync {
    fn show(&self, title: &str, body_html: &str);
}

/// Option of the chart data selection list. Both fields are already escaped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

pub trait DropdownSink: Send + Sync {
    fn append_options(&self, options: &[SelectOption]);
}

#[derive(Debug, Default)]
pub struct MemoryTextPanel {
    text: Mutex<String>,
}

impl MemoryTextPanel {
    pub fn text(&self) -> String {
        self.text.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl TextPanel for MemoryTextPanel {
    fn set_text(&self, text: &str) {
        *self.text.lock().unwrap_or_else(PoisonError::into_inner) = text.to_string();
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModalMessage {
    pub title: String,
    pub body_html: String,
}

/// Modal that records every message it was asked to show.
#[derive(Debug, Default)]
pub struct MemoryModal {
    shown: Mutex<Vec<ModalMessage>>,
}

impl MemoryModal {
    pub fn last(&self) -> Option<ModalMessage> {
        self.shown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    pub fn count(&self) -> usize {
        self.shown.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl ModalSurface for MemoryModal {
    fn show(&self, title: &str, body_html: &str) {
        self.shown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ModalMessage {
                title: title.to_string(),
                body_html: body_html.to_string(),
            });
    }
}

#[derive(Debug, Default)]
pub struct MemoryDropdown {
    options: Mutex<Vec<SelectOption>>,
}

impl MemoryDropdown {
    pub fn options(&self) -> Vec<SelectOption> {
        self.options.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl DropdownSink for MemoryDropdown {
    fn append_options(&self, options: &[SelectOption]) {
        self.options
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(options);
    }
}

/// Panel printing its content to stdout under a heading.
#[derive(Clone, Debug)]
pub struct ConsolePanel {
    heading: String,
}

impl ConsolePanel {
    pub fn new(heading: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
        }
    }
}

impl TextPanel for ConsolePanel {
    fn set_text(&self, text: &str) {
        println!("==== {} ====", self.heading);
        println!("{}", text.trim_end());
    }
}

/// Modal printing to stdout, one line per `<br>`.
#[derive(Clone, Debug, Default)]
pub struct ConsoleModal;

impl ModalSurface for ConsoleModal {
    fn show(&self, title: &str, body_html: &str) {
        println!("==== {} ====", title);
        for line in body_html.split("<br>").filter(|l| !l.is_empty()) {
            println!("{}", line);
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ConsoleDropdown;

impl DropdownSink for ConsoleDropdown {
    fn append_options(&self, options: &[SelectOption]) {
        for option in options {
            println!("{}\t{}", option.value, option.label);
        }
    }
}
