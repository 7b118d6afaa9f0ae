use folio_core::validation::MAX_NAME_CHARS;
use serde::Serialize;

/// One-shot status message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flash {
    pub message: String,
    /// `true` renders as a success alert, `false` as a failure alert.
    pub status: bool,
    /// Optional display name, e.g. the user who just logged in.
    pub name: Option<String>,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: true,
            name: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: false,
            name: None,
        }
    }

    /// Attach a display name, cut to [`MAX_NAME_CHARS`] characters.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.name = Some(match name.char_indices().nth(MAX_NAME_CHARS) {
            Some((end, _)) => name[..end].to_string(),
            None => name,
        });
        self
    }
}
