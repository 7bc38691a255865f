//! Boilerplate produced by the generate endpoint.

const GOOGLE_DOCS_HANDLER: &str = include_str!("scaffolds/google_docs_handler.py");
const JOURNAL_TRACKER: &str = include_str!("scaffolds/journal_tracker.py");

/// Scaffold kinds with built-in content. Anything else gets [`ScaffoldKind::Generic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaffoldKind {
    GoogleDocsHandler,
    JournalTracker,
    Generic,
}

impl ScaffoldKind {
    #[must_use]
    pub fn from_type(module_type: Option<&str>) -> Self {
        match module_type.map(str::trim) {
            Some("google_docs_handler") => Self::GoogleDocsHandler,
            Some("journal_tracker") => Self::JournalTracker,
            _ => Self::Generic,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::GoogleDocsHandler => "google_docs_handler",
            Self::JournalTracker => "journal_tracker",
            Self::Generic => "generic",
        }
    }

    #[must_use]
    pub fn render(self, module_name: &str) -> String {
        match self {
            Self::GoogleDocsHandler => GOOGLE_DOCS_HANDLER.to_string(),
            Self::JournalTracker => JOURNAL_TRACKER.to_string(),
            Self::Generic => format!(
                "# {}\n\n'''\nAuto-generated module for {module_name}\n'''\n\n# Add your code here\n",
                title_case(&module_name.replace('_', " "))
            ),
        }
    }
}

/// Capitalizes the first letter of every alphabetic run and lowercases the rest.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;

    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }

    out
}
