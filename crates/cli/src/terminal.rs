use client::{
    FieldAccessor, MemoryPage, Navigation, Notifier, Page, PageError, ProgressIndicator,
};
use domain::FormEntry;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::info;

/// Alert boxes become lines on stderr.
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, message: &str) {
        eprintln!("! {}", message);
    }
}

/// In-memory page that also echoes the visible side effects to the terminal.
pub struct TerminalPage {
    inner: MemoryPage,
}

impl TerminalPage {
    pub fn new(inner: MemoryPage) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &MemoryPage {
        &self.inner
    }
}

impl FieldAccessor for TerminalPage {
    fn value_by_name(&self, name: &str) -> Result<String, PageError> {
        self.inner.value_by_name(name)
    }

    fn value_by_id(&self, id: &str) -> Result<String, PageError> {
        self.inner.value_by_id(id)
    }

    fn set_value(&self, id: &str, value: &str) -> Result<(), PageError> {
        self.inner.set_value(id, value)
    }
}

impl Page for TerminalPage {
    fn set_text(&self, id: &str, text: &str) -> Result<(), PageError> {
        self.inner.set_text(id, text)
    }

    fn set_visible(&self, id: &str, visible: bool) -> Result<(), PageError> {
        self.inner.set_visible(id, visible)
    }

    fn scroll_into_view(&self, id: &str) -> Result<(), PageError> {
        self.inner.scroll_into_view(id)
    }

    fn focus(&self, id: &str) -> Result<(), PageError> {
        self.inner.focus(id)
    }

    fn click(&self, id: &str) -> Result<(), PageError> {
        self.inner.click(id)
    }

    fn form_entries(&self, form_id: &str) -> Result<Vec<FormEntry>, PageError> {
        self.inner.form_entries(form_id)
    }

    fn append_indicator(
        &self,
        section_id: &str,
        indicator: ProgressIndicator,
    ) -> Result<(), PageError> {
        info!("Uploading {} ({})", indicator.label, indicator.id);
        self.inner.append_indicator(section_id, indicator)
    }

    fn set_fill_offset(&self, id: &str, percent: i32) -> Result<(), PageError> {
        self.inner.set_fill_offset(id, percent)?;
        eprint!("\r{}: {:>3}% left", id, percent);
        if percent <= 0 {
            eprintln!();
        }
        Ok(())
    }

    fn append_to_field(&self, id: &str, text: &str) -> Result<(), PageError> {
        self.inner.append_to_field(id, text)
    }

    fn navigate(&self, navigation: Navigation) {
        info!("Navigating to {}", navigation.url);
        self.inner.navigate(navigation)
    }
}

/// Reads answers from stdin, one line per question.
pub struct Prompter {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompter {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// `None` once stdin is exhausted.
    pub async fn ask(&mut self, question: &str) -> anyhow::Result<Option<String>> {
        print!("{} ", question);
        std::io::stdout().flush()?;
        Ok(self.lines.next_line().await?)
    }
}
