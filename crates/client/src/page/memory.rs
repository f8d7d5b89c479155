use domain::{ids, FormEntry};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::PageError;
use crate::traits::{FieldAccessor, Navigation, Page, ProgressIndicator};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub id: Option<String>,
    pub name: Option<String>,
    pub form: Option<String>,
    pub parent: Option<String>,
    pub value: String,
    pub text: String,
    pub visible: bool,
    pub focused: bool,
    pub scrolled_into_view: bool,
    pub clicks: u32,
    pub fill_offset: Option<i32>,
    pub file: Option<PathBuf>,
}

impl Element {
    pub fn input(id: &str, name: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            name: Some(name.to_string()),
            visible: true,
            ..Self::default()
        }
    }

    pub fn container(id: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            visible: true,
            ..Self::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn in_form(mut self, form_id: &str) -> Self {
        self.form = Some(form_id.to_string());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// A page held in memory. Backs the terminal front end and the tests.
#[derive(Debug, Default)]
pub struct MemoryPage {
    elements: Mutex<Vec<Element>>,
    navigations: Mutex<Vec<Navigation>>,
}

impl MemoryPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Comment form of a post page with its (initially hidden) captcha panel.
    pub fn comment_form() -> Self {
        let page = Self::new();
        for field in ["name", "email", "website", "text"] {
            page.insert(Element::input(field, field));
        }
        page.insert(Element::input(ids::CAPTCHA_INPUT, "captcha"));
        page.insert(Element::input(ids::CAPTCHA_ID, ids::CAPTCHA_ID).hidden());
        page.insert(Element::container(ids::CAPTCHA_ALERT_BOX).hidden());
        page.insert(Element::container(ids::CAPTCHA_TASK_TEXT));
        page
    }

    /// Post editor: the edit form, its hidden file input and the upload
    /// progress section.
    pub fn edit_post_form() -> Self {
        let page = Self::new();
        page.insert(Element::container(ids::EDIT_POST_FORM));
        for field in [ids::TITLE, ids::URL, "tags"] {
            page.insert(Element::input(field, field).in_form(ids::EDIT_POST_FORM));
        }
        page.insert(Element::input(ids::POST_TEXTAREA, ids::TEXT).in_form(ids::EDIT_POST_FORM));
        page.insert(
            Element::input(ids::FILE_INPUT, "file")
                .in_form(ids::EDIT_POST_FORM)
                .hidden(),
        );
        page.insert(Element::container(ids::UPLOAD_SECTION));
        page
    }

    pub fn insert(&self, element: Element) {
        self.elements().push(element);
    }

    pub fn remove(&self, id: &str) {
        self.elements().retain(|e| e.id.as_deref() != Some(id));
    }

    pub fn element(&self, id: &str) -> Option<Element> {
        self.elements()
            .iter()
            .find(|e| e.id.as_deref() == Some(id))
            .cloned()
    }

    pub fn children_of(&self, parent_id: &str) -> Vec<Element> {
        self.elements()
            .iter()
            .filter(|e| e.parent.as_deref() == Some(parent_id))
            .cloned()
            .collect()
    }

    /// Puts a file into a file input, as the browser's picker would.
    pub fn select_file(&self, id: &str, path: impl Into<PathBuf>) -> Result<(), PageError> {
        let path = path.into();
        self.with_element(id, |e| {
            e.value = path.display().to_string();
            e.file = Some(path);
        })
    }

    pub fn navigations(&self) -> Vec<Navigation> {
        self.navigations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn elements(&self) -> MutexGuard<'_, Vec<Element>> {
        self.elements.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_element<R>(&self, id: &str, f: impl FnOnce(&mut Element) -> R) -> Result<R, PageError> {
        let mut elements = self.elements();
        let element = elements
            .iter_mut()
            .find(|e| e.id.as_deref() == Some(id))
            .ok_or_else(|| PageError::MissingElement(id.to_string()))?;
        Ok(f(element))
    }
}

impl FieldAccessor for MemoryPage {
    fn value_by_name(&self, name: &str) -> Result<String, PageError> {
        self.elements()
            .iter()
            .find(|e| e.name.as_deref() == Some(name))
            .map(|e| e.value.clone())
            .ok_or_else(|| PageError::MissingElement(name.to_string()))
    }

    fn value_by_id(&self, id: &str) -> Result<String, PageError> {
        self.with_element(id, |e| e.value.clone())
    }

    fn set_value(&self, id: &str, value: &str) -> Result<(), PageError> {
        self.with_element(id, |e| e.value = value.to_string())
    }
}

impl Page for MemoryPage {
    fn set_text(&self, id: &str, text: &str) -> Result<(), PageError> {
        self.with_element(id, |e| e.text = text.to_string())
    }

    fn set_visible(&self, id: &str, visible: bool) -> Result<(), PageError> {
        self.with_element(id, |e| e.visible = visible)
    }

    fn scroll_into_view(&self, id: &str) -> Result<(), PageError> {
        self.with_element(id, |e| e.scrolled_into_view = true)
    }

    fn focus(&self, id: &str) -> Result<(), PageError> {
        let mut elements = self.elements();
        if !elements.iter().any(|e| e.id.as_deref() == Some(id)) {
            return Err(PageError::MissingElement(id.to_string()));
        }
        for e in elements.iter_mut() {
            e.focused = e.id.as_deref() == Some(id);
        }
        Ok(())
    }

    fn click(&self, id: &str) -> Result<(), PageError> {
        self.with_element(id, |e| e.clicks += 1)
    }

    fn form_entries(&self, form_id: &str) -> Result<Vec<FormEntry>, PageError> {
        let elements = self.elements();
        if !elements.iter().any(|e| e.id.as_deref() == Some(form_id)) {
            return Err(PageError::MissingElement(form_id.to_string()));
        }
        let entries = elements
            .iter()
            .filter(|e| e.form.as_deref() == Some(form_id))
            .filter_map(|e| {
                let name = e.name.clone()?;
                match (&e.file, e.id.as_deref()) {
                    (Some(path), _) => Some(FormEntry::File {
                        name,
                        path: path.clone(),
                    }),
                    // 未选择文件的 file input 不参与提交
                    (None, Some(ids::FILE_INPUT)) => None,
                    (None, _) => Some(FormEntry::Text {
                        name,
                        value: e.value.clone(),
                    }),
                }
            })
            .collect();
        Ok(entries)
    }

    fn append_indicator(
        &self,
        section_id: &str,
        indicator: ProgressIndicator,
    ) -> Result<(), PageError> {
        let mut elements = self.elements();
        if !elements.iter().any(|e| e.id.as_deref() == Some(section_id)) {
            return Err(PageError::MissingElement(section_id.to_string()));
        }
        elements.push(Element {
            id: Some(indicator.id),
            parent: Some(section_id.to_string()),
            text: indicator.label,
            visible: true,
            ..Element::default()
        });
        Ok(())
    }

    fn set_fill_offset(&self, id: &str, percent: i32) -> Result<(), PageError> {
        self.with_element(id, |e| e.fill_offset = Some(percent))
    }

    fn append_to_field(&self, id: &str, text: &str) -> Result<(), PageError> {
        self.with_element(id, |e| e.value.push_str(text))
    }

    fn navigate(&self, navigation: Navigation) {
        self.navigations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(navigation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_resolve_by_id_and_name() {
        let page = MemoryPage::comment_form();
        page.set_value(ids::CAPTCHA_INPUT, "dvylika").unwrap();

        assert_eq!(page.value_by_name("captcha").unwrap(), "dvylika");
        assert_eq!(page.value_by_id(ids::CAPTCHA_INPUT).unwrap(), "dvylika");
        assert_eq!(
            page.value_by_name("nope").unwrap_err(),
            PageError::MissingElement("nope".into())
        );
    }

    #[test]
    fn form_entries_include_selected_file() {
        let page = MemoryPage::edit_post_form();
        page.set_value(ids::TITLE, "Hello").unwrap();

        let before = page.form_entries(ids::EDIT_POST_FORM).unwrap();
        assert!(before.iter().all(|e| matches!(e, FormEntry::Text { .. })));
        assert_eq!(before.len(), 4);

        page.select_file(ids::FILE_INPUT, "/tmp/cat.png").unwrap();
        let after = page.form_entries(ids::EDIT_POST_FORM).unwrap();
        assert!(after.contains(&FormEntry::File {
            name: "file".into(),
            path: PathBuf::from("/tmp/cat.png"),
        }));
        assert!(after.contains(&FormEntry::Text {
            name: "title".into(),
            value: "Hello".into(),
        }));
    }

    #[test]
    fn focus_moves_between_elements() {
        let page = MemoryPage::comment_form();
        page.focus("name").unwrap();
        page.focus(ids::CAPTCHA_INPUT).unwrap();

        assert!(!page.element("name").unwrap().focused);
        assert!(page.element(ids::CAPTCHA_INPUT).unwrap().focused);
        assert!(page.focus("ghost").is_err());
    }
}
