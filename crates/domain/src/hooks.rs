use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::HookError;

/// Extension points the Markdown converter and editor look up by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookName {
    PreConversion,
    PostNormalization,
    PreBlockGamut,
    PostBlockGamut,
    PostSpanGamut,
    PlainLinkText,
    PostConversion,
    OnPreviewRefresh,
    PostBlockquoteCreation,
    InsertImageDialog,
}

impl HookName {
    pub const CONVERTER: [HookName; 7] = [
        HookName::PreConversion,
        HookName::PostNormalization,
        HookName::PreBlockGamut,
        HookName::PostBlockGamut,
        HookName::PostSpanGamut,
        HookName::PlainLinkText,
        HookName::PostConversion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HookName::PreConversion => "preConversion",
            HookName::PostNormalization => "postNormalization",
            HookName::PreBlockGamut => "preBlockGamut",
            HookName::PostBlockGamut => "postBlockGamut",
            HookName::PostSpanGamut => "postSpanGamut",
            HookName::PlainLinkText => "plainLinkText",
            HookName::PostConversion => "postConversion",
            HookName::OnPreviewRefresh => "onPreviewRefresh",
            HookName::PostBlockquoteCreation => "postBlockquoteCreation",
            HookName::InsertImageDialog => "insertImageDialog",
        }
    }
}

impl fmt::Display for HookName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type HookFn = Arc<dyn Fn(String) -> String + Send + Sync>;

#[derive(Clone)]
enum Hook {
    Identity,
    False,
    Func(HookFn),
}

/// Named text transforms. A hook must be registered with [`add_noop`] or
/// [`add_false`] before it can be chained or replaced.
///
/// [`add_noop`]: HookCollection::add_noop
/// [`add_false`]: HookCollection::add_false
#[derive(Clone, Default)]
pub struct HookCollection {
    hooks: HashMap<HookName, Hook>,
}

impl HookCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hook set consulted by the Markdown converter, all pass-through.
    pub fn converter() -> Self {
        let mut hooks = Self::new();
        for name in HookName::CONVERTER {
            hooks.add_noop(name);
        }
        hooks
    }

    /// Hook set consulted by the editor. The image dialog hook starts out
    /// answering false, which lets the editor fall back to its own prompt.
    pub fn editor() -> Self {
        let mut hooks = Self::new();
        hooks.add_noop(HookName::OnPreviewRefresh);
        hooks.add_noop(HookName::PostBlockquoteCreation);
        hooks.add_false(HookName::InsertImageDialog);
        hooks
    }

    pub fn is_registered(&self, name: HookName) -> bool {
        self.hooks.contains_key(&name)
    }

    /// Runs `func` on the output of the current hook. Chaining onto a
    /// pass-through hook simply installs `func`; a constant-false hook stays
    /// false.
    pub fn chain<F>(&mut self, name: HookName, func: F) -> Result<(), HookError>
    where
        F: Fn(String) -> String + Send + Sync + 'static,
    {
        let current = self
            .hooks
            .get_mut(&name)
            .ok_or(HookError::Unregistered(name))?;

        *current = match &*current {
            Hook::Identity => Hook::Func(Arc::new(func)),
            Hook::False => Hook::False,
            Hook::Func(original) => {
                let original = original.clone();
                Hook::Func(Arc::new(move |x: String| func(original(x))))
            }
        };
        Ok(())
    }

    pub fn set<F>(&mut self, name: HookName, func: F) -> Result<(), HookError>
    where
        F: Fn(String) -> String + Send + Sync + 'static,
    {
        let current = self
            .hooks
            .get_mut(&name)
            .ok_or(HookError::Unregistered(name))?;
        *current = Hook::Func(Arc::new(func));
        Ok(())
    }

    pub fn add_noop(&mut self, name: HookName) {
        self.hooks.insert(name, Hook::Identity);
    }

    pub fn add_false(&mut self, name: HookName) {
        self.hooks.insert(name, Hook::False);
    }

    /// Applies a hook. `Ok(None)` means the hook answered false.
    pub fn run(&self, name: HookName, input: impl Into<String>) -> Result<Option<String>, HookError> {
        match self.hooks.get(&name) {
            None => Err(HookError::Unregistered(name)),
            Some(Hook::Identity) => Ok(Some(input.into())),
            Some(Hook::False) => Ok(None),
            Some(Hook::Func(f)) => Ok(Some(f(input.into()))),
        }
    }
}

impl fmt::Debug for HookCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.hooks.keys().map(HookName::as_str).collect();
        names.sort_unstable();
        f.debug_struct("HookCollection").field("hooks", &names).finish()
    }
}
