use std::collections::BTreeMap;

use crate::module_system::record::{Module, ModuleRecord};
use crate::utils;

/// In-process snapshot of the discovered modules.
///
/// Holds the ordered module list plus memoized enabled/disabled views, and
/// resolves aliases. Loading and persistence are the manager's job.
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    modules: Option<Vec<ModuleRecord>>,
    enabled: Option<Vec<ModuleRecord>>,
    disabled: Option<Vec<ModuleRecord>>,
    aliases: BTreeMap<String, String>,
}

impl ModuleRegistry {
    /// Registry with configured `alias -> canonical name` entries
    pub fn new(aliases: BTreeMap<String, String>) -> Self {
        Self { aliases, ..Self::default() }
    }

    pub fn is_loaded(&self) -> bool {
        self.modules.is_some()
    }

    /// Replace the snapshot; at most one record per name is kept
    pub fn set_modules(&mut self, records: Vec<ModuleRecord>) {
        let mut unique: Vec<ModuleRecord> = Vec::with_capacity(records.len());
        for record in records {
            if unique.iter().any(|existing| existing.name() == record.name()) {
                log::warn!("Dropping duplicate module record '{}'", record.name());
                continue;
            }
            unique.push(record);
        }
        self.modules = Some(unique);
        self.invalidate_filters();
    }

    /// Current snapshot, empty when nothing is loaded
    pub fn modules(&self) -> &[ModuleRecord] {
        self.modules.as_deref().unwrap_or(&[])
    }

    pub fn enabled(&mut self) -> &[ModuleRecord] {
        let modules = self.modules.as_deref().unwrap_or(&[]);
        self.enabled
            .get_or_insert_with(|| modules.iter().filter(|m| m.is_enabled()).cloned().collect())
    }

    pub fn disabled(&mut self) -> &[ModuleRecord] {
        let modules = self.modules.as_deref().unwrap_or(&[]);
        self.disabled
            .get_or_insert_with(|| modules.iter().filter(|m| !m.is_enabled()).cloned().collect())
    }

    /// Drop the memoized enabled/disabled views
    pub fn invalidate_filters(&mut self) {
        self.enabled = None;
        self.disabled = None;
    }

    /// Forget everything; the next access rediscovers
    pub fn reset(&mut self) {
        self.modules = None;
        self.invalidate_filters();
    }

    /// Canonical name for `name`.
    ///
    /// Lookup order: configured aliases, exact module name, descriptor
    /// aliases, the StudlyCase form of the name (`blog-posts` finds
    /// `BlogPosts`), then a case-insensitive name match.
    pub fn resolve_name(&self, name: &str) -> Option<String> {
        let target = self.alias_target(name).unwrap_or(name);
        let studly = utils::studly(target);
        let modules = self.modules();

        modules
            .iter()
            .find(|m| m.name() == target)
            .or_else(|| modules.iter().find(|m| m.answers_to(target)))
            .or_else(|| modules.iter().find(|m| m.name() == studly))
            .or_else(|| modules.iter().find(|m| m.name().eq_ignore_ascii_case(&studly)))
            .map(|m| m.name().to_string())
    }

    /// Configured alias target, matched exactly or lowercased
    fn alias_target(&self, alias: &str) -> Option<&str> {
        self.aliases
            .get(alias)
            .or_else(|| self.aliases.get(&alias.to_lowercase()))
            .map(String::as_str)
    }

    pub fn find(&self, name: &str) -> Option<&ModuleRecord> {
        let canonical = self.resolve_name(name)?;
        self.modules().iter().find(|m| m.name() == canonical)
    }

    pub(crate) fn find_mut(&mut self, name: &str) -> Option<&mut ModuleRecord> {
        let canonical = self.resolve_name(name)?;
        self.modules
            .as_mut()?
            .iter_mut()
            .find(|m| m.name() == canonical)
    }

    pub fn len(&self) -> usize {
        self.modules().len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules().is_empty()
    }
}
