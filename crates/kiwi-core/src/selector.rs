use serde::{Deserialize, Serialize};

use crate::conversation::AppId;

/// The list of apps offered for selection
///
/// The list is requested once, when the selector is mounted. A failed request
/// leaves it empty; there is no reload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppSelector {
    apps: Vec<AppId>,
    requested: bool,
}

impl AppSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true the first time only; the caller fetches the list then
    pub fn mount(&mut self) -> bool {
        !std::mem::replace(&mut self.requested, true)
    }

    pub fn set_apps(&mut self, apps: Vec<AppId>) {
        self.apps = apps;
    }

    pub fn apps(&self) -> &[AppId] {
        &self.apps
    }

    pub fn get(&self, index: usize) -> Option<&AppId> {
        self.apps.get(index)
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    pub fn position(&self, app: &AppId) -> Option<usize> {
        self.apps.iter().position(|a| a == app)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mount_requests_only_once() {
        let mut selector = AppSelector::new();
        assert!(selector.mount());
        assert!(!selector.mount());
        assert!(!selector.mount());
    }

    #[test]
    fn test_set_apps_replaces_list() {
        let mut selector = AppSelector::new();
        selector.set_apps(vec!["blog".into(), "wiki".into()]);
        assert_eq!(selector.len(), 2);
        assert_eq!(selector.position(&"wiki".into()), Some(1));
        assert_eq!(selector.get(5), None);
    }
}
