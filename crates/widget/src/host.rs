//! Host page abstraction.
//!
//! The widget never talks to a rendering environment directly; everything
//! it needs from the embedding page goes through [`HostPage`]. Injection
//! is keyed, so re-injecting the same resource is a no-op and a style can
//! be replaced in place for theme hot-updates.

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;

/// Environment capability the widget depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Can create and remove rendering nodes.
    Dom,
    /// Can reach the network.
    Network,
    /// Can schedule timers.
    Timers,
}

impl Capability {
    pub const ALL: [Capability; 3] = [Capability::Dom, Capability::Network, Capability::Timers];

    pub fn name(&self) -> &'static str {
        match self {
            Capability::Dom => "dom",
            Capability::Network => "network",
            Capability::Timers => "timers",
        }
    }
}

/// What the widget asks of the page embedding it.
pub trait HostPage: Send + Sync {
    fn capabilities(&self) -> HashSet<Capability>;

    /// Insert or replace a style node. One node per key; same key and
    /// content is a no-op, same key and new content replaces in place.
    fn set_style(&self, key: &str, css: &str);

    fn remove_style(&self, key: &str);

    /// Insert a font link node keyed by URL. Re-inserting an existing URL
    /// is a no-op.
    fn add_font_link(&self, url: &str);

    fn remove_font_link(&self, url: &str);

    fn create_container(&self, id: &str);

    fn remove_container(&self, id: &str);
}

/// In-memory host used by tests and headless embedding.
#[derive(Default)]
pub struct MemoryHost {
    capabilities: HashSet<Capability>,
    styles: RwLock<HashMap<String, String>>,
    font_links: RwLock<HashSet<String>>,
    containers: RwLock<HashSet<String>>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self {
            capabilities: Capability::ALL.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Host lacking the given capabilities, for init failure tests.
    pub fn without(missing: &[Capability]) -> Self {
        let mut host = Self::new();
        for capability in missing {
            host.capabilities.remove(capability);
        }
        host
    }

    pub fn style(&self, key: &str) -> Option<String> {
        self.styles.read().get(key).cloned()
    }

    pub fn has_font_link(&self, url: &str) -> bool {
        self.font_links.read().contains(url)
    }

    pub fn font_link_count(&self) -> usize {
        self.font_links.read().len()
    }

    pub fn has_container(&self, id: &str) -> bool {
        self.containers.read().contains(id)
    }

    /// True when no injected node of any kind remains.
    pub fn is_clean(&self) -> bool {
        self.styles.read().is_empty()
            && self.font_links.read().is_empty()
            && self.containers.read().is_empty()
    }
}

impl HostPage for MemoryHost {
    fn capabilities(&self) -> HashSet<Capability> {
        self.capabilities.clone()
    }

    fn set_style(&self, key: &str, css: &str) {
        self.styles.write().insert(key.to_string(), css.to_string());
    }

    fn remove_style(&self, key: &str) {
        self.styles.write().remove(key);
    }

    fn add_font_link(&self, url: &str) {
        self.font_links.write().insert(url.to_string());
    }

    fn remove_font_link(&self, url: &str) {
        self.font_links.write().remove(url);
    }

    fn create_container(&self, id: &str) {
        self.containers.write().insert(id.to_string());
    }

    fn remove_container(&self, id: &str) {
        self.containers.write().remove(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_links_deduplicate_by_url() {
        let host = MemoryHost::new();
        host.add_font_link("https://fonts.example/inter");
        host.add_font_link("https://fonts.example/inter");
        assert_eq!(host.font_link_count(), 1);
    }

    #[test]
    fn style_replaces_in_place() {
        let host = MemoryHost::new();
        host.set_style("widget", "a{}");
        host.set_style("widget", "b{}");
        assert_eq!(host.style("widget").as_deref(), Some("b{}"));
    }

    #[test]
    fn without_drops_capabilities() {
        let host = MemoryHost::without(&[Capability::Timers]);
        assert!(!host.capabilities().contains(&Capability::Timers));
        assert!(host.capabilities().contains(&Capability::Dom));
    }
}
