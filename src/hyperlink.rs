use std::collections::HashMap;
use std::sync::Arc;

/// Interned handle to an OSC 8 hyperlink's `(id, uri)` pair. Cells carry
/// this instead of the URI string directly so that a long scrollback
/// full of the same link doesn't duplicate the string per cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HyperlinkId(u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hyperlink {
    /// The `id=` parameter from OSC 8, if the client supplied one.
    /// Distinct URIs sharing the same explicit id are meant to be
    /// treated as one link for hover-highlighting purposes.
    pub explicit_id: Option<String>,
    pub uri: Arc<str>,
}

/// Copy-on-write interning table for active hyperlinks. `OSC 8 ;; <uri>
/// ST` registers a link that every subsequently printed cell references
/// until the next `OSC 8 ;; ST` (empty URI) turns it off.
#[derive(Debug, Default)]
pub struct HyperlinkRegistry {
    links: Vec<Hyperlink>,
    by_key: HashMap<(Option<String>, String), HyperlinkId>,
    next_dedupe_scan: usize,
}

impl HyperlinkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns `(explicit_id, uri)`, returning the existing id if this
    /// exact pair was already seen.
    pub fn intern(&mut self, explicit_id: Option<String>, uri: String) -> HyperlinkId {
        let key = (explicit_id.clone(), uri.clone());
        if let Some(id) = self.by_key.get(&key) {
            return *id;
        }
        let id = HyperlinkId(self.links.len() as u32);
        self.links.push(Hyperlink {
            explicit_id,
            uri: Arc::from(uri.as_str()),
        });
        self.by_key.insert(key, id);
        id
    }

    pub fn get(&self, id: HyperlinkId) -> Option<&Hyperlink> {
        self.links.get(id.0 as usize)
    }

    /// Drops interned links no cell references anymore, given a live
    /// cell-id iterator supplied by the caller (the registry itself
    /// doesn't walk the grid). Returns the number of entries dropped.
    ///
    /// Compaction renumbers ids, so the caller must rewrite every
    /// surviving cell's `HyperlinkId` via the returned remap table
    /// before the old ids are used again.
    pub fn compact(&mut self, live: impl Fn(HyperlinkId) -> bool) -> HashMap<HyperlinkId, HyperlinkId> {
        let mut remap = HashMap::new();
        let mut kept = Vec::new();
        for (i, link) in self.links.drain(..).enumerate() {
            let old = HyperlinkId(i as u32);
            if live(old) {
                let new_id = HyperlinkId(kept.len() as u32);
                remap.insert(old, new_id);
                kept.push(link);
            }
        }
        self.links = kept;
        self.by_key.clear();
        for (i, link) in self.links.iter().enumerate() {
            self.by_key
                .insert((link.explicit_id.clone(), link.uri.to_string()), HyperlinkId(i as u32));
        }
        self.next_dedupe_scan = 0;
        remap
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_same_uri_returns_same_id() {
        let mut reg = HyperlinkRegistry::new();
        let a = reg.intern(None, "https://example.com".into());
        let b = reg.intern(None, "https://example.com".into());
        assert_eq!(a, b);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn distinct_explicit_ids_are_distinct_links() {
        let mut reg = HyperlinkRegistry::new();
        let a = reg.intern(Some("x".into()), "https://a".into());
        let b = reg.intern(Some("y".into()), "https://a".into());
        assert_ne!(a, b);
    }

    #[test]
    fn compact_drops_dead_links_and_remaps() {
        let mut reg = HyperlinkRegistry::new();
        let a = reg.intern(None, "https://a".into());
        let _b = reg.intern(None, "https://b".into());
        let remap = reg.compact(|id| id == a);
        assert_eq!(reg.len(), 1);
        assert_eq!(remap.get(&a), Some(&HyperlinkId(0)));
        assert_eq!(reg.get(HyperlinkId(0)).unwrap().uri.as_ref(), "https://a");
    }
}
