//! Session cache of Persona records.
//!
//! The cache is the single source the pages render from. Readers only ever get a [`PersonaFeed`]
//! or a snapshot; mutation is crate-private and driven by [`crate::PersonaService`] after the
//! server has acknowledged a change. Each mutation and its notification happen in one
//! `watch::Sender` call, so subscribers never observe a half-applied update.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;
use tracing::debug;

use crate::{Persona, PersonaId};

/// Observable, ordered list of Personas (insertion order is display order)
pub struct PersonaCache {
    sender: watch::Sender<Vec<Persona>>,
    loaded: AtomicBool,
}

impl Default for PersonaCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PersonaCache {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(Vec::new());
        Self {
            sender,
            loaded: AtomicBool::new(false),
        }
    }

    /// Read-only feed of the current list and every later change.
    pub fn subscribe(&self) -> PersonaFeed {
        PersonaFeed {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn snapshot(&self) -> Vec<Persona> {
        self.sender.borrow().clone()
    }

    /// Whether the list has been fetched from the server at least once this session.
    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.sender.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sender.borrow().is_empty()
    }

    pub fn get(&self, id: PersonaId) -> Option<Persona> {
        self.sender
            .borrow()
            .iter()
            .find(|persona| persona.id == Some(id))
            .cloned()
    }

    /// Case-insensitive substring filter over nombre, apellido and email.
    pub fn filter(&self, query: &str) -> Vec<Persona> {
        self.sender
            .borrow()
            .iter()
            .filter(|persona| persona.matches(query))
            .cloned()
            .collect()
    }

    pub(crate) fn replace_all(&self, personas: Vec<Persona>) {
        debug!(count = personas.len(), "cache populated");
        self.sender.send_replace(personas);
        self.loaded.store(true, Ordering::Release);
    }

    /// Append a newly persisted record. A record whose id is already cached replaces that entry
    /// in place, so the list never holds two entries for one identity.
    pub(crate) fn insert(&self, persona: Persona) {
        self.sender.send_modify(|personas| {
            let existing = persona
                .id
                .and_then(|id| personas.iter().position(|p| p.id == Some(id)));
            match existing {
                Some(index) => personas[index] = persona,
                None => personas.push(persona),
            }
        });
    }

    /// Replace the entry for `id` in place. Returns `false` (and notifies nobody) when `id` is
    /// not cached.
    pub(crate) fn replace(&self, id: PersonaId, persona: Persona) -> bool {
        self.sender.send_if_modified(|personas| {
            match personas.iter_mut().find(|p| p.id == Some(id)) {
                Some(slot) => {
                    *slot = persona;
                    true
                }
                None => false,
            }
        })
    }

    /// Drop the entry for `id`. Returns `false` (and notifies nobody) when `id` is not cached.
    pub(crate) fn remove(&self, id: PersonaId) -> bool {
        self.sender.send_if_modified(|personas| {
            let before = personas.len();
            personas.retain(|p| p.id != Some(id));
            personas.len() != before
        })
    }

    pub(crate) fn clear(&self) {
        self.sender.send_replace(Vec::new());
        self.loaded.store(false, Ordering::Release);
    }
}

/// Subscription to the cache; yields the full list on every change.
#[derive(Clone)]
pub struct PersonaFeed {
    receiver: watch::Receiver<Vec<Persona>>,
}

impl PersonaFeed {
    /// The list as of now, without consuming the pending change flag.
    pub fn current(&self) -> Vec<Persona> {
        self.receiver.borrow().clone()
    }

    /// Whether a change arrived since the last [`PersonaFeed::changed`] or
    /// [`PersonaFeed::mark_seen`].
    pub fn has_changed(&self) -> bool {
        self.receiver.has_changed().unwrap_or(false)
    }

    /// Acknowledge the current list and return it.
    pub fn mark_seen(&mut self) -> Vec<Persona> {
        self.receiver.borrow_and_update().clone()
    }

    /// Wait for the next change. `None` once the owning cache is gone.
    pub async fn changed(&mut self) -> Option<Vec<Persona>> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn persona(id: PersonaId, nombre: &str) -> Persona {
        Persona {
            id: Some(id),
            ..Persona::new(nombre, "Apellido", "1990-01-01", format!("{}@x.com", id))
        }
    }

    fn ids(personas: &[Persona]) -> Vec<Option<PersonaId>> {
        personas.iter().map(|p| p.id).collect()
    }

    #[test]
    fn replace_all_marks_loaded() {
        let cache = PersonaCache::new();
        assert!(!cache.is_loaded());

        cache.replace_all(vec![persona(1, "Ana")]);

        assert!(cache.is_loaded());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn insert_never_duplicates_an_identity() {
        let cache = PersonaCache::new();
        cache.replace_all(vec![persona(1, "Ana"), persona(2, "Luis")]);

        cache.insert(persona(3, "Eva"));
        cache.insert(persona(1, "Anabel"));

        let personas = cache.snapshot();
        assert_eq!(ids(&personas), vec![Some(1), Some(2), Some(3)]);
        assert_eq!(personas[0].nombre, "Anabel");
    }

    #[test]
    fn replace_keeps_position() {
        let cache = PersonaCache::new();
        cache.replace_all(vec![persona(1, "Ana"), persona(2, "Luis"), persona(3, "Eva")]);

        assert!(cache.replace(2, persona(2, "Luisa")));

        let personas = cache.snapshot();
        assert_eq!(ids(&personas), vec![Some(1), Some(2), Some(3)]);
        assert_eq!(personas[1].nombre, "Luisa");
    }

    #[test]
    fn replace_of_unknown_id_changes_nothing() {
        let cache = PersonaCache::new();
        cache.replace_all(vec![persona(1, "Ana")]);
        let mut feed = cache.subscribe();
        feed.mark_seen();

        assert!(!cache.replace(9, persona(9, "Nadie")));

        assert_eq!(cache.len(), 1);
        assert!(!feed.has_changed());
    }

    #[test]
    fn remove_drops_exactly_one_entry() {
        let cache = PersonaCache::new();
        cache.replace_all(vec![persona(1, "Ana"), persona(2, "Luis")]);

        assert!(cache.remove(1));
        assert!(!cache.remove(1));

        assert_eq!(ids(&cache.snapshot()), vec![Some(2)]);
    }

    #[test]
    fn clear_resets_loaded_flag() {
        let cache = PersonaCache::new();
        cache.replace_all(vec![persona(1, "Ana")]);

        cache.clear();

        assert!(cache.is_empty());
        assert!(!cache.is_loaded());
    }

    #[test]
    fn every_subscriber_sees_each_change() {
        let cache = PersonaCache::new();
        let mut first = cache.subscribe();
        let mut second = cache.subscribe();

        cache.insert(persona(1, "Ana"));

        assert!(first.has_changed());
        assert!(second.has_changed());
        assert_eq!(ids(&first.mark_seen()), vec![Some(1)]);
        assert_eq!(ids(&second.mark_seen()), vec![Some(1)]);
        assert!(!first.has_changed());
    }

    #[test]
    fn waiting_subscriber_wakes_only_on_real_change() {
        use tokio_test::{assert_pending, assert_ready, task};

        let cache = PersonaCache::new();
        cache.replace_all(vec![persona(1, "Ana")]);
        let mut feed = cache.subscribe();
        feed.mark_seen();

        let mut changed = task::spawn(feed.changed());
        assert_pending!(changed.poll());

        assert!(!cache.remove(7));
        assert!(!changed.is_woken());

        cache.insert(persona(2, "Luis"));
        assert!(changed.is_woken());
        let personas = assert_ready!(changed.poll()).unwrap();
        assert_eq!(ids(&personas), vec![Some(1), Some(2)]);
    }

    #[tokio::test]
    async fn changed_yields_full_list() {
        let cache = PersonaCache::new();
        let mut feed = cache.subscribe();

        cache.replace_all(vec![persona(1, "Ana"), persona(2, "Luis")]);

        let personas = feed.changed().await.unwrap();
        assert_eq!(personas.len(), 2);
    }

    #[test]
    fn filter_matches_case_insensitively() {
        let cache = PersonaCache::new();
        cache.replace_all(vec![
            Persona {
                id: Some(1),
                ..Persona::new("Ana", "Garcia", "1990-01-01", "a@x.com")
            },
            Persona {
                id: Some(2),
                ..Persona::new("Luis", "Perez", "1990-01-01", "l@x.com")
            },
        ]);

        assert_eq!(ids(&cache.filter("GARCIA")), vec![Some(1)]);
        assert_eq!(ids(&cache.filter("x.com")), vec![Some(1), Some(2)]);
        assert!(cache.filter("zzz").is_empty());
    }
}
