use std::collections::HashMap;

use uuid::Uuid;

use crate::models::Address;

/// A user's addresses held in memory while a mutation is applied.
///
/// At most one entry is default after any operation: promoting an entry clears
/// the flag everywhere else.
#[derive(Debug, Clone, Default)]
pub struct AddressBook {
    entries: Vec<Address>,
}

/// Row-level writes needed to turn one snapshot of a book into another.
#[derive(Debug, Default, PartialEq)]
pub struct AddressChanges {
    pub removed: Vec<Uuid>,
    pub updated: Vec<Address>,
    pub inserted: Vec<Address>,
}

impl AddressChanges {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.updated.is_empty() && self.inserted.is_empty()
    }
}

impl AddressBook {
    pub fn new(entries: Vec<Address>) -> Self {
        let mut book = Self { entries };
        book.sort();
        book
    }

    pub fn entries(&self) -> &[Address] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<Address> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&Address> {
        self.entries.iter().find(|a| a.id == id)
    }

    pub fn default_address(&self) -> Option<&Address> {
        self.entries.iter().find(|a| a.is_default)
    }

    /// Add an entry. The first address in an empty book always becomes the default.
    pub fn add(&mut self, mut address: Address) {
        if self.entries.is_empty() {
            address.is_default = true;
        }
        let id = address.id;
        let make_default = address.is_default;
        self.entries.push(address);
        if make_default {
            self.set_default(id);
        }
        self.sort();
    }

    /// Replace the entry with the same id, keeping its owner and creation time.
    /// Returns false when no such entry exists.
    pub fn replace(&mut self, address: Address) -> bool {
        let Some(slot) = self.entries.iter_mut().find(|a| a.id == address.id) else {
            return false;
        };
        let id = address.id;
        let make_default = address.is_default;
        *slot = Address {
            user_id: slot.user_id,
            created_at: slot.created_at,
            ..address
        };
        if make_default {
            self.set_default(id);
        }
        self.sort();
        true
    }

    /// Remove an entry. If it was the default, the oldest remaining entry takes over.
    pub fn remove(&mut self, id: Uuid) -> Option<Address> {
        let pos = self.entries.iter().position(|a| a.id == id)?;
        let removed = self.entries.remove(pos);
        if removed.is_default {
            if let Some(oldest) = self.entries.iter_mut().min_by_key(|a| a.created_at) {
                oldest.is_default = true;
            }
        }
        self.sort();
        Some(removed)
    }

    /// Mark one entry default and clear the flag on every other entry.
    pub fn set_default(&mut self, id: Uuid) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        for entry in &mut self.entries {
            entry.is_default = entry.id == id;
        }
        self.sort();
        true
    }

    /// Compute the writes that take `before` to the current contents.
    ///
    /// Updates clearing a default flag come before those setting one, so the
    /// one-default-per-user index holds after every statement.
    pub fn changes_since(&self, before: &[Address]) -> AddressChanges {
        let previous: HashMap<Uuid, &Address> = before.iter().map(|a| (a.id, a)).collect();
        let mut changes = AddressChanges::default();

        for old in before {
            if self.get(old.id).is_none() {
                changes.removed.push(old.id);
            }
        }
        for entry in &self.entries {
            match previous.get(&entry.id) {
                None => changes.inserted.push(entry.clone()),
                Some(old) if *old != entry => changes.updated.push(entry.clone()),
                Some(_) => {}
            }
        }
        changes.updated.sort_by_key(|a| a.is_default);
        changes
    }

    fn sort(&mut self) {
        self.entries
            .sort_by(|a, b| b.is_default.cmp(&a.is_default).then(a.created_at.cmp(&b.created_at)));
    }
}
