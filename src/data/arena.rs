//! A generational arena.
//!
//! Slots freed by a removal are recycled by later insertions. Every slot carries a
//! generation number bumped on each removal so that an [`Index`] obtained before the
//! removal can never alias the value inserted afterwards.

use std::ops;

/// The `Arena` allows inserting and removing elements that are referred to by
/// `Index`.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Arena<T> {
    items: Vec<Entry<T>>,
    free_list_head: Option<u32>,
    len: usize,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
enum Entry<T> {
    Free {
        next_free: Option<u32>,
        generation: u32,
    },
    Occupied {
        generation: u32,
        value: T,
    },
}

/// An index (and generation) into an `Arena`.
///
/// To get an `Index`, insert an element into an `Arena`, and the `Index` for
/// that element will be returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Index {
    index: u32,
    generation: u32,
}

impl Index {
    /// Create a new `Index` from its raw parts.
    ///
    /// The parts must have been returned from an earlier call to
    /// `into_raw_parts`.
    pub fn from_raw_parts(index: u32, generation: u32) -> Index {
        Index { index, generation }
    }

    /// Convert this `Index` into its raw parts.
    pub fn into_raw_parts(self) -> (u32, u32) {
        (self.index, self.generation)
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Arena<T> {
        Arena::new()
    }
}

impl<T> Arena<T> {
    /// Constructs a new, empty `Arena`.
    pub fn new() -> Arena<T> {
        Arena {
            items: Vec::new(),
            free_list_head: None,
            len: 0,
        }
    }

    /// Inserts `value` into the arena, reusing a free slot if there is one.
    pub fn insert(&mut self, value: T) -> Index {
        self.len += 1;

        if let Some(i) = self.free_list_head {
            let slot = &mut self.items[i as usize];
            if let Entry::Free {
                next_free,
                generation,
            } = *slot
            {
                self.free_list_head = next_free;
                *slot = Entry::Occupied { generation, value };
                return Index::from_raw_parts(i, generation);
            }
        }

        let index = self.items.len() as u32;
        self.items.push(Entry::Occupied {
            generation: 0,
            value,
        });
        Index::from_raw_parts(index, 0)
    }

    /// Removes the element at index `i` from the arena.
    ///
    /// Returns `None` if `i` is stale (its element was already removed).
    pub fn remove(&mut self, i: Index) -> Option<T> {
        if !self.contains(i) {
            return None;
        }

        let freed = Entry::Free {
            next_free: self.free_list_head,
            generation: i.generation.wrapping_add(1),
        };
        self.free_list_head = Some(i.index);
        self.len -= 1;

        match std::mem::replace(&mut self.items[i.index as usize], freed) {
            Entry::Occupied { value, .. } => Some(value),
            Entry::Free { .. } => None,
        }
    }

    /// Is the element at index `i` in the arena?
    pub fn contains(&self, i: Index) -> bool {
        self.get(i).is_some()
    }

    /// Gets a shared reference to the element at index `i`, if it is still in the arena.
    pub fn get(&self, i: Index) -> Option<&T> {
        match self.items.get(i.index as usize) {
            Some(Entry::Occupied { generation, value }) if *generation == i.generation => {
                Some(value)
            }
            _ => None,
        }
    }

    /// Gets an exclusive reference to the element at index `i`, if it is still in the arena.
    pub fn get_mut(&mut self, i: Index) -> Option<&mut T> {
        match self.items.get_mut(i.index as usize) {
            Some(Entry::Occupied { generation, value }) if *generation == i.generation => {
                Some(value)
            }
            _ => None,
        }
    }

    /// Gets the element stored in slot `i`, whatever its generation.
    pub fn get_unknown_gen(&self, i: u32) -> Option<(&T, Index)> {
        match self.items.get(i as usize) {
            Some(Entry::Occupied { generation, value }) => {
                Some((value, Index::from_raw_parts(i, *generation)))
            }
            _ => None,
        }
    }

    /// The number of elements in the arena.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Is this arena empty?
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates through the elements of this arena, together with their index.
    pub fn iter(&self) -> impl Iterator<Item = (Index, &T)> {
        self.items.iter().enumerate().filter_map(|(i, e)| match e {
            Entry::Occupied { generation, value } => {
                Some((Index::from_raw_parts(i as u32, *generation), value))
            }
            Entry::Free { .. } => None,
        })
    }

    /// Iterates mutably through the elements of this arena, together with their index.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Index, &mut T)> {
        self.items
            .iter_mut()
            .enumerate()
            .filter_map(|(i, e)| match e {
                Entry::Occupied { generation, value } => {
                    Some((Index::from_raw_parts(i as u32, *generation), value))
                }
                Entry::Free { .. } => None,
            })
    }
}

impl<T> ops::Index<Index> for Arena<T> {
    type Output = T;

    fn index(&self, index: Index) -> &Self::Output {
        self.get(index).expect("No element at index")
    }
}

impl<T> ops::IndexMut<Index> for Arena<T> {
    fn index_mut(&mut self, index: Index) -> &mut Self::Output {
        self.get_mut(index).expect("No element at index")
    }
}
