use log::warn;

use super::frame::Frame;
use super::object::Object;
use super::source::Source;

/// Fixed-capacity store for one kind of grid entity.
///
/// Storage for exactly `capacity` elements is reserved up front; elements are then
/// constructed one by one and the number constructed so far is the store's cursor.
#[derive(Debug)]
pub(crate) struct Arena<T> {
    slots: Vec<T>,
    capacity: usize,
}

impl<T> Arena<T> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Arena {
            slots: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Construct the next element and return its index.
    pub(crate) fn construct(&mut self, value: T) -> usize {
        debug_assert!(
            self.slots.len() < self.capacity,
            "arena capacity {} exceeded",
            self.capacity
        );
        self.slots.push(value);
        self.slots.len() - 1
    }

    /// Number of elements constructed so far.
    pub(crate) fn constructed(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.slots.len() == self.capacity
    }

    pub(crate) fn as_slice(&self) -> &[T] {
        &self.slots
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.slots
    }

    pub(crate) fn into_boxed_slice(self) -> Box<[T]> {
        debug_assert!(self.is_complete());
        self.slots.into_boxed_slice()
    }
}

/// The three entity stores of a grid under construction.
///
/// Construction order is frames, objects, sources. Fields are declared in the reverse
/// order so that dropping the arena, on success or failure, destroys sources first and
/// frames last.
#[derive(Debug)]
pub(crate) struct GridArena {
    pub(crate) sources: Arena<Source>,
    pub(crate) objects: Arena<Object>,
    pub(crate) frames: Arena<Frame>,
}

impl GridArena {
    pub(crate) fn allocate(frame_count: usize, object_count: usize) -> Self {
        GridArena {
            sources: Arena::with_capacity(frame_count * object_count),
            objects: Arena::with_capacity(object_count),
            frames: Arena::with_capacity(frame_count),
        }
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.frames.is_complete() && self.objects.is_complete() && self.sources.is_complete()
    }

    /// Destroy exactly the elements constructed so far, sources first, then release the
    /// storage.
    pub(crate) fn unwind(self) {
        warn!(
            "rolling back grid construction: {}/{} sources, {}/{} objects, {}/{} frames built",
            self.sources.constructed(),
            self.sources.capacity,
            self.objects.constructed(),
            self.objects.capacity,
            self.frames.constructed(),
            self.frames.capacity,
        );
        let GridArena {
            sources,
            objects,
            frames,
        } = self;
        drop(sources);
        drop(objects);
        drop(frames);
    }
}
