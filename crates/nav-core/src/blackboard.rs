use std::any::Any;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::marker::PhantomData;

use crate::error::BlackboardError;

/// Typed handle to a named blackboard entry.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BbKey<T: 'static> {
    name: Cow<'static, str>,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: 'static> Clone for BbKey<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<T: 'static> BbKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            _phantom: PhantomData,
        }
    }

    /// Key whose name is only known at runtime (e.g. a remapped port).
    pub fn owned(name: impl Into<String>) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            _phantom: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Shared decision-variable store.
///
/// Entries are keyed by string and hold a single value of any `'static` type.
/// Reading an entry with a type other than the one stored yields
/// [`BlackboardError::TypeMismatch`].
#[derive(Default)]
pub struct Blackboard {
    values: BTreeMap<String, Box<dyn Any>>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains<T: 'static>(&self, key: &BbKey<T>) -> bool {
        self.values.contains_key(key.name())
    }

    pub fn set<T: 'static>(&mut self, key: &BbKey<T>, value: T) {
        self.values.insert(key.name().to_owned(), Box::new(value));
    }

    pub fn get<T: 'static>(&self, key: &BbKey<T>) -> Result<Option<&T>, BlackboardError> {
        let Some(value) = self.values.get(key.name()) else {
            return Ok(None);
        };
        value
            .downcast_ref::<T>()
            .map(Some)
            .ok_or_else(|| BlackboardError::type_mismatch::<T>(key.name()))
    }

    pub fn get_mut<T: 'static>(
        &mut self,
        key: &BbKey<T>,
    ) -> Result<Option<&mut T>, BlackboardError> {
        let Some(value) = self.values.get_mut(key.name()) else {
            return Ok(None);
        };
        value
            .downcast_mut::<T>()
            .map(Some)
            .ok_or_else(|| BlackboardError::type_mismatch::<T>(key.name()))
    }

    /// Remove and return an entry. A mistyped entry is left in place.
    pub fn remove<T: 'static>(&mut self, key: &BbKey<T>) -> Result<Option<T>, BlackboardError> {
        match self.values.get(key.name()) {
            None => return Ok(None),
            Some(value) if !value.is::<T>() => {
                return Err(BlackboardError::type_mismatch::<T>(key.name()))
            }
            Some(_) => {}
        }
        Ok(self
            .values
            .remove(key.name())
            .and_then(|value| value.downcast::<T>().ok())
            .map(|b| *b))
    }
}

impl std::fmt::Debug for Blackboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Blackboard")
            .field("keys", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}
