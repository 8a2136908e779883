use std::cell::RefCell;

use fxhash::FxHashMap;

use crate::{AttrSet, Ident, LzErr, LzResult, Value};

/// A slot that is absent from the table is unset.
#[derive(Clone)]
enum Slot {
    /// the initializer for this slot is running right now
    Loading,
    Loaded(Value),
}

/// Per-object cache of lazy attribute values.
///
/// A slot goes from unset to loaded once. `Loading` only lives for the
/// duration of an initializer call and falls back to unset if it fails.
#[derive(Default)]
pub struct Slots {
    data: RefCell<FxHashMap<Ident, Slot>>,
}

impl std::fmt::Debug for Slots {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set()
            .entries(self.data.borrow().iter().map(|(name, slot)| match slot {
                Slot::Loading => format!("{name} (loading)"),
                Slot::Loaded(_) => name.to_string(),
            }))
            .finish()
    }
}

impl Slots {
    pub fn get(&self, name: &str) -> Option<Value> {
        match self.data.borrow().get(name) {
            Some(Slot::Loaded(val)) => Some(val.clone()),
            _ => None,
        }
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        matches!(self.data.borrow().get(name), Some(Slot::Loaded(_)))
    }

    /// Marks `name` as loading. Fails if it already is, since that
    /// means the initializer asked for its own value.
    pub fn begin(&self, name: &Ident) -> LzResult<()> {
        let mut data = self.data.borrow_mut();

        if matches!(data.get(name), Some(Slot::Loading)) {
            return Err(LzErr::Cycle(name.clone()));
        }

        data.insert(name.clone(), Slot::Loading);
        Ok(())
    }

    /// Stores the result of an initializer.
    /// A value written while the initializer ran wins over the computed one.
    pub fn finish(&self, name: &Ident, val: Value) -> Value {
        let mut data = self.data.borrow_mut();

        match data.get(name) {
            Some(Slot::Loaded(written)) => written.clone(),
            _ => {
                data.insert(name.clone(), Slot::Loaded(val.clone()));
                val
            }
        }
    }

    /// back to unset, unless someone wrote a value meanwhile
    pub fn abandon(&self, name: &str) {
        let mut data = self.data.borrow_mut();

        if matches!(data.get(name), Some(Slot::Loading)) {
            data.remove(name);
        }
    }

    pub fn write(&self, name: Ident, val: Value) {
        self.data.borrow_mut().insert(name, Slot::Loaded(val));
    }

    pub fn loaded(&self) -> AttrSet {
        self.data
            .borrow()
            .iter()
            .filter(|(_, slot)| matches!(slot, Slot::Loaded(_)))
            .map(|(name, _)| name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;

    fn val(i: i64) -> Value {
        Rc::new(i)
    }

    #[test]
    fn test_unset_to_loaded() {
        let slots = Slots::default();
        let name = Ident::from("total");

        assert!(slots.get("total").is_none());
        slots.begin(&name).unwrap();
        assert!(!slots.is_loaded("total"));

        let stored = slots.finish(&name, val(42));
        assert_eq!(stored.downcast_ref::<i64>(), Some(&42));
        assert!(slots.is_loaded("total"));
        assert!(Rc::ptr_eq(&slots.get("total").unwrap(), &stored));
    }

    #[test]
    fn test_reentry_is_a_cycle() {
        let slots = Slots::default();
        let name = Ident::from("total");

        slots.begin(&name).unwrap();
        assert!(matches!(slots.begin(&name), Err(LzErr::Cycle(n)) if n.as_str() == "total"));
    }

    #[test]
    fn test_abandon_resets() {
        let slots = Slots::default();
        let name = Ident::from("total");

        slots.begin(&name).unwrap();
        slots.abandon("total");

        assert!(slots.get("total").is_none());
        assert!(slots.begin(&name).is_ok());
    }

    #[test]
    fn test_write_during_load_wins() {
        let slots = Slots::default();
        let name = Ident::from("total");

        slots.begin(&name).unwrap();
        slots.write(name.clone(), val(7));
        slots.abandon("total");

        let stored = slots.finish(&name, val(42));
        assert_eq!(stored.downcast_ref::<i64>(), Some(&7));
        assert_eq!(slots.loaded(), im::hashset![name]);
    }
}
