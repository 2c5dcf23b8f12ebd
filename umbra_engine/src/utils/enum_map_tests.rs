use super::*;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Position,
    Normal,
    Albedo,
}

impl EnumKey for Slot {
    const COUNT: usize = 3;
    const ALL: &'static [Self] = &[Slot::Position, Slot::Normal, Slot::Albedo];

    fn index(self) -> usize {
        self as usize
    }
}

// ============================================================================
// Basic access tests
// ============================================================================

#[test]
fn test_new_is_empty() {
    let map: EnumMap<Slot, u32> = EnumMap::new();
    assert!(map.is_empty());
    assert_eq!(map.len(), 0);
    assert!(!map.is_complete());
    assert!(map.get(Slot::Normal).is_none());
}

#[test]
fn test_insert_and_get() {
    let mut map = EnumMap::new();
    assert_eq!(map.insert(Slot::Normal, 7), None);
    assert_eq!(map.get(Slot::Normal), Some(&7));
    assert_eq!(map.insert(Slot::Normal, 9), Some(7));
    assert_eq!(map.len(), 1);
    assert!(map.contains(Slot::Normal));
    assert!(!map.contains(Slot::Albedo));
}

#[test]
fn test_try_get_empty_slot_is_invalid_resource() {
    let map: EnumMap<Slot, u32> = EnumMap::new();
    match map.try_get(Slot::Albedo) {
        Err(Error::InvalidResource(msg)) => assert!(msg.contains("Albedo")),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_get_mut_and_remove() {
    let mut map = EnumMap::from_fn(|slot: Slot| slot.index() as u32);
    *map.get_mut(Slot::Albedo).unwrap() += 10;
    assert_eq!(map.try_get(Slot::Albedo), Ok(&12));
    assert_eq!(map.remove(Slot::Albedo), Some(12));
    assert!(!map.is_complete());
}

// ============================================================================
// Construction and iteration tests
// ============================================================================

#[test]
fn test_from_fn_is_complete() {
    let map = EnumMap::from_fn(|slot: Slot| format!("{:?}", slot));
    assert!(map.is_complete());
    let keys: Vec<Slot> = map.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec![Slot::Position, Slot::Normal, Slot::Albedo]);
}

#[test]
fn test_try_from_fn_stops_at_first_error() {
    let mut calls = 0;
    let result: Result<EnumMap<Slot, u32>> = EnumMap::try_from_fn(|slot| {
        calls += 1;
        if slot == Slot::Normal {
            Err(Error::OutOfMemory)
        } else {
            Ok(1)
        }
    });
    assert_eq!(result.err(), Some(Error::OutOfMemory));
    assert_eq!(calls, 2);
}

#[test]
fn test_iter_skips_empty_slots() {
    let mut map = EnumMap::new();
    map.insert(Slot::Albedo, 'a');
    map.insert(Slot::Position, 'p');
    let items: Vec<(Slot, char)> = map.iter().map(|(k, v)| (k, *v)).collect();
    assert_eq!(items, vec![(Slot::Position, 'p'), (Slot::Albedo, 'a')]);
    assert_eq!(map.values().count(), 2);
}

// ============================================================================
// Drop order tests
// ============================================================================

struct Tracked(Slot, Rc<RefCell<Vec<Slot>>>);

impl Drop for Tracked {
    fn drop(&mut self) {
        self.1.borrow_mut().push(self.0);
    }
}

#[test]
fn test_drop_runs_in_reverse_key_order() {
    let order = Rc::new(RefCell::new(Vec::new()));
    {
        let _map = EnumMap::from_fn(|slot| Tracked(slot, order.clone()));
    }
    assert_eq!(*order.borrow(), vec![Slot::Albedo, Slot::Normal, Slot::Position]);
}
