//! Signal/slot notification
//!
//! A [`Signal`] is a fixed-capacity list of slots invoked in connection order
//! by [`Signal::emit`]. The slot table lives behind a critical section, so a
//! signal can be emitted from interrupt context and connected to from thread
//! context. Observers are invoked outside the critical section.
//!
//! # Usage contract
//!
//! Slots run on the emitting context, which may be an interrupt handler.
//! A slot must not emit the signal it is being invoked from.

use core::cell::RefCell;
use core::fmt;

use critical_section::Mutex;
use heapless::Vec;

use crate::error::{ClassId, Error};
use crate::error_codes;

/// Default number of slots a signal can hold
pub const DEFAULT_SLOT_CAPACITY: usize = 4;

error_codes! {
    /// Errors raised while managing signal connections
    pub enum SignalErrorCode(ClassId::SIGNAL) {
        /// Every slot of the signal is in use
        ConnectNoFreeSlot,
        /// The signal issued `u32::MAX` connections
        ConnectIdExhausted,
    }
}

/// Object notified by a [`Signal`]
pub trait Observer<A>: Sync {
    /// Called once per emission, on the emitting context
    fn notify(&self, args: A);
}

/// Callable connected to a [`Signal`]
pub enum Slot<A: 'static> {
    /// Free function
    Function(fn(A)),
    /// Borrowed observer object
    Observer(&'static dyn Observer<A>),
}

impl<A: 'static> Slot<A> {
    fn invoke(&self, args: A) {
        match self {
            Slot::Function(f) => f(args),
            Slot::Observer(observer) => observer.notify(args),
        }
    }
}

impl<A: 'static> Clone for Slot<A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A: 'static> Copy for Slot<A> {}

impl<A: 'static> fmt::Debug for Slot<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Function(_) => f.write_str("Slot::Function"),
            Slot::Observer(_) => f.write_str("Slot::Observer"),
        }
    }
}

/// Token identifying one connection, used to disconnect it later
///
/// A token is only meaningful for the signal that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Connection(u32);

impl Connection {
    /// Get the raw connection id
    pub const fn id(self) -> u32 {
        self.0
    }
}

struct Entry<A: 'static> {
    id: u32,
    slot: Slot<A>,
}

struct SlotTable<A: 'static, const N: usize> {
    /// Sorted by ascending id, i.e. connection order
    entries: Vec<Entry<A>, N>,
    next_id: u32,
}

/// Event channel with up to `N` connected slots
pub struct Signal<A: 'static, const N: usize = DEFAULT_SLOT_CAPACITY> {
    table: Mutex<RefCell<SlotTable<A, N>>>,
}

impl<A: 'static, const N: usize> Signal<A, N> {
    /// Create a signal with no connected slots
    pub const fn new() -> Self {
        Self {
            table: Mutex::new(RefCell::new(SlotTable {
                entries: Vec::new(),
                next_id: 0,
            })),
        }
    }

    /// Connect a slot; it is invoked by every later [`emit`](Self::emit)
    pub fn connect(&self, slot: Slot<A>) -> Result<Connection, Error> {
        critical_section::with(|cs| {
            let mut table = self.table.borrow_ref_mut(cs);
            if table.entries.is_full() {
                return Err(Error::new(SignalErrorCode::ConnectNoFreeSlot));
            }
            let id = table.next_id;
            table.next_id = id
                .checked_add(1)
                .ok_or(Error::new(SignalErrorCode::ConnectIdExhausted))?;
            // Capacity was checked above
            let _ = table.entries.push(Entry { id, slot });
            Ok(Connection(id))
        })
    }

    /// Connect a free function
    pub fn connect_fn(&self, f: fn(A)) -> Result<Connection, Error> {
        self.connect(Slot::Function(f))
    }

    /// Connect an observer object
    pub fn connect_observer(
        &self,
        observer: &'static dyn Observer<A>,
    ) -> Result<Connection, Error> {
        self.connect(Slot::Observer(observer))
    }

    /// Disconnect a slot; unknown connections are ignored
    pub fn disconnect(&self, connection: Connection) {
        critical_section::with(|cs| {
            let mut table = self.table.borrow_ref_mut(cs);
            if let Some(index) = table.entries.iter().position(|e| e.id == connection.0) {
                table.entries.remove(index);
            }
        });
    }

    /// Disconnect every slot
    pub fn disconnect_all(&self) {
        critical_section::with(|cs| self.table.borrow_ref_mut(cs).entries.clear());
    }

    /// Check whether a connection is still active
    pub fn is_connected(&self, connection: Connection) -> bool {
        critical_section::with(|cs| {
            self.table
                .borrow_ref(cs)
                .entries
                .iter()
                .any(|e| e.id == connection.0)
        })
    }

    /// Number of connected slots
    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.table.borrow_ref(cs).entries.len())
    }

    /// Check whether no slot is connected
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of slots
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Invoke every connected slot with `args`, in connection order
    ///
    /// Slots connected while the emission is running are not invoked by it.
    /// Slots disconnected while it is running are not invoked after the
    /// disconnection.
    pub fn emit(&self, args: A)
    where
        A: Clone,
    {
        let end = critical_section::with(|cs| self.table.borrow_ref(cs).next_id);
        let mut last: Option<u32> = None;
        loop {
            let next = critical_section::with(|cs| {
                self.table
                    .borrow_ref(cs)
                    .entries
                    .iter()
                    .find(|e| e.id < end && last.map_or(true, |l| e.id > l))
                    .map(|e| (e.id, e.slot))
            });
            match next {
                Some((id, slot)) => {
                    last = Some(id);
                    slot.invoke(args.clone());
                }
                None => break,
            }
        }
    }
}

impl<A: 'static, const N: usize> Default for Signal<A, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: 'static, const N: usize> fmt::Debug for Signal<A, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("len", &self.len())
            .field("capacity", &N)
            .finish()
    }
}
