use core::cell::RefCell;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::config::{DDEF_COUNT, DDEF_DEVICE_INFO, DDEF_ERROR, DDEF_RESET};
use crate::core::DataDef;
use crate::handler::DdefHandler;
use crate::registry::Registration;

/// Request handlers owned by the engine itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) enum Builtin {
    ErrorReport,
    DeviceInfo,
    Reset,
}

impl Builtin {
    pub fn default_for(code: DataDef) -> Option<Self> {
        match code {
            DDEF_ERROR => Some(Self::ErrorReport),
            DDEF_DEVICE_INFO => Some(Self::DeviceInfo),
            DDEF_RESET => Some(Self::Reset),
            _ => None,
        }
    }
}

#[derive(Clone, Copy)]
pub(crate) enum Binding<'a> {
    Unbound,
    Builtin(Builtin),
    Handler(&'a dyn DdefHandler),
}

/// One request handler per data definition code
pub(crate) struct Registry<'a, M: RawMutex>(Mutex<M, RefCell<[Binding<'a>; DDEF_COUNT]>>);

impl<'a, M: RawMutex> Registry<'a, M> {
    pub const fn new() -> Self {
        Self(Mutex::new(RefCell::new([Binding::Unbound; DDEF_COUNT])))
    }

    /// Binds built-in handlers to their codes unless a driver already claimed them.
    pub fn bind_builtins(&self) {
        self.0.lock(|cell| {
            let mut table = cell.borrow_mut();
            for (index, slot) in table.iter_mut().enumerate() {
                let code = DataDef::from_u8_truncating(index as u8);
                if let (Binding::Unbound, Some(builtin)) = (*slot, Builtin::default_for(code)) {
                    *slot = Binding::Builtin(builtin);
                }
            }
        })
    }

    pub fn register(&self, code: DataDef, handler: &'a dyn DdefHandler) -> Registration {
        self.0.lock(|cell| {
            let mut table = cell.borrow_mut();
            let slot = &mut table[code.index()];
            let previous = core::mem::replace(slot, Binding::Handler(handler));
            match previous {
                Binding::Unbound => Registration::Inserted,
                _ => Registration::Replaced,
            }
        })
    }

    /// Drops a driver handler, restoring the built-in default of the code.
    ///
    /// Returns false if no driver handler was bound.
    pub fn unregister(&self, code: DataDef, builtins_bound: bool) -> bool {
        self.0.lock(|cell| {
            let mut table = cell.borrow_mut();
            let slot = &mut table[code.index()];
            if !matches!(slot, Binding::Handler(_)) {
                return false;
            }
            *slot = match Builtin::default_for(code) {
                Some(builtin) if builtins_bound => Binding::Builtin(builtin),
                _ => Binding::Unbound,
            };
            true
        })
    }

    pub fn resolve(&self, code: DataDef) -> Binding<'a> {
        self.0.lock(|cell| cell.borrow()[code.index()])
    }
}
