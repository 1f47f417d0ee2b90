//! Room registry: one record per remote node.
//!
//! Nodes are identified by their factory 64-bit address; the 16-bit network
//! address is assigned by the coordinator and may change after a node
//! rejoins, so it is relearned from every announcement.
//!
//! ```text
//!   Dispatcher ──register/relearn──▶ ┌──────────────┐
//!                                    │   Registry    │ ◀──with_record_mut── Room / Threshold engines
//!   Action worker ──node_refs──────▶ └──────────────┘
//! ```
//!
//! Slots are handed out in arrival order and never reused for the lifetime
//! of the process.  The registry is shared between worker threads through
//! [`SharedRegistry`], a critical-section mutex whose closures must never
//! block while the lock is held.  That rules out transmitting, and it rules
//! out logging too: a UART console write can stall for milliseconds, so
//! callers carry what they want to log out of the closure.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use heapless::Vec;

use crate::config::ControllerConfig;
use crate::control::occupancy::OccupancyHistory;
use crate::error::RegistryError;

/// Default number of room slots.
pub const DEFAULT_CAPACITY: usize = 8;

/// Largest registry the arming session word can track, one alert bit per
/// slot.  [`Registry::new`] rejects a larger `N` at compile time.
pub const MAX_CAPACITY: usize = 24;

/// Network address meaning "not yet known" on the radio.
pub const UNKNOWN_SHORT_ADDRESS: u16 = 0xFFFE;

// ───────────────────────────────────────────────────────────────
// Identifiers
// ───────────────────────────────────────────────────────────────

/// Dense registry slot index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(u8);

impl SlotId {
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Everything the encoder needs to address a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeRef {
    pub slot: SlotId,
    pub long_address: u64,
    pub short_address: u16,
}

// ───────────────────────────────────────────────────────────────
// Per-room control state
// ───────────────────────────────────────────────────────────────

/// Last command sent on the light channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightLatch {
    #[default]
    NoActionYet,
    OnSent,
    OffSent,
}

/// Last command sent on the heater/AC pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThermalLatch {
    #[default]
    Neither,
    HeaterOn,
    AcOn,
}

/// Which setpoint the potentiometer currently edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selector {
    #[default]
    Light,
    Heating,
    Ac,
}

impl Selector {
    /// Cyclic successor: Light → Heating → Ac → Light.
    pub fn next(self) -> Self {
        match self {
            Self::Light => Self::Heating,
            Self::Heating => Self::Ac,
            Self::Ac => Self::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ThresholdEditState {
    pub selector: Selector,
    /// Set by a low pot reading; the next reading is committed.
    pub edit_armed: bool,
}

/// Setpoints copied into every new record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomDefaults {
    pub upper_heat_threshold: u8,
    pub lower_heat_threshold: u8,
    pub light_threshold: u8,
}

impl RoomDefaults {
    pub fn from_config(config: &ControllerConfig) -> Self {
        Self {
            upper_heat_threshold: config.upper_heat_threshold_c,
            lower_heat_threshold: config.lower_heat_threshold_c,
            light_threshold: config.light_threshold_percent,
        }
    }
}

impl Default for RoomDefaults {
    fn default() -> Self {
        Self::from_config(&ControllerConfig::default())
    }
}

/// Control state for one room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomRecord {
    pub id: SlotId,
    pub long_address: u64,
    /// [`UNKNOWN_SHORT_ADDRESS`] until learned, or after another node
    /// claimed the same address.
    pub short_address: u16,

    pub upper_heat_threshold: u8,
    pub lower_heat_threshold: u8,
    pub light_threshold: u8,

    pub light_override: bool,
    pub heating_override: bool,
    pub ac_override: bool,
    pub edit: ThresholdEditState,

    pub occupancy: OccupancyHistory,
    pub light_latch: LightLatch,
    pub thermal_latch: ThermalLatch,
}

impl RoomRecord {
    fn new(id: SlotId, long_address: u64, defaults: RoomDefaults) -> Self {
        Self {
            id,
            long_address,
            short_address: UNKNOWN_SHORT_ADDRESS,
            upper_heat_threshold: defaults.upper_heat_threshold,
            lower_heat_threshold: defaults.lower_heat_threshold,
            light_threshold: defaults.light_threshold,
            light_override: false,
            heating_override: false,
            ac_override: false,
            edit: ThresholdEditState::default(),
            occupancy: OccupancyHistory::default(),
            light_latch: LightLatch::NoActionYet,
            thermal_latch: ThermalLatch::Neither,
        }
    }

    pub fn node_ref(&self) -> NodeRef {
        NodeRef {
            slot: self.id,
            long_address: self.long_address,
            short_address: self.short_address,
        }
    }

    /// True while either thermal override holds the heater/AC pair.
    pub fn thermal_overridden(&self) -> bool {
        self.heating_override || self.ac_override
    }
}

// ───────────────────────────────────────────────────────────────
// Registry
// ───────────────────────────────────────────────────────────────

/// Fixed-capacity table of room records indexed by [`SlotId`].
pub struct Registry<const N: usize = DEFAULT_CAPACITY> {
    records: Vec<RoomRecord, N>,
    defaults: RoomDefaults,
}

impl<const N: usize> Registry<N> {
    pub fn new(defaults: RoomDefaults) -> Self {
        const { assert!(N <= MAX_CAPACITY, "registry capacity exceeds MAX_CAPACITY") };
        Self {
            records: Vec::new(),
            defaults,
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Allocate the next slot for `long_address` with default setpoints.
    ///
    /// Allocation is unconditional: callers that want re-announcements to
    /// reuse a slot look the node up with [`find_by_long`](Self::find_by_long)
    /// first.
    pub fn register(&mut self, long_address: u64) -> Result<SlotId, RegistryError> {
        let id = SlotId(self.records.len() as u8);
        self.records
            .push(RoomRecord::new(id, long_address, self.defaults))
            .map_err(|_| RegistryError::Full)?;
        Ok(id)
    }

    pub fn find_by_long(&self, long_address: u64) -> Option<SlotId> {
        self.records
            .iter()
            .find(|r| r.long_address == long_address)
            .map(|r| r.id)
    }

    /// Resolve a network address to a slot.  The unknown address never
    /// resolves.
    pub fn lookup_by_short(&self, short_address: u16) -> Option<SlotId> {
        if short_address == UNKNOWN_SHORT_ADDRESS {
            return None;
        }
        self.records
            .iter()
            .find(|r| r.short_address == short_address)
            .map(|r| r.id)
    }

    /// Record the network address for `slot`, clearing it from any other
    /// record that still claims it.  Returns the displaced slot, if any.
    pub fn relearn_short(&mut self, slot: SlotId, short_address: u16) -> Option<SlotId> {
        let mut displaced = None;
        if short_address != UNKNOWN_SHORT_ADDRESS {
            for record in self.records.iter_mut() {
                if record.id != slot && record.short_address == short_address {
                    record.short_address = UNKNOWN_SHORT_ADDRESS;
                    displaced = Some(record.id);
                }
            }
        }
        self.get_mut(slot).short_address = short_address;
        displaced
    }

    /// Borrow a record.
    ///
    /// # Panics
    ///
    /// Panics if `slot` was not handed out by this registry.
    pub fn get(&self, slot: SlotId) -> &RoomRecord {
        assert!(slot.index() < self.records.len(), "slot {:?} not allocated", slot);
        &self.records[slot.index()]
    }

    /// Mutably borrow a record.  Panics like [`get`](Self::get).
    pub fn get_mut(&mut self, slot: SlotId) -> &mut RoomRecord {
        assert!(slot.index() < self.records.len(), "slot {:?} not allocated", slot);
        &mut self.records[slot.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoomRecord> {
        self.records.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut RoomRecord> {
        self.records.iter_mut()
    }

    /// Addressing for every registered node, in slot order.
    pub fn node_refs(&self) -> Vec<NodeRef, N> {
        self.records.iter().map(RoomRecord::node_ref).collect()
    }
}

// ───────────────────────────────────────────────────────────────
// Shared access
// ───────────────────────────────────────────────────────────────

/// Registry guarded for use from several worker threads.
pub struct SharedRegistry<const N: usize = DEFAULT_CAPACITY> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Registry<N>>>,
}

impl<const N: usize> SharedRegistry<N> {
    pub fn new(registry: Registry<N>) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(registry)),
        }
    }

    pub fn with<R>(&self, f: impl FnOnce(&Registry<N>) -> R) -> R {
        self.inner.lock(|cell| f(&cell.borrow()))
    }

    pub fn with_mut<R>(&self, f: impl FnOnce(&mut Registry<N>) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// Run `f` on a single record under the lock.
    pub fn with_record_mut<R>(&self, slot: SlotId, f: impl FnOnce(&mut RoomRecord) -> R) -> R {
        self.with_mut(|registry| f(registry.get_mut(slot)))
    }

    /// Copy of one record, for inspection outside the lock.
    pub fn snapshot(&self, slot: SlotId) -> RoomRecord {
        self.with(|registry| registry.get(slot).clone())
    }
}
