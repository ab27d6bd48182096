#![allow(dead_code)]

use cvnp::core::{ClassId, CompliantId, DataDef, DeviceAddress, InstanceId, Timestamp};
use cvnp::frame::{Data, Frame};
use cvnp::hal::{ErrorKind, Hal};
use cvnp::handler::{BroadcastHandler, NonCompliantHandler, QueryHandler};
use cvnp::node::Node;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::vec::Vec;

pub const OWN_CLASS: ClassId = ClassId::new(5).unwrap();
pub const OWN_INSTANCE: InstanceId = InstanceId::new(3).unwrap();
pub const OWN: DeviceAddress = DeviceAddress::new(OWN_CLASS, OWN_INSTANCE);

pub const BROADCAST_SLOTS: usize = 4;
pub const QUERY_SLOTS: usize = 4;
pub const MULTICAST_SLOTS: usize = 2;
pub const NON_COMPLIANT_SLOTS: usize = 2;

pub type TestNode<'a> = Node<
    'a,
    CriticalSectionRawMutex,
    TestHal,
    BROADCAST_SLOTS,
    QUERY_SLOTS,
    MULTICAST_SLOTS,
    NON_COMPLIANT_SLOTS,
>;

/// Platform double recording everything the engine does
pub struct TestHal {
    init_ok: AtomicBool,
    now: AtomicU32,
    sent: Mutex<Vec<Frame>>,
    errors: Mutex<Vec<ErrorKind>>,
    resets: AtomicU32,
}

impl TestHal {
    pub fn new() -> Self {
        Self {
            init_ok: AtomicBool::new(true),
            now: AtomicU32::new(0),
            sent: Mutex::new(Vec::new()),
            errors: Mutex::new(Vec::new()),
            resets: AtomicU32::new(0),
        }
    }

    pub fn failing() -> Self {
        let hal = Self::new();
        hal.init_ok.store(false, Ordering::SeqCst);
        hal
    }

    pub fn set_now(&self, ms: u32) {
        self.now.store(ms, Ordering::SeqCst);
    }

    pub fn take_sent(&self) -> Vec<Frame> {
        std::mem::take(&mut *self.sent.lock().unwrap())
    }

    pub fn take_errors(&self) -> Vec<ErrorKind> {
        std::mem::take(&mut *self.errors.lock().unwrap())
    }

    pub fn resets(&self) -> u32 {
        self.resets.load(Ordering::SeqCst)
    }
}

impl Hal for TestHal {
    fn init(&self) -> bool {
        self.init_ok.load(Ordering::SeqCst)
    }

    fn send_frame(&self, frame: &Frame) {
        self.sent.lock().unwrap().push(*frame);
    }

    fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.now.load(Ordering::SeqCst))
    }

    fn handle_error(&self, error: ErrorKind) {
        self.errors.lock().unwrap().push(error);
    }

    fn reset_system(&self) {
        self.resets.fetch_add(1, Ordering::SeqCst);
    }
}

/// Handler double implementing every callback interface
#[derive(Default)]
pub struct Recorder {
    frames: Mutex<Vec<Frame>>,
    timeouts: AtomicU32,
    deaths: Mutex<Vec<bool>>,
}

impl Recorder {
    pub fn frames(&self) -> Vec<Frame> {
        self.frames.lock().unwrap().clone()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.lock().unwrap().len()
    }

    pub fn timeouts(&self) -> u32 {
        self.timeouts.load(Ordering::SeqCst)
    }

    pub fn deaths(&self) -> Vec<bool> {
        self.deaths.lock().unwrap().clone()
    }
}

impl BroadcastHandler for Recorder {
    fn on_frame(&self, frame: &Frame) {
        self.frames.lock().unwrap().push(*frame);
    }

    fn on_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::SeqCst);
    }
}

impl QueryHandler for Recorder {
    fn on_response(&self, frame: &Frame) {
        self.frames.lock().unwrap().push(*frame);
    }

    fn on_death(&self, killed: bool) {
        self.deaths.lock().unwrap().push(killed);
    }
}

impl NonCompliantHandler for Recorder {
    fn on_frame(&self, frame: &Frame) {
        self.frames.lock().unwrap().push(*frame);
    }

    fn on_death(&self, killed: bool) {
        self.deaths.lock().unwrap().push(killed);
    }
}

pub fn address(class: u8, instance: u8) -> DeviceAddress {
    DeviceAddress::new(
        ClassId::new(class).unwrap(),
        InstanceId::new(instance).unwrap(),
    )
}

pub fn ddef(code: u8) -> DataDef {
    DataDef::new(code).unwrap()
}

pub fn data(bytes: &[u8]) -> Data {
    Data::new(bytes).unwrap()
}

pub fn request(from: DeviceAddress, to: DeviceAddress, code: u8, payload: &[u8]) -> Frame {
    Frame::compliant(CompliantId::new(from, to, ddef(code)), true, data(payload))
}

pub fn response(from: DeviceAddress, to: DeviceAddress, code: u8, payload: &[u8]) -> Frame {
    Frame::compliant(CompliantId::new(from, to, ddef(code)), false, data(payload))
}

pub fn broadcast(from: DeviceAddress, code: u8, payload: &[u8]) -> Frame {
    let mut id = CompliantId::new(from, DeviceAddress::WILDCARD, ddef(code));
    id.broadcast = true;
    Frame::compliant(id, false, data(payload))
}

pub fn started(node: &TestNode<'_>) {
    node.start(OWN_CLASS, OWN_INSTANCE).unwrap();
}
