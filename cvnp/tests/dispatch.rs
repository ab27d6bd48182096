mod common;

use common::*;
use cvnp::config::{DDEF_DEVICE_INFO, DDEF_RESET, ERROR_MARKER, RESET_MAGIC};
use cvnp::core::{ClassId, CompliantId, DataDef, DeviceAddress, InstanceId};
use cvnp::frame::{Data, Frame};
use cvnp::hal::ErrorKind;
use cvnp::handler::DdefHandler;
use cvnp::node::{Broadcast, NonCompliant, Query, StartError};
use cvnp::{Registration, RegistrationError};
use std::sync::atomic::{AtomicU32, Ordering};

#[test]
fn test_request_response() {
    let handler = |_: &Frame| Some(data(&[0xaa, 0xbb]));
    let node = TestNode::new(TestHal::new());
    started(&node);
    assert_eq!(
        node.register_ddef_handler(ddef(5), &handler),
        Registration::Inserted
    );

    node.process(&request(address(9, 2), OWN, 5, &[]));

    let sent = node.hal().take_sent();
    assert_eq!(sent.len(), 1);
    let reply = sent[0];
    assert!(!reply.request);
    assert!(reply.extended);
    assert_eq!(&*reply.data, &[0xaa, 0xbb]);
    let id = reply.compliant_id();
    assert_eq!(id.data_def, ddef(5));
    assert_eq!(id.sender, OWN);
    assert_eq!(id.receiver, address(9, 2));
    assert!(!id.broadcast);
    assert!(!id.non_compliant);
}

#[test]
fn test_handler_without_response() {
    let calls = AtomicU32::new(0);
    let handler = |_: &Frame| {
        calls.fetch_add(1, Ordering::SeqCst);
        None
    };
    let node = TestNode::new(TestHal::new());
    started(&node);
    node.register_ddef_handler(ddef(20), &handler);

    node.process(&request(address(9, 2), OWN, 20, &[1]));

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(node.hal().take_sent().is_empty());
}

#[test]
fn test_unbound_request_gets_error_report() {
    let node = TestNode::new(TestHal::new());
    started(&node);

    node.process(&Frame::compliant(
        CompliantId::new(address(9, 2), OWN, ddef(99)),
        true,
        Data::from_raw(4, [1, 2, 3, 4, 0, 0, 0, 0]),
    ));

    let sent = node.hal().take_sent();
    assert_eq!(sent.len(), 1);
    let report = &sent[0].data;
    assert!(report.length() <= 8);
    assert_eq!(&**report, &[ERROR_MARKER, 99, 4, 1, 2, 3, 4]);
    assert_eq!(sent[0].compliant_id().receiver, address(9, 2));
}

#[test]
fn test_device_info() {
    let node = TestNode::new(TestHal::new());
    started(&node);

    node.process(&request(
        address(9, 2),
        OWN,
        DDEF_DEVICE_INFO.into_u8(),
        &[],
    ));

    let sent = node.hal().take_sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(&*sent[0].data, &[OWN_CLASS.into_u8(), OWN_INSTANCE.into_u8()]);
}

#[test]
fn test_reset_magic() {
    let node = TestNode::new(TestHal::new());
    started(&node);

    let mut wrong = RESET_MAGIC.to_be_bytes();
    wrong[7] ^= 0x1;
    node.process(&request(address(9, 2), OWN, DDEF_RESET.into_u8(), &wrong));
    assert_eq!(node.hal().resets(), 0);

    node.process(&request(
        address(9, 2),
        OWN,
        DDEF_RESET.into_u8(),
        &RESET_MAGIC.to_be_bytes(),
    ));
    assert_eq!(node.hal().resets(), 1);
    assert!(node.hal().take_sent().is_empty());
    assert!(node.hal().take_errors().is_empty());
}

#[test]
fn test_builtin_override_and_restore() {
    let handler = |_: &Frame| Some(data(&[0x42]));
    let node = TestNode::new(TestHal::new());
    started(&node);

    assert_eq!(
        node.register_ddef_handler(DDEF_DEVICE_INFO, &handler),
        Registration::Replaced
    );
    node.process(&request(address(9, 2), OWN, DDEF_DEVICE_INFO.into_u8(), &[]));
    assert_eq!(&*node.hal().take_sent()[0].data, &[0x42]);

    assert!(node.unregister_ddef_handler(DDEF_DEVICE_INFO));
    assert!(!node.unregister_ddef_handler(DDEF_DEVICE_INFO));
    node.process(&request(address(9, 2), OWN, DDEF_DEVICE_INFO.into_u8(), &[]));
    assert_eq!(
        &*node.hal().take_sent()[0].data,
        &[OWN_CLASS.into_u8(), OWN_INSTANCE.into_u8()]
    );
}

#[test]
fn test_handler_registered_before_start_survives() {
    let handler = |_: &Frame| Some(data(&[0x42]));
    let node = TestNode::new(TestHal::new());
    assert_eq!(
        node.register_ddef_handler(DDEF_DEVICE_INFO, &handler),
        Registration::Inserted
    );
    started(&node);

    node.process(&request(address(9, 2), OWN, DDEF_DEVICE_INFO.into_u8(), &[]));
    assert_eq!(&*node.hal().take_sent()[0].data, &[0x42]);
}

#[test]
fn test_receiver_filter() {
    let calls = AtomicU32::new(0);
    let handler = |_: &Frame| {
        calls.fetch_add(1, Ordering::SeqCst);
        None
    };
    let node = TestNode::new(TestHal::new());
    started(&node);
    node.register_ddef_handler(ddef(7), &handler);

    let receivers = [
        (OWN, true),
        (DeviceAddress::WILDCARD, true),
        (DeviceAddress::new(OWN_CLASS, InstanceId::WILDCARD), true),
        (DeviceAddress::new(ClassId::WILDCARD, OWN_INSTANCE), true),
        (address(6, 3), false),
        (address(5, 4), false),
        (DeviceAddress::new(ClassId::WILDCARD, InstanceId::new(1).unwrap()), false),
    ];
    for (receiver, accepted) in receivers {
        let before = calls.load(Ordering::SeqCst);
        node.process(&request(address(9, 2), receiver, 7, &[]));
        let served = calls.load(Ordering::SeqCst) > before;
        assert_eq!(served, accepted, "{receiver:?}");
    }
    // Frames for other devices fall through to the non-compliant table, which is empty.
    assert_eq!(
        node.hal().take_errors(),
        [ErrorKind::UnhandledNonCompliantFrame; 3]
    );
}

#[test]
fn test_frame_for_other_device_reported() {
    let watcher = Recorder::default();
    let node = TestNode::new(TestHal::new());
    started(&node);

    let frame = response(address(9, 2), address(6, 3), 7, &[]);
    node.process(&frame);
    assert_eq!(
        node.hal().take_errors(),
        [ErrorKind::UnhandledNonCompliantFrame]
    );

    node.register_non_compliant(NonCompliant {
        id: frame.id,
        timeout_ms: 0,
        handler: &watcher,
    })
    .unwrap();
    node.process(&frame);
    assert_eq!(watcher.frame_count(), 1);
    assert!(node.hal().take_errors().is_empty());
}

#[test]
fn test_not_started() {
    let handler = |_: &Frame| Some(data(&[1]));
    let recorder = Recorder::default();
    let node = TestNode::new(TestHal::new());
    node.register_ddef_handler(ddef(5), &handler);

    node.process(&request(address(9, 2), OWN, 5, &[]));
    assert!(node.hal().take_sent().is_empty());
    assert!(node.address().is_none());

    let query = Query {
        target: address(2, 1),
        data_def: ddef(10),
        ttl_ms: 50,
        handler: &recorder,
    };
    assert!(node.query(query, Data::EMPTY).is_err());
    assert!(node.publish_broadcast(ddef(3), Data::EMPTY).is_err());
}

#[test]
fn test_start_failure() {
    let node = TestNode::new(TestHal::failing());
    assert_eq!(
        node.start(OWN_CLASS, OWN_INSTANCE),
        Err(StartError::HalInit)
    );
    assert!(node.address().is_none());
}

#[test]
fn test_broadcast_routing() {
    let battery = Recorder::default();
    let solar = Recorder::default();
    let node = TestNode::new(TestHal::new());
    started(&node);
    node.register_broadcast(Broadcast {
        sender_class: ClassId::new(3).unwrap(),
        data_def: ddef(7),
        timeout_ms: 0,
        handler: &battery,
    })
    .unwrap();
    node.register_broadcast(Broadcast {
        sender_class: ClassId::new(4).unwrap(),
        data_def: ddef(7),
        timeout_ms: 0,
        handler: &solar,
    })
    .unwrap();

    node.process(&broadcast(address(3, 1), 7, &[1]));
    node.process(&broadcast(address(3, 2), 7, &[2]));
    node.process(&broadcast(address(4, 1), 7, &[3]));
    node.process(&broadcast(address(3, 1), 8, &[4]));

    assert_eq!(battery.frame_count(), 2);
    assert_eq!(&*solar.frames()[0].data, &[3]);
    assert!(node.hal().take_errors().is_empty());
}

fn subscription(class: u8, handler: &Recorder) -> Broadcast<'_> {
    Broadcast {
        sender_class: ClassId::new(class).unwrap(),
        data_def: ddef(1),
        timeout_ms: 0,
        handler,
    }
}

#[test]
fn test_broadcast_replace_and_capacity() {
    let first = Recorder::default();
    let second = Recorder::default();
    let node = TestNode::new(TestHal::new());
    started(&node);

    for class in 1..=BROADCAST_SLOTS as u8 {
        assert_eq!(
            node.register_broadcast(subscription(class, &first)),
            Ok(Registration::Inserted)
        );
    }
    assert_eq!(
        node.register_broadcast(subscription(1, &second)),
        Ok(Registration::Replaced)
    );
    assert_eq!(
        node.register_broadcast(subscription(60, &second)),
        Err(RegistrationError::TableFull)
    );
    assert_eq!(node.broadcast_count(), BROADCAST_SLOTS);

    node.process(&broadcast(address(1, 1), 1, &[]));
    assert_eq!(first.frame_count(), 0);
    assert_eq!(second.frame_count(), 1);

    assert!(node.unregister_broadcast(ClassId::new(2).unwrap(), ddef(1)));
    assert_eq!(
        node.register_broadcast(subscription(60, &second)),
        Ok(Registration::Inserted)
    );
}

#[test]
fn test_non_compliant_frames() {
    let motor = Recorder::default();
    let node = TestNode::new(TestHal::new());
    started(&node);
    node.register_non_compliant(NonCompliant {
        id: 0x1000_0081,
        timeout_ms: 0,
        handler: &motor,
    })
    .unwrap();

    node.process(&Frame::raw(0x1000_0081, true, data(&[1, 2])));
    assert_eq!(motor.frame_count(), 1);
    assert!(node.hal().take_errors().is_empty());

    node.process(&Frame::raw(0x1000_0082, true, data(&[1, 2])));
    assert_eq!(motor.frame_count(), 1);
    assert_eq!(
        node.hal().take_errors(),
        [ErrorKind::UnhandledNonCompliantFrame]
    );
}

#[test]
fn test_non_compliant_capacity() {
    let recorder = Recorder::default();
    let node = TestNode::new(TestHal::new());
    let subscription = |id| NonCompliant {
        id,
        timeout_ms: 0,
        handler: &recorder,
    };
    for id in 0..NON_COMPLIANT_SLOTS as u32 {
        assert!(node.register_non_compliant(subscription(0x1000_0000 | id)).is_ok());
    }
    assert_eq!(
        node.register_non_compliant(subscription(0x1000_0010)),
        Err(RegistrationError::TableFull)
    );
    assert!(node.unregister_non_compliant(0x1000_0000));
    assert!(!node.unregister_non_compliant(0x1000_0000));
    assert_eq!(node.non_compliant_count(), NON_COMPLIANT_SLOTS - 1);
}

#[test]
fn test_standard_frames_take_compliant_path() {
    // An 11-bit identifier decodes with the non-compliance bit clear, so it is treated as a
    // compliant frame even when a subscription exists for its raw identifier.
    let legacy = Recorder::default();
    let node = TestNode::new(TestHal::new());
    started(&node);
    // Decodes as receiver 0/1: not for this device, falls through to the raw table.
    node.register_non_compliant(NonCompliant {
        id: 0x081,
        timeout_ms: 0,
        handler: &legacy,
    })
    .unwrap();
    node.process(&Frame::raw(0x081, false, data(&[9])));
    assert_eq!(legacy.frame_count(), 1);

    // Decodes as a response from 0/0 to 0/3 (wildcard class, own instance).
    let id = 0x003 << 7 | 0x10;
    node.register_non_compliant(NonCompliant {
        id,
        timeout_ms: 0,
        handler: &legacy,
    })
    .unwrap();
    node.process(&Frame::raw(id, false, data(&[9])));
    assert_eq!(legacy.frame_count(), 1);
    assert_eq!(node.hal().take_errors(), [ErrorKind::UnmatchedResponse]);
}

#[test]
fn test_extended_non_compliant_bit() {
    let recorder = Recorder::default();
    let node = TestNode::new(TestHal::new());
    started(&node);

    let mut id = CompliantId::new(address(9, 2), OWN, ddef(5));
    id.non_compliant = true;
    let word = id.encode();
    node.register_non_compliant(NonCompliant {
        id: word,
        timeout_ms: 0,
        handler: &recorder,
    })
    .unwrap();

    let mut frame = Frame::compliant(id, true, data(&[1]));
    node.process(&frame);
    assert_eq!(recorder.frame_count(), 1);
    assert!(node.hal().take_sent().is_empty());

    // The same bits in a standard frame take the compliant path.
    frame.extended = false;
    node.process(&frame);
    assert_eq!(recorder.frame_count(), 1);
    assert_eq!(node.hal().take_sent().len(), 1);
}

struct Subscriber<'a> {
    node: &'a TestNode<'a>,
    nested: &'a Recorder,
}

impl DdefHandler for Subscriber<'_> {
    fn handle(&self, _request: &Frame) -> Option<Data> {
        let registration = self.node.register_broadcast(Broadcast {
            sender_class: ClassId::new(12).unwrap(),
            data_def: DataDef::new(2).unwrap(),
            timeout_ms: 0,
            handler: self.nested,
        });
        Some(data(&[registration.is_ok() as u8]))
    }
}

#[test]
fn test_handler_reenters_node() {
    let nested = Recorder::default();
    let node: &TestNode<'_> = Box::leak(Box::new(TestNode::new(TestHal::new())));
    let subscriber: &Subscriber<'_> = Box::leak(Box::new(Subscriber {
        node,
        nested: Box::leak(Box::new(nested)),
    }));
    started(node);
    node.register_ddef_handler(ddef(30), subscriber);

    node.process(&request(address(9, 2), OWN, 30, &[]));

    assert_eq!(&*node.hal().take_sent()[0].data, &[1]);
    assert_eq!(node.broadcast_count(), 1);
    node.process(&broadcast(address(12, 1), 2, &[]));
    assert_eq!(subscriber.nested.frame_count(), 1);
}

#[test]
fn test_publish_and_raw_send() {
    let node = TestNode::new(TestHal::new());
    started(&node);

    node.publish_broadcast(ddef(3), data(&[7, 7])).unwrap();
    node.send_raw(0x0a1, false, data(&[1]));

    let sent = node.hal().take_sent();
    assert_eq!(sent.len(), 2);
    let id = sent[0].compliant_id();
    assert!(id.broadcast);
    assert_eq!(id.sender, OWN);
    assert_eq!(id.receiver, DeviceAddress::WILDCARD);
    assert!(!sent[0].request);
    assert_eq!(sent[1].id, 0x0a1);
    assert!(!sent[1].extended);
}
