//! # CVNP
//!
//! This library implements CVNP, a CAN application-layer addressing and request/response
//! protocol for vehicle control modules, in no_std environments. It multiplexes one physical
//! bus among request/response, broadcast, multicast and legacy ("non-compliant")
//! conversations, using fixed-capacity tables and no dynamic memory allocation.
//!
//! The library is designed to run from CAN receive interrupts and timer callbacks, keeping all
//! critical section durations bounded by the table sizes.
//!
//! ## Architecture
//!
//! ```text
//!  ┌──────┐ process ┌─────────────────────┐ on_frame / on_response ┌─────────┐
//!  │ Link ├────────►│        Node         ├───────────────────────►│ Drivers │
//!  └──▲───┘         │ ┌─────────────────┐ │                        └────┬────┘
//!     │             │ │ Ddef table      │ │◄──── register_* / query ─────┘
//!  ┌──┴─────┐ tick  │ │ Broadcast table │ │
//!  │ Runner ├──────►│ │ Query table     │ │ send_frame ┌─────┐
//!  └────────┘       │ │ Multicast table │ ├───────────►│ Hal │
//!                   │ │ Non-compl. table│ │            └─────┘
//!                   │ └─────────────────┘ │
//!                   └─────────────────────┘
//! ```
//! Components:
//! * _Node_ holds the device address, the platform collaborator and the handler registries.
//!   It classifies each incoming frame and routes it to exactly one registry lookup.
//! * _Hal_ is the platform collaborator: frame transmission, the millisecond clock, the error
//!   sink and the system reset.
//! * _Handlers_ are driver-owned callback objects registered by reference.
//! * _Link_ is an optional pair of frame queues between the CAN driver and the node.
//! * _Runner_ is a worker task draining the link into the node and running the periodic
//!   timeout sweep.
//!
//! ## Protocol
//!
//! A CVNP identifier carries the sender and receiver addresses (class and instance), a data
//! definition code selecting the command, a broadcast flag and a non-compliance flag. A
//! receiver class or instance of 0 is a wildcard.
//!
//! * A request addressed to this device is answered by the handler bound to its data
//!   definition. Unbound codes are answered with an error report.
//! * A broadcast refreshes the subscription for its sender class and data definition.
//!   Subscriptions report silence longer than their timeout.
//! * A response resolves the query issued to its sender. Standard queries are one-shot,
//!   multicast queries (issued to a wildcard target) collect responses until they expire.
//! * Frames of legacy devices are matched by raw identifier and watched like heartbeats.
//!
//! ## Concurrency model
//!
//! Every registry sits behind its own blocking mutex. There are two common choices:
//! * _CriticalSectionRawMutex_ allows calling `process` from the receive interrupt and `tick`
//!   from a timer interrupt while drivers register and query at thread level.
//! * _ThreadModeRawMutex_ or _NoopRawMutex_ has no system-wide effects but requires all calls
//!   to happen in one executor, which the `Runner` arranges.
//!
//! Callbacks are invoked after the lock is released, so they may register subscriptions or
//! issue queries themselves.
#![no_std]

pub use cvnp_core as core;
pub use cvnp_driver::{frame, hal, link, time};

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod config;
pub mod handler;
pub mod node;
mod registry;

pub use registry::{Registration, RegistrationError};
