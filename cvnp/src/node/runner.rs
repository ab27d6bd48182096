use embassy_futures::select::{Either, select};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::Ticker;

use crate::config::TICK_PERIOD;
use crate::hal::Hal;
use crate::link::Link;
use crate::node::{DynamicNode, Node};
use crate::time::Duration;

/// Node background task runner.
///
/// Drains received frames from a `Link` into the node and runs the timeout sweep every
/// tick period. All engine work then happens in the runner's task, so the interrupt handler
/// only queues frames.
pub struct Runner<'a, LM: RawMutex, const RX: usize, const TX: usize> {
    node: &'a dyn DynamicNode,
    link: &'a Link<LM, RX, TX>,
    period: Duration,
}

impl<'a, LM: RawMutex, const RX: usize, const TX: usize> Runner<'a, LM, RX, TX> {
    pub fn new<M, H, const BC: usize, const SQ: usize, const MC: usize, const NC: usize>(
        node: &'a Node<'_, M, H, BC, SQ, MC, NC>,
        link: &'a Link<LM, RX, TX>,
    ) -> Self
    where
        M: RawMutex,
        H: Hal,
    {
        Self {
            node,
            link,
            period: TICK_PERIOD,
        }
    }

    /// Overrides the timeout sweep period.
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    pub async fn run(&mut self) {
        let mut ticker = Ticker::every(self.period);

        loop {
            match select(ticker.next(), self.link.receive()).await {
                Either::First(()) => self.node.tick(self.node.now()),
                Either::Second(frame) => self.node.process(&frame),
            }
        }
    }
}
