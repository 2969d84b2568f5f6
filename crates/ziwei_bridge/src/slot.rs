//! One-slot mailbox for the outstanding calculation
//!
//! The push channel has no correlation ids, so at most one calculation may be
//! in flight. The slot holds its waiter; queued submissions (only under
//! [`SubmitPolicy::Queue`](crate::SubmitPolicy::Queue)) wait behind it.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;
use ziwei_core::{CalculationRequest, RawChartPayload};

pub(crate) type ChartSender = oneshot::Sender<Option<RawChartPayload>>;

/// Resolves with the pushed chart, or `None` when the calculation failed or
/// was superseded.
#[derive(Debug)]
pub struct ChartReceiver {
    rx: oneshot::Receiver<Option<RawChartPayload>>,
}

impl ChartReceiver {
    pub(crate) fn channel() -> (ChartSender, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx })
    }

    /// Non-blocking check: `None` while still pending.
    pub fn try_recv(&mut self) -> Option<Option<RawChartPayload>> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(None),
        }
    }
}

impl Future for ChartReceiver {
    type Output = Option<RawChartPayload>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|outcome| outcome.ok().flatten())
    }
}

#[derive(Default)]
pub(crate) struct CalculationSlot {
    outstanding: bool,
    waiter: Option<ChartSender>,
    queued: VecDeque<(CalculationRequest, ChartSender)>,
}

impl CalculationSlot {
    pub fn is_outstanding(&self) -> bool {
        self.outstanding
    }

    pub fn queued_len(&self) -> usize {
        self.queued.len()
    }

    /// Mark a freshly dispatched calculation as outstanding.
    pub fn begin(&mut self, waiter: ChartSender) {
        self.outstanding = true;
        self.waiter = Some(waiter);
    }

    /// Drop the current waiter without clearing the flag; its receiver
    /// resolves with `None`.
    pub fn abandon_waiter(&mut self) -> bool {
        self.waiter.take().is_some()
    }

    /// Resolve the outstanding calculation. Returns whether one was
    /// outstanding.
    pub fn complete(&mut self, outcome: Option<RawChartPayload>) -> bool {
        let was_outstanding = std::mem::replace(&mut self.outstanding, false);
        if let Some(waiter) = self.waiter.take() {
            // The caller may have dropped its receiver; nothing to do then.
            let _ = waiter.send(outcome);
        }
        was_outstanding
    }

    pub fn enqueue(&mut self, request: CalculationRequest, waiter: ChartSender) {
        self.queued.push_back((request, waiter));
    }

    /// Next queued submission, only once the slot is free.
    pub fn next_queued(&mut self) -> Option<(CalculationRequest, ChartSender)> {
        if self.outstanding {
            return None;
        }
        self.queued.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart(raw: &str) -> Option<RawChartPayload> {
        Some(RawChartPayload::new(raw))
    }

    #[test]
    fn complete_delivers_to_waiter_and_clears_flag() {
        let mut slot = CalculationSlot::default();
        let (tx, mut rx) = ChartReceiver::channel();

        slot.begin(tx);
        assert!(slot.is_outstanding());
        assert_eq!(rx.try_recv(), None);

        assert!(slot.complete(chart("{}")));
        assert!(!slot.is_outstanding());
        assert_eq!(rx.try_recv(), Some(chart("{}")));
    }

    #[test]
    fn complete_without_outstanding_reports_false() {
        let mut slot = CalculationSlot::default();
        assert!(!slot.complete(chart("{}")));
    }

    #[test]
    fn abandoned_waiter_resolves_none_but_flag_stays() {
        let mut slot = CalculationSlot::default();
        let (tx, mut rx) = ChartReceiver::channel();
        slot.begin(tx);

        assert!(slot.abandon_waiter());
        assert!(slot.is_outstanding());
        assert_eq!(rx.try_recv(), Some(None));
    }

    #[test]
    fn queue_waits_for_free_slot() {
        let mut slot = CalculationSlot::default();
        let (first, _first_rx) = ChartReceiver::channel();
        let (second, _second_rx) = ChartReceiver::channel();
        let request = CalculationRequest::new(2000, 1, 1, 0, 0, "female", false);

        slot.begin(first);
        slot.enqueue(request.clone(), second);
        assert_eq!(slot.queued_len(), 1);
        assert!(slot.next_queued().is_none());

        slot.complete(None);
        let (next, _) = slot.next_queued().unwrap();
        assert_eq!(next, request);
        assert_eq!(slot.queued_len(), 0);
    }

    #[tokio::test]
    async fn receiver_awaits_outcome() {
        let mut slot = CalculationSlot::default();
        let (tx, rx) = ChartReceiver::channel();
        slot.begin(tx);
        slot.complete(chart(r#"{"palaces":[]}"#));

        assert_eq!(rx.await, chart(r#"{"palaces":[]}"#));
    }
}
