//! Ziwei Bridge
//!
//! Full-duplex bridge between the host and the chart engine running inside
//! one long-lived script runtime.
//!
//! ## Architecture
//!
//! - **Readiness gate:** nothing is sent before the runtime announces itself
//! - **Calculation:** `calculateAstrolabe('<json>')`, answered later on the
//!   push channel and routed to the single outstanding-calculation slot
//! - **Lookups:** `getDecadalData(age)` and friends, answered by the call's
//!   own return value as a `{success, data, error}` envelope
//!
//! The bridge is single-threaded: drive it from a current-thread tokio
//! runtime or a `LocalSet`.

pub mod calls;
pub mod config;
pub mod demux;
pub mod gate;
mod error;
mod slot;

#[cfg(test)]
mod testing;

pub use config::{BridgeConfig, ClassifierMode, SubmitPolicy};
pub use error::SubmitError;
pub use gate::{ReadinessGate, ReadinessState};
pub use slot::ChartReceiver;

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use serde::de::DeserializeOwned;
use tokio::sync::{mpsc, oneshot, Notify};
use ziwei_core::{
    decode_envelope, CalculationRequest, DailyData, DecadalData, MonthlyData, RawChartPayload,
    YearlyData,
};
use ziwei_metrics::{names, BridgeMetrics};
use ziwei_script::ScriptHost;

use crate::calls::LookupQuery;
use crate::demux::InboundMessage;
use crate::slot::{CalculationSlot, ChartSender};

/// State touched from `evaluate` completions as well as from the bridge.
struct Shared {
    slot: CalculationSlot,
    last_result: Option<RawChartPayload>,
    metrics: BridgeMetrics,
}

pub struct Bridge<H: ScriptHost> {
    host: H,
    config: BridgeConfig,
    gate: ReadinessGate,
    shared: Rc<RefCell<Shared>>,
    inbound: RefCell<mpsc::UnboundedReceiver<String>>,
    arrivals: Rc<Notify>,
}

impl<H: ScriptHost> Bridge<H> {
    /// Take ownership of `host` and become its message handler.
    ///
    /// Messages the runtime pushed while loading (the readiness
    /// announcement in particular) are processed before this returns.
    pub fn new(host: H, config: BridgeConfig) -> Self {
        // Pushed messages are queued and demultiplexed after `evaluate`
        // returns, so the runtime is never re-entered from its own callback.
        let (tx, rx) = mpsc::unbounded_channel();
        let arrivals = Rc::new(Notify::new());
        let signal = Rc::clone(&arrivals);
        host.set_message_handler(Box::new(move |raw| {
            if tx.send(raw).is_err() {
                tracing::debug!("Bridge dropped, discarding pushed message");
                return;
            }
            signal.notify_one();
        }));

        let bridge = Self {
            host,
            gate: ReadinessGate::new(),
            shared: Rc::new(RefCell::new(Shared {
                slot: CalculationSlot::default(),
                last_result: None,
                metrics: BridgeMetrics::new(config.latency_window),
            })),
            inbound: RefCell::new(rx),
            arrivals,
            config,
        };
        bridge.pump();
        bridge
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn is_ready(&self) -> bool {
        self.gate.is_ready()
    }

    pub fn readiness(&self) -> ReadinessState {
        self.gate.state()
    }

    /// The outstanding-calculation flag.
    pub fn is_calculating(&self) -> bool {
        self.shared.borrow().slot.is_outstanding()
    }

    pub fn queued_calculations(&self) -> usize {
        self.shared.borrow().slot.queued_len()
    }

    /// Most recent chart pushed by the runtime, delivered or not.
    pub fn last_result(&self) -> Option<RawChartPayload> {
        self.shared.borrow().last_result.clone()
    }

    pub fn metric(&self, name: &str) -> usize {
        self.shared.borrow().metrics.get(name)
    }

    pub fn average_lookup_latency_ms(&self) -> f64 {
        self.shared.borrow().metrics.average_latency_ms()
    }

    pub fn max_lookup_latency_ms(&self) -> f64 {
        self.shared.borrow().metrics.max_latency_ms()
    }

    /// Demultiplex every queued pushed message, then dispatch a queued
    /// calculation if the slot is free. Returns the number of messages.
    pub fn pump(&self) -> usize {
        let mut handled = 0;
        loop {
            let next = self.inbound.borrow_mut().try_recv();
            let Ok(raw) = next else { break };
            self.on_message(&raw);
            handled += 1;
        }
        self.advance_queue();
        handled
    }

    /// The single inbound message handler.
    pub fn on_message(&self, raw: &str) {
        self.shared
            .borrow_mut()
            .metrics
            .count(names::MESSAGES_RECEIVED);

        match demux::classify(raw, self.config.classifier, &self.config.readiness_marker) {
            InboundMessage::Ready => {
                if self.gate.mark_ready() {
                    tracing::info!("Script runtime ready");
                } else {
                    tracing::debug!("Repeated readiness message ignored");
                }
            }
            InboundMessage::Chart(payload) => {
                log_chart(&payload);
                self.finish_calculation(Some(payload));
            }
            InboundMessage::EngineFailure(error) => {
                tracing::warn!(%error, "Engine reported calculation failure");
                self.finish_calculation(None);
            }
        }
    }

    fn finish_calculation(&self, outcome: Option<RawChartPayload>) {
        let mut shared = self.shared.borrow_mut();
        if let Some(payload) = &outcome {
            shared.last_result = Some(payload.clone());
            shared.metrics.count(names::CHARTS_DELIVERED);
        }
        if !shared.slot.complete(outcome) {
            tracing::debug!("Chart arrived with no calculation outstanding");
        }
    }

    /// Submit a natal chart calculation.
    ///
    /// The chart arrives later through the push channel. Awaiting the
    /// returned receiver directly only sees messages someone
    /// [`pump`](Self::pump)s; [`resolve`](Self::resolve) and
    /// [`calculate`](Self::calculate) drain the channel themselves.
    pub fn submit_calculation(
        &self,
        request: CalculationRequest,
    ) -> Result<ChartReceiver, SubmitError> {
        if !self.gate.is_ready() {
            tracing::warn!("Script runtime not ready, calculation dropped");
            self.count(names::REJECTED_NOT_READY);
            return Err(SubmitError::NotReady);
        }

        let (reply, receiver) = ChartReceiver::channel();
        {
            let mut shared = self.shared.borrow_mut();
            if shared.slot.is_outstanding() {
                match self.config.submit_policy {
                    SubmitPolicy::Reject => {
                        tracing::warn!("Calculation already outstanding, rejecting submission");
                        shared.metrics.count(names::REJECTED_BUSY);
                        return Err(SubmitError::Busy);
                    }
                    SubmitPolicy::Overwrite => {
                        tracing::warn!("Calculation already outstanding, overwriting its slot");
                        shared.slot.abandon_waiter();
                    }
                    SubmitPolicy::Queue => {
                        shared.slot.enqueue(request, reply);
                        tracing::debug!(
                            queued = shared.slot.queued_len(),
                            "Calculation queued behind outstanding one"
                        );
                        return Ok(receiver);
                    }
                }
            }
        }

        self.dispatch_calculation(request, reply)?;
        Ok(receiver)
    }

    /// Submit and wait for the chart, draining pushed messages as they arrive.
    pub async fn calculate(
        &self,
        request: CalculationRequest,
    ) -> Result<Option<RawChartPayload>, SubmitError> {
        let receiver = self.submit_calculation(request)?;
        Ok(self.resolve(receiver).await)
    }

    /// Wait for `receiver`, demultiplexing pushed messages until it resolves.
    pub async fn resolve(&self, mut receiver: ChartReceiver) -> Option<RawChartPayload> {
        loop {
            self.pump();
            // A push between `pump` and here leaves a permit, so it is not lost.
            let arrived = self.arrivals.notified();
            tokio::select! {
                outcome = &mut receiver => return outcome,
                _ = arrived => {}
            }
        }
    }

    fn dispatch_calculation(
        &self,
        request: CalculationRequest,
        reply: ChartSender,
    ) -> Result<(), SubmitError> {
        let code = calls::calculate_call(&request, self.config.escape_style)?;
        {
            let mut shared = self.shared.borrow_mut();
            shared.slot.begin(reply);
            shared.metrics.count(names::DISPATCHED);
        }
        tracing::debug!(%code, "Dispatching calculation");

        let shared = Rc::clone(&self.shared);
        self.host.evaluate(
            &code,
            Box::new(move |result| {
                // Success carries nothing; the chart comes through the push channel.
                if let Err(err) = result {
                    tracing::warn!(error = %err, "Calculation call failed");
                    let mut shared = shared.borrow_mut();
                    shared.metrics.count(names::TRANSPORT_ERRORS);
                    shared.slot.complete(None);
                }
            }),
        );
        self.pump();
        Ok(())
    }

    fn advance_queue(&self) {
        loop {
            let next = self.shared.borrow_mut().slot.next_queued();
            let Some((request, reply)) = next else { break };
            if let Err(err) = self.dispatch_calculation(request, reply) {
                // `reply` went down with the failed dispatch; its receiver sees `None`.
                tracing::warn!(error = %err, "Queued calculation could not be dispatched");
            }
        }
    }

    pub async fn fetch_decadal(&self, age: u32) -> Option<DecadalData> {
        self.lookup(LookupQuery::Decadal { age }).await
    }

    pub async fn fetch_yearly(&self, year: i32) -> Option<YearlyData> {
        self.lookup(LookupQuery::Yearly { year }).await
    }

    pub async fn fetch_monthly(&self, year: i32, month: u32) -> Option<MonthlyData> {
        self.lookup(LookupQuery::Monthly { year, month }).await
    }

    pub async fn fetch_daily(&self, year: i32, month: u32, day: u32) -> Option<DailyData> {
        self.lookup(LookupQuery::Daily { year, month, day }).await
    }

    /// Every failure (not ready, call error, bad envelope, reported failure)
    /// is logged and collapses to `None`.
    async fn lookup<T: DeserializeOwned>(&self, query: LookupQuery) -> Option<T> {
        let kind = query.kind();
        if !self.gate.is_ready() {
            tracing::warn!(%kind, "Script runtime not ready, lookup skipped");
            self.count(names::REJECTED_NOT_READY);
            return None;
        }

        let code = query.expression();
        tracing::debug!(%code, "Dispatching lookup");
        self.count(names::DISPATCHED);

        let started = Instant::now();
        let (tx, rx) = oneshot::channel();
        self.host.evaluate(
            &code,
            Box::new(move |result| {
                let _ = tx.send(result);
            }),
        );
        self.pump();

        let outcome = rx.await;
        self.shared
            .borrow_mut()
            .metrics
            .record_latency(started.elapsed());

        let raw = match outcome {
            Ok(Ok(raw)) => raw,
            Ok(Err(err)) => {
                tracing::warn!(%kind, error = %err, "Lookup call failed");
                self.count(names::TRANSPORT_ERRORS);
                return None;
            }
            Err(_) => {
                tracing::warn!(%kind, "Lookup completion dropped by host");
                self.count(names::TRANSPORT_ERRORS);
                return None;
            }
        };

        match decode_envelope::<T>(raw.as_deref()) {
            Ok(data) => Some(data),
            Err(err) => {
                tracing::warn!(%kind, error = %err, "Lookup returned no data");
                self.count(names::DECODE_FAILURES);
                None
            }
        }
    }

    fn count(&self, name: &str) {
        self.shared.borrow_mut().metrics.count(name);
    }
}

fn log_chart(payload: &RawChartPayload) {
    tracing::info!(bytes = payload.len(), "Chart received");
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }
    match payload.summary() {
        Ok(summary) => {
            for palace in &summary.palaces {
                tracing::debug!(palace = %palace.name, stars = ?palace.stars, "Chart palace");
            }
        }
        Err(err) => tracing::debug!(error = %err, "Chart payload is not JSON"),
    }
}
