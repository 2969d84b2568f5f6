//! Scripted stand-in for the script runtime
//!
//! Decodes `calculateAstrolabe('...')` arguments the way a script engine
//! would, answers lookups from a table, and can hold completions back to
//! simulate a runtime that answers later.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use ziwei_core::{unescape_single_quoted, CalculationRequest};
use ziwei_script::{EvalCompletion, EvalResult, MessageHandler, ScriptError, ScriptHost};

use crate::calls::CALCULATE_FUNCTION;

#[derive(Default)]
struct FakeState {
    calls: Vec<String>,
    requests: Vec<CalculationRequest>,
    replies: HashMap<String, Result<Option<String>, String>>,
    chart_reply: Option<String>,
    calculate_error: Option<String>,
    defer: bool,
    deferred: VecDeque<(EvalCompletion, EvalResult)>,
    backlog: Vec<String>,
}

#[derive(Default)]
pub(crate) struct FakeHost {
    state: RefCell<FakeState>,
    handler: RefCell<Option<MessageHandler>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// A host whose bundle already announced readiness.
    pub fn booted() -> Self {
        let host = Self::new();
        host.push(r#"{"status":"ready"}"#);
        host
    }

    /// Push `chart` synchronously from inside every calculation call.
    pub fn with_chart_reply(self, chart: &str) -> Self {
        self.state.borrow_mut().chart_reply = Some(chart.to_string());
        self
    }

    pub fn with_calculate_error(self, message: &str) -> Self {
        self.state.borrow_mut().calculate_error = Some(message.to_string());
        self
    }

    /// Hold completions until [`complete_deferred`](Self::complete_deferred).
    pub fn deferred(self) -> Self {
        self.state.borrow_mut().defer = true;
        self
    }

    pub fn reply(&self, expression: &str, text: &str) {
        self.state
            .borrow_mut()
            .replies
            .insert(expression.to_string(), Ok(Some(text.to_string())));
    }

    pub fn reply_error(&self, expression: &str, message: &str) {
        self.state
            .borrow_mut()
            .replies
            .insert(expression.to_string(), Err(message.to_string()));
    }

    pub fn reply_non_string(&self, expression: &str) {
        self.state
            .borrow_mut()
            .replies
            .insert(expression.to_string(), Ok(None));
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    /// Requests as decoded on the script side of the call.
    pub fn requests(&self) -> Vec<CalculationRequest> {
        self.state.borrow().requests.clone()
    }

    /// Push a message through the handler, as the runtime would.
    pub fn push(&self, raw: &str) {
        let handler = self.handler.borrow();
        match handler.as_ref() {
            Some(deliver) => deliver(raw.to_string()),
            None => self.state.borrow_mut().backlog.push(raw.to_string()),
        }
    }

    pub fn complete_deferred(&self) -> usize {
        let deferred: Vec<_> = self.state.borrow_mut().deferred.drain(..).collect();
        let count = deferred.len();
        for (completion, result) in deferred {
            completion(result);
        }
        count
    }

    fn run_calculation(&self, code: &str) -> EvalResult {
        let prefix = format!("{CALCULATE_FUNCTION}('");
        let literal = code
            .strip_prefix(prefix.as_str())
            .and_then(|rest| rest.strip_suffix("')"))
            .ok_or_else(|| ScriptError::JsError("SyntaxError: bad call".to_string()))?;
        let json = unescape_single_quoted(literal)
            .ok_or_else(|| ScriptError::JsError("SyntaxError: unterminated string".to_string()))?;
        let request: CalculationRequest = serde_json::from_str(&json)
            .map_err(|e| ScriptError::JsError(format!("SyntaxError: {e}")))?;
        self.state.borrow_mut().requests.push(request);

        let (error, chart) = {
            let state = self.state.borrow();
            (state.calculate_error.clone(), state.chart_reply.clone())
        };
        if let Some(message) = error {
            return Err(ScriptError::JsError(message));
        }
        if let Some(chart) = chart {
            self.push(&chart);
        }
        Ok(None)
    }
}

impl ScriptHost for FakeHost {
    fn evaluate(&self, code: &str, completion: EvalCompletion) {
        self.state.borrow_mut().calls.push(code.to_string());

        let result = if code.starts_with(CALCULATE_FUNCTION) {
            self.run_calculation(code)
        } else {
            let reply = self.state.borrow().replies.get(code).cloned();
            match reply {
                Some(Ok(value)) => Ok(value),
                Some(Err(message)) => Err(ScriptError::JsError(message)),
                None => Err(ScriptError::JsError(format!("ReferenceError: {code}"))),
            }
        };

        if self.state.borrow().defer {
            self.state.borrow_mut().deferred.push_back((completion, result));
        } else {
            completion(result);
        }
    }

    fn set_message_handler(&self, handler: MessageHandler) {
        let backlog = std::mem::take(&mut self.state.borrow_mut().backlog);
        for raw in backlog {
            handler(raw);
        }
        *self.handler.borrow_mut() = Some(handler);
    }
}
