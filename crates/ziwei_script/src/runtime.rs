//! Script runtime management
//!
//! One QuickJS runtime + context per bridge. The engine bundle is loaded once
//! with [`ScriptRuntime::execute`]; afterwards the bridge only talks to it
//! through [`ScriptHost`].

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use std::time::Instant;

use rquickjs::function::Func;
use rquickjs::{Context, Ctx, Object, Runtime, Value};

use crate::{EvalCompletion, EvalResult, MessageHandler, ScriptConfig, ScriptError, ScriptHost};

/// Messages pushed before a handler exists are held until one is installed.
#[derive(Default)]
struct Inbound {
    handler: Option<MessageHandler>,
    backlog: Vec<String>,
}

/// Script execution context
pub struct ScriptRuntime {
    runtime: Runtime,
    pub context: Context,
    inbound: Rc<RefCell<Inbound>>,
    config: ScriptConfig,
}

impl ScriptRuntime {
    pub fn new(config: ScriptConfig) -> Result<Self, ScriptError> {
        let runtime = Runtime::new().map_err(|e| ScriptError::InitError(e.to_string()))?;
        runtime.set_memory_limit(config.memory_limit);
        let context =
            Context::full(&runtime).map_err(|e| ScriptError::InitError(e.to_string()))?;

        let host = Self {
            runtime,
            context,
            inbound: Rc::new(RefCell::new(Inbound::default())),
            config,
        };
        host.install_globals()
            .map_err(|e| ScriptError::InitError(e.to_string()))?;

        tracing::debug!(handler = %host.config.handler_name, "Script runtime created");
        Ok(host)
    }

    pub fn config(&self) -> &ScriptConfig {
        &self.config
    }

    /// Browser-style globals plus the message handler object.
    fn install_globals(&self) -> rquickjs::Result<()> {
        let inbound = self.inbound.clone();
        let name = self.config.handler_name.clone();

        self.context.with(|ctx| {
            let globals = ctx.globals();
            globals.set("window", globals.clone())?;
            globals.set("global", globals.clone())?;

            let channel = Object::new(ctx.clone())?;
            channel.set(
                "postMessage",
                Func::from(move |message: String| {
                    let mut guard = inbound.borrow_mut();
                    let inbound = &mut *guard;
                    match &inbound.handler {
                        Some(deliver) => deliver(message),
                        None => inbound.backlog.push(message),
                    }
                }),
            )?;

            let handlers = Object::new(ctx.clone())?;
            handlers.set(name.as_str(), channel.clone())?;
            let webkit = Object::new(ctx.clone())?;
            webkit.set("messageHandlers", handlers)?;
            globals.set("webkit", webkit)?;
            globals.set(name.as_str(), channel)?;
            Ok(())
        })
    }

    /// Load a script (bundle, glue) into the global scope.
    pub fn execute(&self, name: &str, source: &str) -> Result<(), ScriptError> {
        let started = Instant::now();
        self.eval(source).map_err(|err| ScriptError::LoadError {
            name: name.to_string(),
            message: err.to_string(),
        })?;
        tracing::info!(
            script = name,
            bytes = source.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Script loaded"
        );
        Ok(())
    }

    pub fn execute_file(&self, path: &Path) -> Result<(), ScriptError> {
        let source = std::fs::read_to_string(path)?;
        self.execute(&path.display().to_string(), &source)
    }

    /// Evaluate `code`, then drain promise jobs it queued.
    pub fn eval(&self, code: &str) -> EvalResult {
        let result = self.context.with(|ctx| match ctx.eval::<Value, _>(code) {
            Ok(value) => string_value(&value),
            Err(rquickjs::Error::Exception) => Err(ScriptError::JsError(describe_exception(&ctx))),
            Err(err) => Err(ScriptError::JsError(err.to_string())),
        });
        self.run_pending_jobs();
        result
    }

    fn run_pending_jobs(&self) {
        loop {
            match self.runtime.execute_pending_job() {
                Ok(true) => continue,
                Ok(false) => break,
                Err(_) => tracing::warn!("Pending script job threw an exception"),
            }
        }
    }
}

impl ScriptHost for ScriptRuntime {
    fn evaluate(&self, code: &str, completion: EvalCompletion) {
        completion(self.eval(code));
    }

    fn set_message_handler(&self, handler: MessageHandler) {
        let backlog = {
            let mut inbound = self.inbound.borrow_mut();
            inbound.handler = Some(handler);
            std::mem::take(&mut inbound.backlog)
        };

        if backlog.is_empty() {
            return;
        }
        tracing::debug!(count = backlog.len(), "Flushing messages pushed before handler");
        let inbound = self.inbound.borrow();
        if let Some(deliver) = &inbound.handler {
            for message in backlog {
                deliver(message);
            }
        }
    }
}

fn string_value(value: &Value<'_>) -> EvalResult {
    if !value.is_string() {
        return Ok(None);
    }
    value
        .get::<String>()
        .map(Some)
        .map_err(|e| ScriptError::JsError(e.to_string()))
}

fn describe_exception(ctx: &Ctx<'_>) -> String {
    let caught = ctx.catch();
    if let Some(message) = caught
        .as_object()
        .and_then(|error| error.get::<_, String>("message").ok())
    {
        return message;
    }
    caught
        .get::<String>()
        .unwrap_or_else(|_| "non-error value thrown".to_string())
}
