//! Mock UI host for controller tests

#![allow(dead_code)]

use async_trait::async_trait;
use pr_deck::app::{AppHost, HostContext, LogLevel};
use pr_deck::error::{Error, Result};
use pr_deck::gateway::{CallToolResult, Gateway};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Recorded `call_tool` invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub name: String,
    pub arguments: Value,
}

/// `AppHost` double that forwards tool calls to a real [`Gateway`]
///
/// Features:
/// - Records tool calls, log entries and opened links
/// - Gates per tool name so tests can hold calls in flight
/// - Canned results and transport error injection per tool name
pub struct MockHost {
    gateway: Gateway,
    context: Mutex<HostContext>,
    tool_calls: Mutex<Vec<ToolCall>>,
    logs: Mutex<Vec<(LogLevel, String)>>,
    opened_links: Mutex<Vec<String>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    canned: Mutex<HashMap<String, CallToolResult>>,
    transport_errors: Mutex<HashMap<String, String>>,
}

impl MockHost {
    pub fn new(gateway: Gateway) -> Self {
        Self {
            gateway,
            context: Mutex::new(HostContext::default()),
            tool_calls: Mutex::new(Vec::new()),
            logs: Mutex::new(Vec::new()),
            opened_links: Mutex::new(Vec::new()),
            gates: Mutex::new(HashMap::new()),
            canned: Mutex::new(HashMap::new()),
            transport_errors: Mutex::new(HashMap::new()),
        }
    }

    pub fn set_context(&self, context: HostContext) {
        *self.context.lock().unwrap() = context;
    }

    /// Hold calls to `tool` until [`MockHost::release`]
    pub fn hold(&self, tool: &str) {
        self.gates
            .lock()
            .unwrap()
            .insert(tool.to_string(), Arc::new(Notify::new()));
    }

    /// Let one held call to `tool` proceed
    pub fn release(&self, tool: &str) {
        if let Some(gate) = self.gates.lock().unwrap().get(tool) {
            gate.notify_one();
        }
    }

    /// Answer the next call to `tool` with `result` instead of the gateway
    pub fn respond_with(&self, tool: &str, result: CallToolResult) {
        self.canned
            .lock()
            .unwrap()
            .insert(tool.to_string(), result);
    }

    /// Fail the next call to `tool` before it reaches the gateway
    pub fn fail_transport(&self, tool: &str, msg: &str) {
        self.transport_errors
            .lock()
            .unwrap()
            .insert(tool.to_string(), msg.to_string());
    }

    // === Inspection ===

    pub fn tool_calls(&self) -> Vec<ToolCall> {
        self.tool_calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, tool: &str) -> usize {
        self.tool_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.name == tool)
            .count()
    }

    pub fn logs(&self) -> Vec<(LogLevel, String)> {
        self.logs.lock().unwrap().clone()
    }

    pub fn logs_at(&self, level: LogLevel) -> Vec<String> {
        self.logs
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, data)| data.clone())
            .collect()
    }

    pub fn opened_links(&self) -> Vec<String> {
        self.opened_links.lock().unwrap().clone()
    }
}

#[async_trait]
impl AppHost for MockHost {
    async fn call_tool(&self, name: &str, arguments: Value) -> Result<CallToolResult> {
        self.tool_calls.lock().unwrap().push(ToolCall {
            name: name.to_string(),
            arguments: arguments.clone(),
        });

        let gate = self.gates.lock().unwrap().get(name).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let transport_error = self.transport_errors.lock().unwrap().remove(name);
        if let Some(msg) = transport_error {
            return Err(Error::ToolResponse(msg));
        }
        let canned = self.canned.lock().unwrap().remove(name);
        if let Some(result) = canned {
            return Ok(result);
        }

        self.gateway.call_tool(name, arguments).await
    }

    fn open_link(&self, url: &str) {
        self.opened_links.lock().unwrap().push(url.to_string());
    }

    fn send_log(&self, level: LogLevel, data: &str) {
        self.logs.lock().unwrap().push((level, data.to_string()));
    }

    fn host_context(&self) -> HostContext {
        self.context.lock().unwrap().clone()
    }
}
