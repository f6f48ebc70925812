use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use crate::error::CoreError;

use super::Transport;

/// A mock node for testing. Answers JSON-RPC payloads from canned results
/// populated via the builder pattern and records every payload it receives.
pub struct MockTransport {
    results: HashMap<String, serde_json::Value>,
    errors: HashMap<String, (i64, String)>,
    raw_body: Option<String>,
    reverse_batches: bool,
    sent: Mutex<Vec<serde_json::Value>>,
}

impl MockTransport {
    pub fn builder() -> MockTransportBuilder {
        MockTransportBuilder {
            results: HashMap::new(),
            errors: HashMap::new(),
            raw_body: None,
            reverse_batches: false,
        }
    }

    /// Every payload sent so far, oldest first.
    pub fn sent(&self) -> Vec<serde_json::Value> {
        self.sent.lock().expect("mock lock poisoned").clone()
    }

    /// Params of the most recent single (non-batch) request.
    pub fn last_params(&self) -> serde_json::Value {
        self.sent
            .lock()
            .expect("mock lock poisoned")
            .last()
            .map(|payload| payload["params"].clone())
            .expect("no request was sent")
    }

    fn answer(&self, request: &serde_json::Value) -> serde_json::Value {
        let id = request["id"].clone();
        let method = request["method"].as_str().unwrap_or_default();

        if let Some((code, message)) = self.errors.get(method) {
            return json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": { "code": code, "message": message },
            });
        }

        match self.results.get(method) {
            Some(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
            None => json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": { "code": -32601, "message": "Method not found" },
            }),
        }
    }
}

pub struct MockTransportBuilder {
    results: HashMap<String, serde_json::Value>,
    errors: HashMap<String, (i64, String)>,
    raw_body: Option<String>,
    reverse_batches: bool,
}

impl MockTransportBuilder {
    pub fn with_result(mut self, method: &str, result: serde_json::Value) -> Self {
        self.results.insert(method.to_owned(), result);
        self
    }

    pub fn with_error(mut self, method: &str, code: i64, message: &str) -> Self {
        self.errors
            .insert(method.to_owned(), (code, message.to_owned()));
        self
    }

    /// Answer every payload with `body` verbatim.
    pub fn with_raw_body(mut self, body: &str) -> Self {
        self.raw_body = Some(body.to_owned());
        self
    }

    /// Answer batches in reverse request order.
    pub fn reverse_batches(mut self) -> Self {
        self.reverse_batches = true;
        self
    }

    pub fn build(self) -> MockTransport {
        MockTransport {
            results: self.results,
            errors: self.errors,
            raw_body: self.raw_body,
            reverse_batches: self.reverse_batches,
            sent: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, payload: &serde_json::Value) -> Result<String, CoreError> {
        self.sent
            .lock()
            .expect("mock lock poisoned")
            .push(payload.clone());

        if let Some(body) = &self.raw_body {
            return Ok(body.clone());
        }

        let response = match payload {
            serde_json::Value::Array(requests) => {
                let mut answers: Vec<serde_json::Value> =
                    requests.iter().map(|request| self.answer(request)).collect();
                if self.reverse_batches {
                    answers.reverse();
                }
                serde_json::Value::Array(answers)
            }
            request => self.answer(request),
        };

        Ok(response.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_method_answers_method_not_found() {
        let mock = MockTransport::builder().build();
        let body = mock
            .send(&json!({ "jsonrpc": "2.0", "id": 1, "method": "nope", "params": [] }))
            .await
            .expect("mock never fails");
        let parsed: serde_json::Value = serde_json::from_str(&body).expect("valid JSON");
        assert_eq!(parsed["error"]["code"], json!(-32601));
        assert_eq!(parsed["id"], json!(1));
    }

    #[tokio::test]
    async fn reverse_batches_flips_answer_order() {
        let mock = MockTransport::builder()
            .with_result("a", json!(1))
            .with_result("b", json!(2))
            .reverse_batches()
            .build();
        let body = mock
            .send(&json!([
                { "jsonrpc": "2.0", "id": 0, "method": "a", "params": [] },
                { "jsonrpc": "2.0", "id": 1, "method": "b", "params": [] },
            ]))
            .await
            .expect("mock never fails");
        let parsed: serde_json::Value = serde_json::from_str(&body).expect("valid JSON");
        assert_eq!(parsed[0]["id"], json!(1));
        assert_eq!(parsed[1]["result"], json!(1));
    }
}
