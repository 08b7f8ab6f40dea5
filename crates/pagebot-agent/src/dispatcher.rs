//! The action-dispatch state machine
//!
//! One user submission drives a sequence of rounds: build the bounded
//! window, call the model, parse the structured reply, execute the single
//! declared action, fold its observation back into the transcript, and call
//! the model again. The turn ends when the model responds to the user, when
//! a round fails, or when the round cap is reached.
//!
//! All transcript mutation funnels through this type. Every transition takes
//! `&mut self`, so a second round can never start while one is in flight;
//! the only way to interfere with a running turn is [`AgentHandle::abort`].

use std::sync::{Arc, atomic::Ordering};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use pagebot_ai::{ChatMessage, Role};

use crate::{
    boundary::{ChatTransport, Evaluator, PageBoundary, PageRequest, PageResponse},
    conversation::{Conversation, Phase},
    error::{Error, Result},
    events::AgentEvent,
    handle::AgentHandle,
    observation::Observation,
    store::TranscriptStore,
    turn::{Action, AssistantTurn, THINKING_PLACEHOLDER},
    window::ContextWindowBuilder,
};

/// Key the sandbox must use for the payload it posts back.
const CALCULATION_RESULT_KEY: &str = "calculationResult";

/// Dispatcher configuration
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Model context ceiling in tokens
    pub context_window: u32,
    /// Tokens reserved for the model's own reply
    pub reply_margin: u32,
    /// Maximum action rounds per user turn
    pub max_rounds: u32,
    /// Timeout for one model call
    pub chat_timeout: Duration,
    /// Timeout for one page or sandbox boundary call
    pub boundary_timeout: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            context_window: 128_000,
            reply_margin: 600,
            max_rounds: 10,
            chat_timeout: Duration::from_secs(120),
            boundary_timeout: Duration::from_secs(20),
        }
    }
}

/// Whether the round loop should keep going
enum RoundFlow {
    /// An observation was appended; call the model again
    Continue,
    /// The turn is over (response, round failure, or abort)
    Finished,
}

/// The conversation's state machine
pub struct Dispatcher {
    config: DispatcherConfig,
    window: ContextWindowBuilder,
    conversation: Conversation,
    chat: Arc<dyn ChatTransport>,
    page: Arc<dyn PageBoundary>,
    evaluator: Arc<dyn Evaluator>,
    store: Option<Arc<dyn TranscriptStore>>,
    event_tx: broadcast::Sender<AgentEvent>,
    handle: AgentHandle,
}

impl Dispatcher {
    /// Create a new dispatcher over the given collaborators
    pub fn new(
        config: DispatcherConfig,
        window: ContextWindowBuilder,
        chat: Arc<dyn ChatTransport>,
        page: Arc<dyn PageBoundary>,
        evaluator: Arc<dyn Evaluator>,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self {
            config,
            window,
            conversation: Conversation::default(),
            chat,
            page,
            evaluator,
            store: None,
            event_tx,
            handle: AgentHandle::new(),
        }
    }

    /// Attach a transcript store; every mutating transition writes through it
    pub fn with_store(mut self, store: Arc<dyn TranscriptStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Replace the in-memory transcript with the store's contents
    pub fn restore(&mut self) -> Result<()> {
        if let Some(store) = &self.store {
            self.conversation.messages = store.load()?;
        }
        Ok(())
    }

    /// Subscribe to dispatcher events
    pub fn subscribe(&self) -> broadcast::Receiver<AgentEvent> {
        self.event_tx.subscribe()
    }

    /// Get a cloneable handle for aborting from external code
    pub fn handle(&self) -> AgentHandle {
        self.handle.clone()
    }

    /// The full transcript
    pub fn transcript(&self) -> &[ChatMessage] {
        &self.conversation.messages
    }

    /// Current state-machine phase
    pub fn phase(&self) -> Phase {
        self.conversation.phase
    }

    /// Last round-level error, if the previous turn failed
    pub fn last_error(&self) -> Option<&str> {
        self.conversation.error.as_deref()
    }

    /// Submit a user message and run the turn to completion
    pub async fn submit(&mut self, text: impl Into<String>) -> Result<()> {
        self.conversation.messages.push(ChatMessage::user(text));
        self.conversation
            .messages
            .push(ChatMessage::assistant(THINKING_PLACEHOLDER));
        self.persist()?;
        self.run_turn().await
    }

    /// Delete one transcript entry. Available only between turns.
    pub fn delete_entry(&mut self, index: usize) -> Result<()> {
        if index >= self.conversation.messages.len() {
            return Err(Error::BadIndex(index));
        }
        self.conversation.messages.remove(index);
        self.persist()
    }

    /// Truncate everything after `index` and resubmit the remaining
    /// transcript to the model.
    pub async fn retry_from(&mut self, index: usize) -> Result<()> {
        if index >= self.conversation.messages.len() {
            return Err(Error::BadIndex(index));
        }
        self.conversation.messages.truncate(index + 1);
        self.conversation
            .messages
            .push(ChatMessage::assistant(THINKING_PLACEHOLDER));
        self.persist()?;
        self.run_turn().await
    }

    /// Clear the whole transcript
    pub fn clear(&mut self) -> Result<()> {
        self.conversation.messages.clear();
        self.conversation.error = None;
        self.persist()
    }

    /// Run rounds until the model responds, a round fails, or the cap hits
    async fn run_turn(&mut self) -> Result<()> {
        *self.handle.cancel.lock() = CancellationToken::new();
        self.handle.is_running.store(true, Ordering::Release);
        self.conversation.error = None;
        let _ = self.event_tx.send(AgentEvent::TurnStart);

        let mut round = 0u32;
        let result = loop {
            round += 1;
            if round > self.config.max_rounds {
                tracing::warn!(round, "action round cap reached");
                break self.fail_turn("too many actions in one turn, giving up");
            }
            let _ = self.event_tx.send(AgentEvent::RoundStart { round });

            match self.run_round().await {
                Ok(RoundFlow::Continue) => continue,
                Ok(RoundFlow::Finished) => break Ok(()),
                Err(e) => break Err(e),
            }
        };

        self.conversation.phase = Phase::AwaitingUserInput;
        self.handle.is_running.store(false, Ordering::Release);
        let _ = self.event_tx.send(AgentEvent::TurnEnd { rounds: round });
        result
    }

    /// One model call plus the execution of its declared action
    async fn run_round(&mut self) -> Result<RoundFlow> {
        self.conversation.phase = Phase::ModelCallInFlight;

        // The transient placeholder is never shown to the model.
        let visible = self.without_placeholder();
        let window = self
            .window
            .build(visible, self.config.context_window, self.config.reply_margin);

        let cancel = self.handle.cancel.lock().clone();
        let chat = Arc::clone(&self.chat);
        let chat_call = tokio::time::timeout(self.config.chat_timeout, chat.complete(window));
        let outcome = tokio::select! {
            _ = cancel.cancelled() => None,
            outcome = chat_call => Some(outcome),
        };

        let reply = match outcome {
            None => {
                self.fail_turn("turn aborted")?;
                return Ok(RoundFlow::Finished);
            }
            Some(Err(_)) => {
                self.fail_turn("model call timed out")?;
                return Ok(RoundFlow::Finished);
            }
            Some(Ok(Err(e))) => {
                self.fail_turn(&format!("model provider error: {e}"))?;
                return Ok(RoundFlow::Finished);
            }
            Some(Ok(Ok(reply))) => reply,
        };

        let turn = match AssistantTurn::parse(&reply) {
            Ok(turn) => turn,
            Err(e) => {
                tracing::warn!(error = %e, "assistant reply failed to parse");
                self.fail_turn(&format!(
                    "assistant provided an invalid structured reply ({e}): {reply}"
                ))?;
                return Ok(RoundFlow::Finished);
            }
        };

        // The raw reply, not a re-serialization, becomes the transcript entry.
        self.pop_placeholder();
        self.append(ChatMessage::assistant(reply))?;

        self.conversation.phase = Phase::ActionExecuting;
        let kind = turn.next_action.kind();
        let _ = self.event_tx.send(AgentEvent::ActionStart {
            action: turn.next_action.clone(),
            plan: turn.plan.clone(),
        });
        tracing::debug!(action = kind, "executing action");

        let observation = match turn.next_action {
            Action::Respond { text_to_display } => {
                let _ = self.event_tx.send(AgentEvent::Responded {
                    text: text_to_display,
                });
                return Ok(RoundFlow::Finished);
            }
            Action::RequestDom { css_selector } => {
                let response = self.page_call(PageRequest::get_dom(&css_selector)).await;
                dom_observation(css_selector, response)
            }
            Action::RequestText { css_selector } => {
                let response = self.page_call(PageRequest::get_text(&css_selector)).await;
                text_observation(css_selector, response)
            }
            Action::GetSelection => {
                let response = self.page_call(PageRequest::get_selection()).await;
                selection_observation(response)
            }
            Action::Fill { css_selector, text } => {
                let response = self
                    .page_call(PageRequest::fill(&css_selector, &text))
                    .await;
                fill_observation(css_selector, response)
            }
            Action::Calculate { js_formula } => match self.evaluate_call(&js_formula).await {
                Ok(payload) => calculation_observation(payload),
                Err(message) => Observation::error(message),
            },
        };

        if self.handle.cancel.lock().is_cancelled() {
            self.fail_turn("turn aborted")?;
            return Ok(RoundFlow::Finished);
        }

        let _ = self.event_tx.send(AgentEvent::ActionEnd {
            action: kind.to_string(),
            observation: serde_json::to_value(&observation).unwrap_or_default(),
        });
        self.append(observation.into_message())?;
        Ok(RoundFlow::Continue)
    }

    /// Send one request across the page boundary, bounded by the timeout
    async fn page_call(&self, request: PageRequest) -> PageResponse {
        let cancel = self.handle.cancel.lock().clone();
        let call = tokio::time::timeout(self.config.boundary_timeout, self.page.handle(request));
        tokio::select! {
            _ = cancel.cancelled() => PageResponse::err("turn aborted"),
            outcome = call => match outcome {
                Ok(response) => response,
                Err(_) => PageResponse::err("page request timed out"),
            },
        }
    }

    /// Forward a formula to the sandbox and validate the returned payload
    async fn evaluate_call(&self, source: &str) -> std::result::Result<serde_json::Value, String> {
        let cancel = self.handle.cancel.lock().clone();
        let call = tokio::time::timeout(self.config.boundary_timeout, self.evaluator.evaluate(source));
        let payload = tokio::select! {
            _ = cancel.cancelled() => return Err("turn aborted".into()),
            outcome = call => match outcome {
                Ok(payload) => payload,
                Err(_) => return Err("sandbox evaluation timed out".into()),
            },
        };
        match payload.get(CALCULATION_RESULT_KEY) {
            Some(result) => Ok(result.clone()),
            None => Err(format!(
                "sandbox protocol violation: payload has no {CALCULATION_RESULT_KEY} key: {payload}"
            )),
        }
    }

    /// End the turn with a round-level error observation
    fn fail_turn(&mut self, message: &str) -> Result<()> {
        self.conversation.error = Some(message.to_string());
        self.pop_placeholder();
        self.append(Observation::error(message).into_message())?;
        let _ = self.event_tx.send(AgentEvent::Error {
            message: message.to_string(),
        });
        Ok(())
    }

    /// The transcript without a trailing thinking placeholder
    fn without_placeholder(&self) -> &[ChatMessage] {
        let messages = &self.conversation.messages;
        match messages.last() {
            Some(last) if is_placeholder(last) => &messages[..messages.len() - 1],
            _ => messages,
        }
    }

    /// Drop the trailing thinking placeholder, if present
    fn pop_placeholder(&mut self) {
        if self
            .conversation
            .messages
            .last()
            .is_some_and(is_placeholder)
        {
            self.conversation.messages.pop();
        }
    }

    fn append(&mut self, message: ChatMessage) -> Result<()> {
        self.conversation.messages.push(message);
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        if let Some(store) = &self.store {
            store.save(&self.conversation.messages)?;
        }
        Ok(())
    }
}

fn is_placeholder(message: &ChatMessage) -> bool {
    message.role == Role::Assistant && message.content == THINKING_PLACEHOLDER
}

// --- Observation mapping, one function per page action ---

fn dom_observation(css_selector: String, response: PageResponse) -> Observation {
    match response.result {
        Some(result) => Observation::Dom {
            css_selector,
            // Descriptor lists cross the boundary as JSON text; embed them
            // structurally so the model doesn't see double-escaped quotes.
            dom: serde_json::from_str(&result)
                .unwrap_or(serde_json::Value::String(result)),
        },
        None => Observation::SelectorError {
            css_selector,
            error: response.error.unwrap_or_else(|| "unknown error".into()),
        },
    }
}

fn text_observation(css_selector: String, response: PageResponse) -> Observation {
    match response.result {
        Some(text) => Observation::Text { css_selector, text },
        None => Observation::SelectorError {
            css_selector,
            error: response.error.unwrap_or_else(|| "unknown error".into()),
        },
    }
}

fn selection_observation(response: PageResponse) -> Observation {
    match response.result {
        Some(user_selection) => Observation::Selection { user_selection },
        None => Observation::SelectionError {
            fill_error: response.error.unwrap_or_else(|| "unknown error".into()),
        },
    }
}

fn fill_observation(css_selector: String, response: PageResponse) -> Observation {
    match response.result {
        Some(fill_result) => Observation::FillResult {
            css_selector,
            fill_result,
        },
        None => Observation::FillError {
            css_selector,
            fill_error: response.error.unwrap_or_else(|| "unknown error".into()),
        },
    }
}

fn calculation_observation(result: serde_json::Value) -> Observation {
    Observation::Calculation { result }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Scripted model transport: pops canned replies, records every window.
    struct MockChat {
        replies: Mutex<Vec<String>>,
        calls: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl MockChat {
        fn new(replies: Vec<String>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies),
                calls: Mutex::new(vec![]),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.lock().len()
        }

        fn window(&self, call: usize) -> Vec<ChatMessage> {
            self.calls.lock()[call].clone()
        }
    }

    #[async_trait]
    impl ChatTransport for MockChat {
        async fn complete(&self, messages: Vec<ChatMessage>) -> pagebot_ai::Result<String> {
            self.calls.lock().push(messages);
            let mut replies = self.replies.lock();
            if replies.is_empty() {
                Err(pagebot_ai::Error::api("test", "no scripted reply"))
            } else {
                Ok(replies.remove(0))
            }
        }
    }

    /// Page boundary returning one fixed response
    struct MockPage {
        response: PageResponse,
    }

    #[async_trait]
    impl PageBoundary for MockPage {
        async fn handle(&self, _request: PageRequest) -> PageResponse {
            self.response.clone()
        }
    }

    /// Evaluator returning one fixed payload
    struct MockEvaluator {
        payload: serde_json::Value,
    }

    #[async_trait]
    impl Evaluator for MockEvaluator {
        async fn evaluate(&self, _source: &str) -> serde_json::Value {
            self.payload.clone()
        }
    }

    fn respond_turn(text: &str) -> String {
        serde_json::json!({
            "plan": ["Inform the user"],
            "nextAction": { "type": "Respond", "params": { "textToDisplay": text } }
        })
        .to_string()
    }

    fn calculate_turn(formula: &str) -> String {
        serde_json::json!({
            "plan": ["Compute", "Inform the user"],
            "nextAction": { "type": "Calculate", "params": { "jsFormula": formula } }
        })
        .to_string()
    }

    fn fill_turn(selector: &str, text: &str) -> String {
        serde_json::json!({
            "plan": ["Fill the field"],
            "nextAction": { "type": "Fill", "params": { "cssSelector": selector, "text": text } }
        })
        .to_string()
    }

    fn make_dispatcher(
        chat: Arc<MockChat>,
        page: PageResponse,
        payload: serde_json::Value,
    ) -> Dispatcher {
        Dispatcher::new(
            DispatcherConfig::default(),
            ContextWindowBuilder::with_default_preamble(None),
            chat,
            Arc::new(MockPage { response: page }),
            Arc::new(MockEvaluator { payload }),
        )
    }

    fn system_entries(dispatcher: &Dispatcher) -> Vec<serde_json::Value> {
        dispatcher
            .transcript()
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| serde_json::from_str(&m.content).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_respond_ends_turn_after_one_call() {
        let chat = MockChat::new(vec![respond_turn("hello there")]);
        let mut dispatcher = make_dispatcher(
            chat.clone(),
            PageResponse::ok("unused"),
            serde_json::json!({}),
        );

        dispatcher.submit("hi").await.unwrap();

        assert_eq!(chat.call_count(), 1);
        assert_eq!(dispatcher.phase(), Phase::AwaitingUserInput);
        let transcript = dispatcher.transcript();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0], ChatMessage::user("hi"));
        assert_eq!(transcript[1].role, Role::Assistant);
        AssistantTurn::parse(&transcript[1].content).unwrap();
    }

    #[tokio::test]
    async fn test_placeholder_visible_during_call_absent_after() {
        let chat = MockChat::new(vec![respond_turn("done")]);
        let mut dispatcher = make_dispatcher(
            chat.clone(),
            PageResponse::ok("unused"),
            serde_json::json!({}),
        );

        dispatcher.submit("hi").await.unwrap();

        // The window never contained the placeholder...
        for message in chat.window(0) {
            assert_ne!(message.content, THINKING_PLACEHOLDER);
        }
        // ...and the final transcript doesn't either.
        for message in dispatcher.transcript() {
            assert_ne!(message.content, THINKING_PLACEHOLDER);
        }
    }

    #[tokio::test]
    async fn test_calculate_round_trip() {
        let chat = MockChat::new(vec![
            calculate_turn("new Date().toUTCString();"),
            respond_turn("It is 14:00 in France."),
        ]);
        let mut dispatcher = make_dispatcher(
            chat.clone(),
            PageResponse::ok("unused"),
            serde_json::json!({ "calculationResult": "2026-08-06T12:00:00Z" }),
        );

        dispatcher.submit("What time is it in France?").await.unwrap();

        assert_eq!(chat.call_count(), 2);
        let observations = system_entries(&dispatcher);
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0]["result"], "2026-08-06T12:00:00Z");

        // The second model call's window includes the observation.
        let second = chat.window(1);
        assert!(
            second
                .iter()
                .any(|m| m.role == Role::System && m.content.contains("2026-08-06T12:00:00Z"))
        );
    }

    #[tokio::test]
    async fn test_invalid_reply_appends_one_system_entry_and_stops() {
        let chat = MockChat::new(vec!["I would rather chat in prose.".to_string()]);
        let mut dispatcher = make_dispatcher(
            chat.clone(),
            PageResponse::ok("unused"),
            serde_json::json!({}),
        );

        dispatcher.submit("hi").await.unwrap();

        assert_eq!(chat.call_count(), 1);
        let transcript = dispatcher.transcript();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[1].role, Role::System);
        let observation: serde_json::Value = serde_json::from_str(&transcript[1].content).unwrap();
        let error = observation["error"].as_str().unwrap();
        assert!(error.contains("invalid structured reply"));
        assert_eq!(dispatcher.phase(), Phase::AwaitingUserInput);
    }

    #[tokio::test]
    async fn test_unknown_action_is_malformed() {
        let reply = serde_json::json!({
            "plan": [],
            "nextAction": { "type": "SelfDestruct", "params": {} }
        })
        .to_string();
        let chat = MockChat::new(vec![reply]);
        let mut dispatcher = make_dispatcher(
            chat.clone(),
            PageResponse::ok("unused"),
            serde_json::json!({}),
        );

        dispatcher.submit("hi").await.unwrap();

        assert_eq!(chat.call_count(), 1);
        let observations = system_entries(&dispatcher);
        assert!(
            observations[0]["error"]
                .as_str()
                .unwrap()
                .contains("SelfDestruct")
        );
    }

    #[tokio::test]
    async fn test_provider_error_becomes_observation() {
        let chat = MockChat::new(vec![]);
        let mut dispatcher = make_dispatcher(
            chat.clone(),
            PageResponse::ok("unused"),
            serde_json::json!({}),
        );

        dispatcher.submit("hi").await.unwrap();

        let observations = system_entries(&dispatcher);
        assert_eq!(observations.len(), 1);
        assert!(
            observations[0]["error"]
                .as_str()
                .unwrap()
                .contains("model provider error")
        );
        assert!(dispatcher.last_error().is_some());
    }

    #[tokio::test]
    async fn test_fill_success_flows_back_to_model() {
        let chat = MockChat::new(vec![
            fill_turn("#comment", "a poem"),
            respond_turn("Filled it in."),
        ]);
        let mut dispatcher = make_dispatcher(
            chat.clone(),
            PageResponse::ok("success"),
            serde_json::json!({}),
        );

        dispatcher.submit("put a poem in the comment box").await.unwrap();

        assert_eq!(chat.call_count(), 2);
        let observations = system_entries(&dispatcher);
        assert_eq!(observations[0]["cssSelector"], "#comment");
        assert_eq!(observations[0]["fillResult"], "success");
    }

    #[tokio::test]
    async fn test_fill_error_flows_back_to_model() {
        let chat = MockChat::new(vec![
            fill_turn("#missing", "x"),
            respond_turn("That field does not exist."),
        ]);
        let mut dispatcher = make_dispatcher(
            chat.clone(),
            PageResponse::err("Element not found"),
            serde_json::json!({}),
        );

        dispatcher.submit("fill the field").await.unwrap();

        let observations = system_entries(&dispatcher);
        assert_eq!(observations[0]["fillError"], "Element not found");
        // The model got a second call to re-plan.
        assert_eq!(chat.call_count(), 2);
    }

    #[tokio::test]
    async fn test_sandbox_protocol_violation_is_surfaced() {
        let chat = MockChat::new(vec![calculate_turn("1+1"), respond_turn("never mind")]);
        let mut dispatcher = make_dispatcher(
            chat.clone(),
            PageResponse::ok("unused"),
            serde_json::json!({ "wrongKey": 2 }),
        );

        dispatcher.submit("compute").await.unwrap();

        let observations = system_entries(&dispatcher);
        assert!(
            observations[0]["error"]
                .as_str()
                .unwrap()
                .contains("protocol violation")
        );
    }

    #[tokio::test]
    async fn test_round_cap_terminates_turn() {
        let loop_turn = calculate_turn("1+1");
        let chat = MockChat::new(vec![loop_turn.clone(), loop_turn.clone(), loop_turn.clone(), loop_turn]);
        let mut dispatcher = Dispatcher::new(
            DispatcherConfig {
                max_rounds: 2,
                ..Default::default()
            },
            ContextWindowBuilder::with_default_preamble(None),
            chat.clone(),
            Arc::new(MockPage {
                response: PageResponse::ok("unused"),
            }),
            Arc::new(MockEvaluator {
                payload: serde_json::json!({ "calculationResult": 2 }),
            }),
        );

        dispatcher.submit("loop forever").await.unwrap();

        assert_eq!(chat.call_count(), 2);
        let last = dispatcher.transcript().last().unwrap();
        assert_eq!(last.role, Role::System);
        assert!(last.content.contains("too many actions"));
        assert_eq!(dispatcher.phase(), Phase::AwaitingUserInput);
    }

    #[tokio::test]
    async fn test_retry_from_truncates_and_resubmits() {
        let chat = MockChat::new(vec![respond_turn("first"), respond_turn("second")]);
        let mut dispatcher = make_dispatcher(
            chat.clone(),
            PageResponse::ok("unused"),
            serde_json::json!({}),
        );

        dispatcher.submit("hi").await.unwrap();
        assert_eq!(dispatcher.transcript().len(), 2);

        // Retry from the user entry: the old assistant turn is discarded.
        dispatcher.retry_from(0).await.unwrap();

        assert_eq!(chat.call_count(), 2);
        let transcript = dispatcher.transcript();
        assert_eq!(transcript.len(), 2);
        assert!(transcript[1].content.contains("second"));
    }

    #[tokio::test]
    async fn test_delete_entry_and_bad_index() {
        let chat = MockChat::new(vec![respond_turn("ok")]);
        let mut dispatcher = make_dispatcher(
            chat.clone(),
            PageResponse::ok("unused"),
            serde_json::json!({}),
        );

        dispatcher.submit("hi").await.unwrap();
        dispatcher.delete_entry(1).unwrap();
        assert_eq!(dispatcher.transcript().len(), 1);

        assert!(matches!(
            dispatcher.delete_entry(5),
            Err(Error::BadIndex(5))
        ));
        assert!(matches!(
            dispatcher.retry_from(5).await,
            Err(Error::BadIndex(5))
        ));
    }

    #[tokio::test]
    async fn test_transcript_persists_through_store() {
        let store = Arc::new(crate::store::MemoryTranscriptStore::new());
        let chat = MockChat::new(vec![respond_turn("saved")]);
        let mut dispatcher = make_dispatcher(
            chat.clone(),
            PageResponse::ok("unused"),
            serde_json::json!({}),
        )
        .with_store(store.clone());

        dispatcher.submit("hi").await.unwrap();

        let saved = store.load().unwrap();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0].content, "hi");
    }

    #[tokio::test]
    async fn test_events_cover_turn_lifecycle() {
        let chat = MockChat::new(vec![respond_turn("hello")]);
        let mut dispatcher = make_dispatcher(
            chat.clone(),
            PageResponse::ok("unused"),
            serde_json::json!({}),
        );
        let mut events = dispatcher.subscribe();

        dispatcher.submit("hi").await.unwrap();

        let mut seen = vec![];
        while let Ok(event) = events.try_recv() {
            seen.push(event);
        }
        assert!(matches!(seen.first(), Some(AgentEvent::TurnStart)));
        assert!(
            seen.iter()
                .any(|e| matches!(e, AgentEvent::Responded { text } if text == "hello"))
        );
        assert!(matches!(seen.last(), Some(AgentEvent::TurnEnd { .. })));
    }
}
