//! Context window assembly
//!
//! Every model call gets a freshly built window: a fixed two-message
//! preamble (the action-schema instructions and a canned greeting turn)
//! followed by as much of the transcript's tail as the token budget allows.
//! Truncation is FIFO: the oldest transcript entries fall off first.

use pagebot_ai::ChatMessage;

use crate::tokenizer;

/// The canned greeting the model is shown as its own first turn. Keeping it
/// in the preamble anchors the expected reply shape without burning a real
/// model call.
const GREETING: &str = r#"{
  "plan": ["Greet the user and wait for instructions", "Make a new plan"],
  "nextAction": {
    "type": "Respond",
    "params": { "textToDisplay": "Hello! How can I help you?" }
  }
}"#;

/// Render the instructions message, optionally naming the page the user is
/// looking at.
fn instructions(page_url: Option<&str>) -> String {
    let location = match page_url {
        Some(url) => format!(
            "\nYou're currently at the url (the user may refer to it as 'this' or 'the page' or similar): {url}\n"
        ),
        None => String::new(),
    };
    format!(
        r#"You are a helpful virtual assistant living in the user's browser. You have some tools that you can use to help your user, and your job is to combine these tools to accomplish the user's goal.
{location}
You have the following actions available to you:
RequestDOM {{ "cssSelector": string }} - receive a summarized DOM for a selector. Use 'body' to start if you don't already know the region. Do this before using Fill or RequestText!
RequestText {{ "cssSelector": string }} - request the visible text inside of a page region
GetSelection - request the user's currently highlighted text
Fill {{ "cssSelector": string, "text": string }} - fill in a form field
Calculate {{ "jsFormula": string }} - evaluate a JavaScript expression in a sandbox and receive the result (the user does not see it)
Respond {{ "textToDisplay": string }} - display a response to the user

If you believe a goal is impossible, or if you find yourself encountering an error or looping, then just tell the user that you can't do it.
Remember to use RequestDOM on the body before generating cssSelectors: don't just guess CSS selectors!

After every user message, respond with a single JSON object of the form {{ "plan": [string, ...], "nextAction": {{ "type": <action name>, "params": <action params> }} }}. For example, here are some user messages and their first response:
"What time is it in France?" => {{ "plan": ["Determine current user time", "Compute current time in France", "Inform the user"], "nextAction": {{ "type": "Calculate", "params": {{ "jsFormula": "new Date().toUTCString();" }} }} }}
"Please put a relevant poem in the comment box" => {{ "plan": ["Request DOM overview", "Request text from likely main content region", "Write poem and insert into likely comment box", "Request page text", "Summarize and inform the user"], "nextAction": {{ "type": "RequestDOM", "params": {{ "cssSelector": "body" }} }} }}

ALL YOUR RESPONSES FROM NOW ON MUST BE IN THE FORM OF A SINGLE JSON OBJECT OF THAT SHAPE."#
    )
}

/// The two fixed messages every window opens with.
pub fn default_preamble(page_url: Option<&str>) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(instructions(page_url)),
        ChatMessage::assistant(GREETING),
    ]
}

/// Assembles the bounded message list sent to the model.
///
/// The preamble's token cost (including reply priming) is computed once at
/// construction; `build` only has to price the transcript tail.
pub struct ContextWindowBuilder {
    preamble: Vec<ChatMessage>,
    preamble_cost: u32,
}

impl ContextWindowBuilder {
    /// Create a builder over a fixed preamble.
    pub fn new(preamble: Vec<ChatMessage>) -> Self {
        let preamble_cost = tokenizer::count_window(&preamble);
        Self {
            preamble,
            preamble_cost,
        }
    }

    /// Create a builder with the standard instructions + greeting preamble.
    pub fn with_default_preamble(page_url: Option<&str>) -> Self {
        Self::new(default_preamble(page_url))
    }

    /// Build the window: preamble followed by the longest transcript suffix
    /// whose cost fits within `ceiling - margin - preamble_cost`.
    ///
    /// Walks the transcript from the newest entry backwards, so truncation
    /// drops the oldest entries first. If even the newest entry is over
    /// budget the suffix is empty and the model receives the preamble alone;
    /// that is accepted, not an error.
    pub fn build(
        &self,
        transcript: &[ChatMessage],
        ceiling: u32,
        margin: u32,
    ) -> Vec<ChatMessage> {
        let budget = ceiling
            .saturating_sub(margin)
            .saturating_sub(self.preamble_cost);

        let mut used = 0u32;
        let mut start = transcript.len();
        while start > 0 {
            let cost = tokenizer::count_message(&transcript[start - 1]);
            if used + cost > budget {
                break;
            }
            used += cost;
            start -= 1;
        }

        let mut window = self.preamble.clone();
        window.extend_from_slice(&transcript[start..]);
        window
    }

    /// The fixed preamble messages.
    pub fn preamble(&self) -> &[ChatMessage] {
        &self.preamble
    }
}
