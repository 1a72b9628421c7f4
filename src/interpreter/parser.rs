//! Transcript parsing
//!
//! Triggers are matched anywhere in the lower-cased transcript, without
//! word-boundary checks, and only the first trigger in the fixed order is
//! honored. The argument is whatever remains after removing the first
//! occurrence of the trigger text and trimming.

use super::intent::{Intent, InterpretError, KnownApp};

/// Trigger for placing a call
const CALL_TRIGGER: &str = "позвони";
/// Trigger for launching an app
const OPEN_TRIGGER: &str = "открой";
/// Trigger for a web search
const SEARCH_TRIGGER: &str = "найди";
/// Fixed phrase for reading out messages
const READ_MESSAGES_PHRASE: &str = "прочитай сообщения";

/// Classify one transcript into an intent
///
/// Pure and stateless: the same transcript always yields the same result.
/// Precedence is call > open > search > read-messages; a transcript that
/// matches nothing is `Intent::Unknown`, which is not an error.
pub fn interpret(transcript: &str) -> Result<Intent, InterpretError> {
    let text = transcript.to_lowercase();

    if text.contains(CALL_TRIGGER) {
        let target = strip_trigger(&text, CALL_TRIGGER);
        if target.is_empty() {
            return Err(InterpretError::MissingTarget);
        }
        return Ok(Intent::Call { target });
    }

    if text.contains(OPEN_TRIGGER) {
        let name = strip_trigger(&text, OPEN_TRIGGER);
        return match KnownApp::from_name(&name) {
            Some(app) => Ok(Intent::OpenApp { app }),
            None => Err(InterpretError::UnknownApp(name)),
        };
    }

    if text.contains(SEARCH_TRIGGER) {
        // Empty query is allowed; the executor still builds a search URL
        return Ok(Intent::Search {
            query: strip_trigger(&text, SEARCH_TRIGGER),
        });
    }

    if text.contains(READ_MESSAGES_PHRASE) {
        return Ok(Intent::ReadMessages);
    }

    Ok(Intent::Unknown)
}

/// Remove the first occurrence of the trigger text and trim whitespace
fn strip_trigger(text: &str, trigger: &str) -> String {
    text.replacen(trigger, "", 1).trim().to_string()
}
