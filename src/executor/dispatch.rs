//! Routing intents to OS-level actions
//!
//! One action per intent variant: calls open a `tel:` URI, known apps
//! their launch scheme, searches a Google URL with the query encoded.
//! Reading messages has no OS action yet and yields a notice instead.

use url::form_urlencoded;

use crate::interpreter::Intent;

use super::launcher::UriLauncher;

const SEARCH_BASE: &str = "https://www.google.com/search";
const READ_MESSAGES_NOTICE: &str = "reading messages is not implemented yet";

/// Routes each derived intent to its OS-level action
pub struct Executor<L> {
    launcher: L,
}

/// Outcome of a successful dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    /// URI handed to the OS opener, if the intent maps to one
    pub uri: Option<String>,
    /// User-visible notice when no OS action exists yet
    pub notice: Option<&'static str>,
}

/// Dispatch failures, surfaced to the user as alerts
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("no executor for an unrecognized command")]
    Unrecognized,

    #[error("failed to open {uri}: {reason}")]
    Launch { uri: String, reason: String },
}

impl<L: UriLauncher> Executor<L> {
    pub fn new(launcher: L) -> Self {
        Self { launcher }
    }

    #[cfg(test)]
    pub(crate) fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Execute one intent; each call is independent and stateless
    pub fn dispatch(&self, intent: &Intent) -> Result<Dispatch, ExecError> {
        let uri = match intent {
            Intent::Call { target } => format!("tel:{}", target),
            Intent::OpenApp { app } => app.launch_uri().to_string(),
            Intent::Search { query } => search_url(query),
            Intent::ReadMessages => {
                return Ok(Dispatch {
                    uri: None,
                    notice: Some(READ_MESSAGES_NOTICE),
                })
            }
            Intent::Unknown => return Err(ExecError::Unrecognized),
        };

        self.launcher.open(&uri).map_err(|e| ExecError::Launch {
            uri: uri.clone(),
            reason: e.to_string(),
        })?;

        Ok(Dispatch {
            uri: Some(uri),
            notice: None,
        })
    }
}

/// Build the web-search URL; an empty query still yields a valid URL
fn search_url(query: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(query.as_bytes()).collect();
    format!("{}?q={}", SEARCH_BASE, encoded)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::super::launcher::LaunchError;
    use super::*;
    use crate::interpreter::KnownApp;

    /// Records opened URIs; fails every open when `fail` is set
    struct FakeLauncher {
        opened: Mutex<Vec<String>>,
        fail: bool,
    }

    impl FakeLauncher {
        fn new() -> Self {
            Self {
                opened: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                opened: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        fn opened(&self) -> Vec<String> {
            self.opened.lock().unwrap().clone()
        }
    }

    impl UriLauncher for FakeLauncher {
        fn open(&self, uri: &str) -> Result<(), LaunchError> {
            if self.fail {
                return Err(LaunchError("app not installed".to_string()));
            }
            self.opened.lock().unwrap().push(uri.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_call_opens_tel_uri() {
        let executor = Executor::new(FakeLauncher::new());
        let dispatch = executor
            .dispatch(&Intent::Call {
                target: "маме".to_string(),
            })
            .unwrap();
        assert_eq!(dispatch.uri.as_deref(), Some("tel:маме"));
        assert_eq!(executor.launcher.opened(), vec!["tel:маме"]);
    }

    #[test]
    fn test_open_app_uses_launch_uri() {
        let executor = Executor::new(FakeLauncher::new());
        let dispatch = executor
            .dispatch(&Intent::OpenApp {
                app: KnownApp::Whatsapp,
            })
            .unwrap();
        assert_eq!(dispatch.uri.as_deref(), Some("whatsapp://send"));
    }

    #[test]
    fn test_search_url_is_percent_encoded() {
        let executor = Executor::new(FakeLauncher::new());
        let dispatch = executor
            .dispatch(&Intent::Search {
                query: "погода".to_string(),
            })
            .unwrap();
        assert_eq!(
            dispatch.uri.as_deref(),
            Some("https://www.google.com/search?q=%D0%BF%D0%BE%D0%B3%D0%BE%D0%B4%D0%B0")
        );
    }

    #[test]
    fn test_search_with_empty_query_still_builds_url() {
        let executor = Executor::new(FakeLauncher::new());
        let dispatch = executor
            .dispatch(&Intent::Search {
                query: String::new(),
            })
            .unwrap();
        assert_eq!(
            dispatch.uri.as_deref(),
            Some("https://www.google.com/search?q=")
        );
    }

    #[test]
    fn test_read_messages_yields_notice_without_uri() {
        let executor = Executor::new(FakeLauncher::new());
        let dispatch = executor.dispatch(&Intent::ReadMessages).unwrap();
        assert_eq!(dispatch.uri, None);
        assert!(dispatch.notice.is_some());
        assert!(executor.launcher.opened().is_empty());
    }

    #[test]
    fn test_unknown_intent_is_an_error() {
        let executor = Executor::new(FakeLauncher::new());
        assert!(matches!(
            executor.dispatch(&Intent::Unknown),
            Err(ExecError::Unrecognized)
        ));
    }

    #[test]
    fn test_launch_failure_reports_uri() {
        let executor = Executor::new(FakeLauncher::failing());
        let err = executor
            .dispatch(&Intent::OpenApp {
                app: KnownApp::Instagram,
            })
            .unwrap_err();
        match err {
            ExecError::Launch { uri, reason } => {
                assert_eq!(uri, "instagram://app");
                assert_eq!(reason, "app not installed");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
