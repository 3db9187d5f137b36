//! Chat log loading off the UI thread.
//!
//! A load reads the whole file, parses it and delivers the result to the
//! session inbox in a single event, so the rest of the app never sees a
//! partially parsed log.

use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::thread;

use super::chat::ChatMessage;
use super::error::{self, AppError};
use super::parser;
use super::session::SessionEvent;

/// File extensions offered in the open dialog and accepted on drop.
pub const CHAT_LOG_EXTENSIONS: &[&str] = &["jsonl", "txt"];

/// A fully parsed chat log ready to replace the session's messages.
#[derive(Debug, Clone)]
pub struct LoadedLog {
    /// Source file
    pub path: PathBuf,
    /// Messages sorted by timestamp
    pub messages: Vec<ChatMessage>,
    /// Non-blank lines examined
    pub total_lines: usize,
    /// Lines skipped during parsing
    pub skipped_lines: usize,
}

/// Check the extension hint before loading.
pub fn check_extension(path: &Path) -> Result<(), AppError> {
    let matches = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            CHAT_LOG_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        });

    if matches {
        Ok(())
    } else {
        Err(AppError::UnsupportedFileType {
            path: path.to_path_buf(),
            expected: CHAT_LOG_EXTENSIONS
                .iter()
                .map(|ext| format!(".{}", ext))
                .collect(),
        })
    }
}

/// Read and parse a chat log from disk.
pub fn load_chat_log(path: &Path) -> Result<LoadedLog, AppError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| error::from_io_error(path.to_path_buf(), e))?;

    let parsed = parser::parse_chat_log(&content)
        .map_err(|e| error::from_parse_error(Some(path.to_path_buf()), &e))?;

    for warning in &parsed.warnings {
        tracing::warn!(
            path = %path.display(),
            line = warning.line,
            issue = %warning.issue,
            "skipping chat log line"
        );
    }

    Ok(LoadedLog {
        path: path.to_path_buf(),
        messages: parsed.messages,
        total_lines: parsed.total_lines,
        skipped_lines: parsed.warnings.len(),
    })
}

/// Load `path` on a worker thread and post `SessionEvent::LoadFinished`.
///
/// There is no cancellation; if several loads are in flight, whichever
/// finishes last is applied last.
pub fn spawn_load(path: PathBuf, inbox: Sender<SessionEvent>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        tracing::info!(path = %path.display(), "loading chat log");
        let result = load_chat_log(&path);
        if inbox.send(SessionEvent::LoadFinished(result)).is_err() {
            tracing::debug!("session closed before chat log load finished");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::mpsc;

    const VALID_LINE: &str = r#"{"replayChatItemAction":{"actions":[{"addChatItemAction":{"item":{"liveChatTextMessageRenderer":{"message":{"runs":[{"text":"hello"}]},"authorName":{"simpleText":"Alice"},"timestampText":{"simpleText":"01:05"},"authorPhoto":{"thumbnails":[{"url":"http://x/a.png"}]}}}}}]}}"#;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".jsonl")
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_check_extension() {
        assert!(check_extension(Path::new("chat.jsonl")).is_ok());
        assert!(check_extension(Path::new("chat.TXT")).is_ok());
        assert!(matches!(
            check_extension(Path::new("stream.mp4")),
            Err(AppError::UnsupportedFileType { .. })
        ));
        assert!(check_extension(Path::new("no_extension")).is_err());
    }

    #[test]
    fn test_load_chat_log() {
        let file = write_temp(&format!("{}\nbroken\n", VALID_LINE));

        let loaded = load_chat_log(file.path()).unwrap();
        assert_eq!(loaded.messages.len(), 1);
        assert_eq!(loaded.total_lines, 2);
        assert_eq!(loaded.skipped_lines, 1);
        assert_eq!(loaded.path, file.path());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.jsonl");

        assert!(matches!(
            load_chat_log(&path),
            Err(AppError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_load_file_without_messages() {
        let file = write_temp("{}\n{\"foo\": 1}\n");

        match load_chat_log(file.path()) {
            Err(AppError::NoValidMessages {
                path,
                total_lines,
                skipped,
            }) => {
                assert_eq!(path.as_deref(), Some(file.path()));
                assert_eq!(total_lines, 2);
                assert_eq!(skipped, 2);
            }
            other => panic!("Expected NoValidMessages, got {:?}", other),
        }
    }

    #[test]
    fn test_spawn_load_delivers_one_event() {
        let file = write_temp(VALID_LINE);
        let (tx, rx) = mpsc::channel();

        spawn_load(file.path().to_path_buf(), tx).join().unwrap();

        match rx.recv().unwrap() {
            SessionEvent::LoadFinished(Ok(loaded)) => assert_eq!(loaded.messages.len(), 1),
            other => panic!("Expected successful load, got {:?}", other),
        }
        assert!(rx.try_recv().is_err());
    }
}
