//! Terminal command listener: `c` snaps, `exit` stops listening

use std::io::{self, BufRead};
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use crate::pipeline::trigger::SnapshotTrigger;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerExit {
    /// `exit` token received
    Command,
    /// Input stream closed
    EndOfInput,
}

/// Read whitespace separated tokens until `exit` or end of input
pub fn listen<R: BufRead>(reader: R, trigger: &SnapshotTrigger) -> io::Result<ListenerExit> {
    for line in reader.lines() {
        let line = line?;
        for token in line.split_whitespace() {
            match token {
                "c" => trigger.request(),
                "exit" => {
                    info!("Command listener stopped");
                    return Ok(ListenerExit::Command);
                }
                other => debug!("Ignoring command {:?}", other),
            }
        }
    }
    Ok(ListenerExit::EndOfInput)
}

/// Listen on stdin from a background thread
pub fn spawn_stdin_listener(trigger: SnapshotTrigger) -> io::Result<JoinHandle<()>> {
    info!("Type 'c' + Enter to save a snapshot, 'exit' to stop listening");
    thread::Builder::new()
        .name("stdin-listener".into())
        .spawn(move || match listen(io::stdin().lock(), &trigger) {
            Ok(ListenerExit::EndOfInput) => debug!("stdin closed"),
            Ok(ListenerExit::Command) => {}
            Err(e) => warn!("stdin listener failed: {}", e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn c_requests_snapshot() {
        let trigger = SnapshotTrigger::new();
        let exit = listen(Cursor::new("c\n"), &trigger).unwrap();
        assert_eq!(exit, ListenerExit::EndOfInput);
        assert!(trigger.take());
    }

    #[test]
    fn exit_stops_before_later_tokens() {
        let trigger = SnapshotTrigger::new();
        let exit = listen(Cursor::new("hello\nexit\nc\n"), &trigger).unwrap();
        assert_eq!(exit, ListenerExit::Command);
        assert!(!trigger.take());
    }

    #[test]
    fn tokens_split_on_whitespace() {
        let trigger = SnapshotTrigger::new();
        listen(Cursor::new("  x   c\tcc exit"), &trigger).unwrap();
        assert!(trigger.take());
        assert!(!trigger.take());
    }
}
