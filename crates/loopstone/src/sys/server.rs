use crate::events::AppEvent;
use async_channel::Sender;
use beadstock::design::BeadId;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::UnixListener;

const SOCKET_PATH: &str = "/tmp/loopstone.sock";

/// One line per command: `save`, `clear`, `remove <bead-id>`,
/// `reorder <from> <to>`, `rotate <degrees>`.
pub fn parse_command(line: &str) -> Option<AppEvent> {
    let mut words = line.split_whitespace();
    let event = match words.next()? {
        "save" => AppEvent::Save,
        "clear" => AppEvent::Clear,
        "remove" => AppEvent::Remove(BeadId::new(words.next()?)),
        "reorder" => {
            let from = words.next()?.parse().ok()?;
            let to = words.next()?.parse().ok()?;
            AppEvent::Reorder { from, to }
        }
        "rotate" => AppEvent::Rotate(words.next()?.parse().ok()?),
        _ => return None,
    };
    words.next().is_none().then_some(event)
}

pub async fn run_server(tx: Sender<AppEvent>) {
    // Cleanup old socket if it exists
    if std::fs::metadata(SOCKET_PATH).is_ok() {
        let _ = std::fs::remove_file(SOCKET_PATH);
    }

    let listener = match UnixListener::bind(SOCKET_PATH) {
        Ok(l) => l,
        Err(e) => {
            log::error!("Failed to bind unix socket: {}", e);
            return;
        }
    };

    loop {
        match listener.accept().await {
            Ok((mut stream, _)) => {
                let tx = tx.clone();
                tokio::spawn(async move {
                    let reader = BufReader::new(&mut stream);
                    let mut lines = reader.lines();

                    while let Ok(Some(line)) = lines.next_line().await {
                        match parse_command(&line) {
                            Some(event) => {
                                let _ = tx.send(event).await;
                            }
                            None => log::warn!("Ignoring malformed command: {:?}", line),
                        }
                    }
                });
            }
            Err(e) => {
                log::error!("Failed to accept connection: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_commands() {
        assert!(matches!(parse_command("save"), Some(AppEvent::Save)));
        assert!(matches!(parse_command(" clear "), Some(AppEvent::Clear)));
    }

    #[test]
    fn parses_commands_with_arguments() {
        match parse_command("remove abc-123") {
            Some(AppEvent::Remove(id)) => assert_eq!(id.as_str(), "abc-123"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            parse_command("reorder 2 0"),
            Some(AppEvent::Reorder { from: 2, to: 0 })
        ));
        match parse_command("rotate -12.5") {
            Some(AppEvent::Rotate(d)) => assert_eq!(d, -12.5),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn rejects_malformed_lines() {
        for line in ["", "unknown", "remove", "reorder 1", "reorder one two", "rotate", "save now"] {
            assert!(parse_command(line).is_none(), "accepted {:?}", line);
        }
    }
}
