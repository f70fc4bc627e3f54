use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use crate::state::{Delta, ProviderCommand};
use crate::timetable_fetch::TimetableClient;

/// Runs the NEIS client on its own thread. Fetches are strictly
/// command-driven; the thread exits when the command channel closes.
pub fn spawn_neis_feed(
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
    client: TimetableClient,
) {
    thread::spawn(move || {
        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                ProviderCommand::FetchTimetable {
                    seq,
                    grade,
                    class_number,
                    date,
                } => {
                    let outcome = client.fetch_timetable(&grade, &class_number, date);
                    let line = match &outcome.diagnostic {
                        Some(cause) => format!("[WARN] Timetable fetch error: {cause}"),
                        None => format!(
                            "[INFO] Loaded {} periods for {}",
                            outcome.entries.len(),
                            date.format("%Y%m%d")
                        ),
                    };
                    let _ = tx.send(Delta::Log(line));
                    if tx
                        .send(Delta::SetTimetable {
                            seq,
                            entries: outcome.entries,
                        })
                        .is_err()
                    {
                        break;
                    }
                }
            }
        }
    });
}
