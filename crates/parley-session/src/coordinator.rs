//! Cross-wiring between two paired sessions.
//!
//! Each participant hears the other in their own language: when A's input
//! language changes, B's output language follows it, and symmetrically.
//! Output-language changes never feed back into input languages, so the
//! wiring cannot cycle.

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use parley_types::Language;

use crate::session::SessionController;

/// Keeps two paired sessions' languages cross-wired.
///
/// Dropping the coordinator (or calling [`unpair`](Self::unpair)) stops
/// the watcher; the sessions keep whatever wiring they had at that point.
pub struct LanguagePairCoordinator {
    cancel: CancellationToken,
}

impl LanguagePairCoordinator {
    /// Pair two sessions.
    ///
    /// The initial cross-wiring is established immediately: `b` speaks
    /// `a`'s input language and vice versa. A background task then tracks
    /// every later input-language change.
    pub fn pair(a: &SessionController, b: &SessionController) -> Self {
        b.set_tts_language(a.asr_language());
        a.set_tts_language(b.asr_language());

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let a_rx = a.asr_language_watch();
        let b_rx = b.asr_language_watch();
        let a = a.clone();
        let b = b.clone();
        tokio::spawn(async move {
            run_watcher(a, b, a_rx, b_rx, token).await;
        });

        Self { cancel }
    }

    /// Stop tracking language changes.
    pub fn unpair(&self) {
        self.cancel.cancel();
    }
}

impl Drop for LanguagePairCoordinator {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run_watcher(
    a: SessionController,
    b: SessionController,
    mut a_rx: watch::Receiver<Language>,
    mut b_rx: watch::Receiver<Language>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            changed = a_rx.changed() => match changed {
                Ok(()) => {
                    let language = a_rx.borrow_and_update().clone();
                    debug!(
                        from = %a.participant_id(),
                        to = %b.participant_id(),
                        language = %language,
                        "propagating input language to paired output"
                    );
                    b.set_tts_language(language);
                }
                Err(_) => break,
            },
            changed = b_rx.changed() => match changed {
                Ok(()) => {
                    let language = b_rx.borrow_and_update().clone();
                    debug!(
                        from = %b.participant_id(),
                        to = %a.participant_id(),
                        language = %language,
                        "propagating input language to paired output"
                    );
                    a.set_tts_language(language);
                }
                Err(_) => break,
            },
        }
    }
    debug!("language pair watcher ended");
}
