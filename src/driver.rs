//! Async driver: maps wall-clock time onto the virtual timer queue.
//!
//! [`run`] owns no state of its own. It sleeps until the next timer deadline
//! or the next [`Command`], whichever comes first, advances the root to the
//! elapsed time, applies the command and forwards every resulting notice.
//! [`LayerRoot`] holds non-`Send` callbacks, so the loop runs on the current
//! task (a current-thread runtime or a `LocalSet`).

use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, trace};

use crate::event::{InputEvent, Notice};
use crate::layer::LayerHost;
use crate::root::LayerRoot;

/// Work sent to a running driver.
pub enum Command<H> {
    /// Route an input event through [`LayerRoot::handle_input`].
    Input(InputEvent),
    /// Run arbitrary operations against the root (show a popup, mount nodes).
    Apply(Box<dyn FnOnce(&mut LayerRoot, &H)>),
}

impl<H> Command<H> {
    pub fn apply(f: impl FnOnce(&mut LayerRoot, &H) + 'static) -> Self {
        Command::Apply(Box::new(f))
    }
}

impl<H> From<InputEvent> for Command<H> {
    fn from(event: InputEvent) -> Self {
        Command::Input(event)
    }
}

/// Why [`run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverExit {
    /// The shutdown signal fired (or its sender was dropped).
    Shutdown,
    /// Every command sender was dropped.
    CommandsClosed,
    /// The notice receiver was dropped.
    NoticesClosed,
}

/// Drive `root` until shutdown.
///
/// Virtual time is the wall-clock time elapsed since the call started.
pub async fn run<H: LayerHost>(
    root: &mut LayerRoot,
    host: &H,
    mut commands: mpsc::Receiver<Command<H>>,
    notices: mpsc::UnboundedSender<Notice>,
    mut shutdown: oneshot::Receiver<()>,
) -> DriverExit {
    let epoch = Instant::now();
    debug!("layer driver started");

    let exit = loop {
        let deadline = root.layers().next_deadline().map(|at| epoch + at);
        let timer = async move {
            match deadline {
                Some(at) => sleep_until(at).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            _ = &mut shutdown => break DriverExit::Shutdown,
            command = commands.recv() => {
                let Some(command) = command else {
                    break DriverExit::CommandsClosed;
                };
                root.advance(epoch.elapsed(), host);
                match command {
                    Command::Input(event) => {
                        let consumed = root.handle_input(event, host);
                        trace!(?event, consumed, "input routed");
                    }
                    Command::Apply(f) => f(root, host),
                }
            }
            () = timer => root.advance(epoch.elapsed(), host),
        }

        if root
            .drain_notices()
            .into_iter()
            .any(|notice| notices.send(notice).is_err())
        {
            break DriverExit::NoticesClosed;
        }
    };

    debug!(?exit, "layer driver stopped");
    exit
}
