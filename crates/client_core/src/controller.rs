use std::{
    sync::{Arc, Weak},
    time::Duration,
};

use shared::{
    domain::{Exercise, NewSignup},
    machine_code,
};
use storage::GymStore;
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    capture::{Camera, CaptureGuard, DecodeAttempt},
    error::ScanError,
    lookup::{self, Lookup},
    session::{ScanEvent, ScanSession},
    signup,
};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
pub struct ScanSettings {
    /// Wait between frames that carried no code.
    pub poll_interval: Duration,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// What the exercise panel shows for the current resolution.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExerciseView {
    #[default]
    None,
    Loading(String),
    Found(Exercise),
    NotFound(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SessionChanged(ScanSession),
    ExerciseChanged(ExerciseView),
}

struct ControllerState {
    session: ScanSession,
    exercise: ExerciseView,
    /// Bumped by every start, stop, reset and submit. Scan and lookup
    /// results tagged with an older value are dropped.
    attempt: u64,
    scan_task: Option<JoinHandle<()>>,
}

impl ControllerState {
    /// Invalidates in-flight results and aborts the scan task. The caller
    /// passes the returned handle to [`join_aborted`] once the lock is gone.
    fn supersede(&mut self) -> Option<JoinHandle<()>> {
        self.attempt += 1;
        let task = self.scan_task.take();
        if let Some(task) = &task {
            task.abort();
        }
        task
    }
}

/// Waits for an aborted scan task to be dropped, which releases its capture.
async fn join_aborted(task: Option<JoinHandle<()>>) {
    if let Some(task) = task {
        let _ = task.await;
    }
}

/// Drives one [`ScanSession`]: runs the scan task against a [`Camera`] and
/// resolves codes against a [`GymStore`].
///
/// `start`, `stop`, `reset` and `submit_code` return only after a superseded
/// scan task has released its capture. Dropping the controller aborts the
/// task without waiting; the capture is released when the runtime drops it.
pub struct ScanController {
    camera: Arc<dyn Camera>,
    store: Arc<dyn GymStore>,
    settings: ScanSettings,
    events: broadcast::Sender<SessionEvent>,
    inner: Mutex<ControllerState>,
}

impl ScanController {
    pub fn new(camera: Arc<dyn Camera>, store: Arc<dyn GymStore>) -> Arc<Self> {
        Self::with_settings(camera, store, ScanSettings::default())
    }

    pub fn with_settings(
        camera: Arc<dyn Camera>,
        store: Arc<dyn GymStore>,
        settings: ScanSettings,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        Arc::new(Self {
            camera,
            store,
            settings,
            events,
            inner: Mutex::new(ControllerState {
                session: ScanSession::default(),
                exercise: ExerciseView::None,
                attempt: 0,
                scan_task: None,
            }),
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> ScanSession {
        self.inner.lock().await.session.clone()
    }

    pub async fn exercise(&self) -> ExerciseView {
        self.inner.lock().await.exercise.clone()
    }

    /// Signup form prefilled with the resolved machine code, if any.
    pub async fn signup_form(&self) -> NewSignup {
        let inner = self.inner.lock().await;
        signup::form_for(inner.session.resolved_code())
    }

    /// Starts a new scan attempt, superseding any running one.
    pub async fn start(self: &Arc<Self>) {
        let mut inner = self.inner.lock().await;
        let previous = inner.supersede();
        let attempt = inner.attempt;
        inner.session.apply(ScanEvent::Start);
        inner.exercise = ExerciseView::None;

        let controller = Arc::downgrade(self);
        let camera = Arc::clone(&self.camera);
        let poll_interval = self.settings.poll_interval;
        inner.scan_task = Some(tokio::spawn(async move {
            run_scan(controller, camera, poll_interval, attempt).await;
        }));
        debug!(attempt, "scan started");

        self.publish_session(&inner.session);
        self.publish_exercise(&inner.exercise);
        drop(inner);
        join_aborted(previous).await;
    }

    pub async fn stop(&self) {
        let mut inner = self.inner.lock().await;
        let previous = inner.supersede();
        if inner.session.apply(ScanEvent::Stop) {
            debug!("scan stopped");
            self.publish_session(&inner.session);
        }
        drop(inner);
        join_aborted(previous).await;
    }

    pub async fn reset(&self) {
        let mut inner = self.inner.lock().await;
        let previous = inner.supersede();
        if inner.session.apply(ScanEvent::Reset) {
            self.publish_session(&inner.session);
        }
        if inner.exercise != ExerciseView::None {
            inner.exercise = ExerciseView::None;
            self.publish_exercise(&inner.exercise);
        }
        drop(inner);
        join_aborted(previous).await;
    }

    /// Resolves manually entered text and looks it up. Returns `None` when
    /// the text is blank or a newer action overtook the lookup.
    pub async fn submit_code(&self, text: &str) -> Option<ExerciseView> {
        if machine_code::normalize(text).is_empty() {
            debug!("ignoring blank manual entry");
            return None;
        }
        let (attempt, code, previous) = {
            let mut inner = self.inner.lock().await;
            let previous = inner.supersede();
            inner.session.apply(ScanEvent::Submit(text.to_string()));
            let code = inner.session.resolved_code()?.to_string();
            inner.exercise = ExerciseView::Loading(code.clone());
            self.publish_session(&inner.session);
            self.publish_exercise(&inner.exercise);
            (inner.attempt, code, previous)
        };
        join_aborted(previous).await;
        self.resolve_exercise(attempt, code).await
    }

    async fn finish_scan(&self, attempt: u64, outcome: Result<String, ScanError>) -> Option<String> {
        let mut inner = self.inner.lock().await;
        if inner.attempt != attempt {
            debug!(attempt, "dropping result of superseded scan");
            return None;
        }
        inner.scan_task = None;

        let event = match outcome {
            Ok(payload) => ScanEvent::DecodeSuccess(payload),
            Err(err) => {
                warn!(%err, "scan failed");
                ScanEvent::DecodeFailed(err.user_message())
            }
        };
        inner.session.apply(event);
        self.publish_session(&inner.session);

        let code = inner.session.resolved_code()?.to_string();
        info!(%code, "machine code scanned");
        inner.exercise = ExerciseView::Loading(code.clone());
        self.publish_exercise(&inner.exercise);
        Some(code)
    }

    async fn resolve_exercise(&self, attempt: u64, code: String) -> Option<ExerciseView> {
        let view = match lookup::find_by_code(self.store.as_ref(), &code).await {
            Ok(Lookup::Found(exercise)) => ExerciseView::Found(exercise),
            Ok(Lookup::NotFound { code }) => ExerciseView::NotFound(code),
            Err(err) => {
                warn!(%code, error = %err, "exercise lookup failed");
                ExerciseView::Failed(format!("Could not load exercise {code}: {err}"))
            }
        };

        let mut inner = self.inner.lock().await;
        if inner.attempt != attempt {
            debug!(%code, "dropping lookup for outdated code");
            return None;
        }
        inner.exercise = view.clone();
        self.publish_exercise(&inner.exercise);
        Some(view)
    }

    fn publish_session(&self, session: &ScanSession) {
        let _ = self.events.send(SessionEvent::SessionChanged(session.clone()));
    }

    fn publish_exercise(&self, exercise: &ExerciseView) {
        let _ = self.events.send(SessionEvent::ExerciseChanged(exercise.clone()));
    }
}

impl Drop for ScanController {
    fn drop(&mut self) {
        if let Some(task) = self.inner.get_mut().scan_task.take() {
            task.abort();
        }
    }
}

async fn run_scan(
    controller: Weak<ScanController>,
    camera: Arc<dyn Camera>,
    poll_interval: Duration,
    attempt: u64,
) {
    let outcome = scan_until_decoded(camera.as_ref(), poll_interval).await;
    let Some(controller) = controller.upgrade() else {
        return;
    };
    if let Some(code) = controller.finish_scan(attempt, outcome).await {
        controller.resolve_exercise(attempt, code).await;
    }
}

/// Holds the capture only for the duration of this call.
async fn scan_until_decoded(
    camera: &dyn Camera,
    poll_interval: Duration,
) -> Result<String, ScanError> {
    let mut capture = CaptureGuard::new(camera.acquire().await?);
    loop {
        match capture.decode_next().await? {
            DecodeAttempt::Decoded(payload) if !payload.trim().is_empty() => return Ok(payload),
            _ => tokio::time::sleep(poll_interval).await,
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
