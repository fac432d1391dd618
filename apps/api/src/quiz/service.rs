//! Quiz Service: registry of live sessions and the async edges around them.
//!
//! Each session sits behind its own `Mutex`. Collaborator calls (generation,
//! explanation, persistence) are awaited with the lock released; the
//! controller's tickets decide whether a late result still applies.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::history::StoredTest;
use crate::quiz::explanation::{ExplanationGenerator, FALLBACK_EXPLANATION};
use crate::quiz::generator::QuestionGenerator;
use crate::quiz::notice::Notice;
use crate::quiz::persistence::ResultStore;
use crate::quiz::policy::QuizPolicy;
use crate::quiz::session::{
    Advance, AnswerCheck, CompletedTest, EnvironmentEvent, ExplanationStep, SessionController,
    SessionError, StartOutcome,
};
use crate::quiz::view::SessionResponse;

type SharedSession = Arc<Mutex<SessionController>>;

struct SessionEntry {
    session: SharedSession,
    last_touched: Instant,
}

pub struct QuizService {
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
    generator: Arc<dyn QuestionGenerator>,
    explainer: Arc<dyn ExplanationGenerator>,
    store: Arc<dyn ResultStore>,
    policy: QuizPolicy,
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::InvalidOperation { .. } => AppError::InvalidOperation(err.to_string()),
            SessionError::UnknownDomain(_) | SessionError::AnswerOutOfRange(_) => {
                AppError::Validation(err.to_string())
            }
        }
    }
}

impl QuizService {
    pub fn new(
        generator: Arc<dyn QuestionGenerator>,
        explainer: Arc<dyn ExplanationGenerator>,
        store: Arc<dyn ResultStore>,
        policy: QuizPolicy,
    ) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            generator,
            explainer,
            store,
            policy,
        }
    }

    async fn session(&self, id: Uuid) -> Result<SharedSession, AppError> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))?;
        entry.last_touched = Instant::now();
        Ok(entry.session.clone())
    }

    /// Drops sessions nobody has touched for `ttl`. A closed browser tab never
    /// sends `DELETE`, so this is the unmount path for abandoned sessions.
    pub async fn evict_idle(&self, ttl: Duration) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, entry| {
            let keep = now.duration_since(entry.last_touched) < ttl;
            if !keep {
                info!(session_id = %id, "Evicting idle session");
            }
            keep
        });
        before - sessions.len()
    }

    /// Runs [`evict_idle`](Self::evict_idle) every `every` until the runtime shuts down.
    pub fn spawn_idle_sweep(self: &Arc<Self>, ttl: Duration, every: Duration) -> JoinHandle<()> {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let evicted = service.evict_idle(ttl).await;
                if evicted > 0 {
                    info!(evicted, "Idle session sweep finished");
                }
            }
        })
    }

    pub async fn create_session(&self, owner: Option<Uuid>) -> SessionResponse {
        let id = Uuid::new_v4();
        let controller = SessionController::new(id, owner, self.policy);
        let view = controller.view();
        self.sessions.write().await.insert(
            id,
            SessionEntry {
                session: Arc::new(Mutex::new(controller)),
                last_touched: Instant::now(),
            },
        );
        info!(session_id = %id, owner = ?owner, "Session created");
        SessionResponse::new(view)
    }

    pub async fn get(&self, id: Uuid) -> Result<SessionResponse, AppError> {
        let session = self.session(id).await?;
        let view = session.lock().await.view();
        Ok(SessionResponse::new(view))
    }

    /// Drops the session; its running timer goes with it.
    pub async fn end_session(&self, id: Uuid) -> Result<(), AppError> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))?;
        info!(session_id = %id, "Session ended");
        Ok(())
    }

    pub async fn select_domain(&self, id: Uuid, domain: &str) -> Result<SessionResponse, AppError> {
        let session = self.session(id).await?;
        let mut s = session.lock().await;
        s.select_domain(domain)?;
        Ok(SessionResponse::new(s.view()))
    }

    pub async fn start_test(&self, id: Uuid) -> Result<SessionResponse, AppError> {
        let session = self.session(id).await?;
        let ticket = session.lock().await.begin_test()?;

        let fetched = self
            .generator
            .generate(&ticket.domain, &ticket.domain_label, ticket.count)
            .await;

        let mut s = session.lock().await;
        let outcome = match fetched {
            Ok(questions) => s.finish_test(&ticket, questions),
            Err(e) => s.fail_test(&ticket, &e.to_string()),
        };

        match outcome {
            StartOutcome::Started(notice) => Ok(SessionResponse::new(s.view()).with_notice(notice)),
            StartOutcome::Failed(notice) => Err(AppError::Generation(notice.message)),
            StartOutcome::Stale => Ok(SessionResponse::new(s.view())),
        }
    }

    pub async fn select_answer(&self, id: Uuid, index: usize) -> Result<SessionResponse, AppError> {
        let session = self.session(id).await?;
        let mut s = session.lock().await;
        let notice = match s.select_answer(index)? {
            AnswerCheck::AwaitingConfirmation { .. } => None,
            AnswerCheck::Warned(notice) | AnswerCheck::Restarted(notice) => Some(notice),
        };
        Ok(SessionResponse::new(s.view()).with_notices(notice))
    }

    pub async fn cancel_confirmation(&self, id: Uuid) -> Result<SessionResponse, AppError> {
        let session = self.session(id).await?;
        let mut s = session.lock().await;
        s.cancel_confirmation()?;
        Ok(SessionResponse::new(s.view()))
    }

    pub async fn acknowledge_warning(&self, id: Uuid) -> Result<SessionResponse, AppError> {
        let session = self.session(id).await?;
        let mut s = session.lock().await;
        s.acknowledge_warning()?;
        Ok(SessionResponse::new(s.view()))
    }

    pub async fn confirm_answer(&self, id: Uuid) -> Result<SessionResponse, AppError> {
        let session = self.session(id).await?;
        let mut s = session.lock().await;
        let feedback = s.confirm_answer()?;
        let notice = Notice::answer_feedback(feedback.is_correct, &feedback.correct_option);
        let mut response = SessionResponse::new(s.view()).with_notice(notice);
        response.feedback = Some(feedback);
        Ok(response)
    }

    pub async fn next_question(&self, id: Uuid) -> Result<SessionResponse, AppError> {
        let session = self.session(id).await?;
        let advance = session.lock().await.next_question()?;

        let notice = match advance {
            Advance::Next { .. } => None,
            Advance::Completed(done) => Some(self.persist(done).await),
        };

        let view = session.lock().await.view();
        Ok(SessionResponse::new(view).with_notices(notice))
    }

    async fn persist(&self, done: CompletedTest) -> Notice {
        match self.store.save(done.owner, &done.summary, &done.results).await {
            Ok(test_id) => {
                info!(session_id = %done.session_id, %test_id, "Test results saved");
                Notice::test_saved()
            }
            Err(e) => {
                error!(session_id = %done.session_id, "Failed to save test results: {e}");
                Notice::save_failed()
            }
        }
    }

    pub async fn request_explanation(&self, id: Uuid) -> Result<SessionResponse, AppError> {
        let session = self.session(id).await?;
        let step = session.lock().await.begin_explanation()?;

        let ticket = match step {
            ExplanationStep::Fetch(ticket) => ticket,
            ExplanationStep::InFlight | ExplanationStep::Cached { .. } => {
                let view = session.lock().await.view();
                return Ok(SessionResponse::new(view));
            }
        };

        let (text, notice) = match self
            .explainer
            .explain(&ticket.question, &ticket.correct_option, &ticket.domain_label)
            .await
        {
            Ok(text) => (text, None),
            Err(e) => {
                error!(session_id = %id, "Explanation failed: {e}");
                (FALLBACK_EXPLANATION.to_string(), Some(Notice::explanation_error()))
            }
        };

        let mut s = session.lock().await;
        s.apply_explanation(&ticket, text);
        Ok(SessionResponse::new(s.view()).with_notices(notice))
    }

    pub async fn retry(&self, id: Uuid) -> Result<SessionResponse, AppError> {
        let session = self.session(id).await?;
        let mut s = session.lock().await;
        s.retry();
        Ok(SessionResponse::new(s.view()))
    }

    pub async fn handle_event(
        &self,
        id: Uuid,
        event: EnvironmentEvent,
    ) -> Result<SessionResponse, AppError> {
        let session = self.session(id).await?;
        let mut s = session.lock().await;
        let outcome = s.handle_environment(event);
        let mut response = SessionResponse::new(s.view()).with_notices(outcome.notice);
        response.blocked = outcome.blocked;
        Ok(response)
    }

    pub async fn history(&self, user_id: Uuid) -> Result<Vec<StoredTest>, AppError> {
        self.store.list_for_user(user_id).await
    }
}
