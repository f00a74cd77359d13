//! Mock implementations for testing
//!
//! These mocks enable integration testing without real I/O.

use super::traits::*;
use super::SessionRegistry;
use crate::state_machine::{ChatId, Keyboard, Session};
use crate::store::{Day, MediaRef};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

// ============================================================================
// Recording Transport
// ============================================================================

/// Something the bot sent
#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Text {
        chat: ChatId,
        text: String,
        keyboard: Option<Keyboard>,
    },
    Media {
        chat: ChatId,
        media: MediaRef,
    },
    Sticker {
        chat: ChatId,
        sticker_id: String,
    },
    Image {
        chat: ChatId,
        len: usize,
    },
}

impl Sent {
    pub fn chat(&self) -> ChatId {
        match self {
            Sent::Text { chat, .. }
            | Sent::Media { chat, .. }
            | Sent::Sticker { chat, .. }
            | Sent::Image { chat, .. } => *chat,
        }
    }
}

/// Transport that records every outbound call
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<Sent>>,
    fail_stickers: AtomicBool,
}

#[allow(dead_code)]
impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every sticker send fail
    pub fn with_failing_stickers(self) -> Self {
        self.fail_stickers.store(true, Ordering::SeqCst);
        self
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    /// Texts sent to one chat, in order
    pub fn texts(&self, chat: ChatId) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter_map(|s| match s {
                Sent::Text { chat: c, text, .. } if *c == chat => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, sent: Sent) {
        self.sent.lock().unwrap().push(sent);
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send_text(
        &self,
        chat: ChatId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), TransportError> {
        self.record(Sent::Text {
            chat,
            text: text.to_string(),
            keyboard: keyboard.cloned(),
        });
        Ok(())
    }

    async fn send_media(&self, chat: ChatId, media: &MediaRef) -> Result<(), TransportError> {
        self.record(Sent::Media {
            chat,
            media: media.clone(),
        });
        Ok(())
    }

    async fn send_sticker(&self, chat: ChatId, sticker_id: &str) -> Result<(), TransportError> {
        if self.fail_stickers.load(Ordering::SeqCst) {
            return Err(TransportError::Api {
                description: "Bad Request: sticker not found".to_string(),
            });
        }
        self.record(Sent::Sticker {
            chat,
            sticker_id: sticker_id.to_string(),
        });
        Ok(())
    }

    async fn send_image(&self, chat: ChatId, png: Vec<u8>) -> Result<(), TransportError> {
        self.record(Sent::Image {
            chat,
            len: png.len(),
        });
        Ok(())
    }
}

// ============================================================================
// Static Chart Renderer
// ============================================================================

/// Renderer returning fixed bytes whenever any series has data
#[derive(Default)]
pub struct StaticChartRenderer;

impl ChartRenderer for StaticChartRenderer {
    fn render_progress(&self, series: &BTreeMap<Day, Vec<f64>>) -> Option<Vec<u8>> {
        series
            .values()
            .any(|s| !s.is_empty())
            .then(|| b"\x89PNG-static".to_vec())
    }
}

// ============================================================================
// Wait helpers
// ============================================================================

pub type TestRegistry = SessionRegistry<RecordingTransport, StaticChartRenderer>;

/// Poll a chat's published session until `pred` holds
pub async fn wait_for_session<F>(
    registry: &TestRegistry,
    chat: ChatId,
    timeout: Duration,
    pred: F,
) -> Option<Session>
where
    F: Fn(&Session) -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if let Some(session) = registry.session(chat).await {
            if pred(&session) {
                return Some(session);
            }
        }
        if tokio::time::Instant::now() >= deadline {
            return None;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Poll the transport until a text containing `needle` reaches `chat`
pub async fn wait_for_text(
    registry: &TestRegistry,
    chat: ChatId,
    needle: &str,
    timeout: Duration,
) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if registry
            .transport()
            .texts(chat)
            .iter()
            .any(|t| t.contains(needle))
        {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RestWindow;
    use crate::runtime::{InboundContent, InboundMessage};
    use crate::state_machine::keyboard::{
        BTN_ADD, BTN_ADVANCE, BTN_CHART_STATS, BTN_MOTIVATION, BTN_STATS, BTN_TEST_MODE,
        BTN_TRAINING,
    };
    use crate::state_machine::{Event, Mode};
    use crate::store::{ExerciseKind, ExerciseRecord, ExerciseStore};
    use std::path::Path;
    use tempfile::TempDir;

    const WAIT: Duration = Duration::from_secs(3);

    fn short_rest() -> RestWindow {
        RestWindow::new(Duration::from_millis(10), Duration::from_millis(30))
    }

    fn registry_at(path: &Path) -> TestRegistry {
        SessionRegistry::new(
            ExerciseStore::load(path),
            RecordingTransport::new(),
            StaticChartRenderer,
            short_rest(),
        )
    }

    fn seeded_registry(dir: &TempDir) -> TestRegistry {
        registry_with_rest(dir, short_rest())
    }

    /// Registry with Monday = [A, B]
    fn registry_with_rest(dir: &TempDir, rest: RestWindow) -> TestRegistry {
        let registry = SessionRegistry::new(
            ExerciseStore::load(dir.path().join("exercises.json")),
            RecordingTransport::new(),
            StaticChartRenderer,
            rest,
        );
        for name in ["A", "B"] {
            registry
                .store()
                .append(
                    Day::Monday,
                    ExerciseRecord::new(name, ExerciseKind::Strength, None),
                )
                .unwrap();
        }
        registry
    }

    async fn say(registry: &TestRegistry, chat: ChatId, text: &str) {
        registry
            .dispatch(InboundMessage::text(chat, text))
            .await
            .unwrap();
    }

    /// Send texts one at a time, waiting for each reply to settle
    async fn converse(registry: &TestRegistry, chat: ChatId, texts: &[&str]) {
        for text in texts {
            let before = registry.transport().texts(chat).len();
            say(registry, chat, text).await;
            let deadline = tokio::time::Instant::now() + WAIT;
            while registry.transport().texts(chat).len() == before {
                assert!(
                    tokio::time::Instant::now() < deadline,
                    "no reply to {text:?}"
                );
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            settle(registry, chat).await;
        }
    }

    /// Wait until no new texts arrive for a few polls
    async fn settle(registry: &TestRegistry, chat: ChatId) {
        let mut seen = registry.transport().texts(chat).len();
        let mut quiet = 0;
        while quiet < 3 {
            tokio::time::sleep(Duration::from_millis(10)).await;
            let now = registry.transport().texts(chat).len();
            if now == seen {
                quiet += 1;
            } else {
                seen = now;
                quiet = 0;
            }
        }
    }

    #[tokio::test]
    async fn test_training_walks_day_and_completes() {
        let dir = TempDir::new().unwrap();
        let registry = seeded_registry(&dir);
        let chat = ChatId(1);

        converse(&registry, chat, &[BTN_TRAINING, "📅 Monday"]).await;
        let session = wait_for_session(&registry, chat, WAIT, |s| s.mode.is_training())
            .await
            .unwrap();
        assert_eq!(session.cursor, 0);
        assert!(wait_for_text(&registry, chat, "🔸 A", WAIT).await);

        say(&registry, chat, BTN_ADVANCE).await;
        let session = wait_for_session(&registry, chat, WAIT, |s| s.cursor == 1)
            .await
            .unwrap();
        assert!(matches!(session.mode, Mode::Training { resting: false, .. }));
        assert!(wait_for_text(&registry, chat, "🔸 B", WAIT).await);

        say(&registry, chat, BTN_ADVANCE).await;
        assert!(wait_for_text(&registry, chat, "Training complete", WAIT).await);
        let session = wait_for_session(&registry, chat, WAIT, |s| s.mode == Mode::Main)
            .await
            .unwrap();
        assert!(session.snapshot.is_empty());

        let texts = registry.transport().texts(chat);
        assert_eq!(texts.iter().filter(|t| t.starts_with("⏱ Rest")).count(), 2);
    }

    #[tokio::test]
    async fn test_double_advance_schedules_one_rest() {
        let dir = TempDir::new().unwrap();
        let registry = registry_with_rest(
            &dir,
            RestWindow::new(Duration::from_millis(200), Duration::from_millis(200)),
        );
        let chat = ChatId(2);

        converse(&registry, chat, &[BTN_TRAINING, "Monday", BTN_ADVANCE, BTN_ADVANCE]).await;
        assert!(wait_for_text(&registry, chat, "Still resting", WAIT).await);

        wait_for_session(&registry, chat, WAIT, |s| s.cursor == 1)
            .await
            .unwrap();
        // Leave some time for a second timer to misfire
        tokio::time::sleep(Duration::from_millis(100)).await;
        let session = registry.session(chat).await.unwrap();
        assert_eq!(session.cursor, 1);
        let texts = registry.transport().texts(chat);
        assert_eq!(texts.iter().filter(|t| t.starts_with("⏱ Rest")).count(), 1);
    }

    #[tokio::test]
    async fn test_timer_after_leaving_training_is_ignored() {
        let dir = TempDir::new().unwrap();
        let registry = registry_with_rest(
            &dir,
            RestWindow::new(Duration::from_millis(150), Duration::from_millis(150)),
        );
        let chat = ChatId(3);

        converse(&registry, chat, &[BTN_TRAINING, "Monday", BTN_ADVANCE, "/start"]).await;
        tokio::time::sleep(Duration::from_millis(300)).await;

        let session = registry.session(chat).await.unwrap();
        assert_eq!(session.mode, Mode::Main);
        assert!(!registry
            .transport()
            .texts(chat)
            .iter()
            .any(|t| t.contains("Training complete")));
    }

    #[tokio::test]
    async fn test_add_flow_persists_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("exercises.json");
        let registry = registry_at(&path);
        let chat = ChatId(4);
        let before = registry.store().revision();

        converse(&registry, chat, &[BTN_ADD, "📅 Tuesday", "Squat", "yes", "none"]).await;
        assert!(wait_for_text(&registry, chat, "✅ Exercise 'Squat' added to Tuesday.", WAIT).await);

        assert_eq!(registry.store().revision(), before + 1);
        assert_eq!(
            registry.store().day(Day::Tuesday),
            vec![ExerciseRecord::new("Squat", ExerciseKind::Strength, None)]
        );

        // A fresh load sees the same record
        let reloaded = ExerciseStore::load(&path);
        assert_eq!(reloaded.day(Day::Tuesday).len(), 1);
    }

    #[tokio::test]
    async fn test_add_flow_with_photo() {
        let dir = TempDir::new().unwrap();
        let registry = registry_at(&dir.path().join("exercises.json"));
        let chat = ChatId(5);

        converse(&registry, chat, &[BTN_ADD, "Friday", "Plank", "no"]).await;
        registry
            .dispatch(InboundMessage {
                chat_id: chat,
                content: InboundContent::Photo {
                    file_id: "photo-1".to_string(),
                },
            })
            .await
            .unwrap();
        assert!(wait_for_text(&registry, chat, "added to Friday", WAIT).await);

        let records = registry.store().day(Day::Friday);
        assert_eq!(records[0].kind, ExerciseKind::Cardio);
        assert_eq!(records[0].media, Some(MediaRef::photo("photo-1")));
    }

    #[tokio::test]
    async fn test_test_mode_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("exercises.json");
        let registry = seeded_registry(&dir);
        let chat = ChatId(6);
        let original = std::fs::read(&path).unwrap();

        converse(
            &registry,
            chat,
            &[BTN_TEST_MODE, BTN_ADD, "Monday", "C", "yes", "none"],
        )
        .await;
        converse(&registry, chat, &[BTN_TRAINING, "Monday", "8 x 60", BTN_ADVANCE]).await;
        wait_for_session(&registry, chat, WAIT, |s| s.cursor == 1)
            .await
            .unwrap();
        converse(&registry, chat, &["/exit_test", BTN_TEST_MODE, BTN_TEST_MODE]).await;

        assert_eq!(std::fs::read(&path).unwrap(), original);
        assert_eq!(registry.store().day(Day::Monday).len(), 2);
        assert!(registry.store().day(Day::Monday)[0].sets_history.is_empty());
    }

    #[tokio::test]
    async fn test_logged_set_reaches_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("exercises.json");
        let registry = seeded_registry(&dir);
        let chat = ChatId(7);

        converse(&registry, chat, &[BTN_TRAINING, "Monday", "8 x 60", "6 x 62.5"]).await;
        assert!(wait_for_text(&registry, chat, "Logged set 2", WAIT).await);

        let monday = registry.store().day(Day::Monday);
        let a = &monday[0];
        assert_eq!(a.sets_history, vec![8, 6]);
        assert_eq!(a.weight_history, vec![60.0, 62.5]);
        assert_eq!(ExerciseStore::load(&path).day(Day::Monday)[0].set_count(), 2);
    }

    #[tokio::test]
    async fn test_save_failure_is_reported_and_rolled_back() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let registry = registry_at(&blocker.join("exercises.json"));
        let chat = ChatId(8);

        converse(&registry, chat, &[BTN_ADD, "Monday", "Squat", "yes", "none"]).await;
        assert!(wait_for_text(&registry, chat, "Couldn't save the exercise", WAIT).await);
        assert!(registry.store().day(Day::Monday).is_empty());

        let session = wait_for_session(&registry, chat, WAIT, |s| s.mode == Mode::Main).await;
        assert!(session.is_some());
    }

    #[tokio::test]
    async fn test_failed_set_is_not_confirmed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("exercises.json");
        let registry = seeded_registry(&dir);
        let chat = ChatId(12);

        // A non-empty directory in place of the file makes every save fail
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), b"").unwrap();

        converse(&registry, chat, &[BTN_TRAINING, "Monday", "8 x 60"]).await;

        let texts = registry.transport().texts(chat);
        assert!(texts.iter().any(|t| t.contains("Couldn't save that set")));
        assert!(!texts.iter().any(|t| t.contains("Logged set")));
        assert!(registry.store().day(Day::Monday)[0].sets_history.is_empty());

        let session = registry.session(chat).await.unwrap();
        assert!(session.snapshot[0].sets_history.is_empty());
    }

    #[tokio::test]
    async fn test_motivation_survives_sticker_failure() {
        let dir = TempDir::new().unwrap();
        let registry = SessionRegistry::new(
            ExerciseStore::load(dir.path().join("exercises.json")),
            RecordingTransport::new().with_failing_stickers(),
            StaticChartRenderer,
            short_rest(),
        );
        let chat = ChatId(9);

        converse(&registry, chat, &[BTN_MOTIVATION, "💬 Next tip"]).await;
        let session = wait_for_session(&registry, chat, WAIT, |s| s.mode == Mode::Motivation)
            .await
            .unwrap();
        assert_eq!(session.mode, Mode::Motivation);
        assert!(!registry
            .transport()
            .sent()
            .iter()
            .any(|s| matches!(s, Sent::Sticker { .. })));
        assert_eq!(registry.transport().texts(chat).len(), 2);
    }

    #[tokio::test]
    async fn test_chart_with_and_without_data() {
        let dir = TempDir::new().unwrap();
        let registry = seeded_registry(&dir);
        let chat = ChatId(10);

        converse(&registry, chat, &[BTN_STATS, BTN_CHART_STATS]).await;
        assert!(wait_for_text(&registry, chat, "No data for charts yet.", WAIT).await);

        registry.store().record_set(Day::Monday, 0, 5, 80.0).unwrap();
        converse(&registry, chat, &[BTN_STATS, BTN_CHART_STATS]).await;
        assert!(wait_for_text(&registry, chat, "Main menu:", WAIT).await);
        assert!(registry
            .transport()
            .sent()
            .iter()
            .any(|s| matches!(s, Sent::Image { chat: c, .. } if *c == chat)));
    }

    #[tokio::test]
    async fn test_chats_are_isolated() {
        let dir = TempDir::new().unwrap();
        let registry = seeded_registry(&dir);

        let mut tasks = tokio::task::JoinSet::new();
        let registry = std::sync::Arc::new(registry);
        for id in 100..110 {
            let registry = std::sync::Arc::clone(&registry);
            tasks.spawn(async move {
                let chat = ChatId(id);
                converse(&registry, chat, &[BTN_TRAINING, "Monday", BTN_ADVANCE]).await;
                wait_for_session(&registry, chat, WAIT, |s| s.cursor == 1)
                    .await
                    .is_some()
            });
        }
        while let Some(done) = tasks.join_next().await {
            assert!(done.unwrap());
        }

        assert_eq!(registry.chat_count().await, 10);
        for id in 100..110 {
            let chat = ChatId(id);
            assert!(registry.transport().sent().iter().any(|s| s.chat() == chat));
            assert_eq!(registry.session(chat).await.unwrap().runs, 1);
        }
    }

    #[tokio::test]
    async fn test_stale_event_sent_directly_is_ignored() {
        let dir = TempDir::new().unwrap();
        let registry = seeded_registry(&dir);
        let chat = ChatId(11);

        converse(&registry, chat, &[BTN_TRAINING, "Monday"]).await;
        registry
            .send_event(chat, Event::RestElapsed { run: 7, cursor: 0 })
            .await
            .unwrap();
        converse(&registry, chat, &["hello"]).await;
        assert!(wait_for_text(&registry, chat, "Press ⏭ Next", WAIT).await);

        let session = registry.session(chat).await.unwrap();
        assert_eq!(session.cursor, 0);
        assert!(matches!(session.mode, Mode::Training { run: 1, .. }));
    }
}
