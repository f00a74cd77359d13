//! Chat runtime executor

use super::traits::{ChartRenderer, Transport};
use crate::config::RestWindow;
use crate::motivation;
use crate::state_machine::{transition, ChatId, Effect, Event, Keyboard, Session};
use crate::stats;
use crate::store::{Day, ExerciseStore, MediaRef, StoreError, StoreResult};
use std::collections::BTreeMap;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

/// Actor owning one chat's session
///
/// Events are applied strictly in arrival order; timers post back into the
/// same channel.
pub struct ChatRuntime<T, C>
where
    T: Transport + 'static,
    C: ChartRenderer + 'static,
{
    chat: ChatId,
    session: Session,
    store: ExerciseStore,
    transport: Arc<T>,
    charts: Arc<C>,
    rest: RestWindow,
    event_rx: mpsc::Receiver<Event>,
    event_tx: mpsc::Sender<Event>,
    /// Latest session, published after each event's effects have run
    session_tx: watch::Sender<Session>,
}

impl<T, C> ChatRuntime<T, C>
where
    T: Transport + 'static,
    C: ChartRenderer + 'static,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        chat: ChatId,
        store: ExerciseStore,
        transport: Arc<T>,
        charts: Arc<C>,
        rest: RestWindow,
        event_rx: mpsc::Receiver<Event>,
        event_tx: mpsc::Sender<Event>,
        session_tx: watch::Sender<Session>,
    ) -> Self {
        Self {
            chat,
            session: Session::default(),
            store,
            transport,
            charts,
            rest,
            event_rx,
            event_tx,
            session_tx,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(chat_id = %self.chat, "Starting chat runtime");

        while let Some(event) = self.event_rx.recv().await {
            self.process_event(event).await;
        }

        tracing::info!(chat_id = %self.chat, "Chat runtime stopped");
    }

    async fn process_event(&mut self, event: Event) {
        let kind = event.kind();
        let result = self
            .store
            .read(|week| transition(&self.session, week, event));

        if result.new_state.mode != self.session.mode {
            tracing::debug!(
                chat_id = %self.chat,
                event = kind,
                from = self.session.mode.name(),
                to = result.new_state.mode.name(),
                "State transition"
            );
        }
        self.session = result.new_state;

        for effect in result.effects {
            self.execute_effect(effect).await;
        }

        self.session_tx.send_replace(self.session.clone());
    }

    async fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::SendText { text, keyboard } => {
                self.send_text(&text, keyboard.as_ref()).await;
            }

            Effect::SendMedia { media } => self.send_media(&media).await,

            Effect::SendMotivation => {
                let (quote, sticker) = {
                    let mut rng = rand::thread_rng();
                    (
                        motivation::random_quote(&mut rng),
                        motivation::random_sticker(&mut rng),
                    )
                };
                self.send_text(quote, Some(&Keyboard::motivation())).await;
                if let Some(sticker) = sticker {
                    if let Err(e) = self.transport.send_sticker(self.chat, sticker).await {
                        tracing::warn!(chat_id = %self.chat, error = %e, "Failed to send sticker");
                    }
                }
            }

            Effect::SendChart { series } => self.send_chart(series).await,

            Effect::AppendExercise { day, record } => {
                let name = record.name.clone();
                let text = match self.write_store(move |store| store.append(day, record)).await {
                    Ok(()) => format!("✅ Exercise '{name}' added to {day}."),
                    Err(e) => {
                        tracing::error!(chat_id = %self.chat, day = %day, error = %e, "Failed to save exercise");
                        "⚠️ Couldn't save the exercise, please try again.".to_string()
                    }
                };
                self.send_text(&text, Some(&Keyboard::main_menu())).await;
            }

            Effect::RecordSet {
                day,
                index,
                reps,
                weight,
            } => {
                let saved = self
                    .write_store(move |store| store.record_set(day, index, reps, weight))
                    .await;
                let text = match saved {
                    Ok(()) => match self.session.snapshot.get_mut(index) {
                        Some(record) => {
                            record.log_set(reps, weight);
                            stats::logged_set_message(record.set_count(), reps, weight)
                        }
                        None => return,
                    },
                    Err(e) => {
                        tracing::error!(chat_id = %self.chat, day = %day, index, error = %e, "Failed to record set");
                        "⚠️ Couldn't save that set, please try again.".to_string()
                    }
                };
                self.send_text(&text, None).await;
            }

            Effect::PersistStore => {
                if let Err(e) = self.write_store(|store| store.save()).await {
                    tracing::error!(chat_id = %self.chat, error = %e, "Failed to save store");
                    self.send_text("⚠️ Couldn't save your progress, please try again.", None)
                        .await;
                }
            }

            Effect::ScheduleRest { run, cursor } => {
                let delay = self.rest.draw(&mut rand::thread_rng());
                tracing::debug!(chat_id = %self.chat, run, cursor, delay = ?delay, "Scheduling rest");
                self.send_text(&rest_message(delay), None).await;

                let event_tx = self.event_tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = event_tx.send(Event::RestElapsed { run, cursor }).await;
                });
            }
        }
    }

    /// Run a store write on the blocking pool; saves hit the filesystem
    async fn write_store<F>(&self, write: F) -> StoreResult<()>
    where
        F: FnOnce(&ExerciseStore) -> StoreResult<()> + Send + 'static,
    {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || write(&store))
            .await
            .unwrap_or_else(|e| Err(StoreError::Io(io::Error::other(e))))
    }

    async fn send_chart(&self, series: BTreeMap<Day, Vec<f64>>) {
        let charts = Arc::clone(&self.charts);
        let rendered = tokio::task::spawn_blocking(move || charts.render_progress(&series)).await;

        match rendered {
            Ok(Some(png)) => {
                if let Err(e) = self.transport.send_image(self.chat, png).await {
                    tracing::warn!(chat_id = %self.chat, error = %e, "Failed to send chart");
                }
                self.send_text("Main menu:", Some(&Keyboard::main_menu())).await;
            }
            Ok(None) => {
                self.send_text("No data for charts yet.", Some(&Keyboard::main_menu()))
                    .await;
            }
            Err(e) => {
                tracing::error!(chat_id = %self.chat, error = %e, "Chart rendering panicked");
                self.send_text("⚠️ Couldn't draw the chart.", Some(&Keyboard::main_menu()))
                    .await;
            }
        }
    }

    async fn send_text(&self, text: &str, keyboard: Option<&Keyboard>) {
        if let Err(e) = self.transport.send_text(self.chat, text, keyboard).await {
            tracing::warn!(chat_id = %self.chat, error = %e, "Failed to send message");
        }
    }

    async fn send_media(&self, media: &MediaRef) {
        if let Err(e) = self.transport.send_media(self.chat, media).await {
            tracing::warn!(chat_id = %self.chat, error = %e, "Failed to send media");
        }
    }
}

fn rest_message(delay: Duration) -> String {
    let secs = delay.as_secs();
    format!("⏱ Rest {} min {} sec.", secs / 60, secs % 60)
}
