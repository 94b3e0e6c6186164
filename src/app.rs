use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::Sender;
use crossterm::event::{self, Event, KeyCode};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::actors::{ActorHandle, RefreshActor, StatsActor};
use crate::backend::{load_create_choices, Backend, CreateChoices};
use crate::config::Config;
use crate::refresh::{fast_refresh_channel, FastRefreshSender};
use crate::render::RenderState;
use crate::resource::{ResourceKind, ResourceTables};
use crate::runner::OperationRunner;
use crate::tea::{update, Command, Message, Model};
use crate::util::offload;
use crate::{plog_debug, plog_warn, Result};

const MAX_BG_MESSAGES: usize = 50;

pub struct LogicThread;

impl LogicThread {
    pub fn run(
        config: Config,
        backend: Arc<dyn Backend>,
        state_tx: Sender<RenderState>,
        shutdown: Arc<AtomicBool>,
    ) -> Result<()> {
        Runtime::new()?.block_on(Self::run_async(config, backend, state_tx, shutdown))
    }

    async fn run_async(
        config: Config,
        backend: Arc<dyn Backend>,
        state_tx: Sender<RenderState>,
        shutdown: Arc<AtomicBool>,
    ) -> Result<()> {
        plog_debug!(
            "LogicThread::run_async backend={} refresh={:?}",
            backend.name(),
            config.refresh_interval()
        );
        let tables = Arc::new(ResourceTables::new());
        let (msg_tx, mut msg_rx) = mpsc::unbounded_channel::<Message>();
        let (fast_tx, fast_rx) = fast_refresh_channel();

        let refresher = RefreshActor::new(
            Arc::clone(&backend),
            Arc::clone(&tables),
            msg_tx.clone(),
            fast_rx,
        )
        .with_interval(config.refresh_interval())
        .with_timeout(config.list_timeout())
        .spawn();

        let mut effects = Effects::new(backend, msg_tx, fast_tx, config.stats_interval());
        let mut model = Model::new(config, tables);

        send_state(&state_tx, &model);
        let mut esc_filter = EscapeSequenceFilter::new();

        loop {
            if shutdown.load(Ordering::Relaxed) {
                break;
            }

            // Keyboard input (priority)
            while event::poll(Duration::ZERO)? {
                match event::read()? {
                    Event::Key(key) => {
                        if let KeyCode::Char(c) = key.code {
                            if esc_filter.filter(c) {
                                continue;
                            }
                        }
                        if effects.apply(update(&mut model, Message::Key(key))).await {
                            shutdown.store(true, Ordering::Relaxed);
                            refresher.shutdown();
                            effects.shutdown();
                            return Ok(());
                        }
                    }
                    Event::Resize(width, height) => {
                        effects.apply(update(&mut model, Message::Resize(width, height))).await;
                    }
                    _ => {}
                }

                if model.dirty {
                    send_state(&state_tx, &model);
                    model.dirty = false;
                }
            }

            // Background messages (bounded)
            for _ in 0..MAX_BG_MESSAGES {
                let Ok(msg) = msg_rx.try_recv() else { break };
                if effects.apply(update(&mut model, msg)).await {
                    shutdown.store(true, Ordering::Relaxed);
                    refresher.shutdown();
                    effects.shutdown();
                    return Ok(());
                }
            }

            if model.dirty {
                send_state(&state_tx, &model);
                model.dirty = false;
            }

            tokio::time::sleep(Duration::from_micros(500)).await;
        }

        refresher.shutdown();
        effects.shutdown();
        Ok(())
    }
}

/// Executes the commands `update` returns. Owns the live stats actors, one
/// per resource kind at most.
pub struct Effects {
    backend: Arc<dyn Backend>,
    runner: OperationRunner,
    msg_tx: mpsc::UnboundedSender<Message>,
    fast_tx: FastRefreshSender,
    live: HashMap<ResourceKind, ActorHandle>,
    stats_interval: Duration,
}

impl Effects {
    pub fn new(
        backend: Arc<dyn Backend>,
        msg_tx: mpsc::UnboundedSender<Message>,
        fast_tx: FastRefreshSender,
        stats_interval: Duration,
    ) -> Self {
        Self {
            runner: OperationRunner::new(Arc::clone(&backend), msg_tx.clone()),
            backend,
            msg_tx,
            fast_tx,
            live: HashMap::new(),
            stats_interval,
        }
    }

    /// Execute every command in order. Returns `true` when one asked to quit.
    pub async fn apply(&mut self, cmds: Vec<Command>) -> bool {
        for cmd in cmds {
            if self.execute(cmd).await {
                return true;
            }
        }
        false
    }

    pub async fn execute(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::RunOperation {
                kind,
                id,
                operation,
            } => {
                plog_debug!("Command::RunOperation {} id={}", kind.noun(), id.short());
                self.runner.run(kind, id, operation);
            }

            Command::LoadCreateChoices { kind } => {
                plog_debug!("Command::LoadCreateChoices {}", kind.noun());
                let backend = Arc::clone(&self.backend);
                let tx = self.msg_tx.clone();
                tokio::spawn(async move {
                    let choices = offload(move || Ok(load_create_choices(backend.as_ref(), kind)))
                        .await
                        .unwrap_or_else(|e| {
                            plog_warn!("create {}: option lists unavailable: {}", kind.noun(), e);
                            CreateChoices::default()
                        });
                    let _ = tx.send(Message::CreateChoicesLoaded { kind, choices });
                });
            }

            Command::StartLiveView { kind, id, ids } => {
                plog_debug!(
                    "Command::StartLiveView {} id={} ids={:?}",
                    kind.noun(),
                    id.short(),
                    ids
                );
                let actor = StatsActor::new(
                    Arc::clone(&self.backend),
                    kind,
                    id,
                    ids,
                    self.msg_tx.clone(),
                    self.fast_tx.clone(),
                )
                .with_interval(self.stats_interval)
                .spawn();
                if let Some(previous) = self.live.insert(kind, actor) {
                    previous.shutdown();
                }
            }

            Command::StopLiveView { kind } => {
                plog_debug!("Command::StopLiveView {}", kind.noun());
                if let Some(actor) = self.live.remove(&kind) {
                    actor.shutdown();
                }
            }

            Command::RefreshNow => {
                if !self.fast_tx.notify() {
                    plog_debug!("Command::RefreshNow coalesced");
                }
            }

            Command::Quit => {
                plog_debug!("Command::Quit");
                return true;
            }
        }

        false
    }

    pub fn live_views(&self) -> usize {
        self.live.len()
    }

    pub fn shutdown(&mut self) {
        plog_debug!("Shutting down {} live views", self.live.len());
        for (_, actor) in self.live.drain() {
            actor.shutdown();
        }
    }
}

fn send_state(state_tx: &Sender<RenderState>, model: &Model) {
    let _ = state_tx.try_send(model.snapshot());
}

struct EscapeSequenceFilter {
    len: u8,
    active: bool,
}

impl EscapeSequenceFilter {
    fn new() -> Self {
        Self {
            len: 0,
            active: false,
        }
    }

    fn filter(&mut self, c: char) -> bool {
        if c == '\x1b' {
            self.active = true;
            self.len = 1;
            return true;
        }
        if self.active {
            self.len += 1;
            if c.is_ascii_alphabetic() || c == '~' || self.len > 10 {
                self.active = false;
            }
            return true;
        }
        false
    }
}
