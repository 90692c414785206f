use anyhow::anyhow;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{info, trace, warn};
use uuid::Uuid;

use ilay_types::{ConversationKey, Message, MessageRecord, NewMessage, StreamEvent};

use crate::config::SyncConfig;
use crate::cooldown::SendGate;
use crate::error::{SendError, SubscriptionError};
use crate::reactions;
use crate::service::{BanDirectory, EventSource, IpLookup, MessageService, Subscription};
use crate::store::MessageStore;

/// The current user, as handed over by the identity provider. Session
/// lifecycle (login/refresh/logout) lives outside the engine.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub display_name: String,
}

/// Snapshot of the active conversation for rendering. Published through a
/// watch channel on every change; reading it never blocks on I/O.
#[derive(Debug, Clone, Default)]
pub struct ConversationView {
    pub key: Option<ConversationKey>,
    /// Decoded messages, ordered by created_at ascending.
    pub messages: Vec<Message>,
    /// True while the initial window for a freshly opened conversation loads.
    pub loading: bool,
    /// True once the event stream is established, false while reconnecting.
    pub connected: bool,
    /// Set when a ban record matched at bootstrap. Informational: the engine
    /// reports it, enforcement is the caller's call.
    pub access_denied: bool,
}

enum Command {
    Open { key: ConversationKey },
    Close,
    Send {
        text: String,
        reply_to: Option<i64>,
        reply: oneshot::Sender<Result<(), SendError>>,
    },
    ToggleReaction { message_id: i64, emoji: String },
    DeleteMessage { message_id: i64 },
    /// Internal: a backoff timer fired for a dropped stream.
    Resubscribe { key: ConversationKey, attempt: u32 },
}

/// Handle the UI talks through. Cheap to clone; commands are applied by the
/// session task one at a time, in arrival order.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    view: watch::Receiver<ConversationView>,
}

impl SessionHandle {
    /// Open a conversation, closing whichever one was active.
    pub async fn open(&self, key: ConversationKey) {
        let _ = self.commands.send(Command::Open { key }).await;
    }

    /// Close the active conversation and its stream.
    pub async fn close(&self) {
        let _ = self.commands.send(Command::Close).await;
    }

    /// Validate, encode and submit a message. On failure the caller keeps
    /// the original text and decides whether to resubmit.
    pub async fn send_message(
        &self,
        text: impl Into<String>,
        reply_to: Option<i64>,
    ) -> Result<(), SendError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Send {
                text: text.into(),
                reply_to,
                reply,
            })
            .await
            .map_err(|_| SendError::ChannelFailure(anyhow!("session task stopped")))?;
        response
            .await
            .map_err(|_| SendError::ChannelFailure(anyhow!("session task stopped")))?
    }

    /// Toggle the current user's reaction on a message. Fire-and-forget: the
    /// store picks up the change from the echoed update event.
    pub async fn toggle_reaction(&self, message_id: i64, emoji: impl Into<String>) {
        let _ = self
            .commands
            .send(Command::ToggleReaction {
                message_id,
                emoji: emoji.into(),
            })
            .await;
    }

    /// Delete one of the current user's own messages.
    pub async fn delete_message(&self, message_id: i64) {
        let _ = self.commands.send(Command::DeleteMessage { message_id }).await;
    }

    /// Watch the rendered view of the active conversation.
    pub fn view(&self) -> watch::Receiver<ConversationView> {
        self.view.clone()
    }
}

/// One conversation view's synchronization task: owns the store, one live
/// subscription at most, and the send cooldown. Spawn [`ChatSession::run`]
/// and drive it through the [`SessionHandle`].
pub struct ChatSession<S, E, B, N> {
    service: S,
    events: E,
    bans: B,
    ip_lookup: N,
    identity: Identity,
    config: SyncConfig,

    store: MessageStore,
    active: Option<ConversationKey>,
    subscription: Option<Subscription>,
    gate: SendGate,
    origin_ip: Option<String>,
    loading: bool,
    access_denied: bool,

    commands: mpsc::Receiver<Command>,
    /// For internal resubscribe timers. Weak so a pending timer never keeps
    /// the loop alive after every handle is gone.
    commands_tx: mpsc::WeakSender<Command>,
    view_tx: watch::Sender<ConversationView>,
}

impl<S, E, B, N> ChatSession<S, E, B, N>
where
    S: MessageService,
    E: EventSource,
    B: BanDirectory,
    N: IpLookup,
{
    pub fn new(
        service: S,
        events: E,
        bans: B,
        ip_lookup: N,
        identity: Identity,
        config: SyncConfig,
    ) -> (Self, SessionHandle) {
        let (commands_tx, commands) = mpsc::channel(64);
        let (view_tx, view_rx) = watch::channel(ConversationView::default());

        let gate = SendGate::new(config.send_cooldown);
        let session = Self {
            service,
            events,
            bans,
            ip_lookup,
            identity,
            config,
            store: MessageStore::new(),
            active: None,
            subscription: None,
            gate,
            origin_ip: None,
            loading: false,
            access_denied: false,
            commands,
            commands_tx: commands_tx.downgrade(),
            view_tx,
        };

        let handle = SessionHandle {
            commands: commands_tx,
            view: view_rx,
        };

        (session, handle)
    }

    /// The single-writer loop. Consumes commands and stream events and
    /// applies them to the store sequentially; exits when every handle is
    /// dropped.
    pub async fn run(mut self) {
        self.bootstrap().await;

        loop {
            let step = tokio::select! {
                cmd = self.commands.recv() => Step::Command(cmd),
                event = next_event(&mut self.subscription) => Step::Event(event),
            };

            match step {
                Step::Command(Some(cmd)) => self.handle_command(cmd).await,
                Step::Command(None) => break,
                Step::Event(Some(event)) => self.apply_event(event),
                Step::Event(None) => self.stream_lost(),
            }
        }

        info!("session for {} shutting down", self.identity.display_name);
    }

    /// Best-effort access check at startup: bounded wait on the IP lookup,
    /// then ban lookups that fail open. Nothing here blocks the session for
    /// long or stops it.
    async fn bootstrap(&mut self) {
        match tokio::time::timeout(self.config.ip_lookup_timeout, self.ip_lookup.current_ip())
            .await
        {
            Ok(Ok(ip)) => {
                match self.bans.ip_ban(&ip).await {
                    Ok(Some(_)) => self.access_denied = true,
                    Ok(None) => {}
                    Err(e) => warn!("IP ban check failed, continuing open: {e:#}"),
                }
                self.origin_ip = Some(ip);
            }
            Ok(Err(e)) => warn!("IP lookup failed, sending without origin IP: {e:#}"),
            Err(_) => warn!(
                "IP lookup exceeded {:?}, sending without origin IP",
                self.config.ip_lookup_timeout
            ),
        }

        match self.bans.user_ban(self.identity.user_id).await {
            Ok(Some(_)) => self.access_denied = true,
            Ok(None) => {}
            Err(e) => warn!("user ban check failed, continuing open: {e:#}"),
        }

        self.publish();
    }

    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Open { key } => self.open_conversation(key).await,
            Command::Close => self.close_conversation(),
            Command::Send { text, reply_to, reply } => {
                let result = self.do_send(text, reply_to).await;
                let _ = reply.send(result);
            }
            Command::ToggleReaction { message_id, emoji } => {
                self.toggle_reaction(message_id, &emoji).await;
            }
            Command::DeleteMessage { message_id } => self.delete_message(message_id).await,
            Command::Resubscribe { key, attempt } => {
                // Guard by conversation key: a timer for a superseded room,
                // or one racing an already re-established stream, is stale.
                if self.active.as_ref() != Some(&key) || self.subscription.is_some() {
                    trace!("discarding stale resubscribe for {key:?}");
                    return;
                }
                self.establish(key, attempt).await;
            }
        }
    }

    /// Conversation switch: the previous stream is fully closed (dropping
    /// the subscription unsubscribes) before the new one is established.
    async fn open_conversation(&mut self, key: ConversationKey) {
        self.subscription = None;
        self.store.clear();
        self.active = Some(key.clone());
        self.loading = true;
        self.publish();

        self.establish(key, 1).await;
    }

    fn close_conversation(&mut self) {
        info!("closing conversation {:?}", self.active);
        self.subscription = None;
        self.active = None;
        self.store.clear();
        self.loading = false;
        self.publish();
    }

    /// Subscribe, then seed. Subscribing first means events raised during
    /// the fetch sit in the channel and merge after the seed — the
    /// idempotent insert absorbs the overlap, so nothing is lost or doubled.
    async fn establish(&mut self, key: ConversationKey, attempt: u32) {
        match self.events.subscribe(&key).await {
            Ok(subscription) => {
                self.subscription = Some(subscription);
            }
            Err(e) => {
                warn!(
                    "{}",
                    SubscriptionError::Connect(e.context(format!("attempt {attempt}")))
                );
                self.loading = false;
                self.publish();
                self.schedule_resubscribe(key, attempt + 1);
                return;
            }
        }

        match self.service.fetch(&key, self.config.seed_limit).await {
            Ok(records) => {
                let messages = records.into_iter().map(decode_record).collect();
                self.store.seed(messages);
            }
            Err(e) => {
                // Stale-but-present beats empty: keep whatever is merged.
                warn!("seed fetch for {key:?} failed: {e:#}");
            }
        }

        self.loading = false;
        self.publish();
    }

    fn stream_lost(&mut self) {
        self.subscription = None;
        let Some(key) = self.active.clone() else {
            return;
        };

        warn!("{} for {key:?}", SubscriptionError::Closed);
        self.publish();
        self.schedule_resubscribe(key, 1);
    }

    /// Arrange a retry without stalling the command loop: a detached timer
    /// feeds a Resubscribe command back in, and the key guard on arrival
    /// drops it if the room changed meanwhile.
    fn schedule_resubscribe(&self, key: ConversationKey, attempt: u32) {
        if attempt > self.config.max_resubscribe_attempts {
            warn!(
                "{} for {key:?}",
                SubscriptionError::RetriesExhausted(self.config.max_resubscribe_attempts)
            );
            return;
        }

        let delay = self.config.resubscribe_base_delay * 2u32.saturating_pow(attempt - 1);
        let commands = self.commands_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(commands) = commands.upgrade() {
                let _ = commands.send(Command::Resubscribe { key, attempt }).await;
            }
        });
    }

    /// Merge one stream event. Insert/update are admitted only when the
    /// record belongs to the active room; deletes go by id, which is
    /// globally unique, so a foreign delete is a no-op by the merge algebra.
    fn apply_event(&mut self, event: StreamEvent) {
        let Some(active) = &self.active else { return };

        match event {
            StreamEvent::Insert(record) => {
                if !active.admits(record.author_id, record.receiver_id) {
                    trace!("discarding insert {} for another room", record.id);
                    return;
                }
                self.store.insert(decode_record(record));
            }
            StreamEvent::Update(record) => {
                if !active.admits(record.author_id, record.receiver_id) {
                    trace!("discarding update {} for another room", record.id);
                    return;
                }
                self.store.update(decode_record(record));
            }
            StreamEvent::Delete { id } => self.store.delete(id),
        }

        self.publish();
    }

    /// Validate, encode, submit. The cooldown arms after the attempt either
    /// way; the service's answer decides success.
    async fn do_send(&mut self, text: String, reply_to: Option<i64>) -> Result<(), SendError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SendError::Empty);
        }
        self.gate.check()?;

        let Some(key) = &self.active else {
            return Err(SendError::ChannelFailure(anyhow!("no active conversation")));
        };

        let message = NewMessage {
            author_id: self.identity.user_id,
            author_username: self.identity.display_name.clone(),
            receiver_id: key.peer_of(self.identity.user_id),
            content: ilay_cipher::encode(text),
            reply_to_id: reply_to,
            origin_ip: self.origin_ip.clone(),
        };

        let result = self.service.append(message).await;
        self.gate.arm();

        result.map_err(SendError::ChannelFailure)
    }

    /// Compute the toggled reaction map against the local copy and submit
    /// it. The store is only mutated by the echoed update event.
    async fn toggle_reaction(&mut self, message_id: i64, emoji: &str) {
        let Some(message) = self.store.get(message_id) else {
            trace!("reaction toggle on unloaded message {message_id}");
            return;
        };

        let updated = reactions::toggle(&message.reactions, emoji, self.identity.user_id);
        if let Err(e) = self.service.update_reactions(message_id, updated).await {
            warn!("reaction update for {message_id} failed: {e:#}");
        }
    }

    async fn delete_message(&mut self, message_id: i64) {
        let Some(message) = self.store.get(message_id) else {
            return;
        };
        if message.author_id != self.identity.user_id {
            warn!("refusing to delete message {message_id} authored by someone else");
            return;
        }

        if let Err(e) = self.service.delete(message_id).await {
            warn!("delete of {message_id} failed: {e:#}");
        }
    }

    fn publish(&self) {
        self.view_tx.send_replace(ConversationView {
            key: self.active.clone(),
            messages: self.store.messages().to_vec(),
            loading: self.loading,
            connected: self.subscription.is_some(),
            access_denied: self.access_denied,
        });
    }
}

enum Step {
    Command(Option<Command>),
    Event(Option<StreamEvent>),
}

/// Next event from the active stream, or park forever when there is none so
/// the command branch of the select keeps the loop responsive.
async fn next_event(subscription: &mut Option<Subscription>) -> Option<StreamEvent> {
    match subscription {
        Some(sub) => sub.events.recv().await,
        None => std::future::pending().await,
    }
}

/// The receive-side boundary crossing: ciphertext record in, plaintext
/// message out. Happens exactly once per message.
fn decode_record(record: MessageRecord) -> Message {
    Message {
        id: record.id,
        created_at: record.created_at,
        author_id: record.author_id,
        author_username: record.author_username,
        receiver_id: record.receiver_id,
        content: ilay_cipher::decode(&record.content),
        reply_to_id: record.reply_to_id,
        reactions: record.reactions,
        origin_ip: record.origin_ip,
        image_url: record.image_url,
    }
}
