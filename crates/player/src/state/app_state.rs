//! Application state for the save editor
//!
//! `AppState` owns every entity loaded from the save file, the current
//! selection, and the dirty sets that decide what the next commit sends.
//! The application root creates one and hands it to the screens that need it.
//!
//! Reads hand out shared borrows; every write goes through a method here so
//! that a change can never skip dirty tracking.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use palkeeper_domain::{
    AppSettings, DomainError, EntryState, GamepassSave, Guild, GuildId, ItemContainerSlot, Pal,
    PalId, Player, PlayerId, SaveFile,
};
use palkeeper_shared::{InboundMessage, Message, UpdateSaveFileData};

use super::delta;
use crate::application::StoreError;
use crate::ports::outbound::{
    NavigationPort, NotificationLevel, NotificationPort, Route, SaveChannelPort,
};

const NOTHING_TO_SAVE: &str = "No modifications to save";
const SAVE_APPLIED: &str = "Changes saved";
const SAVE_NOT_SENT: &str = "Could not start saving, changes are still pending";

/// Result of a [`AppState::commit`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// No entity was tagged modified; nothing was sent
    NothingToSave,
    /// An `update_save_file` message was queued
    Sent { pals: usize, players: usize },
}

/// Central editor state
pub struct AppState {
    /// Players loaded from the save, keyed by uid
    players: HashMap<PlayerId, Player>,
    /// Guilds loaded from the save, keyed by guild id
    guilds: HashMap<GuildId, Guild>,
    /// Currently selected player
    selected_player: Option<PlayerId>,
    /// Currently selected pal (cleared whenever the player selection changes)
    selected_pal: Option<PalId>,
    /// World save currently open
    save_file: Option<SaveFile>,
    /// Per-player save files that came with the world
    player_save_files: Vec<SaveFile>,
    /// Players pending a commit
    modified_players: HashSet<PlayerId>,
    /// Pals pending a commit
    modified_pals: HashSet<PalId>,
    /// Item slot copied in the inventory editor
    clipboard_item: Option<ItemContainerSlot>,
    /// Latest status line from the save service
    progress_message: String,
    /// Latest error reported by the save service
    last_error: Option<String>,
    /// Save service version string
    version: String,
    settings: AppSettings,
    /// Game Pass saves discovered on this machine, keyed by save id
    gamepass_saves: HashMap<String, GamepassSave>,

    channel: Arc<dyn SaveChannelPort>,
    navigation: Arc<dyn NavigationPort>,
    notifications: Arc<dyn NotificationPort>,
}

impl AppState {
    pub fn new(
        channel: Arc<dyn SaveChannelPort>,
        navigation: Arc<dyn NavigationPort>,
        notifications: Arc<dyn NotificationPort>,
    ) -> Self {
        Self {
            players: HashMap::new(),
            guilds: HashMap::new(),
            selected_player: None,
            selected_pal: None,
            save_file: None,
            player_save_files: Vec::new(),
            modified_players: HashSet::new(),
            modified_pals: HashSet::new(),
            clipboard_item: None,
            progress_message: String::new(),
            last_error: None,
            version: String::new(),
            settings: AppSettings::default(),
            gamepass_saves: HashMap::new(),
            channel,
            navigation,
            notifications,
        }
    }

    // -------------------------------------------------------------------------
    // Loaded data
    // -------------------------------------------------------------------------

    pub fn players(&self) -> &HashMap<PlayerId, Player> {
        &self.players
    }

    /// Replace all players (after a save file is loaded).
    ///
    /// Every map key must match the entity's own id. Players and pals that
    /// arrive with a lifecycle tag already set are registered as pending.
    pub fn set_players(&mut self, players: HashMap<PlayerId, Player>) -> Result<(), DomainError> {
        for (key, player) in &players {
            if *key != player.uid {
                return Err(DomainError::validation(format!(
                    "player keyed {key} has uid {}",
                    player.uid
                )));
            }
            for (pal_key, pal) in player.pals.iter().flatten() {
                if *pal_key != pal.instance_id {
                    return Err(DomainError::validation(format!(
                        "pal keyed {pal_key} has instance_id {}",
                        pal.instance_id
                    )));
                }
            }
        }

        for player in players.values() {
            let mut pending = !player.state.is_none();
            for pal in player.pals.iter().flat_map(|pals| pals.values()) {
                if !pal.state.is_none() {
                    self.modified_pals.insert(pal.instance_id);
                    pending = true;
                }
            }
            if pending {
                self.modified_players.insert(player.uid);
            }
        }

        tracing::debug!(count = players.len(), "Loaded players");
        self.players = players;
        Ok(())
    }

    pub fn guilds(&self) -> &HashMap<GuildId, Guild> {
        &self.guilds
    }

    /// Replace all guilds (after a save file is loaded).
    ///
    /// Every map key must match the guild's id. Base pals that arrive with a
    /// lifecycle tag already set are registered as pending.
    pub fn set_guilds(&mut self, guilds: HashMap<GuildId, Guild>) -> Result<(), DomainError> {
        if let Some((key, guild)) = guilds.iter().find(|(key, guild)| **key != guild.id) {
            return Err(DomainError::validation(format!(
                "guild keyed {key} has id {}",
                guild.id
            )));
        }

        let tagged = guilds
            .values()
            .flat_map(|guild| guild.bases.values())
            .flat_map(|base| base.pals.values())
            .filter(|pal| !pal.state.is_none())
            .map(|pal| pal.instance_id);
        self.modified_pals.extend(tagged);

        tracing::debug!(count = guilds.len(), "Loaded guilds");
        self.guilds = guilds;
        Ok(())
    }

    pub fn player(&self, uid: &PlayerId) -> Option<&Player> {
        self.players.get(uid)
    }

    /// Find a pal under any player, then under any guild base
    pub fn pal(&self, id: &PalId) -> Option<&Pal> {
        self.players
            .values()
            .find_map(|player| player.pal(id))
            .or_else(|| {
                self.guilds
                    .values()
                    .flat_map(|guild| guild.bases.values())
                    .find_map(|base| base.pals.get(id))
            })
    }

    pub fn save_file(&self) -> Option<&SaveFile> {
        self.save_file.as_ref()
    }

    pub fn set_save_file(&mut self, save_file: Option<SaveFile>) {
        self.save_file = save_file;
    }

    pub fn player_save_files(&self) -> &[SaveFile] {
        &self.player_save_files
    }

    pub fn set_player_save_files(&mut self, files: Vec<SaveFile>) {
        self.player_save_files = files;
    }

    pub fn gamepass_saves(&self) -> &HashMap<String, GamepassSave> {
        &self.gamepass_saves
    }

    pub fn set_gamepass_saves(&mut self, saves: HashMap<String, GamepassSave>) {
        self.gamepass_saves = saves;
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: AppSettings) {
        self.settings = settings;
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn set_version(&mut self, version: impl Into<String>) {
        self.version = version.into();
    }

    pub fn clipboard_item(&self) -> Option<&ItemContainerSlot> {
        self.clipboard_item.as_ref()
    }

    pub fn set_clipboard_item(&mut self, item: Option<ItemContainerSlot>) {
        self.clipboard_item = item;
    }

    pub fn progress_message(&self) -> &str {
        &self.progress_message
    }

    pub fn set_progress_message(&mut self, message: impl Into<String>) {
        self.progress_message = message.into();
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    pub fn selected_player(&self) -> Option<&Player> {
        self.selected_player.and_then(|uid| self.players.get(&uid))
    }

    pub fn selected_player_uid(&self) -> Option<PlayerId> {
        self.selected_player
    }

    pub fn selected_pal(&self) -> Option<&Pal> {
        self.selected_pal.and_then(|id| self.pal(&id))
    }

    /// Select a player (or clear the selection).
    ///
    /// Always clears the selected pal. A selected player is marked dirty
    /// straight away: opening a player counts as intent to edit it, even if
    /// nothing is changed afterwards.
    pub fn set_selected_player(&mut self, player: Option<PlayerId>) {
        self.selected_player = player;
        self.selected_pal = None;
        if let Some(uid) = player {
            tracing::debug!(uid = %uid, "Selected player");
            self.modified_players.insert(uid);
        }
    }

    /// Select a pal (or clear the selection). A selected pal is marked dirty.
    pub fn set_selected_pal(&mut self, pal: Option<PalId>) {
        self.selected_pal = pal;
        if let Some(id) = pal {
            tracing::debug!(instance_id = %id, "Selected pal");
            self.modified_pals.insert(id);
        }
    }

    // -------------------------------------------------------------------------
    // Edits
    // -------------------------------------------------------------------------

    /// Apply `edit` to a player, tag it modified and mark it dirty.
    ///
    /// `edit` sees the player with `pals` set to `None`; owned pals are edited
    /// through [`AppState::update_pal`] and anything written to `pals` here is
    /// discarded.
    pub fn update_player(
        &mut self,
        uid: PlayerId,
        edit: impl FnOnce(&mut Player),
    ) -> Result<(), DomainError> {
        let player = self
            .players
            .get_mut(&uid)
            .ok_or_else(|| DomainError::not_found("Player", uid.to_string()))?;
        let pals = player.pals.take();
        edit(player);
        player.pals = pals;
        player.state = EntryState::Modified;
        self.modified_players.insert(uid);
        Ok(())
    }

    /// Apply `edit` to every loaded copy of a pal, tag each modified and mark
    /// the pal dirty.
    ///
    /// The owning player is marked dirty as well so the commit sweep reaches
    /// the pal through it; the player's own tag is left alone.
    pub fn update_pal(
        &mut self,
        id: PalId,
        mut edit: impl FnMut(&mut Pal),
    ) -> Result<(), DomainError> {
        let (found, owner) = self.for_each_pal_copy(&id, |pal| {
            edit(pal);
            pal.state = EntryState::Modified;
        });

        if !found {
            return Err(DomainError::not_found("Pal", id.to_string()));
        }

        self.modified_pals.insert(id);
        if let Some(uid) = owner {
            self.modified_players.insert(uid);
        }
        Ok(())
    }

    /// Run `f` on every loaded copy of a pal. Returns whether any copy was
    /// found and the uid of the player that owns one.
    fn for_each_pal_copy(
        &mut self,
        id: &PalId,
        mut f: impl FnMut(&mut Pal),
    ) -> (bool, Option<PlayerId>) {
        let mut owner = None;
        let mut found = false;

        for player in self.players.values_mut() {
            if let Some(pal) = player.pal_mut(id) {
                f(pal);
                owner = Some(player.uid);
                found = true;
            }
        }

        for base in self.guilds.values_mut().flat_map(|g| g.bases.values_mut()) {
            if let Some(pal) = base.pals.get_mut(id) {
                f(pal);
                found = true;
            }
        }

        (found, owner)
    }

    // -------------------------------------------------------------------------
    // Dirty tracking
    // -------------------------------------------------------------------------

    /// Dirty players that are still loaded
    pub fn modified_players(&self) -> impl Iterator<Item = &Player> {
        self.modified_players
            .iter()
            .filter_map(|uid| self.players.get(uid))
    }

    /// Dirty pals that are still loaded
    pub fn modified_pals(&self) -> impl Iterator<Item = &Pal> {
        self.modified_pals.iter().filter_map(|id| self.pal(id))
    }

    pub fn is_player_dirty(&self, uid: &PlayerId) -> bool {
        self.modified_players.contains(uid)
    }

    pub fn is_pal_dirty(&self, id: &PalId) -> bool {
        self.modified_pals.contains(id)
    }

    /// Send every modified entity to the save service in one message.
    ///
    /// Every loaded player, its pals, and every guild base are swept; each
    /// `Modified` tag is reset to `None` before anything is sent, and the
    /// swept ids join the dirty sets until the service acknowledges them.
    /// If encoding, navigation or the send fails, the swept tags are set back
    /// to `Modified` so a later commit sends them again.
    ///
    /// The call returns once the message is queued; the outcome arrives later
    /// through [`AppState::handle_message`].
    pub async fn commit(&mut self) -> Result<CommitOutcome, StoreError> {
        for uid in self
            .modified_players
            .iter()
            .filter(|uid| !self.players.contains_key(*uid))
        {
            tracing::warn!(uid = %uid, "Dirty player is no longer loaded, skipping");
        }

        let payload = delta::sweep(&mut self.players, &mut self.guilds);

        if payload.is_empty() {
            tracing::info!("{}", NOTHING_TO_SAVE);
            self.notifications.notify(NOTHING_TO_SAVE, NotificationLevel::Info);
            return Ok(CommitOutcome::NothingToSave);
        }

        self.modified_players.extend(payload.player_ids());
        self.modified_pals.extend(payload.pal_ids());

        if let Err(err) = self.dispatch(&payload).await {
            tracing::warn!(error = %err, "Save file update not sent, keeping changes");
            self.restore_tags(&payload);
            self.notifications.notify(SAVE_NOT_SENT, NotificationLevel::Warning);
            return Err(err);
        }

        let progress = payload.progress_text();
        self.channel.set_message(Message::progress(progress.clone()));
        self.progress_message = progress;

        tracing::info!(
            pals = payload.pal_count(),
            players = payload.player_count(),
            "Sent save file update"
        );
        Ok(CommitOutcome::Sent {
            pals: payload.pal_count(),
            players: payload.player_count(),
        })
    }

    /// Encode the delta, switch to the loading view, and queue the message
    async fn dispatch(&self, payload: &UpdateSaveFileData) -> Result<(), StoreError> {
        let text = Message::update_save_file(payload)?.to_json()?;

        self.navigation
            .goto(Route::Loading)
            .await
            .map_err(StoreError::Navigation)?;

        self.channel.send(&text).map_err(StoreError::Channel)
    }

    /// Tag every swept entity `Modified` again after a failed send
    fn restore_tags(&mut self, payload: &UpdateSaveFileData) {
        for uid in payload.player_ids() {
            if let Some(player) = self.players.get_mut(&uid) {
                player.state = EntryState::Modified;
            }
        }
        for id in payload.pal_ids() {
            self.for_each_pal_copy(&id, |pal| pal.state = EntryState::Modified);
        }
    }

    /// Surface a message pushed back by the save service.
    ///
    /// Progress text replaces the current status, errors are recorded and
    /// shown, and an `update_save_file` acknowledgement clears dirty tracking.
    /// Everything else is handed back for the screen that asked for it.
    pub fn handle_message(&mut self, message: Message) -> InboundMessage {
        let inbound = InboundMessage::from(message);
        match &inbound {
            InboundMessage::Progress(text) => {
                self.progress_message = text.clone();
            }
            InboundMessage::Error(text) => {
                tracing::error!(error = %text, "Save service reported an error");
                self.last_error = Some(text.clone());
                self.notifications.notify(text, NotificationLevel::Error);
            }
            InboundMessage::SaveAcknowledged => {
                tracing::info!("Save service applied pending changes");
                self.reset_modified();
                self.progress_message.clear();
                self.notifications.notify(SAVE_APPLIED, NotificationLevel::Success);
            }
            InboundMessage::Other(other) => {
                tracing::debug!(kind = %other.kind, "Passing message through");
            }
        }
        inbound
    }

    // -------------------------------------------------------------------------
    // Resets
    // -------------------------------------------------------------------------

    /// Forget everything loaded from the current save (full reload)
    pub fn reset_state(&mut self) {
        self.players.clear();
        self.guilds.clear();
        self.selected_player = None;
        self.selected_pal = None;
        self.save_file = None;
        self.player_save_files.clear();
        self.modified_players.clear();
        self.modified_pals.clear();
    }

    /// Clear dirty tracking only, after the service confirmed a commit
    pub fn reset_modified(&mut self) {
        self.modified_players.clear();
        self.modified_pals.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use palkeeper_domain::{Base, BaseId};
    use palkeeper_shared::MessageType;
    use serde_json::json;

    use crate::ports::outbound::{MockNavigationPort, MockNotificationPort, MockSaveChannelPort};

    /// Everything the store pushed at its collaborators
    #[derive(Default)]
    struct Recorded {
        sent: Arc<Mutex<Vec<String>>>,
        status: Arc<Mutex<Option<Message>>>,
        notices: Arc<Mutex<Vec<(String, NotificationLevel)>>>,
        routes: Arc<Mutex<Vec<Route>>>,
    }

    impl Recorded {
        fn sent(&self) -> Vec<serde_json::Value> {
            self.sent
                .lock()
                .expect("lock")
                .iter()
                .map(|s| serde_json::from_str(s).expect("valid json"))
                .collect()
        }

        fn status(&self) -> Option<Message> {
            self.status.lock().expect("lock").clone()
        }

        fn notices(&self) -> Vec<(String, NotificationLevel)> {
            self.notices.lock().expect("lock").clone()
        }

        fn routes(&self) -> Vec<Route> {
            self.routes.lock().expect("lock").clone()
        }
    }

    fn recording_navigation(rec: &Recorded) -> MockNavigationPort {
        let routes = Arc::clone(&rec.routes);
        let mut navigation = MockNavigationPort::new();
        navigation.expect_goto().returning(move |route| {
            routes.lock().expect("lock").push(route);
            Ok(())
        });
        navigation
    }

    fn store_with_navigation(navigation: MockNavigationPort, rec: &Recorded) -> AppState {
        let mut channel = MockSaveChannelPort::new();
        let sent = Arc::clone(&rec.sent);
        channel.expect_send().returning(move |msg: &str| {
            sent.lock().expect("lock").push(msg.to_string());
            Ok(())
        });
        let status = Arc::clone(&rec.status);
        channel.expect_set_message().returning(move |msg| {
            *status.lock().expect("lock") = Some(msg);
        });
        let status = Arc::clone(&rec.status);
        channel
            .expect_message()
            .returning(move || status.lock().expect("lock").clone());

        let mut notifications = MockNotificationPort::new();
        let notices = Arc::clone(&rec.notices);
        notifications
            .expect_notify()
            .returning(move |msg: &str, level| {
                notices.lock().expect("lock").push((msg.to_string(), level));
            });

        AppState::new(
            Arc::new(channel),
            Arc::new(navigation),
            Arc::new(notifications),
        )
    }

    fn store() -> (AppState, Recorded) {
        let rec = Recorded::default();
        let state = store_with_navigation(recording_navigation(&rec), &rec);
        (state, rec)
    }

    fn player(nickname: &str) -> Player {
        Player::new(PlayerId::new(), nickname)
    }

    fn load_players(state: &mut AppState, players: Vec<Player>) {
        state
            .set_players(players.into_iter().map(|p| (p.uid, p)).collect())
            .expect("players load");
    }

    fn guild_hosting(pal: Pal) -> Guild {
        let mut base = Base::new(BaseId::new());
        base.insert_pal(pal);
        let mut guild = Guild::new(GuildId::new(), "Night Shift");
        guild.insert_base(base);
        guild
    }

    #[test]
    fn selecting_player_marks_dirty_and_clears_pal() {
        let (mut state, _) = store();
        let zoe = player("Zoe");
        let uid = zoe.uid;
        load_players(&mut state, vec![zoe]);

        let pal_id = PalId::new();
        state.set_selected_pal(Some(pal_id));
        state.set_selected_player(Some(uid));

        assert_eq!(state.selected_player_uid(), Some(uid));
        assert!(state.selected_pal().is_none());
        assert!(state.is_player_dirty(&uid));
        // Selection alone never changes the tag
        assert!(state.player(&uid).expect("loaded").state.is_none());

        state.set_selected_player(Some(uid));
        assert_eq!(state.modified_players().count(), 1);
    }

    #[test]
    fn clearing_player_selection_marks_nothing() {
        let (mut state, _) = store();
        state.set_selected_player(None);
        assert!(state.selected_player().is_none());
        assert_eq!(state.modified_players().count(), 0);
    }

    #[test]
    fn selecting_pal_marks_dirty() {
        let (mut state, _) = store();
        let mut zoe = player("Zoe");
        let pal_id = PalId::new();
        zoe.insert_pal(Pal::new(pal_id, "Foxparks"));
        load_players(&mut state, vec![zoe]);

        state.set_selected_pal(Some(pal_id));

        assert!(state.is_pal_dirty(&pal_id));
        assert_eq!(
            state.selected_pal().map(|p| p.character_id.as_str()),
            Some("Foxparks")
        );
    }

    #[tokio::test]
    async fn commit_sends_modified_player_without_pals() {
        let (mut state, rec) = store();
        let mut zoe = player("Zoe");
        let uid = zoe.uid;
        zoe.insert_pal(Pal::new(PalId::new(), "Foxparks"));
        load_players(&mut state, vec![zoe]);

        state.set_selected_player(Some(uid));
        state
            .update_player(uid, |p| p.level = 42)
            .expect("player loaded");

        let outcome = state.commit().await.expect("commit");

        assert_eq!(outcome, CommitOutcome::Sent { pals: 0, players: 1 });
        assert!(state.player(&uid).expect("loaded").state.is_none());
        assert_eq!(rec.routes(), vec![Route::Loading]);

        let sent = rec.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["type"], "update_save_file");
        assert!(sent[0]["data"].get("modified_pals").is_none());
        let wire_player = &sent[0]["data"]["modified_players"][uid.to_string()];
        assert_eq!(wire_player["level"], 42);
        assert!(wire_player.get("pals").is_none());
        assert!(wire_player.get("state").is_none());

        let status = rec.status().expect("status set");
        assert_eq!(status.kind, MessageType::ProgressMessage);
        assert_eq!(status.text().as_deref(), Some("Updating modified players"));
        assert_eq!(state.progress_message(), "Updating modified players");
    }

    #[tokio::test]
    async fn commit_with_nothing_modified_sends_nothing() {
        let (mut state, rec) = store();
        let zoe = player("Zoe");
        let uid = zoe.uid;
        load_players(&mut state, vec![zoe]);
        state.set_selected_player(Some(uid));

        let outcome = state.commit().await.expect("commit");

        assert_eq!(outcome, CommitOutcome::NothingToSave);
        assert!(rec.sent().is_empty());
        assert!(rec.routes().is_empty());
        assert!(rec.status().is_none());
        assert_eq!(
            rec.notices(),
            vec![(NOTHING_TO_SAVE.to_string(), NotificationLevel::Info)]
        );
    }

    #[tokio::test]
    async fn second_commit_is_a_no_op() {
        let (mut state, rec) = store();
        let zoe = player("Zoe");
        let uid = zoe.uid;
        load_players(&mut state, vec![zoe]);
        state.update_player(uid, |p| p.exp = 10).expect("loaded");

        let first = state.commit().await.expect("first commit");
        let second = state.commit().await.expect("second commit");

        assert!(matches!(first, CommitOutcome::Sent { .. }));
        assert_eq!(second, CommitOutcome::NothingToSave);
        assert_eq!(rec.sent().len(), 1);
    }

    #[tokio::test]
    async fn pal_reachable_twice_is_sent_once() {
        let (mut state, rec) = store();
        let mut zoe = player("Zoe");
        let uid = zoe.uid;
        let pal_id = PalId::new();
        let pal = Pal::new(pal_id, "Foxparks");
        zoe.insert_pal(pal.clone());
        load_players(&mut state, vec![zoe]);
        let guild = guild_hosting(pal);
        state
            .set_guilds(HashMap::from([(guild.id, guild)]))
            .expect("guilds load");

        state.set_selected_player(Some(uid));
        state
            .update_pal(pal_id, |p| p.nickname = Some("Sparky".into()))
            .expect("pal loaded");

        state.commit().await.expect("commit");

        let sent = rec.sent();
        let pals = sent[0]["data"]["modified_pals"]
            .as_object()
            .expect("pals object");
        assert_eq!(pals.len(), 1);
        assert_eq!(pals[&pal_id.to_string()]["nickname"], "Sparky");
        // Player was selected but never edited
        assert!(sent[0]["data"].get("modified_players").is_none());
        assert_eq!(
            rec.status().and_then(|m| m.text()).as_deref(),
            Some("Updating modified pals")
        );
        assert!(state.pal(&pal_id).expect("loaded").state.is_none());
    }

    #[tokio::test]
    async fn update_pal_reaches_payload_without_selecting_owner() {
        let (mut state, rec) = store();
        let mut zoe = player("Zoe");
        let uid = zoe.uid;
        let pal_id = PalId::new();
        zoe.insert_pal(Pal::new(pal_id, "Lamball"));
        load_players(&mut state, vec![zoe]);

        state.update_pal(pal_id, |p| p.level = 50).expect("loaded");
        assert!(state.is_player_dirty(&uid));
        assert!(state.player(&uid).expect("loaded").state.is_none());

        let outcome = state.commit().await.expect("commit");

        assert_eq!(outcome, CommitOutcome::Sent { pals: 1, players: 0 });
        assert_eq!(
            rec.sent()[0]["data"]["modified_pals"][pal_id.to_string()]["level"],
            50
        );
    }

    #[tokio::test]
    async fn modified_pals_and_players_share_one_message() {
        let (mut state, rec) = store();
        let zoe = player("Zoe");
        let uid = zoe.uid;
        load_players(&mut state, vec![zoe]);
        let pal_id = PalId::new();
        let guild = guild_hosting(Pal::new(pal_id, "Cattiva"));
        state
            .set_guilds(HashMap::from([(guild.id, guild)]))
            .expect("guilds load");

        state.update_player(uid, |p| p.nickname = "Zed".into()).expect("loaded");
        state.update_pal(pal_id, |p| p.is_lucky = true).expect("loaded");

        let outcome = state.commit().await.expect("commit");

        assert_eq!(outcome, CommitOutcome::Sent { pals: 1, players: 1 });
        let sent = rec.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0]["data"]["modified_players"][uid.to_string()]["nickname"],
            json!("Zed")
        );
        assert_eq!(
            sent[0]["data"]["modified_pals"][pal_id.to_string()]["is_lucky"],
            json!(true)
        );
        assert_eq!(
            rec.status().and_then(|m| m.text()).as_deref(),
            Some("Updating modified pals and players")
        );
    }

    #[tokio::test]
    async fn navigation_failure_keeps_changes_for_retry() {
        let rec = Recorded::default();
        let attempts = Arc::new(Mutex::new(0_u32));
        let counter = Arc::clone(&attempts);
        let mut navigation = MockNavigationPort::new();
        navigation.expect_goto().returning(move |_| {
            let mut n = counter.lock().expect("lock");
            *n += 1;
            if *n == 1 {
                Err(anyhow::anyhow!("router gone"))
            } else {
                Ok(())
            }
        });
        let mut state = store_with_navigation(navigation, &rec);

        let mut zoe = player("Zoe");
        let uid = zoe.uid;
        let pal_id = PalId::new();
        zoe.insert_pal(Pal::new(pal_id, "Lamball"));
        load_players(&mut state, vec![zoe]);
        state.update_player(uid, |p| p.hp = 1).expect("loaded");
        state.update_pal(pal_id, |p| p.hp = 2).expect("loaded");

        let err = state.commit().await.expect_err("navigation fails");

        assert!(matches!(err, StoreError::Navigation(_)));
        assert!(rec.sent().is_empty());
        assert!(rec.status().is_none());
        assert!(state.player(&uid).expect("loaded").is_modified());
        assert!(state.pal(&pal_id).expect("loaded").is_modified());
        assert_eq!(
            rec.notices(),
            vec![(SAVE_NOT_SENT.to_string(), NotificationLevel::Warning)]
        );

        let outcome = state.commit().await.expect("retry");

        assert_eq!(outcome, CommitOutcome::Sent { pals: 1, players: 1 });
        assert_eq!(rec.sent().len(), 1);
    }

    #[tokio::test]
    async fn commit_sends_player_loaded_as_modified() {
        let (mut state, rec) = store();
        let mut p1 = player("P1");
        let uid = p1.uid;
        p1.state = EntryState::Modified;
        load_players(&mut state, vec![p1]);

        let outcome = state.commit().await.expect("commit");

        assert_eq!(outcome, CommitOutcome::Sent { pals: 0, players: 1 });
        assert!(state.player(&uid).expect("loaded").state.is_none());
        let sent = rec.sent();
        assert_eq!(
            sent[0]["data"]["modified_players"][uid.to_string()]["nickname"],
            "P1"
        );
        assert!(sent[0]["data"].get("modified_pals").is_none());
        assert_eq!(
            rec.status().and_then(|m| m.text()).as_deref(),
            Some("Updating modified players")
        );
    }

    #[tokio::test]
    async fn commit_sends_modified_pal_under_unselected_player() {
        let (mut state, rec) = store();
        let mut zoe = player("Zoe");
        let pal_id = PalId::new();
        let mut pal = Pal::new(pal_id, "Foxparks");
        pal.state = EntryState::Modified;
        zoe.insert_pal(pal);
        load_players(&mut state, vec![zoe]);

        let outcome = state.commit().await.expect("commit");

        assert_eq!(outcome, CommitOutcome::Sent { pals: 1, players: 0 });
        assert!(state.pal(&pal_id).expect("loaded").state.is_none());
        assert!(rec.sent()[0]["data"]["modified_pals"]
            .get(pal_id.to_string())
            .is_some());
    }

    #[test]
    fn loading_registers_tagged_entities_as_dirty() {
        let (mut state, _) = store();
        let mut zoe = player("Zoe");
        let zoe_uid = zoe.uid;
        let owned_id = PalId::new();
        let mut owned = Pal::new(owned_id, "Foxparks");
        owned.state = EntryState::Modified;
        zoe.insert_pal(owned);
        let clean = player("Clean");
        let clean_uid = clean.uid;
        load_players(&mut state, vec![zoe, clean]);

        let based_id = PalId::new();
        let mut based = Pal::new(based_id, "Cattiva");
        based.state = EntryState::Added;
        let guild = guild_hosting(based);
        state
            .set_guilds(HashMap::from([(guild.id, guild)]))
            .expect("guilds load");

        assert!(state.is_player_dirty(&zoe_uid));
        assert!(!state.is_player_dirty(&clean_uid));
        assert!(state.is_pal_dirty(&owned_id));
        assert!(state.is_pal_dirty(&based_id));
    }

    #[tokio::test]
    async fn swept_guild_pal_stays_dirty_until_acknowledged() {
        let (mut state, _) = store();
        let pal_id = PalId::new();
        let guild = guild_hosting(Pal::new(pal_id, "Cattiva"));
        state
            .set_guilds(HashMap::from([(guild.id, guild)]))
            .expect("guilds load");
        // Tag the base copy directly, bypassing update_pal
        state.reset_modified();
        for base in state.guilds.values_mut().flat_map(|g| g.bases.values_mut()) {
            if let Some(pal) = base.pals.get_mut(&pal_id) {
                pal.state = EntryState::Modified;
            }
        }
        assert!(!state.is_pal_dirty(&pal_id));

        let outcome = state.commit().await.expect("commit");

        assert_eq!(outcome, CommitOutcome::Sent { pals: 1, players: 0 });
        assert!(state.is_pal_dirty(&pal_id));
        assert_eq!(state.modified_pals().count(), 1);

        state.handle_message(Message::request(MessageType::UpdateSaveFile));
        assert!(!state.is_pal_dirty(&pal_id));
    }

    #[tokio::test]
    async fn dirty_player_no_longer_loaded_is_skipped() {
        let (mut state, rec) = store();
        state.set_selected_player(Some(PlayerId::new()));

        let outcome = state.commit().await.expect("commit");

        assert_eq!(outcome, CommitOutcome::NothingToSave);
        assert!(rec.sent().is_empty());
    }

    #[test]
    fn loading_rejects_mismatched_keys() {
        let (mut state, _) = store();
        let zoe = player("Zoe");
        let err = state
            .set_players(HashMap::from([(PlayerId::new(), zoe)]))
            .expect_err("key mismatch");
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(state.players().is_empty());

        let mut tagged = player("Tagged");
        let tagged_uid = tagged.uid;
        tagged.state = EntryState::Modified;
        let stray = Pal::new(PalId::new(), "Foxparks");
        tagged.pals = Some(HashMap::from([(PalId::new(), stray)]));
        let err = state
            .set_players(HashMap::from([(tagged_uid, tagged)]))
            .expect_err("pal key mismatch");
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(!state.is_player_dirty(&tagged_uid));

        let guild = Guild::new(GuildId::new(), "Night Shift");
        let err = state
            .set_guilds(HashMap::from([(GuildId::new(), guild)]))
            .expect_err("guild key mismatch");
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(state.guilds().is_empty());
    }

    #[test]
    fn update_player_leaves_owned_pals_alone() {
        let (mut state, _) = store();
        let mut zoe = player("Zoe");
        let uid = zoe.uid;
        let pal_id = PalId::new();
        zoe.insert_pal(Pal::new(pal_id, "Foxparks"));
        load_players(&mut state, vec![zoe]);

        state
            .update_player(uid, |p| {
                assert!(p.pals.is_none());
                p.pals = Some(HashMap::new());
                p.level = 9;
            })
            .expect("loaded");

        let zoe = state.player(&uid).expect("loaded");
        assert_eq!(zoe.level, 9);
        assert_eq!(zoe.pal_count(), 1);
        assert!(zoe.pal(&pal_id).expect("pal kept").state.is_none());
    }

    #[test]
    fn update_unknown_entities_is_not_found() {
        let (mut state, _) = store();
        let err = state
            .update_player(PlayerId::new(), |_| {})
            .expect_err("unknown player");
        assert!(err.is_not_found());

        let err = state
            .update_pal(PalId::new(), |_| {})
            .expect_err("unknown pal");
        assert!(err.is_not_found());
    }

    #[test]
    fn reset_modified_keeps_loaded_data() {
        let (mut state, _) = store();
        let zoe = player("Zoe");
        let uid = zoe.uid;
        load_players(&mut state, vec![zoe]);
        let guild = guild_hosting(Pal::new(PalId::new(), "Cattiva"));
        state
            .set_guilds(HashMap::from([(guild.id, guild)]))
            .expect("guilds load");
        state.set_selected_player(Some(uid));
        state.set_selected_pal(Some(PalId::new()));

        state.reset_modified();

        assert_eq!(state.modified_players().count(), 0);
        assert!(!state.is_player_dirty(&uid));
        assert_eq!(state.players().len(), 1);
        assert_eq!(state.guilds().len(), 1);
        assert_eq!(state.selected_player_uid(), Some(uid));
    }

    #[test]
    fn reset_state_clears_everything() {
        let (mut state, _) = store();
        let zoe = player("Zoe");
        let uid = zoe.uid;
        load_players(&mut state, vec![zoe]);
        let guild = guild_hosting(Pal::new(PalId::new(), "Cattiva"));
        state
            .set_guilds(HashMap::from([(guild.id, guild)]))
            .expect("guilds load");
        state.set_save_file(Some(SaveFile::new("Level.sav")));
        state.set_player_save_files(vec![SaveFile::new("0001.sav")]);
        state.set_selected_player(Some(uid));
        let pal_id = PalId::new();
        state.set_selected_pal(Some(pal_id));

        state.reset_state();

        assert!(state.players().is_empty());
        assert!(state.guilds().is_empty());
        assert!(state.selected_player_uid().is_none());
        assert!(state.selected_pal().is_none());
        assert!(state.save_file().is_none());
        assert!(state.player_save_files().is_empty());
        assert!(!state.is_player_dirty(&uid));
        assert!(!state.is_pal_dirty(&pal_id));
    }

    #[test]
    fn progress_message_replaces_status() {
        let (mut state, _) = store();
        state.set_progress_message("Updating modified pals");

        let inbound = state.handle_message(Message::progress("Writing Level.sav"));

        assert_eq!(inbound, InboundMessage::Progress("Writing Level.sav".into()));
        assert_eq!(state.progress_message(), "Writing Level.sav");
    }

    #[test]
    fn error_message_is_recorded_and_shown() {
        let (mut state, rec) = store();

        state.handle_message(Message::new(
            MessageType::Error,
            json!({ "message": "Save is locked" }),
        ));

        assert_eq!(state.last_error(), Some("Save is locked"));
        assert_eq!(
            rec.notices(),
            vec![("Save is locked".to_string(), NotificationLevel::Error)]
        );
    }

    #[test]
    fn acknowledgement_clears_dirty_sets() {
        let (mut state, rec) = store();
        let zoe = player("Zoe");
        let uid = zoe.uid;
        load_players(&mut state, vec![zoe]);
        state.set_selected_player(Some(uid));
        state.set_progress_message("Updating modified players");

        let inbound = state.handle_message(Message::request(MessageType::UpdateSaveFile));

        assert_eq!(inbound, InboundMessage::SaveAcknowledged);
        assert!(!state.is_player_dirty(&uid));
        assert_eq!(state.players().len(), 1);
        assert!(state.progress_message().is_empty());
        assert_eq!(
            rec.notices(),
            vec![(SAVE_APPLIED.to_string(), NotificationLevel::Success)]
        );
    }

    #[test]
    fn other_messages_pass_through() {
        let (mut state, rec) = store();
        let message = Message::new(MessageType::GetPlayers, json!({}));

        let inbound = state.handle_message(message.clone());

        assert_eq!(inbound, InboundMessage::Other(message));
        assert!(rec.notices().is_empty());
    }

    #[test]
    fn settings_default_to_english() {
        let (mut state, _) = store();
        assert_eq!(state.settings().language, "en");

        state.set_version("0.9.1");
        state.set_clipboard_item(Some(ItemContainerSlot {
            slot_index: 3,
            static_id: "Wood".into(),
            count: 10,
            dynamic_item: None,
        }));

        assert_eq!(state.version(), "0.9.1");
        assert_eq!(state.clipboard_item().map(|i| i.count), Some(10));
    }
}
