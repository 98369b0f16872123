//! Commit sweep: collect every modified entity reachable from the store.
//!
//! Players are swept before guilds. A pal reachable both through its owner
//! and through a guild base therefore ends up with the base copy in the
//! payload; callers may rely on that order.

use std::collections::HashMap;

use palkeeper_domain::{EntryState, Guild, GuildId, Pal, PalId, Player, PlayerId};
use palkeeper_shared::UpdateSaveFileData;

/// Sweep every loaded player, its nested pals, and every guild base for
/// entities tagged `Modified`, resetting each tag to `None` as it is
/// collected.
///
/// Players are visited in uid order so the payload is deterministic.
pub(crate) fn sweep(
    players: &mut HashMap<PlayerId, Player>,
    guilds: &mut HashMap<GuildId, Guild>,
) -> UpdateSaveFileData {
    let mut modified_players: Vec<(PlayerId, Player)> = Vec::new();
    let mut modified_pals: Vec<(PalId, Pal)> = Vec::new();

    let mut entries: Vec<(&PlayerId, &mut Player)> = players.iter_mut().collect();
    entries.sort_by_key(|(uid, _)| **uid);

    for (uid, player) in entries {
        if player.is_modified() {
            player.state = EntryState::None;
            modified_players.push((*uid, player.without_pals()));
        }

        if let Some(pals) = player.pals.as_mut() {
            collect_modified(pals.values_mut(), &mut modified_pals);
        }
    }

    for guild in guilds.values_mut() {
        collect_modified(guild.pals_mut(), &mut modified_pals);
    }

    tracing::debug!(
        pals = modified_pals.len(),
        players = modified_players.len(),
        "Swept modified entities"
    );

    UpdateSaveFileData::from_entries(modified_pals, modified_players)
}

fn collect_modified<'a>(pals: impl Iterator<Item = &'a mut Pal>, out: &mut Vec<(PalId, Pal)>) {
    for pal in pals.filter(|pal| pal.is_modified()) {
        pal.state = EntryState::None;
        out.push((pal.instance_id, pal.clone()));
    }
}
