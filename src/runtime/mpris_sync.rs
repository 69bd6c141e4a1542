use crate::mpris::MprisHandle;
use crate::player::PlayerSnapshot;

pub fn update_mpris(mpris: &MprisHandle, snapshot: &PlayerSnapshot) {
    mpris.set_now_playing(snapshot.current_track.as_ref(), snapshot.duration);
    mpris.set_playback(snapshot.phase);
}
