use serde::Deserialize;

/// Track record as returned by `track.search` and `matcher.track.get`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MxmTrack {
    #[serde(default)]
    pub track_id: u64,
    #[serde(default)]
    pub track_name: String,
    #[serde(default)]
    pub artist_name: String,
    #[serde(default)]
    pub album_coverart_350x350: Option<String>,
}

/// The three parts of a `macro.subtitles.get` response we care about.
#[derive(Debug, Clone, Default)]
pub struct MacroBundle {
    pub track: Option<MxmTrack>,
    pub lyrics_body: Option<String>,
    pub subtitle_body: Option<String>,
}
