use clap::Parser;

/// Download the animated artwork of an album, artist or playlist
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Video shape: `tall` or `square`
    pub shape: String,

    /// How many extra times to loop the video (0 keeps it as is)
    pub loops: u32,

    /// Catalog URL, e.g. https://music.apple.com/us/album/positions/1553944254
    pub url: String,
}
