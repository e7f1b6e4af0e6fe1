use m3u8_rs::Playlist;
use reqwest::header::HeaderMap;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt};
use url::Url;

use crate::api::Transport;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct ManifestVariant {
    pub index: usize,
    pub width: Option<u64>,
    pub height: Option<u64>,
    /// Bits per second, from `BANDWIDTH`.
    pub bandwidth: u64,
    pub codecs: Option<String>,
    pub frame_rate: Option<f64>,
    pub uri: String,
}

impl ManifestVariant {
    pub fn resolution(&self) -> String {
        match (self.width, self.height) {
            (Some(w), Some(h)) => format!("{w}x{h}"),
            _ => String::new(),
        }
    }
}

/// `round(bandwidth / 10000) / 100` Mb/s, without trailing zeros.
pub fn format_bitrate(bandwidth: u64) -> String {
    let hundredths = (bandwidth as f64 / 10_000.0).round() as u64;
    let (whole, frac) = (hundredths / 100, hundredths % 100);
    if frac == 0 {
        format!("{whole} Mb/s")
    } else if frac % 10 == 0 {
        format!("{whole}.{} Mb/s", frac / 10)
    } else {
        format!("{whole}.{frac:02} Mb/s")
    }
}

pub fn parse_variants(manifest_url: &str, body: &[u8]) -> Result<Vec<ManifestVariant>> {
    let base = Url::parse(manifest_url)
        .map_err(|e| Error::ManifestParse(format!("bad manifest URL {manifest_url}: {e}")))?;
    let playlist = m3u8_rs::parse_playlist_res(body)
        .map_err(|e| Error::ManifestParse(e.to_string()))?;

    let master = match playlist {
        Playlist::MasterPlaylist(pl) => pl,
        Playlist::MediaPlaylist(_) => return Err(Error::EmptyManifest),
    };

    let variants = master
        .variants
        .into_iter()
        .filter(|v| !v.is_i_frame)
        .enumerate()
        .map(|(index, v)| {
            let uri = base
                .join(&v.uri)
                .map_err(|e| Error::ManifestParse(format!("bad variant URI {}: {e}", v.uri)))?;
            Ok(ManifestVariant {
                index,
                width: v.resolution.map(|r| r.width),
                height: v.resolution.map(|r| r.height),
                bandwidth: v.bandwidth,
                codecs: v.codecs,
                frame_rate: v.frame_rate,
                uri: uri.to_string(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if variants.is_empty() {
        return Err(Error::EmptyManifest);
    }
    Ok(variants)
}

pub async fn fetch_variants(
    transport: &dyn Transport,
    manifest_url: &str,
) -> Result<Vec<ManifestVariant>> {
    let res = transport.get(manifest_url, HeaderMap::new()).await?;
    if !res.is_success() {
        return Err(Error::ManifestParse(format!(
            "{manifest_url} returned HTTP {}",
            res.status
        )));
    }
    parse_variants(manifest_url, res.body.as_bytes())
}

#[derive(Tabled)]
struct VariantRow {
    #[tabled(rename = "Id")]
    id: usize,
    #[tabled(rename = "Resolution")]
    resolution: String,
    #[tabled(rename = "Bitrate")]
    bitrate: String,
    #[tabled(rename = "Codec")]
    codec: String,
    #[tabled(rename = "Fps")]
    fps: String,
}

pub fn variants_table(variants: &[ManifestVariant]) -> String {
    let rows = variants.iter().map(|v| VariantRow {
        id: v.index,
        resolution: v.resolution(),
        bitrate: format_bitrate(v.bandwidth),
        codec: v.codecs.clone().unwrap_or_default(),
        fps: v.frame_rate.map(|f| f.to_string()).unwrap_or_default(),
    });
    Table::new(rows).with(Style::modern()).to_string()
}

pub fn parse_selection(input: &str) -> Result<i64> {
    let input = input.trim();
    input
        .parse::<i64>()
        .map_err(|_| Error::InvalidInput(input.to_string()))
}

pub fn select_variant(variants: &[ManifestVariant], index: i64) -> Result<&ManifestVariant> {
    usize::try_from(index)
        .ok()
        .and_then(|i| variants.get(i))
        .ok_or(Error::IndexOutOfRange {
            index,
            len: variants.len(),
        })
}

/// Prints the variant table and blocks for one line of input.
pub async fn prompt_variant<'v, R>(
    variants: &'v [ManifestVariant],
    input: &mut R,
) -> Result<&'v ManifestVariant>
where
    R: AsyncBufRead + Unpin,
{
    println!("{}", variants_table(variants));

    let mut stdout = tokio::io::stdout();
    stdout.write_all(b"Enter Id: ").await?;
    stdout.flush().await?;

    let mut line = String::new();
    input.read_line(&mut line).await?;
    select_variant(variants, parse_selection(&line)?)
}
