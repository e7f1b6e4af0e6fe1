use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Album,
    Artist,
    Playlist,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Album => "album",
            ResourceKind::Artist => "artist",
            ResourceKind::Playlist => "playlist",
        }
    }

    /// Path segment used by the catalog API, e.g. `albums`.
    pub fn api_segment(&self) -> String {
        format!("{}s", self.as_str())
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoShape {
    Tall,
    Square,
}

impl FromStr for VideoShape {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tall" => Ok(VideoShape::Tall),
            "square" => Ok(VideoShape::Square),
            _ => Err(Error::UnsupportedShape(s.to_string())),
        }
    }
}

impl fmt::Display for VideoShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoShape::Tall => f.write_str("tall"),
            VideoShape::Square => f.write_str("square"),
        }
    }
}

/// A catalog entity addressed by a web player URL such as
/// `https://music.apple.com/us/album/positions/1553944254`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    pub kind: ResourceKind,
    pub id: String,
    pub country: String,
    pub name: String,
}

impl ResourceRef {
    pub fn parse(url: &str) -> Result<Self> {
        let segments: Vec<&str> = url.trim().split('/').collect();
        if segments.len() < 7 {
            return Err(Error::MalformedUrl(format!(
                "{url}: expected .../<country>/<type>/<name>/<id>"
            )));
        }

        let country = segments[3];
        let kind = match segments[4] {
            "album" => ResourceKind::Album,
            "artist" => ResourceKind::Artist,
            "playlist" => ResourceKind::Playlist,
            other => {
                return Err(Error::MalformedUrl(format!(
                    "{url}: unknown resource type '{other}'"
                )));
            }
        };
        let name = segments[5];
        // share links carry `?i=...` or `?l=...`
        let id = segments[6]
            .split(['?', '#'])
            .next()
            .unwrap_or_default();

        if country.is_empty() || name.is_empty() || id.is_empty() {
            return Err(Error::MalformedUrl(format!("{url}: empty path segment")));
        }

        Ok(Self {
            kind,
            id: id.to_string(),
            country: country.to_string(),
            name: name.to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditorialAsset {
    pub video: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorialVideo {
    #[serde(rename = "motionSquareVideo1x1")]
    pub motion_square_video_1x1: Option<EditorialAsset>,
    #[serde(rename = "motionArtistWide16x9")]
    pub motion_artist_wide_16x9: Option<EditorialAsset>,
    pub motion_detail_tall: Option<EditorialAsset>,
    #[serde(rename = "motionArtistSquare1x1")]
    pub motion_artist_square_1x1: Option<EditorialAsset>,
    pub motion_detail_square: Option<EditorialAsset>,
    #[serde(rename = "motionArtistFullscreen16x9")]
    pub motion_artist_fullscreen_16x9: Option<EditorialAsset>,
}

fn video_of(asset: &Option<EditorialAsset>) -> Option<&str> {
    asset
        .as_ref()
        .and_then(|a| a.video.as_deref())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceAttributes {
    pub name: Option<String>,
    pub artist_name: Option<String>,
    pub release_date: Option<String>,
    pub last_modified_date: Option<String>,
    #[serde(default)]
    pub editorial_video: EditorialVideo,
}

/// Picks the manifest URL for `shape`.
///
/// Artists have a preferred and a fallback asset per shape; albums and
/// playlists have exactly one candidate.
pub fn resolve_manifest_url(
    attributes: &ResourceAttributes,
    shape: VideoShape,
    kind: ResourceKind,
) -> Result<String> {
    let ev = &attributes.editorial_video;
    let candidates = match (shape, kind) {
        (VideoShape::Tall, ResourceKind::Artist) => [
            video_of(&ev.motion_artist_fullscreen_16x9),
            video_of(&ev.motion_artist_wide_16x9),
        ],
        (VideoShape::Tall, _) => [video_of(&ev.motion_detail_tall), None],
        (VideoShape::Square, ResourceKind::Artist) => [
            video_of(&ev.motion_artist_square_1x1),
            video_of(&ev.motion_detail_square),
        ],
        (VideoShape::Square, _) => [video_of(&ev.motion_square_video_1x1), None],
    };

    candidates
        .into_iter()
        .flatten()
        .next()
        .map(str::to_string)
        .ok_or(Error::MissingVideo { shape, kind })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(url: &str) -> Option<EditorialAsset> {
        Some(EditorialAsset {
            video: Some(url.to_string()),
        })
    }

    fn with_video(editorial_video: EditorialVideo) -> ResourceAttributes {
        ResourceAttributes {
            editorial_video,
            ..Default::default()
        }
    }

    #[test]
    fn parses_fixed_segment_positions() {
        let r = ResourceRef::parse("https://music.apple.com/us/album/positions/1553944254").unwrap();
        assert_eq!(
            r,
            ResourceRef {
                kind: ResourceKind::Album,
                id: "1553944254".into(),
                country: "us".into(),
                name: "positions".into(),
            }
        );

        let r = ResourceRef::parse("https://music.apple.com/gb/artist/ariana-grande/412778295").unwrap();
        assert_eq!(r.kind, ResourceKind::Artist);
        assert_eq!(r.country, "gb");

        let r = ResourceRef::parse("https://music.apple.com/us/playlist/todays-hits/pl.f4d106fed2bd41149aaacabb233eb5eb").unwrap();
        assert_eq!(r.kind, ResourceKind::Playlist);
        assert_eq!(r.id, "pl.f4d106fed2bd41149aaacabb233eb5eb");
    }

    #[test]
    fn strips_query_from_id() {
        let r = ResourceRef::parse("https://music.apple.com/us/album/positions/1553944254?l=en").unwrap();
        assert_eq!(r.id, "1553944254");
    }

    #[test]
    fn rejects_short_urls() {
        for url in [
            "",
            "https://music.apple.com",
            "https://music.apple.com/us/album/positions",
        ] {
            assert!(
                matches!(ResourceRef::parse(url), Err(Error::MalformedUrl(_))),
                "{url} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_unknown_type_and_empty_segments() {
        assert!(matches!(
            ResourceRef::parse("https://music.apple.com/us/song/positions/1"),
            Err(Error::MalformedUrl(_))
        ));
        assert!(matches!(
            ResourceRef::parse("https://music.apple.com/us/album//1"),
            Err(Error::MalformedUrl(_))
        ));
    }

    #[test]
    fn api_segment_is_plural() {
        assert_eq!(ResourceKind::Album.api_segment(), "albums");
        assert_eq!(ResourceKind::Artist.api_segment(), "artists");
        assert_eq!(ResourceKind::Playlist.api_segment(), "playlists");
    }

    #[test]
    fn shape_parsing() {
        assert_eq!("tall".parse::<VideoShape>().unwrap(), VideoShape::Tall);
        assert_eq!("Square".parse::<VideoShape>().unwrap(), VideoShape::Square);
        assert!(matches!(
            "wide".parse::<VideoShape>(),
            Err(Error::UnsupportedShape(s)) if s == "wide"
        ));
    }

    #[test]
    fn artist_tall_prefers_fullscreen() {
        let attrs = with_video(EditorialVideo {
            motion_artist_fullscreen_16x9: asset("http://host/full.m3u8"),
            motion_artist_wide_16x9: asset("http://host/wide.m3u8"),
            ..Default::default()
        });
        assert_eq!(
            resolve_manifest_url(&attrs, VideoShape::Tall, ResourceKind::Artist).unwrap(),
            "http://host/full.m3u8"
        );
    }

    #[test]
    fn artist_tall_falls_back_to_wide() {
        let attrs = with_video(EditorialVideo {
            motion_artist_fullscreen_16x9: Some(EditorialAsset { video: None }),
            motion_artist_wide_16x9: asset("http://host/wide.m3u8"),
            ..Default::default()
        });
        assert_eq!(
            resolve_manifest_url(&attrs, VideoShape::Tall, ResourceKind::Artist).unwrap(),
            "http://host/wide.m3u8"
        );
    }

    #[test]
    fn artist_tall_without_candidates_fails() {
        let attrs = with_video(EditorialVideo {
            motion_detail_tall: asset("http://host/tall.m3u8"),
            ..Default::default()
        });
        assert!(matches!(
            resolve_manifest_url(&attrs, VideoShape::Tall, ResourceKind::Artist),
            Err(Error::MissingVideo {
                shape: VideoShape::Tall,
                kind: ResourceKind::Artist
            })
        ));
    }

    #[test]
    fn artist_square_falls_back_to_detail_square() {
        let attrs = with_video(EditorialVideo {
            motion_detail_square: asset("http://host/detail.m3u8"),
            ..Default::default()
        });
        assert_eq!(
            resolve_manifest_url(&attrs, VideoShape::Square, ResourceKind::Artist).unwrap(),
            "http://host/detail.m3u8"
        );
    }

    #[test]
    fn album_square_uses_square_video_only() {
        let attrs = with_video(EditorialVideo {
            motion_square_video_1x1: asset("http://host/a.m3u8"),
            motion_artist_square_1x1: asset("http://host/b.m3u8"),
            motion_detail_square: asset("http://host/c.m3u8"),
            motion_detail_tall: asset("http://host/d.m3u8"),
            ..Default::default()
        });
        assert_eq!(
            resolve_manifest_url(&attrs, VideoShape::Square, ResourceKind::Album).unwrap(),
            "http://host/a.m3u8"
        );
    }

    #[test]
    fn playlist_tall_requires_detail_tall() {
        let attrs = with_video(EditorialVideo {
            motion_artist_fullscreen_16x9: asset("http://host/full.m3u8"),
            ..Default::default()
        });
        assert!(matches!(
            resolve_manifest_url(&attrs, VideoShape::Tall, ResourceKind::Playlist),
            Err(Error::MissingVideo { .. })
        ));
    }

    #[test]
    fn empty_video_string_counts_as_absent() {
        let attrs = with_video(EditorialVideo {
            motion_artist_square_1x1: asset(""),
            motion_detail_square: asset("http://host/detail.m3u8"),
            ..Default::default()
        });
        assert_eq!(
            resolve_manifest_url(&attrs, VideoShape::Square, ResourceKind::Artist).unwrap(),
            "http://host/detail.m3u8"
        );
    }

    #[test]
    fn deserializes_catalog_field_names() {
        let attrs: ResourceAttributes = serde_json::from_str(
            r#"{
                "name": "Positions",
                "artistName": "Ariana Grande",
                "releaseDate": "2020-10-30",
                "editorialVideo": {
                    "motionDetailTall": {"video": "http://host/tall.m3u8", "previewFrame": {}},
                    "motionSquareVideo1x1": {"video": "http://host/square.m3u8"},
                    "motionArtistFullscreen16x9": {"video": "http://host/full.m3u8"}
                }
            }"#,
        )
        .unwrap();

        assert_eq!(attrs.artist_name.as_deref(), Some("Ariana Grande"));
        assert_eq!(
            video_of(&attrs.editorial_video.motion_detail_tall),
            Some("http://host/tall.m3u8")
        );
        assert_eq!(
            video_of(&attrs.editorial_video.motion_square_video_1x1),
            Some("http://host/square.m3u8")
        );
        assert_eq!(
            video_of(&attrs.editorial_video.motion_artist_fullscreen_16x9),
            Some("http://host/full.m3u8")
        );
        assert!(attrs.editorial_video.motion_artist_wide_16x9.is_none());
    }
}
