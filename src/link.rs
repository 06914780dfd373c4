//! Video link recognition for inbound chat text.
//!
//! Three URL shapes are accepted, over `http` or `https`:
//!
//! - `youtube.com/watch?v=<id>` (with or without `www.`)
//! - `youtube.com/shorts/<id>` (with or without `www.`)
//! - `youtu.be/<id>`

// self
use crate::{_prelude::*, token::Reference};

const WATCH_HOSTS: [&str; 2] = ["youtube.com", "www.youtube.com"];
const SHORT_HOST: &str = "youtu.be";

/// Errors produced while recognising a video link.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum LinkError {
	/// The text is not a URL at all.
	#[error("Link is not a valid URL.")]
	Malformed {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Only `http` and `https` links are accepted.
	#[error("Link scheme `{scheme}` is not supported.")]
	UnsupportedScheme {
		/// Scheme that was supplied.
		scheme: String,
	},
	/// The host is not a supported video platform.
	#[error("Link host is not a supported video platform.")]
	UnsupportedHost,
	/// The URL points at a supported host but not at a video.
	#[error("Link does not identify a video.")]
	MissingVideoId,
}

/// URL shape a [`VideoLink`] was recognised from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LinkKind {
	/// `youtube.com/watch?v=<id>`.
	Watch,
	/// `youtube.com/shorts/<id>`.
	Short,
	/// `youtu.be/<id>`.
	Shortened,
}

/// A recognised video link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoLink {
	/// Normalized URL as parsed from the inbound text.
	pub url: Url,
	/// Platform video identifier.
	pub video_id: String,
	/// URL shape the link matched.
	pub kind: LinkKind,
}
impl VideoLink {
	/// Recognises a video link at the start of `text`.
	///
	/// Leading whitespace is skipped and the link ends at the first whitespace, so trailing chat
	/// text never leaks into the video id.
	pub fn parse(text: &str) -> Result<Self, LinkError> {
		let candidate = text.split_whitespace().next().unwrap_or_default();
		let url = Url::parse(candidate).map_err(|source| LinkError::Malformed { source })?;

		if !matches!(url.scheme(), "http" | "https") {
			return Err(LinkError::UnsupportedScheme { scheme: url.scheme().to_owned() });
		}

		let host = url.host_str().ok_or(LinkError::UnsupportedHost)?;
		let (kind, video_id) = if host == SHORT_HOST {
			(LinkKind::Shortened, first_segment(&url).map(str::to_owned))
		} else if WATCH_HOSTS.contains(&host) {
			let mut segments = url.path_segments().into_iter().flatten();

			match (segments.next(), segments.next()) {
				(Some("watch"), _) => (
					LinkKind::Watch,
					url.query_pairs().find(|(key, _)| key == "v").map(|(_, value)| value.into_owned()),
				),
				(Some("shorts"), Some(id)) => (LinkKind::Short, Some(id.to_owned())),
				_ => (LinkKind::Watch, None),
			}
		} else {
			return Err(LinkError::UnsupportedHost);
		};

		match video_id {
			Some(video_id) if !video_id.is_empty() => Ok(Self { url, video_id, kind }),
			_ => Err(LinkError::MissingVideoId),
		}
	}

	/// Reference a token for this link should resolve to.
	pub fn reference(&self) -> Reference {
		Reference::from(self.url.clone())
	}
}
impl FromStr for VideoLink {
	type Err = LinkError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}
impl Display for VideoLink {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.url.as_str())
	}
}

fn first_segment(url: &Url) -> Option<&str> {
	url.path_segments().and_then(|mut segments| segments.next())
}
