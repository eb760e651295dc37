//! Request lifecycle stages and stage masks.
//!
//! Every condition attribute declares the set of stages at which it may be
//! evaluated. The set is a [`StageMask`]; a single point in the lifecycle is a
//! [`Stage`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    /// Set of lifecycle stages, one bit per [`Stage`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StageMask: u16 {
        const BEFORE_REQUEST = 1 << 0;
        const BEFORE_SEND_HEADERS = 1 << 1;
        const SEND_HEADERS = 1 << 2;
        const HEADERS_RECEIVED = 1 << 3;
        const AUTH_REQUIRED = 1 << 4;
        const BEFORE_REDIRECT = 1 << 5;
        const RESPONSE_STARTED = 1 << 6;
        const COMPLETED = 1 << 7;
        const ERROR = 1 << 8;
    }
}

impl StageMask {
    /// Whether `stage` is a member of this mask.
    #[inline]
    pub fn includes(self, stage: Stage) -> bool {
        self.intersects(stage.mask())
    }

    /// Iterate the member stages in lifecycle order.
    pub fn stages(self) -> impl Iterator<Item = Stage> {
        Stage::ALL.into_iter().filter(move |s| self.includes(*s))
    }
}

impl FromIterator<Stage> for StageMask {
    fn from_iter<I: IntoIterator<Item = Stage>>(iter: I) -> Self {
        iter.into_iter()
            .fold(StageMask::empty(), |mask, stage| mask | stage.mask())
    }
}

/// A discrete phase of a network request's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Stage {
    #[serde(rename = "onBeforeRequest")]
    BeforeRequest,
    #[serde(rename = "onBeforeSendHeaders")]
    BeforeSendHeaders,
    #[serde(rename = "onSendHeaders")]
    SendHeaders,
    #[serde(rename = "onHeadersReceived")]
    HeadersReceived,
    #[serde(rename = "onAuthRequired")]
    AuthRequired,
    #[serde(rename = "onBeforeRedirect")]
    BeforeRedirect,
    #[serde(rename = "onResponseStarted")]
    ResponseStarted,
    #[serde(rename = "onCompleted")]
    Completed,
    #[serde(rename = "onErrorOccurred")]
    Error,
}

impl Stage {
    /// All stages in lifecycle order.
    pub const ALL: [Stage; 9] = [
        Stage::BeforeRequest,
        Stage::BeforeSendHeaders,
        Stage::SendHeaders,
        Stage::HeadersReceived,
        Stage::AuthRequired,
        Stage::BeforeRedirect,
        Stage::ResponseStarted,
        Stage::Completed,
        Stage::Error,
    ];

    /// The single-bit mask for this stage.
    pub fn mask(self) -> StageMask {
        match self {
            Stage::BeforeRequest => StageMask::BEFORE_REQUEST,
            Stage::BeforeSendHeaders => StageMask::BEFORE_SEND_HEADERS,
            Stage::SendHeaders => StageMask::SEND_HEADERS,
            Stage::HeadersReceived => StageMask::HEADERS_RECEIVED,
            Stage::AuthRequired => StageMask::AUTH_REQUIRED,
            Stage::BeforeRedirect => StageMask::BEFORE_REDIRECT,
            Stage::ResponseStarted => StageMask::RESPONSE_STARTED,
            Stage::Completed => StageMask::COMPLETED,
            Stage::Error => StageMask::ERROR,
        }
    }

    /// The declarative event name, e.g. `onHeadersReceived`.
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::BeforeRequest => "onBeforeRequest",
            Stage::BeforeSendHeaders => "onBeforeSendHeaders",
            Stage::SendHeaders => "onSendHeaders",
            Stage::HeadersReceived => "onHeadersReceived",
            Stage::AuthRequired => "onAuthRequired",
            Stage::BeforeRedirect => "onBeforeRedirect",
            Stage::ResponseStarted => "onResponseStarted",
            Stage::Completed => "onCompleted",
            Stage::Error => "onErrorOccurred",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a stage name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown stage '{0}'")]
pub struct UnknownStage(pub String);

impl FromStr for Stage {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| UnknownStage(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_bits_are_distinct() {
        let all: StageMask = Stage::ALL.into_iter().collect();
        assert_eq!(all, StageMask::all());
        assert_eq!(all.bits().count_ones(), 9);
    }

    #[test]
    fn test_stage_name_roundtrip() {
        for stage in Stage::ALL {
            assert_eq!(stage.as_str().parse::<Stage>(), Ok(stage));
        }
        assert!("onSomething".parse::<Stage>().is_err());
        // Names are case-sensitive
        assert!("onheadersreceived".parse::<Stage>().is_err());
    }

    #[test]
    fn test_mask_includes() {
        let mask = StageMask::BEFORE_REQUEST | StageMask::HEADERS_RECEIVED;
        assert!(mask.includes(Stage::BeforeRequest));
        assert!(mask.includes(Stage::HeadersReceived));
        assert!(!mask.includes(Stage::BeforeSendHeaders));
        assert!(!StageMask::empty().includes(Stage::Completed));
    }

    #[test]
    fn test_mask_stages_in_order() {
        let mask = StageMask::ERROR | StageMask::BEFORE_REQUEST;
        let stages: Vec<_> = mask.stages().collect();
        assert_eq!(stages, vec![Stage::BeforeRequest, Stage::Error]);
    }

    #[test]
    fn test_stage_serde() {
        let stage: Stage = serde_json::from_str(r#""onErrorOccurred""#).unwrap();
        assert_eq!(stage, Stage::Error);
        assert_eq!(
            serde_json::to_string(&Stage::HeadersReceived).unwrap(),
            r#""onHeadersReceived""#
        );
    }
}
