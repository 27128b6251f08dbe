//! AWS IoT shadow topic names.
//!
//! Each zone is its own thing; the zone id is the thing name.

const PREFIX: &str = "$aws/things/";

/// Inbound shadow messages the adapter subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowMessage {
    /// `update/delta`: the desired state differs from the reported one.
    Delta,
    /// `get/accepted`: answer to a full shadow fetch.
    GetAccepted,
}

pub fn update_delta(thing: &str) -> String {
    format!("{PREFIX}{thing}/shadow/update/delta")
}

pub fn get_accepted(thing: &str) -> String {
    format!("{PREFIX}{thing}/shadow/get/accepted")
}

pub fn get(thing: &str) -> String {
    format!("{PREFIX}{thing}/shadow/get")
}

pub fn update(thing: &str) -> String {
    format!("{PREFIX}{thing}/shadow/update")
}

/// Topics to subscribe to for `thing`.
pub fn subscriptions(thing: &str) -> [String; 2] {
    [update_delta(thing), get_accepted(thing)]
}

/// Split an inbound topic into its thing name and message kind.
pub fn parse(topic: &str) -> Option<(&str, ShadowMessage)> {
    let rest = topic.strip_prefix(PREFIX)?;
    let (thing, suffix) = rest.split_once("/shadow/")?;
    if thing.is_empty() {
        return None;
    }
    let kind = match suffix {
        "update/delta" => ShadowMessage::Delta,
        "get/accepted" => ShadowMessage::GetAccepted,
        _ => return None,
    };
    Some((thing, kind))
}
