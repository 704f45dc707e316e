//! TUIO 1.0 `/tuio/2Dcur` bundle decoding
//!
//! Stateless helpers that pull alive lists, frame sequence numbers and
//! cursor snapshots out of one OSC bundle. A bundle with no cursor message
//! is not an error; callers check [`contains_cursors`] first.
//!
//! Message layouts:
//! - `alive s_id0 ... s_idN`
//! - `set s_id x y X Y m`
//! - `fseq f_id`

use rosc::{OscBundle, OscMessage, OscPacket, OscTime, OscType};
use std::collections::BTreeMap;

use crate::cursor::{CursorSnapshot, SessionId};
use crate::error::{DecodeError, Result};
use crate::TUIO_2DCUR_ADDRESS;

const ALIVE: &str = "alive";
const SET: &str = "set";
const FSEQ: &str = "fseq";

/// Everything reconciliation needs from one cursor bundle
#[derive(Debug, Clone, PartialEq)]
pub struct CursorFrame {
    pub alive: Vec<SessionId>,
    pub snapshots: BTreeMap<SessionId, CursorSnapshot>,
    /// `fseq` value, parsed but never used for ordering
    pub sequence: Option<i32>,
}

impl CursorFrame {
    /// Decode a bundle, or `None` if it carries no cursor messages
    pub fn decode(bundle: &OscBundle) -> Result<Option<Self>> {
        if !contains_cursors(bundle) {
            return Ok(None);
        }

        Ok(Some(Self {
            alive: alive_cursors(bundle)?,
            snapshots: cursor_snapshots(bundle)?,
            sequence: sequence_number(bundle)?,
        }))
    }
}

/// Decode a raw UDP datagram into a bundle.
///
/// A bare message is wrapped in an immediate bundle so callers only ever
/// deal with one shape.
pub fn decode_datagram(data: &[u8]) -> Result<OscBundle> {
    let (_, packet) = rosc::decoder::decode_udp(data)?;

    Ok(match packet {
        OscPacket::Bundle(bundle) => bundle,
        message @ OscPacket::Message(_) => OscBundle {
            timetag: OscTime::from((0, 1)),
            content: vec![message],
        },
    })
}

/// True iff any message in the bundle is addressed at `/tuio/2Dcur`
pub fn contains_cursors(bundle: &OscBundle) -> bool {
    cursor_messages(bundle).next().is_some()
}

/// Frame sequence number from the `fseq` message, if present
pub fn sequence_number(bundle: &OscBundle) -> Result<Option<i32>> {
    match find_command(bundle, FSEQ) {
        Some(msg) => Ok(Some(int_arg(msg, FSEQ, 1)?)),
        None => Ok(None),
    }
}

/// Session ids listed by the `alive` message
pub fn alive_cursors(bundle: &OscBundle) -> Result<Vec<SessionId>> {
    let msg = find_command(bundle, ALIVE).ok_or(DecodeError::MissingCommand(ALIVE))?;

    (1..msg.args.len())
        .map(|index| int_arg(msg, ALIVE, index))
        .collect()
}

/// Snapshots from every `set` message; a later `set` for the same session wins
pub fn cursor_snapshots(bundle: &OscBundle) -> Result<BTreeMap<SessionId, CursorSnapshot>> {
    let mut snapshots = BTreeMap::new();

    for msg in cursor_messages(bundle).filter(|m| command_of(m) == Some(SET)) {
        let snapshot = CursorSnapshot {
            session_id: int_arg(msg, SET, 1)?,
            position: (float_arg(msg, SET, 2)?, float_arg(msg, SET, 3)?),
            velocity: (float_arg(msg, SET, 4)?, float_arg(msg, SET, 5)?),
            acceleration: float_arg(msg, SET, 6)?,
        };
        snapshots.insert(snapshot.session_id, snapshot);
    }

    Ok(snapshots)
}

/// Build a TUIO cursor bundle (`alive`, one `set` per cursor, `fseq`).
///
/// Not used on the ingestion path.
pub fn tuio_bundle(alive: &[SessionId], cursors: &[CursorSnapshot], sequence: i32) -> OscBundle {
    let mut content = Vec::with_capacity(cursors.len() + 2);

    let mut alive_args = vec![OscType::String(ALIVE.to_string())];
    alive_args.extend(alive.iter().map(|id| OscType::Int(*id)));
    content.push(OscPacket::Message(OscMessage {
        addr: TUIO_2DCUR_ADDRESS.to_string(),
        args: alive_args,
    }));

    content.extend(
        cursors
            .iter()
            .map(|c| OscPacket::Message(c.to_set_message())),
    );

    content.push(OscPacket::Message(OscMessage {
        addr: TUIO_2DCUR_ADDRESS.to_string(),
        args: vec![OscType::String(FSEQ.to_string()), OscType::Int(sequence)],
    }));

    OscBundle {
        timetag: OscTime::from((0, 1)),
        content,
    }
}

/// All `/tuio/2Dcur` messages, descending into nested bundles
fn cursor_messages(bundle: &OscBundle) -> impl Iterator<Item = &OscMessage> {
    let mut messages = Vec::new();
    collect_messages(bundle, &mut messages);
    messages
        .into_iter()
        .filter(|m| m.addr == TUIO_2DCUR_ADDRESS)
}

fn collect_messages<'a>(bundle: &'a OscBundle, out: &mut Vec<&'a OscMessage>) {
    for packet in &bundle.content {
        match packet {
            OscPacket::Message(msg) => out.push(msg),
            OscPacket::Bundle(inner) => collect_messages(inner, out),
        }
    }
}

fn find_command<'a>(bundle: &'a OscBundle, command: &str) -> Option<&'a OscMessage> {
    cursor_messages(bundle).find(|m| command_of(m) == Some(command))
}

fn command_of(msg: &OscMessage) -> Option<&str> {
    match msg.args.first() {
        Some(OscType::String(s)) => Some(s.as_str()),
        _ => None,
    }
}

fn int_arg(msg: &OscMessage, command: &'static str, index: usize) -> Result<i32> {
    let unexpected = DecodeError::UnexpectedType {
        command,
        index,
        expected: "int32",
    };

    match msg.args.get(index) {
        Some(OscType::Int(i)) => Ok(*i),
        Some(OscType::Long(l)) => i32::try_from(*l).map_err(|_| unexpected),
        Some(_) => Err(unexpected),
        None => Err(DecodeError::MissingArgument { command, index }),
    }
}

fn float_arg(msg: &OscMessage, command: &'static str, index: usize) -> Result<f32> {
    match msg.args.get(index) {
        Some(OscType::Float(f)) => Ok(*f),
        Some(OscType::Double(d)) => Ok(*d as f32),
        Some(OscType::Int(i)) => Ok(*i as f32),
        Some(_) => Err(DecodeError::UnexpectedType {
            command,
            index,
            expected: "float",
        }),
        None => Err(DecodeError::MissingArgument { command, index }),
    }
}
