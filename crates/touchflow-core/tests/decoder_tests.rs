//! TUIO decoder tests against datagrams produced by rosc

use rosc::encoder;
use rosc::{OscBundle, OscMessage, OscPacket, OscTime, OscType};
use touchflow_core::decoder::{
    alive_cursors, contains_cursors, cursor_snapshots, sequence_number, tuio_bundle,
};
use touchflow_core::{decode_datagram, CursorFrame, CursorSnapshot, DecodeError};

fn cur(args: Vec<OscType>) -> OscPacket {
    OscPacket::Message(OscMessage {
        addr: "/tuio/2Dcur".to_string(),
        args,
    })
}

fn s(v: &str) -> OscType {
    OscType::String(v.to_string())
}

/// Bundle as a typical tracker sends it, including a `source` message
#[test]
fn test_tracker_style_datagram() {
    let bundle = OscBundle {
        timetag: OscTime::from((0, 1)),
        content: vec![
            cur(vec![s("source"), s("tracker@10.0.0.2")]),
            cur(vec![s("alive"), OscType::Int(12), OscType::Int(13)]),
            cur(vec![
                s("set"),
                OscType::Int(12),
                OscType::Float(0.25),
                OscType::Float(0.75),
                OscType::Float(0.01),
                OscType::Float(-0.02),
                OscType::Float(0.5),
            ]),
            cur(vec![
                s("set"),
                OscType::Int(13),
                OscType::Double(0.5),
                OscType::Double(0.5),
                OscType::Float(0.0),
                OscType::Float(0.0),
                OscType::Float(0.0),
            ]),
            cur(vec![s("fseq"), OscType::Int(1042)]),
        ],
    };
    let bytes = encoder::encode(&OscPacket::Bundle(bundle)).unwrap();

    let decoded = decode_datagram(&bytes).unwrap();
    assert!(contains_cursors(&decoded));
    assert_eq!(alive_cursors(&decoded).unwrap(), vec![12, 13]);
    assert_eq!(sequence_number(&decoded).unwrap(), Some(1042));

    let snapshots = cursor_snapshots(&decoded).unwrap();
    assert_eq!(
        snapshots[&12],
        CursorSnapshot::new(12, (0.25, 0.75), (0.01, -0.02), 0.5)
    );
    assert_eq!(snapshots[&13].position, (0.5, 0.5));
}

#[test]
fn test_missing_fseq_is_none() {
    let bundle = OscBundle {
        timetag: OscTime::from((0, 1)),
        content: vec![cur(vec![s("alive")])],
    };
    assert_eq!(sequence_number(&bundle).unwrap(), None);
}

#[test]
fn test_fseq_without_value_is_error() {
    let bundle = OscBundle {
        timetag: OscTime::from((0, 1)),
        content: vec![cur(vec![s("alive")]), cur(vec![s("fseq")])],
    };
    assert_eq!(
        CursorFrame::decode(&bundle),
        Err(DecodeError::MissingArgument {
            command: "fseq",
            index: 1
        })
    );
}

#[test]
fn test_cursor_bundle_without_alive_is_error() {
    let bundle = OscBundle {
        timetag: OscTime::from((0, 1)),
        content: vec![cur(vec![s("fseq"), OscType::Int(1)])],
    };
    assert_eq!(
        CursorFrame::decode(&bundle),
        Err(DecodeError::MissingCommand("alive"))
    );
}

#[test]
fn test_frame_decode_matches_parts() {
    let cursors = [CursorSnapshot::at(1, 0.1, 0.2), CursorSnapshot::at(2, 0.3, 0.4)];
    let bundle = tuio_bundle(&[1, 2], &cursors, 5);
    let frame = CursorFrame::decode(&bundle).unwrap().unwrap();

    assert_eq!(frame.alive, vec![1, 2]);
    assert_eq!(frame.sequence, Some(5));
    assert_eq!(frame.snapshots.values().copied().collect::<Vec<_>>(), cursors);
}
