// SPDX-License-Identifier: MIT

use super::*;
use crate::protocol::{Request, Response};
use cairn_core::AgentId;

#[tokio::test]
async fn request_roundtrips_through_the_wire() {
    let request = Request::Spawn {
        task_text: "add a README".to_string(),
        priority: Default::default(),
        source: Some("cli".to_string()),
    };
    let mut buffer = Vec::new();
    write_message(&mut buffer, &request).await.unwrap();

    let mut cursor = std::io::Cursor::new(buffer);
    let decoded: Request = read_message(&mut cursor).await.unwrap();
    assert_eq!(decoded, request);
}

#[tokio::test]
async fn response_roundtrips_through_the_wire() {
    let response = Response::Spawned {
        agent_id: AgentId::generate(),
    };
    let mut buffer = Vec::new();
    write_message(&mut buffer, &response).await.unwrap();

    let mut cursor = std::io::Cursor::new(buffer);
    let decoded: Response = read_message(&mut cursor).await.unwrap();
    assert_eq!(decoded, response);
}

#[tokio::test]
async fn frame_carries_a_four_byte_big_endian_length_prefix() {
    let response = Response::Error {
        message: "boom".to_string(),
    };
    let mut buffer = Vec::new();
    write_message(&mut buffer, &response).await.unwrap();

    let body = serde_json::to_vec(&response).unwrap();
    let len = u32::from_be_bytes([buffer[0], buffer[1], buffer[2], buffer[3]]) as usize;
    assert_eq!(len, body.len());
    assert_eq!(&buffer[4..], body.as_slice());
}

#[tokio::test]
async fn oversized_length_prefix_is_rejected_before_allocating() {
    let mut buffer = Vec::new();
    buffer.extend_from_slice(&(crate::error::MAX_MESSAGE_BYTES + 1).to_be_bytes());

    let mut cursor = std::io::Cursor::new(buffer);
    let err = read_message::<_, Response>(&mut cursor).await.unwrap_err();
    assert!(matches!(err, ProtocolError::TooLarge(_)));
}
