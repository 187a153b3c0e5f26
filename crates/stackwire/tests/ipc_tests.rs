//! Controller and content process exchanging framed messages

use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use stackwire::ipc::{Dispatcher, Message, MessageHeader, MessageType, HEADER_SIZE};
use stackwire::*;

const NAVIGATE: MessageType = MessageType(1);
const REPLY: MessageType = MessageType(2);

#[test]
fn test_request_reply_exchange() {
    // Content side: answers NAVIGATE by queueing a REPLY
    let outbox = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&outbox);
    let mut content = Dispatcher::new();
    content.register(NAVIGATE, move |stack, count| {
        let base = stack.len() - count;
        let url = stack
            .get(base as isize)
            .and_then(Value::as_str)
            .ok_or("expected a url")?
            .to_string();
        stack.truncate(base);

        stack.push(Table::new().with("url", url.as_str()).with("status", 200.0));
        let reply = Message::from_stack(REPLY, stack, -1, -1).map_err(|e| e.to_string())?;
        stack.pop();

        let bytes = reply.to_bytes().map_err(|e| e.to_string())?;
        sink.lock().map_err(|e| e.to_string())?.push(bytes);
        Ok(())
    });

    // Controller side
    let mut request = ValueStack::new();
    request.push("https://example.org");
    request.push(OpaqueHandle::from_addr(0x10));
    let bytes = Message::from_stack(NAVIGATE, &request, 0, -1)
        .unwrap()
        .to_bytes()
        .unwrap();

    let mut content_stack = ValueStack::new();
    assert_eq!(content.dispatch_bytes(&bytes, &mut content_stack).unwrap(), 2);
    assert!(content_stack.is_empty());

    let replies = outbox.lock().unwrap();
    assert_eq!(replies.len(), 1);
    let reply = Message::from_bytes(&replies[0]).unwrap();
    assert_eq!(reply.kind, REPLY);

    let values = decode_values(&reply.payload).unwrap();
    assert_eq!(
        values,
        vec![Value::table(
            Table::new()
                .with("url", "https://example.org")
                .with("status", 200.0)
        )]
    );
}

#[test]
fn test_header_matches_payload() {
    let message = Message::from_values(REPLY, &[Value::string("ok"), Value::Nil]).unwrap();
    let bytes = message.to_bytes().unwrap();
    let header = MessageHeader::from_bytes(&bytes).unwrap();
    assert_eq!(header.kind, REPLY);
    assert_eq!(header.length as usize, bytes.len() - HEADER_SIZE);
}

#[test]
fn test_truncated_frame_is_rejected() {
    let bytes = Message::from_values(NAVIGATE, &[Value::Number(1.0)])
        .unwrap()
        .to_bytes()
        .unwrap();

    let mut dispatcher = Dispatcher::new();
    dispatcher.register(NAVIGATE, |_, _| Ok(()));

    let mut stack = ValueStack::new();
    let err = dispatcher
        .dispatch_bytes(&bytes[..bytes.len() - 1], &mut stack)
        .unwrap_err();
    assert!(matches!(err, IpcError::Frame(FrameError::LengthMismatch { .. })));
    assert!(stack.is_empty());
}

#[test]
fn test_dispatcher_honours_codec_limits() {
    let mut dispatcher = Dispatcher::with_config(CodecConfig::with_max_depth(1));
    dispatcher.register(NAVIGATE, |stack, count| {
        stack.truncate(stack.len() - count);
        Ok(())
    });

    let shallow = Message::from_values(NAVIGATE, &[Value::table(Table::new())]).unwrap();
    let deep = Message::from_values(
        NAVIGATE,
        &[Value::table(Table::new().with(1.0, Table::new()))],
    )
    .unwrap();

    let mut stack = ValueStack::new();
    assert_eq!(dispatcher.dispatch(&shallow, &mut stack).unwrap(), 1);
    assert_eq!(
        dispatcher.dispatch(&deep, &mut stack).unwrap_err(),
        IpcError::Codec(CodecError::NestingTooDeep { depth: 2, max: 1 })
    );
    assert!(stack.is_empty());
}
